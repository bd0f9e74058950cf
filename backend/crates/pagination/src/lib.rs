//! Offset-based pagination primitives shared by list endpoints.
//!
//! A [`PageRequest`] is parsed from the raw `limit` and `offset` query values
//! a client supplies. Parsing applies per-endpoint defaults and an upper bound
//! on `limit`, so handlers never see unbounded windows. [`Paginated`] wraps a
//! window of items together with the metadata clients use to request the
//! next page.
//!
//! ```
//! use pagination::{PageRequest, PageLimits};
//!
//! let limits = PageLimits::new(10, 100);
//! let page = PageRequest::parse(Some("2"), Some("1"), limits).expect("valid page");
//! let window = page.slice(&["a", "b", "c", "d"]);
//! assert_eq!(window, ["b", "c"]);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default and maximum `limit` accepted by an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    default_limit: usize,
    max_limit: usize,
}

impl PageLimits {
    /// Build limits; `default_limit` is clamped to `max_limit`.
    #[must_use]
    pub const fn new(default_limit: usize, max_limit: usize) -> Self {
        let default_limit = if default_limit > max_limit {
            max_limit
        } else {
            default_limit
        };
        Self {
            default_limit,
            max_limit,
        }
    }

    /// Limit applied when the client omits one.
    #[must_use]
    pub const fn default_limit(&self) -> usize {
        self.default_limit
    }

    /// Largest limit a client may request.
    #[must_use]
    pub const fn max_limit(&self) -> usize {
        self.max_limit
    }
}

/// Errors raised while parsing raw pagination parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaginationError {
    /// A parameter was not a non-negative integer.
    #[error("{field} must be a non-negative integer, got '{value}'")]
    NotANumber {
        /// Parameter name.
        field: &'static str,
        /// Raw value supplied by the client.
        value: String,
    },
    /// `limit` was zero.
    #[error("limit must be at least 1")]
    ZeroLimit,
    /// `limit` exceeded the endpoint maximum.
    #[error("limit must not exceed {max}, got {value}")]
    LimitTooLarge {
        /// Requested limit.
        value: usize,
        /// Endpoint maximum.
        max: usize,
    },
}

impl PaginationError {
    /// Name of the offending parameter.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::NotANumber { field, .. } => field,
            Self::ZeroLimit | Self::LimitTooLarge { .. } => "limit",
        }
    }
}

/// A validated `limit`/`offset` window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    limit: usize,
    offset: usize,
}

impl PageRequest {
    /// Construct a page request from already validated numbers.
    #[must_use]
    pub const fn new(limit: usize, offset: usize) -> Self {
        Self { limit, offset }
    }

    /// Parse raw query values, applying defaults and bounds.
    ///
    /// # Errors
    /// Returns [`PaginationError`] when a value is not a non-negative integer,
    /// the limit is zero, or the limit exceeds [`PageLimits::max_limit`].
    pub fn parse(
        limit: Option<&str>,
        offset: Option<&str>,
        limits: PageLimits,
    ) -> Result<Self, PaginationError> {
        let limit = match limit.map(str::trim).filter(|raw| !raw.is_empty()) {
            Some(raw) => parse_number("limit", raw)?,
            None => limits.default_limit(),
        };
        if limit == 0 {
            return Err(PaginationError::ZeroLimit);
        }
        if limit > limits.max_limit() {
            return Err(PaginationError::LimitTooLarge {
                value: limit,
                max: limits.max_limit(),
            });
        }
        let offset = match offset.map(str::trim).filter(|raw| !raw.is_empty()) {
            Some(raw) => parse_number("offset", raw)?,
            None => 0,
        };
        Ok(Self { limit, offset })
    }

    /// Maximum number of items in the window.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Number of leading items skipped.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Borrow the `[offset, offset + limit)` window of `items`.
    ///
    /// Offsets past the end yield an empty slice.
    #[must_use]
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.offset.min(items.len());
        let end = start.saturating_add(self.limit).min(items.len());
        items.get(start..end).unwrap_or_default()
    }

    /// Wrap the window of `items` in a [`Paginated`] envelope.
    #[must_use]
    pub fn paginate<T: Clone>(&self, items: &[T]) -> Paginated<T> {
        Paginated {
            items: self.slice(items).to_vec(),
            pagination: PageMeta {
                limit: self.limit,
                offset: self.offset,
                total: items.len(),
            },
        }
    }
}

fn parse_number(field: &'static str, raw: &str) -> Result<usize, PaginationError> {
    raw.parse::<usize>()
        .map_err(|_| PaginationError::NotANumber {
            field,
            value: raw.to_owned(),
        })
}

/// Window metadata returned alongside a page of items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    /// Limit applied to the window.
    pub limit: usize,
    /// Offset applied to the window.
    pub offset: usize,
    /// Total number of items before windowing.
    pub total: usize,
}

/// A page of items plus its window metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    /// Items in the current window.
    pub items: Vec<T>,
    /// Window metadata.
    pub pagination: PageMeta,
}
