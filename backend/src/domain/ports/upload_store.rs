//! Port for storing uploaded images.
use async_trait::async_trait;

use crate::domain::UploadName;

use super::define_port_error;

define_port_error! {
    /// Errors raised by upload storage adapters.
    pub enum UploadStoreError {
        /// Backing storage could not be opened.
        Unavailable { message: String } => "upload storage unavailable: {message}" => unavailable,
        /// Reading or writing a file failed.
        Io { message: String } => "upload storage i/o failed: {message}" => internal,
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UploadStore: Send + Sync {
    /// Persist `bytes` under `name`.
    async fn save(&self, name: &UploadName, bytes: Vec<u8>) -> Result<(), UploadStoreError>;

    /// Read a stored upload; `None` when absent.
    async fn load(&self, name: &UploadName) -> Result<Option<Vec<u8>>, UploadStoreError>;
}
