//! Closed vocabularies shared by the veterinary bot: species, languages,
//! urgency levels and translation contexts.
//!
//! Each enum parses from its lowercase wire form via `FromStr` so inbound
//! adapters can report the offending value instead of a generic decode
//! failure.

/// Raised when a string is not a member of a closed vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{value}' is not one of: {expected}")]
pub struct UnknownVariant {
    /// Rejected input.
    pub value: String,
    /// Accepted values, `|`-separated.
    pub expected: &'static str,
}

macro_rules! closed_vocabulary {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize,
        )]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $wire)] $variant, )+
        }

        impl $name {
            /// Every member in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Accepted wire values joined with `|`.
            pub const EXPECTED: &'static str = concat!($($wire, "|"),+);

            /// Wire representation.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $wire, )+
                }
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::domain::UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $( $wire => Ok($name::$variant), )+
                    other => Err($crate::domain::UnknownVariant {
                        value: other.to_owned(),
                        expected: Self::EXPECTED.trim_end_matches('|'),
                    }),
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub(crate) use closed_vocabulary;

closed_vocabulary! {
    /// Animal species the veterinary bot can advise on.
    pub enum Species {
        /// Dogs.
        Dog => "dog",
        /// Cats.
        Cat => "cat",
        /// Birds.
        Bird => "bird",
        /// Rabbits.
        Rabbit => "rabbit",
        /// Hamsters.
        Hamster => "hamster",
        /// Guinea pigs.
        GuineaPig => "guinea_pig",
        /// Fish.
        Fish => "fish",
        /// Reptiles.
        Reptile => "reptile",
    }
}

closed_vocabulary! {
    /// Languages supported for questions, answers and translation.
    pub enum Language {
        /// English.
        English => "en",
        /// Latvian.
        Latvian => "lv",
        /// Russian.
        Russian => "ru",
    }
}

closed_vocabulary! {
    /// How quickly an owner should seek professional care.
    pub enum Urgency {
        /// Routine.
        Low => "low",
        /// Keep an eye on it.
        Medium => "medium",
        /// See a vet within a day.
        High => "high",
        /// Seek care immediately.
        Emergency => "emergency",
    }
}

closed_vocabulary! {
    /// Register used when translating text.
    pub enum TranslationContext {
        /// Clinical terminology.
        Medical => "medical",
        /// Everyday language.
        General => "general",
    }
}

impl Language {
    /// English display name, used in model metadata.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Latvian => "Latvian",
            Self::Russian => "Russian",
        }
    }

    /// Whether answers in this language need translating through English.
    #[must_use]
    pub const fn needs_translation(self) -> bool {
        !matches!(self, Self::English)
    }
}

impl Default for Language {
    fn default() -> Self {
        Self::English
    }
}

impl Default for TranslationContext {
    fn default() -> Self {
        Self::Medical
    }
}

const EMERGENCY_KEYWORDS: &[&str] = &[
    "emergency",
    "urgent",
    "critical",
    "immediate",
    "life-threatening",
    "toxic",
    "poison",
];
const HIGH_KEYWORDS: &[&str] = &["serious", "severe", "concerning", "worrying", "painful"];
const MEDIUM_KEYWORDS: &[&str] = &["monitor", "watch", "observe", "check"];

impl Urgency {
    /// Classify free text by the strongest keyword it mentions.
    ///
    /// ```
    /// use lvhub::domain::Urgency;
    ///
    /// assert_eq!(Urgency::from_text("Possible poison ingestion"), Urgency::Emergency);
    /// assert_eq!(Urgency::from_text("Monitor appetite"), Urgency::Medium);
    /// assert_eq!(Urgency::from_text("Looks fine"), Urgency::Low);
    /// ```
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let lower = text.to_lowercase();
        let mentions = |words: &[&str]| words.iter().any(|word| lower.contains(word));
        if mentions(EMERGENCY_KEYWORDS) {
            Self::Emergency
        } else if mentions(HIGH_KEYWORDS) {
            Self::High
        } else if mentions(MEDIUM_KEYWORDS) {
            Self::Medium
        } else {
            Self::Low
        }
    }
}
