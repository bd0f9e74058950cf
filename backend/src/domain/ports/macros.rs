//! `define_port_error!`: typed port error enums with `impl Into` constructors
//! and, optionally, their mapping onto [`crate::domain::Error`].
//!
//! A variant written `Name { field: Ty } => "message {field}" => kind` maps
//! to the domain error built by `kind`, one of `unavailable` (503) or
//! `internal` (500, redacted at the HTTP edge). Enums whose variants carry
//! no kind get constructors only and are mapped by hand.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            #[must_use]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_fields $variant [] [] $( $field : $ty, )*);
    };

    (@ctor_fields $variant:ident [$($params:tt)*] [$($inits:tt)*]) => {
        ::paste::paste! {
            #[must_use]
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_fields $variant:ident [$($params:tt)*] [$($inits:tt)*] $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_fields
            $variant
            [$($params)* $field: impl Into<$ty>,]
            [$($inits)* $field: $field.into(),]
            $($rest)*
        );
    };

    (@kind unavailable, $message:expr) => {
        $crate::domain::Error::service_unavailable($message)
    };

    (@kind internal, $message:expr) => {
        $crate::domain::Error::internal($message)
    };

    (@enum
        [$(#[$outer:meta])*] $name:ident
        $(
            [$(#[$variant_meta:meta])*]
            $variant:ident [$( { $($field:ident : $ty:ty),* } )?] => $message:expr
        ),*
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr => $kind:ident
            ),+ $(,)?
        }
    ) => {
        define_port_error!(@enum
            [$(#[$outer])*] $name
            $( [$(#[$variant_meta])*] $variant [$( { $($field : $ty),* } )?] => $message ),+
        );

        impl From<$name> for $crate::domain::Error {
            fn from(value: $name) -> Self {
                let message = value.to_string();
                match value {
                    $( $name::$variant { .. } => define_port_error!(@kind $kind, message), )+
                }
            }
        }
    };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        define_port_error!(@enum
            [$(#[$outer])*] $name
            $( [$(#[$variant_meta])*] $variant [$( { $($field : $ty),* } )?] => $message ),*
        );
    };
}

pub(crate) use define_port_error;
