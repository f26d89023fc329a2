//! Macros for probe engine error handling.
//!
//! Provides convenience macros for creating and returning [`crate::error::ZdtError`] instances
//! with reduced boilerplate.

/// Creates a [`crate::error::ZdtError`] from error kind and description.
///
/// Accepts either a static description or a static description plus any [`std::fmt::Display`]
/// detail.
#[macro_export]
macro_rules! zdt_error {
    ($kind:expr, $desc:expr) => {
        $crate::error::ZdtError::from(($kind, $desc))
    };
    ($kind:expr, $desc:expr, $detail:expr) => {
        $crate::error::ZdtError::from(($kind, $desc, $detail.to_string()))
    };
}

/// Creates and returns a [`crate::error::ZdtError`] from the current function.
#[macro_export]
macro_rules! bail {
    ($kind:expr, $desc:expr) => {
        return Err($crate::zdt_error!($kind, $desc))
    };
    ($kind:expr, $desc:expr, $detail:expr) => {
        return Err($crate::zdt_error!($kind, $desc, $detail))
    };
}
