use std::error;
use std::fmt;

use zdt_config::shared::ValidationError;

/// Convenient result type for probe engine operations using [`ZdtError`] as the error type.
pub type ZdtResult<T> = Result<T, ZdtError>;

/// Main error type of the probe engine.
///
/// [`ZdtError`] can represent a single error, an error with additional detail, or a group of
/// errors collected from many workers under one kind. Probes return it, workers record it as
/// their terminal error and the runner groups all recorded errors into one report.
#[derive(Debug, Clone)]
pub struct ZdtError {
    repr: ErrorRepr,
}

/// Internal representation of error data.
#[derive(Debug, Clone)]
enum ErrorRepr {
    /// Error with kind and static description
    WithDescription(ErrorKind, &'static str),
    /// Error with kind, static description, and dynamic detail
    WithDescriptionAndDetail(ErrorKind, &'static str, String),
    /// Multiple errors reported together under their own kind and description
    Grouped(ErrorKind, &'static str, Vec<ZdtError>),
}

/// Specific categories of errors that can occur while probing.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    // Probe Errors
    ProbeFailed,
    ProbeWorkerPanic,
    ProbeWorkerLost,

    // Aggregated Errors
    DowntimeDetected,

    // Setup Errors
    TargetResolutionFailed,
    ConfigError,

    // IO Errors
    IoError,

    // Unknown / Uncategorized
    Unknown,
}

impl ZdtError {
    /// Creates a [`ZdtError`] that reports `errors` together under `kind`.
    ///
    /// The resulting error keeps its own kind, so callers can tell a failed check apart from the
    /// individual failures that caused it.
    pub fn grouped(kind: ErrorKind, desc: &'static str, errors: Vec<ZdtError>) -> ZdtError {
        ZdtError {
            repr: ErrorRepr::Grouped(kind, desc, errors),
        }
    }

    /// Returns the [`ErrorKind`] of this error.
    pub fn kind(&self) -> ErrorKind {
        match self.repr {
            ErrorRepr::WithDescription(kind, _)
            | ErrorRepr::WithDescriptionAndDetail(kind, _, _)
            | ErrorRepr::Grouped(kind, _, _) => kind,
        }
    }

    /// Returns all [`ErrorKind`]s present in this error.
    ///
    /// Grouped errors report their own kind followed by the kinds of the nested errors.
    pub fn kinds(&self) -> Vec<ErrorKind> {
        match self.repr {
            ErrorRepr::WithDescription(kind, _)
            | ErrorRepr::WithDescriptionAndDetail(kind, _, _) => vec![kind],
            ErrorRepr::Grouped(kind, _, ref errors) => std::iter::once(kind)
                .chain(errors.iter().flat_map(|err| err.kinds()))
                .collect::<Vec<_>>(),
        }
    }

    /// Returns the detailed error information if available.
    ///
    /// For grouped errors, returns the detail of the first nested error that has one.
    pub fn detail(&self) -> Option<&str> {
        match self.repr {
            ErrorRepr::WithDescriptionAndDetail(_, _, ref detail) => Some(detail.as_str()),
            ErrorRepr::Grouped(_, _, ref errors) => errors.iter().find_map(|e| e.detail()),
            _ => None,
        }
    }

    /// Returns the errors nested in a grouped error, or an empty slice for single errors.
    pub fn errors(&self) -> &[ZdtError] {
        match self.repr {
            ErrorRepr::Grouped(_, _, ref errors) => errors,
            _ => &[],
        }
    }
}

impl PartialEq for ZdtError {
    fn eq(&self, other: &ZdtError) -> bool {
        match (&self.repr, &other.repr) {
            (ErrorRepr::WithDescription(kind_a, _), ErrorRepr::WithDescription(kind_b, _)) => {
                kind_a == kind_b
            }
            (
                ErrorRepr::WithDescriptionAndDetail(kind_a, _, _),
                ErrorRepr::WithDescriptionAndDetail(kind_b, _, _),
            ) => kind_a == kind_b,
            (
                ErrorRepr::Grouped(kind_a, _, errors_a),
                ErrorRepr::Grouped(kind_b, _, errors_b),
            ) => kind_a == kind_b && errors_a == errors_b,
            _ => false,
        }
    }
}

fn fmt_nested(f: &mut fmt::Formatter<'_>, errors: &[ZdtError]) -> Result<(), fmt::Error> {
    for (i, error) in errors.iter().enumerate() {
        write!(f, "\n  {}: {}", i + 1, error)?;
    }

    Ok(())
}

impl fmt::Display for ZdtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self.repr {
            ErrorRepr::WithDescription(kind, desc) => {
                fmt::Debug::fmt(&kind, f)?;
                f.write_str(": ")?;
                desc.fmt(f)?;

                Ok(())
            }
            ErrorRepr::WithDescriptionAndDetail(kind, desc, ref detail) => {
                fmt::Debug::fmt(&kind, f)?;
                f.write_str(": ")?;
                desc.fmt(f)?;
                f.write_str(" -> ")?;
                detail.fmt(f)?;

                Ok(())
            }
            ErrorRepr::Grouped(kind, desc, ref errors) => {
                fmt::Debug::fmt(&kind, f)?;
                f.write_str(": ")?;
                desc.fmt(f)?;
                write!(f, " ({} total):", errors.len())?;
                fmt_nested(f, errors)?;

                Ok(())
            }
        }
    }
}

impl error::Error for ZdtError {}

/// Creates a [`ZdtError`] from an error kind and static description.
impl From<(ErrorKind, &'static str)> for ZdtError {
    fn from((kind, desc): (ErrorKind, &'static str)) -> ZdtError {
        ZdtError {
            repr: ErrorRepr::WithDescription(kind, desc),
        }
    }
}

/// Creates a [`ZdtError`] from an error kind, static description, and dynamic detail.
impl From<(ErrorKind, &'static str, String)> for ZdtError {
    fn from((kind, desc, detail): (ErrorKind, &'static str, String)) -> ZdtError {
        ZdtError {
            repr: ErrorRepr::WithDescriptionAndDetail(kind, desc, detail),
        }
    }
}

/// Converts [`std::io::Error`] to [`ZdtError`] with [`ErrorKind::IoError`].
///
/// Probes built on blocking or async sockets usually surface their failures this way.
impl From<std::io::Error> for ZdtError {
    fn from(err: std::io::Error) -> ZdtError {
        ZdtError {
            repr: ErrorRepr::WithDescriptionAndDetail(
                ErrorKind::IoError,
                "I/O error occurred",
                err.to_string(),
            ),
        }
    }
}

/// Converts [`ValidationError`] to [`ZdtError`] with [`ErrorKind::ConfigError`].
impl From<ValidationError> for ZdtError {
    fn from(err: ValidationError) -> ZdtError {
        ZdtError {
            repr: ErrorRepr::WithDescriptionAndDetail(
                ErrorKind::ConfigError,
                "Invalid probe configuration",
                err.to_string(),
            ),
        }
    }
}
