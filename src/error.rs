use std::convert::Infallible;
use std::error::Error as StdError;
use std::fmt::Result as FmtResult;
use std::fmt::{Display, Formatter};
use std::io::ErrorKind;
use std::result::Result as StdResult;

/// Possible errors that can occur while working with PCD files and point arrays.
#[derive(Debug)]
pub enum Error {
    /// Something went wrong while opening, creating, reading or writing a file.
    /// The underlying IO error is available as source.
    Io {
        reason: String,
        source: Option<Box<dyn StdError + Send + Sync>>,
    },
    /// The file content is invalid, does not conform with the PCD format
    /// or does not match the point schema that was requested.
    Format {
        reason: String,
        source: Option<Box<dyn StdError + Send + Sync>>,
    },
    /// Caller supplied data has the wrong shape or length.
    Validation { reason: String },
}

impl Error {
    /// Creates an invalid file error from text.
    pub fn format<T>(reason: impl Into<String>) -> Result<T> {
        Err(Error::Format {
            reason: reason.into(),
            source: None,
        })
    }

    /// Creates an input validation error from text.
    pub fn validation<T>(reason: impl Into<String>) -> Result<T> {
        Err(Error::Validation {
            reason: reason.into(),
        })
    }

    /// Returns the kind of the underlying IO error, if there is one.
    pub fn io_kind(&self) -> Option<ErrorKind> {
        match self {
            Error::Io {
                source: Some(source),
                ..
            } => source
                .downcast_ref::<std::io::Error>()
                .map(|err| err.kind()),
            _ => None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Error::Io { reason, .. } => write!(f, "PCD I/O failed: {reason}"),
            Error::Format { reason, .. } => write!(f, "Invalid PCD file: {reason}"),
            Error::Validation { reason } => write!(f, "Invalid input data: {reason}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Io { source, .. } | Error::Format { source, .. } => source
                .as_ref()
                .map(|s| s.as_ref() as &(dyn StdError + 'static)),
            Error::Validation { .. } => None,
        }
    }
}

pub type Result<T> = StdResult<T, Error>;

/// Helper trait for types that can be converted into an Error.
pub(crate) trait Converter<T, E> {
    fn io_err<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;

    fn format_err<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;

    fn validation_err<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;
}

/// Create a library Error from std Error instances.
impl<T, E> Converter<T, E> for StdResult<T, E>
where
    E: StdError + Send + Sync + 'static,
{
    fn io_err<C>(self, reason: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.map_err(|error| Error::Io {
            reason: reason.to_string(),
            source: Some(Box::new(error)),
        })
    }

    fn format_err<C>(self, reason: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.map_err(|error| Error::Format {
            reason: reason.to_string(),
            source: Some(Box::new(error)),
        })
    }

    fn validation_err<C>(self, reason: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.map_err(|error| Error::Validation {
            reason: format!("{reason}: {error}"),
        })
    }
}

/// Create a library Error from Option instances.
impl<T> Converter<T, Infallible> for Option<T> {
    fn io_err<C>(self, reason: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.ok_or_else(|| Error::Io {
            reason: reason.to_string(),
            source: None,
        })
    }

    fn format_err<C>(self, reason: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.ok_or_else(|| Error::Format {
            reason: reason.to_string(),
            source: None,
        })
    }

    fn validation_err<C>(self, reason: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.ok_or_else(|| Error::Validation {
            reason: reason.to_string(),
        })
    }
}
