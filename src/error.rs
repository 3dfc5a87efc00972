//! Parse errors
//!
//! Every structural problem is reported as [`Error::Malformed`] and aborts
//! the parse. Handlers stop a parse early by returning [`Error::Handler`].

use std::borrow::Cow;
use std::fmt;

use thiserror::Error;

/// Result alias used by every parser layer and handler callback.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while parsing.
#[derive(Debug, Error)]
pub enum Error {
    /// The input is not a well-formed document for this parser.
    #[error("malformed document{}: {message}", OffsetSuffix(.offset))]
    Malformed {
        message: Cow<'static, str>,
        /// Byte offset where the problem was detected, when known.
        offset: Option<usize>,
    },

    /// A handler aborted the parse.
    #[error("parse aborted by handler: {0}")]
    Handler(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Malformed-document error at a byte offset
    pub fn malformed(message: impl Into<Cow<'static, str>>, offset: usize) -> Self {
        Error::Malformed {
            message: message.into(),
            offset: Some(offset),
        }
    }

    /// Malformed-document error without position information
    pub fn malformed_unpositioned(message: impl Into<Cow<'static, str>>) -> Self {
        Error::Malformed {
            message: message.into(),
            offset: None,
        }
    }

    /// Wrap an application error so it can abort a parse from inside a handler.
    pub fn handler<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Error::Handler(err.into())
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::Malformed { .. })
    }

    /// Byte offset of a malformed-document error, if it has one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::Malformed { offset, .. } => *offset,
            Error::Handler(_) => None,
        }
    }

    /// Message of a malformed-document error.
    pub fn message(&self) -> Option<&str> {
        match self {
            Error::Malformed { message, .. } => Some(message.as_ref()),
            Error::Handler(_) => None,
        }
    }
}

struct OffsetSuffix<'a>(&'a Option<usize>);

impl fmt::Display for OffsetSuffix<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(offset) => write!(f, " at offset {}", offset),
            None => Ok(()),
        }
    }
}
