//! Unified error type.

use std::fmt;

/// The error type returned by the queue's fallible operations.
///
/// Only relational insertion can fail. Positional insertion clamps its
/// index and [`insert_after`](crate::MiddlewareQueue::insert_after) falls
/// back to appending, so neither surfaces an `Error`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// No queued entry carries the requested type identifier.
    NotFound { type_name: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { type_name } => {
                write!(f, "no middleware matching `{type_name}` could be found")
            }
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_the_identifier() {
        let err = Error::NotFound { type_name: "InvalidClassName".to_owned() };
        assert_eq!(
            err.to_string(),
            "no middleware matching `InvalidClassName` could be found",
        );
    }
}
