//! Classification of remote failures.

use crate::errors::Error;

/// What a remote failure means for an idempotent lifecycle operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    AlreadyExists,
    NotFound,
    Other,
}

/// Maps an API error to an [`ErrorKind`].
///
/// Only [`Error::RemoteApi`] should ever classify as something other than
/// `Other`; transport and secret failures never mean the resource exists.
pub trait ErrorClassifier: Send + Sync {
    fn classify(&self, error: &Error) -> ErrorKind;
}

impl<F> ErrorClassifier for F
where
    F: Fn(&Error) -> ErrorKind + Send + Sync,
{
    fn classify(&self, error: &Error) -> ErrorKind {
        self(error)
    }
}

/// Default classifier: status code first, then a case-insensitive body match.
///
/// A "not found" body counts only on a 400; 401/403 bodies such as
/// "project not found" stay [`ErrorKind::Other`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringClassifier;

impl ErrorClassifier for SubstringClassifier {
    fn classify(&self, error: &Error) -> ErrorKind {
        let Error::RemoteApi { status, body, .. } = error else {
            return ErrorKind::Other;
        };

        match *status {
            409 => return ErrorKind::AlreadyExists,
            404 => return ErrorKind::NotFound,
            _ => {}
        }

        let body = body.to_lowercase();
        if body.contains("already exists") {
            ErrorKind::AlreadyExists
        } else if *status == 400 && body.contains("not found") {
            ErrorKind::NotFound
        } else {
            ErrorKind::Other
        }
    }
}
