use crate::validate::MissingFields;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConnectError {
    #[error("github error: {0}")]
    GitHub(String),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("token store error: {0}")]
    Store(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConnectError>;

/// Which outbound lookup a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    Branch,
    Doi,
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LookupKind::Branch => "branch",
            LookupKind::Doi => "doi",
        })
    }
}

/// Errors surfaced to whoever renders the form. Every variant is
/// non-fatal: the form stays usable after reporting it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("{0}")]
    MissingFields(#[from] MissingFields),

    #[error("{0}")]
    Precondition(String),

    #[error("{kind} lookup failed: {message}")]
    Lookup { kind: LookupKind, message: String },

    #[error("creating new dataset failed: {0}")]
    NewDataset(String),

    #[error("already connected")]
    AlreadyConnected,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_error_names_its_kind() {
        let err = FormError::Lookup {
            kind: LookupKind::Doi,
            message: "401 unauthorized".to_string(),
        };
        assert_eq!(err.to_string(), "doi lookup failed: 401 unauthorized");
    }

    #[test]
    fn new_dataset_error_keeps_raw_payload() {
        let err = FormError::NewDataset("boom".to_string());
        assert_eq!(err.to_string(), "creating new dataset failed: boom");
    }
}
