//! Typed error hierarchy for suds.
//!
//! - `ApiError`: REST and push-stream failures (transport or server-rejected)
//! - `BoardError`: failures surfaced by board session operations
//! - `ConfigError`: loading and saving `suds.toml`

use std::path::PathBuf;

use suds_common::{TaskId, TaskValidationError};
use thiserror::Error;

/// Errors from talking to the shop backend.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request {method} {url} failed: {source}")]
    Transport {
        method: String,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Server rejected {method} {url} with status {status}: {body}")]
    Rejected {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Push stream {url} broke: {message}")]
    Stream { url: String, message: String },

    #[error("Invalid API base URL '{0}'")]
    InvalidUrl(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl ApiError {
    /// Status code for server-rejected requests.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the request never got an answer from the server.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport { .. } | ApiError::Stream { .. })
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Errors returned by `BoardSession` operations that the operator must see.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Invalid task: {0}")]
    InvalidTask(#[from] TaskValidationError),

    #[error("Unknown column '{0}' (expected one of todo, in-progress, done, delivery)")]
    UnknownColumn(String),

    #[error("Task {id} is not on the board")]
    TaskNotFound { id: TaskId },
}

/// Errors from configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[source] toml::ser::Error),

    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected(status: u16) -> ApiError {
        ApiError::Rejected {
            method: "PATCH".to_string(),
            url: "http://localhost/api/kanban/move".to_string(),
            status,
            body: "{\"error\":\"nope\"}".to_string(),
        }
    }

    #[test]
    fn api_error_rejected_carries_status() {
        let err = rejected(422);
        assert_eq!(err.status(), Some(422));
        assert!(!err.is_transport());
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("422"));
        assert!(err.to_string().contains("PATCH"));
    }

    #[test]
    fn api_error_not_found_is_detected() {
        assert!(rejected(404).is_not_found());
    }

    #[test]
    fn api_error_stream_counts_as_transport() {
        let err = ApiError::Stream {
            url: "http://localhost/api/events".to_string(),
            message: "connection reset".to_string(),
        };
        assert!(err.is_transport());
        assert_eq!(err.status(), None);
    }

    #[test]
    fn board_error_converts_from_api_error() {
        let err: BoardError = rejected(500).into();
        match &err {
            BoardError::Api(ApiError::Rejected { status, .. }) => assert_eq!(*status, 500),
            _ => panic!("Expected BoardError::Api(Rejected)"),
        }
    }

    #[test]
    fn board_error_converts_from_validation_error() {
        let err: BoardError = TaskValidationError::EmptyTitle.into();
        assert!(matches!(err, BoardError::InvalidTask(TaskValidationError::EmptyTitle)));
    }

    #[test]
    fn board_error_unknown_column_lists_choices() {
        let err = BoardError::UnknownColumn("archived".to_string());
        assert!(err.to_string().contains("'archived'"));
        assert!(err.to_string().contains("in-progress"));
    }

    #[test]
    fn all_error_types_implement_std_error_trait() {
        fn assert_std_error<E: std::error::Error>(_: &E) {}
        assert_std_error(&rejected(400));
        assert_std_error(&BoardError::TaskNotFound { id: "t1".into() });
        assert_std_error(&ConfigError::Read {
            path: PathBuf::from("/nope"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        });
    }
}
