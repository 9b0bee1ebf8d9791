use std::fmt;

use thiserror::Error;
use tracker_core::{ActionFailure, ProjectionError};

use crate::wire::WireError;

/// Server endpoints under the calculation base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Start a calculation; posted to the base URL itself.
    Submit,
    Status,
    Jobs,
    Abort,
    Delete,
    Results,
    GenerateConfig,
    /// Point-to-point link calculation. Lives next to the base URL:
    /// `.../RoadNetwork` becomes `.../SinglePoint`.
    SinglePoint,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Submit => "",
            Route::Status => "status",
            Route::Jobs => "jobs",
            Route::Abort => "abort",
            Route::Delete => "delete",
            Route::Results => "results",
            Route::GenerateConfig => "generateConfig",
            Route::SinglePoint => "SinglePoint",
        }
    }

    /// Whether the path replaces the last segment of the base URL instead of
    /// being appended to it.
    pub fn is_sibling(self) -> bool {
        matches!(self, Route::SinglePoint)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Submit => f.write_str("submit"),
            other => f.write_str(other.path()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    /// `{ "error": message }` from the server.
    #[error("{0}")]
    Server(String),
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("timeout")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid response body: {0}")]
    Decode(String),
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

impl RpcError {
    pub fn is_structured(&self) -> bool {
        matches!(self, RpcError::Server(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    MissingApiKey,
    InvalidParameters,
    NoStationsSelected,
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockReason::MissingApiKey => write!(f, "no api key configured"),
            BlockReason::InvalidParameters => write!(f, "calculation parameters have errors"),
            BlockReason::NoStationsSelected => write!(f, "no stations selected"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActionError {
    /// Refused locally; nothing was sent.
    #[error("action blocked: {0}")]
    Blocked(BlockReason),
    /// Structured server error, meant for the user.
    #[error("{0}")]
    Server(String),
    #[error("transport failure: {0}")]
    Transport(RpcError),
    #[error("unexpected response: {0}")]
    Decode(#[from] WireError),
    #[error("projection failed: {0}")]
    Projection(#[from] ProjectionError),
}

impl ActionError {
    pub fn is_structured(&self) -> bool {
        matches!(self, ActionError::Server(_))
    }

    pub(crate) fn to_failure(&self) -> ActionFailure {
        match self {
            ActionError::Server(message) => ActionFailure::Server(message.clone()),
            other => ActionFailure::Transport(other.to_string()),
        }
    }
}

impl From<RpcError> for ActionError {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::Server(message) => ActionError::Server(message),
            other => ActionError::Transport(other),
        }
    }
}
