use super::providers::ProviderError;
use service_core::error::AppError;
use thiserror::Error;

/// Failures reported by a [`Store`](super::Store) implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A referenced node or entity does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A row was rejected by a table constraint.
    #[error("constraint violated: {0}")]
    Constraint(String),

    /// The store could not be reached or returned something unreadable.
    #[error("store unavailable: {0}")]
    Unavailable(#[source] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Unavailable(anyhow::Error::new(err))
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => AppError::NotFound(anyhow::anyhow!("{} not found", what)),
            StoreError::Constraint(msg) => AppError::BadRequest(anyhow::anyhow!(msg)),
            StoreError::Unavailable(e) => AppError::DatabaseError(e),
        }
    }
}

/// Failures of the notify pipeline, in the order the pipeline can hit them.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("node not found")]
    NotFound,

    #[error("invalid node credentials")]
    AuthenticationFailure,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("send to {recipient} failed: {source}")]
    SendFailure {
        recipient: String,
        #[source]
        source: ProviderError,
    },
}

impl NotifyError {
    /// Label used for the notification outcome metric.
    pub fn kind(&self) -> &'static str {
        match self {
            NotifyError::NotFound => "not_found",
            NotifyError::AuthenticationFailure => "unauthorized",
            NotifyError::Store(_) => "store_error",
            NotifyError::SendFailure { .. } => "send_failed",
        }
    }
}

impl From<NotifyError> for AppError {
    fn from(err: NotifyError) -> Self {
        match err {
            NotifyError::NotFound => AppError::NotFound(anyhow::anyhow!("node not found")),
            NotifyError::AuthenticationFailure => {
                AppError::Unauthorized(anyhow::anyhow!("invalid node credentials"))
            }
            NotifyError::Store(e) => AppError::from(e),
            e @ NotifyError::SendFailure { .. } => AppError::EmailError(e.to_string()),
        }
    }
}
