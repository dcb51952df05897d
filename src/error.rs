use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Service {0} not found")]
    NotFound(String),

    #[error("No services are installed by default")]
    NoDefault,

    #[error("Service {0} already exists")]
    AlreadyExists(String),

    #[error("Can't destroy default service {0} without --force")]
    ProtectedDefault(String),

    #[error("Aborted")]
    Aborted,

    #[error("Invalid service name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("Image must not be empty")]
    InvalidImage,

    /// Container runtime or config store failure, passed through unchanged
    #[error(transparent)]
    Runtime(#[from] anyhow::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
