use std::fmt;

#[derive(Debug, Clone)]
pub enum AfftrackError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    Validation(String),
    NotFound(String),
    Serialization(String),
    InvalidSignature(String),
    InvalidAmount(String),
    InsufficientFunds(String),
    Conflict(String),
}

impl AfftrackError {
    /// Stable error code for logs and API payloads
    pub fn code(&self) -> &'static str {
        match self {
            AfftrackError::DatabaseConfig(_) => "E001",
            AfftrackError::DatabaseConnection(_) => "E002",
            AfftrackError::DatabaseOperation(_) => "E003",
            AfftrackError::Validation(_) => "E004",
            AfftrackError::NotFound(_) => "E005",
            AfftrackError::Serialization(_) => "E006",
            AfftrackError::InvalidSignature(_) => "E007",
            AfftrackError::InvalidAmount(_) => "E008",
            AfftrackError::InsufficientFunds(_) => "E009",
            AfftrackError::Conflict(_) => "E010",
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            AfftrackError::DatabaseConfig(_) => "Database Configuration Error",
            AfftrackError::DatabaseConnection(_) => "Database Connection Error",
            AfftrackError::DatabaseOperation(_) => "Database Operation Error",
            AfftrackError::Validation(_) => "Validation Error",
            AfftrackError::NotFound(_) => "Resource Not Found",
            AfftrackError::Serialization(_) => "Serialization Error",
            AfftrackError::InvalidSignature(_) => "Invalid Webhook Signature",
            AfftrackError::InvalidAmount(_) => "Invalid Amount",
            AfftrackError::InsufficientFunds(_) => "Insufficient Funds",
            AfftrackError::Conflict(_) => "State Conflict",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AfftrackError::DatabaseConfig(msg)
            | AfftrackError::DatabaseConnection(msg)
            | AfftrackError::DatabaseOperation(msg)
            | AfftrackError::Validation(msg)
            | AfftrackError::NotFound(msg)
            | AfftrackError::Serialization(msg)
            | AfftrackError::InvalidSignature(msg)
            | AfftrackError::InvalidAmount(msg)
            | AfftrackError::InsufficientFunds(msg)
            | AfftrackError::Conflict(msg) => msg,
        }
    }

    /// Storage failures are retryable by webhook senders; everything else is
    /// terminal for the current call.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AfftrackError::DatabaseConnection(_) | AfftrackError::DatabaseOperation(_)
        )
    }
}

impl fmt::Display for AfftrackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_type(), self.message())
    }
}

impl std::error::Error for AfftrackError {}

impl AfftrackError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        AfftrackError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        AfftrackError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        AfftrackError::DatabaseOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        AfftrackError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        AfftrackError::NotFound(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        AfftrackError::Serialization(msg.into())
    }

    pub fn invalid_signature<T: Into<String>>(msg: T) -> Self {
        AfftrackError::InvalidSignature(msg.into())
    }

    pub fn invalid_amount<T: Into<String>>(msg: T) -> Self {
        AfftrackError::InvalidAmount(msg.into())
    }

    pub fn insufficient_funds<T: Into<String>>(msg: T) -> Self {
        AfftrackError::InsufficientFunds(msg.into())
    }

    pub fn conflict<T: Into<String>>(msg: T) -> Self {
        AfftrackError::Conflict(msg.into())
    }
}

impl From<sea_orm::DbErr> for AfftrackError {
    fn from(err: sea_orm::DbErr) -> Self {
        AfftrackError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for AfftrackError {
    fn from(err: std::io::Error) -> Self {
        AfftrackError::DatabaseOperation(err.to_string())
    }
}

impl From<serde_json::Error> for AfftrackError {
    fn from(err: serde_json::Error) -> Self {
        AfftrackError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AfftrackError>;
