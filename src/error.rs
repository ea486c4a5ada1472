//! Error types for proposal-assist.

/// Top-level error type for the service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Generator error: {0}")]
    Generator(#[from] GeneratorError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Catalog loading and lookup errors.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Catalog directory {0} contains no readable service files")]
    Empty(String),

    #[error("Failed to read catalog file {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Failed to parse catalog file {path}: {reason}")]
    Parse { path: String, reason: String },
}

/// Input validation errors. Recovered locally by re-prompting; never fatal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid email address: {0}")]
    Email(String),

    #[error("Phone input is missing the country separator")]
    MissingCountry,

    #[error("Unknown country: {0}")]
    UnknownCountry(String),

    #[error("Phone number must contain at least {min} digits")]
    TooShort { min: usize },

    #[error("Phone number contains non-numeric characters")]
    NonNumeric,
}

/// Persistence errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Content generator errors.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("Generator is not configured")]
    NotConfigured,

    #[error("Generator request failed: {0}")]
    RequestFailed(String),

    #[error("Generator returned an invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Document rendering errors.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Failed to write document {path}: {reason}")]
    Write { path: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outbound delivery errors.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("Delivery is not configured")]
    NotConfigured,

    #[error("Invalid address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("Failed to read attachment {path}: {reason}")]
    Attachment { path: String, reason: String },

    #[error("SMTP send failed: {0}")]
    Send(String),
}

/// Proposal pipeline errors. Caught and logged at the executor boundary.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Session is missing required field {0}")]
    MissingField(&'static str),

    #[error("Unknown country in session: {0}")]
    UnknownCountry(String),

    #[error("Lead persistence failed: {0}")]
    Persistence(#[from] DatabaseError),

    #[error("Document rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("All deliveries failed: client: {client}; sales: {sales}")]
    AllDeliveriesFailed { client: String, sales: String },
}

/// Result type alias for the service.
pub type Result<T> = std::result::Result<T, Error>;
