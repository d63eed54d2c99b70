//! Error types for skill-suggest.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SuggestError {
    /// A search or refresh was attempted before `initialize()` published a snapshot.
    #[error("skill index not initialized; call initialize() first")]
    NotReady,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("initialization failed: {0}")]
    Initialization(String),

    #[error("skill catalog fetch failed: {0}")]
    CatalogFetch(String),

    #[error("snapshot persistence failed: {0}")]
    Persistence(String),

    #[error("embedding provider unavailable: {0}")]
    EmbeddingProvider(String),

    #[error("role mapping error: {0}")]
    RoleMapping(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("missing configuration: {0}")]
    MissingConfig(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl SuggestError {
    /// Stable machine-readable code used in robot output.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotReady => "not_ready",
            Self::InvalidInput(_) => "invalid_input",
            Self::Initialization(_) => "initialization_failed",
            Self::CatalogFetch(_) => "catalog_fetch_failed",
            Self::Persistence(_) => "persistence_failed",
            Self::EmbeddingProvider(_) => "embedding_unavailable",
            Self::RoleMapping(_) => "role_mapping_failed",
            Self::Config(_) | Self::MissingConfig(_) => "config_error",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Serialization(_) => "serialization_error",
            Self::Io(_) => "io_error",
            Self::Database(_) => "database_error",
            Self::Csv(_) => "csv_error",
        }
    }

    /// Whether a caller may reasonably retry the same operation later.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::NotReady | Self::EmbeddingProvider(_) | Self::CatalogFetch(_)
        )
    }
}

impl From<serde_json::Error> for SuggestError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SuggestError>;
