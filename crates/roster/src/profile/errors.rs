use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during profile store operations.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// Database error from sea-orm.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// Profile not found.
    #[error("Profile not found: {id}")]
    NotFound { id: Uuid },

    /// Profile already exists.
    #[error("Profile already exists: {id}")]
    AlreadyExists { id: Uuid },

    /// A stored repository bucket could not be encoded or decoded.
    #[error("Invalid repository snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}

impl ProfileError {
    pub fn not_found(id: Uuid) -> Self {
        Self::NotFound { id }
    }

    /// Whether the error means the profile does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type alias for profile store operations.
pub type Result<T> = std::result::Result<T, ProfileError>;
