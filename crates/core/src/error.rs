use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Invalid hierarchy: {0}")]
    InvalidHierarchy(String),

    #[error("Cycle detected in parent chain of entity {entity_id}")]
    CycleDetected { entity_id: DbId },

    #[error("Unknown file tree template: {0}")]
    UnknownTemplate(String),

    #[error("Missing token <{token}> in {context}")]
    MissingToken { token: &'static str, context: String },

    #[error("Invalid file tree template '{template}': {reason}")]
    InvalidTemplate { template: String, reason: String },

    #[error("Allocation conflict persisted after {attempts} attempts")]
    AllocationConflict { attempts: u32 },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Whether the error is a transient storage conflict rather than a caller
    /// or configuration mistake.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::AllocationConflict { .. })
    }
}
