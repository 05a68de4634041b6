use kinetrack_core::error::CoreError;

/// Error type for engine operations.
///
/// Wraps [`CoreError`] for domain errors and keeps raw database errors so
/// the retry loop can classify them.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A domain-level error from `kinetrack_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

impl PipelineError {
    /// Whether a fresh attempt of the same unit of work may succeed.
    ///
    /// Only storage conflicts qualify. Domain errors never do.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Database(err) => kinetrack_db::is_retryable_conflict(err),
            Self::Core(_) => false,
        }
    }

    /// Classify an error from an insert.
    ///
    /// Unique violations on naming constraints become [`CoreError::Conflict`];
    /// allocation races stay raw so they are retried.
    pub(crate) fn from_write(err: sqlx::Error) -> Self {
        if kinetrack_db::is_retryable_conflict(&err) {
            return Self::Database(err);
        }
        let conflict = kinetrack_db::unique_violation(&err)
            .filter(|constraint| constraint.starts_with("uq_"))
            .map(|constraint| format!("Duplicate value violates unique constraint: {constraint}"));
        match conflict {
            Some(message) => Self::Core(CoreError::Conflict(message)),
            None => Self::Database(err),
        }
    }
}

impl From<validator::ValidationErrors> for PipelineError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Core(CoreError::Validation(errors.to_string()))
    }
}

/// Turn a missing row into [`CoreError::NotFound`].
pub(crate) fn found<T>(row: Option<T>, entity: &'static str, id: i64) -> PipelineResult<T> {
    row.ok_or(PipelineError::Core(CoreError::NotFound { entity, id }))
}
