//! Revision keys and allocation retry policy.
//!
//! Revisions count per (entity, task, logical name, variant). The variant is
//! the software for working files, or the output type plus optional asset
//! instance for output files.

use std::time::Duration;

use serde::Serialize;

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Logical file name used when the caller does not give one.
pub const DEFAULT_FILE_NAME: &str = "main";

/// Maximum length of a logical file name.
pub const MAX_FILE_NAME_LENGTH: usize = 100;

/// Maximum length of a revision comment.
pub const MAX_COMMENT_LENGTH: usize = 5_000;

/// Default number of attempts for an allocate-and-insert unit.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default backoff before the second attempt.
pub const DEFAULT_RETRY_BASE: Duration = Duration::from_millis(10);

/// Upper bound for a single backoff.
pub const DEFAULT_RETRY_MAX: Duration = Duration::from_millis(200);

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// The part of a revision key that separates parallel lines of files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VariantKey {
    Software {
        software_id: DbId,
    },
    Output {
        output_type_id: DbId,
        asset_instance_id: Option<DbId>,
    },
}

impl VariantKey {
    /// Stable textual form stored alongside counters and file rows.
    pub fn as_key(&self) -> String {
        match self {
            Self::Software { software_id } => format!("software:{software_id}"),
            Self::Output {
                output_type_id,
                asset_instance_id: None,
            } => format!("output:{output_type_id}"),
            Self::Output {
                output_type_id,
                asset_instance_id: Some(instance_id),
            } => format!("output:{output_type_id}:instance:{instance_id}"),
        }
    }
}

/// Full key of a revision lineage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RevisionKey {
    pub entity_id: DbId,
    pub task_id: DbId,
    pub name: String,
    pub variant: VariantKey,
}

/// Validate a logical file name: non-empty, bounded, free of separators
/// and dots.
pub fn validate_file_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation(
            "File name must not be empty".to_string(),
        ));
    }
    if name.len() > MAX_FILE_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "File name exceeds maximum length of {MAX_FILE_NAME_LENGTH} characters (got {})",
            name.len()
        )));
    }
    if name.contains(['/', '\\']) {
        return Err(CoreError::Validation(format!(
            "File name '{name}' must not contain path separators"
        )));
    }
    if name.contains('.') {
        return Err(CoreError::Validation(format!(
            "File name '{name}' must not contain '.'"
        )));
    }
    Ok(())
}

/// Validate an output representation (the file extension of a published
/// file): a single dot-free path component.
pub fn validate_representation(representation: &str) -> Result<(), CoreError> {
    if representation.trim().is_empty() {
        return Err(CoreError::Validation(
            "Representation must not be empty".to_string(),
        ));
    }
    if representation.contains(['/', '\\', '.']) {
        return Err(CoreError::Validation(format!(
            "Representation '{representation}' must not contain '.' or path separators"
        )));
    }
    Ok(())
}

/// Validate a revision comment: length check only.
pub fn validate_comment(comment: &str) -> Result<(), CoreError> {
    if comment.len() > MAX_COMMENT_LENGTH {
        return Err(CoreError::Validation(format!(
            "Comment exceeds maximum length of {MAX_COMMENT_LENGTH} characters (got {})",
            comment.len()
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Retry policy
// ---------------------------------------------------------------------------

/// Bounded exponential backoff for transient allocation conflicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_RETRY_BASE,
            max_delay: DEFAULT_RETRY_MAX,
        }
    }
}

impl RetryPolicy {
    /// Delay before the attempt following `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.max_attempts == 0 {
            return Err(CoreError::Validation(
                "Allocation retry policy needs at least one attempt".to_string(),
            ));
        }
        if self.base_delay > self.max_delay {
            return Err(CoreError::Validation(
                "Allocation retry base delay exceeds the maximum delay".to_string(),
            ));
        }
        Ok(())
    }
}
