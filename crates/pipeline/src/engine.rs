use std::sync::Arc;

use kinetrack_core::file_tree::FileTreeRegistry;
use kinetrack_core::revision::RetryPolicy;
use kinetrack_db::DbPool;

use crate::config::PipelineConfig;
use crate::error::PipelineResult;

/// Entry point for hierarchy, revision, path, and breakdown operations.
///
/// Cheap to clone: the pool and the template registry are shared. Operations
/// live in sibling modules as `impl FileEngine` blocks.
#[derive(Debug, Clone)]
pub struct FileEngine {
    pub(crate) pool: DbPool,
    pub(crate) registry: Arc<FileTreeRegistry>,
    pub(crate) retry: RetryPolicy,
}

impl FileEngine {
    pub fn new(pool: DbPool, registry: Arc<FileTreeRegistry>) -> Self {
        Self {
            pool,
            registry,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Connect to the database and load the template registry described by
    /// `config`.
    pub async fn connect(config: &PipelineConfig) -> PipelineResult<Self> {
        let registry = build_registry(config)?;
        let pool = kinetrack_db::create_pool(&config.database_url, config.max_connections).await?;
        tracing::info!(
            max_connections = config.max_connections,
            templates = registry.names().len(),
            "File engine connected"
        );
        Ok(Self::new(pool, Arc::new(registry)).with_retry_policy(config.retry))
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn registry(&self) -> &FileTreeRegistry {
        &self.registry
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }
}

/// Built-in templates plus the optional template directory.
pub fn build_registry(config: &PipelineConfig) -> PipelineResult<FileTreeRegistry> {
    let mut registry = FileTreeRegistry::with_builtins()?;
    if let Some(dir) = &config.file_tree_dir {
        let loaded = registry.load_dir(dir)?;
        tracing::info!(dir = %dir.display(), loaded, "Loaded file tree directory");
    }
    Ok(registry)
}
