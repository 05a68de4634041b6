//! Registry of named file-tree templates.
//!
//! Built-in templates are embedded at compile time. Studios can add or
//! override templates by loading a directory of `*.json` documents, where the
//! file stem is the template name. Once built, the registry is shared
//! read-only.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use super::template::FileTreeTemplate;
use crate::error::CoreError;

/// Template used when a project does not choose one.
pub const DEFAULT_TEMPLATE: &str = "default";

/// Templates shipped with the engine.
pub const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    ("default", include_str!("../../file_trees/default.json")),
    ("simple", include_str!("../../file_trees/simple.json")),
    ("no_preview", include_str!("../../file_trees/no_preview.json")),
];

#[derive(Debug, Clone, Default)]
pub struct FileTreeRegistry {
    templates: HashMap<String, Arc<FileTreeTemplate>>,
}

impl FileTreeRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in templates.
    pub fn with_builtins() -> Result<Self, CoreError> {
        let mut registry = Self::new();
        for (name, json) in BUILTIN_TEMPLATES {
            registry.register_json(name, json)?;
        }
        Ok(registry)
    }

    /// Parse, validate and register a JSON template, replacing any template
    /// with the same name.
    pub fn register_json(&mut self, name: &str, json: &str) -> Result<(), CoreError> {
        let template = FileTreeTemplate::from_json(name, json)?;
        self.register(template);
        Ok(())
    }

    pub fn register(&mut self, template: FileTreeTemplate) {
        let name = template.name().to_string();
        if self.templates.contains_key(&name) {
            tracing::info!(template = %name, "Overriding file tree template");
        }
        self.templates.insert(name, Arc::new(template));
    }

    /// Load every `*.json` file in `dir`. Returns the number of templates loaded.
    ///
    /// Loading stops at the first invalid document so a broken template is
    /// reported at startup rather than when a project first uses it.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, CoreError> {
        let read_error = |e: std::io::Error| CoreError::InvalidTemplate {
            template: dir.display().to_string(),
            reason: e.to_string(),
        };

        let mut paths: Vec<_> = std::fs::read_dir(dir)
            .map_err(read_error)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        for path in &paths {
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let json = std::fs::read_to_string(path).map_err(read_error)?;
            self.register_json(name, &json)?;
            tracing::info!(template = %name, path = %path.display(), "Loaded file tree template");
        }
        Ok(paths.len())
    }

    /// Look up a template by name.
    pub fn get(&self, name: &str) -> Result<Arc<FileTreeTemplate>, CoreError> {
        self.templates
            .get(name)
            .cloned()
            .ok_or_else(|| CoreError::UnknownTemplate(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Registered template names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
