//! File-tree templates and path resolution.
//!
//! A project selects a named template at creation. The template holds one
//! section per [`FileKind`], each with folder and file-name patterns per
//! [`EntityRole`]. Patterns are parsed and validated when the template is
//! loaded, so resolution only substitutes values.

pub mod context;
pub mod pattern;
pub mod registry;
pub mod resolve;
pub mod template;
pub mod token;

use serde::{Deserialize, Serialize};

use crate::hierarchy::EntityType;

pub use context::{FileContext, FileVariant, InstanceContext, TokenValues};
pub use pattern::Pattern;
pub use registry::{FileTreeRegistry, DEFAULT_TEMPLATE};
pub use resolve::{join_folder, resolve_path, ResolvedPath};
pub use template::{FileTreeDocument, FileTreeTemplate, SectionDocument, TreeSection};
pub use token::{Availability, OptionalGroup, Token};

/// Width revision numbers are zero-padded to, so lexical order matches numeric order.
pub const REVISION_PADDING: usize = 3;

/// Which tree a file revision lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Working,
    Output,
}

impl FileKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Working => "working",
            Self::Output => "output",
        }
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The pattern family an entity's files are laid out with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityRole {
    Asset,
    Shot,
    Sequence,
    Scene,
}

impl EntityRole {
    pub const ALL: [EntityRole; 4] = [Self::Asset, Self::Shot, Self::Sequence, Self::Scene];

    /// Role for files attached to an entity of the given type, if any.
    pub fn for_entity_type(entity_type: EntityType) -> Option<Self> {
        match entity_type {
            EntityType::Asset => Some(Self::Asset),
            EntityType::Shot => Some(Self::Shot),
            EntityType::Sequence => Some(Self::Sequence),
            EntityType::Scene => Some(Self::Scene),
            EntityType::Project | EntityType::Episode | EntityType::AssetType => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Shot => "shot",
            Self::Sequence => "sequence",
            Self::Scene => "scene",
        }
    }
}

impl std::fmt::Display for EntityRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Case transformation applied to substituted catalog names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameStyle {
    #[default]
    AsIs,
    Lowercase,
    Uppercase,
}

impl NameStyle {
    pub fn apply(self, value: &str) -> String {
        match self {
            Self::AsIs => value.to_string(),
            Self::Lowercase => value.to_lowercase(),
            Self::Uppercase => value.to_uppercase(),
        }
    }
}
