//! Production entity hierarchy.
//!
//! Entities live in an id-keyed arena with parent references stored as ids.
//! Chain resolution is a bounded walk from an entity up to its root project,
//! so corrupted parent pointers surface as an explicit error instead of an
//! unbounded loop.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum number of entities a parent chain may contain.
pub const MAX_CHAIN_DEPTH: usize = 32;

/// Maximum length of an entity name in characters.
pub const MAX_ENTITY_NAME_LENGTH: usize = 200;

// ---------------------------------------------------------------------------
// Entity types
// ---------------------------------------------------------------------------

/// Kind of node in the production hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Project,
    Episode,
    Sequence,
    Shot,
    Scene,
    AssetType,
    Asset,
}

impl EntityType {
    /// Parse from the database `entity_type` column.
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name {
            "project" => Ok(Self::Project),
            "episode" => Ok(Self::Episode),
            "sequence" => Ok(Self::Sequence),
            "shot" => Ok(Self::Shot),
            "scene" => Ok(Self::Scene),
            "asset_type" => Ok(Self::AssetType),
            "asset" => Ok(Self::Asset),
            other => Err(CoreError::Validation(format!(
                "Unknown entity type '{other}'"
            ))),
        }
    }

    /// Database name value.
    pub fn name(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Episode => "episode",
            Self::Sequence => "sequence",
            Self::Shot => "shot",
            Self::Scene => "scene",
            Self::AssetType => "asset_type",
            Self::Asset => "asset",
        }
    }

    /// Entity types allowed as the direct parent of this type.
    ///
    /// An empty slice means the type is a root.
    pub fn allowed_parents(self) -> &'static [EntityType] {
        match self {
            Self::Project => &[],
            Self::Episode => &[Self::Project],
            Self::Sequence => &[Self::Episode, Self::Project],
            Self::Shot | Self::Scene => &[Self::Sequence],
            Self::AssetType => &[Self::Project],
            Self::Asset => &[Self::AssetType],
        }
    }

    /// Whether assets may be placed into entities of this type.
    pub fn accepts_asset_instances(self) -> bool {
        matches!(self, Self::Shot | Self::Scene)
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Validate that an entity of type `child` may hang below `parent`.
pub fn validate_parent(child: EntityType, parent: Option<EntityType>) -> Result<(), CoreError> {
    let allowed = child.allowed_parents();
    match parent {
        None if allowed.is_empty() => Ok(()),
        None => Err(CoreError::InvalidHierarchy(format!(
            "A {child} requires a parent (one of {allowed:?})"
        ))),
        Some(parent) if allowed.contains(&parent) => Ok(()),
        Some(parent) => Err(CoreError::InvalidHierarchy(format!(
            "A {parent} cannot be the parent of a {child}"
        ))),
    }
}

/// Validate an entity (or any path-forming) name.
///
/// Names become path segments, so they must be non-empty and free of path
/// separators.
pub fn validate_entity_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation(
            "Entity name must not be empty".to_string(),
        ));
    }
    if name.chars().count() > MAX_ENTITY_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Entity name exceeds maximum length of {MAX_ENTITY_NAME_LENGTH} characters"
        )));
    }
    if name.contains(['/', '\\']) {
        return Err(CoreError::Validation(format!(
            "Entity name '{name}' must not contain path separators"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Arena
// ---------------------------------------------------------------------------

/// The hierarchy-relevant part of an entity row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityNode {
    pub id: DbId,
    pub name: String,
    pub entity_type: EntityType,
    pub parent_id: Option<DbId>,
    pub project_id: DbId,
}

/// Id-keyed entity storage.
#[derive(Debug, Default, Clone)]
pub struct EntityArena {
    nodes: HashMap<DbId, EntityNode>,
}

impl EntityArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node: EntityNode) {
        self.nodes.insert(node.id, node);
    }

    pub fn get(&self, id: DbId) -> Option<&EntityNode> {
        self.nodes.get(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Resolve the chain from the root project down to `entity_id`.
    ///
    /// Fails with `NotFound` when the entity or an ancestor is missing,
    /// `CycleDetected` when a parent pointer revisits a node, and
    /// `InvalidHierarchy` when the walk exceeds [`MAX_CHAIN_DEPTH`], an edge
    /// breaks the parent rules, or the root is not a project.
    pub fn resolve_chain(&self, entity_id: DbId) -> Result<EntityChain, CoreError> {
        let mut visited = HashSet::new();
        let mut nodes = Vec::new();
        let mut current = Some(entity_id);

        while let Some(id) = current {
            if nodes.len() >= MAX_CHAIN_DEPTH {
                return Err(CoreError::InvalidHierarchy(format!(
                    "Parent chain of entity {entity_id} exceeds {MAX_CHAIN_DEPTH} levels"
                )));
            }
            if !visited.insert(id) {
                return Err(CoreError::CycleDetected { entity_id });
            }
            let node = self
                .get(id)
                .ok_or(CoreError::NotFound { entity: "Entity", id })?;
            current = node.parent_id;
            nodes.push(node.clone());
        }

        nodes.reverse();
        EntityChain::new(nodes)
    }

    /// Direct children of `entity_id`, optionally filtered by type, ordered by name.
    pub fn children_of(
        &self,
        entity_id: DbId,
        type_filter: Option<EntityType>,
    ) -> Result<Vec<&EntityNode>, CoreError> {
        if self.get(entity_id).is_none() {
            return Err(CoreError::NotFound {
                entity: "Entity",
                id: entity_id,
            });
        }
        let mut children: Vec<&EntityNode> = self
            .nodes
            .values()
            .filter(|n| n.parent_id == Some(entity_id))
            .filter(|n| type_filter.is_none_or(|t| n.entity_type == t))
            .collect();
        children.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(children)
    }
}

impl FromIterator<EntityNode> for EntityArena {
    fn from_iter<I: IntoIterator<Item = EntityNode>>(iter: I) -> Self {
        let mut arena = Self::new();
        for node in iter {
            arena.insert(node);
        }
        arena
    }
}

// ---------------------------------------------------------------------------
// Chain
// ---------------------------------------------------------------------------

/// An ordered, validated chain of entities from the root project down to a leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityChain {
    nodes: Vec<EntityNode>,
}

impl EntityChain {
    /// Build a chain from root-first nodes, checking every parent edge.
    pub fn new(nodes: Vec<EntityNode>) -> Result<Self, CoreError> {
        let root = nodes
            .first()
            .ok_or_else(|| CoreError::InvalidHierarchy("Entity chain is empty".to_string()))?;
        if root.entity_type != EntityType::Project {
            return Err(CoreError::InvalidHierarchy(format!(
                "Chain root {} is a {}, not a project",
                root.id, root.entity_type
            )));
        }
        validate_parent(root.entity_type, None)?;
        for pair in nodes.windows(2) {
            validate_parent(pair[1].entity_type, Some(pair[0].entity_type))?;
        }
        Ok(Self { nodes })
    }

    pub fn nodes(&self) -> &[EntityNode] {
        &self.nodes
    }

    pub fn project(&self) -> &EntityNode {
        &self.nodes[0]
    }

    pub fn leaf(&self) -> &EntityNode {
        &self.nodes[self.nodes.len() - 1]
    }

    /// The nearest entity of the given type, searching from the leaf upward.
    pub fn find(&self, entity_type: EntityType) -> Option<&EntityNode> {
        self.nodes.iter().rev().find(|n| n.entity_type == entity_type)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
