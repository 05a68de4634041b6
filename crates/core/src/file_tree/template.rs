//! Template documents and their load-time validation.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Deserialize;

use super::pattern::Pattern;
use super::token::{Availability, OptionalGroup, Token};
use super::{EntityRole, FileKind, NameStyle};
use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

/// A template as written on disk.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileTreeDocument {
    pub working: SectionDocument,
    pub output: SectionDocument,
}

/// One file kind's part of a template document.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SectionDocument {
    #[serde(default)]
    pub mountpoint: String,
    #[serde(default)]
    pub root: String,
    #[serde(default)]
    pub style: NameStyle,
    pub folder_path: HashMap<EntityRole, String>,
    pub file_name: HashMap<EntityRole, String>,
}

// ---------------------------------------------------------------------------
// Compiled templates
// ---------------------------------------------------------------------------

/// Folder and file-name patterns for one role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolePatterns {
    pub folder: Pattern,
    pub file_name: Pattern,
}

/// A validated section of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeSection {
    mountpoint: String,
    root: String,
    style: NameStyle,
    patterns: HashMap<EntityRole, RolePatterns>,
}

impl TreeSection {
    pub fn mountpoint(&self) -> &str {
        &self.mountpoint
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn style(&self) -> NameStyle {
        self.style
    }

    pub fn patterns(&self, role: EntityRole) -> Option<&RolePatterns> {
        self.patterns.get(&role)
    }

    /// Roles this section has patterns for, in declaration-independent order.
    pub fn roles(&self) -> Vec<EntityRole> {
        let mut roles: Vec<EntityRole> = self.patterns.keys().copied().collect();
        roles.sort();
        roles
    }
}

/// A named, validated, immutable file-tree template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTreeTemplate {
    name: String,
    working: TreeSection,
    output: TreeSection,
}

impl FileTreeTemplate {
    /// Parse and validate a JSON template document.
    pub fn from_json(name: &str, json: &str) -> Result<Self, CoreError> {
        let document: FileTreeDocument =
            serde_json::from_str(json).map_err(|e| CoreError::InvalidTemplate {
                template: name.to_string(),
                reason: e.to_string(),
            })?;
        Self::compile(name, document)
    }

    /// Validate a document and compile its patterns.
    ///
    /// Every token a pattern references must be available for the pattern's
    /// kind and role (`MissingToken` otherwise), and each role must reference
    /// all of its disambiguating tokens (`InvalidTemplate` otherwise).
    ///
    /// Optional tokens whose presence distinguishes revision keys must also
    /// own a folder component, so that dropping them always removes whole
    /// folders and never just text a logical name could reproduce.
    pub fn compile(name: &str, document: FileTreeDocument) -> Result<Self, CoreError> {
        if name.trim().is_empty() {
            return Err(CoreError::InvalidTemplate {
                template: name.to_string(),
                reason: "template name must not be empty".to_string(),
            });
        }
        Ok(Self {
            name: name.to_string(),
            working: compile_section(name, FileKind::Working, document.working)?,
            output: compile_section(name, FileKind::Output, document.output)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn section(&self, kind: FileKind) -> &TreeSection {
        match kind {
            FileKind::Working => &self.working,
            FileKind::Output => &self.output,
        }
    }
}

fn compile_section(
    template: &str,
    kind: FileKind,
    document: SectionDocument,
) -> Result<TreeSection, CoreError> {
    let invalid = |reason: String| CoreError::InvalidTemplate {
        template: template.to_string(),
        reason,
    };

    for (label, value) in [("mountpoint", &document.mountpoint), ("root", &document.root)] {
        if value.contains(['<', '>']) {
            return Err(invalid(format!("{kind} {label} must not contain tokens")));
        }
    }

    let roles: BTreeSet<EntityRole> = document
        .folder_path
        .keys()
        .chain(document.file_name.keys())
        .copied()
        .collect();
    if roles.is_empty() {
        return Err(invalid(format!("{kind} section declares no patterns")));
    }

    let mut patterns = HashMap::new();
    for role in roles {
        let (Some(folder_src), Some(file_src)) =
            (document.folder_path.get(&role), document.file_name.get(&role))
        else {
            return Err(invalid(format!(
                "{kind} {role} needs both a folder_path and a file_name pattern"
            )));
        };

        let folder = Pattern::parse(folder_src)
            .map_err(|reason| invalid(format!("{kind} {role} folder_path: {reason}")))?;
        let file_name = Pattern::parse(file_src)
            .map_err(|reason| invalid(format!("{kind} {role} file_name: {reason}")))?;
        if file_name.uses_separator('/') {
            return Err(invalid(format!(
                "{kind} {role} file_name must not contain '/'"
            )));
        }

        let used: BTreeSet<Token> = folder.tokens().union(&file_name.tokens()).copied().collect();
        for token in &used {
            if token.availability(kind, role) == Availability::Unavailable {
                return Err(CoreError::MissingToken {
                    token: token.name(),
                    context: format!("template '{template}' {kind} {role} pattern"),
                });
            }
        }
        for token in Token::disambiguating(kind, role) {
            if !used.contains(&token) {
                return Err(invalid(format!(
                    "{kind} {role} patterns must include {token} to keep paths unique"
                )));
            }
        }

        check_optional_components(kind, role, &folder, &file_name)
            .map_err(|reason| invalid(format!("{kind} {role} {reason}")))?;

        patterns.insert(role, RolePatterns { folder, file_name });
    }

    Ok(TreeSection {
        mountpoint: document.mountpoint,
        root: document.root,
        style: document.style,
        patterns,
    })
}

/// Check how absent optional tokens change a role's folder structure.
///
/// A folder component made only of one group's tokens vanishes exactly when
/// the group is absent. Every keyed group needs at least one such component,
/// and the numbers of components the groups own must not add up the same way
/// twice, so each combination of present groups yields a different folder
/// depth. Any other component holding an optional token must start with a
/// segment that never drops, or its `/` would be lost with it.
fn check_optional_components(
    kind: FileKind,
    role: EntityRole,
    folder: &Pattern,
    file_name: &Pattern,
) -> Result<(), String> {
    let group_of = |token: &Token| token.optional_group(kind, role);
    let mut owned: BTreeMap<OptionalGroup, usize> = BTreeMap::new();

    for component in folder.components() {
        let groups: BTreeSet<OptionalGroup> =
            component.iter().flatten().filter_map(group_of).collect();
        let Some(&group) = groups.first() else {
            continue;
        };
        let isolated = groups.len() == 1
            && component
                .iter()
                .all(|segment| !segment.is_empty() && segment.iter().all(|t| group_of(t).is_some()));
        if isolated {
            *owned.entry(group).or_default() += 1;
            continue;
        }
        let anchored = component
            .first()
            .is_some_and(|segment| segment.is_empty() || segment.iter().any(|t| group_of(t).is_none()));
        if !anchored {
            return Err(format!(
                "folder_path component must start with a required token or text when it mixes optional tokens ('{}')",
                folder.source()
            ));
        }
    }

    let used: BTreeSet<OptionalGroup> = folder
        .tokens()
        .union(&file_name.tokens())
        .filter_map(group_of)
        .filter(|group| group.is_keyed())
        .collect();
    for group in used {
        if !owned.contains_key(&group) {
            return Err(format!(
                "folder_path needs a component holding only {} tokens to keep paths unique",
                group.name()
            ));
        }
    }

    let counts: Vec<usize> = owned.into_values().collect();
    let mut depths = BTreeSet::new();
    for mask in 0..(1u32 << counts.len()) {
        let depth: usize = counts
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, count)| count)
            .sum();
        if !depths.insert(depth) {
            return Err(
                "optional folder components of different groups must not add up to the same depth"
                    .to_string(),
            );
        }
    }
    Ok(())
}
