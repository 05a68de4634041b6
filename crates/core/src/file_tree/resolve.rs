//! Path resolution for a single file revision.

use serde::Serialize;

use super::context::{FileContext, TokenValues};
use super::template::FileTreeTemplate;
use super::token::Availability;
use super::EntityRole;
use crate::error::CoreError;

/// Canonical on-disk location of a file revision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResolvedPath {
    pub folder: String,
    pub file_name: String,
}

impl ResolvedPath {
    pub fn full_path(&self) -> String {
        if self.folder.is_empty() {
            self.file_name.clone()
        } else {
            format!("{}/{}", self.folder, self.file_name)
        }
    }
}

/// Resolve the folder and file name for `ctx` under `template`.
///
/// Pure: the same template and context always yield the same path.
pub fn resolve_path(template: &FileTreeTemplate, ctx: &FileContext) -> Result<ResolvedPath, CoreError> {
    if ctx.revision < 1 {
        return Err(CoreError::Validation(format!(
            "Revision must be positive (got {})",
            ctx.revision
        )));
    }

    let kind = ctx.variant.kind();
    let leaf = ctx.chain.leaf();
    let role = EntityRole::for_entity_type(leaf.entity_type).ok_or_else(|| {
        CoreError::Validation(format!(
            "Files cannot be attached to a {} ({})",
            leaf.entity_type, leaf.name
        ))
    })?;

    let section = template.section(kind);
    let patterns = section.patterns(role).ok_or_else(|| {
        CoreError::UnknownTemplate(format!(
            "template '{}' has no {kind} pattern for {role}",
            template.name()
        ))
    })?;

    let values = TokenValues::from_context(ctx, section.style())?;
    let is_optional = |token: super::Token| token.availability(kind, role) == Availability::Optional;
    let context = format!("template '{}' {kind} {role} pattern", template.name());

    let folder_path = patterns.folder.render(&values, is_optional, &context)?;
    let file_name = patterns.file_name.render(&values, is_optional, &context)?;

    Ok(ResolvedPath {
        folder: join_folder(&[section.mountpoint(), section.root(), &folder_path]),
        file_name,
    })
}

/// Join folder parts with a single `/`, dropping empty segments.
///
/// The result is absolute when the first non-empty part starts with `/`.
pub fn join_folder(parts: &[&str]) -> String {
    let absolute = parts
        .iter()
        .find(|p| !p.is_empty())
        .is_some_and(|p| p.starts_with('/'));
    let joined = parts
        .iter()
        .flat_map(|p| p.split('/'))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    if absolute {
        format!("/{joined}")
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use assert_matches::assert_matches;

    use super::*;
    use crate::file_tree::context::{FileVariant, InstanceContext};
    use crate::file_tree::registry::FileTreeRegistry;
    use crate::hierarchy::{EntityArena, EntityNode, EntityType};
    use crate::types::DbId;

    fn node(id: DbId, name: &str, entity_type: EntityType, parent_id: Option<DbId>) -> EntityNode {
        EntityNode {
            id,
            name: name.to_string(),
            entity_type,
            parent_id,
            project_id: 1,
        }
    }

    fn arena() -> EntityArena {
        [
            node(1, "Alpha", EntityType::Project, None),
            node(2, "E01", EntityType::Episode, Some(1)),
            node(3, "S01", EntityType::Sequence, Some(2)),
            node(4, "SH01", EntityType::Shot, Some(3)),
            node(5, "S02", EntityType::Sequence, Some(1)),
            node(6, "SH10", EntityType::Shot, Some(5)),
            node(7, "Characters", EntityType::AssetType, Some(1)),
            node(8, "Rabbit", EntityType::Asset, Some(7)),
            node(9, "Characters", EntityType::AssetType, Some(1)),
        ]
        .into_iter()
        .collect()
    }

    fn working(entity_id: DbId, revision: i32, software: &str) -> FileContext {
        FileContext {
            chain: arena().resolve_chain(entity_id).unwrap(),
            task_type: "Animation".to_string(),
            task: "main".to_string(),
            name: "main".to_string(),
            revision,
            variant: FileVariant::Working {
                software: software.to_string(),
                extension: "blend".to_string(),
            },
        }
    }

    fn output(entity_id: DbId, output_type: &str, instance: Option<InstanceContext>) -> FileContext {
        FileContext {
            variant: FileVariant::Output {
                output_type: output_type.to_string(),
                representation: Some("abc".to_string()),
                instance,
            },
            ..working(entity_id, 1, "blender")
        }
    }

    fn template(name: &str) -> std::sync::Arc<FileTreeTemplate> {
        FileTreeRegistry::with_builtins().unwrap().get(name).unwrap()
    }

    #[test]
    fn default_template_scenario_revisions() {
        let template = template("default");
        let paths: Vec<ResolvedPath> = (1..=3)
            .map(|rev| resolve_path(&template, &working(4, rev, "blender")).unwrap())
            .collect();

        for (path, padded) in paths.iter().zip(["v001", "v002", "v003"]) {
            let full = path.full_path();
            assert!(full.contains("/Alpha/"), "{full}");
            assert!(full.contains("/E01/S01/SH01/"), "{full}");
            assert!(path.file_name.contains(&format!("main.{padded}")), "{full}");
        }
        let unique: HashSet<String> = paths.iter().map(ResolvedPath::full_path).collect();
        assert_eq!(unique.len(), 3);
    }

    #[test]
    fn default_template_exact_path() {
        let path = resolve_path(&template("default"), &working(4, 1, "blender")).unwrap();
        assert_eq!(
            path.folder,
            "/productions/working/Alpha/shots/E01/S01/SH01/Animation/blender"
        );
        assert_eq!(path.file_name, "Alpha_E01_S01_SH01_Animation_main.v001.blend");
    }

    #[test]
    fn missing_episode_collapses_separators() {
        for name in ["default", "simple", "no_preview"] {
            let path = resolve_path(&template(name), &working(6, 1, "blender")).unwrap();
            let full = path.full_path();
            assert!(!full.contains("//"), "{name}: {full}");
            assert!(!full.contains("__"), "{name}: {full}");
            assert!(!full.to_lowercase().contains("e01"), "{name}: {full}");
            assert!(full.to_lowercase().contains("s02"), "{name}: {full}");
        }
    }

    #[test]
    fn resolution_is_deterministic() {
        let template = template("default");
        let ctx = working(4, 12, "blender");
        assert_eq!(
            resolve_path(&template, &ctx).unwrap(),
            resolve_path(&template, &ctx).unwrap()
        );
    }

    #[test]
    fn different_software_never_collides() {
        for name in ["default", "simple", "no_preview"] {
            let template = template(name);
            let a = resolve_path(&template, &working(4, 1, "blender")).unwrap();
            let b = resolve_path(&template, &working(4, 1, "maya")).unwrap();
            assert_ne!(a.full_path(), b.full_path(), "{name}");
        }
    }

    #[test]
    fn different_output_types_never_collide() {
        for name in ["default", "simple", "no_preview"] {
            let template = template(name);
            let a = resolve_path(&template, &output(4, "cache", None)).unwrap();
            let b = resolve_path(&template, &output(4, "render", None)).unwrap();
            assert_ne!(a.full_path(), b.full_path(), "{name}");
        }
    }

    #[test]
    fn instance_outputs_are_distinct() {
        let template = template("default");
        let instance = |number| {
            Some(InstanceContext {
                asset_type: "Characters".to_string(),
                asset: "Rabbit".to_string(),
                number,
            })
        };
        let plain = resolve_path(&template, &output(4, "cache", None)).unwrap();
        let first = resolve_path(&template, &output(4, "cache", instance(1))).unwrap();
        let second = resolve_path(&template, &output(4, "cache", instance(2))).unwrap();

        assert!(first.full_path().contains("Rabbit_0001"), "{}", first.full_path());
        assert!(second.full_path().contains("/Rabbit/0002"), "{}", second.full_path());
        let unique: HashSet<String> =
            [&plain, &first, &second].iter().map(|p| p.full_path()).collect();
        assert_eq!(unique.len(), 3);
        assert!(!plain.full_path().contains("__"));
    }

    #[test]
    fn output_without_representation_drops_extension() {
        let mut ctx = output(8, "cache", None);
        if let FileVariant::Output { representation, .. } = &mut ctx.variant {
            *representation = None;
        }
        let path = resolve_path(&template("default"), &ctx).unwrap();
        assert!(path.file_name.ends_with("main.v001"), "{}", path.file_name);
    }

    #[test]
    fn lowercase_style_applies_to_catalog_names_only() {
        let path = resolve_path(&template("simple"), &working(4, 3, "Blender")).unwrap();
        assert_eq!(path.file_name, "main.v003.blender");
        assert!(path.folder.ends_with("/Alpha/E01/S01/SH01/animation"), "{}", path.folder);
    }

    #[test]
    fn names_differing_in_case_stay_apart() {
        for name in ["default", "simple", "no_preview"] {
            let template = template(name);
            let lower = resolve_path(&template, &working(4, 1, "blender")).unwrap();
            let mut upper_ctx = working(4, 1, "blender");
            upper_ctx.name = "Main".to_string();
            let upper = resolve_path(&template, &upper_ctx).unwrap();
            assert_ne!(lower.full_path(), upper.full_path(), "{name}");
        }
    }

    #[test]
    fn instance_output_never_matches_plain_output_with_look_alike_name() {
        for name in ["default", "simple", "no_preview"] {
            let template = template(name);
            let mut placed = output(
                4,
                "cache",
                Some(InstanceContext {
                    asset_type: "chars".to_string(),
                    asset: "rabbit".to_string(),
                    number: 1,
                }),
            );
            placed.name = "main".to_string();
            let mut plain = output(4, "cache", None);
            plain.name = "chars_rabbit_0001_main".to_string();

            let placed = resolve_path(&template, &placed).unwrap();
            let plain = resolve_path(&template, &plain).unwrap();
            assert_ne!(placed.full_path(), plain.full_path(), "{name}");
        }
    }

    #[test]
    fn asset_files_use_asset_pattern() {
        let path = resolve_path(&template("default"), &working(8, 1, "blender")).unwrap();
        assert!(path.folder.contains("/assets/Characters/Rabbit/"), "{}", path.folder);
    }

    #[test]
    fn files_cannot_attach_to_asset_types() {
        assert_matches!(
            resolve_path(&template("default"), &working(9, 1, "blender")),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn missing_role_pattern_is_unknown_template() {
        let json = r#"{
            "working": {
                "folder_path": { "asset": "<Project>/<AssetType>/<Asset>/<TaskType>" },
                "file_name": { "asset": "<Name>.v<Revision>.<Software>" }
            },
            "output": {
                "folder_path": { "asset": "<Project>/<AssetType>/<Asset>/<TaskType>" },
                "file_name": { "asset": "<OutputType>_<Name>.v<Revision>" }
            }
        }"#;
        let template = FileTreeTemplate::from_json("assets_only", json).unwrap();
        assert_matches!(
            resolve_path(&template, &working(4, 1, "blender")),
            Err(CoreError::UnknownTemplate(_))
        );
    }

    #[test]
    fn zero_revision_is_rejected() {
        assert_matches!(
            resolve_path(&template("default"), &working(4, 0, "blender")),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn separator_in_value_is_rejected() {
        let mut ctx = working(4, 1, "blender");
        ctx.name = "main/alt".to_string();
        assert_matches!(
            resolve_path(&template("default"), &ctx),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn join_folder_normalizes() {
        assert_eq!(join_folder(&["/mnt/", "", "a//b/"]), "/mnt/a/b");
        assert_eq!(join_folder(&["", "root", "a"]), "root/a");
        assert_eq!(join_folder(&["", "", ""]), "");
    }
}
