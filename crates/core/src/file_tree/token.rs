//! The closed set of tokens a pattern may reference.

use super::{EntityRole, FileKind};

/// A substitutable token, written `<Name>` in patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Token {
    Project,
    Episode,
    Sequence,
    Shot,
    Scene,
    AssetType,
    Asset,
    TaskType,
    Task,
    Name,
    Revision,
    Software,
    Extension,
    OutputType,
    Representation,
    Instance,
}

/// Optional tokens that are present or absent together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OptionalGroup {
    Episode,
    /// `<AssetType>`, `<Asset>` and `<Instance>` of an output's breakdown instance.
    Instance,
    Representation,
}

impl OptionalGroup {
    /// Whether the group's presence distinguishes revision keys.
    pub fn is_keyed(self) -> bool {
        !matches!(self, Self::Representation)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Episode => "episode",
            Self::Instance => "instance",
            Self::Representation => "representation",
        }
    }
}

/// Whether a token can be supplied for a given kind and role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    /// Always present; absence at resolution time is a `MissingToken` error.
    Required,
    /// May be absent; its segment is then dropped.
    Optional,
    /// Never supplied; referencing it is a template error.
    Unavailable,
}

impl Token {
    pub const ALL: [Token; 16] = [
        Self::Project,
        Self::Episode,
        Self::Sequence,
        Self::Shot,
        Self::Scene,
        Self::AssetType,
        Self::Asset,
        Self::TaskType,
        Self::Task,
        Self::Name,
        Self::Revision,
        Self::Software,
        Self::Extension,
        Self::OutputType,
        Self::Representation,
        Self::Instance,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Project => "Project",
            Self::Episode => "Episode",
            Self::Sequence => "Sequence",
            Self::Shot => "Shot",
            Self::Scene => "Scene",
            Self::AssetType => "AssetType",
            Self::Asset => "Asset",
            Self::TaskType => "TaskType",
            Self::Task => "Task",
            Self::Name => "Name",
            Self::Revision => "Revision",
            Self::Software => "Software",
            Self::Extension => "Extension",
            Self::OutputType => "OutputType",
            Self::Representation => "Representation",
            Self::Instance => "Instance",
        }
    }

    /// Whether this token renders a number rather than a name.
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Revision | Self::Instance)
    }

    /// Whether a section's name style applies to this token.
    ///
    /// Only studio catalog names are restyled. They are unique ignoring
    /// case, while entity and logical file names are not.
    pub fn takes_name_style(self) -> bool {
        matches!(
            self,
            Self::TaskType
                | Self::Software
                | Self::Extension
                | Self::OutputType
                | Self::Representation
        )
    }

    /// The group an optional token drops with, or `None` when the token is
    /// required or unavailable for `kind` and `role`.
    pub fn optional_group(self, kind: FileKind, role: EntityRole) -> Option<OptionalGroup> {
        if self.availability(kind, role) != Availability::Optional {
            return None;
        }
        match self {
            Self::Episode => Some(OptionalGroup::Episode),
            Self::AssetType | Self::Asset | Self::Instance => Some(OptionalGroup::Instance),
            Self::Representation => Some(OptionalGroup::Representation),
            _ => None,
        }
    }

    pub fn availability(self, kind: FileKind, role: EntityRole) -> Availability {
        use Availability::{Optional, Required, Unavailable};

        let output = kind == FileKind::Output;
        let placement_role = matches!(role, EntityRole::Shot | EntityRole::Scene);

        match self {
            Self::Project | Self::TaskType | Self::Task | Self::Name | Self::Revision => Required,
            Self::Episode => Optional,
            Self::Sequence => match role {
                EntityRole::Asset => Unavailable,
                _ => Required,
            },
            Self::Shot => match role {
                EntityRole::Shot => Required,
                _ => Unavailable,
            },
            Self::Scene => match role {
                EntityRole::Scene => Required,
                _ => Unavailable,
            },
            Self::AssetType | Self::Asset => match role {
                EntityRole::Asset => Required,
                _ if output && placement_role => Optional,
                _ => Unavailable,
            },
            Self::Instance => {
                if output && placement_role {
                    Optional
                } else {
                    Unavailable
                }
            }
            Self::Software | Self::Extension => {
                if output {
                    Unavailable
                } else {
                    Required
                }
            }
            Self::OutputType => {
                if output {
                    Required
                } else {
                    Unavailable
                }
            }
            Self::Representation => {
                if output {
                    Optional
                } else {
                    Unavailable
                }
            }
        }
    }

    /// Tokens that a role's combined folder and file-name patterns must
    /// reference so distinct revision keys never share a path.
    pub fn disambiguating(kind: FileKind, role: EntityRole) -> Vec<Token> {
        let mut tokens = vec![Self::Project];
        match role {
            EntityRole::Asset => tokens.extend([Self::AssetType, Self::Asset]),
            EntityRole::Sequence => tokens.extend([Self::Episode, Self::Sequence]),
            EntityRole::Shot => tokens.extend([Self::Episode, Self::Sequence, Self::Shot]),
            EntityRole::Scene => tokens.extend([Self::Episode, Self::Sequence, Self::Scene]),
        }
        tokens.extend([Self::TaskType, Self::Name, Self::Revision]);
        match kind {
            FileKind::Working => tokens.push(Self::Software),
            FileKind::Output => {
                tokens.push(Self::OutputType);
                if matches!(role, EntityRole::Shot | EntityRole::Scene) {
                    tokens.extend([Self::AssetType, Self::Asset, Self::Instance]);
                }
            }
        }
        tokens
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{}>", self.name())
    }
}
