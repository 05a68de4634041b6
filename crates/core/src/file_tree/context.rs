//! The values a file revision contributes to path resolution.

use std::collections::HashMap;

use serde::Serialize;

use super::token::Token;
use super::{FileKind, NameStyle, REVISION_PADDING};
use crate::breakdown::INSTANCE_NUMBER_PADDING;
use crate::error::CoreError;
use crate::hierarchy::{EntityChain, EntityType};

/// Everything path resolution needs to know about one file revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileContext {
    pub chain: EntityChain,
    /// Task type short name.
    pub task_type: String,
    pub task: String,
    /// Logical file name, e.g. `main`.
    pub name: String,
    pub revision: i32,
    pub variant: FileVariant,
}

/// Kind-specific part of a file revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FileVariant {
    Working {
        /// Software short name.
        software: String,
        /// Software file extension, without the dot.
        extension: String,
    },
    Output {
        /// Output type short name.
        output_type: String,
        representation: Option<String>,
        instance: Option<InstanceContext>,
    },
}

impl FileVariant {
    pub fn kind(&self) -> FileKind {
        match self {
            Self::Working { .. } => FileKind::Working,
            Self::Output { .. } => FileKind::Output,
        }
    }
}

/// The breakdown instance an output file was produced from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceContext {
    pub asset_type: String,
    pub asset: String,
    pub number: i32,
}

/// Typed mapping from tokens to their rendered values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenValues {
    values: HashMap<Token, String>,
}

impl TokenValues {
    pub fn insert(&mut self, token: Token, value: impl Into<String>) {
        self.values.insert(token, value.into());
    }

    pub fn get(&self, token: Token) -> Option<&str> {
        self.values.get(&token).map(String::as_str)
    }

    pub fn contains(&self, token: Token) -> bool {
        self.values.contains_key(&token)
    }

    /// Collect token values from a file context.
    ///
    /// Catalog names are passed through `style`; numbers are zero-padded.
    /// Values that would introduce a path separator are rejected.
    pub fn from_context(ctx: &FileContext, style: NameStyle) -> Result<Self, CoreError> {
        let mut values = Self::default();
        let mut put = |token: Token, raw: &str| -> Result<(), CoreError> {
            if raw.trim().is_empty() {
                return Err(CoreError::Validation(format!("Value for {token} is empty")));
            }
            if raw.contains(['/', '\\']) {
                return Err(CoreError::Validation(format!(
                    "Value '{raw}' for {token} contains a path separator"
                )));
            }
            let value = if token.takes_name_style() {
                style.apply(raw)
            } else {
                raw.to_string()
            };
            values.insert(token, value);
            Ok(())
        };

        for node in ctx.chain.nodes() {
            let token = match node.entity_type {
                EntityType::Project => Token::Project,
                EntityType::Episode => Token::Episode,
                EntityType::Sequence => Token::Sequence,
                EntityType::Shot => Token::Shot,
                EntityType::Scene => Token::Scene,
                EntityType::AssetType => Token::AssetType,
                EntityType::Asset => Token::Asset,
            };
            put(token, &node.name)?;
        }

        put(Token::TaskType, &ctx.task_type)?;
        put(Token::Task, &ctx.task)?;
        put(Token::Name, &ctx.name)?;
        put(
            Token::Revision,
            &format!("{:0width$}", ctx.revision, width = REVISION_PADDING),
        )?;

        match &ctx.variant {
            FileVariant::Working {
                software,
                extension,
            } => {
                put(Token::Software, software)?;
                put(Token::Extension, extension)?;
            }
            FileVariant::Output {
                output_type,
                representation,
                instance,
            } => {
                put(Token::OutputType, output_type)?;
                if let Some(representation) = representation {
                    put(Token::Representation, representation)?;
                }
                if let Some(instance) = instance {
                    put(Token::AssetType, &instance.asset_type)?;
                    put(Token::Asset, &instance.asset)?;
                    put(
                        Token::Instance,
                        &format!("{:0width$}", instance.number, width = INSTANCE_NUMBER_PADDING),
                    )?;
                }
            }
        }

        Ok(values)
    }
}
