//! Staged transform pass: name, attribute and value transforms, then reference
//! resolution and transitive value transforms

use super::{Transform, TransformKind};
use crate::config::PlatformConfig;
use crate::error::{Error, Result};
use crate::reference::{resolve_tree, uses_reference, ReferenceSyntax};
use crate::tokens::{Token, TokenGroup};
use tracing::{debug, trace};

/// Which part of the export a transform pass belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformPass {
    /// Before references are resolved: name, attribute and value stages.
    /// Value transforms skip tokens whose declared value uses references.
    Initial,
    /// After resolution: transitive value transforms on tokens that used references.
    Resolved,
}

/// Produce a transformed copy of `tree`. The input tree is left untouched.
pub fn transform_tree(
    tree: &TokenGroup,
    transforms: &[Transform],
    platform: &PlatformConfig,
    syntax: &ReferenceSyntax,
    pass: TransformPass,
) -> Result<TokenGroup> {
    let staged = staged(transforms);
    tree.try_map_tokens(&mut |token| transform_token(token, &staged, platform, syntax, pass))
}

/// Full platform export: transform, resolve references against the complete
/// transformed tree, then run transitive value transforms.
pub fn export_tree(
    tree: &TokenGroup,
    transforms: &[Transform],
    platform: &PlatformConfig,
    syntax: &ReferenceSyntax,
) -> Result<TokenGroup> {
    debug!("Applying {} transforms", transforms.len());
    let transformed = transform_tree(tree, transforms, platform, syntax, TransformPass::Initial)?;
    let resolved = resolve_tree(&transformed, syntax)?;

    if transforms.iter().any(Transform::is_transitive) {
        transform_tree(&resolved, transforms, platform, syntax, TransformPass::Resolved)
    } else {
        Ok(resolved)
    }
}

/// Order transforms by stage, keeping declaration order within a stage.
fn staged(transforms: &[Transform]) -> Vec<&Transform> {
    let mut staged: Vec<&Transform> = transforms.iter().collect();
    staged.sort_by_key(|transform| transform.stage());
    staged
}

fn transform_token(
    token: &Token,
    transforms: &[&Transform],
    platform: &PlatformConfig,
    syntax: &ReferenceSyntax,
    pass: TransformPass,
) -> Result<Token> {
    let mut token = token.clone();
    let declared_with_reference = uses_reference(&token.original.value, syntax);

    for transform in transforms {
        if !transform.matches(&token) {
            continue;
        }
        match &transform.kind {
            TransformKind::Name(rename) if pass == TransformPass::Initial => {
                token.name = rename(&token, platform);
            }
            TransformKind::Attribute(attributes) if pass == TransformPass::Initial => {
                for (key, value) in attributes(&token, platform) {
                    token.attributes.insert(key, value);
                }
            }
            TransformKind::Value {
                transitive,
                transform: convert,
            } => {
                if uses_reference(&token.value, syntax) {
                    continue;
                }
                let applies = match pass {
                    TransformPass::Initial => !declared_with_reference,
                    TransformPass::Resolved => declared_with_reference && *transitive,
                };
                if !applies {
                    continue;
                }
                token.value = convert(&token, platform).map_err(|message| Error::Transform {
                    transform: transform.name.clone(),
                    token: token.path_string(),
                    message,
                })?;
            }
            _ => continue,
        }
        trace!("{} applied to {}", transform.name, token.path_string());
    }
    Ok(token)
}
