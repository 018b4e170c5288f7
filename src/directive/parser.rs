//! YAML payload parsing for fenced directive blocks.
//!
//! Payloads are parsed to a `serde_yaml::Value` first (so malformed YAML
//! fails with the fence tag and line), then validated into one of the
//! [`DirectivePayload`] variants. Include payloads are classified here, once:
//! an object with a `glob` key, or a bare path containing glob
//! metacharacters, becomes a [`GlobSpec`]; everything else is a single path.

use std::path::PathBuf;

use serde::Deserialize;
use serde_yaml::Value;

use super::block::Block;
use super::{Directive, DirectivePayload};
use crate::core::{PetkError, Result};
use crate::pattern::{GlobOrder, GlobSpec, SampleMode, contains_glob_meta};

/// Serde mirror of the structured include payload. Unknown keys are
/// tolerated; type mismatches on known keys fail the whole payload.
#[derive(Debug, Deserialize)]
struct RawIncludePayload {
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    glob: Option<GlobPatterns>,
    #[serde(default)]
    cwd: Option<PathBuf>,
    #[serde(default)]
    order_by: Option<String>,
    #[serde(default)]
    sample_size: Option<i64>,
    #[serde(default)]
    sample_mode: Option<String>,
    #[serde(default)]
    seed: Option<String>,
    #[serde(default)]
    normalize: Option<bool>,
}

/// `glob:` accepts a single pattern or a list of patterns.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GlobPatterns {
    One(String),
    Many(Vec<String>),
}

pub(crate) fn parse_block(block: &Block) -> Result<Directive> {
    let value: Value =
        serde_yaml::from_str(&block.payload).map_err(|source| PetkError::MalformedYaml {
            tag: block.tag.clone(),
            line: block.start_line,
            source,
        })?;

    let payload = match block.tag.as_str() {
        "include" => parse_include(block, value)?,
        "var" => parse_var(block, value)?,
        "if" => parse_if(block, value)?,
        _ => DirectivePayload::Unknown {
            tag: block.tag.clone(),
            value,
        },
    };

    Ok(Directive {
        kind: payload.kind(),
        payload,
        range: block.range.clone(),
        raw: block.raw.clone(),
    })
}

/// Classify a bare path string the way a fenced `path:` entry is classified:
/// glob metacharacters make it a single-pattern glob spec, otherwise it is a
/// literal include path. Shared with the short-form scanner.
pub(crate) fn include_payload_from_path(path: &str) -> DirectivePayload {
    if contains_glob_meta(path) {
        DirectivePayload::GlobInclude(GlobSpec::from_pattern(path))
    } else {
        DirectivePayload::SinglePathInclude {
            path: path.to_string(),
        }
    }
}

fn parse_include(block: &Block, value: Value) -> Result<DirectivePayload> {
    let invalid = || PetkError::InvalidPayload {
        tag: block.tag.clone(),
        line: block.start_line,
        reason: "missing or invalid path or glob".to_string(),
    };

    let raw: RawIncludePayload = serde_yaml::from_value(value).map_err(|_| invalid())?;

    let patterns = match (raw.glob, raw.path) {
        (Some(GlobPatterns::One(pattern)), _) => vec![pattern],
        (Some(GlobPatterns::Many(patterns)), _) => patterns,
        (None, Some(path)) if contains_glob_meta(&path) => vec![path],
        (None, Some(path)) => return Ok(DirectivePayload::SinglePathInclude { path }),
        (None, None) => return Err(invalid()),
    };

    let order = match raw.order_by.as_deref() {
        None => GlobOrder::None,
        Some(value) => GlobOrder::parse(value)?,
    };
    let sample_mode = match raw.sample_mode.as_deref() {
        None => SampleMode::FirstN,
        Some(value) => SampleMode::parse(value)?,
    };

    Ok(DirectivePayload::GlobInclude(GlobSpec {
        patterns,
        cwd: raw.cwd,
        order,
        seed: raw.seed,
        sample_size: raw.sample_size,
        sample_mode,
        normalize: raw.normalize.unwrap_or(false),
    }))
}

fn parse_var(block: &Block, payload: Value) -> Result<DirectivePayload> {
    if !payload.is_mapping() {
        return Err(PetkError::InvalidVarPayload {
            line: block.start_line,
        });
    }

    let name = payload.get("name").and_then(Value::as_str);
    let value = payload.get("value");
    match (name, value) {
        (Some(name), Some(value)) => Ok(DirectivePayload::VarAssignment {
            name: name.to_string(),
            value: value.clone(),
        }),
        _ => Err(PetkError::InvalidPayload {
            tag: block.tag.clone(),
            line: block.start_line,
            reason: "missing name or value".to_string(),
        }),
    }
}

fn parse_if(block: &Block, payload: Value) -> Result<DirectivePayload> {
    let missing = || PetkError::InvalidPayload {
        tag: block.tag.clone(),
        line: block.start_line,
        reason: "missing condition".to_string(),
    };

    if !payload.is_mapping() {
        return Err(missing());
    }
    match payload.get("condition") {
        Some(condition) => Ok(DirectivePayload::Condition {
            condition: condition.clone(),
        }),
        None => Err(missing()),
    }
}
