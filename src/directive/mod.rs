//! Directive extraction and payload parsing.
//!
//! A directive is an instruction embedded in Markdown text, either as a
//! fenced block whose info string is exactly `{petk:TYPE}` or as an inline
//! short form (`{{include:PATH}}`, `{{var:NAME}}`). This module discovers
//! both forms, parses fenced YAML payloads into typed variants, and merges
//! everything into a single list sorted by source position.
//!
//! Extraction is stateless: the resolver re-runs it against the current text
//! on every pass, so nothing here caches or tracks rewrites.

pub mod block;
mod parser;
mod short_form;

pub use block::{Block, BlockScan};

use std::ops::Range;

use serde_yaml::Value;
use tracing::debug;

use crate::core::Result;
use crate::pattern::GlobSpec;

/// The directive type named by the fence tag or short form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    /// `{petk:include}` or `{{include:PATH}}` - replaced by resolved content.
    Include,
    /// `{petk:var}` or `{{var:NAME}}` - binds a variable, then is deleted.
    Var,
    /// `{petk:if}` - validated but never rewritten.
    If,
    /// Any other `{petk:...}` tag - validated but never rewritten.
    Unknown,
}

/// A parsed directive with its position in the current text.
#[derive(Debug, Clone)]
pub struct Directive {
    /// The directive type.
    pub kind: DirectiveKind,
    /// The validated, typed payload.
    pub payload: DirectivePayload,
    /// Absolute byte range `[start, end)` into the current text. For fenced
    /// directives this spans the opening fence line through the closing
    /// fence line including its trailing newline, so deleting the span
    /// leaves no blank line behind.
    pub range: Range<usize>,
    /// The raw matched text.
    pub raw: String,
}

/// Directive payload, shape-sniffed into an explicit tagged variant right
/// after extraction so the resolver never re-inspects raw YAML.
#[derive(Debug, Clone)]
pub enum DirectivePayload {
    /// An include naming exactly one path or id.
    SinglePathInclude {
        /// The path handed to the include resolver.
        path: String,
    },
    /// An include naming one or more glob patterns plus ordering options.
    GlobInclude(GlobSpec),
    /// A variable assignment.
    VarAssignment {
        /// The variable name.
        name: String,
        /// The assigned value; only strings, numbers, and booleans ever
        /// enter scope, other shapes are dropped.
        value: Value,
    },
    /// An `if` directive; the condition is carried but never evaluated.
    Condition {
        /// The raw condition value.
        condition: Value,
    },
    /// A fenced directive with an unrecognized tag.
    Unknown {
        /// The tag inside the fence.
        tag: String,
        /// The parsed payload, kept only so malformed YAML still fails.
        value: Value,
    },
}

impl DirectivePayload {
    /// The directive kind this payload belongs to.
    pub fn kind(&self) -> DirectiveKind {
        match self {
            Self::SinglePathInclude { .. } | Self::GlobInclude(_) => DirectiveKind::Include,
            Self::VarAssignment { .. } => DirectiveKind::Var,
            Self::Condition { .. } => DirectiveKind::If,
            Self::Unknown { .. } => DirectiveKind::Unknown,
        }
    }
}

/// Extract every directive from `text`, fenced and short-form, sorted
/// ascending by range start.
///
/// # Errors
///
/// Returns an error for unterminated directive fences, malformed YAML
/// payloads, and payloads failing directive-specific validation.
pub fn extract_directives(text: &str) -> Result<Vec<Directive>> {
    let scan = block::scan_blocks(text)?;

    let mut directives = Vec::with_capacity(scan.blocks.len());
    for block in &scan.blocks {
        directives.push(parser::parse_block(block)?);
    }
    directives.extend(short_form::scan_short_forms(text, &scan.fenced));

    directives.sort_by_key(|d| d.range.start);
    debug!("Extracted {} directives", directives.len());
    Ok(directives)
}
