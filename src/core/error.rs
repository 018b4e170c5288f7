//! Error handling for petk
//!
//! Every failure in the engine is fatal: it propagates to the top-level
//! `resolve` caller and no partially-resolved text is ever returned. The
//! variants of [`PetkError`] map onto the stages of resolution:
//!
//! - **Syntax**: [`UnclosedFence`], [`MalformedYaml`], [`InvalidPayload`] -
//!   the template text itself is broken.
//! - **Configuration**: [`InvalidOrderBy`], [`InvalidSampleMode`],
//!   [`InvalidSampleSize`], [`InvalidGlobPattern`], [`MaxDepthExceeded`] -
//!   a glob include spec or resolve option names an unusable value.
//! - **Cycle**: [`Cycle`] - the include chain revisited an id.
//! - **Resolution**: [`Resolution`], [`InvalidResolution`] - the injected
//!   include resolver failed or returned a malformed resolution.
//! - **Payload**: [`InvalidVarPayload`] - a `var` directive's payload is not
//!   a plain mapping.
//!
//! [`UnclosedFence`]: PetkError::UnclosedFence
//! [`MalformedYaml`]: PetkError::MalformedYaml
//! [`InvalidPayload`]: PetkError::InvalidPayload
//! [`InvalidOrderBy`]: PetkError::InvalidOrderBy
//! [`InvalidSampleMode`]: PetkError::InvalidSampleMode
//! [`InvalidSampleSize`]: PetkError::InvalidSampleSize
//! [`InvalidGlobPattern`]: PetkError::InvalidGlobPattern
//! [`MaxDepthExceeded`]: PetkError::MaxDepthExceeded
//! [`Cycle`]: PetkError::Cycle
//! [`Resolution`]: PetkError::Resolution
//! [`InvalidResolution`]: PetkError::InvalidResolution
//! [`InvalidVarPayload`]: PetkError::InvalidVarPayload

use thiserror::Error;

/// Convenient result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PetkError>;

/// The main error type for petk resolution.
///
/// Each variant carries enough context to point the template author at the
/// failing directive: the fence tag and 1-based start line for syntax
/// problems, the offending value for configuration problems, and the full
/// visited chain for cycles.
#[derive(Error, Debug)]
pub enum PetkError {
    /// A fenced directive block was opened but never terminated.
    ///
    /// The message names the fence tag and the 1-based line of the opening
    /// fence so the author can find the block in a long template.
    #[error("Unclosed directive fence `{{petk:{tag}}}` opened at line {line}")]
    UnclosedFence {
        /// The directive type inside the opening fence tag.
        tag: String,
        /// 1-based line number of the opening fence.
        line: usize,
    },

    /// A directive block's payload failed to parse as YAML.
    #[error("Malformed YAML payload in `{{petk:{tag}}}` block at line {line}: {source}")]
    MalformedYaml {
        /// The directive type inside the opening fence tag.
        tag: String,
        /// 1-based line number of the opening fence.
        line: usize,
        /// The underlying parser error.
        #[source]
        source: serde_yaml::Error,
    },

    /// A directive payload parsed as YAML but failed directive-specific
    /// validation (missing `path`/`glob`, missing `name`/`value`, missing
    /// `condition`).
    #[error("Invalid `{{petk:{tag}}}` payload at line {line}: {reason}")]
    InvalidPayload {
        /// The directive type inside the opening fence tag.
        tag: String,
        /// 1-based line number of the opening fence.
        line: usize,
        /// What the validation expected.
        reason: String,
    },

    /// A `var` directive's payload is not a plain YAML mapping.
    #[error("Invalid var payload at line {line}: expected a mapping with `name` and `value`")]
    InvalidVarPayload {
        /// 1-based line number of the opening fence.
        line: usize,
    },

    /// A glob include spec named an unknown `order_by` value.
    #[error("invalid order_by: `{value}`")]
    InvalidOrderBy {
        /// The unrecognized value.
        value: String,
    },

    /// A glob include spec named an unknown `sample_mode` value.
    #[error("invalid sample_mode: `{value}`")]
    InvalidSampleMode {
        /// The unrecognized value.
        value: String,
    },

    /// A glob include spec requested a non-positive sample size.
    #[error("invalid sample_size: {value}")]
    InvalidSampleSize {
        /// The requested size.
        value: i64,
    },

    /// A glob pattern failed to compile.
    #[error("Invalid glob pattern `{pattern}`: {source}")]
    InvalidGlobPattern {
        /// The pattern as written in the include spec.
        pattern: String,
        /// The underlying glob error.
        #[source]
        source: glob::PatternError,
    },

    /// The include chain revisited an id.
    ///
    /// The message enumerates the full chain plus the repeated id, e.g.
    /// `Cycle detected: a -> b -> a`.
    #[error("Cycle detected: {chain}")]
    Cycle {
        /// The visited ids joined with ` -> `, ending in the repeated id.
        chain: String,
    },

    /// The opt-in recursion bound was exceeded.
    #[error("Maximum include depth {max} exceeded")]
    MaxDepthExceeded {
        /// The configured bound.
        max: usize,
    },

    /// The injected include resolver failed.
    #[error("Include resolution failed: {source}")]
    Resolution {
        /// The resolver's own error, preserved because it is usually more
        /// specific than anything the engine could say.
        #[source]
        source: anyhow::Error,
    },

    /// The injected include resolver returned a malformed resolution.
    #[error("Invalid include resolution")]
    InvalidResolution,

    /// A filesystem operation failed during glob expansion or ordering.
    #[error("File system error during {operation}: {source}")]
    Io {
        /// What the engine was doing when the operation failed.
        operation: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
