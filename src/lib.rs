//! Petk - Markdown template directive resolution engine
//!
//! Petk resolves a small templating language embedded in Markdown: fenced and
//! inline "directives" that are recursively expanded into plain text, with
//! variable substitution, cycle-safe recursive includes, and glob-based
//! multi-file inclusion with deterministic ordering and sampling. Consumers
//! are build and documentation tools that turn a template file into final
//! output text.
//!
//! # Directive Syntax
//!
//! Fenced directives are code fences whose info string is exactly
//! `{petk:TYPE}`:
//!
//! ````markdown
//! ```{petk:include}
//! path: snippets/intro.md
//! ```
//!
//! ```{petk:var}
//! name: project
//! value: petk
//! ```
//!
//! ```{petk:if}
//! condition: docs
//! ```
//! ````
//!
//! Short forms `{{include:PATH}}` and `{{var:NAME}}` are recognized inline,
//! outside code fences. Variable placeholders are `{{name}}` with exactly two
//! braces and no internal whitespace.
//!
//! `include` directives are replaced by the (recursively resolved) content of
//! the included file; `var` directives bind a variable and are deleted; `if`
//! directives are validated but never rewritten.
//!
//! # Glob Includes
//!
//! An include payload may name one or more glob patterns instead of a single
//! path. Matches are deduplicated, optionally normalized, ordered
//! (alphabetically, by modification time, or by a seeded deterministic
//! shuffle), optionally sampled, and each surviving file is resolved and
//! recursively expanded in final order:
//!
//! ````markdown
//! ```{petk:include}
//! glob:
//!   - "chapters/*.md"
//! order_by: alphabetical_asc
//! ```
//! ````
//!
//! # Core Modules
//!
//! - [`core`] - Error types shared across the engine
//! - [`directive`] - Directive extraction and payload parsing
//! - [`pattern`] - Glob include pipeline (expand, normalize, order, sample)
//! - [`resolver`] - Recursive resolution orchestrator, include chain, and
//!   the [`IncludeResolver`](resolver::IncludeResolver) boundary
//! - [`substitute`] - Single-pass `{{name}}` variable substitution
//!
//! # Example
//!
//! ```rust,no_run
//! use petk::resolver::{FsResolver, Resolver};
//!
//! # async fn example() -> petk::core::Result<()> {
//! let fs = FsResolver::new("docs/templates");
//! let resolver = Resolver::new(&fs);
//! let output = resolver.resolve("# Intro\n\n{{include:intro.md}}\n").await?;
//! println!("{output}");
//! # Ok(())
//! # }
//! ```
//!
//! # Failure Model
//!
//! Every failure is fatal: syntax errors, invalid glob configuration, include
//! cycles, resolver failures, and malformed `var` payloads all abort the
//! top-level [`resolve`](resolver::Resolver::resolve) call with a
//! [`PetkError`](core::PetkError). No partially-resolved text is ever
//! returned.

pub mod core;
pub mod directive;
pub mod pattern;
pub mod resolver;
pub mod substitute;
