//! Recursive resolution orchestrator.
//!
//! The resolver drives a fixed-point loop over the template text: each pass
//! re-extracts directives from the current text from scratch, records `var`
//! bindings in source order, then rewrites directives in descending range
//! order so earlier offsets stay valid. Includes are resolved through the
//! injected [`IncludeResolver`] and recursively expanded with the variable
//! scope visible at their offset and a copy-on-extend include chain. When a
//! pass rewrites nothing (no directives at all, or only `if`/unknown
//! directives remain), the loop ends and one final substitution pass
//! replaces `{{name}}` placeholders.
//!
//! Sibling glob entries are resolved sequentially, never concurrently:
//! output ordering determinism is prioritized over throughput, and the
//! engine makes no assumption that the injected resolver is reentrant.
//!
//! Any error anywhere in the tree aborts the whole top-level call; no
//! partially-resolved text is ever returned.

pub mod chain;
pub mod fs;
pub mod scope;

pub use chain::IncludeChain;
pub use fs::FsResolver;
pub use scope::{VarValue, VariableScope};

use std::collections::HashMap;

use futures::future::BoxFuture;
use tracing::{debug, trace};

use crate::core::{PetkError, Result};
use crate::directive::{Directive, DirectivePayload, extract_directives};
use crate::pattern;
use crate::substitute;

/// A successfully resolved include: an opaque id used for cycle detection
/// and the content to splice in.
#[derive(Debug, Clone)]
pub struct ResolvedInclude {
    /// Identity of the included unit. The engine never interprets it beyond
    /// equality checks in the include chain.
    pub id: String,
    /// The raw content, recursively resolved before splicing.
    pub content: String,
}

/// The injected collaborator that maps include paths to content.
///
/// Implementations may suspend (filesystem, network) and may fail with any
/// error; the failure aborts the whole resolution. The chain of ids visited
/// so far is passed for context and diagnostics.
pub trait IncludeResolver: Send + Sync {
    /// Resolve an include path to its id and content.
    fn resolve<'a>(
        &'a self,
        path: &'a str,
        chain: &'a [String],
    ) -> BoxFuture<'a, anyhow::Result<ResolvedInclude>>;
}

/// Options for a resolve call.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOptions {
    /// Opt-in bound on include nesting depth. `None` (the default) leaves
    /// recursion bounded only by cycle detection.
    pub max_depth: Option<usize>,
}

/// Outcome of a single resolution pass. `Continue` means at least one
/// directive was rewritten and the text must be re-scanned; `Done` means
/// the text reached its fixed point.
enum Pass {
    Continue(String),
    Done(String),
}

/// The resolution engine. Holds the injected include resolver, the options,
/// and the top-level variables; each [`resolve`](Resolver::resolve) call is
/// independent, so one engine can serve concurrent callers as long as the
/// resolver itself is reentrant.
pub struct Resolver<'r> {
    include: &'r dyn IncludeResolver,
    options: ResolveOptions,
    vars: HashMap<String, VarValue>,
}

impl<'r> Resolver<'r> {
    /// Create an engine around an include resolver.
    pub fn new(include: &'r dyn IncludeResolver) -> Self {
        Self {
            include,
            options: ResolveOptions::default(),
            vars: HashMap::new(),
        }
    }

    /// Replace the resolve options.
    #[must_use]
    pub fn with_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    /// Seed the top-level variable scope.
    #[must_use]
    pub fn with_vars<I, K>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, VarValue)>,
        K: Into<String>,
    {
        self.vars
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v)));
        self
    }

    /// Resolve `text` to its final form.
    ///
    /// # Errors
    ///
    /// Every failure is fatal: syntax errors in directives, invalid glob
    /// configuration, include cycles, resolver failures, and malformed
    /// `var` payloads.
    pub async fn resolve(&self, text: &str) -> Result<String> {
        self.resolve_frame(
            text.to_string(),
            VariableScope::from_map(self.vars.clone()),
            IncludeChain::new(),
        )
        .await
    }

    /// Resolve one recursion frame: loop passes to a fixed point, then
    /// substitute variables. Boxed because the frame recurses through
    /// include resolution.
    fn resolve_frame(
        &self,
        text: String,
        scope: VariableScope,
        chain: IncludeChain,
    ) -> BoxFuture<'_, Result<String>> {
        Box::pin(async move {
            let mut text = text;
            let mut scope = scope;
            let mut pass_no = 0usize;

            loop {
                pass_no += 1;
                trace!(pass = pass_no, depth = chain.len(), "resolution pass");
                match self.resolve_pass(text, &mut scope, &chain).await? {
                    Pass::Continue(next) => text = next,
                    Pass::Done(next) => {
                        text = next;
                        break;
                    }
                }
            }

            Ok(substitute::substitute(&text, &scope))
        })
    }

    async fn resolve_pass(
        &self,
        text: String,
        scope: &mut VariableScope,
        chain: &IncludeChain,
    ) -> Result<Pass> {
        let directives = extract_directives(&text)?;
        if directives.is_empty() {
            return Ok(Pass::Done(text));
        }

        // Bindings are recorded in source order before any rewrite so an
        // include sees exactly the vars declared before it.
        for directive in &directives {
            if let DirectivePayload::VarAssignment { name, value } = &directive.payload {
                match VarValue::from_yaml(value) {
                    Some(value) => scope.bind_at(directive.range.start, name.clone(), value),
                    None => {
                        debug!("Dropping non-primitive var value for '{name}'");
                    }
                }
            }
        }

        let mut text = text;
        let mut rewrote = false;

        for directive in directives.iter().rev() {
            match &directive.payload {
                DirectivePayload::VarAssignment { .. } => {
                    splice(&mut text, scope, directive, "");
                    rewrote = true;
                }
                DirectivePayload::SinglePathInclude { path } => {
                    let child_scope = scope.child_at(directive.range.start);
                    let resolved = self.resolve_include(path, child_scope, chain).await?;
                    splice(&mut text, scope, directive, &resolved);
                    rewrote = true;
                }
                DirectivePayload::GlobInclude(spec) => {
                    let entries = pattern::expand(spec)?;
                    debug!("Glob include expanded to {} entries", entries.len());

                    let child_scope = scope.child_at(directive.range.start);
                    let mut combined = String::new();
                    for entry in &entries {
                        let resolved = self
                            .resolve_include(entry, child_scope.clone(), chain)
                            .await?;
                        combined.push_str(&resolved);
                    }
                    splice(&mut text, scope, directive, &combined);
                    rewrote = true;
                }
                DirectivePayload::Condition { .. } | DirectivePayload::Unknown { .. } => {}
            }
        }

        if rewrote {
            Ok(Pass::Continue(text))
        } else {
            // Only inert directives remain; rescanning would spin forever.
            Ok(Pass::Done(text))
        }
    }

    /// Resolve a single include path and recursively expand its content.
    async fn resolve_include(
        &self,
        path: &str,
        scope: VariableScope,
        chain: &IncludeChain,
    ) -> Result<String> {
        let resolution = self
            .include
            .resolve(path, chain.ids())
            .await
            .map_err(|source| PetkError::Resolution { source })?;
        if resolution.id.is_empty() {
            return Err(PetkError::InvalidResolution);
        }

        let chain = chain.extend(&resolution.id)?;
        if let Some(max) = self.options.max_depth {
            if chain.len() > max {
                return Err(PetkError::MaxDepthExceeded { max });
            }
        }

        trace!(id = %resolution.id, depth = chain.len(), "resolved include");
        self.resolve_frame(resolution.content, scope, chain).await
    }
}

/// Replace a directive's span and keep the scope's binding offsets valid.
fn splice(text: &mut String, scope: &mut VariableScope, directive: &Directive, replacement: &str) {
    text.replace_range(directive.range.clone(), replacement);
    scope.adjust_for_splice(directive.range.start, directive.range.end, replacement.len());
}
