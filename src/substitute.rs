//! Variable substitution.
//!
//! Replaces `{{identifier}}` tokens in a single left-to-right pass. An
//! identifier is one or more `[A-Za-z0-9_]` characters with no internal
//! whitespace; a token preceded by `{` or followed by `}` is not a
//! placeholder (so `{{{x}}}` and `{{ x }}` never substitute). Unknown names
//! are left verbatim, and substituted values are never re-scanned for
//! further placeholders.

use std::sync::OnceLock;

use regex::Regex;

use crate::resolver::VariableScope;

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{([A-Za-z0-9_]+)\}\}").expect("placeholder regex is valid"))
}

/// Substitute every visible `{{identifier}}` in `text`.
///
/// Visibility is positional: a binding applies only to placeholders at or
/// after the offset of the `var` directive that created it, while the base
/// scope applies everywhere.
pub fn substitute(text: &str, vars: &VariableScope) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut copied_to = 0usize;

    for m in placeholder_re().find_iter(text) {
        let preceded_by_brace = m.start() > 0 && bytes[m.start() - 1] == b'{';
        let followed_by_brace = m.end() < bytes.len() && bytes[m.end()] == b'}';
        if preceded_by_brace || followed_by_brace {
            continue;
        }

        let name = &text[m.start() + 2..m.end() - 2];
        if let Some(value) = vars.lookup_at(name, m.start()) {
            out.push_str(&text[copied_to..m.start()]);
            out.push_str(&value.to_string());
            copied_to = m.end();
        }
    }

    out.push_str(&text[copied_to..]);
    out
}
