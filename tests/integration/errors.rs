//! Failure scenarios: every error is fatal and reaches the top-level call.

use std::fs;

use futures::future::BoxFuture;
use petk::core::PetkError;
use petk::resolver::{FsResolver, IncludeResolver, ResolvedInclude, Resolver};
use tempfile::TempDir;

use crate::common::MapResolver;

#[tokio::test]
async fn unterminated_fence_mentions_unclosed() {
    let resolver = MapResolver::new([]);
    let err = Resolver::new(&resolver)
        .resolve("fine\n```{petk:include}\npath: a\n")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Unclosed"));
    assert!(err.to_string().contains("line 2"));
}

#[tokio::test]
async fn non_mapping_var_payload_mentions_invalid_var() {
    let resolver = MapResolver::new([]);
    let err = Resolver::new(&resolver)
        .resolve("```{petk:var}\nnot-an-object\n```\n")
        .await
        .unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("YAML") || msg.contains("Invalid var"), "got: {msg}");
}

#[tokio::test]
async fn malformed_yaml_payload_mentions_yaml() {
    let resolver = MapResolver::new([]);
    let err = Resolver::new(&resolver)
        .resolve("```{petk:var}\nname: [unclosed\n```\n")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("YAML"));
}

#[tokio::test]
async fn cycle_reports_the_literal_chain() {
    let resolver = MapResolver::new([("A", "{{include:B}}"), ("B", "{{include:A}}")]);
    let err = Resolver::new(&resolver)
        .resolve("{{include:A}}")
        .await
        .unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("Cycle detected"));
    assert!(msg.contains("A -> B -> A"));
}

#[tokio::test]
async fn self_include_through_files_is_a_cycle() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.md"), "{{include:b.md}}").unwrap();
    fs::write(dir.path().join("b.md"), "{{include:./a.md}}").unwrap();

    let fs_resolver = FsResolver::new(dir.path());
    let err = Resolver::new(&fs_resolver)
        .resolve("{{include:a.md}}")
        .await
        .unwrap_err();
    // The resolver normalizes ids, so ./a.md and a.md are the same unit.
    assert_eq!(
        err.to_string(),
        "Cycle detected: a.md -> b.md -> a.md"
    );
}

#[tokio::test]
async fn resolver_errors_surface_with_their_own_message() {
    let resolver = MapResolver::new([]);
    let err = Resolver::new(&resolver)
        .resolve("{{include:missing}}")
        .await
        .unwrap_err();
    let msg = err.to_string();
    assert!(matches!(err, PetkError::Resolution { .. }));
    assert!(msg.contains("unknown include id"), "got: {msg}");
}

struct EmptyIdResolver;

impl IncludeResolver for EmptyIdResolver {
    fn resolve<'a>(
        &'a self,
        _path: &'a str,
        _chain: &'a [String],
    ) -> BoxFuture<'a, anyhow::Result<ResolvedInclude>> {
        Box::pin(async move {
            Ok(ResolvedInclude {
                id: String::new(),
                content: "whatever".to_string(),
            })
        })
    }
}

#[tokio::test]
async fn malformed_resolution_is_invalid_include_resolution() {
    let err = Resolver::new(&EmptyIdResolver)
        .resolve("{{include:a}}")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid include resolution");
}

#[tokio::test]
async fn invalid_order_by_aborts_the_resolve() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.md"), "A").unwrap();

    let fs_resolver = FsResolver::new(dir.path());
    let template = format!(
        "```{{petk:include}}\nglob: \"*.md\"\norder_by: newest\ncwd: {}\n```\n",
        dir.path().display()
    );
    let err = Resolver::new(&fs_resolver)
        .resolve(&template)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("invalid order_by"));
}

#[tokio::test]
async fn non_positive_sample_size_aborts_the_resolve() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.md"), "A").unwrap();

    let fs_resolver = FsResolver::new(dir.path());
    let template = format!(
        "```{{petk:include}}\nglob: \"*.md\"\nsample_size: 0\ncwd: {}\n```\n",
        dir.path().display()
    );
    let err = Resolver::new(&fs_resolver)
        .resolve(&template)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("invalid sample_size"));
}

#[tokio::test]
async fn failures_deep_in_the_tree_abort_the_whole_call() {
    // The failing include sits two levels down; nothing partial comes back.
    let resolver = MapResolver::new([("a", "{{include:b}}"), ("b", "{{include:gone}}")]);
    let err = Resolver::new(&resolver)
        .resolve("before {{include:a}} after")
        .await
        .unwrap_err();
    assert!(matches!(err, PetkError::Resolution { .. }));
}

#[tokio::test]
async fn missing_include_payload_fields_are_syntax_errors() {
    let resolver = MapResolver::new([]);
    let err = Resolver::new(&resolver)
        .resolve("```{petk:include}\ncwd: anywhere\n```\n")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("missing or invalid path or glob"));

    let err = Resolver::new(&resolver)
        .resolve("```{petk:var}\nname: x\n```\n")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("missing name or value"));

    let err = Resolver::new(&resolver)
        .resolve("```{petk:if}\nwhen: x\n```\n")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("missing condition"));
}
