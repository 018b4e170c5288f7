//! End-to-end resolution scenarios.

use std::fs;

use petk::resolver::{FsResolver, ResolveOptions, Resolver, VarValue};
use tempfile::TempDir;

use crate::common::MapResolver;

#[tokio::test]
async fn text_without_directives_resolves_to_itself() {
    let resolver = MapResolver::new([]);
    let text = "# Title\n\nPlain prose with `inline code`.\n";
    let output = Resolver::new(&resolver).resolve(text).await.unwrap();
    assert_eq!(output, text);
}

#[tokio::test]
async fn unknown_placeholders_are_idempotent() {
    let resolver = MapResolver::new([]);
    let text = "Hello {{nobody}} and {{nothing}}!\n";
    let output = Resolver::new(&resolver).resolve(text).await.unwrap();
    assert_eq!(output, text);
}

#[tokio::test]
async fn substitutes_top_level_vars() {
    let resolver = MapResolver::new([]);
    let output = Resolver::new(&resolver)
        .with_vars([("name", VarValue::from("World"))])
        .resolve("Hello {{name}}!")
        .await
        .unwrap();
    assert_eq!(output, "Hello World!");
}

#[tokio::test]
async fn include_block_is_replaced_by_resolved_content() {
    let resolver = MapResolver::new([("b", "B")]);
    let output = Resolver::new(&resolver)
        .resolve("```{petk:include}\npath: b\n```\n")
        .await
        .unwrap();
    assert_eq!(output, "B");
}

#[tokio::test]
async fn include_chain_expands_to_the_leaf() {
    let resolver = MapResolver::new([
        ("a", "```{petk:include}\npath: b\n```\n"),
        ("b", "{{include:c}}"),
        ("c", "C"),
    ]);
    let output = Resolver::new(&resolver)
        .resolve("{{include:a}}")
        .await
        .unwrap();
    assert_eq!(output, "C");
    assert!(!output.contains("petk"));
    assert!(!output.contains("{{"));
}

#[tokio::test]
async fn var_binding_is_visible_after_but_not_before() {
    let resolver = MapResolver::new([("child", "[{{x}}]")]);
    let text = "{{x}}\n```{petk:var}\nname: x\nvalue: bound\n```\n{{x}} {{include:child}}\n";
    let output = Resolver::new(&resolver).resolve(text).await.unwrap();
    assert_eq!(output, "{{x}}\nbound [bound]\n");
}

#[tokio::test]
async fn var_scope_never_flows_back_to_the_caller() {
    // The included file binds `x`; the binding must not leak into the text
    // that follows the include in the parent.
    let resolver = MapResolver::new([("child", "```{petk:var}\nname: x\nvalue: inner\n```\nin-child:{{x}}\n")]);
    let output = Resolver::new(&resolver)
        .resolve("{{include:child}}after:{{x}}\n")
        .await
        .unwrap();
    assert_eq!(output, "in-child:inner\nafter:{{x}}\n");
}

#[tokio::test]
async fn var_directive_span_is_deleted() {
    let resolver = MapResolver::new([]);
    let text = "before\n```{petk:var}\nname: x\nvalue: 1\n```\nafter {{x}}\n";
    let output = Resolver::new(&resolver).resolve(text).await.unwrap();
    assert_eq!(output, "before\nafter 1\n");
}

#[tokio::test]
async fn non_primitive_var_values_are_dropped_silently() {
    let resolver = MapResolver::new([]);
    let text = "```{petk:var}\nname: x\nvalue:\n  nested: true\n```\nrest {{x}}\n";
    let output = Resolver::new(&resolver).resolve(text).await.unwrap();
    assert_eq!(output, "rest {{x}}\n");
}

#[tokio::test]
async fn short_form_var_binds_the_empty_string() {
    let resolver = MapResolver::new([]);
    let output = Resolver::new(&resolver)
        .resolve("{{var:flag}}value=[{{flag}}]\n")
        .await
        .unwrap();
    assert_eq!(output, "value=[]\n");
}

#[tokio::test]
async fn boolean_and_number_vars_render_textually() {
    let resolver = MapResolver::new([]);
    let text = "```{petk:var}\nname: flag\nvalue: true\n```\n```{petk:var}\nname: count\nvalue: 3\n```\n{{flag}}/{{count}}\n";
    let output = Resolver::new(&resolver).resolve(text).await.unwrap();
    assert_eq!(output, "true/3\n");
}

#[tokio::test]
async fn if_directives_pass_through_verbatim() {
    let resolver = MapResolver::new([]);
    let text = "keep\n```{petk:if}\ncondition: docs\n```\nalso kept\n";
    let output = Resolver::new(&resolver).resolve(text).await.unwrap();
    assert_eq!(output, text);
}

#[tokio::test]
async fn unknown_directive_types_pass_through_verbatim() {
    let resolver = MapResolver::new([]);
    let text = "```{petk:snippet}\nanything: here\n```\n";
    let output = Resolver::new(&resolver).resolve(text).await.unwrap();
    assert_eq!(output, text);
}

#[tokio::test]
async fn includes_resolve_even_when_inert_directives_are_present() {
    let resolver = MapResolver::new([("a", "A")]);
    let text = "```{petk:if}\ncondition: x\n```\n{{include:a}}\n";
    let output = Resolver::new(&resolver).resolve(text).await.unwrap();
    assert_eq!(output, "```{petk:if}\ncondition: x\n```\nA\n");
}

#[tokio::test]
async fn vars_flow_into_nested_includes_across_files() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("outer.md"),
        "```{petk:var}\nname: project\nvalue: petk\n```\n{{include:inner.md}}",
    )
    .unwrap();
    fs::write(dir.path().join("inner.md"), "name={{project}}\n").unwrap();

    let fs_resolver = FsResolver::new(dir.path());
    let output = Resolver::new(&fs_resolver)
        .resolve("{{include:outer.md}}")
        .await
        .unwrap();
    assert_eq!(output, "name=petk\n");
}

#[tokio::test]
async fn opt_in_max_depth_bounds_recursion() {
    let resolver = MapResolver::new([("a", "{{include:b}}"), ("b", "B")]);

    // Default: no depth bound, a -> b resolves fine.
    let output = Resolver::new(&resolver)
        .resolve("{{include:a}}")
        .await
        .unwrap();
    assert_eq!(output, "B");

    let err = Resolver::new(&resolver)
        .with_options(ResolveOptions { max_depth: Some(1) })
        .resolve("{{include:a}}")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("depth"));
}
