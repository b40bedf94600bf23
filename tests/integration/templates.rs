//! Rendering the bundled template tree with the dummy context.

use anyhow::Result;
use serde_json::json;
use std::sync::Arc;

use tplcheck_cli::templating::{
    RenderContext, RenderRecorder, SkipList, SkipReason, TemplateError, TemplateLoader,
    TemplateRenderer, build_skip_list, deferred_overrides, render_single, render_templates,
    smoke_pass,
};
use tplcheck_cli::test_utils::{
    TemplateWorkspace, dummy_contexts, init_test_logging, repo_templates_dir,
};

fn repo_loader() -> TemplateLoader {
    TemplateLoader::new(vec![repo_templates_dir()])
}

fn load_repo() -> Result<(Vec<String>, TemplateRenderer)> {
    let loader = repo_loader();
    Ok((loader.enumerate()?, loader.load()?))
}

fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| *c != ' ' && *c != '\n').collect()
}

#[test]
fn test_every_skipped_template_exists() -> Result<()> {
    let (templates, _) = load_repo()?;
    let audit = SkipList::builtin().audit(&templates);
    assert!(audit.stale.is_empty(), "stale skip entries: {:?}", audit.stale);
    assert!(audit.multi_reason.is_empty());
    Ok(())
}

#[test]
fn test_enumeration_excludes_markdown_sources() -> Result<()> {
    let (templates, _) = load_repo()?;
    assert!(templates.iter().all(|t| !t.ends_with(".md")));
    assert!(templates.contains(&"zerver/help/main.html".to_string()));
    assert!(templates.contains(&"zerver/api_content.json".to_string()));
    Ok(())
}

/// Every template outside the skip list renders with the default dummy context.
#[test]
fn test_smoke_render_all_templates() -> Result<()> {
    init_test_logging(None);
    let (templates, renderer) = load_repo()?;
    let skip = build_skip_list();
    let selected: Vec<&String> = templates.iter().filter(|t| !skip.contains(*t)).collect();
    assert!(!selected.is_empty());

    let context = dummy_contexts().build(RenderContext::new())?;
    let rendered = render_templates(&renderer, &selected, &context)?;
    assert_eq!(rendered, selected.len());
    assert_eq!(templates.len() - selected.len(), skip.len());
    Ok(())
}

/// Deferred templates need list-shaped `data`.
#[test]
fn test_render_deferred_templates() -> Result<()> {
    let (_, renderer) = load_repo()?;
    let skip_list = SkipList::builtin();
    let deferred = skip_list.partition(SkipReason::Defer);
    assert_eq!(deferred, ["analytics/activity.html"]);

    let context = dummy_contexts().build(deferred_overrides())?;
    assert_eq!(render_templates(&renderer, deferred, &context)?, 1);

    let html = render_single(&renderer, "analytics/activity.html", &context)?;
    assert!(html.contains("<td>one</td>"));
    assert!(html.contains("<td>two</td>"));
    Ok(())
}

#[test]
fn test_deferred_template_fails_with_default_data() -> Result<()> {
    let (_, renderer) = load_repo()?;
    let context = dummy_contexts().build(RenderContext::new())?;

    let err = render_single(&renderer, "analytics/activity.html", &context).unwrap_err();
    assert_eq!(err.template(), "analytics/activity.html");
    assert!(!err.is_load_error());
    Ok(())
}

#[test]
fn test_smoke_pass_report() -> Result<()> {
    let (templates, renderer) = load_repo()?;
    let report = smoke_pass(&renderer, &templates, &SkipList::builtin(), &dummy_contexts())?;

    assert_eq!(report.skipped, build_skip_list().len());
    assert_eq!(report.rendered, templates.len() - report.skipped);
    assert_eq!(report.deferred_rendered, 1);
    Ok(())
}

#[test]
fn test_markdown_embedding() -> Result<()> {
    let (_, renderer) = load_repo()?;
    let context = dummy_contexts().build(
        RenderContext::new()
            .with("markdown_test_file", json!("zerver/tests/markdown/test_markdown.md")),
    )?;

    let html = render_single(&renderer, "tests/test_markdown.html", &context)?;
    assert_eq!(
        strip_whitespace(&html),
        "header<h1id=\"hello\">Hello!</h1><p>Thisissome<em>boldtext</em>.</p>footer"
    );
    Ok(())
}

#[test]
fn test_help_article_is_embedded() -> Result<()> {
    let (_, renderer) = load_repo()?;
    let context = dummy_contexts().build(RenderContext::new())?;

    let html = render_single(&renderer, "zerver/help/main.html", &context)?;
    assert!(html.contains("<h1 id=\"help-center\">Help center</h1>"));
    assert!(html.contains("<table>"));
    Ok(())
}

#[test]
fn test_render_is_idempotent() -> Result<()> {
    let (_, renderer) = load_repo()?;
    let context = dummy_contexts().build(RenderContext::new())?;

    let first = render_single(&renderer, "zerver/login.html", &context)?;
    let second = render_single(&renderer, "zerver/login.html", &context)?;
    assert_eq!(first, second);
    assert!(first.contains("Log in to testing"));
    assert!(first.contains("www.zulip.com"));
    Ok(())
}

#[test]
fn test_template_in_two_partitions_is_skipped_once() -> Result<()> {
    let mut skip_list = SkipList::new();
    skip_list.extend(SkipReason::Covered, ["zerver/login.html"]);
    skip_list.extend(SkipReason::LoggedOut, ["zerver/login.html"]);

    let templates = vec!["zerver/login.html".to_string(), "zerver/register.html".to_string()];
    assert_eq!(skip_list.filter(&templates), vec!["zerver/register.html".to_string()]);
    assert_eq!(skip_list.identifiers().len(), 1);

    let audit = skip_list.audit(&templates);
    assert_eq!(audit.multi_reason.len(), 1);
    Ok(())
}

#[test]
fn test_first_failure_stops_the_pass() -> Result<()> {
    let ws = TemplateWorkspace::new()?;
    ws.write_template("a_broken.html", "{{ missing_one }}")?;
    ws.write_template("b_broken.html", "{{ missing_two }}")?;
    ws.write_template("c_fine.html", "fine")?;

    let recorder = Arc::new(RenderRecorder::new());
    let renderer = ws.loader().load()?.with_recorder(recorder.clone());
    let context = RenderContext::new();

    let err = render_templates(&renderer, ["a_broken.html", "b_broken.html", "c_fine.html"], &context)
        .unwrap_err();
    assert_eq!(err.template(), "a_broken.html");
    assert_eq!(recorder.functional_count("c_fine.html"), 0);
    Ok(())
}

#[test]
fn test_missing_variable_is_named() -> Result<()> {
    let ws = TemplateWorkspace::new()?;
    ws.write_template("greeting.html", "Hello {{ user_nmae }}")?;
    let renderer = ws.loader().load()?;
    let context = RenderContext::new().with("user_name", json!("Hamlet"));

    match render_single(&renderer, "greeting.html", &context) {
        Err(TemplateError::VariableNotFound { variable, suggestions, .. }) => {
            assert_eq!(variable, "user_nmae");
            assert!(suggestions.contains(&"user_name".to_string()));
        }
        other => panic!("expected VariableNotFound, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_unknown_template_suggests_close_match() -> Result<()> {
    let (_, renderer) = load_repo()?;

    match renderer.get_template("zerver/logn.html") {
        Err(TemplateError::NotFound { template, suggestions }) => {
            assert_eq!(template, "zerver/logn.html");
            assert!(suggestions.contains(&"zerver/login.html".to_string()));
        }
        Err(other) => panic!("expected NotFound, got {:?}", other),
        Ok(_) => panic!("zerver/logn.html should not resolve"),
    }
    Ok(())
}

#[test]
fn test_coverage_marks_dummy_renders_shallow() -> Result<()> {
    let (templates, renderer) = load_repo()?;
    let recorder = Arc::new(RenderRecorder::new());
    let renderer = renderer.with_recorder(recorder.clone());

    smoke_pass(&renderer, &templates, &SkipList::builtin(), &dummy_contexts())?;
    let report = recorder.report(&templates);

    assert!(report.functional.is_empty());
    assert!(report.shallow_only.contains(&"zerver/login.html".to_string()));
    assert!(report.never_rendered.contains(&"zerver/home.html".to_string()));
    assert_eq!(recorder.untested(&templates).len(), templates.len());

    let functional = dummy_contexts().build(RenderContext::new().with("shallow_tested", json!(false)))?;
    render_single(&renderer, "zerver/login.html", &functional)?;
    assert_eq!(recorder.functional_count("zerver/login.html"), 1);
    Ok(())
}
