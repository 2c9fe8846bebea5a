use crate::support::scenario_path;
use clap::Parser;
use infranav::config::NavConfig;
use infranav::tooling::cli::{Cli, CliContext};
use tempfile::TempDir;

fn run(state_dir: &TempDir, args: &[&str]) -> String {
    let seed = scenario_path();
    let state = state_dir.path().join("state");
    let mut argv = vec![
        "infranav".to_string(),
        "--seed".to_string(),
        seed.display().to_string(),
        "--state".to_string(),
        state.display().to_string(),
    ];
    argv.extend(args.iter().map(|a| a.to_string()));

    let cli = Cli::try_parse_from(argv).unwrap();
    let mut config = NavConfig::default();
    config.state.path = cli.state.clone();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let context = CliContext::new(&cli, config).unwrap();
    runtime.block_on(context.execute(&cli.command)).unwrap()
}

#[test]
fn select_persists_across_invocations() {
    let temp_dir = TempDir::new().unwrap();

    let out = run(&temp_dir, &["select", "vm", "VM1"]);
    assert_eq!(out, "HQ > DC-A > C1 > N1 > corp.local > WEB01");

    let out = run(&temp_dir, &["state"]);
    assert!(out.contains("vm=VM1"));
    assert!(out.contains("Expanded (6)"));
    assert!(out.contains("Breadcrumb: HQ > DC-A > C1 > N1 > corp.local > WEB01"));

    run(&temp_dir, &["collapse-all"]);
    let out = run(&temp_dir, &["state"]);
    assert!(out.contains("Expanded (0)"));
}

#[test]
fn search_lists_type_tagged_hits_in_level_order() {
    let temp_dir = TempDir::new().unwrap();
    let out = run(&temp_dir, &["search", "web"]);
    assert_eq!(out, "[vm] WEB01 (VM1)\n[vm] web-cache (VM2)");

    let out = run(&temp_dir, &["search", "w"]);
    assert_eq!(out, "(no matches)");
}

#[test]
fn json_children_output_is_parseable() {
    let temp_dir = TempDir::new().unwrap();
    let out = run(
        &temp_dir,
        &["--format", "json", "children", "vm", "--parent", "DOM1"],
    );
    let nodes: Vec<infranav::HierarchyNode> = serde_json::from_str(&out).unwrap();
    let names: Vec<_> = nodes.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["DB01", "WEB01", "web-cache"]);
}
