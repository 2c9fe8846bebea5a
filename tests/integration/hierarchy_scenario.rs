use crate::support::scenario_source;
use infranav::config::SearchConfig;
use infranav::state::{MemoryStatePersistence, NavigationState};
use infranav::{HierarchyNode, Level, NavigationOutcome, Navigator};
use std::sync::Arc;

fn navigator(source: Arc<infranav::source::MemoryRecordSource>) -> Navigator {
    let state = Arc::new(NavigationState::load(Arc::new(MemoryStatePersistence::new())));
    Navigator::new(source, state, SearchConfig::default())
}

fn names(path: &[HierarchyNode]) -> Vec<&str> {
    path.iter().map(|n| n.name.as_str()).collect()
}

#[tokio::test]
async fn vm_path_is_resolved_root_first() {
    let nav = navigator(scenario_source());
    let path = nav.fetch_path_to_node("VM1", Level::Vm).await;
    assert_eq!(
        names(&path),
        vec!["HQ", "DC-A", "C1", "N1", "corp.local", "WEB01"]
    );
    assert_eq!(path[0].level, Level::Site);
    assert!(path[0].parent_id.is_none());
    for pair in path.windows(2) {
        assert_eq!(pair[1].parent_id.as_deref(), Some(pair[0].id.as_str()));
    }
}

#[tokio::test]
async fn deleting_datacenter_truncates_path_to_site() {
    let source = scenario_source();
    assert!(source.remove(Level::Datacenter, "D1"));
    let nav = navigator(source);

    let path = nav.fetch_path_to_node("VM1", Level::Vm).await;
    assert_eq!(names(&path), vec!["HQ"]);
}

#[tokio::test]
async fn search_finds_vm_with_domain_parent() {
    let nav = navigator(scenario_source());
    let results = nav.search("web").await;

    let web01 = results.iter().find(|r| r.name() == "WEB01").unwrap();
    assert_eq!(web01.level(), Level::Vm);
    assert_eq!(web01.parent_id(), Some("DOM1"));
    assert!(results
        .iter()
        .all(|r| r.name().to_lowercase().contains("web")));
    assert!(!nav.is_searching());
}

#[tokio::test]
async fn children_are_scoped_to_parent() {
    let nav = navigator(scenario_source());
    let clusters = nav.fetch_children(Some("D1"), Level::Cluster).await;
    assert_eq!(names(&clusters), vec!["C1", "C2"]);
    assert!(nav.fetch_children(Some("D2"), Level::Cluster).await.is_empty());
    assert!(nav.fetch_children(None, Level::Cluster).await.is_empty());
}

#[tokio::test]
async fn browse_then_jump_to_search_hit() {
    let nav = navigator(scenario_source());

    let sites = nav.fetch_children(None, Level::Site).await;
    let hq = sites.into_iter().find(|s| s.name == "HQ").unwrap();
    nav.pin_scope(hq).unwrap();
    assert_eq!(nav.fetch_children(None, Level::Site).await.len(), 1);

    // Search and ancestor resolution ignore the pinned scope
    let hits = nav.search("branch").await;
    assert_eq!(hits.len(), 2);
    let branch_dc = hits.iter().find(|h| h.level() == Level::Datacenter).unwrap();
    let outcome = nav.open_search_result(branch_dc).await;
    assert!(matches!(outcome, NavigationOutcome::Applied(ref p) if names(p) == vec!["Branch", "Branch DC"]));

    let selection = nav.state().selection();
    assert_eq!(selection.get(Level::Site), Some("S2"));
    assert_eq!(selection.get(Level::Datacenter), Some("D3"));
    assert!(nav.state().is_expanded("S2"));
    assert!(nav.state().is_expanded("D3"));
}
