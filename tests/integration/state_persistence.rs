use crate::support::scenario_source;
use infranav::config::SearchConfig;
use infranav::state::{
    HierarchySelection, NavigationState, SledStatePersistence, StatePersistence, EXPANDED_KEY,
    SELECTION_KEY,
};
use infranav::{Level, Navigator};
use std::sync::Arc;
use tempfile::TempDir;

fn open(dir: &TempDir) -> Arc<NavigationState> {
    let persistence = SledStatePersistence::open(&dir.path().join("state")).unwrap();
    Arc::new(NavigationState::load(Arc::new(persistence)))
}

#[test]
fn selection_and_expansion_survive_restart() {
    let temp_dir = TempDir::new().unwrap();
    let selection = HierarchySelection::default()
        .with(Level::Site, "S1")
        .with(Level::Node, "N1");
    {
        let state = open(&temp_dir);
        state.set_selection(selection.clone());
        state.toggle_node("S1");
        state.toggle_node("D1");
        state.toggle_node("D1");
    }

    let state = open(&temp_dir);
    assert_eq!(state.selection(), selection);
    assert!(state.is_expanded("S1"));
    assert!(!state.is_expanded("D1"));
}

#[test]
fn corrupt_state_starts_empty() {
    let temp_dir = TempDir::new().unwrap();
    {
        let persistence = SledStatePersistence::open(&temp_dir.path().join("state")).unwrap();
        persistence.store(SELECTION_KEY, b"\xff\xfe").unwrap();
        persistence.store(EXPANDED_KEY, b"42").unwrap();
    }

    let state = open(&temp_dir);
    assert!(state.selection().is_empty());
    assert!(state.expanded().is_empty());
}

#[tokio::test]
async fn navigation_is_restored_after_restart() {
    let temp_dir = TempDir::new().unwrap();
    {
        let nav = Navigator::new(scenario_source(), open(&temp_dir), SearchConfig::default());
        nav.navigate_to("DOM1", Level::Domain).await;
    }

    let state = open(&temp_dir);
    assert_eq!(state.selection().deepest(), Some((Level::Domain, "DOM1")));
    for id in ["S1", "D1", "C1", "N1", "DOM1"] {
        assert!(state.is_expanded(id));
    }
    // The breadcrumb is session-only
    assert!(state.current_path().is_empty());
}
