use branchmap_core::render::{Action, BACK_LABEL, NO_RESULTS_TEXT};
use branchmap_core::{
    CallbackHost, Dataset, FileSource, GeometryState, LoadOutcome, Outcome, RecordingHost,
    Selector, SelectorConfig, SelectorError, View,
};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

const DATA: &str = r#"{
    "Rajasthan": { "Ajmer": "addr1", "Jaipur": "addr2" },
    "Maharashtra": { "Pune": "Pune office" },
    "Kerala": {}
}"#;

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn selector() -> Selector<RecordingHost> {
    let db = Dataset::from_json_str(DATA).unwrap();
    Selector::new(db, SelectorConfig::default(), RecordingHost::default())
}

#[test]
fn zero_branch_region_is_a_no_op() {
    let mut s = selector();
    let before = s.state().clone();
    let out = s.select_region("Kerala");

    assert!(matches!(out, Outcome::Declined(_)));
    assert_eq!(s.view(), View::Overview);
    assert_eq!(s.selection(), before.selection());
    assert_eq!(s.host().region_selections(), 0);
}

#[test]
fn operational_region_opens_detail_and_notifies_once() {
    let mut s = selector();
    assert_eq!(s.select_region("Rajasthan"), Outcome::Changed);

    assert_eq!(s.view(), View::RegionDetail);
    assert_eq!(s.selection().region.as_deref(), Some("Rajasthan"));
    assert_eq!(s.selection().branch, None);
    assert_eq!(s.state().filter(), "");
    assert_eq!(s.host().region_selections(), 1);
}

#[test]
fn clearing_the_filter_restores_all_branches() {
    let mut s = selector();
    s.select_region("Rajasthan");

    s.filter_branches("jai");
    let visible = s.visible_branches().unwrap();
    assert_eq!(visible.visible_names(), ["Jaipur"]);
    assert_eq!(visible.summary(), "Showing 1 of 2 branches");

    s.filter_branches("");
    let visible = s.visible_branches().unwrap();
    assert_eq!(visible.visible.len(), 2);
    assert_eq!(visible.summary(), "Showing all 2 branches");
}

#[test]
fn only_the_last_branch_is_selected() {
    let mut s = selector();
    s.select_region("Rajasthan");
    s.select_branch("Rajasthan", "Ajmer");
    s.select_branch("Rajasthan", "Jaipur");

    let tree = s.render();
    let selected = tree.find_by_class("selected");
    assert_eq!(selected.len(), 1);
    assert_eq!(
        selected[0].attrs.get("data-branch-name").map(String::as_str),
        Some("jaipur")
    );
    assert_eq!(s.selection().branch.as_deref(), Some("Jaipur"));
}

#[test]
fn reset_from_any_detail_state() {
    let mut s = selector();
    s.select_region("Rajasthan");
    s.filter_branches("aj");
    s.select_branch("Rajasthan", "Ajmer");

    assert_eq!(s.reset_to_overview(), Outcome::Changed);
    assert_eq!(s.view(), View::Overview);
    assert_eq!(s.selection().region, None);
    assert_eq!(s.selection().branch, None);
    assert_eq!(s.state().filter(), "");
    assert_eq!(s.reset_to_overview(), Outcome::Unchanged);
}

#[test]
fn end_to_end_with_callbacks() {
    let regions = Rc::new(RefCell::new(Vec::<String>::new()));
    let branches = Rc::new(RefCell::new(Vec::<(String, String, String)>::new()));

    let host = {
        let regions = Rc::clone(&regions);
        let branches = Rc::clone(&branches);
        CallbackHost::new()
            .on_region(move |r| regions.borrow_mut().push(r.to_owned()))
            .on_branch(move |r, b, a| {
                branches
                    .borrow_mut()
                    .push((r.to_owned(), b.to_owned(), a.to_owned()))
            })
    };

    let db = Dataset::from_json_str(r#"{ "Rajasthan": {"Ajmer":"addr1","Jaipur":"addr2"} }"#)
        .unwrap();
    let mut s = Selector::new(db, SelectorConfig::default(), host);

    s.select_region("Rajasthan");
    s.select_branch("Rajasthan", "Jaipur");

    assert_eq!(*regions.borrow(), ["Rajasthan"]);
    assert_eq!(
        *branches.borrow(),
        [("Rajasthan".to_owned(), "Jaipur".to_owned(), "addr2".to_owned())]
    );
    assert_eq!(s.selection().region.as_deref(), Some("Rajasthan"));
    assert_eq!(s.selection().branch.as_deref(), Some("Jaipur"));
}

#[test]
fn detail_view_tree() {
    let mut s = selector();
    s.select_region("Rajasthan");
    let tree = s.render();

    let back = tree.find_by_class("back");
    assert_eq!(back.len(), 1);
    assert_eq!(back[0].action, Some(Action::Back));
    assert!(tree.text_content().contains(BACK_LABEL));

    assert_eq!(tree.find_by_class("branch-card").len(), 2);
    let count = tree.find_by_class("branch-count");
    assert_eq!(count.len(), 1);
    assert!(tree.text_content().contains("Showing all 2 branches"));

    let search = tree.find_by_class("branch-search");
    assert_eq!(search[0].action, Some(Action::Filter));

    s.filter_branches("zzz");
    let tree = s.render();
    assert!(tree.find_by_class("branch-grid").is_empty());
    assert_eq!(tree.find_by_class("no-results").len(), 1);
    assert!(tree.text_content().contains(NO_RESULTS_TEXT));
}

#[test]
fn overview_from_topology_files() {
    let mut s = selector();
    s.initialize(&FileSource::new(fixtures())).unwrap();

    let tree = s.render();
    assert_eq!(tree.find_by_tag("svg").len(), 1);

    let paths = tree.find_by_tag("path");
    assert_eq!(paths.len(), 4);
    let class_of = |name: &str| {
        paths
            .iter()
            .find(|p| p.attrs.get("data-region").map(String::as_str) == Some(name))
            .map(|p| p.has_class("operational"))
    };
    assert_eq!(class_of("Rajasthan"), Some(true));
    assert_eq!(class_of("Maharashtra"), Some(true));
    assert_eq!(class_of("Kerala"), Some(false));
    assert_eq!(class_of("Unknown"), Some(false));

    let labels: Vec<_> = tree
        .find_by_class("region-label")
        .iter()
        .map(|e| e.text_content())
        .collect();
    assert_eq!(labels, ["Rajasthan", "Maharashtra"]);
}

#[test]
fn label_offset_is_applied() {
    let mut s = selector();
    s.initialize(&FileSource::new(fixtures())).unwrap();
    let centroid = s.layer().unwrap().shape("Maharashtra").unwrap().centroid.unwrap();

    let tree = s.render();
    let label = tree
        .find_by_class("region-label")
        .into_iter()
        .find(|e| e.text_content() == "Maharashtra")
        .cloned();
    let label = label.unwrap();
    let y: f64 = label.attrs["y"].parse().unwrap();
    assert!((y - (centroid[1] + 20.0)).abs() < 0.01);
}

#[test]
fn rejected_region_shows_notice_in_overview() {
    let mut s = selector();
    s.initialize(&FileSource::new(fixtures())).unwrap();
    s.select_region("Kerala");

    let tree = s.render();
    let notice = tree.find_by_class("notice");
    assert_eq!(notice.len(), 1);
    assert!(tree.text_content().contains("Kerala: No branches available"));

    // The notice goes away with the next successful transition.
    s.select_region("Rajasthan");
    s.back();
    assert!(s.render().find_by_class("notice").is_empty());
}

#[test]
fn failed_fetch_shows_retry_and_recovers() {
    let mut s = selector();
    let missing = FileSource::new(fixtures().join("does-not-exist"));

    let err = s.initialize(&missing).unwrap_err();
    assert!(matches!(err, SelectorError::DatasetLoad(_)));
    assert!(err.is_retryable());

    let tree = s.render();
    assert!(tree.find_by_tag("svg").is_empty());
    let retry = tree.find_by_class("retry");
    assert_eq!(retry.len(), 1);
    assert_eq!(retry[0].action, Some(Action::Retry));

    assert_eq!(s.retry(&FileSource::new(fixtures())), LoadOutcome::Applied);
    assert_eq!(s.render().find_by_tag("svg").len(), 1);
    assert_eq!(s.retry(&FileSource::new(fixtures())), LoadOutcome::Skipped);
}

#[test]
fn malformed_topology_fails_cleanly() {
    let mut s = selector();
    let ticket = s.begin_geometry_load().unwrap();
    let out = s.finish_geometry_load(ticket, Ok(b"{ not json".to_vec()));
    assert!(matches!(out, LoadOutcome::Failed(_)));
    assert!(matches!(s.geometry(), GeometryState::Failed(_)));
}

#[test]
fn stale_response_is_discarded() {
    let mut s = selector();
    let first = s.begin_geometry_load().unwrap();
    assert!(s.begin_geometry_load().is_none());

    let out = s.finish_geometry_load(first, Err(SelectorError::DatasetLoad("offline".into())));
    assert!(matches!(out, LoadOutcome::Failed(_)));

    let second = s.begin_geometry_load().unwrap();
    let bytes = std::fs::read(fixtures().join("india.json")).unwrap();

    // A late duplicate of the first response must not clobber the retry.
    assert_eq!(
        s.finish_geometry_load(first, Ok(bytes.clone())),
        LoadOutcome::Discarded
    );
    assert_eq!(*s.geometry(), GeometryState::Loading);

    assert_eq!(s.finish_geometry_load(second, Ok(bytes)), LoadOutcome::Applied);
    assert!(s.layer().is_some());
}

#[test]
fn navigation_does_not_cancel_the_fetch() {
    let mut s = selector();
    let ticket = s.begin_geometry_load().unwrap();
    s.select_region("Rajasthan");
    s.back();

    let bytes = std::fs::read(fixtures().join("india.json")).unwrap();
    assert_eq!(s.finish_geometry_load(ticket, Ok(bytes)), LoadOutcome::Applied);
}

#[test]
fn overview_without_geometry_lists_regions() {
    let s = selector();
    let tree = s.render();
    let buttons = tree.find_by_tag("button");
    assert_eq!(buttons.len(), 3);
    assert!(buttons[2].has_class("disabled"));
    assert_eq!(
        buttons[0].action,
        Some(Action::SelectRegion {
            region: "Rajasthan".into()
        })
    );
}
