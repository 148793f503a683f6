//! Full pipeline runs against a scratch frontend tree.

use preview_patcher::{
    load_builtin, ApplicationOutcome, CommitOutcome, MatchSource, Patcher, RuleSet,
    TransformationRule, NO_CHANGES_MESSAGE,
};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const TARGET: &str = "frontend/src/components/reports/ClientMonthlyReport.jsx";
const FIXTURE: &str = include_str!("fixtures/ClientMonthlyReport.jsx");
const GOLDEN: &str = include_str!("fixtures/ClientMonthlyReport.patched.jsx");
const LEGACY: &str = include_str!("fixtures/LegacyHandlers.jsx");
const LEGACY_GOLDEN: &str = include_str!("fixtures/LegacyHandlers.patched.jsx");

fn workspace_with(content: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join(TARGET);
    fs::create_dir_all(target.parent().unwrap()).unwrap();
    fs::write(&target, content).unwrap();
    (dir, target)
}

fn backup_of(target: &Path) -> PathBuf {
    target.with_file_name("ClientMonthlyReport.jsx.bak")
}

fn outcome_of<'a>(outcomes: &'a [preview_patcher::RuleOutcome], id: &str) -> &'a ApplicationOutcome {
    &outcomes
        .iter()
        .find(|o| o.rule_id == id)
        .unwrap_or_else(|| panic!("no outcome for {id}"))
        .outcome
}

#[test]
fn test_full_rule_set_matches_golden() {
    let (dir, target) = workspace_with(FIXTURE);

    let report = Patcher::builtin(dir.path()).unwrap().run().unwrap();

    assert_eq!(fs::read_to_string(&target).unwrap(), GOLDEN);
    assert_eq!(fs::read_to_string(backup_of(&target)).unwrap(), FIXTURE);
    assert_eq!(
        report.commit,
        CommitOutcome::Committed {
            target: target.clone(),
            backup: backup_of(&target),
        }
    );
    assert!(report.status_line().starts_with("Updated "));
    assert!(report
        .outcomes
        .iter()
        .all(|o| matches!(o.outcome, ApplicationOutcome::Applied { via: MatchSource::Primary, .. })));
}

#[test]
fn test_second_run_is_noop_and_keeps_first_backup() {
    let (dir, target) = workspace_with(FIXTURE);
    let patcher = Patcher::builtin(dir.path()).unwrap();

    patcher.run().unwrap();
    let second = patcher.run().unwrap();

    assert_eq!(second.commit, CommitOutcome::NoChanges { target: target.clone() });
    assert_eq!(second.status_line(), NO_CHANGES_MESSAGE);
    assert!(second
        .outcomes
        .iter()
        .all(|o| o.outcome == ApplicationOutcome::SkippedAlreadyPresent));
    assert_eq!(fs::read_to_string(&target).unwrap(), GOLDEN);
    assert_eq!(fs::read_to_string(backup_of(&target)).unwrap(), FIXTURE);
}

#[test]
fn test_fully_patched_document_is_untouched() {
    let (dir, target) = workspace_with(GOLDEN);

    let report = Patcher::builtin(dir.path()).unwrap().run().unwrap();

    assert!(!report.is_changed());
    assert!(!backup_of(&target).exists());
    assert_eq!(fs::read_to_string(&target).unwrap(), GOLDEN);
}

#[test]
fn test_single_state_line_gets_three_declarations() {
    let line = "const [rpOpen, setRpOpen] = useState(false);";
    let (dir, target) = workspace_with(line);

    let report = Patcher::builtin(dir.path()).unwrap().run().unwrap();

    assert_eq!(
        fs::read_to_string(&target).unwrap(),
        "const [rpOpen, setRpOpen] = useState(false);\n\
         \x20 const [rpUrl, setRpUrl] = useState(null);\n\
         \x20 const [rpLoading, setRpLoading] = useState(false);\n\
         \x20 const [rpError, setRpError] = useState(null);\n"
    );
    assert_eq!(fs::read_to_string(backup_of(&target)).unwrap(), line);
    assert_eq!(
        report.not_found(),
        vec![
            "preview-url-helper",
            "preview-fetch-handlers",
            "preview-effects",
            "preview-iframe",
        ]
    );
}

#[test]
fn test_handler_pair_replaced_once() {
    let (dir, target) = workspace_with(FIXTURE);
    Patcher::builtin(dir.path()).unwrap().run().unwrap();
    let patched = fs::read_to_string(&target).unwrap();

    let config = load_builtin().unwrap();
    let handlers = config
        .rules
        .iter()
        .find(|r| r.id == "preview-fetch-handlers")
        .unwrap();
    let pair = Regex::new(&handlers.primary.pattern).unwrap();

    assert!(pair.is_match(FIXTURE));
    assert!(!pair.is_match(&patched));
    assert_eq!(patched.matches("const openReportPreviewDrawer").count(), 1);
    assert_eq!(patched.matches("async function fetchPreviewPdf()").count(), 1);

    // Without its guard the rule still has nothing left to match.
    let mut unguarded = handlers.clone();
    unguarded.unless_present = None;
    let rule = TransformationRule::from_definition(&unguarded).unwrap();
    let (after, outcome) = rule.apply(patched.clone()).unwrap();
    assert!(matches!(outcome, ApplicationOutcome::SkippedNotFound { .. }));
    assert_eq!(after, patched);
}

#[test]
fn test_legacy_close_handler_uses_fallback() {
    let (dir, target) = workspace_with(LEGACY);
    let patcher = Patcher::builtin(dir.path()).unwrap();

    let report = patcher.run().unwrap();

    match outcome_of(&report.outcomes, "preview-fetch-handlers") {
        ApplicationOutcome::Applied { via, .. } => assert_eq!(*via, MatchSource::Fallback),
        other => panic!("unexpected outcome: {other:?}"),
    }
    let patched = fs::read_to_string(&target).unwrap();
    assert_eq!(patched, LEGACY_GOLDEN);
    assert!(patched.contains(
        "const closeReportPreviewDrawer = () => setRpOpen(false);\n\n  async function fetchPreviewPdf() {"
    ));
    assert_eq!(patched.matches("async function fetchPreviewPdf()").count(), 1);

    let rerun = patcher.run().unwrap();
    assert_eq!(rerun.status_line(), NO_CHANGES_MESSAGE);
    assert!(rerun
        .outcomes
        .iter()
        .all(|o| o.outcome == ApplicationOutcome::SkippedAlreadyPresent));
    assert_eq!(fs::read_to_string(&target).unwrap(), LEGACY_GOLDEN);
    assert_eq!(fs::read_to_string(backup_of(&target)).unwrap(), LEGACY);
}

#[test]
fn test_partial_patch_is_written_and_reported() {
    let content = "\
export default function Report({ selectedUnit, yearMonth }) {
  const [rpOpen, setRpOpen] = useState(false);
  return (
    <iframe
      src={`${API_BASE}/api/reports/preview?unitId=${selectedUnit.unitId}&yearMonth=${yearMonth}`}
    />
  );
}
";
    let (dir, target) = workspace_with(content);

    let report = Patcher::builtin(dir.path()).unwrap().run().unwrap();

    assert!(report.is_changed());
    assert_eq!(
        report.not_found(),
        vec!["preview-url-helper", "preview-fetch-handlers", "preview-effects"]
    );
    let patched = fs::read_to_string(&target).unwrap();
    assert!(patched.contains("const [rpError, setRpError] = useState(null);"));
    assert!(patched.contains("src={rpUrl}"));
    assert!(!patched.contains("/api/reports/preview?unitId="));
}

#[test]
fn test_document_without_anchors_is_noop() {
    let content = "export default function Empty() {\n  return null;\n}\n";
    let (dir, target) = workspace_with(content);

    let report = Patcher::builtin(dir.path()).unwrap().run().unwrap();

    assert_eq!(report.status_line(), NO_CHANGES_MESSAGE);
    assert_eq!(report.not_found().len(), 5);
    assert!(!backup_of(&target).exists());
    assert_eq!(fs::read_to_string(&target).unwrap(), content);
}

#[test]
fn test_near_miss_points_at_drifted_line() {
    let content = "  const [rpOpen, setRpOpen] = useState(true);\n";
    let rules = RuleSet::from_config(&load_builtin().unwrap()).unwrap();

    let run = rules.apply(content.to_string()).unwrap();

    match &run.outcomes[0].outcome {
        ApplicationOutcome::SkippedNotFound {
            near_miss: Some(hit),
        } => assert_eq!(hit.line, 1),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(run.buffer, content);
}

#[test]
fn test_anchor_shape_alone_covers_handlers_and_iframe() {
    let mut config = load_builtin().unwrap();
    for rule in &mut config.rules {
        rule.unless_present = None;
    }
    let unguarded = RuleSet::from_config(&config).unwrap();

    let rerun = unguarded.apply(GOLDEN.to_string()).unwrap();

    assert_eq!(
        rerun.not_found(),
        vec!["preview-fetch-handlers", "preview-iframe"]
    );
    assert_eq!(
        rerun.applied(),
        vec!["preview-state", "preview-url-helper", "preview-effects"]
    );
}
