//! Error paths: sessions, missing resources, upstream failures, revisions.

use liftlog::{
    AccessToken, ErrorKind, ExerciseRecord, LedgerConfig, LedgerError, MemoryGateway, Revision,
    Session, SetRecord, StoreGateway, WorkoutLedger,
};

const MONTH: &str = "May 2024";
const DATE: &str = "2024-05-01";

fn gateway_with_workspace() -> (MemoryGateway, String) {
    let gateway = MemoryGateway::new();
    let folder = gateway.create_folder("fitness-tracker");
    let workspace = gateway.create_workspace(&folder, "Alice").unwrap();
    (gateway, workspace.id)
}

fn ready_session() -> Session {
    Session::with_token(AccessToken::new("token"))
}

fn squat(sets: &[(u32, &str, &str)]) -> Vec<ExerciseRecord> {
    let mut record = ExerciseRecord::new("Squat");
    for (n, reps, weight) in sets {
        record = record.with_set(SetRecord::new(*n, *reps, *weight));
    }
    vec![record]
}

// --- Session errors ---

#[test]
fn test_pending_session_is_not_initialized() {
    let (gateway, ws) = gateway_with_workspace();
    let ledger = WorkoutLedger::new(gateway, Session::pending(), LedgerConfig::default());

    let err = ledger.load(&ws, MONTH, DATE).unwrap_err();
    assert!(matches!(err, LedgerError::NotInitialized));
    assert_eq!(err.kind(), ErrorKind::NotInitialized);
}

#[test]
fn test_session_becomes_usable_once_ready() {
    let (gateway, ws) = gateway_with_workspace();
    let ledger = WorkoutLedger::new(gateway, Session::pending(), LedgerConfig::default());

    assert!(ledger.list_months(&ws).is_err());
    ledger
        .session()
        .mark_ready(AccessToken::new("token"))
        .unwrap();
    assert!(ledger.list_months(&ws).unwrap().is_empty());
}

#[test]
fn test_revoked_session() {
    let (gateway, _) = gateway_with_workspace();
    let ledger = WorkoutLedger::new(gateway, ready_session(), LedgerConfig::default());

    ledger.list_workspaces().unwrap();
    ledger.session().revoke();

    let err = ledger.list_workspaces().unwrap_err();
    assert!(matches!(err, LedgerError::SessionRevoked));
}

#[test]
fn test_rejected_token_then_reauthenticate() {
    let (gateway, ws) = gateway_with_workspace();
    let gateway = gateway.with_required_token("fresh");
    let mut ledger = WorkoutLedger::new(gateway, ready_session(), LedgerConfig::default());

    let err = ledger.list_months(&ws).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthenticated);

    ledger.replace_session(Session::with_token(AccessToken::new("fresh")));
    assert!(ledger.list_months(&ws).is_ok());
}

// --- Missing resources ---

#[test]
fn test_missing_root_folder() {
    let ledger = WorkoutLedger::new(MemoryGateway::new(), ready_session(), LedgerConfig::default());

    let err = ledger.list_workspaces().unwrap_err();
    assert!(matches!(err, LedgerError::FolderNotFound(ref name) if name == "fitness-tracker"));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_missing_month() {
    let (gateway, ws) = gateway_with_workspace();
    let ledger = WorkoutLedger::new(gateway, ready_session(), LedgerConfig::default());

    let err = ledger.load(&ws, MONTH, DATE).unwrap_err();
    assert!(matches!(err, LedgerError::ContainerNotFound(_)));
    assert!(matches!(
        ledger.list_dates(&ws, MONTH),
        Err(LedgerError::ContainerNotFound(_))
    ));
}

#[test]
fn test_missing_workspace() {
    let ledger = WorkoutLedger::new(MemoryGateway::new(), ready_session(), LedgerConfig::default());

    let err = ledger.save("ws-unknown", MONTH, DATE, &squat(&[(1, "5", "100")]));
    assert!(matches!(err, Err(LedgerError::WorkspaceNotFound(_))));
}

// --- Invalid records ---

#[test]
fn test_zero_set_number_is_rejected_before_writing() {
    let (gateway, ws) = gateway_with_workspace();
    let ledger = WorkoutLedger::new(gateway, ready_session(), LedgerConfig::default());

    let records = vec![
        ExerciseRecord::new("Bench Press").with_set(SetRecord::new(1, "10", "60")),
        ExerciseRecord::new("Squat").with_set(SetRecord::new(0, "5", "100")),
    ];
    let err = ledger.save(&ws, MONTH, DATE, &records).unwrap_err();
    assert!(matches!(err, LedgerError::InvalidRecord(_)));
    assert_eq!(err.kind(), ErrorKind::Malformed);

    assert_eq!(ledger.gateway().write_calls(), 0);
    assert_eq!(ledger.gateway().append_calls(), 0);
    assert!(ledger.list_months(&ws).unwrap().is_empty());
}

#[test]
fn test_empty_exercise_name_is_rejected_before_writing() {
    let (gateway, ws) = gateway_with_workspace();
    let ledger = WorkoutLedger::new(gateway, ready_session(), LedgerConfig::default());
    ledger.save(&ws, MONTH, DATE, &squat(&[(1, "5", "100")])).unwrap();
    let rows = ledger.gateway().snapshot(&ws, MONTH).unwrap().len();

    let unnamed = vec![ExerciseRecord::new("").with_set(SetRecord::new(1, "5", "100"))];
    for _ in 0..3 {
        let err = ledger.save(&ws, MONTH, DATE, &unnamed).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Malformed);
    }
    assert!(matches!(
        ledger.plan_save(&ws, MONTH, DATE, &unnamed),
        Err(LedgerError::InvalidRecord(_))
    ));

    assert_eq!(ledger.gateway().snapshot(&ws, MONTH).unwrap().len(), rows);
    assert_eq!(ledger.load(&ws, MONTH, DATE).unwrap(), squat(&[(1, "5", "100")]));
}

// --- Partial failure ---

#[test]
fn test_failed_save_converges_on_retry() {
    let (gateway, ws) = gateway_with_workspace();
    let ledger = WorkoutLedger::new(gateway, ready_session(), LedgerConfig::default());
    ledger
        .save(&ws, MONTH, DATE, &squat(&[(1, "5", "100"), (2, "5", "100"), (3, "5", "100")]))
        .unwrap();

    let edited = squat(&[
        (1, "5", "105"),
        (2, "5", "105"),
        (3, "4", "105"),
        (4, "3", "105"),
    ]);

    // First row write succeeds, the second fails.
    ledger.gateway().set_write_budget(Some(1));
    let err = ledger.save(&ws, MONTH, DATE, &edited).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UpstreamFailure);

    let partial = ledger.load(&ws, MONTH, DATE).unwrap();
    assert_eq!(partial[0].sets[0].weight, "105");
    assert_eq!(partial[0].sets[1].weight, "100");
    assert_eq!(partial[0].sets.len(), 3);

    ledger.gateway().set_write_budget(None);
    let report = ledger.save(&ws, MONTH, DATE, &edited).unwrap();
    assert_eq!(report.unchanged, 1);
    assert_eq!(report.updated, 2);
    assert_eq!(report.appended, 1);

    assert_eq!(ledger.load(&ws, MONTH, DATE).unwrap(), edited);
}

#[test]
fn test_failed_append_leaves_updates_in_place() {
    let (gateway, ws) = gateway_with_workspace();
    let ledger = WorkoutLedger::new(gateway, ready_session(), LedgerConfig::default());
    ledger
        .save(&ws, MONTH, DATE, &squat(&[(1, "5", "100")]))
        .unwrap();

    let edited = squat(&[(1, "5", "110"), (2, "5", "110")]);
    ledger.gateway().set_write_budget(Some(1));
    assert!(ledger.save(&ws, MONTH, DATE, &edited).is_err());

    let grid = ledger.gateway().snapshot(&ws, MONTH).unwrap();
    assert_eq!(grid.len(), 2);
    assert_eq!(grid[1][4], "110");

    ledger.gateway().set_write_budget(None);
    let report = ledger.save(&ws, MONTH, DATE, &edited).unwrap();
    assert_eq!(report.updated, 0);
    assert_eq!(report.appended, 1);
    assert_eq!(ledger.gateway().snapshot(&ws, MONTH).unwrap().len(), 3);
}

// --- Revisions ---

fn tracked_ledger() -> (WorkoutLedger<MemoryGateway>, String) {
    let (gateway, ws) = gateway_with_workspace();
    let config = LedgerConfig {
        track_revisions: true,
        ..LedgerConfig::default()
    };
    (WorkoutLedger::new(gateway, ready_session(), config), ws)
}

#[test]
fn test_revisions_count_saves() {
    let (ledger, ws) = tracked_ledger();
    assert_eq!(ledger.load_revision(&ws, MONTH, DATE).unwrap(), Revision(0));

    let first = ledger.save(&ws, MONTH, DATE, &squat(&[(1, "5", "100")])).unwrap();
    assert_eq!(first.revision, Some(Revision(1)));
    let second = ledger.save(&ws, MONTH, DATE, &squat(&[(1, "5", "105")])).unwrap();
    assert_eq!(second.revision, Some(Revision(2)));

    assert_eq!(ledger.load_revision(&ws, MONTH, DATE).unwrap(), Revision(2));
    assert_eq!(ledger.load_revision(&ws, MONTH, "2024-05-02").unwrap(), Revision(0));

    // Bookkeeping is not a month.
    assert_eq!(ledger.list_months(&ws).unwrap(), vec![MONTH]);
}

#[test]
fn test_stale_revision_conflicts_before_writing() {
    let (ledger, ws) = tracked_ledger();

    let seen = ledger.load_revision(&ws, MONTH, DATE).unwrap();
    ledger
        .save_checked(&ws, MONTH, DATE, &squat(&[(1, "5", "100")]), seen)
        .unwrap();

    let writes = ledger.gateway().write_calls();
    let appends = ledger.gateway().append_calls();

    let err = ledger
        .save_checked(&ws, MONTH, DATE, &squat(&[(1, "5", "90")]), seen)
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Conflict { expected: 0, found: 1, .. }
    ));
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(ledger.gateway().write_calls(), writes);
    assert_eq!(ledger.gateway().append_calls(), appends);

    let loaded = ledger.load(&ws, MONTH, DATE).unwrap();
    assert_eq!(loaded[0].sets[0].weight, "100");
}

#[test]
fn test_revisions_are_per_date() {
    let (ledger, ws) = tracked_ledger();
    ledger.save(&ws, MONTH, DATE, &squat(&[(1, "5", "100")])).unwrap();
    ledger.save(&ws, MONTH, "2024-05-02", &squat(&[(1, "5", "100")])).unwrap();
    ledger.save(&ws, MONTH, DATE, &squat(&[(1, "5", "100")])).unwrap();

    assert_eq!(ledger.load_revision(&ws, MONTH, DATE).unwrap(), Revision(2));
    assert_eq!(
        ledger.load_revision(&ws, MONTH, "2024-05-02").unwrap(),
        Revision(1)
    );

    // The revision container holds its own header plus one row per date.
    let rows = ledger
        .gateway()
        .read_range(
            ledger.session(),
            &ws,
            &"_revisions!A:C".parse().unwrap(),
        )
        .unwrap();
    assert_eq!(rows.len(), 3);
}
