//! Persistence tests for the disk gateway.

use liftlog::{
    AccessToken, DiskGateway, DiskGatewayConfig, ExerciseRecord, LedgerConfig, LedgerError,
    Session, SetRecord, WorkoutLedger,
};
use tempfile::TempDir;

fn config(dir: &TempDir) -> DiskGatewayConfig {
    DiskGatewayConfig {
        path: dir.path().join("store"),
        cache_size: 4,
        create_if_missing: true,
    }
}

fn ledger(gateway: DiskGateway) -> WorkoutLedger<DiskGateway> {
    WorkoutLedger::new(
        gateway,
        Session::with_token(AccessToken::new("token")),
        LedgerConfig::default(),
    )
}

fn records() -> Vec<ExerciseRecord> {
    vec![
        ExerciseRecord::new("Squat")
            .with_set(SetRecord::new(1, "5", "100"))
            .with_set(SetRecord::new(2, "5", "102.5")),
        ExerciseRecord::new("Overhead Press").with_set(SetRecord::new(1, "8", "40")),
    ]
}

#[test]
fn test_workout_survives_reopen() {
    let dir = TempDir::new().unwrap();

    let ws = {
        let gateway = DiskGateway::open_or_create(config(&dir)).unwrap();
        let folder = gateway.create_folder("fitness-tracker").unwrap();
        let ws = gateway.create_workspace(&folder, "Alice").unwrap();

        let ledger = ledger(gateway);
        ledger.save(&ws.id, "May 2024", "2024-05-01", &records()).unwrap();
        ws
    };

    let gateway = DiskGateway::open_or_create(config(&dir)).unwrap();
    let ledger = ledger(gateway);

    assert_eq!(ledger.list_workspaces().unwrap(), vec![ws.clone()]);
    assert_eq!(ledger.list_months(&ws.id).unwrap(), vec!["May 2024"]);
    assert_eq!(ledger.list_dates(&ws.id, "May 2024").unwrap(), vec!["2024-05-01"]);
    assert_eq!(
        ledger.load(&ws.id, "May 2024", "2024-05-01").unwrap(),
        records()
    );
}

#[test]
fn test_edits_after_reopen_update_in_place() {
    let dir = TempDir::new().unwrap();

    let ws = {
        let gateway = DiskGateway::open_or_create(config(&dir)).unwrap();
        let folder = gateway.create_folder("fitness-tracker").unwrap();
        let ws = gateway.create_workspace(&folder, "Alice").unwrap();
        ledger(gateway)
            .save(&ws.id, "May 2024", "2024-05-01", &records())
            .unwrap();
        ws
    };

    let gateway = DiskGateway::open(config(&dir)).unwrap();
    let ledger = ledger(gateway);

    let mut edited = records();
    edited[0].sets[1].reps = "4".to_string();
    let report = ledger
        .save(&ws.id, "May 2024", "2024-05-01", &edited)
        .unwrap();
    assert_eq!(report.updated, 1);
    assert_eq!(report.appended, 0);
    assert_eq!(report.unchanged, 2);

    let grid = ledger.gateway().snapshot(&ws.id, "May 2024").unwrap();
    assert_eq!(grid.len(), 4);
    assert_eq!(grid[2][3], "4");
}

#[test]
fn test_blank_weight_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let bodyweight = vec![ExerciseRecord::new("Pull Up").with_set(SetRecord::new(1, "10", ""))];

    let ws = {
        let gateway = DiskGateway::open_or_create(config(&dir)).unwrap();
        let folder = gateway.create_folder("fitness-tracker").unwrap();
        let ws = gateway.create_workspace(&folder, "Alice").unwrap();
        ledger(gateway)
            .save(&ws.id, "May 2024", "2024-05-01", &bodyweight)
            .unwrap();
        ws
    };

    let ledger = ledger(DiskGateway::open(config(&dir)).unwrap());
    assert_eq!(
        ledger.load(&ws.id, "May 2024", "2024-05-01").unwrap(),
        bodyweight
    );
    let report = ledger
        .save(&ws.id, "May 2024", "2024-05-01", &bodyweight)
        .unwrap();
    assert_eq!(report.appended, 0);
    assert_eq!(report.unchanged, 1);
}

#[test]
fn test_second_open_is_locked() {
    let dir = TempDir::new().unwrap();
    let _first = DiskGateway::open_or_create(config(&dir)).unwrap();

    let second = DiskGateway::open(config(&dir));
    assert!(matches!(second, Err(LedgerError::Locked)));
}

#[test]
fn test_small_cache_still_serves_every_workspace() {
    let dir = TempDir::new().unwrap();
    let gateway = DiskGateway::open_or_create(DiskGatewayConfig {
        cache_size: 1,
        ..config(&dir)
    })
    .unwrap();
    let folder = gateway.create_folder("fitness-tracker").unwrap();
    let alice = gateway.create_workspace(&folder, "Alice").unwrap();
    let bob = gateway.create_workspace(&folder, "Bob").unwrap();

    let ledger = ledger(gateway);
    ledger.save(&alice.id, "May 2024", "2024-05-01", &records()).unwrap();
    ledger.save(&bob.id, "May 2024", "2024-05-01", &records()[..1]).unwrap();

    assert_eq!(ledger.load(&alice.id, "May 2024", "2024-05-01").unwrap().len(), 2);
    assert_eq!(ledger.load(&bob.id, "May 2024", "2024-05-01").unwrap().len(), 1);
}
