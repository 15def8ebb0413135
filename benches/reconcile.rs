//! Benchmarks for aggregation, reconciliation and saving.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use liftlog::{
    aggregate, encode_row, reconcile, AccessToken, DiskGateway, DiskGatewayConfig, ExerciseRecord,
    LedgerConfig, Row, RowTuple, Session, SetRecord, WorkoutLedger,
};
use tempfile::TempDir;

const EXERCISES: [&str; 6] = ["Squat", "Bench Press", "Deadlift", "Row", "Curl", "Dip"];

/// A month of rows: `days` dates, six exercises, five sets each.
fn month_rows(days: usize) -> Vec<Row> {
    let mut rows = Vec::with_capacity(days * EXERCISES.len() * 5);
    for day in 1..=days {
        let date = format!("2024-05-{:02}", day);
        for exercise in EXERCISES {
            for set in 1..=5 {
                let tuple = RowTuple::new(&date, exercise, &SetRecord::new(set, "5", "100"));
                rows.push(encode_row(&tuple));
            }
        }
    }
    rows
}

fn edited_day() -> Vec<ExerciseRecord> {
    EXERCISES
        .iter()
        .map(|name| {
            (1..=6).fold(ExerciseRecord::new(*name), |record, set| {
                record.with_set(SetRecord::new(set, "5", "105"))
            })
        })
        .collect()
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");

    for days in [1, 10, 31] {
        let rows = month_rows(days);
        group.bench_with_input(BenchmarkId::new("days", days), &rows, |b, rows| {
            b.iter(|| black_box(aggregate(rows, "2024-05-01")));
        });
    }

    group.finish();
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");
    let records = edited_day();

    for days in [1, 10, 31] {
        let rows = month_rows(days);
        group.bench_with_input(BenchmarkId::new("days", days), &rows, |b, rows| {
            b.iter(|| black_box(reconcile(rows, &records, "2024-05-01")));
        });
    }

    group.finish();
}

fn bench_disk_save(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let gateway = DiskGateway::open_or_create(DiskGatewayConfig {
        path: dir.path().join("store"),
        cache_size: 8,
        create_if_missing: true,
    })
    .unwrap();
    let folder = gateway.create_folder("fitness-tracker").unwrap();
    let ws = gateway.create_workspace(&folder, "Alice").unwrap();
    let ledger = WorkoutLedger::new(
        gateway,
        Session::with_token(AccessToken::new("token")),
        LedgerConfig::default(),
    );

    for day in 1..=10 {
        let date = format!("2024-05-{:02}", day);
        ledger.save(&ws.id, "May 2024", &date, &edited_day()).unwrap();
    }

    let mut round = 0u64;
    c.bench_function("disk_save_edit", |b| {
        b.iter(|| {
            round += 1;
            let records = vec![ExerciseRecord::new("Squat")
                .with_set(SetRecord::new(1, "5", round.to_string()))];
            black_box(ledger.save(&ws.id, "May 2024", "2024-05-01", &records).unwrap());
        });
    });
}

criterion_group!(benches, bench_aggregate, bench_reconcile, bench_disk_save);
criterion_main!(benches);
