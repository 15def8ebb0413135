//! Workout ledger: navigation, load and save on top of a [`StoreGateway`].
//!
//! Containers are months (one tab per month), partitions are dates. Every
//! container starts with the header row `Date, Exercise, Set, Reps, Weight`.
//!
//! A save is a read-modify-write without transaction: read the container,
//! [`reconcile`], then issue one row write per update followed by a single bulk
//! append, strictly in sequence. Any gateway error aborts the whole save and is
//! returned as-is; rows written before the failure stay written. Re-running the
//! save converges because the diff is recomputed from a fresh read.

use crate::error::{LedgerError, Result};
use crate::gateway::StoreGateway;
use crate::range::RangeSpec;
use crate::reconcile::{reconcile, DuplicateKey, ReconcilePlan};
use crate::records::{
    aggregate, encode_row, first_column, list_container_names, list_workspaces,
    unique_partition_keys,
};
use crate::session::Session;
use crate::types::{ExerciseRecord, Revision, Row, WorkspaceRef, ROW_WIDTH};

/// Last column of the persisted row layout (E).
const LAST_COLUMN: usize = ROW_WIDTH - 1;

/// Ledger configuration.
#[derive(Clone, Debug)]
pub struct LedgerConfig {
    /// Folder holding one workspace per trainee.
    pub root_folder: String,

    /// Header written into freshly created containers.
    pub header: [String; ROW_WIDTH],

    /// Bump a per-date revision counter on every save.
    pub track_revisions: bool,

    /// Container holding revision rows `(container, date, revision)`.
    pub revision_container: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            root_folder: "fitness-tracker".to_string(),
            header: ["Date", "Exercise", "Set", "Reps", "Weight"].map(String::from),
            track_revisions: false,
            revision_container: "_revisions".to_string(),
        }
    }
}

/// Outcome of a save.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SaveReport {
    /// Rows rewritten in place.
    pub updated: usize,
    /// Rows added at the end of the container.
    pub appended: usize,
    /// Sets whose row already held the same values.
    pub unchanged: usize,
    /// Keys stored on more than one row; only the first was touched.
    pub duplicates: Vec<DuplicateKey>,
    /// Whether the container had to be created.
    pub created_container: bool,
    /// Revision after the save, when revisions are tracked.
    pub revision: Option<Revision>,
}

/// Workout log bound to one store session.
pub struct WorkoutLedger<G: StoreGateway> {
    gateway: G,
    session: Session,
    config: LedgerConfig,
}

impl<G: StoreGateway> WorkoutLedger<G> {
    pub fn new(gateway: G, session: Session, config: LedgerConfig) -> Self {
        Self {
            gateway,
            session,
            config,
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Swap in a fresh session, e.g. after re-authentication.
    pub fn replace_session(&mut self, session: Session) -> Session {
        std::mem::replace(&mut self.session, session)
    }

    // --- Navigation ---

    /// Trainee workspaces in the root folder.
    pub fn list_workspaces(&self) -> Result<Vec<WorkspaceRef>> {
        list_workspaces(&self.gateway, &self.session, &self.config.root_folder)
    }

    /// Month containers of a workspace, bookkeeping containers excluded.
    pub fn list_months(&self, workspace_id: &str) -> Result<Vec<String>> {
        let mut names = list_container_names(&self.gateway, &self.session, workspace_id)?;
        names.retain(|name| *name != self.config.revision_container);
        Ok(names)
    }

    /// Dates present in a month, in first-occurrence order.
    pub fn list_dates(&self, workspace_id: &str, month: &str) -> Result<Vec<String>> {
        let range = RangeSpec::columns(month, 0, 0);
        let rows = self.gateway.read_range(&self.session, workspace_id, &range)?;
        Ok(unique_partition_keys(&first_column(&rows)))
    }

    // --- Load ---

    /// Exercise records of one date.
    pub fn load(&self, workspace_id: &str, month: &str, date: &str) -> Result<Vec<ExerciseRecord>> {
        let rows = self.read_rows(workspace_id, month)?;
        tracing::debug!(workspace = workspace_id, month, rows = rows.len(), "read container");
        Ok(aggregate(&rows, date))
    }

    /// Current revision of a date; zero when never saved with revisions.
    pub fn load_revision(&self, workspace_id: &str, month: &str, date: &str) -> Result<Revision> {
        let names = self.gateway.list_containers(&self.session, workspace_id)?;
        if !names.contains(&self.config.revision_container) {
            return Ok(Revision::default());
        }
        let rows = self.read_revision_rows(workspace_id)?;
        Ok(find_revision(&rows, month, date)
            .map(|(_, rev)| rev)
            .unwrap_or_default())
    }

    // --- Save ---

    /// Compute what a save would do without writing anything.
    ///
    /// A missing container plans as empty.
    pub fn plan_save(
        &self,
        workspace_id: &str,
        month: &str,
        date: &str,
        records: &[ExerciseRecord],
    ) -> Result<ReconcilePlan> {
        validate_records(records)?;
        let names = self.gateway.list_containers(&self.session, workspace_id)?;
        let rows = if names.iter().any(|n| n == month) {
            self.read_rows(workspace_id, month)?
        } else {
            Vec::new()
        };
        Ok(reconcile(data_rows(&rows), records, date))
    }

    /// Persist `records` for `date`, creating the month container when needed.
    pub fn save(
        &self,
        workspace_id: &str,
        month: &str,
        date: &str,
        records: &[ExerciseRecord],
    ) -> Result<SaveReport> {
        let mut report = self.save_rows(workspace_id, month, date, records)?;
        if self.config.track_revisions {
            report.revision = Some(self.bump_revision(workspace_id, month, date)?);
        }
        Ok(report)
    }

    /// Save only if the date is still at `expected`; bumps the revision.
    ///
    /// The check and the writes are separate store calls, so this narrows the
    /// lost-update window rather than closing it.
    pub fn save_checked(
        &self,
        workspace_id: &str,
        month: &str,
        date: &str,
        records: &[ExerciseRecord],
        expected: Revision,
    ) -> Result<SaveReport> {
        let found = self.load_revision(workspace_id, month, date)?;
        if found != expected {
            tracing::warn!(
                workspace = workspace_id,
                month,
                date,
                expected = expected.0,
                found = found.0,
                "stale revision, refusing to save"
            );
            return Err(LedgerError::Conflict {
                partition: format!("{}!{}", month, date),
                expected: expected.0,
                found: found.0,
            });
        }

        let mut report = self.save_rows(workspace_id, month, date, records)?;
        report.revision = Some(self.bump_revision(workspace_id, month, date)?);
        Ok(report)
    }

    fn save_rows(
        &self,
        workspace_id: &str,
        month: &str,
        date: &str,
        records: &[ExerciseRecord],
    ) -> Result<SaveReport> {
        validate_records(records)?;
        let created = self.ensure_container(workspace_id, month)?;
        let mut rows = self.read_rows(workspace_id, month)?;
        if rows.is_empty() {
            // A container without a header would turn the first data row into one.
            self.write_header(workspace_id, month)?;
            rows.push(self.config.header.to_vec());
        }

        let plan = reconcile(data_rows(&rows), records, date);

        for update in &plan.updates {
            let range = RangeSpec::row(month, 0, LAST_COLUMN, update.sheet_row());
            tracing::debug!(range = %range, key = %update.tuple.key(), "updating row");
            self.gateway.write_range(
                &self.session,
                workspace_id,
                &range,
                &[encode_row(&update.tuple)],
            )?;
        }

        if !plan.appends.is_empty() {
            let range = RangeSpec::columns(month, 0, LAST_COLUMN);
            self.gateway
                .append_rows(&self.session, workspace_id, &range, &plan.append_rows())?;
        }

        tracing::info!(
            workspace = workspace_id,
            month,
            date,
            updated = plan.updates.len(),
            appended = plan.appends.len(),
            unchanged = plan.unchanged,
            "saved workout"
        );

        Ok(SaveReport {
            updated: plan.updates.len(),
            appended: plan.appends.len(),
            unchanged: plan.unchanged,
            duplicates: plan.duplicates,
            created_container: created,
            revision: None,
        })
    }

    // --- Internals ---

    fn read_rows(&self, workspace_id: &str, month: &str) -> Result<Vec<Row>> {
        let range = RangeSpec::columns(month, 0, LAST_COLUMN);
        self.gateway.read_range(&self.session, workspace_id, &range)
    }

    /// Create `title` with a header row unless it exists. Returns true if created.
    fn ensure_container(&self, workspace_id: &str, title: &str) -> Result<bool> {
        let names = self.gateway.list_containers(&self.session, workspace_id)?;
        if names.iter().any(|n| n == title) {
            return Ok(false);
        }

        self.gateway
            .create_container(&self.session, workspace_id, title)?;
        self.write_header(workspace_id, title)?;
        tracing::info!(workspace = workspace_id, container = title, "created container");
        Ok(true)
    }

    fn write_header(&self, workspace_id: &str, title: &str) -> Result<()> {
        let range = RangeSpec::row(title, 0, LAST_COLUMN, 1);
        self.gateway.write_range(
            &self.session,
            workspace_id,
            &range,
            &[self.config.header.to_vec()],
        )
    }

    fn read_revision_rows(&self, workspace_id: &str) -> Result<Vec<Row>> {
        let range = RangeSpec::columns(self.config.revision_container.as_str(), 0, 2);
        self.gateway.read_range(&self.session, workspace_id, &range)
    }

    /// Increment the revision of `(month, date)`, returning the new value.
    fn bump_revision(&self, workspace_id: &str, month: &str, date: &str) -> Result<Revision> {
        let title = self.config.revision_container.as_str();
        let names = self.gateway.list_containers(&self.session, workspace_id)?;
        if !names.iter().any(|n| n == title) {
            self.gateway
                .create_container(&self.session, workspace_id, title)?;
            let header = ["Container", "Date", "Revision"].map(String::from).to_vec();
            self.gateway.write_range(
                &self.session,
                workspace_id,
                &RangeSpec::row(title, 0, 2, 1),
                &[header],
            )?;
        }

        let rows = self.read_revision_rows(workspace_id)?;
        let row = |rev: Revision| vec![month.to_string(), date.to_string(), rev.to_string()];

        match find_revision(&rows, month, date) {
            Some((index, current)) => {
                let next = current.next();
                let range = RangeSpec::row(title, 0, 2, index as u32 + 1);
                self.gateway
                    .write_range(&self.session, workspace_id, &range, &[row(next)])?;
                Ok(next)
            }
            None => {
                let next = Revision::default().next();
                self.gateway.append_rows(
                    &self.session,
                    workspace_id,
                    &RangeSpec::columns(title, 0, 2),
                    &[row(next)],
                )?;
                Ok(next)
            }
        }
    }
}

/// Reject records that would be written as rows no load can decode.
fn validate_records(records: &[ExerciseRecord]) -> Result<()> {
    for record in records {
        if record.exercise_name.is_empty() {
            return Err(LedgerError::InvalidRecord("exercise name is empty".into()));
        }
        if record.sets.iter().any(|set| set.set_number == 0) {
            return Err(LedgerError::InvalidRecord(format!(
                "{}: set numbers start at 1",
                record.exercise_name
            )));
        }
    }
    Ok(())
}

/// Rows after the header.
fn data_rows(rows: &[Row]) -> &[Row] {
    rows.get(1..).unwrap_or(&[])
}

/// Grid index and value of the first revision row for `(month, date)`.
fn find_revision(rows: &[Row], month: &str, date: &str) -> Option<(usize, Revision)> {
    rows.iter().enumerate().skip(1).find_map(|(i, row)| {
        match (row.first(), row.get(1)) {
            (Some(m), Some(d)) if m == month && d == date => {
                let rev = row
                    .get(2)
                    .and_then(|r| r.trim().parse().ok())
                    .unwrap_or(0);
                Some((i, Revision(rev)))
            }
            _ => None,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Row {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_data_rows() {
        assert!(data_rows(&[]).is_empty());
        assert!(data_rows(&[row(&["Date"])]).is_empty());
        assert_eq!(data_rows(&[row(&["Date"]), row(&["d"])]).len(), 1);
    }

    #[test]
    fn test_find_revision() {
        let rows = vec![
            row(&["Container", "Date", "Revision"]),
            row(&["May", "2024-05-01", "3"]),
            row(&["May", "2024-05-02", "junk"]),
        ];
        assert_eq!(find_revision(&rows, "May", "2024-05-01"), Some((1, Revision(3))));
        assert_eq!(find_revision(&rows, "May", "2024-05-02"), Some((2, Revision(0))));
        assert_eq!(find_revision(&rows, "June", "2024-05-01"), None);
    }

    #[test]
    fn test_validate_records() {
        use crate::types::SetRecord;

        let good = ExerciseRecord::new("Squat").with_set(SetRecord::new(1, "5", ""));
        assert!(validate_records(&[good]).is_ok());

        let unnamed = ExerciseRecord::new("").with_set(SetRecord::new(1, "5", "100"));
        assert!(matches!(
            validate_records(&[unnamed]),
            Err(LedgerError::InvalidRecord(_))
        ));

        let zero = ExerciseRecord::new("Squat").with_set(SetRecord::new(0, "5", "100"));
        assert!(matches!(
            validate_records(&[zero]),
            Err(LedgerError::InvalidRecord(msg)) if msg.starts_with("Squat")
        ));
    }

    #[test]
    fn test_default_header() {
        let config = LedgerConfig::default();
        assert_eq!(config.header[0], "Date");
        assert_eq!(config.header[4], "Weight");
        assert_eq!(config.root_folder, "fitness-tracker");
    }
}
