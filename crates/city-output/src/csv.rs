//! CSV output backend.
//!
//! Creates two files in the output directory:
//! - `citizen_snapshots.csv`
//! - `tick_summaries.csv`

use std::fs::File;
use std::path::Path;

use city_behavior::ActionKind;
use csv::Writer;
use tracing::info;

use crate::writer::OutputWriter;
use crate::{CitizenSnapshotRow, OutputResult, TickSummaryRow};

pub const SNAPSHOT_HEADER: [&str; 11] = [
    "citizen_id", "tick", "name", "status", "x", "y", "state", "action", "activity", "household", "profession",
];

/// Writes simulation output to two CSV files.
pub struct CsvWriter {
    snapshots:     Writer<File>,
    summaries:     Writer<File>,
    snapshot_rows: u64,
    summary_rows:  u64,
    finished:      bool,
}

impl CsvWriter {
    /// Create (truncating) both files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut snapshots = Writer::from_path(dir.join("citizen_snapshots.csv"))?;
        snapshots.write_record(SNAPSHOT_HEADER)?;

        let mut summaries = Writer::from_path(dir.join("tick_summaries.csv"))?;
        summaries.write_record(summary_header())?;

        Ok(Self { snapshots, summaries, snapshot_rows: 0, summary_rows: 0, finished: false })
    }
}

/// `tick, day, phase, active, processed, decisions`, one column per action
/// kind, then the error and bookkeeping counters.
pub fn summary_header() -> Vec<String> {
    let mut header: Vec<String> = ["tick", "day", "phase", "active", "processed", "decisions"]
        .into_iter()
        .map(String::from)
        .collect();
    header.extend(ActionKind::ALL.iter().map(|k| format!("actions_{}", k.as_str())));
    header.extend(
        [
            "oracle_failures",
            "oracle_timeouts",
            "malformed",
            "cancellations",
            "navigation_failures",
            "effect_rejections",
            "idle",
            "memories_written",
            "memories_evicted",
            "interactions",
        ]
        .into_iter()
        .map(String::from),
    );
    header
}

impl OutputWriter for CsvWriter {
    fn write_snapshots(&mut self, rows: &[CitizenSnapshotRow]) -> OutputResult<()> {
        for row in rows {
            self.snapshots.write_record([
                row.citizen_id.to_string(),
                row.tick.to_string(),
                row.name.clone(),
                row.status.to_string(),
                row.x.to_string(),
                row.y.to_string(),
                row.state.to_string(),
                row.action.to_string(),
                row.activity.to_string(),
                row.household.to_string(),
                row.profession.to_string(),
            ])?;
        }
        self.snapshot_rows += rows.len() as u64;
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        let mut record = vec![
            row.tick.to_string(),
            row.day.to_string(),
            row.phase.to_string(),
            row.active.to_string(),
            row.processed.to_string(),
            row.decisions.to_string(),
        ];
        record.extend(row.actions.iter().map(u32::to_string));
        record.extend(
            [
                row.oracle_failures,
                row.oracle_timeouts,
                row.malformed,
                row.cancellations,
                row.navigation_failures,
                row.effect_rejections,
                row.idle,
                row.memories_written,
                row.memories_evicted,
                row.interactions,
            ]
            .iter()
            .map(u32::to_string),
        );
        self.summaries.write_record(&record)?;
        self.summary_rows += 1;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.snapshots.flush()?;
        self.summaries.flush()?;
        info!(snapshots = self.snapshot_rows, summaries = self.summary_rows, "csv output closed");
        Ok(())
    }
}
