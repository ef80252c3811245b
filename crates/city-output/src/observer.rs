//! `SimOutputObserver<W>`: bridges `SimObserver` to an `OutputWriter`.

use city_core::Tick;
use city_sim::{CitizenRecord, SimObserver, TickSummary};
use tracing::error;

use crate::row::{CitizenSnapshotRow, TickSummaryRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes tick summaries and citizen snapshots to any
/// [`OutputWriter`].
///
/// `SimObserver` methods return nothing, so the first write error is kept
/// and later writes still go ahead.  Check [`take_error`][Self::take_error]
/// once the run returns.
pub struct SimOutputObserver<W: OutputWriter> {
    writer:     W,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, last_error: None }
    }

    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            error!(error = %e, "output write failed");
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_tick_end(&mut self, summary: &TickSummary) {
        let result = self.writer.write_tick_summary(&TickSummaryRow::from(summary));
        self.store_err(result);
    }

    fn on_snapshot(&mut self, _tick: Tick, citizens: &[CitizenRecord]) {
        if citizens.is_empty() {
            return;
        }
        let rows: Vec<CitizenSnapshotRow> = citizens.iter().map(CitizenSnapshotRow::from).collect();
        let result = self.writer.write_snapshots(&rows);
        self.store_err(result);
    }

    fn on_sim_end(&mut self, _final_tick: Tick) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
