//! The `OutputWriter` trait.

use crate::{CitizenSnapshotRow, OutputResult, TickSummaryRow};

/// A sink for simulation rows.
///
/// The observer stores errors instead of propagating them; see
/// [`SimOutputObserver::take_error`](crate::SimOutputObserver::take_error).
pub trait OutputWriter {
    fn write_snapshots(&mut self, rows: &[CitizenSnapshotRow]) -> OutputResult<()>;

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()>;

    /// Flush and close.  Idempotent.
    fn finish(&mut self) -> OutputResult<()>;
}
