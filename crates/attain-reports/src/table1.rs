use std::collections::HashMap;

use attain_core::model::Snapshot;
use attain_core::report_api::{Cell, ColumnHeader, Grid, GridRow, Report, ReportBuilder};
use attain_core::storage::Store;
use attain_core::weighting::round_to;

/// Table 1: Program×Course coverage. Rows are program outcomes, columns
/// course outcomes, cells the relation value (0 when absent). The trailing
/// column is the row average over the full course outcome count.
pub struct CoverageReport;

impl ReportBuilder for CoverageReport {
    fn name(&self) -> &'static str {
        "table1"
    }

    fn build(&self, store: &Store) -> anyhow::Result<Report> {
        Ok(Report::single("table1", grid(&store.snapshot()?)))
    }
}

pub fn grid(snap: &Snapshot) -> Grid {
    let by_pair: HashMap<(i64, i64), f64> = snap
        .relations
        .iter()
        .map(|r| ((r.program_outcome_id, r.course_outcome_id), r.value))
        .collect();

    let mut columns: Vec<ColumnHeader> = snap
        .course_outcomes
        .iter()
        .map(|co| ColumnHeader::with_note(co.id.to_string(), co.text.clone()))
        .collect();
    columns.push(ColumnHeader::new("Rel Value"));

    let course_count = snap.course_outcomes.len();
    let rows = snap
        .program_outcomes
        .iter()
        .map(|po| {
            let mut cells = Vec::with_capacity(course_count + 1);
            let mut sum = 0.0;
            for co in &snap.course_outcomes {
                let value = by_pair.get(&(po.id, co.id)).copied().unwrap_or(0.0);
                sum += value;
                cells.push(Cell::Num(value));
            }
            let average = if course_count > 0 {
                round_to(sum / course_count as f64, 2)
            } else {
                0.0
            };
            cells.push(Cell::Num(average));
            GridRow {
                label: po.id.to_string(),
                note: Some(po.text.clone()),
                cells,
            }
        })
        .collect();

    Grid {
        title: "Table 1".into(),
        row_axis: "Program Outcomes".into(),
        columns,
        rows,
    }
}
