use attain_core::model::{Snapshot, Table3Row};
use attain_core::report_api::{Cell, ColumnHeader, Grid, GridRow, Report, ReportBuilder};
use attain_core::storage::Store;
use attain_core::weighting::WeightedContributions;

/// Table 3: Weighted evaluation. Cells carry the weighted contribution
/// (`relation * weight / 100`) instead of the raw binary value; the
/// trailing column is each course outcome's realized score out of the
/// criteria's combined weight. This grid is also the one persisted to the
/// store as `table3`.
pub struct WeightedEvaluationReport;

impl ReportBuilder for WeightedEvaluationReport {
    fn name(&self) -> &'static str {
        "table3"
    }

    fn build(&self, store: &Store) -> anyhow::Result<Report> {
        Ok(Report::single("table3", grid(&store.snapshot()?)))
    }
}

/// Materialization rows, aligned with criteria insertion order.
pub fn rows(snap: &Snapshot) -> Vec<Table3Row> {
    let wc = WeightedContributions::compute(&snap.criteria, &snap.evaluation_relations);
    snap.course_outcomes
        .iter()
        .map(|co| {
            let by_criterion: Vec<f64> = snap
                .criteria
                .iter()
                .map(|c| wc.get(co.id, &c.name))
                .collect();
            Table3Row {
                course_outcome_id: co.id,
                total_score: by_criterion.iter().sum(),
                by_criterion,
            }
        })
        .collect()
}

pub fn grid(snap: &Snapshot) -> Grid {
    let mut columns: Vec<ColumnHeader> = snap
        .criteria
        .iter()
        .map(|c| ColumnHeader::new(c.name.clone()))
        .collect();
    columns.push(ColumnHeader::new("Total"));

    let notes: std::collections::HashMap<i64, &str> = snap
        .course_outcomes
        .iter()
        .map(|co| (co.id, co.text.as_str()))
        .collect();

    let rows = rows(snap)
        .into_iter()
        .map(|row| {
            let mut cells: Vec<Cell> = row.by_criterion.iter().map(|v| Cell::Num(*v)).collect();
            cells.push(Cell::Num(row.total_score));
            GridRow {
                label: row.course_outcome_id.to_string(),
                note: notes.get(&row.course_outcome_id).map(|s| s.to_string()),
                cells,
            }
        })
        .collect();

    Grid {
        title: "Table 3 - Weighted Evaluation".into(),
        row_axis: "Course Outcomes".into(),
        columns,
        rows,
    }
}
