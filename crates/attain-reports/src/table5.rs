use std::collections::HashMap;

use anyhow::Context;
use attain_core::model::{Snapshot, SuccessRate};
use attain_core::report_api::{Cell, ColumnHeader, Grid, GridRow, Report, ReportBuilder, Sheet};
use attain_core::storage::Store;
use attain_core::weighting::round_to;

/// Table 5: per-student program-outcome attainment, one sheet per
/// student. Consumes the success rates persisted in `table4` (it does not
/// recompute the scorecard pipeline): for each program outcome the
/// per-course values are `relation * success_rate`, and the trailing ratio
/// normalizes the average attained value by the average relation weight.
pub struct AttainmentReport;

impl ReportBuilder for AttainmentReport {
    fn name(&self) -> &'static str {
        "table5"
    }

    fn build(&self, store: &Store) -> anyhow::Result<Report> {
        let snap = store.snapshot()?;
        let rates = store
            .fetch_success_rates()
            .context("scorecards (table4) must be materialized before the attainment report")?;
        tracing::debug!(event = "attainment_built", students = snap.students.len());
        Ok(report(&snap, &rates))
    }
}

pub fn report(snap: &Snapshot, rates: &[SuccessRate]) -> Report {
    let rate_by: HashMap<(i64, i64), f64> = rates
        .iter()
        .map(|r| ((r.student_id, r.course_outcome_id), r.success_rate))
        .collect();
    let relation_by: HashMap<(i64, i64), f64> = snap
        .relations
        .iter()
        .map(|r| ((r.program_outcome_id, r.course_outcome_id), r.value))
        .collect();
    let course_count = snap.course_outcomes.len();

    let sheets = snap
        .students
        .iter()
        .map(|student| {
            let student_rates: Vec<f64> = snap
                .course_outcomes
                .iter()
                .map(|co| {
                    rate_by
                        .get(&(student.student_id, co.id))
                        .copied()
                        .unwrap_or(0.0)
                })
                .collect();

            let mut columns: Vec<ColumnHeader> = snap
                .course_outcomes
                .iter()
                .map(|co| ColumnHeader::with_note(co.id.to_string(), co.text.clone()))
                .collect();
            columns.push(ColumnHeader::new("Ratio"));

            let mut rows = Vec::with_capacity(snap.program_outcomes.len() + 1);
            let mut rate_cells: Vec<Cell> = student_rates
                .iter()
                .map(|r| Cell::Num(round_to(*r, 1)))
                .collect();
            rate_cells.push(Cell::Empty);
            rows.push(GridRow {
                label: "success rate".into(),
                note: None,
                cells: rate_cells,
            });

            for po in &snap.program_outcomes {
                let relation_values: Vec<f64> = snap
                    .course_outcomes
                    .iter()
                    .map(|co| relation_by.get(&(po.id, co.id)).copied().unwrap_or(0.0))
                    .collect();
                let row_values: Vec<f64> = relation_values
                    .iter()
                    .zip(&student_rates)
                    .map(|(relation, rate)| relation * rate)
                    .collect();

                let avg_success = if course_count > 0 {
                    row_values.iter().sum::<f64>() / course_count as f64
                } else {
                    0.0
                };
                let avg_relation = if course_count > 0 {
                    relation_values.iter().sum::<f64>() / course_count as f64
                } else {
                    0.0
                };
                let ratio = if avg_relation > 0.0 {
                    avg_success / avg_relation
                } else {
                    0.0
                };

                let mut cells: Vec<Cell> = row_values
                    .iter()
                    .map(|v| Cell::Num(round_to(*v, 1)))
                    .collect();
                cells.push(Cell::Num(round_to(ratio, 1)));
                rows.push(GridRow {
                    label: po.id.to_string(),
                    note: Some(po.text.clone()),
                    cells,
                });
            }

            Sheet {
                name: format!("student_{}", student.student_id),
                grid: Grid {
                    title: format!("Table 5 - Student {}", student.student_id),
                    row_axis: "Program Outcomes".into(),
                    columns,
                    rows,
                },
            }
        })
        .collect();

    Report {
        name: "table5".into(),
        sheets,
    }
}
