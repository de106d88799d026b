use attain_core::model::{Snapshot, Table4Row};
use attain_core::report_api::{Cell, ColumnHeader, Grid, GridRow, Report, ReportBuilder, Sheet};
use attain_core::storage::Store;
use attain_core::weighting::{round_to, WeightedContributions};

/// Table 4: per-student scorecards, one sheet per student. Each cell is
/// `score[criterion] * weighted_contribution(outcome, criterion)`; the
/// trailing columns are the row total, the maximum attainable score
/// (`100 * total contribution`) and the success rate. The same computation
/// is persisted to the store as `table4` for the attainment report.
pub struct ScorecardReport;

impl ReportBuilder for ScorecardReport {
    fn name(&self) -> &'static str {
        "table4"
    }

    fn build(&self, store: &Store) -> anyhow::Result<Report> {
        let snap = store.snapshot()?;
        tracing::debug!(event = "scorecards_built", students = snap.students.len());
        Ok(report(&snap))
    }
}

/// Materialization rows: one line per (student, course outcome). The
/// persisted success rate is kept at 2 decimals.
pub fn rows(snap: &Snapshot) -> Vec<Table4Row> {
    let wc = WeightedContributions::compute(&snap.criteria, &snap.evaluation_relations);
    let mut out = Vec::with_capacity(snap.students.len() * snap.course_outcomes.len());
    for student in &snap.students {
        for co in &snap.course_outcomes {
            let contributions: Vec<f64> = snap
                .criteria
                .iter()
                .map(|c| wc.get(co.id, &c.name))
                .collect();
            let by_criterion: Vec<f64> = snap
                .criteria
                .iter()
                .zip(&contributions)
                .map(|(c, contribution)| {
                    student.scores.get(&c.name).copied().unwrap_or(0.0) * contribution
                })
                .collect();
            let total_score: f64 = by_criterion.iter().sum();
            let max_score: f64 = contributions.iter().sum::<f64>() * 100.0;
            let success = if max_score > 0.0 {
                total_score / max_score * 100.0
            } else {
                0.0
            };
            out.push(Table4Row {
                student_id: student.student_id,
                course_outcome_id: co.id,
                total_score,
                by_criterion,
                max_score,
                success_rate: round_to(success, 2),
            });
        }
    }
    out
}

pub fn report(snap: &Snapshot) -> Report {
    let all_rows = rows(snap);
    let notes: std::collections::HashMap<i64, &str> = snap
        .course_outcomes
        .iter()
        .map(|co| (co.id, co.text.as_str()))
        .collect();

    let sheets = snap
        .students
        .iter()
        .map(|student| {
            let mut columns: Vec<ColumnHeader> = snap
                .criteria
                .iter()
                .map(|c| ColumnHeader::new(c.name.clone()))
                .collect();
            columns.push(ColumnHeader::new("Total"));
            columns.push(ColumnHeader::new("Max"));
            columns.push(ColumnHeader::new("% Success"));

            let grid_rows = all_rows
                .iter()
                .filter(|r| r.student_id == student.student_id)
                .map(|r| {
                    let mut cells: Vec<Cell> =
                        r.by_criterion.iter().map(|v| Cell::Num(*v)).collect();
                    cells.push(Cell::Num(r.total_score));
                    cells.push(Cell::Num(r.max_score));
                    // The artifact shows 1 decimal; the persisted rate keeps 2.
                    let success = if r.max_score > 0.0 {
                        r.total_score / r.max_score * 100.0
                    } else {
                        0.0
                    };
                    cells.push(Cell::Num(round_to(success, 1)));
                    GridRow {
                        label: r.course_outcome_id.to_string(),
                        note: notes.get(&r.course_outcome_id).map(|s| s.to_string()),
                        cells,
                    }
                })
                .collect();

            Sheet {
                name: format!("student_{}", student.student_id),
                grid: Grid {
                    title: format!("Table 4 - Student {}", student.student_id),
                    row_axis: "Course Outcomes".into(),
                    columns,
                    rows: grid_rows,
                },
            }
        })
        .collect();

    Report {
        name: "table4".into(),
        sheets,
    }
}
