use std::collections::HashMap;

use attain_core::model::Snapshot;
use attain_core::report_api::{Cell, ColumnHeader, Grid, GridRow, Report, ReportBuilder};
use attain_core::storage::Store;

/// Table 2: Course×Criterion coverage. Binary cells, criteria columns in
/// insertion order; the trailing column is the unweighted count of criteria
/// assessing each course outcome.
pub struct AssessmentMapReport;

impl ReportBuilder for AssessmentMapReport {
    fn name(&self) -> &'static str {
        "table2"
    }

    fn build(&self, store: &Store) -> anyhow::Result<Report> {
        Ok(Report::single("table2", grid(&store.snapshot()?)))
    }
}

pub fn grid(snap: &Snapshot) -> Grid {
    let by_pair: HashMap<(i64, &str), u8> = snap
        .evaluation_relations
        .iter()
        .map(|r| ((r.course_outcome_id, r.criterion.as_str()), r.value))
        .collect();

    let mut columns: Vec<ColumnHeader> = snap
        .criteria
        .iter()
        .map(|c| ColumnHeader::with_note(c.name.clone(), format!("weight {}", c.weight)))
        .collect();
    columns.push(ColumnHeader::new("Total"));

    let rows = snap
        .course_outcomes
        .iter()
        .map(|co| {
            let mut cells = Vec::with_capacity(snap.criteria.len() + 1);
            let mut total = 0i64;
            for c in &snap.criteria {
                let value = by_pair
                    .get(&(co.id, c.name.as_str()))
                    .copied()
                    .unwrap_or(0);
                total += i64::from(value);
                cells.push(Cell::Int(i64::from(value)));
            }
            cells.push(Cell::Int(total));
            GridRow {
                label: co.id.to_string(),
                note: Some(co.text.clone()),
                cells,
            }
        })
        .collect();

    Grid {
        title: "Table 2".into(),
        row_axis: "Course Outcomes".into(),
        columns,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attain_core::model::{CourseEvaluationRelation, Criterion, Outcome};

    #[test]
    fn binary_cells_and_row_totals() {
        let snap = Snapshot {
            course_outcomes: vec![
                Outcome {
                    id: 1,
                    text: "CO1".into(),
                },
                Outcome {
                    id: 2,
                    text: "CO2".into(),
                },
            ],
            criteria: vec![
                Criterion {
                    name: "midterm".into(),
                    weight: 40,
                },
                Criterion {
                    name: "final".into(),
                    weight: 60,
                },
            ],
            evaluation_relations: vec![
                CourseEvaluationRelation {
                    course_outcome_id: 1,
                    criterion: "midterm".into(),
                    value: 1,
                },
                CourseEvaluationRelation {
                    course_outcome_id: 1,
                    criterion: "final".into(),
                    value: 1,
                },
                CourseEvaluationRelation {
                    course_outcome_id: 2,
                    criterion: "final".into(),
                    value: 1,
                },
            ],
            ..Default::default()
        };

        let grid = grid(&snap);
        assert_eq!(grid.columns[0].label, "midterm");
        assert_eq!(grid.columns[0].note.as_deref(), Some("weight 40"));

        assert_eq!(
            grid.rows[0].cells,
            vec![Cell::Int(1), Cell::Int(1), Cell::Int(2)]
        );
        assert_eq!(
            grid.rows[1].cells,
            vec![Cell::Int(0), Cell::Int(1), Cell::Int(1)]
        );
    }
}
