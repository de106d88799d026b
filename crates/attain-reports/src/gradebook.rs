use attain_core::model::Snapshot;
use attain_core::report_api::{Cell, ColumnHeader, Grid, GridRow, Report, ReportBuilder};
use attain_core::storage::Store;
use attain_core::weighting::round_to;

/// Raw score sheet: one row per student, one column per criterion, plus
/// the weighted average (`sum(score * weight) / sum(weight)`).
pub struct GradebookReport;

impl ReportBuilder for GradebookReport {
    fn name(&self) -> &'static str {
        "gradebook"
    }

    fn build(&self, store: &Store) -> anyhow::Result<Report> {
        Ok(Report::single("gradebook", grid(&store.snapshot()?)))
    }
}

pub fn grid(snap: &Snapshot) -> Grid {
    let mut columns: Vec<ColumnHeader> = snap
        .criteria
        .iter()
        .map(|c| ColumnHeader::with_note(c.name.clone(), format!("weight {}", c.weight)))
        .collect();
    columns.push(ColumnHeader::new("Average"));

    let weight_sum: u32 = snap.criteria.iter().map(|c| c.weight).sum();

    let rows = snap
        .students
        .iter()
        .map(|student| {
            let mut cells = Vec::with_capacity(snap.criteria.len() + 1);
            let mut weighted = 0.0;
            for c in &snap.criteria {
                let score = student.scores.get(&c.name).copied().unwrap_or(0.0);
                weighted += score * f64::from(c.weight);
                cells.push(Cell::Num(score));
            }
            let average = if weight_sum > 0 {
                round_to(weighted / f64::from(weight_sum), 2)
            } else {
                0.0
            };
            cells.push(Cell::Num(average));
            GridRow {
                label: student.student_id.to_string(),
                note: None,
                cells,
            }
        })
        .collect();

    Grid {
        title: "Gradebook".into(),
        row_axis: "Student".into(),
        columns,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attain_core::model::{Criterion, StudentRecord};
    use std::collections::BTreeMap;

    #[test]
    fn weighted_average() {
        let mut scores = BTreeMap::new();
        scores.insert("midterm".to_string(), 70.0);
        scores.insert("final".to_string(), 90.0);
        let snap = Snapshot {
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
            students: vec![StudentRecord {
                student_id: 7,
                scores,
            }],
            ..Default::default()
        };

        let grid = grid(&snap);
        // 70 * 40 + 90 * 60 = 8200, / 100 = 82
        assert_eq!(grid.rows[0].cells[2], Cell::Num(82.0));
    }

    #[test]
    fn zero_weight_sum_guards_division() {
        let snap = Snapshot {
            students: vec![StudentRecord {
                student_id: 7,
                scores: BTreeMap::new(),
            }],
            ..Default::default()
        };
        let grid = grid(&snap);
        assert_eq!(grid.rows[0].cells, vec![Cell::Num(0.0)]);
    }
}
