use std::collections::BTreeMap;

use attain_core::model::{
    CourseEvaluationRelation, CriteriaSet, Criterion, ProgramCourseRelation, StudentRecord,
};
use attain_core::report_api::{Cell, ReportBuilder};
use attain_core::storage::Store;

/// Seed the worked example used throughout: two course outcomes, one
/// program outcome, criteria 60/40, one student scoring 80/50.
fn seeded_store() -> Store {
    let store = Store::open_in_memory().unwrap();
    store.init_schema().unwrap();

    let program = store.insert_program_outcome("Apply mathematics").unwrap();
    let co1 = store.insert_course_outcome("Model linear systems").unwrap();
    let co2 = store.insert_course_outcome("Use numeric solvers").unwrap();

    store
        .insert_program_course_relation(&ProgramCourseRelation {
            program_outcome_id: program,
            course_outcome_id: co1,
            value: 0.5,
        })
        .unwrap();
    store
        .insert_program_course_relation(&ProgramCourseRelation {
            program_outcome_id: program,
            course_outcome_id: co2,
            value: 1.0,
        })
        .unwrap();

    let set = CriteriaSet::new(vec![
        Criterion {
            name: "midterm".into(),
            weight: 60,
        },
        Criterion {
            name: "final".into(),
            weight: 40,
        },
    ])
    .unwrap();
    store.replace_criteria(&set).unwrap();

    store
        .insert_course_evaluation_relation(&CourseEvaluationRelation {
            course_outcome_id: co1,
            criterion: "midterm".into(),
            value: 1,
        })
        .unwrap();
    store
        .insert_course_evaluation_relation(&CourseEvaluationRelation {
            course_outcome_id: co1,
            criterion: "final".into(),
            value: 0,
        })
        .unwrap();

    let mut scores = BTreeMap::new();
    scores.insert("midterm".to_string(), 80.0);
    scores.insert("final".to_string(), 50.0);
    store
        .insert_student(&StudentRecord {
            student_id: 7,
            scores,
        })
        .unwrap();

    store
}

#[test]
fn coverage_report_from_store() {
    let store = seeded_store();
    let report = attain_reports::table1::CoverageReport.build(&store).unwrap();
    let grid = &report.sheets[0].grid;
    assert_eq!(
        grid.rows[0].cells,
        vec![Cell::Num(0.5), Cell::Num(1.0), Cell::Num(0.75)]
    );
}

#[test]
fn weighted_evaluation_materializes_and_feeds_attainment() {
    let store = seeded_store();
    let snap = store.snapshot().unwrap();

    let t3 = attain_reports::table3::rows(&snap);
    assert_eq!(t3[0].total_score, 0.6);
    store.materialize_table3(&snap.criteria, &t3).unwrap();

    // Attainment requires the scorecard materialization first.
    assert!(attain_reports::table5::AttainmentReport
        .build(&store)
        .is_err());

    let t4 = attain_reports::table4::rows(&snap);
    // student 7 on CO1: 80 * 0.6 = 48 out of 60 -> 80%
    assert_eq!(t4[0].total_score, 48.0);
    assert_eq!(t4[0].max_score, 60.0);
    assert_eq!(t4[0].success_rate, 80.0);
    // CO2 has no assessments: guarded to 0, not NaN
    assert_eq!(t4[1].max_score, 0.0);
    assert_eq!(t4[1].success_rate, 0.0);
    store.materialize_table4(&snap.criteria, &t4).unwrap();

    let report = attain_reports::table5::AttainmentReport
        .build(&store)
        .unwrap();
    assert_eq!(report.sheets.len(), 1);
    let grid = &report.sheets[0].grid;
    assert_eq!(grid.rows[0].label, "success rate");
    assert_eq!(grid.rows[0].cells[0], Cell::Num(80.0));
    assert_eq!(grid.rows[0].cells[1], Cell::Num(0.0));

    // PO1: row values 0.5*80 = 40 and 1.0*0 = 0; avg_success = 20,
    // avg_relation = 0.75, ratio = 26.7 after rounding.
    let po_row = &grid.rows[1];
    assert_eq!(po_row.cells[0], Cell::Num(40.0));
    assert_eq!(po_row.cells[1], Cell::Num(0.0));
    assert_eq!(po_row.cells[2], Cell::Num(26.7));
}

#[test]
fn scorecard_sheets_render_per_student() {
    let store = seeded_store();
    let report = attain_reports::table4::ScorecardReport.build(&store).unwrap();
    assert_eq!(report.sheets.len(), 1);
    assert_eq!(report.sheets[0].name, "student_7");
}

#[test]
fn report_names_are_unique_and_stable() {
    let builders = attain_reports::default_reports();
    let names: Vec<&str> = builders.iter().map(|b| b.name()).collect();
    assert_eq!(
        names,
        vec!["table1", "table2", "table3", "table4", "table5", "gradebook"]
    );
}
