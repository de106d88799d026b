use std::collections::BTreeMap;

use attain_core::error::MatrixError;
use attain_core::model::{
    CourseEvaluationRelation, CriteriaSet, Criterion, ProgramCourseRelation, StudentRecord,
};
use attain_core::storage::{SchemaState, Store};
use tempfile::tempdir;

fn criteria(entries: &[(&str, u32)]) -> CriteriaSet {
    CriteriaSet::new(
        entries
            .iter()
            .map(|(name, weight)| Criterion {
                name: (*name).into(),
                weight: *weight,
            })
            .collect(),
    )
    .unwrap()
}

#[test]
fn schema_init_reports_created_then_already_exists() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("matrix.db");

    let store = Store::open(&path)?;
    assert_eq!(store.init_schema()?, SchemaState::Created);
    assert_eq!(store.init_schema()?, SchemaState::AlreadyExists);

    // A second handle on the same file sees the committed schema.
    let store2 = Store::open(&path)?;
    assert_eq!(store2.init_schema()?, SchemaState::AlreadyExists);
    Ok(())
}

#[test]
fn relation_round_trip_preserves_tuple() -> anyhow::Result<()> {
    let store = Store::open_in_memory()?;
    store.init_schema()?;

    let program = store.insert_program_outcome("Apply mathematics")?;
    let course = store.insert_course_outcome("Model linear systems")?;

    let rel = ProgramCourseRelation {
        program_outcome_id: program,
        course_outcome_id: course,
        value: 0.35,
    };
    store.insert_program_course_relation(&rel)?;

    let fetched = store.fetch_program_course_relations()?;
    assert_eq!(fetched, vec![rel]);
    Ok(())
}

#[test]
fn relations_are_validated_at_the_input_boundary() -> anyhow::Result<()> {
    let store = Store::open_in_memory()?;
    store.init_schema()?;
    let program = store.insert_program_outcome("PO")?;
    let course = store.insert_course_outcome("CO")?;

    let out_of_range = ProgramCourseRelation {
        program_outcome_id: program,
        course_outcome_id: course,
        value: 1.5,
    };
    assert!(matches!(
        store.insert_program_course_relation(&out_of_range),
        Err(MatrixError::Validation(_))
    ));

    let dangling = ProgramCourseRelation {
        program_outcome_id: 99,
        course_outcome_id: course,
        value: 0.5,
    };
    assert!(matches!(
        store.insert_program_course_relation(&dangling),
        Err(MatrixError::Referential(_))
    ));

    assert!(store.fetch_program_course_relations()?.is_empty());
    Ok(())
}

#[test]
fn evaluation_relations_require_known_criterion() -> anyhow::Result<()> {
    let store = Store::open_in_memory()?;
    store.init_schema()?;
    let course = store.insert_course_outcome("CO")?;
    store.replace_criteria(&criteria(&[("midterm", 40), ("final", 60)]))?;

    let ok = CourseEvaluationRelation {
        course_outcome_id: course,
        criterion: "midterm".into(),
        value: 1,
    };
    store.insert_course_evaluation_relation(&ok)?;

    let unknown = CourseEvaluationRelation {
        criterion: "quiz".into(),
        ..ok.clone()
    };
    assert!(matches!(
        store.insert_course_evaluation_relation(&unknown),
        Err(MatrixError::Referential(_))
    ));

    assert_eq!(store.fetch_course_evaluation_relations()?, vec![ok]);
    Ok(())
}

#[test]
fn rejected_criteria_preserve_the_committed_set() -> anyhow::Result<()> {
    let store = Store::open_in_memory()?;
    store.init_schema()?;
    let committed = criteria(&[("midterm", 40), ("final", 60)]);
    store.replace_criteria(&committed)?;

    // An incomplete set never constructs, so nothing reaches the store.
    let err = CriteriaSet::new(vec![Criterion {
        name: "midterm".into(),
        weight: 40,
    }])
    .unwrap_err();
    assert!(matches!(err, MatrixError::Validation(_)));

    let names: Vec<String> = store
        .fetch_criteria()?
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["midterm", "final"]);
    Ok(())
}

#[test]
fn criteria_order_follows_insertion_not_name() -> anyhow::Result<()> {
    let store = Store::open_in_memory()?;
    store.init_schema()?;
    store.replace_criteria(&criteria(&[("zeta", 50), ("alpha", 50)]))?;

    let names: Vec<String> = store
        .fetch_criteria()?
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["zeta", "alpha"]);
    Ok(())
}

#[test]
fn student_rows_round_trip_and_validate() -> anyhow::Result<()> {
    let store = Store::open_in_memory()?;
    store.init_schema()?;

    // No criteria yet: students are rejected outright.
    let record = StudentRecord {
        student_id: 101,
        scores: BTreeMap::new(),
    };
    assert!(matches!(
        store.insert_student(&record),
        Err(MatrixError::Validation(_))
    ));

    store.replace_criteria(&criteria(&[("midterm", 40), ("final", 60)]))?;

    let mut scores = BTreeMap::new();
    scores.insert("midterm".to_string(), 70.5);
    assert!(store
        .insert_student(&StudentRecord {
            student_id: 101,
            scores: scores.clone(),
        })
        .is_err());

    scores.insert("final".to_string(), 88.0);
    let record = StudentRecord {
        student_id: 101,
        scores,
    };
    store.insert_student(&record)?;

    assert_eq!(store.fetch_students()?, vec![record]);
    Ok(())
}

#[test]
fn replacing_criteria_invalidates_student_rows() -> anyhow::Result<()> {
    let store = Store::open_in_memory()?;
    store.init_schema()?;
    store.replace_criteria(&criteria(&[("exam", 100)]))?;

    let mut scores = BTreeMap::new();
    scores.insert("exam".to_string(), 90.0);
    store.insert_student(&StudentRecord {
        student_id: 1,
        scores,
    })?;

    store.replace_criteria(&criteria(&[("midterm", 50), ("final", 50)]))?;
    assert!(store.fetch_students()?.is_empty());
    Ok(())
}

#[test]
fn snapshot_reflects_all_base_tables() -> anyhow::Result<()> {
    let store = Store::open_in_memory()?;
    store.init_schema()?;
    let program = store.insert_program_outcome("PO")?;
    let course = store.insert_course_outcome("CO")?;
    store.insert_program_course_relation(&ProgramCourseRelation {
        program_outcome_id: program,
        course_outcome_id: course,
        value: 0.5,
    })?;
    store.replace_criteria(&criteria(&[("exam", 100)]))?;
    store.insert_course_evaluation_relation(&CourseEvaluationRelation {
        course_outcome_id: course,
        criterion: "exam".into(),
        value: 1,
    })?;
    let mut scores = BTreeMap::new();
    scores.insert("exam".to_string(), 75.0);
    store.insert_student(&StudentRecord {
        student_id: 1,
        scores,
    })?;

    let snap = store.snapshot()?;
    assert_eq!(snap.program_outcomes.len(), 1);
    assert_eq!(snap.course_outcomes.len(), 1);
    assert_eq!(snap.relations.len(), 1);
    assert_eq!(snap.criteria.len(), 1);
    assert_eq!(snap.evaluation_relations.len(), 1);
    assert_eq!(snap.students.len(), 1);

    let stats = store.stats()?;
    assert_eq!(stats.program_outcomes, 1);
    assert_eq!(stats.students, Some(1));
    Ok(())
}
