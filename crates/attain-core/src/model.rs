use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{MatrixError, Result};
use crate::storage::ident;

/// A named objective. Program outcomes and course outcomes share this shape
/// but live in separate identity spaces and are never mixed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub id: i64,
    pub text: String,
}

/// A weighted assessment category (exam, homework, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criterion {
    pub name: String,
    pub weight: u32,
}

/// A complete, validated criteria set. Construction is the commit gate:
/// weights must sum to exactly 100, names must be unique and pass the
/// schema-identifier rules, since criterion names become column names of
/// the students table and the materialized report tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriteriaSet {
    criteria: Vec<Criterion>,
}

impl CriteriaSet {
    pub fn new(criteria: Vec<Criterion>) -> Result<Self> {
        if criteria.is_empty() {
            return Err(MatrixError::validation("criteria set is empty"));
        }
        for c in &criteria {
            ident::validate_criterion_name(&c.name)?;
        }
        for (i, c) in criteria.iter().enumerate() {
            if criteria[..i]
                .iter()
                .any(|prev| prev.name.eq_ignore_ascii_case(&c.name))
            {
                return Err(MatrixError::validation(format!(
                    "duplicate criterion name: {}",
                    c.name
                )));
            }
        }
        let total: u32 = criteria.iter().map(|c| c.weight).sum();
        if total != 100 {
            return Err(MatrixError::validation(format!(
                "criteria weights sum to {}, expected 100",
                total
            )));
        }
        Ok(Self { criteria })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Criterion> {
        self.criteria.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.criteria.iter().map(|c| c.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn as_slice(&self) -> &[Criterion] {
        &self.criteria
    }
}

/// A sparse Program×Course matrix cell, value in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramCourseRelation {
    pub program_outcome_id: i64,
    pub course_outcome_id: i64,
    pub value: f64,
}

impl ProgramCourseRelation {
    pub fn check_range(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.value) {
            return Err(MatrixError::validation(format!(
                "relation value {} outside [0, 1]",
                self.value
            )));
        }
        Ok(())
    }
}

/// A binary Course×Criterion matrix cell: does this criterion assess the
/// course outcome at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseEvaluationRelation {
    pub course_outcome_id: i64,
    pub criterion: String,
    pub value: u8,
}

impl CourseEvaluationRelation {
    pub fn check_range(&self) -> Result<()> {
        if self.value > 1 {
            return Err(MatrixError::validation(format!(
                "assessment value {} is not 0 or 1",
                self.value
            )));
        }
        Ok(())
    }
}

/// One student row: one score per committed criterion, range [0, 100].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub student_id: i64,
    pub scores: BTreeMap<String, f64>,
}

impl StudentRecord {
    /// The score set must cover exactly the committed criteria.
    pub fn check_against(&self, criteria: &[Criterion]) -> Result<()> {
        for c in criteria {
            let Some(score) = self.scores.get(&c.name) else {
                return Err(MatrixError::validation(format!(
                    "student {} is missing a score for criterion {}",
                    self.student_id, c.name
                )));
            };
            if !(0.0..=100.0).contains(score) {
                return Err(MatrixError::validation(format!(
                    "score {} for criterion {} outside [0, 100]",
                    score, c.name
                )));
            }
        }
        if self.scores.len() != criteria.len() {
            let known: Vec<&str> = criteria.iter().map(|c| c.name.as_str()).collect();
            let extra: Vec<&str> = self
                .scores
                .keys()
                .map(String::as_str)
                .filter(|k| !known.contains(k))
                .collect();
            return Err(MatrixError::validation(format!(
                "student {} has scores for unknown criteria: {}",
                self.student_id,
                extra.join(", ")
            )));
        }
        Ok(())
    }
}

/// One consistent read of the five base tables, taken inside a single
/// transaction. Report builders consume this instead of issuing their own
/// interleaved queries.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub program_outcomes: Vec<Outcome>,
    pub course_outcomes: Vec<Outcome>,
    pub relations: Vec<ProgramCourseRelation>,
    pub criteria: Vec<Criterion>,
    pub evaluation_relations: Vec<CourseEvaluationRelation>,
    pub students: Vec<StudentRecord>,
}

/// Row of the materialized `table3` (weighted evaluation per course
/// outcome). `by_criterion` is aligned with criteria insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Table3Row {
    pub course_outcome_id: i64,
    pub total_score: f64,
    pub by_criterion: Vec<f64>,
}

/// Row of the materialized `table4` (per-student scorecard line).
#[derive(Debug, Clone, PartialEq)]
pub struct Table4Row {
    pub student_id: i64,
    pub course_outcome_id: i64,
    pub total_score: f64,
    pub by_criterion: Vec<f64>,
    pub max_score: f64,
    pub success_rate: f64,
}

/// Success rate read back from the persisted `table4`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuccessRate {
    pub student_id: i64,
    pub course_outcome_id: i64,
    pub success_rate: f64,
}
