use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{MatrixError, Result};
use crate::model::{
    CourseEvaluationRelation, CriteriaSet, Criterion, ProgramCourseRelation, StudentRecord,
};
use crate::storage::Store;

/// Declarative dataset file accepted by `attain import`: outcomes,
/// relations, a complete criteria set and student rows in one document,
/// validated in full before anything is committed.
///
/// Outcome references (`program`, `course`) are 1-based positions into the
/// document's own outcome lists; the store assigns the actual ids.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportDoc {
    #[serde(default)]
    pub program_outcomes: Vec<String>,
    #[serde(default)]
    pub course_outcomes: Vec<String>,
    #[serde(default)]
    pub relations: Vec<ImportRelation>,
    #[serde(default)]
    pub criteria: Vec<Criterion>,
    #[serde(default)]
    pub assessments: Vec<ImportAssessment>,
    #[serde(default)]
    pub students: Vec<ImportStudent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportRelation {
    pub program: usize,
    pub course: usize,
    pub value: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportAssessment {
    pub course: usize,
    pub criterion: String,
    pub value: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportStudent {
    pub id: i64,
    pub scores: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default)]
pub struct ImportSummary {
    pub program_outcomes: usize,
    pub course_outcomes: usize,
    pub relations: usize,
    pub criteria: usize,
    pub assessments: usize,
    pub students: usize,
}

pub fn load_import_doc(path: &Path) -> Result<ImportDoc> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        MatrixError::validation(format!("failed to read import file {}: {e}", path.display()))
    })?;
    let doc: ImportDoc = serde_yaml::from_str(&raw)
        .map_err(|e| MatrixError::validation(format!("failed to parse YAML: {e}")))?;
    doc.validate()?;
    Ok(doc)
}

impl ImportDoc {
    /// Whole-document validation, run before any commit. Referential
    /// checks here are positional (against this document's own lists);
    /// the store re-checks everything against committed state on apply.
    pub fn validate(&self) -> Result<()> {
        for (i, text) in self
            .program_outcomes
            .iter()
            .chain(self.course_outcomes.iter())
            .enumerate()
        {
            if text.trim().is_empty() {
                return Err(MatrixError::validation(format!(
                    "outcome text at position {} is empty",
                    i + 1
                )));
            }
        }

        for rel in &self.relations {
            self.check_position("relations.program", rel.program, self.program_outcomes.len())?;
            self.check_position("relations.course", rel.course, self.course_outcomes.len())?;
            if !(0.0..=1.0).contains(&rel.value) {
                return Err(MatrixError::validation(format!(
                    "relation value {} outside [0, 1]",
                    rel.value
                )));
            }
        }

        let criteria_set = if self.criteria.is_empty() {
            None
        } else {
            Some(CriteriaSet::new(self.criteria.clone())?)
        };

        for a in &self.assessments {
            self.check_position("assessments.course", a.course, self.course_outcomes.len())?;
            if a.value > 1 {
                return Err(MatrixError::validation(format!(
                    "assessment value {} is not 0 or 1",
                    a.value
                )));
            }
            if let Some(set) = &criteria_set {
                if !set.names().any(|n| n == a.criterion) {
                    return Err(MatrixError::referential(format!(
                        "assessment references unknown criterion {:?}",
                        a.criterion
                    )));
                }
            }
        }

        for (i, s) in self.students.iter().enumerate() {
            if self.students[..i].iter().any(|p| p.id == s.id) {
                return Err(MatrixError::validation(format!(
                    "duplicate student id {}",
                    s.id
                )));
            }
            if let Some(set) = &criteria_set {
                let record = StudentRecord {
                    student_id: s.id,
                    scores: s.scores.clone(),
                };
                record.check_against(set.as_slice())?;
            }
        }

        Ok(())
    }

    /// Commit the document. Assumes `validate` has passed; the store still
    /// enforces ranges and referential integrity on every insert.
    pub fn apply(&self, store: &Store) -> Result<ImportSummary> {
        let mut program_ids = Vec::with_capacity(self.program_outcomes.len());
        for text in &self.program_outcomes {
            program_ids.push(store.insert_program_outcome(text)?);
        }
        let mut course_ids = Vec::with_capacity(self.course_outcomes.len());
        for text in &self.course_outcomes {
            course_ids.push(store.insert_course_outcome(text)?);
        }

        for rel in &self.relations {
            store.insert_program_course_relation(&ProgramCourseRelation {
                program_outcome_id: program_ids[rel.program - 1],
                course_outcome_id: course_ids[rel.course - 1],
                value: rel.value,
            })?;
        }

        if !self.criteria.is_empty() {
            let set = CriteriaSet::new(self.criteria.clone())?;
            store.replace_criteria(&set)?;
        }

        for a in &self.assessments {
            store.insert_course_evaluation_relation(&CourseEvaluationRelation {
                course_outcome_id: course_ids[a.course - 1],
                criterion: a.criterion.clone(),
                value: a.value,
            })?;
        }

        for s in &self.students {
            store.insert_student(&StudentRecord {
                student_id: s.id,
                scores: s.scores.clone(),
            })?;
        }

        Ok(ImportSummary {
            program_outcomes: program_ids.len(),
            course_outcomes: course_ids.len(),
            relations: self.relations.len(),
            criteria: self.criteria.len(),
            assessments: self.assessments.len(),
            students: self.students.len(),
        })
    }

    fn check_position(&self, field: &str, pos: usize, len: usize) -> Result<()> {
        if pos == 0 || pos > len {
            return Err(MatrixError::referential(format!(
                "{field} {pos} is out of range (document has {len} entries)"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
program_outcomes:
  - "Apply mathematics to engineering problems"
course_outcomes:
  - "Model linear systems"
  - "Use numeric solvers"
relations:
  - { program: 1, course: 1, value: 0.5 }
  - { program: 1, course: 2, value: 1.0 }
criteria:
  - { name: midterm, weight: 40 }
  - { name: final, weight: 60 }
assessments:
  - { course: 1, criterion: midterm, value: 1 }
students:
  - id: 101
    scores: { midterm: 70, final: 85 }
"#;

    #[test]
    fn parses_and_validates_sample() {
        let doc: ImportDoc = serde_yaml::from_str(SAMPLE).unwrap();
        doc.validate().unwrap();
        assert_eq!(doc.course_outcomes.len(), 2);
        assert_eq!(doc.criteria.len(), 2);
    }

    #[test]
    fn rejects_out_of_range_relation_value() {
        let mut doc: ImportDoc = serde_yaml::from_str(SAMPLE).unwrap();
        doc.relations[0].value = 1.5;
        assert!(matches!(
            doc.validate(),
            Err(MatrixError::Validation(_))
        ));
    }

    #[test]
    fn rejects_dangling_positions() {
        let mut doc: ImportDoc = serde_yaml::from_str(SAMPLE).unwrap();
        doc.relations[0].course = 9;
        assert!(matches!(
            doc.validate(),
            Err(MatrixError::Referential(_))
        ));
    }

    #[test]
    fn rejects_incomplete_criteria_weights() {
        let mut doc: ImportDoc = serde_yaml::from_str(SAMPLE).unwrap();
        doc.criteria[1].weight = 50;
        assert!(doc.validate().is_err());
    }

    #[test]
    fn rejects_duplicate_students() {
        let mut doc: ImportDoc = serde_yaml::from_str(SAMPLE).unwrap();
        let dup = doc.students[0].clone();
        doc.students.push(dup);
        assert!(doc.validate().is_err());
    }
}
