use std::collections::BTreeMap;

use attain_core::error::{MatrixError, Result as MatrixResult};
use attain_core::model::{
    CourseEvaluationRelation, CriteriaSet, Criterion, ProgramCourseRelation, StudentRecord,
};
use attain_core::storage::Store;

use super::{exit_codes, open_store};
use crate::cli::args::{AddArgs, AddCommand};

pub fn cmd_add(args: AddArgs) -> anyhow::Result<i32> {
    let store = open_store(&args.db)?;
    match run(&store, args.entity) {
        Ok(message) => {
            eprintln!("{message}");
            Ok(exit_codes::OK)
        }
        Err(e) if e.is_input_error() => {
            eprintln!("rejected: {e}");
            Ok(exit_codes::INPUT_ERROR)
        }
        Err(e) => Err(e.into()),
    }
}

fn run(store: &Store, entity: AddCommand) -> MatrixResult<String> {
    match entity {
        AddCommand::ProgramOutcome { text } => {
            let id = store.insert_program_outcome(&text)?;
            Ok(format!("program outcome {id} added"))
        }
        AddCommand::CourseOutcome { text } => {
            let id = store.insert_course_outcome(&text)?;
            Ok(format!("course outcome {id} added"))
        }
        AddCommand::Relation {
            program,
            course,
            value,
        } => {
            store.insert_program_course_relation(&ProgramCourseRelation {
                program_outcome_id: program,
                course_outcome_id: course,
                value,
            })?;
            Ok(format!(
                "relation program outcome {program} -> course outcome {course} added"
            ))
        }
        AddCommand::Criteria { entries } => {
            let mut criteria = Vec::with_capacity(entries.len());
            for (name, value) in parse_pairs(&entries)? {
                let weight: u32 = value.parse().map_err(|_| {
                    MatrixError::validation(format!("weight {value:?} is not an integer"))
                })?;
                criteria.push(Criterion { name, weight });
            }
            let set = CriteriaSet::new(criteria)?;
            store.replace_criteria(&set)?;
            Ok(format!(
                "criteria set committed ({} entries); students table rebuilt",
                set.len()
            ))
        }
        AddCommand::Assessment {
            course,
            criterion,
            value,
        } => {
            store.insert_course_evaluation_relation(&CourseEvaluationRelation {
                course_outcome_id: course,
                criterion: criterion.clone(),
                value,
            })?;
            Ok(format!(
                "assessment course outcome {course} -> {criterion} added"
            ))
        }
        AddCommand::Student { id, scores } => {
            let mut parsed = BTreeMap::new();
            for (name, value) in parse_pairs(&scores)? {
                let score: f64 = value.parse().map_err(|_| {
                    MatrixError::validation(format!("score {value:?} is not a number"))
                })?;
                parsed.insert(name, score);
            }
            store.insert_student(&StudentRecord {
                student_id: id,
                scores: parsed,
            })?;
            Ok(format!("student {id} added"))
        }
    }
}

fn parse_pairs(entries: &[String]) -> MatrixResult<Vec<(String, String)>> {
    if entries.is_empty() {
        return Err(MatrixError::validation("no name=value entries given"));
    }
    entries
        .iter()
        .map(|entry| {
            entry
                .split_once('=')
                .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
                .ok_or_else(|| {
                    MatrixError::validation(format!("expected name=value, got {entry:?}"))
                })
        })
        .collect()
}
