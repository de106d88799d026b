use crate::error::{MatrixError, Result};

/// Criterion names become schema identifiers (columns of `students`,
/// `table3` and `table4`), so they pass this allow-list before any DDL or
/// DML interpolation. Everything else in the store is a bound parameter.
pub const MAX_IDENT_LEN: usize = 25;

/// Fixed column names of the criteria-dependent tables.
const RESERVED: &[&str] = &[
    "id",
    "student_id",
    "course_outcome_id",
    "total_score",
    "max_score",
    "success_rate",
];

pub fn validate_criterion_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(MatrixError::validation("criterion name is empty"));
    }
    if name.len() > MAX_IDENT_LEN {
        return Err(MatrixError::validation(format!(
            "criterion name {:?} exceeds {} characters",
            name, MAX_IDENT_LEN
        )));
    }
    let mut chars = name.chars();
    let first = chars.next().unwrap();
    if !first.is_ascii_alphabetic() {
        return Err(MatrixError::validation(format!(
            "criterion name {:?} must start with an ASCII letter",
            name
        )));
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(MatrixError::validation(format!(
            "criterion name {:?} may only contain ASCII letters, digits and '_'",
            name
        )));
    }
    if RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name)) {
        return Err(MatrixError::validation(format!(
            "criterion name {:?} collides with a reserved column name",
            name
        )));
    }
    Ok(())
}

/// Quote an identifier for SQLite. Only valid for names that already
/// passed `validate_criterion_name`.
pub fn quote(name: &str) -> String {
    format!("\"{}\"", name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_names() {
        for name in ["midterm", "final_exam", "Quiz1", "hw"] {
            assert!(validate_criterion_name(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn rejects_bad_names() {
        for name in [
            "",
            "1st_exam",
            "exam grade",
            "exam;drop",
            "student_id",
            "SUCCESS_RATE",
            "a_very_long_criterion_name_x",
        ] {
            assert!(validate_criterion_name(name).is_err(), "{name}");
        }
    }
}
