use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};
use serde::Serialize;

use crate::error::{MatrixError, Result};
use crate::model::{
    CourseEvaluationRelation, CriteriaSet, Criterion, Outcome, ProgramCourseRelation, Snapshot,
    StudentRecord, SuccessRate, Table3Row, Table4Row,
};
use crate::storage::ident;

/// Typed access to the five base tables and the two materialized report
/// tables. Every operation acquires the connection for its own scope and
/// releases it on return, success or failure.
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

/// Result of the idempotent schema bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaState {
    Created,
    AlreadyExists,
}

/// Best-effort row counts for the operator status view.
#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub program_outcomes: i64,
    pub course_outcomes: i64,
    pub relations: i64,
    pub criteria: i64,
    pub evaluation_relations: i64,
    /// None until a criteria set has been committed (the students table is
    /// criteria-dependent and does not exist before that).
    pub students: Option<i64>,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Idempotent schema bootstrap. The outcome is reported to the caller
    /// instead of being tracked in shared process state.
    pub fn init_schema(&self) -> Result<SchemaState> {
        let conn = self.conn.lock().unwrap();
        let fresh = !table_exists(&conn, "program_outcomes")?;
        conn.execute_batch(super::schema::DDL)?;
        Ok(if fresh {
            SchemaState::Created
        } else {
            SchemaState::AlreadyExists
        })
    }

    // --- Outcomes ---

    pub fn insert_program_outcome(&self, text: &str) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        insert_outcome(&conn, "program_outcomes", text)
    }

    pub fn insert_course_outcome(&self, text: &str) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        insert_outcome(&conn, "course_outcomes", text)
    }

    pub fn fetch_program_outcomes(&self) -> Result<Vec<Outcome>> {
        let conn = self.conn.lock().unwrap();
        fetch_outcomes(&conn, "program_outcomes")
    }

    pub fn fetch_course_outcomes(&self) -> Result<Vec<Outcome>> {
        let conn = self.conn.lock().unwrap();
        fetch_outcomes(&conn, "course_outcomes")
    }

    // --- Relations ---

    pub fn insert_program_course_relation(&self, rel: &ProgramCourseRelation) -> Result<()> {
        rel.check_range()?;
        let conn = self.conn.lock().unwrap();
        require_outcome(&conn, "program_outcomes", rel.program_outcome_id)?;
        require_outcome(&conn, "course_outcomes", rel.course_outcome_id)?;
        conn.execute(
            "INSERT INTO program_course_relations(program_outcome_id, course_outcome_id, value)
             VALUES (?1, ?2, ?3)",
            params![rel.program_outcome_id, rel.course_outcome_id, rel.value],
        )?;
        Ok(())
    }

    pub fn fetch_program_course_relations(&self) -> Result<Vec<ProgramCourseRelation>> {
        let conn = self.conn.lock().unwrap();
        fetch_relations(&conn)
    }

    pub fn insert_course_evaluation_relation(&self, rel: &CourseEvaluationRelation) -> Result<()> {
        rel.check_range()?;
        let conn = self.conn.lock().unwrap();
        require_outcome(&conn, "course_outcomes", rel.course_outcome_id)?;
        let known: i64 = conn.query_row(
            "SELECT COUNT(*) FROM evaluation_criteria WHERE name = ?1",
            params![rel.criterion],
            |r| r.get(0),
        )?;
        if known == 0 {
            return Err(MatrixError::referential(format!(
                "criterion {:?} does not exist",
                rel.criterion
            )));
        }
        conn.execute(
            "INSERT INTO course_evaluation_relations(course_outcome_id, criterion, value)
             VALUES (?1, ?2, ?3)",
            params![rel.course_outcome_id, rel.criterion, rel.value],
        )?;
        Ok(())
    }

    pub fn fetch_course_evaluation_relations(&self) -> Result<Vec<CourseEvaluationRelation>> {
        let conn = self.conn.lock().unwrap();
        fetch_evaluation_relations(&conn)
    }

    // --- Criteria ---

    /// Commit a new criteria set, replacing the previous one wholesale.
    /// The course-evaluation relations are cleared, the students table is
    /// rebuilt with one column per new criterion (prior score rows are
    /// invalidated), and stale materializations are dropped. Runs in a
    /// single transaction: a failure leaves the previous set committed.
    pub fn replace_criteria(&self, set: &CriteriaSet) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM course_evaluation_relations", [])?;
        tx.execute("DELETE FROM evaluation_criteria", [])?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO evaluation_criteria(name, weight) VALUES (?1, ?2)")?;
            for c in set.iter() {
                stmt.execute(params![c.name, c.weight])?;
            }
        }

        tx.execute("DROP TABLE IF EXISTS students", [])?;
        let columns: Vec<String> = set
            .iter()
            .map(|c| format!("{} REAL NOT NULL", ident::quote(&c.name)))
            .collect();
        tx.execute(
            &format!(
                "CREATE TABLE students (student_id INTEGER PRIMARY KEY, {})",
                columns.join(", ")
            ),
            [],
        )?;

        // Their column sets no longer match the committed criteria.
        tx.execute("DROP TABLE IF EXISTS table3", [])?;
        tx.execute("DROP TABLE IF EXISTS table4", [])?;
        tx.commit()?;

        tracing::info!(event = "criteria_replaced", count = set.len());
        Ok(())
    }

    pub fn fetch_criteria(&self) -> Result<Vec<Criterion>> {
        let conn = self.conn.lock().unwrap();
        fetch_criteria(&conn)
    }

    // --- Students ---

    pub fn insert_student(&self, record: &StudentRecord) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let criteria = fetch_criteria(&conn)?;
        if criteria.is_empty() {
            return Err(MatrixError::validation(
                "no criteria committed; add criteria before students",
            ));
        }
        record.check_against(&criteria)?;

        let columns: Vec<String> = criteria.iter().map(|c| ident::quote(&c.name)).collect();
        let placeholders: Vec<String> = (1..=criteria.len() + 1).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "INSERT INTO students (student_id, {}) VALUES ({})",
            columns.join(", "),
            placeholders.join(", ")
        );

        let mut values = Vec::with_capacity(criteria.len() + 1);
        values.push(Value::Integer(record.student_id));
        for c in &criteria {
            values.push(Value::Real(record.scores[&c.name]));
        }
        conn.execute(&sql, params_from_iter(values))?;
        Ok(())
    }

    pub fn fetch_students(&self) -> Result<Vec<StudentRecord>> {
        let conn = self.conn.lock().unwrap();
        let criteria = fetch_criteria(&conn)?;
        fetch_students(&conn, &criteria)
    }

    // --- Snapshot ---

    /// One consistent read of all base tables for a report generation.
    pub fn snapshot(&self) -> Result<Snapshot> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let criteria = fetch_criteria(&tx)?;
        let students = if criteria.is_empty() {
            Vec::new()
        } else {
            fetch_students(&tx, &criteria)?
        };
        let snapshot = Snapshot {
            program_outcomes: fetch_outcomes(&tx, "program_outcomes")?,
            course_outcomes: fetch_outcomes(&tx, "course_outcomes")?,
            relations: fetch_relations(&tx)?,
            evaluation_relations: fetch_evaluation_relations(&tx)?,
            criteria,
            students,
        };
        tx.commit()?;
        Ok(snapshot)
    }

    // --- Materialized report tables ---

    /// Persist the weighted evaluation grid as `table3`, replacing any
    /// prior materialization entirely.
    pub fn materialize_table3(&self, criteria: &[Criterion], rows: &[Table3Row]) -> Result<()> {
        check_row_width(criteria, rows.iter().map(|r| r.by_criterion.len()))?;
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        tx.execute("DROP TABLE IF EXISTS table3", [])?;
        tx.execute(
            &format!(
                "CREATE TABLE table3 (
                   id INTEGER PRIMARY KEY AUTOINCREMENT,
                   course_outcome_id INTEGER NOT NULL,
                   total_score REAL NOT NULL{}
                 )",
                criterion_columns(criteria)?
            ),
            [],
        )?;
        {
            let mut columns = vec!["course_outcome_id".to_string(), "total_score".to_string()];
            columns.extend(criteria.iter().map(|c| ident::quote(&c.name)));
            let placeholders: Vec<String> =
                (1..=columns.len()).map(|i| format!("?{i}")).collect();
            let sql = format!(
                "INSERT INTO table3 ({}) VALUES ({})",
                columns.join(", "),
                placeholders.join(", ")
            );
            let mut stmt = tx.prepare(&sql)?;
            for row in rows {
                let mut values = vec![
                    Value::Integer(row.course_outcome_id),
                    Value::Real(row.total_score),
                ];
                values.extend(row.by_criterion.iter().map(|v| Value::Real(*v)));
                stmt.execute(params_from_iter(values))?;
            }
        }
        tx.commit()?;
        tracing::info!(event = "materialized", table = "table3", rows = rows.len());
        Ok(())
    }

    /// Persist the per-student scorecard rows as `table4`, replacing any
    /// prior materialization entirely.
    pub fn materialize_table4(&self, criteria: &[Criterion], rows: &[Table4Row]) -> Result<()> {
        check_row_width(criteria, rows.iter().map(|r| r.by_criterion.len()))?;
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        tx.execute("DROP TABLE IF EXISTS table4", [])?;
        tx.execute(
            &format!(
                "CREATE TABLE table4 (
                   id INTEGER PRIMARY KEY AUTOINCREMENT,
                   student_id INTEGER NOT NULL,
                   course_outcome_id INTEGER NOT NULL,
                   total_score REAL NOT NULL{},
                   max_score REAL NOT NULL,
                   success_rate REAL NOT NULL
                 )",
                criterion_columns(criteria)?
            ),
            [],
        )?;
        {
            let mut columns = vec![
                "student_id".to_string(),
                "course_outcome_id".to_string(),
                "total_score".to_string(),
            ];
            columns.extend(criteria.iter().map(|c| ident::quote(&c.name)));
            columns.push("max_score".to_string());
            columns.push("success_rate".to_string());
            let placeholders: Vec<String> =
                (1..=columns.len()).map(|i| format!("?{i}")).collect();
            let sql = format!(
                "INSERT INTO table4 ({}) VALUES ({})",
                columns.join(", "),
                placeholders.join(", ")
            );
            let mut stmt = tx.prepare(&sql)?;
            for row in rows {
                let mut values = vec![
                    Value::Integer(row.student_id),
                    Value::Integer(row.course_outcome_id),
                    Value::Real(row.total_score),
                ];
                values.extend(row.by_criterion.iter().map(|v| Value::Real(*v)));
                values.push(Value::Real(row.max_score));
                values.push(Value::Real(row.success_rate));
                stmt.execute(params_from_iter(values))?;
            }
        }
        tx.commit()?;
        tracing::info!(event = "materialized", table = "table4", rows = rows.len());
        Ok(())
    }

    /// Success rates from the persisted `table4`, in materialization order.
    pub fn fetch_success_rates(&self) -> Result<Vec<SuccessRate>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT student_id, course_outcome_id, success_rate FROM table4 ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(SuccessRate {
                student_id: row.get(0)?,
                course_outcome_id: row.get(1)?,
                success_rate: row.get(2)?,
            })
        })?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    // --- Status ---

    pub fn stats(&self) -> Result<StoreStats> {
        let conn = self.conn.lock().unwrap();
        let students = if table_exists(&conn, "students")? {
            Some(count_rows(&conn, "students")?)
        } else {
            None
        };
        Ok(StoreStats {
            program_outcomes: count_rows(&conn, "program_outcomes")?,
            course_outcomes: count_rows(&conn, "course_outcomes")?,
            relations: count_rows(&conn, "program_course_relations")?,
            criteria: count_rows(&conn, "evaluation_criteria")?,
            evaluation_relations: count_rows(&conn, "course_evaluation_relations")?,
            students,
        })
    }
}

const COUNTABLE_TABLES: &[&str] = &[
    "program_outcomes",
    "course_outcomes",
    "program_course_relations",
    "evaluation_criteria",
    "course_evaluation_relations",
    "students",
];

fn count_rows(conn: &Connection, table: &str) -> Result<i64> {
    // Allow-list, same as every other identifier that reaches a format!.
    if !COUNTABLE_TABLES.contains(&table) {
        return Err(MatrixError::validation(format!(
            "invalid table name for count: {table}"
        )));
    }
    let n: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?;
    Ok(n)
}

fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        params![name],
        |r| r.get(0),
    )?;
    Ok(n > 0)
}

fn insert_outcome(conn: &Connection, table: &'static str, text: &str) -> Result<i64> {
    if text.trim().is_empty() {
        return Err(MatrixError::validation("outcome text is empty"));
    }
    conn.execute(
        &format!("INSERT INTO {table} (text) VALUES (?1)"),
        params![text],
    )?;
    Ok(conn.last_insert_rowid())
}

fn fetch_outcomes(conn: &Connection, table: &'static str) -> Result<Vec<Outcome>> {
    let mut stmt = conn.prepare(&format!("SELECT id, text FROM {table} ORDER BY id ASC"))?;
    let rows = stmt.query_map([], |row| {
        Ok(Outcome {
            id: row.get(0)?,
            text: row.get(1)?,
        })
    })?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

fn require_outcome(conn: &Connection, table: &'static str, id: i64) -> Result<()> {
    let n: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {table} WHERE id = ?1"),
        params![id],
        |r| r.get(0),
    )?;
    if n == 0 {
        let kind = if table == "program_outcomes" {
            "program outcome"
        } else {
            "course outcome"
        };
        return Err(MatrixError::referential(format!(
            "{kind} {id} does not exist"
        )));
    }
    Ok(())
}

fn fetch_relations(conn: &Connection) -> Result<Vec<ProgramCourseRelation>> {
    let mut stmt = conn.prepare(
        "SELECT program_outcome_id, course_outcome_id, value
         FROM program_course_relations
         ORDER BY program_outcome_id, course_outcome_id",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(ProgramCourseRelation {
            program_outcome_id: row.get(0)?,
            course_outcome_id: row.get(1)?,
            value: row.get(2)?,
        })
    })?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

fn fetch_evaluation_relations(conn: &Connection) -> Result<Vec<CourseEvaluationRelation>> {
    let mut stmt = conn.prepare(
        "SELECT course_outcome_id, criterion, value
         FROM course_evaluation_relations
         ORDER BY course_outcome_id, criterion",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(CourseEvaluationRelation {
            course_outcome_id: row.get(0)?,
            criterion: row.get(1)?,
            value: row.get::<_, i64>(2)? as u8,
        })
    })?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

fn fetch_criteria(conn: &Connection) -> Result<Vec<Criterion>> {
    // Column order everywhere follows criteria insertion order, not name order.
    let mut stmt = conn.prepare("SELECT name, weight FROM evaluation_criteria ORDER BY pos ASC")?;
    let rows = stmt.query_map([], |row| {
        Ok(Criterion {
            name: row.get(0)?,
            weight: row.get::<_, i64>(1)? as u32,
        })
    })?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

fn fetch_students(conn: &Connection, criteria: &[Criterion]) -> Result<Vec<StudentRecord>> {
    if criteria.is_empty() {
        return Ok(Vec::new());
    }
    let columns: Vec<String> = criteria.iter().map(|c| ident::quote(&c.name)).collect();
    let sql = format!(
        "SELECT student_id, {} FROM students ORDER BY student_id ASC",
        columns.join(", ")
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], |row| {
        let student_id: i64 = row.get(0)?;
        let mut scores = std::collections::BTreeMap::new();
        for (i, c) in criteria.iter().enumerate() {
            scores.insert(c.name.clone(), row.get::<_, f64>(i + 1)?);
        }
        Ok(StudentRecord { student_id, scores })
    })?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

fn criterion_columns(criteria: &[Criterion]) -> Result<String> {
    let mut out = String::new();
    for c in criteria {
        ident::validate_criterion_name(&c.name)?;
        out.push_str(&format!(",\n                   {} REAL NOT NULL", ident::quote(&c.name)));
    }
    Ok(out)
}

fn check_row_width(criteria: &[Criterion], widths: impl Iterator<Item = usize>) -> Result<()> {
    for w in widths {
        if w != criteria.len() {
            return Err(MatrixError::validation(format!(
                "materialized row has {} criterion values, criteria set has {}",
                w,
                criteria.len()
            )));
        }
    }
    Ok(())
}
