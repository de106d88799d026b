pub const DDL: &str = r#"
CREATE TABLE IF NOT EXISTS program_outcomes (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  text TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS course_outcomes (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  text TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS program_course_relations (
  program_outcome_id INTEGER NOT NULL REFERENCES program_outcomes(id),
  course_outcome_id INTEGER NOT NULL REFERENCES course_outcomes(id),
  value REAL NOT NULL CHECK (value BETWEEN 0 AND 1),
  PRIMARY KEY (program_outcome_id, course_outcome_id)
);

CREATE TABLE IF NOT EXISTS evaluation_criteria (
  pos INTEGER PRIMARY KEY AUTOINCREMENT,
  name TEXT NOT NULL UNIQUE,
  weight INTEGER NOT NULL CHECK (weight >= 0)
);

CREATE TABLE IF NOT EXISTS course_evaluation_relations (
  course_outcome_id INTEGER NOT NULL REFERENCES course_outcomes(id),
  criterion TEXT NOT NULL REFERENCES evaluation_criteria(name),
  value INTEGER NOT NULL CHECK (value IN (0, 1)),
  PRIMARY KEY (course_outcome_id, criterion)
);
"#;
