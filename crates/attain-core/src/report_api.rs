use crate::storage::Store;

/// A single report cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Int(i64),
    Num(f64),
    Text(String),
}

impl Cell {
    pub fn render(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Int(v) => v.to_string(),
            Cell::Num(v) => format!("{v}"),
            Cell::Text(s) => s.clone(),
        }
    }
}

/// Column header: a short label plus an optional annotation (outcome text,
/// criterion weight) rendered into the notes legend of the artifact.
#[derive(Debug, Clone)]
pub struct ColumnHeader {
    pub label: String,
    pub note: Option<String>,
}

impl ColumnHeader {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            note: None,
        }
    }

    pub fn with_note(label: impl Into<String>, note: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            note: Some(note.into()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GridRow {
    pub label: String,
    pub note: Option<String>,
    pub cells: Vec<Cell>,
}

/// An ordered, labeled grid: the common shape of every derived report.
#[derive(Debug, Clone)]
pub struct Grid {
    pub title: String,
    /// Label of the row axis, e.g. "Program Outcomes".
    pub row_axis: String,
    pub columns: Vec<ColumnHeader>,
    pub rows: Vec<GridRow>,
}

#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    pub grid: Grid,
}

/// A named report: one or more sheets (per-student reports carry one sheet
/// per student).
#[derive(Debug, Clone)]
pub struct Report {
    pub name: String,
    pub sheets: Vec<Sheet>,
}

impl Report {
    pub fn single(name: impl Into<String>, grid: Grid) -> Self {
        let name = name.into();
        Self {
            sheets: vec![Sheet {
                name: name.clone(),
                grid,
            }],
            name,
        }
    }
}

/// A report builder is a pure function of the store state. Builders are
/// independent and order-insensitive, except that the program-attainment
/// report reads the persisted `table4` materialization.
pub trait ReportBuilder: Send + Sync {
    fn name(&self) -> &'static str;
    fn build(&self, store: &Store) -> anyhow::Result<Report>;
}
