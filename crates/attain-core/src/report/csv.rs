use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::report_api::{Grid, Report};

/// Render a grid as a CSV document: title record, header record, data
/// records, then a notes legend mapping annotated row/column labels to
/// their text (the flat-file rendition of spreadsheet cell comments).
pub fn grid_to_csv(grid: &Grid) -> anyhow::Result<String> {
    let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(vec![]);

    writer.write_record([grid.title.as_str()])?;

    let mut header = vec![grid.row_axis.clone()];
    header.extend(grid.columns.iter().map(|c| c.label.clone()));
    writer.write_record(&header)?;

    for row in &grid.rows {
        let mut record = vec![row.label.clone()];
        record.extend(row.cells.iter().map(|c| c.render()));
        writer.write_record(&record)?;
    }

    let mut notes: Vec<(&str, &str)> = Vec::new();
    for row in &grid.rows {
        if let Some(note) = &row.note {
            notes.push((&row.label, note));
        }
    }
    for col in &grid.columns {
        if let Some(note) = &col.note {
            notes.push((&col.label, note));
        }
    }
    if !notes.is_empty() {
        writer.write_record([""])?;
        writer.write_record(["notes"])?;
        for (label, note) in notes {
            writer.write_record([label, note])?;
        }
    }

    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

/// Write a report into `dir`: `<name>.csv` for a single sheet,
/// `<name>_<sheet>.csv` per sheet otherwise. Returns the written paths.
pub fn write_report(report: &Report, dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output dir {}", dir.display()))?;

    let mut written = Vec::with_capacity(report.sheets.len());
    for sheet in &report.sheets {
        let file = if report.sheets.len() == 1 {
            format!("{}.csv", report.name)
        } else {
            format!("{}_{}.csv", report.name, sheet.name)
        };
        let path = dir.join(file);
        let body = grid_to_csv(&sheet.grid)?;
        std::fs::write(&path, body)
            .with_context(|| format!("failed to write {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}
