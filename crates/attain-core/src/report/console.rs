use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell as TableCell, ContentArrangement, Row, Table};

use crate::report_api::{Grid, Report};

pub fn render_grid(grid: &Grid) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let mut header = vec![grid.row_axis.clone()];
    header.extend(grid.columns.iter().map(|c| c.label.clone()));
    table.set_header(header);

    for row in &grid.rows {
        let mut cells = vec![TableCell::new(&row.label)];
        cells.extend(row.cells.iter().map(|c| TableCell::new(c.render())));
        table.add_row(Row::from(cells));
    }
    table.to_string()
}

pub fn print_report(report: &Report) {
    for sheet in &report.sheets {
        if report.sheets.len() > 1 {
            eprintln!("\n{} - {}", sheet.grid.title, sheet.name);
        } else {
            eprintln!("\n{}", sheet.grid.title);
        }
        eprintln!("{}", render_grid(&sheet.grid));
        let notes: Vec<String> = sheet
            .grid
            .rows
            .iter()
            .filter_map(|r| r.note.as_ref().map(|n| format!("  {}: {}", r.label, n)))
            .collect();
        if !notes.is_empty() {
            eprintln!("notes:");
            for n in notes {
                eprintln!("{n}");
            }
        }
    }
}
