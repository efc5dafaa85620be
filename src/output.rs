use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, CellAlignment, ContentArrangement, Table};

use crate::report::SummaryPayload;

const HEADERS: [&str; 5] = ["Pool", "Total Time", "Accesses", "Unique Users", "Mean Time"];

fn row_cells(name: &str, time: &str, count: u64, users: u64, mean: &str) -> Vec<Cell> {
    vec![
        Cell::new(name),
        Cell::new(time).set_alignment(CellAlignment::Right),
        Cell::new(count).set_alignment(CellAlignment::Right),
        Cell::new(users).set_alignment(CellAlignment::Right),
        Cell::new(mean).set_alignment(CellAlignment::Right),
    ]
}

pub fn render_table(payload: &SummaryPayload) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(HEADERS.iter().map(Cell::new));

    for row in &payload.data {
        table.add_row(row_cells(&row.name, &row.time, row.count, row.users, &row.mean));
    }

    table.add_row(row_cells(
        "TOTAL",
        &payload.time,
        payload.count,
        payload.users,
        &payload.mean,
    ));

    table
}

pub fn print_table(payload: &SummaryPayload) {
    println!("{}", payload.header);
    println!("{}", render_table(payload));
}

pub fn print_json(payload: &SummaryPayload) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(payload)?);
    Ok(())
}
