use comfy_table::presets::UTF8_HORIZONTAL_ONLY;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

pub fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_HORIZONTAL_ONLY)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.iter().map(|h| {
            Cell::new(h.to_uppercase())
                .fg(Color::Yellow)
                .add_attribute(Attribute::Bold)
        }));
    table
}

pub fn enabled_cell(enabled: bool) -> Cell {
    let cell = Cell::new(if enabled { "on" } else { "off" }).set_alignment(CellAlignment::Center);
    if enabled {
        cell.fg(Color::Green)
    } else {
        cell.fg(Color::DarkGrey)
    }
}
