use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use hstat_model::Record;

use crate::types::TransformResult;

pub fn print_transform_summary(result: &TransformResult) {
    println!("Dataset: {}", result.dataset);
    println!("Output: {}", result.output.display());
    for path in &result.reports {
        println!("Unmatched report: {}", path.display());
    }
    println!("{}", stage_table(result));
    if result.has_errors() {
        eprintln!("Rejected records:");
        for rejected in &result.rejected {
            eprintln!("- [{}] {}", rejected.transformer, rejected.error);
        }
    }
}

pub fn stage_table(result: &TransformResult) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Transformer"),
        header_cell("In"),
        header_cell("Out"),
        header_cell("Unmatched"),
        header_cell("Rejected"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 1..=4 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    let mut total_unmatched = 0usize;
    for stage in &result.stages {
        total_unmatched += stage.unmatched;
        table.add_row(vec![
            Cell::new(&stage.transformer)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(stage.input),
            Cell::new(stage.output),
            count_cell(stage.unmatched, Color::Yellow),
            count_cell(stage.rejected, Color::Red),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(result.input_records).add_attribute(Attribute::Bold),
        Cell::new(result.output_records).add_attribute(Attribute::Bold),
        count_cell(total_unmatched, Color::Yellow).add_attribute(Attribute::Bold),
        count_cell(result.rejected.len(), Color::Red).add_attribute(Attribute::Bold),
    ]);
    table
}

/// Records as a table with one column per field in `columns`.
pub fn record_table(records: &[Record], columns: &[String]) -> Table {
    let mut table = Table::new();
    table.set_header(columns.iter().map(|column| header_cell(column)));
    apply_table_style(&mut table);
    for record in records {
        table.add_row(columns.iter().map(|column| match record.get(column) {
            Some(value) => Cell::new(value),
            None => dim_cell("-"),
        }));
    }
    table
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

pub fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
