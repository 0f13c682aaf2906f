use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    TotalLabel,
    TotalValue,
    Waste,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::TotalLabel => style(text).bold(),
        StyleType::TotalValue => style(text).green().bold(),
        StyleType::Waste => style(text).magenta().bold(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

pub fn format_money(value: f64, symbol: &str) -> String {
    format!("{symbol}{value:.2}")
}

/// Right-aligned amount.
pub fn money_cell(value: f64, symbol: &str) -> Cell {
    Cell::new(format_money(value, symbol)).set_alignment(CellAlignment::Right)
}

/// Bold amount, red when it counts as waste.
pub fn waste_money_cell(value: f64, symbol: &str) -> Cell {
    Cell::new(format_money(value, symbol))
        .fg(Color::Red)
        .add_attribute(Attribute::Bold)
        .set_alignment(CellAlignment::Right)
}

/// Yes/no marker for the waste column.
pub fn waste_flag_cell(is_waste: bool) -> Cell {
    if is_waste {
        Cell::new("WASTE")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold)
    } else {
        Cell::new("ok").fg(Color::Green)
    }
}

/// Progress bar for a known number of tasks.
pub fn new_progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// Text progress bar of `width` characters for `percent` in 0..=100.
pub fn progress_bar_text(percent: f64, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

/// Prints a separator line matching the terminal width.
pub fn print_separator() {
    let term_width = console::Term::stdout()
        .size_checked()
        .map(|(_, w)| w as usize)
        .unwrap_or(80);
    println!("\n{}", "─".repeat(term_width));
}
