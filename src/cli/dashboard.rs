use super::ui;
use crate::core::{AppStats, BudgetStatus};
use comfy_table::Cell;

/// Renders the headline figures and how spend compares to the budget.
pub fn render(stats: &AppStats, budget: &BudgetStatus, symbol: &str) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Monthly Total"),
        ui::header_cell("Estimated Monthly Waste"),
        ui::header_cell("Annual Savings Potential"),
    ]);
    table.add_row(vec![
        ui::money_cell(stats.total_monthly, symbol),
        ui::waste_money_cell(stats.estimated_waste, symbol),
        ui::money_cell(stats.potential_annual_savings, symbol),
    ]);
    table.add_row(vec![
        Cell::new("Sum of all tracked services"),
        Cell::new("Based on \"Rarely/Never\" usage"),
        Cell::new("Projected yearly recovery"),
    ]);

    let mut output = format!("{}\n\n", ui::style_text("Dashboard", ui::StyleType::Title));
    output.push_str(&table.to_string());
    output.push_str("\n\n");
    output.push_str(&render_budget(budget, symbol));
    output
}

/// One-line version of the headline figures.
pub fn summary_line(stats: &AppStats, symbol: &str) -> String {
    format!(
        "Monthly total {} | waste {} | annual savings {}",
        ui::format_money(stats.total_monthly, symbol),
        ui::format_money(stats.estimated_waste, symbol),
        ui::format_money(stats.potential_annual_savings, symbol)
    )
}

pub fn render_budget(budget: &BudgetStatus, symbol: &str) -> String {
    let line = format!(
        "Budget: {} / {} {} {:.0}%",
        ui::format_money(budget.spent, symbol),
        ui::format_money(budget.budget, symbol),
        ui::progress_bar_text(budget.percent_used, 20),
        budget.percent_used
    );

    if budget.over_budget {
        format!(
            "{}  {}",
            ui::style_text(&line, ui::StyleType::TotalLabel),
            ui::style_text("Over budget!", ui::StyleType::Error)
        )
    } else {
        format!(
            "{}  {}",
            ui::style_text(&line, ui::StyleType::TotalLabel),
            ui::style_text("Within budget", ui::StyleType::Subtle)
        )
    }
}
