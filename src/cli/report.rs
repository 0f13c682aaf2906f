use super::ui;
use crate::core::{Subscription, WasteReport};
use comfy_table::{Attribute, Cell};

/// Table of every tracked subscription, in ledger order.
pub fn render_subscriptions(subscriptions: &[Subscription], symbol: &str) -> String {
    if subscriptions.is_empty() {
        return ui::style_text(
            "No subscriptions tracked yet. Add one manually or import a statement.",
            ui::StyleType::Subtle,
        );
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("ID"),
        ui::header_cell("Service"),
        ui::header_cell("Category"),
        ui::header_cell("Usage"),
        ui::header_cell("Monthly"),
        ui::header_cell("Status"),
    ]);

    for subscription in subscriptions {
        table.add_row(vec![
            Cell::new(subscription.id()),
            Cell::new(subscription.name()),
            Cell::new(subscription.category()),
            Cell::new(subscription.frequency().to_string()),
            ui::money_cell(subscription.price(), symbol),
            ui::waste_flag_cell(subscription.is_waste()),
        ]);
    }

    format!(
        "{}\n\n{}",
        ui::style_text(
            &format!("My Subscriptions ({})", subscriptions.len()),
            ui::StyleType::Title
        ),
        table
    )
}

/// The waste breakdown with the projected yearly saving.
pub fn render_waste_report(report: &WasteReport, symbol: &str) -> String {
    if report.is_clean() {
        return format!(
            "{}\n{}",
            ui::style_text("Clean Bill of Health!", ui::StyleType::TotalValue),
            "None of your subscriptions are currently flagged as waste. All your services are being used regularly."
        );
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Service"),
        ui::header_cell("Monthly"),
        ui::header_cell("Annual Cost"),
    ]);
    for item in &report.items {
        table.add_row(vec![
            Cell::new(&item.name),
            ui::waste_money_cell(item.monthly, symbol),
            ui::waste_money_cell(item.annual, symbol),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL WASTE").add_attribute(Attribute::Bold),
        ui::waste_money_cell(report.total_monthly, symbol),
        ui::waste_money_cell(report.total_annual, symbol),
    ]);

    let count = report.items.len();
    let noun = if count == 1 {
        "subscription"
    } else {
        "subscriptions"
    };
    format!(
        "{} ({} found)\n\n{}\n\n{}",
        ui::style_text("Potential Waste Report", ui::StyleType::Title),
        count,
        table,
        ui::style_text(
            &format!(
                "If you cancel these {count} {noun} today, you'll have an extra {} back in your pocket by next year.",
                ui::format_money(report.total_annual, symbol)
            ),
            ui::StyleType::Waste
        )
    )
}
