use super::ui;
use crate::core::aggregate::{CategoryShare, SpendingSummary};
use comfy_table::Cell;

pub fn display_summary(
    summary: &SpendingSummary,
    breakdown: &[CategoryShare],
    currency: &str,
) -> String {
    let mut output = format!("{}\n\n", ui::style_text("Spending", ui::StyleType::Title));

    let mut totals = ui::new_styled_table();
    totals.set_header(vec![
        ui::header_cell("💸 Total Spent"),
        ui::header_cell("📝 Transactions"),
        ui::header_cell("📊 Average Per Item"),
    ]);
    totals.add_row(vec![
        ui::amount_cell(summary.total_spent, currency),
        Cell::new(summary.transaction_count),
        ui::amount_cell(summary.average_per_transaction, currency),
    ]);
    output.push_str(&totals.to_string());

    if breakdown.is_empty() {
        return output;
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Category"),
        ui::header_cell(&format!("Amount ({currency})")),
        ui::header_cell("Share"),
    ]);
    for share in breakdown {
        table.add_row(vec![
            Cell::new(format!(
                "{} {}",
                share.spending.emoji, share.spending.category
            )),
            ui::amount_cell(share.spending.amount, currency),
            ui::format_percentage_cell(share.percentage),
        ]);
    }
    output.push_str("\n\n");
    output.push_str(&table.to_string());

    output.push_str(&format!(
        "\n\nTotal Spent ({}): {}",
        ui::style_text(currency, ui::StyleType::TotalLabel),
        ui::style_text(
            &format!("{:.2}", summary.total_spent),
            ui::StyleType::TotalValue
        )
    ));
    output
}
