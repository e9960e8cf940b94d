use super::ui;
use crate::core::limit::{DailyStatus, DayAllocation, WEEKEND_WEIGHT};
use chrono::NaiveDate;
use comfy_table::{Cell, Color};

pub fn display_daily_status(
    status: &DailyStatus,
    today: NaiveDate,
    monthly_budget: f64,
    currency: &str,
) -> String {
    let mut output = format!(
        "Today: {}\n\n",
        ui::style_text(&today.format("%A, %Y-%m-%d").to_string(), ui::StyleType::Title)
    );

    if monthly_budget <= 0.0 {
        output.push_str(&ui::style_text(
            "No monthly budget set. Use `birr budget <amount>` to enable a daily limit.",
            ui::StyleType::Subtle,
        ));
        return output;
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Monthly Budget"),
        ui::header_cell("Today's Limit"),
        ui::header_cell("Spent Today"),
        ui::header_cell("Remaining"),
    ]);
    table.add_row(vec![
        ui::amount_cell(monthly_budget, currency),
        ui::amount_cell(status.today_limit, currency),
        ui::amount_cell(status.today_spent, currency),
        ui::remaining_cell(status.remaining(), currency),
    ]);
    output.push_str(&table.to_string());

    let verdict = if status.is_over {
        ui::style_text("Over today's limit!", ui::StyleType::Error)
    } else {
        ui::style_text("Within today's limit.", ui::StyleType::TotalValue)
    };
    output.push_str(&format!("\n\n{verdict}"));
    output
}

pub fn display_month_plan(plan: &[DayAllocation], today: NaiveDate, currency: &str) -> String {
    let Some(first) = plan.first() else {
        return String::new();
    };

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell("Day"),
        ui::header_cell("Weight"),
        ui::header_cell(&format!("Limit ({currency})")),
    ]);

    for day in plan {
        let mut date_cell = Cell::new(day.date.format("%Y-%m-%d"));
        if day.date == today {
            date_cell = date_cell.fg(Color::Yellow);
        }
        let weight_cell = if day.weight == WEEKEND_WEIGHT {
            Cell::new(format!("{:.1}", day.weight)).fg(Color::Cyan)
        } else {
            Cell::new(format!("{:.1}", day.weight))
        };
        table.add_row(vec![
            date_cell,
            Cell::new(day.date.format("%a")),
            weight_cell,
            ui::amount_cell(day.limit, currency),
        ]);
    }

    let total: f64 = plan.iter().map(|d| d.limit).sum();
    format!(
        "Plan for {}\n\n{}\n\nTotal ({}): {}",
        ui::style_text(&first.date.format("%B %Y").to_string(), ui::StyleType::Title),
        table,
        ui::style_text(currency, ui::StyleType::TotalLabel),
        ui::style_text(&format!("{total:.2}"), ui::StyleType::TotalValue)
    )
}
