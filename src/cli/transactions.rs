use super::ui;
use crate::core::Transaction;
use comfy_table::Cell;

pub fn display_transactions(transactions: &[Transaction], currency: &str) -> String {
    if transactions.is_empty() {
        return ui::style_text("No transactions yet.", ui::StyleType::Subtle);
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell("Description"),
        ui::header_cell("Category"),
        ui::header_cell(&format!("Amount ({currency})")),
        ui::header_cell("Id"),
    ]);

    for txn in transactions {
        table.add_row(vec![
            Cell::new(txn.date.format("%Y-%m-%d")),
            Cell::new(format!("{} {}", txn.emoji, txn.description)),
            Cell::new(txn.category.label()),
            ui::amount_cell(txn.amount, currency),
            Cell::new(ui::style_text(&txn.id, ui::StyleType::Subtle)),
        ]);
    }
    table.to_string()
}

/// One-line confirmation for a newly recorded transaction.
pub fn display_added(txn: &Transaction, currency: &str) -> String {
    format!(
        "Added {} {} ({}) on {} [{}]",
        txn.emoji,
        ui::style_text(&txn.description, ui::StyleType::TotalLabel),
        ui::format_amount(txn.amount, currency),
        txn.date.format("%Y-%m-%d"),
        ui::style_text(&txn.id, ui::StyleType::Subtle)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Category;
    use chrono::NaiveDate;

    #[test]
    fn test_transaction_table_lists_every_row() {
        let txns = vec![
            Transaction {
                id: "1757152800001".to_string(),
                description: "Groceries".to_string(),
                amount: 54.2,
                category: Category::FoodAndDrink,
                date: NaiveDate::from_ymd_opt(2025, 9, 6).unwrap(),
                emoji: "🍔".to_string(),
            },
            Transaction {
                id: "1757152800000".to_string(),
                description: "Metro card".to_string(),
                amount: 10.0,
                category: Category::Transport,
                date: NaiveDate::from_ymd_opt(2025, 9, 5).unwrap(),
                emoji: "🚗".to_string(),
            },
        ];
        let output = display_transactions(&txns, "ETB");
        assert!(output.contains("Groceries"));
        assert!(output.contains("Metro card"));
        assert!(output.contains("ETB 54.20"));
        assert!(output.contains("2025-09-05"));
        assert!(output.contains("Amount (ETB)"));
    }

    #[test]
    fn test_empty_list() {
        assert!(display_transactions(&[], "ETB").contains("No transactions yet."));
    }
}
