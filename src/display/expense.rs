//! Expense display formatting
//!
//! Formats expense listings for terminal output.

use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};

use crate::models::ExpenseRecord;
use crate::services::ExpenseRow;

#[derive(Tabled)]
struct ExpenseLine {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    expense_type: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "USD")]
    usd: i64,
    #[tabled(rename = "Risk")]
    risk: String,
}

/// Format an amount with its currency code, e.g. `12.50 EUR`
pub fn format_amount(record: &ExpenseRecord) -> String {
    format!("{:.2} {}", record.amount, record.currency)
}

/// Format a listing as a table
///
/// The `#` column is the row's position in the listing, which is what
/// `remove` expects when the same filter and sort are given.
pub fn format_expense_list(rows: &[ExpenseRow<'_>], total_usd: i64) -> String {
    if rows.is_empty() {
        return "No expenses found.".to_string();
    }

    let lines: Vec<ExpenseLine> = rows
        .iter()
        .enumerate()
        .map(|(position, row)| ExpenseLine {
            position,
            name: row.record.name.clone(),
            expense_type: row.record.expense_type.to_string(),
            amount: format_amount(row.record),
            usd: row.usd_value,
            risk: row.risk.to_string(),
        })
        .collect();

    let mut table = Table::new(lines);
    table
        .with(Style::psql())
        .with(Modify::new(Columns::new(3..5)).with(Alignment::right()));

    format!(
        "{}\n\n{} expense(s), about {} USD\n",
        table,
        rows.len(),
        total_usd
    )
}

/// Format a single expense's details
pub fn format_expense_details(record: &ExpenseRecord) -> String {
    let mut output = String::new();
    output.push_str(&format!("Expense: {}\n", record.name));
    output.push_str(&format!("  ID:       {}\n", record.id));
    output.push_str(&format!("  Type:     {}\n", record.expense_type));
    output.push_str(&format!("  Amount:   {}\n", format_amount(record)));
    output
}
