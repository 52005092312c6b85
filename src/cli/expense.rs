//! Expense CLI commands
//!
//! Bridges clap argument parsing with the expense store and list view.

use clap::Subcommand;

use crate::config::Settings;
use crate::display::{format_expense_details, format_expense_list};
use crate::error::{ExpenseError, ExpenseResult};
use crate::models::{usd_value, Currency, ExpenseType, NewExpense, RiskLevel};
use crate::services::{ExpenseFilter, ExpenseListView, ExpenseStore, SaveStatus, SortKey};
use crate::storage::KeyValueStore;

/// Expense subcommands
#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// Add a new expense
    Add {
        /// Expense name
        name: String,
        /// Amount in the expense's currency
        #[arg(allow_hyphen_values = true, value_parser = parse_amount)]
        amount: f64,
        /// Expense type (personal or business)
        #[arg(short = 't', long = "type", value_parser = parse_type)]
        expense_type: Option<ExpenseType>,
        /// Currency code (USD, EUR, RUB, CNY)
        #[arg(short, long, value_parser = parse_currency)]
        currency: Option<Currency>,
    },
    /// List expenses
    #[command(alias = "ls")]
    List {
        /// Show only one type (all, personal, business)
        #[arg(short, long, default_value = "all", value_parser = parse_filter)]
        filter: ExpenseFilter,
        /// Sort by name or amount
        #[arg(short, long, value_parser = parse_sort)]
        sort: Option<SortKey>,
    },
    /// Show expense details
    Show {
        /// Expense ID, as printed (exp-xxxxxxxx) or a full UUID
        id: String,
    },
    /// Remove expenses by their position in a listing
    #[command(alias = "rm")]
    Remove {
        /// Positions as printed in the `#` column
        #[arg(required = true, num_args = 1..)]
        positions: Vec<usize>,
        /// Filter the positions refer to
        #[arg(short, long, default_value = "all", value_parser = parse_filter)]
        filter: ExpenseFilter,
        /// Sort the positions refer to
        #[arg(short, long, value_parser = parse_sort)]
        sort: Option<SortKey>,
    },
    /// Convert an amount to whole US dollars
    Usd {
        #[arg(allow_hyphen_values = true, value_parser = parse_amount)]
        amount: f64,
        /// Currency code
        currency: String,
    },
}

fn parse_amount(s: &str) -> Result<f64, String> {
    let amount: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("invalid amount '{}'", s))?;
    if !amount.is_finite() {
        return Err(format!("amount must be a finite number, got '{}'", s));
    }
    Ok(amount)
}

fn parse_type(s: &str) -> Result<ExpenseType, String> {
    ExpenseType::parse(s)
        .ok_or_else(|| format!("unknown expense type '{}' (expected personal or business)", s))
}

fn parse_currency(s: &str) -> Result<Currency, String> {
    Currency::parse(s).ok_or_else(|| format!("unsupported currency '{}' (expected USD, EUR, RUB or CNY)", s))
}

fn parse_filter(s: &str) -> Result<ExpenseFilter, String> {
    ExpenseFilter::parse(s)
        .ok_or_else(|| format!("unknown filter '{}' (expected all, personal or business)", s))
}

fn parse_sort(s: &str) -> Result<SortKey, String> {
    SortKey::parse(s).ok_or_else(|| format!("unknown sort key '{}' (expected name or amount)", s))
}

/// Handle an expense command
pub fn handle_expense_command<S: KeyValueStore>(
    store: &mut ExpenseStore<S>,
    settings: &Settings,
    cmd: ExpenseCommands,
) -> ExpenseResult<()> {
    match cmd {
        ExpenseCommands::Add {
            name,
            amount,
            expense_type,
            currency,
        } => {
            let form = NewExpense::new(
                name,
                expense_type.unwrap_or(settings.default_type),
                amount,
                currency.unwrap_or_else(|| settings.default_currency.clone()),
            );

            let (id, status) = store.add_expense(form)?;
            report_save(&status);

            if let Some(record) = store.get(id) {
                println!("Added expense:");
                print!("{}", format_expense_details(record));
                println!("  Risk:     {}", ExpenseStore::<S>::classify(record));
            }
        }

        ExpenseCommands::List { filter, sort } => {
            let view = ExpenseListView::new(filter, sort);
            let rows = view.rows(store);
            print!("{}", format_expense_list(&rows, view.total_usd(store)));
            if rows.is_empty() {
                println!();
            }
        }

        ExpenseCommands::Show { id } => {
            let id = store.resolve_id(&id)?;

            let record = store
                .get(id)
                .ok_or_else(|| ExpenseError::expense_not_found(id.to_string()))?;

            print!("{}", format_expense_details(record));
            println!(
                "  USD:      {}",
                usd_value(&record.currency, record.amount)
            );
            println!("  Risk:     {}", ExpenseStore::<S>::classify(record));
        }

        ExpenseCommands::Remove {
            positions,
            filter,
            sort,
        } => {
            let view = ExpenseListView::new(filter, sort);
            let before = store.len();
            let status = view.remove_displayed(store, positions)?;
            report_save(&status);
            println!(
                "Removed {} expense(s). {} remaining.",
                before - store.len(),
                store.len()
            );
        }

        ExpenseCommands::Usd { amount, currency } => {
            let currency = Currency::parse(&currency).unwrap_or(Currency::Other(currency));
            if !currency.is_known() {
                eprintln!(
                    "Warning: {}; counting as 0 USD",
                    ExpenseError::UnknownCurrency(currency.code().to_string())
                );
            }

            let usd = usd_value(&currency, amount);
            println!(
                "{:.2} {} = {} USD ({})",
                amount,
                currency,
                usd,
                RiskLevel::from_usd(usd)
            );
        }
    }

    Ok(())
}

fn report_save(status: &SaveStatus) {
    if let Some(err) = status.error() {
        eprintln!("Warning: changes kept for this session but not saved: {}", err);
    }
}
