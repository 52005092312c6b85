use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use iexpense::cli::{handle_expense_command, ExpenseCommands};
use iexpense::config::{paths::DATA_DIR_ENV, ExpensePaths, Settings};
use iexpense::services::{ExpenseStore, LoadOutcome, StoreOptions};
use iexpense::storage::FileStore;

#[derive(Parser)]
#[command(
    name = "iexpense",
    version,
    about = "Personal expense tracker",
    long_about = "iexpense keeps a list of personal and business expenses in \
                  several currencies, shows them sorted and filtered, and \
                  highlights the expensive ones."
)]
struct Cli {
    /// Base directory for settings and data
    #[arg(long, global = true, env = DATA_DIR_ENV)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Expense(ExpenseCommands),

    /// Write the default settings file
    Init,

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    iexpense::logging::init_tracing();

    let cli = Cli::parse();

    let paths = match cli.data_dir {
        Some(dir) => ExpensePaths::with_base_dir(dir),
        None => ExpensePaths::new()?,
    };
    let settings = Settings::load_or_create(&paths)?;

    match cli.command {
        Some(Commands::Expense(cmd)) => {
            let backend = FileStore::new(paths.data_dir());
            let mut store = ExpenseStore::load(backend, StoreOptions::from(&settings))?;

            if let LoadOutcome::Recovered {
                reason,
                preserved_as,
            } = store.load_outcome()
            {
                eprintln!("Warning: stored expenses could not be read ({}); starting empty.", reason);
                if let Some(key) = preserved_as {
                    eprintln!("The unreadable data was moved to '{}'.", key);
                }
            }

            handle_expense_command(&mut store, &settings, cmd)?;
        }
        Some(Commands::Init) => {
            settings.save(&paths)?;
            println!("Settings written to {}", paths.settings_file().display());
        }
        Some(Commands::Config) => {
            println!("iexpense Configuration");
            println!("======================");
            println!("Settings file:  {}", paths.settings_file().display());
            println!("Data directory: {}", paths.data_dir().display());
            println!();
            println!("Settings:");
            println!("  Storage key:        {}", settings.storage_key);
            println!("  Decode policy:      {:?}", settings.decode_policy);
            println!("  Keep corrupt data:  {}", settings.preserve_corrupt_blobs);
            println!("  Reject empty names: {}", settings.reject_empty_names);
            println!("  Default currency:   {}", settings.default_currency);
            println!("  Default type:       {}", settings.default_type);
        }
        None => {
            println!("iexpense - personal expense tracker");
            println!();
            println!("Run 'iexpense --help' for usage information.");
        }
    }

    Ok(())
}
