use std::{error::Error, path::Path, process::exit};

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use gastos_rs::{
    PasswordHash, Transaction, TransactionType, Username, ValidatedPassword, create_transaction,
    create_user, initialize_db,
};

/// A utility for creating a test database for the REST API server of gastos_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// The demo user's credentials.
const DEMO_USERNAME: &str = "demo";
const DEMO_PASSWORD: &str = "demo1234";

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    if output_path
        .extension()
        .is_none_or(|extension| extension.is_empty())
    {
        eprintln!("Output path must include a file extension (e.g., 'gastos.db').");
        exit(1);
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let connection = Connection::open(output_path)?;

    initialize_db(&connection)?;

    println!("Creating test user '{DEMO_USERNAME}' with the password '{DEMO_PASSWORD}'...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked(DEMO_PASSWORD),
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user(Username::new(DEMO_USERNAME)?, password_hash, &connection)?;

    println!("Creating sample transactions...");

    let today = OffsetDateTime::now_utc().date();
    let mut count = 0;

    // Three months of salary, rent and everyday spending.
    for months_ago in 0..3 {
        let month_start = today - Duration::days(30 * months_ago);

        let samples = [
            (3200.0, TransactionType::Income, "Salary", "Monthly salary"),
            (950.0, TransactionType::Expense, "Rent", "Apartment rent"),
            (180.5, TransactionType::Expense, "Food", "Groceries"),
            (42.0, TransactionType::Expense, "Transport", "Bus pass"),
            (65.0, TransactionType::Expense, "Utilities", "Electricity"),
            (30.0, TransactionType::Expense, "Entertainment", "Cinema"),
            (400.0, TransactionType::Income, "Freelance", "Logo design"),
        ];

        for (offset, (amount, transaction_type, category, description)) in
            samples.into_iter().enumerate()
        {
            let date = month_start - Duration::days(offset as i64);
            create_transaction(
                user.id,
                Transaction::build(amount, transaction_type, category, date).description(description),
                &connection,
            )?;
            count += 1;
        }
    }

    println!("Created {count} transactions.");
    println!("Success!");

    Ok(())
}
