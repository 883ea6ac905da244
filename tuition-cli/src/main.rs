//! Tuition CLI
//!
//! Command-line interface for the tuition center API.

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use tuition_client::{PaymentListing, TuitionClient};
use tuition_types::{
    BranchId, CourseId, CreateBranchRequest, CurrencyCode, GradeId, SlotId, StudentDetailsId,
    UserId,
};

#[derive(Parser)]
#[command(name = "tuition")]
#[command(author, version, about = "Tuition center API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the tuition center API
    #[arg(
        long,
        env = "TUITION_API_URL",
        default_value = "http://localhost:5000"
    )]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Branch operations
    Branch {
        #[command(subcommand)]
        action: BranchCommands,
    },
    /// Course catalog
    Courses,
    /// Student operations
    Student {
        #[command(subcommand)]
        action: StudentCommands,
    },
    /// Slot booking and schedule
    Slot {
        #[command(subcommand)]
        action: SlotCommands,
    },
    /// Fees and payments
    Payment {
        #[command(subcommand)]
        action: PaymentCommands,
    },
    /// Check API health
    Health,
}

#[derive(Subcommand)]
enum BranchCommands {
    /// Create a branch
    Create {
        name: String,
        /// ISO 4217 currency code
        #[arg(long, default_value = "LKR")]
        currency: String,
    },
    /// List branches
    List,
}

#[derive(Subcommand)]
enum StudentCommands {
    /// List all students
    List,
    /// Search by student number and/or name
    Search {
        #[arg(long)]
        student_no: Option<String>,
        #[arg(long)]
        name: Option<String>,
    },
    /// Show a student profile
    Profile {
        /// User ID of the student
        user: String,
    },
    /// Upload a .jpg/.jpeg/.png photo
    Photo {
        /// User ID of the student
        user: String,
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum SlotCommands {
    /// Slots with free seats
    Available {
        #[arg(long)]
        branch: String,
        #[arg(long)]
        course: String,
        #[arg(long)]
        grade: String,
    },
    /// Book a slot for a student
    Book {
        /// User ID of the student
        #[arg(long)]
        user: String,
        #[arg(long)]
        slot: String,
    },
    /// Show one page of the schedule
    Schedule {
        #[arg(long, default_value = "1")]
        page: u32,
        #[arg(long, default_value = "30")]
        limit: u32,
    },
}

#[derive(Subcommand)]
enum PaymentCommands {
    /// Quote the fee for the due month
    Quote {
        /// Student details ID
        student: String,
    },
    /// Fee for the next unpaid month only
    Next { student: String },
    /// Record a payment of the quoted total
    Pay {
        student: String,
        /// Payment date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Month-by-month paid/due ledger
    Ledger { student: String },
    /// Paid and pending history
    History {
        student: String,
        /// paid or pending
        #[arg(long)]
        status: Option<String>,
    },
    /// List stored payments
    List {
        #[arg(long, value_parser = ["all", "pending", "paid"], default_value = "all")]
        status: String,
    },
    /// Stored payments plus generated pending months
    Search {
        #[arg(long)]
        state: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        search: Option<String>,
    },
}

fn parse_id<T>(s: &str) -> Result<T>
where
    T: std::str::FromStr<Err = tuition_types::DomainError>,
{
    s.parse().map_err(anyhow::Error::from)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let client = TuitionClient::new(&cli.api_url);

    match cli.command {
        Commands::Health => {
            let healthy = client.health().await?;
            if healthy {
                println!("✓ API is healthy");
            } else {
                println!("✗ API is not healthy");
                std::process::exit(1);
            }
        }

        Commands::Branch { action } => match action {
            BranchCommands::Create { name, currency } => {
                let req = CreateBranchRequest {
                    branch_name: name,
                    currency: CurrencyCode::parse(&currency)?,
                    status: None,
                };
                print_json(&client.create_branch(&req).await?)?;
            }
            BranchCommands::List => print_json(&client.list_branches().await?)?,
        },

        Commands::Courses => print_json(&client.list_courses().await?)?,

        Commands::Student { action } => match action {
            StudentCommands::List => print_json(&client.list_students().await?)?,
            StudentCommands::Search { student_no, name } => {
                let found = client
                    .search_students(student_no.as_deref(), name.as_deref())
                    .await?;
                print_json(&found)?;
            }
            StudentCommands::Profile { user } => {
                let user: UserId = parse_id(&user)?;
                print_json(&client.student_profile(user).await?)?;
            }
            StudentCommands::Photo { user, file } => {
                let user: UserId = parse_id(&user)?;
                let uploaded = client.upload_photo_file(user, &file).await?;
                println!("✓ Photo stored at {}", uploaded.photo_url);
            }
        },

        Commands::Slot { action } => match action {
            SlotCommands::Available {
                branch,
                course,
                grade,
            } => {
                let branch: BranchId = parse_id(&branch)?;
                let course: CourseId = parse_id(&course)?;
                let grade: GradeId = parse_id(&grade)?;
                print_json(&client.available_slots(branch, course, grade).await?)?;
            }
            SlotCommands::Book { user, slot } => {
                let user: UserId = parse_id(&user)?;
                let slot: SlotId = parse_id(&slot)?;
                print_json(&client.book_slot(user, slot).await?)?;
            }
            SlotCommands::Schedule { page, limit } => {
                print_json(&client.list_schedule(page, limit).await?)?;
            }
        },

        Commands::Payment { action } => match action {
            PaymentCommands::Quote { student } => {
                let student: StudentDetailsId = parse_id(&student)?;
                print_json(&client.fee_quote(student).await?)?;
            }
            PaymentCommands::Next { student } => {
                let student: StudentDetailsId = parse_id(&student)?;
                print_json(&client.next_month_fee(student).await?)?;
            }
            PaymentCommands::Pay { student, date } => {
                let student: StudentDetailsId = parse_id(&student)?;
                let created = client.pay(student, date).await?;
                println!(
                    "✓ Paid {} for {}",
                    created.payment.amount, created.quote.due_month
                );
            }
            PaymentCommands::Ledger { student } => {
                let student: StudentDetailsId = parse_id(&student)?;
                print_json(&client.pending_ledger(student).await?)?;
            }
            PaymentCommands::History { student, status } => {
                let student: StudentDetailsId = parse_id(&student)?;
                print_json(&client.payment_history(student, status.as_deref()).await?)?;
            }
            PaymentCommands::List { status } => {
                let listing = match status.as_str() {
                    "pending" => PaymentListing::Pending,
                    "paid" => PaymentListing::Paid,
                    _ => PaymentListing::All,
                };
                print_json(&client.list_payments(listing).await?)?;
            }
            PaymentCommands::Search {
                state,
                status,
                search,
            } => {
                let rows = client
                    .search_main(state.as_deref(), status.as_deref(), search.as_deref())
                    .await?;
                print_json(&rows)?;
            }
        },
    }

    Ok(())
}
