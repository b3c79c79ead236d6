use std::path::PathBuf;

use clap::{Parser, Subcommand};
use prepdeck::import;
use prepdeck::model::{DbConnection, ModelManager};

#[derive(Parser, Debug)]
#[command(about = "Management commands for the prepdeck question bank", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import question CSV files from the inbox folder
    Import {
        /// Folder containing CSV files to import
        #[arg(long, default_value = "inbox")]
        inbox: PathBuf,
    },

    /// Write a sample CSV into the inbox folder
    Sample {
        /// Folder to write the sample file into
        #[arg(long, default_value = "inbox")]
        inbox: PathBuf,
    },
}

const SAMPLE_FILE: &str = "sample_questions.csv";

const SAMPLE_CSV: &str = "\
category,exam,question_text,choices,correct_choices,question_type,difficulty,explanation,points
Mathematics,Basic Math Test,What is 2 + 2?,3|4|5|6,2,single,easy,Two plus two equals four.,1
Mathematics,Basic Math Test,Which numbers are prime?,2|4|7|9,1|3,multiple,medium,[2 and 7 are prime, 4 and 9 are composite.],2
Science,Chemistry Quiz,What is the chemical formula for water?,H2O|CO2|O2|NaCl,H2O,single,easy,,1
Science,Physics Quiz,[Light travels at 300,000 km/s],True|False,True,true_false,medium,,1
";

fn init_trace() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

#[tokio::main]
async fn main() -> prepdeck::error::AppResult<()> {
    let _ = dotenvy::dotenv();
    init_trace();
    let args = Cli::parse();

    match args.command {
        Commands::Import { inbox } => {
            let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| {
                eprintln!("DATABASE_URL must be set");
                std::process::exit(1);
            });

            let db_con = DbConnection::connect(&database_url)?;
            let mm = ModelManager::new(db_con);

            let report = import::run_inbox(&mm, &inbox).await?;
            for outcome in &report.outcomes {
                if outcome.failed() {
                    println!("FAILED    {}", outcome.file_name);
                    for error in &outcome.row_errors {
                        println!("          {error}");
                    }
                    if let Some(db_error) = &outcome.database_error {
                        println!("          {db_error}");
                    }
                } else {
                    println!(
                        "imported  {} (created {}, updated {}, choices {})",
                        outcome.file_name,
                        outcome.questions_created,
                        outcome.questions_updated,
                        outcome.choices_written
                    );
                }
            }
            println!(
                "{} file(s) processed, {} failed",
                report.files_processed(),
                report.files_failed()
            );
        }

        Commands::Sample { inbox } => {
            std::fs::create_dir_all(&inbox)?;
            let path = inbox.join(SAMPLE_FILE);
            std::fs::write(&path, SAMPLE_CSV)?;
            println!("sample written to {}", path.display());
        }
    }

    Ok(())
}
