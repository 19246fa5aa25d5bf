// Generic Saver CLI
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use generic_saver_lib::config::{AppConfig, APP_NAME, APP_VERSION};
use generic_saver_lib::db::repository::{get_catalog_stats, list_class_summaries};
use generic_saver_lib::db::sqlite::{get_current_version, open_database};
use generic_saver_lib::intelligence::{ClinicalIntelligence, PatientContext};
use generic_saver_lib::pipeline::{LlmClient, OllamaClient, PrescriptionPipeline};
use generic_saver_lib::search::FuzzySearcher;

#[derive(Parser)]
#[command(name = "generic-saver")]
#[command(version)]
#[command(about = "Find cheaper generic alternatives and check prescription safety", long_about = None)]
struct Cli {
    /// Database file (defaults to GENERIC_SAVER_DB or ~/GenericSaver/generic_saver.db)
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract medicines from a prescription text file and suggest alternatives
    Process {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Patient age in years, enables age checks
        #[arg(long)]
        age_years: Option<u32>,
    },

    /// Fuzzy search the catalogue for a medicine name
    Search {
        name: String,

        #[arg(short, long, default_value = "5")]
        limit: usize,
    },

    /// Autocomplete a partial medicine name
    Suggest {
        partial: String,

        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Everything known about one medicine
    Info {
        name: String,

        #[arg(long)]
        age_months: Option<i64>,

        #[arg(long)]
        weight_kg: Option<f64>,

        /// Other medicines the patient takes (repeatable)
        #[arg(long = "with", value_name = "MEDICINE")]
        with: Vec<String>,

        #[arg(long)]
        condition: Option<String>,
    },

    /// Screen a set of medicines for interactions and age issues
    Safety {
        #[arg(required = true)]
        medicines: Vec<String>,

        #[arg(long)]
        age_months: Option<i64>,
    },

    /// Rank treatment options for a condition
    Alternatives {
        condition: String,

        #[arg(long, value_name = "MEDICINE")]
        exclude: Vec<String>,

        #[arg(long)]
        age_months: Option<i64>,
    },

    /// Treatments, patterns and guideline summary for a condition
    Condition { name: String },

    /// Catalogue statistics
    Stats,

    /// Create or upgrade the database schema
    Migrate,
}

#[derive(Serialize)]
struct StatsOutput<T, C> {
    catalog: T,
    classes: C,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}

fn main() -> Result<()> {
    generic_saver_lib::init_tracing();
    let cli = Cli::parse();

    let mut config = AppConfig::from_env();
    if let Some(db) = cli.db {
        config.database_path = db;
    }

    let conn = open_database(&config.database_path)
        .with_context(|| format!("Failed to open database at {}", config.database_path.display()))?;
    tracing::debug!(path = %config.database_path.display(), "Database opened");

    match cli.command {
        Commands::Process { file, age_years } => {
            let text = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let llm = OllamaClient::from_config(&config).context("Failed to create Ollama client")?;
            if !llm.is_model_available(&config.model).unwrap_or(false) {
                tracing::warn!(model = %config.model, "Model not listed by Ollama, trying anyway");
            }
            let pipeline = PrescriptionPipeline::new(&conn, &llm, &config);
            let report = pipeline
                .process(&text, age_years)
                .context("Prescription processing failed")?;
            print_json(&report)
        }
        Commands::Search { name, limit } => {
            let result = FuzzySearcher::new(&conn).search_with_suggestions(&name, limit)?;
            print_json(&result)
        }
        Commands::Suggest { partial, limit } => {
            let names = FuzzySearcher::new(&conn).get_suggestions(&partial, limit)?;
            print_json(&names)
        }
        Commands::Info {
            name,
            age_months,
            weight_kg,
            with,
            condition,
        } => {
            let patient = PatientContext {
                age_months,
                weight_kg,
                other_medicines: &with,
                condition: condition.as_deref(),
            };
            let insight = ClinicalIntelligence::new(&conn).get_comprehensive_medicine_info(&name, &patient)?;
            print_json(&insight)
        }
        Commands::Safety { medicines, age_months } => {
            let analysis = ClinicalIntelligence::new(&conn).analyze_prescription_safety(&medicines, age_months)?;
            print_json(&analysis)
        }
        Commands::Alternatives {
            condition,
            exclude,
            age_months,
        } => {
            let ranked =
                ClinicalIntelligence::new(&conn).find_alternatives_for_condition(&condition, &exclude, age_months)?;
            print_json(&ranked)
        }
        Commands::Condition { name } => {
            let insights = ClinicalIntelligence::new(&conn).get_condition_insights(&name)?;
            print_json(&insights)
        }
        Commands::Stats => print_json(&StatsOutput {
            catalog: get_catalog_stats(&conn)?,
            classes: list_class_summaries(&conn)?,
        }),
        Commands::Migrate => {
            let version = get_current_version(&conn);
            println!("{APP_NAME} v{APP_VERSION}: schema version {version}");
            Ok(())
        }
    }
}
