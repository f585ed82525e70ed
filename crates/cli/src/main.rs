use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use complaint_core::config::{Config, DEFAULT_CONFIG_PATH};
use complaint_core::db::SqliteStore;
use complaint_core::schema::TABLE_COLUMNS;
use complaint_core::{service, Category, Complaint, NewComplaint};
use schemars::schema_for;
use std::fs;
use std::path::PathBuf;
use time::OffsetDateTime;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "vigil")]
#[command(about = "Epidemiological complaint registry CLI", long_about = None)]
struct Cli {
    /// Configuration file (default: ./vigil.toml, optional)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Complaint store path, overriding the configuration
    #[arg(long, global = true)]
    db: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new complaint and print its protocol
    Submit {
        #[arg(long)]
        neighborhood: String,
        #[arg(long)]
        street: String,
        #[arg(long = "number")]
        house_number: String,
        #[arg(long)]
        postal_code: String,
        /// arboviroses, scorpion, rats, snails, unsanitary-conditions or tall-grass
        #[arg(long)]
        category: Category,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Show stored complaints, optionally filtered by protocol
    List {
        /// Case-insensitive protocol fragment
        #[arg(long)]
        protocol: Option<String>,
    },
    /// Write the complaints table to a CSV sheet for editing
    Export {
        #[arg(long)]
        out: PathBuf,
    },
    /// Save attendance date, status and report from an edited sheet
    Save {
        #[arg(long)]
        input: PathBuf,
    },
    /// Export canonical JSON Schemas to the ./schemas directory
    Schema {
        #[command(subcommand)]
        command: SchemaCommands,
    },
}

#[derive(Subcommand)]
enum SchemaCommands {
    /// Export JSON Schema files for canonical types
    Export {
        /// Output directory (default: ./schemas)
        #[arg(long, default_value = "schemas")]
        out_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_or_default(path, true),
        None => Config::load_or_default(&PathBuf::from(DEFAULT_CONFIG_PATH), false),
    }
    .context("loading configuration")?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(&config.log.filter))
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let db_path = cli.db.clone().unwrap_or_else(|| config.store.path.clone());

    match cli.command {
        Commands::Submit {
            neighborhood,
            street,
            house_number,
            postal_code,
            category,
            description,
        } => submit(
            &db_path,
            NewComplaint {
                neighborhood,
                street,
                house_number,
                postal_code,
                category,
                description,
            },
        ),
        Commands::List { protocol } => list(&db_path, protocol.as_deref()),
        Commands::Export { out } => export(&db_path, out),
        Commands::Save { input } => save(&db_path, input),
        Commands::Schema { command } => match command {
            SchemaCommands::Export { out_dir } => schema_export(out_dir),
        },
    }
}

fn submit(db_path: &str, new: NewComplaint) -> Result<()> {
    let mut store = SqliteStore::open(db_path)?;
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    let receipt = service::submit(&mut store, new, now).context("registering complaint")?;
    println!("Protocol: {}", receipt.protocol);
    Ok(())
}

fn list(db_path: &str, protocol: Option<&str>) -> Result<()> {
    let store = SqliteStore::open(db_path)?;
    let complaints = service::search(&store, protocol.unwrap_or_default())?;
    if complaints.is_empty() {
        println!("No complaints registered.");
        return Ok(());
    }
    print_table(&complaints);
    Ok(())
}

fn export(db_path: &str, out: PathBuf) -> Result<()> {
    let store = SqliteStore::open(db_path)?;
    let complaints = service::list(&store)?;
    sheet::export_to_path(&complaints, &out)?;
    println!("Exported {} complaints to {}", complaints.len(), out.display());
    Ok(())
}

fn save(db_path: &str, input: PathBuf) -> Result<()> {
    let rows = sheet::import_from_path(&input)?;
    let mut store = SqliteStore::open(db_path)?;
    let summary = service::save(&mut store, &rows).context("saving edited sheet")?;
    println!(
        "Saved {} of {} rows ({} without protocol, {} unmatched)",
        summary.updated, summary.rows_seen, summary.skipped_blank, summary.skipped_unmatched
    );
    Ok(())
}

fn print_table(complaints: &[Complaint]) {
    let rows: Vec<[String; 11]> = complaints.iter().map(Complaint::table_cells).collect();
    let mut widths = TABLE_COLUMNS.map(|column| column.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    println!("{}", render_row(TABLE_COLUMNS.into_iter(), &widths));
    for row in &rows {
        println!("{}", render_row(row.iter().map(String::as_str), &widths));
    }
}

fn render_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths.iter().copied())
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

fn schema_export(out_dir: PathBuf) -> Result<()> {
    fs::create_dir_all(&out_dir)?;

    let complaint_schema = schema_for!(complaint_core::Complaint);
    let complaint_json = serde_json::to_string_pretty(&complaint_schema)?;
    fs::write(out_dir.join("Complaint.schema.json"), complaint_json)?;

    let new_schema = schema_for!(complaint_core::NewComplaint);
    let new_json = serde_json::to_string_pretty(&new_schema)?;
    fs::write(out_dir.join("NewComplaint.schema.json"), new_json)?;

    let row_schema = schema_for!(complaint_core::EditedRow);
    let row_json = serde_json::to_string_pretty(&row_schema)?;
    fs::write(out_dir.join("EditedRow.schema.json"), row_json)?;

    info!(out_dir = %out_dir.display(), "Exported schemas");
    println!("Exported schemas to {}", out_dir.display());
    Ok(())
}
