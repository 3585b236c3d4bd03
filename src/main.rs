use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tech_tracker::config::TrackerConfig;
use tech_tracker::db::Storage;
use tech_tracker::models::*;
use tech_tracker::render;
use tech_tracker::store::TechnologyStore;

#[derive(Parser)]
#[command(name = "techtrack")]
#[command(about = "Track your progress learning technologies")]
struct Cli {
    /// Storage file to use instead of the default data directory
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List technologies
    List {
        #[arg(long, value_parser = parse_status)]
        status: Option<Status>,
        #[arg(long)]
        category: Option<String>,
        /// Match title or description
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one technology in full
    Show { id: u64 },
    /// Set the status of a technology
    Status {
        id: u64,
        #[arg(value_parser = parse_status)]
        status: Status,
    },
    /// Advance a technology to its next status
    Cycle { id: u64 },
    /// Set the status of every technology
    StatusAll {
        #[arg(value_parser = parse_status)]
        status: Status,
    },
    /// Replace the notes of a technology
    Notes { id: u64, text: String },
    /// Set a deadline (YYYY-MM-DD), or clear it when no date is given
    Deadline {
        id: u64,
        #[arg(value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
    /// Manage resource links
    Resource {
        #[command(subcommand)]
        action: ResourceAction,
    },
    /// Add a new technology
    Add {
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Change the title, description or category of a technology
    Update {
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },
    /// Delete a technology
    Delete {
        id: u64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show progress and statistics
    Stats,
    /// Suggest a technology to start next
    Next,
    /// Export the collection to a JSON file
    Export {
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// Replace the collection with the contents of a JSON file
    Import { file: PathBuf },
    /// Restore the built-in technology list
    Reset {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show or change the saved configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the active configuration
    Show,
    /// Change settings and save them to the config file
    Set {
        #[arg(long)]
        roadmap_name: Option<String>,
        /// Storage file to use from now on
        #[arg(long, conflicts_with = "default_data_path")]
        data_path: Option<PathBuf>,
        /// Go back to the storage file in the data directory
        #[arg(long)]
        default_data_path: bool,
        #[arg(long)]
        max_import_bytes: Option<u64>,
    },
}

#[derive(Subcommand)]
enum ResourceAction {
    Add { id: u64, url: String },
    Remove { id: u64, url: String },
}

fn parse_status(s: &str) -> Result<Status, String> {
    Status::from_str(s).ok_or_else(|| {
        format!("expected one of: not-started, in-progress, completed (got '{}')", s)
    })
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    deadline_format::parse(s).map_err(|e| format!("expected YYYY-MM-DD: {}", e))
}

/// Logs go to stderr so stdout only carries command output.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "tech_tracker=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{} [y/N] ", prompt);
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

fn report(found: bool, id: u64) {
    if found {
        println!("Updated #{}", id);
    } else {
        println!("No technology with id {}", id);
    }
}

fn run_config(config: &mut TrackerConfig, action: ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        ConfigAction::Set {
            roadmap_name,
            data_path,
            default_data_path,
            max_import_bytes,
        } => {
            if let Some(name) = roadmap_name {
                config.roadmap_name = name;
            }
            if let Some(path) = data_path {
                config.data_path = Some(path);
            }
            if default_data_path {
                config.data_path = None;
            }
            if let Some(limit) = max_import_bytes {
                config.max_import_bytes = limit;
            }
            let saved = config.save().context("Failed to save config")?;
            println!("Saved {}", saved.display());
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = TrackerConfig::load();

    if let Some(Commands::Config { action }) = cli.command {
        return run_config(&mut config, action);
    }

    let storage = match cli.data.or_else(|| config.data_path.clone()) {
        Some(path) => Storage::open(path)?,
        None => Storage::open_default()?,
    };
    storage.migrate()?;

    let mut store = TechnologyStore::load(storage, config);
    let today = Local::now().date_naive();

    match cli.command.unwrap_or(Commands::List {
        status: None,
        category: None,
        search: None,
    }) {
        Commands::List {
            status,
            category,
            search,
        } => {
            let technologies: Vec<&Technology> = store
                .search(search.as_deref().unwrap_or(""))
                .into_iter()
                .filter(|t| status.map_or(true, |s| t.status == s))
                .filter(|t| {
                    category
                        .as_deref()
                        .map_or(true, |c| t.category.as_deref() == Some(c))
                })
                .collect();
            print!("{}", render::render_list(&technologies, today));
            println!("{}", render::progress_bar(store.calculate_progress()));
        }
        Commands::Show { id } => match store.get(id) {
            Some(tech) => print!("{}", render::render_detail(tech, today)),
            None => println!("No technology with id {}", id),
        },
        Commands::Status { id, status } => report(store.update_status(id, status), id),
        Commands::Cycle { id } => match store.cycle_status(id) {
            Some(status) => println!("#{} is now {}", id, status),
            None => println!("No technology with id {}", id),
        },
        Commands::StatusAll { status } => {
            store.update_all_status(status);
            println!("All technologies set to {}", status);
        }
        Commands::Notes { id, text } => report(store.update_notes(id, &text), id),
        Commands::Deadline { id, date } => report(store.update_deadline(id, date), id),
        Commands::Resource { action } => match action {
            ResourceAction::Add { id, url } => report(store.add_resource(id, &url), id),
            ResourceAction::Remove { id, url } => report(store.remove_resource(id, &url), id),
        },
        Commands::Add {
            title,
            description,
            category,
        } => {
            match store.add_technology(CreateTechnologyInput {
                title,
                description,
                category,
            }) {
                Some(tech) => println!("Added #{} {}", tech.id, tech.title),
                None => println!("No free id left, nothing added"),
            }
        }
        Commands::Update {
            id,
            title,
            description,
            category,
        } => {
            let input = UpdateTechnologyInput {
                title,
                description,
                category,
                ..UpdateTechnologyInput::default()
            };
            report(store.update_technology(id, input).is_some(), id);
        }
        Commands::Delete { id, yes } => {
            let Some(tech) = store.get(id) else {
                println!("No technology with id {}", id);
                return Ok(());
            };
            let prompt = format!("Delete #{} {}?", tech.id, tech.title);
            if yes || confirm(&prompt)? {
                store.delete_technology(id);
                println!("Deleted #{}", id);
            }
        }
        Commands::Stats => {
            print!(
                "{}",
                render::render_stats(&store.get_stats_on(today), store.calculate_progress())
            );
        }
        Commands::Next => match store.suggest_next() {
            Some(tech) => print!("{}", render::render_detail(tech, today)),
            None => println!("Nothing left to start"),
        },
        Commands::Export { dir } => {
            let path = store.export_to_file(&dir).await?;
            println!("Exported to {}", path.display());
        }
        Commands::Import { file } => {
            let outcome = store
                .import_from_json(&file)
                .await
                .with_context(|| format!("Import of {} failed", file.display()))?;
            if let Some(notice) = store.notification() {
                println!("{}", notice.message);
            }
            for warning in &outcome.warnings {
                println!("warning: {}", warning);
            }
        }
        Commands::Reset { yes } => {
            if yes || confirm("Replace every technology with the built-in list?")? {
                store.reset_all_data();
                println!("Collection reset");
            }
        }
        Commands::Config { .. } => unreachable!("handled before storage is opened"),
    }

    Ok(())
}
