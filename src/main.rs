use anyhow::Result;
use clap::{Parser, Subcommand};

use classwise::config::AppConfig;
use classwise::quality::selector;
use classwise::storage;
use classwise::timetable::conflict::detect_conflicts;
use classwise::timetable::import::plan_import;
use classwise::timetable::{EntryDraft, TimeSlot, TimetableEntry};

#[derive(Parser)]
#[command(
    name = "classwise",
    about = "Timetable conflict checking and adaptive stream quality advisor",
    version,
    long_about = None
)]
struct Cli {
    /// Config file path
    #[arg(long, default_value = "classwise.toml", global = true)]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the daemon (API server + quality monitor)
    Serve {
        /// Bind address (overrides the config file)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Check a proposed slot against an instructor's persisted schedule
    Check {
        /// Instructor identifier
        #[arg(long)]
        instructor: String,

        /// Day of week, 0-6 (0 = Sunday)
        #[arg(long)]
        day: u8,

        /// Start time, HH:MM
        #[arg(long)]
        start: String,

        /// End time, HH:MM
        #[arg(long)]
        end: String,

        /// Entry id to ignore (when editing an existing entry)
        #[arg(long)]
        exclude: Option<String>,
    },

    /// Recommend a playback tier for given network conditions
    Quality {
        /// Measured bandwidth in Mbps
        #[arg(long)]
        bandwidth: f64,

        /// Data-saver preference (forces the lowest tier)
        #[arg(long)]
        save_data: bool,

        /// Raw connection-type signal (e.g. 4g, slow-2g)
        #[arg(long)]
        connection: Option<String>,
    },

    /// Manage timetable entries
    Timetable {
        #[command(subcommand)]
        action: TimetableAction,
    },
}

#[derive(Subcommand)]
enum TimetableAction {
    /// List all entries
    List,

    /// Add a new entry (conflicts are reported, not blocking)
    Add {
        #[arg(long)]
        instructor: String,

        #[arg(long)]
        subject: String,

        #[arg(long)]
        course: String,

        #[arg(long)]
        room: Option<String>,

        /// Day of week, 0-6 (0 = Sunday)
        #[arg(long)]
        day: u8,

        /// Start time, HH:MM
        #[arg(long)]
        start: String,

        /// End time, HH:MM
        #[arg(long)]
        end: String,
    },

    /// Remove an entry by id
    Remove {
        #[arg(long)]
        id: String,
    },

    /// Validate and import entries from a JSON file
    Import {
        /// Path to a JSON array of entries
        #[arg(long)]
        file: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)?;

    match cli.command {
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            tracing::info!(%bind, "Starting classwise daemon");
            classwise::serve(&bind, config).await?;
        }
        Commands::Check {
            instructor,
            day,
            start,
            end,
            exclude,
        } => {
            let slot = TimeSlot::from_strings(day, &start, &end)?;
            let proposed = TimetableEntry {
                id: uuid::Uuid::new_v4().to_string(),
                instructor_id: instructor.clone(),
                subject: "(proposed)".to_string(),
                course: String::new(),
                room: None,
                slot,
            };

            let pool = storage::open_pool(&config.storage.db_path)?;
            let existing = storage::entries_for_instructor(&pool, &instructor)?;
            let conflicts =
                detect_conflicts(&proposed, &existing, exclude.as_deref(), &config.conflict);

            if conflicts.is_empty() {
                println!("No conflicts for {} on {}.", instructor, slot.describe());
            } else {
                println!("{:<5} | {:<30} | Detail", "Kind", "Existing");
                println!("{:-<5}-|-{:-<30}-|-{:-<40}", "", "", "");
                for c in &conflicts {
                    println!(
                        "{:<5} | {:<30} | {}",
                        c.kind.to_string(),
                        format!("{} ({})", c.existing.subject, c.existing.slot.describe()),
                        c.message
                    );
                }
            }
        }
        Commands::Quality {
            bandwidth,
            save_data,
            connection,
        } => {
            let tier = selector::recommend_quality(bandwidth, save_data, &config.quality.ladder);
            let category = selector::classify_connection_type(connection.as_deref());
            println!("Recommended tier: {}", tier);
            println!("Connection:       {}", category);
        }
        Commands::Timetable { action } => {
            let pool = storage::open_pool(&config.storage.db_path)?;

            match action {
                TimetableAction::List => {
                    let entries = storage::list_entries(&pool)?;
                    if entries.is_empty() {
                        println!("No timetable entries found.");
                    } else {
                        println!(
                            "{:<36} | {:<12} | {:<20} | Slot",
                            "Id", "Instructor", "Subject"
                        );
                        println!("{:-<36}-|-{:-<12}-|-{:-<20}-|-{:-<18}", "", "", "", "");
                        for e in entries {
                            println!(
                                "{:<36} | {:<12} | {:<20} | {}",
                                e.id,
                                e.instructor_id,
                                e.subject,
                                e.slot.describe()
                            );
                        }
                    }
                }
                TimetableAction::Add {
                    instructor,
                    subject,
                    course,
                    room,
                    day,
                    start,
                    end,
                } => {
                    let entry = EntryDraft {
                        id: None,
                        instructor_id: instructor,
                        subject,
                        course,
                        room,
                        day_of_week: day,
                        start_time: start,
                        end_time: end,
                    }
                    .into_entry()?;

                    let existing =
                        storage::entries_for_instructor(&pool, &entry.instructor_id)?;
                    let conflicts = detect_conflicts(&entry, &existing, None, &config.conflict);

                    storage::insert_entry(&pool, &entry)?;
                    storage::log_conflicts(&pool, "cli-add", conflicts.iter())?;

                    println!("Entry '{}' added ({}).", entry.id, entry.slot.describe());
                    for c in &conflicts {
                        println!("  {} conflict: {}", c.kind, c.message);
                    }
                }
                TimetableAction::Remove { id } => {
                    if storage::remove_entry(&pool, &id)? {
                        println!("Entry '{}' removed.", id);
                    } else {
                        println!("Entry '{}' not found.", id);
                    }
                }
                TimetableAction::Import { file } => {
                    let text = std::fs::read_to_string(&file)?;
                    let rows: Vec<EntryDraft> = serde_json::from_str(&text)?;

                    let existing = storage::schedules_for_instructors(
                        &pool,
                        rows.iter().map(|r| r.instructor_id.as_str()),
                    )?;
                    let plan = plan_import(rows, &existing, &config.conflict);

                    for entry in &plan.accepted {
                        storage::insert_entry(&pool, entry)?;
                    }
                    storage::log_conflicts(&pool, "cli-import", plan.conflicts.values().flatten())?;

                    println!(
                        "Imported {} entr{}, skipped {}.",
                        plan.accepted.len(),
                        if plan.accepted.len() == 1 { "y" } else { "ies" },
                        plan.skipped.len()
                    );
                    for row in &plan.skipped {
                        println!(
                            "  skipped {}: {}",
                            row.id.as_deref().unwrap_or("(no id)"),
                            row.reason
                        );
                    }
                }
            }
        }
    }

    Ok(())
}
