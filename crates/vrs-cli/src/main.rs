//! VRS CLI: station image intake from the command line.
//!
//! Configure with `VRS_*` environment variables (a `.env` file is honoured). Log in
//! once with `vrs login <station email>`; later commands act for that station unless
//! `--station` is given.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use vrs_cli::{
    init_tracing, render_batch_detail, render_batch_table, render_error, render_station_table,
    BatchSummary, LoginRecord, SESSION_KEY,
};
use vrs_core::{ErrorMetadata, IntakeConfig, IntakeError, Presentation, Station};
use vrs_services::{
    capture_pending, create_gateway, create_store, BatchDownloader, BatchStore, FsDownloader,
    KeyValueStore, PendingFile, ReaderCapture, SessionState, UploadOrchestrator,
    DEFAULT_DOWNLOAD_DELAY,
};

#[derive(Parser)]
#[command(name = "vrs", about = "Vehicle inspection station image intake")]
struct Cli {
    /// Act as this station (e.g. AR3) instead of the logged-in one
    #[arg(long, global = true)]
    station: Option<String>,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List known stations and their login emails
    Stations,
    /// Log in as the station owning this email
    Login {
        /// Station email, e.g. ar3@dvlavrs.app
        email: String,
    },
    /// Forget the logged-in station
    Logout,
    /// Upload images for a chassis
    Submit {
        /// 4-digit chassis id
        chassis_id: String,
        /// Image files to upload, in order
        files: Vec<PathBuf>,
        /// Add a camera photo read from this file ("-" for stdin)
        #[arg(long)]
        camera: Option<String>,
    },
    /// Search uploads by chassis id (blank lists everything)
    #[command(alias = "list")]
    Search {
        /// Chassis id or part of one
        #[arg(default_value = "")]
        query: String,
    },
    /// Show one upload batch
    Show {
        /// Chassis id
        chassis_id: String,
    },
    /// Download the images of an upload batch
    Download {
        /// Chassis id
        chassis_id: String,
        /// Directory to save into
        #[arg(long, default_value = ".")]
        out: PathBuf,
        /// Only this image (1-based)
        #[arg(long)]
        image: Option<usize>,
    },
    /// Remove this station's upload history
    Clear {
        /// Do not ask for confirmation
        #[arg(long)]
        yes: bool,
    },
}

fn print_json(value: &impl Serialize) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

/// Read configuration. Only submissions need the upload settings to be complete.
fn load_config(for_upload: bool) -> Result<IntakeConfig> {
    if for_upload {
        return IntakeConfig::from_env();
    }
    dotenvy::dotenv().ok();
    IntakeConfig::from_vars(|key| std::env::var(key).ok())
}

async fn logged_in_station(store: &dyn KeyValueStore, explicit: Option<&str>) -> Result<Station> {
    if let Some(id) = explicit {
        return Ok(id.parse::<Station>()?);
    }
    let record: Option<LoginRecord> = saved_login(store).await?;
    record
        .map(|r| r.station)
        .ok_or_else(|| anyhow::anyhow!("Not logged in. Run `vrs login <station email>` or pass --station"))
}

async fn saved_login(store: &dyn KeyValueStore) -> Result<Option<LoginRecord>> {
    match store.get(SESSION_KEY).await? {
        Some(raw) => Ok(Some(
            serde_json::from_str(&raw).context("Saved login is unreadable; log in again")?,
        )),
        None => Ok(None),
    }
}

/// Open the station's session. The upload pipeline is only built for submissions,
/// so browsing works without gateway settings.
async fn open_session(
    config: &IntakeConfig,
    store: Arc<dyn KeyValueStore>,
    station: Station,
    for_upload: bool,
) -> Result<SessionState> {
    let orchestrator = if for_upload {
        let gateway = create_gateway(config).context("Failed to create media gateway")?;
        Some(UploadOrchestrator::new(config, gateway)?)
    } else {
        None
    };
    let batches = BatchStore::from_config(store, config);
    Ok(SessionState::open(station, batches, orchestrator, config.warning_ttl).await)
}

fn confirm(prompt: &str) -> Result<bool> {
    use std::io::Write;
    eprint!("{} [y/N] ", prompt);
    std::io::stderr().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

async fn run(cli: Cli) -> Result<()> {
    let json = cli.json;

    let for_upload = matches!(cli.command, Commands::Submit { .. });
    let config = load_config(for_upload)?;
    let store = create_store(&config)
        .await
        .context("Failed to open local store")?;

    match cli.command {
        Commands::Stations => {
            let with_history = BatchStore::from_config(store, &config)
                .stations_with_history()
                .await
                .unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "Could not list saved upload history");
                    Vec::new()
                });
            if json {
                let stations: Vec<_> = Station::all()
                    .iter()
                    .map(|s| {
                        serde_json::json!({
                            "id": s.id(),
                            "name": s.name(),
                            "email": s.email(),
                            "has_history": with_history.iter().any(|id| id == s.id()),
                        })
                    })
                    .collect();
                print_json(&stations)?;
            } else {
                println!("{}", render_station_table(&with_history));
            }
        }
        Commands::Login { email } => {
            let station = Station::from_email(&email)?;
            let record = LoginRecord {
                station,
                logged_in_at: Utc::now(),
            };
            store
                .set(SESSION_KEY, serde_json::to_string(&record)?)
                .await
                .context("Failed to save login")?;
            if json {
                print_json(&serde_json::json!({ "station": station.id(), "name": station.name() }))?;
            } else {
                println!("Logged in as {} ({})", station.name(), station.id());
            }
        }
        Commands::Logout => {
            store.remove(SESSION_KEY).await.context("Failed to clear login")?;
            if !json {
                println!("Logged out");
            }
        }
        Commands::Submit {
            chassis_id,
            files,
            camera,
        } => {
            let station = logged_in_station(store.as_ref(), cli.station.as_deref()).await?;
            let mut pending = Vec::with_capacity(files.len() + 1);
            for path in &files {
                pending.push(
                    PendingFile::from_path(path)
                        .await
                        .with_context(|| format!("Failed to open file: {}", path.display()))?,
                );
            }
            if let Some(source) = camera {
                let capture = if source == "-" {
                    ReaderCapture::Stdin
                } else {
                    ReaderCapture::File(PathBuf::from(source))
                };
                pending.push(capture_pending(&capture).await?);
            }

            let mut session = open_session(&config, store, station, true).await?;
            let batch = session.submit(&chassis_id, pending).await?.clone();

            if json {
                print_json(&batch)?;
            } else {
                println!(
                    "Uploaded {} image(s) for chassis {} at {}",
                    batch.file_count,
                    batch.chassis_id,
                    station.name()
                );
            }
            if let Some(warning) = session.active_warning(Utc::now()) {
                eprintln!("Warning: {}", warning.message);
            }
        }
        Commands::Search { query } => {
            let station = logged_in_station(store.as_ref(), cli.station.as_deref()).await?;
            let session = open_session(&config, store, station, false).await?;
            let results = session.search(&query);
            if json {
                let rows: Vec<BatchSummary> = results.iter().map(|b| BatchSummary::from(*b)).collect();
                print_json(&rows)?;
            } else {
                println!("{}", render_batch_table(&results));
            }
        }
        Commands::Show { chassis_id } => {
            let station = logged_in_station(store.as_ref(), cli.station.as_deref()).await?;
            let session = open_session(&config, store, station, false).await?;
            let batch = session
                .find(&chassis_id)
                .ok_or_else(|| IntakeError::NotFound(format!("No upload found for chassis {}", chassis_id)))?;
            if json {
                print_json(batch)?;
            } else {
                println!("{}", render_batch_detail(batch));
            }
        }
        Commands::Download {
            chassis_id,
            out,
            image,
        } => {
            let station = logged_in_station(store.as_ref(), cli.station.as_deref()).await?;
            let session = open_session(&config, store, station, false).await?;
            let batch = session
                .find(&chassis_id)
                .ok_or_else(|| IntakeError::NotFound(format!("No upload found for chassis {}", chassis_id)))?;

            let downloader = BatchDownloader::new(
                Arc::new(FsDownloader::new(&out)),
                config.gateway_timeout,
                DEFAULT_DOWNLOAD_DELAY,
            )?;
            let saved = match image {
                Some(0) => return Err(anyhow::anyhow!("Image numbers start at 1")),
                Some(n) => vec![downloader.download_image(batch, n - 1).await?],
                None => downloader.download_batch(batch).await?,
            };

            if json {
                print_json(&saved)?;
            } else {
                for path in saved {
                    println!("Saved {}", path.display());
                }
            }
        }
        Commands::Clear { yes } => {
            let station = logged_in_station(store.as_ref(), cli.station.as_deref()).await?;
            if !yes && !confirm(&format!("Remove all uploads recorded for {}?", station.name()))? {
                return Ok(());
            }
            let mut session = open_session(&config, store, station, false).await?;
            session.clear().await?;
            if !json {
                println!("Cleared upload history for {}", station.name());
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Intake errors carry a message meant for the person at the station.
            match err.downcast_ref::<IntakeError>() {
                Some(intake) if intake.presentation() != Presentation::Silent => {
                    eprintln!("Error: {}", render_error(intake));
                    tracing::debug!(code = intake.error_code(), error = %intake.detailed_message(), "Command failed");
                }
                _ => eprintln!("Error: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}
