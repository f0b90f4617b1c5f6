use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

/// Client side of the attendance daemon.
#[zbus::proxy(
    interface = "org.rollcall.Attendance1",
    default_service = "org.rollcall.Attendance1",
    default_path = "/org/rollcall/Attendance1"
)]
trait Attendance {
    fn load_roster(&self) -> zbus::Result<String>;
    fn start_scan(&self) -> zbus::Result<String>;
    fn stop_scan(&self) -> zbus::Result<bool>;
    fn status(&self) -> zbus::Result<String>;
    fn list_checkins(&self) -> zbus::Result<String>;
    fn export_csv(&self) -> zbus::Result<Vec<u8>>;
    fn set_threshold(&self, threshold: f64) -> zbus::Result<()>;
}

#[derive(Parser)]
#[command(name = "rollcall", about = "Rollcall face attendance CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the roster from the daemon's configured source
    LoadRoster,
    /// Start a scan session
    Start,
    /// Stop the active scan session
    Stop,
    /// Show daemon status
    Status,
    /// List check-ins for the current session
    List,
    /// Export the attendance ledger as CSV
    Export {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Adjust the match threshold
    SetThreshold {
        /// Maximum accepted embedding distance (e.g. 0.6)
        threshold: f64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let bus = zbus::Connection::session()
        .await
        .context("failed to connect to the session bus; is rollcalld running?")?;
    let proxy = AttendanceProxy::new(&bus).await?;

    match cli.command {
        Commands::LoadRoster => {
            let report = proxy.load_roster().await?;
            println!("Roster loaded: {report}");
        }
        Commands::Start => {
            let session = proxy.start_scan().await?;
            println!("Scanning (session {session})");
        }
        Commands::Stop => {
            if proxy.stop_scan().await? {
                println!("Scan session stopped");
            } else {
                println!("No scan session active");
            }
        }
        Commands::Status => {
            println!("{}", proxy.status().await?);
        }
        Commands::List => {
            let checkins: serde_json::Value = serde_json::from_str(&proxy.list_checkins().await?)?;
            match checkins.as_array() {
                Some(rows) if !rows.is_empty() => {
                    for row in rows {
                        println!(
                            "{}  {}  {}",
                            row["student_id"].as_str().unwrap_or("?"),
                            row["full_name"].as_str().unwrap_or("?"),
                            row["checkin_time"].as_str().unwrap_or("?"),
                        );
                    }
                }
                _ => println!("No check-ins yet"),
            }
        }
        Commands::Export { output } => {
            let csv = proxy.export_csv().await?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &csv)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("Wrote {}", path.display());
                }
                None => {
                    std::io::stdout().write_all(&csv)?;
                    println!();
                }
            }
        }
        Commands::SetThreshold { threshold } => {
            proxy.set_threshold(threshold).await?;
            println!("Match threshold set to {threshold}");
        }
    }

    Ok(())
}
