use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

mod config;
mod dbus_interface;
mod providers;
mod sinks;

use config::Config;
use dbus_interface::AttendanceService;
use providers::{BusDetector, BusVideo, InferenceProxy};
use rollcall_engine::AttendanceEngine;
use sinks::{JsonRosterSource, JsonlAttendanceSink, LogEventSink};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("rollcalld starting");

    let config = Config::from_env();
    tracing::info!(
        roster = %config.roster_path.display(),
        attendance_log = %config.attendance_log.display(),
        threshold = config.match_threshold,
        interval_ms = config.scan_interval_ms,
        "configuration loaded"
    );

    let bus = zbus::Connection::session()
        .await
        .context("failed to connect to the session bus")?;

    let inference = InferenceProxy::new(&bus)
        .await
        .context("failed to build the inference sidecar proxy")?;

    let engine = Arc::new(AttendanceEngine::new(
        config.engine_config(),
        Arc::new(BusDetector::new(inference.clone())),
        Arc::new(BusVideo::new(inference)),
        Arc::new(JsonlAttendanceSink::new(config.attendance_log.clone())),
        Arc::new(LogEventSink),
    ));

    let service = AttendanceService::new(
        engine.clone(),
        Arc::new(JsonRosterSource::new(config.roster_path.clone())),
    );

    let _server = zbus::connection::Builder::session()?
        .name("org.rollcall.Attendance1")?
        .serve_at("/org/rollcall/Attendance1", service)?
        .build()
        .await
        .context("failed to register org.rollcall.Attendance1")?;

    tracing::info!("rollcalld ready");

    tokio::signal::ctrl_c().await?;
    tracing::info!("rollcalld shutting down");
    if engine.stop().await {
        tracing::info!("active scan session stopped");
    }

    Ok(())
}
