use std::path::PathBuf;
use std::time::Duration;

use rollcall_engine::{DetectOptions, EngineConfig};

/// Daemon configuration, loaded from environment variables.
pub struct Config {
    /// JSON file holding the roster rows (the `students` table).
    pub roster_path: PathBuf,
    /// JSONL file check-ins are appended to, best-effort.
    pub attendance_log: PathBuf,
    /// Maximum embedding distance for a positive match.
    pub match_threshold: f32,
    /// Pause between scan cycles, in milliseconds.
    pub scan_interval_ms: u64,
    /// Minimum detection confidence forwarded to the inference backend.
    pub min_score: f32,
    /// Detector input size forwarded to the inference backend.
    pub input_size: u32,
}

impl Config {
    /// Load configuration from `ROLLCALL_*` environment variables with defaults.
    pub fn from_env() -> Self {
        let data_dir = std::env::var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
                PathBuf::from(home).join(".local/share")
            })
            .join("rollcall");

        let roster_path = std::env::var("ROLLCALL_ROSTER_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("roster.json"));

        let attendance_log = std::env::var("ROLLCALL_ATTENDANCE_LOG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("attendance.jsonl"));

        Self {
            roster_path,
            attendance_log,
            match_threshold: env_f32("ROLLCALL_MATCH_THRESHOLD", 0.6),
            scan_interval_ms: env_u64("ROLLCALL_SCAN_INTERVAL_MS", 900),
            min_score: env_f32("ROLLCALL_MIN_SCORE", 0.5),
            input_size: env_u32("ROLLCALL_INPUT_SIZE", 256),
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            match_threshold: self.match_threshold,
            scan_interval: Duration::from_millis(self.scan_interval_ms),
            detect_options: DetectOptions {
                min_score: self.min_score,
                input_size: self.input_size,
            },
        }
    }
}

fn env_f32(key: &str, default: f32) -> f32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
