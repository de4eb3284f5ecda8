use std::{
    fs::{self, File, OpenOptions},
    io::Write,
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::Result;
use drea::{GestureTrace, ServiceCall};
use serde_json::{json, Value};

pub const LOG_JSON_PATH_ENV: &str = "DREA_LOG_JSON_PATH";

/// Human-readable lines on stdout/stderr, mirrored as JSON lines into an
/// optional file.
pub struct Logger {
    json_file: Option<File>,
}

impl Logger {
    pub fn from_env() -> Result<Self> {
        Self::new(super::env_utils::env_path(LOG_JSON_PATH_ENV))
    }

    pub fn new(path: Option<PathBuf>) -> Result<Self> {
        let json_file = match path {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                Some(OpenOptions::new().create(true).append(true).open(path)?)
            }
            None => None,
        };
        Ok(Self { json_file })
    }

    pub fn info(&mut self, message: impl AsRef<str>) {
        println!("{}", message.as_ref());
        self.event("info", message.as_ref());
    }

    pub fn warn(&mut self, message: impl AsRef<str>) {
        eprintln!("{}", message.as_ref());
        self.event("warn", message.as_ref());
    }

    pub fn event(&mut self, level: &str, message: &str) {
        self.write_entry(json!({
            "ts_ms": now_ms(),
            "level": level,
            "msg": message,
        }));
    }

    /// JSON-only record of how one payload moved the gesture.
    pub fn trace(&mut self, line_no: usize, trace: &GestureTrace) {
        self.write_entry(json!({
            "ts_ms": now_ms(),
            "level": "trace",
            "line": line_no,
            "trace": trace,
        }));
    }

    pub fn call(&mut self, line_no: usize, call: &ServiceCall) {
        self.write_entry(json!({
            "ts_ms": now_ms(),
            "level": "call",
            "line": line_no,
            "domain": call.domain.as_str(),
            "action": call.action.as_str(),
            "data": call.service_data(),
        }));
    }

    fn write_entry(&mut self, entry: Value) {
        let Some(file) = &mut self.json_file else {
            return;
        };
        let _ = writeln!(file, "{entry}");
        let _ = file.flush();
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
