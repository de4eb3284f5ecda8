use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gesture::GestureState;

pub const INITIAL_STATUS: &str = "No messages";

#[derive(Debug, Error)]
pub enum StatusError {
    #[error("failed to access status file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("invalid status json: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Observable sensor record: the latest raw payload plus the gesture state
/// that must survive until the next one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SensorStatus {
    pub state: String,
    #[serde(default)]
    pub last_message: Option<String>,
    #[serde(default)]
    pub gesture: GestureState,
}

impl Default for SensorStatus {
    fn default() -> Self {
        Self {
            state: INITIAL_STATUS.to_string(),
            last_message: None,
            gesture: GestureState::default(),
        }
    }
}

impl SensorStatus {
    pub fn record(&mut self, payload: &str, gesture: GestureState) {
        self.state = payload.to_string();
        self.last_message = Some(payload.to_string());
        self.gesture = gesture;
    }

    pub fn has_messages(&self) -> bool {
        self.last_message.is_some()
    }
}

#[derive(Clone, Debug)]
pub struct StatusStore {
    path: PathBuf,
}

impl StatusStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A store that has never been written reads as the initial status.
    pub fn load(&self) -> Result<SensorStatus, StatusError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(SensorStatus::default()),
            Err(source) => Err(self.io_error(source)),
        }
    }

    pub fn save(&self, status: &SensorStatus) -> Result<(), StatusError> {
        let raw = serde_json::to_string_pretty(status)?;
        fs::write(&self.path, raw).map_err(|source| self.io_error(source))
    }

    fn io_error(&self, source: io::Error) -> StatusError {
        StatusError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}
