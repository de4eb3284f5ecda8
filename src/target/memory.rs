use std::{collections::BTreeMap, fs, io, path::Path};

use thiserror::Error;

use super::{
    Action, AttributeValue, CommandSink, PowerState, ServiceCall, TargetDirectory, TargetState,
};

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("failed to read targets file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("invalid targets json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate target id {0}")]
    Duplicate(String),
}

/// Target directory backed by a map of target records.
///
/// Dispatched calls are applied to the stored records, so a replay observes
/// the same live state a real home would report after each command.
#[derive(Clone, Debug, Default)]
pub struct InMemoryTargets {
    targets: BTreeMap<String, TargetState>,
    dispatched: Vec<ServiceCall>,
}

impl InMemoryTargets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_targets(
        targets: impl IntoIterator<Item = TargetState>,
    ) -> Result<Self, DirectoryError> {
        let mut out = Self::new();
        for target in targets {
            if out.targets.contains_key(&target.target_id) {
                return Err(DirectoryError::Duplicate(target.target_id));
            }
            out.targets.insert(target.target_id.clone(), target);
        }
        Ok(out)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, DirectoryError> {
        let targets: Vec<TargetState> = serde_json::from_str(raw)?;
        Self::from_targets(targets)
    }

    pub fn from_path(path: &Path) -> Result<Self, DirectoryError> {
        let raw = fs::read_to_string(path).map_err(|source| DirectoryError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn insert(&mut self, target: TargetState) {
        self.targets.insert(target.target_id.clone(), target);
    }

    pub fn get(&self, target_id: &str) -> Option<&TargetState> {
        self.targets.get(target_id)
    }

    pub fn dispatched(&self) -> &[ServiceCall] {
        &self.dispatched
    }

    pub fn take_dispatched(&mut self) -> Vec<ServiceCall> {
        core::mem::take(&mut self.dispatched)
    }

    fn apply(&mut self, call: &ServiceCall) {
        let Some(target) = self.targets.get_mut(&call.target_id) else {
            return;
        };

        match call.action {
            Action::TurnOn => target.state = PowerState::On,
            Action::TurnOff => target.state = PowerState::Off,
            Action::MediaPlayPause | Action::VolumeSet | Action::SetTemperature => {}
        }

        let attributes = &mut target.attributes;
        match call.value {
            None => {}
            Some(AttributeValue::Brightness(value)) => attributes.brightness = Some(value.into()),
            Some(AttributeValue::HsColor { hue, saturation }) => {
                attributes.hs_color = Some([Some(hue), Some(saturation)]);
            }
            Some(AttributeValue::ColorTemp(value)) => attributes.color_temp = Some(value.into()),
            Some(AttributeValue::RgbwColor(value)) => attributes.rgbw_color = Some(value),
            Some(AttributeValue::Temperature(value)) => attributes.temperature = Some(value),
            Some(AttributeValue::VolumeLevel(value)) => attributes.volume_level = Some(value),
        }
    }
}

impl TargetDirectory for InMemoryTargets {
    fn target_state(&self, target_id: &str) -> Option<TargetState> {
        self.targets.get(target_id).cloned()
    }
}

impl CommandSink for InMemoryTargets {
    fn dispatch(&mut self, call: &ServiceCall) {
        self.apply(call);
        self.dispatched.push(call.clone());
    }
}
