use std::{fs, io, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mapping::AttributeKind;
use crate::target::{ColorMode, TargetKind, TargetState};

pub const TAP_MIN_MS: i64 = 200;
pub const TAP_MAX_MS: i64 = 800;
pub const TAP_ROTATION_TOLERANCE: f64 = 5.0;
/// Rotation units that sweep an attribute across its whole range.
pub const ROTATION_SPAN: f64 = 270.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("invalid config toml: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("{slot}: target '{target}' is not <light|media_player|climate>.<name>")]
    UnknownTarget { slot: &'static str, target: String },
    #[error("{slot}: attribute {attribute} is not available on {kind} targets")]
    UnsupportedAttribute {
        slot: &'static str,
        kind: &'static str,
        attribute: &'static str,
    },
    #[error("tuning: {0}")]
    InvalidTuning(&'static str),
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GestureTuning {
    pub tap_min_ms: i64,
    pub tap_max_ms: i64,
    pub tap_rotation_tolerance: f64,
    pub rotation_span: f64,
}

impl Default for GestureTuning {
    fn default() -> Self {
        Self {
            tap_min_ms: TAP_MIN_MS,
            tap_max_ms: TAP_MAX_MS,
            tap_rotation_tolerance: TAP_ROTATION_TOLERANCE,
            rotation_span: ROTATION_SPAN,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FingerBinding {
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub attribute: Option<AttributeKind>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FingerBindings {
    pub two: Option<FingerBinding>,
    pub three: Option<FingerBinding>,
    pub four: Option<FingerBinding>,
    pub five: Option<FingerBinding>,
}

impl FingerBindings {
    pub fn get(&self, finger_count: u8) -> Option<&FingerBinding> {
        match finger_count {
            2 => self.two.as_ref(),
            3 => self.three.as_ref(),
            4 => self.four.as_ref(),
            5 => self.five.as_ref(),
            _ => None,
        }
    }

    pub fn slot_mut(&mut self, finger_count: u8) -> Option<&mut Option<FingerBinding>> {
        match finger_count {
            2 => Some(&mut self.two),
            3 => Some(&mut self.three),
            4 => Some(&mut self.four),
            5 => Some(&mut self.five),
            _ => None,
        }
    }

    pub fn target(&self, finger_count: u8) -> Option<&str> {
        self.get(finger_count)?.target.as_deref()
    }

    fn slots(&self) -> [(&'static str, Option<&FingerBinding>); 4] {
        [
            ("fingers.two", self.two.as_ref()),
            ("fingers.three", self.three.as_ref()),
            ("fingers.four", self.four.as_ref()),
            ("fingers.five", self.five.as_ref()),
        ]
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GestureConfig {
    pub tuning: GestureTuning,
    pub fingers: FingerBindings,
}

impl GestureConfig {
    pub fn bind(
        mut self,
        finger_count: u8,
        target: impl Into<String>,
        attribute: Option<AttributeKind>,
    ) -> Self {
        if let Some(slot) = self.fingers.slot_mut(finger_count) {
            *slot = Some(FingerBinding {
                target: Some(target.into()),
                attribute,
            });
        }
        self
    }
}

pub fn parse_config(raw: &str) -> Result<GestureConfig, ConfigError> {
    Ok(toml::from_str(raw)?)
}

pub fn load_config(path: &Path) -> Result<GestureConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let config = parse_config(&raw)?;
    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &GestureConfig) -> Result<(), ConfigError> {
    let tuning = &config.tuning;
    if tuning.tap_min_ms >= tuning.tap_max_ms {
        return Err(ConfigError::InvalidTuning(
            "tap_min_ms must be below tap_max_ms",
        ));
    }
    if !(tuning.tap_rotation_tolerance > 0.0) {
        return Err(ConfigError::InvalidTuning(
            "tap_rotation_tolerance must be positive",
        ));
    }
    if !(tuning.rotation_span > 0.0) || !tuning.rotation_span.is_finite() {
        return Err(ConfigError::InvalidTuning(
            "rotation_span must be positive and finite",
        ));
    }

    for (slot, binding) in config.fingers.slots() {
        let Some(binding) = binding else {
            continue;
        };
        let Some(target) = binding.target.as_deref() else {
            continue;
        };
        let kind =
            TargetKind::from_target_id(target).ok_or_else(|| ConfigError::UnknownTarget {
                slot,
                target: target.to_string(),
            })?;
        if let Some(attribute) = binding.attribute {
            if !attribute.is_supported_by(kind) {
                return Err(ConfigError::UnsupportedAttribute {
                    slot,
                    kind: kind.as_str(),
                    attribute: attribute.as_str(),
                });
            }
        }
    }

    Ok(())
}

/// Attribute kinds a concrete target can be driven through, judged from what
/// it currently reports.
pub fn available_attributes(target: &TargetState) -> Vec<AttributeKind> {
    let attributes = &target.attributes;
    let mut out = Vec::new();
    match target.kind() {
        Some(TargetKind::Light) => {
            out.push(AttributeKind::Brightness);
            if [ColorMode::Hs, ColorMode::Xy, ColorMode::Rgb]
                .into_iter()
                .any(|mode| attributes.supports_color_mode(mode))
            {
                out.push(AttributeKind::Color);
                out.push(AttributeKind::Saturation);
            }
            if attributes.supports_color_mode(ColorMode::ColorTemp) {
                out.push(AttributeKind::ColorTemp);
            }
            if attributes.supports_color_mode(ColorMode::Rgbw) {
                out.push(AttributeKind::RgbwColor);
            }
        }
        Some(TargetKind::Climate) => {
            if attributes.temperature.is_some() {
                out.push(AttributeKind::Temperature);
            }
        }
        Some(TargetKind::MediaPlayer) => {
            if attributes.volume_level.is_some() {
                out.push(AttributeKind::VolumeLevel);
            }
        }
        None => {}
    }
    out
}
