//! Rotation-to-attribute arithmetic.
//!
//! Every mapper is a pure function of the rotation step and the target state
//! captured when the gesture started. Nothing here reads live target state,
//! so repeated rotation events within one gesture all measure against the
//! same origin.

mod attributes;
pub mod color;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ROTATION_SPAN;
use crate::target::{Action, ServiceCall, TargetKind, TargetState};

pub use attributes::{
    map_brightness, map_climate_temperature, map_color_temp, map_hue, map_rgbw, map_saturation,
    map_volume,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    Brightness,
    ColorTemp,
    Color,
    Saturation,
    RgbwColor,
    VolumeLevel,
    Temperature,
}

impl AttributeKind {
    pub const ALL: [Self; 7] = [
        Self::Brightness,
        Self::ColorTemp,
        Self::Color,
        Self::Saturation,
        Self::RgbwColor,
        Self::VolumeLevel,
        Self::Temperature,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Brightness => "brightness",
            Self::ColorTemp => "color_temp",
            Self::Color => "color",
            Self::Saturation => "saturation",
            Self::RgbwColor => "rgbw_color",
            Self::VolumeLevel => "volume_level",
            Self::Temperature => "temperature",
        }
    }

    pub const fn target_kind(self) -> TargetKind {
        match self {
            Self::Brightness
            | Self::ColorTemp
            | Self::Color
            | Self::Saturation
            | Self::RgbwColor => TargetKind::Light,
            Self::VolumeLevel => TargetKind::MediaPlayer,
            Self::Temperature => TargetKind::Climate,
        }
    }

    pub fn is_supported_by(self, kind: TargetKind) -> bool {
        self.target_kind() == kind
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("{attribute} cannot drive a {target} target")]
    UnsupportedCombination {
        target: &'static str,
        attribute: &'static str,
    },
    #[error("{target_id} reports no {attribute}")]
    MissingAttribute {
        target_id: String,
        attribute: &'static str,
    },
    #[error("{target_id} reports {attribute} bounds with no valid value between them")]
    InvalidBounds {
        target_id: String,
        attribute: &'static str,
    },
}

/// A rotation delta as a signed fraction of the full sweep. Clockwise
/// rotation reports negative deltas, so the sign is flipped to make it
/// raise the attribute.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RotationStep {
    percentage: f64,
}

impl RotationStep {
    pub fn new(delta: f64, span: f64) -> Self {
        Self {
            percentage: (delta / span) * -1.0,
        }
    }

    pub fn from_delta(delta: f64) -> Self {
        Self::new(delta, ROTATION_SPAN)
    }

    pub fn percentage(self) -> f64 {
        self.percentage
    }

    pub fn scaled(self, range: f64) -> f64 {
        self.percentage * range
    }
}

/// Builds the service call for one rotation update of `attribute` on the
/// target captured in `snapshot`.
pub fn map_rotation(
    target_id: &str,
    kind: TargetKind,
    attribute: AttributeKind,
    step: RotationStep,
    snapshot: &TargetState,
) -> Result<ServiceCall, MappingError> {
    let (action, value) = match (kind, attribute) {
        (TargetKind::Light, AttributeKind::Brightness) => {
            (Action::TurnOn, Some(map_brightness(step, snapshot)?))
        }
        (TargetKind::Light, AttributeKind::Color) => (Action::TurnOn, map_hue(step, snapshot)?),
        (TargetKind::Light, AttributeKind::Saturation) => {
            (Action::TurnOn, map_saturation(step, snapshot))
        }
        (TargetKind::Light, AttributeKind::ColorTemp) => {
            (Action::TurnOn, Some(map_color_temp(step, snapshot)?))
        }
        (TargetKind::Light, AttributeKind::RgbwColor) => {
            (Action::TurnOn, map_rgbw(step, snapshot)?)
        }
        (TargetKind::MediaPlayer, AttributeKind::VolumeLevel) => {
            (Action::VolumeSet, Some(map_volume(step, snapshot)?))
        }
        (TargetKind::Climate, AttributeKind::Temperature) => (
            Action::SetTemperature,
            Some(map_climate_temperature(step, snapshot)?),
        ),
        (
            TargetKind::Light | TargetKind::MediaPlayer | TargetKind::Climate,
            AttributeKind::Brightness
            | AttributeKind::ColorTemp
            | AttributeKind::Color
            | AttributeKind::Saturation
            | AttributeKind::RgbwColor
            | AttributeKind::VolumeLevel
            | AttributeKind::Temperature,
        ) => {
            return Err(MappingError::UnsupportedCombination {
                target: kind.as_str(),
                attribute: attribute.as_str(),
            })
        }
    };

    Ok(ServiceCall {
        domain: kind,
        action,
        target_id: target_id.to_string(),
        value,
    })
}
