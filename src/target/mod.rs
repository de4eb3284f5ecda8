mod memory;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

pub use memory::{DirectoryError, InMemoryTargets};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Light,
    MediaPlayer,
    Climate,
}

impl TargetKind {
    pub const ALL: [Self; 3] = [Self::Light, Self::MediaPlayer, Self::Climate];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::MediaPlayer => "media_player",
            Self::Climate => "climate",
        }
    }

    pub fn from_domain(domain: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == domain)
    }

    /// Target ids are `<domain>.<name>`; the domain selects the kind.
    pub fn from_target_id(target_id: &str) -> Option<Self> {
        let (domain, name) = target_id.split_once('.')?;
        if name.is_empty() {
            return None;
        }
        Self::from_domain(domain)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerState {
    On,
    Off,
    /// Anything the target reports that is neither `on` nor `off`
    /// (`unavailable`, `playing`, `heat`, ...).
    #[serde(other)]
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    Onoff,
    Brightness,
    ColorTemp,
    Hs,
    Xy,
    Rgb,
    Rgbw,
    Rgbww,
    White,
    #[serde(other)]
    Unknown,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hs_color: Option<[Option<f64>; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rgbw_color: Option<[u8; 4]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_temp: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_mireds: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_mireds: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub supported_color_modes: Vec<ColorMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_temp: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_temp: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_level: Option<f64>,
}

impl TargetAttributes {
    pub fn hue(&self) -> Option<f64> {
        self.hs_color.and_then(|[hue, _]| hue)
    }

    pub fn saturation(&self) -> Option<f64> {
        self.hs_color.and_then(|[_, saturation]| saturation)
    }

    pub fn supports_color_mode(&self, mode: ColorMode) -> bool {
        self.supported_color_modes.contains(&mode)
    }
}

/// A target's reported state at one point in time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TargetState {
    pub target_id: String,
    pub state: PowerState,
    #[serde(default)]
    pub attributes: TargetAttributes,
}

impl TargetState {
    pub fn new(target_id: impl Into<String>, state: PowerState) -> Self {
        Self {
            target_id: target_id.into(),
            state,
            attributes: TargetAttributes::default(),
        }
    }

    pub fn kind(&self) -> Option<TargetKind> {
        TargetKind::from_target_id(&self.target_id)
    }

    pub fn is_off(&self) -> bool {
        matches!(self.state, PowerState::Off)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    TurnOn,
    TurnOff,
    MediaPlayPause,
    VolumeSet,
    SetTemperature,
}

impl Action {
    pub const ALL: [Self; 5] = [
        Self::TurnOn,
        Self::TurnOff,
        Self::MediaPlayPause,
        Self::VolumeSet,
        Self::SetTemperature,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|action| action.as_str().eq_ignore_ascii_case(name))
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TurnOn => "turn_on",
            Self::TurnOff => "turn_off",
            Self::MediaPlayPause => "media_play_pause",
            Self::VolumeSet => "volume_set",
            Self::SetTemperature => "set_temperature",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AttributeValue {
    Brightness(u8),
    HsColor { hue: f64, saturation: f64 },
    ColorTemp(u32),
    RgbwColor([u8; 4]),
    Temperature(f64),
    VolumeLevel(f64),
}

impl AttributeValue {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Brightness(_) => "brightness",
            Self::HsColor { .. } => "hs_color",
            Self::ColorTemp(_) => "color_temp",
            Self::RgbwColor(_) => "rgbw_color",
            Self::Temperature(_) => "temperature",
            Self::VolumeLevel(_) => "volume_level",
        }
    }

    pub fn to_json(self) -> Value {
        match self {
            Self::Brightness(value) => json!(value),
            Self::HsColor { hue, saturation } => json!([hue, saturation]),
            Self::ColorTemp(value) => json!(value),
            Self::RgbwColor(value) => json!(value),
            Self::Temperature(value) | Self::VolumeLevel(value) => json!(value),
        }
    }
}

/// One call into the command dispatch interface: `(domain, action, data)`.
///
/// Rotation gestures produce calls carrying an attribute value; taps produce
/// bare toggles. A rotation against a switched-off light may also produce a
/// bare call, which switches the light on without touching its color.
#[derive(Clone, Debug, PartialEq)]
pub struct ServiceCall {
    pub domain: TargetKind,
    pub action: Action,
    pub target_id: String,
    pub value: Option<AttributeValue>,
}

impl ServiceCall {
    pub fn bare(domain: TargetKind, action: Action, target_id: impl Into<String>) -> Self {
        Self {
            domain,
            action,
            target_id: target_id.into(),
            value: None,
        }
    }

    pub fn attribute_name(&self) -> Option<&'static str> {
        self.value.map(AttributeValue::name)
    }

    pub fn service_data(&self) -> Value {
        let mut data = Map::new();
        data.insert("entity_id".into(), json!(self.target_id));
        if let Some(value) = self.value {
            data.insert(value.name().into(), value.to_json());
        }
        Value::Object(data)
    }
}

/// Toggle-style call for a tap, chosen from the target's live state.
pub fn toggle_call(target: &TargetState) -> Option<ServiceCall> {
    let kind = target.kind()?;
    let action = match (kind, target.state) {
        (TargetKind::Light, PowerState::Off) => Action::TurnOn,
        (TargetKind::Light, PowerState::On) => Action::TurnOff,
        (TargetKind::Light, PowerState::Other) => return None,
        (TargetKind::MediaPlayer, _) => Action::MediaPlayPause,
        (TargetKind::Climate, PowerState::Off) => Action::TurnOn,
        (TargetKind::Climate, _) => Action::TurnOff,
    };
    Some(ServiceCall::bare(kind, action, target.target_id.clone()))
}

pub trait TargetDirectory {
    fn target_state(&self, target_id: &str) -> Option<TargetState>;
}

pub trait CommandSink {
    fn dispatch(&mut self, call: &ServiceCall);
}

impl<T: TargetDirectory + ?Sized> TargetDirectory for &T {
    fn target_state(&self, target_id: &str) -> Option<TargetState> {
        (**self).target_state(target_id)
    }
}
