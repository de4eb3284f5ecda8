use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GesturePhase {
    #[default]
    Idle,
    Active,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceNote {
    #[default]
    None,
    Idle,
    GestureStarted,
    Holding,
    Rotating,
    Tap,
    NotTap,
    MissingRotation,
    NoActiveGesture,
    UntrackedFingerCount,
    UnboundFingerCount,
    TargetUnavailable,
    UnsupportedCombination,
    MappingFailed,
    DecodeFailed,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct GestureTrace {
    pub timestamp: Option<i64>,
    pub finger_count: Option<u8>,
    pub phase: GesturePhase,
    pub dominant: Option<u8>,
    pub rotation_delta: Option<f64>,
    pub note: TraceNote,
}
