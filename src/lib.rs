//! Multi-finger touch gesture decoding for smart-home targets.
//!
//! Raw sensor payloads go through [`engine::GestureEngine`], which tracks one
//! gesture at a time and turns taps into toggles and twists into attribute
//! changes on the target bound to the dominant finger count.

pub mod config;
pub mod engine;
pub mod gesture;
pub mod mapping;
pub mod status;
pub mod target;

pub use config::{load_config, GestureConfig, GestureTuning};
pub use engine::{process_payload, Disposition, EngineOutput, GestureEngine, ResetReason};
pub use gesture::{decode_event, GestureState, GestureTrace, TouchEvent, TraceNote};
pub use mapping::{AttributeKind, MappingError};
pub use status::{SensorStatus, StatusStore};
pub use target::{
    CommandSink, InMemoryTargets, ServiceCall, TargetDirectory, TargetKind, TargetState,
};
