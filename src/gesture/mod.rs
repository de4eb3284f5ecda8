pub mod decode;
pub(crate) mod machine;
pub mod resolver;
pub mod tap;
pub mod trace;
pub mod types;

pub use decode::{decode_event, encode_event, DecodeError};
pub use resolver::dominant_finger_count;
pub use tap::is_tap;
pub use trace::{GesturePhase, GestureTrace, TraceNote};
pub use types::{
    ActiveGesture, FingerClass, FingerTally, GestureState, RotationSample, TargetSnapshot,
    TouchEvent, TRACKED_FINGER_COUNTS,
};
