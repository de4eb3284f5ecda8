//! Per-payload orchestration: decode, advance the gesture machine, then turn
//! whatever the machine decided into a service call.

use statig::blocking::IntoStateMachineExt as _;
use thiserror::Error;

use crate::config::GestureConfig;
use crate::gesture::machine::{DispatchContext, GestureHsm, GestureHsmEvent, MachineOutput};
use crate::gesture::{
    decode_event, DecodeError, GesturePhase, GestureState, GestureTrace, TargetSnapshot,
    TouchEvent, TraceNote,
};
use crate::mapping::{map_rotation, MappingError, RotationStep};
use crate::target::{
    toggle_call, CommandSink, ServiceCall, TargetDirectory, TargetKind, TargetState,
};

#[derive(Clone, Debug, PartialEq, Error)]
pub enum ResetReason {
    #[error("undecodable payload: {0}")]
    Decode(DecodeError),
    #[error("rotation mapping failed: {0}")]
    Mapping(MappingError),
}

/// What the caller should do after one payload.
#[derive(Clone, Debug, PartialEq)]
pub enum Disposition {
    /// Nothing to send; gesture state advanced or stayed put.
    Continue,
    Emit(ServiceCall),
    /// The gesture in progress was dropped.
    Reset(ResetReason),
}

#[derive(Clone, Debug, PartialEq)]
pub struct EngineOutput {
    pub disposition: Disposition,
    pub trace: GestureTrace,
}

impl EngineOutput {
    pub fn call(&self) -> Option<&ServiceCall> {
        match &self.disposition {
            Disposition::Emit(call) => Some(call),
            Disposition::Continue | Disposition::Reset(_) => None,
        }
    }
}

pub struct GestureEngine<D> {
    machine: statig::blocking::StateMachine<GestureHsm>,
    config: GestureConfig,
    directory: D,
}

impl<D: TargetDirectory> GestureEngine<D> {
    pub fn new(config: GestureConfig, directory: D) -> Self {
        Self::from_state(config, directory, GestureState::default())
    }

    /// Rebuilds an engine around gesture state persisted after an earlier
    /// payload.
    pub fn from_state(config: GestureConfig, directory: D, state: GestureState) -> Self {
        Self {
            machine: GestureHsm::new(state, config.tuning).state_machine(),
            config,
            directory,
        }
    }

    pub fn state(&self) -> &GestureState {
        &self.machine.inner().state
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    pub fn directory_mut(&mut self) -> &mut D {
        &mut self.directory
    }

    pub fn into_parts(self) -> (GestureState, D) {
        let state = self.machine.inner().state.clone();
        (state, self.directory)
    }

    pub fn handle(&mut self, payload: &str) -> EngineOutput {
        match decode_event(payload) {
            Ok(event) => self.handle_event(event),
            Err(err) => {
                self.send(GestureHsmEvent::Abort);
                EngineOutput {
                    disposition: Disposition::Reset(ResetReason::Decode(err)),
                    trace: GestureTrace {
                        note: TraceNote::DecodeFailed,
                        ..GestureTrace::default()
                    },
                }
            }
        }
    }

    /// Like [`handle`](Self::handle), then hands any emitted call to the
    /// directory itself.
    pub fn handle_and_dispatch(&mut self, payload: &str) -> EngineOutput
    where
        D: CommandSink,
    {
        let output = self.handle(payload);
        if let Some(call) = output.call() {
            self.directory.dispatch(call);
        }
        output
    }

    pub fn handle_event(&mut self, event: TouchEvent) -> EngineOutput {
        let mut context = self.send(GestureHsmEvent::Touch(event));

        let disposition = match context.output.take() {
            None => Disposition::Continue,
            Some(MachineOutput::Started) => {
                self.capture_snapshot();
                Disposition::Continue
            }
            Some(MachineOutput::Tap { finger_count }) => self.tap(&mut context, finger_count),
            Some(MachineOutput::Rotation {
                finger_count,
                delta,
                target,
            }) => self.rotate(&mut context, finger_count, delta, target.as_ref()),
        };

        EngineOutput {
            disposition,
            trace: GestureTrace {
                timestamp: Some(event.timestamp),
                finger_count: Some(event.finger_count),
                phase: self.phase(),
                dominant: context.dominant,
                rotation_delta: context.rotation_delta,
                note: context.note,
            },
        }
    }

    fn send(&mut self, event: GestureHsmEvent) -> DispatchContext {
        let mut context = DispatchContext::default();
        self.machine.handle_with_context(&event, &mut context);
        context
    }

    fn phase(&self) -> GesturePhase {
        if self.state().is_active() {
            GesturePhase::Active
        } else {
            GesturePhase::Idle
        }
    }

    fn capture_snapshot(&mut self) {
        let fingers = &self.config.fingers;
        let directory = &self.directory;
        let snapshot = TargetSnapshot::capture(|finger_count| {
            fingers
                .target(finger_count)
                .and_then(|target_id| directory.target_state(target_id))
        });
        self.send(GestureHsmEvent::SnapshotCaptured(snapshot));
    }

    /// Taps toggle whatever the target reports right now, not what it
    /// reported when the gesture started.
    fn tap(&self, context: &mut DispatchContext, finger_count: u8) -> Disposition {
        let Some(target_id) = self.config.fingers.target(finger_count) else {
            context.note = TraceNote::UnboundFingerCount;
            return Disposition::Continue;
        };
        match self
            .directory
            .target_state(target_id)
            .as_ref()
            .and_then(toggle_call)
        {
            Some(call) => Disposition::Emit(call),
            None => {
                context.note = TraceNote::TargetUnavailable;
                Disposition::Continue
            }
        }
    }

    fn rotate(
        &mut self,
        context: &mut DispatchContext,
        finger_count: u8,
        delta: f64,
        snapshot: Option<&TargetState>,
    ) -> Disposition {
        let binding = self.config.fingers.get(finger_count);
        let (Some(target_id), Some(attribute)) = (
            binding.and_then(|binding| binding.target.as_deref()),
            binding.and_then(|binding| binding.attribute),
        ) else {
            context.note = TraceNote::UnboundFingerCount;
            return Disposition::Continue;
        };
        let Some(kind) = TargetKind::from_target_id(target_id) else {
            context.note = TraceNote::UnboundFingerCount;
            return Disposition::Continue;
        };
        let Some(snapshot) = snapshot else {
            context.note = TraceNote::TargetUnavailable;
            return Disposition::Continue;
        };

        let step = RotationStep::new(delta, self.config.tuning.rotation_span);
        match map_rotation(target_id, kind, attribute, step, snapshot) {
            Ok(call) => Disposition::Emit(call),
            Err(MappingError::UnsupportedCombination { .. }) => {
                context.note = TraceNote::UnsupportedCombination;
                Disposition::Continue
            }
            Err(err) => {
                context.note = TraceNote::MappingFailed;
                self.send(GestureHsmEvent::Discard);
                Disposition::Reset(ResetReason::Mapping(err))
            }
        }
    }
}

/// One-shot processing for callers that persist gesture state themselves:
/// state in, state out.
pub fn process_payload<D: TargetDirectory>(
    config: &GestureConfig,
    directory: D,
    state: GestureState,
    payload: &str,
) -> (EngineOutput, GestureState) {
    let mut engine = GestureEngine::from_state(config.clone(), directory, state);
    let output = engine.handle(payload);
    let (state, _) = engine.into_parts();
    (output, state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::AttributeKind;
    use crate::target::{Action, AttributeValue, InMemoryTargets, PowerState};

    fn lit(target_id: &str, brightness: f64) -> TargetState {
        let mut target = TargetState::new(target_id, PowerState::On);
        target.attributes.brightness = Some(brightness);
        target
    }

    fn targets(list: impl IntoIterator<Item = TargetState>) -> InMemoryTargets {
        InMemoryTargets::from_targets(list).expect("fixture targets are unique")
    }

    #[test]
    fn quick_still_release_toggles_live_state() {
        let config = GestureConfig::default().bind(3, "light.kitchen", None);
        let mut engine = GestureEngine::new(config, targets([lit("light.kitchen", 80.0)]));

        let start = engine.handle("1000,3,0,0");
        assert_eq!(start.disposition, Disposition::Continue);
        assert_eq!(start.trace.phase, GesturePhase::Active);

        // Someone switched the light off mid-gesture.
        engine
            .directory_mut()
            .insert(TargetState::new("light.kitchen", PowerState::Off));

        let release = engine.handle("1500,0,2,2");
        assert_eq!(
            release.disposition,
            Disposition::Emit(ServiceCall::bare(
                TargetKind::Light,
                Action::TurnOn,
                "light.kitchen"
            ))
        );
        assert_eq!(release.trace.note, TraceNote::Tap);
        assert_eq!(release.trace.dominant, Some(3));
        assert_eq!(release.trace.phase, GesturePhase::Idle);
    }

    #[test]
    fn rotation_sets_brightness_from_gesture_start() {
        let config =
            GestureConfig::default().bind(2, "light.desk", Some(AttributeKind::Brightness));
        let mut engine = GestureEngine::new(config, targets([lit("light.desk", 200.0)]));

        let _ = engine.handle("1000,2,0,0");
        // Live brightness changes must not move the origin.
        engine.directory_mut().insert(lit("light.desk", 10.0));

        let turn = engine.handle("1200,2,90,90");
        assert_eq!(turn.trace.rotation_delta, Some(90.0));
        assert_eq!(
            turn.call().and_then(|call| call.value),
            Some(AttributeValue::Brightness(115))
        );
        assert_eq!(turn.call().map(|call| call.action), Some(Action::TurnOn));
    }

    #[test]
    fn color_temp_without_current_value_goes_to_max() {
        let mut light = TargetState::new("light.hall", PowerState::On);
        light.attributes.min_mireds = Some(153.0);
        light.attributes.max_mireds = Some(500.0);
        let config = GestureConfig::default().bind(4, "light.hall", Some(AttributeKind::ColorTemp));
        let mut engine = GestureEngine::new(config, targets([light]));

        let _ = engine.handle("1000,4,0,0");
        let turn = engine.handle("1100,4,-40,-40");
        assert_eq!(
            turn.call().and_then(|call| call.value),
            Some(AttributeValue::ColorTemp(500))
        );
    }

    #[test]
    fn undecodable_payload_resets() {
        let config =
            GestureConfig::default().bind(2, "light.desk", Some(AttributeKind::Brightness));
        let mut engine = GestureEngine::new(config, targets([lit("light.desk", 200.0)]));
        let _ = engine.handle("1000,2,0,0");

        let output = engine.handle("No messages");
        assert!(matches!(
            output.disposition,
            Disposition::Reset(ResetReason::Decode(DecodeError::MissingField(_)))
        ));
        assert_eq!(output.trace.note, TraceNote::DecodeFailed);
        assert_eq!(engine.state(), &GestureState::default());

        let restart = engine.handle("1300,2,5,5");
        assert_eq!(restart.trace.note, TraceNote::GestureStarted);
    }

    #[test]
    fn unbound_count_emits_nothing_and_keeps_gesture() {
        let config = GestureConfig::default().bind(2, "light.desk", None);
        let mut engine = GestureEngine::new(config, targets([lit("light.desk", 200.0)]));
        let _ = engine.handle("1000,2,0,0");

        let turn = engine.handle("1100,2,30,30");
        assert_eq!(turn.disposition, Disposition::Continue);
        assert_eq!(turn.trace.note, TraceNote::UnboundFingerCount);
        assert!(engine.state().is_active());
    }

    #[test]
    fn unsupported_pairing_emits_nothing_and_keeps_gesture() {
        let mut player = TargetState::new("media_player.den", PowerState::On);
        player.attributes.volume_level = Some(0.4);
        let config =
            GestureConfig::default().bind(2, "media_player.den", Some(AttributeKind::Brightness));
        let mut engine = GestureEngine::new(config, targets([player]));
        let _ = engine.handle("1000,2,0,0");

        let turn = engine.handle("1100,2,30,30");
        assert_eq!(turn.disposition, Disposition::Continue);
        assert_eq!(turn.trace.note, TraceNote::UnsupportedCombination);
        assert!(engine.state().is_active());
    }

    #[test]
    fn mapping_failure_drops_rest_of_gesture() {
        let config =
            GestureConfig::default().bind(2, "light.desk", Some(AttributeKind::Brightness));
        let bare = TargetState::new("light.desk", PowerState::On);
        let mut engine = GestureEngine::new(config, targets([bare]));
        let _ = engine.handle("1000,2,0,0");

        let failed = engine.handle("1100,2,30,30");
        assert!(matches!(
            failed.disposition,
            Disposition::Reset(ResetReason::Mapping(MappingError::MissingAttribute { .. }))
        ));
        assert!(!engine.state().is_active());

        let ignored = engine.handle("1200,2,60,60");
        assert_eq!(ignored.disposition, Disposition::Continue);
        assert_eq!(ignored.trace.note, TraceNote::NoActiveGesture);
    }

    #[test]
    fn overflowing_hue_rotation_sends_nothing() {
        let config = GestureConfig::default().bind(2, "light.desk", Some(AttributeKind::Color));
        let mut light = TargetState::new("light.desk", PowerState::On);
        light.attributes.hs_color = Some([Some(10.0), Some(50.0)]);
        let mut engine = GestureEngine::new(config, targets([light]));
        let _ = engine.handle("1000,2,0,-1.7e308");

        let turn = engine.handle("1100,2,0,1.7e308");
        assert_eq!(turn.disposition, Disposition::Continue);
        assert_eq!(turn.trace.note, TraceNote::MissingRotation);
        assert!(engine.state().is_active());
    }

    #[test]
    fn missing_target_is_reported_not_fatal() {
        let config =
            GestureConfig::default().bind(2, "light.gone", Some(AttributeKind::Brightness));
        let mut engine = GestureEngine::new(config, InMemoryTargets::new());
        let _ = engine.handle("1000,2,0,0");

        let turn = engine.handle("1100,2,30,30");
        assert_eq!(turn.trace.note, TraceNote::TargetUnavailable);
        let release = engine.handle("1400,0,30,30");
        assert_eq!(release.disposition, Disposition::Continue);
    }

    #[test]
    fn dispatch_updates_directory() {
        let config = GestureConfig::default().bind(2, "light.desk", None);
        let mut engine = GestureEngine::new(config, targets([lit("light.desk", 200.0)]));
        let _ = engine.handle_and_dispatch("1000,2,0,0");
        let _ = engine.handle_and_dispatch("1300,0,1,1");

        assert_eq!(
            engine.directory().get("light.desk").map(|t| t.state),
            Some(PowerState::Off)
        );
        assert_eq!(engine.directory().dispatched().len(), 1);
    }

    #[test]
    fn state_threads_through_one_shot_calls() {
        let config =
            GestureConfig::default().bind(2, "light.desk", Some(AttributeKind::Brightness));
        let directory = targets([lit("light.desk", 200.0)]);

        let (first, state) =
            process_payload(&config, &directory, GestureState::default(), "1000,2,0,0");
        assert_eq!(first.disposition, Disposition::Continue);
        assert!(state.is_active());

        let (second, state) = process_payload(&config, &directory, state, "1200,2,90,90");
        assert_eq!(
            second.call().and_then(|call| call.value),
            Some(AttributeValue::Brightness(115))
        );

        let (third, state) = process_payload(&config, &directory, state, "2500,0,90,90");
        assert_eq!(third.trace.note, TraceNote::NotTap);
        assert!(!state.is_active());
    }
}
