use statig::prelude::*;

use crate::config::GestureTuning;
use crate::target::TargetState;

use super::{
    resolver::dominant_finger_count,
    tap::is_tap,
    trace::TraceNote,
    types::{ActiveGesture, FingerClass, GestureState, TargetSnapshot, TouchEvent},
};

#[derive(Clone, Debug)]
pub(crate) enum GestureHsmEvent {
    Touch(TouchEvent),
    SnapshotCaptured(TargetSnapshot),
    /// Drops the active gesture but remembers the last touch, so the rest of
    /// the touch is ignored until the fingers lift.
    Discard,
    /// Forgets everything, including the last touch.
    Abort,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum MachineOutput {
    Started,
    Tap {
        finger_count: u8,
    },
    Rotation {
        finger_count: u8,
        delta: f64,
        target: Option<TargetState>,
    },
}

#[derive(Debug, Default)]
pub(crate) struct DispatchContext {
    pub(crate) output: Option<MachineOutput>,
    pub(crate) note: TraceNote,
    pub(crate) dominant: Option<u8>,
    pub(crate) rotation_delta: Option<f64>,
}

pub(crate) struct GestureHsm {
    pub(crate) state: GestureState,
    tuning: GestureTuning,
}

impl GestureHsm {
    pub(crate) fn new(state: GestureState, tuning: GestureTuning) -> Self {
        Self { state, tuning }
    }

    fn end_gesture(&mut self, context: &mut DispatchContext, touch: &TouchEvent) {
        let Some(active) = self.state.active.take() else {
            context.note = TraceNote::NoActiveGesture;
            return;
        };

        if !is_tap(&active.baseline, touch, &self.tuning) {
            context.note = TraceNote::NotTap;
            return;
        }

        context.dominant = dominant_finger_count(&active.tally);
        match context.dominant {
            Some(finger_count) => {
                context.output = Some(MachineOutput::Tap { finger_count });
                context.note = TraceNote::Tap;
            }
            // Single-finger taps never tally anything.
            None => context.note = TraceNote::UntrackedFingerCount,
        }
    }

    fn continue_gesture(&mut self, context: &mut DispatchContext, touch: &TouchEvent) {
        let Some(active) = self.state.active.as_mut() else {
            context.note = TraceNote::NoActiveGesture;
            return;
        };

        active.tally.increment(touch.finger_count);

        let (Some(current), Some(start)) = (touch.rotation_sum(), active.baseline.rotation_sum())
        else {
            context.note = TraceNote::MissingRotation;
            return;
        };
        let delta = current - start;
        // Extreme but finite sums can still overflow.
        if !delta.is_finite() {
            context.note = TraceNote::MissingRotation;
            return;
        }
        context.rotation_delta = Some(delta);

        let Some(finger_count) = dominant_finger_count(&active.tally) else {
            context.note = TraceNote::UntrackedFingerCount;
            return;
        };
        context.dominant = Some(finger_count);
        context.output = Some(MachineOutput::Rotation {
            finger_count,
            delta,
            target: active.snapshot.get(finger_count).cloned(),
        });
        context.note = TraceNote::Rotating;
    }
}

#[state_machine(initial = "State::resume()")]
impl GestureHsm {
    /// A machine rebuilt from persisted state starts here and routes its first
    /// event by the finger class of the last event seen.
    #[state]
    fn resume(
        &mut self,
        context: &mut DispatchContext,
        event: &GestureHsmEvent,
    ) -> Outcome<State> {
        match self.state.previous_class() {
            FingerClass::Zero => self.idle(context, event),
            FingerClass::One | FingerClass::Many => self.touching(context, event),
        }
    }

    #[state]
    fn idle(&mut self, context: &mut DispatchContext, event: &GestureHsmEvent) -> Outcome<State> {
        match event {
            GestureHsmEvent::Touch(touch) => {
                self.state.last_event = Some(*touch);
                if matches!(touch.finger_class(), FingerClass::Zero) {
                    self.state.clear_gesture();
                    context.note = TraceNote::Idle;
                    return Handled;
                }

                self.state.active = Some(ActiveGesture::start(*touch));
                context.output = Some(MachineOutput::Started);
                context.note = TraceNote::GestureStarted;
                Transition(State::touching())
            }
            GestureHsmEvent::SnapshotCaptured(_) => Handled,
            GestureHsmEvent::Discard => {
                self.state.clear_gesture();
                Handled
            }
            GestureHsmEvent::Abort => {
                self.state.reset();
                Handled
            }
        }
    }

    #[state]
    fn touching(
        &mut self,
        context: &mut DispatchContext,
        event: &GestureHsmEvent,
    ) -> Outcome<State> {
        match event {
            GestureHsmEvent::Touch(touch) => {
                self.state.last_event = Some(*touch);
                match touch.finger_class() {
                    FingerClass::Zero => {
                        self.end_gesture(context, touch);
                        Transition(State::idle())
                    }
                    FingerClass::One => {
                        context.note = if self.state.is_active() {
                            TraceNote::Holding
                        } else {
                            TraceNote::NoActiveGesture
                        };
                        Handled
                    }
                    FingerClass::Many => {
                        self.continue_gesture(context, touch);
                        Handled
                    }
                }
            }
            GestureHsmEvent::SnapshotCaptured(snapshot) => {
                if let Some(active) = self.state.active.as_mut() {
                    active.snapshot = snapshot.clone();
                }
                Handled
            }
            GestureHsmEvent::Discard => {
                self.state.clear_gesture();
                Handled
            }
            GestureHsmEvent::Abort => {
                self.state.reset();
                Transition(State::idle())
            }
        }
    }
}
