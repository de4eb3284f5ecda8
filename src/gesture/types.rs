use serde::{Deserialize, Serialize};

use crate::target::TargetState;

/// Finger counts that can own a gesture, in tie-break order.
pub const TRACKED_FINGER_COUNTS: [u8; 4] = [2, 3, 4, 5];

const fn slot_of(finger_count: u8) -> Option<usize> {
    match finger_count {
        2..=5 => Some((finger_count - 2) as usize),
        _ => None,
    }
}

/// `rotation` and `rotation_sum` are either both present or both absent.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RotationSample {
    pub rotation: f64,
    pub rotation_sum: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TouchEvent {
    pub timestamp: i64,
    pub finger_count: u8,
    pub rotation: Option<RotationSample>,
}

impl TouchEvent {
    pub fn new(timestamp: i64, finger_count: u8, rotation: Option<RotationSample>) -> Self {
        Self {
            timestamp,
            finger_count,
            rotation,
        }
    }

    pub fn with_rotation(
        timestamp: i64,
        finger_count: u8,
        rotation: f64,
        rotation_sum: f64,
    ) -> Self {
        Self::new(
            timestamp,
            finger_count,
            Some(RotationSample {
                rotation,
                rotation_sum,
            }),
        )
    }

    pub fn rotation_sum(&self) -> Option<f64> {
        self.rotation.map(|sample| sample.rotation_sum)
    }

    pub fn finger_class(&self) -> FingerClass {
        FingerClass::of(self.finger_count)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FingerClass {
    Zero,
    One,
    Many,
}

impl FingerClass {
    pub const fn of(finger_count: u8) -> Self {
        match finger_count {
            0 => Self::Zero,
            1 => Self::One,
            _ => Self::Many,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerTally {
    counts: [u32; 4],
}

impl FingerTally {
    /// Returns `false` for counts outside 2..=5, which are not tallied.
    pub fn increment(&mut self, finger_count: u8) -> bool {
        match slot_of(finger_count) {
            Some(slot) => {
                self.counts[slot] = self.counts[slot].saturating_add(1);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, finger_count: u8) -> u32 {
        slot_of(finger_count).map_or(0, |slot| self.counts[slot])
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, u32)> + '_ {
        TRACKED_FINGER_COUNTS
            .into_iter()
            .zip(self.counts.iter().copied())
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&count| count == 0)
    }
}

/// Per-finger-count target state captured when a gesture starts.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetSnapshot {
    slots: [Option<TargetState>; 4],
}

impl TargetSnapshot {
    pub fn capture(mut query: impl FnMut(u8) -> Option<TargetState>) -> Self {
        let mut snapshot = Self::default();
        for (slot, finger_count) in TRACKED_FINGER_COUNTS.into_iter().enumerate() {
            snapshot.slots[slot] = query(finger_count);
        }
        snapshot
    }

    pub fn get(&self, finger_count: u8) -> Option<&TargetState> {
        slot_of(finger_count).and_then(|slot| self.slots[slot].as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}

/// Everything that belongs to one gesture. Baseline, tally and snapshot
/// live and die together.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActiveGesture {
    pub baseline: TouchEvent,
    pub tally: FingerTally,
    pub snapshot: TargetSnapshot,
}

impl ActiveGesture {
    pub fn start(baseline: TouchEvent) -> Self {
        let mut tally = FingerTally::default();
        if matches!(baseline.finger_class(), FingerClass::Many) {
            tally.increment(baseline.finger_count);
        }
        Self {
            baseline,
            tally,
            snapshot: TargetSnapshot::default(),
        }
    }
}

/// Gesture progress carried from one event to the next. The caller owns it
/// between events and hands it back for the next one.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GestureState {
    pub last_event: Option<TouchEvent>,
    pub active: Option<ActiveGesture>,
}

impl GestureState {
    pub fn previous_class(&self) -> FingerClass {
        self.last_event
            .map_or(FingerClass::Zero, |event| event.finger_class())
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub(crate) fn clear_gesture(&mut self) {
        self.active = None;
    }

    pub(crate) fn reset(&mut self) {
        self.active = None;
        self.last_event = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::PowerState;

    #[test]
    fn tally_ignores_untracked_counts() {
        let mut tally = FingerTally::default();
        assert!(tally.increment(3));
        assert!(!tally.increment(1));
        assert!(!tally.increment(6));
        assert_eq!(tally.get(3), 1);
        assert_eq!(tally.get(6), 0);
        assert_eq!(
            tally.iter().collect::<Vec<_>>(),
            vec![(2, 0), (3, 1), (4, 0), (5, 0)]
        );
    }

    #[test]
    fn start_counts_multi_finger_baseline_only() {
        let multi = ActiveGesture::start(TouchEvent::with_rotation(10, 4, 0.0, 0.0));
        assert_eq!(multi.tally.get(4), 1);

        let single = ActiveGesture::start(TouchEvent::with_rotation(10, 1, 0.0, 0.0));
        assert!(single.tally.is_empty());
        assert!(single.snapshot.is_empty());
    }

    #[test]
    fn snapshot_capture_queries_every_tracked_count() {
        let mut queried = Vec::new();
        let snapshot = TargetSnapshot::capture(|finger_count| {
            queried.push(finger_count);
            (finger_count == 3).then(|| TargetState::new("light.desk", PowerState::On))
        });
        assert_eq!(queried, vec![2, 3, 4, 5]);
        assert!(snapshot.get(2).is_none());
        assert_eq!(
            snapshot.get(3).map(|t| t.target_id.as_str()),
            Some("light.desk")
        );
    }

    #[test]
    fn missing_previous_event_counts_as_zero_fingers() {
        assert_eq!(GestureState::default().previous_class(), FingerClass::Zero);
    }
}
