use thiserror::Error;

use super::types::{RotationSample, TouchEvent};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("payload has no {0} field")]
    MissingField(&'static str),
    #[error("invalid timestamp '{0}'")]
    InvalidTimestamp(String),
    #[error("invalid finger count '{0}'")]
    InvalidFingerCount(String),
}

/// Decodes `"<timestamp>,<finger_count>,<rotation>,<rotation_sum>"`.
///
/// Fields past the fourth are ignored. An unparsable rotation pair decodes
/// as absent rather than failing the event.
pub fn decode_event(payload: &str) -> Result<TouchEvent, DecodeError> {
    let mut fields = payload.splitn(5, ',');
    let timestamp_raw = fields.next().ok_or(DecodeError::MissingField("timestamp"))?;
    let finger_count_raw = fields
        .next()
        .ok_or(DecodeError::MissingField("finger_count"))?;
    let rotation_raw = fields.next().ok_or(DecodeError::MissingField("rotation"))?;
    let rotation_sum_raw = fields
        .next()
        .ok_or(DecodeError::MissingField("rotation_sum"))?;

    let timestamp = timestamp_raw
        .trim()
        .parse::<i64>()
        .map_err(|_| DecodeError::InvalidTimestamp(timestamp_raw.trim().into()))?;
    // Counts past five are never tallied, so wide values saturate.
    let finger_count = finger_count_raw
        .trim()
        .parse::<u32>()
        .map(|count| u8::try_from(count).unwrap_or(u8::MAX))
        .map_err(|_| DecodeError::InvalidFingerCount(finger_count_raw.trim().into()))?;

    Ok(TouchEvent::new(
        timestamp,
        finger_count,
        decode_rotation(rotation_raw, rotation_sum_raw),
    ))
}

fn decode_rotation(rotation_raw: &str, rotation_sum_raw: &str) -> Option<RotationSample> {
    let rotation = parse_finite(rotation_raw)?;
    let rotation_sum = parse_finite(rotation_sum_raw)?;
    Some(RotationSample {
        rotation,
        rotation_sum,
    })
}

fn parse_finite(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Inverse of [`decode_event`]; absent rotation encodes as empty fields.
pub fn encode_event(event: &TouchEvent) -> String {
    match event.rotation {
        Some(sample) => format!(
            "{},{},{},{}",
            event.timestamp, event.finger_count, sample.rotation, sample.rotation_sum
        ),
        None => format!("{},{},,", event.timestamp, event.finger_count),
    }
}
