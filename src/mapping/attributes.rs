use crate::target::{AttributeValue, TargetState};

use super::{
    color::{hs_to_rgb, rgb_to_rgbw, wrap_hue},
    MappingError, RotationStep,
};

const BRIGHTNESS_MAX: f64 = 255.0;
const HUE_RANGE: f64 = 360.0;
const SATURATION_MAX: f64 = 100.0;
const VOLUME_MAX: f64 = 1.0;

fn missing(target: &TargetState, attribute: &'static str) -> MappingError {
    MappingError::MissingAttribute {
        target_id: target.target_id.clone(),
        attribute,
    }
}

fn bounds(
    target: &TargetState,
    attribute: &'static str,
    min: Option<f64>,
    max: Option<f64>,
) -> Result<(f64, f64), MappingError> {
    let min = min.ok_or_else(|| missing(target, attribute))?;
    let max = max.ok_or_else(|| missing(target, attribute))?;
    if !(min <= max) {
        return Err(MappingError::InvalidBounds {
            target_id: target.target_id.clone(),
            attribute,
        });
    }
    Ok((min, max))
}

/// A switched-off light counts as brightness 0, so rotating it up turns it on.
pub fn map_brightness(
    step: RotationStep,
    target: &TargetState,
) -> Result<AttributeValue, MappingError> {
    let current = if target.is_off() {
        0.0
    } else {
        target
            .attributes
            .brightness
            .ok_or_else(|| missing(target, "brightness"))?
    };
    let next = (current + step.scaled(BRIGHTNESS_MAX)).clamp(0.0, BRIGHTNESS_MAX);
    Ok(AttributeValue::Brightness(next as u8))
}

/// `None` for a light that is off: the call then only switches it on.
pub fn map_hue(
    step: RotationStep,
    target: &TargetState,
) -> Result<Option<AttributeValue>, MappingError> {
    if target.is_off() {
        return Ok(None);
    }
    let hue = target.attributes.hue().ok_or_else(|| missing(target, "hs_color"))?;
    Ok(Some(AttributeValue::HsColor {
        hue: wrap_hue(hue + step.scaled(HUE_RANGE)),
        saturation: SATURATION_MAX,
    }))
}

pub fn map_saturation(step: RotationStep, target: &TargetState) -> Option<AttributeValue> {
    if target.is_off() {
        return None;
    }
    let hue = target.attributes.hue().unwrap_or(0.0);
    let saturation = target.attributes.saturation().unwrap_or(SATURATION_MAX);
    Some(AttributeValue::HsColor {
        hue,
        saturation: (saturation + step.scaled(SATURATION_MAX)).clamp(0.0, SATURATION_MAX),
    })
}

/// Without a current color temperature the light jumps to its warmest end.
pub fn map_color_temp(
    step: RotationStep,
    target: &TargetState,
) -> Result<AttributeValue, MappingError> {
    let attributes = &target.attributes;
    let (min, max) = bounds(
        target,
        "color_temp",
        attributes.min_mireds,
        attributes.max_mireds,
    )?;
    // Mireds are sent as integers, so only whole values inside the bounds count.
    let (low, high) = (min.ceil(), max.floor());
    if low > high {
        return Err(MappingError::InvalidBounds {
            target_id: target.target_id.clone(),
            attribute: "color_temp",
        });
    }
    let next = match attributes.color_temp {
        Some(current) if current != 0.0 => {
            (current + step.scaled(max - min)).trunc().clamp(low, high)
        }
        _ => high,
    };
    Ok(AttributeValue::ColorTemp(next as u32))
}

pub fn map_rgbw(
    step: RotationStep,
    target: &TargetState,
) -> Result<Option<AttributeValue>, MappingError> {
    if target.is_off() {
        return Ok(None);
    }
    let hue = target.attributes.hue().ok_or_else(|| missing(target, "hs_color"))?;
    let rgb = hs_to_rgb(wrap_hue(hue + step.scaled(HUE_RANGE)), SATURATION_MAX);
    Ok(Some(AttributeValue::RgbwColor(rgb_to_rgbw(rgb))))
}

pub fn map_climate_temperature(
    step: RotationStep,
    target: &TargetState,
) -> Result<AttributeValue, MappingError> {
    let attributes = &target.attributes;
    let current = attributes
        .temperature
        .ok_or_else(|| missing(target, "temperature"))?;
    let (min, max) = bounds(target, "temperature", attributes.min_temp, attributes.max_temp)?;
    Ok(AttributeValue::Temperature(
        (current + step.scaled(max - min)).clamp(min, max),
    ))
}

pub fn map_volume(
    step: RotationStep,
    target: &TargetState,
) -> Result<AttributeValue, MappingError> {
    let current = target
        .attributes
        .volume_level
        .ok_or_else(|| missing(target, "volume_level"))?;
    Ok(AttributeValue::VolumeLevel(
        (current + step.scaled(VOLUME_MAX)).clamp(0.0, VOLUME_MAX),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::PowerState;

    fn light(state: PowerState) -> TargetState {
        TargetState::new("light.desk", state)
    }

    fn step(delta: f64) -> RotationStep {
        RotationStep::from_delta(delta)
    }

    #[test]
    fn brightness_steps_down_on_positive_delta() {
        let mut target = light(PowerState::On);
        target.attributes.brightness = Some(200.0);
        assert_eq!(
            map_brightness(step(90.0), &target),
            Ok(AttributeValue::Brightness(115))
        );
    }

    #[test]
    fn brightness_of_off_light_starts_at_zero() {
        let mut target = light(PowerState::Off);
        target.attributes.brightness = Some(200.0);
        assert_eq!(
            map_brightness(step(-135.0), &target),
            Ok(AttributeValue::Brightness(127))
        );
    }

    #[test]
    fn brightness_stays_within_byte_range() {
        let mut target = light(PowerState::On);
        for current in [0.0, 1.0, 128.0, 254.0, 255.0] {
            target.attributes.brightness = Some(current);
            for delta in [-10_000.0, -270.0, -1.0, 0.0, 1.0, 270.0, 10_000.0] {
                let Ok(AttributeValue::Brightness(value)) = map_brightness(step(delta), &target)
                else {
                    panic!("brightness should map for {current} / {delta}");
                };
                assert!(f64::from(value) <= BRIGHTNESS_MAX);
            }
        }
        target.attributes.brightness = Some(10.0);
        assert_eq!(
            map_brightness(step(270.0), &target),
            Ok(AttributeValue::Brightness(0))
        );
        assert_eq!(
            map_brightness(step(-270.0), &target),
            Ok(AttributeValue::Brightness(255))
        );
    }

    #[test]
    fn brightness_of_lit_light_needs_a_value() {
        assert!(matches!(
            map_brightness(step(10.0), &light(PowerState::On)),
            Err(MappingError::MissingAttribute { attribute: "brightness", .. })
        ));
    }

    #[test]
    fn hue_wraps_past_either_end() {
        let mut target = light(PowerState::On);
        target.attributes.hs_color = Some([Some(350.0), Some(40.0)]);
        // -27 units is a tenth of the sweep: +36 degrees.
        let Ok(Some(AttributeValue::HsColor { hue, saturation })) = map_hue(step(-27.0), &target)
        else {
            panic!("hue should map");
        };
        assert!((hue - 26.0).abs() < 1e-9);
        assert_eq!(saturation, 100.0);

        target.attributes.hs_color = Some([Some(10.0), None]);
        let Ok(Some(AttributeValue::HsColor { hue, .. })) = map_hue(step(27.0), &target) else {
            panic!("hue should map");
        };
        assert!((hue - 334.0).abs() < 1e-9);
    }

    #[test]
    fn colour_changes_skip_switched_off_lights() {
        let mut target = light(PowerState::Off);
        target.attributes.hs_color = Some([Some(10.0), Some(50.0)]);
        assert_eq!(map_hue(step(30.0), &target), Ok(None));
        assert_eq!(map_saturation(step(30.0), &target), None);
        assert_eq!(map_rgbw(step(30.0), &target), Ok(None));
    }

    #[test]
    fn saturation_defaults_and_clamps() {
        let target = light(PowerState::On);
        assert_eq!(
            map_saturation(step(-27.0), &target),
            Some(AttributeValue::HsColor {
                hue: 0.0,
                saturation: 100.0
            })
        );

        let mut target = light(PowerState::On);
        target.attributes.hs_color = Some([Some(200.0), Some(50.0)]);
        let Some(AttributeValue::HsColor { hue, saturation }) = map_saturation(step(67.5), &target)
        else {
            panic!("saturation should map");
        };
        assert_eq!(hue, 200.0);
        assert_eq!(saturation, 25.0);
    }

    #[test]
    fn color_temp_without_current_value_is_max() {
        let mut target = light(PowerState::On);
        target.attributes.min_mireds = Some(153.0);
        target.attributes.max_mireds = Some(500.0);
        for delta in [-500.0, -10.0, 0.0, 10.0, 500.0] {
            assert_eq!(
                map_color_temp(step(delta), &target),
                Ok(AttributeValue::ColorTemp(500))
            );
        }
    }

    #[test]
    fn color_temp_truncates_and_clamps() {
        let mut target = light(PowerState::On);
        target.attributes.min_mireds = Some(153.0);
        target.attributes.max_mireds = Some(500.0);
        target.attributes.color_temp = Some(300.0);
        // -27 units: +34.7 mireds.
        assert_eq!(
            map_color_temp(step(-27.0), &target),
            Ok(AttributeValue::ColorTemp(334))
        );
        assert_eq!(
            map_color_temp(step(-1_000.0), &target),
            Ok(AttributeValue::ColorTemp(500))
        );
        assert_eq!(
            map_color_temp(step(1_000.0), &target),
            Ok(AttributeValue::ColorTemp(153))
        );
    }

    #[test]
    fn color_temp_needs_sane_bounds() {
        let mut target = light(PowerState::On);
        target.attributes.color_temp = Some(300.0);
        assert!(matches!(
            map_color_temp(step(0.0), &target),
            Err(MappingError::MissingAttribute { .. })
        ));

        target.attributes.min_mireds = Some(500.0);
        target.attributes.max_mireds = Some(153.0);
        assert!(matches!(
            map_color_temp(step(0.0), &target),
            Err(MappingError::InvalidBounds { .. })
        ));
    }

    #[test]
    fn color_temp_rounds_fractional_bounds_inward() {
        let mut target = light(PowerState::On);
        target.attributes.min_mireds = Some(153.7);
        target.attributes.max_mireds = Some(500.4);
        target.attributes.color_temp = Some(200.0);
        assert_eq!(
            map_color_temp(step(1_000.0), &target),
            Ok(AttributeValue::ColorTemp(154))
        );
        assert_eq!(
            map_color_temp(step(-1_000.0), &target),
            Ok(AttributeValue::ColorTemp(500))
        );

        target.attributes.color_temp = None;
        assert_eq!(
            map_color_temp(step(0.0), &target),
            Ok(AttributeValue::ColorTemp(500))
        );

        target.attributes.min_mireds = Some(153.2);
        target.attributes.max_mireds = Some(153.8);
        assert!(matches!(
            map_color_temp(step(0.0), &target),
            Err(MappingError::InvalidBounds { attribute: "color_temp", .. })
        ));
    }

    #[test]
    fn rgbw_follows_rotated_hue() {
        let mut target = light(PowerState::On);
        target.attributes.hs_color = Some([Some(0.0), Some(100.0)]);
        assert_eq!(
            map_rgbw(step(0.0), &target),
            Ok(Some(AttributeValue::RgbwColor([255, 0, 0, 0])))
        );
        // -90 units: +120 degrees.
        assert_eq!(
            map_rgbw(step(-90.0), &target),
            Ok(Some(AttributeValue::RgbwColor([0, 255, 0, 0])))
        );
    }

    #[test]
    fn climate_stays_within_reported_range() {
        let mut target = TargetState::new("climate.hall", PowerState::Other);
        target.attributes.temperature = Some(20.0);
        target.attributes.min_temp = Some(7.0);
        target.attributes.max_temp = Some(35.0);

        for delta in [-10_000.0, -270.0, -13.5, 0.0, 13.5, 270.0, 10_000.0] {
            let Ok(AttributeValue::Temperature(value)) =
                map_climate_temperature(step(delta), &target)
            else {
                panic!("temperature should map");
            };
            assert!((7.0..=35.0).contains(&value));
        }
        // -27 units: +2.8 degrees.
        let Ok(AttributeValue::Temperature(value)) = map_climate_temperature(step(-27.0), &target)
        else {
            panic!("temperature should map");
        };
        assert!((value - 22.8).abs() < 1e-9);
    }

    #[test]
    fn climate_without_temperature_fails() {
        let target = TargetState::new("climate.hall", PowerState::Off);
        assert!(matches!(
            map_climate_temperature(step(10.0), &target),
            Err(MappingError::MissingAttribute { attribute: "temperature", .. })
        ));
    }

    #[test]
    fn volume_stays_within_unit_range() {
        let mut target = TargetState::new("media_player.den", PowerState::On);
        for current in [0.0, 0.3, 1.0] {
            target.attributes.volume_level = Some(current);
            for delta in [-10_000.0, -27.0, 0.0, 27.0, 10_000.0] {
                let Ok(AttributeValue::VolumeLevel(value)) = map_volume(step(delta), &target)
                else {
                    panic!("volume should map");
                };
                assert!((0.0..=1.0).contains(&value));
            }
        }
        target.attributes.volume_level = None;
        assert!(map_volume(step(10.0), &target).is_err());
    }
}
