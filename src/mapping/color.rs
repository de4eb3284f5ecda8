/// Wraps a hue in degrees into `[0, 360)`. Non-finite input maps to 0.
pub fn wrap_hue(hue: f64) -> f64 {
    let wrapped = hue.rem_euclid(360.0);
    // rem_euclid can round tiny negatives up to exactly 360.0.
    if !wrapped.is_finite() || wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// HSV with hue in degrees and saturation/value in percent, to 8-bit RGB.
pub fn hsv_to_rgb(hue: f64, saturation: f64, value: f64) -> [u8; 3] {
    let h = wrap_hue(hue) / 360.0;
    let s = (saturation / 100.0).clamp(0.0, 1.0);
    let v = (value / 100.0).clamp(0.0, 1.0);

    let (r, g, b) = if s == 0.0 {
        (v, v, v)
    } else {
        let sector = (h * 6.0).floor();
        let f = h * 6.0 - sector;
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));
        match sector as u8 % 6 {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        }
    };

    [to_channel(r), to_channel(g), to_channel(b)]
}

pub fn hs_to_rgb(hue: f64, saturation: f64) -> [u8; 3] {
    hsv_to_rgb(hue, saturation, 100.0)
}

/// Moves the common white component of an RGB color into a W channel, then
/// rescales so the brightest output channel matches the brightest input one.
pub fn rgb_to_rgbw([r, g, b]: [u8; 3]) -> [u8; 4] {
    let w = r.min(g).min(b);
    let rgbw = [r - w, g - w, b - w, w];

    let max_in = r.max(g).max(b);
    let max_out = rgbw.iter().copied().max().unwrap_or(0);
    let factor = if max_out == 0 {
        0.0
    } else {
        f64::from(max_in) / f64::from(max_out)
    };

    rgbw.map(|channel| (f64::from(channel) * factor).round().clamp(0.0, 255.0) as u8)
}

fn to_channel(unit: f64) -> u8 {
    (unit * 255.0).round().clamp(0.0, 255.0) as u8
}
