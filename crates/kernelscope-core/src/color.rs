/// A gamma-encoded RGB pixel.
pub type Pixel = [u8; 3];

/// A linear-light RGB triple.
pub type Rgb = [f64; 3];

/// Rec.709 / sRGB luminance weights. They sum to 1.
pub const LUMA_WEIGHTS: [f64; 3] = [0.2126, 0.7152, 0.0722];

const DECODE_THRESHOLD: f64 = 0.04045;
const ENCODE_THRESHOLD: f64 = 0.0031308;
const LINEAR_SLOPE: f64 = 12.92;
const GAMMA: f64 = 2.4;

/// Normalised encoded value to linear light.
pub fn decode(x: f64) -> f64 {
    if x <= DECODE_THRESHOLD {
        x / LINEAR_SLOPE
    } else {
        ((x + 0.055) / 1.055).powf(GAMMA)
    }
}

/// Linear light to normalised encoded value. Not clamped.
pub fn encode(y: f64) -> f64 {
    if y <= ENCODE_THRESHOLD {
        y * LINEAR_SLOPE
    } else {
        1.055 * y.powf(1.0 / GAMMA) - 0.055
    }
}

/// 8-bit channel value to linear intensity in [0, 1].
pub fn to_linear(channel: u8) -> f64 {
    decode(channel as f64 / 255.0)
}

/// Linear intensity to an encoded value on the 0..255 scale.
///
/// The result is not clamped; pass it through [`quantize`] before storing it
/// as a channel value.
pub fn to_encoded(linear: f64) -> f64 {
    encode(linear) * 255.0
}

/// Clamp an encoded 0..255 value and round it to the nearest channel value.
///
/// Infinities land on the nearest bound. NaN maps to 0.
pub fn quantize(encoded: f64) -> u8 {
    if encoded.is_nan() {
        return 0;
    }
    encoded.clamp(0.0, 255.0).round() as u8
}

pub fn pixel_to_linear(px: Pixel) -> Rgb {
    [to_linear(px[0]), to_linear(px[1]), to_linear(px[2])]
}

pub fn linear_to_pixel(rgb: Rgb) -> Pixel {
    [
        quantize(to_encoded(rgb[0])),
        quantize(to_encoded(rgb[1])),
        quantize(to_encoded(rgb[2])),
    ]
}

pub fn encode_rgb(rgb: Rgb) -> Rgb {
    [encode(rgb[0]), encode(rgb[1]), encode(rgb[2])]
}

pub fn decode_rgb(rgb: Rgb) -> Rgb {
    [decode(rgb[0]), decode(rgb[1]), decode(rgb[2])]
}

/// Largest encoded magnitude an intermediate triple may carry between stages.
pub const ENCODED_LIMIT: f64 = 1.0e100;

// Below this linear magnitude a channel's encoded value is always within
// ENCODED_LIMIT, on either side of zero.
const LINEAR_FAST_LIMIT: f64 = 1.0e90;

/// Keep an intermediate linear triple finite between stages.
///
/// NaN channels become 0. When any channel's encoded magnitude exceeds
/// [`ENCODED_LIMIT`] (infinities included), the encoded triple is scaled
/// toward zero until its largest channel sits on the limit. Scaling keeps every
/// channel's sign and the direction the triple was moving in, so the final
/// [`quantize`] still lands each channel on the bound it was heading for.
pub fn bound(rgb: Rgb) -> Rgb {
    let rgb = rgb.map(|c| if c.is_nan() { 0.0 } else { c });
    if rgb.iter().all(|c| c.abs() <= LINEAR_FAST_LIMIT) {
        return rgb;
    }
    let e = encode_rgb(rgb).map(|c| c.clamp(-f64::MAX, f64::MAX));
    let peak = e.iter().fold(0.0_f64, |m, c| m.max(c.abs()));
    if peak <= ENCODED_LIMIT {
        return rgb;
    }
    let k = ENCODED_LIMIT / peak;
    decode_rgb(e.map(|c| c * k))
}

/// Weighted sum of a triple. On linear input this is relative luminance, on
/// encoded input it is luma.
pub fn weighted_sum(rgb: Rgb) -> f64 {
    LUMA_WEIGHTS[0] * rgb[0] + LUMA_WEIGHTS[1] * rgb[1] + LUMA_WEIGHTS[2] * rgb[2]
}

/// Relative luminance of a linear triple.
pub fn luminance(rgb: Rgb) -> f64 {
    weighted_sum(rgb)
}

/// Luma of a gamma-encoded pixel, on the 0..255 scale.
pub fn luma(px: Pixel) -> f64 {
    weighted_sum([px[0] as f64, px[1] as f64, px[2] as f64])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_linear_endpoints() {
        assert_eq!(to_linear(0), 0.0);
        assert!((to_linear(255) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_to_linear_midpoint() {
        // sRGB 128 is roughly 21.6% linear light
        let l = to_linear(128);
        assert!((l - 0.2158605).abs() < 1e-6, "got {l}");
    }

    #[test]
    fn test_to_linear_dark_segment() {
        // 10/255 = 0.0392 is below the threshold, so the linear segment applies
        let l = to_linear(10);
        assert!((l - (10.0 / 255.0) / 12.92).abs() < 1e-15);
    }

    #[test]
    fn test_to_encoded_does_not_clamp() {
        assert!(to_encoded(1.5) > 255.0);
        assert!(to_encoded(-0.1) < 0.0);
    }

    #[test]
    fn test_roundtrip_every_channel_value() {
        for c in 0..=255u8 {
            let back = quantize(to_encoded(to_linear(c)));
            assert!(
                (back as i16 - c as i16).abs() <= 1,
                "channel {c} came back as {back}"
            );
        }
        assert_eq!(quantize(to_encoded(to_linear(0))), 0);
        assert_eq!(quantize(to_encoded(to_linear(255))), 255);
    }

    #[test]
    fn test_decode_encode_inverse_outside_unit_range() {
        for x in [-0.5, -0.01, 1.2, 2.0] {
            assert!((encode(decode(x)) - x).abs() < 1e-12, "x = {x}");
        }
    }

    #[test]
    fn test_quantize_non_finite() {
        assert_eq!(quantize(f64::NAN), 0);
        assert_eq!(quantize(f64::INFINITY), 255);
        assert_eq!(quantize(f64::NEG_INFINITY), 0);
    }

    #[test]
    fn test_quantize_rounds_to_nearest() {
        assert_eq!(quantize(127.49), 127);
        assert_eq!(quantize(127.5), 128);
        assert_eq!(quantize(300.0), 255);
        assert_eq!(quantize(-3.0), 0);
    }

    #[test]
    fn test_luminance_of_grey_equals_channel() {
        let l = to_linear(90);
        assert!((luminance([l, l, l]) - l).abs() < 1e-12);
    }

    #[test]
    fn test_luma_weights_green_heaviest() {
        assert!(luma([0, 255, 0]) > luma([255, 0, 0]));
        assert!(luma([255, 0, 0]) > luma([0, 0, 255]));
    }

    #[test]
    fn test_bound_leaves_ordinary_values_alone() {
        let rgb = [0.2, -3.5, 1.0e40];
        assert_eq!(bound(rgb), rgb);
    }

    #[test]
    fn test_bound_replaces_nan_with_zero() {
        assert_eq!(bound([f64::NAN, 0.5, f64::NAN]), [0.0, 0.5, 0.0]);
    }

    #[test]
    fn test_bound_infinities_keep_their_sign() {
        let out = bound([f64::INFINITY, 0.5, f64::NEG_INFINITY]);
        assert!(out.iter().all(|c| c.is_finite()), "{out:?}");
        assert!(out[0] > 0.0);
        assert!(out[1] >= 0.0);
        assert!(out[2] < 0.0);
        assert_eq!(quantize(to_encoded(out[0])), 255);
        assert_eq!(quantize(to_encoded(out[2])), 0);
    }

    #[test]
    fn test_bound_scales_peak_onto_limit() {
        let out = bound([1.0e300, 0.0, -1.0]);
        let peak = encode(out[0]);
        assert!((peak / ENCODED_LIMIT - 1.0).abs() < 1e-9, "peak {peak}");
        assert!(out[2] < 0.0);
    }
}
