use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::color::{
    LUMA_WEIGHTS, Rgb, bound, decode, decode_rgb, encode_rgb, luminance, weighted_sum,
};

/// Linear-light offset applied by brightness at +100.
pub const BRIGHTNESS_RANGE: f64 = 0.5;

/// Exponent on `1 - saturation` that shapes how quickly vibrance fades out
/// as a pixel approaches full saturation.
pub const VIBRANCE_FALLOFF: f64 = 1.0;

/// Encoded mid-grey, the value contrast leaves unchanged.
pub const CONTRAST_PIVOT_ENCODED: f64 = 0.5;

/// The kind of adjustment a pipeline stage performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageKind {
    Brightness,
    Contrast,
    Saturation,
    Vibrance,
    Hue,
}

impl StageKind {
    /// Human-readable display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Brightness => "Brightness",
            Self::Contrast => "Contrast",
            Self::Saturation => "Saturation",
            Self::Vibrance => "Vibrance",
            Self::Hue => "Hue",
        }
    }

    /// Parameter definition for this stage's single scalar.
    pub fn parameter_definition(&self) -> ParameterDefinition {
        match self {
            Self::Hue => ParameterDefinition {
                name: "angle".to_string(),
                label: "Angle (degrees)".to_string(),
                default: 0.0,
                min: -180.0,
                max: 180.0,
            },
            _ => ParameterDefinition {
                name: "amount".to_string(),
                label: "Amount".to_string(),
                default: 0.0,
                min: -100.0,
                max: 100.0,
            },
        }
    }

    /// All built-in stage kinds, in their default display order.
    pub fn all_builtin() -> Vec<StageKind> {
        vec![
            StageKind::Brightness,
            StageKind::Contrast,
            StageKind::Saturation,
            StageKind::Vibrance,
            StageKind::Hue,
        ]
    }

    /// Map a raw parameter into the value the stage math actually uses.
    ///
    /// Non-finite values are neutral. Hue wraps into [0, 360); every other
    /// stage clamps to its declared range so extreme values saturate.
    pub fn effective_value(&self, value: f64) -> f64 {
        let def = self.parameter_definition();
        if !value.is_finite() {
            return def.default;
        }
        match self {
            Self::Hue => value.rem_euclid(360.0),
            _ => value.clamp(def.min, def.max),
        }
    }

    /// Returns true if `value` leaves every pixel unchanged.
    pub fn is_identity(&self, value: f64) -> bool {
        let v = self.effective_value(value);
        v == 0.0 || (*self == Self::Hue && v == 360.0)
    }

    /// Apply this stage to one linear-light triple.
    pub fn apply(&self, rgb: Rgb, value: f64) -> Rgb {
        ResolvedStage::resolve(*self, value).apply(rgb)
    }
}

/// Definition of the scalar parameter a stage takes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDefinition {
    pub name: String,
    pub label: String,
    pub default: f64,
    pub min: f64,
    pub max: f64,
}

/// One occurrence of a stage in an ordered pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageInstance {
    pub id: Uuid,
    pub kind: StageKind,
    pub value: f64,
}

impl StageInstance {
    /// Create a new stage instance at its default (neutral) value.
    pub fn new(kind: StageKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            value: kind.parameter_definition().default,
        }
    }

    pub fn with_value(kind: StageKind, value: f64) -> Self {
        Self {
            value,
            ..Self::new(kind)
        }
    }

    pub fn is_identity(&self) -> bool {
        self.kind.is_identity(self.value)
    }
}

/// A stage with its parameter folded into precomputed coefficients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolvedStage {
    Brightness { offset: f64 },
    Contrast { pivot: f64, factor: f64 },
    Saturation { factor: f64 },
    Vibrance { amount: f64 },
    Hue { cos: f64, sin: f64, basis: ChromaBasis },
}

impl ResolvedStage {
    pub fn resolve(kind: StageKind, value: f64) -> Self {
        let v = kind.effective_value(value);
        match kind {
            StageKind::Brightness => Self::Brightness {
                offset: v / 100.0 * BRIGHTNESS_RANGE,
            },
            StageKind::Contrast => Self::Contrast {
                pivot: decode(CONTRAST_PIVOT_ENCODED),
                factor: 1.0 + v / 100.0,
            },
            StageKind::Saturation => Self::Saturation {
                factor: 1.0 + v / 100.0,
            },
            StageKind::Vibrance => Self::Vibrance { amount: v / 100.0 },
            StageKind::Hue => {
                let (sin, cos) = v.to_radians().sin_cos();
                Self::Hue {
                    cos,
                    sin,
                    basis: ChromaBasis::new(),
                }
            }
        }
    }

    /// Apply the stage to a linear triple. Input and output both pass through
    /// [`bound`], so a stack of stages never feeds an infinity forward.
    pub fn apply(&self, rgb: Rgb) -> Rgb {
        bound(self.apply_unbounded(bound(rgb)))
    }

    fn apply_unbounded(&self, rgb: Rgb) -> Rgb {
        match *self {
            Self::Brightness { offset } => rgb.map(|c| c + offset),
            Self::Contrast { pivot, factor } => rgb.map(|c| pivot + (c - pivot) * factor),
            Self::Saturation { factor } => scale_from_luma(rgb, factor),
            Self::Vibrance { amount } => {
                let encoded = encode_rgb(rgb);
                let weight = (1.0 - encoded_saturation(encoded)).powf(VIBRANCE_FALLOFF);
                scale_from_luma(rgb, 1.0 + amount * weight)
            }
            Self::Hue { cos, sin, basis } => basis.rotate(rgb, cos, sin),
        }
    }
}

/// Push channels away from (factor > 1) or toward (factor < 1) the pixel's
/// luma, working on encoded values.
fn scale_from_luma(rgb: Rgb, factor: f64) -> Rgb {
    let e = encode_rgb(rgb);
    let y = weighted_sum(e);
    decode_rgb(e.map(|c| y + (c - y) * factor))
}

/// HSV-style saturation of an encoded triple, clamped to [0, 1].
fn encoded_saturation(e: Rgb) -> f64 {
    let max = e[0].max(e[1]).max(e[2]);
    let min = e[0].min(e[1]).min(e[2]);
    if max > 0.0 {
        ((max - min) / max).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Orthonormal basis of the zero-luminance plane. Rotating a chroma vector
/// inside this plane cannot change luminance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChromaBasis {
    pub u: Rgb,
    pub v: Rgb,
}

impl ChromaBasis {
    pub fn new() -> Self {
        let w = LUMA_WEIGHTS;
        // Red axis projected onto the plane orthogonal to the weights
        let k = w[0] / dot(w, w);
        let u = normalize([1.0 - k * w[0], -k * w[1], -k * w[2]]);
        let v = cross(normalize(w), u);
        Self { u, v }
    }

    fn rotate(&self, rgb: Rgb, cos: f64, sin: f64) -> Rgb {
        let l = luminance(rgb);
        let chroma = rgb.map(|c| c - l);
        let x = dot(chroma, self.u);
        let y = dot(chroma, self.v);
        let rx = x * cos - y * sin;
        let ry = x * sin + y * cos;
        [
            l + rx * self.u[0] + ry * self.v[0],
            l + rx * self.u[1] + ry * self.v[1],
            l + rx * self.u[2] + ry * self.v[2],
        ]
    }
}

impl Default for ChromaBasis {
    fn default() -> Self {
        Self::new()
    }
}

fn dot(a: Rgb, b: Rgb) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: Rgb, b: Rgb) -> Rgb {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn normalize(a: Rgb) -> Rgb {
    let len = dot(a, a).sqrt();
    a.map(|c| c / len)
}

// Free-function forms of each stage, for callers working on a single triple.

pub fn brightness(rgb: Rgb, amount: f64) -> Rgb {
    StageKind::Brightness.apply(rgb, amount)
}

pub fn contrast(rgb: Rgb, amount: f64) -> Rgb {
    StageKind::Contrast.apply(rgb, amount)
}

pub fn saturation(rgb: Rgb, amount: f64) -> Rgb {
    StageKind::Saturation.apply(rgb, amount)
}

pub fn vibrance(rgb: Rgb, amount: f64) -> Rgb {
    StageKind::Vibrance.apply(rgb, amount)
}

pub fn hue(rgb: Rgb, degrees: f64) -> Rgb {
    StageKind::Hue.apply(rgb, degrees)
}
