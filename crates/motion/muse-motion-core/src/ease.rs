//! Easing curves.
//!
//! Names follow the GSAP vocabulary the site's content is written in
//! (`"power2.out"`, `"back.out(1.2)"`, `"none"`), so effect definitions can be
//! loaded from JSON unchanged. Unknown names fall back to [`Ease::default`].

use std::fmt;

use serde::{Deserialize, Serialize};

const DEFAULT_OVERSHOOT: f32 = 1.70158;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Ease {
    Linear,
    /// `powerN.in`, N in 1..=4 (exponent N + 1).
    PowerIn(u8),
    PowerOut(u8),
    PowerInOut(u8),
    /// `back.out(overshoot)`
    BackOut(f32),
    SineInOut,
    /// CSS-style cubic-bezier control points (x1, y1, x2, y2).
    CubicBezier([f32; 4]),
}

impl Default for Ease {
    /// GSAP's default ease.
    fn default() -> Self {
        Self::PowerOut(1)
    }
}

impl Ease {
    /// Map linear progress `t` in [0, 1] through the curve.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::PowerIn(n) => t.powi(exponent(n)),
            Self::PowerOut(n) => 1.0 - (1.0 - t).powi(exponent(n)),
            Self::PowerInOut(n) => {
                let p = exponent(n);
                if t < 0.5 {
                    (2.0 * t).powi(p) / 2.0
                } else {
                    1.0 - (2.0 * (1.0 - t)).powi(p) / 2.0
                }
            }
            Self::BackOut(s) => {
                let u = t - 1.0;
                u * u * ((s + 1.0) * u + s) + 1.0
            }
            Self::SineInOut => -((std::f32::consts::PI * t).cos() - 1.0) / 2.0,
            Self::CubicBezier([x1, y1, x2, y2]) => bezier_ease(t, x1, y1, x2, y2),
        }
    }

    /// Parse a GSAP-style name; `None` for names this crate does not know.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        match name {
            "none" | "linear" => return Some(Self::Linear),
            "sine.inOut" => return Some(Self::SineInOut),
            _ => {}
        }
        if let Some(args) = call_args(name, "back.out") {
            let overshoot = match args.as_slice() {
                [] => DEFAULT_OVERSHOOT,
                [s] => *s,
                _ => return None,
            };
            return Some(Self::BackOut(overshoot));
        }
        if name == "back.out" {
            return Some(Self::BackOut(DEFAULT_OVERSHOOT));
        }
        if let Some(args) = call_args(name, "cubic-bezier") {
            return match args.as_slice() {
                [x1, y1, x2, y2] => Some(Self::CubicBezier([*x1, *y1, *x2, *y2])),
                _ => None,
            };
        }
        let (family, curve) = name.split_once('.').unwrap_or((name, "out"));
        let degree: u8 = family.strip_prefix("power")?.parse().ok()?;
        if !(1..=4).contains(&degree) {
            return None;
        }
        match curve {
            "in" => Some(Self::PowerIn(degree)),
            "out" => Some(Self::PowerOut(degree)),
            "inOut" => Some(Self::PowerInOut(degree)),
            _ => None,
        }
    }
}

impl From<&str> for Ease {
    fn from(name: &str) -> Self {
        Self::parse(name).unwrap_or_else(|| {
            log::warn!("unknown ease '{name}', using default");
            Self::default()
        })
    }
}

impl From<String> for Ease {
    fn from(name: String) -> Self {
        Self::from(name.as_str())
    }
}

impl From<Ease> for String {
    fn from(ease: Ease) -> Self {
        ease.to_string()
    }
}

impl fmt::Display for Ease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => write!(f, "none"),
            Self::PowerIn(n) => write!(f, "power{n}.in"),
            Self::PowerOut(n) => write!(f, "power{n}.out"),
            Self::PowerInOut(n) => write!(f, "power{n}.inOut"),
            Self::BackOut(s) => write!(f, "back.out({s})"),
            Self::SineInOut => write!(f, "sine.inOut"),
            Self::CubicBezier([x1, y1, x2, y2]) => write!(f, "cubic-bezier({x1},{y1},{x2},{y2})"),
        }
    }
}

#[inline]
fn exponent(degree: u8) -> i32 {
    i32::from(degree.clamp(1, 4)) + 1
}

/// `"name(a, b)"` -> `[a, b]`
fn call_args(text: &str, name: &str) -> Option<Vec<f32>> {
    let inner = text.strip_prefix(name)?.strip_prefix('(')?.strip_suffix(')')?;
    if inner.trim().is_empty() {
        return Some(Vec::new());
    }
    inner
        .split(',')
        .map(|part| part.trim().parse::<f32>().ok())
        .collect()
}

#[inline]
fn cubic_bezier(p1: f32, p2: f32, t: f32) -> f32 {
    let u = 1.0 - t;
    3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t
}

/// Invert x(t) of the (0,0)-(x1,y1)-(x2,y2)-(1,1) curve by bisection, return y.
fn bezier_ease(t: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    if x1 == y1 && x2 == y2 {
        return t;
    }
    let mut lo = 0.0f32;
    let mut hi = 1.0f32;
    let mut mid = t;
    for _ in 0..24 {
        let x = cubic_bezier(x1, x2, mid);
        if (x - t).abs() < 1e-6 {
            break;
        }
        if x < t {
            lo = mid;
        } else {
            hi = mid;
        }
        mid = 0.5 * (lo + hi);
    }
    cubic_bezier(y1, y2, mid)
}
