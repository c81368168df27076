//! Light modes and their per-cell shading.
//!
//! A mode is prepared once per source per frame (`ModeFrame`) and then shades
//! every mask cell inside the source's radius.

use crate::error::LightingError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightMode {
    #[default]
    Static,
    Shimmer,
    Pulse,
    Flicker,
    Noise,
    Rainbow,
    Spiral,
    Strobe,
    Gradient,
    Ripple,
    Vortex,
    Glitch,
    Heartbeat,
    Halo,
    Electric,
    Kaleidoscope,
}

impl LightMode {
    /// Every mode in cycling order
    pub const ALL: [LightMode; 16] = [
        LightMode::Static,
        LightMode::Shimmer,
        LightMode::Pulse,
        LightMode::Flicker,
        LightMode::Noise,
        LightMode::Rainbow,
        LightMode::Spiral,
        LightMode::Strobe,
        LightMode::Gradient,
        LightMode::Ripple,
        LightMode::Vortex,
        LightMode::Glitch,
        LightMode::Heartbeat,
        LightMode::Halo,
        LightMode::Electric,
        LightMode::Kaleidoscope,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            LightMode::Static => "static",
            LightMode::Shimmer => "shimmer",
            LightMode::Pulse => "pulse",
            LightMode::Flicker => "flicker",
            LightMode::Noise => "noise",
            LightMode::Rainbow => "rainbow",
            LightMode::Spiral => "spiral",
            LightMode::Strobe => "strobe",
            LightMode::Gradient => "gradient",
            LightMode::Ripple => "ripple",
            LightMode::Vortex => "vortex",
            LightMode::Glitch => "glitch",
            LightMode::Heartbeat => "heartbeat",
            LightMode::Halo => "halo",
            LightMode::Electric => "electric",
            LightMode::Kaleidoscope => "kaleidoscope",
        }
    }

    /// The mode after this one, wrapping around
    pub fn next(&self) -> LightMode {
        let idx = Self::ALL.iter().position(|m| m == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Per-frame values shared by every cell of one source.
    pub fn prepare(&self, time: f32, rng: &mut impl Rng) -> ModeFrame {
        let mut frame = ModeFrame::default();
        match self {
            LightMode::Pulse => {
                let pulse = ((time * 6.0).sin() + 1.0) * 0.5 * 0.2;
                frame.radius_scale = 1.0 + pulse;
            }
            LightMode::Flicker => {
                let flicker = rng.gen::<f32>() * 0.3;
                frame.flicker = if (time * 10.0).sin() > 0.0 { 0.0 } else { flicker };
            }
            LightMode::Strobe => {
                frame.strobe = (time * 5.0).sin().sin().max(0.0);
            }
            LightMode::Heartbeat => {
                frame.beat = (time * PI).sin().powi(63) + ((time + 0.25) * PI).sin().powi(63);
                frame.radius_scale = 1.0 + frame.beat * 0.3;
            }
            LightMode::Glitch => {
                frame.glitching = (time * 10.0) as i64 % 2 == 0;
            }
            _ => {}
        }
        frame
    }

    /// Colour and coverage of one cell. Alpha is always within [0, 1].
    pub fn shade(&self, frame: &ModeFrame, cell: &CellSample, time: f32, rng: &mut impl Rng) -> Shade {
        let i = cell.intensity;
        let shade = match self {
            LightMode::Static | LightMode::Pulse => Shade::white(i),
            LightMode::Shimmer => {
                let shimmer = ((time * 2.0 + i * 10.0).sin() + 1.0) * 0.5;
                Shade::white(i + shimmer * 0.1)
            }
            LightMode::Flicker => Shade::white(i + frame.flicker),
            LightMode::Noise => Shade::white(i + 0.1 * cell.noise),
            LightMode::Rainbow => Shade::hue((time + i * 360.0).rem_euclid(360.0), i),
            LightMode::Spiral => {
                let angle = i * TAU + time * 2.0;
                Shade::white(i * (0.5 + 0.5 * (angle * 10.0).sin()))
            }
            LightMode::Strobe => Shade::white(frame.strobe),
            LightMode::Gradient => Shade::hue(120.0 * (1.0 - i), i),
            LightMode::Ripple => {
                let distance = (1.0 - i) * cell.radius;
                Shade::white(i * (0.7 + 0.3 * (distance * 0.1 - time * 2.0).sin()))
            }
            LightMode::Vortex => {
                Shade::white(i * (0.7 + 0.3 * (cell.angle * 5.0 + time * 2.0).sin()))
            }
            LightMode::Glitch => {
                if frame.glitching && rng.gen::<f32>() < 0.2 {
                    Shade::white(rng.gen::<f32>())
                } else {
                    Shade::white(i)
                }
            }
            LightMode::Heartbeat => Shade::white(i * (1.0 + frame.beat * 0.3)),
            LightMode::Halo => {
                let halo = (1.0 - (i - 0.1).abs() / 0.1).max(0.0);
                Shade::white(i.max(halo))
            }
            LightMode::Electric => {
                let electric = (cell.angle * 10.0 + time * 5.0).sin();
                Shade::white(i + electric * 0.3 * (1.0 - i))
            }
            LightMode::Kaleidoscope => {
                let segment = (cell.angle / (TAU / 6.0) + time).floor();
                Shade::hue((segment * 60.0).rem_euclid(360.0), i)
            }
        };
        shade.clamped()
    }
}

impl fmt::Display for LightMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for LightMode {
    type Err = LightingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|mode| mode.name() == lower)
            .ok_or_else(|| LightingError::UnknownMode(s.to_string()))
    }
}

/// Values a mode computes once per source per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeFrame {
    /// Multiplier on the source radius
    pub radius_scale: f32,
    pub flicker: f32,
    pub strobe: f32,
    pub beat: f32,
    pub glitching: bool,
}

impl Default for ModeFrame {
    fn default() -> Self {
        Self {
            radius_scale: 1.0,
            flicker: 0.0,
            strobe: 0.0,
            beat: 0.0,
            glitching: false,
        }
    }
}

/// What the shader knows about one mask cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellSample {
    /// Falloff intensity in [0, 1]
    pub intensity: f32,
    /// Effective radius of the source this frame
    pub radius: f32,
    /// Angle of the cell around the light center, in radians
    pub angle: f32,
    /// Noise field value for this source, in [0, 1]
    pub noise: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shade {
    pub color: [f32; 3],
    pub alpha: f32,
}

impl Shade {
    fn white(alpha: f32) -> Self {
        Self {
            color: [1.0, 1.0, 1.0],
            alpha,
        }
    }

    fn hue(hue: f32, alpha: f32) -> Self {
        Self {
            color: hsv_to_rgb(hue, 1.0, 1.0),
            alpha,
        }
    }

    fn clamped(self) -> Self {
        Self {
            color: self.color.map(|c| c.clamp(0.0, 1.0)),
            alpha: if self.alpha.is_nan() { 0.0 } else { self.alpha.clamp(0.0, 1.0) },
        }
    }
}

/// Hue in degrees, saturation and value in [0, 1]
pub fn hsv_to_rgb(hue: f32, saturation: f32, value: f32) -> [f32; 3] {
    let h = hue.rem_euclid(360.0) / 60.0;
    let c = value * saturation;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let m = value - c;
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    [r + m, g + m, b + m]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_mode_names_round_trip() {
        for mode in LightMode::ALL {
            assert_eq!(mode.name().parse::<LightMode>(), Ok(mode));
        }
        assert_eq!("Heartbeat".parse::<LightMode>(), Ok(LightMode::Heartbeat));
        assert_eq!(
            "disco".parse::<LightMode>(),
            Err(LightingError::UnknownMode("disco".to_string()))
        );
    }

    #[test]
    fn test_next_cycles_through_all() {
        let mut mode = LightMode::Static;
        for expected in LightMode::ALL.iter().skip(1) {
            mode = mode.next();
            assert_eq!(mode, *expected);
        }
        assert_eq!(mode.next(), LightMode::Static);
    }

    #[test]
    fn test_every_mode_stays_in_unit_range() {
        let mut rng = StdRng::seed_from_u64(5);
        for mode in LightMode::ALL {
            for step in 0..50 {
                let time = step as f32 * 0.137;
                let frame = mode.prepare(time, &mut rng);
                for k in 0..=10 {
                    let cell = CellSample {
                        intensity: k as f32 / 10.0,
                        radius: 98.0,
                        angle: (k as f32 - 5.0) * 0.6,
                        noise: 0.9,
                    };
                    let shade = mode.shade(&frame, &cell, time, &mut rng);
                    assert!((0.0..=1.0).contains(&shade.alpha), "{mode} alpha {}", shade.alpha);
                    assert!(shade.color.iter().all(|c| (0.0..=1.0).contains(c)), "{mode}");
                }
            }
        }
    }

    #[test]
    fn test_angle_modes_vary_around_the_light() {
        let mut rng = StdRng::seed_from_u64(1);
        for mode in [LightMode::Vortex, LightMode::Electric, LightMode::Kaleidoscope] {
            let frame = mode.prepare(0.0, &mut rng);
            let shades: Vec<Shade> = [0.0f32, 1.0, 2.0, 3.0]
                .iter()
                .map(|&angle| {
                    let cell = CellSample { intensity: 0.5, radius: 50.0, angle, noise: 0.0 };
                    mode.shade(&frame, &cell, 0.0, &mut rng)
                })
                .collect();
            assert!(shades.iter().any(|s| *s != shades[0]), "{mode} ignores the angle");
        }
    }

    #[test]
    fn test_pulse_grows_radius() {
        let mut rng = StdRng::seed_from_u64(1);
        let frame = LightMode::Pulse.prepare(PI / 12.0, &mut rng);
        assert!((frame.radius_scale - 1.2).abs() < 1e-4);
        assert_eq!(LightMode::Static.prepare(1.0, &mut rng).radius_scale, 1.0);
    }

    #[test]
    fn test_hsv_primaries() {
        let close = |a: [f32; 3], b: [f32; 3]| a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-5);
        assert!(close(hsv_to_rgb(0.0, 1.0, 1.0), [1.0, 0.0, 0.0]));
        assert!(close(hsv_to_rgb(120.0, 1.0, 1.0), [0.0, 1.0, 0.0]));
        assert!(close(hsv_to_rgb(240.0, 1.0, 1.0), [0.0, 0.0, 1.0]));
        assert!(close(hsv_to_rgb(-120.0, 1.0, 1.0), [0.0, 0.0, 1.0]));
    }
}
