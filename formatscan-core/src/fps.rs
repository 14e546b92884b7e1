//! Rational framerate handling.
//!
//! Most video framerates are either integers or fractions with 1001 in the
//! denominator. Floating-point inputs (2-3 decimal digits of precision, as
//! found on command lines and in container metadata) are snapped to the
//! nearest standard rate before falling back to an exact decimal fraction.

use crate::error::{CoreError, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Minimum accepted framerate in frames per second.
const MIN_FPS: f32 = 0.1;

/// Maximum accepted framerate in frames per second.
const MAX_FPS: f32 = 300.0;

/// A video framerate as a rational number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Fps {
    /// Numerator.
    pub num: u32,
    /// Denominator.
    pub den: u32,
}

impl Fps {
    /// Create a validated framerate.
    pub fn new(num: u32, den: u32) -> Result<Self> {
        let fps = Self { num, den };
        if num == 0 || den == 0 {
            return Err(CoreError::invalid_framerate("numerator and denominator must be non-zero"));
        }
        let value = fps.as_f32();
        if !(MIN_FPS..=MAX_FPS).contains(&value) {
            return Err(CoreError::invalid_framerate(format!(
                "{value} fps is outside the supported range [{MIN_FPS}, {MAX_FPS}]"
            )));
        }
        Ok(fps)
    }

    /// Convert a floating-point rate to the nearest standard rational rate.
    ///
    /// The `x/1001` broadcast rates and the common integral rates are matched
    /// within the precision of their usual decimal representations; anything
    /// else becomes an exact fraction over 100000.
    pub fn from_float(x: f32) -> Result<Self> {
        let snap: &[(f32, f32, u32, u32)] = &[
            (23.976, 0.001, 24_000, 1001),
            (29.97, 0.01, 30_000, 1001),
            (47.952, 0.001, 48_000, 1001),
            (59.94, 0.01, 60_000, 1001),
            (119.88, 0.01, 120_000, 1001),
            (24.0, 0.01, 24, 1),
            (25.0, 0.01, 25, 1),
            (30.0, 0.01, 30, 1),
            (48.0, 0.01, 48, 1),
            (50.0, 0.01, 50, 1),
            (60.0, 0.01, 60, 1),
            (96.0, 0.01, 96, 1),
            (100.0, 0.01, 100, 1),
            (120.0, 0.01, 120, 1),
        ];
        for &(target, tolerance, num, den) in snap {
            if (x - target).abs() < tolerance {
                return Self::new(num, den);
            }
        }
        if !x.is_finite() || x <= 0.0 {
            return Err(CoreError::invalid_framerate(format!("{x} fps")));
        }
        Self::new((x * 100_000.0 + 0.5).floor() as u32, 100_000)
    }

    /// Convert to frames per second.
    pub fn as_f32(&self) -> f32 {
        if self.num == 0 {
            0.0
        } else {
            self.num as f32 / self.den as f32
        }
    }
}

impl fmt::Display for Fps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

impl FromStr for Fps {
    type Err = CoreError;

    /// Parse a framerate from a fraction (`30000/1001`, `30000:1001`),
    /// a float (`29.97`), or an integer (`25`).
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some((num, den)) = s.split_once(['/', ':']) {
            let num = num
                .trim()
                .parse::<u32>()
                .map_err(|_| CoreError::invalid_framerate(s.to_owned()))?;
            let den = den
                .trim()
                .parse::<u32>()
                .map_err(|_| CoreError::invalid_framerate(s.to_owned()))?;
            Self::new(num, den)
        } else if s.contains('.') {
            let x = s
                .parse::<f32>()
                .map_err(|_| CoreError::invalid_framerate(s.to_owned()))?;
            Self::from_float(x)
        } else {
            let num = s
                .parse::<u32>()
                .map_err(|_| CoreError::invalid_framerate(s.to_owned()))?;
            Self::new(num, 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_float_snaps_broadcast_rates() {
        assert_eq!(Fps::from_float(23.976).unwrap(), Fps { num: 24_000, den: 1001 });
        assert_eq!(Fps::from_float(29.97).unwrap(), Fps { num: 30_000, den: 1001 });
        assert_eq!(Fps::from_float(59.94).unwrap(), Fps { num: 60_000, den: 1001 });
        assert_eq!(Fps::from_float(25.0).unwrap(), Fps { num: 25, den: 1 });
    }

    #[test]
    fn test_from_float_nonstandard() {
        let fps = Fps::from_float(12.5).unwrap();
        assert!((fps.as_f32() - 12.5).abs() < 1e-4);
    }

    #[test]
    fn test_parse_forms() {
        assert_eq!("30000/1001".parse::<Fps>().unwrap(), Fps { num: 30_000, den: 1001 });
        assert_eq!("30000:1001".parse::<Fps>().unwrap(), Fps { num: 30_000, den: 1001 });
        assert_eq!("29.97".parse::<Fps>().unwrap(), Fps { num: 30_000, den: 1001 });
        assert_eq!("25".parse::<Fps>().unwrap(), Fps { num: 25, den: 1 });
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(Fps::new(0, 1).is_err());
        assert!(Fps::new(1, 0).is_err());
        assert!(Fps::new(301, 1).is_err());
        assert!("0.01".parse::<Fps>().is_err());
    }
}
