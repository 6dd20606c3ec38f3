//! Interpolation methods for blending between key frames

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AnimationError;

/// Blending function used between two key frames
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    /// Step function: holds the start value until progress reaches 1
    Discrete,
    #[default]
    Linear,
    /// Smoothstep (`3p² - 2p³`), flat at both ends
    Ease,
    /// Ease-in using `p³`
    Cubic,
    /// Ease-in using `p²`
    Quadratic,
    /// Ease-in using `p⁵`
    Quintic,
}

impl Interpolation {
    /// Every variant, in declaration order
    pub const ALL: [Interpolation; 6] = [
        Interpolation::Discrete,
        Interpolation::Linear,
        Interpolation::Ease,
        Interpolation::Cubic,
        Interpolation::Quadratic,
        Interpolation::Quintic,
    ];

    /// Blend weight for a progress value (0.0 to 1.0)
    pub fn weight(&self, p: f32) -> f32 {
        match self {
            Interpolation::Discrete => {
                if p < 1.0 {
                    0.0
                } else {
                    1.0
                }
            }
            Interpolation::Linear => p,
            Interpolation::Ease => p * p * (3.0 - 2.0 * p),
            Interpolation::Cubic => p * p * p,
            Interpolation::Quadratic => p * p,
            Interpolation::Quintic => p.powi(5),
        }
    }

    /// Interpolate between `start` and `end`.
    ///
    /// `progress` must already be clamped to `[0, 1]`; see
    /// [`Timeline::clamp_delta`](crate::Timeline::clamp_delta).
    pub fn interpolate(&self, start: f32, end: f32, progress: f32) -> f32 {
        let w = self.weight(progress);
        // Two-sided form keeps both endpoints exact
        start * (1.0 - w) + end * w
    }

    /// Lowercase name, as used in scene files
    pub fn name(&self) -> &'static str {
        match self {
            Interpolation::Discrete => "discrete",
            Interpolation::Linear => "linear",
            Interpolation::Ease => "ease",
            Interpolation::Cubic => "cubic",
            Interpolation::Quadratic => "quadratic",
            Interpolation::Quintic => "quintic",
        }
    }
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Interpolation {
    type Err = AnimationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Interpolation::ALL
            .into_iter()
            .find(|method| method.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                AnimationError::InvalidArgument(format!("unknown interpolation method '{s}'"))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-6;

    #[test]
    fn test_endpoints_are_exact() {
        for method in Interpolation::ALL {
            for (a, b) in [(0.0, 1.0), (3.0, 5.0), (-2.5, 7.25), (10.0, -10.0)] {
                assert_eq!(method.interpolate(a, b, 0.0), a, "{method} at 0");
                assert_eq!(method.interpolate(a, b, 1.0), b, "{method} at 1");
            }
        }
    }

    #[test]
    fn test_linear() {
        assert_eq!(Interpolation::Linear.interpolate(3.0, 5.0, 0.25), 3.5);
        assert_eq!(Interpolation::Linear.interpolate(3.0, 5.0, 0.75), 4.5);
    }

    #[test]
    fn test_discrete_is_a_step() {
        assert_eq!(Interpolation::Discrete.interpolate(2.0, 9.0, 0.9), 2.0);
        assert_eq!(Interpolation::Discrete.interpolate(2.0, 9.0, 1.0), 9.0);
    }

    #[test]
    fn test_ease_matches_linear_at_midpoint() {
        let ease = Interpolation::Ease.interpolate(0.0, 10.0, 0.5);
        let linear = Interpolation::Linear.interpolate(0.0, 10.0, 0.5);
        assert!((ease - linear).abs() < EPSILON);

        // Slower than linear near the start, faster near the end
        assert!(Interpolation::Ease.interpolate(0.0, 10.0, 0.1) < 1.0);
        assert!(Interpolation::Ease.interpolate(0.0, 10.0, 0.9) > 9.0);
    }

    #[test]
    fn test_ease_in_ordering() {
        let p = 0.5;
        let quad = Interpolation::Quadratic.interpolate(0.0, 1.0, p);
        let cubic = Interpolation::Cubic.interpolate(0.0, 1.0, p);
        let quintic = Interpolation::Quintic.interpolate(0.0, 1.0, p);

        assert!((quad - 0.25).abs() < EPSILON);
        assert!((cubic - 0.125).abs() < EPSILON);
        assert!((quintic - 0.03125).abs() < EPSILON);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("ease".parse::<Interpolation>(), Ok(Interpolation::Ease));
        assert_eq!(" Quintic ".parse::<Interpolation>(), Ok(Interpolation::Quintic));
        assert!(matches!(
            "bounce".parse::<Interpolation>(),
            Err(AnimationError::InvalidArgument(_))
        ));

        for method in Interpolation::ALL {
            assert_eq!(method.to_string().parse::<Interpolation>(), Ok(method));
        }
    }
}
