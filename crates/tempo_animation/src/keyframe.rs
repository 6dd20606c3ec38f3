//! Key frames
//!
//! A key frame anchors a value at a point in time. Key frames are ordered
//! and compared by time alone, so two frames at the same time occupy the
//! same slot of a [`Timeline`](crate::Timeline) regardless of their values.

use std::cmp::Ordering;
use std::fmt;

use crate::error::{AnimationError, Result};

/// A single (time, value) anchor point
#[derive(Clone, Copy, Debug)]
pub struct KeyFrame {
    time: f32,
    value: f32,
}

impl KeyFrame {
    /// Create a key frame. Fails if `time` is negative or NaN.
    pub fn new(time: f32, value: f32) -> Result<Self> {
        if time.is_nan() || time < 0.0 {
            return Err(AnimationError::InvalidArgument(format!(
                "key frame time must be >= 0, got {time}"
            )));
        }
        // -0.0 and 0.0 must share a slot under total ordering
        let time = if time == 0.0 { 0.0 } else { time };
        Ok(Self { time, value })
    }

    /// Time position in seconds
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Value at this key frame
    pub fn value(&self) -> f32 {
        self.value
    }
}

impl PartialEq for KeyFrame {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for KeyFrame {}

impl PartialOrd for KeyFrame {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for KeyFrame {
    fn cmp(&self, other: &Self) -> Ordering {
        // NaN times are rejected at construction
        self.time.total_cmp(&other.time)
    }
}

impl fmt::Display for KeyFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.time, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_time_rejected() {
        assert!(matches!(
            KeyFrame::new(-1.0, 0.0),
            Err(AnimationError::InvalidArgument(_))
        ));
        assert!(KeyFrame::new(f32::NAN, 0.0).is_err());
        assert!(KeyFrame::new(0.0, 0.0).is_ok());
    }

    #[test]
    fn test_ordering_by_time_only() {
        let a = KeyFrame::new(0.5, 10.0).unwrap();
        let b = KeyFrame::new(0.5, 20.0).unwrap();
        let c = KeyFrame::new(1.0, 0.0).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.cmp(&b), Ordering::Equal);
        assert!(a < c);

        let mut frames = vec![c, a];
        frames.sort();
        assert_eq!(frames[0].time(), 0.5);
        assert_eq!(frames[1].time(), 1.0);
    }

    #[test]
    fn test_display() {
        let kf = KeyFrame::new(0.25, 3.5).unwrap();
        assert_eq!(kf.to_string(), "0.25: 3.5");
    }
}
