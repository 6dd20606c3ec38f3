//! Timed animations
//!
//! Wraps a per-frame callback and a fixed duration so one-shot effects can be
//! played on an [`Animator`](crate::Animator) without modelling them as key
//! frames.

use std::fmt;

use crate::animatable::Animatable;
use crate::error::{AnimationError, Result};
use crate::timeline::Timeline;

/// What a timed animation's callback sees each frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimedFrame {
    /// Time covered by this frame
    pub delta_time: f32,
    /// Total time elapsed, including this frame
    pub elapsed: f32,
    /// `elapsed / duration`, clamped to `[0, 1]`
    pub progress: f32,
}

/// A callback that runs every frame until `duration` seconds have elapsed
pub struct TimedAnimation<F> {
    duration: f32,
    elapsed: f32,
    callback: F,
}

impl<F> TimedAnimation<F>
where
    F: FnMut(&TimedFrame),
{
    /// Fails if `duration` is negative or NaN
    pub fn new(duration: f32, callback: F) -> Result<Self> {
        if duration.is_nan() || duration < 0.0 {
            return Err(AnimationError::InvalidArgument(format!(
                "timed animation duration must be >= 0, got {duration}"
            )));
        }
        Ok(Self {
            duration,
            elapsed: 0.0,
            callback,
        })
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn progress(&self) -> f32 {
        if self.duration > 0.0 {
            Timeline::clamp_delta(self.elapsed / self.duration)
        } else {
            1.0
        }
    }
}

impl<F> Animatable for TimedAnimation<F>
where
    F: FnMut(&TimedFrame),
{
    fn on_frame(&mut self, delta_time: f32) -> Result<()> {
        self.elapsed += delta_time;
        let frame = TimedFrame {
            delta_time,
            elapsed: self.elapsed,
            progress: self.progress(),
        };
        (self.callback)(&frame);
        Ok(())
    }

    fn is_completed(&self) -> bool {
        self.elapsed >= self.duration
    }
}

impl<F> fmt::Debug for TimedAnimation<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimedAnimation")
            .field("duration", &self.duration)
            .field("elapsed", &self.elapsed)
            .finish_non_exhaustive()
    }
}
