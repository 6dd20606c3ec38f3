//! Host clock sources
//!
//! The animator never reads time itself. A [`ClockSource`] is the host side
//! of [`Animator::start`](crate::Animator::start) /
//! [`Animator::stop`](crate::Animator::stop): it decides when frames happen
//! and how much time each one covers.

use crate::error::{AnimationError, Result};
use crate::scheduler::AnimatorHandle;

/// Something that drives an animator's frame updates
pub trait ClockSource {
    /// Begin delivering frames to `animator`
    fn attach(&mut self, animator: AnimatorHandle);

    /// Stop delivering frames
    fn detach(&mut self);
}

/// A fixed-step clock advanced explicitly by the host.
///
/// Useful for tests, offline rendering and the CLI, where frames are
/// produced as fast as they are consumed rather than in real time.
#[derive(Clone)]
pub struct SteppedClock {
    frame_time: f32,
    animator: Option<AnimatorHandle>,
    frames: u64,
    elapsed: f64,
}

impl SteppedClock {
    /// Default frame rate for [`SteppedClock::default`]
    pub const DEFAULT_FPS: u32 = 60;

    /// Create a clock whose frames each cover `frame_time` seconds
    pub fn new(frame_time: f32) -> Result<Self> {
        if !(frame_time.is_finite() && frame_time > 0.0) {
            return Err(AnimationError::InvalidArgument(format!(
                "frame time must be positive, got {frame_time}"
            )));
        }
        Ok(Self {
            frame_time,
            animator: None,
            frames: 0,
            elapsed: 0.0,
        })
    }

    /// Create a clock ticking at `fps` frames per second
    pub fn from_fps(fps: u32) -> Result<Self> {
        if fps == 0 {
            return Err(AnimationError::InvalidArgument(
                "frame rate must be at least 1".to_string(),
            ));
        }
        Self::new(1.0 / fps as f32)
    }

    pub fn frame_time(&self) -> f32 {
        self.frame_time
    }

    /// Frames delivered since creation
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Total time delivered since creation, in seconds
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Whether an animator is attached and still alive
    pub fn is_attached(&self) -> bool {
        self.animator.as_ref().is_some_and(AnimatorHandle::is_alive)
    }

    /// Deliver one frame. Returns `false` when nothing is attached.
    pub fn tick(&mut self) -> Result<bool> {
        let Some(animator) = self.animator.as_ref().filter(|a| a.is_alive()) else {
            return Ok(false);
        };
        animator.update(self.frame_time)?;
        self.frames += 1;
        self.elapsed += self.frame_time as f64;
        Ok(true)
    }

    /// Deliver up to `count` frames. Returns how many were delivered.
    pub fn run_frames(&mut self, count: u64) -> Result<u64> {
        let mut delivered = 0;
        while delivered < count && self.tick()? {
            delivered += 1;
        }
        Ok(delivered)
    }

    /// Deliver frames until the animator has nothing left to play, or
    /// `max_frames` have been delivered. Returns how many were delivered.
    pub fn run_until_idle(&mut self, max_frames: u64) -> Result<u64> {
        let mut delivered = 0;
        while delivered < max_frames {
            let idle = self.animator.as_ref().map_or(true, AnimatorHandle::is_empty);
            if idle || !self.tick()? {
                break;
            }
            delivered += 1;
        }
        Ok(delivered)
    }
}

impl Default for SteppedClock {
    fn default() -> Self {
        Self {
            frame_time: 1.0 / Self::DEFAULT_FPS as f32,
            animator: None,
            frames: 0,
            elapsed: 0.0,
        }
    }
}

impl ClockSource for SteppedClock {
    fn attach(&mut self, animator: AnimatorHandle) {
        tracing::debug!(frame_time = self.frame_time, "SteppedClock: attached");
        self.animator = Some(animator);
    }

    fn detach(&mut self) {
        if self.animator.take().is_some() {
            tracing::debug!(frames = self.frames, "SteppedClock: detached");
        }
    }
}
