//! Tempo Animation Engine
//!
//! Frame-driven keyframe animation: interpolated values over time and a
//! cooperative scheduler that advances many animations from one external
//! frame tick.
//!
//! # Features
//!
//! - **Interpolation**: discrete, linear, ease and ease-in curves
//! - **Timelines**: key frames with a clamped or looping playhead
//! - **Animator**: single-threaded scheduler with re-entrant cancellation
//! - **Observers**: per-animation frame and completion callbacks
//! - **Timed Animations**: callbacks that run for a fixed duration
//! - **Scenes**: timelines described in TOML
//!
//! # Example
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use tempo_animation::{Animator, Interpolation, Timeline};
//!
//! let timeline = Timeline::builder()
//!     .key_frame(0.0, 10.0)
//!     .key_frame(1.0, 20.0)
//!     .interpolation(Interpolation::Linear)
//!     .build()
//!     .unwrap();
//! let timeline = Rc::new(RefCell::new(timeline));
//!
//! let animator = Animator::new();
//! animator.play(&timeline);
//! animator.update(0.25).unwrap();
//!
//! assert_eq!(timeline.borrow().value().unwrap(), 12.5);
//! ```

pub mod animatable;
pub mod clock;
pub mod config;
pub mod error;
pub mod interpolation;
pub mod keyframe;
pub mod observer;
pub mod scheduler;
pub mod timed;
pub mod timeline;

pub use animatable::{same_instance, Animatable, AnimatableRef};
pub use clock::{ClockSource, SteppedClock};
pub use config::{ConfigError, SceneConfig, SceneSettings, TimelineConfig};
pub use error::{AnimationError, Result};
pub use interpolation::Interpolation;
pub use keyframe::KeyFrame;
pub use observer::{AnimationObserver, CompleteCallback, FrameCallback};
pub use scheduler::{ActivityFilter, AlwaysActive, AnimationId, Animator, AnimatorHandle};
pub use timed::{TimedAnimation, TimedFrame};
pub use timeline::{Timeline, TimelineBuilder};
