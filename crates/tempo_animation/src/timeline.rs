//! Keyframe timelines
//!
//! A [`Timeline`] owns a set of [`KeyFrame`]s kept sorted and unique by time,
//! plus a playhead. The current value is interpolated between the two key
//! frames bracketing the playhead.
//!
//! The playhead is clamped into `[0, duration]`, or wrapped modulo the
//! duration when the timeline loops. Duration is the time of the last key
//! frame.

use crate::animatable::Animatable;
use crate::error::{AnimationError, Result};
use crate::interpolation::Interpolation;
use crate::keyframe::KeyFrame;

/// An ordered set of key frames with a movable playhead
#[derive(Clone, Debug, Default)]
pub struct Timeline {
    /// Sorted by time, no duplicate times
    key_frames: Vec<KeyFrame>,
    playhead: f32,
    duration: f32,
    delta: f32,
    interpolation: Interpolation,
    looping: bool,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty timeline using the given interpolation
    pub fn with_interpolation(interpolation: Interpolation) -> Self {
        Self {
            interpolation,
            ..Self::default()
        }
    }

    /// Create a new builder
    pub fn builder() -> TimelineBuilder {
        TimelineBuilder::new()
    }

    /// Clamp a raw progress value into `[0, 1]`. NaN maps to 0.
    pub fn clamp_delta(x: f32) -> f32 {
        x.max(0.0).min(1.0)
    }

    // ========================================================================
    // Key frames
    // ========================================================================

    /// Add a key frame. Fails if one already exists at exactly `time`.
    pub fn add_key_frame(&mut self, time: f32, value: f32) -> Result<()> {
        self.insert_key_frame(KeyFrame::new(time, value)?)
    }

    /// Insert an existing key frame. Fails if its time slot is taken.
    pub fn insert_key_frame(&mut self, key_frame: KeyFrame) -> Result<()> {
        match self.key_frames.binary_search(&key_frame) {
            Ok(_) => Err(AnimationError::InvalidArgument(format!(
                "a key frame already exists at time {}",
                key_frame.time()
            ))),
            Err(index) => {
                self.key_frames.insert(index, key_frame);
                self.refresh();
                Ok(())
            }
        }
    }

    /// Remove the key frame at exactly `time`, if any
    pub fn remove_key_frame(&mut self, time: f32) -> Option<KeyFrame> {
        let index = self.index_of(time)?;
        let removed = self.key_frames.remove(index);
        self.refresh();
        Some(removed)
    }

    /// Remove every key frame and rewind
    pub fn clear(&mut self) {
        self.key_frames.clear();
        self.playhead = 0.0;
        self.refresh();
    }

    /// The key frame at exactly `time`, if any
    pub fn key_frame_at(&self, time: f32) -> Option<&KeyFrame> {
        self.index_of(time).map(|i| &self.key_frames[i])
    }

    /// The key frame with the greatest time `<= time`, or the first key frame
    /// when none qualifies. `None` only for an empty timeline.
    pub fn closest_key_frame_before(&self, time: f32) -> Option<&KeyFrame> {
        match self.upper_index(time) {
            0 => self.key_frames.first(),
            i => self.key_frames.get(i - 1),
        }
    }

    /// Key frames in time order
    pub fn key_frames(&self) -> &[KeyFrame] {
        &self.key_frames
    }

    pub fn len(&self) -> usize {
        self.key_frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.key_frames.is_empty()
    }

    // ========================================================================
    // Playhead
    // ========================================================================

    /// Move the playhead to `time`, clamping or wrapping it into range.
    ///
    /// Fails with [`AnimationError::InvalidState`] when the timeline has no
    /// key frames and `time` is not 0.
    pub fn set_playhead(&mut self, time: f32) -> Result<()> {
        if !time.is_finite() {
            return Err(AnimationError::InvalidArgument(format!(
                "playhead must be finite, got {time}"
            )));
        }
        if self.key_frames.is_empty() && time != 0.0 {
            return Err(AnimationError::InvalidState(
                "cannot move the playhead of a timeline without key frames".to_string(),
            ));
        }

        self.playhead = self.position(time);
        self.delta = self.delta_at(self.playhead);
        Ok(())
    }

    /// Advance the playhead by `delta_time` (may be negative)
    pub fn move_playhead(&mut self, delta_time: f32) -> Result<()> {
        self.set_playhead(self.playhead + delta_time)
    }

    /// Rewind to the start
    pub fn reset(&mut self) {
        self.playhead = 0.0;
        self.delta = self.delta_at(0.0);
    }

    /// Jump to the end
    pub fn end(&mut self) {
        self.playhead = self.position(self.duration);
        self.delta = self.delta_at(self.playhead);
    }

    pub fn playhead(&self) -> f32 {
        self.playhead
    }

    /// Time of the last key frame, 0 when empty
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Fractional position between the key frames bracketing the playhead
    pub fn delta(&self) -> f32 {
        self.delta
    }

    /// Non-looping timelines complete once the playhead reaches the end.
    /// Looping timelines never complete.
    pub fn is_completed(&self) -> bool {
        !self.looping && self.playhead >= self.duration
    }

    // ========================================================================
    // Settings
    // ========================================================================

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    pub fn set_interpolation(&mut self, interpolation: Interpolation) {
        self.interpolation = interpolation;
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Enable or disable looping. The playhead is re-positioned under the
    /// new rule, so enabling looping on a finished timeline rewinds it.
    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
        self.playhead = self.position(self.playhead);
        self.delta = self.delta_at(self.playhead);
    }

    // ========================================================================
    // Values
    // ========================================================================

    /// Interpolated value at the playhead
    pub fn value(&self) -> Result<f32> {
        self.value_at(self.playhead)
    }

    /// Interpolated value at an arbitrary time, without moving the playhead.
    ///
    /// Times before the first key frame yield the first value and times at or
    /// after the last key frame yield the last value.
    pub fn value_at(&self, time: f32) -> Result<f32> {
        if time.is_nan() {
            return Err(AnimationError::InvalidArgument(
                "cannot sample a timeline at NaN".to_string(),
            ));
        }
        let (first, last) = match (self.key_frames.first(), self.key_frames.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => {
                return Err(AnimationError::InvalidState(
                    "timeline has no key frames".to_string(),
                ))
            }
        };

        if self.key_frames.len() == 1 || time <= first.time() {
            return Ok(first.value());
        }
        if time >= last.time() {
            return Ok(last.value());
        }

        // first.time() < time < last.time(), so both neighbours exist
        let upper_index = self.upper_index(time);
        let lower = &self.key_frames[upper_index - 1];
        let upper = &self.key_frames[upper_index];
        let delta = Self::clamp_delta((time - lower.time()) / (upper.time() - lower.time()));

        Ok(self
            .interpolation
            .interpolate(lower.value(), upper.value(), delta))
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn index_of(&self, time: f32) -> Option<usize> {
        self.key_frames
            .binary_search_by(|kf| kf.time().total_cmp(&time))
            .ok()
    }

    /// Index of the first key frame strictly after `time`
    fn upper_index(&self, time: f32) -> usize {
        self.key_frames.partition_point(|kf| kf.time() <= time)
    }

    /// Apply the clamp / wrap rule
    fn position(&self, time: f32) -> f32 {
        if self.looping {
            if self.duration <= 0.0 {
                return 0.0;
            }
            let wrapped = time.rem_euclid(self.duration);
            // rem_euclid can round up to the divisor for tiny negative inputs
            if wrapped >= self.duration {
                0.0
            } else {
                wrapped
            }
        } else {
            time.clamp(0.0, self.duration)
        }
    }

    /// Progress between the bracketing key frames at `time`. Before the first
    /// key frame the timeline start acts as the lower bound.
    fn delta_at(&self, time: f32) -> f32 {
        let Some(last) = self.key_frames.last() else {
            return 0.0;
        };
        if time >= last.time() {
            return 1.0;
        }

        let upper_index = self.upper_index(time);
        let lower_time = match upper_index {
            0 => 0.0,
            i => self.key_frames[i - 1].time(),
        };
        let upper_time = self.key_frames[upper_index].time();

        Self::clamp_delta((time - lower_time) / (upper_time - lower_time))
    }

    /// Recompute derived state after the key frame set changed
    fn refresh(&mut self) {
        self.duration = self.key_frames.last().map_or(0.0, KeyFrame::time);
        self.playhead = self.position(self.playhead);
        self.delta = self.delta_at(self.playhead);
    }
}

impl Animatable for Timeline {
    fn on_frame(&mut self, delta_time: f32) -> Result<()> {
        self.move_playhead(delta_time)?;
        tracing::trace!(
            playhead = self.playhead,
            delta = self.delta,
            "timeline advanced"
        );
        Ok(())
    }

    fn is_completed(&self) -> bool {
        Timeline::is_completed(self)
    }
}

// ============================================================================
// Timeline Builder
// ============================================================================

/// Builder for creating timelines with a fluent API
///
/// # Example
///
/// ```
/// use tempo_animation::{Interpolation, Timeline};
///
/// let timeline = Timeline::builder()
///     .key_frame(0.0, 0.0)
///     .key_frame(0.5, 1.0)
///     .interpolation(Interpolation::Ease)
///     .build()
///     .unwrap();
///
/// assert_eq!(timeline.duration(), 0.5);
/// ```
#[derive(Clone, Debug, Default)]
pub struct TimelineBuilder {
    /// Key frame points (time, value), validated on build
    points: Vec<(f32, f32)>,
    interpolation: Interpolation,
    looping: bool,
}

impl TimelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key frame at `time` seconds
    pub fn key_frame(mut self, time: f32, value: f32) -> Self {
        self.points.push((time, value));
        self
    }

    /// Add several key frames
    pub fn key_frames<I>(mut self, points: I) -> Self
    where
        I: IntoIterator<Item = (f32, f32)>,
    {
        self.points.extend(points);
        self
    }

    /// Set the interpolation method
    pub fn interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    /// Loop forever instead of completing
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Build the timeline. Fails on negative or duplicate key frame times.
    pub fn build(self) -> Result<Timeline> {
        let mut timeline = Timeline::with_interpolation(self.interpolation);
        for (time, value) in self.points {
            timeline.add_key_frame(time, value)?;
        }
        timeline.set_looping(self.looping);
        Ok(timeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn three_points() -> Timeline {
        let mut timeline = Timeline::new();
        timeline.add_key_frame(0.0, 10.0).unwrap();
        timeline.add_key_frame(0.3, 20.0).unwrap();
        timeline.add_key_frame(0.7, 30.0).unwrap();
        timeline
    }

    #[test]
    fn test_duration_is_last_key_frame() {
        let timeline = three_points();
        assert_eq!(timeline.duration(), 0.7);
        assert_eq!(timeline.len(), 3);
    }

    #[test]
    fn test_insertion_order_irrelevant() {
        let mut timeline = Timeline::new();
        timeline.add_key_frame(0.7, 30.0).unwrap();
        timeline.add_key_frame(0.0, 10.0).unwrap();
        timeline.add_key_frame(0.3, 20.0).unwrap();

        let times: Vec<f32> = timeline.key_frames().iter().map(|kf| kf.time()).collect();
        assert_eq!(times, vec![0.0, 0.3, 0.7]);
        assert_eq!(timeline.duration(), 0.7);
    }

    #[test]
    fn test_duplicate_time_rejected() {
        let mut timeline = Timeline::new();
        timeline.add_key_frame(1.0, 1.0).unwrap();
        let err = timeline.add_key_frame(1.0, 2.0).unwrap_err();
        assert!(matches!(err, AnimationError::InvalidArgument(_)));

        // Original frame untouched
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline.key_frame_at(1.0).unwrap().value(), 1.0);
    }

    #[test]
    fn test_negative_time_rejected() {
        let mut timeline = Timeline::new();
        assert!(matches!(
            timeline.add_key_frame(-1.0, 0.0),
            Err(AnimationError::InvalidArgument(_))
        ));
        assert!(timeline.is_empty());
    }

    #[test]
    fn test_single_key_frame_playhead() {
        let mut timeline = Timeline::new();
        timeline.add_key_frame(5.0, 0.0).unwrap();

        timeline.set_playhead(2.0).unwrap();
        assert_eq!(timeline.playhead(), 2.0);
        assert!(approx(timeline.delta(), 0.4));

        timeline.reset();
        assert_eq!(timeline.playhead(), 0.0);

        timeline.end();
        assert_eq!(timeline.playhead(), 5.0);
        assert!(timeline.is_completed());
    }

    #[test]
    fn test_single_key_frame_value_is_constant() {
        let mut timeline = Timeline::new();
        timeline.add_key_frame(5.0, 42.0).unwrap();
        assert_eq!(timeline.value().unwrap(), 42.0);
        timeline.set_playhead(3.0).unwrap();
        assert_eq!(timeline.value().unwrap(), 42.0);
    }

    #[test]
    fn test_single_key_frame_at_zero_is_completed() {
        let mut timeline = Timeline::new();
        timeline.add_key_frame(0.0, 7.0).unwrap();

        assert_eq!(timeline.duration(), 0.0);
        assert!(timeline.is_completed());

        timeline.move_playhead(1.0).unwrap();
        assert_eq!(timeline.playhead(), 0.0);
        assert_eq!(timeline.value().unwrap(), 7.0);
    }

    #[test]
    fn test_empty_timeline_errors() {
        let mut timeline = Timeline::new();
        assert!(matches!(
            timeline.value(),
            Err(AnimationError::InvalidState(_))
        ));
        assert!(matches!(
            timeline.set_playhead(1.0),
            Err(AnimationError::InvalidState(_))
        ));
        assert!(timeline.set_playhead(0.0).is_ok());
        assert_eq!(timeline.duration(), 0.0);
    }

    #[test]
    fn test_playhead_clamps_when_not_looping() {
        let mut timeline = three_points();
        timeline.set_playhead(5.0).unwrap();
        assert_eq!(timeline.playhead(), 0.7);
        assert!(timeline.is_completed());

        timeline.set_playhead(-2.0).unwrap();
        assert_eq!(timeline.playhead(), 0.0);
        assert!(!timeline.is_completed());
    }

    #[test]
    fn test_playhead_wraps_when_looping() {
        let mut timeline = Timeline::builder()
            .key_frame(0.0, 0.0)
            .key_frame(5.0, 1.0)
            .looping(true)
            .build()
            .unwrap();

        timeline.set_playhead(4.5).unwrap();
        timeline.move_playhead(0.6).unwrap();
        assert!(approx(timeline.playhead(), 0.1));
        assert!(!timeline.is_completed());

        timeline.move_playhead(-0.2).unwrap();
        assert!(approx(timeline.playhead(), 4.9));
    }

    #[test]
    fn test_value_interpolates_between_brackets() {
        let mut timeline = three_points();

        timeline.set_playhead(0.15).unwrap();
        assert!(approx(timeline.delta(), 0.5));
        assert!(approx(timeline.value().unwrap(), 15.0));

        timeline.set_playhead(0.5).unwrap();
        assert!(approx(timeline.value().unwrap(), 25.0));

        timeline.end();
        assert_eq!(timeline.value().unwrap(), 30.0);
    }

    #[test]
    fn test_no_backward_extrapolation() {
        let timeline = Timeline::builder()
            .key_frame(1.0, 10.0)
            .key_frame(2.0, 20.0)
            .build()
            .unwrap();

        assert_eq!(timeline.value_at(0.5).unwrap(), 10.0);
        assert_eq!(timeline.value_at(3.0).unwrap(), 20.0);
        assert!(approx(timeline.value_at(1.5).unwrap(), 15.0));
    }

    #[test]
    fn test_interpolation_method_applies() {
        let mut timeline = Timeline::builder()
            .key_frame(0.0, 0.0)
            .key_frame(1.0, 1.0)
            .interpolation(Interpolation::Discrete)
            .build()
            .unwrap();

        timeline.set_playhead(0.9).unwrap();
        assert_eq!(timeline.value().unwrap(), 0.0);

        timeline.set_interpolation(Interpolation::Quadratic);
        assert!(approx(timeline.value().unwrap(), 0.81));
    }

    #[test]
    fn test_adding_key_frame_uncompletes() {
        let mut timeline = Timeline::builder()
            .key_frame(0.0, 0.0)
            .key_frame(1.0, 1.0)
            .build()
            .unwrap();

        timeline.end();
        assert!(timeline.is_completed());

        timeline.add_key_frame(2.0, 2.0).unwrap();
        assert_eq!(timeline.duration(), 2.0);
        assert_eq!(timeline.playhead(), 1.0);
        assert!(!timeline.is_completed());
    }

    #[test]
    fn test_remove_key_frame_reclamps() {
        let mut timeline = three_points();
        timeline.end();

        let removed = timeline.remove_key_frame(0.7).unwrap();
        assert_eq!(removed.value(), 30.0);
        assert_eq!(timeline.duration(), 0.3);
        assert_eq!(timeline.playhead(), 0.3);

        // Missing time is ignored
        assert!(timeline.remove_key_frame(0.5).is_none());
        assert_eq!(timeline.len(), 2);
    }

    #[test]
    fn test_closest_key_frame_before() {
        let timeline = Timeline::builder()
            .key_frame(1.0, 10.0)
            .key_frame(2.0, 20.0)
            .key_frame(4.0, 40.0)
            .build()
            .unwrap();

        assert_eq!(timeline.closest_key_frame_before(0.5).unwrap().time(), 1.0);
        assert_eq!(timeline.closest_key_frame_before(2.0).unwrap().time(), 2.0);
        assert_eq!(timeline.closest_key_frame_before(3.9).unwrap().time(), 2.0);
        assert_eq!(timeline.closest_key_frame_before(9.0).unwrap().time(), 4.0);
        assert!(Timeline::new().closest_key_frame_before(1.0).is_none());
    }

    #[test]
    fn test_clamp_delta() {
        assert_eq!(Timeline::clamp_delta(-0.5), 0.0);
        assert_eq!(Timeline::clamp_delta(0.25), 0.25);
        assert_eq!(Timeline::clamp_delta(1.5), 1.0);
        assert_eq!(Timeline::clamp_delta(f32::NAN), 0.0);
    }

    #[test]
    fn test_on_frame_moves_playhead() {
        let mut timeline = three_points();
        Animatable::on_frame(&mut timeline, 0.3).unwrap();
        assert!(approx(timeline.playhead(), 0.3));
        Animatable::on_frame(&mut timeline, 1.0).unwrap();
        assert!(Animatable::is_completed(&timeline));
    }

    #[test]
    fn test_clear_rewinds() {
        let mut timeline = three_points();
        timeline.set_playhead(0.5).unwrap();
        timeline.clear();
        assert!(timeline.is_empty());
        assert_eq!(timeline.playhead(), 0.0);
        assert_eq!(timeline.duration(), 0.0);
    }
}
