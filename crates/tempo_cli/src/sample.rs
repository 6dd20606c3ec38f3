//! Scene sampling
//!
//! Plays every timeline of a scene on one animator, driven by a stepped
//! clock, and records each timeline's value after every frame.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use anyhow::{Context, Result};
use serde::Serialize;
use tempo_animation::{Animator, SceneConfig, SteppedClock, Timeline};
use tracing::{debug, info};

/// One recorded value
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Sample {
    pub frame: u64,
    /// Seconds since the first frame
    pub time: f64,
    pub name: String,
    pub value: f32,
}

/// Result of sampling a scene
#[derive(Debug, Default, Serialize)]
pub struct SampleRun {
    /// Frames driven after the initial state
    pub frames: u64,
    pub samples: Vec<Sample>,
    /// Timelines still playing when the frame limit was reached
    pub unfinished: Vec<String>,
}

/// Drive `scene` at `fps` for at most `max_frames` frames
pub fn sample_scene(scene: &SceneConfig, fps: u32, max_frames: u64) -> Result<SampleRun> {
    let animator = Animator::new();
    let mut clock = SteppedClock::from_fps(fps)?;
    let frame_time = clock.frame_time() as f64;
    animator.start(&mut clock);

    let samples = Rc::new(RefCell::new(Vec::new()));
    let frame = Rc::new(Cell::new(0u64));
    let mut tracks = Vec::new();

    for (name, timeline) in scene.build_timelines()? {
        let initial = timeline
            .value()
            .with_context(|| format!("Timeline '{name}' has no key frames"))?;
        samples.borrow_mut().push(Sample {
            frame: 0,
            time: 0.0,
            name: name.clone(),
            value: initial,
        });

        let timeline = Rc::new(RefCell::new(timeline));
        let observer = animator.play(&timeline);

        let rows = Rc::clone(&samples);
        let current = Rc::clone(&frame);
        let track = name.clone();
        observer.on_frame(move |t: &Rc<RefCell<Timeline>>| {
            if let Ok(value) = t.borrow().value() {
                rows.borrow_mut().push(Sample {
                    frame: current.get(),
                    time: current.get() as f64 * frame_time,
                    name: track.clone(),
                    value,
                });
            }
        });

        let finished = name.clone();
        let current = Rc::clone(&frame);
        observer.on_complete(move |_: &Rc<RefCell<Timeline>>| {
            info!(timeline = %finished, frame = current.get(), "Timeline completed");
        });

        tracks.push((name, timeline));
    }

    while frame.get() < max_frames && !animator.is_empty() {
        frame.set(frame.get() + 1);
        clock.tick()?;
    }

    let unfinished: Vec<String> = tracks
        .iter()
        .filter(|(_, timeline)| animator.is_playing(timeline))
        .map(|(name, _)| name.clone())
        .collect();
    debug!(
        frames = frame.get(),
        unfinished = unfinished.len(),
        "Sampling finished"
    );

    animator.stop(&mut clock);

    let samples = std::mem::take(&mut *samples.borrow_mut());
    Ok(SampleRun {
        frames: frame.get(),
        samples,
        unfinished,
    })
}

/// Render samples as an aligned text table
pub fn format_text(run: &SampleRun) -> String {
    let mut out = format!("{:>6} {:>10} {:<20} {:>12}\n", "frame", "time", "timeline", "value");
    for sample in &run.samples {
        out.push_str(&format!(
            "{:>6} {:>10.4} {:<20} {:>12.6}\n",
            sample.frame, sample.time, sample.name, sample.value
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene(text: &str) -> SceneConfig {
        SceneConfig::from_toml_str(text).unwrap()
    }

    #[test]
    fn test_samples_until_complete() {
        let scene = scene(
            r#"
[[timeline]]
name = "fade"
key_frames = [[0.0, 0.0], [1.0, 1.0]]
"#,
        );

        let run = sample_scene(&scene, 4, 100).unwrap();
        assert_eq!(run.frames, 4);
        assert!(run.unfinished.is_empty());

        let values: Vec<f32> = run.samples.iter().map(|s| s.value).collect();
        assert_eq!(values, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(run.samples[2].time, 0.5);
    }

    #[test]
    fn test_looping_hits_frame_limit() {
        let scene = scene(
            r#"
[[timeline]]
name = "pulse"
looping = true
key_frames = [[0.0, 0.0], [1.0, 1.0]]
"#,
        );

        let run = sample_scene(&scene, 10, 25).unwrap();
        assert_eq!(run.frames, 25);
        assert_eq!(run.unfinished, vec!["pulse".to_string()]);
        assert_eq!(run.samples.len(), 26);
    }

    #[test]
    fn test_empty_timeline_is_an_error() {
        let scene = scene(
            r#"
[[timeline]]
name = "nothing"
"#,
        );
        assert!(sample_scene(&scene, 60, 10).is_err());
    }

    #[test]
    fn test_text_table() {
        let run = SampleRun {
            frames: 1,
            samples: vec![Sample {
                frame: 1,
                time: 0.5,
                name: "x".to_string(),
                value: 2.0,
            }],
            unfinished: Vec::new(),
        };
        let text = format_text(&run);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("timeline"));
        assert!(lines[1].contains("0.5000"));
        assert!(lines[1].contains("2.000000"));
    }
}
