//! Declarative timeline descriptions
//!
//! A scene file lists named timelines in TOML:
//!
//! ```toml
//! [settings]
//! fps = 60
//!
//! [[timeline]]
//! name = "opacity"
//! interpolation = "ease"
//! key_frames = [[0.0, 0.0], [0.5, 1.0]]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::AnimationError;
use crate::interpolation::Interpolation;
use crate::timeline::Timeline;

/// Errors loading or building a scene
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the scene file
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The scene is not valid TOML or has the wrong shape
    #[error("Failed to parse scene: {0}")]
    Parse(#[from] toml::de::Error),

    /// The scene could not be written back out
    #[error("Failed to serialize scene: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Two timelines share a name
    #[error("Duplicate timeline name '{0}'")]
    DuplicateName(String),

    /// A timeline description was rejected
    #[error("Invalid timeline '{name}': {source}")]
    Timeline {
        name: String,
        #[source]
        source: AnimationError,
    },
}

/// Top-level scene file
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct SceneConfig {
    #[serde(default)]
    pub settings: SceneSettings,
    #[serde(default, rename = "timeline")]
    pub timelines: Vec<TimelineConfig>,
}

/// Playback settings for hosts that drive a scene
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SceneSettings {
    /// Frames per second
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Upper bound on frames to drive before giving up on completion
    #[serde(default = "default_max_frames")]
    pub max_frames: u64,
}

fn default_fps() -> u32 {
    60
}

fn default_max_frames() -> u64 {
    600
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            max_frames: default_max_frames(),
        }
    }
}

/// One named timeline
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct TimelineConfig {
    pub name: String,
    #[serde(default)]
    pub interpolation: Interpolation,
    #[serde(default)]
    pub looping: bool,
    /// `(time, value)` pairs, any order
    #[serde(default)]
    pub key_frames: Vec<(f32, f32)>,
}

impl TimelineConfig {
    /// Build the described timeline
    pub fn build(&self) -> crate::Result<Timeline> {
        Timeline::builder()
            .key_frames(self.key_frames.iter().copied())
            .interpolation(self.interpolation)
            .looping(self.looping)
            .build()
    }

    /// Describe an existing timeline under `name`
    pub fn from_timeline(name: impl Into<String>, timeline: &Timeline) -> Self {
        Self {
            name: name.into(),
            interpolation: timeline.interpolation(),
            looping: timeline.is_looping(),
            key_frames: timeline
                .key_frames()
                .iter()
                .map(|kf| (kf.time(), kf.value()))
                .collect(),
        }
    }
}

impl SceneConfig {
    /// Load a scene from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let scene = Self::from_toml_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            timelines = scene.timelines.len(),
            "Loaded scene"
        );
        Ok(scene)
    }

    /// Parse a scene from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Serialize to a TOML string
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Look up a timeline description by name
    pub fn timeline(&self, name: &str) -> Option<&TimelineConfig> {
        self.timelines.iter().find(|t| t.name == name)
    }

    /// Build every timeline, in file order. Fails on the first invalid
    /// description or on duplicate names.
    pub fn build_timelines(&self) -> Result<Vec<(String, Timeline)>, ConfigError> {
        let mut built: Vec<(String, Timeline)> = Vec::with_capacity(self.timelines.len());
        for config in &self.timelines {
            if built.iter().any(|(name, _)| *name == config.name) {
                return Err(ConfigError::DuplicateName(config.name.clone()));
            }
            let timeline = config.build().map_err(|source| ConfigError::Timeline {
                name: config.name.clone(),
                source,
            })?;
            built.push((config.name.clone(), timeline));
        }
        Ok(built)
    }
}
