//! Experiment configuration.
//!
//! Everything has a default matching the SIP IAT setup, so an empty `{}` (or
//! no file at all) yields a runnable experiment. Field names are camelCase in
//! JSON.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Config file looked up in the working directory when none is given.
pub const CONFIG_FILE_NAME: &str = "iat.json";

fn default_title() -> String {
    "SIP IAT".to_string()
}

fn default_stimuli() -> PathBuf {
    PathBuf::from("stimuli.csv")
}

fn default_labels() -> Vec<String> {
    ["Other", "Self", "Science", "Liberal Arts"]
        .map(String::from)
        .to_vec()
}

fn default_keybindings() -> Vec<String> {
    vec!["e".to_string(), "i".to_string()]
}

fn default_abort_key() -> String {
    "escape".to_string()
}

fn default_stop_keys() -> Vec<String> {
    vec!["space".to_string()]
}

const fn default_isi() -> f64 {
    0.150
}

const fn default_feedback_time() -> f64 {
    1.0
}

const fn default_trials() -> usize {
    20
}

const fn default_extended_trials() -> usize {
    40
}

fn default_conditions() -> Vec<String> {
    vec!["A".to_string(), "B".to_string()]
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

const fn default_true() -> bool {
    true
}

/// Uniform ISI jitter on a fixed grid: `min + (max - min) / steps * k`, `k` in `0..=steps`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IsiJitter {
    pub min: f64,
    pub max: f64,
    pub steps: u32,
}

/// Instruction assets: image paths or literal text.
///
/// `blocks[n]` precedes catalog block `n + 1`; a `null` entry skips the
/// instruction for that block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstructionsConfig {
    pub main: Option<String>,
    pub blocks: Vec<Option<String>>,
    pub end: Option<String>,
}

impl Default for InstructionsConfig {
    fn default() -> Self {
        Self {
            main: Some("instructions/mainInstruction.png".to_string()),
            blocks: (1..=7)
                .map(|n| Some(format!("instructions/instr{n}.png")))
                .collect(),
            end: Some("instructions/endInstruction.png".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperimentConfig {
    /// Title shown on the metadata prompt.
    #[serde(default = "default_title")]
    pub title: String,

    /// CSV with at least `content` and `response` columns.
    #[serde(default = "default_stimuli")]
    pub stimuli: PathBuf,

    /// Two dimensions, two labels each: `[l0, l1, l2, l3]`.
    #[serde(default = "default_labels")]
    pub labels: Vec<String>,

    /// Left and right response key.
    #[serde(default = "default_keybindings")]
    pub keybindings: Vec<String>,

    #[serde(default = "default_abort_key")]
    pub abort_key: String,

    /// Keys that dismiss an instruction screen.
    #[serde(default = "default_stop_keys")]
    pub stop_keys: Vec<String>,

    /// Inter-stimulus interval in seconds.
    #[serde(default = "default_isi")]
    pub isi: f64,

    /// Replaces the fixed ISI when set.
    #[serde(default)]
    pub isi_jitter: Option<IsiJitter>,

    /// Maximum wait for the first response in seconds; none waits forever.
    #[serde(default)]
    pub response_timeout: Option<f64>,

    /// How long the error mark stays up, in seconds.
    #[serde(default = "default_feedback_time")]
    pub feedback_time: f64,

    #[serde(default = "default_trials")]
    pub trials: usize,

    /// Trial count of the long combined blocks and of the fifth scheduled slot.
    #[serde(default = "default_extended_trials")]
    pub extended_trials: usize,

    #[serde(default = "default_conditions")]
    pub conditions: Vec<String>,

    #[serde(default)]
    pub instructions: InstructionsConfig,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Write the rows collected before an abort to `<name>_aborted.csv`.
    #[serde(default)]
    pub save_partial_on_abort: bool,

    /// Write a per-block JSON summary next to the dataset.
    #[serde(default = "default_true")]
    pub write_summary: bool,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            stimuli: default_stimuli(),
            labels: default_labels(),
            keybindings: default_keybindings(),
            abort_key: default_abort_key(),
            stop_keys: default_stop_keys(),
            isi: default_isi(),
            isi_jitter: None,
            response_timeout: None,
            feedback_time: default_feedback_time(),
            trials: default_trials(),
            extended_trials: default_extended_trials(),
            conditions: default_conditions(),
            instructions: InstructionsConfig::default(),
            output_dir: default_output_dir(),
            save_partial_on_abort: false,
            write_summary: true,
        }
    }
}

impl ExperimentConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path` if given, else `iat.json` if present, else the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None if Path::new(CONFIG_FILE_NAME).exists() => Self::load(Path::new(CONFIG_FILE_NAME)),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if self.labels.len() != 4 {
            return invalid(format!("expected 4 labels, got {}", self.labels.len()));
        }
        if has_duplicates(&self.labels) {
            return invalid("labels must be distinct".to_string());
        }
        if self.keybindings.len() != 2 {
            return invalid(format!(
                "expected 2 keybindings, got {}",
                self.keybindings.len()
            ));
        }
        if has_duplicates(&self.keybindings) {
            return invalid("keybindings must be distinct".to_string());
        }
        if self.keybindings.contains(&self.abort_key) {
            return invalid(format!(
                "abort key '{}' is also a response key",
                self.abort_key
            ));
        }
        if self.stop_keys.is_empty() {
            return invalid("at least one stop key is required".to_string());
        }
        if !(self.isi >= 0.0 && self.feedback_time >= 0.0) {
            return invalid("isi and feedbackTime must be non-negative".to_string());
        }
        if let Some(j) = self.isi_jitter {
            if j.steps == 0 || !(j.min >= 0.0 && j.max >= j.min) {
                return invalid("isiJitter needs 0 <= min <= max and steps > 0".to_string());
            }
        }
        if self.response_timeout.is_some_and(|t| !(t > 0.0)) {
            return invalid("responseTimeout must be positive".to_string());
        }
        let durations = [
            ("isi", Some(self.isi)),
            ("feedbackTime", Some(self.feedback_time)),
            ("responseTimeout", self.response_timeout),
            ("isiJitter.max", self.isi_jitter.map(|j| j.max)),
        ];
        for (name, secs) in durations {
            if let Some(secs) = secs {
                if Duration::try_from_secs_f64(secs).is_err() {
                    return invalid(format!("{name} of {secs} seconds is out of range"));
                }
            }
        }
        if self.trials == 0 || self.extended_trials == 0 {
            return invalid("trial counts must be positive".to_string());
        }
        if self.conditions.is_empty() {
            return invalid("at least one condition is required".to_string());
        }
        if self.instructions.blocks.len() > 7 {
            return invalid(format!(
                "{} block instructions given for 7 blocks",
                self.instructions.blocks.len()
            ));
        }
        Ok(())
    }

    pub fn feedback_duration(&self) -> Duration {
        Duration::from_secs_f64(self.feedback_time)
    }

    pub fn response_timeout_duration(&self) -> Option<Duration> {
        self.response_timeout.map(Duration::from_secs_f64)
    }
}

fn has_duplicates(values: &[String]) -> bool {
    values
        .iter()
        .enumerate()
        .any(|(i, v)| values[..i].contains(v))
}
