//! Scripted frontend doubles shared by the integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::time::Duration;

use iat_core::{AnchorSet, Key, Stimulus};
use iat_experiment::{
    ExperimentConfig, Instruction, KeySource, Screen, SessionContext, StimulusPool, TrialSettings,
};
use iat_timing::ManualTimer;
use rand::SeedableRng;
use rand::rngs::StdRng;

pub const ABORT: &str = "escape";

#[derive(Debug, Clone, PartialEq)]
pub enum Shown {
    Instruction(Instruction),
    Stimulus(String),
    Feedback,
    Fixation,
    Anchors(bool),
}

/// Remembers everything put on screen.
#[derive(Debug, Default)]
pub struct RecordingScreen {
    pub shown: Vec<Shown>,
}

impl RecordingScreen {
    pub fn count(&self, pred: impl Fn(&Shown) -> bool) -> usize {
        self.shown.iter().filter(|s| pred(s)).count()
    }
}

impl Screen for RecordingScreen {
    fn show_instruction(&mut self, instruction: &Instruction) {
        self.shown.push(Shown::Instruction(instruction.clone()));
    }

    fn show_stimulus(&mut self, stimulus: &Stimulus) {
        self.shown.push(Shown::Stimulus(stimulus.content.to_string()));
    }

    fn show_feedback(&mut self) {
        self.shown.push(Shown::Feedback);
    }

    fn show_fixation(&mut self) {
        self.shown.push(Shown::Fixation);
    }

    fn set_anchors(&mut self, _anchors: &AnchorSet, visible: bool) {
        self.shown.push(Shown::Anchors(visible));
    }
}

/// Answers every wait with the first allowed key, then the abort key once
/// `budget` waits are used up.
#[derive(Debug)]
pub struct FirstKey {
    budget: Option<usize>,
    pub waits: usize,
}

impl FirstKey {
    pub fn forever() -> Self {
        Self {
            budget: None,
            waits: 0,
        }
    }

    pub fn aborting_after(waits: usize) -> Self {
        Self {
            budget: Some(waits),
            waits: 0,
        }
    }
}

impl KeySource for FirstKey {
    fn wait_keys(&mut self, allowed: &[Key], _max_wait: Option<Duration>) -> Option<Vec<Key>> {
        self.waits += 1;
        if self.budget.is_some_and(|b| self.waits > b) {
            return Some(vec![Key::from(ABORT)]);
        }
        allowed.first().map(|k| vec![k.clone()])
    }
}

/// Replays `(latency, key)` answers, advancing a shared clock by each
/// latency. Runs dry into the abort key.
#[derive(Debug)]
pub struct ScriptedKeys {
    script: VecDeque<(Duration, Option<Key>)>,
    clock: ManualTimer,
}

impl ScriptedKeys {
    pub fn new(clock: &ManualTimer, script: &[(u64, Option<&str>)]) -> Self {
        Self {
            script: script
                .iter()
                .map(|(ms, key)| (Duration::from_millis(*ms), key.map(Key::from)))
                .collect(),
            clock: clock.clone(),
        }
    }
}

impl KeySource for ScriptedKeys {
    fn wait_keys(&mut self, _allowed: &[Key], _max_wait: Option<Duration>) -> Option<Vec<Key>> {
        match self.script.pop_front() {
            Some((latency, key)) => {
                self.clock.advance(latency);
                key.map(|k| vec![k])
            }
            None => Some(vec![Key::from(ABORT)]),
        }
    }
}

pub fn pool(stimuli: &[(&str, &str)]) -> StimulusPool {
    StimulusPool::new(
        stimuli
            .iter()
            .map(|(content, response)| Stimulus::new(content, response))
            .collect(),
    )
}

/// Three words for each of the four default categories.
pub fn full_pool() -> StimulusPool {
    pool(&[
        ("they", "Other"),
        ("them", "Other"),
        ("theirs", "Other"),
        ("me", "Self"),
        ("mine", "Self"),
        ("myself", "Self"),
        ("physics", "Science"),
        ("chemistry", "Science"),
        ("biology", "Science"),
        ("history", "Liberal Arts"),
        ("music", "Liberal Arts"),
        ("poetry", "Liberal Arts"),
    ])
}

pub fn context<K: KeySource>(
    keys: K,
    timer: ManualTimer,
    pool: StimulusPool,
    seed: u64,
) -> SessionContext<RecordingScreen, K, ManualTimer, StdRng> {
    SessionContext::new(
        RecordingScreen::default(),
        keys,
        timer,
        StdRng::seed_from_u64(seed),
        pool,
    )
    .with_settings(TrialSettings::from_config(&ExperimentConfig::default()))
}
