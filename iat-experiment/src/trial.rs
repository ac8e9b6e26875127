use std::time::Duration;

use iat_core::{Key, ResponseMapping, Stimulus, TrialResult, TrialState};
use iat_timing::Timer;
use rand::Rng;

use crate::config::{ExperimentConfig, IsiJitter};
use crate::error::{Halt, SessionError};
use crate::frontend::{KeySource, Screen};
use crate::session::SessionContext;

/// Verdict on the keys returned by the first response wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    Correct,
    Incorrect,
    Abort,
}

/// Scores a key wait result. Only the first pressed key can be correct; short
/// of that, the abort key anywhere in the answer aborts, and anything else
/// (no key at all included) is wrong.
pub fn score(pressed: Option<&[Key]>, expected: &Key, abort_key: &Key) -> Response {
    let pressed = pressed.unwrap_or_default();
    if pressed.first() == Some(expected) {
        Response::Correct
    } else if pressed.contains(abort_key) {
        Response::Abort
    } else {
        Response::Incorrect
    }
}

/// `min + (max - min) / steps * k` with `k` uniform in `0..=steps`.
pub fn jitter_isi<R: Rng + ?Sized>(jitter: &IsiJitter, rng: &mut R) -> f64 {
    let rank = (jitter.max - jitter.min) / f64::from(jitter.steps);
    jitter.min + rank * f64::from(rng.random_range(0..=jitter.steps))
}

/// Per-trial timing and key settings shared by every block of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialSettings {
    pub abort_key: Key,
    pub stop_keys: Vec<Key>,
    pub response_timeout: Option<Duration>,
    pub feedback: Duration,
    pub isi: f64,
    pub isi_jitter: Option<IsiJitter>,
}

impl TrialSettings {
    pub fn from_config(config: &ExperimentConfig) -> Self {
        Self {
            abort_key: Key::from(config.abort_key.as_str()),
            stop_keys: config.stop_keys.iter().map(|k| Key::from(k.as_str())).collect(),
            response_timeout: config.response_timeout_duration(),
            feedback: config.feedback_duration(),
            isi: config.isi,
            isi_jitter: config.isi_jitter,
        }
    }

    /// ISI in seconds for the next trial.
    pub fn next_isi<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match &self.isi_jitter {
            Some(j) => jitter_isi(j, rng),
            None => self.isi,
        }
    }
}

impl Default for TrialSettings {
    fn default() -> Self {
        Self::from_config(&ExperimentConfig::default())
    }
}

fn advance(state: &mut TrialState, next: TrialState) {
    debug_assert!(state.can_advance_to(next), "{state:?} -> {next:?}");
    tracing::trace!(from = ?state, to = ?next, "Trial state");
    *state = next;
}

/// Runs one trial and returns its row.
///
/// The reaction time is always the time to the first answer. A wrong first
/// answer shows feedback, re-presents the stimulus and waits for the
/// expected key alone before the trial closes.
pub fn run_trial<S, K, T, R>(
    ctx: &mut SessionContext<S, K, T, R>,
    stimulus: &Stimulus,
    mapping: &ResponseMapping,
    block_name: &str,
) -> Result<TrialResult, Halt>
where
    S: Screen,
    K: KeySource,
    T: Timer,
    R: Rng,
{
    let expected = mapping
        .get(&stimulus.response)
        .cloned()
        .ok_or_else(|| SessionError::UnmappedCategory {
            block: block_name.to_string(),
            label: stimulus.response.to_string(),
        })?;
    let abort_key = ctx.settings.abort_key.clone();
    let mut allowed = mapping.keys();
    allowed.push(abort_key.clone());

    let mut state = TrialState::Presenting;
    ctx.screen.show_stimulus(stimulus);
    ctx.timer.reset();

    advance(&mut state, TrialState::AwaitingResponse);
    let pressed = ctx.keys.wait_keys(&allowed, ctx.settings.response_timeout);
    let reaction_time_secs = ctx.timer.elapsed_secs();

    let correct_on_first_try = match score(pressed.as_deref(), &expected, &abort_key) {
        Response::Abort => {
            tracing::warn!(block = block_name, content = %stimulus.content, "Abort key pressed");
            return Err(Halt::Abort);
        }
        Response::Correct => {
            advance(&mut state, TrialState::Correct);
            true
        }
        Response::Incorrect => {
            advance(&mut state, TrialState::Incorrect);
            ctx.screen.show_feedback();
            advance(&mut state, TrialState::CorrectiveFeedback);
            ctx.timer.sleep(ctx.settings.feedback);

            ctx.screen.show_stimulus(stimulus);
            advance(&mut state, TrialState::AwaitingRetry);
            await_key(ctx, &expected, &abort_key)?;
            advance(&mut state, TrialState::Correct);
            false
        }
    };
    debug_assert!(state.is_terminal());

    let isi = ctx.settings.next_isi(&mut ctx.rng);
    let row = TrialResult {
        isi,
        content: stimulus.content.to_string(),
        correct_on_first_try,
        reaction_time_secs,
        block_name: block_name.to_string(),
    };
    tracing::debug!(
        block = block_name,
        content = %row.content,
        correct = correct_on_first_try,
        rt = reaction_time_secs,
        "Trial complete"
    );

    ctx.screen.show_fixation();
    ctx.timer.sleep(Duration::from_secs_f64(isi));
    Ok(row)
}

/// Blocks until `key` is pressed. Only the input source running dry (it
/// reports the abort key) gets out of here any other way.
fn await_key<S, K, T, R>(
    ctx: &mut SessionContext<S, K, T, R>,
    key: &Key,
    abort_key: &Key,
) -> Result<(), Halt>
where
    K: KeySource,
{
    let only = std::slice::from_ref(key);
    loop {
        let Some(pressed) = ctx.keys.wait_keys(only, None) else {
            continue;
        };
        if pressed.contains(key) {
            return Ok(());
        }
        if pressed.contains(abort_key) {
            return Err(Halt::Abort);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn keys(names: &[&str]) -> Vec<Key> {
        names.iter().map(|k| Key::from(*k)).collect()
    }

    fn press(names: &[&str], expected: &str) -> Response {
        let pressed = keys(names);
        score(Some(pressed.as_slice()), &Key::from(expected), &Key::from("escape"))
    }

    #[test]
    fn scoring_rules() {
        assert_eq!(press(&["e"], "e"), Response::Correct);
        assert_eq!(press(&["i"], "e"), Response::Incorrect);
        assert_eq!(press(&[], "e"), Response::Incorrect);
        assert_eq!(
            score(None, &Key::from("e"), &Key::from("escape")),
            Response::Incorrect
        );
        assert_eq!(press(&["escape"], "e"), Response::Abort);
        assert_eq!(press(&["escape"], "i"), Response::Abort);
        assert_eq!(press(&["i", "escape"], "e"), Response::Abort);
    }

    #[test]
    fn correct_first_key_beats_a_later_abort() {
        assert_eq!(press(&["e", "escape"], "e"), Response::Correct);
    }

    #[test]
    fn only_first_key_counts() {
        assert_eq!(press(&["i", "e"], "e"), Response::Incorrect);
    }

    #[test]
    fn jitter_stays_on_grid() {
        let mut rng = StdRng::seed_from_u64(5);
        let jitter = IsiJitter {
            min: 1.0,
            max: 3.0,
            steps: 20,
        };
        for _ in 0..200 {
            let isi = jitter_isi(&jitter, &mut rng);
            assert!((1.0..=3.0).contains(&isi));
            let k = (isi - 1.0) / 0.1;
            assert!((k - k.round()).abs() < 1e-9);
        }
    }

    #[test]
    fn settings_use_fixed_isi_without_jitter() {
        let mut rng = StdRng::seed_from_u64(5);
        let settings = TrialSettings::default();
        assert_eq!(settings.next_isi(&mut rng), 0.150);
        assert_eq!(settings.abort_key, Key::from("escape"));
        assert_eq!(settings.stop_keys, keys(&["space"]));
        assert_eq!(settings.feedback, Duration::from_secs(1));
    }
}
