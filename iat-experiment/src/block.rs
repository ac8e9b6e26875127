use iat_core::{AnchorSet, Label, ResponseMapping, Stimulus, TrialResult};
use iat_timing::Timer;
use rand::Rng;

use crate::error::{Halt, SessionError};
use crate::frontend::{KeySource, Screen};
use crate::pool::{StimulusPool, compensate, deneighbor, sample_without_replacement};
use crate::session::SessionContext;
use crate::trial::run_trial;

/// Trials per block unless the block says otherwise.
pub const DEFAULT_TRIALS: usize = 20;

/// One measurement block: which categories are drawn, how they map to keys,
/// which reminders are on screen and how many trials run.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockSpec {
    pub name: String,
    pub anchors: AnchorSet,
    pub response_map: ResponseMapping,
    pub selection: Vec<Label>,
    pub trials: usize,
}

impl BlockSpec {
    pub fn new(
        name: impl Into<String>,
        anchors: AnchorSet,
        response_map: ResponseMapping,
        selection: Vec<Label>,
    ) -> Self {
        Self {
            name: name.into(),
            anchors,
            response_map,
            selection,
            trials: DEFAULT_TRIALS,
        }
    }

    pub fn with_trials(mut self, trials: usize) -> Self {
        self.trials = trials;
        self
    }
}

/// Draws the block's stimulus sequence: filter to the selected categories,
/// top up to the trial count, sample that many and spread out repeats.
///
/// Fails on a selected category without a response key, on a selection no
/// stimulus belongs to, and when repeats cannot be kept apart.
pub fn prepare_stimuli<R: Rng + ?Sized>(
    pool: &StimulusPool,
    spec: &BlockSpec,
    rng: &mut R,
) -> Result<Vec<Stimulus>, SessionError> {
    if let Some(label) = spec.selection.iter().find(|l| spec.response_map.get(l).is_none()) {
        return Err(SessionError::UnmappedCategory {
            block: spec.name.clone(),
            label: label.to_string(),
        });
    }
    let selected = pool.filter(&spec.selection);
    if selected.is_empty() && spec.trials > 0 {
        return Err(SessionError::EmptySelection {
            block: spec.name.clone(),
        });
    }
    let available = selected.len();
    let extended = compensate(selected, spec.trials, rng);
    if extended.len() > available {
        tracing::debug!(
            block = %spec.name,
            available,
            added = extended.len() - available,
            "Compensated short selection"
        );
    }
    let sampled = sample_without_replacement(extended, spec.trials, rng);
    deneighbor(sampled, rng).map_err(|crowded| SessionError::Unarrangeable {
        block: spec.name.clone(),
        count: crowded.count,
        len: crowded.len,
    })
}

/// Prepares and runs `spec` in one go. See [`run_prepared`].
pub fn run_block<S, K, T, R>(
    ctx: &mut SessionContext<S, K, T, R>,
    spec: &BlockSpec,
    sink: &mut Vec<TrialResult>,
) -> Result<(), Halt>
where
    S: Screen,
    K: KeySource,
    T: Timer,
    R: Rng,
{
    let sequence = prepare_stimuli(&ctx.pool, spec, &mut ctx.rng)?;
    run_prepared(ctx, spec, &sequence, sink)
}

/// Runs one trial per stimulus of `sequence`, appending rows to `sink` as
/// they complete so that an abort keeps what was already recorded.
pub fn run_prepared<S, K, T, R>(
    ctx: &mut SessionContext<S, K, T, R>,
    spec: &BlockSpec,
    sequence: &[Stimulus],
    sink: &mut Vec<TrialResult>,
) -> Result<(), Halt>
where
    S: Screen,
    K: KeySource,
    T: Timer,
    R: Rng,
{
    tracing::info!(block = %spec.name, trials = sequence.len(), "Block started");

    ctx.screen.set_anchors(&spec.anchors, true);
    let outcome: Result<(), Halt> = sequence.iter().try_for_each(|stimulus| {
        let row = run_trial(ctx, stimulus, &spec.response_map, &spec.name)?;
        sink.push(row);
        Ok(())
    });
    ctx.screen.set_anchors(&spec.anchors, false);

    if outcome.is_ok() {
        tracing::info!(block = %spec.name, "Block finished");
    }
    outcome
}
