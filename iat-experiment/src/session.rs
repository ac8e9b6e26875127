use std::io;
use std::path::Path;

use iat_core::{Stimulus, TrialResult};
use iat_timing::Timer;
use rand::Rng;
use serde::Serialize;

use crate::block::{prepare_stimuli, run_prepared};
use crate::error::{Halt, SessionError};
use crate::frontend::{KeySource, Screen};
use crate::instruction::{Instruction, show_instruction};
use crate::pool::StimulusPool;
use crate::schedule::{BlockScheduler, OrderingVariant, ScheduledBlock};
use crate::trial::TrialSettings;

/// Everything a running session touches. Owned by the [`Session`] and lent
/// to block and trial runners for their duration.
pub struct SessionContext<S, K, T, R> {
    pub screen: S,
    pub keys: K,
    pub timer: T,
    pub rng: R,
    pub settings: TrialSettings,
    pub pool: StimulusPool,
}

impl<S, K, T, R> SessionContext<S, K, T, R> {
    pub fn new(screen: S, keys: K, timer: T, rng: R, pool: StimulusPool) -> Self {
        Self {
            screen,
            keys,
            timer,
            rng,
            settings: TrialSettings::default(),
            pool,
        }
    }

    pub fn with_settings(mut self, settings: TrialSettings) -> Self {
        self.settings = settings;
        self
    }
}

/// Participant metadata captured before the session starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionInfo {
    pub id: String,
    pub condition: String,
}

impl SessionInfo {
    pub fn new(id: impl Into<String>, condition: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            condition: condition.into(),
        }
    }

    pub fn validate(&self, conditions: &[String]) -> Result<(), SessionError> {
        if conditions.contains(&self.condition) {
            Ok(())
        } else {
            Err(SessionError::UnknownCondition(self.condition.clone()))
        }
    }
}

/// Rows collected by a session, complete or not.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionData {
    pub info: SessionInfo,
    pub variant: OrderingVariant,
    pub rows: Vec<TrialResult>,
}

impl SessionData {
    fn stem(&self) -> String {
        format!("{}_{}", self.info.condition, self.variant)
    }

    /// `{Condition}_{variant}.csv`
    pub fn file_name(&self) -> String {
        format!("{}.csv", self.stem())
    }

    pub fn aborted_file_name(&self) -> String {
        format!("{}_aborted.csv", self.stem())
    }

    pub fn summary_file_name(&self) -> String {
        format!("{}_summary.json", self.stem())
    }

    /// Metadata row, header row, then one row per trial.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> csv::Result<()> {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_writer(writer);
        wtr.write_record([&self.info.id, &self.info.condition])?;
        wtr.write_record(TrialResult::HEADER)?;
        for row in &self.rows {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn save(&self, path: &Path) -> csv::Result<()> {
        let file = std::fs::File::create(path)?;
        self.write_csv(io::BufWriter::new(file))
    }
}

/// How a session ended.
#[derive(Debug)]
pub enum SessionOutcome {
    Completed(SessionData),
    /// The abort key was pressed; holds the rows completed until then.
    AbortedByUser(SessionData),
    ConfigurationError(SessionError),
}

impl SessionOutcome {
    pub fn data(&self) -> Option<&SessionData> {
        match self {
            Self::Completed(data) | Self::AbortedByUser(data) => Some(data),
            Self::ConfigurationError(_) => None,
        }
    }
}

/// Drives one participant through the welcome screen and the seven blocks.
pub struct Session<S, K, T, R> {
    ctx: SessionContext<S, K, T, R>,
    scheduler: BlockScheduler,
    info: SessionInfo,
}

impl<S, K, T, R> Session<S, K, T, R>
where
    S: Screen,
    K: KeySource,
    T: Timer,
    R: Rng,
{
    pub fn new(ctx: SessionContext<S, K, T, R>, scheduler: BlockScheduler, info: SessionInfo) -> Self {
        Self {
            ctx,
            scheduler,
            info,
        }
    }

    /// Draws the ordering variant and runs the session.
    pub fn run(&mut self) -> SessionOutcome {
        let variant = OrderingVariant::draw(&mut self.ctx.rng);
        self.run_variant(variant)
    }

    /// Draws every block's stimulus sequence first, so a configuration fault
    /// ends the session before anything is shown, then runs the blocks.
    pub fn run_variant(&mut self, variant: OrderingVariant) -> SessionOutcome {
        tracing::info!(
            id = %self.info.id,
            condition = %self.info.condition,
            %variant,
            "Session started"
        );
        let plan = self.scheduler.plan(variant);
        let prepared = plan
            .iter()
            .map(|scheduled| prepare_stimuli(&self.ctx.pool, &scheduled.spec, &mut self.ctx.rng))
            .collect::<Result<Vec<_>, _>>();
        let sequences = match prepared {
            Ok(sequences) => sequences,
            Err(err) => return Self::failed(err),
        };

        let mut rows = Vec::new();
        let result = self.run_blocks(&plan, &sequences, &mut rows);
        let data = SessionData {
            info: self.info.clone(),
            variant,
            rows,
        };

        match result {
            Ok(()) => {
                tracing::info!(rows = data.rows.len(), "Session completed");
                SessionOutcome::Completed(data)
            }
            Err(Halt::Abort) => {
                tracing::warn!(rows = data.rows.len(), "Session aborted by participant");
                SessionOutcome::AbortedByUser(data)
            }
            Err(Halt::Failed(err)) => {
                tracing::warn!(rows = data.rows.len(), "Discarding rows of failed session");
                Self::failed(err)
            }
        }
    }

    fn failed(err: SessionError) -> SessionOutcome {
        tracing::error!(error = %err, "Session stopped by configuration error");
        SessionOutcome::ConfigurationError(err)
    }

    fn run_blocks(
        &mut self,
        plan: &[ScheduledBlock],
        sequences: &[Vec<Stimulus>],
        rows: &mut Vec<TrialResult>,
    ) -> Result<(), Halt> {
        if let Some(welcome) = self.scheduler.welcome().cloned() {
            self.show(&welcome)?;
        }
        for (scheduled, sequence) in plan.iter().zip(sequences) {
            if let Some(instruction) = &scheduled.instruction {
                self.show(instruction)?;
            }
            run_prepared(&mut self.ctx, &scheduled.spec, sequence, rows)?;
        }
        Ok(())
    }

    /// Shows the closing instruction, if any. Meant to run after the data
    /// has been written.
    pub fn finish(&mut self) -> Result<(), Halt> {
        match self.scheduler.farewell().cloned() {
            Some(farewell) => self.show(&farewell),
            None => Ok(()),
        }
    }

    fn show(&mut self, instruction: &Instruction) -> Result<(), Halt> {
        show_instruction(
            &mut self.ctx.screen,
            &mut self.ctx.keys,
            instruction,
            &self.ctx.settings.stop_keys,
            &self.ctx.settings.abort_key,
        )
    }

    pub fn context(&self) -> &SessionContext<S, K, T, R> {
        &self.ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(rows: Vec<TrialResult>) -> SessionData {
        SessionData {
            info: SessionInfo::new("p01", "B"),
            variant: OrderingVariant::Mirrored,
            rows,
        }
    }

    #[test]
    fn file_names_carry_condition_and_variant() {
        let d = data(Vec::new());
        assert_eq!(d.file_name(), "B_0.csv");
        assert_eq!(d.aborted_file_name(), "B_0_aborted.csv");
        assert_eq!(d.summary_file_name(), "B_0_summary.json");
    }

    #[test]
    fn csv_starts_with_metadata_and_header() {
        let d = data(vec![
            TrialResult {
                isi: 0.15,
                content: "me".to_string(),
                correct_on_first_try: true,
                reaction_time_secs: 0.5,
                block_name: "SelfOther".to_string(),
            },
            TrialResult {
                isi: 0.15,
                content: "them".to_string(),
                correct_on_first_try: false,
                reaction_time_secs: 0.25,
                block_name: "SelfOther".to_string(),
            },
        ]);
        let mut out = Vec::new();
        d.write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            [
                "p01,B",
                "ISI,Content,corrAns,RT,trialName",
                "0.15,me,1,0.5,SelfOther",
                "0.15,them,0,0.25,SelfOther",
            ]
        );
    }

    #[test]
    fn condition_must_be_configured() {
        let conditions = vec!["A".to_string(), "B".to_string()];
        assert!(SessionInfo::new("x", "A").validate(&conditions).is_ok());
        assert!(matches!(
            SessionInfo::new("x", "C").validate(&conditions),
            Err(SessionError::UnknownCondition(c)) if c == "C"
        ));
    }
}
