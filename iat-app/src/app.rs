use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use iat_core::Key;
use iat_experiment::{
    BlockScheduler, ExperimentConfig, MetadataPrompt, Session, SessionContext, SessionData,
    SessionOutcome, StimulusPool, TrialSettings, list_images, summarize,
};
use iat_timing::HighPrecisionTimer;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

use crate::Args;
use crate::console::{ConsoleKeys, ConsolePrompt, ConsoleScreen};

/// Exit code for a session stopped by the abort key.
const EXIT_ABORTED: u8 = 2;

#[derive(Serialize)]
struct SummaryFile<'a> {
    id: &'a str,
    condition: &'a str,
    variant: usize,
    blocks: Vec<iat_experiment::BlockSummary>,
}

pub struct App {
    config: ExperimentConfig,
    pool: StimulusPool,
    id: Option<String>,
    condition: Option<String>,
    seed: Option<u64>,
}

impl App {
    pub fn new(args: Args) -> Result<Self> {
        let mut config = ExperimentConfig::load_or_default(args.config.as_deref())
            .context("loading experiment configuration")?;
        if let Some(stimuli) = args.stimuli {
            config.stimuli = stimuli;
        }
        if let Some(output_dir) = args.output_dir {
            config.output_dir = output_dir;
        }
        config.validate()?;

        let pool = StimulusPool::load(&config.stimuli)
            .with_context(|| format!("loading stimuli from {}", config.stimuli.display()))?;
        log_instruction_images(&config);

        Ok(Self {
            config,
            pool,
            id: args.id,
            condition: args.condition,
            seed: args.seed,
        })
    }

    pub fn run(self) -> Result<ExitCode> {
        let Self {
            config,
            pool,
            id,
            condition,
            seed,
        } = self;

        let info = ConsolePrompt::new(io::stdin().lock(), io::stdout())
            .with_presets(id, condition)
            .capture(&config.title, &config.conditions);
        let Some(info) = info else {
            tracing::info!("Metadata entry cancelled, nothing recorded");
            return Ok(ExitCode::SUCCESS);
        };
        info.validate(&config.conditions)?;
        let scheduler = BlockScheduler::from_config(&config)?;

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let abort_key = Key::from(config.abort_key.as_str());
        let ctx = SessionContext::new(
            ConsoleScreen::new(io::stdout()),
            ConsoleKeys::new(io::stdin().lock(), abort_key),
            HighPrecisionTimer::new(),
            rng,
            pool,
        )
        .with_settings(TrialSettings::from_config(&config));

        let mut session = Session::new(ctx, scheduler, info);
        match session.run() {
            SessionOutcome::Completed(data) => {
                persist(&config, &data, &data.file_name())?;
                if config.write_summary {
                    write_summary(&config.output_dir, &data)?;
                }
                if session.finish().is_err() {
                    tracing::debug!("Input ended on the closing screen");
                }
                Ok(ExitCode::SUCCESS)
            }
            SessionOutcome::AbortedByUser(data) => {
                if config.save_partial_on_abort {
                    persist(&config, &data, &data.aborted_file_name())?;
                } else {
                    tracing::warn!(rows = data.rows.len(), "Discarding rows of aborted session");
                }
                Ok(ExitCode::from(EXIT_ABORTED))
            }
            SessionOutcome::ConfigurationError(err) => Err(err.into()),
        }
    }
}

fn persist(config: &ExperimentConfig, data: &SessionData, name: &str) -> Result<()> {
    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("creating {}", config.output_dir.display()))?;
    let path = config.output_dir.join(name);
    data.save(&path)
        .with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), rows = data.rows.len(), "Data saved");
    Ok(())
}

fn write_summary(dir: &Path, data: &SessionData) -> Result<()> {
    let summary = SummaryFile {
        id: &data.info.id,
        condition: &data.info.condition,
        variant: data.variant.index(),
        blocks: summarize(&data.rows),
    };
    let path = dir.join(data.summary_file_name());
    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &summary)?;
    tracing::info!(path = %path.display(), "Summary saved");
    Ok(())
}

/// Lists the images next to the main instruction so a missing asset folder
/// shows up before the participant sits down.
fn log_instruction_images(config: &ExperimentConfig) {
    let Some(dir) = config
        .instructions
        .main
        .as_deref()
        .and_then(|main| Path::new(main).parent())
        .filter(|dir| !dir.as_os_str().is_empty())
    else {
        return;
    };
    match list_images(dir) {
        Ok(images) => tracing::debug!(dir = %dir.display(), count = images.len(), "Instruction images"),
        Err(err) => tracing::warn!(dir = %dir.display(), error = %err, "Cannot list instruction images"),
    }
}
