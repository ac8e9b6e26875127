pub mod block;
pub mod config;
pub mod error;
pub mod frontend;
pub mod instruction;
pub mod mapper;
pub mod pool;
pub mod schedule;
pub mod session;
pub mod summary;
pub mod trial;

pub use block::{BlockSpec, prepare_stimuli, run_block, run_prepared};
pub use config::{ExperimentConfig, InstructionsConfig, IsiJitter};
pub use error::{ConfigError, Halt, PoolError, SessionError};
pub use frontend::{KeySource, MetadataPrompt, Screen};
pub use instruction::{Instruction, list_images};
pub use mapper::ResponseMappings;
pub use pool::{StimulusPool, compensate, deneighbor, sample_without_replacement};
pub use schedule::{BlockCatalog, BlockScheduler, OrderingVariant, ScheduledBlock};
pub use session::{Session, SessionContext, SessionData, SessionInfo, SessionOutcome};
pub use summary::{BlockSummary, summarize};
pub use trial::{Response, TrialSettings, run_trial, score};
