//! The fixed seven-block IAT catalog and its two running orders.

use std::fmt;

use iat_core::{AnchorSet, Label};
use rand::Rng;

use crate::block::BlockSpec;
use crate::config::ExperimentConfig;
use crate::error::SessionError;
use crate::instruction::Instruction;
use crate::mapper::ResponseMappings;

/// Number of blocks in the catalog and in every running order.
pub const BLOCK_COUNT: usize = 7;

/// A slot of a running order: which catalog block, and whether it runs with
/// the extended trial count instead of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    block: usize,
    extended: bool,
}

const fn slot(block: usize) -> Slot {
    Slot {
        block,
        extended: false,
    }
}

const fn long(block: usize) -> Slot {
    Slot {
        block,
        extended: true,
    }
}

/// Running orders, indexed by [`OrderingVariant::index`].
const ORDERS: [[Slot; BLOCK_COUNT]; 2] = [
    [slot(5), slot(2), slot(6), slot(7), long(1), slot(3), slot(4)],
    [slot(1), slot(2), slot(3), slot(4), long(5), slot(6), slot(7)],
];

/// Which of the two running orders a session uses; drawn once per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderingVariant {
    /// Blocks `5, 2, 6, 7, 1, 3, 4`.
    Mirrored = 0,
    /// Blocks `1, 2, 3, 4, 5, 6, 7`.
    Canonical = 1,
}

impl OrderingVariant {
    /// A single fair binary draw.
    pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.random_bool(0.5) {
            Self::Canonical
        } else {
            Self::Mirrored
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Catalog block numbers in running order.
    pub fn block_order(self) -> [usize; BLOCK_COUNT] {
        ORDERS[self.index()].map(|s| s.block)
    }
}

impl fmt::Display for OrderingVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// Picks `items` by 1-based position. Positions outside `1..=items.len()` are skipped.
pub fn order_by<T: Clone>(items: &[T], order: &[usize]) -> Vec<T> {
    order
        .iter()
        .filter_map(|&n| n.checked_sub(1).and_then(|i| items.get(i)))
        .cloned()
        .collect()
}

/// The seven block configurations, numbered from 1.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockCatalog {
    blocks: Vec<BlockSpec>,
}

impl BlockCatalog {
    /// Builds the catalog for labels `[l0, l1, l2, l3]`.
    ///
    /// Anchors put every category on the side of the key it is scored with,
    /// left for the first key binding.
    pub fn build(labels: &[Label; 4], mappings: &ResponseMappings, trials: usize, extended: usize) -> Self {
        let [l0, l1, l2, l3] = labels;
        let first = vec![l0.clone(), l1.clone()];
        let second = vec![l2.clone(), l3.clone()];
        let all = labels.to_vec();

        let combined_a = AnchorSet::four_way(l3, l1, l2, l0);
        let combined_b = AnchorSet::four_way(l0, l3, l1, l2);

        let blocks = vec![
            BlockSpec::new(
                "SelfOther",
                AnchorSet::two_way(l1, l0),
                mappings.inverse_1.clone(),
                first.clone(),
            )
            .with_trials(trials),
            BlockSpec::new(
                "LibSci",
                AnchorSet::two_way(l3, l2),
                mappings.inverse_2.clone(),
                second,
            )
            .with_trials(trials),
            BlockSpec::new(
                "LibSelfSciOther",
                combined_a.clone(),
                mappings.union_a.clone(),
                all.clone(),
            )
            .with_trials(trials),
            BlockSpec::new(
                "LibSelfSciOther40",
                combined_a,
                mappings.union_a.clone(),
                all.clone(),
            )
            .with_trials(extended),
            BlockSpec::new(
                "OtherSelf",
                AnchorSet::two_way(l0, l1),
                mappings.base_1.clone(),
                first,
            )
            .with_trials(trials),
            BlockSpec::new(
                "OtherLibSelfSci",
                combined_b.clone(),
                mappings.union_b.clone(),
                all.clone(),
            )
            .with_trials(trials),
            BlockSpec::new(
                "OtherLibSelfSci40",
                combined_b,
                mappings.union_b.clone(),
                all,
            )
            .with_trials(extended),
        ];

        Self { blocks }
    }

    pub fn from_config(config: &ExperimentConfig) -> Self {
        let labels: [Label; 4] = std::array::from_fn(|i| {
            Label::from(config.labels.get(i).map(String::as_str).unwrap_or_default())
        });
        let mappings = ResponseMappings::build(&config.labels, &config.keybindings);
        Self::build(&labels, &mappings, config.trials, config.extended_trials)
    }

    /// Block by its 1-based catalog number.
    pub fn get(&self, number: usize) -> Option<&BlockSpec> {
        number.checked_sub(1).and_then(|i| self.blocks.get(i))
    }

    pub fn blocks(&self) -> &[BlockSpec] {
        &self.blocks
    }
}

/// An instruction screen (if any) followed by the block it introduces.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledBlock {
    pub instruction: Option<Instruction>,
    pub spec: BlockSpec,
}

/// Turns the catalog and instruction assets into the full running order.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockScheduler {
    catalog: BlockCatalog,
    instructions: Vec<Option<Instruction>>,
    welcome: Option<Instruction>,
    farewell: Option<Instruction>,
    extended_trials: usize,
}

impl BlockScheduler {
    /// `instructions[n]` introduces catalog block `n + 1`; missing entries mean
    /// the block starts without one.
    pub fn new(
        catalog: BlockCatalog,
        instructions: Vec<Option<Instruction>>,
        extended_trials: usize,
    ) -> Self {
        Self {
            catalog,
            instructions,
            welcome: None,
            farewell: None,
            extended_trials,
        }
    }

    pub fn with_welcome(mut self, welcome: Option<Instruction>) -> Self {
        self.welcome = welcome;
        self
    }

    pub fn with_farewell(mut self, farewell: Option<Instruction>) -> Self {
        self.farewell = farewell;
        self
    }

    /// Fails on an instruction asset that is neither text nor image.
    pub fn from_config(config: &ExperimentConfig) -> Result<Self, SessionError> {
        let parse = |asset: &Option<String>| asset.as_deref().map(Instruction::from_asset).transpose();
        let instructions = config
            .instructions
            .blocks
            .iter()
            .map(parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(
            BlockCatalog::from_config(config),
            instructions,
            config.extended_trials,
        )
        .with_welcome(parse(&config.instructions.main)?)
        .with_farewell(parse(&config.instructions.end)?))
    }

    pub fn catalog(&self) -> &BlockCatalog {
        &self.catalog
    }

    pub fn welcome(&self) -> Option<&Instruction> {
        self.welcome.as_ref()
    }

    pub fn farewell(&self) -> Option<&Instruction> {
        self.farewell.as_ref()
    }

    /// The seven instruction/block pairs for `variant`, in running order.
    pub fn plan(&self, variant: OrderingVariant) -> Vec<ScheduledBlock> {
        let slots = &ORDERS[variant.index()];
        let numbers: Vec<usize> = slots.iter().map(|s| s.block).collect();
        let specs = order_by(self.catalog.blocks(), &numbers);

        specs
            .into_iter()
            .zip(slots)
            .map(|(spec, slot)| ScheduledBlock {
                instruction: self.instructions.get(slot.block - 1).cloned().flatten(),
                spec: if slot.extended {
                    spec.with_trials(self.extended_trials)
                } else {
                    spec
                },
            })
            .collect()
    }
}
