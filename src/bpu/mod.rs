//! Branch prediction unit.
//!
//! A closed family of prediction policies backed by one associative
//! engine: a [`TagArray`] maps a branch address to a slot holding that
//! policy's [`BpEntry`] state machine. Policies are selected by name
//! through [`Bpu::create`], which fails fast on an unknown name with a
//! diagnostic listing the supported set, the same discipline the
//! topology registry applies to channel wiring.
//!
//! Prediction is a pure peek: it never touches replacement order
//! (`lookup_no_touch`). Training is the mutating access: it touches LRU
//! state and allocates on a miss.

use serde::Deserialize;

/// Per-policy predictor entry state machines.
pub mod entry;

/// Set-associative tag array with peek/touch lookups.
pub mod tag_array;

use entry::BpEntry;
use tag_array::TagArray;

use crate::common::ConfigError;

/// The supported prediction policies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    StaticAlwaysTaken,
    StaticBackwardJumps,
    DynamicOneBit,
    DynamicTwoBit,
    AdaptiveTwoLevel,
}

/// Names accepted by [`Bpu::create`], in diagnostic order.
pub const POLICY_NAMES: &[&str] = &[
    "static_always_taken",
    "static_backward_jumps",
    "dynamic_one_bit",
    "dynamic_two_bit",
    "adaptive_two_level",
];

impl PolicyKind {
    /// Parses a policy name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "static_always_taken" => Some(PolicyKind::StaticAlwaysTaken),
            "static_backward_jumps" => Some(PolicyKind::StaticBackwardJumps),
            "dynamic_one_bit" => Some(PolicyKind::DynamicOneBit),
            "dynamic_two_bit" => Some(PolicyKind::DynamicTwoBit),
            "adaptive_two_level" => Some(PolicyKind::AdaptiveTwoLevel),
            _ => None,
        }
    }

    /// Canonical name of the policy.
    pub fn name(self) -> &'static str {
        match self {
            PolicyKind::StaticAlwaysTaken => "static_always_taken",
            PolicyKind::StaticBackwardJumps => "static_backward_jumps",
            PolicyKind::DynamicOneBit => "dynamic_one_bit",
            PolicyKind::DynamicTwoBit => "dynamic_two_bit",
            PolicyKind::AdaptiveTwoLevel => "adaptive_two_level",
        }
    }
}

/// A prediction, or a resolved outcome used for training.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BpUpdate {
    /// Address of the branch instruction.
    pub pc: u64,
    /// Predicted (or resolved) direction.
    pub is_taken: bool,
    /// Predicted (or resolved) target address.
    pub target: u64,
}

/// Cache-backed branch prediction engine for one policy.
#[derive(Debug)]
pub struct Bpu {
    kind: PolicyKind,
    tags: TagArray,
    /// Entry storage, `[set][way]`, parallel to the tag array.
    data: Vec<Vec<BpEntry>>,
}

impl Bpu {
    /// Branch addresses are tracked per 4-byte instruction slot; the tag
    /// array stores addresses only, not memory blocks.
    const GRANULARITY: u32 = 4;

    /// Instantiates the policy registered under `name`.
    ///
    /// Unknown names fail with a diagnostic carrying the full list of
    /// valid policy names; geometry errors propagate from the tag array.
    pub fn create(
        name: &str,
        size_in_entries: u32,
        ways: u32,
        address_bits: u32,
    ) -> Result<Self, ConfigError> {
        let Some(kind) = PolicyKind::from_name(name) else {
            return Err(ConfigError::UnknownPolicy {
                name: name.to_owned(),
                valid: POLICY_NAMES,
            });
        };
        Self::new(kind, size_in_entries, ways, address_bits)
    }

    /// Instantiates `kind` directly (configs deserialize to
    /// [`PolicyKind`], so they skip the name table).
    pub fn new(
        kind: PolicyKind,
        size_in_entries: u32,
        ways: u32,
        address_bits: u32,
    ) -> Result<Self, ConfigError> {
        let tags = TagArray::new(size_in_entries, ways, Self::GRANULARITY, address_bits)?;
        let data = vec![vec![BpEntry::fresh(kind); tags.ways()]; tags.sets()];
        Ok(Self { kind, tags, data })
    }

    /// The policy this engine runs.
    pub fn policy(&self) -> PolicyKind {
        self.kind
    }

    /// Predicted direction for the branch at `pc`.
    ///
    /// A miss predicts not taken. Pure peek: replacement order is not
    /// updated on prediction.
    pub fn is_taken(&self, pc: u64) -> bool {
        match self.tags.lookup_no_touch(pc) {
            Some(way) => self.data[self.tags.set(pc)][way].is_taken(pc),
            None => false,
        }
    }

    /// Predicted target for the branch at `pc`.
    ///
    /// The stored target is only meaningful when the branch is predicted
    /// taken; otherwise the fall-through `pc + 4` is returned.
    pub fn target(&self, pc: u64) -> u64 {
        if let Some(way) = self.tags.lookup_no_touch(pc) {
            if self.is_taken(pc) {
                return self.data[self.tags.set(pc)][way].target();
            }
        }
        pc + 4
    }

    /// Full prediction record for the branch at `pc`.
    pub fn predict(&self, pc: u64) -> BpUpdate {
        BpUpdate {
            pc,
            is_taken: self.is_taken(pc),
            target: self.target(pc),
        }
    }

    /// Trains the engine with a resolved branch outcome.
    ///
    /// This is the touching access: a hit refreshes LRU order, a miss
    /// evicts the least recently used way, resets its entry and trains it
    /// from scratch.
    pub fn update(&mut self, outcome: &BpUpdate) {
        let set = self.tags.set(outcome.pc);
        let way = match self.tags.lookup(outcome.pc) {
            Some(way) => way,
            None => {
                let way = self.tags.allocate(outcome.pc);
                self.data[set][way].reset();
                way
            }
        };
        self.data[set][way].update(outcome.is_taken, outcome.target);
    }
}
