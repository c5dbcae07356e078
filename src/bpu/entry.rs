//! Predictor entry state machines.
//!
//! The policy set is closed, so each policy is a variant of one enum
//! rather than an open trait hierarchy; the cache-backed engine in
//! [`super`] is generic over nothing and simply stores these entries.

use super::PolicyKind;

/// Two-bit saturating counter state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CounterState {
    StrongNotTaken,
    WeakNotTaken,
    WeakTaken,
    StrongTaken,
}

impl CounterState {
    /// Prediction encoded by this state.
    pub fn is_taken(self) -> bool {
        matches!(self, CounterState::WeakTaken | CounterState::StrongTaken)
    }

    /// Saturating move toward the observed outcome.
    pub fn train(self, taken: bool) -> Self {
        use CounterState::*;
        match (self, taken) {
            (StrongNotTaken, false) => StrongNotTaken,
            (StrongNotTaken, true) => WeakNotTaken,
            (WeakNotTaken, false) => StrongNotTaken,
            (WeakNotTaken, true) => WeakTaken,
            (WeakTaken, false) => WeakNotTaken,
            (WeakTaken, true) => StrongTaken,
            (StrongTaken, false) => WeakTaken,
            (StrongTaken, true) => StrongTaken,
        }
    }
}

/// Local history depth of the adaptive two-level policy.
const ADAPTIVE_DEPTH: usize = 2;
const ADAPTIVE_PATTERNS: usize = 1 << ADAPTIVE_DEPTH;
const ADAPTIVE_HISTORY_MASK: u8 = (ADAPTIVE_PATTERNS - 1) as u8;

/// One branch's prediction state under a specific policy.
#[derive(Clone, Debug)]
pub enum BpEntry {
    /// Static: every known branch is predicted taken.
    AlwaysTaken { target: u64 },
    /// Static: backward branches (target below the branch) are predicted
    /// taken, forward branches not taken.
    BackwardJumps { target: u64 },
    /// Dynamic: repeats the last observed outcome.
    OneBit { taken: bool, target: u64 },
    /// Dynamic: two-bit saturating counter.
    TwoBit { state: CounterState, target: u64 },
    /// Adaptive: per-branch local history of depth 2 selecting one of four
    /// two-bit counters.
    TwoLevel {
        history: u8,
        counters: [CounterState; ADAPTIVE_PATTERNS],
        target: u64,
    },
}

impl BpEntry {
    /// Initial state of an entry under `kind`.
    pub fn fresh(kind: PolicyKind) -> Self {
        match kind {
            PolicyKind::StaticAlwaysTaken => BpEntry::AlwaysTaken { target: 0 },
            PolicyKind::StaticBackwardJumps => BpEntry::BackwardJumps { target: 0 },
            PolicyKind::DynamicOneBit => BpEntry::OneBit {
                taken: false,
                target: 0,
            },
            PolicyKind::DynamicTwoBit => BpEntry::TwoBit {
                state: CounterState::WeakNotTaken,
                target: 0,
            },
            PolicyKind::AdaptiveTwoLevel => BpEntry::TwoLevel {
                history: 0,
                counters: [CounterState::WeakNotTaken; ADAPTIVE_PATTERNS],
                target: 0,
            },
        }
    }

    /// Clears training state, keeping the variant. Used when a cache slot
    /// is re-allocated to a different branch.
    pub fn reset(&mut self) {
        *self = BpEntry::fresh(self.kind());
    }

    fn kind(&self) -> PolicyKind {
        match self {
            BpEntry::AlwaysTaken { .. } => PolicyKind::StaticAlwaysTaken,
            BpEntry::BackwardJumps { .. } => PolicyKind::StaticBackwardJumps,
            BpEntry::OneBit { .. } => PolicyKind::DynamicOneBit,
            BpEntry::TwoBit { .. } => PolicyKind::DynamicTwoBit,
            BpEntry::TwoLevel { .. } => PolicyKind::AdaptiveTwoLevel,
        }
    }

    /// Prediction for the branch at `pc`.
    pub fn is_taken(&self, pc: u64) -> bool {
        match self {
            BpEntry::AlwaysTaken { .. } => true,
            BpEntry::BackwardJumps { target } => *target < pc,
            BpEntry::OneBit { taken, .. } => *taken,
            BpEntry::TwoBit { state, .. } => state.is_taken(),
            BpEntry::TwoLevel {
                history, counters, ..
            } => counters[*history as usize].is_taken(),
        }
    }

    /// Last trained target of the branch.
    pub fn target(&self) -> u64 {
        match self {
            BpEntry::AlwaysTaken { target }
            | BpEntry::BackwardJumps { target }
            | BpEntry::OneBit { target, .. }
            | BpEntry::TwoBit { target, .. }
            | BpEntry::TwoLevel { target, .. } => *target,
        }
    }

    /// Trains the entry with a resolved outcome. The target is recorded on
    /// every update.
    pub fn update(&mut self, taken: bool, new_target: u64) {
        match self {
            BpEntry::AlwaysTaken { target } | BpEntry::BackwardJumps { target } => {
                *target = new_target;
            }
            BpEntry::OneBit { taken: last, target } => {
                *last = taken;
                *target = new_target;
            }
            BpEntry::TwoBit { state, target } => {
                *state = state.train(taken);
                *target = new_target;
            }
            BpEntry::TwoLevel {
                history,
                counters,
                target,
            } => {
                let pattern = *history as usize;
                counters[pattern] = counters[pattern].train(taken);
                *history = ((*history << 1) | u8::from(taken)) & ADAPTIVE_HISTORY_MASK;
                *target = new_target;
            }
        }
    }
}
