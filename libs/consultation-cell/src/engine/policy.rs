//! Turn policy: which phase of the flow a given turn count is in.
//!
//! A strictly one-directional machine driven entirely by the
//! caller-supplied turn counter:
//! Normal -> SoftGate -> Normal -> HardStop -> PostHardStop.
//! There is no backward transition; a fresh turn count is the only way
//! to re-enter Normal.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Ordinary exchange; reply generated normally.
    Normal,
    /// Login is encouraged but the conversation continues.
    SoftGate,
    /// Final turn: the reply is the closing analysis and the session ends.
    HardStop,
    /// Session already concluded; no provider call, fixed message only.
    PostHardStop,
}

#[derive(Debug, Clone, Copy)]
pub struct TurnPolicy {
    soft_gate_turn: u32,
    hard_stop_turn: u32,
}

impl TurnPolicy {
    pub fn new(soft_gate_turn: u32, hard_stop_turn: u32) -> Self {
        debug_assert!(soft_gate_turn < hard_stop_turn);
        Self {
            soft_gate_turn,
            hard_stop_turn,
        }
    }

    pub fn decide(&self, turn_count: u32) -> Phase {
        if turn_count > self.hard_stop_turn {
            Phase::PostHardStop
        } else if turn_count == self.hard_stop_turn {
            Phase::HardStop
        } else if turn_count == self.soft_gate_turn {
            Phase::SoftGate
        } else {
            Phase::Normal
        }
    }
}
