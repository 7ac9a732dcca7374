// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Circuit round/rest sub-machine.
//!
//! ```text
//! Idle ──complete(1)──► Resting ──tick…0──► RoundInProgress(2) ──complete(2)──► …
//!                                                 │
//!                                   complete(R) ──┴──► AllRoundsComplete
//! ```
//!
//! The machine is driven by explicit calls only. The one-second rest tick is
//! delivered by whoever owns the machine (see the session runner), so the
//! machine itself never spawns or sleeps.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::plan::CircuitConfig;

/// Where a circuit currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CircuitState {
    /// Before the first round.
    Idle,
    RoundInProgress { round: u32 },
    /// Counting down before `next_round` starts.
    Resting { next_round: u32, remaining_secs: u32 },
    AllRoundsComplete,
}

/// Result of completing a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    /// Rest started with this many seconds on the clock.
    Resting { next_round: u32, rest_secs: u32 },
    /// No rest configured, the next round started immediately.
    NextRound { round: u32 },
    /// The final round was completed.
    AllRoundsComplete,
}

/// Result of one rest tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing to count down.
    NotResting,
    Counting { remaining_secs: u32 },
    /// The countdown hit zero and this round is now in progress.
    RestOver { round: u32 },
}

/// Round progression for one circuit group.
#[derive(Debug, Clone)]
pub struct CircuitMachine {
    config: CircuitConfig,
    state: CircuitState,
}

impl CircuitMachine {
    pub fn new(config: CircuitConfig) -> Self {
        CircuitMachine {
            config,
            state: CircuitState::Idle,
        }
    }

    pub fn number(&self) -> u32 {
        self.config.number
    }

    pub fn config(&self) -> &CircuitConfig {
        &self.config
    }

    pub fn state(&self) -> CircuitState {
        self.state
    }

    pub fn is_complete(&self) -> bool {
        self.state == CircuitState::AllRoundsComplete
    }

    pub fn is_resting(&self) -> bool {
        matches!(self.state, CircuitState::Resting { .. })
    }

    /// Number of rounds finished so far.
    pub fn rounds_done(&self) -> u32 {
        match self.state {
            CircuitState::Idle => 0,
            CircuitState::RoundInProgress { round } => round - 1,
            CircuitState::Resting { next_round, .. } => next_round - 1,
            CircuitState::AllRoundsComplete => self.config.rounds,
        }
    }

    /// The round `complete_round` will accept next, if any.
    pub fn expected_round(&self) -> Option<u32> {
        match self.state {
            CircuitState::Idle => Some(1),
            CircuitState::RoundInProgress { round } => Some(round),
            CircuitState::Resting { .. } | CircuitState::AllRoundsComplete => None,
        }
    }

    /// Seconds shown on the rest display: the live countdown while resting,
    /// the configured rest otherwise.
    pub fn countdown_display(&self) -> u32 {
        match self.state {
            CircuitState::Resting { remaining_secs, .. } => remaining_secs,
            _ => self.config.rest_secs,
        }
    }

    /// Marks round `n` as done.
    ///
    /// Rejected without any state change unless `n` is exactly the round the
    /// machine expects.
    pub fn complete_round(&mut self, n: u32) -> Result<RoundOutcome> {
        if self.expected_round() != Some(n) || n > self.config.rounds {
            return Err(Error::RoundOutOfOrder {
                circuit: self.config.number,
                expected: self.describe_expectation(),
                got: n,
            });
        }

        let outcome = if n == self.config.rounds {
            self.state = CircuitState::AllRoundsComplete;
            RoundOutcome::AllRoundsComplete
        } else if self.config.rest_secs == 0 {
            self.state = CircuitState::RoundInProgress { round: n + 1 };
            RoundOutcome::NextRound { round: n + 1 }
        } else {
            self.state = CircuitState::Resting {
                next_round: n + 1,
                remaining_secs: self.config.rest_secs,
            };
            RoundOutcome::Resting {
                next_round: n + 1,
                rest_secs: self.config.rest_secs,
            }
        };
        Ok(outcome)
    }

    /// Advances the rest countdown by one second.
    pub fn tick(&mut self) -> TickOutcome {
        match self.state {
            CircuitState::Resting {
                next_round,
                remaining_secs,
            } => {
                let remaining_secs = remaining_secs.saturating_sub(1);
                if remaining_secs == 0 {
                    self.state = CircuitState::RoundInProgress { round: next_round };
                    TickOutcome::RestOver { round: next_round }
                } else {
                    self.state = CircuitState::Resting {
                        next_round,
                        remaining_secs,
                    };
                    TickOutcome::Counting { remaining_secs }
                }
            }
            _ => TickOutcome::NotResting,
        }
    }

    /// Puts the machine back into a state saved by an earlier run.
    ///
    /// Rejects states this circuit's configuration could never reach.
    pub fn restore(&mut self, state: CircuitState) -> Result<()> {
        let rounds = self.config.rounds;
        let reachable = match state {
            CircuitState::Idle | CircuitState::AllRoundsComplete => true,
            CircuitState::RoundInProgress { round } => (1..=rounds).contains(&round),
            CircuitState::Resting {
                next_round,
                remaining_secs,
            } => {
                (2..=rounds).contains(&next_round)
                    && remaining_secs > 0
                    && remaining_secs <= self.config.rest_secs
            }
        };
        if !reachable {
            return Err(Error::CorruptedData(format!(
                "circuit {} with {} rounds cannot be in state {:?}",
                self.config.number, rounds, state
            )));
        }
        self.state = state;
        Ok(())
    }

    /// Ends the current rest early. Returns the round now in progress.
    pub fn skip_rest(&mut self) -> Result<u32> {
        match self.state {
            CircuitState::Resting { next_round, .. } => {
                self.state = CircuitState::RoundInProgress { round: next_round };
                Ok(next_round)
            }
            _ => Err(Error::InvalidInput(format!(
                "circuit {} is not resting",
                self.config.number
            ))),
        }
    }

    fn describe_expectation(&self) -> String {
        match self.state {
            CircuitState::Idle => "round 1".to_string(),
            CircuitState::RoundInProgress { round } => format!("round {}", round),
            CircuitState::Resting { next_round, .. } => {
                format!("the rest before round {} to finish", next_round)
            }
            CircuitState::AllRoundsComplete => "nothing, all rounds are complete".to_string(),
        }
    }
}

#[cfg(test)]
#[path = "circuit_tests.rs"]
mod tests;
