// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Exercise plans and their normalization.
//!
//! The remote store expresses a session's plan in one of two shapes: a
//! single workout, or a program composed of ordered workout segments
//! (warm-up, main, cool-down, ...). [`normalize`] resolves either shape once
//! into a [`SessionPlan`], a flat ordered list of entries that the lifecycle
//! and circuit machines consume without knowing where an entry came from.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// How a workout is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutKind {
    /// Exercises done one after another, set by set.
    Classic,
    /// A group of exercises repeated for a fixed number of rounds.
    Circuit,
}

/// Role of a segment inside a composed program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    WarmUp,
    Main,
    CoolDown,
    Other,
}

impl SegmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentKind::WarmUp => "warm_up",
            SegmentKind::Main => "main",
            SegmentKind::CoolDown => "cool_down",
            SegmentKind::Other => "other",
        }
    }
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Origin of a flattened entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentTag {
    pub segment_id: String,
    pub kind: SegmentKind,
}

/// Round and rest parameters for one circuit group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitConfig {
    /// Circuit grouping number, unique within a plan.
    pub number: u32,
    /// Total rounds (positive).
    pub rounds: u32,
    /// Rest between rounds in seconds.
    pub rest_secs: u32,
}

impl CircuitConfig {
    pub fn new(number: u32, rounds: u32, rest_secs: u32) -> Result<Self> {
        if rounds == 0 {
            return Err(Error::InvalidInput(format!(
                "circuit {} must have at least one round",
                number
            )));
        }
        Ok(CircuitConfig {
            number,
            rounds,
            rest_secs,
        })
    }
}

/// One exercise occurrence within a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanEntry {
    /// Order index within the source workout.
    pub order: u32,
    pub exercise_id: String,
    #[serde(default)]
    pub exercise_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tempo: Option<String>,
    /// Coach notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Circuit grouping for circuit workouts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circuit: Option<u32>,
    /// Index in the flattened view. Assigned by [`normalize`].
    #[serde(default)]
    pub position: usize,
    /// Segment this entry came from. Assigned by [`normalize`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment: Option<SegmentTag>,
}

impl PlanEntry {
    pub fn new(order: u32, exercise_id: impl Into<String>) -> Self {
        PlanEntry {
            order,
            exercise_id: exercise_id.into(),
            exercise_name: String::new(),
            reps: None,
            duration_secs: None,
            load: None,
            tempo: None,
            notes: None,
            circuit: None,
            position: 0,
            segment: None,
        }
    }

    pub fn with_circuit(mut self, circuit: u32) -> Self {
        self.circuit = Some(circuit);
        self
    }

    /// Short prescription text (`10 reps @ 20`, `45s`).
    pub fn prescription(&self) -> String {
        let mut parts = Vec::new();
        if let Some(reps) = self.reps {
            parts.push(format!("{} reps", reps));
        }
        if let Some(secs) = self.duration_secs {
            parts.push(format!("{}s", secs));
        }
        if let Some(load) = self.load {
            parts.push(format!("@ {}", load));
        }
        if let Some(tempo) = &self.tempo {
            parts.push(format!("tempo {}", tempo));
        }
        parts.join(" ")
    }
}

/// A single workout as stored remotely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub kind: WorkoutKind,
    #[serde(default)]
    pub entries: Vec<PlanEntry>,
    /// Rounds for a single-circuit workout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rounds: Option<u32>,
    /// Rest between rounds for a single-circuit workout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_secs: Option<u32>,
    /// Per-group configuration when several circuits are combined.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub circuits: Vec<CircuitConfig>,
}

impl Workout {
    /// Resolves the circuit configuration list for this workout.
    ///
    /// An explicit multi-circuit list wins; otherwise a circuit workout gets
    /// one group numbered 1 built from `rounds`/`rest_secs`. Circuit numbers
    /// must be unique within the workout.
    pub fn circuit_configs(&self) -> Result<Vec<CircuitConfig>> {
        if self.kind == WorkoutKind::Classic {
            return Ok(Vec::new());
        }
        if !self.circuits.is_empty() {
            let mut configs: Vec<CircuitConfig> = Vec::with_capacity(self.circuits.len());
            for c in &self.circuits {
                if configs.iter().any(|seen| seen.number == c.number) {
                    return Err(Error::InvalidInput(format!(
                        "workout {} defines circuit {} more than once",
                        self.id, c.number
                    )));
                }
                configs.push(CircuitConfig::new(c.number, c.rounds, c.rest_secs)?);
            }
            return Ok(configs);
        }
        let rounds = self.rounds.ok_or_else(|| {
            Error::InvalidInput(format!("circuit workout {} has no round count", self.id))
        })?;
        Ok(vec![CircuitConfig::new(1, rounds, self.rest_secs.unwrap_or(0))?])
    }
}

/// One segment of a composed program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: String,
    pub kind: SegmentKind,
    /// Order of the segment within the program.
    pub position: u32,
    pub workout: Workout,
}

/// The two upstream plan shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamPlan {
    Single(Workout),
    Composed(Vec<Segment>),
}

/// Canonical flattened plan for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionPlan {
    pub kind: WorkoutKind,
    pub entries: Vec<PlanEntry>,
    #[serde(default)]
    pub circuits: Vec<CircuitConfig>,
}

impl SessionPlan {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_circuit(&self) -> bool {
        self.kind == WorkoutKind::Circuit
    }

    pub fn entry(&self, position: usize) -> Result<&PlanEntry> {
        self.entries
            .get(position)
            .ok_or(Error::NoSuchEntry(position))
    }

    pub fn circuit(&self, number: u32) -> Result<&CircuitConfig> {
        self.circuits
            .iter()
            .find(|c| c.number == number)
            .ok_or(Error::NoSuchCircuit(number))
    }

    /// Entries that are not part of any circuit and therefore need an
    /// individual completion signal.
    pub fn standalone_entries(&self) -> impl Iterator<Item = &PlanEntry> {
        self.entries.iter().filter(|e| e.circuit.is_none())
    }
}

/// Resolves an upstream plan into the flattened session view.
pub fn normalize(session_id: &str, upstream: UpstreamPlan) -> Result<SessionPlan> {
    let plan = match upstream {
        UpstreamPlan::Single(workout) => {
            let mut flat = Flattener::default();
            flat.push_workout(workout, None)?;
            flat.finish()
        }
        UpstreamPlan::Composed(mut segments) => {
            segments.sort_by_key(|s| s.position);
            let mut flat = Flattener::default();
            for segment in segments {
                let tag = SegmentTag {
                    segment_id: segment.id,
                    kind: segment.kind,
                };
                flat.push_workout(segment.workout, Some(tag))?;
            }
            flat.finish()
        }
    };

    if plan.is_empty() {
        return Err(Error::EmptyPlan(session_id.to_string()));
    }
    Ok(plan)
}

#[derive(Default)]
struct Flattener {
    entries: Vec<PlanEntry>,
    circuits: Vec<CircuitConfig>,
    any_circuit: bool,
}

impl Flattener {
    fn push_workout(&mut self, workout: Workout, tag: Option<SegmentTag>) -> Result<()> {
        let configs = workout.circuit_configs()?;
        // Circuit numbers restart in every workout. The flattened view numbers
        // them 1, 2, ... in plan order, local number -> plan number.
        let renumbered: Vec<(u32, u32)> = configs
            .iter()
            .zip(self.circuits.len() as u32 + 1..)
            .map(|(c, number)| (c.number, number))
            .collect();
        let default_circuit = configs.first().map(|c| c.number);

        if workout.kind == WorkoutKind::Circuit {
            self.any_circuit = true;
        }

        let mut entries = workout.entries;
        entries.sort_by_key(|e| e.order);

        for mut entry in entries {
            entry.circuit = match workout.kind {
                WorkoutKind::Classic => None,
                WorkoutKind::Circuit => {
                    let local = entry.circuit.or(default_circuit).ok_or_else(|| {
                        Error::InvalidInput(format!("workout {} has no circuits", workout.id))
                    })?;
                    let number = renumbered
                        .iter()
                        .find(|(from, _)| *from == local)
                        .map(|(_, to)| *to)
                        .ok_or_else(|| {
                            Error::InvalidInput(format!(
                                "exercise {} in workout {} references unknown circuit {}",
                                entry.exercise_id, workout.id, local
                            ))
                        })?;
                    Some(number)
                }
            };
            entry.position = self.entries.len();
            entry.segment = tag.clone();
            self.entries.push(entry);
        }

        self.circuits.extend(
            configs
                .into_iter()
                .zip(renumbered)
                .map(|(c, (_, number))| CircuitConfig { number, ..c }),
        );
        Ok(())
    }

    fn finish(self) -> SessionPlan {
        SessionPlan {
            kind: if self.any_circuit {
                WorkoutKind::Circuit
            } else {
                WorkoutKind::Classic
            },
            entries: self.entries,
            circuits: self.circuits,
        }
    }
}

#[cfg(test)]
#[path = "plan_tests.rs"]
mod tests;
