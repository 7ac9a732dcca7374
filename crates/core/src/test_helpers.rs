// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for rp-core tests.

use crate::plan::{CircuitConfig, PlanEntry, Segment, SegmentKind, Workout, WorkoutKind};

/// Classic workout with one entry per exercise id, in the given order.
pub fn classic_workout(id: &str, exercises: &[&str]) -> Workout {
    Workout {
        id: id.to_string(),
        name: format!("Workout {}", id),
        kind: WorkoutKind::Classic,
        entries: exercises
            .iter()
            .enumerate()
            .map(|(i, ex)| PlanEntry::new(i as u32 + 1, *ex))
            .collect(),
        rounds: None,
        rest_secs: None,
        circuits: Vec::new(),
    }
}

/// Single-circuit workout.
pub fn circuit_workout(id: &str, exercises: &[&str], rounds: u32, rest_secs: u32) -> Workout {
    Workout {
        kind: WorkoutKind::Circuit,
        rounds: Some(rounds),
        rest_secs: Some(rest_secs),
        ..classic_workout(id, exercises)
    }
}

/// Circuit workout made of several groups, one exercise list per config.
pub fn multi_circuit_workout(id: &str, groups: &[(&[&str], CircuitConfig)]) -> Workout {
    let mut entries = Vec::new();
    for (exercises, config) in groups {
        for ex in exercises.iter() {
            let order = entries.len() as u32 + 1;
            entries.push(PlanEntry::new(order, *ex).with_circuit(config.number));
        }
    }
    Workout {
        id: id.to_string(),
        name: format!("Workout {}", id),
        kind: WorkoutKind::Circuit,
        entries,
        rounds: None,
        rest_secs: None,
        circuits: groups.iter().map(|(_, c)| *c).collect(),
    }
}

pub fn segment(id: &str, kind: SegmentKind, position: u32, workout: Workout) -> Segment {
    Segment {
        id: id.to_string(),
        kind,
        position,
        workout,
    }
}
