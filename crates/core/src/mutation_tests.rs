// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::records::FeedbackTarget;
use crate::session::SessionStatus;
use chrono::TimeZone;
use yare::parameterized;

fn at() -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap()
}

fn set_log_mutation() -> PendingMutation {
    PendingMutation::new(
        "m-1",
        MutationPayload::SetLog(SetLog {
            session_id: "s-1".into(),
            exercise_id: "squat".into(),
            entry: 0,
            set_index: 2,
            reps: 8,
            load: 60.0,
            rpe: 7,
            comment: None,
            logged_at: at(),
        }),
        at(),
    )
}

fn status_mutation() -> PendingMutation {
    PendingMutation::new(
        "m-2",
        MutationPayload::SessionStatus(StatusUpdate {
            session_id: "s-1".into(),
            status: SessionStatus::Completed,
            started_at: None,
            completed_at: Some(at()),
            comment: Some("great".into()),
            proof: None,
        }),
        at(),
    )
}

#[parameterized(
    set_log = { MutationKind::SetLog, "set-log" },
    feedback = { MutationKind::Feedback, "feedback" },
    session_status = { MutationKind::SessionStatus, "session-status" },
)]
fn kind_names(kind: MutationKind, name: &str) {
    assert_eq!(kind.as_str(), name);
    assert_eq!(name.parse::<MutationKind>().unwrap(), kind);
    assert_eq!(serde_json::to_string(&kind).unwrap(), format!("\"{}\"", name));
}

#[test]
fn unknown_kind_is_rejected() {
    assert!(matches!(
        "habit".parse::<MutationKind>(),
        Err(Error::InvalidMutationKind(_))
    ));
}

#[test]
fn persisted_record_shape() {
    let value = serde_json::to_value(set_log_mutation()).unwrap();
    let obj = value.as_object().unwrap();
    let mut keys: Vec<_> = obj.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, ["created_at", "id", "kind", "payload"]);
    assert_eq!(obj["kind"], "set-log");
    assert_eq!(obj["payload"]["set_index"], 2);
}

#[test]
fn status_mutation_uses_done_on_the_wire() {
    let json = serde_json::to_string(&status_mutation()).unwrap();
    assert!(json.contains(r#""kind":"session-status""#));
    assert!(json.contains(r#""status":"done""#));
    let back: PendingMutation = serde_json::from_str(&json).unwrap();
    assert_eq!(back, status_mutation());
}

#[test]
fn payload_must_match_kind() {
    let json = r#"{"id":"m-1","kind":"set-log","payload":{"session_id":"s-1","status":"done"},"created_at":"2023-11-14T22:13:20Z"}"#;
    assert!(serde_json::from_str::<PendingMutation>(json).is_err());
}

#[test]
fn session_id_and_summary() {
    let feedback = PendingMutation::new(
        "m-3",
        MutationPayload::Feedback(ExerciseFeedback {
            session_id: "s-7".into(),
            target: FeedbackTarget::Session,
            difficulty: 6,
            enjoyment: 9,
            rpe: None,
            comment: None,
            recorded_at: at(),
        }),
        at(),
    );
    assert_eq!(feedback.session_id(), "s-7");
    assert_eq!(feedback.kind(), MutationKind::Feedback);
    assert_eq!(feedback.summary(), "feedback difficulty 6 enjoyment 9");
    assert_eq!(set_log_mutation().summary(), "set 2 of squat: 8 reps @ 60 (rpe 7)");
    assert_eq!(status_mutation().summary(), "session s-1 -> done");
}

#[parameterized(
    set_log = { set_log_mutation() },
    status = { status_mutation() },
)]
fn payload_is_written_as_the_bare_record(mutation: PendingMutation) {
    let value = serde_json::to_value(&mutation).unwrap();
    let inner = match &mutation.payload {
        MutationPayload::SetLog(log) => serde_json::to_value(log).unwrap(),
        MutationPayload::Feedback(feedback) => serde_json::to_value(feedback).unwrap(),
        MutationPayload::SessionStatus(update) => serde_json::to_value(update).unwrap(),
    };
    assert_eq!(value["payload"], inner);
    assert_ne!(value["payload"], serde_json::Value::Null);
}
