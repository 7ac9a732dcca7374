// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

fn parse(line: &str) -> SessionCommand {
    SessionCommand::parse(line).unwrap().unwrap()
}

#[test]
fn blank_line_is_nothing() {
    assert_eq!(SessionCommand::parse("   ").unwrap(), None);
}

#[test]
fn log_with_comment() {
    assert_eq!(
        parse("log 0 8 62.5 7 felt heavy"),
        SessionCommand::Log {
            position: 0,
            reps: 8,
            load: 62.5,
            rpe: 7,
            comment: Some("felt heavy".into()),
        }
    );
}

#[parameterized(
    exercise = { "feedback 2 6 8", FeedbackFor::Exercise(2), None, None },
    circuit_with_rpe = { "feedback c1 7 5 9", FeedbackFor::Circuit(1), Some(9), None },
    session_comment = { "rate session 4 9 great day", FeedbackFor::Session, None, Some("great day") },
    rpe_and_comment = { "feedback 0 3 3 6 easy", FeedbackFor::Exercise(0), Some(6), Some("easy") },
)]
fn feedback_forms(line: &str, target: FeedbackFor, rpe: Option<u8>, comment: Option<&str>) {
    match parse(line) {
        SessionCommand::Feedback { target: t, ratings } => {
            assert_eq!(t, target);
            assert_eq!(ratings.rpe, rpe);
            assert_eq!(ratings.comment.as_deref(), comment);
        }
        other => unreachable!("parsed {:?}", other),
    }
}

#[parameterized(
    round = { "round 1 2", SessionCommand::Round { circuit: 1, n: 2 } },
    skip = { "skip-rest 3", SessionCommand::SkipRest(3) },
    done = { "done 4", SessionCommand::Done(4) },
    complete_bare = { "complete", SessionCommand::Complete(None) },
    complete_comment = { "finish solid work", SessionCommand::Complete(Some("solid work".into())) },
    quit = { "q", SessionCommand::Quit },
    status = { "status", SessionCommand::Status },
)]
fn simple_commands(line: &str, expected: SessionCommand) {
    assert_eq!(parse(line), expected);
}

#[test]
fn proof_with_size() {
    assert_eq!(
        parse("proof media://p/1 image/jpeg 2048"),
        SessionCommand::Proof(ProofMedia {
            url: "media://p/1".into(),
            content_type: "image/jpeg".into(),
            size_bytes: Some(2048),
        })
    );
}

#[parameterized(
    log_short = { "log 0 8" },
    log_bad_reps = { "log 0 eight 60 7" },
    round_missing = { "round 1" },
    done_extra = { "done 1 2" },
    feedback_bad_target = { "feedback cx 1 1" },
    proof_bad_size = { "proof u image/png big" },
)]
fn usage_errors(line: &str) {
    assert!(matches!(SessionCommand::parse(line), Err(Error::Usage(_))));
}

#[test]
fn unknown_verb() {
    assert!(matches!(
        SessionCommand::parse("jump 3"),
        Err(Error::UnknownCommand(v)) if v == "jump"
    ));
}

#[test]
fn only_data_commands_are_recording() {
    assert!(parse("start").is_recording());
    assert!(parse("log 0 1 0 5").is_recording());
    assert!(!parse("done 0").is_recording());
    assert!(!parse("round 1 1").is_recording());
    assert!(!parse("status").is_recording());
}
