// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Line commands accepted by `rep run`.

use rp_core::{FeedbackFor, ProofMedia, Ratings};

use crate::error::{Error, Result};

/// One parsed line of session input.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Start,
    Log {
        position: usize,
        reps: u32,
        load: f64,
        rpe: u8,
        comment: Option<String>,
    },
    Feedback {
        target: FeedbackFor,
        ratings: Ratings,
    },
    Done(usize),
    Round {
        circuit: u32,
        n: u32,
    },
    SkipRest(u32),
    Complete(Option<String>),
    Proof(ProofMedia),
    Status,
    Sync,
    Help,
    Quit,
}

const LOG_USAGE: &str = "log <position> <reps> <load> <rpe> [comment]";
const FEEDBACK_USAGE: &str =
    "feedback <position|c<circuit>|session> <difficulty> <enjoyment> [rpe] [comment]";
const DONE_USAGE: &str = "done <position>";
const ROUND_USAGE: &str = "round <circuit> <n>";
const SKIP_USAGE: &str = "skip-rest <circuit>";
const PROOF_USAGE: &str = "proof <url> <content-type> [bytes]";

impl SessionCommand {
    /// Parses one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = words.collect();

        let cmd = match verb {
            "start" => SessionCommand::Start,
            "log" => {
                if args.len() < 4 {
                    return Err(Error::Usage(LOG_USAGE));
                }
                SessionCommand::Log {
                    position: number(args[0], LOG_USAGE)?,
                    reps: number(args[1], LOG_USAGE)?,
                    load: number(args[2], LOG_USAGE)?,
                    rpe: number(args[3], LOG_USAGE)?,
                    comment: rest(&args[4..]),
                }
            }
            "feedback" | "rate" => {
                if args.len() < 3 {
                    return Err(Error::Usage(FEEDBACK_USAGE));
                }
                let target = parse_target(args[0])?;
                // An optional numeric rpe comes before the comment.
                let (rpe, comment_from) = match args.get(3).map(|a| a.parse::<u8>()) {
                    Some(Ok(rpe)) => (Some(rpe), 4),
                    _ => (None, 3),
                };
                SessionCommand::Feedback {
                    target,
                    ratings: Ratings {
                        difficulty: number(args[1], FEEDBACK_USAGE)?,
                        enjoyment: number(args[2], FEEDBACK_USAGE)?,
                        rpe,
                        comment: rest(args.get(comment_from..).unwrap_or_default()),
                    },
                }
            }
            "done" => SessionCommand::Done(number(single(&args, DONE_USAGE)?, DONE_USAGE)?),
            "round" => {
                if args.len() != 2 {
                    return Err(Error::Usage(ROUND_USAGE));
                }
                SessionCommand::Round {
                    circuit: number(args[0], ROUND_USAGE)?,
                    n: number(args[1], ROUND_USAGE)?,
                }
            }
            "skip-rest" | "skip" => {
                SessionCommand::SkipRest(number(single(&args, SKIP_USAGE)?, SKIP_USAGE)?)
            }
            "complete" | "finish" => SessionCommand::Complete(rest(&args)),
            "proof" => {
                if args.len() < 2 || args.len() > 3 {
                    return Err(Error::Usage(PROOF_USAGE));
                }
                let size_bytes = match args.get(2) {
                    Some(s) => Some(number(s, PROOF_USAGE)?),
                    None => None,
                };
                SessionCommand::Proof(ProofMedia {
                    url: args[0].to_string(),
                    content_type: args[1].to_string(),
                    size_bytes,
                })
            }
            "status" => SessionCommand::Status,
            "sync" => SessionCommand::Sync,
            "help" | "?" => SessionCommand::Help,
            "quit" | "exit" | "q" => SessionCommand::Quit,
            other => return Err(Error::UnknownCommand(other.to_string())),
        };
        Ok(Some(cmd))
    }

    /// Whether the command records data that goes to the queue.
    pub fn is_recording(&self) -> bool {
        matches!(
            self,
            SessionCommand::Start
                | SessionCommand::Log { .. }
                | SessionCommand::Feedback { .. }
                | SessionCommand::Complete(_)
                | SessionCommand::Proof(_)
        )
    }
}

fn number<T: std::str::FromStr>(s: &str, usage: &'static str) -> Result<T> {
    s.parse().map_err(|_| Error::Usage(usage))
}

fn single<'a>(args: &[&'a str], usage: &'static str) -> Result<&'a str> {
    match args {
        [one] => Ok(*one),
        _ => Err(Error::Usage(usage)),
    }
}

fn rest(args: &[&str]) -> Option<String> {
    (!args.is_empty()).then(|| args.join(" "))
}

fn parse_target(s: &str) -> Result<FeedbackFor> {
    if s == "session" {
        return Ok(FeedbackFor::Session);
    }
    if let Some(circuit) = s.strip_prefix('c') {
        return Ok(FeedbackFor::Circuit(number(circuit, FEEDBACK_USAGE)?));
    }
    Ok(FeedbackFor::Exercise(number(s, FEEDBACK_USAGE)?))
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
