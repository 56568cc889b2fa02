// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Scripted [`ProcessRunner`] for exercising controllers without `esrally`.
//!
//! Available to unit tests and, through the `testing` feature, to
//! downstream test suites.

use std::cell::RefCell;
use std::collections::VecDeque;

use crate::error::ProcessError;
use crate::process::ProcessRunner;

/// Scripted reply for [`ScriptedRunner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedReply {
    /// Successful run printing these lines.
    Output(Vec<String>),
    /// Run that exits with this code and output.
    Exit { code: i32, output: String },
}

impl ScriptedReply {
    /// Successful reply from a block of text.
    pub fn text(text: &str) -> Self {
        Self::Output(text.lines().map(str::to_string).collect())
    }
}

/// Records command lines instead of spawning them, answering from a queue.
///
/// With an empty queue, capture mode returns no lines and return-code mode
/// returns 0. Useful for exercising controllers without a live `esrally`.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    replies: RefCell<VecDeque<ScriptedReply>>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for the next call.
    pub fn push(&self, reply: ScriptedReply) -> &Self {
        self.replies.borrow_mut().push_back(reply);
        self
    }

    /// All command lines seen so far, oldest first.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn next(&self, cmdline: &str) -> Option<ScriptedReply> {
        self.calls.borrow_mut().push(cmdline.to_string());
        self.replies.borrow_mut().pop_front()
    }
}

impl ProcessRunner for ScriptedRunner {
    fn run_with_output(&self, cmdline: &str) -> Result<Vec<String>, ProcessError> {
        match self.next(cmdline) {
            None => Ok(Vec::new()),
            Some(ScriptedReply::Output(lines)) => Ok(lines),
            Some(ScriptedReply::Exit { code: 0, output }) => {
                Ok(output.lines().map(str::to_string).collect())
            }
            Some(ScriptedReply::Exit { code, output }) => Err(ProcessError::NonZeroExit {
                command: cmdline.to_string(),
                code,
                output,
            }),
        }
    }

    fn run_with_return_code(&self, cmdline: &str) -> Result<i32, ProcessError> {
        match self.next(cmdline) {
            None | Some(ScriptedReply::Output(_)) => Ok(0),
            Some(ScriptedReply::Exit { code, .. }) => Ok(code),
        }
    }
}
