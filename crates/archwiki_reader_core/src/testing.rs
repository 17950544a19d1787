//! Scripted stand-ins for the external tool and the presentation layer.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;

use anyhow::{Result, bail};

use crate::cache::CachedPage;
use crate::notice::Notice;
use crate::picker::{PickRequest, Presenter, Selection};
use crate::process::{CliRequest, ProcessOutcome, WikiCli};

/// Unscripted requests fail to spawn, like a missing binary.
#[derive(Debug, Default)]
pub struct ScriptedCli {
    outcomes: HashMap<CliRequest, ProcessOutcome>,
    calls: RefCell<Vec<CliRequest>>,
}

impl ScriptedCli {
    pub fn succeed(mut self, request: CliRequest, stdout: &str) -> Self {
        self.outcomes.insert(
            request,
            ProcessOutcome::Success {
                stdout: stdout.to_string(),
            },
        );
        self
    }

    pub fn fail(mut self, request: CliRequest, stderr: &str) -> Self {
        self.outcomes.insert(
            request,
            ProcessOutcome::Failure {
                code: 1,
                stderr: stderr.to_string(),
            },
        );
        self
    }

    pub fn calls(&self) -> Vec<CliRequest> {
        self.calls.borrow().clone()
    }
}

impl WikiCli for ScriptedCli {
    fn run(&self, request: &CliRequest) -> Result<ProcessOutcome> {
        self.calls.borrow_mut().push(request.clone());
        match self.outcomes.get(request) {
            Some(outcome) => Ok(outcome.clone()),
            None => bail!("failed to execute archwiki-rs {}", request.args().join(" ")),
        }
    }
}

#[derive(Debug, Default)]
pub struct RecordingPresenter {
    pub notices: Vec<Notice>,
    pub picks: Vec<PickRequest>,
    pub displayed: Vec<PathBuf>,
    answers: VecDeque<Option<Selection>>,
}

impl RecordingPresenter {
    pub fn with_picks(mut self, answers: Vec<Option<Selection>>) -> Self {
        self.answers = answers.into();
        self
    }
}

impl Presenter for RecordingPresenter {
    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    fn pick(&mut self, request: &PickRequest) -> Result<Option<Selection>> {
        self.picks.push(request.clone());
        Ok(self.answers.pop_front().flatten())
    }

    fn display(&mut self, page: &CachedPage) -> Result<()> {
        self.displayed.push(page.path.clone());
        Ok(())
    }
}
