//! Terminal implementation of the presentation seam.
//!
//! Picker chrome and notices go to stderr; displayed page paths go to stdout.

use std::process::Command;

use anyhow::{Context, Result, bail};
use archwiki_reader_core::cache::CachedPage;
use archwiki_reader_core::notice::{Notice, NoticeLevel};
use archwiki_reader_core::picker::{
    PICKER_INSTRUCTIONS, PickRequest, Presenter, Selection, default_selection, rank_candidates,
};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context as LineContext, Helper};
use tracing::debug;

const SHOWN_MATCHES: usize = 20;

type PickerEditor = rustyline::Editor<PickHelper, DefaultHistory>;

#[derive(Default)]
struct PickHelper {
    candidates: Vec<String>,
}

impl Helper for PickHelper {}

impl Completer for PickHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &LineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Self::Candidate>)> {
        let prefix = line[..pos].to_lowercase();
        let pairs = self
            .candidates
            .iter()
            .filter(|candidate| candidate.to_lowercase().starts_with(&prefix))
            .take(SHOWN_MATCHES * 5)
            .map(|candidate| Pair {
                display: candidate.clone(),
                replacement: candidate.clone(),
            })
            .collect();
        Ok((0, pairs))
    }
}

impl Hinter for PickHelper {
    type Hint = String;
}

impl Highlighter for PickHelper {}

impl Validator for PickHelper {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceInput {
    First,
    Index(usize),
    Dismiss,
    Invalid,
}

/// Interpret the answer to the numbered match list (1-based on screen).
pub fn parse_choice(input: &str, shown: usize) -> ChoiceInput {
    let input = input.trim();
    if input.is_empty() {
        return ChoiceInput::First;
    }
    if input.eq_ignore_ascii_case("q") || input.eq_ignore_ascii_case("esc") {
        return ChoiceInput::Dismiss;
    }
    match input.parse::<usize>() {
        Ok(number) if (1..=shown).contains(&number) => ChoiceInput::Index(number - 1),
        _ => ChoiceInput::Invalid,
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum QueryDecision<'a> {
    /// Settled without asking again; `None` for an empty query with no match.
    Settled(Option<Selection>),
    /// Several matches, the user picks from the list.
    Choose(Vec<&'a str>),
}

/// Decide what a submitted query means: a lone or exact match is taken,
/// no match confirms the typed text.
pub fn decide_query<'a>(request: &'a PickRequest, query: &str) -> QueryDecision<'a> {
    let matches = rank_candidates(&request.candidates, query, request.limit);
    if matches.is_empty() {
        return QueryDecision::Settled(default_selection(
            &request.candidates,
            query,
            request.limit,
        ));
    }
    if matches.len() == 1 || matches[0] == query.trim() {
        return QueryDecision::Settled(Some(Selection::Listed(matches[0].to_string())));
    }
    QueryDecision::Choose(matches)
}

pub struct TerminalPresenter {
    editor: PickerEditor,
    open_command: Option<String>,
}

impl TerminalPresenter {
    pub fn new(open_command: Option<String>) -> Result<Self> {
        let mut editor = PickerEditor::new().context("failed to initialize line editor")?;
        editor.set_helper(Some(PickHelper::default()));
        Ok(Self {
            editor,
            open_command,
        })
    }

    /// `Ok(None)` on Ctrl-C or end of input.
    pub fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => Ok(None),
            Err(error) => Err(error).context("failed to read terminal input"),
        }
    }

    fn set_candidates(&mut self, candidates: &[String]) {
        self.editor.set_helper(Some(PickHelper {
            candidates: candidates.to_vec(),
        }));
    }

    fn choose_from(&mut self, matches: &[&str]) -> Result<Option<Selection>> {
        let shown = &matches[..matches.len().min(SHOWN_MATCHES)];
        for (index, candidate) in shown.iter().enumerate() {
            eprintln!("{:>3}  {candidate}", index + 1);
        }
        if matches.len() > shown.len() {
            eprintln!("     ... {} more, refine the query", matches.len() - shown.len());
        }

        loop {
            let prompt = format!("select [1-{}] (↵ for 1, q to dismiss): ", shown.len());
            let Some(answer) = self.read_line(&prompt)? else {
                return Ok(None);
            };
            match parse_choice(&answer, shown.len()) {
                ChoiceInput::First => return Ok(Some(Selection::Listed(shown[0].to_string()))),
                ChoiceInput::Index(index) => {
                    return Ok(Some(Selection::Listed(shown[index].to_string())));
                }
                ChoiceInput::Dismiss => return Ok(None),
                ChoiceInput::Invalid => eprintln!("not a listed number: {}", answer.trim()),
            }
        }
    }
}

impl Presenter for TerminalPresenter {
    fn notify(&mut self, notice: Notice) {
        match notice.level {
            NoticeLevel::Info | NoticeLevel::Success => eprintln!("{}", notice.message),
            NoticeLevel::Warn => eprintln!("warning: {}", notice.message),
            NoticeLevel::Error => eprintln!("error: {}", notice.message),
        }
    }

    fn pick(&mut self, request: &PickRequest) -> Result<Option<Selection>> {
        let instructions = PICKER_INSTRUCTIONS
            .iter()
            .map(|(keys, purpose)| format!("{keys} {purpose}"))
            .collect::<Vec<_>>()
            .join("  ");
        eprintln!("{} candidates  ({instructions})", request.candidates.len());

        self.set_candidates(&request.candidates);
        let query = self.read_line(&format!("{} ", request.placeholder))?;
        self.set_candidates(&[]);
        let Some(query) = query else {
            return Ok(None);
        };

        match decide_query(request, &query) {
            QueryDecision::Settled(selection) => {
                debug!(query = query.trim(), ?selection, "picker query settled");
                Ok(selection)
            }
            QueryDecision::Choose(matches) => self.choose_from(&matches),
        }
    }

    fn display(&mut self, page: &CachedPage) -> Result<()> {
        println!("{}", page.path.display());
        let Some(open_command) = self.open_command.as_deref() else {
            return Ok(());
        };
        let mut parts = open_command.split_whitespace();
        let Some(program) = parts.next() else {
            return Ok(());
        };
        let status = Command::new(program)
            .args(parts)
            .arg(&page.path)
            .status()
            .with_context(|| format!("failed to execute {open_command}"))?;
        if !status.success() {
            bail!(
                "{open_command} exited with {} for {}",
                status.code().unwrap_or(1),
                page.path.display()
            );
        }
        Ok(())
    }
}
