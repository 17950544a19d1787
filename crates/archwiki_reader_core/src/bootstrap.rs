//! Startup checks: is the external tool installed, and has it built its
//! local page index yet.

use std::path::PathBuf;
use std::thread::{self, JoinHandle};

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::cache::PageCache;
use crate::notice::{FailureKind, Notice};
use crate::picker::Presenter;
use crate::process::{CliRequest, ProcessOutcome, WikiCli};

pub const INDEX_MARKER_FILENAME: &str = "pages.yml";

pub const INDEX_FETCH_STARTED: &str =
    "Fetching list of pages from the ArchWiki. This will take some time...";
pub const INDEX_FETCH_FINISHED: &str = "Finished fetching pages from the ArchWiki";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexState {
    Present,
    Rebuilt,
    RebuildFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebuildReport {
    pub state: IndexState,
    pub notice: Notice,
}

/// Any successful `-h` run counts as installed.
pub fn probe_installation<C: WikiCli>(cli: &C) -> bool {
    match cli.run(&CliRequest::Help) {
        Ok(outcome) => outcome.is_success(),
        Err(error) => {
            debug!(%error, "external tool probe failed");
            false
        }
    }
}

/// Warn once and return `false` when the tool is missing.
pub fn check_installation<C: WikiCli, P: Presenter>(
    cli: &C,
    presenter: &mut P,
    binary: &str,
) -> bool {
    if probe_installation(cli) {
        return true;
    }
    warn!(binary, "external tool is not installed");
    presenter.notify(Notice::from(&FailureKind::ToolNotInstalled {
        binary: binary.to_string(),
    }));
    false
}

/// `<data dir>/pages.yml`, where the data dir comes from `info -d -o`.
pub fn index_marker_path<C: WikiCli>(cli: &C) -> Option<PathBuf> {
    match cli.run(&CliRequest::DataDirectory) {
        Ok(ProcessOutcome::Success { stdout }) => {
            let dir = stdout.trim();
            if dir.is_empty() {
                return None;
            }
            Some(PathBuf::from(dir).join(INDEX_MARKER_FILENAME))
        }
        Ok(ProcessOutcome::Failure { code, stderr }) => {
            debug!(code, stderr = stderr.trim(), "info request failed");
            None
        }
        Err(error) => {
            debug!(%error, "info request could not run");
            None
        }
    }
}

pub fn index_marker_present<C: WikiCli>(cli: &C) -> bool {
    index_marker_path(cli).is_some_and(|path| path.is_file())
}

/// Run `update-all` and turn its result into the final notice.
pub fn rebuild_index<C: WikiCli>(cli: &C, binary: &str) -> RebuildReport {
    let failed = RebuildReport {
        state: IndexState::RebuildFailed,
        notice: Notice::from(&FailureKind::IndexMissing {
            binary: binary.to_string(),
        }),
    };
    match cli.run(&CliRequest::UpdateAll) {
        Ok(ProcessOutcome::Success { .. }) => {
            info!("page index built");
            RebuildReport {
                state: IndexState::Rebuilt,
                notice: Notice::success(INDEX_FETCH_FINISHED),
            }
        }
        Ok(ProcessOutcome::Failure { code, .. }) => {
            warn!(code, "update-all failed");
            failed
        }
        Err(error) => {
            warn!(%error, "update-all could not run");
            failed
        }
    }
}

/// Build the index in the foreground if its marker is missing.
pub fn ensure_index<C: WikiCli, P: Presenter>(
    cli: &C,
    presenter: &mut P,
    binary: &str,
) -> IndexState {
    if index_marker_present(cli) {
        return IndexState::Present;
    }
    presenter.notify(Notice::info(INDEX_FETCH_STARTED));
    let report = rebuild_index(cli, binary);
    presenter.notify(report.notice);
    report.state
}

/// An `update-all` run on a worker thread.
pub struct BackgroundRebuild {
    handle: JoinHandle<RebuildReport>,
    binary: String,
}

impl BackgroundRebuild {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Block until the rebuild ends.
    pub fn wait(self) -> RebuildReport {
        match self.handle.join() {
            Ok(report) => report,
            Err(_) => RebuildReport {
                state: IndexState::RebuildFailed,
                notice: Notice::from(&FailureKind::IndexMissing {
                    binary: self.binary,
                }),
            },
        }
    }
}

/// Start a background rebuild if the marker is missing; `None` when the
/// index is already there.
pub fn spawn_index_rebuild<C, P>(
    cli: C,
    presenter: &mut P,
    binary: &str,
) -> Option<BackgroundRebuild>
where
    C: WikiCli + Send + 'static,
    P: Presenter,
{
    if index_marker_present(&cli) {
        return None;
    }
    presenter.notify(Notice::info(INDEX_FETCH_STARTED));
    let owned_binary = binary.to_string();
    let handle = thread::spawn(move || rebuild_index(&cli, &owned_binary));
    Some(BackgroundRebuild {
        handle,
        binary: binary.to_string(),
    })
}

/// Create the page directory if needed, telling the user when it appears.
pub fn prepare_page_directory<P: Presenter>(cache: &PageCache, presenter: &mut P) -> Result<()> {
    if cache.ensure_dir()? {
        presenter.notify(Notice::info(format!(
            "Created page directory {}",
            cache.dir().display()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::{
        INDEX_FETCH_FINISHED, INDEX_FETCH_STARTED, IndexState, check_installation, ensure_index,
        index_marker_path, index_marker_present, prepare_page_directory, spawn_index_rebuild,
    };
    use crate::cache::PageCache;
    use crate::notice::NoticeLevel;
    use crate::process::CliRequest;
    use crate::testing::{RecordingPresenter, ScriptedCli};

    #[test]
    fn installed_tool_passes_silently() {
        let cli = ScriptedCli::default().succeed(CliRequest::Help, "usage");
        let mut presenter = RecordingPresenter::default();
        assert!(check_installation(&cli, &mut presenter, "archwiki-rs"));
        assert!(presenter.notices.is_empty());
    }

    #[test]
    fn missing_tool_warns_once() {
        let cli = ScriptedCli::default();
        let mut presenter = RecordingPresenter::default();
        assert!(!check_installation(&cli, &mut presenter, "archwiki-rs"));
        assert_eq!(presenter.notices.len(), 1);
        assert_eq!(presenter.notices[0].level, NoticeLevel::Warn);
        assert!(presenter.notices[0].message.contains("install 'archwiki-rs'"));
    }

    #[test]
    fn failing_help_counts_as_not_installed() {
        let cli = ScriptedCli::default().fail(CliRequest::Help, "");
        let mut presenter = RecordingPresenter::default();
        assert!(!check_installation(&cli, &mut presenter, "archwiki-rs"));
    }

    #[test]
    fn marker_path_joins_trimmed_data_dir() {
        let cli = ScriptedCli::default()
            .succeed(CliRequest::DataDirectory, "/home/u/.local/share/archwiki-rs\n");
        assert_eq!(
            index_marker_path(&cli),
            Some("/home/u/.local/share/archwiki-rs/pages.yml".into())
        );
    }

    #[test]
    fn failing_info_means_no_marker() {
        let cli = ScriptedCli::default().fail(CliRequest::DataDirectory, "oops");
        assert_eq!(index_marker_path(&cli), None);
        assert!(!index_marker_present(&cli));
    }

    #[test]
    fn present_marker_skips_rebuild() {
        let temp = tempdir().expect("tempdir");
        fs::write(temp.path().join("pages.yml"), "{}").expect("marker");
        let cli = ScriptedCli::default()
            .succeed(CliRequest::DataDirectory, &temp.path().to_string_lossy());
        let mut presenter = RecordingPresenter::default();

        assert_eq!(
            ensure_index(&cli, &mut presenter, "archwiki-rs"),
            IndexState::Present
        );
        assert!(!cli.calls().contains(&CliRequest::UpdateAll));
        assert!(presenter.notices.is_empty());
    }

    #[test]
    fn missing_marker_triggers_single_rebuild() {
        let temp = tempdir().expect("tempdir");
        let cli = ScriptedCli::default()
            .succeed(CliRequest::DataDirectory, &temp.path().to_string_lossy())
            .succeed(CliRequest::UpdateAll, "");
        let mut presenter = RecordingPresenter::default();

        assert_eq!(
            ensure_index(&cli, &mut presenter, "archwiki-rs"),
            IndexState::Rebuilt
        );
        let rebuilds = cli
            .calls()
            .into_iter()
            .filter(|call| *call == CliRequest::UpdateAll)
            .count();
        assert_eq!(rebuilds, 1);
        assert_eq!(presenter.notices[0].message, INDEX_FETCH_STARTED);
        assert_eq!(presenter.notices[1].message, INDEX_FETCH_FINISHED);
    }

    #[test]
    fn failed_rebuild_reports_manual_command() {
        let temp = tempdir().expect("tempdir");
        let cli = ScriptedCli::default()
            .succeed(CliRequest::DataDirectory, &temp.path().to_string_lossy())
            .fail(CliRequest::UpdateAll, "network down");
        let mut presenter = RecordingPresenter::default();

        assert_eq!(
            ensure_index(&cli, &mut presenter, "archwiki-rs"),
            IndexState::RebuildFailed
        );
        let last = presenter.notices.last().expect("notice");
        assert_eq!(last.level, NoticeLevel::Error);
        assert!(last.message.contains("'archwiki-rs update-all'"));
    }

    #[test]
    fn background_rebuild_yields_final_notice() {
        let temp = tempdir().expect("tempdir");
        let cli = ScriptedCli::default()
            .succeed(CliRequest::DataDirectory, &temp.path().to_string_lossy())
            .succeed(CliRequest::UpdateAll, "");
        let mut presenter = RecordingPresenter::default();

        let rebuild =
            spawn_index_rebuild(cli, &mut presenter, "archwiki-rs").expect("rebuild started");
        assert_eq!(presenter.notices[0].message, INDEX_FETCH_STARTED);
        let report = rebuild.wait();
        assert_eq!(report.state, IndexState::Rebuilt);
        assert_eq!(report.notice.message, INDEX_FETCH_FINISHED);
    }

    #[test]
    fn background_rebuild_not_started_when_marker_exists() {
        let temp = tempdir().expect("tempdir");
        fs::write(temp.path().join("pages.yml"), "{}").expect("marker");
        let cli = ScriptedCli::default()
            .succeed(CliRequest::DataDirectory, &temp.path().to_string_lossy());
        let mut presenter = RecordingPresenter::default();
        assert!(spawn_index_rebuild(cli, &mut presenter, "archwiki-rs").is_none());
        assert!(presenter.notices.is_empty());
    }

    #[test]
    fn prepare_page_directory_notifies_only_on_creation() {
        let temp = tempdir().expect("tempdir");
        let cache = PageCache::new(temp.path().join("ArchWiki"));
        let mut presenter = RecordingPresenter::default();
        prepare_page_directory(&cache, &mut presenter).expect("prepare");
        prepare_page_directory(&cache, &mut presenter).expect("prepare again");
        assert!(cache.dir().is_dir());
        assert_eq!(presenter.notices.len(), 1);
    }
}
