//! Resolving a requested page to a displayed, cached markdown file.
//!
//! A failed read gets exactly one fallback round: the tool's similar-name
//! suggestions are offered once, and a failure of the second read is final.

use anyhow::Result;
use tracing::{debug, info};

use crate::cache::{CachedPage, PageCache};
use crate::candidates::parse_candidate_list;
use crate::notice::{FailureKind, Notice};
use crate::picker::{PAGE_PLACEHOLDER, PickRequest, Presenter, SIMILAR_PAGE_PLACEHOLDER};
use crate::process::{CliRequest, ProcessOutcome, WikiCli};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Displayed(CachedPage),
    NotFound,
    FallbackFailed { page: String },
    /// The page listing could not be fetched; no picker was shown.
    ListingFailed,
    Dismissed,
}

pub struct PageResolver<'a, C: WikiCli, P: Presenter> {
    cli: &'a C,
    presenter: &'a mut P,
    cache: &'a PageCache,
}

impl<'a, C: WikiCli, P: Presenter> PageResolver<'a, C, P> {
    pub fn new(cli: &'a C, presenter: &'a mut P, cache: &'a PageCache) -> Self {
        Self {
            cli,
            presenter,
            cache,
        }
    }

    /// List every page, let the user pick one, then resolve it.
    pub fn open_read_page_picker(&mut self) -> Result<Resolution> {
        let stdout = match self.cli.run(&CliRequest::ListPages)? {
            ProcessOutcome::Success { stdout } => stdout,
            ProcessOutcome::Failure { .. } => {
                self.report(&FailureKind::ListingFailed {
                    what: "ArchWiki pages",
                });
                return Ok(Resolution::ListingFailed);
            }
        };

        let request = PickRequest::new(parse_candidate_list(&stdout), PAGE_PLACEHOLDER);
        match self.presenter.pick(&request)? {
            Some(selection) => self.resolve_page(selection.as_str()),
            None => Ok(Resolution::Dismissed),
        }
    }

    pub fn resolve_page(&mut self, requested: &str) -> Result<Resolution> {
        let stderr = match self.cli.run(&CliRequest::read_markdown(requested))? {
            ProcessOutcome::Success { stdout } => {
                return self.cache_and_display(requested, &stdout);
            }
            ProcessOutcome::Failure { stderr, .. } => stderr,
        };

        let similar = parse_candidate_list(&stderr);
        if similar.is_empty() {
            info!(page = requested, "page not found, no alternatives");
            self.report(&FailureKind::NoAlternatives {
                page: requested.to_string(),
            });
            return Ok(Resolution::NotFound);
        }

        debug!(
            page = requested,
            candidates = similar.len(),
            "offering similar pages"
        );
        self.report(&FailureKind::FetchFailed {
            page: requested.to_string(),
        });
        let request = PickRequest::new(similar, SIMILAR_PAGE_PLACEHOLDER);
        let Some(selection) = self.presenter.pick(&request)? else {
            return Ok(Resolution::Dismissed);
        };
        self.resolve_fallback(selection.as_str())
    }

    fn resolve_fallback(&mut self, page: &str) -> Result<Resolution> {
        match self.cli.run(&CliRequest::read_markdown(page))? {
            ProcessOutcome::Success { stdout } => self.cache_and_display(page, &stdout),
            ProcessOutcome::Failure { .. } => {
                info!(page, "fallback read failed");
                self.report(&FailureKind::FallbackFetchFailed {
                    page: page.to_string(),
                });
                Ok(Resolution::FallbackFailed {
                    page: page.to_string(),
                })
            }
        }
    }

    fn cache_and_display(&mut self, page: &str, content: &str) -> Result<Resolution> {
        let cached = self.cache.store_if_missing(page, content)?;
        self.presenter.display(&cached)?;
        Ok(Resolution::Displayed(cached))
    }

    fn report(&mut self, failure: &FailureKind) {
        self.presenter.notify(Notice::from(failure));
    }
}
