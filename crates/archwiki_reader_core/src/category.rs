use anyhow::Result;
use tracing::info;

use crate::candidates::parse_candidate_list;
use crate::notice::{FailureKind, Notice};
use crate::picker::{CATEGORY_PLACEHOLDER, PickRequest, Presenter};
use crate::process::{CliRequest, ProcessOutcome, WikiCli};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryUpdate {
    Updated { category: String },
    Failed { category: String },
    ListingFailed,
    Dismissed,
}

pub fn open_update_category_picker<C: WikiCli, P: Presenter>(
    cli: &C,
    presenter: &mut P,
) -> Result<CategoryUpdate> {
    let stdout = match cli.run(&CliRequest::ListCategories)? {
        ProcessOutcome::Success { stdout } => stdout,
        ProcessOutcome::Failure { .. } => {
            presenter.notify(Notice::from(&FailureKind::ListingFailed { what: "categories" }));
            return Ok(CategoryUpdate::ListingFailed);
        }
    };

    let request = PickRequest::new(parse_candidate_list(&stdout), CATEGORY_PLACEHOLDER);
    match presenter.pick(&request)? {
        Some(selection) => update_category(cli, presenter, selection.as_str()),
        None => Ok(CategoryUpdate::Dismissed),
    }
}

pub fn update_category<C: WikiCli, P: Presenter>(
    cli: &C,
    presenter: &mut P,
    category: &str,
) -> Result<CategoryUpdate> {
    let request = CliRequest::UpdateCategory {
        category: category.to_string(),
    };
    match cli.run(&request)? {
        ProcessOutcome::Success { .. } => {
            info!(category, "category updated");
            presenter.notify(Notice::success(format!("Updated category {category}")));
            Ok(CategoryUpdate::Updated {
                category: category.to_string(),
            })
        }
        ProcessOutcome::Failure { code, .. } => {
            info!(category, code, "category update failed");
            presenter.notify(Notice::from(&FailureKind::CategoryUpdateFailed {
                category: category.to_string(),
            }));
            Ok(CategoryUpdate::Failed {
                category: category.to_string(),
            })
        }
    }
}
