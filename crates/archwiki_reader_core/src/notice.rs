use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warn,
    Error,
}

impl NoticeLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// A transient message for the user. Failures never surface any other way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warn,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level.as_str(), self.message)
    }
}

impl From<&FailureKind> for Notice {
    fn from(failure: &FailureKind) -> Self {
        let message = failure.to_string();
        match failure {
            FailureKind::ToolNotInstalled { .. } => Notice::warn(message),
            _ => Notice::error(message),
        }
    }
}

/// Every way a user-initiated action can end without the expected result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureKind {
    #[error("You have to install '{binary}' to use archwiki-reader")]
    ToolNotInstalled { binary: String },
    #[error("Failed to create page file. Try running the command '{binary} update-all' manually.")]
    IndexMissing { binary: String },
    #[error("Page {page} not found")]
    FetchFailed { page: String },
    #[error("Page {page} not found and no similar pages were found")]
    NoAlternatives { page: String },
    #[error("Failed to read page {page}")]
    FallbackFetchFailed { page: String },
    #[error("Failed to update category {category}")]
    CategoryUpdateFailed { category: String },
    #[error("Failed to get {what}")]
    ListingFailed { what: &'static str },
}

#[cfg(test)]
mod tests {
    use super::{FailureKind, Notice, NoticeLevel};

    #[test]
    fn failures_render_user_messages() {
        assert_eq!(
            FailureKind::FallbackFetchFailed {
                page: "Xorg".to_string()
            }
            .to_string(),
            "Failed to read page Xorg"
        );
        assert_eq!(
            FailureKind::ListingFailed {
                what: "ArchWiki pages"
            }
            .to_string(),
            "Failed to get ArchWiki pages"
        );
        assert_eq!(
            FailureKind::IndexMissing {
                binary: "archwiki-rs".to_string()
            }
            .to_string(),
            "Failed to create page file. Try running the command 'archwiki-rs update-all' manually."
        );
    }

    #[test]
    fn missing_tool_is_a_warning_everything_else_an_error() {
        let warn = Notice::from(&FailureKind::ToolNotInstalled {
            binary: "archwiki-rs".to_string(),
        });
        assert_eq!(warn.level, NoticeLevel::Warn);

        let error = Notice::from(&FailureKind::CategoryUpdateFailed {
            category: "Networking".to_string(),
        });
        assert_eq!(error.level, NoticeLevel::Error);
        assert_eq!(error.to_string(), "[error] Failed to update category Networking");
    }
}
