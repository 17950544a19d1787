//! Presentation seam and the fuzzy ranking shared by every picker front end.

use anyhow::Result;

use crate::cache::CachedPage;
use crate::notice::Notice;

pub const DEFAULT_PICK_LIMIT: usize = 5000;

pub const PAGE_PLACEHOLDER: &str = "Enter page name...";
pub const SIMILAR_PAGE_PLACEHOLDER: &str = "Enter similar page name...";
pub const CATEGORY_PLACEHOLDER: &str = "Enter category name...";

pub const PICKER_INSTRUCTIONS: &[(&str, &str)] = &[
    ("↑↓", "to navigate"),
    ("tab", "to complete"),
    ("↵", "to use"),
    ("esc", "to dismiss"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickRequest {
    pub candidates: Vec<String>,
    pub placeholder: String,
    pub limit: usize,
}

impl PickRequest {
    pub fn new(candidates: Vec<String>, placeholder: &str) -> Self {
        Self {
            candidates,
            placeholder: placeholder.to_string(),
            limit: DEFAULT_PICK_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// An entry of the candidate list.
    Listed(String),
    /// Typed text that matched no candidate.
    FreeText(String),
}

impl Selection {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Listed(value) | Self::FreeText(value) => value,
        }
    }
}

pub trait Presenter {
    fn notify(&mut self, notice: Notice);

    /// `Ok(None)` means the user dismissed the picker.
    fn pick(&mut self, request: &PickRequest) -> Result<Option<Selection>>;

    fn display(&mut self, page: &CachedPage) -> Result<()>;
}

/// Score `text` against `query`, case-insensitively. `None` if the query
/// characters do not all appear in order.
pub fn fuzzy_score(text: &str, query: &str) -> Option<i32> {
    if query.is_empty() {
        return Some(0);
    }
    let text_lower = text.to_lowercase();
    let query_lower = query.to_lowercase();

    if text_lower == query_lower {
        return Some(10_000);
    }
    if text_lower.starts_with(&query_lower) {
        return Some(9_000 + (500 - text_lower.chars().count() as i32).max(0));
    }
    if let Some(pos) = text_lower.find(&query_lower) {
        return Some(5_000 + (500 - pos as i32).max(0));
    }

    let text_chars: Vec<char> = text_lower.chars().collect();
    let query_chars: Vec<char> = query_lower.chars().collect();
    let mut query_idx = 0;
    let mut score: i32 = 0;
    let mut prev_matched = false;

    for (text_idx, ch) in text_chars.iter().enumerate() {
        if query_idx == query_chars.len() {
            break;
        }
        if *ch == query_chars[query_idx] {
            score += (100 - text_idx as i32).max(1);
            if prev_matched {
                score += 20;
            }
            let at_boundary = text_idx == 0
                || matches!(text_chars[text_idx - 1], ' ' | '_' | '-' | '/' | '(');
            if at_boundary {
                score += 30;
            }
            prev_matched = true;
            query_idx += 1;
        } else {
            prev_matched = false;
        }
    }

    (query_idx == query_chars.len()).then_some(score)
}

/// Matching candidates, best first. Equal scores keep candidate order.
pub fn rank_candidates<'a>(candidates: &'a [String], query: &str, limit: usize) -> Vec<&'a str> {
    let query = query.trim();
    let mut scored: Vec<(i32, &str)> = candidates
        .iter()
        .filter_map(|candidate| fuzzy_score(candidate, query).map(|score| (score, candidate.as_str())))
        .collect();
    scored.sort_by(|left, right| right.0.cmp(&left.0));
    scored.into_iter().take(limit).map(|(_, candidate)| candidate).collect()
}

/// What confirming `query` without choosing explicitly yields: the best
/// match, or the typed text when nothing matches.
pub fn default_selection(candidates: &[String], query: &str, limit: usize) -> Option<Selection> {
    if let Some(best) = rank_candidates(candidates, query, limit).first() {
        return Some(Selection::Listed((*best).to_string()));
    }
    let typed = query.trim();
    if typed.is_empty() {
        None
    } else {
        Some(Selection::FreeText(typed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{Selection, default_selection, fuzzy_score, rank_candidates};

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn exact_beats_prefix_beats_substring_beats_subsequence() {
        let exact = fuzzy_score("Xorg", "xorg").expect("exact");
        let prefix = fuzzy_score("Xorg multiseat", "xorg").expect("prefix");
        let substring = fuzzy_score("Intel Xorg", "xorg").expect("substring");
        let subsequence = fuzzy_score("X.Org server", "xorg").expect("subsequence");
        assert!(exact > prefix);
        assert!(prefix > substring);
        assert!(substring > subsequence);
    }

    #[test]
    fn missing_characters_do_not_match() {
        assert_eq!(fuzzy_score("Pacman", "pacz"), None);
        assert_eq!(fuzzy_score("Pacman", "namcap"), None);
    }

    #[test]
    fn empty_query_keeps_list_order() {
        let candidates = names(&["Zsh", "Bash", "Fish"]);
        assert_eq!(rank_candidates(&candidates, "", 10), vec!["Zsh", "Bash", "Fish"]);
    }

    #[test]
    fn ranking_respects_limit() {
        let candidates = names(&["a1", "a2", "a3", "b"]);
        assert_eq!(rank_candidates(&candidates, "a", 2), vec!["a1", "a2"]);
    }

    #[test]
    fn ties_keep_candidate_order() {
        let candidates = names(&["Network configuration", "Network_configuration"]);
        assert_eq!(
            rank_candidates(&candidates, "network", 10),
            vec!["Network configuration", "Network_configuration"]
        );
    }

    #[test]
    fn default_selection_prefers_best_match() {
        let candidates = names(&["Systemd-networkd", "Systemd"]);
        assert_eq!(
            default_selection(&candidates, "systemd", 10),
            Some(Selection::Listed("Systemd".to_string()))
        );
    }

    #[test]
    fn unmatched_query_becomes_free_text() {
        let candidates = names(&["Systemd"]);
        assert_eq!(
            default_selection(&candidates, "  Wayland ", 10),
            Some(Selection::FreeText("Wayland".to_string()))
        );
        assert_eq!(default_selection(&[], "   ", 10), None);
    }
}
