/// Split newline-delimited tool output into an ordered candidate list.
///
/// Lines are trimmed and blank lines dropped. Order and duplicates are kept.
pub fn parse_candidate_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::parse_candidate_list;

    #[test]
    fn drops_blank_and_whitespace_lines() {
        assert_eq!(
            parse_candidate_list("PageA\nPageB\n \n\nPageC\n"),
            vec!["PageA", "PageB", "PageC"]
        );
    }

    #[test]
    fn empty_or_whitespace_output_is_empty() {
        assert!(parse_candidate_list("").is_empty());
        assert!(parse_candidate_list(" \n\t\n  \n").is_empty());
    }

    #[test]
    fn keeps_duplicates_order_and_case() {
        assert_eq!(
            parse_candidate_list("Xorg\r\nxorg\nXorg\n"),
            vec!["Xorg", "xorg", "Xorg"]
        );
    }

    #[test]
    fn trims_surrounding_whitespace_but_keeps_inner_spaces() {
        assert_eq!(
            parse_candidate_list("  Installation guide  \n"),
            vec!["Installation guide"]
        );
    }
}
