use regex::Regex;
use std::sync::OnceLock;

/// Season and part numbers spelled out in a title.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeasonInfo {
    pub season: Option<i32>,
    pub part: Option<i32>,
}

impl SeasonInfo {
    #[must_use]
    pub const fn is_part(&self) -> bool {
        self.part.is_some()
    }
}

const PART_MARKERS: [&str; 8] = [
    "part 2",
    "part 3",
    "part 4",
    "cour 2",
    "cour 3",
    "2nd cour",
    "second cour",
    "second part",
];

const SEASON_MARKERS: [&str; 8] = [
    "season 2",
    "season 3",
    "season 4",
    "2nd season",
    "3rd season",
    "4th season",
    "second season",
    "third season",
];

fn get_regex(re: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    re.get_or_init(|| Regex::new(pattern).expect("Invalid regex pattern defined in code"))
}

fn first_number(patterns: &[&'static Regex], haystack: &str) -> Option<i32> {
    patterns
        .iter()
        .find_map(|re| re.captures(haystack))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[must_use]
pub fn extract_season_info(title: &str) -> SeasonInfo {
    static SEASON: OnceLock<Regex> = OnceLock::new();
    static ORDINAL_SEASON: OnceLock<Regex> = OnceLock::new();
    static PART: OnceLock<Regex> = OnceLock::new();
    static COUR: OnceLock<Regex> = OnceLock::new();
    static ORDINAL_PART: OnceLock<Regex> = OnceLock::new();

    let season = first_number(
        &[
            get_regex(&SEASON, r"(?i)season\s*(\d+)"),
            get_regex(&ORDINAL_SEASON, r"(?i)(\d+)(?:st|nd|rd|th)\s*season"),
        ],
        title,
    );

    let part = first_number(
        &[
            get_regex(&PART, r"(?i)part\s*(\d+)"),
            get_regex(&COUR, r"(?i)cour\s*(\d+)"),
            get_regex(&ORDINAL_PART, r"(?i)(\d+)(?:nd|rd|th)\s*(?:cour|part)"),
        ],
        title,
    );

    SeasonInfo { season, part }
}

/// Decides whether a related title starts a new season of `base_title`
/// rather than continuing one as another part or cour.
///
/// Titles carrying neither marker fall through to a heuristic: whatever is
/// left after removing the base title counts as a new season unless it is
/// a bare `part N`/`cour N`/`season N` token. Spin-offs with unrelated names
/// therefore classify as new seasons.
#[must_use]
pub fn is_new_season(title: &str, base_title: &str) -> bool {
    static BARE_TOKEN: OnceLock<Regex> = OnceLock::new();

    let lower = title.to_lowercase();

    if PART_MARKERS.iter().any(|m| lower.contains(m)) {
        return false;
    }
    if SEASON_MARKERS.iter().any(|m| lower.contains(m)) {
        return true;
    }

    let remainder = lower.replacen(&base_title.to_lowercase(), "", 1);
    let remainder = remainder.trim();

    !remainder.is_empty()
        && !get_regex(&BARE_TOKEN, r"^(?:part|cour|season)\s*\d+$").is_match(remainder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_season_number() {
        assert_eq!(extract_season_info("Show Season 2").season, Some(2));
        assert_eq!(extract_season_info("Show 3rd Season").season, Some(3));
        assert_eq!(extract_season_info("show SEASON3").season, Some(3));
        assert_eq!(extract_season_info("Show").season, None);
    }

    #[test]
    fn test_extract_part_number() {
        let info = extract_season_info("Show Season 3 Part 2");
        assert_eq!(info.season, Some(3));
        assert_eq!(info.part, Some(2));
        assert!(info.is_part());

        assert_eq!(extract_season_info("Show Cour 2").part, Some(2));
        assert_eq!(extract_season_info("Show 2nd Cour").part, Some(2));
        assert_eq!(extract_season_info("Show Final Season").part, None);
    }

    #[test]
    fn test_extract_is_idempotent() {
        let title = "Attack on Titan Season 3 Part 2";
        assert_eq!(extract_season_info(title), extract_season_info(title));
    }

    #[test]
    fn test_part_markers_win_over_season_markers() {
        assert!(!is_new_season("Show Season 2 Part 2", "Show"));
        assert!(!is_new_season("Show 2nd Cour", "Show"));
    }

    #[test]
    fn test_season_markers() {
        assert!(is_new_season("Show Season 2", "Show"));
        assert!(is_new_season("Show Third Season", "Show"));
        assert!(is_new_season("Show 4th Season", "Show"));
    }

    #[test]
    fn test_remainder_heuristic() {
        assert!(!is_new_season("Show", "Show"));
        assert!(!is_new_season("Show Season 5", "Show"));
        assert!(!is_new_season("Show Part 5", "Show"));
        assert!(is_new_season("Show: Final Arc", "Show"));
        assert!(is_new_season("Completely Different", "Show"));
    }
}
