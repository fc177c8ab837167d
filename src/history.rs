//! Command history, derived from the transcript rather than stored.
//!
//! Every `Command` entry is a history item, in transcript order and with
//! duplicates kept, so history always matches what was actually submitted.

use crate::session::{EntryKind, Step, Transcript};

/// All submitted commands, oldest first.
pub fn derive_history(transcript: &Transcript) -> Vec<String> {
    transcript
        .iter()
        .filter(|entry| entry.kind == EntryKind::Command)
        .map(|entry| entry.text.clone())
        .collect()
}

/// History entries containing `query` (case-insensitive), most recent first.
/// An empty query matches everything.
pub fn search_history(history: &[String], query: &str) -> Vec<String> {
    let needle = query.to_lowercase();
    history
        .iter()
        .rev()
        .filter(|entry| entry.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Move the history cursor one step.
///
/// `None` means "not navigating". Older from `None` jumps to the newest
/// entry and stops at the oldest; newer past the newest returns to `None`.
pub fn step_cursor(cursor: Option<usize>, len: usize, step: Step) -> Option<usize> {
    if len == 0 {
        return None;
    }
    match (cursor, step) {
        (None, Step::Older) => Some(len - 1),
        (None, Step::Newer) => None,
        (Some(index), Step::Older) => Some(index.saturating_sub(1).min(len - 1)),
        (Some(index), Step::Newer) if index + 1 < len => Some(index + 1),
        (Some(_), Step::Newer) => None,
    }
}

/// Move a reverse-search match index circularly.
pub fn step_match(index: usize, len: usize, step: Step) -> usize {
    if len == 0 {
        return 0;
    }
    match step {
        Step::Older => (index + 1) % len,
        Step::Newer => (index + len - 1) % len,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{OutputLine, RevealMode};
    use proptest::prelude::*;

    fn transcript(commands: &[&str]) -> Transcript {
        let mut transcript = Transcript::new();
        for command in commands {
            transcript.push(OutputLine::command(*command), RevealMode::Immediate);
            transcript.push(OutputLine::info("output"), RevealMode::Immediate);
        }
        transcript
    }

    #[test]
    fn history_keeps_duplicates_in_order() {
        let history = derive_history(&transcript(&["ls", "cd projects", "ls"]));
        assert_eq!(history, vec!["ls", "cd projects", "ls"]);
    }

    #[test]
    fn search_is_case_insensitive_and_recent_first() {
        let history: Vec<String> = ["cat About.txt", "ls", "cat projects/x.md"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            search_history(&history, "CAT"),
            vec!["cat projects/x.md", "cat About.txt"]
        );
        assert_eq!(
            search_history(&history, ""),
            vec!["cat projects/x.md", "ls", "cat About.txt"]
        );
        assert!(search_history(&history, "zzz").is_empty());
    }

    #[test]
    fn cursor_clamps_at_oldest_and_exits_past_newest() {
        assert_eq!(step_cursor(None, 3, Step::Older), Some(2));
        assert_eq!(step_cursor(Some(0), 3, Step::Older), Some(0));
        assert_eq!(step_cursor(Some(1), 3, Step::Newer), Some(2));
        assert_eq!(step_cursor(Some(2), 3, Step::Newer), None);
        assert_eq!(step_cursor(None, 3, Step::Newer), None);
        assert_eq!(step_cursor(None, 0, Step::Older), None);
    }

    #[test]
    fn match_index_wraps_both_ways() {
        assert_eq!(step_match(2, 3, Step::Older), 0);
        assert_eq!(step_match(0, 3, Step::Newer), 2);
        assert_eq!(step_match(0, 0, Step::Older), 0);
    }

    proptest! {
        #[test]
        fn n_older_then_n_newer_returns_to_not_navigating(len in 1usize..40, n_seed in 0usize..40) {
            let n = 1 + n_seed % len;
            let mut cursor = None;
            for _ in 0..n {
                cursor = step_cursor(cursor, len, Step::Older);
            }
            prop_assert!(cursor.is_some());
            for _ in 0..n {
                cursor = step_cursor(cursor, len, Step::Newer);
            }
            prop_assert_eq!(cursor, None);
        }

        #[test]
        fn search_results_are_a_filtered_subset(
            entries in proptest::collection::vec("[a-cA-C ]{0,6}", 0..12),
            query in "[a-cA-C]{0,2}",
        ) {
            let matches = search_history(&entries, &query);
            let needle = query.to_lowercase();
            for m in &matches {
                prop_assert!(entries.contains(m));
                prop_assert!(m.to_lowercase().contains(&needle));
            }
            let expected = entries.iter().filter(|e| e.to_lowercase().contains(&needle)).count();
            prop_assert_eq!(matches.len(), expected);
        }
    }
}
