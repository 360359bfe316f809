//! Tab completion cycling.

use std::cmp::Ordering;

use itertools::Itertools;

/// Source of completion candidates for the line being edited.
pub trait Completer: Send + Sync {
    /// Candidates for `fragment`, the token under the cursor with quotes
    /// removed, given the tokens before it. Candidates need not be sorted or
    /// filtered.
    fn complete(&self, context: &[String], fragment: &str) -> Vec<String>;
}

impl<F> Completer for F
where
    F: Fn(&[String], &str) -> Vec<String> + Send + Sync,
{
    fn complete(&self, context: &[String], fragment: &str) -> Vec<String> {
        self(context, fragment)
    }
}

fn compare(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Candidates starting with `fragment`, case-insensitively, sorted and deduplicated.
#[must_use]
pub fn filter_candidates(candidates: Vec<String>, fragment: &str) -> Vec<String> {
    let prefix = fragment.to_lowercase();
    candidates
        .into_iter()
        .filter(|candidate| candidate.to_lowercase().starts_with(&prefix))
        .sorted_by(|a, b| compare(a, b).then_with(|| a.cmp(b)))
        .dedup()
        .collect()
}

/// The candidate after `current` in `sorted`, wrapping around.
///
/// When `current` is not a candidate, the first candidate greater than it is
/// chosen, or the first one if none is.
#[must_use]
pub fn next_candidate(sorted: &[String], current: &str) -> Option<String> {
    if sorted.is_empty() {
        return None;
    }

    let choice = match sorted.iter().position(|c| compare(c, current).is_eq()) {
        Some(i) => &sorted[(i + 1) % sorted.len()],
        None => sorted
            .iter()
            .find(|c| compare(c, current).is_gt())
            .unwrap_or(&sorted[0]),
    };

    Some(choice.clone())
}

/// The candidate before `current` in `sorted`, wrapping around. When
/// `current` is not a candidate, the last candidate is chosen.
#[must_use]
pub fn prev_candidate(sorted: &[String], current: &str) -> Option<String> {
    let last = sorted.last()?;

    let choice = match sorted.iter().position(|c| compare(c, current).is_eq()) {
        Some(i) => &sorted[(i + sorted.len() - 1) % sorted.len()],
        None => last,
    };

    Some(choice.clone())
}

/// State of the cycle between consecutive completion key presses.
///
/// The text left of the cursor is captured on the first press so that every
/// later press completes the same fragment. Any other edit resets the cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionCycle {
    snapshot: Option<String>,
    last: Option<String>,
}

impl CompletionCycle {
    pub fn reset(&mut self) {
        self.snapshot = None;
        self.last = None;
    }

    /// The text the cycle completes, captured from `current` on first use.
    pub fn snapshot(&mut self, current: String) -> String {
        self.snapshot.get_or_insert(current).clone()
    }

    /// The last candidate offered, if the cycle has started.
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.last.as_deref()
    }

    /// Steps to the next or previous candidate from the last one offered, or
    /// from `fragment` on the first step.
    pub fn step(&mut self, sorted: &[String], fragment: &str, forward: bool) -> Option<String> {
        let current = self.last.as_deref().unwrap_or(fragment);
        let choice = if forward {
            next_candidate(sorted, current)
        } else {
            prev_candidate(sorted, current)
        }?;

        self.last = Some(choice.clone());
        Some(choice)
    }
}
