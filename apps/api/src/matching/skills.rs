//! Skill set comparison: pluggable, trait-based.
//!
//! Default: `ExactSkillMatcher` (case/whitespace-insensitive exact names).
//! Fuzzy or synonym-aware matchers implement the same trait and are swapped
//! in at startup.

use std::collections::BTreeSet;

use crate::models::matching::SkillsMatch;

/// Compares a job's required skills against a candidate's skills.
///
/// Carried by the scorer and explainer as `Arc<dyn SkillMatcher>`.
pub trait SkillMatcher: Send + Sync {
    /// Canonical comparison key for a skill name.
    fn normalize(&self, skill: &str) -> String;

    /// Partitions `required` into matched and gaps. Both sides keep the job's spelling.
    fn compare(&self, required: &BTreeSet<String>, offered: &BTreeSet<String>) -> SkillsMatch {
        let offered: BTreeSet<String> = offered.iter().map(|s| self.normalize(s)).collect();
        let (matched, gaps) = required
            .iter()
            .cloned()
            .partition(|skill| offered.contains(&self.normalize(skill)));
        SkillsMatch { matched, gaps }
    }

    /// Share of required skills covered, in [0, 1]. Zero when nothing is required.
    fn coverage(&self, required: &BTreeSet<String>, offered: &BTreeSet<String>) -> f64 {
        if required.is_empty() {
            return 0.0;
        }
        let result = self.compare(required, offered);
        result.matched.len() as f64 / required.len() as f64
    }
}

pub struct ExactSkillMatcher;

impl SkillMatcher for ExactSkillMatcher {
    fn normalize(&self, skill: &str) -> String {
        skill
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }
}
