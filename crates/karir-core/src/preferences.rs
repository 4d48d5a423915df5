//! Job preference keywords picked up during conversation

use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

/// Ordered, case-insensitively deduplicated preference keywords.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceSet {
    keywords: Vec<String>,
}

impl PreferenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a preference. Returns false for blanks, duplicates, and
    /// references to the assessment itself.
    pub fn record(&mut self, preference: &str) -> bool {
        let preference = preference.trim();
        if preference.is_empty() || preference.to_lowercase().contains("riasec") {
            return false;
        }
        if self.keywords.iter().any(|k| k.eq_ignore_ascii_case(preference)) {
            return false;
        }
        self.keywords.push(preference.to_string());
        true
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn joined(&self) -> String {
        self.keywords.join(", ")
    }
}

impl<S: AsRef<str>> FromIterator<S> for PreferenceSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for item in iter {
            set.record(item.as_ref());
        }
        set
    }
}

/// Preferences shared between tools of one chat session.
#[derive(Debug, Clone, Default)]
pub struct SharedPreferences(Arc<RwLock<PreferenceSet>>);

impl SharedPreferences {
    pub fn new(initial: PreferenceSet) -> Self {
        Self(Arc::new(RwLock::new(initial)))
    }

    pub fn record(&self, preference: &str) -> bool {
        let mut set = self.0.write().unwrap_or_else(|e| e.into_inner());
        set.record(preference)
    }

    pub fn snapshot(&self) -> PreferenceSet {
        self.0.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_assessment_mentions() {
        let mut prefs = PreferenceSet::new();
        assert!(!prefs.record("my RIASEC result"));
        assert!(prefs.record("remote work"));
        assert!(!prefs.record("Remote Work"));
        assert!(!prefs.record("   "));
        assert_eq!(prefs.joined(), "remote work");
    }

    #[test]
    fn shared_handles_see_the_same_set() {
        let shared = SharedPreferences::default();
        let other = shared.clone();
        assert!(shared.record("data analysis"));
        assert_eq!(other.snapshot().keywords(), ["data analysis".to_string()]);
    }
}
