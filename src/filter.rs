use crate::config::Config;
use crate::error::Result;
use crate::subtitle::{strip_tags, SubtitleEntry};
use regex::Regex;

/// Decides which subtitle lines are worth a clip.
///
/// A line is rejected when any pattern matches its tag-stripped text. Patterns
/// are tried in order and evaluation stops at the first match.
#[derive(Debug, Clone)]
pub struct SkipFilter {
    enabled: bool,
    patterns: Vec<Regex>,
}

impl SkipFilter {
    pub fn new<S: AsRef<str>>(enabled: bool, patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(p.as_ref()))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { enabled, patterns })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.skip_enabled, config.skip_patterns.as_slice())
    }

    /// A filter that lets every line through.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            patterns: Vec::new(),
        }
    }

    pub fn accepts(&self, text: &str) -> bool {
        if !self.enabled {
            return true;
        }
        let text = strip_tags(text);
        !self.patterns.iter().any(|p| p.is_match(&text))
    }

    /// Keep accepted entries in order, renumbered from 0.
    pub fn filter_entries(&self, entries: Vec<SubtitleEntry>) -> Vec<SubtitleEntry> {
        entries
            .into_iter()
            .filter(|e| self.accepts(&e.text))
            .enumerate()
            .map(|(index, entry)| SubtitleEntry { index, ..entry })
            .collect()
    }
}
