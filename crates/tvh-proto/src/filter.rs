//! Filter state for the EPG query.
//!
//! Each predicate is independently settable and clearable.  Setters convert
//! to the wire representation first and then compare against the stored
//! value; they return `true` only when something actually changed, which is
//! the caller's cue to reload.  An unset predicate is `None` and is simply
//! absent from the query string.

use crate::catalog::{self, FIRST_BUCKET, LAST_BUCKET};

pub const KEY_CHANNEL: &str = "channel";
pub const KEY_TAG: &str = "tag";
pub const KEY_CONTENT_TYPE: &str = "contenttype";
pub const KEY_TITLE: &str = "title";
pub const KEY_MIN_DURATION: &str = "minduration";
pub const KEY_MAX_DURATION: &str = "maxduration";

/// Slider position as a pair of bucket ordinals, `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationRange {
    pub min: usize,
    pub max: usize,
}

impl DurationRange {
    pub const FULL: Self = Self {
        min: FIRST_BUCKET,
        max: LAST_BUCKET,
    };

    /// Clamp both ends into the bucket range and swap a crossed pair.
    pub fn new(min: usize, max: usize) -> Self {
        let (a, b) = (min.min(LAST_BUCKET), max.min(LAST_BUCKET));
        if a <= b {
            Self { min: a, max: b }
        } else {
            Self { min: b, max: a }
        }
    }

    /// The full span constrains nothing.
    pub fn is_full(&self) -> bool {
        *self == Self::FULL
    }

    pub fn min_seconds(&self) -> u32 {
        catalog::bucket(self.min).seconds
    }

    pub fn max_seconds(&self) -> u32 {
        catalog::bucket(self.max).seconds
    }
}

impl Default for DurationRange {
    fn default() -> Self {
        Self::FULL
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    title: Option<String>,
    channel: Option<String>,
    tag: Option<String>,
    content_type: Option<u32>,
    duration: DurationRange,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn channel(&self) -> Option<&str> {
        self.channel.as_deref()
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn content_type(&self) -> Option<u32> {
        self.content_type
    }

    pub fn duration(&self) -> DurationRange {
        self.duration
    }

    /// Empty text clears the predicate.
    pub fn set_title(&mut self, text: Option<&str>) -> bool {
        let value = text.filter(|t| !t.is_empty()).map(str::to_string);
        replace_if_changed(&mut self.title, value)
    }

    pub fn set_channel(&mut self, key: Option<&str>) -> bool {
        let value = key.filter(|k| !k.is_empty()).map(str::to_string);
        replace_if_changed(&mut self.channel, value)
    }

    pub fn set_tag(&mut self, name: Option<&str>) -> bool {
        let value = name.filter(|n| !n.is_empty()).map(str::to_string);
        replace_if_changed(&mut self.tag, value)
    }

    pub fn set_content_type(&mut self, code: Option<u32>) -> bool {
        replace_if_changed(&mut self.content_type, code)
    }

    pub fn set_duration_range(&mut self, min_bucket: usize, max_bucket: usize) -> bool {
        replace_if_changed(&mut self.duration, DurationRange::new(min_bucket, max_bucket))
    }

    /// Reset every predicate and the duration span.
    pub fn clear_all(&mut self) {
        *self = Self::default();
    }

    /// Number of predicates currently constraining the query.  The duration
    /// pair counts once.
    pub fn active_count(&self) -> usize {
        [
            self.title.is_some(),
            self.channel.is_some(),
            self.tag.is_some(),
            self.content_type.is_some(),
            !self.duration.is_full(),
        ]
        .iter()
        .filter(|&&b| b)
        .count()
    }

    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }

    /// Wire form: only set predicates appear.  Duration keys are emitted as a
    /// pair whenever the span is narrower than the full range.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(ch) = &self.channel {
            params.push((KEY_CHANNEL, ch.clone()));
        }
        if let Some(tag) = &self.tag {
            params.push((KEY_TAG, tag.clone()));
        }
        if let Some(code) = self.content_type {
            params.push((KEY_CONTENT_TYPE, code.to_string()));
        }
        if let Some(title) = &self.title {
            params.push((KEY_TITLE, title.clone()));
        }
        if !self.duration.is_full() {
            params.push((KEY_MIN_DURATION, self.duration.min_seconds().to_string()));
            params.push((KEY_MAX_DURATION, self.duration.max_seconds().to_string()));
        }
        params
    }
}

fn replace_if_changed<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setting_same_value_reports_no_change() {
        let mut f = FilterState::new();
        assert!(f.set_channel(Some("5")));
        assert!(!f.set_channel(Some("5")));
        assert!(f.set_tag(Some("Sports")));
        assert!(!f.set_tag(Some("Sports")));
        assert!(f.set_content_type(Some(0x10)));
        assert!(!f.set_content_type(Some(0x10)));
        assert!(f.set_title(Some("News")));
        assert!(!f.set_title(Some("News")));
        assert!(f.set_duration_range(1, 4));
        assert!(!f.set_duration_range(1, 4));
    }

    #[test]
    fn test_empty_title_means_unset() {
        let mut f = FilterState::new();
        assert!(!f.set_title(Some("")));
        assert!(f.set_title(Some("Doc")));
        assert!(f.set_title(Some("")));
        assert_eq!(f.title(), None);
        assert!(!f.set_title(None));
    }

    #[test]
    fn test_clear_all_restores_defaults() {
        let mut f = FilterState::new();
        f.set_channel(Some("5"));
        f.set_tag(Some("Kids"));
        f.set_content_type(Some(0x50));
        f.set_title(Some("x"));
        f.set_duration_range(2, 3);
        f.clear_all();
        assert_eq!(f.duration(), DurationRange::FULL);
        assert_eq!(f.active_count(), 0);
        assert!(f.query_params().is_empty());
    }

    #[test]
    fn test_unset_predicates_are_omitted() {
        let mut f = FilterState::new();
        f.set_tag(Some("Sports"));
        assert_eq!(f.query_params(), vec![(KEY_TAG, "Sports".to_string())]);
    }

    #[test]
    fn test_duration_emits_paired_seconds() {
        let mut f = FilterState::new();
        f.set_duration_range(1, 3);
        assert_eq!(
            f.query_params(),
            vec![
                (KEY_MIN_DURATION, "1200".to_string()),
                (KEY_MAX_DURATION, "5400".to_string())
            ]
        );
        // back to the full span drops both keys
        assert!(f.set_duration_range(0, 7));
        assert!(f.query_params().is_empty());
    }

    #[test]
    fn test_crossed_duration_range_is_swapped() {
        let r = DurationRange::new(6, 2);
        assert_eq!((r.min, r.max), (2, 6));
        let r = DurationRange::new(3, 42);
        assert_eq!((r.min, r.max), (3, 7));
    }

    #[test]
    fn test_active_count_counts_duration_once() {
        let mut f = FilterState::new();
        f.set_duration_range(0, 5);
        f.set_channel(Some("9"));
        assert_eq!(f.active_count(), 2);
    }
}
