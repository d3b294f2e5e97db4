//! Auto-record rule preview.
//!
//! Turns the current filter state into the human-readable summary shown
//! before a standing rule is created, and carries the exact predicate set
//! that will be submitted if the user confirms.

use crate::catalog::{self, Catalogs};
use crate::filter::FilterState;
use crate::query::Params;

pub const DONT_CARE: &str = "Don't care";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSummary {
    pub title: String,
    pub channel: String,
    pub tag: String,
    pub genre: String,
    pub min_duration: String,
    pub max_duration: String,
}

impl RuleSummary {
    pub fn build(filter: &FilterState, catalogs: &Catalogs) -> Self {
        let title = filter.title().map(str::to_string);
        let channel = filter.channel().map(|key| catalogs.channel_label(key));
        let tag = filter.tag().map(str::to_string);
        let genre = filter.content_type().map(|code| catalogs.content_group_label(code));

        // A zero lower bound constrains nothing, so it reads as "don't care".
        let range = filter.duration();
        let (min_duration, max_duration) = if range.is_full() {
            (None, None)
        } else {
            let min = (range.min_seconds() > 0)
                .then(|| catalog::duration_label(range.min_seconds()).to_string());
            let max = Some(catalog::duration_label(range.max_seconds()).to_string());
            (min, max)
        };

        let or_dont_care = |v: Option<String>| v.unwrap_or_else(|| DONT_CARE.to_string());
        Self {
            title: or_dont_care(title),
            channel: or_dont_care(channel),
            tag: or_dont_care(tag),
            genre: or_dont_care(genre),
            min_duration: or_dont_care(min_duration),
            max_duration: or_dont_care(max_duration),
        }
    }

    pub fn fields(&self) -> [(&'static str, &str); 6] {
        [
            ("Title", self.title.as_str()),
            ("Channel", self.channel.as_str()),
            ("Tag", self.tag.as_str()),
            ("Genre", self.genre.as_str()),
            ("Min duration", self.min_duration.as_str()),
            ("Max duration", self.max_duration.as_str()),
        ]
    }
}

/// A pending "create auto-record" confirmation.
#[derive(Debug, Clone, PartialEq)]
pub struct AutoRecPreview {
    pub summary: RuleSummary,
    /// Events the rule would match right now, per the last query response.
    pub estimate: usize,
    params: Params,
}

impl AutoRecPreview {
    pub fn new(filter: &FilterState, catalogs: &Catalogs, estimate: usize) -> Self {
        Self {
            summary: RuleSummary::build(filter, catalogs),
            estimate,
            params: filter.query_params(),
        }
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Confirmation text, one line per field.
    pub fn message(&self) -> Vec<String> {
        let mut lines = vec![
            "This will create an automatic rule that continuously scans the EPG".to_string(),
            "for programmes to record that match this query:".to_string(),
            String::new(),
        ];
        for (label, value) in self.summary.fields() {
            lines.push(format!("{:<14}{}", format!("{}:", label), value));
        }
        lines.push(String::new());
        lines.push(format!(
            "Currently this will match (and record) {} events. Are you sure?",
            self.estimate
        ));
        lines
    }

    /// The predicate set to submit on confirmation; nothing on decline.
    pub fn decide(self, confirmed: bool) -> Option<Params> {
        confirmed.then_some(self.params)
    }
}
