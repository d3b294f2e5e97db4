//! State behind the event detail view.
//!
//! Opening a detail fires two independent side fetches (alternative
//! broadcasts and related episodes).  Their answers are accepted only while
//! the detail for the same event is still open.

use chrono::{DateTime, Local, Utc};
use reqwest::Url;

use crate::model::{AlternativeBroadcast, Event, RecordOp, RelatedEpisode};

const IMDB_FIND: &str = "http://akas.imdb.com/find";

#[derive(Debug, Clone)]
pub struct EventDetail {
    pub event: Event,
    pub alternatives: Option<Vec<AlternativeBroadcast>>,
    pub related: Option<Vec<RelatedEpisode>>,
    /// Selected DVR profile identifier; empty = server default.
    pub config_name: String,
    /// Set while a record request is outstanding.
    pub pending: Option<RecordOp>,
}

impl EventDetail {
    pub fn new(event: Event) -> Self {
        Self {
            event,
            alternatives: None,
            related: None,
            config_name: String::new(),
            pending: None,
        }
    }

    pub fn event_id(&self) -> u64 {
        self.event.id
    }

    /// Returns false (and ignores the data) when it belongs to another event.
    pub fn accept_alternatives(&mut self, event_id: u64, entries: Vec<AlternativeBroadcast>) -> bool {
        if event_id != self.event.id {
            return false;
        }
        self.alternatives = Some(entries);
        true
    }

    pub fn accept_related(&mut self, event_id: u64, entries: Vec<RelatedEpisode>) -> bool {
        if event_id != self.event.id {
            return false;
        }
        self.related = Some(entries);
        true
    }

    /// Label of the second record button.
    pub fn series_label(&self) -> &'static str {
        if self.event.has_series_link() {
            "Record series"
        } else {
            "Autorec"
        }
    }

    /// Title line: `title[ : subtitle]`.
    pub fn heading(&self) -> String {
        match self.event.subtitle() {
            Some(sub) => format!("{} : {}", self.event.title, sub),
            None => self.event.title.clone(),
        }
    }

    pub fn imdb_search_url(&self) -> Option<Url> {
        Url::parse_with_params(IMDB_FIND, &[("q", self.event.title.as_str())]).ok()
    }

    /// Play link, only while the programme is on air.
    pub fn play_url(&self, base: &str, now: DateTime<Utc>) -> Option<Url> {
        if !self.event.is_live(now) {
            return None;
        }
        self.event.play_url(&Url::parse(base).ok()?)
    }
}

/// `Monday 20:15  Arte`
pub fn alternative_line(alt: &AlternativeBroadcast) -> String {
    let local: DateTime<Local> = alt.start.with_timezone(&Local);
    format!("{}   {}", local.format("%A %H:%M"), alt.channel)
}

/// `[episode   ]title[ : subtitle]`
pub fn related_line(ep: &RelatedEpisode) -> String {
    let mut line = String::new();
    if let Some(e) = ep.episode.as_deref().filter(|e| !e.is_empty()) {
        line.push_str(e);
        line.push_str("   ");
    }
    line.push_str(&ep.title);
    if let Some(s) = ep.subtitle.as_deref().filter(|s| !s.is_empty()) {
        line.push_str(" : ");
        line.push_str(s);
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event(id: u64, serieslink: Option<&str>) -> Event {
        let start = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        Event {
            id,
            channel: "Arte".into(),
            channelid: "5".into(),
            title: "Tatort".into(),
            subtitle: Some("Der Fall".into()),
            episode: None,
            description: None,
            chicon: None,
            start,
            end: start + chrono::Duration::minutes(90),
            duration: 5400,
            starrating: 0,
            agerating: 0,
            contenttype: None,
            schedstate: None,
            serieslink: serieslink.map(str::to_string),
        }
    }

    #[test]
    fn test_side_panels_ignore_other_events() {
        let mut d = EventDetail::new(event(7, None));
        assert!(!d.accept_related(8, vec![]));
        assert!(d.related.is_none());
        assert!(d.accept_related(7, vec![]));
        assert_eq!(d.related.as_ref().map(Vec::len), Some(0));
    }

    #[test]
    fn test_series_button_label() {
        assert_eq!(EventDetail::new(event(1, Some("crid://x"))).series_label(), "Record series");
        assert_eq!(EventDetail::new(event(1, None)).series_label(), "Autorec");
    }

    #[test]
    fn test_play_only_while_live() {
        let d = EventDetail::new(event(1, None));
        let during = Utc.timestamp_opt(1_700_000_100, 0).unwrap();
        let later = Utc.timestamp_opt(1_700_010_000, 0).unwrap();
        let base = "http://tv.lan:9981/";
        assert!(d.play_url(base, during).is_some());
        assert!(d.play_url(base, later).is_none());
        assert!(d.play_url("not a url", during).is_none());
    }

    #[test]
    fn test_related_line_formats() {
        let ep = RelatedEpisode {
            uri: "u".into(),
            title: "Tatort".into(),
            subtitle: Some("Der Fall".into()),
            episode: Some("E12".into()),
        };
        assert_eq!(related_line(&ep), "E12   Tatort : Der Fall");
        assert_eq!(EventDetail::new(event(1, None)).heading(), "Tatort : Der Fall");
    }

    #[test]
    fn test_imdb_hint_encodes_title() {
        let mut ev = event(1, None);
        ev.title = "Tom & Jerry".into();
        let url = EventDetail::new(ev).imdb_search_url().unwrap();
        assert_eq!(url.as_str(), "http://akas.imdb.com/find?q=Tom+%26+Jerry");
    }
}
