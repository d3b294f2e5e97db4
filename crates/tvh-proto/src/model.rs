//! Wire types for the tvheadend web API.
//!
//! Field names follow the JSON the server emits; Rust-side names are only
//! changed where the wire name is not a valid or readable identifier.

use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::{Deserialize, Deserializer, Serialize};

/// One scheduled programme instance, as returned by `GET epg`.
///
/// Never patched in place: a re-fetch replaces the whole record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: u64,
    /// Channel display name.
    #[serde(default)]
    pub channel: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub channelid: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub episode: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub chicon: Option<String>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub start: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub end: DateTime<Utc>,
    /// Seconds.
    #[serde(default)]
    pub duration: i64,
    #[serde(default)]
    pub starrating: u32,
    #[serde(default)]
    pub agerating: u32,
    #[serde(default)]
    pub contenttype: Option<u32>,
    #[serde(default)]
    pub schedstate: Option<String>,
    #[serde(default)]
    pub serieslink: Option<String>,
}

impl Event {
    /// True once the programme's start time has passed.  Evaluated at render
    /// time; the answer is never stored on the record.
    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        now > self.start
    }

    /// True while the programme is on air right now.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.start < now && self.end > now
    }

    pub fn subtitle(&self) -> Option<&str> {
        self.subtitle.as_deref().filter(|s| !s.is_empty())
    }

    pub fn episode(&self) -> Option<&str> {
        self.episode.as_deref().filter(|s| !s.is_empty())
    }

    pub fn has_series_link(&self) -> bool {
        self.serieslink.as_deref().map_or(false, |s| !s.is_empty())
    }

    /// Live stream of this event's channel, resolved against the server base.
    pub fn play_url(&self, base: &Url) -> Option<Url> {
        let mut title = self.title.clone();
        if let Some(ep) = self.episode() {
            title.push_str(" / ");
            title.push_str(ep);
        }
        let mut url = base
            .join(&format!("play/stream/channelid/{}", self.channelid))
            .ok()?;
        url.query_pairs_mut().append_pair("title", &title);
        Some(url)
    }
}

/// `GET epg` response body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EpgPage {
    #[serde(rename = "totalCount", default)]
    pub total_count: usize,
    #[serde(default)]
    pub entries: Vec<Event>,
}

/// The `{ entries: [...] }` envelope used by every list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryList<T> {
    #[serde(default = "Vec::new")]
    pub entries: Vec<T>,
}

/// Which related-record collection to ask `epgrelated` for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelatedKind {
    /// Same programme broadcast at other times / on other channels.
    Alternative,
    /// Other episodes sharing the series link.
    Related,
}

impl RelatedKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Alternative => "alternative",
            Self::Related => "related",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeBroadcast {
    pub id: u64,
    #[serde(default)]
    pub channel: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub start: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedEpisode {
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub episode: Option<String>,
}

/// Content-group (genre) catalog row from `GET ecglist`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentGroup {
    pub name: String,
    pub code: u32,
}

/// Channel catalog row from `GET chlist`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelEntry {
    #[serde(deserialize_with = "string_or_number")]
    pub key: String,
    pub val: String,
}

/// Channel tag row from `GET channeltags?op=listTags`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelTag {
    #[serde(deserialize_with = "string_or_number")]
    pub identifier: String,
    pub name: String,
}

/// DVR configuration profile from `GET confignames?op=list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigName {
    #[serde(default, deserialize_with = "string_or_number")]
    pub identifier: String,
    pub name: String,
}

/// Record actions offered by the event detail view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOp {
    Event,
    Series,
}

impl RecordOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Event => "recordEvent",
            Self::Series => "recordSeries",
        }
    }
}

/// Accepts `"12"` or `12` and yields `"12"`; `null` yields `""`.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}
