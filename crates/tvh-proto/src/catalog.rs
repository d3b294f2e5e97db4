//! Reference catalogs: channels, channel tags, content groups, DVR profiles
//! and the fixed duration buckets.
//!
//! Catalogs are loaded once and then only read.  Consumers receive them by
//! reference (the console keeps an `Arc<Catalogs>` and swaps it on refresh),
//! so no lookup ever blocks and no lookup ever fails: a miss is `""`.

use tracing::{info, warn};

use crate::client::TvhClient;
use crate::model::{ChannelEntry, ChannelTag, ConfigName, ContentGroup};

/// One stop on the duration range slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationBucket {
    pub ordinal: usize,
    pub label: &'static str,
    pub seconds: u32,
}

pub const DURATION_BUCKETS: [DurationBucket; 8] = [
    DurationBucket { ordinal: 0, label: "0 min", seconds: 0 },
    DurationBucket { ordinal: 1, label: "20 min", seconds: 1200 },
    DurationBucket { ordinal: 2, label: "45 min", seconds: 2700 },
    DurationBucket { ordinal: 3, label: "90 min", seconds: 5400 },
    DurationBucket { ordinal: 4, label: "3 hrs", seconds: 10800 },
    DurationBucket { ordinal: 5, label: "6 hrs", seconds: 21600 },
    DurationBucket { ordinal: 6, label: "12 hrs", seconds: 43200 },
    DurationBucket { ordinal: 7, label: "24 hrs", seconds: 86400 },
];

pub const FIRST_BUCKET: usize = 0;
pub const LAST_BUCKET: usize = DURATION_BUCKETS.len() - 1;

/// Bucket by slider ordinal.  Out-of-range ordinals clamp to the last bucket.
pub fn bucket(ordinal: usize) -> &'static DurationBucket {
    &DURATION_BUCKETS[ordinal.min(LAST_BUCKET)]
}

/// Label of the bucket whose canonical seconds equal `seconds`, else `""`.
pub fn duration_label(seconds: u32) -> &'static str {
    DURATION_BUCKETS
        .iter()
        .find(|b| b.seconds == seconds)
        .map(|b| b.label)
        .unwrap_or("")
}

#[derive(Debug, Clone, Default)]
pub struct Catalogs {
    pub channels: Vec<ChannelEntry>,
    pub tags: Vec<ChannelTag>,
    /// Sorted by code ascending; order decides family-fallback ties.
    pub content_groups: Vec<ContentGroup>,
    pub config_names: Vec<ConfigName>,
}

impl Catalogs {
    pub fn new(
        channels: Vec<ChannelEntry>,
        tags: Vec<ChannelTag>,
        mut content_groups: Vec<ContentGroup>,
        config_names: Vec<ConfigName>,
    ) -> Self {
        content_groups.sort_by_key(|g| g.code);
        Self {
            channels,
            tags,
            content_groups,
            config_names,
        }
    }

    /// Fetch every catalog concurrently.  A catalog whose request fails is
    /// left empty; the rest still load.
    pub async fn load(client: &TvhClient) -> Self {
        let (channels, tags, groups, configs) = tokio::join!(
            client.channels(),
            client.channel_tags(),
            client.content_groups(),
            client.config_names(),
        );

        let catalogs = Self::new(
            or_empty("channels", channels),
            or_empty("channel tags", tags),
            or_empty("content groups", groups),
            or_empty("dvr configs", configs),
        );
        info!(
            "[catalog] loaded {} channels, {} tags, {} content groups, {} dvr configs",
            catalogs.channels.len(),
            catalogs.tags.len(),
            catalogs.content_groups.len(),
            catalogs.config_names.len()
        );
        catalogs
    }

    pub fn channel_name(&self, key: &str) -> &str {
        self.channels
            .iter()
            .find(|c| c.key == key)
            .map(|c| c.val.as_str())
            .unwrap_or("")
    }

    /// Display form of a selected channel: its name, or the raw key when the
    /// catalog does not know it.
    pub fn channel_label(&self, key: &str) -> String {
        match self.channel_name(key) {
            "" => key.to_string(),
            name => name.to_string(),
        }
    }

    /// Exact code match wins; otherwise the first group whose code equals
    /// the genre family (`code & 0xF0`).
    pub fn content_group_name(&self, code: u32) -> &str {
        let family = code & 0xF0;
        self.content_groups
            .iter()
            .find(|g| g.code == code)
            .or_else(|| self.content_groups.iter().find(|g| g.code == family))
            .map(|g| g.name.as_str())
            .unwrap_or("")
    }

    /// Display form of a selected content type; unknown codes show as hex.
    pub fn content_group_label(&self, code: u32) -> String {
        match self.content_group_name(code) {
            "" => format!("0x{:02x}", code),
            name => name.to_string(),
        }
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t.name == name)
    }

    pub fn config_label<'a>(&'a self, identifier: &str) -> &'a str {
        if identifier.is_empty() {
            return "(default)";
        }
        self.config_names
            .iter()
            .find(|c| c.identifier == identifier)
            .map(|c| c.name.as_str())
            .unwrap_or("")
    }
}

fn or_empty<T, E: std::fmt::Display>(what: &str, result: Result<Vec<T>, E>) -> Vec<T> {
    match result {
        Ok(v) => v,
        Err(e) => {
            warn!("[catalog] {} load failed: {}", what, e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(name: &str, code: u32) -> ContentGroup {
        ContentGroup {
            name: name.into(),
            code,
        }
    }

    fn catalogs() -> Catalogs {
        Catalogs::new(
            vec![ChannelEntry {
                key: "5".into(),
                val: "Arte".into(),
            }],
            vec![ChannelTag {
                identifier: "1".into(),
                name: "Sports".into(),
            }],
            vec![
                group("Sports", 0x40),
                group("Movie / Drama", 0x10),
                group("Football", 0x43),
                group("Detective / Thriller", 0x11),
            ],
            Vec::new(),
        )
    }

    #[test]
    fn test_content_groups_sorted_by_code() {
        let c = catalogs();
        let codes: Vec<u32> = c.content_groups.iter().map(|g| g.code).collect();
        assert_eq!(codes, vec![0x10, 0x11, 0x40, 0x43]);
    }

    #[test]
    fn test_exact_content_code_beats_family() {
        let c = catalogs();
        assert_eq!(c.content_group_name(0x43), "Football");
        assert_eq!(c.content_group_name(0x11), "Detective / Thriller");
    }

    #[test]
    fn test_content_code_falls_back_to_family() {
        let c = catalogs();
        assert_eq!(c.content_group_name(0x44), "Sports");
        assert_eq!(c.content_group_name(0x1F), "Movie / Drama");
    }

    #[test]
    fn test_content_code_miss_is_empty() {
        let c = catalogs();
        assert_eq!(c.content_group_name(0x90), "");
        assert_eq!(Catalogs::default().content_group_name(0x10), "");
    }

    #[test]
    fn test_channel_lookup() {
        let c = catalogs();
        assert_eq!(c.channel_name("5"), "Arte");
        assert_eq!(c.channel_name("6"), "");
    }

    #[test]
    fn test_labels_fall_back_to_raw_values() {
        let c = catalogs();
        assert_eq!(c.channel_label("5"), "Arte");
        assert_eq!(c.channel_label("6"), "6");
        assert_eq!(c.content_group_label(0x1F), "Movie / Drama");
        assert_eq!(c.content_group_label(0x90), "0x90");
    }

    #[test]
    fn test_duration_labels() {
        assert_eq!(duration_label(0), "0 min");
        assert_eq!(duration_label(5400), "90 min");
        assert_eq!(duration_label(86400), "24 hrs");
        assert_eq!(duration_label(60), "");
        assert_eq!(bucket(3).seconds, 5400);
        assert_eq!(bucket(99).ordinal, LAST_BUCKET);
    }

    #[test]
    fn test_config_label_default_profile() {
        let c = catalogs();
        assert_eq!(c.config_label(""), "(default)");
        assert_eq!(c.config_label("nope"), "");
    }
}
