//! Configuration grids: channel tags, bouquets and elementary-stream filters.
//!
//! These are declarative bindings over the generic idnode REST resources.
//! Each resource knows its URL, titles, visible columns, default sort and
//! whether rows can be reordered; the rows themselves stay untyped JSON.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EsFilterClass {
    Video,
    Audio,
    Teletext,
    Subtitle,
    Ca,
    Other,
}

impl EsFilterClass {
    pub const ALL: [Self; 6] = [
        Self::Video,
        Self::Audio,
        Self::Teletext,
        Self::Subtitle,
        Self::Ca,
        Self::Other,
    ];

    fn slug(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Teletext => "teletext",
            Self::Subtitle => "subtit",
            Self::Ca => "ca",
            Self::Other => "other",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Video => "Video",
            Self::Audio => "Audio",
            Self::Teletext => "Teletext",
            Self::Subtitle => "Subtitle",
            Self::Ca => "CA",
            Self::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridResource {
    ChannelTag,
    Bouquet,
    EsFilter(EsFilterClass),
}

const BOUQUET_COLUMNS: &[&str] = &[
    "enabled",
    "rescan",
    "name",
    "maptoch",
    "mapnolcn",
    "lcn_off",
    "mapnoname",
    "mapradio",
    "chtag",
    "source",
    "services_count",
    "services_seen",
    "comment",
];

const TAG_COLUMNS: &[&str] = &["enabled", "name", "internal", "icon", "titled_icon", "comment"];

const ESFILTER_COLUMNS: &[&str] = &[
    "enabled", "type", "language", "service", "pid", "action", "log", "comment",
];

impl GridResource {
    /// Every grid in tab order.
    pub fn all() -> Vec<Self> {
        let mut v = vec![Self::ChannelTag, Self::Bouquet];
        v.extend(EsFilterClass::ALL.iter().map(|&c| Self::EsFilter(c)));
        v
    }

    pub fn url(self) -> String {
        match self {
            Self::ChannelTag => "api/channeltag".to_string(),
            Self::Bouquet => "api/bouquet".to_string(),
            Self::EsFilter(class) => format!("api/esfilter/{}", class.slug()),
        }
    }

    pub fn title_plural(self) -> String {
        match self {
            Self::ChannelTag => "Channel Tags".to_string(),
            Self::Bouquet => "Bouquets".to_string(),
            Self::EsFilter(class) => format!("{} Stream Filters", class.label()),
        }
    }

    pub fn title_singular(self) -> String {
        match self {
            Self::ChannelTag => "Channel Tag".to_string(),
            Self::Bouquet => "Bouquet".to_string(),
            Self::EsFilter(class) => format!("{} Stream Filter", class.label()),
        }
    }

    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Self::ChannelTag => TAG_COLUMNS,
            Self::Bouquet => BOUQUET_COLUMNS,
            Self::EsFilter(_) => ESFILTER_COLUMNS,
        }
    }

    /// Server-side sort as `(field, direction)`.
    pub fn sort(self) -> Option<(&'static str, &'static str)> {
        match self {
            Self::ChannelTag | Self::Bouquet => Some(("name", "ASC")),
            Self::EsFilter(_) => None,
        }
    }

    /// Stream filters are evaluated in order, so their rows can be moved.
    pub fn movable(self) -> bool {
        matches!(self, Self::EsFilter(_))
    }

    /// Channel tags list disabled entries too.
    pub fn include_all(self) -> bool {
        matches!(self, Self::ChannelTag)
    }
}

/// `GET <resource>/grid` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GridPage {
    #[serde(default)]
    pub entries: Vec<Map<String, Value>>,
    #[serde(default)]
    pub total: usize,
}

/// Node identifier of a grid row.
pub fn row_uuid(row: &Map<String, Value>) -> Option<&str> {
    row.get("uuid").and_then(Value::as_str)
}

/// Display text for one cell.  Booleans render as a check mark, missing
/// cells as empty text.
pub fn cell_text(row: &Map<String, Value>, column: &str) -> String {
    match row.get(column) {
        None | Some(Value::Null) => String::new(),
        Some(Value::Bool(true)) => "✓".to_string(),
        Some(Value::Bool(false)) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_urls() {
        assert_eq!(GridResource::ChannelTag.url(), "api/channeltag");
        assert_eq!(GridResource::Bouquet.url(), "api/bouquet");
        assert_eq!(
            GridResource::EsFilter(EsFilterClass::Subtitle).url(),
            "api/esfilter/subtit"
        );
        assert_eq!(GridResource::all().len(), 8);
    }

    #[test]
    fn test_only_stream_filters_move() {
        assert!(!GridResource::Bouquet.movable());
        assert!(GridResource::EsFilter(EsFilterClass::Ca).movable());
        assert_eq!(GridResource::Bouquet.sort(), Some(("name", "ASC")));
        assert_eq!(GridResource::EsFilter(EsFilterClass::Video).sort(), None);
    }

    #[test]
    fn test_cell_text_renders_json_values() {
        let row: Map<String, Value> = serde_json::from_str(
            r#"{"uuid": "ab12", "enabled": true, "rescan": false,
                "services_count": 42, "chtag": ["News", "HD"], "comment": null}"#,
        )
        .unwrap();
        assert_eq!(row_uuid(&row), Some("ab12"));
        assert_eq!(cell_text(&row, "enabled"), "✓");
        assert_eq!(cell_text(&row, "rescan"), "");
        assert_eq!(cell_text(&row, "services_count"), "42");
        assert_eq!(cell_text(&row, "chtag"), "News, HD");
        assert_eq!(cell_text(&row, "comment"), "");
        assert_eq!(cell_text(&row, "missing"), "");
    }
}
