//! EPG browser: filter state wired into the buffered live query.
//!
//! Updates flow one way.  A filter setter that changes something produces
//! exactly one reload request; a setter that does not change anything
//! produces nothing.

use tracing::info;

use crate::autorec::AutoRecPreview;
use crate::catalog::Catalogs;
use crate::config::EpgConfig;
use crate::filter::FilterState;
use crate::model::EpgPage;
use crate::query::{BufferedLiveQuery, FetchRequest, Outcome};

#[derive(Debug)]
pub struct EpgBrowser {
    filter: FilterState,
    query: BufferedLiveQuery,
}

impl EpgBrowser {
    pub fn new(config: &EpgConfig) -> Self {
        Self {
            filter: FilterState::new(),
            query: BufferedLiveQuery::new(
                config.buffer_size,
                config.near_limit,
                config.max_cached_rows,
            ),
        }
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn query(&self) -> &BufferedLiveQuery {
        &self.query
    }

    /// First load, with whatever filters are set (normally none).
    pub fn start(&mut self) -> FetchRequest {
        self.reload()
    }

    pub fn refresh(&mut self) -> FetchRequest {
        self.query.refresh()
    }

    pub fn set_title(&mut self, text: Option<&str>) -> Option<FetchRequest> {
        let changed = self.filter.set_title(text);
        self.reload_if(changed)
    }

    pub fn set_channel(&mut self, key: Option<&str>) -> Option<FetchRequest> {
        let changed = self.filter.set_channel(key);
        self.reload_if(changed)
    }

    pub fn set_tag(&mut self, name: Option<&str>) -> Option<FetchRequest> {
        let changed = self.filter.set_tag(name);
        self.reload_if(changed)
    }

    pub fn set_content_type(&mut self, code: Option<u32>) -> Option<FetchRequest> {
        let changed = self.filter.set_content_type(code);
        self.reload_if(changed)
    }

    pub fn set_duration_range(&mut self, min_bucket: usize, max_bucket: usize) -> Option<FetchRequest> {
        let changed = self.filter.set_duration_range(min_bucket, max_bucket);
        self.reload_if(changed)
    }

    /// Reset every predicate.  Always reloads, once.
    pub fn clear_all(&mut self) -> FetchRequest {
        self.filter.clear_all();
        self.reload()
    }

    pub fn ensure_window(&mut self, offset: usize, length: usize) -> Vec<FetchRequest> {
        self.query.ensure_window(offset, length)
    }

    pub fn complete(&mut self, request: &FetchRequest, result: Result<EpgPage, String>) -> Outcome {
        self.query.complete(request, result)
    }

    /// Number of reloads issued so far.
    pub fn reloads(&self) -> u64 {
        self.query.version()
    }

    pub fn auto_record_preview(&self, catalogs: &Catalogs) -> AutoRecPreview {
        AutoRecPreview::new(&self.filter, catalogs, self.query.total_count())
    }

    fn reload_if(&mut self, changed: bool) -> Option<FetchRequest> {
        changed.then(|| self.reload())
    }

    fn reload(&mut self) -> FetchRequest {
        let request = self.query.reload(self.filter.query_params());
        info!(
            "[epg] reload v{} ({} active filters)",
            request.version,
            self.filter.active_count()
        );
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::DurationRange;

    fn browser() -> EpgBrowser {
        EpgBrowser::new(&EpgConfig::default())
    }

    #[test]
    fn test_same_channel_twice_reloads_once() {
        let mut b = browser();
        assert!(b.set_channel(Some("5")).is_some());
        assert!(b.set_channel(Some("5")).is_none());
        assert_eq!(b.reloads(), 1);
    }

    #[test]
    fn test_every_setter_is_idempotent() {
        let mut b = browser();
        b.set_title(Some("News"));
        b.set_tag(Some("Sports"));
        b.set_content_type(Some(0x40));
        b.set_duration_range(1, 6);
        let before = b.reloads();
        assert!(b.set_title(Some("News")).is_none());
        assert!(b.set_tag(Some("Sports")).is_none());
        assert!(b.set_content_type(Some(0x40)).is_none());
        assert!(b.set_duration_range(1, 6).is_none());
        assert_eq!(b.reloads(), before);
    }

    #[test]
    fn test_clear_all_reloads_exactly_once() {
        let mut b = browser();
        b.set_channel(Some("5"));
        b.set_tag(Some("Kids"));
        b.set_duration_range(2, 4);
        let before = b.reloads();
        let req = b.clear_all();
        assert_eq!(b.reloads(), before + 1);
        assert!(req.params.is_empty());
        assert_eq!(b.filter().duration(), DurationRange::FULL);
        assert_eq!(b.filter().active_count(), 0);
    }

    #[test]
    fn test_reload_carries_current_predicates() {
        let mut b = browser();
        let req = b.set_title(Some("News")).unwrap();
        assert_eq!(req.params, vec![("title", "News".to_string())]);
        assert_eq!(req.start, 0);
    }

    #[test]
    fn test_preview_uses_last_total_count() {
        let mut b = browser();
        let req = b.set_tag(Some("Sports")).unwrap();
        b.complete(
            &req,
            Ok(EpgPage {
                total_count: 42,
                entries: Vec::new(),
            }),
        );
        let preview = b.auto_record_preview(&Catalogs::default());
        assert_eq!(preview.estimate, 42);
        assert_eq!(preview.summary.tag, "Sports");
    }
}
