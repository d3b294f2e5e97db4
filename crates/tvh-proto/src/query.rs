//! Buffered live query: a windowed cache over the server-paginated `epg`
//! result set.
//!
//! The query never touches the network.  `reload` and `ensure_window` hand
//! out [`FetchRequest`]s; whoever performs them feeds the result back through
//! [`BufferedLiveQuery::complete`].  Every request carries the predicate-set
//! version it was issued under, and a completion for any other version is
//! dropped without touching the cache.
//!
//! Within one version, completions are applied in issue order.  A response
//! that overtakes an earlier request waits in the in-flight queue until
//! everything before it has completed.

use std::collections::{BTreeMap, VecDeque};

use tracing::{debug, warn};

use crate::model::{EpgPage, Event};

pub type Params = Vec<(&'static str, String)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FetchId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// Initial window of a new predicate-set version.
    Reload,
    /// Fill-in for a scrolled-to range.
    Window,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub id: FetchId,
    pub version: u64,
    pub kind: FetchKind,
    pub start: usize,
    pub limit: usize,
    pub params: Params,
}

impl FetchRequest {
    pub fn end(&self) -> usize {
        self.start + self.limit
    }

    /// Full query string pairs: paging first, then predicates.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("start".to_string(), self.start.to_string()),
            ("limit".to_string(), self.limit.to_string()),
        ];
        pairs.extend(self.params.iter().map(|(k, v)| (k.to_string(), v.clone())));
        pairs
    }
}

/// What `complete` did with a response.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Merged into the cache (possibly together with held-back responses).
    Applied { rows: usize },
    /// Held until earlier requests of the same version complete.
    Deferred,
    /// Belongs to a superseded predicate set; discarded.
    Stale,
    /// Transport failure; the cached window is untouched.
    Failed(String),
}

#[derive(Debug)]
struct InFlight {
    request: FetchRequest,
    result: Option<Result<EpgPage, String>>,
}

impl InFlight {
    fn covers(&self, idx: usize) -> bool {
        idx >= self.request.start && idx < self.request.end()
    }
}

#[derive(Debug)]
pub struct BufferedLiveQuery {
    buffer_size: usize,
    near_limit: usize,
    max_cached: usize,

    version: u64,
    next_id: u64,
    params: Params,

    rows: BTreeMap<usize, Event>,
    /// Version the cached rows belong to.  Lags `version` while a reload is
    /// outstanding (or after it failed); the old rows stay visible meanwhile.
    rows_version: u64,
    total_count: usize,

    offset: usize,
    window_len: usize,

    in_flight: VecDeque<InFlight>,
    loading: bool,
    last_error: Option<String>,
}

impl BufferedLiveQuery {
    pub fn new(buffer_size: usize, near_limit: usize, max_cached: usize) -> Self {
        let buffer_size = buffer_size.max(1);
        Self {
            buffer_size,
            near_limit,
            max_cached: max_cached.max(buffer_size),
            version: 0,
            next_id: 0,
            params: Vec::new(),
            rows: BTreeMap::new(),
            rows_version: 0,
            total_count: 0,
            offset: 0,
            window_len: 0,
            in_flight: VecDeque::new(),
            loading: false,
            last_error: None,
        }
    }

    /// Start a new predicate-set version.  Everything cached or in flight
    /// for earlier versions is invalidated; the view jumps back to row 0.
    pub fn reload(&mut self, params: Params) -> FetchRequest {
        self.version += 1;
        self.params = params;
        self.offset = 0;
        self.in_flight.clear();
        self.loading = true;
        self.last_error = None;

        let request = self.issue(FetchKind::Reload, 0, self.buffer_size);
        debug!(
            "[epg] reload v{} params={:?}",
            self.version, request.params
        );
        request
    }

    /// Re-run the current predicates as a fresh version.
    pub fn refresh(&mut self) -> FetchRequest {
        let params = self.params.clone();
        self.reload(params)
    }

    /// Make sure `[offset, offset + length)` is cached or on its way.
    ///
    /// Only uncovered runs are requested; rows already cached or covered by
    /// an in-flight request are never asked for again.  The runs at either
    /// edge are widened by `near_limit` rows, stopping at anything already
    /// covered.
    pub fn ensure_window(&mut self, offset: usize, length: usize) -> Vec<FetchRequest> {
        self.offset = offset;
        self.window_len = length;

        if !self.is_current() {
            return Vec::new();
        }

        let end = offset.saturating_add(length).min(self.total_count);
        if offset >= end {
            return Vec::new();
        }

        let mut runs: Vec<(usize, usize)> = Vec::new();
        let mut idx = offset;
        while idx < end {
            if self.is_covered(idx) {
                idx += 1;
                continue;
            }
            let start = idx;
            while idx < end && !self.is_covered(idx) {
                idx += 1;
            }
            runs.push((start, idx));
        }

        if let Some(first) = runs.first_mut() {
            let floor = first.0.saturating_sub(self.near_limit);
            while first.0 > floor && !self.is_covered(first.0 - 1) {
                first.0 -= 1;
            }
        }
        if let Some(last) = runs.last_mut() {
            let ceil = end.saturating_add(self.near_limit).min(self.total_count);
            while last.1 < ceil && !self.is_covered(last.1) {
                last.1 += 1;
            }
        }

        let requests: Vec<FetchRequest> = runs
            .into_iter()
            .map(|(a, b)| self.issue(FetchKind::Window, a, b - a))
            .collect();
        for r in &requests {
            debug!(
                "[epg] window fetch #{} v{} rows {}..{}",
                r.id.0,
                r.version,
                r.start,
                r.end()
            );
        }
        self.evict();
        requests
    }

    /// Feed back the result of a request previously handed out.
    pub fn complete(&mut self, request: &FetchRequest, result: Result<EpgPage, String>) -> Outcome {
        if request.version != self.version {
            debug!(
                "[epg] dropping stale response #{} (v{}, current v{})",
                request.id.0, request.version, self.version
            );
            return Outcome::Stale;
        }
        let Some(slot) = self.in_flight.iter_mut().find(|f| f.request.id == request.id) else {
            return Outcome::Stale;
        };
        slot.result = Some(result);

        let mut outcome = Outcome::Deferred;
        while self.in_flight.front().map_or(false, |f| f.result.is_some()) {
            let Some(done) = self.in_flight.pop_front() else {
                break;
            };
            let Some(result) = done.result else {
                break;
            };
            let applied = self.apply(&done.request, result);
            if done.request.id == request.id {
                outcome = applied;
            }
        }
        outcome
    }

    fn apply(&mut self, request: &FetchRequest, result: Result<EpgPage, String>) -> Outcome {
        match result {
            Ok(page) => {
                if request.kind == FetchKind::Reload {
                    self.rows.clear();
                    self.rows_version = self.version;
                    self.loading = false;
                }
                self.last_error = None;
                self.total_count = page.total_count;
                let n = page.entries.len();
                for (i, ev) in page.entries.into_iter().enumerate() {
                    self.rows.insert(request.start + i, ev);
                }
                let total = self.total_count;
                self.rows.retain(|&idx, _| idx < total);
                self.evict();
                Outcome::Applied { rows: n }
            }
            Err(msg) => {
                warn!(
                    "[epg] fetch #{} rows {}..{} failed: {}",
                    request.id.0,
                    request.start,
                    request.end(),
                    msg
                );
                if request.kind == FetchKind::Reload {
                    self.loading = false;
                    self.last_error = Some(msg.clone());
                }
                Outcome::Failed(msg)
            }
        }
    }

    fn issue(&mut self, kind: FetchKind, start: usize, limit: usize) -> FetchRequest {
        self.next_id += 1;
        let request = FetchRequest {
            id: FetchId(self.next_id),
            version: self.version,
            kind,
            start,
            limit,
            params: self.params.clone(),
        };
        self.in_flight.push_back(InFlight {
            request: request.clone(),
            result: None,
        });
        request
    }

    fn is_covered(&self, idx: usize) -> bool {
        self.rows.contains_key(&idx) || self.in_flight.iter().any(|f| f.covers(idx))
    }

    /// Drop the rows farthest from the current window until the cache is
    /// back under its cap.
    fn evict(&mut self) {
        let lo = self.offset;
        let hi = self.offset + self.window_len;
        let distance = |idx: usize| {
            if idx < lo {
                lo - idx
            } else if idx >= hi {
                idx + 1 - hi
            } else {
                0
            }
        };
        while self.rows.len() > self.max_cached {
            let first = self.rows.keys().next().copied();
            let last = self.rows.keys().next_back().copied();
            let victim = match (first, last) {
                (Some(a), Some(b)) if distance(a) >= distance(b) => a,
                (_, Some(b)) => b,
                _ => break,
            };
            self.rows.remove(&victim);
        }
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn row(&self, idx: usize) -> Option<&Event> {
        self.rows.get(&idx)
    }

    /// Rows of `[offset, offset + length)`; `None` marks a row not yet loaded.
    pub fn window(&self, offset: usize, length: usize) -> Vec<Option<&Event>> {
        let end = offset.saturating_add(length).min(self.total_count);
        (offset..end).map(|i| self.rows.get(&i)).collect()
    }

    pub fn is_cached(&self, idx: usize) -> bool {
        self.rows.contains_key(&idx)
    }

    pub fn cached_len(&self) -> usize {
        self.rows.len()
    }

    /// Advisory: reflects the last successful response, not the live backend.
    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// True when the cached rows belong to the current predicate set.
    pub fn is_current(&self) -> bool {
        self.version > 0 && self.rows_version == self.version
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Error of the last failed reload; background window failures only log.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn event(idx: usize) -> Event {
        let start = Utc.timestamp_opt(1_700_000_000 + idx as i64 * 60, 0).unwrap();
        Event {
            id: idx as u64,
            channel: "Arte".into(),
            channelid: "5".into(),
            title: format!("Show {}", idx),
            subtitle: None,
            episode: None,
            description: None,
            chicon: None,
            start,
            end: start + chrono::Duration::minutes(30),
            duration: 1800,
            starrating: 0,
            agerating: 0,
            contenttype: None,
            schedstate: None,
            serieslink: None,
        }
    }

    /// Server stand-in with `total` rows numbered by position.
    fn serve(req: &FetchRequest, total: usize) -> Result<EpgPage, String> {
        let end = req.end().min(total);
        Ok(EpgPage {
            total_count: total,
            entries: (req.start..end).map(event).collect(),
        })
    }

    fn loaded(total: usize) -> BufferedLiveQuery {
        let mut q = BufferedLiveQuery::new(300, 100, 3000);
        let req = q.reload(Vec::new());
        assert_eq!(q.complete(&req, serve(&req, total)), Outcome::Applied { rows: 300.min(total) });
        q
    }

    #[test]
    fn test_reload_requests_initial_buffer() {
        let mut q = BufferedLiveQuery::new(300, 100, 3000);
        let req = q.reload(vec![("title", "News".to_string())]);
        assert_eq!((req.start, req.limit, req.kind), (0, 300, FetchKind::Reload));
        assert_eq!(req.version, 1);
        assert!(q.loading());
        q.complete(&req, serve(&req, 1000));
        assert!(!q.loading());
        assert!(q.is_current());
        assert_eq!(q.total_count(), 1000);
        assert_eq!(q.cached_len(), 300);
    }

    #[test]
    fn test_cached_window_issues_no_fetch() {
        let mut q = loaded(1000);
        assert!(q.ensure_window(0, 40).is_empty());
        assert!(q.ensure_window(150, 40).is_empty());
    }

    #[test]
    fn test_window_fetch_covers_only_missing_rows_plus_lookahead() {
        let mut q = loaded(1000);
        let reqs = q.ensure_window(280, 40);
        assert_eq!(reqs.len(), 1);
        // rows 280..300 are cached; fetch starts at 300 and runs 100 past 320
        assert_eq!((reqs[0].start, reqs[0].end()), (300, 420));
        assert_eq!(reqs[0].kind, FetchKind::Window);
    }

    #[test]
    fn test_lookahead_stops_at_total_count() {
        let mut q = loaded(330);
        let reqs = q.ensure_window(290, 30);
        assert_eq!((reqs[0].start, reqs[0].end()), (300, 330));
    }

    #[test]
    fn test_in_flight_range_is_not_requested_twice() {
        let mut q = loaded(1000);
        let first = q.ensure_window(280, 40);
        assert_eq!(first.len(), 1);
        assert!(q.ensure_window(290, 40).is_empty());
        assert_eq!(q.in_flight(), 1);
    }

    #[test]
    fn test_gap_between_cached_runs_fetched_separately() {
        let mut q = BufferedLiveQuery::new(10, 0, 3000);
        let req = q.reload(Vec::new());
        q.complete(&req, serve(&req, 100));
        let far = q.ensure_window(20, 5);
        assert_eq!((far[0].start, far[0].end()), (20, 25));
        q.complete(&far[0], serve(&far[0], 100));
        let reqs = q.ensure_window(5, 25);
        let spans: Vec<(usize, usize)> = reqs.iter().map(|r| (r.start, r.end())).collect();
        assert_eq!(spans, vec![(10, 20), (25, 30)]);
    }

    #[test]
    fn test_reload_resets_offset() {
        let mut q = loaded(1000);
        q.ensure_window(280, 40);
        assert_eq!(q.offset(), 280);
        q.reload(vec![("title", "News".to_string())]);
        assert_eq!(q.offset(), 0);
    }

    #[test]
    fn test_stale_response_never_touches_window() {
        let mut q = loaded(1000);
        let old_window = q.ensure_window(280, 40).remove(0);
        let old_reload = q.refresh();
        let new_reload = q.reload(vec![("tag", "Sports".to_string())]);
        let snapshot = q.row(0).cloned();

        assert_eq!(q.complete(&old_window, serve(&old_window, 1000)), Outcome::Stale);
        assert_eq!(q.complete(&old_reload, serve(&old_reload, 1000)), Outcome::Stale);
        assert_eq!(q.row(0).cloned(), snapshot);
        assert!(!q.is_cached(300));
        assert_eq!(q.total_count(), 1000);

        let fresh = Ok(EpgPage {
            total_count: 2,
            entries: vec![event(77), event(78)],
        });
        assert_eq!(q.complete(&new_reload, fresh), Outcome::Applied { rows: 2 });
        assert_eq!(q.row(0).map(|e| e.id), Some(77));
        assert_eq!(q.total_count(), 2);
        assert_eq!(q.cached_len(), 2);
    }

    #[test]
    fn test_out_of_order_completion_waits_for_earlier_request() {
        let mut q = BufferedLiveQuery::new(10, 0, 3000);
        let req = q.reload(Vec::new());
        q.complete(&req, serve(&req, 100));
        let a = q.ensure_window(10, 10).remove(0);
        let b = q.ensure_window(40, 10).remove(0);

        let late_total = Ok(EpgPage {
            total_count: 120,
            entries: (40..50).map(event).collect(),
        });
        assert_eq!(q.complete(&b, late_total), Outcome::Deferred);
        assert!(!q.is_cached(40));

        assert_eq!(q.complete(&a, serve(&a, 100)), Outcome::Applied { rows: 10 });
        assert!(q.is_cached(15));
        assert!(q.is_cached(45));
        // b was issued last, so its total wins
        assert_eq!(q.total_count(), 120);
    }

    #[test]
    fn test_failed_reload_keeps_previous_window() {
        let mut q = loaded(1000);
        let before = q.row(5).cloned();
        let req = q.reload(vec![("channel", "5".to_string())]);
        assert_eq!(
            q.complete(&req, Err("503 Service Unavailable".into())),
            Outcome::Failed("503 Service Unavailable".into())
        );
        assert_eq!(q.row(5).cloned(), before);
        assert!(!q.loading());
        assert!(!q.is_current());
        assert_eq!(q.last_error(), Some("503 Service Unavailable"));
        // nothing to fill until the user retries
        assert!(q.ensure_window(0, 20).is_empty());
        let retry = q.refresh();
        assert_eq!(retry.params, vec![("channel", "5".to_string())]);
    }

    #[test]
    fn test_failed_window_fetch_can_be_retried() {
        let mut q = loaded(1000);
        let req = q.ensure_window(500, 10).remove(0);
        assert!(matches!(q.complete(&req, Err("timeout".into())), Outcome::Failed(_)));
        assert!(q.row(0).is_some());
        assert_eq!(q.last_error(), None);
        let again = q.ensure_window(500, 10);
        assert_eq!(again.len(), 1);
        assert_eq!(again[0].start, req.start);
    }

    #[test]
    fn test_eviction_drops_rows_far_from_viewport() {
        let mut q = BufferedLiveQuery::new(50, 0, 100);
        let req = q.reload(Vec::new());
        q.complete(&req, serve(&req, 1000));
        for start in [50, 100, 150] {
            let r = q.ensure_window(start, 50).remove(0);
            q.complete(&r, serve(&r, 1000));
        }
        assert!(q.cached_len() <= 100);
        assert!(q.is_cached(150));
        assert!(q.is_cached(199));
        assert!(!q.is_cached(0));
    }

    #[test]
    fn test_query_pairs_put_paging_first() {
        let mut q = BufferedLiveQuery::new(300, 100, 3000);
        let req = q.reload(vec![("tag", "Sports".to_string())]);
        assert_eq!(
            req.query_pairs(),
            vec![
                ("start".to_string(), "0".to_string()),
                ("limit".to_string(), "300".to_string()),
                ("tag".to_string(), "Sports".to_string()),
            ]
        );
    }
}
