//! Generic scrollable + filterable list state.

pub struct ScrollableList<T> {
    items: Vec<T>,
    filtered: Vec<usize>,
    pub selected: usize,
    pub scroll_offset: usize,
    matches: Box<dyn Fn(&T, &str) -> bool + Send + Sync>,
}

impl<T> ScrollableList<T> {
    pub fn new(matches: impl Fn(&T, &str) -> bool + Send + Sync + 'static) -> Self {
        Self {
            items: Vec::new(),
            filtered: Vec::new(),
            selected: 0,
            scroll_offset: 0,
            matches: Box::new(matches),
        }
    }

    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.filtered = (0..self.items.len()).collect();
        self.selected = 0;
        self.scroll_offset = 0;
    }

    /// Narrow to items matching `query`; an empty query shows everything.
    pub fn set_filter(&mut self, query: &str) {
        self.filtered = if query.is_empty() {
            (0..self.items.len()).collect()
        } else {
            self.items
                .iter()
                .enumerate()
                .filter(|(_, item)| (self.matches)(item, query))
                .map(|(i, _)| i)
                .collect()
        };
        self.selected = 0;
        self.scroll_offset = 0;
    }

    pub fn len(&self) -> usize {
        self.filtered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filtered.is_empty()
    }

    pub fn select_up(&mut self, n: usize) {
        self.selected = self.selected.saturating_sub(n);
    }

    pub fn select_down(&mut self, n: usize) {
        self.selected = (self.selected + n).min(self.filtered.len().saturating_sub(1));
    }

    pub fn selected_item(&self) -> Option<&T> {
        self.filtered.get(self.selected).and_then(|&i| self.items.get(i))
    }

    /// Move the selection onto the first visible item satisfying `pred`.
    pub fn select_where(&mut self, pred: impl Fn(&T) -> bool) {
        if let Some(pos) = self
            .filtered
            .iter()
            .position(|&i| self.items.get(i).is_some_and(&pred))
        {
            self.selected = pos;
        }
    }

    /// Keep the selection inside a viewport of `height` rows.
    pub fn ensure_visible(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        } else if self.selected >= self.scroll_offset + height {
            self.scroll_offset = self.selected + 1 - height;
        }
    }

    /// `(position, item)` pairs for the rows currently in view.
    pub fn visible_items(&self, height: usize) -> Vec<(usize, &T)> {
        let end = (self.scroll_offset + height).min(self.filtered.len());
        (self.scroll_offset..end)
            .filter_map(|pos| self.items.get(self.filtered[pos]).map(|item| (pos, item)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list() -> ScrollableList<&'static str> {
        let mut l = ScrollableList::new(|s: &&str, q: &str| {
            s.to_lowercase().contains(&q.to_lowercase())
        });
        l.set_items(vec!["Arte", "BBC One", "BBC Two", "ZDF"]);
        l
    }

    #[test]
    fn test_filter_narrows_and_resets_selection() {
        let mut l = list();
        l.select_down(3);
        l.set_filter("bbc");
        assert_eq!(l.len(), 2);
        assert_eq!(l.selected_item(), Some(&"BBC One"));
    }

    #[test]
    fn test_scroll_follows_selection() {
        let mut l = list();
        l.select_down(3);
        l.ensure_visible(2);
        assert_eq!(l.scroll_offset, 2);
        let visible: Vec<_> = l.visible_items(2).into_iter().map(|(_, s)| *s).collect();
        assert_eq!(visible, vec!["BBC Two", "ZDF"]);
        l.select_up(10);
        l.ensure_visible(2);
        assert_eq!(l.scroll_offset, 0);
    }
}
