use crate::model::{Record, RecordId};

/// Latest fetched records for one tab plus the filtered view shown to the user.
///
/// The view is a list of [`RecordId`]s into `records`, so a view index always
/// resolves to the record that was rendered at that position.
#[derive(Debug, Clone)]
pub struct TabStore<T> {
    records: Vec<T>,
    view: Vec<RecordId>,
    query: Option<String>,
}

impl<T> Default for TabStore<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            view: Vec::new(),
            query: None,
        }
    }
}

impl<T> TabStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every record and clears any active filter.
    pub fn replace(&mut self, records: Vec<T>) {
        self.view = (0..records.len()).map(RecordId).collect();
        self.records = records;
        self.query = None;
    }

    pub fn filter<P>(&mut self, mut predicate: P)
    where
        P: FnMut(&T) -> bool,
    {
        self.view = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, record)| predicate(record))
            .map(|(idx, _)| RecordId(idx))
            .collect();
        self.query = None;
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn view(&self) -> impl Iterator<Item = (RecordId, &T)> + '_ {
        self.view.iter().map(|id| (*id, &self.records[id.0]))
    }

    /// Record shown at `index` in the view.
    pub fn get(&self, index: usize) -> Option<(RecordId, &T)> {
        let id = *self.view.get(index)?;
        self.records.get(id.0).map(|record| (id, record))
    }

    pub fn resolve(&self, id: RecordId) -> Option<&T> {
        self.records.get(id.0)
    }

    /// View index of `id`, if it survived the current filter.
    pub fn position_of(&self, id: RecordId) -> Option<usize> {
        self.view.iter().position(|candidate| *candidate == id)
    }

    pub fn len(&self) -> usize {
        self.view.len()
    }

    pub fn is_empty(&self) -> bool {
        self.view.is_empty()
    }

    pub fn total(&self) -> usize {
        self.records.len()
    }

    pub fn active_query(&self) -> Option<&str> {
        self.query.as_deref()
    }
}

impl<T: Record> TabStore<T> {
    /// Case-insensitive substring match on each record's search text.
    /// A blank query shows every record.
    pub fn filter_text(&mut self, query: &str) {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            self.filter(|_| true);
            self.query = None;
            return;
        }
        self.filter(|record| record.search_text().to_lowercase().contains(&needle));
        self.query = Some(query.trim().to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Giveaway;

    fn giveaway(title: &str, url: &str) -> Giveaway {
        Giveaway {
            title: Some(title.into()),
            open_giveaway_url: Some(url.into()),
            ..Giveaway::default()
        }
    }

    fn sample() -> Vec<Giveaway> {
        vec![
            giveaway("Portal Bundle", "https://a"),
            giveaway("Space Trader", "https://b"),
            giveaway("Portal Knights", "https://c"),
            giveaway("Farm Life", "https://d"),
        ]
    }

    fn view_titles(store: &TabStore<Giveaway>) -> Vec<String> {
        store
            .view()
            .map(|(_, g)| g.title.clone().unwrap_or_default())
            .collect()
    }

    #[test]
    fn replace_shows_every_record() {
        let mut store = TabStore::new();
        store.replace(sample());
        assert_eq!(store.len(), 4);
        let records: Vec<&Giveaway> = store.records().iter().collect();
        let view: Vec<&Giveaway> = store.view().map(|(_, g)| g).collect();
        assert_eq!(view, records);
    }

    #[test]
    fn filter_keeps_records_and_narrows_view() {
        let mut store = TabStore::new();
        store.replace(sample());
        store.filter(|g| g.search_text().starts_with("Portal"));
        assert_eq!(view_titles(&store), vec!["Portal Bundle", "Portal Knights"]);
        assert_eq!(store.total(), 4);
        assert_eq!(store.records(), sample().as_slice());
    }

    #[test]
    fn replace_resets_active_filter() {
        let mut store = TabStore::new();
        store.replace(sample());
        store.filter_text("portal");
        assert_eq!(store.active_query(), Some("portal"));
        store.replace(sample());
        assert_eq!(store.active_query(), None);
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn filter_text_is_case_insensitive_and_blank_clears() {
        let mut store = TabStore::new();
        store.replace(sample());
        store.filter_text("  PORTAL ");
        assert_eq!(store.len(), 2);
        store.filter_text("   ");
        assert_eq!(store.len(), 4);
        assert_eq!(store.active_query(), None);
    }

    #[test]
    fn view_index_resolves_to_the_rendered_record() {
        let mut store = TabStore::new();
        store.replace(sample());
        store.filter_text("portal");
        let (id, record) = store.get(1).unwrap();
        assert_eq!(id, RecordId(2));
        assert_eq!(record.link(), Some("https://c"));
        assert_eq!(store.resolve(id), Some(record));
        assert_eq!(store.position_of(id), Some(1));
        assert_eq!(store.position_of(RecordId(1)), None);
        assert!(store.get(2).is_none());
    }

    #[test]
    fn alignment_holds_across_filter_and_replace_sequences() {
        let mut store = TabStore::new();
        let queries = ["portal", "", "space", "life", "zzz"];
        for (round, query) in queries.iter().enumerate() {
            let mut records = sample();
            let len = records.len();
            records.rotate_left(round % len);
            store.replace(records);
            store.filter_text(query);
            for (index, (id, record)) in store.view().enumerate() {
                let (got_id, got) = store.get(index).unwrap();
                assert_eq!(got_id, id);
                assert_eq!(got, record);
            }
        }
    }
}
