//! Search-as-you-type session.
//!
//! [`SearchSession`] owns the current query and the index snapshot. Each
//! non-empty [`set_query`](SearchSession::set_query) restarts a debounce timer
//! on the tokio runtime. When the timer fires the query runs and the results
//! are published on a `watch` channel. A newer query aborts the older timer,
//! and a generation counter stops a timer that already woke from publishing
//! over newer state.
//!
//! Must be driven from inside a tokio runtime.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use command_center_core::search::{
    group_results, search, GroupedResults, SearchIndex, SearchOptions, SearchResult,
};

/// What subscribers see.
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pub query: String,
    pub results: Vec<SearchResult>,
    pub is_searching: bool,
    generation: u64,
}

pub struct SearchSession {
    index: Arc<SearchIndex>,
    debounce: Duration,
    options: SearchOptions,
    tx: watch::Sender<SearchState>,
    pending: Option<JoinHandle<()>>,
    generation: u64,
}

impl SearchSession {
    pub fn new(index: Arc<SearchIndex>, debounce: Duration, max_results: usize) -> Self {
        let (tx, _rx) = watch::channel(SearchState::default());
        Self {
            index,
            debounce,
            options: SearchOptions {
                max_results,
                types: None,
            },
            tx,
            pending: None,
            generation: 0,
        }
    }

    /// Update the query. Blank queries clear results at once; anything else is
    /// searched after the debounce interval unless superseded first.
    pub fn set_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        self.cancel_pending();
        self.generation += 1;
        let generation = self.generation;

        if query.trim().is_empty() {
            self.tx.send_replace(SearchState {
                query,
                results: Vec::new(),
                is_searching: false,
                generation,
            });
            return;
        }

        self.tx.send_modify(|state| {
            state.query = query.clone();
            state.is_searching = true;
            state.generation = generation;
        });

        let index = Arc::clone(&self.index);
        let options = self.options.clone();
        let debounce = self.debounce;
        let tx = self.tx.clone();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            let results = search(&index, &query, &options);
            tx.send_if_modified(|state| {
                if state.generation != generation {
                    return false;
                }
                state.results = results;
                state.is_searching = false;
                true
            });
        }));
    }

    pub fn clear(&mut self) {
        self.set_query(String::new());
    }

    /// Swap in a fresh snapshot and rerun the current query against it.
    pub fn set_index(&mut self, index: Arc<SearchIndex>) {
        self.index = index;
        let query = self.query();
        self.set_query(query);
    }

    pub fn query(&self) -> String {
        self.tx.borrow().query.clone()
    }

    pub fn results(&self) -> Vec<SearchResult> {
        self.tx.borrow().results.clone()
    }

    pub fn grouped(&self) -> GroupedResults {
        group_results(&self.tx.borrow().results)
    }

    pub fn is_searching(&self) -> bool {
        self.tx.borrow().is_searching
    }

    pub fn is_indexed(&self) -> bool {
        self.index.is_indexed()
    }

    pub fn result_count(&self) -> usize {
        self.tx.borrow().results.len()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.tx.subscribe()
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use command_center_core::search::{build_index, IndexInputs};
    use command_center_core::source::index_from_source;
    use command_center_core::source::mock::MockDataSource;

    const DEBOUNCE: Duration = Duration::from_millis(20);

    async fn mock_index() -> Arc<SearchIndex> {
        let now = Utc.with_ymd_and_hms(2026, 2, 2, 12, 0, 0).unwrap();
        Arc::new(index_from_source(&MockDataSource::at(now)).await.unwrap())
    }

    async fn settle(session: &SearchSession) -> SearchState {
        let mut rx = session.subscribe();
        let state = tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| !s.is_searching))
            .await
            .expect("search did not settle")
            .unwrap()
            .clone();
        state
    }

    #[tokio::test]
    async fn test_blank_query_clears_immediately() {
        let mut session = SearchSession::new(mock_index().await, DEBOUNCE, 30);
        session.set_query("   ");
        assert!(!session.is_searching());
        assert_eq!(session.result_count(), 0);
    }

    #[tokio::test]
    async fn test_results_published_after_debounce() {
        let index = mock_index().await;
        let mut session = SearchSession::new(Arc::clone(&index), DEBOUNCE, 30);
        session.set_query("dealership");
        assert!(session.is_searching());
        assert_eq!(session.result_count(), 0);

        let state = settle(&session).await;
        let expected = search(&index, "dealership", &SearchOptions { max_results: 30, types: None });
        assert!(!expected.is_empty());
        assert_eq!(state.results, expected);
        assert_eq!(session.grouped().total(), expected.len());
    }

    #[tokio::test]
    async fn test_superseded_query_never_published() {
        let index = mock_index().await;
        let mut session = SearchSession::new(Arc::clone(&index), DEBOUNCE, 30);

        session.set_query("dealership");
        session.set_query("ga4");

        let state = settle(&session).await;
        assert_eq!(state.query, "ga4");
        let expected = search(&index, "ga4", &SearchOptions { max_results: 30, types: None });
        assert_eq!(state.results, expected);

        // Give an un-aborted first timer every chance to fire.
        tokio::time::sleep(DEBOUNCE * 5).await;
        assert_eq!(session.query(), "ga4");
        assert_eq!(session.results(), expected);
    }

    #[tokio::test]
    async fn test_clear_resets() {
        let mut session = SearchSession::new(mock_index().await, DEBOUNCE, 30);
        session.set_query("murphie");
        settle(&session).await;
        assert!(session.result_count() > 0);
        session.clear();
        assert_eq!(session.query(), "");
        assert_eq!(session.result_count(), 0);
        assert!(!session.is_searching());
    }

    #[tokio::test]
    async fn test_set_index_reruns_query() {
        let empty = Arc::new(build_index(&IndexInputs::default()));
        let mut session = SearchSession::new(empty, DEBOUNCE, 30);
        assert!(!session.is_indexed());

        session.set_query("dealership");
        let state = settle(&session).await;
        assert!(state.results.is_empty());

        session.set_index(mock_index().await);
        assert!(session.is_indexed());
        let state = settle(&session).await;
        assert!(!state.results.is_empty());
    }
}
