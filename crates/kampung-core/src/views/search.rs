//! Debounced user search.
//!
//! Every query change bumps a generation counter and cancels the pending
//! task. A task sleeps for the debounce interval, runs the search, and
//! applies the result only if its generation is still the latest, so a slow
//! response for an old query can never overwrite a newer one.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use kampung_types::{Id, UserSummary};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::api::ApiResult;
use crate::session::AuthSession;

pub const SEARCH_FAILED: &str = "Failed to search users";

/// Backend for [`SearchView`].
pub trait UserSearch: Clone + Send + Sync + 'static {
    fn search_users(
        &self,
        query: &str,
    ) -> impl Future<Output = ApiResult<Vec<UserSummary>>> + Send;
}

impl UserSearch for AuthSession {
    fn search_users(
        &self,
        query: &str,
    ) -> impl Future<Output = ApiResult<Vec<UserSummary>>> + Send {
        let session = self.clone();
        let query = query.to_string();
        async move { session.run(session.api().users().search(&query)).await }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    pub query: String,
    pub users: Vec<UserSummary>,
    pub loading: bool,
    pub error: Option<String>,
}

struct Pending {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Search page state. Must be used inside a tokio runtime.
pub struct SearchView<S> {
    searcher: S,
    debounce: Duration,
    state: Arc<watch::Sender<SearchState>>,
    generation: Arc<AtomicU64>,
    pending: Option<Pending>,
}

impl<S: UserSearch> SearchView<S> {
    pub fn new(searcher: S, debounce: Duration) -> Self {
        let (state, _) = watch::channel(SearchState::default());
        Self {
            searcher,
            debounce,
            state: Arc::new(state),
            generation: Arc::new(AtomicU64::new(0)),
            pending: None,
        }
    }

    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    /// Records a new query and schedules a search for it.
    ///
    /// A blank query clears the results at once and schedules nothing.
    pub fn set_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.cancel_pending();

        if query.trim().is_empty() {
            self.state.send_modify(|state| {
                state.query = query;
                state.users.clear();
                state.loading = false;
                state.error = None;
            });
            return;
        }

        self.state.send_modify(|state| state.query.clone_from(&query));
        let cancel = CancellationToken::new();
        let task = tokio::spawn(search_after_idle(
            self.searcher.clone(),
            query,
            self.debounce,
            Ticket {
                generation,
                latest: Arc::clone(&self.generation),
            },
            Arc::clone(&self.state),
            cancel.clone(),
        ));
        self.pending = Some(Pending { cancel, task });
    }

    /// Waits for the scheduled search, if any, to finish.
    pub async fn settle(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        if let Err(err) = pending.task.await
            && !err.is_cancelled()
        {
            tracing::warn!("search task failed: {err}");
        }
    }

    /// Patches one result after its follow state changed elsewhere.
    pub fn on_follow_change(&self, user_id: &Id, following: bool) {
        self.state.send_if_modified(|state| {
            let Some(user) = state.users.iter_mut().find(|user| &user.id == user_id) else {
                return false;
            };
            user.following = following;
            true
        });
    }

    fn cancel_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.cancel.cancel();
        }
    }
}

impl<S> Drop for SearchView<S> {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.cancel.cancel();
        }
    }
}

struct Ticket {
    generation: u64,
    latest: Arc<AtomicU64>,
}

impl Ticket {
    fn is_current(&self) -> bool {
        self.latest.load(Ordering::SeqCst) == self.generation
    }
}

async fn search_after_idle<S: UserSearch>(
    searcher: S,
    query: String,
    debounce: Duration,
    ticket: Ticket,
    state: Arc<watch::Sender<SearchState>>,
    cancel: CancellationToken,
) {
    tokio::select! {
        () = cancel.cancelled() => return,
        () = tokio::time::sleep(debounce) => {}
    }

    if !state.send_if_modified(|state| {
        if !ticket.is_current() {
            return false;
        }
        state.loading = true;
        state.error = None;
        true
    }) {
        return;
    }

    tracing::debug!(generation = ticket.generation, "searching users");
    let result = tokio::select! {
        () = cancel.cancelled() => return,
        result = searcher.search_users(&query) => result,
    };

    state.send_if_modified(|state| {
        if !ticket.is_current() {
            tracing::debug!(generation = ticket.generation, "dropping stale search results");
            return false;
        }
        state.loading = false;
        match result {
            Ok(users) => state.users = users,
            Err(err) => {
                tracing::debug!("user search failed: {err}");
                state.error = Some(SEARCH_FAILED.to_string());
            }
        }
        true
    });
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;
    use crate::api::ApiError;

    const DEBOUNCE: Duration = Duration::from_millis(300);

    #[derive(Clone, Default)]
    struct FakeSearch {
        calls: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    impl FakeSearch {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl UserSearch for FakeSearch {
        fn search_users(
            &self,
            query: &str,
        ) -> impl Future<Output = ApiResult<Vec<UserSummary>>> + Send {
            self.calls.lock().unwrap().push(query.to_string());
            let delay = if query == "slow" {
                Duration::from_secs(1)
            } else {
                Duration::ZERO
            };
            let fail = self.fail;
            let query = query.to_string();
            async move {
                tokio::time::sleep(delay).await;
                if fail {
                    return Err(ApiError::http_status(500, ""));
                }
                let user = serde_json::from_value(json!({ "id": 1, "username": query })).unwrap();
                Ok(vec![user])
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_keystrokes_collapse_into_one_call() {
        let fake = FakeSearch::default();
        let mut view = SearchView::new(fake.clone(), DEBOUNCE);

        for query in ["a", "al", "ali"] {
            view.set_query(query);
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        view.settle().await;

        assert_eq!(fake.calls(), vec!["ali".to_string()]);
        let state = view.state();
        assert_eq!(state.users[0].username, "ali");
        assert!(!state.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_query_clears_without_call() {
        let fake = FakeSearch::default();
        let mut view = SearchView::new(fake.clone(), DEBOUNCE);

        view.set_query("bob");
        view.settle().await;
        assert_eq!(view.state().users.len(), 1);

        view.set_query("   ");
        view.settle().await;
        assert!(view.state().users.is_empty());
        assert_eq!(fake.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_response_never_wins() {
        let fake = FakeSearch::default();
        let mut view = SearchView::new(fake.clone(), DEBOUNCE);

        view.set_query("slow");
        // Past the debounce: the slow search is in flight.
        tokio::time::sleep(Duration::from_millis(350)).await;
        view.set_query("fast");
        view.settle().await;
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(fake.calls(), vec!["slow".to_string(), "fast".to_string()]);
        assert_eq!(view.state().users[0].username, "fast");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_sets_message() {
        let fake = FakeSearch {
            fail: true,
            ..FakeSearch::default()
        };
        let mut view = SearchView::new(fake, DEBOUNCE);

        view.set_query("ali");
        view.settle().await;
        let state = view.state();
        assert_eq!(state.error.as_deref(), Some("Failed to search users"));
        assert!(!state.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_follow_change_patches_entry() {
        let fake = FakeSearch::default();
        let mut view = SearchView::new(fake, DEBOUNCE);
        view.set_query("ali");
        view.settle().await;

        view.on_follow_change(&Id::Num(1), true);
        assert!(view.state().users[0].following);
        view.on_follow_change(&Id::Num(99), true);
    }

    #[tokio::test(start_paused = true)]
    async fn test_state_is_observable() {
        let fake = FakeSearch::default();
        let mut view = SearchView::new(fake, DEBOUNCE);
        let mut changes = view.subscribe();

        view.set_query("ali");
        assert_eq!(changes.borrow_and_update().query, "ali");
        view.settle().await;
        assert!(changes.has_changed().unwrap());
        assert_eq!(changes.borrow_and_update().users.len(), 1);
    }
}
