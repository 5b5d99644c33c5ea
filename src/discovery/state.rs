use serde::Serialize;

use crate::catalog::{Movie, MoviePage};

/// Generic user-facing message for any failed catalog fetch. Causes are
/// logged server-side; the client never sees them distinguished.
pub const FETCH_ERROR_MESSAGE: &str = "Error fetching movies. Please try again later.";

/// What a discovery session is currently doing. A session is never loading
/// an initial page and a follow-up page at the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Idle,
    LoadingInitial,
    LoadingMore,
    Failed,
}

/// Which kind of fetch a plan was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    Initial,
    More,
}

/// A catalog fetch the session has decided to issue. The generation ties the
/// eventual response back to the state that requested it; responses carrying
/// an older generation are discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPlan {
    pub query: String,
    pub page: u32,
    pub generation: u64,
    pub kind: FetchKind,
}

/// Request to count a search in the journal, emitted at most once per
/// committed query: on its first page, when that page is non-empty.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSearch {
    pub query: String,
    pub movie: Movie,
}

/// State machine for one discovery session. Holds no I/O; the session actor
/// arms the debounce timer, executes fetch plans and applies the outcomes.
#[derive(Debug, Clone)]
pub struct DiscoveryState {
    search_text: String,
    committed_query: Option<String>,
    movies: Vec<Movie>,
    page: u32,
    has_more: bool,
    phase: Phase,
    generation: u64,
}

impl DiscoveryState {
    pub fn new() -> Self {
        Self {
            search_text: String::new(),
            committed_query: None,
            movies: Vec::new(),
            page: 0,
            has_more: true,
            phase: Phase::Idle,
            generation: 0,
        }
    }

    /// Record the latest raw input. Fetching is driven solely by
    /// [`commit_query`](Self::commit_query) once the quiet period elapses.
    pub fn set_input(&mut self, text: String) {
        self.search_text = text;
    }

    /// Commit the current input as the active query. Returns the page-1 fetch
    /// plan, or `None` when the input matches the already-committed query.
    pub fn commit_query(&mut self) -> Option<FetchPlan> {
        if self.committed_query.as_deref() == Some(self.search_text.as_str()) {
            return None;
        }

        let query = self.search_text.clone();
        self.committed_query = Some(query.clone());
        self.page = 0;
        self.has_more = true;
        self.phase = Phase::LoadingInitial;
        self.generation += 1;

        Some(FetchPlan {
            query,
            page: 1,
            generation: self.generation,
            kind: FetchKind::Initial,
        })
    }

    /// Ask for the page after the last applied one. Only possible from an
    /// idle session that has applied at least one page and has more to show;
    /// a loading or failed session ignores the request.
    pub fn request_load_more(&mut self) -> Option<FetchPlan> {
        let query = self.committed_query.clone()?;
        if self.phase != Phase::Idle || !self.has_more || self.page == 0 {
            return None;
        }

        self.phase = Phase::LoadingMore;
        self.generation += 1;

        Some(FetchPlan {
            query,
            page: self.page + 1,
            generation: self.generation,
            kind: FetchKind::More,
        })
    }

    /// Whether a plan's response would still apply to the current state.
    pub fn is_current(&self, plan: &FetchPlan) -> bool {
        plan.generation == self.generation
    }

    /// Apply a successful catalog response. Stale plans leave the state
    /// untouched. An empty page only clears `has_more`; the accumulated list
    /// stays as it was. Returns the journal record request when this was the
    /// first page of a non-empty query with results.
    pub fn apply_page(&mut self, plan: &FetchPlan, page: MoviePage) -> Option<RecordSearch> {
        if !self.is_current(plan) {
            return None;
        }

        self.phase = Phase::Idle;

        if page.results.is_empty() {
            self.has_more = false;
            return None;
        }

        let record = (plan.kind == FetchKind::Initial && !plan.query.is_empty()).then(|| {
            RecordSearch {
                query: plan.query.clone(),
                movie: page.results[0].clone(),
            }
        });

        match plan.kind {
            FetchKind::Initial => self.movies = page.results,
            FetchKind::More => self.movies.extend(page.results),
        }
        self.page = page.page;
        self.has_more = page.page < page.total_pages;

        record
    }

    /// Apply a failed catalog fetch. Stale plans leave the state untouched;
    /// otherwise the session surfaces the generic message and keeps its list.
    pub fn apply_failure(&mut self, plan: &FetchPlan) {
        if !self.is_current(plan) {
            return;
        }
        self.phase = Phase::Failed;
    }

    /// Snapshot of the state as presented to the frontend.
    pub fn view(&self) -> SessionView {
        SessionView {
            search_text: self.search_text.clone(),
            committed_query: self.committed_query.clone(),
            phase: self.phase,
            movies: self.movies.clone(),
            page: self.page,
            has_more: self.has_more,
            error_message: (self.phase == Phase::Failed).then(|| FETCH_ERROR_MESSAGE.to_string()),
        }
    }

    #[cfg(test)]
    pub(crate) fn movies(&self) -> &[Movie] {
        &self.movies
    }
}

impl Default for DiscoveryState {
    fn default() -> Self {
        Self::new()
    }
}

/// JSON view of a session returned by the HTTP API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub search_text: String,
    pub committed_query: Option<String>,
    pub phase: Phase,
    pub movies: Vec<Movie>,
    pub page: u32,
    pub has_more: bool,
    pub error_message: Option<String>,
}
