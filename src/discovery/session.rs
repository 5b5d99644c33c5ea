use std::{sync::Arc, time::Duration};

use tokio::{
    pin, select,
    sync::{mpsc, oneshot},
    time::{Instant, sleep_until},
};

use crate::{catalog::MovieCatalog, journal::SearchJournal};

use super::state::{DiscoveryState, FetchPlan, SessionView};

const COMMAND_BUFFER: usize = 16;

/// Commands a session accepts from the HTTP layer.
#[derive(Debug)]
pub enum Command {
    Input(String),
    LoadMore,
    View(oneshot::Sender<SessionView>),
}

/// Outcome of one dispatched catalog fetch, tagged with the plan that
/// requested it.
struct FetchOutcome {
    plan: FetchPlan,
    result: Result<crate::catalog::MoviePage, crate::catalog::CatalogError>,
}

/// Cloneable handle to a running session actor. All methods fail with
/// [`SessionClosed`] once the actor is gone.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
}

/// The session actor has terminated and can no longer be driven.
#[derive(Debug, thiserror::Error)]
#[error("discovery session is closed")]
pub struct SessionClosed;

impl SessionHandle {
    /// Spawn a session actor and return its handle. The actor immediately
    /// loads page 1 of the discover feed, mirroring initial mount.
    pub fn spawn(
        catalog: Arc<dyn MovieCatalog>,
        journal: Arc<SearchJournal>,
        quiet_period: Duration,
    ) -> Self {
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_BUFFER);
        let actor = SessionActor::new(catalog, journal, quiet_period, commands_rx);
        tokio::spawn(actor.run());
        Self {
            commands: commands_tx,
        }
    }

    pub async fn submit_input(&self, text: String) -> Result<(), SessionClosed> {
        self.commands
            .send(Command::Input(text))
            .await
            .map_err(|_| SessionClosed)
    }

    pub async fn load_more(&self) -> Result<(), SessionClosed> {
        self.commands
            .send(Command::LoadMore)
            .await
            .map_err(|_| SessionClosed)
    }

    pub async fn view(&self) -> Result<SessionView, SessionClosed> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(Command::View(reply_tx))
            .await
            .map_err(|_| SessionClosed)?;
        reply_rx.await.map_err(|_| SessionClosed)
    }
}

struct SessionActor {
    state: DiscoveryState,
    catalog: Arc<dyn MovieCatalog>,
    journal: Arc<SearchJournal>,
    quiet_period: Duration,
    commands: mpsc::Receiver<Command>,
    completions_tx: mpsc::Sender<FetchOutcome>,
    completions: mpsc::Receiver<FetchOutcome>,
}

impl SessionActor {
    fn new(
        catalog: Arc<dyn MovieCatalog>,
        journal: Arc<SearchJournal>,
        quiet_period: Duration,
        commands: mpsc::Receiver<Command>,
    ) -> Self {
        let (completions_tx, completions) = mpsc::channel(COMMAND_BUFFER);
        Self {
            state: DiscoveryState::new(),
            catalog,
            journal,
            quiet_period,
            commands,
            completions_tx,
            completions,
        }
    }

    async fn run(mut self) {
        // The empty query commits immediately on mount; only subsequent
        // input changes go through the quiet period.
        if let Some(plan) = self.state.commit_query() {
            self.dispatch(plan);
        }

        let debounce = sleep_until(Instant::now());
        pin!(debounce);
        let mut debounce_armed = false;

        loop {
            select! {
                maybe_command = self.commands.recv() => {
                    let Some(command) = maybe_command else {
                        break;
                    };
                    match command {
                        Command::Input(text) => {
                            self.state.set_input(text);
                            debounce
                                .as_mut()
                                .reset(Instant::now() + self.quiet_period);
                            debounce_armed = true;
                        }
                        Command::LoadMore => {
                            if let Some(plan) = self.state.request_load_more() {
                                self.dispatch(plan);
                            }
                        }
                        Command::View(reply) => {
                            let _ = reply.send(self.state.view());
                        }
                    }
                }
                () = debounce.as_mut(), if debounce_armed => {
                    debounce_armed = false;
                    if let Some(plan) = self.state.commit_query() {
                        self.dispatch(plan);
                    }
                }
                Some(outcome) = self.completions.recv() => {
                    self.absorb(outcome);
                }
            }
        }

        tracing::debug!("discovery session actor stopped");
    }

    /// Execute a fetch plan on its own task. In-flight fetches are never
    /// cancelled; superseded completions are discarded on arrival.
    fn dispatch(&self, plan: FetchPlan) {
        let catalog = self.catalog.clone();
        let completions = self.completions_tx.clone();
        tokio::spawn(async move {
            let result = if plan.query.is_empty() {
                catalog.popular_movies(plan.page).await
            } else {
                catalog.search_movies(&plan.query, plan.page).await
            };
            let _ = completions.send(FetchOutcome { plan, result }).await;
        });
    }

    fn absorb(&mut self, outcome: FetchOutcome) {
        if !self.state.is_current(&outcome.plan) {
            tracing::debug!(
                query = %outcome.plan.query,
                page = outcome.plan.page,
                "dropping stale catalog response"
            );
            return;
        }

        match outcome.result {
            Ok(page) => {
                if let Some(record) = self.state.apply_page(&outcome.plan, page) {
                    if let Err(err) = self.journal.record_search(&record.query, &record.movie) {
                        tracing::warn!(
                            error = %err,
                            query = %record.query,
                            "failed to journal search"
                        );
                    }
                }
            }
            Err(err) => {
                tracing::error!(
                    error = %err,
                    query = %outcome.plan.query,
                    page = outcome.plan.page,
                    "catalog fetch failed"
                );
                self.state.apply_failure(&outcome.plan);
            }
        }
    }
}
