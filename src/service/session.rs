//! Session state machine
//!
//! ```text
//! loading ─► no-cast ─► loading ─► explaining ─► result
//! loading ─► explaining                 (host shared a cast)
//! explaining ─► no-cast                 (failure, message attached)
//! result ─► explaining ─► result        (regenerate / language change)
//! any ─► no-cast                        (reset)
//! ```
//!
//! `SessionMachine` holds the state and performs transitions without
//! any I/O. Every transition that starts a network call hands out a
//! `Ticket`; completions carry the ticket back and are applied only if
//! no newer action has started since (last request wins).
//!
//! `SessionController` drives the machine: it runs resolution and
//! generation in order and never holds the lock across a network call.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;

use super::cast::CastResolver;
use super::explain::{Explainer, Explanation};
use crate::data::{AppStatus, Cast, LanguageCode};
use crate::error::AppError;
use crate::farcaster::{LaunchContextProvider, cast_url_for};
use crate::llm::validate_image_urls;
use crate::metrics::STALE_RESULTS_DROPPED_TOTAL;

/// Sequence number of a started action
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Snapshot of the session, as the screens render it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub state: AppStatus,
    pub cast: Option<Cast>,
    pub explanation: String,
    pub error: Option<String>,
    pub language: LanguageCode,
    pub cast_url: String,
    pub explained_at: Option<DateTime<Utc>>,
}

/// Generation work handed out by a transition
#[derive(Debug, Clone)]
pub struct GenerationJob {
    pub ticket: Ticket,
    pub text: String,
    pub images: Option<Vec<String>>,
    pub language: LanguageCode,
}

/// In-memory session state
#[derive(Debug)]
pub struct SessionMachine {
    status: AppStatus,
    cast: Option<Cast>,
    explanation: String,
    error: Option<String>,
    language: LanguageCode,
    cast_url: String,
    explained_at: Option<DateTime<Utc>>,
    latest: u64,
}

impl Default for SessionMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionMachine {
    /// Starts in `loading` until the launch context is known
    pub fn new() -> Self {
        Self {
            status: AppStatus::Loading,
            cast: None,
            explanation: String::new(),
            error: None,
            language: LanguageCode::default(),
            cast_url: String::new(),
            explained_at: None,
            latest: 0,
        }
    }

    pub fn status(&self) -> AppStatus {
        self.status
    }

    pub fn language(&self) -> LanguageCode {
        self.language
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            state: self.status,
            cast: self.cast.clone(),
            explanation: self.explanation.clone(),
            error: self.error.clone(),
            language: self.language,
            cast_url: self.cast_url.clone(),
            explained_at: self.explained_at,
        }
    }

    fn issue(&mut self) -> Ticket {
        self.latest += 1;
        Ticket(self.latest)
    }

    /// Whether `ticket` still belongs to the newest action.
    /// Stale tickets are counted and logged.
    fn accept(&self, ticket: Ticket, what: &str) -> bool {
        if ticket.0 == self.latest {
            return true;
        }
        STALE_RESULTS_DROPPED_TOTAL.inc();
        tracing::debug!(
            ticket = ticket.0,
            latest = self.latest,
            what,
            "Dropping stale result"
        );
        false
    }

    // =========================================================================
    // Launch
    // =========================================================================

    /// Begin reading the host launch context (`loading`)
    pub fn begin_launch(&mut self) -> Ticket {
        self.status = AppStatus::Loading;
        self.issue()
    }

    /// `loading → no-cast`: the host supplied no cast
    pub fn launch_without_cast(&mut self, ticket: Ticket) -> bool {
        if !self.accept(ticket, "launch") {
            return false;
        }
        self.status = AppStatus::NoCast;
        true
    }

    // =========================================================================
    // Submit
    // =========================================================================

    /// Begin resolving a pasted URL. Blank input is ignored.
    pub fn begin_submit(&mut self, url: &str) -> Option<Ticket> {
        if url.trim().is_empty() {
            return None;
        }
        self.cast_url = url.to_string();
        self.error = None;
        self.status = AppStatus::Loading;
        Some(self.issue())
    }

    /// The cast for `ticket` is known: `→ explaining`.
    ///
    /// Returns the generation work to run, or `None` if the ticket is
    /// stale.
    pub fn cast_ready(&mut self, ticket: Ticket, cast: Cast) -> Option<GenerationJob> {
        if !self.accept(ticket, "resolution") {
            return None;
        }
        let job = GenerationJob {
            ticket,
            text: cast.text.clone(),
            images: cast.images.clone(),
            language: self.language,
        };
        self.cast = Some(cast);
        self.explanation.clear();
        self.error = None;
        self.status = AppStatus::Explaining;
        Some(job)
    }

    /// Resolution failed: `→ no-cast` with the user message
    pub fn resolution_failed(&mut self, ticket: Ticket, error: &AppError) -> bool {
        self.fail(ticket, error, "resolution")
    }

    // =========================================================================
    // Result screen actions
    // =========================================================================

    /// Language selector.
    ///
    /// While a cast is being explained or shown, a new generation starts
    /// in the new language. Otherwise the choice is only remembered.
    pub fn change_language(&mut self, language: LanguageCode) -> Option<GenerationJob> {
        self.language = language;
        match self.status {
            AppStatus::Result | AppStatus::Explaining => self.begin_generation(),
            AppStatus::Loading | AppStatus::NoCast => None,
        }
    }

    /// Explain the current cast again in the current language.
    ///
    /// Only from the result screen, or while explaining (the newer call
    /// supersedes). A pending submission is never overtaken.
    pub fn regenerate(&mut self) -> Option<GenerationJob> {
        match self.status {
            AppStatus::Result | AppStatus::Explaining => self.begin_generation(),
            AppStatus::Loading | AppStatus::NoCast => None,
        }
    }

    fn begin_generation(&mut self) -> Option<GenerationJob> {
        let cast = self.cast.as_ref()?;
        let text = cast.text.clone();
        let images = cast.images.clone();

        self.error = None;
        self.status = AppStatus::Explaining;
        Some(GenerationJob {
            ticket: self.issue(),
            text,
            images,
            language: self.language,
        })
    }

    /// `explaining → result`
    pub fn explanation_ready(&mut self, ticket: Ticket, explanation: Explanation) -> bool {
        if !self.accept(ticket, "generation") {
            return false;
        }
        self.explanation = explanation.text().to_string();
        self.explained_at = Some(Utc::now());
        self.error = None;
        self.status = AppStatus::Result;
        true
    }

    /// `explaining → no-cast`. A resolved cast stays attached.
    pub fn generation_failed(&mut self, ticket: Ticket, error: &AppError) -> bool {
        self.fail(ticket, error, "generation")
    }

    fn fail(&mut self, ticket: Ticket, error: &AppError, what: &str) -> bool {
        if !self.accept(ticket, what) {
            return false;
        }
        self.error = Some(error.user_message());
        self.status = AppStatus::NoCast;
        true
    }

    /// Back to the paste screen with nothing kept but the language.
    ///
    /// Anything still in flight is dropped when it completes.
    pub fn reset(&mut self) {
        self.issue();
        self.status = AppStatus::NoCast;
        self.cast = None;
        self.explanation.clear();
        self.error = None;
        self.cast_url.clear();
        self.explained_at = None;
    }
}

/// Runs session actions against the resolver and explainer
pub struct SessionController {
    machine: Mutex<SessionMachine>,
    resolver: CastResolver,
    explainer: Explainer,
}

impl SessionController {
    pub fn new(resolver: CastResolver, explainer: Explainer) -> Self {
        Self {
            machine: Mutex::new(SessionMachine::new()),
            resolver,
            explainer,
        }
    }

    pub async fn view(&self) -> SessionView {
        self.machine.lock().await.view()
    }

    /// Decide the first screen from the host launch context.
    ///
    /// A shared cast is re-fetched through the indexing API for richer
    /// data; if that fails the host's copy is used with its images
    /// validated.
    pub async fn launch(&self, provider: Arc<dyn LaunchContextProvider>) -> SessionView {
        let ticket = self.machine.lock().await.begin_launch();

        let shared = match provider.launch_context().await {
            Ok(context) => context.and_then(|context| context.shared_cast().cloned()),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read launch context");
                None
            }
        };

        let Some(shared) = shared else {
            tracing::info!("No shared cast, showing the paste screen");
            let mut machine = self.machine.lock().await;
            machine.launch_without_cast(ticket);
            return machine.view();
        };

        let host_cast = shared.to_cast();
        let url = cast_url_for(&host_cast.author, &host_cast.hash);
        tracing::info!(hash = %host_cast.hash, "Opened with a shared cast");

        let cast = match self.resolver.resolve(&url).await {
            Ok(cast) => cast,
            Err(e) => {
                tracing::warn!(
                    kind = e.kind(),
                    hash = %host_cast.hash,
                    "Full cast fetch failed, using the shared copy"
                );
                let images = host_cast.images.as_deref().and_then(validate_image_urls);
                Cast {
                    images,
                    ..host_cast
                }
            }
        };

        let job = self.machine.lock().await.cast_ready(ticket, cast);
        self.run(job).await
    }

    /// Resolve a pasted URL and explain it
    pub async fn submit(&self, url: &str) -> SessionView {
        let Some(ticket) = self.machine.lock().await.begin_submit(url) else {
            return self.view().await;
        };

        let job = match self.resolver.resolve(url).await {
            Ok(cast) => self.machine.lock().await.cast_ready(ticket, cast),
            Err(e) => {
                tracing::info!(kind = e.kind(), "Cast resolution failed");
                self.machine.lock().await.resolution_failed(ticket, &e);
                None
            }
        };
        self.run(job).await
    }

    pub async fn change_language(&self, language: LanguageCode) -> SessionView {
        let job = self.machine.lock().await.change_language(language);
        self.run(job).await
    }

    pub async fn regenerate(&self) -> SessionView {
        let job = self.machine.lock().await.regenerate();
        self.run(job).await
    }

    pub async fn reset(&self) -> SessionView {
        let mut machine = self.machine.lock().await;
        machine.reset();
        machine.view()
    }

    async fn run(&self, job: Option<GenerationJob>) -> SessionView {
        let Some(job) = job else {
            return self.view().await;
        };

        let outcome = self
            .explainer
            .explain(&job.text, job.images.as_deref(), job.language)
            .await;

        let mut machine = self.machine.lock().await;
        match outcome {
            Ok(explanation) => machine.explanation_ready(job.ticket, explanation),
            Err(e) => machine.generation_failed(job.ticket, &e),
        };
        machine.view()
    }
}
