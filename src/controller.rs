//! Client state and the request/response flows.
//!
//! [`ClientController`] owns the selected model, the model catalog, the
//! session id, and the sites-view toggle. Each public operation issues one
//! request through a [`Backend`], then writes the result to a [`View`].
//!
//! # Flows
//!
//! | Operation | Request | Renders to |
//! |-----------|---------|------------|
//! | [`init_state`](ClientController::init_state) | `GET /getState` | model selector |
//! | [`refresh_models`](ClientController::refresh_models) | `GET /models` | model selector |
//! | [`select_model`](ClientController::select_model) | `POST /selectedModel` | model selector |
//! | [`ingest_sites`](ClientController::ingest_sites) | `POST /ingest` | ingest output, then sites |
//! | [`handle_ask`](ClientController::handle_ask) | `POST /answer` | answer, tokens |
//! | [`set_sites_view`](ClientController::set_sites_view) | `GET /sites` | panels, toggle label, sites |
//! | [`get_ingested_sites`](ClientController::get_ingested_sites) | `GET /sites` | sites list, count, status |
//! | [`clear_sites`](ClientController::clear_sites) | `POST /clear` | sites status, then sites |
//!
//! # Stale responses
//!
//! Operations take `&self`, so flows may overlap. Every rendering flow draws a
//! ticket from its own sequence before sending. A response is applied only if
//! its ticket is still the newest one for that flow; otherwise it is dropped
//! and the operation returns [`Outcome::Stale`].
//!
//! Failures never escape as errors. A transport failure shows the error text
//! in the flow's display area; a non-2xx response shows the decoded body.

use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, error, info, warn};

use crate::api::{self, ApiResponse, Backend, TransportError};
use crate::config::Config;
use crate::format;
use crate::models::{
    AnswerRequest, AnswerResponse, HealthResponse, IngestRequest, ModelInfo, ModelsResponse,
    SelectModelRequest, SitesResponse, StateResponse,
};
use crate::storage::{SessionStore, SESSION_KEY};
use crate::view::{Panel, View};

/// How an operation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A successful response was rendered.
    Applied,
    /// A transport or HTTP failure was rendered.
    Failed,
    /// A newer request of the same flow was issued; nothing was rendered.
    Stale,
}

impl Outcome {
    pub fn is_applied(self) -> bool {
        self == Outcome::Applied
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    #[error("unknown model '{0}'")]
    UnknownModel(String),
}

/// Optional knobs forwarded to the server with each request.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub max_pages: Option<u32>,
    pub max_depth: Option<u32>,
    pub top_k: Option<u32>,
}

impl RequestOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_pages: config.ingest.max_pages,
            max_depth: config.ingest.max_depth,
            top_k: config.answer.top_k,
        }
    }
}

#[derive(Debug, Default)]
struct ControllerState {
    models: Vec<ModelInfo>,
    selected_model: Option<String>,
    session_id: Option<String>,
    sites_view: bool,
}

/// Monotonic ticket counter for one flow.
#[derive(Default)]
struct Sequence(AtomicU64);

impl Sequence {
    fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.0.load(Ordering::SeqCst) == ticket
    }
}

#[derive(Default)]
struct Sequences {
    catalog: Sequence,
    ingest: Sequence,
    ask: Sequence,
    sites: Sequence,
}

pub struct ClientController<B, V, S> {
    backend: B,
    view: V,
    store: S,
    options: RequestOptions,
    state: Mutex<ControllerState>,
    seq: Sequences,
}

impl<B, V, S> ClientController<B, V, S>
where
    B: Backend,
    V: View,
    S: SessionStore,
{
    /// Creates a controller and restores the stored session id, if any.
    ///
    /// An unreadable store is logged and treated as empty.
    pub fn new(backend: B, view: V, store: S) -> Self {
        let session_id = match store.get(SESSION_KEY) {
            Ok(value) => value.filter(|s| !s.is_empty()),
            Err(e) => {
                warn!(error = %e, "could not read stored session id");
                None
            }
        };
        Self {
            backend,
            view,
            store,
            options: RequestOptions::default(),
            state: Mutex::new(ControllerState {
                session_id,
                ..Default::default()
            }),
            seq: Sequences::default(),
        }
    }

    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn selected_model(&self) -> Option<String> {
        self.lock().selected_model.clone()
    }

    pub fn session_id(&self) -> Option<String> {
        self.lock().session_id.clone()
    }

    pub fn models(&self) -> Vec<ModelInfo> {
        self.lock().models.clone()
    }

    pub fn is_sites_view(&self) -> bool {
        self.lock().sites_view
    }

    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn post_json<T: Serialize>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<ApiResponse, TransportError> {
        let value: Value =
            serde_json::to_value(body).map_err(|e| TransportError::Encode(e.to_string()))?;
        self.backend.post(path, Some(&value)).await
    }

    // ============ Models ============

    /// Renders the default view, then loads the model catalog and the current
    /// selection from `/getState`.
    pub async fn init_state(&self) -> Outcome {
        let sites_view = self.is_sites_view();
        self.render_panels(sites_view);

        let ticket = self.seq.catalog.next();
        let result = self.backend.get(api::GET_STATE).await;
        if !self.seq.catalog.is_current(ticket) {
            debug!(ticket, "discarding stale /getState response");
            return Outcome::Stale;
        }

        match result {
            Err(e) => {
                error!(error = %e, "failed to load client state");
                Outcome::Failed
            }
            Ok(resp) if !resp.is_success() => {
                warn!(status = resp.status, body = %resp.body.message(), "/getState failed");
                Outcome::Failed
            }
            Ok(resp) => match resp.parse::<StateResponse>() {
                Some(state) => {
                    self.apply_catalog(state.models, state.model_id);
                    Outcome::Applied
                }
                None => {
                    warn!(body = %resp.body.message(), "unexpected /getState body");
                    Outcome::Failed
                }
            },
        }
    }

    /// Reloads the catalog from `/models`, keeping the selection if it is still listed.
    pub async fn refresh_models(&self) -> Outcome {
        let ticket = self.seq.catalog.next();
        let result = self.backend.get(api::MODELS).await;
        if !self.seq.catalog.is_current(ticket) {
            debug!(ticket, "discarding stale /models response");
            return Outcome::Stale;
        }

        match result {
            Err(e) => {
                error!(error = %e, "failed to load models");
                Outcome::Failed
            }
            Ok(resp) if !resp.is_success() => {
                warn!(status = resp.status, body = %resp.body.message(), "/models failed");
                Outcome::Failed
            }
            Ok(resp) => match resp.parse::<ModelsResponse>() {
                Some(catalog) => {
                    let current = self.selected_model();
                    self.apply_catalog(catalog.models, current);
                    Outcome::Applied
                }
                None => {
                    warn!(body = %resp.body.message(), "unexpected /models body");
                    Outcome::Failed
                }
            },
        }
    }

    /// Selects a model from the catalog and reports the choice to the server.
    ///
    /// The local selection applies even if the server call fails; the
    /// outcome reflects the server call.
    pub async fn select_model(&self, id: &str) -> Result<Outcome, ClientError> {
        self.use_model(id)?;

        let result = self
            .post_json(api::SELECTED_MODEL, &SelectModelRequest { model_id: id })
            .await;
        Ok(match result {
            Err(e) => {
                error!(error = %e, model = id, "failed to report model selection");
                Outcome::Failed
            }
            Ok(resp) if !resp.is_success() => {
                warn!(status = resp.status, body = %resp.body.message(), "/selectedModel failed");
                Outcome::Failed
            }
            Ok(_) => {
                debug!(model = id, "model selected");
                Outcome::Applied
            }
        })
    }

    /// Selects a model for the following questions without telling the server.
    ///
    /// A catalog load still in flight is made stale so its server-reported
    /// selection cannot replace this one.
    pub fn use_model(&self, id: &str) -> Result<(), ClientError> {
        let models = {
            let mut state = self.lock();
            if !state.models.iter().any(|m| m.id == id) {
                return Err(ClientError::UnknownModel(id.to_string()));
            }
            state.selected_model = Some(id.to_string());
            state.models.clone()
        };
        self.seq.catalog.next();
        self.view.populate_models(&models, Some(id));
        Ok(())
    }

    /// Replaces the catalog; `preferred` survives only if the catalog lists it.
    fn apply_catalog(&self, models: Vec<ModelInfo>, preferred: Option<String>) {
        let selected = preferred.filter(|id| models.iter().any(|m| &m.id == id));
        if selected.is_none() {
            debug!("no listed model selected; the server default applies");
        }
        {
            let mut state = self.lock();
            state.models = models.clone();
            state.selected_model = selected.clone();
        }
        self.view.populate_models(&models, selected.as_deref());
    }

    // ============ Ingest ============

    /// Sends the URLs found in `raw` (one per line) to `/ingest`.
    ///
    /// The decoded body is shown whatever the status; the sites list is
    /// refreshed only after a success.
    pub async fn ingest_sites(&self, raw: &str) -> Outcome {
        let urls = format::parse_urls(raw);
        self.view.show_ingest_output(format::INGESTING);

        let request = IngestRequest {
            urls,
            max_pages: self.options.max_pages,
            max_depth: self.options.max_depth,
        };
        debug!(urls = request.urls.len(), "ingesting");

        let ticket = self.seq.ingest.next();
        let result = self.post_json(api::INGEST, &request).await;
        if !self.seq.ingest.is_current(ticket) {
            debug!(ticket, "discarding stale /ingest response");
            return Outcome::Stale;
        }

        match result {
            Err(e) => {
                error!(error = %e, "ingest request failed");
                self.view.show_ingest_output(&e.to_string());
                Outcome::Failed
            }
            Ok(resp) => {
                self.view.show_ingest_output(&resp.body.pretty());
                if resp.is_success() {
                    self.get_ingested_sites().await;
                    Outcome::Applied
                } else {
                    warn!(status = resp.status, "ingest rejected");
                    Outcome::Failed
                }
            }
        }
    }

    // ============ Ask ============

    /// Sends `question` (verbatim) with the current session and model.
    pub async fn handle_ask(&self, question: &str) -> Outcome {
        self.view.show_answer(format::THINKING);
        self.view.show_tokens(format::TOKENS_PLACEHOLDER);

        let (session_id, model) = {
            let state = self.lock();
            (state.session_id.clone(), state.selected_model.clone())
        };
        let request = AnswerRequest {
            question: question.to_string(),
            session_id,
            model,
            top_k: self.options.top_k,
        };

        let ticket = self.seq.ask.next();
        let result = self.post_json(api::ANSWER, &request).await;
        if !self.seq.ask.is_current(ticket) {
            debug!(ticket, "discarding stale /answer response");
            return Outcome::Stale;
        }

        let resp = match result {
            Err(e) => {
                error!(error = %e, "answer request failed");
                self.view.show_answer(&e.to_string());
                return Outcome::Failed;
            }
            Ok(resp) => resp,
        };

        if !resp.is_success() {
            warn!(status = resp.status, "answer request rejected");
            self.view.show_answer(&resp.body.pretty());
            return Outcome::Failed;
        }

        let Some(answer) = resp.parse::<AnswerResponse>() else {
            warn!(body = %resp.body.message(), "unexpected /answer body");
            self.view.show_answer(&resp.body.pretty());
            return Outcome::Failed;
        };

        self.view
            .show_tokens(&format::format_tokens(answer.tokens, answer.tokens_used_total));
        if let Some(sid) = answer.session_id.as_deref().filter(|s| !s.is_empty()) {
            self.adopt_session(sid);
        }
        self.view.show_answer(&format::compose_answer(&answer));
        Outcome::Applied
    }

    fn adopt_session(&self, sid: &str) {
        let previous = {
            let mut state = self.lock();
            if state.session_id.as_deref() == Some(sid) {
                return;
            }
            state.session_id.replace(sid.to_string())
        };
        match previous {
            None => info!(session_id = sid, "session established"),
            Some(old) => info!(session_id = sid, previous = %old, "session rotated"),
        }
        if let Err(e) = self.store.set(SESSION_KEY, sid) {
            warn!(error = %e, "could not persist session id");
        }
    }

    // ============ Sites ============

    /// Shows the sites panel (`true`) or the ingest panel (`false`), then
    /// refreshes the sites list in either direction.
    pub async fn set_sites_view(&self, sites_view: bool) -> Outcome {
        self.lock().sites_view = sites_view;
        self.render_panels(sites_view);
        self.get_ingested_sites().await
    }

    pub async fn toggle_sites_view(&self) -> Outcome {
        let next = !self.is_sites_view();
        self.set_sites_view(next).await
    }

    fn render_panels(&self, sites_view: bool) {
        self.view.show_panel(if sites_view {
            Panel::Sites
        } else {
            Panel::Ingest
        });
        self.view.set_toggle_label(format::toggle_label(sites_view));
    }

    /// Clears the list, fetches `/sites`, and renders the result.
    pub async fn get_ingested_sites(&self) -> Outcome {
        self.view.clear_sites();
        self.view.show_sites_status(format::LOADING);

        let ticket = self.seq.sites.next();
        let result = self.backend.get(api::SITES).await;
        if !self.seq.sites.is_current(ticket) {
            debug!(ticket, "discarding stale /sites response");
            return Outcome::Stale;
        }

        match result {
            Err(e) => {
                error!(error = %e, "failed to load sites");
                self.fail_sites(&e.to_string())
            }
            Ok(resp) if !resp.is_success() => {
                warn!(status = resp.status, "sites request rejected");
                self.fail_sites(&resp.body.message())
            }
            Ok(resp) => match resp.parse::<SitesResponse>() {
                Some(SitesResponse { sites }) => {
                    self.view.render_sites(&sites);
                    self.view
                        .show_sites_count(&format::format_sites_count(sites.len()));
                    self.view
                        .show_sites_status(format::sites_status(sites.len()));
                    Outcome::Applied
                }
                None => {
                    warn!(body = %resp.body.message(), "unexpected /sites body");
                    self.fail_sites(&resp.body.message())
                }
            },
        }
    }

    fn fail_sites(&self, message: &str) -> Outcome {
        self.view.show_sites_status(message);
        self.view.show_sites_count("");
        Outcome::Failed
    }

    /// Asks the server to drop every ingested site.
    ///
    /// Any HTTP response is followed by a refresh; a transport failure is
    /// shown in the sites status and skips it.
    pub async fn clear_sites(&self) -> Outcome {
        let resp = match self.backend.post(api::CLEAR, None).await {
            Ok(resp) => resp,
            Err(e) => {
                error!(error = %e, "clear request failed");
                self.view.show_sites_status(&e.to_string());
                return Outcome::Failed;
            }
        };

        if !resp.is_success() {
            warn!(status = resp.status, body = %resp.body.message(), "clear request rejected");
        }
        let refreshed = self.get_ingested_sites().await;
        if resp.is_success() {
            refreshed
        } else {
            Outcome::Failed
        }
    }

    // ============ Health ============

    /// `true` when `/health` answers with a success status and `{"ok": true}`.
    pub async fn health(&self) -> Result<bool, TransportError> {
        let resp = self.backend.get(api::HEALTH).await?;
        Ok(resp.is_success()
            && resp
                .parse::<HealthResponse>()
                .map(|h| h.ok)
                .unwrap_or(false))
    }
}
