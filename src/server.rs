//! HTTP surface: one form page and one POST endpoint behind the gate.

use anyhow::{Context, Result};
use axum::{Extension, Form, Router};
use axum::extract::multipart::MultipartError;
use axum::extract::{ConnectInfo, FromRequest, Multipart, Request, State};
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::middleware::{self, Next};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::Config;
use crate::consts::MSG_ENGINE_FAILED;
use crate::dispatch::process::ProcessRunner;
use crate::dispatch::{EngineArgs, ProcessDispatcher};
use crate::error::CheckError;
use crate::gate::{GateDecision, RequestSignals, SecurityGate, Verdict, headers};
use crate::resolver::InterpreterResolver;
use crate::response::{self, ResultEnvelope};

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

const INDEX_HTML: &str = include_str!("../static/index.html");
const APP_JS: &str = include_str!("../static/js/app.js");
const STYLES_CSS: &str = include_str!("../static/css/styles.css");

/// Everything a request needs. Built once, read-only afterwards.
pub struct AppState {
    pub gate: SecurityGate,
    pub resolver: InterpreterResolver,
    pub dispatcher: ProcessDispatcher,
    pub script: PathBuf,
    /// Where the listener is bound; the gate compares its port.
    pub local_addr: SocketAddr,
}

impl AppState {
    /// Production wiring: host filesystem discovery and real processes.
    pub fn new(config: &Config, script: PathBuf, local_addr: SocketAddr) -> Self {
        Self {
            gate: SecurityGate::new(config),
            resolver: InterpreterResolver::for_host(config),
            dispatcher: ProcessDispatcher::new(Arc::new(ProcessRunner::new(config.engine_timeout))),
            script,
            local_addr,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CheckForm {
    #[serde(default)]
    pub password: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", post(check).fallback(index))
        .route("/js/app.js", get(app_js))
        .route("/css/styles.css", get(styles_css))
        .layer(middleware::from_fn_with_state(state.clone(), security_gate))
        .with_state(state)
}

/// Serve on an already-bound listener until Ctrl+C.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> Result<()> {
    let app = router(state);
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!(op = "server.shutdown", "shutting down");
        })
        .await
        .context("http server failed")
}

/// Runs before every route. Redirects or stamps the decision on the request,
/// then adds the protective headers to whatever comes back.
async fn security_gate(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    mut request: Request,
    next: Next,
) -> Response {
    let signals = RequestSignals::from_parts(peer, state.local_addr, request.uri(), request.headers());
    let decision = state.gate.evaluate(&signals);

    let mut response = match &decision.verdict {
        Verdict::Redirect(url) => {
            tracing::info!(op = "gate.redirect", peer = %peer.ip(), location = %url, "insecure transport");
            Redirect::permanent(url).into_response()
        }
        Verdict::Allow => {
            request.extensions_mut().insert(decision.clone());
            next.run(request).await
        }
    };

    headers::apply(response.headers_mut(), decision.secure);
    response
}

async fn check(
    State(state): State<Arc<AppState>>,
    Extension(decision): Extension<GateDecision>,
    request: Request,
) -> Response {
    let password = read_password(request).await;
    let (status, envelope) = check_password(&state, &password, decision.debug_visible).await;
    json_response(status, &envelope)
}

/// The `password` field of a url-encoded or multipart body. A body that
/// cannot be read counts as no password.
pub async fn read_password(request: Request) -> String {
    let multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| {
            v.trim_start()
                .to_ascii_lowercase()
                .starts_with("multipart/form-data")
        });

    let password = if multipart {
        match Multipart::from_request(request, &()).await {
            Ok(body) => password_field(body).await.map_err(|e| e.to_string()),
            Err(rejection) => Err(rejection.to_string()),
        }
    } else {
        Form::<CheckForm>::from_request(request, &())
            .await
            .map(|Form(form)| form.password)
            .map_err(|rejection| rejection.to_string())
    };

    password.unwrap_or_else(|error| {
        tracing::debug!(op = "check.form", %error, "unreadable form body");
        String::new()
    })
}

async fn password_field(mut body: Multipart) -> Result<String, MultipartError> {
    while let Some(field) = body.next_field().await? {
        if field.name() == Some("password") {
            return field.text().await;
        }
    }
    Ok(String::new())
}

/// Validate, resolve, dispatch, format. Separate from the handler so it can
/// be driven without HTTP.
pub async fn check_password(
    state: &AppState,
    password: &str,
    debug_visible: bool,
) -> (StatusCode, ResultEnvelope) {
    if password.is_empty() {
        return response::format(Err(CheckError::PasswordRequired), debug_visible);
    }

    let candidates = state.resolver.candidates();
    let args = EngineArgs {
        script: &state.script,
        password,
    };
    let result = match state.dispatcher.dispatch(&candidates, args).await {
        Ok(outcome) => outcome.into_result(),
        Err(err) => Err(err),
    };
    response::format(result, debug_visible)
}

fn json_response(status: StatusCode, envelope: &ResultEnvelope) -> Response {
    match serde_json::to_vec(envelope) {
        Ok(body) => (status, [(CONTENT_TYPE, JSON_CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            tracing::error!(op = "check.encode", error = %e, "failed to encode response");
            let body = serde_json::json!({ "error": MSG_ENGINE_FAILED }).to_string();
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(CONTENT_TYPE, JSON_CONTENT_TYPE)],
                body,
            )
                .into_response()
        }
    }
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn app_js() -> impl IntoResponse {
    ([(CONTENT_TYPE, "text/javascript; charset=utf-8")], APP_JS)
}

async fn styles_css() -> impl IntoResponse {
    ([(CONTENT_TYPE, "text/css; charset=utf-8")], STYLES_CSS)
}
