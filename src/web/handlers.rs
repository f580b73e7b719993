use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;
use tracing::{debug, error};
use uuid::Uuid;

use super::render::PageSnapshot;
use super::AppState;
use crate::session::SharedSession;

const SESSION_COOKIE: &str = "sid";

#[derive(Deserialize)]
pub struct AskForm {
    #[serde(default)]
    pub prompt: String,
}

/// `GET /`: render the whole page for this browser's session.
pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (id, session, minted) = resolve_session(&state, &headers);

    let snapshot = {
        let session = session.lock().await;
        PageSnapshot::of(&session)
    };

    match state.templates.render_page(&snapshot) {
        Ok(html) => with_session_cookie(Html(html).into_response(), id, minted),
        Err(e) => {
            error!("Template rendering failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, "template error").into_response()
        }
    }
}

/// `POST /ask`: the single turn-handler entry. The input form and the
/// sidebar example buttons both land here, then the browser is sent back
/// to `/` for a full re-render.
pub async fn ask(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<AskForm>,
) -> Response {
    let (id, session, minted) = resolve_session(&state, &headers);

    let outcome = state.chat.submit(&session, &form.prompt).await;
    debug!("Submission handled: {outcome:?}");

    with_session_cookie(Redirect::to("/").into_response(), id, minted)
}

/// `GET /assets/style.css`
pub async fn stylesheet() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        include_str!("../../assets/style.css"),
    )
}

fn resolve_session(state: &AppState, headers: &HeaderMap) -> (Uuid, SharedSession, bool) {
    let claimed = session_id_from_cookies(headers);
    state.chat.sessions().get_or_create(claimed)
}

/// The session id from the `Cookie` header, if present and well formed.
fn session_id_from_cookies(headers: &HeaderMap) -> Option<Uuid> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    for pair in cookies.split(';') {
        if let Some((name, value)) = pair.trim().split_once('=') {
            if name == SESSION_COOKIE {
                return Uuid::parse_str(value.trim()).ok();
            }
        }
    }
    None
}

fn with_session_cookie(mut response: Response, id: Uuid, minted: bool) -> Response {
    if minted {
        let cookie = format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax");
        if let Ok(value) = cookie.parse() {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
    }
    response
}
