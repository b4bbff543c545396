// Session identity carried in a cookie

use axum::http::HeaderMap;
use axum::http::header::COOKIE;

use crate::memory::SessionId;

pub const SESSION_COOKIE: &str = "session_id";
const MAX_SESSION_ID_LEN: usize = 128;

/// The session named by the request's `session_id` cookie, if it holds a usable id
#[inline]
pub fn session_from_headers(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim())
        .filter(|value| is_valid_session_id(value))
        .map(SessionId::new)
}

fn is_valid_session_id(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_SESSION_ID_LEN
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// `Set-Cookie` value that binds the browser to `session`
#[inline]
pub fn session_cookie(session: &SessionId) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        SESSION_COOKIE, session
    )
}
