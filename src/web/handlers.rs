use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::extract::rejection::FormRejection;
use axum::extract::{Form, State};
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

use super::AppState;
use super::errors::WebError;
use super::session::{session_cookie, session_from_headers};
use super::validation::{allowed_file, sanitize_filename};
use crate::memory::SessionId;

const CHAT_PAGE: &str = include_str!("../../static/chat.html");
const PDF_FIELD: &str = "pdf";

#[derive(Debug, Deserialize)]
pub struct ChatForm {
    pub msg: String,
}

/// `GET /`
#[inline]
pub async fn index() -> Html<&'static str> {
    Html(CHAT_PAGE)
}

/// `POST /get`: one chat turn, answered as plain text
#[inline]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    form: Result<Form<ChatForm>, FormRejection>,
) -> Result<Response, WebError> {
    let Form(form) = form.map_err(|e| WebError::bad_request(e.body_text()))?;

    let message = form.msg.trim();
    if message.is_empty() {
        return Err(WebError::bad_request("No message received"));
    }

    let (session, new_session) = match session_from_headers(&headers) {
        Some(session) => (session, false),
        None => (SessionId::generate(), true),
    };
    debug!("Chat message for session {}", session);

    let answer = state
        .assistant
        .chat(&session, message)
        .await
        .map_err(|e| WebError::processing("Failed to generate an answer", e))?;

    let mut response = answer.into_response();
    if new_session {
        let cookie = HeaderValue::from_str(&session_cookie(&session))
            .map_err(|e| WebError::Internal(format!("Invalid session cookie: {}", e)))?;
        response.headers_mut().insert(SET_COOKIE, cookie);
    }

    Ok(response)
}

/// `POST /upload_pdf`: save the uploaded PDF and index it
#[inline]
pub async fn upload_pdf(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<String, WebError> {
    let mut multipart = multipart.map_err(|e| WebError::bad_request(e.body_text()))?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(PDF_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await.map_err(multipart_error)?;
        upload = Some((filename, data));
        break;
    }

    let Some((filename, data)) = upload else {
        return Err(WebError::bad_request("No file received"));
    };

    if filename.trim().is_empty() {
        return Err(WebError::bad_request("No file selected"));
    }

    if !allowed_file(&filename) {
        return Err(WebError::bad_request("Only PDF files are allowed"));
    }

    let safe_name = sanitize_filename(&filename);
    if safe_name.is_empty() || !allowed_file(&safe_name) {
        return Err(WebError::bad_request("Invalid file name"));
    }

    tokio::fs::create_dir_all(&state.upload_dir)
        .await
        .map_err(|e| WebError::processing("Failed to process PDF", e))?;

    let save_path = state.upload_dir.join(&safe_name);
    tokio::fs::write(&save_path, &data)
        .await
        .map_err(|e| WebError::processing("Failed to process PDF", e))?;
    info!("Saved upload {} ({} bytes)", save_path.display(), data.len());

    // The saved file stays on disk if indexing fails
    let chunks = state
        .indexer
        .index_pdf(&save_path)
        .await
        .map_err(|e| WebError::processing("Failed to process PDF", e))?;
    info!("Indexed {} chunks from {}", chunks, safe_name);

    Ok(format!(
        "**{}** uploaded and indexed successfully!\nYou can now ask questions from this cookbook.",
        safe_name
    ))
}

fn multipart_error(e: MultipartError) -> WebError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        WebError::PayloadTooLarge("File is too large".to_string())
    } else {
        WebError::bad_request(format!("Invalid upload: {}", e.body_text()))
    }
}
