//! HTTP surface — index page, synthesis form handler, MP3 downloads.
//!
//! Three routes:
//!
//! ```text
//! GET  /               — synthesis form + flash banner + artifact table
//! POST /generate       — validate → synthesize → sanitize → store → redirect
//! GET  /mp3/{filename} — attachment download, traversal rejected
//! ```
//!
//! No session state: the generate handler encodes its outcome as `ok`/`error`
//! query parameters on the redirect, and the index view renders the banner
//! from them. Either a complete artifact is written and a success message
//! shown, or nothing is written and an error message shown — there is no
//! partial-success state.

use std::fmt::Write as _;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use chrono::Local;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use url::form_urlencoded;

use murmur_core::sanitize::sanitize_file_name;
use murmur_core::types::{AudioArtifact, SpeechRequest};

use crate::error::AppError;
use crate::store::ArtifactStore;
use crate::synth::SynthesisClient;

const MODELS: &[&str] = &["gpt-4o-mini-tts", "tts-1", "tts-1-hd"];
const VOICES: &[&str] = &[
    "alloy", "ballad", "echo", "fable", "onyx", "sage", "shimmer", "verse",
];

/// Shared per-process state. Cheap to clone per request.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ArtifactStore>,
    pub synth: Arc<dyn SynthesisClient>,
}

/// Build the axum router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/generate", post(generate))
        .route("/mp3/{filename}", get(download))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ─── Handlers ──────────────────────────────────────────────────────────────

/// Outcome banner carried on the redirect query string. Caller-supplied
/// display text: anyone can craft a URL with these set, so the view renders
/// them HTML-escaped and nothing else trusts them.
#[derive(serde::Deserialize, Default)]
struct FlashParams {
    ok: Option<String>,
    error: Option<String>,
}

async fn index(State(state): State<AppState>, Query(flash): Query<FlashParams>) -> Html<String> {
    Html(render_index(&state.store.list(), &flash))
}

#[derive(serde::Deserialize)]
struct GenerateForm {
    #[serde(default)]
    api_key: String,
    #[serde(default)]
    model: String,
    #[serde(default)]
    voice: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    file_name: String,
}

async fn generate(State(state): State<AppState>, Form(form): Form<GenerateForm>) -> Redirect {
    match handle_generate(&state, form).await {
        Ok(file_name) => {
            info!("stored artifact {file_name}");
            redirect_with("ok", &format!("Audio saved as {file_name}"))
        }
        Err(e) => {
            if !matches!(e, AppError::Validation(_)) {
                error!("generate failed: {e}");
            }
            redirect_with("error", &e.to_string())
        }
    }
}

/// Per-request pipeline: validate → gateway → sanitize → write.
/// Any failure short-circuits; nothing is written on the error path.
async fn handle_generate(state: &AppState, form: GenerateForm) -> Result<String, AppError> {
    let api_key = require(&form.api_key, "Enter your OpenAI API key.")?;
    let text = require(&form.text, "Enter some text to synthesize.")?;
    let model = require(&form.model, "Choose a model.")?;
    let voice = require(&form.voice, "Choose a voice.")?;

    let req = SpeechRequest {
        api_key,
        model,
        voice,
        text,
    };
    let bytes = state.synth.synthesize(&req).await?;

    let requested = form.file_name.trim();
    let base = if requested.is_empty() {
        Local::now().format("tts-%Y%m%d-%H%M%S").to_string()
    } else {
        requested.to_string()
    };
    let token = sanitize_file_name(&base);

    Ok(state.store.write(&token, &bytes)?)
}

fn require(value: &str, message: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(AppError::Validation(message.to_string()))
    } else {
        Ok(trimmed.to_string())
    }
}

fn redirect_with(kind: &str, message: &str) -> Redirect {
    let query: String = form_urlencoded::Serializer::new(String::new())
        .append_pair(kind, message)
        .finish();
    Redirect::to(&format!("/?{query}"))
}

async fn download(State(state): State<AppState>, Path(filename): Path<String>) -> Response {
    let path = match state.store.resolve(&filename) {
        Ok(path) => path,
        Err(_) => {
            warn!("rejected download path {filename:?}");
            return (StatusCode::BAD_REQUEST, "invalid file name").into_response();
        }
    };

    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            // Quotes in the name would break the header value.
            let attachment = filename.replace('"', "");
            (
                [
                    (header::CONTENT_TYPE, "audio/mpeg".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{attachment}\""),
                    ),
                ],
                bytes,
            )
                .into_response()
        }
        Err(_) => (StatusCode::NOT_FOUND, "no such file").into_response(),
    }
}

// ─── View ──────────────────────────────────────────────────────────────────

fn render_index(artifacts: &[AudioArtifact], flash: &FlashParams) -> String {
    let mut page = String::with_capacity(4096);
    page.push_str(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>murmur — speech studio</title>\n<style>\n\
         body{font-family:sans-serif;max-width:48rem;margin:2rem auto;padding:0 1rem}\n\
         label{display:block;margin-top:.75rem;font-weight:600}\n\
         input,select,textarea{width:100%;padding:.4rem;box-sizing:border-box}\n\
         textarea{min-height:7rem}\n\
         button{margin-top:1rem;padding:.5rem 1.5rem}\n\
         table{width:100%;border-collapse:collapse;margin-top:1.5rem}\n\
         th,td{text-align:left;padding:.4rem;border-bottom:1px solid #ddd}\n\
         .flash{padding:.6rem 1rem;border-radius:4px;margin-bottom:1rem}\n\
         .flash.ok{background:#e6f4ea;color:#1e4620}\n\
         .flash.error{background:#fdecea;color:#611a15}\n\
         </style>\n</head>\n<body>\n<h1>murmur</h1>\n",
    );

    if let Some(msg) = &flash.ok {
        let _ = write!(page, "<div class=\"flash ok\">{}</div>\n", escape_html(msg));
    }
    if let Some(msg) = &flash.error {
        let _ = write!(
            page,
            "<div class=\"flash error\">{}</div>\n",
            escape_html(msg)
        );
    }

    page.push_str(
        "<form method=\"post\" action=\"/generate\">\n\
         <label for=\"api_key\">OpenAI API key</label>\n\
         <input type=\"password\" id=\"api_key\" name=\"api_key\" autocomplete=\"off\">\n\
         <label for=\"model\">Model</label>\n<select id=\"model\" name=\"model\">\n",
    );
    for model in MODELS {
        let _ = write!(page, "<option value=\"{model}\">{model}</option>\n");
    }
    // Voice is free text with suggestions, so custom voices pass through.
    page.push_str(
        "</select>\n<label for=\"voice\">Voice</label>\n\
         <input type=\"text\" id=\"voice\" name=\"voice\" list=\"voices\" placeholder=\"alloy\">\n\
         <datalist id=\"voices\">\n",
    );
    for voice in VOICES {
        let _ = write!(page, "<option value=\"{voice}\"></option>\n");
    }
    page.push_str(
        "</datalist>\n\
         <label for=\"text\">Text</label>\n\
         <textarea id=\"text\" name=\"text\"></textarea>\n\
         <label for=\"file_name\">File name (optional)</label>\n\
         <input type=\"text\" id=\"file_name\" name=\"file_name\" placeholder=\"my-clip\">\n\
         <button type=\"submit\">Generate MP3</button>\n</form>\n",
    );

    if artifacts.is_empty() {
        page.push_str("<p>No audio files yet.</p>\n");
    } else {
        page.push_str(
            "<table>\n<tr><th>File</th><th>Size (KB)</th><th>Created</th></tr>\n",
        );
        for artifact in artifacts {
            let name = escape_html(&artifact.name);
            let _ = write!(
                page,
                "<tr><td><a href=\"/mp3/{name}\" download>{name}</a></td>\
                 <td>{:.1}</td><td>{}</td></tr>\n",
                artifact.size_kb,
                escape_html(&artifact.created),
            );
        }
        page.push_str("</table>\n");
    }

    page.push_str("</body>\n</html>\n");
    page
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_html_covers_specials() {
        assert_eq!(
            escape_html("<b>\"a\" & 'b'</b>"),
            "&lt;b&gt;&quot;a&quot; &amp; &#39;b&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn redirect_query_is_url_encoded() {
        let query: String = form_urlencoded::Serializer::new(String::new())
            .append_pair("error", "speech synthesis failed: 401 Unauthorized")
            .finish();
        assert!(query.starts_with("error="));
        assert!(!query.contains(' '));
    }

    #[test]
    fn render_includes_flash_and_listing() {
        let artifacts = vec![AudioArtifact {
            name: "greeting.mp3".into(),
            size_kb: 12.3,
            created: "2026-08-25 10:00:00".into(),
        }];
        let flash = FlashParams {
            ok: Some("Audio saved as greeting.mp3".into()),
            error: None,
        };
        let page = render_index(&artifacts, &flash);
        assert!(page.contains("Audio saved as greeting.mp3"));
        assert!(page.contains("/mp3/greeting.mp3"));
        assert!(page.contains("12.3"));
    }

    #[test]
    fn render_escapes_flash_message() {
        let flash = FlashParams {
            ok: None,
            error: Some("<script>alert(1)</script>".into()),
        };
        let page = render_index(&[], &flash);
        assert!(!page.contains("<script>"));
        assert!(page.contains("&lt;script&gt;"));
    }

    #[test]
    fn voice_field_is_free_text_with_suggestions() {
        let page = render_index(&[], &FlashParams::default());
        assert!(page.contains("name=\"voice\" list=\"voices\""));
        assert!(page.contains("<datalist id=\"voices\">"));
        assert!(page.contains("<option value=\"alloy\">"));
    }

    #[test]
    fn require_trims_and_rejects_empty() {
        assert_eq!(require("  ok  ", "msg").unwrap(), "ok");
        assert!(matches!(
            require("   ", "msg"),
            Err(AppError::Validation(_))
        ));
    }
}
