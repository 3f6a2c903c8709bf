//! murmur — web front-end for OpenAI speech synthesis.
//!
//! ```text
//! murmur [--host 127.0.0.1] [--port 5000] [--store-dir mp3]
//! ```
//!
//! When `--port` is not given, the `PORT` environment variable is consulted
//! before falling back to 5000.

use std::sync::Arc;

use clap::Parser;

use murmur_lib::server::{AppState, router};
use murmur_lib::store::ArtifactStore;
use murmur_lib::synth::OpenAiSpeech;

const DEFAULT_PORT: u16 = 5000;

/// murmur — text-to-speech studio with a local MP3 store
#[derive(Parser)]
#[command(name = "murmur", version, about)]
struct Cli {
    /// Listen host
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    /// Listen port (default: $PORT, else 5000)
    #[arg(long)]
    port: Option<u16>,
    /// Directory holding generated MP3 files
    #[arg(long, default_value = "mp3")]
    store_dir: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let port = cli.port.unwrap_or_else(|| {
        std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT)
    });

    let store = match ArtifactStore::open(&cli.store_dir) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("cannot open store directory {}: {e}", cli.store_dir);
            std::process::exit(1);
        }
    };

    let state = AppState {
        store: Arc::new(store),
        synth: Arc::new(OpenAiSpeech::new()),
    };
    let app = router(state);

    let addr = format!("{}:{port}", cli.host);
    eprintln!("murmur listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    axum::serve(listener, app).await.expect("server error");
}
