use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use parlance::application::services::{ModelGateway, SpeechService};
use parlance::infrastructure::audio::AudioDecoderFactory;
use parlance::infrastructure::http::HttpAudioFetcher;
use parlance::infrastructure::model::CandleWhisper;
use parlance::infrastructure::observability::{init_tracing, TracingConfig};
use parlance::presentation::{create_router, AppState, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env().context("reading configuration")?;

    init_tracing(TracingConfig::default(), settings.server.port);

    let fetcher = Arc::new(HttpAudioFetcher::new());
    let decoder = AudioDecoderFactory::create(settings.decoder);

    // Fatal on failure: without a model the process must not accept traffic.
    let model = CandleWhisper::load(&settings.model.name, &settings.model.models_dir)
        .with_context(|| format!("loading Whisper model {}", settings.model.name))?;
    let gateway = Arc::new(ModelGateway::new(model));

    let speech_service = Arc::new(SpeechService::new(fetcher, decoder, gateway));

    let state = AppState {
        speech_service,
        model_name: settings.model.name.clone(),
    };

    let router = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
