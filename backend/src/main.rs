//! Companion entry-point: loads persisted users, starts the notification
//! dispatcher and the write-behind flusher, then serves the REST API.

mod server;

use std::sync::Arc;

use actix_web::web;
use mockable::{DefaultClock, DefaultEnv};
use tokio::sync::oneshot;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use companion::domain::ports::{RandomPublicIds, RecordStore};
use companion::domain::{FlushWorker, NotificationDispatcher, SocialStore};
use companion::inbound::http::health::HealthState;
use companion::inbound::http::launch_config::{BuildMode, launch_settings_from_env};
use companion::inbound::http::state::{HttpState, HttpStatePorts};
use companion::outbound::{BotApiNotifier, ChannelNotificationSink, JsonRecordStore};
use companion::settings::AppSettings;
use ortho_config::OrthoConfig;

use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load()
        .map_err(|e| std::io::Error::other(format!("failed to load configuration: {e}")))?;
    let launch = launch_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)?;
    let verifier = launch.verifier().map_err(std::io::Error::other)?;

    let records: Arc<dyn RecordStore> =
        Arc::new(JsonRecordStore::open(settings.data_dir()).map_err(std::io::Error::other)?);
    let snapshot = records.load().map_err(std::io::Error::other)?;
    info!(users = snapshot.len(), data_dir = %settings.data_dir().display(), "loaded user records");

    let (sink, queue) = ChannelNotificationSink::bounded(settings.notify_queue_capacity());
    let clock = Arc::new(DefaultClock);
    let store = Arc::new(SocialStore::from_snapshot(
        snapshot,
        Arc::new(RandomPublicIds),
        clock.clone(),
        Arc::new(sink),
    ));
    for violation in store.integrity_violations() {
        warn!(%violation, "stored social graph is inconsistent");
    }

    let notifier = BotApiNotifier::new(
        settings.platform_api_base(),
        &launch.bot_token,
        settings.notify_timeout(),
    )
    .map_err(std::io::Error::other)?;
    tokio::spawn(NotificationDispatcher::new(queue, Arc::new(notifier)).run());

    let (stop_flush, flush_stopped) = oneshot::channel::<()>();
    let flusher = FlushWorker::new(store.clone(), records, settings.flush_interval());
    let flush_task = tokio::spawn(flusher.run(async move {
        // A dropped sender also means shutdown.
        let _ = flush_stopped.await;
    }));

    let http_state = HttpState::new(
        HttpStatePorts::from_store(store),
        Arc::new(verifier),
        clock,
    );
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(
        health_state.clone(),
        ServerConfig::new(settings.bind_addr(), http_state)
            .with_allowed_origins(settings.allowed_origins()),
    )?;
    info!(addr = %settings.bind_addr(), "listening");

    let served = server.await;
    health_state.mark_unhealthy();
    let _ = stop_flush.send(());
    if let Err(e) = flush_task.await {
        error!(error = %e, "flush worker did not finish cleanly");
    }
    served
}
