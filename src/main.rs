use std::sync::Arc;

use mediapipe::config::{AppState, Config};
use mediapipe::{logger, server};
use tokio::sync::Notify;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Optional config file path (without extension) as the first argument
    let cfg = match std::env::args().nth(1) {
        Some(path) => Config::load_from(&path)?,
        None => Config::load()?,
    };

    logger::init(&cfg)?;

    // Build the Tokio runtime, sized by the workers setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_reusable_listener(addr)?;

    let state = Arc::new(AppState::new(&cfg));
    if state.media_root().is_none() {
        logger::log_warning(&format!(
            "Media root '{}' does not exist; every request will be answered as not found",
            cfg.media.root
        ));
    }

    let shutdown = Arc::new(Notify::new());
    server::start_signal_handler(Arc::clone(&shutdown))?;

    logger::log_server_start(&addr, &cfg);
    server::start_server_loop(listener, state, shutdown).await;
    Ok(())
}
