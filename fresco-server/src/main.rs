//! Board server binary.
//!
//! Runs with sensible defaults; configure through the environment:
//!
//! ```text
//! FRESCO_ADDR=0.0.0.0:9100 FRESCO_DATA=/var/lib/fresco fresco-server
//! ```

use fresco_server::{BoardServer, ServerConfig, ShutdownCoordinator};

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = ServerConfig::from_env();
    log::info!(
        "Starting fresco-server on {} (data: {})",
        config.bind_addr,
        config.store_path.display()
    );

    let server = match BoardServer::new(config) {
        Ok(server) => server,
        Err(e) => {
            log::error!("Failed to open the board store: {e}");
            std::process::exit(1);
        }
    };

    let shutdown = ShutdownCoordinator::new();

    // Ctrl-C and SIGTERM end the process through the same latch
    let latch = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            latch.trigger("interrupt");
        }
    });

    #[cfg(unix)]
    {
        let latch = shutdown.clone();
        tokio::spawn(async move {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut term) => {
                    term.recv().await;
                    latch.trigger("terminate");
                }
                Err(e) => log::warn!("Could not install SIGTERM handler: {e}"),
            }
        });
    }

    if let Err(e) = server.run(shutdown).await {
        log::error!("Server error: {e}");
        std::process::exit(1);
    }
}
