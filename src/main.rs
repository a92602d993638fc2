use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use log::info;

use voltguard::{
    Engine, EngineConfig, EngineController, JsonFileSink, NotificationRelay, SimulatedCamera,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("VoltGuard starting up...");

    let config = EngineConfig::load_or_default(Path::new("voltguard.json"))?;
    let relay = NotificationRelay::new();

    // Console subscriber, standing in for a connected UI client.
    let (mut subscription, backlog) = relay.subscribe();
    for notification in backlog {
        info!(
            "[backlog] [{}] {}",
            notification.level.as_str(),
            notification.message
        );
    }
    let printer = tokio::spawn(async move {
        while let Some(notification) = subscription.recv().await {
            info!(
                "[notify] [{}] {}",
                notification.level.as_str(),
                notification.message
            );
        }
    });

    let engine = Engine::new(config, relay.clone())
        .with_sink(Box::new(JsonFileSink::new("waste_summary.json")));

    let source = SimulatedCamera::new(
        vec!["laptop".to_string(), "lamp".to_string(), "tv".to_string()],
        Duration::from_millis(800),
    );

    let mut controller = EngineController::new();
    controller.start(engine, Box::new(source))?;

    tokio::signal::ctrl_c().await?;
    info!("VoltGuard shutting down...");

    let _ = controller.stop().await?;
    printer.abort();
    Ok(())
}
