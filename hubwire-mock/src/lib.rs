use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;

use crate::bus::HubBus;
use crate::settings::Settings;
use crate::simulate::spawn_simulator;

pub use crate::app::create_app;

mod app;
pub mod bus;
pub mod errors;
pub mod handles;
pub mod protobuf;
pub mod registry;
pub mod settings;
pub mod simulate;

pub async fn run(settings: &Arc<Settings>) -> anyhow::Result<()> {
    let bus = Arc::new(HubBus::new(
        settings.registry.capacity,
        settings.stream.channel_size,
    ));

    if settings.simulator.enabled {
        spawn_simulator(
            bus.clone(),
            Duration::from_millis(settings.simulator.period_ms.max(1)),
        );
    }

    let app = create_app(bus);

    let ip_addr = settings
        .server
        .host
        .parse::<IpAddr>()
        .with_context(|| format!("Invalid server host: {}", settings.server.host))?;

    let address = SocketAddr::from((ip_addr, settings.server.port));

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    tracing::info!("listening on {:?}", address);

    axum::serve(listener, app).await?;

    Ok(())
}
