pub mod handlers;
pub mod response;
pub mod router;
pub mod state;

use crate::{conf::Settings, prelude::Result};
use router::build_routes;

pub async fn listen(settings: Settings) -> Result<()> {
    let service_name = settings.service_name.clone();
    let listen_port = settings.listen_port.clone();
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", &listen_port)).await?;
    tracing::info!("{} listening at port {}", &service_name, &listen_port);
    tokio::select! {
        r = axum::serve(listener, build_routes(settings)?) => {
            tracing::warn!("server ended unexpectedly: {:?}", &r)
        },
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received ctrl+c interrupt, closing server");
        }
    }
    Ok(())
}
