use anyhow::Result;
use futures::{SinkExt, StreamExt};
use gantryd::{
    config::GantryConfig,
    dispatcher::CommandDispatcher,
    line_server::LineServer,
    movement::build_backend,
};
use tokio::net::UnixStream;
use tokio_util::codec::{Framed, LinesCodec};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    // Optional device profile; the simulated gantry is used without one.
    let config = match std::env::args().nth(1) {
        Some(path) => GantryConfig::from_file(&path)?,
        None => GantryConfig::default(),
    };

    info!("Starting gantryd");

    let backend = build_backend(&config.backend)?;
    let dispatcher = CommandDispatcher::new(backend, config.dispatcher.clone());

    let mut server = LineServer::new(config.server.clone(), dispatcher);
    server.start().await?;

    info!("You can connect using tools like socat:");
    info!("  socat - UNIX-CONNECT:{}", config.server.socket_path);

    let stream = UnixStream::connect(&config.server.socket_path).await?;
    let mut client = Framed::new(stream, LinesCodec::new());

    for request in [
        "1|MXY|12.5,20",
        "2|MHT|12",
        "3|THZ|90",
        "4|TVT|200",
        "5|PMP|1,0.25",
        "6|MMH|",
        "7|MHT|",
        "8|XYZ|",
        "9|SLP|2",
        "10|STP|",
    ] {
        info!("-> {}", request);
        client.send(request).await?;

        while let Some(line) = client.next().await {
            match line {
                Ok(line) => {
                    info!("<- {}", line);
                    if line.contains("|RES|") {
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to read response: {}", e);
                    break;
                }
            }
        }
    }

    info!("Server is now running; press Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;

    info!("Shutting down...");
    server.shutdown().await?;
    info!("gantryd shutdown complete");

    Ok(())
}
