pub mod codec;
pub mod config;

use anyhow::Result;
use futures::{SinkExt, StreamExt};
use std::{path::Path, sync::Arc};
use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::{UnixListener, UnixStream},
    sync::{broadcast, mpsc, Mutex, Semaphore},
};
use tokio_util::codec::Framed;
use tracing::{debug, error, info, warn};

use crate::{
    dispatcher::CommandDispatcher,
    protocol::{error::CommandError, response::Response},
};
use codec::{RequestCodec, RequestLine};
use config::LineServerConfig;

/// Serves the command link on a Unix socket.
///
/// Connections share one dispatcher, so commands from different clients are
/// still handled strictly one after another.
pub struct LineServer {
    config: LineServerConfig,
    dispatcher: Arc<Mutex<CommandDispatcher>>,
    shutdown_tx: Option<broadcast::Sender<()>>,
}

impl LineServer {
    pub fn new(config: LineServerConfig, dispatcher: CommandDispatcher) -> Self {
        Self {
            config,
            dispatcher: Arc::new(Mutex::new(dispatcher)),
            shutdown_tx: None,
        }
    }

    pub fn dispatcher(&self) -> Arc<Mutex<CommandDispatcher>> {
        self.dispatcher.clone()
    }

    /// Binds the socket (replacing a stale one) and starts accepting clients.
    pub async fn start(&mut self) -> Result<()> {
        if Path::new(&self.config.socket_path).exists() {
            tokio::fs::remove_file(&self.config.socket_path).await?;
        }

        let listener = UnixListener::bind(&self.config.socket_path)?;
        info!("Line server listening on: {}", self.config.socket_path);

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        self.shutdown_tx = Some(shutdown_tx);

        tokio::spawn(accept_clients(
            listener,
            self.dispatcher.clone(),
            self.config.clone(),
            shutdown_rx,
        ));

        Ok(())
    }

    pub async fn shutdown(&self) -> Result<()> {
        if let Some(shutdown_tx) = &self.shutdown_tx {
            let _ = shutdown_tx.send(());
        }

        if Path::new(&self.config.socket_path).exists() {
            tokio::fs::remove_file(&self.config.socket_path).await?;
        }

        info!("Line server shutdown complete");
        Ok(())
    }
}

async fn accept_clients(
    listener: UnixListener,
    dispatcher: Arc<Mutex<CommandDispatcher>>,
    config: LineServerConfig,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    let slots = Arc::new(Semaphore::new(config.max_connections));

    loop {
        let stream = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, _addr)) => stream,
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                    continue;
                }
            },
            _ = shutdown_rx.recv() => {
                info!("Line server shutting down");
                break;
            }
        };

        let Ok(slot) = slots.clone().try_acquire_owned() else {
            warn!(
                "Maximum connections reached ({}), rejecting new connection",
                config.max_connections
            );
            tokio::spawn(refuse_client(stream, config.max_line_length));
            continue;
        };

        debug!(
            "New client connected. Free slots: {}",
            slots.available_permits()
        );
        let dispatcher = dispatcher.clone();
        let mut client_shutdown = shutdown_rx.resubscribe();
        let max_line_length = config.max_line_length;

        tokio::spawn(async move {
            if let Err(e) =
                serve_stream(stream, dispatcher, &mut client_shutdown, max_line_length).await
            {
                error!("Client handler error: {}", e);
            }
            drop(slot);
            debug!("Client disconnected");
        });
    }
}

/// Tells a client over the connection limit that no backend is free for it,
/// then hangs up.
async fn refuse_client(stream: UnixStream, max_line_length: usize) {
    let mut framed = Framed::new(stream, RequestCodec::new(max_line_length));
    let busy = Response::result("", &Err(CommandError::BackendUnavailable));
    if let Err(e) = framed.send(busy.to_string()).await {
        debug!("Could not notify refused client: {}", e);
    }
}

/// Runs the command link over any byte stream until it closes or shutdown is signalled.
///
/// Responses go through a writer task so progress lines and results reach the
/// peer while the command pipeline is still blocked (in a move or a deferred sleep).
pub async fn serve_stream<S>(
    stream: S,
    dispatcher: Arc<Mutex<CommandDispatcher>>,
    shutdown_rx: &mut broadcast::Receiver<()>,
    max_line_length: usize,
) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let framed = Framed::new(stream, RequestCodec::new(max_line_length));
    let (mut sink, mut lines) = framed.split();
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();

    let writer = tokio::spawn(async move {
        while let Some(line) = out_rx.recv().await {
            if let Err(e) = sink.send(line).await {
                error!("Failed to send response: {}", e);
                break;
            }
        }
    });

    loop {
        tokio::select! {
            line_result = lines.next() => {
                match line_result {
                    Some(Ok(RequestLine::Line(line))) => {
                        if line.trim().is_empty() {
                            continue;
                        }
                        debug!("Received command: {}", line);
                        process_line(&line, &dispatcher, &out_tx).await;
                    }
                    Some(Ok(RequestLine::Oversized)) => {
                        warn!("Request longer than {} bytes dropped", max_line_length);
                        let response = Response::result("", &Err(CommandError::InvalidCommand));
                        let _ = out_tx.send(response.to_string());
                    }
                    Some(Err(e)) => {
                        error!("Error reading from client: {}", e);
                        break;
                    }
                    None => {
                        debug!("Client disconnected");
                        break;
                    }
                }
            }
            _ = shutdown_rx.recv() => {
                debug!("Shutdown signal received, closing client connection");
                break;
            }
        }
    }

    drop(out_tx);
    writer.await?;
    Ok(())
}

/// Full lifecycle of one request line: parse, execute, respond, deferred
/// sleep, reset. The dispatcher stays locked throughout.
async fn process_line(
    line: &str,
    dispatcher: &Mutex<CommandDispatcher>,
    out: &mpsc::UnboundedSender<String>,
) {
    let mut dispatcher = dispatcher.lock().await;

    match dispatcher.accept(line) {
        Ok(command) => {
            let id = command.request_id().to_string();
            let mut progress = |snapshot: &str| {
                let _ = out.send(Response::progress(&id, snapshot).to_string());
            };
            let result = dispatcher.execute(&command, &mut progress).await;
            let _ = out.send(Response::result(&id, &result).to_string());
        }
        Err(invalid) => {
            warn!("{}", invalid);
            let id = invalid.request_id.unwrap_or_default();
            let response = Response::result(&id, &Err(CommandError::InvalidCommand));
            let _ = out.send(response.to_string());
        }
    }

    dispatcher.post_return().await;
    dispatcher.reset();
}
