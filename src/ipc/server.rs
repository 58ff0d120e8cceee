//! Unix domain socket server for IPC
//!
//! Answers status and marker queries, and pushes session events to
//! subscribed clients.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{broadcast, mpsc, watch};
use tracing::{debug, error, info, warn};

use crate::events::SessionEvent;
use crate::session::SessionView;

use super::protocol::{Notification, Request, Response, SessionStatus};

/// Largest accepted request body
const MAX_MESSAGE_LEN: usize = 1024 * 1024;

/// IPC server handling client connections
pub struct Server {
    socket_path: PathBuf,
    listener: UnixListener,
    view: watch::Receiver<SessionView>,
    start_time: Instant,
    events: broadcast::Sender<SessionEvent>,
    shutdown_tx: broadcast::Sender<()>,
}

impl Server {
    /// Bind the socket. Queries are answered from `view`; clients that
    /// subscribe receive events from `events`.
    pub fn new(
        socket_path: &Path,
        view: watch::Receiver<SessionView>,
        events: broadcast::Sender<SessionEvent>,
    ) -> Result<Self> {
        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent).context("failed to create socket directory")?;
        }

        // A previous run may have left its socket behind
        if socket_path.exists() {
            std::fs::remove_file(socket_path).context("failed to remove stale socket")?;
        }

        let listener = UnixListener::bind(socket_path).context("failed to bind Unix socket")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(socket_path, std::fs::Permissions::from_mode(0o600))?;
        }

        let (shutdown_tx, _) = broadcast::channel(1);

        info!(?socket_path, "IPC server listening");

        Ok(Self {
            socket_path: socket_path.to_owned(),
            listener,
            view,
            start_time: Instant::now(),
            events,
            shutdown_tx,
        })
    }

    /// Accept connections until the task is dropped
    pub async fn run(&self) -> Result<()> {
        loop {
            match self.listener.accept().await {
                Ok((stream, _addr)) => {
                    debug!("client connected");
                    let view = self.view.clone();
                    let start_time = self.start_time;
                    let events = self.events.clone();
                    let mut shutdown_rx = self.shutdown_tx.subscribe();

                    tokio::spawn(async move {
                        tokio::select! {
                            result = Self::handle_client(stream, view, start_time, events) => {
                                if let Err(e) = result {
                                    warn!(?e, "client handler error");
                                }
                            }
                            _ = shutdown_rx.recv() => {
                                debug!("client handler shutting down");
                            }
                        }
                    });
                }
                Err(e) => {
                    error!(?e, "accept error");
                }
            }
        }
    }

    /// Serve one client. Requests are read on a separate task so a
    /// half-read frame is never lost to an incoming notification.
    async fn handle_client(
        stream: UnixStream,
        view: watch::Receiver<SessionView>,
        start_time: Instant,
        events: broadcast::Sender<SessionEvent>,
    ) -> Result<()> {
        let (reader, mut writer) = stream.into_split();
        let (request_tx, mut request_rx) = mpsc::channel::<Result<Request, String>>(8);
        let reader_task = tokio::spawn(read_requests(reader, request_tx));

        let mut subscription: Option<broadcast::Receiver<SessionEvent>> = None;

        let result = loop {
            tokio::select! {
                request = request_rx.recv() => {
                    let response = match request {
                        None => break Ok(()),
                        Some(Ok(request)) => {
                            debug!(?request, "received request");
                            if matches!(request, Request::Subscribe) && subscription.is_none() {
                                subscription = Some(events.subscribe());
                                debug!("client subscribed to notifications");
                            }
                            process_request(request, &view, start_time)
                        }
                        Some(Err(message)) => Response::Error {
                            code: "bad_request".to_string(),
                            message,
                        },
                    };
                    if let Err(e) = send_message(&mut writer, &response).await {
                        break Err(e);
                    }
                }
                event = next_event(&mut subscription) => {
                    match event {
                        Ok(event) => {
                            let note = Notification::Event { event };
                            if let Err(e) = send_message(&mut writer, &note).await {
                                break Err(e);
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            warn!(skipped = n, "subscriber lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            subscription = None;
                        }
                    }
                }
            }
        };

        reader_task.abort();
        result
    }

    /// Disconnect clients and remove the socket file
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());

        if self.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.socket_path) {
                warn!(?e, "failed to remove socket file");
            }
        }

        info!("IPC server shutdown complete");
    }
}

/// Answer a query from the session's latest published view
fn process_request(
    request: Request,
    view: &watch::Receiver<SessionView>,
    start_time: Instant,
) -> Response {
    match request {
        Request::Ping => Response::Pong,

        Request::GetStatus => {
            let view = view.borrow();
            Response::Status(SessionStatus {
                mode: view.mode,
                right_markers: view.right.len(),
                left_markers: view.left.len(),
                right_playing: view.right_playing,
                left_playing: view.left_playing,
                uptime_secs: start_time.elapsed().as_secs(),
                ..SessionStatus::default()
            })
        }

        Request::GetMarkers => {
            let view = view.borrow();
            Response::Markers {
                right: view.right.clone(),
                left: view.left.clone(),
            }
        }

        Request::Subscribe => Response::Subscribed,
    }
}

/// Read length-prefixed requests until EOF or a bad frame. Bodies that
/// are not valid requests are passed on as errors so the client gets an
/// answer.
async fn read_requests(
    mut reader: OwnedReadHalf,
    request_tx: mpsc::Sender<Result<Request, String>>,
) {
    loop {
        let mut len_buf = [0u8; 4];
        match reader.read_exact(&mut len_buf).await {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                debug!("client disconnected");
                return;
            }
            Err(e) => {
                warn!(?e, "failed to read request length");
                return;
            }
        }

        let len = u32::from_le_bytes(len_buf) as usize;
        if len > MAX_MESSAGE_LEN {
            warn!(len, "message too large, disconnecting");
            return;
        }

        let mut msg_buf = vec![0u8; len];
        if let Err(e) = reader.read_exact(&mut msg_buf).await {
            warn!(?e, "failed to read request body");
            return;
        }

        let request = serde_json::from_slice::<Request>(&msg_buf).map_err(|e| {
            warn!(error = %e, "failed to parse request");
            e.to_string()
        });

        if request_tx.send(request).await.is_err() {
            return;
        }
    }
}

/// Wait for the next event, or forever when not subscribed
async fn next_event(
    subscription: &mut Option<broadcast::Receiver<SessionEvent>>,
) -> Result<SessionEvent, broadcast::error::RecvError> {
    match subscription {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// Send a length-prefixed JSON message
async fn send_message<T: serde::Serialize>(writer: &mut OwnedWriteHalf, msg: &T) -> Result<()> {
    let msg_bytes = serde_json::to_vec(msg)?;
    let msg_len = (msg_bytes.len() as u32).to_le_bytes();

    writer.write_all(&msg_len).await?;
    writer.write_all(&msg_bytes).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::markers::Marker;
    use crate::pose::Point;
    use crate::state::Mode;

    async fn request(stream: &mut UnixStream, request: &Request) -> serde_json::Value {
        let body = serde_json::to_vec(request).unwrap();
        stream.write_all(&(body.len() as u32).to_le_bytes()).await.unwrap();
        stream.write_all(&body).await.unwrap();
        read_value(stream).await
    }

    async fn read_value(stream: &mut UnixStream) -> serde_json::Value {
        let mut len_buf = [0u8; 4];
        stream.read_exact(&mut len_buf).await.unwrap();
        let mut buf = vec![0u8; u32::from_le_bytes(len_buf) as usize];
        stream.read_exact(&mut buf).await.unwrap();
        serde_json::from_slice(&buf).unwrap()
    }

    fn view_with_markers(count: usize) -> SessionView {
        SessionView {
            mode: Mode::Capture,
            right: (0..count)
                .map(|i| Marker::new(Point::new(i as f64, 0.0), 150.0))
                .collect(),
            ..SessionView::default()
        }
    }

    #[test]
    fn test_status_reflects_view() {
        let (_view_tx, view) = watch::channel(SessionView {
            mode: Mode::Perform,
            left: vec![Marker::new(Point::new(5.0, 6.0), 300.0)],
            left_playing: true,
            ..SessionView::default()
        });

        match process_request(Request::GetStatus, &view, Instant::now()) {
            Response::Status(status) => {
                assert_eq!(status.mode, Mode::Perform);
                assert_eq!(status.left_markers, 1);
                assert_eq!(status.right_markers, 0);
                assert!(status.left_playing);
                assert_eq!(status.version, env!("CARGO_PKG_VERSION"));
            }
            other => panic!("unexpected response {other:?}"),
        }
    }

    #[test]
    fn test_marker_burst_is_never_dropped() {
        // More markers than any event buffer holds, published at once
        let (view_tx, view) = watch::channel(SessionView::default());
        view_tx.send_replace(view_with_markers(70));

        match process_request(Request::GetMarkers, &view, Instant::now()) {
            Response::Markers { right, left } => {
                assert_eq!(right.len(), 70);
                assert_eq!(right[0].x, 0.0);
                assert_eq!(right[69].x, 69.0);
                assert!(left.is_empty());
            }
            other => panic!("unexpected response {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_round_trip_over_socket() {
        let dir = std::env::temp_dir().join(format!("wrist-synth-test-{}", std::process::id()));
        let socket = dir.join("session.sock");
        let (events, _) = broadcast::channel(16);
        let (view_tx, view) = watch::channel(SessionView::default());
        let server = Arc::new(Server::new(&socket, view, events.clone()).unwrap());

        view_tx.send_replace(SessionView {
            right: vec![Marker::new(Point::new(200.0, 300.0), 148.21)],
            ..SessionView::default()
        });

        let runner = Arc::clone(&server);
        let handle = tokio::spawn(async move { runner.run().await });

        let mut client = UnixStream::connect(&socket).await.unwrap();
        assert_eq!(request(&mut client, &Request::Ping).await["type"], "pong");

        let markers = request(&mut client, &Request::GetMarkers).await;
        assert_eq!(markers["right"][0]["label"], "148.210");

        let body = br#"{"type":"teleport"}"#;
        client.write_all(&(body.len() as u32).to_le_bytes()).await.unwrap();
        client.write_all(body).await.unwrap();
        let error = read_value(&mut client).await;
        assert_eq!(error["type"], "error");
        assert_eq!(error["code"], "bad_request");

        assert_eq!(request(&mut client, &Request::Subscribe).await["type"], "subscribed");
        events.send(SessionEvent::SlidesStopped).unwrap();
        let note = read_value(&mut client).await;
        assert_eq!(note["event"]["type"], "slides_stopped");

        handle.abort();
        server.shutdown().await;
        let _ = std::fs::remove_dir_all(&dir);
    }
}
