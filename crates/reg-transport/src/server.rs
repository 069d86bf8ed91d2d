//! TCP server

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::BytesMut;
use reg_core::{RegError, RegResult};
use reg_wire::{FrameCodec, JsonRequest, JsonResponse};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::RequestHandler;

const READ_BUFFER_SIZE: usize = 8 * 1024;

/// First pause after a failed accept, doubled up to `MAX_ACCEPT_BACKOFF`
const ACCEPT_BACKOFF: Duration = Duration::from_millis(50);
const MAX_ACCEPT_BACKOFF: Duration = Duration::from_secs(1);

/// JSON-RPC server over TCP
pub struct RpcServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    codec: FrameCodec,
}

impl RpcServer {
    /// Bind to a local address
    pub async fn bind(addr: impl ToSocketAddrs, codec: FrameCodec) -> RegResult<Self> {
        let listener = TcpListener::bind(addr).await.map_err(transport_error)?;
        let local_addr = listener.local_addr().map_err(transport_error)?;

        Ok(RpcServer {
            listener,
            local_addr,
            codec,
        })
    }

    /// Get local address
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accept connections until `shutdown` flips to true or its sender is
    /// dropped. Connections already accepted run to completion.
    pub async fn serve(
        self,
        handler: Arc<dyn RequestHandler>,
        mut shutdown: watch::Receiver<bool>,
    ) -> RegResult<()> {
        info!(addr = %self.local_addr, "rpc server listening");
        let mut backoff = ACCEPT_BACKOFF;

        loop {
            tokio::select! {
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        backoff = ACCEPT_BACKOFF;
                        debug!(%peer, "connection accepted");
                        let handler = Arc::clone(&handler);
                        let codec = self.codec;
                        tokio::spawn(async move {
                            if let Err(e) = serve_connection(stream, peer, handler, codec).await {
                                warn!(%peer, error = %e, "connection closed with error");
                            }
                        });
                    }
                    Err(e) => {
                        // Errors such as EMFILE persist until something frees up
                        warn!(error = %e, retry_in = ?backoff, "accept failed");
                        if pause_or_shutdown(backoff, &mut shutdown).await {
                            break;
                        }
                        backoff = next_backoff(backoff);
                    }
                },
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!(addr = %self.local_addr, "rpc server stopped");
        Ok(())
    }
}

fn next_backoff(current: Duration) -> Duration {
    (current * 2).min(MAX_ACCEPT_BACKOFF)
}

/// Sleep for `pause`; true if shutdown was requested meanwhile
async fn pause_or_shutdown(pause: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(pause) => false,
        changed = shutdown.changed() => changed.is_err() || *shutdown.borrow(),
    }
}

async fn serve_connection(
    mut stream: TcpStream,
    peer: SocketAddr,
    handler: Arc<dyn RequestHandler>,
    codec: FrameCodec,
) -> RegResult<()> {
    let mut buf = BytesMut::with_capacity(READ_BUFFER_SIZE);

    loop {
        loop {
            let frame = match codec.decode(&mut buf) {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(e) => {
                    let response = JsonResponse::failure(None, e.to_api_error());
                    write_response(&mut stream, &codec, &response).await?;
                    return Err(e);
                }
            };

            let response = dispatch(handler.as_ref(), &frame).await;
            write_response(&mut stream, &codec, &response).await?;
        }

        let n = stream.read_buf(&mut buf).await.map_err(transport_error)?;
        if n == 0 {
            debug!(%peer, "connection closed");
            return Ok(());
        }
    }
}

async fn dispatch(handler: &dyn RequestHandler, frame: &[u8]) -> JsonResponse {
    match serde_json::from_slice::<JsonRequest>(frame) {
        Ok(request) => {
            debug!(method = %request.method, id = ?request.id, "request");
            handler.handle_request(request).await
        }
        Err(e) => {
            warn!(error = %e, "invalid JSON frame");
            JsonResponse::failure(None, RegError::Parse(e.to_string()).to_api_error())
        }
    }
}

async fn write_response(
    stream: &mut TcpStream,
    codec: &FrameCodec,
    response: &JsonResponse,
) -> RegResult<()> {
    let bytes = match codec.encode(response) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, "response not encodable");
            let fallback = JsonResponse::failure(response.id, e.to_api_error());
            codec.encode(&fallback)?
        }
    };
    stream.write_all(&bytes).await.map_err(transport_error)
}

pub(crate) fn transport_error(e: std::io::Error) -> RegError {
    RegError::Transport(e.to_string())
}
