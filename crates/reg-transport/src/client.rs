//! TCP client

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;
use reg_core::{RegError, RegResult};
use reg_wire::{FrameCodec, JsonRequest, JsonResponse, RemoteCall, Request};
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::trace;

use crate::server::transport_error;

/// Default bound on establishing one connection
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Outbound JSON-RPC client.
///
/// Opens one connection per call, so concurrent calls never share a
/// stream. The overall deadline of a call is the caller's business.
#[derive(Debug)]
pub struct TcpClient {
    connect_timeout: Duration,
    codec: FrameCodec,
    next_id: AtomicU64,
}

impl TcpClient {
    pub fn new(codec: FrameCodec) -> Self {
        TcpClient {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            codec,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Send one raw request envelope and wait for its response
    pub async fn send(&self, instance: &str, request: &JsonRequest) -> RegResult<JsonResponse> {
        let mut stream = tokio::time::timeout(self.connect_timeout, TcpStream::connect(instance))
            .await
            .map_err(|_| RegError::Timeout(self.connect_timeout))?
            .map_err(transport_error)?;

        let bytes = self.codec.encode(request)?;
        stream.write_all(&bytes).await.map_err(transport_error)?;

        let mut buf = BytesMut::new();
        let frame = loop {
            if let Some(frame) = self.codec.decode(&mut buf)? {
                break frame;
            }
            let n = stream.read_buf(&mut buf).await.map_err(transport_error)?;
            if n == 0 {
                return Err(RegError::Transport(format!(
                    "{instance} closed the connection before responding"
                )));
            }
        };

        serde_json::from_slice(&frame).map_err(|e| RegError::ResponseSchemaMismatch {
            schema_name: "JsonResponse".into(),
            details: e.to_string(),
        })
    }
}

impl Default for TcpClient {
    fn default() -> Self {
        TcpClient::new(FrameCodec::default())
    }
}

#[async_trait]
impl RemoteCall for TcpClient {
    async fn call(&self, instance: &str, request: Request) -> RegResult<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let method = request.method();
        let envelope = JsonRequest::new(id, method.as_str(), request.params()?);

        trace!(instance, method = method.as_str(), id, "calling");
        let response = self.send(instance, &envelope).await?;

        if response.id != Some(id) {
            return Err(RegError::ResponseSchemaMismatch {
                schema_name: "JsonResponse".into(),
                details: format!("expected id {id}, got {:?}", response.id),
            });
        }
        response.into_result()
    }
}
