//! IPFS Kubo blob store.
//!
//! Talks to a Kubo node over its HTTP RPC API (`/api/v0/...`, POST only).
//!
//! | operation         | RPC call                                                      |
//! |-------------------|---------------------------------------------------------------|
//! | put, JSON         | `dag/put?input-codec=dag-json&store-codec=dag-cbor&pin=true`   |
//! | put, raw          | `block/put?cid-codec=raw&mhtype=sha2-256&pin=true`             |
//! | get, structured   | `dag/get?arg={cid}/{path}&output-codec=dag-json`               |
//! | get, raw          | `block/get?arg={cid}`                                          |
//!
//! JSON objects are stored as dag-cbor, so the node can resolve paths into
//! them without shipping the whole object back.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use campus_types::{Codec, Pointer};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use tracing::debug;

use crate::error::{BlobError, BlobResult};
use crate::path;
use crate::traits::{BlobStore, Encoding};

/// Kubo's default RPC endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5001";

/// Error-message fragments Kubo uses when a CID or link does not resolve.
const NOT_FOUND_MARKERS: &[&str] = &[
    "not found",
    "no link named",
    "could not resolve",
    "no such link",
];

#[derive(Deserialize)]
struct DagPutResponse {
    #[serde(rename = "Cid")]
    cid: CidLink,
}

#[derive(Deserialize)]
struct CidLink {
    #[serde(rename = "/")]
    link: String,
}

#[derive(Deserialize)]
struct BlockPutResponse {
    #[serde(rename = "Key")]
    key: String,
}

#[derive(Deserialize)]
struct RpcError {
    #[serde(rename = "Message")]
    message: String,
}

#[derive(Deserialize)]
struct VersionResponse {
    #[serde(rename = "Version")]
    version: String,
}

/// Blob store backed by an IPFS Kubo node.
pub struct KuboBlobStore {
    client: Client,
    endpoint: String,
    request_timeout: Duration,
}

impl KuboBlobStore {
    /// Connect to `endpoint` with default timeouts (5s connect, 30s request).
    pub fn new(endpoint: impl Into<String>) -> BlobResult<Self> {
        Self::with_timeouts(endpoint, Duration::from_secs(5), Duration::from_secs(30))
    }

    /// Connect to `endpoint` with explicit timeouts.
    pub fn with_timeouts(
        endpoint: impl Into<String>,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> BlobResult<Self> {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()
            .map_err(|e| BlobError::Transport {
                endpoint: endpoint.clone(),
                context: "building HTTP client".into(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            client,
            endpoint,
            request_timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Ask the node for its version. Useful as a liveness check.
    pub async fn version(&self) -> BlobResult<String> {
        let request = self.client.post(self.rpc_url("version"));
        let body = self.send(request, "version".into(), None).await?;
        let parsed: VersionResponse = serde_json::from_slice(&body)
            .map_err(|e| BlobError::Encoding(format!("unexpected version response: {e}")))?;
        Ok(parsed.version)
    }

    fn rpc_url(&self, method: &str) -> String {
        format!("{}/api/v0/{method}", self.endpoint)
    }

    fn file_form(data: &[u8]) -> Form {
        Form::new().part("file", Part::bytes(data.to_vec()).file_name("data"))
    }

    /// Send an RPC request and return the response body.
    ///
    /// `missing` names the pointer being resolved, if any; RPC errors that
    /// say the object or a link is missing become `NotFound`/`PathNotFound`.
    async fn send(
        &self,
        request: RequestBuilder,
        context: String,
        missing: Option<(&Pointer, Option<&str>)>,
    ) -> BlobResult<Vec<u8>> {
        let transport = |reason: String| BlobError::Transport {
            endpoint: self.endpoint.clone(),
            context: context.clone(),
            reason,
        };

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                transport(format!("timed out after {:?}", self.request_timeout))
            } else {
                transport(e.to_string())
            }
        })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| transport(e.to_string()))?;

        if status.is_success() {
            return Ok(body.to_vec());
        }

        let message = serde_json::from_slice::<RpcError>(&body)
            .map(|e| e.message)
            .unwrap_or_else(|_| String::from_utf8_lossy(&body).into_owned());

        match missing {
            Some((pointer, path)) if is_not_found(&message) => Err(match path {
                Some(p) => BlobError::PathNotFound {
                    pointer: pointer.clone(),
                    path: p.to_string(),
                },
                None => BlobError::NotFound(pointer.clone()),
            }),
            _ => Err(transport(format!("HTTP {status}: {message}"))),
        }
    }
}

/// Whether a Kubo RPC error message reports a missing object or link.
fn is_not_found(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    NOT_FOUND_MARKERS.iter().any(|m| lower.contains(m))
}

/// The `arg` parameter for `dag/get`: `cid` or `cid/seg/seg`.
fn dag_arg(pointer: &Pointer, segments: &[&str]) -> String {
    let mut arg = pointer.as_str().to_string();
    for segment in segments {
        arg.push('/');
        arg.push_str(segment);
    }
    arg
}

#[async_trait]
impl BlobStore for KuboBlobStore {
    async fn put(&self, data: &[u8], encoding: Encoding) -> BlobResult<Pointer> {
        let pointer = match encoding {
            Encoding::Json => {
                serde_json::from_slice::<serde_json::Value>(data)
                    .map_err(|e| BlobError::Encoding(format!("not a JSON document: {e}")))?;
                let request = self
                    .client
                    .post(self.rpc_url("dag/put"))
                    .query(&[
                        ("input-codec", "dag-json"),
                        ("store-codec", "dag-cbor"),
                        ("pin", "true"),
                    ])
                    .multipart(Self::file_form(data));
                let body = self.send(request, "dag/put".into(), None).await?;
                let parsed: DagPutResponse = serde_json::from_slice(&body)
                    .map_err(|e| BlobError::Encoding(format!("unexpected dag/put response: {e}")))?;
                Pointer::parse(&parsed.cid.link)?
            }
            Encoding::Raw => {
                let request = self
                    .client
                    .post(self.rpc_url("block/put"))
                    .query(&[("cid-codec", "raw"), ("mhtype", "sha2-256"), ("pin", "true")])
                    .multipart(Self::file_form(data));
                let body = self.send(request, "block/put".into(), None).await?;
                let parsed: BlockPutResponse = serde_json::from_slice(&body).map_err(|e| {
                    BlobError::Encoding(format!("unexpected block/put response: {e}"))
                })?;
                Pointer::parse(&parsed.key)?
            }
        };
        debug!(pointer = %pointer, bytes = data.len(), "blob stored on kubo");
        Ok(pointer)
    }

    async fn get(&self, pointer: &Pointer, path: Option<&str>) -> BlobResult<Vec<u8>> {
        let segments = path.map(path::segments).unwrap_or_default();
        let path = path.filter(|_| !segments.is_empty());

        if pointer.codec() == Codec::Raw {
            if path.is_some() {
                return Err(BlobError::NotNavigable(pointer.clone()));
            }
            let request = self
                .client
                .post(self.rpc_url("block/get"))
                .query(&[("arg", pointer.as_str())]);
            return self
                .send(request, format!("block/get {pointer}"), Some((pointer, None)))
                .await;
        }

        let arg = dag_arg(pointer, &segments);
        let request = self
            .client
            .post(self.rpc_url("dag/get"))
            .query(&[("arg", arg.as_str()), ("output-codec", "dag-json")]);
        self.send(request, format!("dag/get {arg}"), Some((pointer, path)))
            .await
    }
}

impl fmt::Debug for KuboBlobStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KuboBlobStore")
            .field("endpoint", &self.endpoint)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}
