use crate::core::error::StoreError;
use crate::models::record::RawRecord;
use crate::stores::document_store::{DocumentStore, Precondition, SnapshotStream};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::debug;

/// Client for a remote document store over HTTP.
///
/// * `GET  {endpoint}/collections/{name}/listen` streams newline-delimited
///   JSON frames, each one a full snapshot of the collection
/// * `DELETE {endpoint}/collections/{name}/documents/{id}`
/// * `PATCH  {endpoint}/collections/{name}/documents/{id}`
///
/// Only connection establishment has a timeout. A write the store never
/// answers stays pending.
pub struct HttpDocumentStore {
    client: reqwest::Client,
    endpoint: Url,
    api_key: String,
}

/// One line of the listen stream
#[derive(Debug, Deserialize)]
struct ListenFrame {
    documents: Vec<RawRecord>,
}

#[derive(Debug, Serialize)]
struct UpdateRequest<'a> {
    fields: &'a Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    precondition: Option<&'a Precondition>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum WriteKind {
    Delete,
    Update,
}

impl HttpDocumentStore {
    pub fn new(endpoint: &str, api_key: String, connect_timeout: Duration) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .context(format!("Invalid document store endpoint: {}", endpoint))?;

        if endpoint.cannot_be_a_base() {
            bail!("Document store endpoint must be a base URL: {}", endpoint);
        }

        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }

    fn url(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::Decode("endpoint cannot be a base URL".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn listen_url(&self, collection: &str) -> Result<Url, StoreError> {
        self.url(&["collections", collection, "listen"])
    }

    fn document_url(&self, collection: &str, id: &str) -> Result<Url, StoreError> {
        self.url(&["collections", collection, "documents", id])
    }
}

#[async_trait]
impl DocumentStore for HttpDocumentStore {
    async fn subscribe(&self, collection: &str) -> Result<SnapshotStream, StoreError> {
        let response = self
            .client
            .get(self.listen_url(collection)?)
            .query(&[("api_key", &self.api_key)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::PermissionDenied(body),
                _ => StoreError::Status {
                    status: status.as_u16(),
                    body,
                },
            });
        }

        debug!(collection = %collection, "Listen stream established");

        Ok(ndjson_snapshots(response.bytes_stream()))
    }

    async fn delete_record(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let response = self
            .client
            .delete(self.document_url(collection, id)?)
            .query(&[("api_key", &self.api_key)])
            .send()
            .await?;

        write_outcome(response, collection, id, WriteKind::Delete).await
    }

    async fn update_fields(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
        precondition: Option<Precondition>,
    ) -> Result<(), StoreError> {
        let body = UpdateRequest {
            fields: &fields,
            precondition: precondition.as_ref(),
        };

        let response = self
            .client
            .patch(self.document_url(collection, id)?)
            .query(&[("api_key", &self.api_key)])
            .json(&body)
            .send()
            .await?;

        write_outcome(response, collection, id, WriteKind::Update).await
    }
}

async fn write_outcome(
    response: reqwest::Response,
    collection: &str,
    id: &str,
    kind: WriteKind,
) -> Result<(), StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    // Deleting something already gone is not an error
    if status == StatusCode::NOT_FOUND && kind == WriteKind::Delete {
        debug!(collection = %collection, id = %id, "Delete target already absent");
        return Ok(());
    }

    let body = response.text().await.unwrap_or_default();

    Err(match status {
        StatusCode::NOT_FOUND => StoreError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::PermissionDenied(body),
        StatusCode::PRECONDITION_FAILED => StoreError::PreconditionFailed {
            collection: collection.to_string(),
            id: id.to_string(),
            reason: body,
        },
        _ => StoreError::Status {
            status: status.as_u16(),
            body,
        },
    })
}

/// Split a byte stream into newline-delimited snapshot frames.
///
/// The stream ends after the first transport or decode error.
fn ndjson_snapshots<S, B>(bytes: S) -> SnapshotStream
where
    S: Stream<Item = Result<B, reqwest::Error>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
{
    let state = Some((bytes.boxed(), Vec::<u8>::new()));

    futures::stream::unfold(state, |state| async move {
        let (mut bytes, mut buffer) = state?;

        loop {
            if let Some(line) = take_line(&mut buffer) {
                if is_blank(&line) {
                    continue;
                }
                let frame = parse_frame(&line);
                let next = frame.is_ok().then_some((bytes, buffer));
                return Some((frame, next));
            }

            match bytes.next().await {
                Some(Ok(chunk)) => buffer.extend_from_slice(chunk.as_ref()),
                Some(Err(e)) => return Some((Err(StoreError::Network(e)), None)),
                None => {
                    if is_blank(&buffer) {
                        return None;
                    }
                    return Some((parse_frame(&buffer), None));
                }
            }
        }
    })
    .boxed()
}

fn take_line(buffer: &mut Vec<u8>) -> Option<Vec<u8>> {
    let end = buffer.iter().position(|b| *b == b'\n')?;
    let mut line: Vec<u8> = buffer.drain(..=end).collect();
    line.pop();
    Some(line)
}

fn is_blank(bytes: &[u8]) -> bool {
    bytes.iter().all(u8::is_ascii_whitespace)
}

fn parse_frame(line: &[u8]) -> Result<Vec<RawRecord>, StoreError> {
    serde_json::from_slice::<ListenFrame>(line)
        .map(|frame| frame.documents)
        .map_err(|e| StoreError::Decode(e.to_string()))
}
