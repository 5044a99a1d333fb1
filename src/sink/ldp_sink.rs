//! LDP/Solid sink adapter.
//!
//! Talks to an LDES in LDP collection over plain HTTP: the probe is a GET of
//! the collection, the write is one POST per resource group with the group's
//! facts serialized as Turtle-compatible N-Triples.

use crate::core::ResourceGroup;
use crate::sink::{SinkAdapter, SinkError, StreamMetadata};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, LINK};
use reqwest::{Client, StatusCode};
use tracing::{debug, info};

pub struct LdpSink {
    client: Client,
}

impl LdpSink {
    pub fn new() -> Self {
        Self { client: Client::new() }
    }
}

impl Default for LdpSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SinkAdapter for LdpSink {
    async fn probe_existing_stream(
        &self,
        destination: &str,
    ) -> Result<Option<StreamMetadata>, SinkError> {
        let response =
            self.client.get(destination).header(ACCEPT, "text/turtle").send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(SinkError::Probe(format!(
                "unexpected status {} from {}",
                response.status(),
                destination
            )));
        }
        // The event stream URI follows the LDES in LDP agreement: the
        // collection URL with the #EventStream fragment.
        let event_stream_uri = format!("{}#EventStream", destination.trim_end_matches('/'));
        Ok(Some(StreamMetadata { event_stream_uri }))
    }

    async fn write_batch(
        &self,
        destination: &str,
        groups: &[ResourceGroup],
        ordering_attribute: &str,
        bucket_size: usize,
    ) -> Result<(), SinkError> {
        debug!(
            groups = groups.len(),
            ordering_attribute, bucket_size, "writing resource groups to destination"
        );
        for (index, group) in groups.iter().enumerate() {
            let body = group.to_document();
            let response = self
                .client
                .post(destination)
                .header(CONTENT_TYPE, "text/turtle")
                .header(LINK, "<http://www.w3.org/ns/ldp#Resource>; rel=\"type\"")
                .body(body)
                .send()
                .await?;
            if !response.status().is_success() {
                let status = response.status().as_u16();
                let body = response.text().await.unwrap_or_default();
                return Err(SinkError::Write { status, body });
            }
            info!(
                group = index,
                members = group.len(),
                destination,
                "resource group appended"
            );
        }
        Ok(())
    }
}
