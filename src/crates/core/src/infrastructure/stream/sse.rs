//! Server-Sent Events connection over reqwest
//!
//! Each SSE `data:` payload is handed to the caller verbatim; the sentinel
//! check and structured decoding happen in `research::frame`.

use super::{StreamConnection, StreamConnector};
use crate::infrastructure::config::ClientConfig;
use crate::util::errors::TransportError;
use async_trait::async_trait;
use eventsource_stream::{Event, EventStreamError, Eventsource};
use futures::{Stream, StreamExt};
use log::{debug, error, trace};
use std::pin::Pin;
use std::time::Duration;
use tokio::time::timeout;

type SseEventStream =
    Pin<Box<dyn Stream<Item = Result<Event, EventStreamError<reqwest::Error>>> + Send>>;

/// Opens `GET <endpoint>?topic=<url-encoded topic>` as an event stream.
#[derive(Clone)]
pub struct SseConnector {
    client: reqwest::Client,
    endpoint: String,
    idle_timeout: Duration,
}

impl SseConnector {
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| TransportError::Connect(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            idle_timeout: config.idle_timeout(),
        })
    }

    pub fn stream_url(&self, topic: &str) -> String {
        build_stream_url(&self.endpoint, topic)
    }
}

pub fn build_stream_url(endpoint: &str, topic: &str) -> String {
    let separator = if endpoint.contains('?') { '&' } else { '?' };
    format!(
        "{}{}topic={}",
        endpoint,
        separator,
        urlencoding::encode(topic)
    )
}

#[async_trait]
impl StreamConnector for SseConnector {
    async fn connect(&self, topic: &str) -> Result<Box<dyn StreamConnection>, TransportError> {
        let url = self.stream_url(topic);
        debug!("Opening SSE stream: url={}", url);

        // Response headers count against the idle timeout too; connect_timeout
        // only covers opening the socket.
        let request = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send();
        let response = match timeout(self.idle_timeout, request).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                error!("SSE connect failed: url={}, error={}", url, e);
                return Err(TransportError::Connect(e.to_string()));
            }
            Err(_) => {
                error!(
                    "SSE endpoint sent no response headers: url={}, timeout_secs={}",
                    url,
                    self.idle_timeout.as_secs()
                );
                return Err(TransportError::IdleTimeout {
                    secs: self.idle_timeout.as_secs(),
                });
            }
        };

        let status = response.status();
        if !status.is_success() {
            error!("SSE endpoint rejected request: url={}, status={}", url, status);
            return Err(TransportError::Status {
                code: status.as_u16(),
            });
        }

        let stream: SseEventStream = Box::pin(response.bytes_stream().eventsource());
        Ok(Box::new(SseConnection {
            stream: Some(stream),
            idle_timeout: self.idle_timeout,
        }))
    }
}

pub struct SseConnection {
    stream: Option<SseEventStream>,
    idle_timeout: Duration,
}

#[async_trait]
impl StreamConnection for SseConnection {
    async fn next_message(&mut self) -> Option<Result<String, TransportError>> {
        let stream = self.stream.as_mut()?;

        match timeout(self.idle_timeout, stream.next()).await {
            Ok(Some(Ok(event))) => {
                trace!("SSE event: {:?}", event.data);
                Some(Ok(event.data))
            }
            Ok(Some(Err(e))) => Some(Err(TransportError::Stream(e.to_string()))),
            Ok(None) => {
                self.stream = None;
                None
            }
            Err(_) => Some(Err(TransportError::IdleTimeout {
                secs: self.idle_timeout.as_secs(),
            })),
        }
    }

    fn close(&mut self) {
        if self.stream.take().is_some() {
            debug!("SSE stream closed by client");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::build_stream_url;

    #[test]
    fn topic_is_url_encoded() {
        assert_eq!(
            build_stream_url("http://localhost:8000/research", "rust & wasm?"),
            "http://localhost:8000/research?topic=rust%20%26%20wasm%3F"
        );
    }

    #[test]
    fn existing_query_is_extended() {
        assert_eq!(
            build_stream_url("http://h/research?lang=en", "x"),
            "http://h/research?lang=en&topic=x"
        );
    }
}
