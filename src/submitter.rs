use std::time::Duration;

use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use tokio::time::Instant;

use crate::configuration::Endpoint;
use crate::error::Error;
use crate::point::Point;

const NO_CONTENT: u16 = 204;

/// Something that can carry a put request to the ingestion API.
///
/// Sending resolves as soon as the status line is known; the body is only
/// pulled when the caller asks for it.
#[async_trait]
pub trait Transport: Send + Sync {
    type Response: Response;

    async fn post(&self, url: &str, payload: Bytes, timeout: Duration)
        -> Result<Self::Response, Error>;
}

#[async_trait]
pub trait Response: Send {
    fn status(&self) -> u16;
    async fn text(self) -> Result<String, Error>;
}

/// Plain HTTP over a single reused client.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, Error> {
        // The ingestion API is always dialed directly, proxy variables in the
        // environment are ignored
        let client = reqwest::Client::builder()
            .no_proxy()
            .build()
            .map_err(|err| Error::Transport(err.into()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    type Response = reqwest::Response;

    async fn post(
        &self,
        url: &str,
        payload: Bytes,
        timeout: Duration,
    ) -> Result<reqwest::Response, Error> {
        self.client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .timeout(timeout)
            .body(payload)
            .send()
            .await
            .map_err(|err| Error::Transport(err.into()))
    }
}

#[async_trait]
impl Response for reqwest::Response {
    fn status(&self) -> u16 {
        reqwest::Response::status(self).as_u16()
    }

    async fn text(self) -> Result<String, Error> {
        reqwest::Response::text(self)
            .await
            .map_err(|err| Error::Transport(err.into()))
    }
}

/// The outcome of one put request which got an answer.
#[derive(Debug, PartialEq, Eq)]
pub struct Submission {
    pub status: u16,
    pub elapsed: Duration,
    // Only read when the status is not 204
    pub body: Option<String>,
}

impl Submission {
    pub fn is_success(&self) -> bool {
        self.status == NO_CONTENT
    }
}

pub struct Submitter<T> {
    transport: T,
    url: String,
    timeout: Duration,
    debug: bool,
}

impl<T: Transport> Submitter<T> {
    pub fn new(transport: T, endpoint: &Endpoint, timeout: Duration, debug: bool) -> Self {
        Self {
            transport,
            url: endpoint.put_url(),
            timeout,
            debug,
        }
    }

    /// Sends one batch and prints how it went. Exactly one request is made.
    pub async fn submit(&self, batch: &[Point]) -> Result<Submission, Error> {
        let payload = Bytes::from(serde_json::to_vec(batch)?);

        if self.debug {
            println!("{}", String::from_utf8_lossy(&payload));
        }

        tracing::debug!(points = batch.len(), bytes = payload.len(), url = %self.url, "sending batch");

        let start = Instant::now();
        let result = self.transport.post(&self.url, payload, self.timeout).await;
        let elapsed = start.elapsed();

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(error = %err, elapsed = ?elapsed, "put request failed");
                return Err(err);
            }
        };

        let status = response.status();
        println!("request returned code: {} and took: {:?}", status, elapsed);

        if status == NO_CONTENT {
            return Ok(Submission {
                status,
                elapsed,
                body: None,
            });
        }

        let body = match response.text().await {
            Ok(body) => {
                println!("{}", body);
                Some(body)
            }
            Err(err) => {
                tracing::warn!(error = %err, status, "failed to read response body");
                None
            }
        };

        Ok(Submission {
            status,
            elapsed,
            body,
        })
    }
}
