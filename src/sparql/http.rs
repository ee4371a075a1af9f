use std::io::Read;
use std::time::Duration;

use super::{QueryResults, RemoteQueryError, SparqlEndpoint, SparqlQuery};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const WRITE_TIMEOUT: Duration = Duration::from_secs(30);
/// Default wait for a query answer; ontology closure queries can be slow.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(60);
const MAX_RESPONSE_BYTES: usize = 64 * 1024 * 1024;
const MAX_ERROR_BODY_CHARS: usize = 512;

/// SPARQL protocol endpoint queried over HTTP GET with CSV results.
#[derive(Debug, Clone)]
pub struct HttpEndpoint {
    url: String,
    agent: ureq::Agent,
    max_response_bytes: usize,
}

impl HttpEndpoint {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_read_timeout(url, DEFAULT_READ_TIMEOUT)
    }

    pub fn with_read_timeout(url: impl Into<String>, read_timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(CONNECT_TIMEOUT)
            .timeout_read(read_timeout)
            .timeout_write(WRITE_TIMEOUT)
            .user_agent(concat!("kge-report/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            url: url.into(),
            agent,
            max_response_bytes: MAX_RESPONSE_BYTES,
        }
    }

    /// Cap the accepted response size.
    pub fn with_max_response_bytes(mut self, max_bytes: usize) -> Self {
        self.max_response_bytes = max_bytes;
        self
    }

    fn read_body(&self, response: ureq::Response) -> Result<Vec<u8>, RemoteQueryError> {
        let limit = self.max_response_bytes;
        let too_large = |detail: String| RemoteQueryError::Read {
            url: self.url.clone(),
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("response exceeds the {limit} byte limit ({detail})"),
            ),
        };
        if let Some(declared) = response
            .header("Content-Length")
            .and_then(|value| value.parse::<u64>().ok())
            && declared > limit as u64
        {
            return Err(too_large(format!("declared {declared} bytes")));
        }
        let mut body = Vec::new();
        response
            .into_reader()
            .take(limit as u64 + 1)
            .read_to_end(&mut body)
            .map_err(|source| RemoteQueryError::Read {
                url: self.url.clone(),
                source,
            })?;
        if body.len() > limit {
            return Err(too_large("streamed".to_string()));
        }
        Ok(body)
    }
}

impl SparqlEndpoint for HttpEndpoint {
    fn select(&self, query: &SparqlQuery) -> Result<QueryResults, RemoteQueryError> {
        tracing::debug!("SPARQL {}: {}", self.url, query.as_str());
        let response = self
            .agent
            .get(&self.url)
            .query("query", query.as_str())
            .set("Accept", "text/csv")
            .call()
            .map_err(|err| match err {
                ureq::Error::Status(code, response) => RemoteQueryError::Status {
                    url: self.url.clone(),
                    code,
                    body: response
                        .into_string()
                        .unwrap_or_default()
                        .chars()
                        .take(MAX_ERROR_BODY_CHARS)
                        .collect(),
                },
                ureq::Error::Transport(transport) => RemoteQueryError::Transport {
                    url: self.url.clone(),
                    message: transport.to_string(),
                },
            })?;
        let body = self.read_body(response)?;
        QueryResults::from_csv(&body)
    }
}
