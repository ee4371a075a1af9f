use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteQueryError {
    #[error("SPARQL endpoint {url} unreachable: {message}")]
    Transport { url: String, message: String },
    #[error("SPARQL endpoint {url} answered HTTP {code}: {body}")]
    Status { url: String, code: u16, body: String },
    #[error("Failed to read response from {url}: {source}")]
    Read {
        url: String,
        source: std::io::Error,
    },
    #[error("Malformed SPARQL response: {reason}")]
    MalformedResponse { reason: String },
    #[error("No ?{variable} binding returned for {subject}")]
    MissingBinding { variable: String, subject: String },
    #[error("Invalid SPARQL term {term:?}: {reason}")]
    InvalidTerm { term: String, reason: &'static str },
}
