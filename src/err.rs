use crate::wire::Netlicensing;
use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Malformed arguments: {0}")]
    MalformedArguments(String),
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),
    #[error("Invalid entity: {0}")]
    InvalidEntity(String),
    #[error("NetLicensing API error: {status}: {detail}")]
    RestFailure { status: u16, detail: String },
    #[error("Bad signature: {0}")]
    BadSignature(String),
    #[error("Failed processing a request: {0}")]
    #[allow(clippy::enum_variant_names)]
    RequestError(#[from] reqwest::Error),
    #[error("Bad response: {0}")]
    BadResponse(String),
    #[error("Parse Error: {0}")]
    ParseErr(String),
}

impl Error {
    /// HTTP status of a `RestFailure`, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::RestFailure { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Builds a `RestFailure` out of the infos section of an error response body.
pub fn parse_err_response(status_code: StatusCode, body: &str, content_type: &str) -> Error {
    let reason = status_code
        .canonical_reason()
        .unwrap_or("Unknown NetLicensing API Error")
        .to_string();

    let detail = match Netlicensing::parse(body, content_type) {
        Ok(Some(doc)) => {
            let errors: Vec<String> = doc
                .infos
                .iter()
                .filter(|info| info.kind.as_deref() == Some("ERROR"))
                .filter_map(|info| info.value.clone())
                .collect();

            if !errors.is_empty() {
                errors.join("; ")
            } else {
                // no typed errors, take whatever the service said
                let texts: Vec<String> = doc.infos.iter().filter_map(|i| i.value.clone()).collect();
                if texts.is_empty() {
                    reason
                } else {
                    texts.join("; ")
                }
            }
        }
        _ => reason,
    };

    Error::RestFailure {
        status: status_code.as_u16(),
        detail,
    }
}
