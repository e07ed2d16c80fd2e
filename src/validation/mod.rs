//! Licensee validation, online against the service or offline against a
//! signed payload fetched earlier.

pub mod params;
pub mod results;

pub use params::ValidationParameters;
pub use results::{ProductModuleValidation, ValidationResults};

use crate::{
    client::{sig, NetLicensingClient},
    err::{parse_err_response, Error},
    service::require,
    wire::{xml, Netlicensing},
    Context, Result, SecurityMode,
};
use reqwest::{Method, StatusCode};

fn validate_path(licensee_number: &str) -> [&str; 3] {
    ["licensee", licensee_number, "validate"]
}

impl NetLicensingClient {
    /// Validates a licensee against the service.
    pub async fn validate(
        &self,
        licensee_number: &str,
        parameters: &ValidationParameters,
    ) -> Result<ValidationResults> {
        require(licensee_number, "licensee number")?;

        let params = self.validation_params(parameters);
        match self.post(&validate_path(licensee_number), &params).await? {
            Some(doc) => ValidationResults::from_response(&doc),
            None => Ok(ValidationResults::default()),
        }
    }

    /// Fetches the signed validation payload for later use with
    /// [`validate_offline`]. `None` if the service answered without content.
    pub async fn validation_file(
        &self,
        licensee_number: &str,
        parameters: &ValidationParameters,
    ) -> Result<Option<String>> {
        require(licensee_number, "licensee number")?;

        let params = self.validation_params(&parameters.clone().for_offline_use(true));
        let response = self
            .request_raw(Method::POST, &validate_path(licensee_number), &params)
            .await?;

        match response.status {
            StatusCode::OK if !response.body.trim().is_empty() => Ok(Some(response.body)),
            StatusCode::OK | StatusCode::NO_CONTENT => Ok(None),
            status => Err(parse_err_response(
                status,
                &response.body,
                &response.content_type,
            )),
        }
    }

    fn validation_params(&self, parameters: &ValidationParameters) -> Vec<(String, String)> {
        let mut params = parameters.to_query_params();

        let context = self.context();
        if context.security_mode == SecurityMode::Anonymous {
            if let Some(vendor_number) = &context.vendor_number {
                params.insert(0, ("vendorNumber".to_string(), vendor_number.clone()));
            }
        }

        params
    }
}

/// Validates a previously fetched payload without contacting the service.
///
/// The payload's signature is checked against the context's public key. With
/// no key configured the payload is trusted as is.
pub fn validate_offline(context: &Context, validation_file: &str) -> Result<ValidationResults> {
    let doc = match context.public_key.as_deref() {
        Some(public_key) => {
            let key = sig::parse_public_key(public_key)?;
            let root = xml::parse(validation_file)
                .map_err(|e| Error::BadSignature(format!("Malformed payload: {e}")))?;
            sig::verify(&root, &key)?;
            Netlicensing::from_element(&root)
                .map_err(|e| Error::BadSignature(format!("Malformed payload: {e}")))?
        }
        None => {
            tracing::warn!("no public key configured, offline payload used without verification");
            Netlicensing::from_xml(validation_file)?
        }
    };

    ValidationResults::from_response(&doc)
}
