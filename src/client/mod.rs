pub mod sig;

use crate::{
    err::{parse_err_response, Error},
    wire::Netlicensing,
    Context, Result, SecurityMode,
};
use reqwest::{
    header::{ACCEPT, CONTENT_TYPE},
    Method, RequestBuilder, StatusCode, Url,
};

/// HTTP transport to the service. Cheap to clone; clones share the
/// connection pool.
#[derive(Debug, Clone)]
pub struct NetLicensingClient {
    context: Context,
    http_client: reqwest::Client,
}

/// A response before its status is interpreted.
#[derive(Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    pub content_type: String,
    pub body: String,
}

impl NetLicensingClient {
    pub fn new(context: Context) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(context.user_agent.clone())
            .timeout(context.timeout)
            .build()?;

        Ok(Self {
            context,
            http_client,
        })
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Appends `segments` to the base url. Each segment is percent-encoded
    /// whole, so a `/` inside one stays part of it. Empty segments are skipped.
    pub fn build_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.context.base_url)
            .map_err(|_| Error::ParseErr("Failed parsing base url".into()))?;

        url.path_segments_mut()
            .map_err(|_| Error::ParseErr("Base url cannot carry a path".into()))?
            .pop_if_empty()
            .extend(segments.iter().filter(|segment| !segment.is_empty()));

        Ok(url)
    }

    pub async fn get(&self, path: &[&str], params: &[(String, String)]) -> Result<Option<Netlicensing>> {
        self.request(Method::GET, path, params).await
    }

    pub async fn post(&self, path: &[&str], params: &[(String, String)]) -> Result<Option<Netlicensing>> {
        self.request(Method::POST, path, params).await
    }

    pub async fn delete(&self, path: &[&str], params: &[(String, String)]) -> Result<Option<Netlicensing>> {
        self.request(Method::DELETE, path, params).await
    }

    /// Sends a request and decodes the response document. `200` yields the
    /// document, `204` yields `None`, any other status is a `RestFailure`.
    pub async fn request(
        &self,
        method: Method,
        path: &[&str],
        params: &[(String, String)],
    ) -> Result<Option<Netlicensing>> {
        let response = self.request_raw(method, path, params).await?;

        match response.status {
            StatusCode::OK => Netlicensing::parse(&response.body, &response.content_type),
            StatusCode::NO_CONTENT => Ok(None),
            status => Err(parse_err_response(
                status,
                &response.body,
                &response.content_type,
            )),
        }
    }

    /// Sends a request without interpreting the status. POST parameters go
    /// into a form body, all others into the query string.
    pub async fn request_raw(
        &self,
        method: Method,
        path: &[&str],
        params: &[(String, String)],
    ) -> Result<RawResponse> {
        let url = self.build_url(path)?;
        let path = url.path().to_string();

        let mut request = self
            .http_client
            .request(method.clone(), url)
            .header(ACCEPT, "application/xml");

        if !params.is_empty() {
            request = if method == Method::POST {
                request.form(params)
            } else {
                request.query(params)
            };
        }

        tracing::debug!(%method, %path, params = params.len(), "sending request");

        let response = self.authorize(request).send().await?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response
            .text()
            .await
            .map_err(|_| Error::ParseErr("Failed parsing response text".into()))?;

        tracing::debug!(%method, %path, status = status.as_u16(), "received response");

        Ok(RawResponse {
            status,
            content_type,
            body,
        })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.context.security_mode {
            SecurityMode::BasicAuth { username, password } => {
                request.basic_auth(username, Some(password))
            }
            SecurityMode::ApiKey(api_key) => request.basic_auth("apiKey", Some(api_key)),
            SecurityMode::Anonymous => request,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> NetLicensingClient {
        NetLicensingClient::new(Context::new().base_url(base_url)).unwrap()
    }

    #[test]
    fn build_url_appends_path() {
        let url = client("https://go.netlicensing.io/core/v2/rest")
            .build_url(&["licensee", "L-1", "validate"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://go.netlicensing.io/core/v2/rest/licensee/L-1/validate"
        );
    }

    #[test]
    fn build_url_encodes_segments_and_trailing_slash() {
        let url = client("http://localhost:8080/rest/")
            .build_url(&["product", "a b"])
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/rest/product/a%20b");
    }

    #[test]
    fn build_url_keeps_slashes_inside_a_segment() {
        let url = client("https://go.netlicensing.io/core/v2/rest")
            .build_url(&["licensee", "a/b", "", "validate"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://go.netlicensing.io/core/v2/rest/licensee/a%2Fb/validate"
        );
    }

    #[test]
    fn build_url_rejects_garbage_base() {
        let err = client("not a url").build_url(&["product"]).unwrap_err();
        assert!(matches!(err, Error::ParseErr(_)));
    }
}
