//! Client library for the NetLicensing licensing management service.
//!
//! Entities are property bags with typed accessors, converted from the
//! service's item-tree responses. Licensee validation runs either online
//! through [`NetLicensingClient::validate`] or offline against a previously
//! fetched, signed payload with [`validate_offline`].

pub mod client;
pub mod convert;
pub mod entity;
pub mod err;
pub mod service;
pub mod validation;
pub mod wire;

pub use client::NetLicensingClient;
pub use convert::FromItem;
pub use entity::{Entity, Properties};
pub use err::Error;
pub use service::Page;
pub use validation::{validate_offline, ValidationParameters, ValidationResults};

use std::time::Duration;

pub type Result<T> = std::result::Result<T, Error>;

pub const DEFAULT_BASE_URL: &str = "https://go.netlicensing.io/core/v2/rest";

/// How requests authenticate against the service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SecurityMode {
    BasicAuth { username: String, password: String },
    /// Sent as basic auth with the user `apiKey`.
    ApiKey(String),
    /// No credentials; validation is scoped by the vendor number instead.
    Anonymous,
}

/// Connection and trust settings shared by every call.
#[derive(Clone, Debug)]
pub struct Context {
    pub base_url: String,
    pub security_mode: SecurityMode,
    pub vendor_number: Option<String>,
    /// PEM encoded RSA key used to verify offline validation payloads. Without
    /// one, offline payloads are accepted unverified.
    pub public_key: Option<String>,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            security_mode: SecurityMode::Anonymous,
            vendor_number: None,
            public_key: None,
            timeout: Duration::from_secs(90),
            user_agent: format!("netlicensing-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.security_mode = SecurityMode::BasicAuth {
            username: username.into(),
            password: password.into(),
        };
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.security_mode = SecurityMode::ApiKey(api_key.into());
        self
    }

    pub fn anonymous(mut self) -> Self {
        self.security_mode = SecurityMode::Anonymous;
        self
    }

    pub fn vendor_number(mut self, vendor_number: impl Into<String>) -> Self {
        self.vendor_number = Some(vendor_number.into());
        self
    }

    pub fn public_key(mut self, public_key: impl Into<String>) -> Self {
        self.public_key = Some(public_key.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
