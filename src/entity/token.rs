use super::{Cast, CommonProps, Entity, Properties, PropertyStore};
use chrono::{DateTime, FixedOffset};

const CASTS: &[(&str, Cast)] = &[
    ("active", Cast::BooleanString),
    ("expirationTime", Cast::DateTime),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    Default,
    Shop,
    ApiKey,
    Action,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "DEFAULT",
            Self::Shop => "SHOP",
            Self::ApiKey => "APIKEY",
            Self::Action => "ACTION",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "DEFAULT" => Some(Self::Default),
            "SHOP" => Some(Self::Shop),
            "APIKEY" => Some(Self::ApiKey),
            "ACTION" => Some(Self::Action),
            _ => None,
        }
    }
}

/// Shop and API-key tokens. A `SHOP` token carries the checkout URL in `shopURL`.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    store: PropertyStore,
    exists: bool,
}

impl Default for Token {
    fn default() -> Self {
        Self {
            store: PropertyStore::new(CASTS),
            exists: false,
        }
    }
}

impl Token {
    pub fn new(token_type: TokenType) -> Self {
        let mut token = Self::default();
        token.set_token_type(token_type);
        token
    }

    pub fn number(&self) -> Option<String> {
        self.string_prop("number")
    }

    pub fn is_active(&self) -> bool {
        self.bool_prop("active")
    }

    pub fn expiration_time(&self) -> Option<DateTime<FixedOffset>> {
        self.datetime_prop("expirationTime")
    }

    pub fn vendor_number(&self) -> Option<String> {
        self.string_prop("vendorNumber")
    }

    pub fn token_type(&self) -> Option<TokenType> {
        self.string_prop("tokenType").and_then(|t| TokenType::parse(&t))
    }

    pub fn set_token_type(&mut self, token_type: TokenType) {
        self.put("tokenType", token_type.as_str());
    }

    pub fn licensee_number(&self) -> Option<String> {
        self.string_prop("licenseeNumber")
    }

    pub fn set_licensee_number(&mut self, number: impl Into<String>) {
        self.put_string("licenseeNumber", number);
    }

    pub fn shop_url(&self) -> Option<String> {
        self.string_prop("shopURL")
    }

    pub fn set_success_url(&mut self, url: impl Into<String>, title: Option<String>) {
        self.put_string("successURL", url);
        if let Some(title) = title {
            self.put("successURLTitle", title);
        }
    }

    pub fn set_cancel_url(&mut self, url: impl Into<String>, title: Option<String>) {
        self.put_string("cancelURL", url);
        if let Some(title) = title {
            self.put("cancelURLTitle", title);
        }
    }
}

impl Properties for Token {
    fn store(&self) -> &PropertyStore {
        &self.store
    }

    fn store_mut(&mut self) -> &mut PropertyStore {
        &mut self.store
    }
}

impl Entity for Token {
    const TYPE_NAME: &'static str = "Token";
    const ENDPOINT: &'static str = "token";

    fn exists(&self) -> bool {
        self.exists
    }

    fn set_exists(&mut self, exists: bool) {
        self.exists = exists;
    }
}
