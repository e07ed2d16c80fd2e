use super::{link, Cast, CommonProps, Entity, ProductModule, Properties, PropertyStore};
use std::{fmt, str::FromStr};

const CASTS: &[(&str, Cast)] = &[
    ("active", Cast::BooleanString),
    ("price", Cast::Float),
    ("automatic", Cast::BooleanString),
    ("hidden", Cast::BooleanString),
    ("hideLicenses", Cast::BooleanString),
    ("timeVolume", Cast::Int),
    ("maxSessions", Cast::Int),
    ("quantity", Cast::Int),
    ("inUse", Cast::BooleanString),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LicenseType {
    Feature,
    TimeVolume,
    Floating,
    Quantity,
}

impl LicenseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Feature => "FEATURE",
            Self::TimeVolume => "TIMEVOLUME",
            Self::Floating => "FLOATING",
            Self::Quantity => "QUANTITY",
        }
    }
}

impl fmt::Display for LicenseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LicenseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "FEATURE" => Ok(Self::Feature),
            "TIMEVOLUME" => Ok(Self::TimeVolume),
            "FLOATING" => Ok(Self::Floating),
            "QUANTITY" => Ok(Self::Quantity),
            other => Err(format!("unknown license type '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LicenseTemplate {
    store: PropertyStore,
    exists: bool,
    licenses: Vec<String>,
}

impl Default for LicenseTemplate {
    fn default() -> Self {
        Self {
            store: PropertyStore::new(CASTS),
            exists: false,
            licenses: Vec::new(),
        }
    }
}

impl LicenseTemplate {
    pub fn new(
        number: impl Into<String>,
        name: impl Into<String>,
        license_type: LicenseType,
    ) -> Self {
        let mut template = Self::default();
        template.set_number(number);
        template.set_name(name);
        template.set_license_type(license_type);
        template
    }

    pub fn number(&self) -> Option<String> {
        self.string_prop("number")
    }

    pub fn set_number(&mut self, number: impl Into<String>) {
        self.put_string("number", number);
    }

    pub fn name(&self) -> Option<String> {
        self.string_prop("name")
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.put_string("name", name);
    }

    pub fn is_active(&self) -> bool {
        self.bool_prop("active")
    }

    pub fn set_active(&mut self, active: bool) {
        self.put("active", active);
    }

    /// `None` if the service sent a type this client does not know.
    pub fn license_type(&self) -> Option<LicenseType> {
        self.string_prop("licenseType").and_then(|t| t.parse().ok())
    }

    pub fn set_license_type(&mut self, license_type: LicenseType) {
        self.put("licenseType", license_type.as_str());
    }

    pub fn price(&self) -> Option<f64> {
        self.f64_prop("price")
    }

    pub fn set_price(&mut self, price: f64) -> crate::Result<()> {
        self.put_f64("price", price)
    }

    pub fn currency(&self) -> Option<String> {
        self.string_prop("currency")
    }

    pub fn set_currency(&mut self, currency: impl Into<String>) {
        self.put_string("currency", currency);
    }

    pub fn is_automatic(&self) -> bool {
        self.bool_prop("automatic")
    }

    pub fn set_automatic(&mut self, automatic: bool) {
        self.put("automatic", automatic);
    }

    pub fn is_hidden(&self) -> bool {
        self.bool_prop("hidden")
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.put("hidden", hidden);
    }

    pub fn hide_licenses(&self) -> bool {
        self.bool_prop("hideLicenses")
    }

    pub fn set_hide_licenses(&mut self, hide: bool) {
        self.put("hideLicenses", hide);
    }

    pub fn time_volume(&self) -> Option<i64> {
        self.i64_prop("timeVolume")
    }

    pub fn set_time_volume(&mut self, volume: i64) {
        self.put("timeVolume", volume);
    }

    pub fn max_sessions(&self) -> Option<i64> {
        self.i64_prop("maxSessions")
    }

    pub fn set_max_sessions(&mut self, sessions: i64) {
        self.put("maxSessions", sessions);
    }

    pub fn quantity(&self) -> Option<i64> {
        self.i64_prop("quantity")
    }

    pub fn set_quantity(&mut self, quantity: i64) {
        self.put("quantity", quantity);
    }

    pub fn in_use(&self) -> bool {
        self.bool_prop("inUse")
    }

    pub fn product_module_number(&self) -> Option<String> {
        self.string_prop("productModuleNumber")
    }

    pub fn set_product_module_number(&mut self, number: impl Into<String>) {
        self.put_string("productModuleNumber", number);
    }

    pub fn set_product_module(&mut self, module: &mut ProductModule) {
        if let Some(number) = module.number() {
            self.set_product_module_number(number);
        }
        module.link_license_template(self.number());
    }

    pub fn license_numbers(&self) -> &[String] {
        &self.licenses
    }

    pub(crate) fn link_license(&mut self, number: Option<String>) {
        link(&mut self.licenses, number);
    }
}

impl Properties for LicenseTemplate {
    fn store(&self) -> &PropertyStore {
        &self.store
    }

    fn store_mut(&mut self) -> &mut PropertyStore {
        &mut self.store
    }
}

impl Entity for LicenseTemplate {
    const TYPE_NAME: &'static str = "LicenseTemplate";
    const ENDPOINT: &'static str = "licensetemplate";

    fn exists(&self) -> bool {
        self.exists
    }

    fn set_exists(&mut self, exists: bool) {
        self.exists = exists;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::err::Error;

    #[test]
    fn price_must_be_finite() {
        let mut template = LicenseTemplate::default();
        template.set_price(9.99).unwrap();
        assert_eq!(template.price(), Some(9.99));

        let err = template.set_price(f64::NAN).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch(_)), "{err:?}");
        assert_eq!(template.price(), Some(9.99));
    }
}
