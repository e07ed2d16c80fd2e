use super::{Cast, CommonProps, Entity, Properties, PropertyStore};

const CASTS: &[(&str, Cast)] = &[("vatPercent", Cast::Float), ("isEu", Cast::BooleanString)];

/// Read-only reference data, keyed by ISO country code.
#[derive(Debug, Clone, PartialEq)]
pub struct Country {
    store: PropertyStore,
    exists: bool,
}

impl Default for Country {
    fn default() -> Self {
        Self {
            store: PropertyStore::new(CASTS),
            exists: false,
        }
    }
}

impl Country {
    pub fn code(&self) -> Option<String> {
        self.string_prop("code")
    }

    pub fn name(&self) -> Option<String> {
        self.string_prop("name")
    }

    pub fn vat_percent(&self) -> Option<f64> {
        self.f64_prop("vatPercent")
    }

    pub fn is_eu(&self) -> bool {
        self.bool_prop("isEu")
    }
}

impl Properties for Country {
    fn store(&self) -> &PropertyStore {
        &self.store
    }

    fn store_mut(&mut self) -> &mut PropertyStore {
        &mut self.store
    }
}

impl Entity for Country {
    const TYPE_NAME: &'static str = "Country";
    const ENDPOINT: &'static str = "utility/countries";
    const KEY_NAME: &'static str = "code";

    fn exists(&self) -> bool {
        self.exists
    }

    fn set_exists(&mut self, exists: bool) {
        self.exists = exists;
    }
}
