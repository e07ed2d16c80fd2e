use super::{link, Cast, CommonProps, Entity, Product, Properties, PropertyStore};

const CASTS: &[(&str, Cast)] = &[
    ("active", Cast::BooleanString),
    ("inUse", Cast::BooleanString),
    ("maxCheckoutValidity", Cast::Int),
    ("yellowThreshold", Cast::Int),
    ("redThreshold", Cast::Int),
];

#[derive(Debug, Clone, PartialEq)]
pub struct ProductModule {
    store: PropertyStore,
    exists: bool,
    license_templates: Vec<String>,
}

impl Default for ProductModule {
    fn default() -> Self {
        Self {
            store: PropertyStore::new(CASTS),
            exists: false,
            license_templates: Vec::new(),
        }
    }
}

impl ProductModule {
    pub fn new(
        number: impl Into<String>,
        name: impl Into<String>,
        licensing_model: impl Into<String>,
    ) -> Self {
        let mut module = Self::default();
        module.set_number(number);
        module.set_name(name);
        module.set_licensing_model(licensing_model);
        module
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

    /// e.g. `Subscription`, `TryAndBuy`, `Rental`, `Floating`, `Quota`.
    pub fn licensing_model(&self) -> Option<String> {
        self.string_prop("licensingModel")
    }

    pub fn set_licensing_model(&mut self, model: impl Into<String>) {
        self.put_string("licensingModel", model);
    }

    pub fn max_checkout_validity(&self) -> Option<i64> {
        self.i64_prop("maxCheckoutValidity")
    }

    pub fn set_max_checkout_validity(&mut self, days: i64) {
        self.put("maxCheckoutValidity", days);
    }

    pub fn yellow_threshold(&self) -> Option<i64> {
        self.i64_prop("yellowThreshold")
    }

    pub fn set_yellow_threshold(&mut self, threshold: i64) {
        self.put("yellowThreshold", threshold);
    }

    pub fn red_threshold(&self) -> Option<i64> {
        self.i64_prop("redThreshold")
    }

    pub fn set_red_threshold(&mut self, threshold: i64) {
        self.put("redThreshold", threshold);
    }

    pub fn in_use(&self) -> bool {
        self.bool_prop("inUse")
    }

    pub fn product_number(&self) -> Option<String> {
        self.string_prop("productNumber")
    }

    pub fn set_product_number(&mut self, number: impl Into<String>) {
        self.put_string("productNumber", number);
    }

    /// Records `product` as the owner and registers this module with it.
    pub fn set_product(&mut self, product: &mut Product) {
        if let Some(number) = product.number() {
            self.set_product_number(number);
        }
        product.link_product_module(self.number());
    }

    pub fn license_template_numbers(&self) -> &[String] {
        &self.license_templates
    }

    pub(crate) fn link_license_template(&mut self, number: Option<String>) {
        link(&mut self.license_templates, number);
    }
}

impl Properties for ProductModule {
    fn store(&self) -> &PropertyStore {
        &self.store
    }

    fn store_mut(&mut self) -> &mut PropertyStore {
        &mut self.store
    }
}

impl Entity for ProductModule {
    const TYPE_NAME: &'static str = "ProductModule";
    const ENDPOINT: &'static str = "productmodule";

    fn exists(&self) -> bool {
        self.exists
    }

    fn set_exists(&mut self, exists: bool) {
        self.exists = exists;
    }
}
