use super::{link, Cast, CommonProps, Entity, Product, Properties, PropertyStore};

const CASTS: &[(&str, Cast)] = &[
    ("active", Cast::BooleanString),
    ("markedForTransfer", Cast::BooleanString),
    ("inUse", Cast::BooleanString),
];

#[derive(Debug, Clone, PartialEq)]
pub struct Licensee {
    store: PropertyStore,
    exists: bool,
    licenses: Vec<String>,
}

impl Default for Licensee {
    fn default() -> Self {
        Self {
            store: PropertyStore::new(CASTS),
            exists: false,
            licenses: Vec::new(),
        }
    }
}

impl Licensee {
    pub fn new(number: impl Into<String>) -> Self {
        let mut licensee = Self::default();
        licensee.set_number(number);
        licensee
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

    pub fn is_marked_for_transfer(&self) -> bool {
        self.bool_prop("markedForTransfer")
    }

    pub fn set_marked_for_transfer(&mut self, marked: bool) {
        self.put("markedForTransfer", marked);
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

    pub fn set_product(&mut self, product: &mut Product) {
        if let Some(number) = product.number() {
            self.set_product_number(number);
        }
        product.link_licensee(self.number());
    }

    pub fn license_numbers(&self) -> &[String] {
        &self.licenses
    }

    pub(crate) fn link_license(&mut self, number: Option<String>) {
        link(&mut self.licenses, number);
    }
}

impl Properties for Licensee {
    fn store(&self) -> &PropertyStore {
        &self.store
    }

    fn store_mut(&mut self) -> &mut PropertyStore {
        &mut self.store
    }
}

impl Entity for Licensee {
    const TYPE_NAME: &'static str = "Licensee";
    const ENDPOINT: &'static str = "licensee";

    fn exists(&self) -> bool {
        self.exists
    }

    fn set_exists(&mut self, exists: bool) {
        self.exists = exists;
    }
}
