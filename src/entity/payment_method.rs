use super::{Cast, CommonProps, Entity, Properties, PropertyStore};

const CASTS: &[(&str, Cast)] = &[("active", Cast::BooleanString)];

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentMethod {
    store: PropertyStore,
    exists: bool,
}

impl Default for PaymentMethod {
    fn default() -> Self {
        Self {
            store: PropertyStore::new(CASTS),
            exists: false,
        }
    }
}

impl PaymentMethod {
    pub fn number(&self) -> Option<String> {
        self.string_prop("number")
    }

    pub fn is_active(&self) -> bool {
        self.bool_prop("active")
    }

    pub fn set_active(&mut self, active: bool) {
        self.put("active", active);
    }

    pub fn paypal_subject(&self) -> Option<String> {
        self.string_prop("paypal.subject")
    }

    pub fn set_paypal_subject(&mut self, subject: impl Into<String>) {
        self.put_string("paypal.subject", subject);
    }
}

impl Properties for PaymentMethod {
    fn store(&self) -> &PropertyStore {
        &self.store
    }

    fn store_mut(&mut self) -> &mut PropertyStore {
        &mut self.store
    }
}

impl Entity for PaymentMethod {
    const TYPE_NAME: &'static str = "PaymentMethod";
    const ENDPOINT: &'static str = "paymentmethod";

    fn exists(&self) -> bool {
        self.exists
    }

    fn set_exists(&mut self, exists: bool) {
        self.exists = exists;
    }
}
