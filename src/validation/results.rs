use crate::{
    convert::item_to_map,
    entity::store::to_datetime,
    err::Error,
    wire::Netlicensing,
    Result,
};
use chrono::{DateTime, FixedOffset, Utc};
use indexmap::IndexMap;
use serde_json::{Map, Value};

pub const VALIDATION_ITEM_TYPE: &str = "ProductModuleValidation";

/// Outcome of one product module: `valid`, `licensingModel`,
/// `productModuleName` and whatever the licensing model adds.
pub type ProductModuleValidation = Map<String, Value>;

/// Per-module validation outcomes plus the instant after which they are stale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationResults {
    validations: IndexMap<String, ProductModuleValidation>,
    ttl: Option<DateTime<FixedOffset>>,
}

impl ValidationResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assembles results from a validation response document.
    pub fn from_response(doc: &Netlicensing) -> Result<Self> {
        let mut results = Self::new();

        for item in doc.items() {
            if item.kind.as_deref().is_some_and(|kind| kind != VALIDATION_ITEM_TYPE) {
                tracing::debug!(kind = ?item.kind, "skipping non-validation item");
                continue;
            }

            let validation = item_to_map(item);
            let number = validation
                .get("productModuleNumber")
                .and_then(Value::as_str)
                .filter(|number| !number.is_empty())
                .ok_or_else(|| {
                    Error::BadResponse("Validation item without productModuleNumber".into())
                })?
                .to_string();

            results.validations.insert(number, validation);
        }

        if let Some(ttl) = doc.ttl.as_deref() {
            results.ttl = to_datetime(&Value::String(ttl.to_string()));
            if results.ttl.is_none() {
                tracing::warn!(ttl, "ignoring unparsable validation ttl");
            }
        }

        Ok(results)
    }

    pub fn validations(&self) -> &IndexMap<String, ProductModuleValidation> {
        &self.validations
    }

    pub fn product_module_validation(&self, product_module_number: &str) -> Option<&ProductModuleValidation> {
        self.validations.get(product_module_number)
    }

    pub fn set_product_module_validation(
        &mut self,
        product_module_number: impl Into<String>,
        validation: ProductModuleValidation,
    ) {
        self.validations.insert(product_module_number.into(), validation);
    }

    /// Whether the module was validated and its outcome says `valid`.
    pub fn is_valid(&self, product_module_number: &str) -> bool {
        self.product_module_validation(product_module_number)
            .and_then(|validation| validation.get("valid"))
            .is_some_and(|valid| match valid {
                Value::Bool(valid) => *valid,
                Value::String(valid) => valid == "true",
                _ => false,
            })
    }

    pub fn ttl(&self) -> Option<DateTime<FixedOffset>> {
        self.ttl
    }

    pub fn set_ttl(&mut self, ttl: Option<DateTime<FixedOffset>>) {
        self.ttl = ttl;
    }

    /// Results without a ttl are always stale.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        self.ttl.map_or(true, |ttl| now >= ttl)
    }

    pub fn len(&self) -> usize {
        self.validations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validations.is_empty()
    }
}
