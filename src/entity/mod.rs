//! Licensing domain entities on top of [`PropertyStore`].
//!
//! Each entity declares its casts and exposes typed accessors for the
//! properties it knows about; anything else the service sends is reachable
//! through the generic [`Properties::get`] and [`Properties::set`].

pub mod country;
pub mod license;
pub mod license_template;
pub mod licensee;
pub mod payment_method;
pub mod product;
pub mod product_module;
pub mod store;
pub mod token;
pub mod transaction;

pub use country::Country;
pub use license::License;
pub use license_template::{LicenseTemplate, LicenseType};
pub use licensee::Licensee;
pub use payment_method::PaymentMethod;
pub use product::{Product, ProductDiscount};
pub use product_module::ProductModule;
pub use store::{Cast, PropertyStore};
pub use token::{Token, TokenType};
pub use transaction::{LicenseTransactionJoin, Transaction, TransactionSource, TransactionStatus};

use crate::Result;
use store::Scalar;
use chrono::{DateTime, FixedOffset};
use serde_json::{Map, Value};

/// Anything backed by a [`PropertyStore`].
pub trait Properties {
    fn store(&self) -> &PropertyStore;

    fn store_mut(&mut self) -> &mut PropertyStore;

    fn get(&self, name: &str) -> Option<Value> {
        self.store().get(name)
    }

    fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        self.assign(name, value.into())
    }

    fn remove(&mut self, name: &str) -> Option<Value> {
        self.store_mut().remove(name)
    }

    /// Per-property setter hook. Implementors override this for properties
    /// whose assignment has side effects; everything else is stored as is.
    fn assign(&mut self, name: &str, value: Value) -> Result<()> {
        self.store_mut().set(name, value)
    }

    /// Replaces all properties, routing each one through [`Properties::assign`].
    fn set_properties(&mut self, properties: Map<String, Value>, sync: bool) -> Result<()> {
        self.store_mut().clear();
        for (name, value) in properties {
            self.assign(&name, value)?;
        }
        if sync {
            self.store_mut().sync_original();
        }
        Ok(())
    }

    fn dirty(&self) -> Map<String, Value> {
        self.store().dirty()
    }

    /// Flat property map as sent to the service.
    fn to_wire_map(&self) -> Map<String, Value> {
        self.store().properties().clone()
    }
}

/// A domain record with identity.
pub trait Entity: Properties + Default {
    /// Value of the wire item's `type` attribute.
    const TYPE_NAME: &'static str;
    /// Path fragment for the entity's REST resource.
    const ENDPOINT: &'static str;
    const KEY_NAME: &'static str = "number";

    fn exists(&self) -> bool;

    fn set_exists(&mut self, exists: bool);

    /// Builds a clean entity from a property map.
    fn from_properties(properties: Map<String, Value>) -> Result<Self> {
        let mut entity = Self::default();
        entity.set_properties(properties, true)?;
        Ok(entity)
    }

    fn key_name(&self) -> &'static str {
        Self::KEY_NAME
    }

    fn key(&self) -> Option<String> {
        self.store().get_string(Self::KEY_NAME)
    }
}

/// Accessors shared by every entity through their stores.
pub(crate) trait CommonProps: Properties {
    fn string_prop(&self, name: &str) -> Option<String> {
        self.store().get_string(name)
    }

    fn bool_prop(&self, name: &str) -> bool {
        self.store().get_bool(name).unwrap_or(false)
    }

    fn f64_prop(&self, name: &str) -> Option<f64> {
        self.store().get_f64(name)
    }

    fn i64_prop(&self, name: &str) -> Option<i64> {
        self.store().get_i64(name)
    }

    fn datetime_prop(&self, name: &str) -> Option<DateTime<FixedOffset>> {
        self.store().get_datetime(name)
    }

    fn put(&mut self, name: &str, value: impl Into<Scalar>) {
        self.store_mut().put(name, value.into());
    }

    fn put_string(&mut self, name: &str, value: impl Into<String>) {
        let value: String = value.into();
        self.store_mut().put(name, Scalar::from(value));
    }

    fn put_f64(&mut self, name: &str, value: f64) -> Result<()> {
        self.store_mut().put_f64(name, value)
    }
}

impl<T: Properties> CommonProps for T {}

/// Appends `number` to a handle list unless it is already there.
pub(crate) fn link(handles: &mut Vec<String>, number: Option<String>) {
    if let Some(number) = number {
        if !handles.contains(&number) {
            handles.push(number);
        }
    }
}
