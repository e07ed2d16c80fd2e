use super::{link, store::stringify, Cast, CommonProps, Entity, Properties, PropertyStore};
use crate::{err::Error, Result};
use serde_json::{Map, Value};
use std::fmt;

const CASTS: &[(&str, Cast)] = &[
    ("active", Cast::BooleanString),
    ("version", Cast::String),
    ("licenseeAutoCreate", Cast::BooleanString),
    ("inUse", Cast::BooleanString),
];

const DISCOUNT_CASTS: &[(&str, Cast)] = &[
    ("totalPrice", Cast::Float),
    ("amountFix", Cast::Float),
    ("amountPercent", Cast::Float),
];

pub(crate) const DISCOUNT: &str = "discount";

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    store: PropertyStore,
    exists: bool,
    discounts: Vec<ProductDiscount>,
    // distinguishes "cleared" from "never set" on the wire
    discounts_touched: bool,
    product_modules: Vec<String>,
    licensees: Vec<String>,
}

impl Default for Product {
    fn default() -> Self {
        Self {
            store: PropertyStore::new(CASTS),
            exists: false,
            discounts: Vec::new(),
            discounts_touched: false,
            product_modules: Vec::new(),
            licensees: Vec::new(),
        }
    }
}

impl Product {
    pub fn new(number: impl Into<String>, name: impl Into<String>) -> Self {
        let mut product = Self::default();
        product.set_number(number);
        product.set_name(name);
        product
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

    pub fn version(&self) -> Option<String> {
        self.string_prop("version")
    }

    pub fn set_version(&mut self, version: impl Into<String>) {
        self.put_string("version", version);
    }

    pub fn description(&self) -> Option<String> {
        self.string_prop("description")
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.put_string("description", description);
    }

    pub fn licensing_info(&self) -> Option<String> {
        self.string_prop("licensingInfo")
    }

    pub fn set_licensing_info(&mut self, info: impl Into<String>) {
        self.put_string("licensingInfo", info);
    }

    pub fn is_active(&self) -> bool {
        self.bool_prop("active")
    }

    pub fn set_active(&mut self, active: bool) {
        self.put("active", active);
    }

    pub fn is_licensee_auto_create(&self) -> bool {
        self.bool_prop("licenseeAutoCreate")
    }

    pub fn set_licensee_auto_create(&mut self, auto_create: bool) {
        self.put("licenseeAutoCreate", auto_create);
    }

    pub fn in_use(&self) -> bool {
        self.bool_prop("inUse")
    }

    pub fn product_discounts(&self) -> &[ProductDiscount] {
        &self.discounts
    }

    /// Replaces the discounts. An empty list clears them on the next update.
    pub fn set_product_discounts(&mut self, discounts: Vec<ProductDiscount>) {
        self.discounts = discounts;
        self.discounts_touched = true;
    }

    pub fn add_product_discount(&mut self, discount: ProductDiscount) {
        self.discounts.push(discount);
        self.discounts_touched = true;
    }

    pub fn product_module_numbers(&self) -> &[String] {
        &self.product_modules
    }

    pub fn licensee_numbers(&self) -> &[String] {
        &self.licensees
    }

    pub(crate) fn link_product_module(&mut self, number: Option<String>) {
        link(&mut self.product_modules, number);
    }

    pub(crate) fn link_licensee(&mut self, number: Option<String>) {
        link(&mut self.licensees, number);
    }
}

impl Properties for Product {
    fn store(&self) -> &PropertyStore {
        &self.store
    }

    fn store_mut(&mut self) -> &mut PropertyStore {
        &mut self.store
    }

    fn assign(&mut self, name: &str, value: Value) -> Result<()> {
        if name != DISCOUNT {
            return self.store.set(name, value);
        }

        let discounts = match value {
            Value::Null => Vec::new(),
            Value::String(s) if s.is_empty() => Vec::new(),
            Value::String(s) => vec![ProductDiscount::parse(&s)?],
            Value::Array(entries) => entries
                .into_iter()
                .map(ProductDiscount::from_value)
                .collect::<Result<Vec<_>>>()?,
            other => vec![ProductDiscount::from_value(other)?],
        };
        self.set_product_discounts(discounts);

        Ok(())
    }

    fn to_wire_map(&self) -> Map<String, Value> {
        let mut map = self.store.properties().clone();

        if !self.discounts.is_empty() {
            let discounts = self
                .discounts
                .iter()
                .map(|d| Value::String(d.to_string()))
                .collect();
            map.insert(DISCOUNT.into(), Value::Array(discounts));
        } else if self.discounts_touched {
            map.insert(DISCOUNT.into(), Value::String(String::new()));
        }

        map
    }
}

impl Entity for Product {
    const TYPE_NAME: &'static str = "Product";
    const ENDPOINT: &'static str = "product";

    fn exists(&self) -> bool {
        self.exists
    }

    fn set_exists(&mut self, exists: bool) {
        self.exists = exists;
    }
}

/// A volume discount on a product: above `totalPrice`, either a fixed amount
/// or a percentage is taken off. The two amounts exclude each other.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDiscount {
    store: PropertyStore,
}

impl Default for ProductDiscount {
    fn default() -> Self {
        Self {
            store: PropertyStore::new(DISCOUNT_CASTS),
        }
    }
}

impl ProductDiscount {
    pub fn fixed(total_price: f64, currency: impl Into<String>, amount: f64) -> Result<Self> {
        let mut discount = Self::default();
        discount.set_total_price(total_price)?;
        discount.set_currency(currency);
        discount.set_amount_fix(amount)?;
        Ok(discount)
    }

    pub fn percent(total_price: f64, currency: impl Into<String>, percent: f64) -> Result<Self> {
        let mut discount = Self::default();
        discount.set_total_price(total_price)?;
        discount.set_currency(currency);
        discount.set_amount_percent(percent)?;
        Ok(discount)
    }

    pub fn from_properties(properties: Map<String, Value>) -> Result<Self> {
        let mut discount = Self::default();
        discount.set_properties(properties, true)?;
        Ok(discount)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Self::from_properties(map),
            Value::String(s) => Self::parse(&s),
            other => Err(Error::TypeMismatch(format!(
                "product discount expects a mapping, got {other}"
            ))),
        }
    }

    /// Parses the wire form `totalPrice;currency;amount`, where a trailing `%`
    /// marks a percentage.
    pub fn parse(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(';').map(str::trim).collect();
        let [total, currency, amount] = parts.as_slice() else {
            return Err(Error::MalformedArguments(format!(
                "product discount '{s}' must be 'totalPrice;currency;amount'"
            )));
        };

        let mut discount = Self::default();
        discount.assign("totalPrice", Value::String(total.to_string()))?;
        discount.set_currency(*currency);
        match amount.strip_suffix('%') {
            Some(percent) => discount.assign("amountPercent", Value::String(percent.into()))?,
            None => discount.assign("amountFix", Value::String(amount.to_string()))?,
        }
        discount.store.sync_original();

        Ok(discount)
    }

    pub fn total_price(&self) -> Option<f64> {
        self.f64_prop("totalPrice")
    }

    pub fn set_total_price(&mut self, total_price: f64) -> Result<()> {
        self.put_f64("totalPrice", total_price)
    }

    pub fn currency(&self) -> Option<String> {
        self.string_prop("currency")
    }

    pub fn set_currency(&mut self, currency: impl Into<String>) {
        self.put_string("currency", currency);
    }

    pub fn amount_fix(&self) -> Option<f64> {
        self.f64_prop("amountFix")
    }

    /// Replaces any percentage amount.
    pub fn set_amount_fix(&mut self, amount: f64) -> Result<()> {
        self.put_f64("amountFix", amount)?;
        self.store.remove("amountPercent");
        Ok(())
    }

    pub fn amount_percent(&self) -> Option<f64> {
        self.f64_prop("amountPercent")
    }

    pub fn set_amount_percent(&mut self, percent: f64) -> Result<()> {
        self.put_f64("amountPercent", percent)?;
        self.store.remove("amountFix");
        Ok(())
    }
}

impl Properties for ProductDiscount {
    fn store(&self) -> &PropertyStore {
        &self.store
    }

    fn store_mut(&mut self) -> &mut PropertyStore {
        &mut self.store
    }

    fn assign(&mut self, name: &str, value: Value) -> Result<()> {
        self.store.set(name, value)?;
        match name {
            "amountFix" => {
                self.store.remove("amountPercent");
            }
            "amountPercent" => {
                self.store.remove("amountFix");
            }
            _ => {}
        }
        Ok(())
    }
}

impl fmt::Display for ProductDiscount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.total_price().unwrap_or_default();
        let currency = self.currency().unwrap_or_default();

        let amount = match (self.amount_fix(), self.amount_percent()) {
            (Some(fix), _) => format!("{fix:.2}"),
            (None, Some(percent)) => format!("{}%", stringify(&Value::from(percent))),
            (None, None) => String::new(),
        };

        write!(f, "{total:.2};{currency};{amount}")
    }
}
