use super::{Cast, CommonProps, Entity, Properties, PropertyStore};
use crate::{err::Error, Result};
use chrono::{DateTime, FixedOffset};
use serde_json::{Map, Value};
use std::str::FromStr;

const CASTS: &[(&str, Cast)] = &[
    ("active", Cast::BooleanString),
    ("grandTotal", Cast::Float),
    ("discount", Cast::Float),
    ("dateCreated", Cast::DateTime),
    ("dateClosed", Cast::DateTime),
    ("inUse", Cast::BooleanString),
];

pub(crate) const JOIN_LISTS: &[&str] = &["licenseTransactionJoin", "licenseTransactionJoins"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    Pending,
    Closed,
    Cancelled,
}

impl FromStr for TransactionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "CLOSED" => Ok(Self::Closed),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(Error::ParseErr(format!("unknown transaction status '{other}'"))),
        }
    }
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Closed => "CLOSED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionSource {
    Shop,
    AutoLicenseCreate,
    AutoLicenseUpdate,
    AutoLicenseDelete,
    AutoLicenseeCreate,
    AutoLicenseeDelete,
    AutoLicenseeValidate,
    AutoLicensetemplateDelete,
    AutoProductmoduleDelete,
    AutoProductDelete,
    AutoLicensesTransfer,
    Subscription,
}

impl FromStr for TransactionSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "SHOP" => Self::Shop,
            "AUTO_LICENSE_CREATE" => Self::AutoLicenseCreate,
            "AUTO_LICENSE_UPDATE" => Self::AutoLicenseUpdate,
            "AUTO_LICENSE_DELETE" => Self::AutoLicenseDelete,
            "AUTO_LICENSEE_CREATE" => Self::AutoLicenseeCreate,
            "AUTO_LICENSEE_DELETE" => Self::AutoLicenseeDelete,
            "AUTO_LICENSEE_VALIDATE" => Self::AutoLicenseeValidate,
            "AUTO_LICENSETEMPLATE_DELETE" => Self::AutoLicensetemplateDelete,
            "AUTO_PRODUCTMODULE_DELETE" => Self::AutoProductmoduleDelete,
            "AUTO_PRODUCT_DELETE" => Self::AutoProductDelete,
            "AUTO_LICENSES_TRANSFER" => Self::AutoLicensesTransfer,
            "SUBSCRIPTION" => Self::Subscription,
            other => {
                return Err(Error::ParseErr(format!(
                    "unknown transaction source '{other}'"
                )))
            }
        })
    }
}

/// Links one license to the transaction that created or changed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseTransactionJoin {
    pub transaction_number: Option<String>,
    pub license_number: Option<String>,
}

impl LicenseTransactionJoin {
    pub(crate) fn from_map(map: &Map<String, Value>) -> Self {
        let text = |key: &str| map.get(key).and_then(Value::as_str).map(String::from);
        Self {
            transaction_number: text("transactionNumber"),
            license_number: text("licenseNumber"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    store: PropertyStore,
    exists: bool,
    joins: Vec<LicenseTransactionJoin>,
}

impl Default for Transaction {
    fn default() -> Self {
        Self {
            store: PropertyStore::new(CASTS),
            exists: false,
            joins: Vec::new(),
        }
    }
}

impl Transaction {
    pub fn number(&self) -> Option<String> {
        self.string_prop("number")
    }

    pub fn set_number(&mut self, number: impl Into<String>) {
        self.put_string("number", number);
    }

    pub fn is_active(&self) -> bool {
        self.bool_prop("active")
    }

    pub fn set_active(&mut self, active: bool) {
        self.put("active", active);
    }

    pub fn status(&self) -> Option<TransactionStatus> {
        self.string_prop("status").and_then(|s| s.parse().ok())
    }

    pub fn set_status(&mut self, status: TransactionStatus) {
        self.put("status", status.as_str());
    }

    pub fn source(&self) -> Option<TransactionSource> {
        self.string_prop("source").and_then(|s| s.parse().ok())
    }

    pub fn grand_total(&self) -> Option<f64> {
        self.f64_prop("grandTotal")
    }

    pub fn discount(&self) -> Option<f64> {
        self.f64_prop("discount")
    }

    pub fn currency(&self) -> Option<String> {
        self.string_prop("currency")
    }

    pub fn date_created(&self) -> Option<DateTime<FixedOffset>> {
        self.datetime_prop("dateCreated")
    }

    pub fn date_closed(&self) -> Option<DateTime<FixedOffset>> {
        self.datetime_prop("dateClosed")
    }

    pub fn payment_method(&self) -> Option<String> {
        self.string_prop("paymentMethod")
    }

    pub fn set_payment_method(&mut self, method: impl Into<String>) {
        self.put_string("paymentMethod", method);
    }

    pub fn in_use(&self) -> bool {
        self.bool_prop("inUse")
    }

    pub fn license_transaction_joins(&self) -> &[LicenseTransactionJoin] {
        &self.joins
    }

    pub fn set_license_transaction_joins(&mut self, joins: Vec<LicenseTransactionJoin>) {
        self.joins = joins;
    }
}

impl Properties for Transaction {
    fn store(&self) -> &PropertyStore {
        &self.store
    }

    fn store_mut(&mut self) -> &mut PropertyStore {
        &mut self.store
    }
}

impl Entity for Transaction {
    const TYPE_NAME: &'static str = "Transaction";
    const ENDPOINT: &'static str = "transaction";

    fn exists(&self) -> bool {
        self.exists
    }

    fn set_exists(&mut self, exists: bool) {
        self.exists = exists;
    }
}
