use super::{item_to_map, take_list};
use crate::{
    entity::{
        transaction::JOIN_LISTS, Country, Entity, License, LicenseTemplate,
        LicenseTransactionJoin, Licensee, PaymentMethod, Product, ProductDiscount, ProductModule,
        Token, Transaction,
    },
    err::Error,
    wire::Item,
    Result,
};
use serde_json::{Map, Value};

/// Conversion of one wire item into an entity. The result is never marked as
/// existing; that is up to the caller, who knows where the item came from.
pub trait FromItem: Entity {
    fn from_item(item: &Item) -> Result<Self>;
}

fn check_type<T: Entity>(item: &Item) -> Result<()> {
    match item.kind.as_deref() {
        Some(kind) if kind != T::TYPE_NAME => Err(Error::InvalidEntity(format!(
            "expected a {} item, got {kind}",
            T::TYPE_NAME
        ))),
        _ => Ok(()),
    }
}

/// Drops nested lists the entity does not model.
fn scalars_only(mut map: Map<String, Value>, type_name: &str) -> Map<String, Value> {
    map.retain(|name, value| {
        let keep = !value.is_array();
        if !keep {
            tracing::debug!(entity = type_name, list = %name, "ignoring nested list");
        }
        keep
    });
    map
}

/// Converter for entities without nested collections.
pub fn to_entity<T: Entity>(item: &Item) -> Result<T> {
    check_type::<T>(item)?;
    T::from_properties(scalars_only(item_to_map(item), T::TYPE_NAME))
}

pub fn to_product(item: &Item) -> Result<Product> {
    check_type::<Product>(item)?;

    let mut map = item_to_map(item);
    let discounts = take_list(&mut map, "discount");

    let mut product = Product::from_properties(scalars_only(map, Product::TYPE_NAME))?;

    if let Some(entries) = discounts {
        let discounts = entries
            .into_iter()
            .filter(|entry| !entry.is_empty())
            .map(ProductDiscount::from_properties)
            .collect::<Result<Vec<_>>>()?;
        product.set_product_discounts(discounts);
    }

    Ok(product)
}

pub fn to_transaction(item: &Item) -> Result<Transaction> {
    check_type::<Transaction>(item)?;

    let mut map = item_to_map(item);
    let mut joins = Vec::new();
    for list in JOIN_LISTS {
        if let Some(entries) = take_list(&mut map, list) {
            joins.extend(entries.iter().map(LicenseTransactionJoin::from_map));
        }
    }

    let mut transaction = Transaction::from_properties(scalars_only(map, Transaction::TYPE_NAME))?;
    transaction.set_license_transaction_joins(joins);

    Ok(transaction)
}

impl FromItem for Product {
    fn from_item(item: &Item) -> Result<Self> {
        to_product(item)
    }
}

impl FromItem for Transaction {
    fn from_item(item: &Item) -> Result<Self> {
        to_transaction(item)
    }
}

macro_rules! plain_converters {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromItem for $ty {
                fn from_item(item: &Item) -> Result<Self> {
                    to_entity(item)
                }
            }
        )*
    };
}

plain_converters!(ProductModule, LicenseTemplate, Licensee, License, Token, PaymentMethod, Country);
