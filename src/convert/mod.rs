//! Wire items to plain mappings, and mappings to entities.

pub mod entities;

pub use entities::FromItem;

use crate::wire::Item;
use serde_json::{Map, Value};

/// Flattens an item's properties into a mapping and converts each named
/// nested list recursively, appending it under its name.
///
/// A list node without content still produces an (empty) entry, so a present
/// but empty list is distinguishable from an absent one.
pub fn item_to_map(item: &Item) -> Map<String, Value> {
    let mut out = Map::new();

    for property in &item.property {
        let value = property
            .value
            .as_ref()
            .map_or(Value::Null, |v| Value::String(v.clone()));
        out.insert(property.name.clone(), value);
    }

    for list in &item.list {
        let Some(name) = list.name.as_deref() else {
            tracing::warn!("dropping nested list without a name");
            continue;
        };

        let converted = Value::Object(item_to_map(list));
        match out.get_mut(name) {
            Some(Value::Array(entries)) => entries.push(converted),
            _ => {
                out.insert(name.to_string(), Value::Array(vec![converted]));
            }
        }
    }

    out
}

/// Takes the entries of a nested list out of a converted mapping. `None` means
/// the list was absent.
pub(crate) fn take_list(map: &mut Map<String, Value>, name: &str) -> Option<Vec<Map<String, Value>>> {
    match map.shift_remove(name)? {
        Value::Array(entries) => Some(
            entries
                .into_iter()
                .filter_map(|entry| match entry {
                    Value::Object(obj) => Some(obj),
                    _ => None,
                })
                .collect(),
        ),
        Value::Object(obj) => Some(vec![obj]),
        _ => Some(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn converts_properties_and_nested_lists() {
        let item = Item::new("Product")
            .with_property("number", "P1")
            .with_property("name", "Widget")
            .with_list(
                Item::named_list("discount")
                    .with_property("totalPrice", "10.00")
                    .with_property("currency", "EUR")
                    .with_property("amountPercent", "20"),
            );

        let map = item_to_map(&item);
        assert_eq!(
            Value::Object(map),
            json!({
                "number": "P1",
                "name": "Widget",
                "discount": [{"totalPrice": "10.00", "currency": "EUR", "amountPercent": "20"}]
            })
        );
    }

    #[test]
    fn keeps_document_order_and_depth() {
        let item = Item::new("Product")
            .with_property("z", "1")
            .with_property("a", "2")
            .with_list(
                Item::named_list("module")
                    .with_property("number", "M1")
                    .with_list(Item::named_list("template").with_property("number", "T1")),
            )
            .with_list(Item::named_list("module").with_property("number", "M2"));

        let map = item_to_map(&item);
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, ["z", "a", "module"]);
        assert_eq!(
            map["module"],
            json!([
                {"number": "M1", "template": [{"number": "T1"}]},
                {"number": "M2"}
            ])
        );
    }

    #[test]
    fn empty_list_differs_from_absent_list() {
        let present = item_to_map(&Item::new("Product").with_list(Item::named_list("discount")));
        let absent = item_to_map(&Item::new("Product"));

        assert_eq!(present.get("discount"), Some(&json!([{}])));
        assert!(absent.is_empty());

        let mut present = present;
        assert_eq!(take_list(&mut present, "discount").map(|l| l.len()), Some(1));
        assert_eq!(take_list(&mut present, "discount"), None);
    }

    #[test]
    fn empty_item_is_empty_map() {
        assert!(item_to_map(&Item::default()).is_empty());
    }
}
