//! The service's response document and its two encodings.
//!
//! Both the JSON and the XML form carry the same shape: an optional `infos`
//! section, an `items` section with pagination attributes, and a list of
//! `item` nodes, each holding `property` and nested `list` children.

pub mod c14n;
pub mod xml;

use crate::{err::Error, Result};
use serde::{Deserialize, Deserializer};
use xml::Element;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Netlicensing {
    #[serde(default, deserialize_with = "de_opt_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub ttl: Option<String>,
    #[serde(default, deserialize_with = "de_infos")]
    pub infos: Vec<Info>,
    #[serde(default)]
    pub items: Option<Items>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Info {
    #[serde(default, deserialize_with = "de_opt_string")]
    pub id: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "de_opt_string")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Items {
    #[serde(default)]
    pub item: Vec<Item>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub pagenumber: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub itemsnumber: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub totalpages: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub totalitems: Option<String>,
}

/// An `item` node, or a named `list` node nested inside one.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Item {
    #[serde(rename = "type", default, deserialize_with = "de_opt_string")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub name: Option<String>,
    #[serde(default)]
    pub property: Vec<Property>,
    #[serde(default)]
    pub list: Vec<Item>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Property {
    pub name: String,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub value: Option<String>,
}

impl Item {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: Some(kind.into()),
            ..Default::default()
        }
    }

    pub fn named_list(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.property.push(Property {
            name: name.into(),
            value: Some(value.into()),
        });
        self
    }

    pub fn with_list(mut self, list: Item) -> Self {
        self.list.push(list);
        self
    }
}

impl Netlicensing {
    /// Parses a response body, choosing the decoder by content type. An empty
    /// body yields `None`.
    pub fn parse(body: &str, content_type: &str) -> Result<Option<Self>> {
        if body.trim().is_empty() {
            return Ok(None);
        }

        let doc = if content_type.contains("json") {
            Self::from_json(body)?
        } else {
            Self::from_xml(body)?
        };

        Ok(Some(doc))
    }

    pub fn from_json(body: &str) -> Result<Self> {
        serde_json::from_str(body)
            .map_err(|e| Error::BadResponse(format!("Failed parsing response json: {e}")))
    }

    pub fn from_xml(body: &str) -> Result<Self> {
        let root = xml::parse(body)?;
        Self::from_element(&root)
    }

    pub fn from_element(root: &Element) -> Result<Self> {
        if root.local_name() != "netlicensing" {
            return Err(Error::BadResponse(format!(
                "Unexpected document root: {}",
                root.name
            )));
        }

        let infos = root
            .child("infos")
            .map(|infos| {
                infos
                    .children_named("info")
                    .map(|info| Info {
                        id: info.attr("id").map(String::from),
                        kind: info.attr("type").map(String::from),
                        value: Some(info.text()),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let items = root.child("items").map(|items| Items {
            item: items.children_named("item").map(item_from_element).collect(),
            pagenumber: items.attr("pagenumber").map(String::from),
            itemsnumber: items.attr("itemsnumber").map(String::from),
            totalpages: items.attr("totalpages").map(String::from),
            totalitems: items.attr("totalitems").map(String::from),
        });

        Ok(Self {
            id: root.attr("id").map(String::from),
            ttl: root.attr("ttl").map(String::from),
            infos,
            items,
        })
    }

    /// All items in document order.
    pub fn items(&self) -> &[Item] {
        self.items.as_ref().map_or(&[], |items| items.item.as_slice())
    }

    /// Items of the given `type`.
    pub fn items_of<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Item> {
        self.items()
            .iter()
            .filter(move |item| item.kind.as_deref() == Some(kind))
    }
}

fn item_from_element(el: &Element) -> Item {
    let property = el
        .children_named("property")
        .filter_map(|prop| {
            let Some(name) = prop.attr("name") else {
                tracing::warn!("dropping property without a name");
                return None;
            };
            // value attribute wins over element text
            let value = prop
                .attr("value")
                .map(String::from)
                .unwrap_or_else(|| prop.text());
            Some(Property {
                name: name.to_string(),
                value: Some(value),
            })
        })
        .collect();

    Item {
        kind: el.attr("type").map(String::from),
        name: el.attr("name").map(String::from),
        property,
        list: el.children_named("list").map(item_from_element).collect(),
    }
}

// the service emits numbers and booleans as strings in some places and as
// native JSON in others
fn de_opt_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

fn de_infos<'de, D>(deserializer: D) -> std::result::Result<Vec<Info>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Infos {
        #[serde(default)]
        info: Vec<Info>,
    }

    let infos = Option::<Infos>::deserialize(deserializer)?;
    Ok(infos.map(|i| i.info).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn product_item() -> Item {
        Item::new("Product")
            .with_property("number", "P1")
            .with_property("name", "Widget")
            .with_list(
                Item::named_list("discount")
                    .with_property("totalPrice", "10.00")
                    .with_property("currency", "EUR")
                    .with_property("amountPercent", "20"),
            )
    }

    #[test]
    fn xml_and_json_decode_to_same_item() {
        let xml = r#"<ns2:netlicensing xmlns:ns2="http://netlicensing.labs64.com/schema/context">
            <ns2:items pagenumber="0" itemsnumber="1" totalpages="1" totalitems="1">
                <ns2:item type="Product">
                    <ns2:property name="number">P1</ns2:property>
                    <ns2:property name="name" value="Widget"/>
                    <ns2:list name="discount">
                        <ns2:property name="totalPrice">10.00</ns2:property>
                        <ns2:property name="currency">EUR</ns2:property>
                        <ns2:property name="amountPercent">20</ns2:property>
                    </ns2:list>
                </ns2:item>
            </ns2:items>
        </ns2:netlicensing>"#;

        let json = r#"{
            "signature": null,
            "infos": {"info": []},
            "items": {
                "item": [{
                    "property": [
                        {"value": "P1", "name": "number"},
                        {"value": "Widget", "name": "name"}
                    ],
                    "list": [{
                        "property": [
                            {"value": "10.00", "name": "totalPrice"},
                            {"value": "EUR", "name": "currency"},
                            {"value": "20", "name": "amountPercent"}
                        ],
                        "list": [],
                        "name": "discount"
                    }],
                    "type": "Product"
                }],
                "pagenumber": "0",
                "itemsnumber": 1,
                "totalpages": "1",
                "totalitems": "1"
            },
            "ttl": null
        }"#;

        let from_xml = Netlicensing::parse(xml, "application/xml").unwrap().unwrap();
        let from_json = Netlicensing::parse(json, "application/json;charset=UTF-8")
            .unwrap()
            .unwrap();

        assert_eq!(from_xml.items(), &[product_item()]);
        assert_eq!(from_xml, from_json);
        assert_eq!(from_json.items.unwrap().itemsnumber.as_deref(), Some("1"));
    }

    #[test]
    fn empty_body_is_no_document() {
        assert_eq!(Netlicensing::parse("  \n", "application/xml").unwrap(), None);
    }

    #[test]
    fn foreign_root_is_rejected() {
        let err = Netlicensing::parse("<html></html>", "text/html").unwrap_err();
        assert!(matches!(err, Error::BadResponse(_)));
    }
}
