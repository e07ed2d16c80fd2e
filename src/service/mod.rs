//! Generic CRUD over every entity endpoint.
//!
//! Each entity type names its endpoint and item type; the operations here
//! turn entities into request parameters and response items back into
//! entities marked as existing.

pub mod page;

pub use page::Page;

use crate::{
    client::NetLicensingClient,
    convert::FromItem,
    entity::{store::stringify, Entity, Licensee},
    err::Error,
    wire::Netlicensing,
    Result,
};
use serde_json::{Map, Value};

/// Fails with `MalformedArguments` for blank required values.
pub(crate) fn require(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::MalformedArguments(format!("{name} must be provided")));
    }
    Ok(())
}

/// Flattens a wire map into request parameters. Lists repeat their key,
/// nulls are left out.
pub fn to_params(properties: &Map<String, Value>) -> Result<Vec<(String, String)>> {
    let mut params = Vec::with_capacity(properties.len());

    for (name, value) in properties {
        match value {
            Value::Null => {}
            Value::Array(values) => {
                for value in values {
                    if value.is_array() || value.is_object() {
                        return Err(Error::TypeMismatch(format!(
                            "{name} holds a nested structure"
                        )));
                    }
                    params.push((name.clone(), stringify(value)));
                }
            }
            Value::Object(_) => {
                return Err(Error::TypeMismatch(format!("{name} holds a nested structure")));
            }
            scalar => params.push((name.clone(), stringify(scalar))),
        }
    }

    Ok(params)
}

/// Serializes a listing filter as `key=value;key=value`.
fn filter_param(filter: &[(&str, &str)]) -> Option<(String, String)> {
    if filter.is_empty() {
        return None;
    }

    let filter = filter
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(";");

    Some(("filter".to_string(), filter))
}

fn existing<T: FromItem>(doc: &Netlicensing) -> impl Iterator<Item = Result<T>> + '_ {
    doc.items_of(T::TYPE_NAME).map(|item| {
        let mut entity = T::from_item(item)?;
        entity.set_exists(true);
        Ok(entity)
    })
}

fn first<T: FromItem>(doc: Option<Netlicensing>) -> Result<Option<T>> {
    let Some(doc) = doc else {
        return Ok(None);
    };

    let mut entities = existing::<T>(&doc);
    entities.next().transpose()
}

fn counter(value: Option<&str>) -> Option<u64> {
    value.and_then(|value| value.trim().parse().ok())
}

fn page_of<T: FromItem>(doc: Option<Netlicensing>) -> Result<Page<T>> {
    let Some(doc) = doc else {
        return Ok(Page::default());
    };

    let content = existing(&doc).collect::<Result<Vec<T>>>()?;
    let count = content.len() as u64;

    let items = doc.items.as_ref();
    let page_number = counter(items.and_then(|i| i.pagenumber.as_deref())).unwrap_or(0);
    let items_number = counter(items.and_then(|i| i.itemsnumber.as_deref())).unwrap_or(count);
    let total_pages =
        counter(items.and_then(|i| i.totalpages.as_deref())).unwrap_or(u64::from(count > 0));
    let total_items = counter(items.and_then(|i| i.totalitems.as_deref())).unwrap_or(count);

    Ok(Page::new(content, page_number, items_number, total_pages, total_items))
}

/// Endpoints may span several segments, e.g. `utility/countries`.
fn endpoint_path(endpoint: &str) -> Vec<&str> {
    endpoint.split('/').collect()
}

/// The endpoint followed by `key` as a single segment.
fn entity_path<'a>(endpoint: &'a str, key: &'a str) -> Vec<&'a str> {
    let mut path = endpoint_path(endpoint);
    path.push(key);
    path
}

impl NetLicensingClient {
    /// Fetches one entity by its key. `None` if the service had no content.
    pub async fn get_entity<T: FromItem>(&self, key: &str) -> Result<Option<T>> {
        require(key, T::KEY_NAME)?;

        let doc = self.get(&entity_path(T::ENDPOINT, key), &[]).await?;
        first(doc)
    }

    /// Lists entities, optionally narrowed by a filter.
    pub async fn list<T: FromItem>(&self, filter: &[(&str, &str)]) -> Result<Page<T>> {
        let params: Vec<_> = filter_param(filter).into_iter().collect();

        let doc = self.get(&endpoint_path(T::ENDPOINT), &params).await?;
        page_of(doc)
    }

    pub async fn create<T: FromItem>(&self, entity: &T) -> Result<Option<T>> {
        let params = to_params(&entity.to_wire_map())?;

        let doc = self.post(&endpoint_path(T::ENDPOINT), &params).await?;
        first(doc)
    }

    pub async fn update<T: FromItem>(&self, key: &str, entity: &T) -> Result<Option<T>> {
        require(key, T::KEY_NAME)?;
        let params = to_params(&entity.to_wire_map())?;

        let doc = self.post(&entity_path(T::ENDPOINT, key), &params).await?;
        first(doc)
    }

    pub async fn delete_entity<T: FromItem>(&self, key: &str, force_cascade: bool) -> Result<()> {
        require(key, T::KEY_NAME)?;
        let params = [("forceCascade".to_string(), force_cascade.to_string())];

        self.delete(&entity_path(T::ENDPOINT, key), &params).await?;
        Ok(())
    }

    /// Moves the licenses of `source_licensee_number` to `licensee_number`.
    pub async fn transfer_licensee(
        &self,
        licensee_number: &str,
        source_licensee_number: &str,
    ) -> Result<()> {
        require(licensee_number, "licensee number")?;
        require(source_licensee_number, "source licensee number")?;
        let params = [(
            "sourceLicenseeNumber".to_string(),
            source_licensee_number.to_string(),
        )];

        let mut path = entity_path(Licensee::ENDPOINT, licensee_number);
        path.push("transfer");
        self.post(&path, &params).await?;
        Ok(())
    }
}
