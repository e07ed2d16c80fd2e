use indexmap::IndexMap;

/// Input of a licensee validation.
///
/// Module parameters are kept in insertion order; when more than one module
/// is validated, each module's parameters get its position as a suffix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationParameters {
    pub product_number: Option<String>,
    /// Licensee-level properties such as `licenseeName`.
    pub licensee_properties: IndexMap<String, String>,
    /// Product module number to that module's parameters.
    pub parameters: IndexMap<String, IndexMap<String, String>>,
    /// Ask the service for a signed response usable offline.
    pub for_offline_use: bool,
}

impl ValidationParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn product_number(mut self, product_number: impl Into<String>) -> Self {
        self.product_number = Some(product_number.into());
        self
    }

    /// Name used when the service auto-creates the licensee.
    pub fn licensee_name(self, name: impl Into<String>) -> Self {
        self.licensee_property("licenseeName", name)
    }

    pub fn licensee_secret(self, secret: impl Into<String>) -> Self {
        self.licensee_property("licenseeSecret", secret)
    }

    pub fn licensee_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.licensee_properties.insert(name.into(), value.into());
        self
    }

    /// Sets the parameters for one product module, replacing earlier ones.
    pub fn product_module<K, V>(
        mut self,
        product_module_number: impl Into<String>,
        parameters: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let parameters = parameters
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.parameters.insert(product_module_number.into(), parameters);
        self
    }

    pub fn for_offline_use(mut self, for_offline_use: bool) -> Self {
        self.for_offline_use = for_offline_use;
        self
    }

    pub fn product_module_parameters(&self, product_module_number: &str) -> Option<&IndexMap<String, String>> {
        self.parameters.get(product_module_number)
    }

    /// Flat request parameters, in order: product, licensee properties,
    /// offline flag, then each module.
    pub fn to_query_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();

        if let Some(product_number) = self.product_number.as_ref().filter(|n| !n.is_empty()) {
            params.push(("productNumber".to_string(), product_number.clone()));
        }

        for (name, value) in &self.licensee_properties {
            params.push((name.clone(), value.clone()));
        }

        if self.for_offline_use {
            params.push(("forOfflineUse".to_string(), "true".to_string()));
        }

        let indexed = self.parameters.len() > 1;
        for (index, (module, module_params)) in self.parameters.iter().enumerate() {
            let suffix = if indexed { index.to_string() } else { String::new() };

            params.push((format!("productModuleNumber{suffix}"), module.clone()));
            for (name, value) in module_params {
                params.push((format!("{name}{suffix}"), value.clone()));
            }
        }

        params
    }
}
