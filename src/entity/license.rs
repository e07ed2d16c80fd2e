use super::{Cast, CommonProps, Entity, LicenseTemplate, Licensee, Properties, PropertyStore};
use chrono::{DateTime, FixedOffset};

const CASTS: &[(&str, Cast)] = &[
    ("active", Cast::BooleanString),
    ("price", Cast::Float),
    ("hidden", Cast::BooleanString),
    ("timeVolume", Cast::Int),
    ("startDate", Cast::DateTime),
    ("inUse", Cast::BooleanString),
];

#[derive(Debug, Clone, PartialEq)]
pub struct License {
    store: PropertyStore,
    exists: bool,
}

impl Default for License {
    fn default() -> Self {
        Self {
            store: PropertyStore::new(CASTS),
            exists: false,
        }
    }
}

impl License {
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

    pub fn is_active(&self) -> bool {
        self.bool_prop("active")
    }

    pub fn set_active(&mut self, active: bool) {
        self.put("active", active);
    }

    pub fn price(&self) -> Option<f64> {
        self.f64_prop("price")
    }

    pub fn currency(&self) -> Option<String> {
        self.string_prop("currency")
    }

    pub fn is_hidden(&self) -> bool {
        self.bool_prop("hidden")
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.put("hidden", hidden);
    }

    pub fn time_volume(&self) -> Option<i64> {
        self.i64_prop("timeVolume")
    }

    pub fn set_time_volume(&mut self, volume: i64) {
        self.put("timeVolume", volume);
    }

    pub fn time_volume_period(&self) -> Option<String> {
        self.string_prop("timeVolumePeriod")
    }

    pub fn set_time_volume_period(&mut self, period: impl Into<String>) {
        self.put_string("timeVolumePeriod", period);
    }

    pub fn start_date(&self) -> Option<DateTime<FixedOffset>> {
        self.datetime_prop("startDate")
    }

    pub fn set_start_date(&mut self, start: DateTime<FixedOffset>) {
        self.put("startDate", start.to_rfc3339());
    }

    pub fn parent_feature(&self) -> Option<String> {
        self.string_prop("parentfeature")
    }

    pub fn set_parent_feature(&mut self, number: impl Into<String>) {
        self.put_string("parentfeature", number);
    }

    pub fn in_use(&self) -> bool {
        self.bool_prop("inUse")
    }

    pub fn licensee_number(&self) -> Option<String> {
        self.string_prop("licenseeNumber")
    }

    pub fn license_template_number(&self) -> Option<String> {
        self.string_prop("licenseTemplateNumber")
    }

    /// Records the holder and registers this license with it.
    pub fn set_licensee(&mut self, licensee: &mut Licensee) {
        if let Some(number) = licensee.number() {
            self.put("licenseeNumber", number);
        }
        licensee.link_license(self.number());
    }

    pub fn set_license_template(&mut self, template: &mut LicenseTemplate) {
        if let Some(number) = template.number() {
            self.put("licenseTemplateNumber", number);
        }
        template.link_license(self.number());
    }
}

impl Properties for License {
    fn store(&self) -> &PropertyStore {
        &self.store
    }

    fn store_mut(&mut self) -> &mut PropertyStore {
        &mut self.store
    }
}

impl Entity for License {
    const TYPE_NAME: &'static str = "License";
    const ENDPOINT: &'static str = "license";

    fn exists(&self) -> bool {
        self.exists
    }

    fn set_exists(&mut self, exists: bool) {
        self.exists = exists;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::LicenseType;

    #[test]
    fn relationships_link_both_sides() {
        let mut licensee = Licensee::new("L1");
        let mut template = LicenseTemplate::new("T1", "Full", LicenseType::Feature);

        let mut license = License::default();
        license.set_number("LIC1");
        license.set_licensee(&mut licensee);
        license.set_license_template(&mut template);
        // linking twice keeps a single handle
        license.set_licensee(&mut licensee);

        assert_eq!(license.licensee_number().as_deref(), Some("L1"));
        assert_eq!(license.license_template_number().as_deref(), Some("T1"));
        assert_eq!(licensee.license_numbers(), ["LIC1".to_string()]);
        assert_eq!(template.license_numbers(), ["LIC1".to_string()]);
    }

    #[test]
    fn start_date_is_stored_with_offset() {
        let mut license = License::default();
        let start = DateTime::parse_from_rfc3339("2024-03-01T09:00:00+01:00").unwrap();
        license.set_start_date(start);

        assert_eq!(
            license.store().raw("startDate").and_then(|v| v.as_str()),
            Some("2024-03-01T09:00:00+01:00")
        );
        assert_eq!(license.start_date(), Some(start));
    }
}
