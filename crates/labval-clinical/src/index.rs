//! Panel index: test values canonicalized to their primary units.
//!
//! Correlation rules, disease patterns, and panel checkers all read from
//! this index, so every threshold in the crate is expressed in primary
//! units. Tests that cannot be canonicalized (no definition, unknown unit,
//! non-finite value, duplicate entry) are recorded as skip notes and left
//! out of the index.

use std::collections::BTreeMap;

use tracing::debug;

use labval_model::{TestRegistry, TestResult};

pub struct PanelIndex {
    values: BTreeMap<String, f64>,
    skipped: Vec<String>,
}

impl PanelIndex {
    pub fn build(results: &[TestResult], registry: &TestRegistry) -> Self {
        let mut values = BTreeMap::new();
        let mut skipped = Vec::new();

        for result in results {
            if values.contains_key(&result.test_id) {
                skipped.push(format!(
                    "{}: duplicate entry ignored (kept the first)",
                    result.test_id
                ));
                continue;
            }
            if !result.value.is_finite() {
                skipped.push(format!("{}: non-finite value", result.test_id));
                continue;
            }
            let Some(def) = registry.get(&result.test_id) else {
                skipped.push(format!("{}: no test definition", result.test_id));
                continue;
            };
            let Some(canonical) = def.convert(result.value, &result.unit, &def.primary_unit)
            else {
                skipped.push(format!(
                    "{}: cannot convert {} to {}",
                    result.test_id, result.unit, def.primary_unit
                ));
                continue;
            };
            debug!(
                test_id = %result.test_id,
                value = result.value,
                unit = %result.unit,
                canonical,
                "indexed panel value"
            );
            values.insert(result.test_id.clone(), canonical);
        }

        Self { values, skipped }
    }

    /// Canonicalized value for a test, in its primary unit.
    pub fn get(&self, test_id: &str) -> Option<f64> {
        self.values.get(test_id).copied()
    }

    pub fn contains(&self, test_id: &str) -> bool {
        self.values.contains_key(test_id)
    }

    /// Test ids present, grouped by the two-character panel prefix.
    pub fn panels(&self) -> BTreeMap<String, Vec<String>> {
        let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for test_id in self.values.keys() {
            // First two characters, not bytes: ids from external registries
            // are not guaranteed to be ASCII.
            let prefix: String = test_id.chars().take(2).collect();
            if prefix.chars().count() < 2 {
                continue;
            }
            groups.entry(prefix).or_default().push(test_id.clone());
        }
        groups
    }

    pub fn into_skipped(self) -> Vec<String> {
        self.skipped
    }

    pub fn skipped_mut(&mut self) -> &mut Vec<String> {
        &mut self.skipped
    }
}
