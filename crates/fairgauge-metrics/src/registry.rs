use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use fairgauge_core::{EvaluationRow, MetricValue};

use crate::catalog;
use crate::errors::MetricError;

/// Whether a metric depends on a decision threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Confusion-matrix derived; computed under the active threshold.
    Rate,
    /// Threshold-free; computed directly from continuous scores.
    Score,
}

/// Metric computation signature: group rows plus the active threshold.
///
/// Score-type metrics receive `None` for the threshold. Zero-denominator
/// results must come back as `MetricValue::Undefined`, never NaN.
pub type MetricFn = Arc<dyn Fn(&[&EvaluationRow], Option<f64>) -> MetricValue + Send + Sync>;

/// Named metric with its computation function.
#[derive(Clone)]
pub struct MetricDefinition {
    pub name: String,
    pub kind: MetricKind,
    pub compute: MetricFn,
}

impl MetricDefinition {
    pub fn new(name: impl Into<String>, kind: MetricKind, compute: MetricFn) -> Self {
        Self {
            name: name.into(),
            kind,
            compute,
        }
    }

    pub fn is_rate(&self) -> bool {
        self.kind == MetricKind::Rate
    }
}

impl fmt::Debug for MetricDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricDefinition")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Catalog of named metrics.
///
/// Lookups take the read guard; registration takes the write guard, so
/// custom metrics may be registered concurrently with evaluations.
pub struct MetricRegistry {
    metrics: RwLock<HashMap<String, MetricDefinition>>,
}

impl MetricRegistry {
    /// Registry with no metrics; useful for fully custom catalogs.
    pub fn empty() -> Self {
        Self {
            metrics: RwLock::new(HashMap::new()),
        }
    }

    /// Registry pre-populated with the built-in catalog.
    pub fn with_catalog() -> Self {
        let metrics = catalog::catalog()
            .into_iter()
            .map(|definition| (definition.name.clone(), definition))
            .collect();
        Self {
            metrics: RwLock::new(metrics),
        }
    }

    /// Register a custom metric under a unique name.
    pub fn register(&self, definition: MetricDefinition) -> Result<(), MetricError> {
        let mut metrics = match self.metrics.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if metrics.contains_key(&definition.name) {
            return Err(MetricError::DuplicateMetric(definition.name.clone()));
        }
        metrics.insert(definition.name.clone(), definition);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<MetricDefinition> {
        let metrics = match self.metrics.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        metrics.get(name).cloned()
    }

    /// Registered metric names, sorted.
    pub fn names(&self) -> Vec<String> {
        let metrics = match self.metrics.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut names: Vec<String> = metrics.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for MetricRegistry {
    fn default() -> Self {
        Self::with_catalog()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant_metric(name: &str) -> MetricDefinition {
        MetricDefinition::new(
            name,
            MetricKind::Score,
            Arc::new(|_, _| MetricValue::Defined(1.0)),
        )
    }

    #[test]
    fn catalog_is_registered_by_default() {
        let registry = MetricRegistry::with_catalog();
        assert!(registry.get(catalog::SELECTION_RATE).is_some());
        assert!(registry.get(catalog::AUC).is_some());
        assert!(registry.get("nope").is_none());
    }

    #[test]
    fn duplicate_registration_fails() {
        let registry = MetricRegistry::with_catalog();
        registry
            .register(constant_metric("custom"))
            .expect("first registration");
        let err = registry.register(constant_metric("custom")).unwrap_err();
        assert!(matches!(err, MetricError::DuplicateMetric(name) if name == "custom"));
    }

    #[test]
    fn builtin_names_cannot_be_shadowed() {
        let registry = MetricRegistry::with_catalog();
        let err = registry
            .register(constant_metric(catalog::ACCURACY))
            .unwrap_err();
        assert!(matches!(err, MetricError::DuplicateMetric(_)));
    }

    #[test]
    fn names_are_sorted() {
        let registry = MetricRegistry::empty();
        registry.register(constant_metric("zeta")).expect("register");
        registry.register(constant_metric("alpha")).expect("register");
        assert_eq!(registry.names(), vec!["alpha", "zeta"]);
    }
}
