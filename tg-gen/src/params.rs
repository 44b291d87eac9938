//! Parameter objects for landscape generation and trace simulation.
//!
//! Both structs deserialize from the camelCase shape used at the engine boundary and are checked
//! with `validate()` before any work starts; the first violated constraint is reported by name.
use std::collections::BTreeMap;

use clap::ValueEnum;
use serde::{
    Deserialize,
    Serialize,
};

use crate::errors::GenError;

/// Size and shape parameters for [`generate`](crate::landscape::generate).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationParams {
    /// Number of applications to generate.
    pub app_count: usize,
    /// Number of generated package layers below the synthetic namespace.
    pub package_depth: usize,
    /// Lower bound on classes per application.
    pub min_class_count: usize,
    /// Upper bound on classes per application.
    pub max_class_count: usize,
    /// Lower bound on methods per class.
    pub min_method_count: usize,
    /// Upper bound on methods per class.
    pub max_method_count: usize,
    /// Fraction of the remaining classes a layer may take; lower values push classes to the leaves.
    pub balance: f64,
    /// Seed for deterministic replay.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            app_count: 1,
            package_depth: 3,
            min_class_count: 5,
            max_class_count: 20,
            min_method_count: 1,
            max_method_count: 5,
            balance: 0.5,
            seed: None,
        }
    }
}

impl GenerationParams {
    /// Check every constraint, naming the first one that fails.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.app_count < 1 {
            return Err(GenError::invalid("appCount >= 1"));
        }
        if self.min_class_count < 1 {
            return Err(GenError::invalid("minClassCount >= 1"));
        }
        if self.max_class_count < self.min_class_count {
            return Err(GenError::invalid("maxClassCount >= minClassCount"));
        }
        if self.min_method_count < 1 {
            return Err(GenError::invalid("minMethodCount >= 1"));
        }
        if self.max_method_count < self.min_method_count {
            return Err(GenError::invalid("maxMethodCount >= minMethodCount"));
        }
        // NaN fails the range check as well
        if !(0.0..=1.0).contains(&self.balance) {
            return Err(GenError::invalid("balance in [0, 1]"));
        }
        Ok(())
    }
}

/// Policy used to pick the next class to call.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommunicationStyle {
    /// Any class, uniformly.
    #[default]
    TrueRandom,
    /// Stay in the caller's package, following cross-package links when present.
    Cohesive,
    /// Mostly stay in the caller's package, leaving it one time in five.
    RandomExit,
}

/// Parameters for [`simulate`](crate::simulation::simulate).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceParams {
    /// Total simulated time covered by the trace.
    pub duration: u64,
    /// Number of calls to generate after the entry span.
    pub call_count: usize,
    /// Maximum number of simultaneously open frames.
    pub max_connection_depth: usize,
    /// Class selection policy.
    pub communication_style: CommunicationStyle,
    /// Whether a class may be called again once visited.
    pub allow_cyclic_calls: bool,
    /// Keep generating until every method of every class has been called.
    #[serde(default)]
    pub visit_all_methods: bool,
    /// Attributes copied onto every span.
    #[serde(default)]
    pub fixed_attributes: BTreeMap<String, String>,
    /// Seed for deterministic replay.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for TraceParams {
    fn default() -> Self {
        Self {
            duration: 1000,
            call_count: 10,
            max_connection_depth: 3,
            communication_style: CommunicationStyle::default(),
            allow_cyclic_calls: false,
            visit_all_methods: false,
            fixed_attributes: BTreeMap::new(),
            seed: None,
        }
    }
}

impl TraceParams {
    /// Check every constraint, naming the first one that fails.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.duration < 1 {
            return Err(GenError::invalid("duration >= 1"));
        }
        if self.call_count < 1 {
            return Err(GenError::invalid("callCount >= 1"));
        }
        if self.max_connection_depth < 1 {
            return Err(GenError::invalid("maxConnectionDepth >= 1"));
        }
        Ok(())
    }
}
