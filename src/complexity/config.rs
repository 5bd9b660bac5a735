//! Complexity scoring configuration.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::policy::{EdgeContext, EdgeFilter, EdgeSelection, EdgeTypeSet};

use super::builtin::builtin_features;
use super::feature::{ComplexityFeature, FeatureScore};

/// Caller-supplied aggregation over a breakdown.
pub type Aggregator = Arc<dyn Fn(&[FeatureScore]) -> f64 + Send + Sync>;

/// How feature contributions combine into one score.
#[derive(Clone, Default)]
pub enum Aggregation {
    /// Sum of weighted values.
    #[default]
    Sum,
    /// Largest weighted value (0 for an empty breakdown).
    Max,
    /// Custom function.
    Custom(Aggregator),
}

impl Aggregation {
    /// Combine a breakdown into a score.
    pub fn aggregate(&self, breakdown: &[FeatureScore]) -> f64 {
        match self {
            Self::Sum => breakdown.iter().map(|f| f.weighted).sum(),
            Self::Max => breakdown.iter().map(|f| f.weighted).fold(0.0, f64::max),
            Self::Custom(f) => f(breakdown),
        }
    }
}

impl fmt::Debug for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sum => f.write_str("Sum"),
            Self::Max => f.write_str("Max"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Configuration error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A feature applies to no node kind and would never run.
    #[error("Feature {id} applies to no node kind")]
    EmptyAppliesTo {
        /// Feature id.
        id: String,
    },
    /// Two features share an id.
    #[error("Duplicate feature id: {id}")]
    DuplicateFeature {
        /// Feature id.
        id: String,
    },
    /// Weight is NaN or infinite.
    #[error("Feature {id} has a non-finite weight")]
    NonFiniteWeight {
        /// Feature id.
        id: String,
    },
}

/// Complexity scoring configuration.
///
/// `edge_inclusion` / `edge_exclusion` apply on top of the complexity
/// context's defaults; `features: None` means the built-in set.
#[derive(Clone, Default)]
pub struct ComplexityConfig {
    /// Allow-list of edge types; empty means no allow-list.
    pub edge_inclusion: EdgeTypeSet,
    /// Extra excluded edge types.
    pub edge_exclusion: EdgeTypeSet,
    /// Feature set override.
    pub features: Option<Vec<Arc<dyn ComplexityFeature>>>,
    /// Aggregation of the breakdown.
    pub aggregation: Aggregation,
}

impl ComplexityConfig {
    /// Config with a custom feature set.
    pub fn with_features(features: Vec<Arc<dyn ComplexityFeature>>) -> Self {
        Self {
            features: Some(features),
            ..Self::default()
        }
    }

    /// Features in effect.
    pub fn features(&self) -> &[Arc<dyn ComplexityFeature>] {
        match &self.features {
            Some(features) => features,
            None => builtin_features(),
        }
    }

    /// Edge filter in effect.
    pub fn filter(&self) -> EdgeFilter {
        let selection = EdgeSelection {
            include: self.edge_inclusion,
            exclude: self.edge_exclusion,
        };
        EdgeFilter::for_context(EdgeContext::Complexity, &selection)
    }

    /// Check the feature set for programming errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for feature in self.features() {
            let id = feature.id();
            if feature.applies_to().is_empty() {
                return Err(ConfigError::EmptyAppliesTo { id: id.to_string() });
            }
            if !feature.weight().is_finite() {
                return Err(ConfigError::NonFiniteWeight { id: id.to_string() });
            }
            if !seen.insert(id) {
                return Err(ConfigError::DuplicateFeature { id: id.to_string() });
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ComplexityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let features: Option<Vec<&str>> = self
            .features
            .as_ref()
            .map(|fs| fs.iter().map(|feature| feature.id()).collect());
        f.debug_struct("ComplexityConfig")
            .field("edge_inclusion", &self.edge_inclusion)
            .field("edge_exclusion", &self.edge_exclusion)
            .field("features", &features)
            .field("aggregation", &self.aggregation)
            .finish()
    }
}
