//! Strategy lookup by slug.
//!
//! A slug is a lowercase, hyphen-separated name such as `distance-simple`.
//! It maps to a class name by PascalCasing the words and appending
//! `Estimator` (`DistanceSimpleEstimator`), which is then looked up in the
//! registry of known strategies.

use std::sync::{Arc, LazyLock};

use inflector::Inflector;
use regex::Regex;

use crate::config::EstimatorSettings;
use crate::data::EstimationData;
use crate::error::{EstimationError, EstimationResult};

use super::{
    ConcentricRegionsEstimator, DiffusionEstimator, DistanceSimpleEstimator, RegionEstimator,
};

const ESTIMATOR_SUFFIX: &str = "Estimator";

static SLUG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9]*(-[a-z0-9]+)*$").unwrap());

type Constructor = fn(Arc<EstimationData>, EstimatorSettings) -> Box<dyn RegionEstimator>;

/// Known strategies by class name.
static REGISTRY: &[(&str, Constructor)] = &[
    ("ConcentricRegionsEstimator", concentric_regions),
    ("DiffusionEstimator", diffusion),
    ("DistanceSimpleEstimator", distance_simple),
];

fn concentric_regions(
    data: Arc<EstimationData>,
    settings: EstimatorSettings,
) -> Box<dyn RegionEstimator> {
    Box::new(ConcentricRegionsEstimator::new(data).with_settings(settings))
}

fn diffusion(
    data: Arc<EstimationData>,
    settings: EstimatorSettings,
) -> Box<dyn RegionEstimator> {
    Box::new(DiffusionEstimator::new(data).with_settings(settings))
}

fn distance_simple(
    data: Arc<EstimationData>,
    settings: EstimatorSettings,
) -> Box<dyn RegionEstimator> {
    Box::new(DistanceSimpleEstimator::new(data).with_settings(settings))
}

/// Class name for a strategy slug.
///
/// Fails with `UnsupportedStrategy` if the slug is malformed or names no
/// registered strategy.
///
/// # Examples
/// ```ignore
/// assert_eq!(get_classname("distance-simple")?, "DistanceSimpleEstimator");
/// assert!(get_classname("___").is_err());
/// ```
pub fn get_classname(slug: &str) -> EstimationResult<String> {
    lookup(slug).map(|(class_name, _)| class_name.to_string())
}

fn lookup(slug: &str) -> EstimationResult<(&'static str, Constructor)> {
    if !SLUG_PATTERN.is_match(slug) {
        return Err(EstimationError::UnsupportedStrategy(slug.to_string()));
    }
    let class_name = format!("{}{}", slug.to_pascal_case(), ESTIMATOR_SUFFIX);
    REGISTRY
        .iter()
        .find(|(name, _)| *name == class_name)
        .copied()
        .ok_or_else(|| EstimationError::UnsupportedStrategy(slug.to_string()))
}

/// Builds estimators from slugs.
pub struct RegionEstimatorFactory;

impl RegionEstimatorFactory {
    /// Construct the strategy named by `slug` over shared data.
    ///
    /// Fails with `InvalidSettings` if `settings` does not validate.
    pub fn region_estimator(
        slug: &str,
        data: Arc<EstimationData>,
        settings: EstimatorSettings,
    ) -> EstimationResult<Box<dyn RegionEstimator>> {
        let (_, constructor) = lookup(slug)?;
        settings
            .validate()
            .map_err(|e| EstimationError::InvalidSettings(e.to_string()))?;
        Ok(constructor(data, settings))
    }

    pub fn get_classname(slug: &str) -> EstimationResult<String> {
        get_classname(slug)
    }

    /// Slugs of every registered strategy, sorted.
    pub fn slugs() -> Vec<String> {
        let mut slugs: Vec<String> = REGISTRY
            .iter()
            .map(|&(name, _)| {
                name.strip_suffix(ESTIMATOR_SUFFIX)
                    .unwrap_or(name)
                    .to_kebab_case()
            })
            .collect();
        slugs.sort();
        slugs
    }
}
