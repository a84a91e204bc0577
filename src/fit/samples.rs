//! Weighted training sets for the central and tail regions.
//!
//! Each set combines a broad sweep over the region with a denser sweep near the
//! central/tail hand-off, where the two approximations have to agree. Points are
//! clipped to a numerically safe range, sorted and deduplicated, and only then
//! restricted to the region. Targets always come from the exact quantile.

use rayon::prelude::*;

use crate::domain::{Region, RegionConfig, SamplePoint, WeightedSampleSet, X_HIGH, X_LOW};
use crate::error::FitError;
use crate::fit::grid::{linspace, log_space};
use crate::math::standard_normal_quantile;

/// Central: uniform sweep over (almost) the whole unit interval.
const CENTRAL_SWEEP: (f64, f64) = (1e-6, 1.0 - 1e-6);
/// Central: dense brackets around the lower and upper boundary.
const CENTRAL_LOW_BRACKET: (f64, f64) = (0.02, 0.025);
const CENTRAL_HIGH_BRACKET: (f64, f64) = (0.975, 0.98);
const CENTRAL_CLIP: (f64, f64) = (1e-10, 1.0 - 1e-10);
/// Points closer than this to either boundary get `BOUNDARY_WEIGHT`.
const CENTRAL_BOUNDARY_BAND: f64 = 0.01;

/// Tail: smallest probability fitted (log sweep start and clip floor).
const TAIL_MIN_PROBABILITY: f64 = 1e-16;
/// Tail: start of the linear sweep up to `X_LOW`.
const TAIL_LINEAR_START: f64 = 0.002;
/// Tail: deep-tail points below this get `DEEP_TAIL_WEIGHT`.
const TAIL_DEEP_THRESHOLD: f64 = 1e-12;
/// Tail: points above this (close to `X_LOW`) get `BOUNDARY_WEIGHT`.
const TAIL_EDGE_THRESHOLD: f64 = 0.02;

const BOUNDARY_WEIGHT: f64 = 3.0;
const DEEP_TAIL_WEIGHT: f64 = 5.0;

/// Build the weighted training set for `region`.
///
/// Fails with `InsufficientSamples` when fewer than `config.num_vars()` points survive
/// clipping, deduplication and restriction.
pub fn generate_samples(region: Region, config: &RegionConfig) -> Result<WeightedSampleSet, FitError> {
    config.validate()?;

    let xs = match region {
        Region::Central => central_probabilities(config)?,
        Region::Tail => tail_probabilities(config)?,
    };

    let required = config.num_vars();
    if xs.len() < required {
        return Err(FitError::InsufficientSamples {
            region,
            available: xs.len(),
            required,
        });
    }

    // Order-preserving parallel map: the set is identical to a sequential build.
    let points = xs
        .par_iter()
        .map(|&x| {
            Ok(SamplePoint {
                x,
                abscissa: region.abscissa(x),
                z: standard_normal_quantile(x)?,
            })
        })
        .collect::<Result<Vec<_>, FitError>>()?;
    let weights = xs.iter().map(|&x| sample_weight(region, x)).collect();

    Ok(WeightedSampleSet {
        region,
        points,
        weights,
    })
}

/// Importance weight of a training point.
pub fn sample_weight(region: Region, x: f64) -> f64 {
    match region {
        Region::Central => {
            let boundary_dist = (x - X_LOW).min(X_HIGH - x);
            if boundary_dist < CENTRAL_BOUNDARY_BAND {
                BOUNDARY_WEIGHT
            } else {
                1.0
            }
        }
        Region::Tail => {
            let mut w = 1.0;
            if x < TAIL_DEEP_THRESHOLD {
                w *= DEEP_TAIL_WEIGHT;
            }
            if x > TAIL_EDGE_THRESHOLD {
                w *= BOUNDARY_WEIGHT;
            }
            w
        }
    }
}

fn central_probabilities(config: &RegionConfig) -> Result<Vec<f64>, FitError> {
    let mut xs = linspace(CENTRAL_SWEEP.0, CENTRAL_SWEEP.1, config.primary_samples)?;
    if config.boundary_samples > 0 {
        xs.extend(linspace(CENTRAL_LOW_BRACKET.0, CENTRAL_LOW_BRACKET.1, config.boundary_samples)?);
        xs.extend(linspace(CENTRAL_HIGH_BRACKET.0, CENTRAL_HIGH_BRACKET.1, config.boundary_samples)?);
    }

    let mut xs = clip_unique(xs, CENTRAL_CLIP.0, CENTRAL_CLIP.1);
    xs.retain(|&x| Region::Central.contains(x));
    Ok(xs)
}

fn tail_probabilities(config: &RegionConfig) -> Result<Vec<f64>, FitError> {
    let mut xs = log_space(TAIL_MIN_PROBABILITY, X_LOW / 10.0, config.primary_samples)?;
    if config.boundary_samples > 0 {
        xs.extend(linspace(TAIL_LINEAR_START, X_LOW, config.boundary_samples)?);
    }

    Ok(clip_unique(xs, TAIL_MIN_PROBABILITY, X_LOW))
}

/// Clamp into `[lo, hi]`, sort ascending and drop exact duplicates.
fn clip_unique(xs: Vec<f64>, lo: f64, hi: f64) -> Vec<f64> {
    let mut out: Vec<f64> = xs.into_iter().map(|x| x.clamp(lo, hi)).collect();
    out.sort_by(f64::total_cmp);
    out.dedup();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strictly_increasing(set: &WeightedSampleSet) -> bool {
        set.points.windows(2).all(|w| w[1].x > w[0].x)
    }

    #[test]
    fn central_set_matches_reference_layout() {
        let set = generate_samples(Region::Central, &RegionConfig::central()).unwrap();
        assert_eq!(set.region, Region::Central);
        assert_eq!(set.len(), 776);
        assert_eq!(set.weights.len(), set.len());
        assert!(strictly_increasing(&set));
        assert!(set.points.iter().all(|p| (X_LOW..=X_HIGH).contains(&p.x)));

        let boosted = set.weights.iter().filter(|&&w| w == 3.0).count();
        assert_eq!(boosted, 32);
        assert!(set.weights.iter().all(|&w| w == 1.0 || w == 3.0));
    }

    #[test]
    fn tail_set_matches_reference_layout() {
        let set = generate_samples(Region::Tail, &RegionConfig::tail()).unwrap();
        assert_eq!(set.len(), 200);
        assert!(strictly_increasing(&set));
        assert_eq!(set.points[0].x, 1e-16);
        assert_eq!(set.points[set.len() - 1].x, X_LOW);

        let deep = set.weights.iter().filter(|&&w| w == 5.0).count();
        let edge = set.weights.iter().filter(|&&w| w == 3.0).count();
        assert_eq!(deep, 30);
        assert_eq!(edge, 19);
    }

    #[test]
    fn targets_come_from_exact_quantile() {
        for region in Region::ALL {
            let set = generate_samples(region, &RegionConfig::for_region(region)).unwrap();
            for p in set.points.iter().step_by(17) {
                assert_eq!(p.z, standard_normal_quantile(p.x).unwrap());
                assert_eq!(p.abscissa, region.abscissa(p.x));
            }
        }
    }

    #[test]
    fn central_weights_boost_both_edges() {
        assert_eq!(sample_weight(Region::Central, X_LOW + 0.005), 3.0);
        assert_eq!(sample_weight(Region::Central, X_HIGH - 0.005), 3.0);
        assert_eq!(sample_weight(Region::Central, 0.5), 1.0);
    }

    #[test]
    fn tail_weights_by_threshold() {
        assert_eq!(sample_weight(Region::Tail, 1e-14), 5.0);
        assert_eq!(sample_weight(Region::Tail, 1e-6), 1.0);
        assert_eq!(sample_weight(Region::Tail, 0.021), 3.0);
    }

    #[test]
    fn underdetermined_sets_are_rejected() {
        let config = RegionConfig {
            primary_samples: 4,
            boundary_samples: 0,
            ..RegionConfig::tail()
        };
        let err = generate_samples(Region::Tail, &config).unwrap_err();
        assert_eq!(
            err,
            FitError::InsufficientSamples {
                region: Region::Tail,
                available: 4,
                required: 17
            }
        );

        // Both endpoints of a two-point uniform sweep fall outside the central interval.
        let config = RegionConfig {
            primary_samples: 2,
            boundary_samples: 0,
            ..RegionConfig::central()
        };
        assert!(matches!(
            generate_samples(Region::Central, &config),
            Err(FitError::InsufficientSamples { available: 0, .. })
        ));
    }
}
