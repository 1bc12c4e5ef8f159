//! Seeded sampling of weeks since inspection.
//!
//! Draws weeks from a regime's time share and reads off the effort at each
//! sampled week, so "a typical year" can be shown as a grid of dots and the
//! implied effort distribution as a histogram. The same seed always yields
//! the same draws.

use nhi_config::SamplingParams;
use nhi_math::quantile;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::mechanism::{MechanismModel, Predictability, RegimeProfile};

/// Draw `n` week indices from the distribution `pi` by inverse CDF.
///
/// Returns an empty vector when `pi` has no positive mass.
pub fn sample_weeks<R: Rng + ?Sized>(pi: &[f64], n: usize, rng: &mut R) -> Vec<usize> {
    let mut cdf = Vec::with_capacity(pi.len());
    let mut total = 0.0;
    for p in pi {
        if p.is_finite() && *p > 0.0 {
            total += p;
        }
        cdf.push(total);
    }
    if total <= 0.0 {
        return Vec::new();
    }

    let last = pi.len() - 1;
    (0..n)
        .map(|_| {
            let u = rng.random::<f64>() * total;
            cdf.partition_point(|c| *c <= u).min(last)
        })
        .collect()
}

/// Three-way effort classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffortLevel {
    Low,
    Medium,
    High,
}

impl EffortLevel {
    pub fn label(self) -> &'static str {
        match self {
            EffortLevel::Low => "Low",
            EffortLevel::Medium => "Medium",
            EffortLevel::High => "High",
        }
    }
}

/// Quantile cut points separating low, medium and high effort.
///
/// Bins are `(-inf, low_cut]`, `(low_cut, high_cut]`, `(high_cut, inf)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffortBins {
    pub low_cut: f64,
    pub high_cut: f64,
}

impl EffortBins {
    /// Cut points at quantiles `[q1, q2]` of `samples`.
    pub fn from_samples(samples: &[f64], quantiles: [f64; 2]) -> Self {
        EffortBins {
            low_cut: quantile(samples, quantiles[0]),
            high_cut: quantile(samples, quantiles[1]),
        }
    }

    pub fn classify(&self, effort: f64) -> EffortLevel {
        if effort <= self.low_cut {
            EffortLevel::Low
        } else if effort <= self.high_cut {
            EffortLevel::Medium
        } else {
            EffortLevel::High
        }
    }
}

/// One sampled week placed on the dot grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dot {
    pub x: usize,
    pub y: usize,
    pub week: usize,
    pub effort: f64,
    pub level: EffortLevel,
}

/// Grid position of the `index`-th of `n` dots with `columns` per row.
///
/// Rows are counted from the bottom, so the first dot lands top-left.
pub fn grid_position(index: usize, n: usize, columns: usize) -> (usize, usize) {
    let columns = columns.max(1);
    let rows = n.div_ceil(columns);
    let x = index % columns;
    let y = rows.saturating_sub(1).saturating_sub(index / columns);
    (x, y)
}

/// Equal-width histogram bin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Histogram of `samples` over `[min, max]` with `bins` equal-width bins.
///
/// The last bin is closed on the right. A zero-width range puts every
/// sample into the first bin.
pub fn histogram(samples: &[f64], min: f64, max: f64, bins: usize) -> Vec<HistogramBin> {
    let bins = bins.max(1);
    let width = (max - min) / bins as f64;
    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: min + width * i as f64,
            upper: min + width * (i + 1) as f64,
            count: 0,
        })
        .collect();

    for s in samples.iter().filter(|s| s.is_finite()) {
        let idx = if width > 0.0 {
            (((s - min) / width).floor().max(0.0) as usize).min(bins - 1)
        } else {
            0
        };
        out[idx].count += 1;
    }
    out
}

/// Sampling options, usually taken from [`SamplingParams`].
#[derive(Debug, Clone, PartialEq)]
pub struct SampleOptions {
    pub seed: u64,
    pub dots: usize,
    pub columns: usize,
    pub histogram_samples: usize,
    pub histogram_bins: usize,
    pub quantiles: [f64; 2],
}

impl From<&SamplingParams> for SampleOptions {
    fn from(params: &SamplingParams) -> Self {
        SampleOptions {
            seed: params.seed,
            dots: params.dots_per_regime,
            columns: params.grid_columns,
            histogram_samples: params.histogram_samples,
            histogram_bins: params.histogram_bins,
            quantiles: params.effort_bin_quantiles,
        }
    }
}

impl Default for SampleOptions {
    fn default() -> Self {
        SampleOptions::from(&SamplingParams::default())
    }
}

/// Samples drawn for one regime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeSample {
    pub predictability: Predictability,
    /// Model (time-share weighted) average effort.
    pub average_effort: f64,
    /// Mean effort over the sampled dots.
    pub sample_mean_effort: f64,
    pub dots: Vec<Dot>,
    pub histogram: Vec<HistogramBin>,
}

/// Dots and histograms for a regime and the fully random benchmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleReport {
    pub seed: u64,
    pub bins: EffortBins,
    pub selected: RegimeSample,
    pub random: RegimeSample,
}

fn effort_at(profile: &RegimeProfile, week: usize) -> f64 {
    profile
        .effort
        .get(week)
        .or(profile.effort.last())
        .copied()
        .unwrap_or(0.0)
}

fn draw_efforts(profile: &RegimeProfile, n: usize, rng: &mut StdRng) -> (Vec<usize>, Vec<f64>) {
    let weeks = sample_weeks(&profile.time_share, n, rng);
    let efforts = weeks.iter().map(|w| effort_at(profile, *w)).collect();
    (weeks, efforts)
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample weeks for predictability `p` and the random benchmark.
///
/// Draw order is fixed: dots for `p`, dots for random, then the histogram
/// samples in the same order.
pub fn draw_samples(model: &MechanismModel, p: Predictability, options: &SampleOptions) -> SampleReport {
    let outcome = model.evaluate(p);
    let mut rng = StdRng::seed_from_u64(options.seed);

    let (sel_weeks, sel_effort) = draw_efforts(&outcome.profile, options.dots, &mut rng);
    let (rnd_weeks, rnd_effort) = draw_efforts(&outcome.benchmark, options.dots, &mut rng);

    let pooled: Vec<f64> = sel_effort.iter().chain(&rnd_effort).copied().collect();
    let bins = EffortBins::from_samples(&pooled, options.quantiles);

    let (_, sel_hist) = draw_efforts(&outcome.profile, options.histogram_samples, &mut rng);
    let (_, rnd_hist) = draw_efforts(&outcome.benchmark, options.histogram_samples, &mut rng);
    let (lo, hi) = sel_hist
        .iter()
        .chain(&rnd_hist)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
    let (lo, hi) = if lo.is_finite() { (lo, hi) } else { (0.0, 0.0) };

    let regime_sample = |profile: &RegimeProfile, weeks: &[usize], efforts: &[f64], hist: &[f64]| {
        let dots = weeks
            .iter()
            .zip(efforts)
            .enumerate()
            .map(|(i, (week, effort))| {
                let (x, y) = grid_position(i, weeks.len(), options.columns);
                Dot {
                    x,
                    y,
                    week: *week,
                    effort: *effort,
                    level: bins.classify(*effort),
                }
            })
            .collect();
        RegimeSample {
            predictability: Predictability::RANDOM,
            average_effort: profile.average_effort,
            sample_mean_effort: mean(efforts),
            dots,
            histogram: histogram(hist, lo, hi, options.histogram_bins),
        }
    };

    let mut selected = regime_sample(&outcome.profile, &sel_weeks, &sel_effort, &sel_hist);
    selected.predictability = p;
    let random = regime_sample(&outcome.benchmark, &rnd_weeks, &rnd_effort, &rnd_hist);

    SampleReport {
        seed: options.seed,
        bins,
        selected,
        random,
    }
}
