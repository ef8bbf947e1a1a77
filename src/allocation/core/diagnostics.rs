use std::collections::BTreeMap;
use std::io::IsTerminal;

use serde::Serialize;

use super::config::AllocationConfig;
use super::types::{AllocationOutcome, ContinuousAllocation};

const ANSI_RESET: &str = "\x1b[0m";
const ANSI_DIM: &str = "\x1b[2m";
const ANSI_CYAN: &str = "\x1b[36m";
const DISTINCT_PREVIEW: usize = 10;
const HISTOGRAM_BAR_WIDTH: usize = 48;

#[derive(Debug, Clone, Copy)]
pub struct TraceConfig {
    pub ansi_enabled: bool,
    /// Print empty histogram bins too.
    pub full_histogram: bool,
}

impl TraceConfig {
    pub fn from_env() -> Self {
        Self {
            ansi_enabled: ansi_enabled(),
            full_histogram: env_flag_enabled("ALLOC_FULL_HISTOGRAM"),
        }
    }
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Equal-width bins over `[min, max]`; the last bin is closed on the right.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramSpec {
    pub bins: usize,
    pub min: f64,
    pub max: f64,
}

impl Default for HistogramSpec {
    fn default() -> Self {
        Self {
            bins: 50,
            min: 1.0,
            max: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub spec: HistogramSpec,
    pub counts: Vec<usize>,
    pub below: usize,
    pub above: usize,
}

impl Histogram {
    pub fn build(samples: &[u64], spec: HistogramSpec) -> Self {
        let bins = spec.bins.max(1);
        let width = (spec.max - spec.min) / bins as f64;
        let mut counts = vec![0; bins];
        let mut below = 0;
        let mut above = 0;
        for &s in samples {
            let x = s as f64;
            if x < spec.min {
                below += 1;
            } else if x > spec.max || width <= 0.0 {
                above += 1;
            } else {
                let idx = (((x - spec.min) / width) as usize).min(bins - 1);
                counts[idx] += 1;
            }
        }
        Self {
            spec: HistogramSpec { bins, ..spec },
            counts,
            below,
            above,
        }
    }

    pub fn bin_edges(&self, idx: usize) -> (f64, f64) {
        let width = (self.spec.max - self.spec.min) / self.spec.bins as f64;
        let lo = self.spec.min + width * idx as f64;
        (lo, lo + width)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationSummary {
    pub elements: usize,
    pub sum: u64,
    pub min: u64,
    pub max: u64,
    pub mean: f64,
    /// First distinct values in ascending order with their counts.
    pub distinct: Vec<(u64, usize)>,
    pub distinct_total: usize,
}

impl AllocationSummary {
    pub fn from_samples(samples: &[u64]) -> Self {
        let mut tally: BTreeMap<u64, usize> = BTreeMap::new();
        for &s in samples {
            *tally.entry(s).or_insert(0) += 1;
        }
        let sum: u64 = samples.iter().sum();
        let mean = if samples.is_empty() {
            0.0
        } else {
            sum as f64 / samples.len() as f64
        };
        Self {
            elements: samples.len(),
            sum,
            min: samples.iter().copied().min().unwrap_or(0),
            max: samples.iter().copied().max().unwrap_or(0),
            mean,
            distinct: tally
                .iter()
                .take(DISTINCT_PREVIEW)
                .map(|(&value, &count)| (value, count))
                .collect(),
            distinct_total: tally.len(),
        }
    }
}

/// How far two strategies' answers are apart on the same problem.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationDivergence {
    pub max_continuous_gap: f64,
    pub integer_l1: u64,
    pub differing_elements: usize,
}

impl AllocationDivergence {
    pub fn between(lhs: &AllocationOutcome, rhs: &AllocationOutcome) -> Self {
        Self {
            max_continuous_gap: max_abs_gap(&lhs.continuous, &rhs.continuous),
            integer_l1: lhs
                .samples
                .iter()
                .zip(rhs.samples.iter())
                .map(|(a, b)| a.abs_diff(*b))
                .sum(),
            differing_elements: lhs
                .samples
                .iter()
                .zip(rhs.samples.iter())
                .filter(|(a, b)| a != b)
                .count(),
        }
    }
}

fn max_abs_gap(lhs: &ContinuousAllocation, rhs: &ContinuousAllocation) -> f64 {
    lhs.additional
        .iter()
        .zip(rhs.additional.iter())
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f64::max)
}

/// JSON report written next to the allocation.
#[derive(Debug, Serialize)]
pub struct AllocationReport<'a> {
    pub method: &'static str,
    pub config: &'a AllocationConfig,
    pub solve_secs: f64,
    pub shadow_price: Option<f64>,
    pub iterations: usize,
    pub summary: AllocationSummary,
    pub histogram: Histogram,
}

impl<'a> AllocationReport<'a> {
    pub fn new(
        outcome: &AllocationOutcome,
        config: &'a AllocationConfig,
        spec: HistogramSpec,
    ) -> Self {
        Self {
            method: outcome.method().label(),
            config,
            solve_secs: outcome.solve_secs,
            shadow_price: outcome.continuous.shadow_price,
            iterations: outcome.continuous.iterations,
            summary: AllocationSummary::from_samples(&outcome.samples),
            histogram: Histogram::build(&outcome.samples, spec),
        }
    }
}

pub fn print_allocation_summary(label: &str, summary: &AllocationSummary) {
    println!(
        "[allocate][{}] elements={} sum={} min={} max={} mean={:.4}",
        label, summary.elements, summary.sum, summary.min, summary.max, summary.mean
    );
    let preview = summary
        .distinct
        .iter()
        .map(|(value, count)| format!("{value}:{count}"))
        .collect::<Vec<_>>()
        .join(", ");
    let suffix = if summary.distinct_total > summary.distinct.len() {
        ", ..."
    } else {
        ""
    };
    println!(
        "  distinct values ({}): {}{}",
        summary.distinct_total, preview, suffix
    );
}

pub fn print_histogram(label: &str, histogram: &Histogram, config: TraceConfig) {
    let peak = histogram.counts.iter().copied().max().unwrap_or(0);
    println!(
        "[allocate][{}] histogram over [{}, {}] in {} bins (below={}, above={})",
        label,
        histogram.spec.min,
        histogram.spec.max,
        histogram.spec.bins,
        histogram.below,
        histogram.above
    );
    if peak == 0 {
        println!("  (no samples in range)");
        return;
    }
    for (idx, &count) in histogram.counts.iter().enumerate() {
        if count == 0 && !config.full_histogram {
            continue;
        }
        let (lo, hi) = histogram.bin_edges(idx);
        let width = (count * HISTOGRAM_BAR_WIDTH).div_ceil(peak);
        let bar = colorize(config.ansi_enabled, ANSI_CYAN, &"#".repeat(width));
        let range = colorize(
            config.ansi_enabled,
            ANSI_DIM,
            &format!("[{lo:>7.2}, {hi:>7.2})"),
        );
        println!("  {range} {count:>9} {bar}");
    }
}

pub fn print_divergence(divergence: &AllocationDivergence, elements: usize) {
    println!(
        "[crosscheck] max |m_kkt - m_gradient| = {:.3e}, integer L1 = {}, differing = {}/{}",
        divergence.max_continuous_gap,
        divergence.integer_l1,
        divergence.differing_elements,
        elements
    );
}

fn ansi_enabled() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var("TERM").ok().as_deref() == Some("dumb") {
        return false;
    }
    std::io::stdout().is_terminal()
}

fn colorize(ansi: bool, color: &str, text: &str) -> String {
    if ansi {
        format!("{color}{text}{ANSI_RESET}")
    } else {
        text.to_string()
    }
}

fn env_flag_enabled(name: &str) -> bool {
    std::env::var(name)
        .ok()
        .map(|value| {
            matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            )
        })
        .unwrap_or(false)
}
