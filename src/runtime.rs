use std::fmt;
use std::fs;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::allocation::{
    AllocationConfig, AllocationError, AllocationMethod, AllocationOutcome, AllocationReport,
    BudgetParams, DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH, GradientConfig, HistogramSpec,
    KktConfig, PenaltyParams,
};

pub const DEFAULT_VARIANCE_PATH: &str = "variance.txt";
pub const DEFAULT_KKT_OUTPUT_PATH: &str = "optimal_n_kkt.txt";
pub const DEFAULT_GRADIENT_OUTPUT_PATH: &str = "optimal_n_diff_penalty_int.txt";

#[derive(Debug)]
pub enum RuntimeError {
    InvalidEnvValue { name: &'static str, value: String },
    Io(std::io::Error),
    Json(serde_json::Error),
    Parse { line: usize, token: String },
    Allocation(AllocationError),
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEnvValue { name, value } => write!(f, "invalid env var {name}={value}"),
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::Json(err) => write!(f, "json error: {err}"),
            Self::Parse { line, token } => {
                write!(f, "line {line}: cannot parse {token:?} as a number")
            }
            Self::Allocation(err) => write!(f, "allocation failed: {err}"),
        }
    }
}

impl std::error::Error for RuntimeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Allocation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for RuntimeError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for RuntimeError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<AllocationError> for RuntimeError {
    fn from(value: AllocationError) -> Self {
        Self::Allocation(value)
    }
}

/// Everything a binary needs for one run: solver settings plus file locations.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub allocation: AllocationConfig,
    pub variance_path: PathBuf,
    pub output_path: PathBuf,
    pub summary_path: Option<PathBuf>,
    pub histogram: HistogramSpec,
}

impl RunConfig {
    pub fn from_env() -> Result<Self, RuntimeError> {
        let defaults = AllocationConfig::default();

        let method = match std::env::var("ALLOC_METHOD").ok() {
            None => defaults.method,
            Some(raw) => {
                AllocationMethod::parse(&raw).ok_or_else(|| RuntimeError::InvalidEnvValue {
                    name: "ALLOC_METHOD",
                    value: raw,
                })?
            }
        };

        let width = parse_env("GRID_WIDTH", DEFAULT_GRID_WIDTH)?;
        let height = parse_env("GRID_HEIGHT", DEFAULT_GRID_HEIGHT)?;

        let allocation = AllocationConfig {
            element_count: grid_elements(width, height)?,
            penalty: PenaltyParams {
                lambda0: parse_env_finite("LAMBDA0", defaults.penalty.lambda0)?,
                eps: parse_env_finite("PENALTY_EPS", defaults.penalty.eps)?,
            },
            budget: BudgetParams {
                n_min: parse_env("N_MIN", defaults.budget.n_min)?,
                ssp: parse_env("SSP", defaults.budget.ssp)?,
            },
            method,
            kkt: KktConfig {
                iterations: parse_env("BISECTION_ITERS", defaults.kkt.iterations)?,
                ..defaults.kkt
            },
            gradient: GradientConfig {
                learning_rate: parse_env_finite("GRADIENT_LR", defaults.gradient.learning_rate)?,
                iterations: parse_env("GRADIENT_ITERS", defaults.gradient.iterations)?,
            },
        };
        allocation.validate()?;

        let default_histogram = HistogramSpec::default();
        let histogram = HistogramSpec {
            bins: parse_env("HISTOGRAM_BINS", default_histogram.bins)?,
            min: parse_env_finite("HISTOGRAM_MIN", default_histogram.min)?,
            max: parse_env_finite("HISTOGRAM_MAX", default_histogram.max)?,
        };

        Ok(Self {
            allocation,
            variance_path: env_path("VARIANCE_PATH")
                .unwrap_or_else(|| PathBuf::from(DEFAULT_VARIANCE_PATH)),
            output_path: env_path("OUTPUT_PATH")
                .unwrap_or_else(|| PathBuf::from(default_output_path(method))),
            summary_path: env_path("SUMMARY_PATH"),
            histogram,
        })
    }
}

pub fn default_output_path(method: AllocationMethod) -> &'static str {
    match method {
        AllocationMethod::Kkt => DEFAULT_KKT_OUTPUT_PATH,
        AllocationMethod::ProjectedGradient => DEFAULT_GRADIENT_OUTPUT_PATH,
    }
}

fn env_path(name: &'static str) -> Option<PathBuf> {
    std::env::var(name)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
        .map(PathBuf::from)
}

fn grid_elements(width: usize, height: usize) -> Result<usize, RuntimeError> {
    width
        .checked_mul(height)
        .ok_or_else(|| RuntimeError::InvalidEnvValue {
            name: "GRID_WIDTH",
            value: format!("{width} (grid {width}x{height} overflows)"),
        })
}

fn parse_env<T: FromStr>(name: &'static str, default: T) -> Result<T, RuntimeError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| RuntimeError::InvalidEnvValue { name, value: raw }),
        Err(_) => Ok(default),
    }
}

fn parse_env_finite(name: &'static str, default: f64) -> Result<f64, RuntimeError> {
    let value = parse_env(name, default)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(RuntimeError::InvalidEnvValue {
            name,
            value: value.to_string(),
        })
    }
}

/// Parse whitespace-separated reals, any number per line. Blank lines are skipped.
pub fn parse_variance<R: BufRead>(reader: R) -> Result<Vec<f64>, RuntimeError> {
    let mut values = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        for token in line.split_whitespace() {
            let value = token.parse::<f64>().map_err(|_| RuntimeError::Parse {
                line: idx + 1,
                token: token.to_string(),
            })?;
            values.push(value);
        }
    }
    Ok(values)
}

/// Load the variance vector and check it has exactly `expected` entries.
pub fn load_variance(path: &Path, expected: usize) -> Result<Vec<f64>, RuntimeError> {
    let file = fs::File::open(path)?;
    let values = parse_variance(BufReader::new(file))?;
    if values.len() != expected {
        return Err(AllocationError::InputShape {
            expected,
            actual: values.len(),
        }
        .into());
    }
    Ok(values)
}

/// One integer per line.
pub fn write_allocation<W: Write>(writer: W, samples: &[u64]) -> Result<(), RuntimeError> {
    let mut writer = BufWriter::new(writer);
    for s in samples {
        writeln!(writer, "{s}")?;
    }
    writer.flush()?;
    Ok(())
}

pub fn save_allocation(path: &Path, samples: &[u64]) -> Result<(), RuntimeError> {
    write_allocation(fs::File::create(path)?, samples)
}

pub fn save_report(
    path: &Path,
    outcome: &AllocationOutcome,
    config: &AllocationConfig,
    histogram: HistogramSpec,
) -> Result<(), RuntimeError> {
    let report = AllocationReport::new(outcome, config, histogram);
    let file = fs::File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), &report)?;
    Ok(())
}
