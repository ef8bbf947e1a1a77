use std::error::Error;

use sample_allocator::allocation::{
    AllocationSummary, Histogram, TraceConfig, allocate, print_allocation_summary,
    print_histogram,
};
use sample_allocator::runtime::{RunConfig, load_variance, save_allocation, save_report};

fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = RunConfig::from_env()?;
    let cfg = config.allocation;
    tracing::info!(
        method = cfg.method.label(),
        elements = cfg.element_count,
        n_min = cfg.budget.n_min,
        ssp = cfg.budget.ssp,
        lambda0 = cfg.penalty.lambda0,
        variance = %config.variance_path.display(),
        "loading variance"
    );

    let variance = load_variance(&config.variance_path, cfg.element_count)?;
    let outcome = allocate(&variance, &cfg)?;
    tracing::info!(
        method = cfg.method.label(),
        solve_secs = outcome.solve_secs,
        shadow_price = ?outcome.continuous.shadow_price,
        iterations = outcome.continuous.iterations,
        total = outcome.total,
        "allocation solved"
    );

    save_allocation(&config.output_path, &outcome.samples)?;
    tracing::info!(output = %config.output_path.display(), "wrote allocation");

    let label = cfg.method.label();
    let trace = TraceConfig::from_env();
    print_allocation_summary(label, &AllocationSummary::from_samples(&outcome.samples));
    print_histogram(
        label,
        &Histogram::build(&outcome.samples, config.histogram),
        trace,
    );

    if let Some(path) = &config.summary_path {
        save_report(path, &outcome, &cfg, config.histogram)?;
        tracing::info!(summary = %path.display(), "wrote summary report");
    }

    Ok(())
}
