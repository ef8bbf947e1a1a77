//! Solves the same variance file with both strategies and reports how far apart they land.
//! Run: cargo run --bin crosscheck

use std::error::Error;

use sample_allocator::allocation::{
    AllocationDivergence, AllocationMethod, allocate_with_method, print_divergence,
};
use sample_allocator::runtime::{RunConfig, load_variance};

fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = RunConfig::from_env()?;
    let cfg = config.allocation;
    cfg.with_method(AllocationMethod::ProjectedGradient).validate()?;
    let variance = load_variance(&config.variance_path, cfg.element_count)?;

    let kkt = allocate_with_method(&variance, &cfg, AllocationMethod::Kkt)?;
    let gradient = allocate_with_method(&variance, &cfg, AllocationMethod::ProjectedGradient)?;
    for outcome in [&kkt, &gradient] {
        tracing::info!(
            method = outcome.method().label(),
            solve_secs = outcome.solve_secs,
            iterations = outcome.continuous.iterations,
            "strategy finished"
        );
    }

    let divergence = AllocationDivergence::between(&kkt, &gradient);
    print_divergence(&divergence, cfg.element_count);
    if divergence.integer_l1 > 0 {
        tracing::warn!(
            integer_l1 = divergence.integer_l1,
            learning_rate = cfg.gradient.learning_rate,
            gradient_iters = cfg.gradient.iterations,
            "strategies disagree after rounding; the gradient run may need more iterations"
        );
    }

    if let Some(path) = &config.summary_path {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(file), &divergence)?;
        tracing::info!(summary = %path.display(), "wrote divergence report");
    }

    Ok(())
}
