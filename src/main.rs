//! Smartphone Addiction Risk - Main Entry Point
//!
//! Generates the synthetic dataset, trains the classifier, prints the test
//! accuracy, saves the model directory and reloads it to check the checksum.
//! Takes no arguments.

mod logic;
pub mod constants;

use anyhow::Context;

use logic::config::PipelineConfig;
use logic::pipeline;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting {} v{}...", constants::APP_NAME, constants::APP_VERSION);

    let config = PipelineConfig::from_env();
    config.validate().context("invalid configuration")?;
    log::info!(
        "Config: {} samples, seed {}, {} epochs, batch {}",
        config.samples,
        config.seed,
        config.training.epochs,
        config.training.batch_size
    );

    let (report, path) = pipeline::run(&config).context("training pipeline failed")?;
    println!("\nTest accuracy: {:.4}", report.test_accuracy);
    report.log_summary();

    let agreed = pipeline::verify_saved(&config.model_dir)
        .with_context(|| format!("saved model at {} failed to reload", path.display()))?;
    log::info!(
        "Reloaded {}: agrees with the rule on {}/{} reference samples",
        path.display(),
        agreed,
        pipeline::reference_samples().len()
    );
    println!("\nModel saved successfully!");

    Ok(())
}
