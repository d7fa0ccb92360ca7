//! Command implementations for the CLI

use crate::{
    cli::Command,
    config::Config,
    core::{
        extract::QuestionExtractor, generator::SubmissionGenerator,
        metrics::MetricsCalculator, validator::SubmissionValidator,
    },
};
use anyhow::Context;
use tracing::{info, instrument};

/// Execute the appropriate command based on CLI arguments
#[instrument(skip(config))]
pub fn execute_command(config: &Config, command: &Command) -> anyhow::Result<()> {
    match command {
        Command::ParseTrain { .. } => execute_parse_train_command(config),
        Command::GenerateSubmission { .. } => execute_generate_command(config),
        Command::ValidateSubmission { .. } => execute_validate_command(config),
        Command::CalculateMetrics { .. } => execute_metrics_command(config),
    }
}

/// Execute the parse-train command
#[instrument(skip(config))]
fn execute_parse_train_command(config: &Config) -> anyhow::Result<()> {
    info!(
        "Extracting questions from: {}",
        config.extraction.input.display()
    );

    let extractor = QuestionExtractor::new(config.clone());
    let written = extractor.extract().context("Failed to extract questions")?;

    info!("Wrote {} questions to {}", written, config.extraction.output.display());
    Ok(())
}

/// Execute the generate-submission command
#[instrument(skip(config))]
fn execute_generate_command(config: &Config) -> anyhow::Result<()> {
    info!(
        "Generating submission with {} examples per question...",
        config.generation.num_examples
    );

    let generator = SubmissionGenerator::new(config.clone());
    let summary = generator
        .generate()
        .context("Failed to generate submission")?;

    info!("{}", summary);
    Ok(())
}

/// Execute the validate-submission command
#[instrument(skip(config))]
fn execute_validate_command(config: &Config) -> anyhow::Result<()> {
    let validator = SubmissionValidator::new(config.clone());
    let report = validator.run_all_validations();

    println!("{}", report);

    if !report.is_valid() {
        anyhow::bail!(
            "Submission {} failed validation",
            config.validation.submission_file.display()
        );
    }

    info!("Submission is valid");
    Ok(())
}

/// Execute the calculate-metrics command
#[instrument(skip(config))]
fn execute_metrics_command(config: &Config) -> anyhow::Result<()> {
    let calculator = MetricsCalculator::new(config.clone());
    let report = calculator
        .calculate()
        .context("Failed to calculate metrics")?;

    println!("{}", report);

    let shown = report.worst_errors(config.metrics.show_errors);
    if !shown.is_empty() {
        println!();
        println!("Worst {} of {} errors:", shown.len(), report.errors.len());
        for error in shown {
            println!("{}", error);
        }
    }

    Ok(())
}
