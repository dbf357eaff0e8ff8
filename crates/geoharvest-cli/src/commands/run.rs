//! Run command implementation

use crate::cli::RunArgs;
use crate::dry_run::{display_planned_actions, ActionType, PlannedAction};
use crate::errors;
use crate::output::OutputWriter;
use crate::output_types::RunOutput;
use crate::sink::OutputSink;
use anyhow::Result;
use geoharvest_core::fetch::RetryPolicy;
use geoharvest_core::pipeline::Pipeline;

pub async fn execute(args: RunArgs, output: &OutputWriter, dry_run: bool) -> Result<()> {
    // Resolve configuration layers
    let layered = super::load_layers(&args.layers)?;
    let config = layered.resolve().map_err(|e| errors::from_harvest_error(&e, 0))?;
    let attempts = RetryPolicy::from_config(&config).attempts();
    let url = config.request_url().to_string();

    let sink = OutputSink::from_path(args.output);
    let destination = sink.describe();
    let writes_stdout = sink.is_stdout();

    let pipeline = Pipeline::with_reqwest(config, sink)?;

    if dry_run {
        let normalized = pipeline
            .collect()
            .await
            .map_err(|e| errors::from_harvest_error(&e, attempts))?;
        let summary = normalized.summary;

        let action = if writes_stdout {
            PlannedAction::new(ActionType::WriteStdout, "Print the normalized collection to stdout")
        } else {
            PlannedAction::new(
                ActionType::WriteFile,
                format!("Write the normalized collection to {}", destination),
            )
        };
        let action = action
            .with_detail(format!("Source features: {}", summary.source_features))
            .with_detail(format!("Features to submit: {}", summary.emitted_features))
            .with_detail(format!("Skipped geometries: {}", summary.warning_count()));

        display_planned_actions(output, &[action])?;
        return Ok(());
    }

    let summary = pipeline
        .run()
        .await
        .map_err(|e| errors::from_harvest_error(&e, attempts))?;

    // Stdout already carries the collection; the summary was logged to stderr
    if writes_stdout {
        return Ok(());
    }

    report(output, RunOutput::new(url, destination, summary))
}

fn report(output: &OutputWriter, result: RunOutput) -> Result<()> {
    if output.is_json() {
        return output.result(result);
    }

    output.success(format!(
        "Wrote {} feature(s) to {}",
        result.emitted_features, result.destination
    ));

    output.section("Run Summary");
    output.kv("Source", &result.url);
    output.kv("Source features", result.source_features);
    output.kv("Dropped (no geometry)", result.dropped_without_geometry);
    output.kv("Emitted features", result.emitted_features);

    if !result.warnings.is_empty() {
        output.section("Skipped Geometries");
        for warning in &result.warnings {
            output.warning(warning);
        }
    }

    Ok(())
}
