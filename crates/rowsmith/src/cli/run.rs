//! Batch execution command handler.

use super::RunArgs;
use rowsmith::{
    BatchCoordinator, BatchError, BatchSummary, HttpGenerator, IoError, IoErrorKind, RowResult,
    RowsmithConfig, RowsmithResult, read_rows,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Serialize)]
struct RunReport<'a> {
    summary: &'a BatchSummary,
    results: &'a [RowResult],
}

/// Execute a batch and write its report.
///
/// # Errors
///
/// Returns an error if inputs cannot be read, the batch is rejected, or the
/// report cannot be written. Row failures are part of the report, not errors.
pub async fn run_batch(args: RunArgs, config: RowsmithConfig) -> RowsmithResult<()> {
    let template = match (&args.template, &args.template_file) {
        (Some(template), _) => template.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .map_err(|e| IoError::read(path.display().to_string(), e))?,
        (None, None) => return Err(BatchError::validation("a template is required").into()),
    };
    let rows = read_rows(&args.rows)?;

    let mut batch = config.batch;
    if let Some(concurrency) = args.concurrency {
        batch = batch.with_concurrency(concurrency);
    }
    if let Some(max_retries) = args.max_retries {
        batch = batch.with_max_retries(max_retries);
    }

    let mut generator = HttpGenerator::new(args.endpoint);
    if let Some(key) = args.api_key {
        generator = generator.with_api_key(key);
    }

    let coordinator = BatchCoordinator::new(batch, Arc::new(generator))?.with_progress(|p| {
        info!(
            processed = *p.processed(),
            total = *p.total(),
            percent = p.percent(),
            "Progress"
        );
    });

    let handle = coordinator.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, finishing in-flight rows");
            handle.cancel();
        }
    });

    let summary = coordinator.start(&template, rows).await?;
    let results = coordinator.results();
    info!(
        status = %summary.status(),
        succeeded = *summary.stats().succeeded(),
        failed = *summary.stats().failed(),
        "Batch finished"
    );

    let report = RunReport {
        summary: &summary,
        results: &results,
    };
    let json = serde_json::to_string_pretty(&report)
        .map_err(|e| IoError::new(IoErrorKind::Encode(e.to_string())))?;

    match &args.output {
        Some(path) => std::fs::write(path, json)
            .map_err(|e| IoError::write(path.display().to_string(), e))?,
        None => println!("{json}"),
    }
    Ok(())
}
