use tracing::{debug, error, info, warn};

use crate::cancel::CancelFlag;
use crate::model::DeleteOutcome;
use crate::progress::ProgressReporter;
use crate::provider::FilesystemProvider;

/// Only the first few failed paths make it into the summary log.
const FAILURE_LOG_LIMIT: usize = 10;

/// Removes the given paths in order, one provider call per file.
///
/// A failed removal is logged, recorded in the outcome's failure list, and
/// never stops the batch. The cancel flag is checked between files; paths not
/// reached count as neither attempted nor deleted.
pub fn delete_files(
    fs: &dyn FilesystemProvider,
    paths: &[String],
    reporter: &dyn ProgressReporter,
    cancel: &CancelFlag,
) -> DeleteOutcome {
    let total = paths.len();
    let mut outcome = DeleteOutcome::default();

    if total == 0 {
        info!("no files provided for deletion");
        return outcome;
    }

    info!(count = total, "attempting to delete marked files");
    reporter.on_delete_start(total);

    for (index, path) in paths.iter().enumerate() {
        if cancel.is_cancelled() {
            warn!(
                attempted = outcome.attempted,
                total, "deletion cancelled, remaining files untouched"
            );
            break;
        }
        let cloud_path = path.replace('\\', "/");
        reporter.on_delete_progress(index + 1, total, &cloud_path);
        outcome.attempted += 1;

        match fs.remove(&cloud_path) {
            Ok(()) => {
                outcome.deleted += 1;
                debug!(path = %cloud_path, "deleted");
            }
            Err(err) => {
                error!(path = %cloud_path, error = %err, "error deleting file");
                outcome.failures.push(cloud_path);
            }
        }
    }

    info!(
        deleted = outcome.deleted,
        attempted = outcome.attempted,
        "deletion complete"
    );
    if !outcome.failures.is_empty() {
        warn!(count = outcome.failures.len(), "failed to delete files:");
        for failed in outcome.failures.iter().take(FAILURE_LOG_LIMIT) {
            warn!("  - {failed}");
        }
        if outcome.failures.len() > FAILURE_LOG_LIMIT {
            warn!("  ... and {} more", outcome.failures.len() - FAILURE_LOG_LIMIT);
        }
    }

    reporter.on_delete_complete(outcome.deleted, outcome.attempted);
    outcome
}
