/*!
 * Applying results, checkpointing and engine reload boundaries.
 */

use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::dataset::LocalizationDataset;
use crate::engine::{Engine, TranslationEngine};
use crate::errors::{DatasetError, EngineError};
use crate::translation::consensus::{CandidateSet, ConsensusSelector};
use crate::translation::tasks::TranslationTask;

/// Tracks applied translations and owns persistence and reload timing
#[derive(Debug, Clone)]
pub struct CheckpointCoordinator {
    output_path: PathBuf,
    /// Global application limit, None for unlimited
    limit: Option<usize>,
    applied_total: usize,
    /// Reload after this many completed sub-batches, None for never
    reload_after: Option<usize>,
    sub_batches_completed: usize,
}

impl CheckpointCoordinator {
    /// Create a coordinator; a limit or reload interval of 0 disables it
    pub fn new<P: AsRef<Path>>(output_path: P, limit: usize, reload_after: usize) -> Self {
        Self {
            output_path: output_path.as_ref().to_path_buf(),
            limit: (limit > 0).then_some(limit),
            applied_total: 0,
            reload_after: (reload_after > 0).then_some(reload_after),
            sub_batches_completed: 0,
        }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn applied_total(&self) -> usize {
        self.applied_total
    }

    pub fn sub_batches_completed(&self) -> usize {
        self.sub_batches_completed
    }

    pub fn limit_reached(&self) -> bool {
        self.limit.is_some_and(|limit| self.applied_total >= limit)
    }

    /// How many more tasks may be scheduled, None when unlimited
    pub fn task_budget(&self) -> Option<usize> {
        self.limit.map(|limit| limit.saturating_sub(self.applied_total))
    }

    /// Select and write the translation of every (task, target) in order
    ///
    /// `candidates` is parallel to `tasks`. Stops as soon as the limit is
    /// reached. Returns the number of values written.
    pub fn apply(
        &mut self,
        dataset: &mut LocalizationDataset,
        tasks: &[TranslationTask],
        candidates: &[CandidateSet],
        selector: &ConsensusSelector,
    ) -> usize {
        let mut applied = 0;

        'tasks: for (task, set) in tasks.iter().zip(candidates) {
            for target in &task.missing_targets {
                if self.limit_reached() {
                    info!("Application limit reached ({})", self.applied_total);
                    break 'tasks;
                }

                let Some(selected) = set
                    .for_target(target)
                    .and_then(|target_candidates| selector.select(target_candidates, target))
                else {
                    continue;
                };

                if dataset.set_text(&task.file_id, &task.key, target, &selected) {
                    debug!("{} / {} [{}] = {}", task.file_id, task.key, target, selected);
                    applied += 1;
                    self.applied_total += 1;
                }
            }
        }

        applied
    }

    /// Rewrite the output file with the current dataset
    pub fn persist(&self, dataset: &LocalizationDataset) -> Result<(), DatasetError> {
        dataset.save(&self.output_path)?;
        info!(
            "Checkpoint saved to {} ({} applied so far)",
            self.output_path.display(),
            self.applied_total
        );
        Ok(())
    }

    /// Count a completed sub-batch and reload the engine on the boundary
    ///
    /// Returns whether a reload happened.
    pub async fn sub_batch_completed<E: TranslationEngine>(
        &mut self,
        engine: &mut Engine<E>,
    ) -> Result<bool, EngineError> {
        self.sub_batches_completed += 1;

        match self.reload_after {
            Some(every) if self.sub_batches_completed % every == 0 => {
                info!("Reloading engine after {} sub-batches", self.sub_batches_completed);
                engine.reload().await?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
