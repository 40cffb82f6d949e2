use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info};
use std::path::Path;
use std::time::Instant;

use crate::app_config::Config;
use crate::dataset::LocalizationDataset;
use crate::engine::{Engine, TranslationEngine};
use crate::file_utils::FileManager;
use crate::language_utils;
use crate::translation::{
    BatchScheduler, CandidateSet, CheckpointCoordinator, ConsensusSelector, Glossary, RetryLadder,
    TaskCollector, TranslationService, TranslationTask, WorkQueue,
};

// @module: Application controller for dataset translation

/// Counters reported at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Files in the dataset
    pub files: usize,
    /// Tasks collected over all file groups
    pub tasks: usize,
    /// (source, target) texts sent through the service
    pub queued: usize,
    /// Translations written into the dataset
    pub applied: usize,
    /// Sub-batches lost to engine errors
    pub failed_sub_batches: usize,
    /// Engine reloads triggered by the reload interval
    pub reloads: usize,
}

/// Main application controller for dataset translation
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Per sub-batch translation service
    service: TranslationService,
    // @field: Whether to draw a progress bar
    show_progress: bool,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let glossary = Glossary::load(&config.glossary_path);
        Ok(Self::with_glossary(config, glossary))
    }

    /// Create a controller with an explicit glossary
    pub fn with_glossary(config: Config, glossary: Glossary) -> Self {
        let ladder = RetryLadder::new(config.generation.decoding_params(), config.generation.max_retries);
        Self {
            service: TranslationService::new(glossary, ladder),
            config,
            show_progress: true,
        }
    }

    /// Enable or disable the progress bar
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Translate a dataset file and write the result to `output`
    ///
    /// `output` may be a file path or an existing directory; in the latter
    /// case the input file name is kept.
    pub async fn run<E: TranslationEngine>(
        &self,
        input_file: &Path,
        output: &Path,
        engine: &mut Engine<E>,
    ) -> Result<RunSummary> {
        let start_time = Instant::now();

        let mut dataset = LocalizationDataset::load(input_file)
            .with_context(|| format!("Failed to load dataset: {:?}", input_file))?;
        let output_path = FileManager::resolve_output_path(input_file, output);

        info!(
            "Loaded {} file(s) from {:?}, writing to {:?}",
            dataset.file_count(),
            input_file,
            output_path
        );

        let summary = self.run_dataset(&mut dataset, &output_path, engine).await?;

        info!(
            "Done in {:.1}s: {} file(s), {} task(s), {} queued, {} applied, {} failed sub-batch(es), {} reload(s)",
            start_time.elapsed().as_secs_f64(),
            summary.files,
            summary.tasks,
            summary.queued,
            summary.applied,
            summary.failed_sub_batches,
            summary.reloads
        );

        Ok(summary)
    }

    /// Translate an in-memory dataset, checkpointing to `output_path`
    pub async fn run_dataset<E: TranslationEngine>(
        &self,
        dataset: &mut LocalizationDataset,
        output_path: &Path,
        engine: &mut Engine<E>,
    ) -> Result<RunSummary> {
        self.log_languages();

        let batch = &self.config.batch;
        let collector = TaskCollector::new(&self.config.source_languages, &self.config.target_languages);
        let selector = ConsensusSelector::new(self.config.primary_source());
        let mut checkpoint = CheckpointCoordinator::new(output_path, batch.limit, batch.reload_after);
        let mut summary = RunSummary {
            files: dataset.file_count(),
            ..RunSummary::default()
        };

        let groups = dataset.file_groups(batch.file_batch_size);
        let group_count = groups.len();
        let mut persisted = false;

        for (group_index, group) in groups.iter().enumerate() {
            if checkpoint.limit_reached() {
                info!("Limit of {} translation(s) reached, stopping", batch.limit);
                break;
            }

            let tasks = collector.collect(dataset, Some(group.as_slice()));
            if tasks.is_empty() {
                debug!("File group {}/{}: nothing to translate", group_index + 1, group_count);
                if batch.file_batch_size > 0 {
                    checkpoint.persist(dataset)?;
                    persisted = true;
                }
                continue;
            }

            let queues = BatchScheduler::build(&tasks, checkpoint.task_budget());
            let queued = BatchScheduler::queued_count(&queues);
            info!(
                "File group {}/{}: {} file(s), {} task(s), {} text(s) in {} queue(s)",
                group_index + 1,
                group_count,
                group.len(),
                tasks.len(),
                queued,
                queues.len()
            );

            summary.tasks += tasks.len();
            summary.queued += queued;

            let candidates = self
                .execute(&tasks, &queues, engine, &mut checkpoint, &mut summary)
                .await?;

            summary.applied += checkpoint.apply(dataset, &tasks, &candidates, &selector);
            checkpoint.persist(dataset)?;
            persisted = true;
        }

        // The output file always exists after a run
        if !persisted {
            checkpoint.persist(dataset)?;
        }

        Ok(summary)
    }

    /// Run every queue through the service and gather candidates per task
    ///
    /// An engine error loses only the sub-batch it happened in. A failed
    /// engine reload ends the run.
    async fn execute<E: TranslationEngine>(
        &self,
        tasks: &[TranslationTask],
        queues: &[WorkQueue],
        engine: &mut Engine<E>,
        checkpoint: &mut CheckpointCoordinator,
        summary: &mut RunSummary,
    ) -> Result<Vec<CandidateSet>> {
        let mut candidates = vec![CandidateSet::new(); tasks.len()];
        let progress_bar = self.progress_bar(BatchScheduler::queued_count(queues) as u64);

        for queue in queues {
            progress_bar.set_message(format!("{} -> {}", queue.source_language, queue.target_language));

            for sub_batch in queue.sub_batches(self.config.batch.batch_size) {
                let result = self
                    .service
                    .translate_batch(&*engine, sub_batch.texts, &queue.source_language, &queue.target_language)
                    .await;

                match result {
                    Ok(translations) => {
                        for (&task_index, translation) in sub_batch.task_indices.iter().zip(translations) {
                            if let Some(text) = translation {
                                candidates[task_index].insert(&queue.target_language, &queue.source_language, text);
                            }
                        }

                        if checkpoint
                            .sub_batch_completed(engine)
                            .await
                            .context("Engine reload failed")?
                        {
                            summary.reloads += 1;
                        }
                    }
                    Err(e) => {
                        error!(
                            "Sub-batch of {} text(s) {} -> {} failed: {}",
                            sub_batch.texts.len(),
                            queue.source_language,
                            queue.target_language,
                            e
                        );
                        summary.failed_sub_batches += 1;
                    }
                }

                progress_bar.inc(sub_batch.texts.len() as u64);
            }
        }

        progress_bar.finish_and_clear();
        Ok(candidates)
    }

    fn progress_bar(&self, total: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let progress_bar = ProgressBar::new(total);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} texts ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));
        progress_bar
    }

    fn log_languages(&self) {
        let describe = |codes: &[String]| {
            codes
                .iter()
                .map(|code| match language_utils::get_language_name(code) {
                    Ok(name) => format!("{} ({})", code, name),
                    Err(_) => code.clone(),
                })
                .collect::<Vec<_>>()
                .join(", ")
        };

        info!("Sources: {}", describe(&self.config.source_languages));
        info!("Targets: {}", describe(&self.config.target_languages));
    }
}
