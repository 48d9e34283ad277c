use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};
use voicekey_enroll::{CompletionAnalysis, CompletionAnalyzer, ProgressReport};
use voicekey_sample::StoredSample;

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::event::UploadEvent;
use crate::notify::Notification;
use crate::ports::{
    AudioStore, AudioValidator, EmbeddingGenerator, FetchedAudio, Notifier, SampleRepository,
    StatusUpdate,
};
use crate::run::{PipelineRun, Stage};

/// Orchestrates one incoming sample event through the five registration
/// stages.
///
/// Holds read-only configuration and collaborator handles only; safe to
/// share across concurrently processed events. Stages within one run
/// execute strictly sequentially, and a stage failure aborts the rest
/// of that run without affecting sibling runs.
pub struct Pipeline {
    config: PipelineConfig,
    analyzer: CompletionAnalyzer,
    store: Arc<dyn AudioStore>,
    validator: Arc<dyn AudioValidator>,
    embedder: Arc<dyn EmbeddingGenerator>,
    repo: Arc<dyn SampleRepository>,
    notifier: Arc<dyn Notifier>,
}

impl Pipeline {
    pub fn new(
        config: PipelineConfig,
        analyzer: CompletionAnalyzer,
        store: Arc<dyn AudioStore>,
        validator: Arc<dyn AudioValidator>,
        embedder: Arc<dyn EmbeddingGenerator>,
        repo: Arc<dyn SampleRepository>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            analyzer,
            store,
            validator,
            embedder,
            repo,
            notifier,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Processes a single upload event through all five stages.
    ///
    /// Always returns a [`PipelineRun`]; a stage failure marks the run
    /// failed with the failing stage recorded and the remaining stages
    /// unexecuted.
    pub async fn process(&self, event: &UploadEvent) -> PipelineRun {
        info!(bucket = %event.bucket, key = %event.key, "starting pipeline run");
        let mut run = PipelineRun::start(event);

        let user_id = match self.extract_identity(event, &mut run) {
            Ok(user_id) => user_id,
            Err(_) => return self.fail(run),
        };
        run.user_id = Some(user_id.clone());

        let audio = match self.fetch_and_validate(event, &mut run).await {
            Ok(audio) => audio,
            Err(_) => return self.fail(run),
        };

        let sample = match self.generate_embedding(&audio, &mut run).await {
            Ok(sample) => sample,
            Err(_) => return self.fail(run),
        };

        let total = match self.persist_sample(&user_id, sample, &mut run).await {
            Ok(total) => total,
            Err(_) => return self.fail(run),
        };
        run.sample_count = Some(total);

        if self
            .reevaluate_completion(&user_id, &mut run)
            .await
            .is_err()
        {
            return self.fail(run);
        }

        run.finish(true);
        info!(
            user_id = %user_id,
            total_samples = total,
            duration_ms = run.duration_ms,
            "pipeline run completed"
        );
        run
    }

    /// Processes an event, retrying the whole pipeline on failure with
    /// exponential backoff. Individual stages are never retried: stage
    /// side effects must be re-derivable from the same immutable audio
    /// object.
    pub async fn process_with_retry(
        &self,
        event: &UploadEvent,
        max_retries: Option<u32>,
    ) -> PipelineRun {
        let retries = max_retries.unwrap_or(self.config.max_retries);

        let mut run = self.process(event).await;
        let mut attempt: u32 = 0;
        while !run.success && attempt < retries {
            attempt += 1;
            // Exponential backoff: 1s, 2s, 4s, ... capped at 30s.
            let backoff = Duration::from_secs(2u64.saturating_pow(attempt - 1).min(30));
            warn!(
                attempt,
                backoff_secs = backoff.as_secs(),
                key = %event.key,
                "pipeline run failed, retrying"
            );
            sleep(backoff).await;
            run = self.process(event).await;
        }

        if !run.success {
            error!(
                key = %event.key,
                attempts = retries + 1,
                "pipeline run failed after all attempts"
            );
        }
        run
    }

    // -- Stages -------------------------------------------------------------

    fn extract_identity(
        &self,
        event: &UploadEvent,
        run: &mut PipelineRun,
    ) -> Result<String, PipelineError> {
        let started = Utc::now();
        debug!(stage = %Stage::ExtractIdentity, "starting stage");

        match event.user_id(&self.config.trigger_prefix) {
            Ok(user_id) => {
                run.record_success(Stage::ExtractIdentity, started, Some(user_id.clone()));
                Ok(user_id)
            }
            Err(e) => {
                run.record_failure(Stage::ExtractIdentity, started, &e);
                Err(e)
            }
        }
    }

    async fn fetch_and_validate(
        &self,
        event: &UploadEvent,
        run: &mut PipelineRun,
    ) -> Result<FetchedAudio, PipelineError> {
        let started = Utc::now();
        debug!(stage = %Stage::FetchAndValidate, "starting stage");

        let result = async {
            let audio = self
                .with_timeout(Stage::FetchAndValidate, self.store.fetch(&event.key))
                .await?;
            let validation = self
                .with_timeout(
                    Stage::FetchAndValidate,
                    self.validator.validate(&audio.bytes, &audio.metadata),
                )
                .await?;
            if !validation.is_valid {
                return Err(PipelineError::ValidationFailed(validation.issues.join("; ")));
            }
            Ok(audio)
        }
        .await;

        match result {
            Ok(audio) => {
                run.record_success(
                    Stage::FetchAndValidate,
                    started,
                    Some(format!("{} bytes, validation passed", audio.bytes.len())),
                );
                Ok(audio)
            }
            Err(e) => {
                run.record_failure(Stage::FetchAndValidate, started, &e);
                Err(e)
            }
        }
    }

    async fn generate_embedding(
        &self,
        audio: &FetchedAudio,
        run: &mut PipelineRun,
    ) -> Result<StoredSample, PipelineError> {
        let started = Utc::now();
        debug!(stage = %Stage::GenerateEmbedding, "starting stage");

        let result = async {
            let generated = self
                .with_timeout(
                    Stage::GenerateEmbedding,
                    self.embedder.generate(&audio.bytes, &audio.metadata),
                )
                .await?;

            let mut metadata = std::collections::HashMap::new();
            if !audio.metadata.file_name.is_empty() {
                metadata.insert("file_name".to_string(), audio.metadata.file_name.clone());
            }
            metadata.insert("size_bytes".to_string(), audio.bytes.len().to_string());

            let sample = StoredSample::new(generated.embedding, generated.quality, metadata)?;
            Ok(sample)
        }
        .await;

        match result {
            Ok(sample) => {
                run.record_success(
                    Stage::GenerateEmbedding,
                    started,
                    Some(format!(
                        "{} dimensions, quality {:.3}",
                        sample.embedding.dim(),
                        sample.quality
                    )),
                );
                Ok(sample)
            }
            Err(e) => {
                run.record_failure(Stage::GenerateEmbedding, started, &e);
                Err(e)
            }
        }
    }

    async fn persist_sample(
        &self,
        user_id: &str,
        sample: StoredSample,
        run: &mut PipelineRun,
    ) -> Result<usize, PipelineError> {
        let started = Utc::now();
        debug!(stage = %Stage::PersistSample, "starting stage");

        let result = self
            .with_timeout(
                Stage::PersistSample,
                self.repo.append_sample(user_id, sample),
            )
            .await;

        match result {
            Ok(total) => {
                run.record_success(
                    Stage::PersistSample,
                    started,
                    Some(format!("total samples: {total}")),
                );
                Ok(total)
            }
            Err(e) => {
                run.record_failure(Stage::PersistSample, started, &e);
                Err(e)
            }
        }
    }

    async fn reevaluate_completion(
        &self,
        user_id: &str,
        run: &mut PipelineRun,
    ) -> Result<(), PipelineError> {
        let started = Utc::now();
        debug!(stage = %Stage::ReevaluateCompletion, "starting stage");

        match self.reevaluate_inner(user_id).await {
            Ok(analysis) => {
                run.record_success(
                    Stage::ReevaluateCompletion,
                    started,
                    Some(format!(
                        "complete: {}, confidence {:.3}",
                        analysis.is_complete, analysis.completion_confidence
                    )),
                );
                run.completion = Some(analysis);
                Ok(())
            }
            Err(e) => {
                run.record_failure(Stage::ReevaluateCompletion, started, &e);
                Err(e)
            }
        }
    }

    async fn reevaluate_inner(&self, user_id: &str) -> Result<CompletionAnalysis, PipelineError> {
        let samples = self
            .with_timeout(Stage::ReevaluateCompletion, self.repo.get_samples(user_id))
            .await?;
        let analysis = self.analyzer.analyze(&samples);

        let recorded = self
            .with_timeout(Stage::ReevaluateCompletion, self.repo.get_status(user_id))
            .await?;

        if self.analyzer.should_trigger_update(&analysis, &recorded) {
            info!(
                user_id,
                is_complete = analysis.is_complete,
                confidence = analysis.completion_confidence,
                "persisting completion status change"
            );
            let update = StatusUpdate {
                registration_complete: analysis.is_complete,
                completion_confidence: analysis.completion_confidence,
                completed_at: analysis.is_complete.then(Utc::now),
            };
            self.with_timeout(
                Stage::ReevaluateCompletion,
                self.repo.set_status(user_id, update),
            )
            .await?;
        }

        self.notify_best_effort(user_id, &analysis).await;
        Ok(analysis)
    }

    /// Emits the run's notification. Failures and timeouts are logged
    /// and swallowed; they never fail the stage.
    async fn notify_best_effort(&self, user_id: &str, analysis: &CompletionAnalysis) {
        let notification = self.select_notification(user_id, analysis);
        match timeout(
            self.config.collaborator_timeout,
            self.notifier.notify(&notification),
        )
        .await
        {
            Ok(Ok(())) => {
                debug!(user_id, event_type = notification.event_type(), "notification sent");
            }
            Ok(Err(e)) => {
                warn!(
                    user_id,
                    event_type = notification.event_type(),
                    error = %e,
                    "notification delivery failed, continuing"
                );
            }
            Err(_) => {
                warn!(
                    user_id,
                    event_type = notification.event_type(),
                    "notification delivery timed out, continuing"
                );
            }
        }
    }

    fn select_notification(&self, user_id: &str, analysis: &CompletionAnalysis) -> Notification {
        let progress = ProgressReport::from_analysis(analysis);

        if analysis.is_complete {
            Notification::RegistrationCompleted {
                user_id: user_id.to_string(),
                completion_confidence: analysis.completion_confidence,
                registration_score: analysis.registration_score,
                total_samples: progress.samples_collected,
            }
        } else if progress.samples_collected > 0
            && progress.average_quality < self.analyzer.criteria().min_quality_score
        {
            Notification::QualityWarning {
                user_id: user_id.to_string(),
                average_quality: progress.average_quality,
                samples_collected: progress.samples_collected,
                quality_trend: progress.quality_trend,
            }
        } else {
            Notification::SampleRecorded {
                user_id: user_id.to_string(),
                total_samples: progress.samples_collected,
                required_samples: progress.samples_required,
                samples_remaining: progress.samples_remaining,
                completion_percentage: progress.completion_percentage,
            }
        }
    }

    // -- Helpers ------------------------------------------------------------

    fn fail(&self, mut run: PipelineRun) -> PipelineRun {
        run.finish(false);
        if let Some(failed) = run.failed_stage() {
            error!(
                key = %run.key,
                stage = %failed.stage,
                error = failed.error.as_deref().unwrap_or("unknown"),
                "pipeline run failed"
            );
        }
        run
    }

    /// Bounds a collaborator call by the configured timeout; a timeout
    /// is a stage failure.
    async fn with_timeout<T, E>(
        &self,
        stage: Stage,
        fut: impl Future<Output = Result<T, E>>,
    ) -> Result<T, PipelineError>
    where
        PipelineError: From<E>,
    {
        match timeout(self.config.collaborator_timeout, fut).await {
            Ok(result) => result.map_err(PipelineError::from),
            Err(_) => Err(PipelineError::Timeout {
                stage,
                seconds: self.config.collaborator_timeout.as_secs(),
            }),
        }
    }
}
