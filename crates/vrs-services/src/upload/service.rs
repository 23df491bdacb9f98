use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use std::sync::Arc;
use vrs_core::validation::{
    check_content_types, check_duplicate, check_file_sizes, check_files_selected,
    validate_chassis_id,
};
use vrs_core::{
    DuplicatePolicy, ImageData, ImageRecord, IntakeConfig, IntakeError, UploadBatch,
    UploadStrategy, ValidationError,
};

use super::traits::{GatewayRequest, MediaGateway};
use super::types::{PendingFile, Submission};
use crate::batch_store::find_by_chassis_id;

/// Turns a [`Submission`] into an [`UploadBatch`], or explains why it cannot.
///
/// The orchestrator never persists; the caller appends the returned batch.
#[derive(Clone)]
pub struct UploadOrchestrator {
    strategy: UploadStrategy,
    gateway: Option<Arc<dyn MediaGateway>>,
    duplicate_policy: DuplicatePolicy,
    max_file_size_bytes: usize,
    upload_folder: String,
}

impl UploadOrchestrator {
    /// Fails when the gateway strategy is configured without a gateway.
    pub fn new(config: &IntakeConfig, gateway: Option<Arc<dyn MediaGateway>>) -> Result<Self, IntakeError> {
        if config.upload_strategy == UploadStrategy::Gateway && gateway.is_none() {
            return Err(IntakeError::Internal(
                "gateway upload strategy requires a media gateway".to_string(),
            ));
        }

        Ok(Self {
            strategy: config.upload_strategy,
            gateway,
            duplicate_policy: config.duplicate_policy,
            max_file_size_bytes: config.max_file_size_bytes,
            upload_folder: config.upload_folder.clone(),
        })
    }

    pub fn strategy(&self) -> UploadStrategy {
        self.strategy
    }

    pub async fn submit(
        &self,
        submission: &Submission,
        existing: &[UploadBatch],
    ) -> Result<UploadBatch, IntakeError> {
        self.submit_at(submission, existing, Utc::now()).await
    }

    #[tracing::instrument(
        skip(self, submission, existing, now),
        fields(
            station = %submission.station_id,
            chassis_id = %submission.chassis_id,
            files = submission.files.len(),
            strategy = %self.strategy,
        )
    )]
    pub async fn submit_at(
        &self,
        submission: &Submission,
        existing: &[UploadBatch],
        now: DateTime<Utc>,
    ) -> Result<UploadBatch, IntakeError> {
        if let Err(e) = self.validate(submission, existing) {
            tracing::debug!(error = %e, code = e.error_code(), "Submission rejected");
            return Err(e.into());
        }

        let start = std::time::Instant::now();
        let images = match self.strategy {
            UploadStrategy::Gateway => self.upload_sequentially(submission, now).await?,
            UploadStrategy::Inline => encode_inline(&submission.files).await?,
        };

        let batch = UploadBatch::new(
            submission.chassis_id.clone(),
            submission.station_id.clone(),
            images,
            now,
        );

        tracing::info!(
            file_count = batch.file_count,
            size_bytes = batch.total_size(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Submission uploaded"
        );

        Ok(batch)
    }

    /// Checks run in order and the first failure wins.
    fn validate(&self, submission: &Submission, existing: &[UploadBatch]) -> Result<(), ValidationError> {
        validate_chassis_id(&submission.chassis_id)?;
        check_files_selected(submission.files.len())?;

        if self.strategy == UploadStrategy::Gateway {
            check_file_sizes(
                submission.files.iter().map(|f| f.size),
                self.max_file_size_bytes,
            )?;
        }

        check_content_types(
            submission
                .files
                .iter()
                .map(|f| (f.name.as_str(), f.content_type.as_str())),
        )?;

        let already_recorded = find_by_chassis_id(existing, &submission.chassis_id).is_some();
        check_duplicate(&submission.chassis_id, already_recorded, self.duplicate_policy)
    }

    /// Upload files one at a time in selection order. The first failure aborts.
    async fn upload_sequentially(
        &self,
        submission: &Submission,
        now: DateTime<Utc>,
    ) -> Result<Vec<ImageRecord>, IntakeError> {
        let gateway = self.gateway.as_ref().ok_or_else(|| {
            IntakeError::Internal("gateway upload strategy requires a media gateway".to_string())
        })?;

        let base_millis = now.timestamp_millis();
        let mut images = Vec::with_capacity(submission.files.len());

        for (index, file) in submission.files.iter().enumerate() {
            let bytes = file
                .read()
                .await
                .map_err(|e| IntakeError::upload_failed(&file.name, Some(format!("Failed to read file: {}", e))))?;

            // Consecutive millis keep ids unique within one submission.
            let public_id = format!(
                "{}/{}/{}",
                submission.station_id,
                submission.chassis_id,
                base_millis + index as i64
            );

            let request = GatewayRequest {
                bytes,
                content_type: file.content_type.clone(),
                filename: file.name.clone(),
                station_id: submission.station_id.clone(),
                chassis_id: submission.chassis_id.clone(),
                folder: self.upload_folder.clone(),
                public_id,
            };

            let uploaded = match gateway.upload(request).await {
                Ok(uploaded) => uploaded,
                Err(e) => {
                    tracing::warn!(
                        file = %file.name,
                        position = index + 1,
                        error = %e,
                        "Gateway upload failed, aborting submission"
                    );
                    return Err(IntakeError::upload_failed(&file.name, e.user_message()));
                }
            };

            tracing::debug!(
                file = %file.name,
                public_id = %uploaded.public_id,
                size_bytes = file.size,
                "Uploaded file to gateway"
            );

            images.push(ImageRecord {
                data: ImageData::Remote(uploaded.url),
                name: Some(file.name.clone()),
                content_type: file.content_type.clone(),
                size: file.size,
                public_id: Some(uploaded.public_id),
            });
        }

        Ok(images)
    }
}

/// Read every file concurrently and embed it as a data URL. All or nothing; order kept.
async fn encode_inline(files: &[PendingFile]) -> Result<Vec<ImageRecord>, IntakeError> {
    try_join_all(files.iter().map(|file| async move {
        let bytes = file
            .read()
            .await
            .map_err(|e| IntakeError::upload_failed(&file.name, Some(format!("Failed to read file: {}", e))))?;

        Ok::<_, IntakeError>(ImageRecord {
            data: ImageData::inline_from_bytes(&file.content_type, &bytes),
            name: Some(file.name.clone()),
            content_type: file.content_type.clone(),
            size: file.size,
            public_id: None,
        })
    }))
    .await
}
