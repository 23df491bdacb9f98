//! Logged-in station state: its batches, the submission pipeline and the last warning.

use chrono::{DateTime, Utc};
use std::time::Duration;
use vrs_core::{ErrorMetadata, IntakeError, Station, UploadBatch};

use crate::batch_store::{find_by_chassis_id, search, BatchStore};
use crate::upload::{PendingFile, Submission, UploadOrchestrator};

const FALLBACK_WARNING_TTL_SECS: i64 = 5;

/// A short-lived notice: the action happened but something degraded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransientWarning {
    pub message: String,
    pub expires_at: DateTime<Utc>,
}

impl TransientWarning {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// State for one station session. One submission is in flight at a time, which
/// `&mut self` on [`SessionState::submit`] enforces.
pub struct SessionState {
    station: Station,
    batches: Vec<UploadBatch>,
    warning: Option<TransientWarning>,
    store: BatchStore,
    orchestrator: Option<UploadOrchestrator>,
    warning_ttl: chrono::Duration,
}

impl SessionState {
    /// Open a session and load the station's retained batches.
    ///
    /// Without an orchestrator the session can browse and clear history but not submit.
    pub async fn open(
        station: Station,
        store: BatchStore,
        orchestrator: Option<UploadOrchestrator>,
        warning_ttl: Duration,
    ) -> Self {
        let batches = store.load(station.id()).await;
        tracing::info!(
            station = %station,
            batches = batches.len(),
            uploads = orchestrator.is_some(),
            "Opened station session"
        );

        Self {
            station,
            batches,
            warning: None,
            store,
            orchestrator,
            warning_ttl: chrono::Duration::from_std(warning_ttl)
                .unwrap_or_else(|_| chrono::Duration::seconds(FALLBACK_WARNING_TTL_SECS)),
        }
    }

    pub fn station(&self) -> Station {
        self.station
    }

    pub fn batches(&self) -> &[UploadBatch] {
        &self.batches
    }

    pub async fn submit(&mut self, chassis_id: &str, files: Vec<PendingFile>) -> Result<&UploadBatch, IntakeError> {
        self.submit_at(chassis_id, files, Utc::now()).await
    }

    /// Validate, upload and record a batch.
    ///
    /// Validation and upload failures leave the collection untouched. A failed save
    /// keeps the new batch in memory and records a transient warning instead of failing.
    pub async fn submit_at(
        &mut self,
        chassis_id: &str,
        files: Vec<PendingFile>,
        now: DateTime<Utc>,
    ) -> Result<&UploadBatch, IntakeError> {
        let orchestrator = self.orchestrator.as_ref().ok_or_else(|| {
            IntakeError::Internal("session was opened without an upload pipeline".to_string())
        })?;
        let submission = Submission::new(chassis_id, self.station.id(), files);
        let batch = orchestrator
            .submit_at(&submission, &self.batches, now)
            .await?;

        if let Err(e) = self
            .store
            .append(self.station.id(), &mut self.batches, batch)
            .await
        {
            self.warn(&e, now);
        }

        self.batches
            .last()
            .ok_or_else(|| IntakeError::Internal("submitted batch missing after append".to_string()))
    }

    pub fn search(&self, query: &str) -> Vec<&UploadBatch> {
        search(&self.batches, query)
    }

    pub fn find(&self, chassis_id: &str) -> Option<&UploadBatch> {
        find_by_chassis_id(&self.batches, chassis_id)
    }

    /// Drop every batch for this station, in memory and in the store.
    pub async fn clear(&mut self) -> Result<(), IntakeError> {
        self.batches.clear();
        if let Err(e) = self.store.clear(self.station.id()).await {
            self.warn(&e, Utc::now());
            return Err(e);
        }
        Ok(())
    }

    /// The current warning, unless it has expired.
    pub fn active_warning(&self, now: DateTime<Utc>) -> Option<&TransientWarning> {
        self.warning.as_ref().filter(|w| w.is_active(now))
    }

    pub fn dismiss_warning(&mut self) {
        self.warning = None;
    }

    fn warn(&mut self, err: &IntakeError, now: DateTime<Utc>) {
        tracing::warn!(
            station = %self.station,
            code = err.error_code(),
            error = %err,
            "Recording transient warning"
        );
        self.warning = Some(TransientWarning {
            message: err.client_message(),
            expires_at: now + self.warning_ttl,
        });
    }
}
