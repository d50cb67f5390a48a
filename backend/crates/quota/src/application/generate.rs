//! Generate Use Case
//!
//! Validate upload, check quota, call the image service, then spend one
//! generation if the caller is still waiting for the result.

use std::sync::Arc;

use platform::lock::KeyedLocks;
use tokio_util::sync::CancellationToken;

use crate::application::session::QuotaSession;
use crate::application::tracker::EntitlementTracker;
use crate::domain::clock::Clock;
use crate::domain::identity::Identity;
use crate::domain::image::ImageEditor;
use crate::domain::repository::QuotaRepository;
use crate::domain::services::validate_upload;
use crate::domain::value_objects::Remaining;
use crate::error::{QuotaError, QuotaResult};

/// Input DTO for generate
#[derive(Debug, Clone)]
pub struct GenerateInput {
    pub image_b64: String,
    pub mime_type: String,
}

/// Output DTO for generate
#[derive(Debug, Clone)]
pub struct GenerateOutput {
    pub image_b64: String,
    pub text: Option<String>,
    pub remaining: Remaining,
    /// Results for non-paid identities carry a watermark
    pub watermark: bool,
}

/// Generate Use Case
pub struct GenerateUseCase<R, C, E>
where
    R: QuotaRepository,
    C: Clock,
    E: ImageEditor,
{
    tracker: EntitlementTracker<R, C>,
    editor: Arc<E>,
    locks: KeyedLocks,
}

impl<R, C, E> GenerateUseCase<R, C, E>
where
    R: QuotaRepository + Send + Sync,
    C: Clock,
    E: ImageEditor + Sync,
{
    pub fn new(tracker: EntitlementTracker<R, C>, editor: Arc<E>, locks: KeyedLocks) -> Self {
        Self {
            tracker,
            editor,
            locks,
        }
    }

    pub async fn execute(
        &self,
        identity: Identity,
        input: GenerateInput,
        cancel: &CancellationToken,
    ) -> QuotaResult<GenerateOutput> {
        let config = self.tracker.config();
        let source = validate_upload(
            &input.image_b64,
            &input.mime_type,
            &config.allowed_mime_types,
            config.max_upload_bytes,
        )?;

        let _in_flight = self
            .locks
            .try_lock(&format!("{}/generate", self.tracker.scope()))
            .ok_or(QuotaError::GenerationInFlight)?;

        let mut session = QuotaSession::pending(identity);
        // nothing is persisted for this scope unless the generation is spent
        session.preview(&self.tracker).await?;
        session.check_permission()?;

        tracing::info!(
            scope = %self.tracker.scope(),
            identity = session.identity().label(),
            mime_type = %source.mime_type,
            size_bytes = source.size_bytes,
            "Image edit requested"
        );

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!(scope = %self.tracker.scope(), "Generation abandoned before the image service answered");
                return Err(QuotaError::Abandoned);
            }
            result = self.editor.edit(&source) => result?,
        };

        let Some(image_b64) = response.image_b64 else {
            return Err(QuotaError::NoImageReturned(response.text));
        };

        // resolved, but nobody is waiting for it any more
        if cancel.is_cancelled() {
            tracing::info!(scope = %self.tracker.scope(), "Generated image discarded by caller");
            return Err(QuotaError::Abandoned);
        }

        let remaining = session.record_success(&self.tracker).await?;

        Ok(GenerateOutput {
            image_b64,
            text: response.text,
            remaining,
            watermark: !session.identity().is_paid(),
        })
    }
}
