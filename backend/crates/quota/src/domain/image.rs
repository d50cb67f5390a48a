//! Image Edit Port
//!
//! Implementation is in infrastructure layer.

use crate::error::QuotaResult;

/// Validated upload, still base64 encoded for the wire.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub data_b64: String,
    pub mime_type: String,
    /// Decoded size
    pub size_bytes: usize,
}

/// What the image service answered. Either part may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditResponse {
    pub image_b64: Option<String>,
    pub text: Option<String>,
}

/// Image edit service trait
#[trait_variant::make(ImageEditor: Send)]
pub trait LocalImageEditor {
    /// Send the image for editing.
    ///
    /// Fails with `UpstreamFailure` when the service cannot be reached or
    /// answers with an error. A successful answer without an image is *not*
    /// an error here; the caller decides.
    async fn edit(&self, image: &SourceImage) -> QuotaResult<EditResponse>;
}
