//! Gemini Image Editor
//!
//! Calls `models/<model>:generateContent` with the uploaded image and the edit
//! prompt, asking for image and text output.

use serde::{Deserialize, Serialize};

use crate::application::config::QuotaConfig;
use crate::domain::image::{EditResponse, ImageEditor, SourceImage};
use crate::error::{QuotaError, QuotaResult};

#[derive(Clone)]
pub struct GeminiImageEditor {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    prompt: String,
}

impl GeminiImageEditor {
    pub fn new(api_key: impl Into<String>, config: &QuotaConfig) -> QuotaResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| QuotaError::Internal(format!("HTTP client build failed: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: format!(
                "{}/models/{}:generateContent",
                config.gemini_base_url.trim_end_matches('/'),
                config.model
            ),
            prompt: config.edit_prompt.clone(),
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [RequestPart<'a>; 2],
}

#[derive(Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    Image {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataRef<'a>,
    },
    Text {
        text: &'a str,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataRef<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: [&'static str; 2],
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    #[serde(default)]
    inline_data: Option<InlineData>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InlineData {
    data: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Last image part and last text part of the first candidate.
fn collect_parts(response: GenerateContentResponse) -> EditResponse {
    let mut out = EditResponse::default();

    let parts = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts)
        .unwrap_or_default();

    for part in parts {
        if let Some(inline) = part.inline_data {
            out.image_b64 = Some(inline.data);
        } else if let Some(text) = part.text.filter(|t| !t.is_empty()) {
            out.text = Some(text);
        }
    }

    out
}

impl ImageEditor for GeminiImageEditor {
    async fn edit(&self, image: &SourceImage) -> QuotaResult<EditResponse> {
        let body = GenerateContentRequest {
            contents: [Content {
                parts: [
                    RequestPart::Image {
                        inline_data: InlineDataRef {
                            mime_type: &image.mime_type,
                            data: &image.data_b64,
                        },
                    },
                    RequestPart::Text { text: &self.prompt },
                ],
            }],
            generation_config: GenerationConfig {
                response_modalities: ["IMAGE", "TEXT"],
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| QuotaError::UpstreamFailure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let reason = match response.json::<ErrorEnvelope>().await {
                Ok(envelope) => envelope.error.message,
                Err(_) => format!("image service answered {}", status),
            };
            return Err(QuotaError::UpstreamFailure(reason));
        }

        let parsed = response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| QuotaError::UpstreamFailure(format!("unreadable response: {}", e)))?;

        Ok(collect_parts(parsed))
    }
}
