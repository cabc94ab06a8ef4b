mod gemini;

pub use gemini::GeminiService;

use anyhow::Result;

use crate::session::{AspectRatio, UploadedImage};

/// A single image returned by the remote service, decoded to raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    /// Decoded image bytes, ready for display or saving.
    pub data: Vec<u8>,
    /// MIME type reported by the service (e.g. `"image/png"`).
    pub mime_type: String,
}

/// Parameters for the text-to-image path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    pub prompt: String,
    pub aspect_ratio: AspectRatio,
    /// Number of images to request (already clamped by the settings).
    pub count: u8,
}

/// Parameters for the multimodal edit path: every uploaded image plus the
/// prompt, sent together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRequest {
    pub prompt: String,
    pub images: Vec<UploadedImage>,
}

/// What the edit path produced: zero or more image parts, and any text the
/// model returned alongside them.
#[derive(Debug, Clone, Default)]
pub struct EditOutcome {
    pub images: Vec<GeneratedImage>,
    /// Concatenated text parts, if the model said anything.
    pub commentary: Option<String>,
}

/// Trait for generative image backends.
///
/// The library ships one production implementation, [`GeminiService`].
/// The dispatcher ([`crate::pipeline`]) only talks to this trait, so tests
/// can substitute a mock backend and exercise the dispatch logic without a
/// network.
#[async_trait::async_trait]
pub trait ImageService: Send + Sync {
    /// The display name of this backend (e.g. "Gemini").
    fn name(&self) -> &str;

    /// Generate `request.count` new images from a text prompt.
    ///
    /// An empty vector is a valid response — the service may filter
    /// everything out — and is not an error.
    async fn generate(&self, request: &GenerateRequest) -> Result<Vec<GeneratedImage>>;

    /// Edit or recompose the uploaded images according to the prompt.
    ///
    /// An outcome with no images is valid; the model may answer with text
    /// only.
    async fn edit(&self, request: &EditRequest) -> Result<EditOutcome>;
}
