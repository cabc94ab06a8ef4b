/// Minimum number of images the generate path may request.
pub const MIN_IMAGE_COUNT: u8 = 1;
/// Maximum number of images the generate path may request.
pub const MAX_IMAGE_COUNT: u8 = 4;

/// Output encoding for generated images. Fixed — the UI never exposes it.
pub const OUTPUT_MIME_TYPE: &str = "image/png";

/// An image the user attached to the session, held entirely in memory.
///
/// Created when a file is read by [`crate::upload::read_batch`], removed by
/// explicit user action, and dropped with the session. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    /// Base64-encoded file bytes (standard alphabet, no line breaks).
    pub base64: String,
    /// MIME type detected from the file extension (e.g. `"image/png"`).
    pub mime_type: String,
    /// File name, kept for display in the upload list.
    pub name: String,
}

/// The fixed set of aspect ratios the generate path accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectRatio {
    Square,
    Portrait,
    Landscape,
    Tall,
    Wide,
}

impl AspectRatio {
    /// All selectable ratios, in UI order.
    pub const ALL: [AspectRatio; 5] = [
        AspectRatio::Square,
        AspectRatio::Portrait,
        AspectRatio::Landscape,
        AspectRatio::Tall,
        AspectRatio::Wide,
    ];

    /// The wire/display form, e.g. `"16:9"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Portrait => "3:4",
            AspectRatio::Landscape => "4:3",
            AspectRatio::Tall => "9:16",
            AspectRatio::Wide => "16:9",
        }
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        AspectRatio::Square
    }
}

/// Settings the generate path reads at call time. Not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationSettings {
    pub aspect_ratio: AspectRatio,
    /// How many images to request, clamped to
    /// [`MIN_IMAGE_COUNT`]..=[`MAX_IMAGE_COUNT`].
    pub image_count: u8,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            aspect_ratio: AspectRatio::default(),
            image_count: MIN_IMAGE_COUNT,
        }
    }
}

impl GenerationSettings {
    /// Set the image count, clamping to the slider bounds.
    pub fn set_image_count(&mut self, count: u8) {
        self.image_count = count.clamp(MIN_IMAGE_COUNT, MAX_IMAGE_COUNT);
    }
}

/// Which request path a submission takes, derived from the upload list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Text-to-image: no uploads present.
    Generate,
    /// Multimodal edit: at least one uploaded image.
    Edit,
}

/// All mutable per-session state: the ordered upload list and the
/// generation settings.
///
/// Owning this in one place (instead of scattering it through UI state)
/// keeps the mode derivation and list invariants unit-testable without a
/// running GUI.
///
/// # Example
///
/// ```rust
/// use pixgen::session::{Mode, SessionState, UploadedImage};
///
/// let mut session = SessionState::default();
/// assert_eq!(session.mode(), Mode::Generate);
///
/// session.add_uploads(vec![UploadedImage {
///     base64: "aGVsbG8=".into(),
///     mime_type: "image/png".into(),
///     name: "hello.png".into(),
/// }]);
/// assert_eq!(session.mode(), Mode::Edit);
///
/// session.remove_upload(0);
/// assert_eq!(session.mode(), Mode::Generate);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    uploads: Vec<UploadedImage>,
    pub settings: GenerationSettings,
}

impl SessionState {
    /// The uploaded images, in insertion order.
    pub fn uploads(&self) -> &[UploadedImage] {
        &self.uploads
    }

    /// Append a successfully read batch, preserving both the existing order
    /// and the batch order.
    pub fn add_uploads(&mut self, batch: Vec<UploadedImage>) {
        self.uploads.extend(batch);
    }

    /// Remove the upload at `index`, keeping the remaining entries in their
    /// original relative order. Out-of-range indices are ignored — the UI
    /// only emits valid ones.
    pub fn remove_upload(&mut self, index: usize) {
        if index < self.uploads.len() {
            self.uploads.remove(index);
        }
    }

    /// Drop every uploaded image.
    pub fn clear_uploads(&mut self) {
        self.uploads.clear();
    }

    /// `Edit` iff at least one image is uploaded. Pure function of the list
    /// length; no hidden state.
    pub fn mode(&self) -> Mode {
        if self.uploads.is_empty() {
            Mode::Generate
        } else {
            Mode::Edit
        }
    }
}
