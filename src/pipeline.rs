use std::fmt;

use crate::ai::{EditRequest, GenerateRequest, GeneratedImage, ImageService};
use crate::session::{Mode, SessionState};

/// Why a submission did not produce gallery images.
///
/// Validation failures never reach the network; service failures are caught
/// here, logged, and surfaced to the UI as a single message.
#[derive(Debug)]
pub enum PipelineError {
    /// The prompt was empty after trimming. No request was made.
    EmptyPrompt,
    /// The remote call failed (network or service error).
    Service(anyhow::Error),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::EmptyPrompt => write!(f, "Please enter a prompt"),
            PipelineError::Service(e) => write!(f, "Generation failed: {e}"),
        }
    }
}

impl std::error::Error for PipelineError {}

/// The result of a successful submission.
#[derive(Debug)]
pub enum RunOutcome {
    /// One or more images, in the order the service returned them.
    Images(Vec<GeneratedImage>),
    /// The call succeeded but produced no images (e.g. safety filtering).
    /// Reported as a status message, not an error.
    Empty { message: String },
}

/// Dispatch one submission to the backend.
///
/// Picks the generate or edit path from the session's [`Mode`], after
/// validating that the prompt is non-empty. Exactly one remote call is made
/// per invocation; the caller owns the busy indicator around it.
///
/// # Example
///
/// ```rust,no_run
/// use pixgen::ai::GeminiService;
/// use pixgen::pipeline::{self, RunOutcome};
/// use pixgen::session::SessionState;
///
/// # async fn example() -> Result<(), pixgen::pipeline::PipelineError> {
/// let service = GeminiService::new(
///     "api-key".into(),
///     "imagen-4.0-generate-001".into(),
///     "gemini-2.5-flash-image".into(),
/// );
/// let session = SessionState::default();
///
/// match pipeline::run(&service, &session, "a red fox in the snow").await? {
///     RunOutcome::Images(images) => println!("{} image(s)", images.len()),
///     RunOutcome::Empty { message } => println!("{message}"),
/// }
/// # Ok(())
/// # }
/// ```
pub async fn run(
    service: &dyn ImageService,
    session: &SessionState,
    prompt: &str,
) -> Result<RunOutcome, PipelineError> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(PipelineError::EmptyPrompt);
    }

    match session.mode() {
        Mode::Generate => {
            let request = GenerateRequest {
                prompt: prompt.to_string(),
                aspect_ratio: session.settings.aspect_ratio,
                count: session.settings.image_count,
            };
            log::info!(
                "Generating {} image(s) at {} via {}",
                request.count,
                request.aspect_ratio.as_str(),
                service.name()
            );

            let images = service.generate(&request).await.map_err(|e| {
                log::error!("{} generate failed: {e:#}", service.name());
                PipelineError::Service(e)
            })?;

            if images.is_empty() {
                Ok(RunOutcome::Empty {
                    message: "No images were produced for this prompt".to_string(),
                })
            } else {
                Ok(RunOutcome::Images(images))
            }
        }
        Mode::Edit => {
            let request = EditRequest {
                prompt: prompt.to_string(),
                images: session.uploads().to_vec(),
            };
            log::info!(
                "Editing {} uploaded image(s) via {}",
                request.images.len(),
                service.name()
            );

            let outcome = service.edit(&request).await.map_err(|e| {
                log::error!("{} edit failed: {e:#}", service.name());
                PipelineError::Service(e)
            })?;

            if outcome.images.is_empty() {
                let message = match outcome.commentary {
                    Some(text) => format!("No image was produced: {text}"),
                    None => "No image was produced".to_string(),
                };
                Ok(RunOutcome::Empty { message })
            } else {
                Ok(RunOutcome::Images(outcome.images))
            }
        }
    }
}
