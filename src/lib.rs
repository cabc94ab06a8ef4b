//! # pixgen
//!
//! AI image studio — generate new images from a text prompt, or edit uploaded
//! images with a multimodal generative model, and collect the results in a
//! gallery.
//!
//! The library holds everything the GUI binary needs but owns no windowing
//! state itself: session state (the upload list and generation settings),
//! upload reading, the request dispatcher, the remote service client, and
//! configuration. All of it is unit-testable without a display or a network.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pixgen::ai::GeminiService;
//! use pixgen::config::Config;
//! use pixgen::pipeline::{self, RunOutcome};
//! use pixgen::session::SessionState;
//! use pixgen::upload::read_batch;
//! use std::path::PathBuf;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load(None)?;
//!     let api_key = config.resolved_api_key().expect("API key not configured");
//!     let service = GeminiService::new(api_key, config.generate_model, config.edit_model);
//!
//!     let mut session = SessionState::default();
//!
//!     // Attach images to switch the session into edit mode (optional)
//!     let batch = read_batch(&[PathBuf::from("photo.jpg")]).await?;
//!     session.add_uploads(batch);
//!
//!     match pipeline::run(&service, &session, "add a party hat").await? {
//!         RunOutcome::Images(images) => println!("Got {} image(s)", images.len()),
//!         RunOutcome::Empty { message } => println!("{message}"),
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Request paths
//!
//! | Mode | Trigger | Remote operation |
//! |------|---------|------------------|
//! | Generate | upload list empty | text-to-image, N images at a fixed aspect ratio |
//! | Edit | upload list non-empty | multimodal images+prompt, mixed image/text parts back |
//!
//! ## Modules
//!
//! - [`session`] — uploaded-image list, generation settings, mode derivation
//! - [`upload`] — reading selected files into in-memory base64 records
//! - [`ai`] — the [`ai::ImageService`] trait and the Gemini implementation
//! - [`pipeline`] — prompt validation and generate/edit dispatch
//! - [`config`] — configuration types and loading/saving

pub mod ai;
pub mod config;
pub mod pipeline;
pub mod session;
pub mod upload;
