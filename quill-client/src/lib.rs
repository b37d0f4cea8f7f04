//! quill-client: sends a block-based post draft to the publishing relay.
//!
//! ```no_run
//! use quill_client::{ClientConfig, PublishSession, SubmissionClient};
//! use quill_core::{BlockKind, FileRef};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = SubmissionClient::new(
//!     ClientConfig::new("https://example.org/api/blog").with_api_key("public-key"),
//! )?;
//! let mut session = PublishSession::new(client);
//!
//! let draft = session.draft_mut();
//! draft.set_title("Hello");
//! draft.set_targets("blog-a, blog-b");
//! let blocks = draft.blocks_mut();
//! let first = blocks.iter().next().map(|b| b.id()).unwrap();
//! blocks.set_block_kind(first, BlockKind::Image)?;
//! blocks.set_image(first, FileRef::from_path("cover.png").await?)?;
//!
//! match session.publish().await {
//!     Ok(published) => println!("{}", published.notification()),
//!     Err(e) => eprintln!("{}", e.notification()),
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod response;
mod session;

pub use client::{SubmissionClient, API_KEY_HEADER};
pub use config::{ClientConfig, DEFAULT_TARGETS_FIELD};
pub use error::{SubmitError, SubmitResult, FALLBACK_FAILURE_MESSAGE};
pub use response::{interpret, Published, PublishedPost, RelayResponse, DEFAULT_SUCCESS_MESSAGE};
pub use session::PublishSession;
