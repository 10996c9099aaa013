//! Client side of the upload workflow: request signed URLs, upload straight
//! to storage, then poll until the stitched video shows up.

pub mod api;
pub mod error;
pub mod orchestrator;
pub mod poller;

pub use api::ApiClient;
pub use error::ClientError;
pub use orchestrator::{SelectedFile, UploadOrchestrator, UploadState};
pub use poller::{PollHandle, PollOutcome, PollPolicy, StitchPoller, StitchSource};
