use crate::client::api::ApiClient;
use crate::client::error::ClientError;
use crate::client::poller::{PollHandle, PollOutcome, PollPolicy, StitchPoller};
use crate::utils::session_token::SessionToken;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

/// A local file queued for upload, with the content type it will be
/// declared as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
    pub content_type: String,
}

impl SelectedFile {
    /// Name and content type come from the path, the way a browser file
    /// picker fills them in.
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self, ClientError> {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| ClientError::Io {
                path: path.clone(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a file path"),
            })?;
        let content_type = mime_guess::from_path(&path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        Ok(Self {
            path,
            name,
            content_type,
        })
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadState {
    Idle,
    Selecting { files: usize },
    Uploading {
        folder: SessionToken,
        completed: usize,
        total: usize,
    },
    Polling { folder: SessionToken },
    Complete { folder: SessionToken, url: String },
}

/// Drives one upload session: select files, upload them one after another
/// through signed URLs, then watch for the stitched result.
///
/// Uploads are sequential on purpose. Files land in the order they were
/// selected and the first failure stops the batch.
pub struct UploadOrchestrator {
    api: Arc<ApiClient>,
    poller: StitchPoller<ApiClient>,
    files: Vec<SelectedFile>,
    state: UploadState,
}

impl UploadOrchestrator {
    pub fn new(api: ApiClient, policy: PollPolicy) -> Self {
        let api = Arc::new(api);
        Self {
            poller: StitchPoller::new(api.clone(), policy),
            api,
            files: Vec::new(),
            state: UploadState::Idle,
        }
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    pub fn selected(&self) -> &[SelectedFile] {
        &self.files
    }

    /// Replace the selection. Not allowed while a session is in flight.
    pub fn select(&mut self, files: Vec<SelectedFile>) -> Result<(), ClientError> {
        match self.state {
            UploadState::Idle | UploadState::Selecting { .. } | UploadState::Complete { .. } => {}
            UploadState::Uploading { .. } | UploadState::Polling { .. } => {
                return Err(ClientError::InvalidState("an upload session is in progress"));
            }
        }

        self.state = if files.is_empty() {
            UploadState::Idle
        } else {
            UploadState::Selecting { files: files.len() }
        };
        self.files = files;
        Ok(())
    }

    /// Upload every selected file under a fresh session token.
    ///
    /// On success the orchestrator moves to `Polling` and returns the token.
    /// Any failure aborts the batch and resets to `Idle`; files uploaded
    /// before the failure stay in storage.
    pub async fn upload(&mut self) -> Result<SessionToken, ClientError> {
        if self.files.is_empty() {
            return Err(ClientError::NoFilesSelected);
        }
        if !matches!(self.state, UploadState::Selecting { .. }) {
            return Err(ClientError::InvalidState("no selection to upload"));
        }

        let folder = SessionToken::generate();
        let files = std::mem::take(&mut self.files);
        let total = files.len();
        info!("📤 Uploading {} file(s) to folder {}", total, folder);

        for (completed, file) in files.iter().enumerate() {
            self.state = UploadState::Uploading {
                folder: folder.clone(),
                completed,
                total,
            };

            if let Err(e) = self.upload_one(&folder, file).await {
                error!("❌ Upload of {} failed: {}", file.name, e);
                self.state = UploadState::Idle;
                return Err(e);
            }
        }

        info!("✅ Upload successful, folder {}", folder);
        self.state = UploadState::Polling {
            folder: folder.clone(),
        };
        Ok(folder)
    }

    async fn upload_one(&self, folder: &SessionToken, file: &SelectedFile) -> Result<(), ClientError> {
        let url = self
            .api
            .request_upload_url(folder, &file.name, &file.content_type)
            .await?;

        let body = tokio::fs::read(&file.path)
            .await
            .map_err(|source| ClientError::Io {
                path: file.path.clone(),
                source,
            })?;

        self.api
            .upload_to_signed_url(&url, &file.content_type, body)
            .await?;
        info!("📦 Uploaded {} ({})", file.name, file.content_type);
        Ok(())
    }

    /// Spawn the background check for the current session.
    pub fn start_polling(&self) -> Result<PollHandle, ClientError> {
        match &self.state {
            UploadState::Polling { folder } => Ok(self.poller.watch(folder.clone())),
            _ => Err(ClientError::InvalidState("nothing uploaded to poll for")),
        }
    }

    /// Record how polling ended. Only a result completes the session; a
    /// cancelled or exhausted poll drops back to `Idle`.
    pub fn finish(&mut self, outcome: &PollOutcome) {
        let UploadState::Polling { folder } = &self.state else {
            return;
        };

        self.state = match outcome {
            PollOutcome::Available(url) => UploadState::Complete {
                folder: folder.clone(),
                url: url.clone(),
            },
            PollOutcome::Cancelled | PollOutcome::Exhausted { .. } => UploadState::Idle,
        };
    }

    /// The whole workflow in one call: select, upload, poll until the policy
    /// ends it.
    pub async fn run(&mut self, files: Vec<SelectedFile>) -> Result<PollOutcome, ClientError> {
        self.select(files)?;
        self.upload().await?;
        let outcome = self.start_polling()?.wait().await?;
        self.finish(&outcome);
        Ok(outcome)
    }
}
