use quill_core::PostDraft;

use crate::client::SubmissionClient;
use crate::error::SubmitResult;
use crate::response::Published;

/// An editing surface's draft paired with the client that publishes it.
///
/// The draft is reset to its initial two empty blocks after a successful
/// publish only; on any error it is left as-is so the user can retry.
pub struct PublishSession {
    draft: PostDraft,
    client: SubmissionClient,
}

impl PublishSession {
    pub fn new(client: SubmissionClient) -> Self {
        Self::with_draft(client, PostDraft::new())
    }

    pub fn with_draft(client: SubmissionClient, draft: PostDraft) -> Self {
        Self { draft, client }
    }

    pub fn draft(&self) -> &PostDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut PostDraft {
        &mut self.draft
    }

    pub fn client(&self) -> &SubmissionClient {
        &self.client
    }

    pub async fn publish(&mut self) -> SubmitResult<Published> {
        let outcome = self.client.submit(&self.draft).await;
        if outcome.is_ok() {
            self.draft.reset();
        }
        outcome
    }
}
