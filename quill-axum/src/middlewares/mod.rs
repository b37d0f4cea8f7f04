pub mod guard;
pub mod inspect;

pub use guard::{check_request, RelayGuard, RelayGuardService, API_KEY_HEADER};
pub use inspect::{inspect_submission, SubmissionSummary};
