//! Domain logic - pure data and rules independent of git, HTTP and I/O

pub mod branch;
pub mod change_set;
pub mod commit;
pub mod draft;
pub mod issue;

pub use branch::{check_eligibility, renamed_branch, sanitize, Eligibility, Ineligibility};
pub use change_set::{ChangeSet, FileDelta, FileStatus, MAX_DIFF_CHARS};
pub use commit::CommitInfo;
pub use draft::{Provenance, StoryKind, StoryPoints, WorkItemDraft, MAX_TITLE_CHARS};
pub use issue::{CreatedIssue, IssueId, SprintAssignment};
