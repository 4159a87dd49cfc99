mod issue;
mod user;
mod worklog;

pub use issue::IssueRef;
pub use user::UserInfo;
pub use worklog::{WorklogAuthor, WorklogEntry};
