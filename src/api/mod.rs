pub mod body;
pub mod format;
pub mod pagination;

pub use body::FormBody;
pub use format::{CommentView, ProjectView, PublicUser, UserSummary};
pub use pagination::{PageParams, Pagination};
