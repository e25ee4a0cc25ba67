mod category;
mod content;
mod identity;
mod report;
mod stats;
mod target;
mod token;
mod vote;

pub use category::{Category, CategoryError};
pub use content::{CommentView, CreatedComment, NewComment, NewPost, OwnedContent, Post, PostFilter};
pub use identity::{Identity, IdentityError};
pub use report::{NewReport, Report, ReportStatus};
pub use stats::{PlatformOverview, PlatformStats};
pub use target::{CommentId, PostId, ReportId, TargetKind, TargetRef};
pub use token::EditToken;
pub use vote::{Votable, VoteCounts, VoteKind, Voters};
