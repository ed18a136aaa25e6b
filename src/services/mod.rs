pub mod feed;
pub mod transitions;

pub use feed::{FeedHandle, FeedSnapshot, RequestFeed, RequestSource};
