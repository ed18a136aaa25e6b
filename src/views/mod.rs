pub mod filter;
pub mod format;
pub mod layout;
pub mod pages;

pub use filter::{my_queue, new_queue, sort_newest_first, RequestFilter};
pub use format::{escape, format_timestamp};
