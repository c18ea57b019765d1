// Network adapter modules: the inbound real-time action feed.

pub mod feed;

pub use feed::{FeedError, FeedReader, FeedStats, run_feed};
