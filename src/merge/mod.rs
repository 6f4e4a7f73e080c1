//! PDF merging: page tree grafting, bookmarks and document metadata.

pub mod bookmarks;
pub mod merger;
pub mod metadata;

pub use bookmarks::{BookmarkEntry, BookmarkManager};
pub use merger::{MergeResult, MergeStatistics, Merger, merge_documents};
pub use metadata::MetadataManager;
