//! One-shot screens outside the live monitor
//!
//! - Process listing and termination
//! - File search and directory tree

pub mod files;
pub mod processes;

pub use files::{search, search_table, tree_lines, FoundFile, SearchOptions, SearchResults, WildcardMask};
pub use processes::{filter_and_sort, process_table, ProcessEntry, ProcessError, ProcessManager};
