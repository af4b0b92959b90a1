//! Usecase layer: the sort run and its progress events.

pub mod error;
pub mod event;
pub mod sort_bookmarks;
pub mod stats;
