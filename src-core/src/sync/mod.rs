//! Remote sync
//!
//! Pushes locally recorded moods to the backend.

pub mod api;
pub mod service;

pub use api::{MoodApi, MoodInsert, RemoteMood, SupabaseMoodApi};
pub use service::{MoodSyncResult, SyncService, SyncSummary};
