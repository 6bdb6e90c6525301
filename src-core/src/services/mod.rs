//! Services module
//!
//! Business logic services that coordinate between callers and the repository.

pub mod auth_tokens;
pub mod history;
pub mod messages;
pub mod moods;
pub mod photos;
pub mod settings;
pub mod transfer;

pub use auth_tokens::AuthTokenService;
pub use history::{load_history_cursor, HistoryCursor, MessageHistory};
pub use messages::MessagesService;
pub use moods::MoodsService;
pub use photos::PhotosService;
pub use settings::{Settings, SettingsService};
pub use transfer::{ImportSummary, MessagesExport, TransferService};
