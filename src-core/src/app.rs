//! Application state and initialization
//!
//! Opens the local store once and builds every service over the same
//! repository handle. Callers hold an `AppState` for the whole session.
//! A store that cannot be opened does not stop startup: the services come
//! up anyway, reads return empty results and the store retries on next use.

use crate::config::{RemoteConfig, DB_FILENAME, DB_VERSION};
use crate::database::{LocalStore, Repository};
use crate::services::{
    AuthTokenService, MessagesService, MoodsService, PhotosService, SettingsService,
    TransferService,
};
use crate::sync::{SupabaseMoodApi, SyncService};
use std::path::PathBuf;
use std::sync::Arc;

/// Central application state holding all services
#[derive(Clone)]
pub struct AppState {
    pub app_data_dir: PathBuf,
    pub store: LocalStore,
    pub messages: MessagesService,
    pub photos: PhotosService,
    pub moods: MoodsService,
    pub settings: SettingsService,
    pub transfer: TransferService,
    pub auth_tokens: AuthTokenService,
    /// Present only when a remote backend is configured
    pub sync: Option<SyncService>,
}

impl AppState {
    /// Open the store in `app_data_dir`, build services and seed default messages
    pub async fn initialize(app_data_dir: PathBuf, remote: Option<RemoteConfig>) -> Self {
        tracing::info!("Initializing application");
        tracing::info!("App data directory: {:?}", app_data_dir);

        if let Err(e) = tokio::fs::create_dir_all(&app_data_dir).await {
            tracing::error!("Failed to create app data directory: {}", e);
        }

        let store = LocalStore::new(app_data_dir.join(DB_FILENAME), DB_VERSION);
        if let Err(e) = store.pool().await {
            tracing::error!("Local store unavailable, running with empty data: {}", e);
        }
        let repo = Repository::new(store.clone());

        let messages = MessagesService::new(repo.clone());
        let photos = PhotosService::new(repo.clone());
        let moods = MoodsService::new(repo.clone());
        let auth_tokens = AuthTokenService::new(repo);
        let settings = SettingsService::new(app_data_dir.clone());
        let transfer = TransferService::new(messages.clone(), app_data_dir.clone());

        if let Err(e) = messages.seed_defaults_if_empty().await {
            tracing::error!("Failed to seed default messages: {}", e);
        }

        let sync = match remote {
            Some(config) => {
                tracing::info!("Remote sync enabled for {}", config.url);
                match SupabaseMoodApi::new(config, auth_tokens.clone()) {
                    Ok(api) => Some(SyncService::new(moods.clone(), Arc::new(api))),
                    Err(e) => {
                        tracing::error!("Failed to create remote client, sync disabled: {}", e);
                        None
                    }
                }
            }
            None => {
                tracing::info!("No remote configured, running local-only");
                None
            }
        };

        tracing::info!("Application initialized successfully");

        Self {
            app_data_dir,
            store,
            messages,
            photos,
            moods,
            settings,
            transfer,
            auth_tokens,
            sync,
        }
    }

    /// Close the shared pool
    pub async fn shutdown(&self) {
        self.store.close().await;
        tracing::info!("Application shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MessageFilter;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_initialize_seeds_once() {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().join("data");

        let state = AppState::initialize(data_dir.clone(), None).await;
        let seeded = state.messages.count().await;
        assert!(seeded > 0);
        assert!(state.sync.is_none());
        assert!(data_dir.join(DB_FILENAME).exists());
        state.shutdown().await;

        let state = AppState::initialize(data_dir, None).await;
        assert_eq!(state.messages.count().await, seeded);
        state.shutdown().await;
    }

    #[tokio::test]
    async fn test_remote_config_enables_sync() {
        let temp_dir = TempDir::new().unwrap();
        let remote = RemoteConfig::new("https://example.supabase.co", "anon");

        let state = AppState::initialize(temp_dir.path().to_path_buf(), Some(remote)).await;
        let sync = state.sync.as_ref().unwrap();
        assert_eq!(sync.get_pending_count().await, 0);
    }

    #[tokio::test]
    async fn test_unusable_store_starts_degraded() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir_all(temp_dir.path().join(DB_FILENAME)).unwrap();

        let state = AppState::initialize(temp_dir.path().to_path_buf(), None).await;
        assert!(!state.store.is_initialized());
        assert!(state.messages.get_all(&MessageFilter::default()).await.is_empty());
        assert!(state.moods.get_all().await.is_empty());
        assert_eq!(state.photos.count().await, 0);
    }
}
