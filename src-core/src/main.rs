// My Love core - command-line entry point
// Opens the local store, prints today's message and runs a sync pass

use anyhow::Context;
use chrono::{NaiveTime, Utc};
use mylove_core::app::AppState;
use mylove_core::config::{data_dir_from_env, RemoteConfig};
use mylove_core::countdown::{calculate_time_remaining, format_countdown_display, next_anniversary_date};
use mylove_core::dates::{days_since_start, format_relationship_duration, today_utc};
use mylove_core::services::{load_history_cursor, MessageHistory};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mylove_core=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting My Love core");

    let state = AppState::initialize(data_dir_from_env(), RemoteConfig::from_env()).await;

    let settings = state
        .settings
        .load()
        .await
        .context("failed to load settings")?;
    let start = state.settings.relationship_start_date().await?;
    let today = today_utc();

    let message = load_history_cursor(&state.messages, MessageHistory::default(), today, start)
        .await
        .and_then(|mut cursor| cursor.initialize().map(|m| m.text.clone()));
    match message {
        Ok(text) => {
            println!("Today's message for {}:", settings.relationship.partner_name);
            println!("  {}", text);
        }
        Err(e) => {
            tracing::warn!("No message available today: {}", e);
            println!("No message available today");
        }
    }

    let days = days_since_start(start, today);
    println!("Together for {}", format_relationship_duration(days));

    let now = Utc::now().naive_utc();
    let upcoming = state.settings.upcoming_anniversaries(1, now).await?;
    if let Some(anniversary) = upcoming.first() {
        if let Some(date) = next_anniversary_date(&anniversary.date, now) {
            let remaining = calculate_time_remaining(date.and_time(NaiveTime::MIN), now);
            println!("{}", format_countdown_display(remaining, &anniversary.label));
        }
    }

    if let Some(sync) = &state.sync {
        let summary = sync.sync_pending().await;
        println!(
            "Synced {}/{} moods ({} failed)",
            summary.successful, summary.total, summary.failed
        );
    }

    state.shutdown().await;
    Ok(())
}
