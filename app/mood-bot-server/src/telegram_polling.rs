//! Long-polling loop against `getUpdates`.

use anyhow::{Context, Result};
use std::time::Duration;

use mood_bot::config::TelegramConfig;

use crate::{dispatch, AppState};

const RETRY_PAUSE: Duration = Duration::from_secs(3);

pub async fn run(state: AppState, config: &TelegramConfig) -> Result<()> {
    // A registered webhook makes getUpdates fail.
    state
        .telegram
        .delete_webhook(config.skip_pending_updates)
        .await
        .context("Failed to remove webhook before polling")?;

    tracing::info!(
        timeout_secs = config.poll_timeout_secs,
        skip_pending = config.skip_pending_updates,
        "✅ Polling for updates"
    );

    let mut offset: Option<i64> = None;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown requested, stopping polling");
                return Ok(());
            }
            polled = state.telegram.get_updates(offset, config.poll_timeout_secs) => {
                match polled {
                    Ok(updates) => {
                        for update in updates {
                            offset = Some(next_offset(offset, update.update_id));
                            dispatch(&state, update);
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "getUpdates failed, retrying");
                        tokio::time::sleep(RETRY_PAUSE).await;
                    }
                }
            }
        }
    }
}

/// Offset that acknowledges `update_id` without moving backwards.
fn next_offset(current: Option<i64>, update_id: i64) -> i64 {
    current.map_or(update_id + 1, |o| o.max(update_id + 1))
}
