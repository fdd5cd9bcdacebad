use chrono::Utc;
use tracing::{debug, info, warn};

use crate::storage::models::{HistoryEntry, UserRecord};
use crate::tokens;
use crate::AppState;

/// Result of one delivery attempt for one user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    /// Delivery failed but the primary token verified (possibly after a
    /// refresh); the next run will try again
    FailedRecoverable,
    /// Delivery and verification both failed. The user stays registered.
    FailedTerminal,
    /// The user never opted in to notifications
    Skipped,
}

/// Run one pass over every registered user and record it in the history.
///
/// Passes are serialized: a manual trigger waits for a scheduled pass in
/// progress and vice versa. Individual failures never abort the pass.
pub async fn run_once(state: &AppState) -> HistoryEntry {
    let _guard = state.dispatch_guard.lock().await;
    debug!("Running notification dispatch");

    let mut recipients = Vec::new();
    let (mut recoverable, mut terminal) = (0usize, 0usize);

    for user in state.registry.all_users() {
        let display_name = user.display_name.clone();
        match dispatch_to(state, user).await {
            DeliveryOutcome::Delivered => recipients.push(display_name),
            DeliveryOutcome::FailedRecoverable => recoverable += 1,
            DeliveryOutcome::FailedTerminal => terminal += 1,
            DeliveryOutcome::Skipped => {}
        }
    }

    let entry = state.history.append(recipients);
    info!(
        sequence = entry.sequence,
        delivered = entry.recipients.len(),
        recoverable,
        terminal,
        "{}",
        entry.summary()
    );
    entry
}

/// Deliver to one user, falling back to token verification on failure.
///
/// Refreshed credentials are written back to the registry only if the stored
/// credentials are still the ones this attempt started from. A user removed
/// while the attempt was in flight stays removed, and a login that happened
/// meanwhile keeps its tokens.
pub async fn dispatch_to(state: &AppState, mut user: UserRecord) -> DeliveryOutcome {
    let Some(bot_token) = user.bot_access_token.clone() else {
        return DeliveryOutcome::Skipped;
    };

    let message = format!("{} {}", state.config.notify.message, Utc::now().to_rfc3339());
    let error = match state.provider.notify(&bot_token, &message).await {
        Ok(()) => {
            debug!(user_id = %user.user_id, "Notification delivered");
            return DeliveryOutcome::Delivered;
        }
        Err(e) => e,
    };
    warn!(user_id = %user.user_id, error = %error, "Notification delivery failed");

    let previous = user.credentials.clone();
    let verified = tokens::verify(&state.provider, &state.config.tokens, &mut user).await;

    if user.credentials != previous
        && !state
            .registry
            .update_credentials(&user.user_id, &previous, user.credentials.clone())
    {
        debug!(user_id = %user.user_id, "User removed or logged in again during dispatch, dropping refreshed tokens");
    }

    if verified {
        DeliveryOutcome::FailedRecoverable
    } else {
        DeliveryOutcome::FailedTerminal
    }
}
