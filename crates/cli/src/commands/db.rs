//! Database maintenance commands.

use super::{ConnectError, connect};

/// Create the indexes the admin server relies on.
///
/// The server also attempts this at startup; running it ahead of a deploy
/// surfaces permission problems early.
pub async fn indexes() -> Result<(), ConnectError> {
    let store = connect().await?;
    store.ensure_indexes().await?;
    tracing::info!("Indexes are in place");
    Ok(())
}
