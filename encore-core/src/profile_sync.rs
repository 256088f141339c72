use tracing::debug;

use encore_shared::User;

use crate::directory::artists_names;
use crate::{CoreResult, Repositories};

/// Rewrites the name copies stored on events after `user` changed profile.
pub async fn sync_event_names(repos: &Repositories, user: &User) -> CoreResult<()> {
    let renamed = repos.events.set_place_name(user.id, &user.profile.fullname).await?;

    let featured = repos.events.events_with_artist(user.id).await?;
    for event in &featured {
        let names = artists_names(repos, &event.artists).await?;
        repos.events.set_artists_names(event.id, &names).await?;
    }

    debug!(
        "Refreshed names for user {}: {} owned events, {} featured events",
        user.id,
        renamed,
        featured.len()
    );
    Ok(())
}
