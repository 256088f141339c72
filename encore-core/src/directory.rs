use std::collections::HashMap;
use uuid::Uuid;

use encore_shared::{Event, EventView, PublicUser, User};

use crate::{CoreError, CoreResult, Repositories};

pub async fn require_user(repos: &Repositories, id: Uuid) -> CoreResult<User> {
    repos
        .users
        .get_user(id)
        .await?
        .ok_or_else(|| CoreError::not_found("There is not an user with this id"))
}

pub async fn require_event(repos: &Repositories, id: Uuid) -> CoreResult<Event> {
    repos
        .events
        .get_event(id)
        .await?
        .ok_or_else(|| CoreError::not_found("There is not an event with this id"))
}

/// Loads the given users once each, keyed by id. Unknown ids are skipped.
pub async fn user_index(repos: &Repositories, ids: impl IntoIterator<Item = Uuid>) -> CoreResult<HashMap<Uuid, User>> {
    let mut wanted: Vec<Uuid> = ids.into_iter().collect();
    wanted.sort();
    wanted.dedup();
    if wanted.is_empty() {
        return Ok(HashMap::new());
    }

    let users = repos.users.get_users(&wanted).await?;
    Ok(users.into_iter().map(|u| (u.id, u)).collect())
}

pub fn public(index: &HashMap<Uuid, User>, id: Uuid) -> Option<PublicUser> {
    index.get(&id).map(PublicUser::from)
}

pub async fn event_views(repos: &Repositories, events: Vec<Event>) -> CoreResult<Vec<EventView>> {
    let index = user_index(
        repos,
        events.iter().flat_map(|e| e.artists.iter().copied().chain(std::iter::once(e.place))),
    )
    .await?;

    Ok(events
        .into_iter()
        .map(|event| {
            let artists = event.artists.iter().filter_map(|id| public(&index, *id)).collect();
            let place = public(&index, event.place);
            EventView::new(event, artists, place)
        })
        .collect())
}

pub async fn event_view(repos: &Repositories, event: Event) -> CoreResult<EventView> {
    let mut views = event_views(repos, vec![event]).await?;
    views
        .pop()
        .ok_or_else(|| CoreError::StorageError("event view went missing".to_string()))
}

/// Current profile names of the artists, in the given order.
pub async fn artists_names(repos: &Repositories, artists: &[Uuid]) -> CoreResult<Vec<String>> {
    let index = user_index(repos, artists.iter().copied()).await?;
    Ok(artists
        .iter()
        .filter_map(|id| index.get(id).map(|u| u.profile.fullname.clone()))
        .collect())
}
