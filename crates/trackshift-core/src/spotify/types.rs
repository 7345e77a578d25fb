//! Wire types for the provider API and the domain [`Track`] they map into.

use serde::{Deserialize, Serialize};

use crate::session::AccountProfile;

/// A saved track. Immutable once fetched; identity is `id` only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Opaque provider identifier, unique within a collection.
    pub id: String,
    pub name: String,
    /// Artist names in the provider's order.
    pub artists: Vec<String>,
    pub album: String,
    pub image_url: Option<String>,
    pub duration_ms: u64,
}

/// One mapped page of a saved-tracks collection.
#[derive(Debug, Clone)]
pub struct SavedTracksPage {
    pub items: Vec<Track>,
    /// Collection size as reported by the provider.
    pub total: u64,
    /// Whether the provider advertises a further page.
    pub has_next: bool,
}

// ---- raw provider shapes ----

#[derive(Debug, Deserialize)]
pub(crate) struct SavedTracksResponse {
    pub items: Vec<SavedTrackItem>,
    pub total: u64,
    #[serde(default)]
    pub next: Option<String>,
}

impl SavedTracksResponse {
    pub fn into_page(self) -> SavedTracksPage {
        SavedTracksPage {
            has_next: self.next.is_some(),
            total: self.total,
            items: self.items.into_iter().map(|i| i.track.into_track()).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SavedTrackItem {
    pub track: TrackObject,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TrackObject {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ArtistObject>,
    pub album: AlbumObject,
    #[serde(default)]
    pub duration_ms: u64,
}

impl TrackObject {
    pub fn into_track(self) -> Track {
        Track {
            id: self.id,
            name: self.name,
            artists: self.artists.into_iter().map(|a| a.name).collect(),
            image_url: self.album.images.first().map(|i| i.url.clone()),
            album: self.album.name,
            duration_ms: self.duration_ms,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ArtistObject {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AlbumObject {
    pub name: String,
    #[serde(default)]
    pub images: Vec<ImageObject>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImageObject {
    pub url: String,
}

/// `/me` response shape.
#[derive(Debug, Deserialize)]
pub(crate) struct ProfileResponse {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub images: Vec<ImageObject>,
}

impl ProfileResponse {
    pub fn into_profile(self) -> AccountProfile {
        AccountProfile {
            image_url: self.images.first().map(|i| i.url.clone()),
            display_name: self.display_name.unwrap_or_else(|| self.id.clone()),
            id: self.id,
            email: self.email,
        }
    }
}
