pub mod client;
pub mod types;

pub use client::{SpotifyClient, MAX_IDS_PER_REQUEST, MAX_PAGE_LIMIT};
pub use types::{SavedTracksPage, Track};
