use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tabled::Tabled;

/// One JSON object per table row, in column order.
pub type Record = Map<String, Value>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub tracks: SearchTracks,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchTracks {
    pub items: Vec<Option<SearchTrack>>,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchTrack {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub popularity: u32,
    #[serde(default)]
    pub artists: Vec<SimpleArtist>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleArtist {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeveralTracksResponse {
    pub tracks: Vec<Option<FullTrack>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullTrack {
    pub id: String,
    pub album: TrackAlbum,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackAlbum {
    pub release_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeveralArtistsResponse {
    pub artists: Vec<Option<FullArtist>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullArtist {
    pub id: String,
    #[serde(default)]
    pub popularity: u32,
    pub followers: Followers,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Followers {
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioFeaturesResponse {
    pub audio_features: Vec<Option<Record>>,
}

/// Row of the raw track table, as observed in a search page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackRow {
    pub name: String,
    pub track_id: String,
    pub artist: String,
    pub artist_id: String,
    pub track_popularity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackMetadataRow {
    pub track_id: String,
    pub release_date: String,
}

/// Row of the artist metadata file. Columns keep the provider names and are
/// renamed when the dataset is merged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistMetadataRow {
    pub id: String,
    pub popularity: u32,
    pub artist_total_followers: Option<u64>,
}

#[derive(Tabled)]
pub struct PhaseSummaryRow {
    pub phase: String,
    pub requests: usize,
    pub succeeded: usize,
    pub failed: usize,
}
