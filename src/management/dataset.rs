use std::path::{Path, PathBuf};

use crate::{
    CrawlError,
    management::{PhaseReport, Table},
};

/// Files of one crawl inside its dated output folder.
#[derive(Debug, Clone)]
pub struct DatasetFiles {
    pub folder: PathBuf,
}

impl DatasetFiles {
    pub fn new(folder: PathBuf) -> Self {
        Self { folder }
    }

    pub async fn create(&self) -> Result<(), CrawlError> {
        async_fs::create_dir_all(&self.folder).await?;
        Ok(())
    }

    /// Raw search result, overwritten by the merged dataset at the end.
    pub fn tracks(&self) -> PathBuf {
        self.folder.join("track.csv")
    }

    pub fn artist_metadata(&self) -> PathBuf {
        self.folder.join("artist_metadata.csv")
    }

    pub fn track_metadata(&self) -> PathBuf {
        self.folder.join("track_metadata.csv")
    }

    pub fn track_features(&self) -> PathBuf {
        self.folder.join("track_features.csv")
    }

    pub fn failures(&self) -> PathBuf {
        self.folder.join("failures.json")
    }
}

/// Aligns the artist metadata columns with the track table and keeps one row
/// per artist.
pub fn prepare_artists(mut artists: Table) -> Result<Table, CrawlError> {
    artists
        .rename("id", "artist_id")
        .rename("popularity", "artist_popularity");
    artists.dedupe_on(&["artist_id"])
}

pub fn prepare_features(mut features: Table) -> Table {
    features.rename("id", "track_id");
    features
}

/// Joins the track table with artist metadata, track metadata and audio
/// features. Tracks missing from any of them are dropped.
pub fn merge_dataset(
    tracks: &Table,
    artists: &Table,
    track_metadata: &Table,
    features: &Table,
) -> Result<Table, CrawlError> {
    tracks
        .inner_join(artists, "artist_id")?
        .inner_join(track_metadata, "track_id")?
        .inner_join(features, "track_id")
}

/// Writes every phase report as pretty JSON.
pub async fn persist_reports(path: &Path, reports: &[PhaseReport]) -> Result<(), CrawlError> {
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }

    let json = serde_json::to_string_pretty(reports)?;
    async_fs::write(path, json).await?;
    Ok(())
}
