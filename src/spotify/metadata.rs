use std::path::Path;

use serde_json::Value;

use crate::{
    CrawlError,
    management::{Dispatcher, PhaseReport, RowAccumulator, Table},
    types::{
        ArtistMetadataRow, AudioFeaturesResponse, Record, SeveralArtistsResponse,
        SeveralTracksResponse, TrackMetadataRow,
    },
    utils,
};

/// Lookup urls dispatched together in one batch.
pub const LOOKUP_BATCH: usize = 50;

/// One bulk lookup endpoint whose results get joined onto the track table.
pub trait MetadataJoiner {
    /// Phase name used in progress output and reports.
    const NAME: &'static str;
    /// Path below the API base url.
    const ENDPOINT: &'static str;
    /// Column of the track table holding the ids to look up.
    const ID_COLUMN: &'static str;
    /// Most ids the endpoint accepts in one request.
    const IDS_PER_REQUEST: usize;
    /// Columns the resulting table has even when no lookup succeeded. They
    /// come after the fields of the records, in provider order.
    const COLUMNS: &'static [&'static str];

    /// Turns one lookup response into rows. `null` entries (unknown ids) are
    /// skipped.
    fn flatten(payload: Value) -> Result<Vec<Record>, String>;
}

pub struct TrackMetadata;

impl MetadataJoiner for TrackMetadata {
    const NAME: &'static str = "track metadata";
    const ENDPOINT: &'static str = "tracks";
    const ID_COLUMN: &'static str = "track_id";
    const IDS_PER_REQUEST: usize = 50;
    const COLUMNS: &'static [&'static str] = &["track_id", "release_date"];

    fn flatten(payload: Value) -> Result<Vec<Record>, String> {
        let res: SeveralTracksResponse =
            serde_json::from_value(payload).map_err(|e| e.to_string())?;
        res.tracks
            .into_iter()
            .flatten()
            .map(|t| {
                utils::to_record(&TrackMetadataRow {
                    track_id: t.id,
                    release_date: t.album.release_date,
                })
            })
            .collect()
    }
}

pub struct ArtistMetadata;

impl MetadataJoiner for ArtistMetadata {
    const NAME: &'static str = "artist metadata";
    const ENDPOINT: &'static str = "artists";
    const ID_COLUMN: &'static str = "artist_id";
    const IDS_PER_REQUEST: usize = 50;
    const COLUMNS: &'static [&'static str] = &["id", "popularity", "artist_total_followers"];

    fn flatten(payload: Value) -> Result<Vec<Record>, String> {
        let res: SeveralArtistsResponse =
            serde_json::from_value(payload).map_err(|e| e.to_string())?;
        res.artists
            .into_iter()
            .flatten()
            .map(|a| {
                utils::to_record(&ArtistMetadataRow {
                    id: a.id,
                    popularity: a.popularity,
                    artist_total_followers: a.followers.total,
                })
            })
            .collect()
    }
}

pub struct AudioFeatures;

impl MetadataJoiner for AudioFeatures {
    const NAME: &'static str = "audio features";
    const ENDPOINT: &'static str = "audio-features";
    const ID_COLUMN: &'static str = "track_id";
    const IDS_PER_REQUEST: usize = 100;
    const COLUMNS: &'static [&'static str] = &["id"];

    fn flatten(payload: Value) -> Result<Vec<Record>, String> {
        let res: AudioFeaturesResponse =
            serde_json::from_value(payload).map_err(|e| e.to_string())?;
        Ok(res.audio_features.into_iter().flatten().collect())
    }
}

/// One lookup url per chunk of ids.
pub fn lookup_urls<J: MetadataJoiner>(api_url: &str, ids: &[String]) -> Vec<String> {
    utils::batch(ids, J::IDS_PER_REQUEST)
        .into_iter()
        .map(|chunk| {
            format!(
                "{api_url}/{endpoint}?ids={ids}",
                endpoint = J::ENDPOINT,
                ids = chunk.join(",")
            )
        })
        .collect()
}

/// Looks up the ids of `J::ID_COLUMN` in bulk, writes the rows to `path`
/// and returns them as a table together with the phase report.
///
/// Failed lookups only show up in the report: their ids are simply missing
/// from the table.
pub async fn join_metadata<J: MetadataJoiner>(
    tracks: &Table,
    api_url: &str,
    dispatcher: &Dispatcher,
    path: &Path,
) -> Result<(Table, PhaseReport), CrawlError> {
    let ids = utils::unique_ids(tracks.column(J::ID_COLUMN)?);
    let urls = lookup_urls::<J>(api_url, &ids);

    let mut acc = RowAccumulator::with_columns(J::COLUMNS);
    let report = dispatcher
        .run(J::NAME, &urls, LOOKUP_BATCH, |_, payload| {
            acc.append(J::flatten(payload)?);
            Ok(())
        })
        .await;
    report.print();

    let table = acc.build();
    table.write_csv(path).await?;
    Ok((table, report))
}
