use std::{sync::Arc, time::Duration};

use serde_json::Value;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::{
    info,
    management::{Dispatcher, FixedDelay, PhaseReport, RowAccumulator, Table},
    spotify::fetch::PageFetcher,
    types::{Record, SearchResponse, TrackRow},
    utils, warning,
};

pub const TRACK_COLUMNS: &[&str] = &["name", "track_id", "artist", "artist_id", "track_popularity"];

/// Batch sizes and pauses of the two search phases.
#[derive(Debug, Clone)]
pub struct SearchPlan {
    pub prefix_batch: usize,
    pub prefix_cooldown: Duration,
    pub phase_pause: Duration,
    pub overflow_batch: usize,
    pub overflow_cooldown: Duration,
}

impl Default for SearchPlan {
    fn default() -> Self {
        Self {
            prefix_batch: 100,
            prefix_cooldown: Duration::from_secs(10),
            phase_pause: Duration::from_secs(30),
            overflow_batch: 30,
            overflow_cooldown: Duration::from_secs(15),
        }
    }
}

impl SearchPlan {
    /// Same batch sizes, no waiting.
    pub fn immediate() -> Self {
        Self {
            prefix_cooldown: Duration::ZERO,
            phase_pause: Duration::ZERO,
            overflow_cooldown: Duration::ZERO,
            ..Self::default()
        }
    }
}

#[derive(Debug)]
pub struct SearchOutcome {
    pub tracks: Table,
    pub reports: Vec<PhaseReport>,
    /// Prefixes with more results than the offset ceiling allows reading.
    pub truncated: usize,
}

/// Builds the search query for one track name prefix.
pub fn search_url(api_url: &str, genre: &str, year: i32, prefix: &str) -> String {
    format!(
        "{api_url}/search?q=genre:{genre}+year:{year}+track:{prefix}*&type=track&limit={limit}",
        limit = utils::SEARCH_PAGE_SIZE
    )
}

/// One search url per three letter prefix, in prefix order.
pub fn search_urls(api_url: &str, genre: &str, year: i32) -> Vec<String> {
    utils::enumerate_prefixes()
        .iter()
        .map(|prefix| search_url(api_url, genre, year, prefix))
        .collect()
}

/// Turns a search page into track rows and returns them with the total
/// result count the search reported.
///
/// Only the first artist of a track is kept; tracks without any artist are
/// skipped.
pub fn parse_search_page(payload: Value) -> Result<(Vec<Record>, u64), String> {
    let page: SearchResponse = serde_json::from_value(payload).map_err(|e| e.to_string())?;

    let mut rows = Vec::with_capacity(page.tracks.items.len());
    for track in page.tracks.items.into_iter().flatten() {
        let Some(artist) = track.artists.first() else {
            continue;
        };
        rows.push(utils::to_record(&TrackRow {
            name: track.name.clone(),
            track_id: track.id.clone(),
            artist: artist.name.clone(),
            artist_id: artist.id.clone().unwrap_or_default(),
            track_popularity: track.popularity,
        })?);
    }

    Ok((rows, page.tracks.total))
}

/// Searches every track of `genre` released in `year` by walking the
/// alphabetical prefix space, then reads the extra pages of every prefix with
/// more than one page of results.
///
/// Returns the raw, not yet deduplicated, track table.
pub async fn naive_search_tracks(
    fetcher: Arc<dyn PageFetcher>,
    api_url: &str,
    genre: &str,
    year: i32,
    plan: &SearchPlan,
    cancel: CancellationToken,
) -> SearchOutcome {
    let mut acc = RowAccumulator::with_columns(TRACK_COLUMNS);
    let mut overflow: Vec<(String, u64)> = Vec::new();

    let urls = search_urls(api_url, genre, year);
    info!("First batch: performing {} requests ...", urls.len());

    let dispatcher = Dispatcher::new(Arc::clone(&fetcher), FixedDelay::new(plan.prefix_cooldown))
        .with_cancellation(cancel.clone());
    let first = dispatcher
        .run("search", &urls, plan.prefix_batch, |url, payload| {
            let (rows, total) = parse_search_page(payload)?;
            acc.append(rows);
            if total > utils::SEARCH_PAGE_SIZE {
                overflow.push((url.to_string(), total));
            }
            Ok(())
        })
        .await;
    first.print();

    let truncated = overflow
        .iter()
        .filter(|(_, total)| utils::is_truncated(*total))
        .count();
    if truncated > 0 {
        warning!(
            "{} prefixes report more than {} results, the rest cannot be read",
            truncated,
            utils::SEARCH_OFFSET_CEILING
        );
    }

    let overflow_urls: Vec<String> = overflow
        .iter()
        .flat_map(|(url, total)| utils::resolve_overflow(url, *total))
        .collect();

    info!("Second batch: performing {} requests ...", overflow_urls.len());

    if !overflow_urls.is_empty() && !cancel.is_cancelled() {
        tokio::select! {
            _ = sleep(plan.phase_pause) => {}
            _ = cancel.cancelled() => {}
        }
    }

    let dispatcher = Dispatcher::new(fetcher, FixedDelay::new(plan.overflow_cooldown))
        .with_cancellation(cancel);
    let second = dispatcher
        .run(
            "search overflow",
            &overflow_urls,
            plan.overflow_batch,
            |_, payload| {
                let (rows, _) = parse_search_page(payload)?;
                acc.append(rows);
                Ok(())
            },
        )
        .await;
    second.print();

    SearchOutcome {
        tracks: acc.build(),
        reports: vec![first, second],
        truncated,
    }
}
