use std::{path::PathBuf, time::Duration};

use chrono::Local;
use tabled::Table as SummaryTable;
use tokio_util::sync::CancellationToken;

use crate::{
    Res, config, error, info,
    management::{
        DatasetFiles, Dispatcher, FixedDelay, PhaseReport, Table, merge_dataset, persist_reports,
        prepare_artists, prepare_features,
    },
    spotify::{
        Connect, SpotifyConnector, auth,
        metadata::{ArtistMetadata, AudioFeatures, MetadataJoiner, TrackMetadata, join_metadata},
        search::{SearchPlan, naive_search_tracks},
    },
    success,
    types::PhaseSummaryRow,
    utils, warning,
};

/// Timing of a crawl. Production values are fixed, tests run without waits.
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub api_url: String,
    pub search: SearchPlan,
    pub metadata_cooldown: Duration,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            api_url: config::spotify_apiurl(),
            search: SearchPlan::default(),
            metadata_cooldown: Duration::from_secs(5),
        }
    }
}

#[derive(Debug)]
pub struct CrawlOutcome {
    pub dataset: Table,
    pub reports: Vec<PhaseReport>,
    /// The run was cancelled and `dataset` is the raw search result.
    pub interrupted: bool,
}

pub async fn crawl(genre: String, year: i32) {
    let cancel = CancellationToken::new();
    let signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warning!("Interrupted. Finishing with the data collected so far ...");
            signal.cancel();
        }
    });

    let files = DatasetFiles::new(PathBuf::from(utils::dated_folder_name(
        Local::now().date_naive(),
    )));

    let credentials = match auth::load_credentials(&config::credentials_path()).await {
        Ok(c) => c,
        Err(e) => error!(
            "Cannot load credentials from {}. Err: {}",
            config::credentials_path().display(),
            e
        ),
    };
    let connector = SpotifyConnector::new(credentials, config::request_timeout());

    info!(
        "Downloading tracks + metadata for tracks with genre {} and year {}",
        genre, year
    );

    match full_download(
        &connector,
        &files,
        &genre,
        year,
        &CrawlSettings::default(),
        cancel,
    )
    .await
    {
        Ok(outcome) => {
            let rows: Vec<PhaseSummaryRow> =
                outcome.reports.iter().map(|r| r.summary_row()).collect();
            println!("{}", SummaryTable::new(rows));
            if outcome.interrupted {
                warning!(
                    "Raw search result with {} tracks written to {}",
                    outcome.dataset.len(),
                    files.tracks().display()
                );
            } else {
                success!(
                    "Dataset with {} tracks written to {}",
                    outcome.dataset.len(),
                    files.tracks().display()
                );
            }
        }
        Err(e) => error!("Crawl failed. Err: {}", e),
    }
}

/// Runs the whole pipeline into `files`: search, deduplication, the three
/// metadata lookups and the final merge.
///
/// Failed requests never abort the run, they only shrink the dataset. The
/// reports of all phases are returned and, when anything failed, written next
/// to the dataset.
///
/// Once `cancel` fires no further phase starts. The raw search result stays in
/// `track.csv` and is returned as the dataset.
pub async fn full_download(
    connector: &dyn Connect,
    files: &DatasetFiles,
    genre: &str,
    year: i32,
    settings: &CrawlSettings,
    cancel: CancellationToken,
) -> Res<CrawlOutcome> {
    files.create().await?;

    let fetcher = connector.connect().await?;
    let search = naive_search_tracks(
        fetcher,
        &settings.api_url,
        genre,
        year,
        &settings.search,
        cancel.clone(),
    )
    .await;
    let raw = search.tracks;
    let mut reports = search.reports;

    raw.write_csv(&files.tracks()).await?;
    if cancel.is_cancelled() {
        return interrupted(files, raw, reports).await;
    }

    let tracks = raw.dedupe_on(&["name", "artist"])?;

    info!("Searching for audio features for {} tracks", tracks.len());

    reports.push(
        lookup::<ArtistMetadata>(connector, &tracks, settings, &files.artist_metadata(), &cancel)
            .await?,
    );
    if cancel.is_cancelled() {
        return interrupted(files, raw, reports).await;
    }

    reports.push(
        lookup::<TrackMetadata>(connector, &tracks, settings, &files.track_metadata(), &cancel)
            .await?,
    );
    if cancel.is_cancelled() {
        return interrupted(files, raw, reports).await;
    }

    reports.push(
        lookup::<AudioFeatures>(connector, &tracks, settings, &files.track_features(), &cancel)
            .await?,
    );
    if cancel.is_cancelled() {
        return interrupted(files, raw, reports).await;
    }

    let artists = prepare_artists(Table::read_csv(&files.artist_metadata()).await?)?;
    let track_metadata = Table::read_csv(&files.track_metadata()).await?;
    let features = prepare_features(Table::read_csv(&files.track_features()).await?);

    let dataset = merge_dataset(&tracks, &artists, &track_metadata, &features)?;
    dataset.write_csv(&files.tracks()).await?;

    persist_failures(files, &reports).await?;

    Ok(CrawlOutcome {
        dataset,
        reports,
        interrupted: false,
    })
}

/// Ends a cancelled run without merging. Lookups that never finished would
/// empty the inner joins, so the raw search result is kept instead.
async fn interrupted(
    files: &DatasetFiles,
    raw: Table,
    reports: Vec<PhaseReport>,
) -> Res<CrawlOutcome> {
    warning!(
        "Crawl cancelled, skipping the remaining phases. Raw search result kept in {}",
        files.tracks().display()
    );
    persist_failures(files, &reports).await?;

    Ok(CrawlOutcome {
        dataset: raw,
        reports,
        interrupted: true,
    })
}

async fn persist_failures(files: &DatasetFiles, reports: &[PhaseReport]) -> Res<()> {
    if reports.iter().any(|r| r.has_failures()) {
        persist_reports(&files.failures(), reports).await?;
        warning!(
            "{} requests failed, see {}",
            reports.iter().map(|r| r.failed_count()).sum::<usize>(),
            files.failures().display()
        );
    }
    Ok(())
}

async fn lookup<J: MetadataJoiner>(
    connector: &dyn Connect,
    tracks: &Table,
    settings: &CrawlSettings,
    path: &std::path::Path,
    cancel: &CancellationToken,
) -> Res<PhaseReport> {
    let fetcher = connector.connect().await?;
    let dispatcher = Dispatcher::new(fetcher, FixedDelay::new(settings.metadata_cooldown))
        .with_cancellation(cancel.clone());
    let (_, report) = join_metadata::<J>(tracks, &settings.api_url, &dispatcher, path).await?;
    Ok(report)
}
