// Player pool loading.
//
// A stats provider hands back one record per skater or goalie for a season.
// The draftable pool is built from those records by dropping unranked and
// unusable rows and keeping the top of the ADP board.

use std::collections::HashSet;
use std::io::Read;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

use crate::draft::pick::{parse_positions, DraftPlayer, SkaterStats};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// One player as reported by a stats provider.
#[derive(Debug, Clone, PartialEq)]
pub struct SkaterRecord {
    pub id: String,
    pub name: String,
    pub team: String,
    /// Eligibility string, e.g. "C/LW".
    pub positions: String,
    /// Average draft position. `None` means unranked.
    pub adp: Option<f64>,
    pub ownership_pct: Option<f64>,
    pub overall_rank: Option<u32>,
    pub position_rank: Option<u32>,
    pub stats: SkaterStats,
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("validation error: {0}")]
    Validation(String),
}

/// Source of season player data.
#[async_trait]
pub trait StatsProvider: Send + Sync {
    async fn fetch_players(&self, season: &str) -> Result<Vec<SkaterRecord>, ProviderError>;
}

// ---------------------------------------------------------------------------
// CSV provider
// ---------------------------------------------------------------------------

/// Raw CSV row. Columns not listed here are ignored.
#[derive(Debug, Deserialize)]
struct RawPlayerRow {
    id: String,
    name: String,
    #[serde(default)]
    team: String,
    positions: String,
    #[serde(default)]
    adp: Option<f64>,
    #[serde(default)]
    own_pct: Option<f64>,
    #[serde(default)]
    rank: Option<u32>,
    #[serde(default)]
    pos_rank: Option<u32>,
    #[serde(default)]
    gp: Option<f64>,
    #[serde(default)]
    g: Option<f64>,
    #[serde(default)]
    a: Option<f64>,
    #[serde(default)]
    pts: Option<f64>,
    #[serde(default)]
    plus_minus: Option<f64>,
    #[serde(default)]
    pim: Option<f64>,
    #[serde(default)]
    ppp: Option<f64>,
    #[serde(default)]
    sog: Option<f64>,
    #[serde(default)]
    hit: Option<f64>,
    #[serde(default)]
    blk: Option<f64>,
    #[serde(default)]
    w: Option<f64>,
    #[serde(default)]
    sv: Option<f64>,
    #[serde(default)]
    ga: Option<f64>,
    #[serde(default)]
    so: Option<f64>,
}

/// Round an optional counting stat, treating blanks and garbage as zero.
fn count(value: Option<f64>) -> u32 {
    value
        .filter(|v| v.is_finite() && *v > 0.0)
        .map_or(0, |v| v.round() as u32)
}

impl RawPlayerRow {
    fn into_record(self) -> SkaterRecord {
        let stats = SkaterStats {
            games_played: count(self.gp),
            goals: count(self.g),
            assists: count(self.a),
            points: count(self.pts),
            plus_minus: self
                .plus_minus
                .filter(|v| v.is_finite())
                .map_or(0, |v| v.round() as i32),
            penalty_minutes: count(self.pim),
            power_play_points: count(self.ppp),
            shots: count(self.sog),
            hits: count(self.hit),
            blocks: count(self.blk),
            wins: count(self.w),
            saves: count(self.sv),
            goals_against: count(self.ga),
            shutouts: count(self.so),
        };
        SkaterRecord {
            id: self.id.trim().to_string(),
            name: self.name.trim().to_string(),
            team: self.team.trim().to_string(),
            positions: self.positions.trim().to_string(),
            adp: self.adp,
            ownership_pct: self.own_pct,
            overall_rank: self.rank,
            position_rank: self.pos_rank,
            stats,
        }
    }
}

/// Parse player rows from any reader. Malformed rows are skipped.
pub fn load_records_from_reader<R: Read>(rdr: R) -> Result<Vec<SkaterRecord>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    let mut records = Vec::new();
    for result in reader.deserialize::<RawPlayerRow>() {
        match result {
            Ok(raw) => records.push(raw.into_record()),
            Err(e) => warn!("skipping malformed player row: {}", e),
        }
    }
    Ok(records)
}

/// Reads season data from a CSV file. A `{season}` placeholder in the path
/// is replaced with the requested season.
#[derive(Debug, Clone)]
pub struct CsvStatsProvider {
    path_template: String,
}

impl CsvStatsProvider {
    pub fn new(path_template: impl Into<String>) -> Self {
        CsvStatsProvider {
            path_template: path_template.into(),
        }
    }

    pub fn path_for(&self, season: &str) -> PathBuf {
        PathBuf::from(self.path_template.replace("{season}", season))
    }
}

#[async_trait]
impl StatsProvider for CsvStatsProvider {
    async fn fetch_players(&self, season: &str) -> Result<Vec<SkaterRecord>, ProviderError> {
        let path = self.path_for(season);
        let path_str = path.display().to_string();
        let bytes = tokio::fs::read(&path).await.map_err(|e| ProviderError::Io {
            path: path_str.clone(),
            source: e,
        })?;
        let records = load_records_from_reader(bytes.as_slice()).map_err(|e| ProviderError::Csv {
            path: path_str.clone(),
            source: e,
        })?;
        if records.is_empty() {
            return Err(ProviderError::Validation(format!(
                "no player rows found in {path_str}"
            )));
        }
        info!("Loaded {} player records for {} from {}", records.len(), season, path_str);
        Ok(records)
    }
}

// ---------------------------------------------------------------------------
// Draftable pool
// ---------------------------------------------------------------------------

/// Build the draftable pool from provider records.
///
/// Drops records that are unranked (ADP absent, zero, or not finite), have
/// no recognizable position, or repeat an earlier id. The rest are sorted by
/// ascending ADP and cut to `max_players`.
pub fn build_draft_pool(records: Vec<SkaterRecord>, max_players: usize) -> Vec<DraftPlayer> {
    let mut seen = HashSet::new();
    let mut pool: Vec<DraftPlayer> = Vec::new();

    for record in records {
        let Some(adp) = record.adp.filter(|a| a.is_finite() && *a > 0.0) else {
            continue;
        };
        let positions = parse_positions(&record.positions);
        if positions.is_empty() {
            warn!(
                "skipping '{}': unrecognized positions '{}'",
                record.name, record.positions
            );
            continue;
        }
        if !seen.insert(record.id.clone()) {
            warn!("skipping duplicate player id {}", record.id);
            continue;
        }
        pool.push(DraftPlayer {
            id: record.id,
            name: record.name,
            team: record.team,
            raw_positions: record.positions,
            positions,
            adp,
            stats: record.stats,
            ownership_pct: record.ownership_pct,
            overall_rank: record.overall_rank,
            position_rank: record.position_rank,
        });
    }

    pool.sort_by(|a, b| a.adp.partial_cmp(&b.adp).unwrap_or(std::cmp::Ordering::Equal));
    pool.truncate(max_players);
    pool
}
