use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::model::SimulationReport;

pub const DEFAULT_HISTORY_LIMIT: usize = 50;
pub const RECENT_TEAMS_LIMIT: usize = 10;

const HISTORY_FILE: &str = "history.json";
const TEAMS_FILE: &str = "teams.json";

/// One line of the simulation history, newest first on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub date: String,
    pub team_a_name: String,
    pub team_b_name: String,
    pub match_type: String,
    pub score: String,
    pub probability: String,
    pub outcome: String,
    pub coupon_count: usize,
    #[serde(default)]
    pub coupon_count_high: usize,
}

impl HistoryEntry {
    pub fn from_report(report: &SimulationReport) -> Self {
        let ft = &report.full_time;
        let stamp = DateTime::parse_from_rfc3339(&report.date)
            .map(|d| d.timestamp_millis())
            .unwrap_or_else(|_| Utc::now().timestamp_millis());
        Self {
            id: stamp.to_string(),
            date: report.date.clone(),
            team_a_name: report.team_a_name.clone(),
            team_b_name: report.team_b_name.clone(),
            match_type: report.match_settings.match_type.key().to_string(),
            score: ft.score_exact.to_string(),
            probability: format!("{:.2}", ft.score_exact_percent),
            outcome: outcome_label(report),
            coupon_count: report.coupon.len(),
            coupon_count_high: report.coupon_high_confidence.len(),
        }
    }
}

/// "Win <team>" when one side's probability beats both others, else "Draw".
pub fn outcome_label(report: &SimulationReport) -> String {
    let p = &report.full_time.probas;
    if p.win_a > p.win_b && p.win_a > p.draw {
        format!("Win {}", report.team_a_name)
    } else if p.win_b > p.win_a && p.win_b > p.draw {
        format!("Win {}", report.team_b_name)
    } else {
        "Draw".to_string()
    }
}

pub struct HistoryStore {
    path: PathBuf,
    limit: usize,
}

impl HistoryStore {
    pub fn new(dir: &Path, limit: usize) -> Self {
        Self {
            path: dir.join(HISTORY_FILE),
            limit: limit.max(1),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or unreadable history reads as empty.
    pub fn load(&self) -> Vec<HistoryEntry> {
        load_json(&self.path).unwrap_or_default()
    }

    /// Prepends `entry`, drops the oldest beyond the limit, returns the new list.
    pub fn add(&self, entry: HistoryEntry) -> Result<Vec<HistoryEntry>> {
        let mut history = self.load();
        history.insert(0, entry);
        history.truncate(self.limit);
        save_json(&self.path, &history).context("write simulation history")?;
        Ok(history)
    }

    pub fn clear(&self) -> Result<()> {
        save_json(&self.path, &Vec::<HistoryEntry>::new()).context("clear simulation history")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamData {
    #[serde(default)]
    pub recent_teams: Vec<String>,
    #[serde(default)]
    pub scores: HashMap<String, Vec<u32>>,
}

/// Recently used team names and the last goal history entered for each.
pub struct TeamBook {
    path: PathBuf,
}

impl TeamBook {
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(TEAMS_FILE),
        }
    }

    pub fn load(&self) -> TeamData {
        load_json(&self.path).unwrap_or_default()
    }

    /// Blank names and empty histories are ignored.
    pub fn remember(&self, name: &str, scores: &[u32]) -> Result<TeamData> {
        let name = name.trim();
        let mut data = self.load();
        if name.is_empty() || scores.is_empty() {
            return Ok(data);
        }

        if !data.recent_teams.iter().any(|t| t == name) {
            data.recent_teams.insert(0, name.to_string());
            data.recent_teams.truncate(RECENT_TEAMS_LIMIT);
        }
        data.scores.insert(name.to_string(), scores.to_vec());

        save_json(&self.path, &data).context("write team data")?;
        Ok(data)
    }
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let raw = fs::read_to_string(path).ok()?;
    match serde_json::from_str::<T>(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "ignoring unreadable store");
            None
        }
    }
}

fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string_pretty(value).context("serialize store")?;
    fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("swap {}", path.display()))?;
    Ok(())
}
