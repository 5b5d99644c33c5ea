use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{Movie, PosterSize};

const JOURNAL_VERSION: &str = "1.0.0";
const JOURNAL_FILENAME: &str = "search-journal.json";

/// One journaled search term with its display metadata. Metadata is captured
/// from the top result the first time the term is recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRecord {
    pub query: String,
    pub count: u64,
    pub movie_id: u64,
    pub title: String,
    pub poster_url: Option<String>,
    pub last_searched_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JournalFile {
    version: String,
    updated_at: DateTime<Utc>,
    records: Vec<SearchRecord>,
}

/// JSON-file-backed store of search counts. Writes persist the whole file;
/// reads are served from memory.
#[derive(Debug)]
pub struct SearchJournal {
    path: PathBuf,
    records: Mutex<HashMap<String, SearchRecord>>,
}

impl SearchJournal {
    /// Open the journal under the given data directory. A missing file
    /// starts an empty journal; an unreadable or incompatible one is logged
    /// and abandoned, since trending is a best-effort feature.
    pub fn open(data_dir: impl AsRef<Path>) -> Self {
        let path = data_dir.as_ref().join(JOURNAL_FILENAME);
        let records = match Self::read_file(&path) {
            Ok(Some(file)) => file
                .records
                .into_iter()
                .map(|record| (record.query.clone(), record))
                .collect(),
            Ok(None) => HashMap::new(),
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    path = %path.display(),
                    "failed to load search journal, starting empty"
                );
                HashMap::new()
            }
        };

        Self {
            path,
            records: Mutex::new(records),
        }
    }

    fn read_file(path: &Path) -> Result<Option<JournalFile>> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let file: JournalFile =
            serde_json::from_str(&contents).context("failed to parse journal json")?;
        if file.version != JOURNAL_VERSION {
            anyhow::bail!(
                "journal schema mismatch (found {}, expected {})",
                file.version,
                JOURNAL_VERSION
            );
        }
        Ok(Some(file))
    }

    /// Count a search for `query`, capturing display metadata from the top
    /// result on first occurrence, and persist the journal.
    pub fn record_search(&self, query: &str, top_result: &Movie) -> Result<()> {
        let mut records = self.records.lock().expect("journal lock poisoned");

        records
            .entry(query.to_string())
            .and_modify(|record| {
                record.count += 1;
                record.last_searched_at = Utc::now();
            })
            .or_insert_with(|| SearchRecord {
                query: query.to_string(),
                count: 1,
                movie_id: top_result.id,
                title: top_result.title.clone(),
                poster_url: top_result.poster_url(PosterSize::W500),
                last_searched_at: Utc::now(),
            });

        self.persist(&records)
    }

    /// The most frequently searched terms, highest count first. Ties break
    /// on the most recent search so the ordering is stable for display.
    pub fn trending(&self, limit: usize) -> Vec<SearchRecord> {
        let records = self.records.lock().expect("journal lock poisoned");
        let mut ranked: Vec<SearchRecord> = records.values().cloned().collect();
        ranked.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| b.last_searched_at.cmp(&a.last_searched_at))
                .then_with(|| a.query.cmp(&b.query))
        });
        ranked.truncate(limit);
        ranked
    }

    pub fn len(&self) -> usize {
        self.records.lock().expect("journal lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn persist(&self, records: &HashMap<String, SearchRecord>) -> Result<()> {
        let file = JournalFile {
            version: JOURNAL_VERSION.to_string(),
            updated_at: Utc::now(),
            records: records.values().cloned().collect(),
        };
        let json = serde_json::to_string(&file).context("failed to serialize journal")?;
        fs::write(&self.path, json)
            .with_context(|| format!("failed to write journal '{}'", self.path.display()))
    }
}
