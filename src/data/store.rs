//! Historical-row providers.
//!
//! The engine consumes plain records and never prescribes a storage
//! format; a provider only has to return every row up to and including
//! the requested week, per entity type. The CSV store reads one file
//! per entity type from a data directory. A malformed record is
//! excluded and reported rather than aborting the period.

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::core::types::{AdGroupRow, AudienceRow, CampaignRow};
use crate::error::EngineError;

/// Source of historical rows, truncated at the requested week.
pub trait HistoryProvider {
    fn campaigns_through(&self, week: u32) -> Result<Vec<CampaignRow>>;
    fn ad_groups_through(&self, week: u32) -> Result<Vec<AdGroupRow>>;
    fn audiences_through(&self, week: u32) -> Result<Vec<AudienceRow>>;

    /// Highest week present across all three entity types.
    fn latest_week(&self) -> Result<Option<u32>> {
        let campaigns = self.campaigns_through(u32::MAX)?.iter().map(|r| r.week).max();
        let ad_groups = self.ad_groups_through(u32::MAX)?.iter().map(|r| r.week).max();
        let audiences = self.audiences_through(u32::MAX)?.iter().map(|r| r.week).max();
        Ok([campaigns, ad_groups, audiences].into_iter().flatten().max())
    }
}

/// Directory of weekly CSV files, one per entity type.
pub struct CsvStore {
    dir: PathBuf,
}

impl CsvStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn read_rows<T: DeserializeOwned>(&self, file: &str, week: u32, week_of: impl Fn(&T) -> u32) -> Result<Vec<T>> {
        let path = self.dir.join(file);
        let mut reader = csv::Reader::from_path(&path)
            .map_err(|err| EngineError::Data(format!("opening {}: {err}", path.display())))?;
        let mut rows = Vec::new();
        for (line, record) in reader.deserialize::<T>().enumerate() {
            match record {
                Ok(row) if week_of(&row) <= week => rows.push(row),
                Ok(_) => {}
                Err(err) => {
                    warn!(file, line, %err, "skipping malformed record");
                }
            }
        }
        Ok(rows)
    }

    /// Append one week's rows to a CSV file, writing headers only when
    /// the file is new.
    pub fn append_week<T: Serialize>(&self, file: &str, rows: &[T]) -> Result<()> {
        let path = self.dir.join(file);
        let existed = Path::new(&path).exists();
        let handle = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|err| EngineError::Data(format!("opening {} for append: {err}", path.display())))?;
        let mut writer = csv::WriterBuilder::new().has_headers(!existed).from_writer(handle);
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl HistoryProvider for CsvStore {
    fn campaigns_through(&self, week: u32) -> Result<Vec<CampaignRow>> {
        self.read_rows("campaigns.csv", week, |r: &CampaignRow| r.week)
    }

    fn ad_groups_through(&self, week: u32) -> Result<Vec<AdGroupRow>> {
        self.read_rows("ad_groups.csv", week, |r: &AdGroupRow| r.week)
    }

    fn audiences_through(&self, week: u32) -> Result<Vec<AudienceRow>> {
        self.read_rows("audiences.csv", week, |r: &AudienceRow| r.week)
    }
}

/// In-memory provider for tests and seeded runs.
#[derive(Default, Clone)]
pub struct MemoryStore {
    pub campaigns: Vec<CampaignRow>,
    pub ad_groups: Vec<AdGroupRow>,
    pub audiences: Vec<AudienceRow>,
}

impl HistoryProvider for MemoryStore {
    fn campaigns_through(&self, week: u32) -> Result<Vec<CampaignRow>> {
        Ok(self.campaigns.iter().filter(|r| r.week <= week).cloned().collect())
    }

    fn ad_groups_through(&self, week: u32) -> Result<Vec<AdGroupRow>> {
        Ok(self.ad_groups.iter().filter(|r| r.week <= week).cloned().collect())
    }

    fn audiences_through(&self, week: u32) -> Result<Vec<AudienceRow>> {
        Ok(self.audiences.iter().filter(|r| r.week <= week).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn campaign(id: u32, week: u32) -> CampaignRow {
        CampaignRow {
            campaign_id: id,
            campaign_name: format!("Campaign {id}"),
            channel: "search".into(),
            model_line: "sedan".into(),
            week,
            weekly_budget_allocated: 500.0,
            weekly_budget_spent: 480.0,
            impressions: 1000,
            clicks: 50,
            conversions: 5,
            conversion_value: 2000.0,
            roas: 45.0,
            ctr: 0.05,
            cvr: 0.1,
        }
    }

    fn audience(id: &str, week: u32) -> AudienceRow {
        AudienceRow {
            audience_id: id.into(),
            audience_name: id.into(),
            week,
            intent_score: 70.0,
            fatigue_score: 20.0,
            avg_ctr: 0.02,
            avg_cvr: 0.04,
            frequency: 3.0,
            is_suppressed: false,
        }
    }

    #[test]
    fn unreadable_file_is_a_data_error() {
        let store = CsvStore::new("/definitely/not/here");
        let err = store.campaigns_through(1).unwrap_err();
        assert!(matches!(err.downcast_ref::<EngineError>(), Some(EngineError::Data(_))));
    }

    #[test]
    fn latest_week_spans_all_entity_types() {
        let store = MemoryStore {
            campaigns: vec![campaign(1, 2)],
            audiences: vec![audience("AUD1", 4)],
            ..Default::default()
        };
        assert_eq!(store.latest_week().unwrap(), Some(4));
    }

    #[test]
    fn memory_store_truncates_at_requested_week() {
        let store = MemoryStore {
            campaigns: vec![campaign(1, 1), campaign(1, 2), campaign(1, 3)],
            ..Default::default()
        };
        assert_eq!(store.campaigns_through(2).unwrap().len(), 2);
        assert_eq!(store.latest_week().unwrap(), Some(3));
    }

    #[test]
    fn csv_roundtrip_skips_malformed_records() {
        let dir = std::env::temp_dir().join(format!("spendpilot-store-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let store = CsvStore::new(&dir);
        store.append_week("campaigns.csv", &[campaign(1, 1), campaign(2, 1)]).unwrap();

        // Inject a malformed line by hand.
        use std::io::Write;
        let mut f = OpenOptions::new().append(true).open(dir.join("campaigns.csv")).unwrap();
        writeln!(f, "not,a,valid,row").unwrap();
        drop(f);

        store.append_week("campaigns.csv", &[campaign(3, 2)]).unwrap();
        let rows = store.campaigns_through(2).unwrap();
        assert_eq!(rows.len(), 3, "valid rows survive a malformed neighbour");
        std::fs::remove_dir_all(&dir).ok();
    }
}
