//! Hand-off of derived tables to the presentation layer.
//!
//! Supports pretty-printing, JSON rendering, and CSV files on disk.

use crate::aggregators::types::DerivedTable;
use crate::error::{Result, RollupError};
use crate::pipeline::Rollups;
use async_trait::async_trait;
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Receives a complete set of rollups for one date range.
#[async_trait]
pub trait TableSink: Send + Sync {
    async fn publish(&self, rollups: &Rollups) -> Result<()>;
}

/// Writes one CSV per table into a directory, plus `summary.json` and
/// `rfm_leaderboards.json`.
pub struct DirectorySink {
    dir: PathBuf,
    gzip: bool,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>, gzip: bool) -> Self {
        Self {
            dir: dir.into(),
            gzip,
        }
    }

    async fn write_table<R: Serialize>(&self, table: &DerivedTable<R>) -> Result<()> {
        let mut body = table_to_csv(table)?;
        if self.gzip {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(&body)?;
            body = encoder.finish()?;
        }

        let path = table_file(&self.dir, table.name, self.gzip);
        debug!(path = %path.display(), rows = table.len(), "Writing table");
        tokio::fs::write(&path, body).await?;
        Ok(())
    }

    async fn write_json(&self, name: &str, value: &impl Serialize) -> Result<()> {
        let body = serde_json::to_vec_pretty(value)?;
        tokio::fs::write(self.dir.join(name), body).await?;
        Ok(())
    }
}

#[async_trait]
impl TableSink for DirectorySink {
    #[tracing::instrument(skip_all, fields(dir = %self.dir.display(), gzip = self.gzip))]
    async fn publish(&self, rollups: &Rollups) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;

        self.write_table(&rollups.daily_count).await?;
        self.write_table(&rollups.registered_total).await?;
        self.write_table(&rollups.casual_total).await?;
        self.write_table(&rollups.weather_total).await?;
        self.write_table(&rollups.season_total).await?;
        self.write_table(&rollups.season_split).await?;
        self.write_table(&rollups.monthly_trend).await?;
        self.write_table(&rollups.rfm).await?;
        self.write_json("summary.json", &rollups.summary).await?;
        self.write_json("rfm_leaderboards.json", &rollups.rfm_leaderboards)
            .await?;

        info!("Rollups written");
        Ok(())
    }
}

/// Serializes a table as CSV with a header row.
///
/// An empty table produces an empty body since headers come from the rows.
pub fn table_to_csv<R: Serialize>(table: &DerivedTable<R>) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in &table.rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| RollupError::Io(e.into_error()))
}

/// Renders every table as pretty JSON.
pub fn render_json(rollups: &Rollups) -> Result<String> {
    Ok(serde_json::to_string_pretty(rollups)?)
}

/// Logs the rollups using Rust's debug pretty-print format.
pub fn print_pretty(rollups: &Rollups) {
    debug!("{:#?}", rollups);
}

/// Path of the CSV a [`DirectorySink`] writes for `name`.
pub fn table_file(dir: &Path, name: &str, gzip: bool) -> PathBuf {
    if gzip {
        dir.join(format!("{}.csv.gz", name))
    } else {
        dir.join(format!("{}.csv", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregators::types::SeasonTotal;
    use crate::pipeline::PipelineContext;
    use crate::records::Season;
    use crate::store::load;
    use chrono::NaiveDate;

    fn rollups() -> Rollups {
        let daily = "datetime,season,year,month,weather_condition,casual,registered,total_count\n\
                     2011-01-01,Spring,2011,Jan,1,5,10,15\n\
                     2011-01-02,Spring,2011,Jan,2,2,8,10\n";
        let hourly = "datetime,season,year,month,weather_condition,casual,registered,total_count\n\
                      2011-01-01 08:00:00,Spring,2011,Jan,1,1,1,2\n";
        let (d, h) = load(daily.as_bytes(), hourly.as_bytes()).unwrap();
        let start = NaiveDate::from_ymd_opt(2011, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2011, 1, 2).unwrap();
        PipelineContext::new(d, h).rollups(start, end).unwrap()
    }

    #[test]
    fn test_table_to_csv_has_header_and_rows() {
        let table = DerivedTable::new(
            "season_total",
            vec![SeasonTotal {
                season: Season::Spring,
                total_count: 25,
            }],
        );
        let csv = String::from_utf8(table_to_csv(&table).unwrap()).unwrap();
        assert_eq!(csv, "season,total_count\nSpring,25\n");
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&rollups());
    }

    #[test]
    fn test_render_json_contains_tables() {
        let json = render_json(&rollups()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["summary"]["total_rentals"], 25);
        assert_eq!(value["registered_total"]["rows"][0]["register_sum"], 10);
        assert_eq!(value["registered_total"]["rows"][0]["datetime"], "2011-01-01");
    }

    #[tokio::test]
    async fn test_directory_sink_writes_every_table() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path(), false);
        sink.publish(&rollups()).await.unwrap();

        for name in [
            "daily_count",
            "registered_total",
            "casual_total",
            "weather_total",
            "season_total",
            "season_split",
            "monthly_trend",
            "rfm",
        ] {
            assert!(table_file(dir.path(), name, false).exists(), "{name}");
        }
        let season = std::fs::read_to_string(dir.path().join("season_total.csv")).unwrap();
        assert_eq!(season, "season,total_count\nSpring,25\n");
        assert!(dir.path().join("summary.json").exists());
    }

    #[tokio::test]
    async fn test_directory_sink_gzip() {
        use flate2::read::GzDecoder;
        use std::io::Read;

        let dir = tempfile::tempdir().unwrap();
        DirectorySink::new(dir.path(), true)
            .publish(&rollups())
            .await
            .unwrap();

        let path = table_file(dir.path(), "casual_total", true);
        let mut decoded = String::new();
        GzDecoder::new(std::fs::File::open(path).unwrap())
            .read_to_string(&mut decoded)
            .unwrap();
        assert_eq!(
            decoded,
            "datetime,casual_sum\n2011-01-01,5\n2011-01-02,2\n"
        );
    }
}
