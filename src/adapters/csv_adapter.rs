//! CSV file data adapter.
//!
//! Serves bar data from a directory of `<TICKER>.csv` files with a
//! `date,open,high,low,close,volume` header row.

use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::domain::error::StratsimError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", ticker))
    }

    fn get_f64(record: &csv::StringRecord, index: usize, column: &str) -> Result<f64, StratsimError> {
        record
            .get(index)
            .ok_or_else(|| StratsimError::Data {
                reason: format!("missing {} column", column),
            })?
            .parse()
            .map_err(|e| StratsimError::Data {
                reason: format!("invalid {} value: {}", column, e),
            })
    }
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, StratsimError> {
        let path = self.csv_path(ticker);
        let content = fs::read_to_string(&path).map_err(|e| StratsimError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| StratsimError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = record.get(0).ok_or_else(|| StratsimError::Data {
                reason: "missing date column".into(),
            })?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                StratsimError::Data {
                    reason: format!("invalid date format: {}", e),
                }
            })?;

            if date < start_date || date > end_date {
                continue;
            }

            let open = Self::get_f64(&record, 1, "open")?;
            let high = Self::get_f64(&record, 2, "high")?;
            let low = Self::get_f64(&record, 3, "low")?;
            let close = Self::get_f64(&record, 4, "close")?;
            let volume: i64 = record
                .get(5)
                .ok_or_else(|| StratsimError::Data {
                    reason: "missing volume column".into(),
                })?
                .parse()
                .map_err(|e| StratsimError::Data {
                    reason: format!("invalid volume value: {}", e),
                })?;

            bars.push(OhlcvBar {
                date,
                open,
                high,
                low,
                close,
                volume,
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }

    fn list_tickers(&self) -> Result<Vec<String>, StratsimError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| StratsimError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut tickers = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StratsimError::Data {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(ticker) = name_str.strip_suffix(".csv") {
                tickers.push(ticker.to_string());
            }
        }

        tickers.sort();
        Ok(tickers)
    }
}
