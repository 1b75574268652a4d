//! Data access port trait.

use chrono::NaiveDate;

use crate::domain::error::StratsimError;
use crate::domain::ohlcv::OhlcvBar;

pub trait DataPort {
    /// Fetch the bar series for a ticker, sorted ascending by date and
    /// restricted to the inclusive date range.
    fn fetch_ohlcv(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, StratsimError>;

    /// Tickers this source can serve, sorted.
    fn list_tickers(&self) -> Result<Vec<String>, StratsimError>;
}
