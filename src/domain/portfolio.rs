//! Portfolio ledger: cash, the open position and the trade history.
//!
//! The ledger is long-only and all-in: a buy converts as much cash as
//! possible into whole shares at the given price, a sell liquidates the
//! entire position. Cash can never go negative because sizing floors to
//! whole shares. An equity point is recorded after every bar so the
//! curve marks open positions to market.

use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy)]
pub struct Position {
    pub quantity: i64,
    pub entry_index: usize,
    pub entry_price: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Trade {
    pub quantity: i64,
    pub entry_index: usize,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub exit_index: Option<usize>,
    pub exit_date: Option<NaiveDate>,
    pub exit_price: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

/// Point-in-time view of the ledger, for logging and inspection.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LedgerSnapshot {
    pub cash: f64,
    pub position_quantity: i64,
    pub open_trades: usize,
    pub closed_trades: usize,
}

#[derive(Debug, Clone)]
pub struct Ledger {
    pub cash: f64,
    pub position: Option<Position>,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
}

impl Ledger {
    pub fn new(initial_cash: f64) -> Self {
        Self {
            cash: initial_cash,
            position: None,
            trades: Vec::new(),
            equity_curve: Vec::new(),
        }
    }

    pub fn is_flat(&self) -> bool {
        self.position.is_none()
    }

    /// Buy as many whole shares as cash allows at `price`. A no-op when
    /// even one share is unaffordable. Buying on top of an open position
    /// grows it; the position keeps its original entry. Returns the
    /// quantity bought.
    pub fn apply_buy(&mut self, index: usize, date: NaiveDate, price: f64) -> i64 {
        let quantity = (self.cash / price).floor() as i64;
        if quantity <= 0 {
            return 0;
        }

        self.cash -= quantity as f64 * price;
        self.position = match self.position {
            Some(mut position) => {
                position.quantity += quantity;
                Some(position)
            }
            None => Some(Position {
                quantity,
                entry_index: index,
                entry_price: price,
            }),
        };
        self.trades.push(Trade {
            quantity,
            entry_index: index,
            entry_date: date,
            entry_price: price,
            exit_index: None,
            exit_date: None,
            exit_price: None,
        });
        quantity
    }

    /// Liquidate the whole position at `price`. A no-op while flat.
    /// Returns the quantity sold.
    pub fn apply_sell(&mut self, index: usize, date: NaiveDate, price: f64) -> i64 {
        let Some(position) = self.position.take() else {
            return 0;
        };

        self.cash += position.quantity as f64 * price;
        for trade in self.trades.iter_mut().filter(|t| t.exit_index.is_none()) {
            trade.exit_index = Some(index);
            trade.exit_date = Some(date);
            trade.exit_price = Some(price);
        }
        position.quantity
    }

    /// Cash plus the open position valued at `price`.
    pub fn mark_to_market(&self, price: f64) -> f64 {
        let held = self
            .position
            .map(|p| p.quantity as f64 * price)
            .unwrap_or(0.0);
        self.cash + held
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        let open = self.trades.iter().filter(|t| t.exit_index.is_none()).count();
        LedgerSnapshot {
            cash: self.cash,
            position_quantity: self.position.map(|p| p.quantity).unwrap_or(0),
            open_trades: open,
            closed_trades: self.trades.len() - open,
        }
    }

    pub fn record_equity(&mut self, date: NaiveDate, price: f64) {
        self.equity_curve.push(EquityPoint {
            date,
            equity: self.mark_to_market(price),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn buy_floors_to_whole_shares() {
        let mut ledger = Ledger::new(100.0);
        let bought = ledger.apply_buy(0, day(1), 11.0);

        assert_eq!(bought, 9);
        assert_relative_eq!(ledger.cash, 1.0, epsilon = 1e-9);
        assert_eq!(ledger.position.unwrap().quantity, 9);
        assert_eq!(ledger.trades.len(), 1);
    }

    #[test]
    fn buy_unaffordable_is_noop() {
        let mut ledger = Ledger::new(5.0);
        let bought = ledger.apply_buy(0, day(1), 11.0);

        assert_eq!(bought, 0);
        assert!(ledger.is_flat());
        assert!(ledger.trades.is_empty());
        assert_relative_eq!(ledger.cash, 5.0);
    }

    #[test]
    fn sell_liquidates_everything() {
        let mut ledger = Ledger::new(100.0);
        ledger.apply_buy(0, day(1), 11.0);
        let sold = ledger.apply_sell(3, day(4), 12.0);

        assert_eq!(sold, 9);
        assert!(ledger.is_flat());
        assert_relative_eq!(ledger.cash, 1.0 + 9.0 * 12.0, epsilon = 1e-9);

        let trade = &ledger.trades[0];
        assert_eq!(trade.exit_index, Some(3));
        assert_eq!(trade.exit_price, Some(12.0));
        assert_eq!(trade.exit_date, Some(day(4)));
    }

    #[test]
    fn sell_while_flat_is_noop() {
        let mut ledger = Ledger::new(100.0);
        let sold = ledger.apply_sell(0, day(1), 12.0);

        assert_eq!(sold, 0);
        assert_relative_eq!(ledger.cash, 100.0);
        assert!(ledger.trades.is_empty());
    }

    #[test]
    fn cash_never_negative() {
        let mut ledger = Ledger::new(100.0);
        ledger.apply_buy(0, day(1), 0.07);
        assert!(ledger.cash >= 0.0);

        let mut ledger = Ledger::new(0.0);
        ledger.apply_buy(0, day(1), 10.0);
        assert!(ledger.cash >= 0.0);
        assert!(ledger.is_flat());
    }

    #[test]
    fn mark_to_market_values_open_position() {
        let mut ledger = Ledger::new(100.0);
        ledger.apply_buy(0, day(1), 10.0); // 10 shares, cash 0

        assert_relative_eq!(ledger.mark_to_market(13.0), 130.0, epsilon = 1e-9);
        assert_relative_eq!(ledger.mark_to_market(8.0), 80.0, epsilon = 1e-9);
    }

    #[test]
    fn equity_curve_marks_each_bar() {
        let mut ledger = Ledger::new(100.0);
        ledger.record_equity(day(1), 10.0);
        ledger.apply_buy(1, day(2), 10.0);
        ledger.record_equity(day(2), 10.0);
        ledger.record_equity(day(3), 12.0);

        let equities: Vec<f64> = ledger.equity_curve.iter().map(|p| p.equity).collect();
        assert_relative_eq!(equities[0], 100.0);
        assert_relative_eq!(equities[1], 100.0);
        assert_relative_eq!(equities[2], 120.0);
    }

    #[test]
    fn buy_on_top_grows_position() {
        let mut ledger = Ledger::new(100.0);
        ledger.apply_buy(0, day(1), 10.0); // 10 shares, cash 0
        ledger.cash = 25.0; // simulate fresh cash
        let added = ledger.apply_buy(2, day(3), 12.0);

        assert_eq!(added, 2);
        let position = ledger.position.unwrap();
        assert_eq!(position.quantity, 12);
        assert_eq!(position.entry_index, 0);
        assert_eq!(ledger.trades.len(), 2);

        ledger.apply_sell(4, day(5), 15.0);
        assert!(ledger.trades.iter().all(|t| t.exit_index == Some(4)));
    }

    #[test]
    fn snapshot_reflects_ledger_state() {
        let mut ledger = Ledger::new(100.0);
        let snap = ledger.snapshot();
        assert_relative_eq!(snap.cash, 100.0);
        assert_eq!(snap.position_quantity, 0);

        ledger.apply_buy(0, day(1), 10.0);
        let snap = ledger.snapshot();
        assert_eq!(snap.position_quantity, 10);
        assert_eq!(snap.open_trades, 1);
        assert_eq!(snap.closed_trades, 0);

        ledger.apply_sell(2, day(3), 12.0);
        let snap = ledger.snapshot();
        assert_eq!(snap.position_quantity, 0);
        assert_eq!(snap.open_trades, 0);
        assert_eq!(snap.closed_trades, 1);
    }

    #[test]
    fn open_trade_has_no_exit() {
        let mut ledger = Ledger::new(100.0);
        ledger.apply_buy(2, day(3), 10.0);

        let trade = &ledger.trades[0];
        assert_eq!(trade.entry_index, 2);
        assert!(trade.exit_index.is_none());
        assert!(trade.exit_price.is_none());
    }
}
