//! Wire type definitions for all APIs.

pub mod bitstamp;
pub mod coinex;

pub use bitstamp::BitstampTicker;
pub use coinex::{
    BalanceRecord, CurrencyRecord, NewOrder, OrderRecord, SubmitOrderRequest, TradePairRecord,
    TradeRecord,
};
