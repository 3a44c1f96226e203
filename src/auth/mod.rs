//! Authentication and configuration modules for the APIs we talk to.

pub mod bitstamp;
pub mod coinex;

pub use bitstamp::BitstampConfig;
pub use coinex::CoinexAuth;
