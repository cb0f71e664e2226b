pub mod connection;
pub mod ledger;

pub use connection::*;
pub use ledger::DatabaseLedger;
