pub mod arr;
pub mod ledger;
pub mod subdl;
pub mod throttle;
