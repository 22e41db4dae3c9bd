pub mod attempt;
pub mod clock;
pub mod ledger;
