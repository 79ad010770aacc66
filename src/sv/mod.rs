pub mod accounts;
pub mod commission;
pub mod inventory;
pub mod ledger;
pub mod referral;
#[cfg(test)]
pub mod test_utils;
pub mod withdrawals;

pub use accounts::Accounts;
pub use commission::Commission;
pub use inventory::Inventory;
pub use ledger::Ledger;
pub use referral::Referral;
pub use withdrawals::Withdrawals;
