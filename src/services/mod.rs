pub mod auth;
pub mod balance;
pub mod ledger;

pub use auth::{AuthService, Claims};
pub use balance::{CalculationWarning, DayCalculation, ShiftConfig};
pub use ledger::LedgerService;
