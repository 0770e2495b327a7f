pub mod adjustment;
pub mod punch;
pub mod summary;
pub mod user;

pub use adjustment::AdjustmentRepository;
pub use punch::PunchRepository;
pub use summary::{BalanceReportRow, SummaryRepository};
pub use user::UserRepository;
