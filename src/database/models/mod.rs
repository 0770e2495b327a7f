pub mod adjustment;
pub(crate) mod macros;
pub mod punch;
pub mod summary;
pub mod user;

pub use adjustment::{AdjustmentKind, AdjustmentRequest, AdjustmentRequestInput, AdjustmentStatus};
pub use punch::{
    PunchInput, PunchKind, PunchRecord, MANUAL_PUNCH_LATITUDE, MANUAL_PUNCH_LONGITUDE,
};
pub use summary::{DailySummary, DayStatus};
pub use user::{
    AuthResponse, CreateUserInput, LoginInput, SchedulePattern, UpdateUserInput, User, UserInfo,
    UserRole,
};
