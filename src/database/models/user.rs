use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub real_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    pub entry_time: Option<NaiveTime>,
    pub lunch_out_time: Option<NaiveTime>,
    pub lunch_in_time: Option<NaiveTime>,
    pub exit_time: Option<NaiveTime>,
    pub schedule: SchedulePattern,
    pub schedule_anchor_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "lowercase")]
    pub enum UserRole {
        Master => "master",
        Employee => "employee",
        Terminal => "terminal",
    }
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::Employee
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    pub enum SchedulePattern {
        /// Free-form: every day is a workday.
        #[serde(rename = "livre")]
        Livre => "livre",
        /// Monday to Friday, weekends off.
        #[serde(rename = "5x2")]
        FiveByTwo => "5x2",
        /// 12 hours on, 36 off; alternates daily from the anchor date.
        #[serde(rename = "12x36")]
        TwelveByThirtySix => "12x36",
    }
}

impl Default for SchedulePattern {
    fn default() -> Self {
        SchedulePattern::Livre
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserInput {
    pub real_name: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<UserRole>,
    pub entry_time: Option<NaiveTime>,
    pub lunch_out_time: Option<NaiveTime>,
    pub lunch_in_time: Option<NaiveTime>,
    pub exit_time: Option<NaiveTime>,
    #[serde(default)]
    pub schedule: Option<SchedulePattern>,
    pub schedule_anchor_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserInput {
    pub real_name: String,
    pub role: UserRole,
    pub entry_time: Option<NaiveTime>,
    pub lunch_out_time: Option<NaiveTime>,
    pub lunch_in_time: Option<NaiveTime>,
    pub exit_time: Option<NaiveTime>,
    pub schedule: SchedulePattern,
    pub schedule_anchor_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: Uuid,
    pub username: String,
    pub real_name: String,
    pub role: UserRole,
    pub schedule: SchedulePattern,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user: UserInfo,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            real_name: user.real_name,
            role: user.role,
            schedule: user.schedule,
        }
    }
}
