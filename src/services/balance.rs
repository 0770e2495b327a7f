//! Daily balance calculator: converts one employee-day's punch sequence plus
//! the shift configuration into expected/worked/balance minutes and a status
//! label. Pure over its inputs; persistence is the caller's job.

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike, Weekday};
use serde::Serialize;

use crate::database::models::{DayStatus, SchedulePattern, User};

/// Fallback daily target when the four wall-clock boundaries don't produce a
/// positive workload (8 hours).
pub const DEFAULT_EXPECTED_MINUTES: i32 = 480;

/// Deviations up to this many minutes snap to zero and count as a normal day.
pub const BALANCE_TOLERANCE_MINUTES: i32 = 10;

/// The employee's shift configuration as the calculator needs it. Extracted
/// from `User` so the computation never touches ambient state.
#[derive(Debug, Clone, Default)]
pub struct ShiftConfig {
    pub entry_time: Option<NaiveTime>,
    pub lunch_out_time: Option<NaiveTime>,
    pub lunch_in_time: Option<NaiveTime>,
    pub exit_time: Option<NaiveTime>,
    pub schedule: SchedulePattern,
    pub anchor_date: Option<NaiveDate>,
}

impl From<&User> for ShiftConfig {
    fn from(user: &User) -> Self {
        Self {
            entry_time: user.entry_time,
            lunch_out_time: user.lunch_out_time,
            lunch_in_time: user.lunch_in_time,
            exit_time: user.exit_time,
            schedule: user.schedule,
            anchor_date: user.schedule_anchor_date,
        }
    }
}

/// Anomalies found while computing a day. The original system zeroed these
/// out silently; here they ride along on the result so masters can see them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CalculationWarning {
    /// One of the four schedule boundaries is unset; it counted as 00:00.
    MissingScheduleTime { field: &'static str },
    /// The configured boundaries yield a non-positive workload; the default
    /// daily target was used instead.
    MisconfiguredSchedule,
    /// A 12x36 schedule without an anchor date; the day was treated as a
    /// workday.
    MissingAnchorDate,
    /// Odd punch count; the trailing punch was left out of the sum.
    OddPunchCount,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCalculation {
    pub workday: bool,
    pub expected_minutes: i32,
    pub worked_minutes: i32,
    pub balance_minutes: i32,
    pub status: DayStatus,
    pub warnings: Vec<CalculationWarning>,
}

fn minutes_of(t: NaiveTime) -> i32 {
    (t.hour() * 60 + t.minute()) as i32
}

/// Whether `date` is a scheduled workday under the given configuration.
///
/// 12x36 alternates on the parity of whole days since the anchor; Euclidean
/// remainder keeps dates before the anchor on the same rotation.
pub fn is_workday(config: &ShiftConfig, date: NaiveDate) -> bool {
    match config.schedule {
        SchedulePattern::Livre => true,
        SchedulePattern::FiveByTwo => {
            !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
        }
        SchedulePattern::TwelveByThirtySix => match config.anchor_date {
            Some(anchor) => (date - anchor).num_days().rem_euclid(2) == 0,
            None => true,
        },
    }
}

fn expected_minutes(config: &ShiftConfig, warnings: &mut Vec<CalculationWarning>) -> i32 {
    let mut boundary = |t: Option<NaiveTime>, field: &'static str| match t {
        Some(t) => minutes_of(t),
        None => {
            warnings.push(CalculationWarning::MissingScheduleTime { field });
            0
        }
    };

    let entry = boundary(config.entry_time, "entryTime");
    let lunch_out = boundary(config.lunch_out_time, "lunchOutTime");
    let lunch_in = boundary(config.lunch_in_time, "lunchInTime");
    let exit = boundary(config.exit_time, "exitTime");

    let expected = (lunch_out - entry).max(0) + (exit - lunch_in).max(0);
    if expected <= 0 {
        warnings.push(CalculationWarning::MisconfiguredSchedule);
        DEFAULT_EXPECTED_MINUTES
    } else {
        expected
    }
}

/// Compute one employee-day. `punches` must be in chronological order; the
/// punch ledger query guarantees that.
pub fn calculate_day(
    config: &ShiftConfig,
    date: NaiveDate,
    punches: &[NaiveTime],
) -> DayCalculation {
    let mut warnings = Vec::new();

    let workday = is_workday(config, date);
    if config.schedule == SchedulePattern::TwelveByThirtySix && config.anchor_date.is_none() {
        warnings.push(CalculationWarning::MissingAnchorDate);
    }

    let expected = if workday {
        expected_minutes(config, &mut warnings)
    } else {
        0
    };

    // Punches pair up as open/close in sequence: (0,1), (2,3), ...
    // An odd count leaves the last punch unmatched; only the even prefix
    // contributes to the worked total.
    let paired = punches.len() - punches.len() % 2;
    let worked: i32 = punches[..paired]
        .chunks(2)
        .map(|pair| minutes_of(pair[1]) - minutes_of(pair[0]))
        .sum();

    let (status, balance) = if punches.is_empty() {
        if workday {
            (DayStatus::Falta, -expected)
        } else {
            (DayStatus::Folga, 0)
        }
    } else if punches.len() % 2 != 0 {
        // Kept as the original behaves: the dangling punch zeroes the whole
        // day's balance until the day is corrected. Flagged, not fixed,
        // pending product confirmation.
        warnings.push(CalculationWarning::OddPunchCount);
        (DayStatus::ErroImpar, 0)
    } else if !workday && worked > 0 {
        // Worked on an off-day: the entire time is overtime.
        (DayStatus::HoraExtraFolga, worked)
    } else {
        let raw = worked - expected;
        if raw.abs() <= BALANCE_TOLERANCE_MINUTES {
            (DayStatus::Normal, 0)
        } else if raw > 0 {
            (DayStatus::HoraExtra, raw)
        } else {
            (DayStatus::AtrasoDebito, raw)
        }
    };

    DayCalculation {
        workday,
        expected_minutes: expected,
        worked_minutes: worked,
        balance_minutes: balance,
        status,
        warnings,
    }
}

/// Format a signed minute total as `-HH:MM` (no sign when non-negative).
pub fn format_minutes_hm(total_minutes: i32) -> String {
    let sign = if total_minutes < 0 { "-" } else { "" };
    let abs = total_minutes.abs();
    format!("{}{:02}:{:02}", sign, abs / 60, abs % 60)
}

/// Mirror-style saldo formatting: always signed, `+HH:MM` / `-HH:MM`.
pub fn format_saldo(total_minutes: i32) -> String {
    let sign = if total_minutes >= 0 { "+" } else { "-" };
    let abs = total_minutes.abs();
    format!("{}{:02}:{:02}", sign, abs / 60, abs % 60)
}

/// Parse an `HH:MM` string as typed into an adjustment request. Malformed
/// input is an error here, not a silent zero.
pub fn parse_hhmm(value: &str) -> anyhow::Result<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| anyhow::anyhow!("Invalid time value: {:?} (expected HH:MM)", value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    // 07:00-12:00 plus 14:00-17:00: an 8-hour day with a two-hour lunch.
    fn standard_config(schedule: SchedulePattern) -> ShiftConfig {
        ShiftConfig {
            entry_time: Some(t(7, 0)),
            lunch_out_time: Some(t(12, 0)),
            lunch_in_time: Some(t(14, 0)),
            exit_time: Some(t(17, 0)),
            schedule,
            anchor_date: None,
        }
    }

    // 2026-08-19 is a Wednesday, 2026-08-22 a Saturday.
    const WEDNESDAY: (i32, u32, u32) = (2026, 8, 19);
    const SATURDAY: (i32, u32, u32) = (2026, 8, 22);

    #[test]
    fn livre_zero_punches_is_falta_with_negative_expected() {
        let config = standard_config(SchedulePattern::Livre);
        let result = calculate_day(&config, d(SATURDAY.0, SATURDAY.1, SATURDAY.2), &[]);

        assert_eq!(result.status, DayStatus::Falta);
        assert_eq!(result.expected_minutes, 480);
        assert_eq!(result.balance_minutes, -480);
    }

    #[test]
    fn five_by_two_weekend_zero_punches_is_folga() {
        let config = standard_config(SchedulePattern::FiveByTwo);
        let result = calculate_day(&config, d(SATURDAY.0, SATURDAY.1, SATURDAY.2), &[]);

        assert_eq!(result.status, DayStatus::Folga);
        assert_eq!(result.expected_minutes, 0);
        assert_eq!(result.balance_minutes, 0);
    }

    #[test]
    fn five_by_two_weekday_zero_punches_is_falta() {
        let config = standard_config(SchedulePattern::FiveByTwo);
        let result = calculate_day(&config, d(WEDNESDAY.0, WEDNESDAY.1, WEDNESDAY.2), &[]);

        assert_eq!(result.status, DayStatus::Falta);
        assert_eq!(result.balance_minutes, -480);
    }

    #[test]
    fn two_minutes_short_snaps_to_normal() {
        let config = standard_config(SchedulePattern::Livre);
        let punches = [t(7, 0), t(12, 0), t(14, 0), t(16, 58)];
        let result = calculate_day(&config, d(WEDNESDAY.0, WEDNESDAY.1, WEDNESDAY.2), &punches);

        assert_eq!(result.expected_minutes, 480);
        assert_eq!(result.worked_minutes, 478);
        assert_eq!(result.balance_minutes, 0);
        assert_eq!(result.status, DayStatus::Normal);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn leaving_an_hour_early_is_debito() {
        let config = standard_config(SchedulePattern::Livre);
        let punches = [t(7, 0), t(12, 0), t(14, 0), t(16, 0)];
        let result = calculate_day(&config, d(WEDNESDAY.0, WEDNESDAY.1, WEDNESDAY.2), &punches);

        assert_eq!(result.worked_minutes, 420);
        assert_eq!(result.balance_minutes, -60);
        assert_eq!(result.status, DayStatus::AtrasoDebito);
    }

    #[test]
    fn staying_late_is_hora_extra() {
        let config = standard_config(SchedulePattern::Livre);
        let punches = [t(7, 0), t(12, 0), t(14, 0), t(18, 30)];
        let result = calculate_day(&config, d(WEDNESDAY.0, WEDNESDAY.1, WEDNESDAY.2), &punches);

        assert_eq!(result.balance_minutes, 90);
        assert_eq!(result.status, DayStatus::HoraExtra);
    }

    #[test]
    fn odd_punch_count_zeroes_balance_and_flags_the_day() {
        let config = standard_config(SchedulePattern::Livre);
        let punches = [t(7, 0), t(12, 0), t(14, 0), t(17, 0), t(18, 0)];
        let result = calculate_day(&config, d(WEDNESDAY.0, WEDNESDAY.1, WEDNESDAY.2), &punches);

        assert_eq!(result.status, DayStatus::ErroImpar);
        // Only the leading two complete pairs count.
        assert_eq!(result.worked_minutes, 480);
        assert_eq!(result.balance_minutes, 0);
        assert!(result
            .warnings
            .contains(&CalculationWarning::OddPunchCount));
    }

    #[test]
    fn single_punch_is_odd_with_zero_worked() {
        let config = standard_config(SchedulePattern::Livre);
        let result = calculate_day(
            &config,
            d(WEDNESDAY.0, WEDNESDAY.1, WEDNESDAY.2),
            &[t(7, 0)],
        );

        assert_eq!(result.status, DayStatus::ErroImpar);
        assert_eq!(result.worked_minutes, 0);
        assert_eq!(result.balance_minutes, 0);
    }

    #[test]
    fn working_an_off_day_counts_entirely_as_overtime() {
        let config = standard_config(SchedulePattern::FiveByTwo);
        let punches = [t(8, 0), t(12, 0)];
        let result = calculate_day(&config, d(SATURDAY.0, SATURDAY.1, SATURDAY.2), &punches);

        assert_eq!(result.status, DayStatus::HoraExtraFolga);
        assert_eq!(result.worked_minutes, 240);
        assert_eq!(result.balance_minutes, 240);
    }

    #[test]
    fn twelve_thirty_six_alternates_from_anchor() {
        let mut config = standard_config(SchedulePattern::TwelveByThirtySix);
        let anchor = d(2026, 8, 10);
        config.anchor_date = Some(anchor);

        assert!(is_workday(&config, anchor));
        assert!(!is_workday(&config, d(2026, 8, 11)));
        assert!(is_workday(&config, d(2026, 8, 12)));
        // Two days apart: same classification. One day apart: different.
        assert_eq!(
            is_workday(&config, d(2026, 8, 14)),
            is_workday(&config, d(2026, 8, 16))
        );
        assert_ne!(
            is_workday(&config, d(2026, 8, 14)),
            is_workday(&config, d(2026, 8, 15))
        );
    }

    #[test]
    fn twelve_thirty_six_parity_holds_before_the_anchor() {
        let mut config = standard_config(SchedulePattern::TwelveByThirtySix);
        config.anchor_date = Some(d(2026, 8, 10));

        // Day -1 is an off-day, day -2 a workday, mirroring days +1 and +2.
        assert!(!is_workday(&config, d(2026, 8, 9)));
        assert!(is_workday(&config, d(2026, 8, 8)));
    }

    #[test]
    fn twelve_thirty_six_without_anchor_warns_and_treats_as_workday() {
        let config = standard_config(SchedulePattern::TwelveByThirtySix);
        let result = calculate_day(&config, d(SATURDAY.0, SATURDAY.1, SATURDAY.2), &[]);

        assert!(result.workday);
        assert_eq!(result.status, DayStatus::Falta);
        assert!(result
            .warnings
            .contains(&CalculationWarning::MissingAnchorDate));
    }

    #[test]
    fn missing_schedule_times_fall_back_to_default_with_warnings() {
        let config = ShiftConfig {
            schedule: SchedulePattern::Livre,
            ..Default::default()
        };
        let result = calculate_day(&config, d(WEDNESDAY.0, WEDNESDAY.1, WEDNESDAY.2), &[]);

        assert_eq!(result.expected_minutes, DEFAULT_EXPECTED_MINUTES);
        assert_eq!(result.status, DayStatus::Falta);
        assert!(result
            .warnings
            .contains(&CalculationWarning::MisconfiguredSchedule));
        assert!(result.warnings.iter().any(|w| matches!(
            w,
            CalculationWarning::MissingScheduleTime { field: "entryTime" }
        )));
    }

    #[test]
    fn inverted_boundaries_clamp_to_zero_per_segment() {
        // Morning segment inverted (lunch-out before entry) contributes 0,
        // afternoon still counts.
        let config = ShiftConfig {
            entry_time: Some(t(12, 0)),
            lunch_out_time: Some(t(7, 0)),
            lunch_in_time: Some(t(13, 0)),
            exit_time: Some(t(17, 0)),
            schedule: SchedulePattern::Livre,
            anchor_date: None,
        };
        let result = calculate_day(&config, d(WEDNESDAY.0, WEDNESDAY.1, WEDNESDAY.2), &[]);

        assert_eq!(result.expected_minutes, 240);
    }

    #[test]
    fn recomputation_is_idempotent() {
        let config = standard_config(SchedulePattern::Livre);
        let punches = [t(7, 0), t(12, 0), t(14, 0), t(16, 0)];
        let date = d(WEDNESDAY.0, WEDNESDAY.1, WEDNESDAY.2);

        let first = calculate_day(&config, date, &punches);
        let second = calculate_day(&config, date, &punches);

        assert_eq!(first.expected_minutes, second.expected_minutes);
        assert_eq!(first.worked_minutes, second.worked_minutes);
        assert_eq!(first.balance_minutes, second.balance_minutes);
        assert_eq!(first.status, second.status);
    }

    #[test]
    fn formats_signed_and_saldo_styles() {
        assert_eq!(format_minutes_hm(-60), "-01:00");
        assert_eq!(format_minutes_hm(478), "07:58");
        // An employee with no summarized days reports as all zeroes.
        assert_eq!(format_minutes_hm(0), "00:00");
        assert_eq!(format_saldo(0), "+00:00");
        assert_eq!(format_saldo(-2), "-00:02");
        assert_eq!(format_saldo(90), "+01:30");
    }

    #[test]
    fn parses_hhmm_and_rejects_garbage() {
        assert_eq!(parse_hhmm("07:05").unwrap(), t(7, 5));
        assert!(parse_hhmm("7h30").is_err());
        assert!(parse_hhmm("25:00").is_err());
        assert!(parse_hhmm("").is_err());
    }
}
