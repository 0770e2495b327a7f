//! End-to-end checks of the daily balance calculator through the public
//! library API, mirroring the scenarios the payroll team validates by hand.

use chrono::{NaiveDate, NaiveTime};
use pretty_assertions::assert_eq;

use shahin_gestao::database::models::{DayStatus, SchedulePattern};
use shahin_gestao::services::balance::{calculate_day, format_saldo, ShiftConfig};
use shahin_gestao::services::LedgerService;

mod common;

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

// 07:00-12:00 and 14:00-17:00: 480 expected minutes.
fn seven_to_five(schedule: SchedulePattern) -> ShiftConfig {
    ShiftConfig {
        entry_time: Some(t(7, 0)),
        lunch_out_time: Some(t(12, 0)),
        lunch_in_time: Some(t(14, 0)),
        exit_time: Some(t(17, 0)),
        schedule,
        anchor_date: None,
    }
}

#[test]
fn full_day_within_tolerance_reads_normal_on_the_mirror() {
    let config = seven_to_five(SchedulePattern::Livre);
    let punches = [t(7, 0), t(12, 0), t(14, 0), t(16, 58)];

    let result = calculate_day(&config, d(2026, 8, 19), &punches);

    assert_eq!(result.expected_minutes, 480);
    assert_eq!(result.worked_minutes, 478);
    assert_eq!(result.status, DayStatus::Normal);
    assert_eq!(format_saldo(result.balance_minutes), "+00:00");
}

#[test]
fn absence_on_a_workday_debits_the_whole_target() {
    let config = seven_to_five(SchedulePattern::Livre);

    let result = calculate_day(&config, d(2026, 8, 19), &[]);

    assert_eq!(result.status, DayStatus::Falta);
    assert_eq!(result.balance_minutes, -480);
    assert_eq!(format_saldo(result.balance_minutes), "-08:00");
}

#[test]
fn weekend_under_five_by_two_is_a_day_off() {
    let config = seven_to_five(SchedulePattern::FiveByTwo);

    // 2026-08-22 is a Saturday.
    let result = calculate_day(&config, d(2026, 8, 22), &[]);

    assert_eq!(result.status, DayStatus::Folga);
    assert_eq!(result.expected_minutes, 0);
    assert_eq!(result.balance_minutes, 0);
}

#[test]
fn fifth_unmatched_punch_flags_the_day_and_zeroes_the_saldo() {
    let config = seven_to_five(SchedulePattern::Livre);
    let punches = [t(7, 0), t(12, 0), t(14, 0), t(17, 0), t(18, 0)];

    let result = calculate_day(&config, d(2026, 8, 19), &punches);

    assert_eq!(result.status, DayStatus::ErroImpar);
    assert_eq!(result.worked_minutes, 480);
    assert_eq!(result.balance_minutes, 0);
}

#[test]
fn twelve_thirty_six_rotation_and_punch_blocking_agree() {
    let mut config = seven_to_five(SchedulePattern::TwelveByThirtySix);
    config.anchor_date = Some(d(2026, 8, 10));

    for offset in 0..6 {
        let date = d(2026, 8, 10 + offset);
        let blocked = LedgerService::punch_block_reason(&config, date).is_some();
        // Even offsets are workdays, odd offsets are off.
        assert_eq!(blocked, offset % 2 == 1, "offset {}", offset);
    }
}

#[test]
fn summary_fields_are_stable_across_recomputation() {
    let config = seven_to_five(SchedulePattern::Livre);
    let punches = [t(7, 2), t(12, 0), t(14, 5), t(17, 30)];
    let date = d(2026, 8, 19);

    let a = calculate_day(&config, date, &punches);
    let b = calculate_day(&config, date, &punches);

    assert_eq!(a.worked_minutes, b.worked_minutes);
    assert_eq!(a.expected_minutes, b.expected_minutes);
    assert_eq!(a.balance_minutes, b.balance_minutes);
    assert_eq!(a.status, b.status);
    assert_eq!(a.warnings, b.warnings);
}
