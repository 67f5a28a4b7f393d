use chrono::{DateTime, Duration, Utc};

/// 半开区间 [start, end) 的重叠判定
/// 首尾相接的两段时间（a_end == b_start）不算重叠
pub fn intervals_overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && a_end > b_start
}

/// 超时停车的计费结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverstayCharge {
    pub minutes: i64,
    pub hours: i64,
    pub fee: f64,
}

impl OverstayCharge {
    pub fn none() -> Self {
        Self { minutes: 0, hours: 0, fee: 0.0 }
    }
}

/// Compute the overstay charge for a vehicle still parked at `now` past
/// `end_date`. Minutes are rounded up, and any started hour bills as a
/// full hour at `hourly_rate` (one minute over already costs an hour).
pub fn compute_overstay(
    end_date: DateTime<Utc>,
    now: DateTime<Utc>,
    hourly_rate: f64,
) -> OverstayCharge {
    let overstay_ms = (now - end_date).num_milliseconds();
    if overstay_ms <= 0 {
        return OverstayCharge::none();
    }

    let minutes = (overstay_ms + 59_999) / 60_000;
    let hours = (minutes + 59) / 60;
    let fee = hours as f64 * hourly_rate;

    OverstayCharge { minutes, hours, fee }
}

/// 提醒触发时刻：目标时间点向前推 lead_minutes 分钟
pub fn reminder_due_at(target: DateTime<Utc>, lead_minutes: i64) -> DateTime<Utc> {
    target - Duration::minutes(lead_minutes)
}

/// A reminder fires once its due time has passed while the subject
/// timestamp is still in the future. Sent flags stored on the
/// reservation keep this from firing twice.
pub fn reminder_is_due(
    due_at: DateTime<Utc>,
    subject_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> bool {
    due_at <= now && subject_at > now
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, hour, min, 0).unwrap()
    }

    #[test]
    fn test_overlap_basic() {
        // [10:00, 12:00) vs [11:00, 13:00) 重叠
        assert!(intervals_overlap(at(10, 0), at(12, 0), at(11, 0), at(13, 0)));
        // 完全包含
        assert!(intervals_overlap(at(10, 0), at(14, 0), at(11, 0), at(12, 0)));
        // 相同区间
        assert!(intervals_overlap(at(10, 0), at(12, 0), at(10, 0), at(12, 0)));
    }

    #[test]
    fn test_overlap_back_to_back_is_free() {
        // [10:00, 12:00) 与 [12:00, 13:00) 首尾相接，不冲突
        assert!(!intervals_overlap(at(10, 0), at(12, 0), at(12, 0), at(13, 0)));
        assert!(!intervals_overlap(at(12, 0), at(13, 0), at(10, 0), at(12, 0)));
        // 完全分离
        assert!(!intervals_overlap(at(8, 0), at(9, 0), at(10, 0), at(11, 0)));
    }

    #[test]
    fn test_overlap_is_symmetric() {
        let cases = [
            (at(10, 0), at(12, 0), at(11, 0), at(13, 0)),
            (at(10, 0), at(12, 0), at(12, 0), at(13, 0)),
            (at(9, 0), at(10, 0), at(9, 30), at(9, 45)),
        ];
        for (a1, a2, b1, b2) in cases {
            assert_eq!(
                intervals_overlap(a1, a2, b1, b2),
                intervals_overlap(b1, b2, a1, a2)
            );
        }
    }

    #[test]
    fn test_no_overstay_before_end() {
        let charge = compute_overstay(at(14, 0), at(13, 30), 5.0);
        assert_eq!(charge, OverstayCharge::none());
    }

    #[test]
    fn test_no_overstay_exactly_at_end() {
        let charge = compute_overstay(at(14, 0), at(14, 0), 5.0);
        assert_eq!(charge.minutes, 0);
        assert_eq!(charge.fee, 0.0);
    }

    #[test]
    fn overstay_one_minute_bills_full_hour() {
        // 超时 1 分钟按整小时计费
        let charge = compute_overstay(at(14, 0), at(14, 1), 5.0);
        assert_eq!(charge.minutes, 1);
        assert_eq!(charge.hours, 1);
        assert_eq!(charge.fee, 5.0);
    }

    #[test]
    fn test_overstay_45_minutes() {
        // 14:00 结束，14:45 离场，费率 5 => 45 分钟、1 小时、5
        let charge = compute_overstay(at(14, 0), at(14, 45), 5.0);
        assert_eq!(charge.minutes, 45);
        assert_eq!(charge.hours, 1);
        assert_eq!(charge.fee, 5.0);
    }

    #[test]
    fn test_overstay_rounds_partial_minutes_up() {
        let end = at(14, 0);
        let now = end + Duration::seconds(61);
        let charge = compute_overstay(end, now, 5.0);
        assert_eq!(charge.minutes, 2);
        assert_eq!(charge.hours, 1);
    }

    #[test]
    fn test_overstay_second_hour() {
        let charge = compute_overstay(at(14, 0), at(15, 1), 5.0);
        assert_eq!(charge.minutes, 61);
        assert_eq!(charge.hours, 2);
        assert_eq!(charge.fee, 10.0);
    }

    #[test]
    fn test_reminder_due_at() {
        assert_eq!(reminder_due_at(at(10, 0), 15), at(9, 45));
    }

    #[test]
    fn test_reminder_window() {
        let start = at(10, 0);
        let due = reminder_due_at(start, 15);

        // 到点之前不触发
        assert!(!reminder_is_due(due, start, at(9, 44)));
        // 窗口内触发
        assert!(reminder_is_due(due, start, at(9, 45)));
        assert!(reminder_is_due(due, start, at(9, 50)));
        // 目标时间已过则不再提醒
        assert!(!reminder_is_due(due, start, at(10, 0)));
        assert!(!reminder_is_due(due, start, at(10, 30)));
    }
}
