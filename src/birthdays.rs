use chrono::{Datelike, NaiveDate};

/// Next calendar occurrence of `birth`'s month/day on or after `today`.
///
/// The birth year is irrelevant. Feb 29 birthdays fall back to Feb 28 in
/// non-leap years.
pub fn next_occurrence(birth: NaiveDate, today: NaiveDate) -> NaiveDate {
    let this_year = onto_year(birth, today.year());
    if this_year >= today {
        this_year
    } else {
        onto_year(birth, today.year() + 1)
    }
}

/// Days from `today` until the next occurrence of the birthday (0 = today).
pub fn days_until_birthday(birth: NaiveDate, today: NaiveDate) -> i64 {
    (next_occurrence(birth, today) - today).num_days()
}

/// Whether the next birthday falls within `[today, today + window_days]`,
/// inclusive on both ends. A negative window matches nothing.
pub fn in_window(birth: NaiveDate, today: NaiveDate, window_days: i64) -> bool {
    window_days >= 0 && days_until_birthday(birth, today) <= window_days
}

/// Project the birthday's month/day onto `year`. Only Feb 29 can fail to
/// exist in a given year, hence the Feb 28 fallback.
fn onto_year(birth: NaiveDate, year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, birth.month(), birth.day())
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, 2, 28).unwrap_or(birth))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn birthday_today_is_zero_days_away() {
        assert_eq!(days_until_birthday(d(1990, 6, 1), d(2024, 6, 1)), 0);
        assert!(in_window(d(1990, 6, 1), d(2024, 6, 1), 0));
    }

    #[test]
    fn tomorrow_is_outside_zero_window() {
        assert!(!in_window(d(1990, 6, 2), d(2024, 6, 1), 0));
    }

    #[test]
    fn window_wraps_across_year_end() {
        let today = d(2024, 12, 29);
        assert_eq!(days_until_birthday(d(1990, 1, 3), today), 5);
        assert!(in_window(d(1990, 1, 3), today, 7));
        assert_eq!(days_until_birthday(d(2000, 1, 6), today), 8);
        assert!(!in_window(d(2000, 1, 6), today, 7));
    }

    #[test]
    fn window_boundary_is_inclusive() {
        let today = d(2024, 3, 1);
        assert!(in_window(d(1985, 3, 8), today, 7));
        assert!(!in_window(d(1985, 3, 9), today, 7));
    }

    #[test]
    fn yesterdays_birthday_moves_to_next_year() {
        let today = d(2024, 5, 10);
        assert_eq!(next_occurrence(d(1990, 5, 9), today), d(2025, 5, 9));
        assert!(!in_window(d(1990, 5, 9), today, 7));
    }

    #[test]
    fn leap_day_falls_back_to_feb_28() {
        let birth = d(2000, 2, 29);
        assert_eq!(next_occurrence(birth, d(2023, 2, 25)), d(2023, 2, 28));
        assert!(in_window(birth, d(2023, 2, 25), 7));
        // In a leap year the real date is used
        assert_eq!(next_occurrence(birth, d(2024, 2, 25)), d(2024, 2, 29));
    }

    #[test]
    fn negative_window_matches_nothing() {
        assert!(!in_window(d(1990, 6, 1), d(2024, 6, 1), -1));
    }
}
