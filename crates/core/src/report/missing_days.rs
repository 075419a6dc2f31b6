//! Missing-days report: calendar days in a range with no submitted form.

use chrono::{Days, NaiveDate};
use std::collections::HashSet;

/// Computes every calendar day in `[from, to]` (inclusive) that is absent
/// from `present` - the complement of the set of days having at least one
/// form. Returns days in ascending order; an inverted range yields an
/// empty result.
#[must_use]
pub fn missing_days(from: NaiveDate, to: NaiveDate, present: &HashSet<NaiveDate>) -> Vec<NaiveDate> {
    let mut missing = Vec::new();
    let mut day = from;
    while day <= to {
        if !present.contains(&day) {
            missing.push(day);
        }
        let Some(next) = day.checked_add_days(Days::new(1)) else {
            break;
        };
        day = next;
    }
    missing
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
    }

    #[test]
    fn test_complement_of_present_days() {
        let present: HashSet<_> = [d(1), d(3), d(5)].into_iter().collect();
        assert_eq!(missing_days(d(1), d(5), &present), vec![d(2), d(4)]);
    }

    #[test]
    fn test_no_forms_means_every_day_missing() {
        let present = HashSet::new();
        assert_eq!(missing_days(d(10), d(12), &present), vec![d(10), d(11), d(12)]);
    }

    #[test]
    fn test_full_coverage_means_no_missing_days() {
        let present: HashSet<_> = [d(1), d(2), d(3)].into_iter().collect();
        assert!(missing_days(d(1), d(3), &present).is_empty());
    }

    #[test]
    fn test_single_day_range() {
        let present: HashSet<_> = [d(7)].into_iter().collect();
        assert!(missing_days(d(7), d(7), &present).is_empty());
        assert_eq!(missing_days(d(8), d(8), &present), vec![d(8)]);
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let present = HashSet::new();
        assert!(missing_days(d(5), d(1), &present).is_empty());
    }

    #[test]
    fn test_crosses_month_boundary() {
        let from = NaiveDate::from_ymd_opt(2026, 2, 27).unwrap();
        let to = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let present: HashSet<_> = [NaiveDate::from_ymd_opt(2026, 2, 28).unwrap()]
            .into_iter()
            .collect();

        assert_eq!(
            missing_days(from, to, &present),
            vec![
                NaiveDate::from_ymd_opt(2026, 2, 27).unwrap(),
                NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            ]
        );
    }
}
