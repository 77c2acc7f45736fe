// ---------------------------------------------------------------------------
// Age bands
// ---------------------------------------------------------------------------

/// Bin edges for the ten age bands.
pub const AGE_BOUNDARIES: [i64; 11] = [0, 10, 20, 30, 40, 50, 60, 70, 80, 90, 100];

/// Labels for the ten age bands, in increasing-age order.
pub const AGE_GROUP_LABELS: [&str; 10] = [
    "0-10", "11-20", "21-30", "31-40", "41-50", "51-60", "61-70", "71-80", "81-90", "91-100",
];

/// How an age on a bin edge is assigned.
///
/// The bands have historically been cut right-open over [`AGE_BOUNDARIES`]:
/// an age equal to an edge falls into the band that *starts* there, so age 10
/// is counted under the `11-20` label and ages 100 and above are unbucketed.
/// `Legacy` keeps that behavior; `LabelAligned` makes the intervals match the
/// printed labels instead (`0-10` = 0..=10, …, `91-100` = 91..=100).  Nothing
/// in this crate switches policy implicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryPolicy {
    #[default]
    Legacy,
    LabelAligned,
}

/// Assign an age to its band under the default [`BoundaryPolicy::Legacy`].
///
/// Returns `None` for ages outside the binnable range; such records are
/// excluded from band-based views.
pub fn assign_age_group(age: i64) -> Option<&'static str> {
    assign_age_group_with(age, BoundaryPolicy::Legacy)
}

/// Assign an age to its band under an explicit policy.
pub fn assign_age_group_with(age: i64, policy: BoundaryPolicy) -> Option<&'static str> {
    match policy {
        BoundaryPolicy::Legacy => {
            for i in 0..AGE_GROUP_LABELS.len() {
                if AGE_BOUNDARIES[i] <= age && age < AGE_BOUNDARIES[i + 1] {
                    return Some(AGE_GROUP_LABELS[i]);
                }
            }
            None
        }
        BoundaryPolicy::LabelAligned => {
            if age < 0 || age > 100 {
                return None;
            }
            // First band covers 0..=10, the rest are 11..=20, 21..=30, ...
            for i in (0..AGE_GROUP_LABELS.len()).rev() {
                let band_start = if i == 0 { 0 } else { AGE_BOUNDARIES[i] + 1 };
                if age >= band_start {
                    return Some(AGE_GROUP_LABELS[i]);
                }
            }
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_boundary_assignment() {
        assert_eq!(assign_age_group(0), Some("0-10"));
        assert_eq!(assign_age_group(9), Some("0-10"));
        assert_eq!(assign_age_group(10), Some("11-20"));
        assert_eq!(assign_age_group(20), Some("21-30"));
        assert_eq!(assign_age_group(99), Some("91-100"));
    }

    #[test]
    fn test_legacy_out_of_range_is_unbucketed() {
        assert_eq!(assign_age_group(-1), None);
        assert_eq!(assign_age_group(100), None);
        assert_eq!(assign_age_group(120), None);
    }

    #[test]
    fn test_label_aligned_matches_printed_labels() {
        let p = BoundaryPolicy::LabelAligned;
        assert_eq!(assign_age_group_with(10, p), Some("0-10"));
        assert_eq!(assign_age_group_with(11, p), Some("11-20"));
        assert_eq!(assign_age_group_with(20, p), Some("11-20"));
        assert_eq!(assign_age_group_with(100, p), Some("91-100"));
        assert_eq!(assign_age_group_with(101, p), None);
        assert_eq!(assign_age_group_with(-1, p), None);
    }

    #[test]
    fn test_assignment_is_total_over_valid_range() {
        for age in 0..100 {
            assert!(assign_age_group(age).is_some(), "age {age} has no band");
        }
    }
}
