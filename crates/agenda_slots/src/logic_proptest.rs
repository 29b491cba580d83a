#[cfg(test)]
mod tests {
    use crate::logic::{
        calculate_available_slots, format_minutes, parse_time_of_day, OccupiedInterval,
        SLOT_INTERVAL_MINUTES,
    };
    use agenda_common::models::TimeRange;
    use proptest::prelude::*;

    // Working day as (start, end) minutes, start < end, both within one day
    fn working_day() -> impl Strategy<Value = (i64, i64)> {
        (0..1380i64).prop_flat_map(|start| (Just(start), (start + 1)..1440i64))
    }

    fn occupied() -> impl Strategy<Value = Vec<OccupiedInterval>> {
        prop::collection::vec(
            (0..1440i64, 1..240i64).prop_map(|(start, len)| OccupiedInterval::new(start, start + len)),
            0..8,
        )
    }

    fn range(start: i64, end: i64) -> TimeRange {
        TimeRange::new(format_minutes(start), format_minutes(end))
    }

    fn minutes(slots: &[String]) -> Vec<i64> {
        slots
            .iter()
            .map(|s| parse_time_of_day(s).expect("slot must be HH:MM"))
            .collect()
    }

    proptest! {
        // Without occupied intervals every grid point from start to end is offered
        #[test]
        fn test_empty_day_offers_whole_grid(
            (start, end) in working_day(),
            duration in 1..300i64,
        ) {
            let slots = calculate_available_slots(Some(&range(start, end)), None, &[], duration);
            let expected: Vec<i64> = (start..=end).step_by(SLOT_INTERVAL_MINUTES as usize).collect();
            prop_assert_eq!(minutes(&slots), expected);
        }

        // No returned slot overlaps any occupied interval, and slots stay on the grid
        #[test]
        fn test_slots_never_overlap_occupied(
            (start, end) in working_day(),
            duration in 1..300i64,
            busy in occupied(),
        ) {
            let slots = calculate_available_slots(Some(&range(start, end)), None, &busy, duration);
            for slot in minutes(&slots) {
                prop_assert!(slot >= start && slot <= end);
                prop_assert_eq!((slot - start) % SLOT_INTERVAL_MINUTES, 0);
                for interval in &busy {
                    prop_assert!(
                        slot + duration <= interval.start || slot >= interval.end,
                        "slot {} overlaps {:?}", slot, interval
                    );
                }
            }
        }

        // Every unconflicted grid point is offered, ascending and without duplicates
        #[test]
        fn test_slots_are_complete_and_ordered(
            (start, end) in working_day(),
            duration in 1..300i64,
            busy in occupied(),
        ) {
            let slots = minutes(&calculate_available_slots(
                Some(&range(start, end)), None, &busy, duration,
            ));
            let expected: Vec<i64> = (start..=end)
                .step_by(SLOT_INTERVAL_MINUTES as usize)
                .filter(|c| busy.iter().all(|i| !i.conflicts_with(*c, duration)))
                .collect();
            prop_assert!(slots.windows(2).all(|w| w[0] < w[1]));
            prop_assert_eq!(slots, expected);
        }

        // A lunch break is indistinguishable from an appointment over the same interval
        #[test]
        fn test_lunch_break_equals_appointment(
            (start, end) in working_day(),
            duration in 1..300i64,
            lunch_start in 0..1380i64,
            lunch_len in 1..120i64,
            busy in occupied(),
        ) {
            let working = range(start, end);
            let lunch = range(lunch_start, lunch_start + lunch_len);
            let mut as_appointment = busy.clone();
            as_appointment.push(OccupiedInterval::new(lunch_start, lunch_start + lunch_len));

            prop_assert_eq!(
                calculate_available_slots(Some(&working), Some(&lunch), &busy, duration),
                calculate_available_slots(Some(&working), None, &as_appointment, duration)
            );
        }

        // Identical inputs give identical output
        #[test]
        fn test_idempotent(
            (start, end) in working_day(),
            duration in 1..300i64,
            busy in occupied(),
        ) {
            let working = range(start, end);
            let first = calculate_available_slots(Some(&working), None, &busy, duration);
            let second = calculate_available_slots(Some(&working), None, &busy, duration);
            prop_assert_eq!(first, second);
        }
    }
}
