use crate::domain::{half_hour_labels, DateRange, HotelSeries, HALF_HOUR_SLOTS};

/// Mean usage for one half-hour slot of the day over a period.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlotAverage {
    pub slot: usize,
    pub label: String,
    pub avg_kwh: f64,
}

/// Mean daily usage for one day of the week over a period.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeekdayAverage {
    /// 0 = Monday .. 6 = Sunday.
    pub weekday: u8,
    pub label: String,
    pub avg_kwh: f64,
}

/// Average usage per half-hour slot over the days in `range` that carry a
/// half-hourly breakdown. `None` when the source is daily-only.
pub fn half_hour_profile(series: &HotelSeries, range: &DateRange) -> Option<Vec<SlotAverage>> {
    let mut sums = [0.0_f64; HALF_HOUR_SLOTS];
    let mut days = 0_usize;

    for record in series.range_slice(range) {
        let Some(half_hours) = &record.half_hours else {
            continue;
        };
        for (sum, value) in sums.iter_mut().zip(half_hours) {
            *sum += value;
        }
        days += 1;
    }

    if days == 0 {
        return None;
    }

    let labels = half_hour_labels();
    Some(
        sums.iter()
            .enumerate()
            .map(|(slot, sum)| SlotAverage {
                slot,
                label: labels[slot].clone(),
                avg_kwh: sum / days as f64,
            })
            .collect(),
    )
}

/// Average daily usage by day of week over `range`, Monday first. Weekdays
/// with no data in the range are omitted.
pub fn weekday_profile(series: &HotelSeries, range: &DateRange) -> Vec<WeekdayAverage> {
    let mut sums = [0.0_f64; 7];
    let mut counts = [0_usize; 7];

    for record in series.range_slice(range) {
        let idx = record.date.weekday().number_days_from_monday() as usize;
        sums[idx] += record.total_kwh;
        counts[idx] += 1;
    }

    (0..7)
        .filter(|&idx| counts[idx] > 0)
        .map(|idx| WeekdayAverage {
            weekday: idx as u8,
            label: weekday_label(idx).to_string(),
            avg_kwh: sums[idx] / counts[idx] as f64,
        })
        .collect()
}

fn weekday_label(idx: usize) -> &'static str {
    match idx {
        0 => "Monday",
        1 => "Tuesday",
        2 => "Wednesday",
        3 => "Thursday",
        4 => "Friday",
        5 => "Saturday",
        _ => "Sunday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UsageRecord;
    use time::macros::date;
    use time::Date;

    fn record(date: Date, kwh: f64, half_hours: Option<Vec<f64>>) -> UsageRecord {
        UsageRecord {
            date,
            hotel: "Camden".to_string(),
            total_kwh: kwh,
            half_hours,
        }
    }

    #[test]
    fn half_hour_profile_averages_per_slot() {
        let series = HotelSeries::from_records(
            "Camden",
            vec![
                record(date!(2025 - 04 - 01), 48.0, Some(vec![1.0; HALF_HOUR_SLOTS])),
                record(date!(2025 - 04 - 02), 144.0, Some(vec![3.0; HALF_HOUR_SLOTS])),
                // Daily-only day does not dilute the slot averages.
                record(date!(2025 - 04 - 03), 100.0, None),
            ],
        );
        let range = DateRange::new(date!(2025 - 04 - 01), date!(2025 - 04 - 03)).unwrap();

        let profile = half_hour_profile(&series, &range).unwrap();
        assert_eq!(profile.len(), HALF_HOUR_SLOTS);
        assert_eq!(profile[0].label, "00:00");
        assert!((profile[0].avg_kwh - 2.0).abs() < 1e-9);
        assert!((profile[47].avg_kwh - 2.0).abs() < 1e-9);
    }

    #[test]
    fn half_hour_profile_is_none_for_daily_only_data() {
        let series = HotelSeries::from_records(
            "Camden",
            vec![record(date!(2025 - 04 - 01), 100.0, None)],
        );
        let range = DateRange::new(date!(2025 - 04 - 01), date!(2025 - 04 - 01)).unwrap();
        assert!(half_hour_profile(&series, &range).is_none());
    }

    #[test]
    fn weekday_profile_groups_by_day_of_week() {
        // 2025-04-07 and 2025-04-14 are Mondays; 2025-04-08 is a Tuesday.
        let series = HotelSeries::from_records(
            "Camden",
            vec![
                record(date!(2025 - 04 - 07), 100.0, None),
                record(date!(2025 - 04 - 14), 200.0, None),
                record(date!(2025 - 04 - 08), 80.0, None),
            ],
        );
        let range = DateRange::new(date!(2025 - 04 - 01), date!(2025 - 04 - 30)).unwrap();

        let profile = weekday_profile(&series, &range);
        assert_eq!(profile.len(), 2);
        assert_eq!(profile[0].label, "Monday");
        assert!((profile[0].avg_kwh - 150.0).abs() < 1e-9);
        assert_eq!(profile[1].label, "Tuesday");
        assert!((profile[1].avg_kwh - 80.0).abs() < 1e-9);
    }
}
