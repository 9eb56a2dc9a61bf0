use time::Date;

use crate::domain::DateRange;

/// Number of half-hour settlement slots in one day.
pub const HALF_HOUR_SLOTS: usize = 48;

/// Labels for the half-hour slots as they appear in the source data:
/// `"00:00"`, `"00:30"`, ... `"23:30"`.
pub fn half_hour_labels() -> Vec<String> {
    (0..HALF_HOUR_SLOTS)
        .map(|slot| format!("{:02}:{:02}", slot / 2, (slot % 2) * 30))
        .collect()
}

/// One day of electricity usage for one hotel.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UsageRecord {
    pub date: Date,
    pub hotel: String,
    pub total_kwh: f64,
    /// Half-hourly breakdown, 48 slots, when the source provides it.
    pub half_hours: Option<Vec<f64>>,
}

/// An immutable, date-ordered usage series for a single hotel.
///
/// Built once from raw source rows: rows for other hotels are dropped,
/// duplicate rows for the same day are summed (usage and, slot-wise, the
/// half-hour breakdown), and the result is sorted by date. Exactly one record
/// per day survives construction.
#[derive(Debug, Clone)]
pub struct HotelSeries {
    hotel: String,
    records: Vec<UsageRecord>,
}

impl HotelSeries {
    pub fn from_records<I>(hotel: &str, records: I) -> Self
    where
        I: IntoIterator<Item = UsageRecord>,
    {
        let mut by_date: std::collections::BTreeMap<Date, UsageRecord> =
            std::collections::BTreeMap::new();

        for record in records {
            if record.hotel != hotel {
                continue;
            }
            match by_date.entry(record.date) {
                std::collections::btree_map::Entry::Vacant(slot) => {
                    slot.insert(record);
                }
                std::collections::btree_map::Entry::Occupied(mut slot) => {
                    merge_duplicate(slot.get_mut(), record);
                }
            }
        }

        Self {
            hotel: hotel.to_string(),
            records: by_date.into_values().collect(),
        }
    }

    pub fn hotel(&self) -> &str {
        &self.hotel
    }

    pub fn records(&self) -> &[UsageRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, date: Date) -> Option<&UsageRecord> {
        self.records
            .binary_search_by_key(&date, |r| r.date)
            .ok()
            .map(|idx| &self.records[idx])
    }

    /// The contiguous slice of records falling inside `range`.
    pub fn range_slice(&self, range: &DateRange) -> &[UsageRecord] {
        let lo = self.records.partition_point(|r| r.date < range.start);
        let hi = self.records.partition_point(|r| r.date <= range.end);
        &self.records[lo..hi]
    }
}

fn merge_duplicate(existing: &mut UsageRecord, incoming: UsageRecord) {
    existing.total_kwh += incoming.total_kwh;
    existing.half_hours = match (existing.half_hours.take(), incoming.half_hours) {
        (Some(mut a), Some(b)) => {
            for (slot, value) in a.iter_mut().zip(b) {
                *slot += value;
            }
            Some(a)
        }
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn record(date: Date, kwh: f64) -> UsageRecord {
        UsageRecord {
            date,
            hotel: "Westin".to_string(),
            total_kwh: kwh,
            half_hours: None,
        }
    }

    #[test]
    fn series_sorts_by_date() {
        let series = HotelSeries::from_records(
            "Westin",
            vec![
                record(date!(2025 - 04 - 03), 3.0),
                record(date!(2025 - 04 - 01), 1.0),
                record(date!(2025 - 04 - 02), 2.0),
            ],
        );
        let dates: Vec<Date> = series.records().iter().map(|r| r.date).collect();
        assert_eq!(
            dates,
            vec![date!(2025 - 04 - 01), date!(2025 - 04 - 02), date!(2025 - 04 - 03)]
        );
    }

    #[test]
    fn series_drops_other_hotels() {
        let mut other = record(date!(2025 - 04 - 01), 99.0);
        other.hotel = "Canopy".to_string();

        let series =
            HotelSeries::from_records("Westin", vec![record(date!(2025 - 04 - 02), 1.0), other]);
        assert_eq!(series.len(), 1);
        assert_eq!(series.records()[0].date, date!(2025 - 04 - 02));
    }

    #[test]
    fn duplicate_days_are_summed_not_dropped() {
        let mut a = record(date!(2025 - 04 - 01), 100.0);
        a.half_hours = Some(vec![1.0; HALF_HOUR_SLOTS]);
        let mut b = record(date!(2025 - 04 - 01), 50.0);
        b.half_hours = Some(vec![2.0; HALF_HOUR_SLOTS]);

        let series = HotelSeries::from_records("Westin", vec![a, b]);
        assert_eq!(series.len(), 1);
        let merged = &series.records()[0];
        assert_eq!(merged.total_kwh, 150.0);
        assert_eq!(merged.half_hours.as_ref().unwrap()[0], 3.0);
    }

    #[test]
    fn duplicate_with_missing_half_hours_keeps_the_present_side() {
        let a = record(date!(2025 - 04 - 01), 100.0);
        let mut b = record(date!(2025 - 04 - 01), 50.0);
        b.half_hours = Some(vec![2.0; HALF_HOUR_SLOTS]);

        let series = HotelSeries::from_records("Westin", vec![a, b]);
        let merged = &series.records()[0];
        assert_eq!(merged.total_kwh, 150.0);
        assert_eq!(merged.half_hours.as_ref().unwrap()[0], 2.0);
    }

    #[test]
    fn range_slice_is_inclusive_on_both_ends() {
        let series = HotelSeries::from_records(
            "Westin",
            (1..=10).map(|day| record(Date::from_calendar_date(2025, time::Month::April, day).unwrap(), day as f64)),
        );
        let range = DateRange::new(date!(2025 - 04 - 03), date!(2025 - 04 - 05)).unwrap();
        let slice = series.range_slice(&range);
        assert_eq!(slice.len(), 3);
        assert_eq!(slice[0].date, date!(2025 - 04 - 03));
        assert_eq!(slice[2].date, date!(2025 - 04 - 05));
    }

    #[test]
    fn half_hour_labels_cover_the_day() {
        let labels = half_hour_labels();
        assert_eq!(labels.len(), 48);
        assert_eq!(labels[0], "00:00");
        assert_eq!(labels[1], "00:30");
        assert_eq!(labels[47], "23:30");
    }
}
