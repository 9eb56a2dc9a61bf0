use std::collections::HashMap;

use crate::config::HotelConfig;

/// The single meter-point to hotel lookup shared by every dashboard
/// instance. Built once from the `[[hotels]]` configuration table.
#[derive(Debug, Clone)]
pub struct HotelDirectory {
    hotels: Vec<HotelConfig>,
    by_meter: HashMap<String, usize>,
}

impl HotelDirectory {
    pub fn new(hotels: &[HotelConfig]) -> Self {
        let by_meter = hotels
            .iter()
            .enumerate()
            .map(|(idx, h)| (h.meter_point.clone(), idx))
            .collect();
        Self {
            hotels: hotels.to_vec(),
            by_meter,
        }
    }

    pub fn hotel_for_meter(&self, meter_point: &str) -> Option<&HotelConfig> {
        self.by_meter.get(meter_point).map(|&idx| &self.hotels[idx])
    }

    /// Name lookup is case-insensitive so URL paths like `/dashboard/westin`
    /// resolve to the configured "Westin".
    pub fn hotel_named(&self, name: &str) -> Option<&HotelConfig> {
        self.hotels.iter().find(|h| h.name.eq_ignore_ascii_case(name))
    }

    pub fn hotels(&self) -> &[HotelConfig] {
        &self.hotels
    }
}
