//! Geographic regions: named seas and explicit bounding boxes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Axis-aligned lat/lon box. Corners are inclusive.
///
/// Boxes crossing the antimeridian are not represented; callers split them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    min_lon: f64,
    min_lat: f64,
    max_lon: f64,
    max_lat: f64,
}

impl BoundingBox {
    /// Builds a box from `[min_lon, min_lat, max_lon, max_lat]`.
    ///
    /// # Errors
    /// [`ModelError::CoordinateOutOfRange`] when a corner is outside the globe,
    /// [`ModelError::InvalidBoundingBox`] when corners are inverted.
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Result<Self> {
        check_lon(min_lon)?;
        check_lon(max_lon)?;
        check_lat(min_lat)?;
        check_lat(max_lat)?;
        if min_lon > max_lon || min_lat > max_lat {
            return Err(ModelError::InvalidBoundingBox(format!(
                "[{min_lon}, {min_lat}, {max_lon}, {max_lat}] has inverted corners"
            )));
        }
        Ok(Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        })
    }

    /// Degenerate box around a single location.
    pub fn point(latitude: f64, longitude: f64) -> Result<Self> {
        Self::new(longitude, latitude, longitude, latitude)
    }

    pub fn min_lon(&self) -> f64 {
        self.min_lon
    }
    pub fn min_lat(&self) -> f64 {
        self.min_lat
    }
    pub fn max_lon(&self) -> f64 {
        self.max_lon
    }
    pub fn max_lat(&self) -> f64 {
        self.max_lat
    }

    /// `(latitude, longitude)` of the box center.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }

    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        latitude >= self.min_lat
            && latitude <= self.max_lat
            && longitude >= self.min_lon
            && longitude <= self.max_lon
    }

    pub fn is_point(&self) -> bool {
        self.min_lat == self.max_lat && self.min_lon == self.max_lon
    }

    /// Location at fractional offsets inside the box (`0.0..=1.0` on each axis).
    ///
    /// Fractions are clamped, so the result always lies within the box.
    pub fn interpolate(&self, lat_frac: f64, lon_frac: f64) -> (f64, f64) {
        let fy = lat_frac.clamp(0.0, 1.0);
        let fx = lon_frac.clamp(0.0, 1.0);
        // Clamp again: `min + (max - min) * 1.0` can round past `max`.
        (
            (self.min_lat + (self.max_lat - self.min_lat) * fy).clamp(self.min_lat, self.max_lat),
            (self.min_lon + (self.max_lon - self.min_lon) * fx).clamp(self.min_lon, self.max_lon),
        )
    }
}

fn check_lat(v: f64) -> Result<()> {
    if v.is_finite() && (-90.0..=90.0).contains(&v) {
        Ok(())
    } else {
        Err(ModelError::CoordinateOutOfRange {
            field: "latitude",
            value: v,
        })
    }
}

fn check_lon(v: f64) -> Result<()> {
    if v.is_finite() && (-180.0..=180.0).contains(&v) {
        Ok(())
    } else {
        Err(ModelError::CoordinateOutOfRange {
            field: "longitude",
            value: v,
        })
    }
}

pub(crate) fn validate_position(latitude: f64, longitude: f64) -> Result<()> {
    check_lat(latitude)?;
    check_lon(longitude)
}

/// Seas and basins the assistant knows by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamedSea {
    BayOfBengal,
    ArabianSea,
    EquatorialIndianOcean,
    IndianOcean,
    PacificOcean,
    AtlanticOcean,
    SouthernOcean,
}

impl NamedSea {
    /// Ordered most-specific first, so text matching prefers sub-basins.
    pub const ALL: [NamedSea; 7] = [
        NamedSea::BayOfBengal,
        NamedSea::ArabianSea,
        NamedSea::EquatorialIndianOcean,
        NamedSea::IndianOcean,
        NamedSea::PacificOcean,
        NamedSea::AtlanticOcean,
        NamedSea::SouthernOcean,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            NamedSea::BayOfBengal => "Bay of Bengal",
            NamedSea::ArabianSea => "Arabian Sea",
            NamedSea::EquatorialIndianOcean => "Equatorial Indian Ocean",
            NamedSea::IndianOcean => "Indian Ocean",
            NamedSea::PacificOcean => "Pacific Ocean",
            NamedSea::AtlanticOcean => "Atlantic Ocean",
            NamedSea::SouthernOcean => "Southern Ocean",
        }
    }

    /// Lowercase phrases recognised in free text and LLM output.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            NamedSea::BayOfBengal => &["bay of bengal", "bengal bay", "bob"],
            NamedSea::ArabianSea => &["arabian sea", "arabian"],
            NamedSea::EquatorialIndianOcean => {
                &["equatorial indian ocean", "equatorial indian", "equator"]
            }
            NamedSea::IndianOcean => &["indian ocean", "indian"],
            NamedSea::PacificOcean => &["pacific ocean", "pacific"],
            NamedSea::AtlanticOcean => &["atlantic ocean", "atlantic"],
            NamedSea::SouthernOcean => &["southern ocean", "antarctic"],
        }
    }

    /// Approximate extent of the basin.
    pub fn bbox(&self) -> BoundingBox {
        let (min_lon, min_lat, max_lon, max_lat) = match self {
            NamedSea::BayOfBengal => (80.0, 5.0, 100.0, 25.0),
            NamedSea::ArabianSea => (60.0, 8.0, 80.0, 25.0),
            NamedSea::EquatorialIndianOcean => (50.0, -10.0, 100.0, 10.0),
            NamedSea::IndianOcean => (40.0, -40.0, 120.0, 30.0),
            NamedSea::PacificOcean => (120.0, -60.0, 180.0, 60.0),
            NamedSea::AtlanticOcean => (-80.0, -60.0, 20.0, 60.0),
            NamedSea::SouthernOcean => (-180.0, -78.0, 180.0, -50.0),
        };
        BoundingBox {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Resolves a name or alias (case-insensitive, surrounding whitespace ignored).
    pub fn from_name(name: &str) -> Option<NamedSea> {
        let needle = normalize(name);
        if needle.is_empty() {
            return None;
        }
        Self::ALL.into_iter().find(|sea| {
            normalize(sea.display_name()) == needle || sea.aliases().iter().any(|a| *a == needle)
        })
    }

    /// First sea whose alias appears as a whole phrase in `text`.
    pub fn find_in_text(text: &str) -> Option<NamedSea> {
        let hay = format!(" {} ", normalize(text));
        Self::ALL.into_iter().find(|sea| {
            sea.aliases()
                .iter()
                .any(|alias| hay.contains(&format!(" {alias} ")))
        })
    }
}

impl fmt::Display for NamedSea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

fn normalize(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Region targeted by a query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Named(NamedSea),
    BoundingBox(BoundingBox),
}

impl Region {
    pub fn bbox(&self) -> BoundingBox {
        match self {
            Region::Named(sea) => sea.bbox(),
            Region::BoundingBox(b) => *b,
        }
    }

    pub fn named(&self) -> Option<NamedSea> {
        match self {
            Region::Named(sea) => Some(*sea),
            Region::BoundingBox(_) => None,
        }
    }

    /// Human label used in titles and answers.
    pub fn label(&self) -> String {
        match self {
            Region::Named(sea) => sea.display_name().to_string(),
            Region::BoundingBox(b) => format!(
                "{:.1}°–{:.1}°N, {:.1}°–{:.1}°E",
                b.min_lat, b.max_lat, b.min_lon, b.max_lon
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_inverted_and_out_of_range_boxes() {
        assert!(BoundingBox::new(10.0, 0.0, 5.0, 1.0).is_err());
        assert!(BoundingBox::new(0.0, -91.0, 5.0, 1.0).is_err());
        assert!(BoundingBox::new(0.0, 0.0, 181.0, 1.0).is_err());
        assert!(BoundingBox::new(f64::NAN, 0.0, 1.0, 1.0).is_err());
        assert!(BoundingBox::new(80.0, 5.0, 100.0, 25.0).is_ok());
    }

    #[test]
    fn interpolation_stays_inside() {
        let b = NamedSea::ArabianSea.bbox();
        for f in [-0.5, 0.0, 0.3, 1.0, 1.7] {
            let (lat, lon) = b.interpolate(f, 1.0 - f);
            assert!(b.contains(lat, lon));
        }
    }

    #[test]
    fn resolves_names_and_aliases() {
        assert_eq!(
            NamedSea::from_name("  Bay of Bengal "),
            Some(NamedSea::BayOfBengal)
        );
        assert_eq!(NamedSea::from_name("pacific"), Some(NamedSea::PacificOcean));
        assert_eq!(NamedSea::from_name("North Sea"), None);
    }

    #[test]
    fn text_search_prefers_sub_basin() {
        let found = NamedSea::find_in_text("Show me temperature in Bay of Bengal at 500m");
        assert_eq!(found, Some(NamedSea::BayOfBengal));
        let found = NamedSea::find_in_text("salinity across the Indian Ocean?");
        assert_eq!(found, Some(NamedSea::IndianOcean));
        assert_eq!(NamedSea::find_in_text("bobcat sightings"), None);
    }
}
