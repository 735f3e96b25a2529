use serde::{Deserialize, Serialize};

/// Geographic position in degrees, ordered the way map libraries expect it.
///
/// Serializes as a `[lon, lat]` pair.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn is_valid(&self) -> bool {
        self.lon.is_finite()
            && self.lat.is_finite()
            && (-180.0..=180.0).contains(&self.lon)
            && (-90.0..=90.0).contains(&self.lat)
    }
}

impl From<[f64; 2]> for LonLat {
    fn from([lon, lat]: [f64; 2]) -> Self {
        Self { lon, lat }
    }
}

impl From<LonLat> for [f64; 2] {
    fn from(p: LonLat) -> Self {
        [p.lon, p.lat]
    }
}

#[cfg(test)]
mod tests {
    use super::LonLat;

    #[test]
    fn serializes_as_pair() {
        let p = LonLat::new(32.55, 15.5);
        assert_eq!(serde_json::to_string(&p).unwrap(), "[32.55,15.5]");
        let back: LonLat = serde_json::from_str("[32.55,15.5]").unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn validity_checks_ranges() {
        assert!(LonLat::new(32.55, 15.5).is_valid());
        assert!(!LonLat::new(181.0, 0.0).is_valid());
        assert!(!LonLat::new(0.0, -91.0).is_valid());
        assert!(!LonLat::new(f64::NAN, 0.0).is_valid());
    }
}
