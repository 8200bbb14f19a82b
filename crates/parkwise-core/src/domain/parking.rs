//! Parking locations, slots and the user profile as the service returns them.

use serde::{Deserialize, Serialize};

use super::ids::SlotId;

/// A parking location shown on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParkingPlace {
    pub name: String,
    /// Slot count advertised on the map marker (not live availability).
    pub advertised_slots: u32,
    pub latitude: f64,
    pub longitude: f64,
}

impl ParkingPlace {
    fn new(name: &str, advertised_slots: u32, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.to_string(),
            advertised_slots,
            latitude,
            longitude,
        }
    }

    /// The fixed set of locations the client offers.
    pub fn catalogue() -> Vec<ParkingPlace> {
        vec![
            ParkingPlace::new("Nepa", 8, 24.9185, 67.0976),
            ParkingPlace::new("Gulshan", 5, 24.9170, 67.0960),
            ParkingPlace::new("Johar", 10, 24.9160, 67.0950),
        ]
    }

    pub fn find(name: &str) -> Option<ParkingPlace> {
        Self::catalogue()
            .into_iter()
            .find(|place| place.name.eq_ignore_ascii_case(name))
    }
}

/// One slot at a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub id: SlotId,
    #[serde(default)]
    pub unavailable: bool,
}

impl Slot {
    pub fn is_bookable(&self) -> bool {
        !self.unavailable
    }
}

/// `GET /slots/{location}` のボディ
#[derive(Debug, Deserialize)]
pub(crate) struct SlotsBody {
    pub slots: Option<Vec<Slot>>,
}

/// The signed-in user's profile.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    pub name: String,
    pub email: String,
    pub age: Option<u32>,
    pub vehicle: Option<String>,
    pub model: Option<String>,
    pub license_plate: Option<String>,
    pub owner: Option<String>,
    pub profile_pic: Option<String>,
}

impl Profile {
    /// Resolves the stored picture path against the service base URL.
    ///
    /// The service stores Windows-style paths, so backslashes are normalised.
    pub fn profile_pic_url(&self, base: &reqwest::Url) -> Option<reqwest::Url> {
        let path = self.profile_pic.as_deref()?.replace('\\', "/");
        base.join(path.trim_start_matches('/')).ok()
    }
}
