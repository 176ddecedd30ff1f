//! Static table of flood-prone cities and the accounts that post traffic
//! updates for them.
//!
//! Handle groups are hard-coded; the city names either come from the
//! built-in list or from a freshly scraped heading list (`floodwatch-web`),
//! paired positionally with the groups.

use crate::{Result, SocialError};

/// Traffic-update accounts per city, in the table's positional order.
pub const HANDLE_GROUPS: &[&[&str]] = &[
    &["nevadadot"],
    &["NJDOT_info", "511nyNJ"],
    &["TotalTrafficDFW", "krldtraffic", "NTTATravelAlert", "cityofplanotx"],
    &["PtreeCorners"],
    &["fl511_panhandl"],
    &["TotalTrafficRDU", "NCDOT_Triangle", "NCDOT", "RW911", "NCDOT_I77"],
    &["myARDOT", "traffic_nwa", "myARDOT"],
    &["QCTrafficAlerts", "WIBCTraffic"],
    &["fl511_northeast", "SJSOPIO"],
    &["ih45n_traffic", "KPRC2Traffic", "TownshipTransit"],
    &["roundrock"],
    &["DentonTweets", "ScannerRadioDFW", "DFWscanner"],
    &["fl511_central", "MyNews13Traffic", "fl511_state"],
    &["TxDOT", "TotalTrafficAUS"],
    &["SugarLandtxgov", "houstontranstar", "TotalTrafficHOU"],
];

/// City names matching [`HANDLE_GROUPS`] positionally, used when the source
/// page is not re-scraped.
pub const BUILTIN_CITIES: &[&str] = &[
    "Las Vegas, Nevada",
    "Jersey City, New Jersey",
    "Plano, Texas",
    "Peachtree Corners, Georgia",
    "Pensacola, Florida",
    "Raleigh, North Carolina",
    "Fayetteville, Arkansas",
    "Indianapolis, Indiana",
    "St Augustine, Florida",
    "The Woodlands, Texas",
    "Round Rock, Texas",
    "Denton, Texas",
    "Orlando, Florida",
    "Austin, Texas",
    "Sugar Land, Texas",
];

/// Read-only city → handles table, built once at startup.
#[derive(Debug, Clone)]
pub struct CityDirectory {
    // (lower-cased city name, handles) in definition order
    entries: Vec<(String, Vec<String>)>,
}

impl CityDirectory {
    /// Table over the built-in city list.
    pub fn builtin() -> Self {
        let names: Vec<String> = BUILTIN_CITIES.iter().map(|s| s.to_string()).collect();
        // lengths are equal by construction
        Self::from_city_names(&names).expect("builtin city list matches handle groups")
    }

    /// Pair a (scraped) city list with the handle groups positionally.
    pub fn from_city_names(names: &[String]) -> Result<Self> {
        if names.len() != HANDLE_GROUPS.len() {
            return Err(SocialError::CityCount {
                got: names.len(),
                want: HANDLE_GROUPS.len(),
            });
        }
        let entries = names
            .iter()
            .zip(HANDLE_GROUPS)
            .map(|(name, group)| {
                (
                    name.to_lowercase(),
                    group.iter().map(|h| h.to_string()).collect(),
                )
            })
            .collect();
        Ok(Self { entries })
    }

    /// Handles for one city, lower-cased exact match. `None` when the city
    /// is not in the table; callers print [`Self::city_names`] as the
    /// diagnostic.
    pub fn lookup(&self, city: &str) -> Option<&[String]> {
        let wanted = city.to_lowercase();
        self.entries
            .iter()
            .find(|(name, _)| *name == wanted)
            .map(|(_, handles)| handles.as_slice())
    }

    /// City names in definition order.
    pub fn city_names(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Full (city, handles) view in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, handles)| (name.as_str(), handles.as_slice()))
    }
}
