use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::IntakeError;

/// Domain used for every station login email.
pub const STATION_EMAIL_DOMAIN: &str = "dvlavrs.app";

/// Inspection stations known to the intake tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Station {
    #[serde(rename = "ER1")]
    Er1,
    #[serde(rename = "ER2")]
    Er2,
    #[serde(rename = "ER3")]
    Er3,
    #[serde(rename = "ER4")]
    Er4,
    #[serde(rename = "GR1")]
    Gr1,
    #[serde(rename = "GR2")]
    Gr2,
    #[serde(rename = "GR3")]
    Gr3,
    #[serde(rename = "GR4")]
    Gr4,
    #[serde(rename = "AR1")]
    Ar1,
    #[serde(rename = "AR2")]
    Ar2,
    #[serde(rename = "AR3")]
    Ar3,
    #[serde(rename = "AR4")]
    Ar4,
    #[serde(rename = "AR5")]
    Ar5,
    #[serde(rename = "AR6")]
    Ar6,
}

const ALL: [Station; 14] = [
    Station::Er1,
    Station::Er2,
    Station::Er3,
    Station::Er4,
    Station::Gr1,
    Station::Gr2,
    Station::Gr3,
    Station::Gr4,
    Station::Ar1,
    Station::Ar2,
    Station::Ar3,
    Station::Ar4,
    Station::Ar5,
    Station::Ar6,
];

impl Station {
    pub fn all() -> &'static [Station] {
        &ALL
    }

    pub fn id(self) -> &'static str {
        match self {
            Station::Er1 => "ER1",
            Station::Er2 => "ER2",
            Station::Er3 => "ER3",
            Station::Er4 => "ER4",
            Station::Gr1 => "GR1",
            Station::Gr2 => "GR2",
            Station::Gr3 => "GR3",
            Station::Gr4 => "GR4",
            Station::Ar1 => "AR1",
            Station::Ar2 => "AR2",
            Station::Ar3 => "AR3",
            Station::Ar4 => "AR4",
            Station::Ar5 => "AR5",
            Station::Ar6 => "AR6",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Station::Er1 => "Koforidua Station",
            Station::Er2 => "Akim Oda Station",
            Station::Er3 => "Kyebi Station",
            Station::Er4 => "Nkawkaw Station",
            Station::Gr1 => "Accra Station (Haatso)",
            Station::Gr2 => "DVLA Headquarters (Cantonments)",
            Station::Gr3 => "Tema Station",
            Station::Gr4 => "Weija Station",
            Station::Ar1 => "Agona Ashanti Station",
            Station::Ar2 => "Bekwai Station",
            Station::Ar3 => "Kumasi Station",
            Station::Ar4 => "Mampong-Ashanti Station",
            Station::Ar5 => "Obuasi Station",
            Station::Ar6 => "Offinso Station",
        }
    }

    /// Login email, e.g. `ar3@dvlavrs.app`.
    pub fn email(self) -> String {
        format!("{}@{}", self.id().to_lowercase(), STATION_EMAIL_DOMAIN)
    }

    pub fn from_id(id: &str) -> Option<Station> {
        let id = id.trim();
        ALL.iter().copied().find(|s| s.id().eq_ignore_ascii_case(id))
    }

    /// Resolve a login email to its station. Surrounding whitespace and case are ignored.
    pub fn from_email(email: &str) -> Result<Station, IntakeError> {
        let normalized = email.trim().to_lowercase();
        ALL.iter()
            .copied()
            .find(|s| s.email() == normalized)
            .ok_or(IntakeError::UnknownStation(normalized))
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Station {
    type Err = IntakeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Station::from_id(s).ok_or_else(|| IntakeError::UnknownStation(s.trim().to_string()))
    }
}

/// Display name for a station id, echoing the id back when it is not in the table.
pub fn name_of(station_id: &str) -> String {
    Station::from_id(station_id)
        .map(|s| s.name().to_string())
        .unwrap_or_else(|| station_id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_station_round_trips_through_its_id_and_email() {
        assert_eq!(Station::all().len(), 14);
        for station in Station::all() {
            assert_eq!(Station::from_id(station.id()), Some(*station));
            assert_eq!(Station::from_email(&station.email()).unwrap(), *station);
        }
    }

    #[test]
    fn name_of_known_and_unknown_ids() {
        assert_eq!(name_of("AR3"), "Kumasi Station");
        assert_eq!(name_of("GR2"), "DVLA Headquarters (Cantonments)");
        assert_eq!(name_of("ZZ9"), "ZZ9");
    }

    #[test]
    fn email_login_is_normalized() {
        assert_eq!(Station::from_email("  AR3@DVLAVRS.app ").unwrap(), Station::Ar3);
        assert!(matches!(
            Station::from_email("someone@example.com"),
            Err(IntakeError::UnknownStation(_))
        ));
    }

    #[test]
    fn serializes_as_station_id() {
        assert_eq!(serde_json::to_string(&Station::Gr1).unwrap(), "\"GR1\"");
        assert_eq!("er4".parse::<Station>().unwrap(), Station::Er4);
    }
}
