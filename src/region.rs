//! FIPS region-code reference table.
//!
//! The table is an external static dataset. It is loaded once and handed to
//! each source by reference, so sources can be tested against small
//! synthetic tables.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::Result;

/// A state-level entry, keyed by 2-digit code
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StateEntry {
    pub name: String,
    pub abbreviation: String,
}

/// A county-level entry, keyed by 5-digit code
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CountyEntry {
    /// Full name of the parent state, e.g. "Texas"
    pub state: String,
    /// County name including its suffix, e.g. "Travis County"
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegionCodeTable {
    #[serde(default)]
    states: BTreeMap<String, StateEntry>,
    #[serde(default)]
    counties: BTreeMap<String, CountyEntry>,
}

impl RegionCodeTable {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn county(&self, code: u32) -> Option<&CountyEntry> {
        self.counties.get(&format!("{code:05}"))
    }

    pub fn state(&self, code: u32) -> Option<&StateEntry> {
        self.states.get(&format!("{code:02}"))
    }

    /// County name for a numeric code, or `default` when the code is unknown
    pub fn county_name_or<'a>(&'a self, code: u32, default: &'a str) -> &'a str {
        self.county(code).map(|c| c.name.as_str()).unwrap_or(default)
    }

    /// State abbreviation for a numeric code, or `default` when the code is unknown
    pub fn state_abbreviation_or<'a>(&'a self, code: u32, default: &'a str) -> &'a str {
        self.state(code)
            .map(|s| s.abbreviation.as_str())
            .unwrap_or(default)
    }

    /// State abbreviation for the state a 5-digit county code belongs to
    pub fn state_abbreviation_for_county<'a>(
        &'a self,
        county_fips: &str,
        default: &'a str,
    ) -> &'a str {
        county_fips
            .get(..2)
            .and_then(|prefix| prefix.parse::<u32>().ok())
            .map(|code| self.state_abbreviation_or(code, default))
            .unwrap_or(default)
    }

    /// Counties whose parent state is `state_name`, ordered by fips
    pub fn counties_in_state<'a>(
        &'a self,
        state_name: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a CountyEntry)> + 'a {
        self.counties
            .iter()
            .filter(move |(_, county)| county.state == state_name)
            .map(|(fips, county)| (fips.as_str(), county))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = r#"{
        "states": {
            "06": {"name": "California", "abbreviation": "CA"},
            "48": {"name": "Texas", "abbreviation": "TX"}
        },
        "counties": {
            "06075": {"state": "California", "name": "San Francisco County"},
            "48453": {"state": "Texas", "name": "Travis County"},
            "48001": {"state": "Texas", "name": "Anderson County"}
        }
    }"#;

    #[test]
    fn test_county_lookup_zero_pads() {
        let table = RegionCodeTable::from_json_str(TABLE).unwrap();
        assert_eq!(table.county_name_or(6075, "?"), "San Francisco County");
        assert_eq!(table.county_name_or(99999, "?"), "?");
    }

    #[test]
    fn test_state_lookup_zero_pads() {
        let table = RegionCodeTable::from_json_str(TABLE).unwrap();
        assert_eq!(table.state_abbreviation_or(6, "??"), "CA");
        assert_eq!(table.state_abbreviation_or(48, "??"), "TX");
        assert_eq!(table.state_abbreviation_or(72, "??"), "??");
    }

    #[test]
    fn test_state_abbreviation_for_county() {
        let table = RegionCodeTable::from_json_str(TABLE).unwrap();
        assert_eq!(table.state_abbreviation_for_county("06085", "XX"), "CA");
        assert_eq!(table.state_abbreviation_for_county("72001", "XX"), "XX");
        assert_eq!(table.state_abbreviation_for_county("x", "XX"), "XX");
    }

    #[test]
    fn test_counties_in_state_are_ordered_by_fips() {
        let table = RegionCodeTable::from_json_str(TABLE).unwrap();
        let texas: Vec<&str> = table.counties_in_state("Texas").map(|(fips, _)| fips).collect();
        assert_eq!(texas, vec!["48001", "48453"]);
    }

    #[test]
    fn test_missing_sections_load_as_empty() {
        let table = RegionCodeTable::from_json_str("{}").unwrap();
        assert!(table.county(6075).is_none());
        assert_eq!(table.counties_in_state("Texas").count(), 0);
    }
}
