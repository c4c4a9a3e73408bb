//! Region reference table
//!
//! Region code -> descriptive label and parent state. The state picks the
//! precipitation table to scan; the label decorates output rows. Built once
//! and passed around by reference.

use anyhow::Result;
use rustc_hash::FxHashMap;
use std::path::Path;
use tracing::warn;

use crate::error::{DroughtError, DroughtResult};
use crate::utils::{pad_region_code, read_csv, require_columns, string_column};

pub const COL_REGION_CODE: &str = "ANSI Code";
pub const COL_LOCATION: &str = "Location";
pub const COL_STATE: &str = "State Initial";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionInfo {
    /// Five-digit county code ("17079")
    pub code: String,
    /// "Jasper County, Illinois"
    pub location: String,
    /// State abbreviation ("IL"), names the precipitation table
    pub state: String,
}

#[derive(Debug, Clone, Default)]
pub struct RegionReference {
    regions: FxHashMap<String, RegionInfo>,
}

impl RegionReference {
    pub fn from_regions(regions: impl IntoIterator<Item = RegionInfo>) -> Self {
        let mut map = FxHashMap::default();
        for region in regions {
            map.entry(region.code.clone()).or_insert(region);
        }
        Self { regions: map }
    }

    /// Load from the areas-of-interest CSV
    ///
    /// Columns: `ANSI Code`, `Location`, `State Initial`. Rows missing any of
    /// the three are skipped with a warning.
    pub fn load(path: &Path) -> Result<Self> {
        let context = "region reference";
        let df = read_csv(path, context)?;
        require_columns(&df, &[COL_REGION_CODE, COL_LOCATION, COL_STATE], context)?;

        let codes = string_column(&df, COL_REGION_CODE, context)?;
        let locations = string_column(&df, COL_LOCATION, context)?;
        let states = string_column(&df, COL_STATE, context)?;

        let mut regions = Vec::with_capacity(codes.len());
        for (idx, ((code, location), state)) in codes
            .into_iter()
            .zip(locations)
            .zip(states)
            .enumerate()
        {
            match (code, location, state) {
                (Some(code), Some(location), Some(state)) => regions.push(RegionInfo {
                    code: pad_region_code(&code),
                    location,
                    state,
                }),
                _ => warn!("{:?}: skipping incomplete region row {}", path, idx + 1),
            }
        }

        let reference = Self::from_regions(regions);
        if reference.is_empty() {
            anyhow::bail!("{:?}: no usable region rows", path);
        }
        Ok(reference)
    }

    pub fn get(&self, code: &str) -> DroughtResult<&RegionInfo> {
        self.regions
            .get(code)
            .ok_or_else(|| DroughtError::UnknownRegion(code.to_string()))
    }

    /// Distinct states of the given regions, sorted. Unknown codes are
    /// ignored here and reported when the region is processed.
    pub fn states_for<'a>(&self, codes: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        let mut states: Vec<String> = codes
            .into_iter()
            .filter_map(|code| self.regions.get(code))
            .map(|region| region.state.clone())
            .collect();
        states.sort();
        states.dedup();
        states
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> RegionReference {
        RegionReference::from_regions(vec![
            RegionInfo {
                code: "17079".to_string(),
                location: "Jasper County, Illinois".to_string(),
                state: "IL".to_string(),
            },
            RegionInfo {
                code: "18095".to_string(),
                location: "Madison County, Indiana".to_string(),
                state: "IN".to_string(),
            },
            RegionInfo {
                code: "17113".to_string(),
                location: "Mclean County, Illinois".to_string(),
                state: "IL".to_string(),
            },
        ])
    }

    #[test]
    fn test_lookup() {
        let refs = reference();
        assert_eq!(refs.len(), 3);
        assert_eq!(refs.get("18095").unwrap().state, "IN");
        assert_eq!(
            refs.get("99999").unwrap_err(),
            DroughtError::UnknownRegion("99999".to_string())
        );
    }

    #[test]
    fn test_states_for_dedupes_and_sorts() {
        let refs = reference();
        assert_eq!(refs.states_for(["18095", "17079", "17113"]), vec!["IL", "IN"]);
        assert_eq!(refs.states_for(["00000", "17113"]), vec!["IL"]);
        assert!(refs.states_for(std::iter::empty()).is_empty());
    }
}
