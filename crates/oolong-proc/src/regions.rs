//! Declarative region tables.
//!
//! A region is a named conjunction of selection cuts. The cut list order
//! is documentation only — evaluation is an unordered AND. Tables are
//! validated against the selection registry before any filling happens,
//! so an undefined cut name fails up front rather than mid-fill.

use oolong_core::{Error, Result};

use crate::selection::SelectionRegistry;

/// One analysis region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    /// Region name, e.g. `"HLT_PFJet140_num"`.
    pub name: String,
    /// Required selection names.
    pub cuts: Vec<String>,
}

/// An ordered table of regions with unique names.
#[derive(Debug, Clone, Default)]
pub struct RegionTable {
    regions: Vec<Region>,
}

impl RegionTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a region. Fails on a duplicate region name.
    pub fn push(&mut self, name: impl Into<String>, cuts: Vec<String>) -> Result<()> {
        let name = name.into();
        if self.regions.iter().any(|r| r.name == name) {
            return Err(Error::Validation(format!("region '{name}' defined twice")));
        }
        self.regions.push(Region { name, cuts });
        Ok(())
    }

    /// Check every referenced cut against the registry.
    ///
    /// Called once after selections are registered and before the fill
    /// loop; fill-time lookups can then no longer fail.
    pub fn validate(&self, selection: &SelectionRegistry) -> Result<()> {
        for region in &self.regions {
            for cut in &region.cuts {
                if !selection.contains(cut) {
                    return Err(Error::UnknownSelection(format!(
                        "{cut} (referenced by region '{}')",
                        region.name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Regions in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }

    /// Number of regions.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether the table has no regions.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

/// Numerator/denominator region pairs for trigger-efficiency studies.
///
/// For each trigger the denominator carries `common` plus the
/// per-trigger `extra` cuts, and the numerator additionally requires the
/// `accept` cut — so a numerator mask is a subset of its denominator
/// mask by construction.
pub fn num_den_regions(
    triggers: &[String],
    common: &[&str],
    extra: impl Fn(&str) -> Vec<String>,
    accept: impl Fn(&str) -> String,
) -> Result<RegionTable> {
    let mut table = RegionTable::new();
    for trigger in triggers {
        let mut den: Vec<String> = common.iter().map(|c| c.to_string()).collect();
        den.extend(extra(trigger));
        let mut num = den.clone();
        num.push(accept(trigger));
        table.push(format!("{trigger}_num"), num)?;
        table.push(format!("{trigger}_den"), den)?;
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_region_rejected() {
        let mut table = RegionTable::new();
        table.push("sr", vec!["a".into()]).unwrap();
        assert!(table.push("sr", vec!["b".into()]).is_err());
    }

    #[test]
    fn validate_catches_undefined_cut() {
        let mut sel = SelectionRegistry::new(1);
        sel.add("lumi_mask", vec![true]).unwrap();

        let mut table = RegionTable::new();
        table.push("sr", vec!["lumi_mask".into(), "missing_cut".into()]).unwrap();
        let err = table.validate(&sel).unwrap_err();
        assert!(err.to_string().contains("missing_cut"));
        assert!(err.to_string().contains("sr"));
    }

    #[test]
    fn num_den_layout() {
        let triggers = vec!["HLT_PFJet140".to_string()];
        let table = num_den_regions(
            &triggers,
            &["lumi_mask"],
            |t| vec![format!("{t}_wasrun")],
            |t| format!("{t}_accepted"),
        )
        .unwrap();

        let regions: Vec<_> = table.iter().collect();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].name, "HLT_PFJet140_num");
        assert_eq!(
            regions[0].cuts,
            vec!["lumi_mask", "HLT_PFJet140_wasrun", "HLT_PFJet140_accepted"]
        );
        assert_eq!(regions[1].name, "HLT_PFJet140_den");
        assert_eq!(regions[1].cuts, vec!["lumi_mask", "HLT_PFJet140_wasrun"]);
    }

    #[test]
    fn num_mask_implies_den_mask() {
        let mut sel = SelectionRegistry::new(4);
        sel.add("lumi_mask", vec![true, true, true, false]).unwrap();
        sel.add("T_wasrun", vec![true, true, false, true]).unwrap();
        sel.add("T_accepted", vec![true, false, true, true]).unwrap();

        let triggers = vec!["T".to_string()];
        let table = num_den_regions(
            &triggers,
            &["lumi_mask"],
            |t| vec![format!("{t}_wasrun")],
            |t| format!("{t}_accepted"),
        )
        .unwrap();
        table.validate(&sel).unwrap();

        let num = sel.all(table.iter().next().unwrap().cuts.iter().map(String::as_str)).unwrap();
        let den = sel.all(table.iter().nth(1).unwrap().cuts.iter().map(String::as_str)).unwrap();
        for (n, d) in num.iter().zip(&den) {
            assert!(!n | d, "numerator must imply denominator");
        }
    }
}
