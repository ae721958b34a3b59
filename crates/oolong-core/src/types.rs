//! Common data types for Oolong

use serde::{Deserialize, Serialize};

/// A data-taking year, or `Unknown` when it cannot be resolved from the
/// dataset name.
///
/// Processors disagree on how to treat an unresolvable year: some fail
/// hard, some continue with `Unknown`. Both need a value to pass around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Year {
    /// A resolved four-digit year, e.g. 2022.
    Known(u16),
    /// Year could not be determined from the dataset name.
    Unknown,
}

impl Year {
    /// The resolved year, if any.
    pub fn value(&self) -> Option<u16> {
        match self {
            Year::Known(y) => Some(*y),
            Year::Unknown => None,
        }
    }
}

impl std::fmt::Display for Year {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Year::Known(y) => write!(f, "{y}"),
            Year::Unknown => write!(f, "unknown"),
        }
    }
}

/// Extract the data-taking year from a dataset name.
///
/// Dataset names embed the year as a four-digit token, e.g.
/// `"Muon_Run2022C"` or `"JetMET_2023B"`. The first `20xx` token in the
/// plausible LHC range wins. Returns `None` when no such token exists.
pub fn extract_year(dataset: &str) -> Option<u16> {
    let bytes = dataset.as_bytes();
    for window in bytes.windows(4) {
        if window[0] == b'2' && window[1] == b'0' {
            let (d2, d3) = match ((window[2] as char).to_digit(10), (window[3] as char).to_digit(10))
            {
                (Some(a), Some(b)) => (a, b),
                _ => continue,
            };
            let year = 2000 + (d2 * 10 + d3) as u16;
            if (2015..=2026).contains(&year) {
                return Some(year);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_year() {
        assert_eq!(extract_year("Muon_Run2022C"), Some(2022));
        assert_eq!(extract_year("JetMET_2023B_PromptReco"), Some(2023));
        assert_eq!(extract_year("MET_Run2017F-17Nov2017"), Some(2017));
        assert_eq!(extract_year("Theo_Test"), None);
    }

    #[test]
    fn test_extract_year_ignores_non_year_tokens() {
        // "2057" is outside the plausible range; "2022" later in the name wins.
        assert_eq!(extract_year("sample_v2057_Run2022"), Some(2022));
    }

    #[test]
    fn test_year_display() {
        assert_eq!(Year::Known(2022).to_string(), "2022");
        assert_eq!(Year::Unknown.to_string(), "unknown");
        assert_eq!(Year::Known(2023).value(), Some(2023));
        assert_eq!(Year::Unknown.value(), None);
    }
}
