//! Measured ocean variables.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Parameters reported by Argo (core and BGC) floats.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Variable {
    #[default]
    Temperature,
    Salinity,
    Oxygen,
    Pressure,
    Chlorophyll,
    Nitrate,
    Ph,
    Density,
}

impl Variable {
    pub const ALL: [Variable; 8] = [
        Variable::Temperature,
        Variable::Salinity,
        Variable::Oxygen,
        Variable::Pressure,
        Variable::Chlorophyll,
        Variable::Nitrate,
        Variable::Ph,
        Variable::Density,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Variable::Temperature => "temperature",
            Variable::Salinity => "salinity",
            Variable::Oxygen => "oxygen",
            Variable::Pressure => "pressure",
            Variable::Chlorophyll => "chlorophyll",
            Variable::Nitrate => "nitrate",
            Variable::Ph => "ph",
            Variable::Density => "density",
        }
    }

    pub fn units(&self) -> &'static str {
        match self {
            Variable::Temperature => "°C",
            Variable::Salinity => "PSU",
            Variable::Oxygen => "µmol/kg",
            Variable::Pressure => "dbar",
            Variable::Chlorophyll => "mg/m³",
            Variable::Nitrate => "µmol/kg",
            Variable::Ph => "",
            Variable::Density => "kg/m³",
        }
    }

    /// Lowercase aliases accepted besides the canonical name.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Variable::Temperature => &["temp", "sst", "thermal", "warm", "warming", "heat"],
            Variable::Salinity => &["sal", "psal", "salt", "saltiness", "saline"],
            Variable::Oxygen => &["oxy", "doxy", "dissolved oxygen", "o2"],
            Variable::Pressure => &["pres"],
            Variable::Chlorophyll => &["chl", "chla", "chlorophyll-a", "phytoplankton"],
            Variable::Nitrate => &["no3", "nutrient", "nutrients"],
            Variable::Ph => &["acidity", "acidification"],
            Variable::Density => &["sigma", "sigma-t", "potential density"],
        }
    }

    /// Exact name/alias lookup (case-insensitive).
    pub fn from_name(name: &str) -> Option<Variable> {
        let n = name.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == n || v.aliases().iter().any(|a| *a == n))
    }

    /// First variable mentioned in `text` by name or alias, as a whole word.
    pub fn find_in_text(text: &str) -> Option<Variable> {
        let lowered = text.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| !(c.is_alphanumeric() || c == '-'))
            .filter(|w| !w.is_empty())
            .collect();
        let joined = format!(" {} ", words.join(" "));
        Self::ALL.into_iter().find(|v| {
            std::iter::once(v.as_str())
                .chain(v.aliases().iter().copied())
                .any(|name| joined.contains(&format!(" {name} ")))
        })
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variable {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Variable::from_name(s).ok_or_else(|| ModelError::UnknownLabel {
            kind: "variable",
            value: s.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve() {
        assert_eq!(Variable::from_name("PSAL"), Some(Variable::Salinity));
        assert_eq!(Variable::from_name("sst"), Some(Variable::Temperature));
        assert_eq!("chla".parse::<Variable>().ok(), Some(Variable::Chlorophyll));
        assert!("plankton count".parse::<Variable>().is_err());
    }

    #[test]
    fn text_search_matches_whole_words() {
        assert_eq!(
            Variable::find_in_text("How salty is it? show salinity please"),
            Some(Variable::Salinity)
        );
        assert_eq!(
            Variable::find_in_text("dissolved oxygen near Oman"),
            Some(Variable::Oxygen)
        );
        // "temporal" must not match the "temp" alias.
        assert_eq!(Variable::find_in_text("temporal coverage"), None);
    }

    #[test]
    fn serializes_lowercase() {
        let s = serde_json::to_string(&Variable::Ph).unwrap();
        assert_eq!(s, "\"ph\"");
    }
}
