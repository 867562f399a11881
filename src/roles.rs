use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The five manufacturing sites that can receive a quantity share.
///
/// Distribution maps are keyed by human-entered site names, so each site
/// carries the spellings observed in practice; matching always runs through
/// the full alias list before concluding "no match".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    Storkow,
    Brenz,
    Gransee,
    Passow,
    Dedelow,
}

impl Location {
    pub const ALL: [Location; 5] = [
        Location::Storkow,
        Location::Brenz,
        Location::Gransee,
        Location::Passow,
        Location::Dedelow,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Location::Storkow => "storkow",
            Location::Brenz => "brenz",
            Location::Gransee => "gransee",
            Location::Passow => "passow",
            Location::Dedelow => "dedelow",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Location::Storkow => "Storkow",
            Location::Brenz => "Brenz",
            Location::Gransee => "Gransee",
            Location::Passow => "Passow",
            Location::Dedelow => "Dedelow",
        }
    }

    /// Known human-entered spellings for this site, lowercase.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Location::Storkow => &["storkow", "storkow (mark)", "werk storkow"],
            Location::Brenz => &["brenz", "brenz/mv", "werk brenz"],
            Location::Gransee => &["gransee", "werk gransee"],
            Location::Passow => &["passow", "passow um", "werk passow"],
            Location::Dedelow => &["dedelow", "werk dedelow"],
        }
    }

    /// Resolve a human-entered site name against every known spelling.
    pub fn resolve(name: &str) -> Option<Location> {
        let needle = name.trim().to_lowercase();
        Location::ALL
            .into_iter()
            .find(|loc| loc.aliases().contains(&needle.as_str()))
    }

    /// Whether a distribution key refers to this site.
    pub fn matches(self, key: &str) -> bool {
        Location::resolve(key) == Some(self)
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Error)]
#[error("unknown role: {0}")]
pub struct RoleParseError(String);

/// Closed set of actor roles. The source system dispatched on raw role
/// strings; here every authorization decision runs through this enum and the
/// transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Vertrieb,
    SupplyChain,
    Planung,
    PlanungStandort(Location),
    Admin,
}

impl Role {
    pub fn as_str(&self) -> String {
        match self {
            Role::Vertrieb => "vertrieb".to_string(),
            Role::SupplyChain => "supply_chain".to_string(),
            Role::Planung => "planung".to_string(),
            Role::PlanungStandort(loc) => format!("planung_{}", loc.code()),
            Role::Admin => "admin".to_string(),
        }
    }

    /// Any member of the planning role family, scoped or not.
    pub fn is_planning(&self) -> bool {
        matches!(self, Role::Planung | Role::PlanungStandort(_))
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// The site a location-scoped planner is restricted to.
    pub fn planning_site(&self) -> Option<Location> {
        match self {
            Role::PlanungStandort(loc) => Some(*loc),
            _ => None,
        }
    }
}

impl std::str::FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "vertrieb" => Ok(Role::Vertrieb),
            "supply_chain" => Ok(Role::SupplyChain),
            "planung" => Ok(Role::Planung),
            "admin" => Ok(Role::Admin),
            other => {
                if let Some(site) = other.strip_prefix("planung_") {
                    if let Some(loc) = Location::resolve(site) {
                        return Ok(Role::PlanungStandort(loc));
                    }
                }
                Err(RoleParseError(s.to_string()))
            }
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_resolution_checks_all_spellings() {
        assert_eq!(Location::resolve("Storkow"), Some(Location::Storkow));
        assert_eq!(Location::resolve("storkow (Mark)"), Some(Location::Storkow));
        assert_eq!(Location::resolve("Werk Brenz"), Some(Location::Brenz));
        assert_eq!(Location::resolve("  passow um "), Some(Location::Passow));
        assert_eq!(Location::resolve("nowhere"), None);
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("vertrieb".parse::<Role>().unwrap(), Role::Vertrieb);
        assert_eq!("supply_chain".parse::<Role>().unwrap(), Role::SupplyChain);
        assert_eq!(
            "planung_storkow".parse::<Role>().unwrap(),
            Role::PlanungStandort(Location::Storkow)
        );
        assert!("planung_atlantis".parse::<Role>().is_err());
        assert!("controller".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_round_trip() {
        for role in [
            Role::Vertrieb,
            Role::SupplyChain,
            Role::Planung,
            Role::PlanungStandort(Location::Dedelow),
            Role::Admin,
        ] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn test_planning_site_scoping() {
        assert_eq!(
            Role::PlanungStandort(Location::Brenz).planning_site(),
            Some(Location::Brenz)
        );
        assert_eq!(Role::Planung.planning_site(), None);
        assert!(Role::Planung.is_planning());
        assert!(!Role::Vertrieb.is_planning());
    }
}
