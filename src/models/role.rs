//! Role capabilities.
//!
//! A role is stored as a comma separated list of capability names. Everything
//! that needs to know "which staff group handles X" asks the capability set
//! instead of checking role names.

use crate::entities::{PreparationArea, order_status_entity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Admin,
    Operator,
    Cashier,
    Courier,
    Waiter,
    Cook,
    Bartender,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Admin => "admin",
            Capability::Operator => "operator",
            Capability::Cashier => "cashier",
            Capability::Courier => "courier",
            Capability::Waiter => "waiter",
            Capability::Cook => "cook",
            Capability::Bartender => "bartender",
        }
    }

    /// Staff group that prepares items of the given area.
    pub fn for_area(area: PreparationArea) -> Self {
        match area {
            PreparationArea::Kitchen => Capability::Cook,
            PreparationArea::Bar => Capability::Bartender,
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "admin" => Ok(Capability::Admin),
            "operator" => Ok(Capability::Operator),
            "cashier" => Ok(Capability::Cashier),
            "courier" => Ok(Capability::Courier),
            "waiter" => Ok(Capability::Waiter),
            "cook" => Ok(Capability::Cook),
            "bartender" => Ok(Capability::Bartender),
            other => Err(format!("Unknown capability: {other}")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet(BTreeSet<Capability>);

impl CapabilitySet {
    pub fn new<I: IntoIterator<Item = Capability>>(caps: I) -> Self {
        Self(caps.into_iter().collect())
    }

    /// Parses the stored column value. Unknown names are skipped with a warning
    /// so a stale role row never locks staff out.
    pub fn parse(raw: &str) -> Self {
        let mut set = BTreeSet::new();
        for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            match name.parse::<Capability>() {
                Ok(cap) => {
                    set.insert(cap);
                }
                Err(e) => log::warn!("{e}"),
            }
        }
        Self(set)
    }

    pub fn to_db_string(&self) -> String {
        self.0
            .iter()
            .map(Capability::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn contains(&self, cap: Capability) -> bool {
        self.0.contains(&cap)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Capability> {
        self.0.iter()
    }

    pub fn to_vec(&self) -> Vec<Capability> {
        self.0.iter().copied().collect()
    }

    /// Whether any of the holder's capabilities makes orders in `status` visible.
    pub fn can_see(&self, status: &order_status_entity::Model) -> bool {
        self.contains(Capability::Admin)
            || (status.visible_to_operator && self.contains(Capability::Operator))
            || (status.visible_to_courier && self.contains(Capability::Courier))
            || (status.visible_to_waiter && self.contains(Capability::Waiter))
            || (status.visible_to_chef && self.contains(Capability::Cook))
            || (status.visible_to_bartender && self.contains(Capability::Bartender))
    }
}
