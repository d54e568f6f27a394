//! Per-category rate-limit bookkeeping.
//!
//! Okta enforces separate limits per group of endpoints. The client keeps the
//! last state it observed for each group so it can refuse calls that are
//! known to fail before they hit the network.

use crate::types::Rate;
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;

/// A bucket of API operations sharing one rate-limit counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Core,
    AppsCreateList,
    AppsGetUpdateDelete,
    Authn,
    GroupsCreateList,
    GroupsGetUpdateDelete,
    Logs,
    Sessions,
    UsersCreateList,
    UsersGetById,
    UsersGetByLoginName,
    UsersCreateUpdateDeleteById,
}

impl Category {
    pub const COUNT: usize = 12;

    pub const ALL: [Category; Category::COUNT] = [
        Category::Core,
        Category::AppsCreateList,
        Category::AppsGetUpdateDelete,
        Category::Authn,
        Category::GroupsCreateList,
        Category::GroupsGetUpdateDelete,
        Category::Logs,
        Category::Sessions,
        Category::UsersCreateList,
        Category::UsersGetById,
        Category::UsersGetByLoginName,
        Category::UsersCreateUpdateDeleteById,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Core => "core",
            Category::AppsCreateList => "apps-create-list",
            Category::AppsGetUpdateDelete => "apps-get-update-delete",
            Category::Authn => "authn",
            Category::GroupsCreateList => "groups-create-list",
            Category::GroupsGetUpdateDelete => "groups-get-update-delete",
            Category::Logs => "logs",
            Category::Sessions => "sessions",
            Category::UsersCreateList => "users-create-list",
            Category::UsersGetById => "users-get-by-id",
            Category::UsersGetByLoginName => "users-get-by-login-name",
            Category::UsersCreateUpdateDeleteById => "users-create-update-delete-by-id",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown rate-limit category: {}", s))
    }
}

/// Last known [`Rate`] for every [`Category`].
///
/// One coarse lock guards the whole table. It is only ever held for the copy
/// in or out, never across a network call.
#[derive(Debug, Default)]
pub struct RateTracker {
    rates: Mutex<[Rate; Category::COUNT]>,
}

impl RateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, category: Category) -> Rate {
        let rates = self.rates.lock().unwrap_or_else(|p| p.into_inner());
        rates[category.index()]
    }

    pub fn set(&self, category: Category, rate: Rate) {
        let mut rates = self.rates.lock().unwrap_or_else(|p| p.into_inner());
        rates[category.index()] = rate;
    }

    /// Copy of the whole table, in [`Category::ALL`] order.
    pub fn snapshot(&self) -> Vec<(Category, Rate)> {
        let rates = self.rates.lock().unwrap_or_else(|p| p.into_inner());
        Category::ALL
            .iter()
            .map(|c| (*c, rates[c.index()]))
            .collect()
    }
}
