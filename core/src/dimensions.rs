//! Closed categorical domains that do not come from the catalog.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A broad geographic sales region.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Theater {
    #[serde(rename = "Americas")]
    Americas,
    #[serde(rename = "Europe")]
    Europe,
    #[serde(rename = "Greater China")]
    GreaterChina,
    #[serde(rename = "Japan")]
    Japan,
    #[serde(rename = "Rest of Asia Pacific")]
    RestOfAsiaPacific,
}

impl Theater {
    pub const ALL: [Theater; 5] = [
        Theater::Americas,
        Theater::Europe,
        Theater::GreaterChina,
        Theater::Japan,
        Theater::RestOfAsiaPacific,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Americas          => "Americas",
            Self::Europe            => "Europe",
            Self::GreaterChina      => "Greater China",
            Self::Japan             => "Japan",
            Self::RestOfAsiaPacific => "Rest of Asia Pacific",
        }
    }
}

impl fmt::Display for Theater {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SalesChannel {
    Online,
    Retail,
    Enterprise,
    Carrier,
}

impl SalesChannel {
    pub const ALL: [SalesChannel; 4] = [
        SalesChannel::Online,
        SalesChannel::Retail,
        SalesChannel::Enterprise,
        SalesChannel::Carrier,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Online     => "Online",
            Self::Retail     => "Retail",
            Self::Enterprise => "Enterprise",
            Self::Carrier    => "Carrier",
        }
    }
}

impl fmt::Display for SalesChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Owning operations team, numbered from 1.
/// Displayed as `Ops-Team-NN`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct Team(pub u16);

impl Team {
    /// Every team for a configured team count, in order.
    pub fn roster(team_count: u16) -> impl Iterator<Item = Team> {
        (1..=team_count).map(Team)
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ops-Team-{:02}", self.0)
    }
}

/// A value paired with its sampling weight, as read from config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Weighted<T> {
    pub value: T,
    pub weight: f64,
}

impl<T> Weighted<T> {
    pub fn new(value: T, weight: f64) -> Self {
        Self { value, weight }
    }
}
