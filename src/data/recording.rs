use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Physical quantity measured by a logger channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelRole {
    Temperature,
    Pressure,
    Position,
    Unclassified,
}

impl ChannelRole {
    /// Unit label the logger uses for this quantity
    pub fn unit(&self) -> &'static str {
        match self {
            ChannelRole::Temperature => "°C",
            ChannelRole::Pressure => "Bar",
            ChannelRole::Position => "cm",
            ChannelRole::Unclassified => "",
        }
    }
}

impl std::fmt::Display for ChannelRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelRole::Temperature => write!(f, "Temperature"),
            ChannelRole::Pressure => write!(f, "Pressure"),
            ChannelRole::Position => write!(f, "Position"),
            ChannelRole::Unclassified => write!(f, "Unclassified"),
        }
    }
}

/// One classification rule: header-name substring → channel role
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleRule {
    pub pattern: String,
    pub role: ChannelRole,
}

/// Declarative mapping from column names to channel roles.
///
/// The logger encodes the physical quantity in the column name
/// (`T_oil/[°C]`, `p_sys/[Bar]`, `Pos/[cm]`). A channel takes the role of
/// the first rule whose pattern occurs in its name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleMap {
    rules: Vec<RoleRule>,
}

impl Default for RoleMap {
    fn default() -> Self {
        Self {
            rules: vec![
                RoleRule {
                    pattern: "°C".to_string(),
                    role: ChannelRole::Temperature,
                },
                RoleRule {
                    pattern: "Bar".to_string(),
                    role: ChannelRole::Pressure,
                },
                RoleRule {
                    pattern: "cm".to_string(),
                    role: ChannelRole::Position,
                },
            ],
        }
    }
}

impl RoleMap {
    /// Build a map from custom rules (checked in order)
    pub fn new(rules: Vec<RoleRule>) -> Self {
        Self { rules }
    }

    /// Role of the first rule matching the column name
    pub fn classify(&self, column_name: &str) -> ChannelRole {
        self.rules
            .iter()
            .find(|rule| column_name.contains(&rule.pattern))
            .map(|rule| rule.role.clone())
            .unwrap_or(ChannelRole::Unclassified)
    }
}

/// A sampled signal as parallel time/value arrays.
///
/// Times are seconds since the first sample of the recording and must be
/// strictly increasing; the analysis layer rejects anything else.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub time_s: Vec<f64>,
    pub values: Vec<f64>,
}

impl Series {
    pub fn new(time_s: Vec<f64>, values: Vec<f64>) -> Self {
        debug_assert_eq!(time_s.len(), values.len());
        Self { time_s, values }
    }

    pub fn len(&self) -> usize {
        self.time_s.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time_s.is_empty()
    }
}

/// One measurement column from the logger table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub name: String,
    pub role: ChannelRole,
    pub values: Vec<f64>,
}

/// A fully parsed logger recording
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Recording {
    pub source_path: PathBuf,
    /// Free-text preamble found above the measurement table
    pub title: String,
    /// Shared time axis, seconds since the first sample
    pub time_s: Vec<f64>,
    pub channels: Vec<Channel>,
}

impl Recording {
    pub fn num_samples(&self) -> usize {
        self.time_s.len()
    }

    /// Elapsed time covered by the recording
    pub fn duration_s(&self) -> f64 {
        match (self.time_s.first(), self.time_s.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        }
    }

    /// Look up a channel by its exact column name
    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.name == name)
    }

    /// All channels carrying the given role, in table order
    pub fn channels_with_role(&self, role: &ChannelRole) -> Vec<&Channel> {
        self.channels.iter().filter(|c| &c.role == role).collect()
    }

    /// Pair a channel with the shared time axis
    pub fn series(&self, name: &str) -> Option<Series> {
        self.channel(name)
            .map(|c| Series::new(self.time_s.clone(), c.values.clone()))
    }
}
