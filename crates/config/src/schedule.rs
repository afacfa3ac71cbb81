use serde::{Deserialize, Serialize};
use std::fmt;
use time::Time;
use time::macros::format_description;

/// A wall-clock time of day, written `HH:MM` in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DailyTime(Time);
impl DailyTime {
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        Time::from_hms(hour, minute, 0).ok().map(Self)
    }

    pub fn time(&self) -> Time {
        self.0
    }
}
impl TryFrom<String> for DailyTime {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
impl std::str::FromStr for DailyTime {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Time::parse(s.trim(), format_description!("[hour]:[minute]"))
            .map(Self)
            .map_err(|_| format!("expected a time of day as HH:MM, found '{s}'"))
    }
}
impl From<DailyTime> for String {
    fn from(value: DailyTime) -> Self {
        value.to_string()
    }
}
impl fmt::Display for DailyTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0.hour(), self.0.minute())
    }
}
