use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One decoded reading of current conditions for a location.
///
/// Field names follow the weatherapi.com `current.json` payload. Fields the model does not
/// know about (`wind_degree`, `cloud`, `windchill_c`, ...) are ignored on decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherModel {
    pub location: LocationData,
    pub current: CurrentData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationData {
    pub name: String,
    pub region: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    pub tz_id: String,
    pub localtime_epoch: i64,
    /// Local wall-clock time, `YYYY-MM-DD HH:MM`.
    pub localtime: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentData {
    #[serde(default)]
    pub last_updated_epoch: Option<i64>,
    pub last_updated: String,
    pub temp_c: f64,
    pub temp_f: f64,
    pub is_day: u8,
    pub condition: Condition,
    pub wind_mph: f64,
    pub wind_kph: f64,
    pub wind_dir: String,
    pub pressure_mb: f64,
    pub pressure_in: f64,
    pub precip_mm: f64,
    pub precip_in: f64,
    pub humidity: u8,
    pub feelslike_c: f64,
    pub feelslike_f: f64,
    pub dewpoint_c: f64,
    pub dewpoint_f: f64,
    pub vis_km: f64,
    pub vis_miles: f64,
    pub uv: f64,
    pub gust_mph: f64,
    pub gust_kph: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub text: String,
    pub code: u32,
    /// Usually protocol-relative, e.g. `//cdn.weatherapi.com/weather/64x64/day/116.png`.
    pub icon: String,
}

impl WeatherModel {
    /// Air temperature in `unit`, truncated toward zero.
    pub fn temperature(&self, unit: Unit) -> i64 {
        match unit {
            Unit::Fahrenheit => self.current.temp_f as i64,
            Unit::Celsius => self.current.temp_c as i64,
        }
    }

    /// Feels-like temperature in `unit`, truncated toward zero.
    pub fn feels_like(&self, unit: Unit) -> i64 {
        match unit {
            Unit::Fahrenheit => self.current.feelslike_f as i64,
            Unit::Celsius => self.current.feelslike_c as i64,
        }
    }
}

impl CurrentData {
    pub fn is_daytime(&self) -> bool {
        self.is_day != 0
    }
}

impl Condition {
    /// Absolute `https` URL of the condition icon.
    pub fn icon_url(&self) -> String {
        let cleaned = self.icon.replace('\\', "");

        if cleaned.starts_with("//") {
            format!("https:{cleaned}")
        } else {
            cleaned
        }
    }
}

/// Temperature display unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Unit {
    #[default]
    #[serde(rename = "f")]
    Fahrenheit,
    #[serde(rename = "c")]
    Celsius,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Fahrenheit => "f",
            Unit::Celsius => "c",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Unit::Fahrenheit => Unit::Celsius,
            Unit::Celsius => Unit::Fahrenheit,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Unit::Fahrenheit => "Fahrenheit",
            Unit::Celsius => "Celsius",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown unit '{0}', expected 'f' or 'c'")]
pub struct UnitParseError(String);

impl FromStr for Unit {
    type Err = UnitParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "f" | "fahrenheit" | "imperial" => Ok(Unit::Fahrenheit),
            "c" | "celsius" | "metric" => Ok(Unit::Celsius),
            _ => Err(UnitParseError(s.to_string())),
        }
    }
}
