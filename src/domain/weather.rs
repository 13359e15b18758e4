//! Current-weather observation attached to station reports.
//!
//! Mirrors the OpenWeather "current weather" response. Every field is
//! defaulted so partial upstream payloads still decode.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Weather at a station's coordinates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Weather {
    /// Observation coordinates.
    pub coord: WeatherCoord,
    /// Condition descriptors.
    pub weather: Vec<WeatherInfo>,
    /// Internal upstream parameter.
    pub base: String,
    /// Temperature, pressure, humidity.
    pub main: WeatherMain,
    /// Visibility in meters.
    pub visibility: i64,
    /// Wind readings.
    pub wind: WeatherWind,
    /// Cloud cover.
    pub clouds: WeatherClouds,
    /// Observation time, unix seconds.
    pub dt: i64,
    /// Country and sun times.
    pub sys: WeatherSys,
    /// Offset from UTC in seconds.
    pub timezone: i64,
    /// Upstream city id.
    pub id: i64,
    /// Upstream city name.
    pub name: String,
    /// Upstream status code.
    pub cod: i64,
}

/// Observation coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct WeatherCoord {
    /// Longitude.
    pub lon: f64,
    /// Latitude.
    pub lat: f64,
}

/// A weather condition descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct WeatherInfo {
    /// Condition id.
    pub id: i64,
    /// Condition group (e.g. `"Rain"`).
    pub main: String,
    /// Condition text.
    pub description: String,
    /// Icon id.
    pub icon: String,
}

/// Main readings. Temperatures in Kelvin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct WeatherMain {
    /// Temperature.
    pub temp: f64,
    /// Perceived temperature.
    pub feels_like: f64,
    /// Minimum temperature.
    pub temp_min: f64,
    /// Maximum temperature.
    pub temp_max: f64,
    /// Pressure in hPa.
    pub pressure: f64,
    /// Relative humidity in percent.
    pub humidity: f64,
    /// Sea-level pressure in hPa.
    pub sea_level: f64,
    /// Ground-level pressure in hPa.
    pub grnd_level: f64,
}

/// Wind readings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct WeatherWind {
    /// Speed in m/s.
    pub speed: f64,
    /// Direction in degrees.
    pub deg: i64,
    /// Gust speed in m/s.
    pub gust: f64,
}

/// Cloud cover.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct WeatherClouds {
    /// Cloudiness in percent.
    pub all: i64,
}

/// Country and sun times.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct WeatherSys {
    /// Internal upstream parameter.
    #[serde(rename = "type")]
    pub sys_type: i64,
    /// Internal upstream parameter.
    pub id: i64,
    /// Country code.
    pub country: String,
    /// Sunrise, unix seconds.
    pub sunrise: i64,
    /// Sunset, unix seconds.
    pub sunset: i64,
}
