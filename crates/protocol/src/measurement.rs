//! Typed measurements
//!
//! Each recognized report tag maps to one metric. The raw 16-bit value is kept
//! alongside the metric so both the raw and converted readings can be shown.
//!
//! | Tag    | Metric      | Conversion              | Line format            |
//! |--------|-------------|-------------------------|------------------------|
//! | `0x41` | Humidity    | `raw / 100` (%)         | `H <raw> (<pct> %)`    |
//! | `0x42` | Temperature | `raw / 16 - 273.15` (°C)| `T <raw> (<celsius> °C)` |
//! | `0x50` | CO2         | none (ppm)              | `C <raw> ppm`          |

use crate::error::ParseError;
use std::fmt;
use std::str::FromStr;

/// Relative humidity tag
pub const TAG_HUMIDITY: u8 = 0x41;
/// Temperature tag
pub const TAG_TEMPERATURE: u8 = 0x42;
/// CO2 concentration tag
pub const TAG_CO2: u8 = 0x50;

const KELVIN_OFFSET: f64 = 273.15;

/// A decoded sensor reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measurement {
    /// Relative humidity in hundredths of a percent
    Humidity { raw: u16 },
    /// Temperature in sixteenths of a Kelvin
    Temperature { raw: u16 },
    /// CO2 concentration in ppm
    Co2 { ppm: u16 },
}

impl Measurement {
    /// Map a report tag and value to a measurement
    ///
    /// Unknown tags yield `None`; they are not an error.
    pub fn from_tagged(tag: u8, value: u16) -> Option<Self> {
        match tag {
            TAG_HUMIDITY => Some(Measurement::Humidity { raw: value }),
            TAG_TEMPERATURE => Some(Measurement::Temperature { raw: value }),
            TAG_CO2 => Some(Measurement::Co2 { ppm: value }),
            _ => None,
        }
    }

    /// Report tag for this metric
    pub fn tag(&self) -> u8 {
        match self {
            Measurement::Humidity { .. } => TAG_HUMIDITY,
            Measurement::Temperature { .. } => TAG_TEMPERATURE,
            Measurement::Co2 { .. } => TAG_CO2,
        }
    }

    /// Single-letter metric code used in output lines
    pub fn metric(&self) -> char {
        match self {
            Measurement::Humidity { .. } => 'H',
            Measurement::Temperature { .. } => 'T',
            Measurement::Co2 { .. } => 'C',
        }
    }

    /// Raw value as transmitted by the sensor
    pub fn raw(&self) -> u16 {
        match *self {
            Measurement::Humidity { raw } | Measurement::Temperature { raw } => raw,
            Measurement::Co2 { ppm } => ppm,
        }
    }

    /// Converted value in the metric's unit (%, °C or ppm)
    pub fn value(&self) -> f64 {
        match *self {
            Measurement::Humidity { raw } => f64::from(raw) / 100.0,
            Measurement::Temperature { raw } => f64::from(raw) / 16.0 - KELVIN_OFFSET,
            Measurement::Co2 { ppm } => f64::from(ppm),
        }
    }

    /// Unit suffix for the converted value
    pub fn unit(&self) -> &'static str {
        match self {
            Measurement::Humidity { .. } => "%",
            Measurement::Temperature { .. } => "°C",
            Measurement::Co2 { .. } => "ppm",
        }
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Measurement::Co2 { ppm } => write!(f, "C {} ppm", ppm),
            _ => write!(
                f,
                "{} {} ({:.2} {})",
                self.metric(),
                self.raw(),
                self.value(),
                self.unit()
            ),
        }
    }
}

/// Parse an output line such as `H 4512 (45.12 %)`
///
/// Only the metric letter and the raw field are read; the converted value in
/// the rest of the line is recomputed from the raw field.
impl FromStr for Measurement {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let metric = words.next().ok_or(ParseError::Empty)?;
        let raw_word = words.next().ok_or(ParseError::MissingValue)?;

        let tag = match metric {
            "H" => TAG_HUMIDITY,
            "T" => TAG_TEMPERATURE,
            "C" => TAG_CO2,
            other => return Err(ParseError::UnknownMetric(other.to_string())),
        };

        let raw: u16 = raw_word
            .parse()
            .map_err(|_| ParseError::InvalidValue(raw_word.to_string()))?;

        Measurement::from_tagged(tag, raw)
            .ok_or_else(|| ParseError::UnknownMetric(metric.to_string()))
    }
}
