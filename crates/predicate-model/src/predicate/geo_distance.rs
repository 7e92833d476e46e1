use crate::{error::ConstructionError, range::number::format_decimal};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DistanceUnit {
    #[serde(rename = "m")]
    Metres,
    #[serde(rename = "km")]
    Kilometres,
    #[serde(rename = "mi")]
    Miles,
    #[serde(rename = "yd")]
    Yards,
    #[serde(rename = "ft")]
    Feet,
    #[serde(rename = "in")]
    Inches,
    #[serde(rename = "cm")]
    Centimetres,
    #[serde(rename = "mm")]
    Millimetres,
    #[serde(rename = "nmi")]
    NauticalMiles,
}

impl DistanceUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            DistanceUnit::Metres => "m",
            DistanceUnit::Kilometres => "km",
            DistanceUnit::Miles => "mi",
            DistanceUnit::Yards => "yd",
            DistanceUnit::Feet => "ft",
            DistanceUnit::Inches => "in",
            DistanceUnit::Centimetres => "cm",
            DistanceUnit::Millimetres => "mm",
            DistanceUnit::NauticalMiles => "nmi",
        }
    }

    pub fn metres_per_unit(&self) -> f64 {
        match self {
            DistanceUnit::Metres => 1.0,
            DistanceUnit::Kilometres => 1000.0,
            DistanceUnit::Miles => 1609.344,
            DistanceUnit::Yards => 0.9144,
            DistanceUnit::Feet => 0.3048,
            DistanceUnit::Inches => 0.0254,
            DistanceUnit::Centimetres => 0.01,
            DistanceUnit::Millimetres => 0.001,
            DistanceUnit::NauticalMiles => 1852.0,
        }
    }
}

impl FromStr for DistanceUnit {
    type Err = ConstructionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unit = match s {
            "" | "m" | "meters" | "metres" => DistanceUnit::Metres,
            "km" | "kilometers" | "kilometres" => DistanceUnit::Kilometres,
            "mi" | "miles" => DistanceUnit::Miles,
            "yd" | "yards" => DistanceUnit::Yards,
            "ft" | "feet" => DistanceUnit::Feet,
            "in" | "inch" => DistanceUnit::Inches,
            "cm" | "centimeters" | "centimetres" => DistanceUnit::Centimetres,
            "mm" | "millimeters" | "millimetres" => DistanceUnit::Millimetres,
            "nmi" | "NM" => DistanceUnit::NauticalMiles,
            other => {
                return Err(ConstructionError::InvalidGeoDistance(format!(
                    "unknown distance unit '{other}'"
                )));
            }
        };
        Ok(unit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Distance {
    pub value: f64,
    pub unit: DistanceUnit,
}

impl Distance {
    pub fn in_metres(&self) -> f64 {
        self.value * self.unit.metres_per_unit()
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", format_decimal(self.value), self.unit.symbol())
    }
}

impl FromStr for Distance {
    type Err = ConstructionError;

    /// `"10km"`, `"2.5 mi"`; a bare number is in metres.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(s.len());
        let (number, unit) = s.split_at(split);
        let value = number
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .ok_or_else(|| ConstructionError::InvalidGeoDistance(format!("invalid distance '{s}'")))?;
        Ok(Distance {
            value,
            unit: unit.trim().parse()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoDistancePredicate {
    latitude: f64,
    longitude: f64,
    distance: Distance,
}

impl GeoDistancePredicate {
    pub fn new(latitude: f64, longitude: f64, distance: Distance) -> Result<Self, ConstructionError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(ConstructionError::InvalidGeoDistance(format!(
                "latitude {latitude} out of range"
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(ConstructionError::InvalidGeoDistance(format!(
                "longitude {longitude} out of range"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
            distance,
        })
    }

    pub fn parse(latitude: &str, longitude: &str, distance: &str) -> Result<Self, ConstructionError> {
        let coordinate = |raw: &str| {
            raw.trim()
                .parse::<f64>()
                .map_err(|_| ConstructionError::InvalidGeoDistance(format!("invalid coordinate '{raw}'")))
        };
        Self::new(coordinate(latitude)?, coordinate(longitude)?, distance.parse()?)
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn distance(&self) -> Distance {
        self.distance
    }
}
