/*
MIT License
Copyright (c) 2021 Germán Molina
Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:
The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.
THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

use crate::corrections::Orientation;
use crate::error::{ElementWarning, RadiationError, Result};
use crate::Float;
use serde::{Deserialize, Serialize};

fn default_tilt() -> Float {
    90.
}

fn default_angular_width() -> Float {
    30.
}

/// A window (or any other facade surface) whose incident
/// solar radiation is to be calculated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingElement {
    /// Unique identifier
    pub element_id: String,

    /// The compass orientation. If not given, it is derived from the `azimuth`
    #[serde(default)]
    pub orientation: Option<Orientation>,

    /// The direction the surface faces, in degrees (0 is North, clockwise)
    pub azimuth: Float,

    /// Degrees from horizontal. Windows are vertical (90) by default
    #[serde(default = "default_tilt")]
    pub tilt: Float,

    /// Area of glass, in m2
    pub glass_area: Float,

    /// The level label (e.g., `"Level 2"`), used for estimating the height
    /// of the element and for matching it with shading walls.
    #[serde(default)]
    pub building_level: String,

    /// The wall hosting this element, if known
    #[serde(default)]
    pub host_wall_id: Option<String>,
}

impl BuildingElement {
    /// Creates a vertical element on the ground floor, with the
    /// orientation derived from the azimuth.
    pub fn new<S: Into<String>>(element_id: S, azimuth: Float, glass_area: Float) -> Self {
        Self {
            element_id: element_id.into(),
            orientation: None,
            azimuth,
            tilt: default_tilt(),
            glass_area,
            building_level: String::new(),
            host_wall_id: None,
        }
    }

    /// The orientation used for the orientation corrections: the explicit
    /// label when there is one, the azimuth's sector otherwise.
    pub fn effective_orientation(&self) -> Orientation {
        self.orientation
            .unwrap_or_else(|| Orientation::from_azimuth(self.azimuth))
    }

    /// Checks that the element can be analysed
    pub fn validate(&self) -> Result<()> {
        if self.element_id.trim().is_empty() {
            return Err(RadiationError::InputValidation(
                "building element with an empty id".to_string(),
            ));
        }
        if !self.azimuth.is_finite() || !(0. ..360.).contains(&self.azimuth) {
            return Err(RadiationError::InputValidation(format!(
                "element '{}' has azimuth {}, expected a value in [0, 360)",
                self.element_id, self.azimuth
            )));
        }
        if !self.tilt.is_finite() || !(0. ..=90.).contains(&self.tilt) {
            return Err(RadiationError::InputValidation(format!(
                "element '{}' has tilt {}, expected a value in [0, 90]",
                self.element_id, self.tilt
            )));
        }
        if !self.glass_area.is_finite() || self.glass_area <= 0. {
            return Err(RadiationError::InputValidation(format!(
                "element '{}' has glass area {}, expected a positive value",
                self.element_id, self.glass_area
            )));
        }
        Ok(())
    }
}

/// A wall that can cast shadows over building elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallElement {
    /// Unique identifier
    pub wall_id: String,

    /// The compass orientation of the wall, if known
    #[serde(default)]
    pub orientation: Option<Orientation>,

    /// The direction the wall faces, in degrees (0 is North, clockwise)
    pub azimuth: Float,

    /// Height of the wall, in m
    #[serde(default)]
    pub height: Float,

    /// The level label
    #[serde(default)]
    pub level: String,

    /// Area of the wall, in m2
    #[serde(default)]
    pub area: Float,
}

/// Something around the building (a tree, a neighbouring building)
/// that can block the sun for part of the day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Unique identifier
    pub obstacle_id: String,

    /// Bearing from the building to the obstacle, in degrees (0 is North, clockwise)
    pub azimuth: Float,

    /// How wide the obstacle looks from the building, in degrees
    #[serde(default = "default_angular_width")]
    pub angular_width: Float,

    /// Height of the obstacle, in m
    pub height: Float,

    /// Horizontal distance from the building, in m
    pub distance: Float,

    /// Fraction of the direct radiation that passes through
    /// (0 for a solid object, around 0.3 for dense foliage)
    #[serde(default)]
    pub transmittance: Float,
}

/// The incident solar radiation calculated for a building element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementRadiationResult {
    /// The element this result belongs to
    pub element_id: String,

    /// The orientation used for the calculation
    pub orientation: Orientation,

    /// The azimuth of the element
    pub azimuth: Float,

    /// Annual incident radiation, in kWh/m2/year
    pub annual_radiation: Float,

    /// Peak incident irradiance found among the samples, in W/m2
    pub peak_irradiance: Float,

    /// Incident radiation for each month, in kWh/m2
    pub monthly_totals: [Float; 12],

    /// The orientation factor of the element
    pub orientation_factor: Float,

    /// Estimated height above the ground, in m
    pub height_from_ground: Float,

    /// Tilt of the element
    pub tilt: Float,

    /// Glass area of the element, in m2
    pub glass_area: Float,

    /// Annual radiation over the whole glass area, in kWh/year
    pub annual_energy: Float,

    /// Number of samples for which weather data was found
    pub valid_samples: usize,

    /// Non-fatal problems found while analysing this element
    #[serde(default)]
    pub warnings: Vec<ElementWarning>,
}

impl ElementRadiationResult {
    /// Whether anything went wrong while calculating this result
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

#[cfg(test)]
mod testing {
    use super::*;

    #[test]
    fn test_deserialize_element_defaults() {
        let e: BuildingElement = serde_json::from_str(
            r#"{"element_id": "W1", "azimuth": 135.0, "glass_area": 1.2}"#,
        )
        .unwrap();
        assert_eq!(e.tilt, 90.);
        assert!(e.orientation.is_none());
        assert_eq!(e.effective_orientation(), Orientation::Southeast);
        assert!(e.validate().is_ok());
    }

    #[test]
    fn test_explicit_orientation_wins() {
        let e: BuildingElement = serde_json::from_str(
            r#"{"element_id": "W1", "orientation": "North", "azimuth": 180.0, "glass_area": 2.0}"#,
        )
        .unwrap();
        assert_eq!(e.effective_orientation(), Orientation::North);
    }

    #[test]
    fn test_validate() {
        let good = BuildingElement::new("W", 180., 2.);
        assert!(good.validate().is_ok());

        let mut bad = good.clone();
        bad.azimuth = 360.;
        assert!(matches!(bad.validate(), Err(RadiationError::InputValidation(_))));

        let mut bad = good.clone();
        bad.tilt = 95.;
        assert!(bad.validate().is_err());

        let mut bad = good.clone();
        bad.glass_area = 0.;
        assert!(bad.validate().is_err());

        let mut bad = good.clone();
        bad.glass_area = Float::NAN;
        assert!(bad.validate().is_err());

        let mut bad = good;
        bad.element_id = "  ".to_string();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_obstacle_defaults() {
        let o: Obstacle = serde_json::from_str(
            r#"{"obstacle_id": "tree", "azimuth": 170, "height": 12, "distance": 8}"#,
        )
        .unwrap();
        assert_eq!(o.angular_width, 30.);
        assert_eq!(o.transmittance, 0.);
    }
}
