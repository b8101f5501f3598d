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

//! A single JSON document holding everything needed for an analysis.
//!
//! ```json
//! {
//!     "config": { "latitude": 52.5, "precision_level": "monthly_average" },
//!     "elements": [ { "element_id": "W1", "azimuth": 180, "glass_area": 2.0, "building_level": "1" } ],
//!     "weather": [ { "day": 15, "hour": 12, "GHI": 300, "DNI": 250, "DHI": 100 } ],
//!     "walls": [],
//!     "obstacles": []
//! }
//! ```

use crate::config::AnalysisConfiguration;
use crate::element::{BuildingElement, ElementRadiationResult, Obstacle, WallElement};
use crate::error::Result;
use crate::model::RadiationModel;
use crate::weather::{WeatherRecord, WeatherSeries};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// The inputs of an analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisInput {
    /// The options of the analysis
    #[serde(default)]
    pub config: AnalysisConfiguration,

    /// The elements to analyse
    pub elements: Vec<BuildingElement>,

    /// Hourly weather records
    pub weather: Vec<WeatherRecord>,

    /// Walls that may shade the elements
    #[serde(default)]
    pub walls: Vec<WallElement>,

    /// Things around the building that may shade the elements
    #[serde(default)]
    pub obstacles: Vec<Obstacle>,
}

impl AnalysisInput {
    /// Parses an input document
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads an input document from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Validates the weather records and runs the analysis
    pub fn run(&self) -> Result<Vec<ElementRadiationResult>> {
        let weather = WeatherSeries::from_records(self.weather.clone())?;
        debug!(
            samples = weather.len(),
            ghi_kwh = weather.total_ghi_kwh(),
            "weather series ready"
        );
        let model =
            RadiationModel::new(self.config.clone())?.with_obstacles(self.obstacles.clone());
        let walls = if self.walls.is_empty() {
            None
        } else {
            Some(self.walls.as_slice())
        };
        model.run_analysis(&self.elements, &weather, walls)
    }
}

#[cfg(test)]
mod testing {
    use super::*;
    use crate::error::RadiationError;
    use crate::precision::PrecisionLevel;

    #[test]
    fn test_parse_minimal() {
        let input = AnalysisInput::from_json_str(
            r#"{
                "elements": [{"element_id": "W1", "azimuth": 180, "glass_area": 2.0}],
                "weather": [{"day": 172, "hour": 12, "ghi": 800, "dni": 600, "dhi": 150}]
            }"#,
        )
        .unwrap();
        assert_eq!(input.config, AnalysisConfiguration::default());
        assert!(input.walls.is_empty());
        assert!(input.obstacles.is_empty());
        assert_eq!(input.elements.len(), 1);
    }

    #[test]
    fn test_run() {
        let input = AnalysisInput::from_json_str(
            r#"{
                "config": {"latitude": 45.0, "precision_level": "yearly_average"},
                "elements": [{"element_id": "W1", "azimuth": 180, "glass_area": 2.0, "building_level": "2"}],
                "weather": [
                    {"day": 80, "hour": 12, "GHI": 600, "DNI": 500, "DHI": 120},
                    {"day": 172, "hour": 12, "GHI": 900, "DNI": 700, "DHI": 150}
                ],
                "walls": [{"wall_id": "WALL-1", "azimuth": 200, "height": 3.0, "level": "2", "area": 10.0}]
            }"#,
        )
        .unwrap();
        assert_eq!(input.config.precision_level, PrecisionLevel::YearlyAverage);
        let results = input.run().unwrap();
        assert_eq!(results.len(), 1);
        let r = &results[0];
        assert_eq!(r.valid_samples, 2);
        assert!(r.annual_radiation > 0.0);
        assert!(r
            .warnings
            .contains(&crate::error::ElementWarning::MissingWeatherSamples { count: 2 }));
    }

    #[test]
    fn test_run_rejects_bad_weather() {
        let input = AnalysisInput::from_json_str(
            r#"{
                "elements": [{"element_id": "W1", "azimuth": 180, "glass_area": 2.0}],
                "weather": [{"day": 400, "hour": 12, "ghi": 800}]
            }"#,
        )
        .unwrap();
        assert!(matches!(input.run(), Err(RadiationError::InputValidation(_))));
    }
}
