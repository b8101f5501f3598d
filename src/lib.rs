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

#![deny(missing_docs)]

//! Calculates the solar radiation reaching the glazed elements of a
//! building (e.g., for assessing the potential of Building Integrated
//! Photovoltaics, BIPV). It is responsible for:
//!
//! * **Solar geometry**: the position of the sun for any day and hour at a certain site.
//! * **Incident irradiance**: the direct, diffuse and ground-reflected irradiance reaching a tilted surface, using an isotropic sky.
//! * **Corrections**: empirical adjustments for orientation, height above the ground and ground reflections.
//! * **Shading**: simplified self-shading by the building's own walls, and shading by trees and other obstacles around it.
//! * **Annual aggregation**: sampling the year with more or less detail (see [`PrecisionLevel`]) and turning the samples into annual and monthly totals.
//!
//! ```
//! use bipv_radiation::{AnalysisConfiguration, BuildingElement, RadiationModel, WeatherSample, WeatherSeries};
//!
//! let mut samples = Vec::new();
//! for day in 1..=365 {
//!     samples.push(WeatherSample { day_of_year: day, hour: 12, month: None, ghi: 500., dni: 400., dhi: 100. });
//! }
//! let weather = WeatherSeries::new(samples).unwrap();
//! let model = RadiationModel::new(AnalysisConfiguration::new(52.5, 13.4)).unwrap();
//! let elements = vec![BuildingElement::new("W1", 180., 2.0)];
//! let results = model.run_analysis(&elements, &weather, None).unwrap();
//! assert!(results[0].annual_radiation > 0.0);
//! ```

/// The kind of Floating point number used in the
/// library... the `"float"` feature means it becomes `f32`
/// and `f64` is used otherwise.
#[cfg(feature = "float")]
pub type Float = f32;
/// Well, Pi.
#[cfg(feature = "float")]
pub const PI: Float = std::f32::consts::PI;

/// The kind of Floating point number used in the
/// library... the `"float"` feature means it becomes `f32`
/// and `f64` is used otherwise.
#[cfg(not(feature = "float"))]
pub type Float = f64;

/// Well, Pi.
#[cfg(not(feature = "float"))]
pub const PI: Float = std::f64::consts::PI;

/// Errors and warnings
pub mod error;
pub use error::{ElementWarning, RadiationError, Result};

/// The position of the sun
pub mod solar_geometry;
pub use solar_geometry::{solar_position, SolarPosition};

/// Irradiance on tilted surfaces
pub mod irradiance;
pub use irradiance::{irradiance_components, plane_of_array_irradiance, IrradianceComponents};

/// Empirical corrections for orientation and height
pub mod corrections;
pub use corrections::Orientation;

/// Building elements, walls, obstacles and results
pub mod element;
pub use element::{BuildingElement, ElementRadiationResult, Obstacle, WallElement};

/// Shading by walls and obstacles
pub mod shading;
pub use shading::{shading_factor, ShadingOutcome};

/// How densely the year is sampled
pub mod precision;
pub use precision::{get_precision_preset, PrecisionLevel, PrecisionPreset};

/// Hourly weather data
pub mod weather;
pub use weather::{WeatherRecord, WeatherSample, WeatherSeries};

/// Options of an analysis
pub mod config;
pub use config::{AnalysisConfiguration, MonthAttribution, ShadingJitter};

/// The main export of this module: a model for calculating
/// the annual radiation of building elements.
pub mod model;
pub use model::{run_analysis, CancellationToken, RadiationModel};

/// Aggregated results
pub mod summary;
pub use summary::{AnalysisSummary, OrientationSummary};

/// All the inputs of an analysis in one document
pub mod input;
pub use input::AnalysisInput;
