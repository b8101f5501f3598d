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

use crate::corrections::DEFAULT_FLOOR_HEIGHT;
use crate::error::{RadiationError, Result};
use crate::irradiance::DEFAULT_ALBEDO;
use crate::precision::{PrecisionLevel, PrecisionPreset, DEFAULT_DAYLIGHT_HOURS_EQUIVALENT};
use crate::Float;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How samples are assigned to months when the weather
/// data does not say which month they belong to.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthAttribution {
    /// Blocks of 30 days (`((day - 1) / 30) + 1`), with everything after
    /// day 330 going to December. Late days of long months end up in the
    /// following month.
    #[default]
    ThirtyDayBlocks,

    /// Uses the calendar of a non-leap year. Day 366 goes to December.
    Calendar,
}

impl MonthAttribution {
    /// Gets the month (1 to 12) of a day of the year
    pub fn month_of(&self, day_of_year: u16) -> u8 {
        let day = day_of_year.clamp(1, 366);
        match self {
            Self::Calendar => {
                // 2023 is not a leap year
                NaiveDate::from_yo_opt(2023, day.min(365) as u32)
                    .map(|d| d.month() as u8)
                    .unwrap_or(12)
            }
            Self::ThirtyDayBlocks => (((day - 1) / 30) + 1).min(12) as u8,
        }
    }
}

/// Optional, reproducible variation of the shading factors.
///
/// Each element gets its own random sequence, seeded from `seed` and
/// the element id, so repeated runs give exactly the same results.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShadingJitter {
    /// Seed shared by the whole analysis
    pub seed: u64,

    /// Largest relative reduction of the shading factor, in `[0, 0.5]`
    pub amplitude: Float,
}

/// The options of a radiation analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfiguration {
    /// How densely the year is sampled
    pub precision_level: PrecisionLevel,

    /// Whether walls and obstacles shade the elements
    pub include_shading: bool,

    /// Whether the orientation factor is applied
    pub apply_orientation_corrections: bool,

    /// Latitude of the site, in degrees (North is positive)
    pub latitude: Float,

    /// Longitude of the site, in degrees (East is positive)
    pub longitude: Float,

    /// Reflectance of the ground
    pub albedo: Float,

    /// Floor-to-floor height used for estimating the height of elements, in m
    pub floor_height: Float,

    /// Calibration constant for the noon-only precision levels
    pub daylight_hours_equivalent: Float,

    /// How samples are assigned to months
    pub month_attribution: MonthAttribution,

    /// Soft time limit for each element, in milliseconds
    pub element_timeout_ms: Option<u64>,

    /// Optional random variation of the shading factors
    pub shading_jitter: Option<ShadingJitter>,
}

impl Default for AnalysisConfiguration {
    fn default() -> Self {
        Self {
            precision_level: PrecisionLevel::default(),
            include_shading: true,
            apply_orientation_corrections: true,
            latitude: 0.0,
            longitude: 0.0,
            albedo: DEFAULT_ALBEDO,
            floor_height: DEFAULT_FLOOR_HEIGHT,
            daylight_hours_equivalent: DEFAULT_DAYLIGHT_HOURS_EQUIVALENT,
            month_attribution: MonthAttribution::default(),
            element_timeout_ms: None,
            shading_jitter: None,
        }
    }
}

impl AnalysisConfiguration {
    /// Creates a default configuration for a certain site
    pub fn new(latitude: Float, longitude: Float) -> Self {
        Self {
            latitude,
            longitude,
            ..Self::default()
        }
    }

    /// Reads a configuration from a JSON file. Missing fields
    /// take their default value.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let ret: Self = serde_json::from_str(&content)?;
        ret.validate()?;
        Ok(ret)
    }

    /// The sampling preset resulting from this configuration
    pub fn precision_preset(&self) -> PrecisionPreset {
        PrecisionPreset::with_calibration(self.precision_level, self.daylight_hours_equivalent)
    }

    /// Checks that the options make sense
    pub fn validate(&self) -> Result<()> {
        let err = |msg: String| Err(RadiationError::Configuration(msg));

        if !self.latitude.is_finite() || !(-90. ..=90.).contains(&self.latitude) {
            return err(format!("latitude {} is not in [-90, 90]", self.latitude));
        }
        if !self.longitude.is_finite() || !(-180. ..=360.).contains(&self.longitude) {
            return err(format!("longitude {} is not in [-180, 360]", self.longitude));
        }
        if !self.albedo.is_finite() || !(0. ..=1.).contains(&self.albedo) {
            return err(format!("albedo {} is not in [0, 1]", self.albedo));
        }
        if !self.floor_height.is_finite() || self.floor_height <= 0. {
            return err(format!("floor height {} should be positive", self.floor_height));
        }
        if !self.daylight_hours_equivalent.is_finite() || self.daylight_hours_equivalent <= 0. {
            return err(format!(
                "daylight hours equivalent {} should be positive",
                self.daylight_hours_equivalent
            ));
        }
        if let Some(jitter) = &self.shading_jitter {
            if !jitter.amplitude.is_finite() || !(0. ..=0.5).contains(&jitter.amplitude) {
                return err(format!(
                    "shading jitter amplitude {} is not in [0, 0.5]",
                    jitter.amplitude
                ));
            }
        }
        Ok(())
    }
}
