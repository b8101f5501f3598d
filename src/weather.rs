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

//! Hourly weather data (e.g., a Typical Meteorological Year).
//!
//! External weather records come with all sorts of field names
//! (`ghi`, `GHI`, `GHI_Wm2`...). They are normalised into [`WeatherSample`]s
//! once, when building a [`WeatherSeries`], so the radiation calculations
//! never deal with them.

use crate::error::{RadiationError, Result};
use crate::Float;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Number of slots in the (day, hour) index: 366 days of 24 hours
const N_SLOTS: usize = 366 * 24;

/// A weather record as found in external data. The field names
/// accept the usual aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    /// Day of the year, from 1 to 366
    #[serde(alias = "day", alias = "doy", alias = "DayOfYear", alias = "Day")]
    pub day_of_year: u16,

    /// Hour of the day, from 0 to 23
    #[serde(alias = "Hour", alias = "hour_of_day")]
    pub hour: u8,

    /// Calendar month, if known
    #[serde(default, alias = "Month")]
    pub month: Option<u8>,

    /// Global Horizontal Irradiance, W/m2
    #[serde(
        alias = "GHI",
        alias = "GHI_Wm2",
        alias = "global_horizontal_irradiance"
    )]
    pub ghi: Float,

    /// Direct Normal Irradiance, W/m2
    #[serde(
        default,
        alias = "DNI",
        alias = "DNI_Wm2",
        alias = "direct_normal_irradiance"
    )]
    pub dni: Float,

    /// Diffuse Horizontal Irradiance, W/m2
    #[serde(
        default,
        alias = "DHI",
        alias = "DHI_Wm2",
        alias = "diffuse_horizontal_irradiance"
    )]
    pub dhi: Float,
}

/// A validated hourly weather sample.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSample {
    /// Day of the year, from 1 to 366
    pub day_of_year: u16,

    /// Hour of the day, from 0 to 23
    pub hour: u8,

    /// Calendar month (1 to 12), if the source gave one
    pub month: Option<u8>,

    /// Global Horizontal Irradiance, W/m2
    pub ghi: Float,

    /// Direct Normal Irradiance, W/m2
    pub dni: Float,

    /// Diffuse Horizontal Irradiance, W/m2
    pub dhi: Float,
}

impl TryFrom<WeatherRecord> for WeatherSample {
    type Error = RadiationError;

    fn try_from(r: WeatherRecord) -> Result<Self> {
        if !(1..=366).contains(&r.day_of_year) {
            return Err(RadiationError::InputValidation(format!(
                "weather record has day of year {}, expected 1 to 366",
                r.day_of_year
            )));
        }
        if r.hour > 23 {
            return Err(RadiationError::InputValidation(format!(
                "weather record for day {} has hour {}, expected 0 to 23",
                r.day_of_year, r.hour
            )));
        }
        if let Some(m) = r.month {
            if !(1..=12).contains(&m) {
                return Err(RadiationError::InputValidation(format!(
                    "weather record for day {} has month {}",
                    r.day_of_year, m
                )));
            }
        }
        for (name, v) in [("GHI", r.ghi), ("DNI", r.dni), ("DHI", r.dhi)] {
            if !v.is_finite() || v < 0. {
                return Err(RadiationError::InputValidation(format!(
                    "weather record for day {}, hour {} has {} = {}",
                    r.day_of_year, r.hour, name, v
                )));
            }
        }
        Ok(Self {
            day_of_year: r.day_of_year,
            hour: r.hour,
            month: r.month,
            ghi: r.ghi,
            dni: r.dni,
            dhi: r.dhi,
        })
    }
}

fn slot(day_of_year: u16, hour: u8) -> Option<usize> {
    if (1..=366).contains(&day_of_year) && hour < 24 {
        Some((day_of_year as usize - 1) * 24 + hour as usize)
    } else {
        None
    }
}

/// An hourly weather series, indexed by (day of year, hour).
#[derive(Debug, Clone)]
pub struct WeatherSeries {
    samples: Vec<WeatherSample>,
    index: Vec<Option<usize>>,
}

impl WeatherSeries {
    /// Builds a series from validated samples.
    ///
    /// If the same (day, hour) appears more than once, the first
    /// sample is kept. An empty series is an error.
    pub fn new(samples: Vec<WeatherSample>) -> Result<Self> {
        if samples.is_empty() {
            return Err(RadiationError::InputValidation(
                "the weather series is empty".to_string(),
            ));
        }
        let mut index = vec![None; N_SLOTS];
        let mut duplicates = 0;
        for (i, s) in samples.iter().enumerate() {
            let k = slot(s.day_of_year, s.hour).ok_or_else(|| {
                RadiationError::InputValidation(format!(
                    "weather sample out of range: day {}, hour {}",
                    s.day_of_year, s.hour
                ))
            })?;
            if index[k].is_none() {
                index[k] = Some(i);
            } else {
                duplicates += 1;
            }
        }
        if duplicates > 0 {
            tracing::debug!(duplicates, "ignored duplicated weather samples");
        }
        Ok(Self { samples, index })
    }

    /// Normalises and validates external records
    pub fn from_records(records: Vec<WeatherRecord>) -> Result<Self> {
        let samples = records
            .into_iter()
            .map(WeatherSample::try_from)
            .collect::<Result<Vec<WeatherSample>>>()?;
        Self::new(samples)
    }

    /// Reads a JSON array of weather records
    pub fn from_json_str(json: &str) -> Result<Self> {
        let records: Vec<WeatherRecord> = serde_json::from_str(json)?;
        Self::from_records(records)
    }

    /// Reads a JSON file containing an array of weather records
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Finds the sample of a certain day and hour
    pub fn get(&self, day_of_year: u16, hour: u8) -> Option<&WeatherSample> {
        let k = slot(day_of_year, hour)?;
        self.index[k].map(|i| &self.samples[i])
    }

    /// Number of samples in the series (including duplicates)
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Checks whether the series has no samples. Never true for a
    /// successfully built series.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The samples, in the order they were given
    pub fn samples(&self) -> &[WeatherSample] {
        &self.samples
    }

    /// Total horizontal irradiation (kWh/m2) of all distinct samples.
    /// For a full hourly year, this is the annual GHI.
    pub fn total_ghi_kwh(&self) -> Float {
        self.index
            .iter()
            .flatten()
            .map(|i| self.samples[*i].ghi)
            .sum::<Float>()
            / 1000.
    }
}
