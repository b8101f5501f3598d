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

use crate::Float;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of equivalent full-irradiance hours represented by a noon
/// sample. This is a calibration constant: it was fitted by comparing
/// noon-only runs against full hourly runs of South-facing facades at
/// mid latitudes (which give values between 8.5 and 11).
///
/// Only equator-facing facades are calibrated. A noon sample misses the
/// morning sun of East facades and the afternoon sun of West ones, so
/// those come out around 50% lower than with [`PrecisionLevel::Hourly`]
/// (and North facades around 30% lower).
pub const DEFAULT_DAYLIGHT_HOURS_EQUIVALENT: Float = 9.5;

/// Average number of days in a month
const DAYS_PER_MONTH: Float = 30.4;

/// Number of days represented by each season
const DAYS_PER_SEASON: Float = 91.25;

/// Day of the year of the 15th of each month (non-leap year)
const MID_MONTH_DAYS: [u16; 12] = [15, 46, 74, 105, 135, 166, 196, 227, 258, 288, 319, 349];

/// Spring equinox, summer solstice, autumn equinox and winter solstice
const SEASONAL_DAYS: [u16; 4] = [80, 172, 266, 355];

/// How densely the year is sampled when calculating radiation.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrecisionLevel {
    /// Every hour of every day. Hours with the sun below the
    /// horizon contribute nothing.
    Hourly,
    /// Noon of every day. It stays within 15% of [`PrecisionLevel::Hourly`]
    /// for facades facing the equator only (see
    /// [`DEFAULT_DAYLIGHT_HOURS_EQUIVALENT`]).
    #[default]
    DailyPeak,
    /// Noon of one representative day per month
    MonthlyAverage,
    /// Noon of one representative day per season
    YearlyAverage,
}

impl fmt::Display for PrecisionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Hourly => "hourly",
            Self::DailyPeak => "daily_peak",
            Self::MonthlyAverage => "monthly_average",
            Self::YearlyAverage => "yearly_average",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for PrecisionLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "hourly" => Ok(Self::Hourly),
            "dailypeak" | "daily" => Ok(Self::DailyPeak),
            "monthlyaverage" | "monthly" => Ok(Self::MonthlyAverage),
            "yearlyaverage" | "yearly" | "seasonal" => Ok(Self::YearlyAverage),
            _ => Err(format!("Unknown precision level '{}'", s)),
        }
    }
}

/// The (day, hour) pairs sampled by a [`PrecisionLevel`], and the factor
/// that turns the sum of the sampled irradiances into an annual figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrecisionPreset {
    /// The level this preset was built for
    pub level: PrecisionLevel,

    /// Hours of the day that are sampled
    pub hour_samples: Vec<u8>,

    /// Days of the year that are sampled
    pub day_samples: Vec<u16>,

    /// Multiplier applied to the sampled sum
    pub scaling_factor: Float,
}

impl PrecisionPreset {
    /// Builds a preset using a certain daylight-hours-equivalent
    /// calibration constant (see [`DEFAULT_DAYLIGHT_HOURS_EQUIVALENT`]).
    pub fn with_calibration(level: PrecisionLevel, daylight_hours_equivalent: Float) -> Self {
        let k = daylight_hours_equivalent;
        let every_day: Vec<u16> = (1..=365).collect();
        let (hour_samples, day_samples, scaling_factor): (Vec<u8>, Vec<u16>, Float) =
            match level {
                PrecisionLevel::Hourly => ((0..=23).collect(), every_day, 1.0),
                PrecisionLevel::DailyPeak => (vec![12], every_day, k),
                PrecisionLevel::MonthlyAverage => {
                    (vec![12], MID_MONTH_DAYS.to_vec(), k * DAYS_PER_MONTH)
                }
                PrecisionLevel::YearlyAverage => {
                    (vec![12], SEASONAL_DAYS.to_vec(), k * DAYS_PER_SEASON)
                }
            };
        Self {
            level,
            hour_samples,
            day_samples,
            scaling_factor,
        }
    }

    /// Number of (day, hour) pairs in this preset
    pub fn n_samples(&self) -> usize {
        self.hour_samples.len() * self.day_samples.len()
    }

    /// Iterates the (day, hour) pairs, day by day.
    pub fn samples(&self) -> impl Iterator<Item = (u16, u8)> + '_ {
        self.day_samples
            .iter()
            .flat_map(move |d| self.hour_samples.iter().map(move |h| (*d, *h)))
    }
}

/// Gets the default preset for a precision level
pub fn get_precision_preset(level: PrecisionLevel) -> PrecisionPreset {
    PrecisionPreset::with_calibration(level, DEFAULT_DAYLIGHT_HOURS_EQUIVALENT)
}
