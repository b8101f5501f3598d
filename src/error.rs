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
use thiserror::Error;

/// Errors that make a whole analysis fail.
///
/// Problems that only affect a single element (or a single sample) are
/// not errors; they become [`ElementWarning`]s attached to the result.
#[derive(Debug, Error)]
pub enum RadiationError {
    /// The inputs (elements or weather) cannot be analysed
    #[error("invalid input: {0}")]
    InputValidation(String),

    /// The analysis options are inconsistent
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The analysis was cancelled before finishing
    #[error("analysis cancelled after {completed} of {total} elements")]
    Cancelled {
        /// Number of elements that had been processed
        completed: usize,
        /// Number of elements in the analysis
        total: usize,
    },

    /// Reading or writing a file failed
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON document could not be read or written
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias
pub type Result<T> = std::result::Result<T, RadiationError>;

/// Something that went wrong while analysing a single element, but
/// that did not prevent producing a result for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ElementWarning {
    /// Some of the sampled (day, hour) pairs had no weather record
    MissingWeatherSamples {
        /// Number of skipped samples
        count: usize,
    },

    /// None of the sampled (day, hour) pairs had a weather record, so
    /// the annual radiation is zero
    NoValidSamples,

    /// The shading of a wall could not be calculated, so a conservative
    /// default factor was used instead
    ShadingFallback {
        /// The wall that failed
        wall_id: String,
        /// What was wrong with it
        reason: String,
        /// The factor used in its place
        factor: Float,
    },

    /// The element took longer than allowed, so the result only
    /// accounts for part of the samples
    ElementTimeout {
        /// Time spent on the element
        elapsed_ms: u64,
        /// Samples processed before stopping
        samples_processed: usize,
    },
}
