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
use crate::element::ElementRadiationResult;
use crate::Float;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregated results of the elements sharing an orientation
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrientationSummary {
    /// Number of elements
    pub n_elements: usize,

    /// Glass area of all the elements, in m2
    pub glass_area: Float,

    /// Annual radiation over all the glass, in kWh/year
    pub annual_energy: Float,

    /// Area-weighted mean annual radiation, in kWh/m2/year
    pub mean_annual_radiation: Float,
}

/// Aggregated results of a whole analysis
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    /// Number of elements
    pub n_elements: usize,

    /// Number of elements whose result has warnings
    pub n_with_warnings: usize,

    /// Glass area of all the elements, in m2
    pub total_glass_area: Float,

    /// Annual radiation over all the glass, in kWh/year
    pub total_annual_energy: Float,

    /// Area-weighted mean annual radiation, in kWh/m2/year
    pub mean_annual_radiation: Float,

    /// The element receiving the most radiation per square meter
    pub best_element: Option<String>,

    /// Annual radiation of the best element, in kWh/m2/year
    pub max_annual_radiation: Float,

    /// Highest peak irradiance among all elements, in W/m2
    pub max_peak_irradiance: Float,

    /// Radiation over all the glass, for each month, in kWh
    pub monthly_energy: [Float; 12],

    /// Results grouped by orientation
    pub by_orientation: BTreeMap<Orientation, OrientationSummary>,
}

impl AnalysisSummary {
    /// Summarises a set of results
    pub fn from_results(results: &[ElementRadiationResult]) -> Self {
        let mut ret = Self {
            n_elements: results.len(),
            ..Self::default()
        };

        for r in results {
            if r.has_warnings() {
                ret.n_with_warnings += 1;
            }
            ret.total_glass_area += r.glass_area;
            ret.total_annual_energy += r.annual_energy;
            ret.max_peak_irradiance = ret.max_peak_irradiance.max(r.peak_irradiance);
            if ret.best_element.is_none() || r.annual_radiation > ret.max_annual_radiation {
                ret.best_element = Some(r.element_id.clone());
                ret.max_annual_radiation = r.annual_radiation;
            }
            for (total, v) in ret.monthly_energy.iter_mut().zip(r.monthly_totals.iter()) {
                *total += v * r.glass_area;
            }

            let group = ret.by_orientation.entry(r.orientation).or_default();
            group.n_elements += 1;
            group.glass_area += r.glass_area;
            group.annual_energy += r.annual_energy;
        }

        if ret.total_glass_area > 0. {
            ret.mean_annual_radiation = ret.total_annual_energy / ret.total_glass_area;
        }
        for group in ret.by_orientation.values_mut() {
            if group.glass_area > 0. {
                group.mean_annual_radiation = group.annual_energy / group.glass_area;
            }
        }
        ret
    }
}

#[cfg(test)]
mod testing {
    use super::*;
    use crate::error::ElementWarning;
    use validate::assert_close;

    fn result(
        id: &str,
        orientation: Orientation,
        annual: Float,
        area: Float,
    ) -> ElementRadiationResult {
        let mut monthly_totals = [0.0; 12];
        monthly_totals[5] = annual;
        ElementRadiationResult {
            element_id: id.to_string(),
            orientation,
            azimuth: orientation.azimuth(),
            annual_radiation: annual,
            peak_irradiance: annual / 2.,
            monthly_totals,
            orientation_factor: orientation.factor(),
            height_from_ground: 5.,
            tilt: 90.,
            glass_area: area,
            annual_energy: annual * area,
            valid_samples: 365,
            warnings: vec![],
        }
    }

    #[test]
    fn test_empty() {
        let s = AnalysisSummary::from_results(&[]);
        assert_eq!(s.n_elements, 0);
        assert!(s.best_element.is_none());
        assert_eq!(s.mean_annual_radiation, 0.0);
        assert!(s.by_orientation.is_empty());
    }

    #[test]
    fn test_summary() {
        let mut north = result("N1", Orientation::North, 100., 2.);
        north.warnings.push(ElementWarning::NoValidSamples);
        let results = vec![
            result("S1", Orientation::South, 400., 1.),
            result("S2", Orientation::South, 300., 3.),
            north,
        ];
        let s = AnalysisSummary::from_results(&results);
        assert_eq!(s.n_elements, 3);
        assert_eq!(s.n_with_warnings, 1);
        assert_close!(s.total_glass_area, 6., 1e-9);
        assert_close!(s.total_annual_energy, 1500., 1e-9);
        assert_close!(s.mean_annual_radiation, 250., 1e-9);
        assert_eq!(s.best_element.as_deref(), Some("S1"));
        assert_close!(s.max_annual_radiation, 400., 1e-9);
        assert_close!(s.max_peak_irradiance, 200., 1e-9);
        assert_close!(s.monthly_energy[5], 1500., 1e-9);

        let south = &s.by_orientation[&Orientation::South];
        assert_eq!(south.n_elements, 2);
        assert_close!(south.annual_energy, 1300., 1e-9);
        assert_close!(south.mean_annual_radiation, 325., 1e-9);
        assert_eq!(s.by_orientation[&Orientation::North].n_elements, 1);
        assert!(!s.by_orientation.contains_key(&Orientation::East));
    }
}
