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

use crate::solar_geometry::SolarPosition;
use crate::Float;
use serde::{Deserialize, Serialize};

/// Albedo used when nothing else is said about the ground.
pub const DEFAULT_ALBEDO: Float = 0.2;

/// The components of the irradiance (W/m2) reaching a tilted surface.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrradianceComponents {
    /// Beam radiation coming straight from the sun
    pub direct: Float,

    /// Diffuse radiation from the sky vault (isotropic)
    pub diffuse: Float,

    /// Radiation reflected by the ground
    pub ground_reflected: Float,
}

impl IrradianceComponents {
    /// The total plane-of-array irradiance, never negative
    pub fn total(&self) -> Float {
        (self.direct + self.diffuse + self.ground_reflected).max(0.0)
    }
}

/// Cosine of the angle between the sun and the normal of a surface
/// with a certain `tilt` (0 is horizontal, 90 is vertical) and `azimuth`
/// (0 is North, clockwise).
///
/// It is clamped at zero, meaning that surfaces facing away from the sun
/// do not see it.
pub fn incidence_cosine(position: &SolarPosition, tilt: Float, azimuth: Float) -> Float {
    let zenith = position.zenith.to_radians();
    let tilt = tilt.to_radians();
    let delta_azimuth = (position.azimuth - azimuth).to_radians();

    let cos_incidence =
        zenith.sin() * tilt.sin() * delta_azimuth.cos() + zenith.cos() * tilt.cos();
    cos_incidence.max(0.0)
}

/// Splits the plane-of-array irradiance into its direct, diffuse and
/// ground-reflected components, using an isotropic sky.
///
/// The irradiance inputs are expected to be non-negative. When the sun is
/// below the horizon, there is no direct component.
pub fn irradiance_components(
    ghi: Float,
    dni: Float,
    dhi: Float,
    position: &SolarPosition,
    surface_tilt: Float,
    surface_azimuth: Float,
    albedo: Float,
) -> IrradianceComponents {
    let cos_tilt = surface_tilt.to_radians().cos();

    let direct = if position.is_above_horizon() {
        dni * incidence_cosine(position, surface_tilt, surface_azimuth)
    } else {
        0.0
    };
    let diffuse = dhi * (1. + cos_tilt) / 2.;
    let ground_reflected = ghi * albedo * (1. - cos_tilt) / 2.;

    IrradianceComponents {
        direct,
        diffuse,
        ground_reflected,
    }
}

/// Calculates the irradiance (W/m2) incident on a surface with a certain
/// tilt and azimuth. The result is never negative.
pub fn plane_of_array_irradiance(
    ghi: Float,
    dni: Float,
    dhi: Float,
    position: &SolarPosition,
    surface_tilt: Float,
    surface_azimuth: Float,
    albedo: Float,
) -> Float {
    irradiance_components(
        ghi,
        dni,
        dhi,
        position,
        surface_tilt,
        surface_azimuth,
        albedo,
    )
    .total()
}
