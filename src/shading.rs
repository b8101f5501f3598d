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

//! Coarse geometric shading estimates.
//!
//! None of this is ray-tracing: walls and obstacles are described by a
//! handful of numbers (azimuth, height, level...) and the shadow they cast
//! is approximated from the relative position of the sun. The results are
//! meant for ranking facades, not for detailed shadow studies.

use crate::element::{BuildingElement, Obstacle, WallElement};
use crate::solar_geometry::{azimuth_difference, SolarPosition};
use crate::Float;

/// No combination of obstructions takes away more than this
/// fraction of the radiation; some sky is always visible.
pub const MIN_SHADING_FACTOR: Float = 0.2;

/// Factor used for walls whose shading cannot be calculated.
pub const FALLBACK_WALL_FACTOR: Float = 0.9;

/// Largest fraction of radiation a single wall can take away.
const MAX_WALL_SHADOW_INTENSITY: Float = 0.4;

/// Walls on another level only cast part of their shadow
const OTHER_LEVEL_DISCOUNT: Float = 0.5;

/// A wall whose shading could not be estimated.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadingFailure {
    /// The wall
    pub wall_id: String,
    /// What is wrong with it
    pub reason: String,
}

/// The shading over an element, plus the walls that had to be
/// replaced by [`FALLBACK_WALL_FACTOR`].
#[derive(Debug, Clone, PartialEq)]
pub struct ShadingOutcome {
    /// The combined shading factor, in `[MIN_SHADING_FACTOR, 1]`
    pub factor: Float,

    /// Walls for which the fallback factor was used
    pub failures: Vec<ShadingFailure>,
}

fn check_wall(wall: &WallElement) -> Result<(), String> {
    if !wall.azimuth.is_finite() {
        return Err(format!("azimuth is {}", wall.azimuth));
    }
    if !wall.height.is_finite() || wall.height < 0. {
        return Err(format!("height is {}", wall.height));
    }
    Ok(())
}

/// The fraction of radiation that gets past a single wall.
///
/// A wall is considered able to block the window when it faces roughly the
/// same way (less than 90 degrees apart); it then shades the window when the
/// sun sits behind the wall. The closer the two azimuths, the darker the
/// shadow. Low suns (longer shadows) shade more than high ones, and walls on
/// another level only count half.
pub fn wall_shading_factor(
    window: &BuildingElement,
    wall: &WallElement,
    position: &SolarPosition,
) -> Result<Float, String> {
    check_wall(wall)?;

    if !position.is_above_horizon() {
        return Ok(1.0);
    }

    let wall_window_difference = azimuth_difference(wall.azimuth, window.azimuth);
    if wall_window_difference >= 90. {
        return Ok(1.0);
    }

    let sun_behind_wall = azimuth_difference(wall.azimuth, position.azimuth) > 90.;
    if !sun_behind_wall {
        return Ok(1.0);
    }

    let proximity = 1. - wall_window_difference / 90.;
    let sun_height = 0.5 + 0.5 * position.elevation.to_radians().cos();
    let mut intensity = MAX_WALL_SHADOW_INTENSITY * proximity * sun_height;
    if wall.level != window.building_level {
        intensity *= OTHER_LEVEL_DISCOUNT;
    }

    Ok((1. - intensity).clamp(0.0, 1.0))
}

/// Like [`shading_factor`], but also reports which walls could not be processed.
pub fn shading_factor_with_diagnostics(
    window: &BuildingElement,
    walls: &[WallElement],
    position: &SolarPosition,
) -> ShadingOutcome {
    let mut failures = Vec::new();
    if !position.is_above_horizon() {
        return ShadingOutcome {
            factor: 1.0,
            failures,
        };
    }

    let mut combined = 1.0;
    for wall in walls {
        // The window's own wall does not shade it
        if window.host_wall_id.as_deref() == Some(wall.wall_id.as_str()) {
            continue;
        }
        match wall_shading_factor(window, wall, position) {
            Ok(f) => combined *= f,
            Err(reason) => {
                combined *= FALLBACK_WALL_FACTOR;
                failures.push(ShadingFailure {
                    wall_id: wall.wall_id.clone(),
                    reason,
                });
            }
        }
    }

    ShadingOutcome {
        factor: combined.clamp(MIN_SHADING_FACTOR, 1.0),
        failures,
    }
}

/// Estimates the fraction of radiation reaching a window after being
/// shaded by the walls around it. The result is in `[0.2, 1.0]`, and is
/// `1.0` when the sun is below the horizon.
///
/// Walls that cannot be processed contribute [`FALLBACK_WALL_FACTOR`].
pub fn shading_factor(
    window: &BuildingElement,
    walls: &[WallElement],
    position: &SolarPosition,
) -> Float {
    shading_factor_with_diagnostics(window, walls, position).factor
}

/// Fraction of radiation that gets past trees and other obstacles around
/// the building.
///
/// For every obstacle lying in the direction of the sun, the height of its
/// shadow on the facade is `height - window_height - distance * tan(elevation)`.
/// The covered part of the window is that shadow height relative to the
/// window size (approximated as `sqrt(glass_area)`), and the covered part
/// only lets through the obstacle's transmittance.
pub fn obstacle_factor(
    window_height_from_ground: Float,
    glass_area: Float,
    obstacles: &[Obstacle],
    position: &SolarPosition,
) -> Float {
    if !position.is_above_horizon() || obstacles.is_empty() {
        return 1.0;
    }
    let window_size = glass_area.max(0.0).sqrt();
    if window_size <= 0.0 {
        return 1.0;
    }
    let tan_elevation = position.elevation.to_radians().tan();

    let mut combined = 1.0;
    for obstacle in obstacles {
        let half_width = obstacle.angular_width.abs() / 2.;
        if azimuth_difference(obstacle.azimuth, position.azimuth) > half_width {
            continue;
        }
        let shadow_height = obstacle.height
            - window_height_from_ground
            - obstacle.distance.max(0.0) * tan_elevation;
        if !shadow_height.is_finite() || shadow_height <= 0.0 {
            continue;
        }
        let coverage = (shadow_height / window_size).clamp(0.0, 1.0);
        let transmittance = obstacle.transmittance.clamp(0.0, 1.0);
        combined *= 1. - coverage * (1. - transmittance);
    }
    combined.clamp(MIN_SHADING_FACTOR, 1.0)
}
