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

//! Corrections that depend on where an element sits in the building:
//! how high it is, how much ground it sees and which way it faces.

use crate::irradiance::DEFAULT_ALBEDO;
use crate::solar_geometry::normalize_azimuth;
use crate::Float;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default floor-to-floor height, in meters
pub const DEFAULT_FLOOR_HEIGHT: Float = 3.5;

/// Height of the center of a window above its own floor
const WINDOW_CENTER_OFFSET: Float = 1.5;

/// Maximum contribution of ground reflection, as a fraction of GHI
const MAX_GROUND_REFLECTANCE_FACTOR: Float = 0.15;

/// Compass orientation of a facade.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Orientation {
    /// Facing 0 degrees
    North,
    /// Facing 45 degrees
    Northeast,
    /// Facing 90 degrees
    East,
    /// Facing 135 degrees
    Southeast,
    /// Facing 180 degrees
    South,
    /// Facing 225 degrees
    Southwest,
    /// Facing 270 degrees
    West,
    /// Facing 315 degrees
    Northwest,
}

impl Orientation {
    /// All the orientations, clockwise from North
    pub const ALL: [Orientation; 8] = [
        Orientation::North,
        Orientation::Northeast,
        Orientation::East,
        Orientation::Southeast,
        Orientation::South,
        Orientation::Southwest,
        Orientation::West,
        Orientation::Northwest,
    ];

    /// Classifies an azimuth (0 is North, clockwise) into one of the
    /// eight 45-degree sectors centered on the compass points.
    pub fn from_azimuth(azimuth: Float) -> Self {
        let az = normalize_azimuth(azimuth);
        let sector = ((az + 22.5) / 45.).floor() as usize % 8;
        Self::ALL[sector]
    }

    /// The azimuth at the center of this orientation's sector
    pub fn azimuth(&self) -> Float {
        match self {
            Self::North => 0.,
            Self::Northeast => 45.,
            Self::East => 90.,
            Self::Southeast => 135.,
            Self::South => 180.,
            Self::Southwest => 225.,
            Self::West => 270.,
            Self::Northwest => 315.,
        }
    }

    /// Relative solar exposure of a vertical facade facing this way,
    /// compared to a South-facing one.
    ///
    /// The table follows the cosine loss of the facade normal relative to
    /// the equator-facing direction, softened by the diffuse share that every
    /// orientation receives: `South 1.0`, `SE/SW 0.95`, `E/W 0.85`,
    /// `NE/NW 0.70` and `North 0.30`.
    pub fn factor(&self) -> Float {
        match self {
            Self::South => 1.0,
            Self::Southeast | Self::Southwest => 0.95,
            Self::East | Self::West => 0.85,
            Self::Northeast | Self::Northwest => 0.70,
            Self::North => 0.30,
        }
    }

    /// The name of the orientation
    pub fn name(&self) -> &'static str {
        match self {
            Self::North => "North",
            Self::Northeast => "Northeast",
            Self::East => "East",
            Self::Southeast => "Southeast",
            Self::South => "South",
            Self::Southwest => "Southwest",
            Self::West => "West",
            Self::Northwest => "Northwest",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Orientation {
    type Err = String;

    /// Parses labels like `"South"`, `"south-east"`, `"South East"` or `"SE"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        let ret = match key.as_str() {
            "n" | "north" => Self::North,
            "ne" | "northeast" => Self::Northeast,
            "e" | "east" => Self::East,
            "se" | "southeast" => Self::Southeast,
            "s" | "south" => Self::South,
            "sw" | "southwest" => Self::Southwest,
            "w" | "west" => Self::West,
            "nw" | "northwest" => Self::Northwest,
            _ => return Err(format!("Unknown orientation '{}'", s)),
        };
        Ok(ret)
    }
}

impl TryFrom<String> for Orientation {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Orientation> for String {
    fn from(value: Orientation) -> Self {
        value.name().to_string()
    }
}

/// Looks up the orientation factor of a compass label. Unknown labels
/// return `None`.
pub fn orientation_factor(orientation_label: &str) -> Option<Float> {
    orientation_label
        .parse::<Orientation>()
        .ok()
        .map(|o| o.factor())
}

/// Extracts the story index from a level label such as `"Level 3"`,
/// `"L02"` or `"4"`. Returns `None` when there are no digits.
pub fn parse_level_index(level: &str) -> Option<u32> {
    let digits: String = level
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Estimates the height (m) of the center of a window above the ground.
///
/// Labels without a story number are assumed to be on the ground floor,
/// which returns `floor_height`.
pub fn estimate_height_from_ground(level: &str, floor_height: Float) -> Float {
    match parse_level_index(level) {
        Some(index) => (index as Float * floor_height + WINDOW_CENTER_OFFSET)
            .max(WINDOW_CENTER_OFFSET),
        None => floor_height,
    }
}

/// Fraction of GHI that reaches a surface after being reflected
/// by the ground, in `[0, 0.15]`.
///
/// The view factor to the ground (`(1 - cos(tilt))/2`, i.e. 0.5 for vertical
/// surfaces) decays exponentially with height, and it is scaled by the
/// albedo relative to the default one. It is capped so that low windows
/// do not get an unrealistic share of reflected radiation.
pub fn ground_reflectance_factor(height_from_ground: Float, tilt: Float, albedo: Float) -> Float {
    let view_factor = (1. - tilt.to_radians().cos()) / 2.;
    let decay = (-height_from_ground.max(0.0) / 10.).exp();
    (view_factor * decay * albedo / DEFAULT_ALBEDO).clamp(0.0, MAX_GROUND_REFLECTANCE_FACTOR)
}

/// The result of adjusting the GHI for the height of an element
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeightAdjustment {
    /// The GHI after the adjustment
    pub adjusted_ghi: Float,

    /// The multiplier applied to the base GHI
    pub height_factor: Float,
}

/// Multiplier accounting for the slightly clearer atmosphere
/// seen from higher up. Goes linearly up to +5% at 100m.
fn clarity_factor(height_from_ground: Float) -> Float {
    1. + 0.05 * (height_from_ground.max(0.0) / 100.).min(1.0)
}

/// Multiplier accounting for objects near the horizon (other buildings,
/// street furniture) that low windows cannot see past.
fn horizon_obstruction_factor(height_from_ground: Float) -> Float {
    if height_from_ground <= 3.0 {
        0.95
    } else if height_from_ground <= 10.0 {
        0.98
    } else {
        1.0
    }
}

/// Adjusts the GHI for the height of the element above the ground.
pub fn height_dependent_ghi_adjustment(
    height_from_ground: Float,
    base_ghi: Float,
) -> HeightAdjustment {
    let height_factor =
        clarity_factor(height_from_ground) * horizon_obstruction_factor(height_from_ground);
    HeightAdjustment {
        adjusted_ghi: base_ghi * height_factor,
        height_factor,
    }
}

#[cfg(test)]
mod testing {
    use super::*;
    use validate::assert_close;

    #[test]
    fn test_from_azimuth() {
        assert_eq!(Orientation::from_azimuth(0.), Orientation::North);
        assert_eq!(Orientation::from_azimuth(359.), Orientation::North);
        assert_eq!(Orientation::from_azimuth(22.4), Orientation::North);
        assert_eq!(Orientation::from_azimuth(22.5), Orientation::Northeast);
        assert_eq!(Orientation::from_azimuth(90.), Orientation::East);
        assert_eq!(Orientation::from_azimuth(150.), Orientation::Southeast);
        assert_eq!(Orientation::from_azimuth(180.), Orientation::South);
        assert_eq!(Orientation::from_azimuth(200.), Orientation::South);
        assert_eq!(Orientation::from_azimuth(202.4), Orientation::South);
        assert_eq!(Orientation::from_azimuth(202.5), Orientation::Southwest);
        assert_eq!(Orientation::from_azimuth(210.), Orientation::Southwest);
        assert_eq!(Orientation::from_azimuth(-90.), Orientation::West);
        assert_eq!(Orientation::from_azimuth(337.4), Orientation::Northwest);
        for o in Orientation::ALL {
            assert_eq!(Orientation::from_azimuth(o.azimuth()), o);
        }
    }

    #[test]
    fn test_parse_labels() {
        assert_eq!("South".parse::<Orientation>().unwrap(), Orientation::South);
        assert_eq!("south-east".parse::<Orientation>().unwrap(), Orientation::Southeast);
        assert_eq!("North West".parse::<Orientation>().unwrap(), Orientation::Northwest);
        assert_eq!("NE".parse::<Orientation>().unwrap(), Orientation::Northeast);
        assert_eq!("w".parse::<Orientation>().unwrap(), Orientation::West);
        assert!("Up".parse::<Orientation>().is_err());
    }

    #[test]
    fn test_serde_orientation() {
        let o: Orientation = serde_json::from_str("\"southwest\"").unwrap();
        assert_eq!(o, Orientation::Southwest);
        assert_eq!(serde_json::to_string(&o).unwrap(), "\"Southwest\"");
        assert!(serde_json::from_str::<Orientation>("\"sideways\"").is_err());
    }

    #[test]
    fn test_south_is_the_best() {
        assert_eq!(orientation_factor("South"), Some(1.0));
        for o in Orientation::ALL {
            assert!(o.factor() <= Orientation::South.factor());
            assert!(o.factor() >= 0.0 && o.factor() <= 1.0);
        }
        assert_eq!(orientation_factor("North"), Some(0.30));
        assert_eq!(orientation_factor("Skyward"), None);
    }

    #[test]
    fn test_factors_symmetric() {
        assert_eq!(Orientation::East.factor(), Orientation::West.factor());
        assert_eq!(Orientation::Southeast.factor(), Orientation::Southwest.factor());
        assert_eq!(Orientation::Northeast.factor(), Orientation::Northwest.factor());
    }

    #[test]
    fn test_parse_level_index() {
        assert_eq!(parse_level_index("Level 3"), Some(3));
        assert_eq!(parse_level_index("L02"), Some(2));
        assert_eq!(parse_level_index("12"), Some(12));
        assert_eq!(parse_level_index("Level 1 - Offices 7"), Some(1));
        assert_eq!(parse_level_index("Ground Floor"), None);
        assert_eq!(parse_level_index(""), None);
    }

    #[test]
    fn test_height_from_ground() {
        assert_close!(estimate_height_from_ground("Level 0", 3.5), 1.5, 1e-9);
        assert_close!(estimate_height_from_ground("Level 1", 3.5), 5.0, 1e-9);
        assert_close!(estimate_height_from_ground("Level 4", 3.0), 13.5, 1e-9);
        assert_close!(estimate_height_from_ground("Roof", 3.5), 3.5, 1e-9);
        assert_close!(
            estimate_height_from_ground("Lobby", DEFAULT_FLOOR_HEIGHT),
            DEFAULT_FLOOR_HEIGHT,
            1e-9
        );
    }

    #[test]
    fn test_ground_reflectance_factor() {
        // Low windows are capped
        assert_close!(ground_reflectance_factor(1.5, 90., 0.2), 0.15, 1e-9);
        // High windows decay
        let high = ground_reflectance_factor(30., 90., 0.2);
        assert_close!(high, 0.5 * (-3.0 as Float).exp(), 1e-9);
        assert!(ground_reflectance_factor(60., 90., 0.2) < high);
        // Horizontal surfaces do not see the ground
        assert!(ground_reflectance_factor(1.5, 0., 0.2).abs() < 1e-12);
        // Always in range
        for h in [0., 1., 5., 10., 100., 1000.] {
            for albedo in [0., 0.2, 0.8] {
                let f = ground_reflectance_factor(h, 90., albedo);
                assert!((0. ..=0.15).contains(&f));
            }
        }
    }

    #[test]
    fn test_height_adjustment() {
        let low = height_dependent_ghi_adjustment(1.5, 1000.);
        assert_close!(low.height_factor, 0.95 * (1. + 0.05 * 0.015), 1e-9);
        assert_close!(low.adjusted_ghi, 1000. * low.height_factor, 1e-9);

        let mid = height_dependent_ghi_adjustment(5.0, 1000.);
        assert_close!(mid.height_factor, 0.98 * (1. + 0.05 * 0.05), 1e-9);

        let high = height_dependent_ghi_adjustment(150., 1000.);
        assert_close!(high.height_factor, 1.05, 1e-9);
        assert!(high.adjusted_ghi > mid.adjusted_ghi);
        assert!(mid.adjusted_ghi > low.adjusted_ghi);
    }
}
