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

/// The position of the sun in the sky, as seen from a certain
/// location at a certain time.
///
/// All angles are in degrees. The azimuth is measured from the North,
/// clockwise (i.e., East is 90, South is 180).
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolarPosition {
    /// Angle of the sun above the horizon. It is negative
    /// when the sun is below the horizon (i.e., at night)
    pub elevation: Float,

    /// Compass bearing of the sun, in `[0, 360)`
    pub azimuth: Float,

    /// Angle between the sun and the vertical. Always `90 - elevation`
    pub zenith: Float,

    /// Solar declination
    pub declination: Float,

    /// Hour angle. Negative in the morning, positive in the afternoon.
    pub hour_angle: Float,
}

impl SolarPosition {
    /// Builds a `SolarPosition` from an elevation and an azimuth,
    /// filling the zenith accordingly.
    pub fn from_angles(elevation: Float, azimuth: Float) -> Self {
        Self {
            elevation,
            azimuth: normalize_azimuth(azimuth),
            zenith: 90. - elevation,
            ..Self::default()
        }
    }

    /// Checks whether the sun is above the horizon.
    pub fn is_above_horizon(&self) -> bool {
        self.elevation > 0.0
    }
}

/// Solar declination, in degrees, for a certain day of the year (Cooper's equation)
pub fn declination(day_of_year: u16) -> Float {
    let day = day_of_year as Float;
    23.45 * (360. * (284. + day) / 365.).to_radians().sin()
}

/// Hour angle, in degrees, for a certain hour of the (solar) day
pub fn hour_angle(hour: Float) -> Float {
    15. * (hour - 12.)
}

/// Wraps an angle in degrees into `[0, 360)`
pub fn normalize_azimuth(azimuth: Float) -> Float {
    let ret = azimuth.rem_euclid(360.);
    // rem_euclid can return exactly 360 because of rounding of tiny negatives
    if ret >= 360. {
        0.0
    } else {
        ret
    }
}

/// The absolute difference between two compass bearings, wrapped
/// so that it is never larger than 180 degrees.
pub fn azimuth_difference(a: Float, b: Float) -> Float {
    let d = (a - b).rem_euclid(360.);
    if d > 180. {
        360. - d
    } else {
        d
    }
}

/// Calculates the position of the sun.
///
/// * `latitude` and `longitude` are in degrees (North and East are positive)
/// * `day_of_year` goes from 1 to 366
/// * `hour` is the local solar time, from 0 to 23
///
/// No timezone nor longitude correction is applied: the hour is treated as
/// solar time. The `longitude` is accepted so that callers do not need to
/// change once such a correction is added.
///
/// The elevation is negative when the sun is below the horizon; callers must
/// check this before using the position for irradiance calculations.
pub fn solar_position(
    latitude: Float,
    _longitude: Float,
    day_of_year: u16,
    hour: Float,
) -> SolarPosition {
    let declination = declination(day_of_year);
    let hour_angle = hour_angle(hour);

    let lat = latitude.to_radians();
    let dec = declination.to_radians();
    let ha = hour_angle.to_radians();

    let sin_elevation = lat.sin() * dec.sin() + lat.cos() * dec.cos() * ha.cos();
    let elevation = sin_elevation.clamp(-1., 1.).asin().to_degrees();

    // Measured from the South... then shifted so that North is 0
    let azimuth = ha
        .sin()
        .atan2(ha.cos() * lat.sin() - dec.tan() * lat.cos())
        .to_degrees()
        + 180.;

    SolarPosition {
        elevation,
        azimuth: normalize_azimuth(azimuth),
        zenith: 90. - elevation,
        declination,
        hour_angle,
    }
}

#[cfg(test)]
mod testing {
    use super::*;
    use validate::assert_close;

    #[test]
    fn test_declination_solstices() {
        // Close to +23.45 by mid June, and to -23.45 by mid December.
        assert!((declination(172) - 23.45).abs() < 0.1);
        assert!((declination(355) + 23.45).abs() < 0.1);
        // Equinox
        assert!(declination(81).abs() < 0.5);
    }

    #[test]
    fn test_noon_is_south_in_north_hemisphere() {
        let pos = solar_position(52.5, 13.4, 172, 12.);
        assert_close!(pos.azimuth, 180., 1e-6);
        // 90 - latitude + declination
        assert!((pos.elevation - (90. - 52.5 + declination(172))).abs() < 1e-6);
    }

    #[test]
    fn test_noon_is_north_in_south_hemisphere() {
        let pos = solar_position(-41.3, 174.78, 172, 12.);
        assert!(pos.azimuth < 1e-6 || pos.azimuth > 360. - 1e-6);
        assert!(pos.is_above_horizon());
    }

    #[test]
    fn test_morning_and_afternoon() {
        let morning = solar_position(40., 0., 100, 9.);
        let afternoon = solar_position(40., 0., 100, 15.);
        assert!(morning.azimuth > 90. && morning.azimuth < 180.);
        assert!(afternoon.azimuth > 180. && afternoon.azimuth < 270.);
        // symmetric around noon
        assert!((morning.elevation - afternoon.elevation).abs() < 1e-9);
    }

    #[test]
    fn test_midnight_below_horizon() {
        let pos = solar_position(52.5, 13.4, 15, 0.);
        assert!(!pos.is_above_horizon());
        assert!(pos.elevation < 0.0);
    }

    #[test]
    fn test_zenith_identity_and_azimuth_range() {
        for lat in [-89., -60., -33.4, 0., 12.5, 41.28, 52.5, 78., 90.] {
            for day in [1, 45, 80, 172, 200, 266, 355, 366] {
                for hour in 0..24 {
                    let pos = solar_position(lat, 0., day, hour as Float);
                    assert_eq!(pos.zenith, 90. - pos.elevation);
                    assert!(
                        (0. ..360.).contains(&pos.azimuth),
                        "azimuth {} out of range",
                        pos.azimuth
                    );
                    assert!(pos.elevation >= -90. && pos.elevation <= 90.);
                }
            }
        }
    }

    #[test]
    fn test_azimuth_difference() {
        assert_close!(azimuth_difference(10., 350.), 20., 1e-9);
        assert_close!(azimuth_difference(350., 10.), 20., 1e-9);
        assert_close!(azimuth_difference(0., 180.), 180., 1e-9);
        assert_close!(azimuth_difference(90., 270.), 180., 1e-9);
        assert!(azimuth_difference(123., 123.).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_azimuth() {
        assert_close!(normalize_azimuth(-90.), 270., 1e-9);
        assert_close!(normalize_azimuth(540.), 180., 1e-9);
        assert!(normalize_azimuth(360.).abs() < 1e-12);
    }
}
