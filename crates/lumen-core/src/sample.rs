//! Intensity lookup at an arbitrary direction.
//!
//! A query direction is folded into the stored azimuthal span according to
//! the web's symmetry, then resolved by two linear interpolations: along θ
//! within the two bracketing horizontal planes, then along φ between them.

use std::f64::consts::TAU;

use ndarray::ArrayView1;

use crate::edf::{Edf, Orientation};
use crate::interp::interp_or_zero;
use crate::symmetry::fold;

impl Edf {
    /// Relative intensity towards azimuth `phi` and zenith `theta` (radians),
    /// with the luminaire untilted.
    pub fn sample(&self, phi: f64, theta: f64) -> f64 {
        self.sample_tilted(phi, theta, 0.0)
    }

    /// Relative intensity towards `(phi, theta)` with the luminaire tilted
    /// by `tilt` radians.
    ///
    /// Non-Type-C webs are not resolved angularly and return only the
    /// ballast and intensity multipliers.
    pub fn sample_tilted(&self, phi: f64, theta: f64, tilt: f64) -> f64 {
        let gain = self.ballast_multiplier * self.intensity_multiplier;
        if self.orientation != Orientation::YUpXLength {
            return gain;
        }

        let multiplier = match &self.tilt {
            Some(curve) => gain * curve.multiplier_at(tilt),
            None => gain,
        };

        let intensity = if self.horz_angles.len() == 1 {
            interp_or_zero(theta, &self.vert_angles, self.row(0))
        } else {
            self.between_planes(fold(phi, self.horz_symmetry), theta)
        };

        intensity * multiplier
    }

    /// Interpolate between the horizontal planes bracketing `phi`, which is
    /// already folded into the stored span.
    fn between_planes(&self, phi: f64, theta: f64) -> f64 {
        let angles = &self.horz_angles;
        let low = angles.partition_point(|&a| a <= phi).saturating_sub(1);

        let lo = interp_or_zero(theta, &self.vert_angles, self.row(low));
        if angles[low] == phi {
            return lo;
        }

        let high = (low + 1) % angles.len();
        let hi = interp_or_zero(theta, &self.vert_angles, self.row(high));

        // Past the last plane the bracket wraps around to the first one.
        let phi_high = if high > low {
            angles[high]
        } else {
            angles[high] + TAU
        };
        interp_or_zero(
            phi,
            &[angles[low], phi_high],
            ArrayView1::from(&[lo, hi][..]),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, PI};

    use approx::{assert_abs_diff_eq, assert_relative_eq};

    use crate::edf::tests::parts_with;
    use crate::edf::{Edf, PhotometricType};
    use crate::symmetry::HorizontalSymmetry;
    use crate::tilt::TiltCurve;

    fn cylindrical() -> Edf {
        let mut parts = parts_with(&[0.0], &[0.0, 90.0], |_, _| 0.0);
        parts.intensities = vec![vec![100.0, 50.0]];
        Edf::from_parts(parts).unwrap()
    }

    #[test]
    fn test_cylindrical_midpoint_and_domain() {
        let edf = cylindrical();
        for phi in [0.0, 1.0, 4.0, -2.0] {
            assert_eq!(edf.sample(phi, 0.0), 100.0);
            assert_relative_eq!(edf.sample(phi, PI / 4.0), 75.0, epsilon = 1e-12);
            assert_eq!(edf.sample(phi, PI), 0.0);
        }
    }

    #[test]
    fn test_grid_points_are_exact() {
        let horz = [0.0, 45.0, 90.0, 180.0, 270.0, 315.0, 360.0];
        let vert = [0.0, 30.0, 60.0, 90.0, 135.0, 180.0];
        let mut parts = parts_with(&horz, &vert, |h, v| 10.0 + h * 0.5 + v * 2.0);
        parts.ballast_multiplier = 0.9;
        parts.intensity_multiplier = 2.0;
        let edf = Edf::from_parts(parts).unwrap();
        assert_eq!(edf.horz_symmetry(), HorizontalSymmetry::None);

        // The last plane (360°) wraps to 0°, so only the others are probed.
        for (i, &phi) in edf.horz_angles()[..horz.len() - 1].iter().enumerate() {
            for (j, &theta) in edf.vert_angles().iter().enumerate() {
                let expected = edf.intensities()[[i, j]] * (0.9 * 2.0);
                assert_eq!(edf.sample(phi, theta), expected);
            }
        }
    }

    #[test]
    fn test_azimuth_interpolation_between_planes() {
        let parts = parts_with(&[0.0, 90.0, 180.0, 270.0, 360.0], &[0.0, 180.0], |h, _| h);
        let edf = Edf::from_parts(parts).unwrap();
        assert_relative_eq!(edf.sample(45f64.to_radians(), 0.3), 45.0, epsilon = 1e-9);
        assert_relative_eq!(edf.sample(300f64.to_radians(), 0.3), 300.0, epsilon = 1e-9);
    }

    #[test]
    fn test_wraparound_between_last_and_first_plane() {
        // 0..350 in 10° steps: queries in (350°, 360°) bracket [350°, 0°].
        let horz: Vec<f64> = (0..36).map(|i| i as f64 * 10.0).collect();
        let parts = parts_with(&horz, &[0.0, 180.0], |h, _| if h == 0.0 { 100.0 } else { 0.0 });
        let edf = Edf::from_parts(parts).unwrap();
        assert_relative_eq!(edf.sample(355f64.to_radians(), 1.0), 50.0, epsilon = 1e-9);
    }

    #[test]
    fn test_out_of_domain_theta_is_zero() {
        let mut parts = parts_with(&[0.0, 90.0, 180.0], &[10.0, 80.0], |_, _| 5.0);
        parts.ballast_multiplier = 3.0;
        let edf = Edf::from_parts(parts).unwrap();
        assert_eq!(edf.sample(0.3, 5f64.to_radians()), 0.0);
        assert_eq!(edf.sample(0.3, 85f64.to_radians()), 0.0);
        assert_relative_eq!(edf.sample(0.3, 45f64.to_radians()), 15.0, epsilon = 1e-12);
    }

    #[test]
    fn test_front_back_mirror_is_symmetric() {
        let parts = parts_with(&[0.0, 45.0, 90.0, 135.0, 180.0], &[0.0, 45.0, 90.0], |h, v| {
            1.0 + h + 0.1 * v
        });
        let edf = Edf::from_parts(parts).unwrap();
        assert_eq!(edf.horz_symmetry(), HorizontalSymmetry::FrontBack);

        for phi_deg in [5.0_f64, 60.0, 100.0, 170.0] {
            for theta_deg in [0.0_f64, 20.0, 77.0] {
                let phi = phi_deg.to_radians();
                let theta = theta_deg.to_radians();
                assert_abs_diff_eq!(
                    edf.sample(phi, theta),
                    edf.sample(2.0 * PI - phi, theta),
                    epsilon = 1e-9
                );
            }
        }
    }

    #[test]
    fn test_four_way_second_quadrant_regression() {
        let parts = parts_with(&[0.0, 30.0, 60.0, 90.0], &[0.0, 90.0], |h, _| 100.0 + h);
        let edf = Edf::from_parts(parts).unwrap();
        assert_eq!(edf.horz_symmetry(), HorizontalSymmetry::FourWay);

        // First and third quadrants resolve onto the stored web.
        assert_relative_eq!(edf.sample(45f64.to_radians(), 0.0), 145.0, epsilon = 1e-9);
        assert_relative_eq!(edf.sample(225f64.to_radians(), 0.0), 145.0, epsilon = 1e-9);
        // The second quadrant folds below 0° and samples as dark.
        assert_eq!(edf.sample(120f64.to_radians(), 0.0), 0.0);
        assert_eq!(edf.sample(300f64.to_radians(), 0.0), 0.0);
        // The quadrant boundary itself stays on the web.
        assert_relative_eq!(edf.sample(FRAC_PI_2, 0.0), 190.0, epsilon = 1e-9);
    }

    #[test]
    fn test_tilt_scales_and_clips() {
        let mut parts = parts_with(&[0.0], &[0.0, 90.0], |_, _| 10.0);
        parts.tilt = Some(TiltCurve::from_degrees(&[0.0, 90.0], vec![1.0, 0.5]).unwrap());
        let edf = Edf::from_parts(parts).unwrap();
        assert_eq!(edf.sample(0.0, 0.0), 10.0);
        assert_relative_eq!(
            edf.sample_tilted(0.0, 0.0, 45f64.to_radians()),
            7.5,
            epsilon = 1e-12
        );
        assert_eq!(edf.sample_tilted(0.0, 0.0, PI), 0.0);
    }

    #[test]
    fn test_unsupported_orientation_returns_gain() {
        let mut parts = parts_with(&[0.0, 90.0], &[0.0, 90.0], |_, _| 10.0);
        parts.header.photometric_type = PhotometricType::A;
        parts.ballast_multiplier = 0.5;
        parts.intensity_multiplier = 4.0;
        let edf = Edf::from_parts(parts).unwrap();
        assert_eq!(edf.sample(0.2, 0.4), 2.0);
        assert_eq!(edf.sample(3.0, 3.0), 2.0);
    }

    #[test]
    fn test_sampling_is_pure() {
        let parts = parts_with(&[0.0, 90.0, 180.0, 270.0, 360.0], &[0.0, 90.0, 180.0], |h, v| h + v);
        let edf = Edf::from_parts(parts).unwrap();
        for &(phi, theta) in &[(0.1, 0.2), (2.0, 1.0), (6.0, 3.0)] {
            assert_eq!(edf.sample(phi, theta).to_bits(), edf.sample(phi, theta).to_bits());
        }
    }
}
