//! Transverse Mercator on an ellipsoid, using Snyder's series expansions.

use foundation::math::Ellipsoid;

pub const UTM_SCALE_FACTOR: f64 = 0.9996;
pub const UTM_FALSE_EASTING: f64 = 500_000.0;
pub const UTM_FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

#[derive(Debug, Copy, Clone)]
pub struct TransverseMercator {
    a: f64,
    e2: f64,
    ep2: f64,
    k0: f64,
    central_meridian: f64,
    false_easting: f64,
    false_northing: f64,
}

impl TransverseMercator {
    /// Projection for one UTM zone on `ellipsoid`.
    pub fn utm(ellipsoid: &Ellipsoid, central_meridian_deg: f64, south: bool) -> Self {
        let e2 = ellipsoid.eccentricity_squared;
        Self {
            a: ellipsoid.equatorial_radius,
            e2,
            ep2: e2 / (1.0 - e2),
            k0: UTM_SCALE_FACTOR,
            central_meridian: central_meridian_deg.to_radians(),
            false_easting: UTM_FALSE_EASTING,
            false_northing: if south { UTM_FALSE_NORTHING_SOUTH } else { 0.0 },
        }
    }

    /// Distance along the meridian from the equator to `phi`.
    fn meridian_arc(&self, phi: f64) -> f64 {
        let e2 = self.e2;
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        self.a
            * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
                - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
                + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
                - (35.0 * e6 / 3072.0) * (6.0 * phi).sin())
    }

    /// `(easting, northing)` in meters.
    pub fn forward(&self, lat_rad: f64, lon_rad: f64) -> (f64, f64) {
        let (sin_phi, cos_phi) = lat_rad.sin_cos();
        let tan_phi = lat_rad.tan();
        let n = self.a / (1.0 - self.e2 * sin_phi * sin_phi).sqrt();
        let t = tan_phi * tan_phi;
        let c = self.ep2 * cos_phi * cos_phi;
        let a = (lon_rad - self.central_meridian) * cos_phi;
        let a2 = a * a;
        let a3 = a2 * a;
        let a4 = a3 * a;
        let a5 = a4 * a;
        let a6 = a5 * a;

        let x = self.k0
            * n
            * (a + (1.0 - t + c) * a3 / 6.0
                + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * self.ep2) * a5 / 120.0);
        let y = self.k0
            * (self.meridian_arc(lat_rad)
                + n * tan_phi
                    * (a2 / 2.0
                        + (5.0 - t + 9.0 * c + 4.0 * c * c) * a4 / 24.0
                        + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * self.ep2) * a6 / 720.0));

        (x + self.false_easting, y + self.false_northing)
    }

    /// `(lat, lon)` in radians. Longitude is continuous around the central
    /// meridian and may exceed ±π near the antimeridian.
    pub fn inverse(&self, easting: f64, northing: f64) -> (f64, f64) {
        let e2 = self.e2;
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        let x = easting - self.false_easting;
        let m = (northing - self.false_northing) / self.k0;
        let mu = m / (self.a * (1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0));
        let root = (1.0 - e2).sqrt();
        let e1 = (1.0 - root) / (1.0 + root);
        let e1_2 = e1 * e1;
        let e1_3 = e1_2 * e1;
        let e1_4 = e1_3 * e1;

        // Footpoint latitude.
        let phi1 = mu
            + (3.0 * e1 / 2.0 - 27.0 * e1_3 / 32.0) * (2.0 * mu).sin()
            + (21.0 * e1_2 / 16.0 - 55.0 * e1_4 / 32.0) * (4.0 * mu).sin()
            + (151.0 * e1_3 / 96.0) * (6.0 * mu).sin()
            + (1097.0 * e1_4 / 512.0) * (8.0 * mu).sin();

        let (sin1, cos1) = phi1.sin_cos();
        let tan1 = phi1.tan();
        let c1 = self.ep2 * cos1 * cos1;
        let t1 = tan1 * tan1;
        let w = 1.0 - e2 * sin1 * sin1;
        let n1 = self.a / w.sqrt();
        let r1 = self.a * (1.0 - e2) / (w * w.sqrt());
        let d = x / (n1 * self.k0);
        let d2 = d * d;
        let d3 = d2 * d;
        let d4 = d3 * d;
        let d5 = d4 * d;
        let d6 = d5 * d;

        let lat = phi1
            - (n1 * tan1 / r1)
                * (d2 / 2.0
                    - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * self.ep2) * d4 / 24.0
                    + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1
                        - 252.0 * self.ep2
                        - 3.0 * c1 * c1)
                        * d6
                        / 720.0);
        let lon = self.central_meridian
            + (d - (1.0 + 2.0 * t1 + c1) * d3 / 6.0
                + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * self.ep2 + 24.0 * t1 * t1)
                    * d5
                    / 120.0)
                / cos1;
        (lat, lon)
    }
}

#[cfg(test)]
mod tests {
    use super::TransverseMercator;
    use foundation::math::Ellipsoid;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn central_meridian_northing_is_scaled_arc() {
        let tm = TransverseMercator::utm(&Ellipsoid::WGS84, 3.0, false);
        let (e, n) = tm.forward(1.0_f64.to_radians(), 3.0_f64.to_radians());
        assert_close(e, 500_000.0, 1e-9);
        // One degree of meridian at the equator is 110 574.389 m.
        assert_close(n, 110_574.389 * 0.9996, 0.01);
    }

    #[test]
    fn south_zone_adds_false_northing() {
        let tm = TransverseMercator::utm(&Ellipsoid::WGS84, 3.0, true);
        let (_, n) = tm.forward(0.0, 3.0_f64.to_radians());
        assert_eq!(n, 10_000_000.0);
    }

    #[test]
    fn inverse_undoes_forward() {
        let tm = TransverseMercator::utm(&Ellipsoid::WGS84, 9.0, false);
        for (lat, lon) in [(60.0_f64, 7.0_f64), (47.5, 8.25), (56.0, 3.0), (83.9, 11.5)] {
            let (e, n) = tm.forward(lat.to_radians(), lon.to_radians());
            let (lat2, lon2) = tm.inverse(e, n);
            assert_close(lat2.to_degrees(), lat, 1e-6);
            assert_close(lon2.to_degrees(), lon, 1e-6);
        }
    }
}
