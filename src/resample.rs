use std::time::Instant;

use log::debug;
use ndarray::ArrayView2;
use rayon::prelude::*;

use crate::error::Result;
use crate::gridder::SkyGrid;
use crate::interp::Interp2d;
use crate::pixelization::{Pixelization, RingHealpix};
use crate::utils::wrap_lon_deg;

/// A rectangular (b, l) grid turned into a continuous density on the sphere.
pub struct Resampler {
    grid: SkyGrid,
    interp: Interp2d,
}

impl Resampler {
    /// `cmap` holds per-pixel values with rows along b (ascending from the
    /// anchor) and columns along l (descending from the anchor).
    /// `anchor_bl` is the (b, l) of `cmap[[0, 0]]` in degrees.
    pub fn new(cmap: ArrayView2<f64>, anchor_bl: (f64, f64), spacing: f64) -> Result<Resampler> {
        let grid = SkyGrid::new(cmap, anchor_bl, spacing)?;
        let (lext, ext) = grid.periodic_extension();
        let interp = Interp2d::new(lext.view(), grid.bgrid(), ext.view())?;
        Ok(Resampler { grid, interp })
    }

    pub fn sky_grid(&self) -> &SkyGrid {
        &self.grid
    }

    /// Interpolant over (extended longitude, latitude), in the grid's own
    /// frame, without any longitude wrapping.
    pub fn interpolant(&self) -> &Interp2d {
        &self.interp
    }

    /// Density (per steradian) at longitude `l` and latitude `b`, degrees.
    /// `l` may be any finite angle; it is wrapped into [-180, 180) first.
    /// A non-finite `l` gives NaN.
    pub fn density_at(&self, l: f64, b: f64) -> f64 {
        if !l.is_finite() {
            return f64::NAN;
        }
        self.interp.eval(wrap_lon_deg(l), b)
    }

    fn pixel_density<P>(&self, pix: &P, ipix: usize) -> f64
    where
        P: Pixelization,
    {
        let ptr = pix.pix2ang(ipix);
        let l = wrap_lon_deg(ptr.az.to_degrees());
        let b = 90.0 - ptr.pol.to_degrees();
        // the latitude axis ascends with row index, so the map is read at -b
        self.interp.eval(l, -b)
    }

    /// Per-pixel values on every pixel of `pix`.
    pub fn to_healpix<P>(&self, pix: &P) -> Vec<f64>
    where
        P: Pixelization,
    {
        let area = pix.pixel_area();
        (0..pix.npix())
            .map(|i| self.pixel_density(pix, i) * area)
            .collect()
    }

    /// Same as [`Resampler::to_healpix`], with pixels spread over the rayon
    /// pool.
    pub fn to_healpix_par<P>(&self, pix: &P) -> Vec<f64>
    where
        P: Pixelization + Sync,
    {
        let area = pix.pixel_area();
        (0..pix.npix())
            .into_par_iter()
            .map(|i| self.pixel_density(pix, i) * area)
            .collect()
    }
}

/// Converts a (b, l) grid of per-pixel values into a RING ordered HEALPix map
/// of the given `nside`, in the same per-pixel units.
pub fn grid2healpix(
    cmap: ArrayView2<f64>,
    anchor_bl: (f64, f64),
    spacing: f64,
    nside: usize,
) -> Result<Vec<f64>> {
    let hp = RingHealpix::new(nside)?;
    let t0 = Instant::now();
    let r = Resampler::new(cmap, anchor_bl, spacing)?;
    let hmap = r.to_healpix(&hp);
    debug!("resampled onto nside {} ({} pixels) in {:?}", nside, hmap.len(), t0.elapsed());
    Ok(hmap)
}

/// Parallel [`grid2healpix`].
pub fn grid2healpix_par(
    cmap: ArrayView2<f64>,
    anchor_bl: (f64, f64),
    spacing: f64,
    nside: usize,
) -> Result<Vec<f64>> {
    let hp = RingHealpix::new(nside)?;
    let t0 = Instant::now();
    let r = Resampler::new(cmap, anchor_bl, spacing)?;
    let hmap = r.to_healpix_par(&hp);
    debug!(
        "resampled onto nside {} ({} pixels, parallel) in {:?}",
        nside,
        hmap.len(),
        t0.elapsed()
    );
    Ok(hmap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gridder::cell_solid_angle;
    use ndarray::Array2;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use scorus::coordinates::SphCoord;

    /// Pixels at arbitrary centres, each of unit area.
    struct Points(Vec<SphCoord<f64>>);

    impl Pixelization for Points {
        fn npix(&self) -> usize {
            self.0.len()
        }
        fn pix2ang(&self, ipix: usize) -> SphCoord<f64> {
            self.0[ipix]
        }
        fn pixel_area(&self) -> f64 {
            1.0
        }
    }

    fn at(b: f64, l: f64) -> SphCoord<f64> {
        SphCoord::new((90.0 - b).to_radians(), l.to_radians())
    }

    fn random_sky(seed: u64) -> Array2<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        Array2::from_shape_fn((36, 72), |_| rng.gen_range(0.0..10.0))
    }

    #[test]
    fn single_cell_lands_on_its_knot() {
        let cmap = Array2::from_elem((1, 1), 4.0);
        let r = Resampler::new(cmap.view(), (0.0, 0.0), 1.0).unwrap();
        assert_eq!(r.sky_grid().density().dim(), (181, 360));
        let knot = 4.0 / cell_solid_angle(0.0, 1.0);
        let out = r.to_healpix(&Points(vec![at(0.0, 0.0), at(0.0, 360.0), at(0.0, 3.0), at(30.0, 0.0)]));
        assert!((out[0] - knot).abs() < 1e-9 * knot);
        assert!((out[1] - knot).abs() < 1e-9 * knot);
        assert_eq!(out[2], 0.0);
        assert_eq!(out[3], 0.0);
        // half way to the next knot
        assert!((r.density_at(0.5, 0.0) - 0.5 * knot).abs() < 1e-9 * knot);
    }

    #[test]
    fn latitude_is_read_mirrored() {
        let cmap = Array2::from_elem((1, 1), 1.0);
        let r = Resampler::new(cmap.view(), (10.0, 0.0), 1.0).unwrap();
        let knot = 1.0 / cell_solid_angle(10.0, 1.0);
        let out = r.to_healpix(&Points(vec![at(-10.0, 0.0), at(10.0, 0.0)]));
        assert!((out[0] - knot).abs() < 1e-9 * knot);
        assert_eq!(out[1], 0.0);
        assert_eq!(r.density_at(0.0, 10.0), knot);
    }

    #[test]
    fn non_finite_longitude_is_nan() {
        let cmap = Array2::from_elem((1, 1), 1.0);
        let r = Resampler::new(cmap.view(), (0.0, 0.0), 1.0).unwrap();
        assert!(r.density_at(f64::INFINITY, 0.0).is_nan());
        assert!(r.density_at(f64::NEG_INFINITY, 0.0).is_nan());
        assert!(r.density_at(f64::NAN, 0.0).is_nan());
    }

    #[test]
    fn seam_is_continuous() {
        let cmap = random_sky(1);
        let r = Resampler::new(cmap.view(), (-87.5, 177.5), 5.0).unwrap();
        let f = r.interpolant();
        for i in 0..36 {
            let b = -87.5 + i as f64 * 5.0;
            let east = f.eval(180.0, b);
            let west = f.eval(-180.0, b);
            assert!((east - west).abs() <= 1e-12 * east.abs().max(1.0));
        }
        for &l in &[-179.0, -95.3, 0.0, 12.25, 179.9] {
            for &b in &[-60.0, 0.0, 33.3] {
                let a = r.density_at(l, b);
                let p = r.density_at(l + 360.0, b);
                let m = r.density_at(l - 360.0, b);
                assert!((a - p).abs() <= 1e-9 * a.abs().max(1.0));
                assert!((a - m).abs() <= 1e-9 * a.abs().max(1.0));
            }
        }
    }

    #[test]
    fn parallel_matches_sequential() {
        let cmap = random_sky(2);
        let r = Resampler::new(cmap.view(), (-87.5, 177.5), 5.0).unwrap();
        let hp = RingHealpix::new(8).unwrap();
        let a = r.to_healpix(&hp);
        let b = r.to_healpix(&hp);
        let c = r.to_healpix_par(&hp);
        assert_eq!(a, b);
        assert_eq!(a, c);
    }
}
