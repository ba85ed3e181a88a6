use num_traits::float::FloatConst;
use scorus::coordinates::SphCoord;
use scorus::healpix::pix::pix2ang_ring;
use scorus::healpix::utils::nside2npix;

use crate::error::{Error, Result};

/// An equal-area sphere tessellation that a grid can be resampled onto.
pub trait Pixelization {
    fn npix(&self) -> usize;

    /// Center of pixel `ipix`: `pol` is the colatitude, `az` the longitude,
    /// both in radians.
    fn pix2ang(&self, ipix: usize) -> SphCoord<f64>;

    /// Solid angle of one pixel in steradians.
    fn pixel_area(&self) -> f64;
}

/// HEALPix in RING ordering.
#[derive(Debug, Clone, Copy)]
pub struct RingHealpix {
    nside: usize,
    npix: usize,
}

impl RingHealpix {
    pub fn new(nside: usize) -> Result<RingHealpix> {
        if nside == 0 {
            return Err(Error::InvalidResolution(nside));
        }
        Ok(RingHealpix {
            nside,
            npix: nside2npix(nside),
        })
    }

    pub fn nside(&self) -> usize {
        self.nside
    }
}

impl Pixelization for RingHealpix {
    fn npix(&self) -> usize {
        self.npix
    }

    fn pix2ang(&self, ipix: usize) -> SphCoord<f64> {
        pix2ang_ring::<f64>(self.nside, ipix)
    }

    fn pixel_area(&self) -> f64 {
        4.0 * f64::PI() / self.npix as f64
    }
}
