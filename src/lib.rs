pub mod error;
pub mod fits;
pub mod gridder;
pub mod interp;
pub mod pixelization;
pub mod resample;
pub mod utils;

pub use error::{Error, Result};
pub use resample::{grid2healpix, grid2healpix_par, Resampler};
