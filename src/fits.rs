use std::path::Path;

use fitsimg::fitsio::hdu::HduInfo;
use fitsimg::fitsio::FitsFile;
use fitsimg::write_img;
use healpix_fits::write_map;
use log::debug;
use ndarray::{Array2, ArrayView2};

use crate::error::{Error, Result};

fn fits_err<E: std::fmt::Display>(e: E) -> Error {
    Error::Fits(e.to_string())
}

/// Reads a 2D image from the primary HDU: rows along b, columns along l.
pub fn load_grid<P: AsRef<Path>>(name: P) -> Result<Array2<f64>> {
    let name = name.as_ref();
    // surfaces a missing/unreadable file as an io error
    std::fs::metadata(name)?;
    let mut fptr = FitsFile::open(name).map_err(fits_err)?;
    let hdu = fptr.hdu(0).map_err(fits_err)?;
    let shape = match &hdu.info {
        HduInfo::ImageInfo { shape, .. } => shape.clone(),
        _ => return Err(Error::Shape("primary hdu is not an image".to_string())),
    };
    if shape.len() != 2 {
        return Err(Error::Shape(format!("expected a 2D image, got shape {:?}", shape)));
    }
    let data: Vec<f64> = hdu.read_image(&mut fptr).map_err(fits_err)?;
    debug!("read {} x {} grid from {}", shape[0], shape[1], name.display());
    Array2::from_shape_vec((shape[0], shape[1]), data).map_err(|e| Error::Shape(e.to_string()))
}

/// Writes a 2D array (e.g. the embedding density) as a FITS image.
pub fn dump_grid<P: AsRef<Path>>(grid: ArrayView2<f64>, name: P) -> Result<()> {
    let name = name.as_ref();
    remove_stale(name)?;
    write_img(name.to_string_lossy().into_owned(), &grid.to_owned().into_dyn()).map_err(fits_err)
}

/// Writes a RING ordered HEALPix map, overwriting `name`.
pub fn dump_healpix_map<P: AsRef<Path>>(data: &[f64], name: P) -> Result<()> {
    let name = name.as_ref();
    remove_stale(name)?;
    write_map(&name.to_string_lossy(), &[data], false, true);
    debug!("wrote {} pixels to {}", data.len(), name.display());
    Ok(())
}

fn remove_stale(name: &Path) -> Result<()> {
    match std::fs::remove_file(name) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(Error::Io(e)),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("grid2healpix-{}-{}", std::process::id(), name))
    }

    #[test]
    fn grid_image_round_trip() {
        let g = Array2::from_shape_fn((3, 5), |(r, c)| r as f64 * 10.0 + c as f64 - 2.5);
        let name = tmp("grid.fits");
        dump_grid(g.view(), &name).unwrap();
        let back = load_grid(&name).unwrap();
        assert_eq!(back, g);
        // a second dump replaces the file
        dump_grid(g.t(), &name).unwrap();
        assert_eq!(load_grid(&name).unwrap(), g.t());
        std::fs::remove_file(&name).unwrap();
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            load_grid(tmp("does-not-exist.fits")),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn healpix_map_is_written() {
        let name = tmp("map.fits");
        let data: Vec<f64> = (0..12).map(|i| i as f64).collect();
        dump_healpix_map(&data, &name).unwrap();
        let mut fptr = FitsFile::open(&name).unwrap();
        let hdu = fptr.hdu(1).unwrap();
        assert!(matches!(hdu.info, HduInfo::TableInfo { .. }));
        dump_healpix_map(&data, &name).unwrap();
        std::fs::remove_file(&name).unwrap();
    }
}
