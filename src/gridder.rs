use log::{debug, warn};
use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2};

use crate::error::{Error, Result};

/// Upper bound on the number of embedding cells.
pub const MAX_CELLS: f64 = 268_435_456.0;

/// Solid angle (sr) of a `spacing` x `spacing` degree cell centred on
/// latitude `b`. At the poles the cosine is taken `spacing/10` towards the
/// equator so it never vanishes.
pub fn cell_solid_angle(b: f64, spacing: f64) -> f64 {
    let b_eff = if b.abs() == 90.0 {
        b - b.signum() * spacing / 10.0
    } else {
        b
    };
    spacing.to_radians().powi(2) * b_eff.to_radians().cos()
}

/// Checks that the axes implied by the anchor lie inside b in [-90, 90] and
/// l in (-180, 180].
pub fn check_coordinates(
    anchor_bl: (f64, f64),
    spacing: f64,
    nrows: usize,
    ncols: usize,
) -> Result<()> {
    if !(spacing.is_finite() && spacing > 0.0) {
        return Err(Error::NonPositiveSpacing(spacing));
    }
    if nrows == 0 || ncols == 0 {
        return Err(Error::EmptyGrid);
    }
    let (b0, l0) = anchor_bl;
    let b_first = b0;
    let b_last = b0 + (nrows - 1) as f64 * spacing;
    let l_first = l0;
    let l_last = l0 - (ncols - 1) as f64 * spacing;
    if l_first <= 180.0 && l_last > -180.0 && b_first >= -90.0 && b_last <= 90.0 {
        Ok(())
    } else {
        Err(Error::CoordinateRange {
            b_first,
            b_last,
            l_first,
            l_last,
        })
    }
}

/// A grid covering the whole sphere at the spacing of an input grid, holding
/// the input values as densities (per steradian).
///
/// Latitude knots are `b0 + k*spacing` (ascending), longitude knots
/// `l0 - j*spacing` (descending), where `(b0, l0)` is the anchor of the input
/// grid. Input cell `(r, c)` therefore sits at `k = r, j = c`, and its place in
/// the embedding is found by index arithmetic rather than by comparing
/// coordinates.
#[derive(Debug, Clone)]
pub struct SkyGrid {
    anchor_bl: (f64, f64),
    spacing: f64,
    row_offset: isize,
    col_offset: isize,
    bgrid: Array1<f64>,
    lgrid: Array1<f64>,
    density: Array2<f64>,
}

impl SkyGrid {
    /// Embeds `cmap` (per-pixel values, rows along b, columns along l) whose
    /// `[0, 0]` element sits at `anchor_bl = (b, l)` degrees.
    pub fn new(cmap: ArrayView2<f64>, anchor_bl: (f64, f64), spacing: f64) -> Result<SkyGrid> {
        let (nrows, ncols) = cmap.dim();
        check_coordinates(anchor_bl, spacing, nrows, ncols)?;
        let (b0, l0) = anchor_bl;
        let cells = (180.0 / spacing + 1.0) * (360.0 / spacing);
        if !(cells <= MAX_CELLS) {
            return Err(Error::GridTooLarge(spacing, MAX_CELLS));
        }

        // Oversized candidate ranges on both sides of the anchor, then cut
        // down to the sphere.
        let nb = (180.0 / spacing).round() as isize;
        let nl = (360.0 / spacing).round() as isize;
        let ks: Vec<isize> = (1 - nb..=nb)
            .filter(|&k| {
                let b = b0 + k as f64 * spacing;
                b >= -90.0 && b <= 90.0
            })
            .collect();
        let js: Vec<isize> = (1 - nl..=nl)
            .filter(|&j| {
                let l = l0 - j as f64 * spacing;
                l > -180.0 && l <= 180.0
            })
            .collect();
        if ks.len() < 2 || js.len() < 2 {
            return Err(Error::DegenerateDomain {
                nb: ks.len(),
                nl: js.len(),
            });
        }

        let bgrid: Array1<f64> = ks.iter().map(|&k| b0 + k as f64 * spacing).collect();
        let lgrid: Array1<f64> = js.iter().map(|&j| l0 - j as f64 * spacing).collect();
        debug!(
            "embedding grid: {} x {} knots, b in [{}, {}], l in [{}, {}]",
            bgrid.len(),
            lgrid.len(),
            bgrid[0],
            bgrid[bgrid.len() - 1],
            lgrid[lgrid.len() - 1],
            lgrid[0]
        );

        let mut grid = SkyGrid {
            anchor_bl,
            spacing,
            row_offset: ks[0],
            col_offset: js[0],
            density: Array2::zeros((bgrid.len(), lgrid.len())),
            bgrid,
            lgrid,
        };

        let mut dropped = 0_usize;
        for ((r, c), &v) in cmap.indexed_iter() {
            match grid.grid_index(r, c) {
                Some((i, j)) => {
                    grid.density[(i, j)] = v / cell_solid_angle(grid.bgrid[i], spacing);
                }
                None => dropped += 1,
            }
        }
        if dropped > 0 {
            warn!("{} input cells fall outside the embedding grid and were ignored", dropped);
        }
        Ok(grid)
    }

    /// Position of input cell `(row, col)` in the embedding grid.
    pub fn grid_index(&self, row: usize, col: usize) -> Option<(usize, usize)> {
        let i = row as isize - self.row_offset;
        let j = col as isize - self.col_offset;
        if i >= 0 && j >= 0 && (i as usize) < self.bgrid.len() && (j as usize) < self.lgrid.len() {
            Some((i as usize, j as usize))
        } else {
            None
        }
    }

    pub fn bgrid(&self) -> ArrayView1<f64> {
        self.bgrid.view()
    }

    pub fn lgrid(&self) -> ArrayView1<f64> {
        self.lgrid.view()
    }

    pub fn density(&self) -> ArrayView2<f64> {
        self.density.view()
    }

    /// Density grid with one extra longitude column on each side: the last
    /// column copied before the first and the first after the last. The
    /// returned axis continues the descending longitude knots by one spacing
    /// at each end, so the seam at +-180 is interpolated across.
    pub fn periodic_extension(&self) -> (Array1<f64>, Array2<f64>) {
        let (nb, nl) = self.density.dim();
        let l0 = self.anchor_bl.1;
        let lext: Array1<f64> = (0..nl + 2)
            .map(|j| l0 - (self.col_offset + j as isize - 1) as f64 * self.spacing)
            .collect();
        let mut ext = Array2::zeros((nb, nl + 2));
        ext.slice_mut(s![.., 1..nl + 1]).assign(&self.density);
        ext.column_mut(0).assign(&self.density.column(nl - 1));
        ext.column_mut(nl + 1).assign(&self.density.column(0));
        (lext, ext)
    }
}
