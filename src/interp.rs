use ndarray::{Array2, ArrayView1, ArrayView2, Axis};

use crate::error::{Error, Result};

/// Bilinear interpolant over a rectilinear grid.
///
/// `z` is indexed `[iy, ix]`. Either axis may be given in ascending or
/// descending order; it is stored ascending. Points outside the knots take
/// the value of the nearest edge.
#[derive(Debug, Clone)]
pub struct Interp2d {
    x: Vec<f64>,
    y: Vec<f64>,
    z: Array2<f64>,
}

fn monotonic(a: ArrayView1<f64>) -> Option<bool> {
    let inc = a.windows(2).into_iter().all(|w| w[1] > w[0]);
    let dec = a.windows(2).into_iter().all(|w| w[1] < w[0]);
    match (inc, dec) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

fn bracket(axis: &[f64], v: f64) -> (usize, f64) {
    let n = axis.len();
    let v = v.max(axis[0]).min(axis[n - 1]);
    let i = axis.partition_point(|&a| a <= v).saturating_sub(1).min(n - 2);
    let t = (v - axis[i]) / (axis[i + 1] - axis[i]);
    (i, t)
}

impl Interp2d {
    pub fn new(x: ArrayView1<f64>, y: ArrayView1<f64>, z: ArrayView2<f64>) -> Result<Interp2d> {
        if z.dim() != (y.len(), x.len()) {
            return Err(Error::Shape(format!(
                "z is {:?}, axes are {} (y) x {} (x)",
                z.dim(),
                y.len(),
                x.len()
            )));
        }
        if x.len() < 2 || y.len() < 2 {
            return Err(Error::Shape(format!(
                "need at least 2 knots per axis, got {} x {}",
                x.len(),
                y.len()
            )));
        }
        let x_inc = monotonic(x)
            .ok_or_else(|| Error::Shape("x axis is not strictly monotonic".to_string()))?;
        let y_inc = monotonic(y)
            .ok_or_else(|| Error::Shape("y axis is not strictly monotonic".to_string()))?;

        let mut x = x.to_owned();
        let mut y = y.to_owned();
        let mut z = z.to_owned();
        if !x_inc {
            x.invert_axis(Axis(0));
            z.invert_axis(Axis(1));
        }
        if !y_inc {
            y.invert_axis(Axis(0));
            z.invert_axis(Axis(0));
        }
        // invert_axis only flips strides
        let x = x.iter().cloned().collect();
        let y = y.iter().cloned().collect();
        let z = z.as_standard_layout().into_owned();
        Ok(Interp2d { x, y, z })
    }

    pub fn eval(&self, x: f64, y: f64) -> f64 {
        let (i, tx) = bracket(&self.x, x);
        let (j, ty) = bracket(&self.y, y);
        let z00 = self.z[(j, i)];
        let z01 = self.z[(j, i + 1)];
        let z10 = self.z[(j + 1, i)];
        let z11 = self.z[(j + 1, i + 1)];
        (1.0 - ty) * ((1.0 - tx) * z00 + tx * z01) + ty * ((1.0 - tx) * z10 + tx * z11)
    }

    pub fn x_range(&self) -> (f64, f64) {
        (self.x[0], self.x[self.x.len() - 1])
    }

    pub fn y_range(&self) -> (f64, f64) {
        (self.y[0], self.y[self.y.len() - 1])
    }
}
