use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("(l,b) coordinates have not been defined correctly: b in [{b_first}, {b_last}], l in [{l_last}, {l_first}]")]
    CoordinateRange {
        b_first: f64,
        b_last: f64,
        l_first: f64,
        l_last: f64,
    },
    #[error("grid spacing must be positive and finite, got {0}")]
    NonPositiveSpacing(f64),
    #[error("input grid has no cells")]
    EmptyGrid,
    #[error("embedding grid is degenerate ({nb} latitude x {nl} longitude knots)")]
    DegenerateDomain { nb: usize, nl: usize },
    #[error("invalid nside {0}")]
    InvalidResolution(usize),
    #[error("array shape mismatch: {0}")]
    Shape(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("fits error: {0}")]
    Fits(String),
    #[error("grid spacing {0} needs more than {1} embedding cells")]
    GridTooLarge(f64, f64),
}

pub type Result<T> = std::result::Result<T, Error>;
