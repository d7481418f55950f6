use thiserror::Error;

#[derive(Error, Debug)]
pub enum HexSiteError {
    #[error("missing required parameter '{0}'")]
    Builder(&'static str),

    #[error("invalid site radius {0} m")]
    Radius(f64),

    #[error("site geometry must be produced in a projected CRS, got {0}")]
    Unprojected(crate::Crs),
}
