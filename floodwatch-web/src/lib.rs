//! Static-page acquisition for Floodwatch.
//!
//! One job: fetch the flood-prone-city article and pull the city names out
//! of its `<h2>` headings. Extraction is a lightweight scanner, not a full
//! HTML parser; the source page is static and shallow.

pub mod cities;

pub use cities::CityListSource;

#[derive(thiserror::Error, Debug)]
pub enum WebError {
    #[error("http error: {0}")]
    Http(#[from] floodwatch_http::HttpError),
}
