//! tmdb_api - Simple-to-use interface to themoviedb.org's v2.1 XML API
//!
//! This library searches TMDB for movies and people, assembles the returned
//! XML into records, and can remap movie details into the field names MythTV
//! expects. A trailer feed adapter and a standalone multipart/form-data
//! encoder round it off.
//!
//! # Examples
//!
//! ```no_run
//! use tmdb_api::{MovieDb, Selection};
//!
//! let tmdb = MovieDb::builder()
//!     .api_key("your-api-key")
//!     .selection(Selection::First)
//!     .build()
//!     .unwrap();
//!
//! let matches = tmdb.search_title("Avatar", None).unwrap();
//! println!("{:?}", matches[0].name);
//! ```

mod client;
mod details;
mod extract;
pub mod multipart;
mod record;
mod select;
pub mod text;
mod videos;
pub mod xml;

use thiserror::Error;

// Re-export the client surface
pub use client::{MovieDb, MovieDbBuilder, MovieDbConfig, UrlTemplates};

// Re-export record types
pub use record::{
    FilmographyEntry, ImageRef, ImageSizeSet, Movie, MovieRecord, Person, RemappedMovie,
};

// Re-export extractors and assembly for callers holding their own XML
pub use details::{movie_from_element, person_from_element, remap_movie};
pub use extract::{
    extract_comma_list, extract_countries, extract_image_sizes, extract_people_by_role,
};

pub use select::{CallbackSelector, Candidate, ConsoleSelector, FirstSelector, Selection, Selector};
pub use videos::{VideoChannel, VideoFeed, VideoFeedSearch, VideoItem};
pub use xml::{Element, HttpXmlFetcher, XmlSource};

/// Top-level error type for all TMDB operations
#[derive(Debug, Error)]
pub enum TmdbError {
    /// Connecting to or receiving from themoviedb.org failed
    #[error("A connection error to themoviedb.org was raised: {0}")]
    Network(String),

    /// The response body was not well-formed XML
    #[error("Invalid XML was received from themoviedb.org: {0}")]
    Parse(String),

    /// The service returned no matching movie or person
    #[error("{0}")]
    NotFound(String),

    /// The selection strategy declined to pick a candidate
    #[error("A user interface input error was raised: {0}")]
    UiAbort(String),

    /// Catch-all for misuse, e.g. a selector returning an invalid index
    #[error("A user interface error was raised: {0}")]
    Base(String),

    /// No API key was configured
    #[error("A TMDB API key must be specified. See http://api.themoviedb.org/2.1/ to get your own API key")]
    MissingApiKey,

    /// Reading a file handle failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, TmdbError>;
