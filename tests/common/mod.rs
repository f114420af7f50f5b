//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use tmdb_api::xml::{Element, XmlSource, parse_document};
use tmdb_api::{MovieDb, MovieDbBuilder, Result, TmdbError};

pub const API_KEY: &str = "c27cb71cff5bd76e1a7a009380562c62";

/// Serves XML files from `tests/fixtures/` for known request URLs.
#[derive(Clone, Default)]
pub struct FixtureSource {
    routes: Vec<(String, String)>,
    requested: Rc<RefCell<Vec<String>>>,
}

impl FixtureSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `<base>/<method>/en/xml/<key>/<query>` with a fixture file.
    pub fn route(mut self, method: &str, query: &str, fixture: &str) -> Self {
        self.routes
            .push((format!("/{method}/en/xml/{API_KEY}/{query}"), fixture.to_string()));
        self
    }

    /// The standard set of Avatar and Brad Pitt responses.
    pub fn standard() -> Self {
        Self::new()
            .route("Movie.search", "Avatar", "movie_search_avatar.xml")
            .route("Movie.search", "zzzxxyy", "nothing_found.xml")
            .route("Movie.getInfo", "19995", "movie_info_19995.xml")
            .route("Movie.getInfo", "76600", "movie_info_76600.xml")
            .route("Movie.getInfo", "111332", "movie_info_111332.xml")
            .route("Movie.getInfo", "404040", "nothing_found.xml")
            .route("Movie.imdbLookup", "tt0499549", "movie_imdb_0499549.xml")
            .route("Movie.imdbLookup", "tt0000000", "nothing_found.xml")
            .route("Movie.imdbLookup", "tt9999999", "movie_imdb_no_id.xml")
            .route("Movie.getImages", "19995", "movie_images_19995.xml")
            .route("Movie.getImages", "404040", "nothing_found.xml")
            .route("Hash.getInfo", "907172e7fe51ba57", "movie_info_19995.xml")
            .route("Person.search", "Brad+Pitt", "person_search_brad_pitt.xml")
            .route("Person.search", "Nobody+Atall", "people_nothing_found.xml")
            .route("Person.getInfo", "287", "person_info_287.xml")
            .route("Person.getInfo", "404040", "people_nothing_found.xml")
    }

    /// Every URL requested so far, in order.
    pub fn requested(&self) -> Rc<RefCell<Vec<String>>> {
        Rc::clone(&self.requested)
    }
}

impl XmlSource for FixtureSource {
    fn fetch(&self, url: &str) -> Result<Element> {
        self.requested.borrow_mut().push(url.to_string());

        let (_, fixture) = self
            .routes
            .iter()
            .find(|(suffix, _)| url.ends_with(suffix.as_str()))
            .ok_or_else(|| TmdbError::Network(format!("HTTP 404 Not Found: {url}")))?;

        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join(fixture);
        let bytes = std::fs::read(path)?;

        parse_document(&tmdb_api::text::normalize(&bytes))
    }
}

/// A builder preconfigured with the test key and the given fixtures.
pub fn builder(source: FixtureSource) -> MovieDbBuilder {
    MovieDb::builder().api_key(API_KEY).source(source)
}
