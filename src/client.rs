//! The themoviedb.org client
//!
//! [`MovieDb`] builds the v2.1 API URLs, fetches the XML through an
//! [`XmlSource`] and assembles the records. Configuration comes either from a
//! [`MovieDbConfig`] (deserializable, so hosts can keep it in their own config
//! files) or through the [`MovieDbBuilder`] setters.

use crate::details::{
    image_groups, movie_from_element, person_from_element, person_summary_from_element,
    remap_movie,
};
use crate::record::{Movie, MovieRecord, Person};
use crate::select::{Candidate, Selection, choose};
use crate::xml::{Element, HttpXmlFetcher, XmlSource};
use crate::{Result, TmdbError};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Default base URL of the v2.1 API.
const DEFAULT_BASE_URL: &str = "http://api.themoviedb.org/2.1";

/// Default response language.
const DEFAULT_LANGUAGE: &str = "en";

/// Image extensions kept when no allow-list is configured.
const DEFAULT_IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "bmp"];

/// Client settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MovieDbConfig {
    /// TMDB API key (required)
    pub api_key: Option<String>,
    /// Response language, e.g. `en` or `de`
    pub language: String,
    /// API base URL without a trailing slash
    pub base_url: String,
    /// Return movie details remapped to MythTV field names
    pub remapped: bool,
    /// Log every request URL at info level instead of debug
    pub debug: bool,
    /// Acceptable image file extensions, compared case-insensitively
    pub image_extensions: Vec<String>,
}

impl Default for MovieDbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            language: DEFAULT_LANGUAGE.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            remapped: false,
            debug: false,
            image_extensions: DEFAULT_IMAGE_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

/// API endpoints used by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    MovieSearch,
    MovieInfo,
    ImdbLookup,
    MovieImages,
    PersonSearch,
    PersonInfo,
    HashInfo,
}

impl Endpoint {
    fn method(self) -> &'static str {
        match self {
            Endpoint::MovieSearch => "Movie.search",
            Endpoint::MovieInfo => "Movie.getInfo",
            Endpoint::ImdbLookup => "Movie.imdbLookup",
            Endpoint::MovieImages => "Movie.getImages",
            Endpoint::PersonSearch => "Person.search",
            Endpoint::PersonInfo => "Person.getInfo",
            Endpoint::HashInfo => "Hash.getInfo",
        }
    }
}

/// Request URL builder for the v2.1 API
///
/// URLs have the form `<base>/<Method>/<language>/xml/<api key>/<query>`.
/// Every builder takes an optional language that replaces the configured one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplates {
    base_url: String,
    language: String,
    api_key: String,
}

impl UrlTemplates {
    pub fn new(
        base_url: impl Into<String>,
        language: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            language: language.into(),
            api_key: api_key.into(),
        }
    }

    /// Title search; the title is percent-encoded
    pub fn movie_search(&self, title: &str, language: Option<&str>) -> String {
        self.url(Endpoint::MovieSearch, &urlencoding::encode(title), language)
    }

    /// Movie details by TMDB id
    pub fn movie_info(&self, id: &str, language: Option<&str>) -> String {
        self.url(Endpoint::MovieInfo, &urlencoding::encode(id), language)
    }

    /// Movie lookup by IMDB number
    ///
    /// The `tt` prefix is part of the template; an id that already carries it
    /// is not prefixed twice.
    pub fn imdb_lookup(&self, imdb_id: &str, language: Option<&str>) -> String {
        let number = imdb_id.strip_prefix("tt").unwrap_or(imdb_id);
        let query = format!("tt{}", urlencoding::encode(number));
        self.url(Endpoint::ImdbLookup, &query, language)
    }

    /// Poster and backdrop listing by TMDB id
    pub fn movie_images(&self, id: &str, language: Option<&str>) -> String {
        self.url(Endpoint::MovieImages, &urlencoding::encode(id), language)
    }

    /// Person search; the name is trimmed and its spaces become `+`
    pub fn person_search(&self, name: &str, language: Option<&str>) -> String {
        let query = urlencoding::encode(name.trim()).replace("%20", "+");
        self.url(Endpoint::PersonSearch, &query, language)
    }

    /// Person details by TMDB person id
    pub fn person_info(&self, id: &str, language: Option<&str>) -> String {
        self.url(Endpoint::PersonInfo, &urlencoding::encode(id), language)
    }

    /// Movie details by content hash
    pub fn hash_info(&self, hash: &str, language: Option<&str>) -> String {
        self.url(Endpoint::HashInfo, &urlencoding::encode(hash), language)
    }

    fn url(&self, endpoint: Endpoint, query: &str, language: Option<&str>) -> String {
        let language = language
            .filter(|lang| !lang.is_empty())
            .unwrap_or(&self.language);

        format!(
            "{}/{}/{}/xml/{}/{}",
            self.base_url,
            endpoint.method(),
            language,
            self.api_key,
            query
        )
    }
}

/// Builder for [`MovieDb`]
pub struct MovieDbBuilder {
    config: MovieDbConfig,
    selection: Selection,
    source: Option<Box<dyn XmlSource>>,
}

impl MovieDbBuilder {
    fn new() -> Self {
        Self {
            config: MovieDbConfig::default(),
            selection: Selection::None,
            source: None,
        }
    }

    /// Replaces all settings with a loaded configuration
    #[must_use]
    pub fn config(mut self, config: MovieDbConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the API key (required).
    #[must_use]
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.api_key = Some(api_key.into());
        self
    }

    /// Sets the response language (default: `en`).
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.config.language = language.into();
        self
    }

    /// Overrides the API base URL.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Returns movie details remapped to MythTV field names.
    #[must_use]
    pub fn remapped(mut self, remapped: bool) -> Self {
        self.config.remapped = remapped;
        self
    }

    /// Sets how multi-result searches are narrowed down.
    #[must_use]
    pub fn selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    /// Logs request URLs at info level.
    #[must_use]
    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    /// Sets the acceptable image extensions (default: png, jpg, bmp).
    #[must_use]
    pub fn image_extensions<I, T>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.config.image_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Fetches XML through `source` instead of the default HTTP fetcher.
    #[must_use]
    pub fn source(mut self, source: impl XmlSource + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - `TmdbError::MissingApiKey` if no non-blank API key is set.
    /// - `TmdbError::Network` if the default HTTP client cannot be created.
    pub fn build(self) -> Result<MovieDb> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(TmdbError::MissingApiKey)?
            .to_string();

        let source = match self.source {
            Some(source) => source,
            None => Box::new(HttpXmlFetcher::new()?),
        };

        let urls = UrlTemplates::new(&self.config.base_url, &self.config.language, api_key);

        Ok(MovieDb {
            source,
            urls,
            config: self.config,
            selection: self.selection,
        })
    }
}

/// Client for themoviedb.org's v2.1 XML API
pub struct MovieDb {
    source: Box<dyn XmlSource>,
    urls: UrlTemplates,
    config: MovieDbConfig,
    selection: Selection,
}

impl MovieDb {
    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> MovieDbBuilder {
        MovieDbBuilder::new()
    }

    /// The settings this client was built with
    pub fn config(&self) -> &MovieDbConfig {
        &self.config
    }

    /// The URL builder this client uses
    pub fn urls(&self) -> &UrlTemplates {
        &self.urls
    }

    /// Searches for movies by title.
    ///
    /// Without a selection strategy all matches are returned; otherwise the
    /// strategy picks one and a single-element list is returned.
    ///
    /// # Arguments
    ///
    /// * `title` - The movie title to search for
    /// * `language` - Optional override of the configured language
    ///
    /// # Errors
    ///
    /// Returns `TmdbError::NotFound` when nothing matches, before any
    /// selector runs.
    pub fn search_title(&self, title: &str, language: Option<&str>) -> Result<Vec<Movie>> {
        let root = self.fetch(&self.urls.movie_search(title, language))?;

        let results: Vec<Movie> = movie_elements(&root)
            .map(|movie| movie_from_element(movie, &self.config.image_extensions))
            .collect();

        if results.is_empty() {
            return Err(TmdbError::NotFound(format!(
                "No Movies matching the title ({title})"
            )));
        }

        self.narrow(results)
    }

    /// Looks up a movie by its TMDB id.
    ///
    /// # Errors
    ///
    /// Returns `TmdbError::NotFound` when the id is unknown.
    pub fn search_by_id(&self, id: &str, language: Option<&str>) -> Result<MovieRecord> {
        let movie = self.movie_by_id(id, language)?;
        Ok(self.into_record(movie))
    }

    /// Looks up a movie by its IMDB number, with or without the `tt` prefix.
    ///
    /// The IMDB lookup only yields the TMDB id; the details come from a second
    /// request through [`MovieDb::search_by_id`].
    ///
    /// # Errors
    ///
    /// Returns `TmdbError::NotFound` when no movie or no TMDB id was returned.
    pub fn search_by_imdb(&self, imdb_id: &str, language: Option<&str>) -> Result<MovieRecord> {
        let not_found =
            || TmdbError::NotFound(format!("No Movies matching the IMDB number ({imdb_id})"));

        let root = self.fetch(&self.urls.imdb_lookup(imdb_id, language))?;
        let element = movie_elements(&root).next().ok_or_else(not_found)?;

        let id = movie_from_element(element, &self.config.image_extensions)
            .id
            .ok_or_else(not_found)?;

        self.search_by_id(&id, language)
    }

    /// Looks up a movie by the hash of its video file.
    ///
    /// # Errors
    ///
    /// Returns `TmdbError::NotFound` when the hash is unknown.
    pub fn search_by_hash(&self, hash: &str, language: Option<&str>) -> Result<MovieRecord> {
        let root = self.fetch(&self.urls.hash_info(hash, language))?;
        let element = movie_elements(&root).next().ok_or_else(|| {
            TmdbError::NotFound(format!("No Movies matching the hash value ({hash})"))
        })?;

        let movie = movie_from_element(element, &self.config.image_extensions);
        Ok(self.into_record(movie))
    }

    /// Lists a movie's poster and backdrop URLs.
    ///
    /// Keys are `poster_<size>` and `fanart_<size>` for the sizes original,
    /// mid, cover and thumb. Values are comma separated URLs.
    ///
    /// # Errors
    ///
    /// Returns `TmdbError::NotFound` when the id is unknown.
    pub fn search_images(
        &self,
        id: &str,
        language: Option<&str>,
    ) -> Result<BTreeMap<String, String>> {
        let root = self.fetch(&self.urls.movie_images(id, language))?;
        let element = movie_elements(&root).next().ok_or_else(|| {
            TmdbError::NotFound(format!("No Movie matching the TMDB number ({id})"))
        })?;

        Ok(image_groups(element))
    }

    /// Returns a single image group, e.g. `poster_original`, or an empty
    /// string when the movie has no such group.
    ///
    /// # Errors
    ///
    /// Returns `TmdbError::NotFound` when the id is unknown.
    pub fn search_image(&self, id: &str, key: &str, language: Option<&str>) -> Result<String> {
        Ok(self
            .search_images(id, language)?
            .remove(key)
            .unwrap_or_default())
    }

    /// Searches for people by name.
    ///
    /// Selection works as for [`MovieDb::search_title`].
    ///
    /// # Errors
    ///
    /// Returns `TmdbError::NotFound` when nobody matches.
    pub fn search_people(&self, name: &str, language: Option<&str>) -> Result<Vec<Person>> {
        let root = self.fetch(&self.urls.person_search(name, language))?;

        let people: Vec<Person> = person_elements(&root)
            .map(person_summary_from_element)
            .collect();

        if people.is_empty() {
            return Err(TmdbError::NotFound(format!(
                "No People matches found for the name ({name})"
            )));
        }

        self.narrow(people)
    }

    /// Retrieves a person's details by TMDB person id.
    ///
    /// # Errors
    ///
    /// Returns `TmdbError::NotFound` when the id is unknown.
    pub fn person_details(&self, id: &str, language: Option<&str>) -> Result<Person> {
        let root = self.fetch(&self.urls.person_info(id, language))?;
        let element = person_elements(&root).next().ok_or_else(|| {
            TmdbError::NotFound(format!("No Person match found for the Person ID ({id})"))
        })?;

        Ok(person_from_element(element, &self.config.image_extensions))
    }

    /// Movie details by id in TMDB form, regardless of the output mode
    pub(crate) fn movie_by_id(&self, id: &str, language: Option<&str>) -> Result<Movie> {
        let root = self.fetch(&self.urls.movie_info(id, language))?;
        let element = movie_elements(&root).next().ok_or_else(|| {
            TmdbError::NotFound(format!("No Movies matching the TMDB number ({id})"))
        })?;

        Ok(movie_from_element(element, &self.config.image_extensions))
    }

    fn into_record(&self, movie: Movie) -> MovieRecord {
        if self.config.remapped {
            MovieRecord::Remapped(remap_movie(&movie))
        } else {
            MovieRecord::Tmdb(movie)
        }
    }

    fn narrow<T>(&self, results: Vec<T>) -> Result<Vec<T>>
    where
        for<'a> &'a T: Into<Candidate>,
    {
        let Some(selector) = self.selection.selector() else {
            return Ok(results);
        };

        debug!(
            strategy = ?self.selection,
            candidates = results.len(),
            "Selecting one search result"
        );
        Ok(vec![choose(selector, results)?])
    }

    fn fetch(&self, url: &str) -> Result<Element> {
        if self.config.debug {
            info!(%url, "XML URL");
        } else {
            debug!(%url, "XML URL");
        }
        self.source.fetch(url)
    }
}

/// `<movie>` results of a response. TMDB answers an empty search with a
/// childless `<movie>` ("Nothing found."), which is not a result.
fn movie_elements(root: &Element) -> impl Iterator<Item = &Element> {
    root.find("movies")
        .into_iter()
        .flat_map(|movies| movies.find_all("movie"))
        .filter(|movie| movie.has_children())
}

/// `<person>` results of a response, skipping childless placeholders.
fn person_elements(root: &Element) -> impl Iterator<Item = &Element> {
    root.find("people")
        .into_iter()
        .flat_map(|people| people.find_all("person"))
        .filter(|person| person.has_children())
}
