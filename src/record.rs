//! Records assembled from TMDB responses.
//!
//! Each record carries the fields TMDB is known to return as typed optional
//! members, plus an `extra` map that catches any element this crate does not
//! know about. Values stay in the text form TMDB sent them in.

use serde::Serialize;
use std::collections::BTreeMap;

/// Size labels ordered from the biggest image to the smallest.
const LARGEST_FIRST: [&str; 4] = ["original", "mid", "cover", "thumb"];

/// Size labels ordered by preference for a medium sized image.
const MEDIUM_FIRST: [&str; 4] = ["cover", "thumb", "mid", "original"];

/// A single image URL with its TMDB image id
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRef {
    pub url: String,
    pub id: String,
}

/// Image URLs grouped by size label (original, mid, cover, thumb, ...)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ImageSizeSet {
    sizes: BTreeMap<String, Vec<ImageRef>>,
}

impl ImageSizeSet {
    /// Appends an image to the group for `size`
    pub fn add(&mut self, size: &str, url: &str, id: &str) {
        self.sizes.entry(size.to_string()).or_default().push(ImageRef {
            url: url.to_string(),
            id: id.to_string(),
        });
    }

    /// Returns the images stored under a size label
    pub fn get(&self, size: &str) -> Option<&[ImageRef]> {
        self.sizes.get(size).map(Vec::as_slice)
    }

    /// Returns the group of the largest available size
    pub fn largest(&self) -> Option<&[ImageRef]> {
        self.first_present(&LARGEST_FIRST)
    }

    /// Returns the group of a medium size, falling back to any known size
    pub fn medium(&self) -> Option<&[ImageRef]> {
        self.first_present(&MEDIUM_FIRST)
    }

    /// Size labels present in this set
    pub fn sizes(&self) -> impl Iterator<Item = &str> {
        self.sizes.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    fn first_present(&self, order: &[&str]) -> Option<&[ImageRef]> {
        order.iter().find_map(|size| self.get(size))
    }
}

/// Joins the non-empty URLs of an image group with commas.
pub(crate) fn join_urls(images: &[ImageRef]) -> String {
    images
        .iter()
        .map(|image| image.url.as_str())
        .filter(|url| !url.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

/// Movie details as returned by TMDB
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Movie {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternative_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    /// Release date, `YYYY-MM-DD`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub released: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub popularity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub votes: Option<String>,
    /// IMDB id including its `tt` prefix
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imdb_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trailer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certification: Option<String>,
    /// Runtime in minutes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translated: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adult: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Genre names, comma separated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<String>,
    /// Studio names, comma separated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub studios: Option<String>,
    /// Country names, separated by `", "`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub production_countries: Option<String>,
    /// URLs of the largest poster size, comma separated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    /// URLs of the largest backdrop size, comma separated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backdrop: Option<String>,
    /// Lowercase job (`director`, `actor`, ...) to comma separated names
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub people: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "ImageSizeSet::is_empty")]
    pub posters: ImageSizeSet,
    #[serde(skip_serializing_if = "ImageSizeSet::is_empty")]
    pub backdrops: ImageSizeSet,
    /// Elements without a dedicated field
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl Movie {
    /// Stores a flat text field under its TMDB element name
    pub fn set_field(&mut self, key: &str, value: String) {
        match self.slot(key) {
            Some(slot) => *slot = Some(value),
            None => {
                self.extra.insert(key.to_string(), value);
            }
        }
    }

    /// Looks up a flat field, a job in `people`, or an `extra` entry by name
    pub fn get(&self, key: &str) -> Option<&str> {
        self.named_fields()
            .into_iter()
            .find(|(name, _)| *name == key)
            .and_then(|(_, value)| value.as_deref())
            .or_else(|| self.people.get(key).map(String::as_str))
            .or_else(|| self.extra.get(key).map(String::as_str))
    }

    /// All flat fields under their TMDB names: named fields, people, extras
    pub fn fields(&self) -> Vec<(String, String)> {
        let named = self
            .named_fields()
            .into_iter()
            .filter_map(|(name, value)| value.as_ref().map(|v| (name.to_string(), v.clone())));
        let people = self.people.iter().map(|(k, v)| (k.clone(), v.clone()));
        let extra = self.extra.iter().map(|(k, v)| (k.clone(), v.clone()));

        named.chain(people).chain(extra).collect()
    }

    /// Drops every flat field, job and extra whose value is empty
    pub(crate) fn prune_empty(&mut self) {
        for slot in self.slots_mut() {
            if slot.as_deref().is_some_and(str::is_empty) {
                *slot = None;
            }
        }
        self.people.retain(|_, names| !names.is_empty());
        self.extra.retain(|_, value| !value.is_empty());
    }

    fn named_fields(&self) -> [(&'static str, &Option<String>); 30] {
        [
            ("id", &self.id),
            ("name", &self.name),
            ("original_name", &self.original_name),
            ("alternative_name", &self.alternative_name),
            ("overview", &self.overview),
            ("released", &self.released),
            ("rating", &self.rating),
            ("popularity", &self.popularity),
            ("votes", &self.votes),
            ("imdb_id", &self.imdb_id),
            ("url", &self.url),
            ("homepage", &self.homepage),
            ("trailer", &self.trailer),
            ("tagline", &self.tagline),
            ("certification", &self.certification),
            ("runtime", &self.runtime),
            ("budget", &self.budget),
            ("revenue", &self.revenue),
            ("language", &self.language),
            ("translated", &self.translated),
            ("adult", &self.adult),
            ("type", &self.kind),
            ("score", &self.score),
            ("last_modified_at", &self.last_modified_at),
            ("version", &self.version),
            ("categories", &self.categories),
            ("studios", &self.studios),
            ("production_countries", &self.production_countries),
            ("poster", &self.poster),
            ("backdrop", &self.backdrop),
        ]
    }

    fn slots_mut(&mut self) -> [&mut Option<String>; 30] {
        [
            &mut self.id,
            &mut self.name,
            &mut self.original_name,
            &mut self.alternative_name,
            &mut self.overview,
            &mut self.released,
            &mut self.rating,
            &mut self.popularity,
            &mut self.votes,
            &mut self.imdb_id,
            &mut self.url,
            &mut self.homepage,
            &mut self.trailer,
            &mut self.tagline,
            &mut self.certification,
            &mut self.runtime,
            &mut self.budget,
            &mut self.revenue,
            &mut self.language,
            &mut self.translated,
            &mut self.adult,
            &mut self.kind,
            &mut self.score,
            &mut self.last_modified_at,
            &mut self.version,
            &mut self.categories,
            &mut self.studios,
            &mut self.production_countries,
            &mut self.poster,
            &mut self.backdrop,
        ]
    }

    fn slot(&mut self, key: &str) -> Option<&mut Option<String>> {
        let slot = match key {
            "id" => &mut self.id,
            "name" => &mut self.name,
            "original_name" => &mut self.original_name,
            "alternative_name" => &mut self.alternative_name,
            "overview" => &mut self.overview,
            "released" => &mut self.released,
            "rating" => &mut self.rating,
            "popularity" => &mut self.popularity,
            "votes" => &mut self.votes,
            "imdb_id" => &mut self.imdb_id,
            "url" => &mut self.url,
            "homepage" => &mut self.homepage,
            "trailer" => &mut self.trailer,
            "tagline" => &mut self.tagline,
            "certification" => &mut self.certification,
            "runtime" => &mut self.runtime,
            "budget" => &mut self.budget,
            "revenue" => &mut self.revenue,
            "language" => &mut self.language,
            "translated" => &mut self.translated,
            "adult" => &mut self.adult,
            "type" => &mut self.kind,
            "score" => &mut self.score,
            "last_modified_at" => &mut self.last_modified_at,
            "version" => &mut self.version,
            "categories" => &mut self.categories,
            "studios" => &mut self.studios,
            "production_countries" => &mut self.production_countries,
            "poster" => &mut self.poster,
            "backdrop" => &mut self.backdrop,
            _ => return None,
        };
        Some(slot)
    }
}

/// Movie details translated into MythTV's metadata grabber field names
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RemappedMovie {
    /// TMDB id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inetref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub userrating: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub releasedate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverart: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fanart: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cast: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genres: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub countries: Option<String>,
    /// IMDB number without the `tt` prefix
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imdb: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Fields passed through under their TMDB names
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl RemappedMovie {
    /// Stores a field under its MythTV name
    pub fn set_field(&mut self, key: &str, value: String) {
        let slot = match key {
            "inetref" => &mut self.inetref,
            "title" => &mut self.title,
            "plot" => &mut self.plot,
            "userrating" => &mut self.userrating,
            "releasedate" => &mut self.releasedate,
            "year" => &mut self.year,
            "coverart" => &mut self.coverart,
            "fanart" => &mut self.fanart,
            "cast" => &mut self.cast,
            "director" => &mut self.director,
            "genres" => &mut self.genres,
            "countries" => &mut self.countries,
            "imdb" => &mut self.imdb,
            "runtime" => &mut self.runtime,
            "url" => &mut self.url,
            _ => {
                self.extra.insert(key.to_string(), value);
                return;
            }
        };
        *slot = Some(value);
    }

    /// Looks up a field by its MythTV name, falling back to `extra`
    pub fn get(&self, key: &str) -> Option<&str> {
        let named = match key {
            "inetref" => &self.inetref,
            "title" => &self.title,
            "plot" => &self.plot,
            "userrating" => &self.userrating,
            "releasedate" => &self.releasedate,
            "year" => &self.year,
            "coverart" => &self.coverart,
            "fanart" => &self.fanart,
            "cast" => &self.cast,
            "director" => &self.director,
            "genres" => &self.genres,
            "countries" => &self.countries,
            "imdb" => &self.imdb,
            "runtime" => &self.runtime,
            "url" => &self.url,
            _ => return self.extra.get(key).map(String::as_str),
        };
        named.as_deref()
    }
}

/// Movie details in the output mode the client was built with
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MovieRecord {
    /// Field names and values as TMDB returned them
    Tmdb(Movie),
    /// Field names and values massaged for MythTV
    Remapped(RemappedMovie),
}

impl MovieRecord {
    /// The movie's title, whichever mode produced the record
    pub fn title(&self) -> Option<&str> {
        match self {
            MovieRecord::Tmdb(movie) => movie.name.as_deref(),
            MovieRecord::Remapped(movie) => movie.title.as_deref(),
        }
    }

    /// Looks up a field by the name used in this record's mode
    pub fn get(&self, key: &str) -> Option<&str> {
        match self {
            MovieRecord::Tmdb(movie) => movie.get(key),
            MovieRecord::Remapped(movie) => movie.get(key),
        }
    }

    pub fn as_tmdb(&self) -> Option<&Movie> {
        match self {
            MovieRecord::Tmdb(movie) => Some(movie),
            MovieRecord::Remapped(_) => None,
        }
    }

    pub fn as_remapped(&self) -> Option<&RemappedMovie> {
        match self {
            MovieRecord::Tmdb(_) => None,
            MovieRecord::Remapped(movie) => Some(movie),
        }
    }
}

/// One entry of a person's filmography
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilmographyEntry {
    pub url: String,
    pub name: String,
    pub character: String,
    pub job: String,
    pub id: String,
}

/// A person as returned by a person search or person lookup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Person {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub biography: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthplace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub popularity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub known_movies: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub known_as: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adult: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified_at: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub also_known_as: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filmography: Vec<FilmographyEntry>,
    /// Size label to comma separated image URLs
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub images: BTreeMap<String, String>,
    /// Elements without a dedicated field
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl Person {
    /// Stores a flat text field under its TMDB element name
    pub fn set_field(&mut self, key: &str, value: String) {
        let slot = match key {
            "id" => &mut self.id,
            "name" => &mut self.name,
            "biography" => &mut self.biography,
            "birthday" => &mut self.birthday,
            "birthplace" => &mut self.birthplace,
            "url" => &mut self.url,
            "popularity" => &mut self.popularity,
            "score" => &mut self.score,
            "known_movies" => &mut self.known_movies,
            "known_as" => &mut self.known_as,
            "adult" => &mut self.adult,
            "version" => &mut self.version,
            "last_modified_at" => &mut self.last_modified_at,
            _ => {
                self.extra.insert(key.to_string(), value);
                return;
            }
        };
        *slot = Some(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_set() -> ImageSizeSet {
        let mut set = ImageSizeSet::default();
        set.add("thumb", "http://x/thumb.jpg", "1");
        set.add("mid", "http://x/mid.jpg", "1");
        set.add("mid", "http://x/mid2.jpg", "2");
        set
    }

    #[test]
    fn test_image_size_priorities() {
        let set = sample_set();

        let largest = set.largest().unwrap();
        assert_eq!(largest.len(), 2);
        assert_eq!(largest[0].url, "http://x/mid.jpg");

        let medium = set.medium().unwrap();
        assert_eq!(medium[0].url, "http://x/thumb.jpg");

        assert!(ImageSizeSet::default().largest().is_none());
    }

    #[test]
    fn test_join_urls() {
        let set = sample_set();
        assert_eq!(
            join_urls(set.get("mid").unwrap()),
            "http://x/mid.jpg,http://x/mid2.jpg"
        );
    }

    #[test]
    fn test_movie_set_and_get() {
        let mut movie = Movie::default();
        movie.set_field("name", "Avatar".to_string());
        movie.set_field("type", "movie".to_string());
        movie.set_field("something_new", "value".to_string());
        movie.people.insert("director".to_string(), "James Cameron".to_string());

        assert_eq!(movie.name.as_deref(), Some("Avatar"));
        assert_eq!(movie.kind.as_deref(), Some("movie"));
        assert_eq!(movie.get("type"), Some("movie"));
        assert_eq!(movie.get("something_new"), Some("value"));
        assert_eq!(movie.get("director"), Some("James Cameron"));
        assert_eq!(movie.get("missing"), None);

        let fields = movie.fields();
        assert_eq!(fields[0], ("name".to_string(), "Avatar".to_string()));
        assert_eq!(fields.len(), 4);
    }

    #[test]
    fn test_movie_prune_empty() {
        let mut movie = Movie::default();
        movie.set_field("name", "Avatar".to_string());
        movie.set_field("tagline", String::new());
        movie.set_field("unknown", String::new());
        movie.people.insert("actor".to_string(), String::new());

        movie.prune_empty();

        assert_eq!(movie.tagline, None);
        assert!(movie.extra.is_empty());
        assert!(movie.people.is_empty());
        assert_eq!(movie.fields().len(), 1);
    }

    #[test]
    fn test_remapped_movie_fields() {
        let mut movie = RemappedMovie::default();
        movie.set_field("title", "Avatar".to_string());
        movie.set_field("tagline", "Enter the world".to_string());

        assert_eq!(movie.title.as_deref(), Some("Avatar"));
        assert_eq!(movie.get("tagline"), Some("Enter the world"));

        let record = MovieRecord::Remapped(movie);
        assert_eq!(record.title(), Some("Avatar"));
        assert!(record.as_tmdb().is_none());
    }

    #[test]
    fn test_movie_serializes_without_empty_fields() {
        let mut movie = Movie::default();
        movie.set_field("name", "Avatar".to_string());
        movie.set_field("type", "movie".to_string());
        movie.set_field("custom", "x".to_string());

        let json = serde_json::to_value(&movie).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "Avatar", "type": "movie", "custom": "x"})
        );
    }
}
