//! Detail assembly
//!
//! Turns `<movie>` and `<person>` elements into records. Movies come out
//! either as TMDB returned them ([`movie_from_element`]) or massaged into the
//! field names and value formats MythTV's metadata grabbers expect
//! ([`remap_movie`]).

use crate::extract::{
    extract_comma_list, extract_countries, extract_image_sizes, extract_people_by_role,
    has_allowed_extension,
};
use crate::record::{FilmographyEntry, Movie, Person, RemappedMovie, join_urls};
use crate::xml::Element;
use std::collections::BTreeMap;

/// TMDB element names and the MythTV names they are renamed to.
pub(crate) const MYTHTV_TRANSLATION: &[(&str, &str)] = &[
    ("actor", "cast"),
    ("backdrop", "fanart"),
    ("categories", "genres"),
    ("director", "director"),
    ("id", "inetref"),
    ("name", "title"),
    ("overview", "plot"),
    ("rating", "userrating"),
    ("poster", "coverart"),
    ("production_countries", "countries"),
    ("released", "releasedate"),
    ("runtime", "runtime"),
    ("url", "url"),
    ("imdb_id", "imdb"),
];

/// Fields that carry no information when they are zero.
const ZERO_MEANS_UNKNOWN: [&str; 5] = ["rating", "popularity", "budget", "runtime", "revenue"];

/// Size labels reported by the image search, in output order.
const IMAGE_SEARCH_SIZES: [&str; 4] = ["original", "mid", "cover", "thumb"];

/// Builds a movie record from a `<movie>` element, as TMDB returned it
///
/// Sub-elements are flattened by the extractors, the largest poster and
/// backdrop groups become comma separated URL lists, and empty values are
/// dropped.
pub fn movie_from_element(element: &Element, image_extensions: &[String]) -> Movie {
    let mut movie = Movie::default();

    for item in element.children() {
        match item.tag().to_lowercase().as_str() {
            "images" => {
                movie.posters = extract_image_sizes(item, "poster", image_extensions);
                movie.backdrops = extract_image_sizes(item, "backdrop", image_extensions);
            }
            "categories" => movie.categories = Some(extract_comma_list(item)),
            "studios" => movie.studios = Some(extract_comma_list(item)),
            "countries" => movie.production_countries = Some(extract_countries(item)),
            "cast" => movie.people.extend(extract_people_by_role(item)),
            _ => {
                if let Some(text) = item.text() {
                    movie.set_field(item.tag().trim(), text.trim().to_string());
                }
            }
        }
    }

    if let Some(largest) = movie.posters.largest() {
        movie.poster = Some(join_urls(largest));
    }
    if let Some(largest) = movie.backdrops.largest() {
        movie.backdrop = Some(join_urls(largest));
    }

    movie.prune_empty();
    movie
}

/// Massages movie details into MythTV's field names and value formats
///
/// - empty and `None` values are dropped, as are zero ratings, popularity,
///   budgets, runtimes and revenues
/// - the `tt` prefix is stripped from the IMDB id
/// - a `year` is derived from the first four characters of the release date
/// - keys are renamed through the translation table; other keys pass through
/// - line feeds inside values become spaces
pub fn remap_movie(movie: &Movie) -> RemappedMovie {
    let mut remapped = RemappedMovie::default();

    for (key, value) in movie.fields() {
        let value = value.trim();
        if value.is_empty() || value == "None" {
            continue;
        }
        if ZERO_MEANS_UNKNOWN.contains(&key.as_str()) && is_zero(value) {
            continue;
        }

        let value = if key == "imdb_id" {
            value.chars().skip(2).collect::<String>()
        } else {
            value.to_string()
        };

        if key == "released" {
            // No format validation: anything shaped like YYYY-MM-DD works
            remapped.set_field("year", value.chars().take(4).collect());
        }

        let target = MYTHTV_TRANSLATION
            .iter()
            .find(|(tmdb, _)| *tmdb == key)
            .map_or(key.as_str(), |(_, mythtv)| mythtv);

        remapped.set_field(target, value.replace('\n', " "));
    }

    remapped
}

fn is_zero(value: &str) -> bool {
    value.parse::<f64>().is_ok_and(|number| number == 0.0)
}

/// Builds a person record from a `<person>` element of a person lookup
///
/// Aliases, filmography entries and images get dedicated handling; every
/// other child element becomes a flat text field.
pub fn person_from_element(element: &Element, image_extensions: &[String]) -> Person {
    let mut person = Person::default();

    for item in element.children() {
        match item.tag() {
            "also_known_as" => {
                person.also_known_as = item
                    .children()
                    .iter()
                    .filter_map(Element::text)
                    .map(|alias| alias.trim().replace('\n', " "))
                    .filter(|alias| !alias.is_empty())
                    .collect();
            }
            "filmography" => {
                person.filmography = item.children().iter().map(filmography_entry).collect();
            }
            "images" => {
                person.images = grouped_image_urls(item, |url| {
                    has_allowed_extension(url, image_extensions)
                });
            }
            tag => {
                if let Some(text) = item.text() {
                    person.set_field(tag, text.trim().replace('\n', " "));
                }
            }
        }
    }

    person
}

/// Builds a person record from a `<person>` element of a person search
///
/// Search results carry one image URL per size; a later image of the same
/// size replaces an earlier one.
pub(crate) fn person_summary_from_element(element: &Element) -> Person {
    let mut person = Person::default();

    for item in element.children() {
        if item.tag() == "images" {
            for image in item.children() {
                if let (Some(size), Some(url)) = (image.attr("size"), image.attr("url")) {
                    person.images.insert(size.to_string(), url.trim().to_string());
                }
            }
        } else if let Some(text) = item.text() {
            person.set_field(item.tag(), text.trim().to_string());
        }
    }

    person
}

fn filmography_entry(movie: &Element) -> FilmographyEntry {
    let attr = |name: &str| movie.attr(name).unwrap_or_default().trim().to_string();

    FilmographyEntry {
        url: attr("url"),
        name: attr("name"),
        character: attr("character"),
        job: attr("job"),
        id: attr("id"),
    }
}

/// Groups the `url` attributes of an element's children by their `size`,
/// comma separated.
fn grouped_image_urls(
    images: &Element,
    keep: impl Fn(&str) -> bool,
) -> BTreeMap<String, String> {
    let mut grouped: BTreeMap<String, String> = BTreeMap::new();

    for image in images.children() {
        let (Some(size), Some(url)) = (image.attr("size"), image.attr("url")) else {
            continue;
        };
        let url = url.trim();
        if !keep(url) {
            continue;
        }
        grouped
            .entry(size.to_string())
            .and_modify(|urls| {
                urls.push(',');
                urls.push_str(url);
            })
            .or_insert_with(|| url.to_string());
    }

    grouped
}

/// Collects the poster and backdrop groups of a `Movie.getImages` response
///
/// Keys are `poster_<size>` and `fanart_<size>` for the original, mid, cover
/// and thumb sizes; values are comma separated URLs.
pub(crate) fn image_groups(movie: &Element) -> BTreeMap<String, String> {
    let mut groups = BTreeMap::new();

    for images in movie
        .children()
        .iter()
        .filter(|item| item.tag().eq_ignore_ascii_case("images"))
    {
        for (tag, prefix) in [("poster", "poster"), ("backdrop", "fanart")] {
            let mut by_size: BTreeMap<String, String> = BTreeMap::new();
            for group in images.find_all(tag) {
                for (size, urls) in grouped_image_urls(group, |_| true) {
                    by_size
                        .entry(size)
                        .and_modify(|existing| {
                            existing.push(',');
                            existing.push_str(&urls);
                        })
                        .or_insert(urls);
                }
            }

            for size in IMAGE_SEARCH_SIZES {
                if let Some(urls) = by_size.get(size) {
                    groups.insert(format!("{prefix}_{size}"), urls.clone());
                }
            }
        }
    }

    groups
}
