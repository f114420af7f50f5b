//! Trailer feed adapter
//!
//! Turns a title search into a paged feed of movie trailers, shaped for
//! MythTV's online video browser: one channel header plus one item per movie
//! that has a trailer.

use crate::client::MovieDb;
use crate::record::Movie;
use crate::text::{clean_description, escape_ampersand};
use crate::{Result, TmdbError};
use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use tracing::{debug, warn};

/// Items per page unless configured otherwise.
const DEFAULT_PAGE_SIZE: usize = 20;

const CHANNEL_TITLE: &str = "themoviedb.org";
const CHANNEL_LINK: &str = "http://themoviedb.org";
const CHANNEL_DESCRIPTION: &str = "themoviedb.org is an open \u{201c}wiki-style\u{201d} movie database";

/// Feed header
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoChannel {
    pub title: String,
    pub link: String,
    pub description: String,
    /// Number of items on this page
    pub num_results: usize,
    /// Configured page size
    pub returned: usize,
    pub start_index: usize,
}

/// One trailer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VideoItem {
    pub title: String,
    pub author: String,
    /// Release date as `Thu, 10 Dec 2009 00:00:00 GMT`
    pub pubdate: String,
    pub description: String,
    /// Trailer URL with `&` escaped for XML output
    pub link: String,
    /// Trailer URL as returned by TMDB
    pub url: String,
    pub duration: String,
    pub rating: String,
    pub width: String,
    pub height: String,
    pub language: String,
    pub thumbnail: String,
}

/// One page of trailers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoFeed {
    pub channel: VideoChannel,
    pub items: Vec<VideoItem>,
}

/// Paged trailer search on top of a [`MovieDb`]
pub struct VideoFeedSearch {
    db: MovieDb,
    page_size: usize,
}

impl VideoFeedSearch {
    pub fn new(db: MovieDb) -> Self {
        Self {
            db,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Sets the number of items per page (default: 20, minimum: 1).
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn db(&self) -> &MovieDb {
        &self.db
    }

    /// Searches trailers for movies matching `title`.
    ///
    /// Every match is looked up by id; movies without a trailer are left out
    /// and the remaining ones are paged by the configured page size. A title
    /// search without results yields an empty feed.
    ///
    /// # Arguments
    ///
    /// * `title` - The movie title to search for
    /// * `page` - 1-based page number
    ///
    /// # Errors
    ///
    /// - `TmdbError::Base` if `page` is 0
    /// - Network, parse and selection errors of the underlying lookups
    pub fn search_for_videos(&self, title: &str, page: usize) -> Result<VideoFeed> {
        if page == 0 {
            return Err(TmdbError::Base("Page numbers start at 1".to_string()));
        }
        let start = (page - 1).saturating_mul(self.page_size);

        let matches = match self.db.search_title(title, None) {
            Ok(matches) => matches,
            Err(TmdbError::NotFound(message)) => {
                debug!(title, %message, "No trailer search results");
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        let mut items = Vec::new();
        let mut passed = 0;

        for found in &matches {
            let Some(id) = found.id.as_deref() else {
                continue;
            };

            let movie = match self.db.movie_by_id(id, None) {
                Ok(movie) => movie,
                Err(TmdbError::NotFound(message)) => {
                    warn!(id, %message, "Skipping movie without details");
                    continue;
                }
                Err(e) => return Err(e),
            };

            let overview = found.overview.as_deref().unwrap_or_default();
            let Some(item) = video_item(&movie, overview) else {
                continue;
            };

            if passed < start {
                passed += 1;
                continue;
            }

            items.push(item);
            if items.len() == self.page_size {
                break;
            }
        }

        let channel = VideoChannel {
            title: CHANNEL_TITLE.to_string(),
            link: CHANNEL_LINK.to_string(),
            description: CHANNEL_DESCRIPTION.to_string(),
            num_results: items.len(),
            returned: self.page_size,
            start_index: start_index(items.len(), start, page, self.page_size),
        };

        Ok(VideoFeed { channel, items })
    }
}

/// Builds a feed item, or `None` when the movie has no trailer
fn video_item(movie: &Movie, overview: &str) -> Option<VideoItem> {
    let trailer = movie.trailer.as_deref().filter(|t| !t.is_empty())?;
    let text = |field: &Option<String>| field.clone().unwrap_or_default();

    Some(VideoItem {
        title: text(&movie.name),
        author: String::new(),
        pubdate: movie
            .released
            .as_deref()
            .map(format_pubdate)
            .unwrap_or_default(),
        description: clean_description(overview),
        link: escape_ampersand(trailer),
        url: trailer.to_string(),
        duration: text(&movie.runtime),
        rating: text(&movie.rating),
        width: String::new(),
        height: String::new(),
        language: text(&movie.language),
        thumbnail: movie
            .posters
            .medium()
            .and_then(|images| images.first())
            .map(|image| image.url.clone())
            .unwrap_or_default(),
    })
}

/// Formats a `YYYY-MM-DD` release date as an RSS style date. Anything else
/// is passed through unchanged.
fn format_pubdate(released: &str) -> String {
    match NaiveDate::parse_from_str(released, "%Y-%m-%d") {
        Ok(date) => date
            .and_time(NaiveTime::MIN)
            .format("%a, %d %b %Y 00:%M:%S GMT")
            .to_string(),
        Err(_) => released.to_string(),
    }
}

fn start_index(returned: usize, start: usize, page: usize, page_size: usize) -> usize {
    let index = returned + start;
    let page_end = page.saturating_mul(page_size);

    if index < page_end {
        index + 1
    } else {
        (page_end + index).saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie_with_trailer(trailer: &str) -> Movie {
        let mut movie = Movie::default();
        movie.set_field("name", "Avatar".to_string());
        movie.set_field("released", "2009-12-10".to_string());
        movie.set_field("runtime", "162".to_string());
        movie.set_field("rating", "7.4".to_string());
        movie.set_field("language", "en".to_string());
        movie.set_field("trailer", trailer.to_string());
        movie.posters.add("original", "http://x/orig.jpg", "1");
        movie.posters.add("cover", "http://x/cover.jpg", "1");
        movie.posters.add("cover", "http://x/cover2.jpg", "2");
        movie
    }

    #[test]
    fn test_video_item_fields() {
        let movie = movie_with_trailer("http://www.youtube.com/watch?v=abc&hd=1");
        let item = video_item(&movie, "A <b>blue</b> world & more").unwrap();

        assert_eq!(item.title, "Avatar");
        assert_eq!(item.author, "");
        assert_eq!(item.pubdate, "Thu, 10 Dec 2009 00:00:00 GMT");
        assert_eq!(item.description, "A blue world &amp; more");
        assert_eq!(item.link, "http://www.youtube.com/watch?v=abc&amp;hd=1");
        assert_eq!(item.url, "http://www.youtube.com/watch?v=abc&hd=1");
        assert_eq!(item.duration, "162");
        assert_eq!(item.rating, "7.4");
        assert_eq!(item.language, "en");
        assert_eq!(item.thumbnail, "http://x/cover.jpg");
    }

    #[test]
    fn test_video_item_requires_trailer() {
        assert!(video_item(&movie_with_trailer(""), "").is_none());
        assert!(video_item(&Movie::default(), "").is_none());
    }

    #[test]
    fn test_format_pubdate() {
        assert_eq!(format_pubdate("2011-07-15"), "Fri, 15 Jul 2011 00:00:00 GMT");
        assert_eq!(format_pubdate("2011"), "2011");
    }

    #[test]
    fn test_start_index() {
        // First page, short result
        assert_eq!(start_index(3, 0, 1, 20), 4);
        // First page, full result
        assert_eq!(start_index(20, 0, 1, 20), 39);
        // Second page, short result
        assert_eq!(start_index(5, 20, 2, 20), 26);
    }
}
