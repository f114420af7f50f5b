mod common;

use common::{FixtureSource, builder};
use tmdb_api::{TmdbError, VideoFeedSearch};

fn feed_search() -> VideoFeedSearch {
    VideoFeedSearch::new(builder(FixtureSource::standard()).build().unwrap())
}

#[test]
fn test_first_page_lists_movies_with_trailers() {
    let feed = feed_search().search_for_videos("Avatar", 1).unwrap();

    assert_eq!(feed.channel.title, "themoviedb.org");
    assert_eq!(feed.channel.link, "http://themoviedb.org");
    assert_eq!(feed.channel.num_results, 2);
    assert_eq!(feed.channel.returned, 20);
    assert_eq!(feed.channel.start_index, 3);

    let titles: Vec<_> = feed.items.iter().map(|item| item.title.as_str()).collect();
    assert_eq!(titles, vec!["Avatar", "Capturing Avatar"]);

    let avatar = &feed.items[0];
    assert_eq!(avatar.pubdate, "Thu, 10 Dec 2009 00:00:00 GMT");
    assert_eq!(
        avatar.link,
        "http://www.youtube.com/watch?v=cRdxXPV9GNQ&amp;hd=1"
    );
    assert_eq!(avatar.url, "http://www.youtube.com/watch?v=cRdxXPV9GNQ&hd=1");
    assert!(avatar.description.contains("following orders &amp; protecting"));
    assert_eq!(avatar.duration, "162");
    assert_eq!(avatar.rating, "7.4");
    assert_eq!(avatar.language, "en");
    assert_eq!(avatar.author, "");
    assert!(avatar.thumbnail.ends_with("avatar-cover.jpg"));

    let capturing = &feed.items[1];
    assert_eq!(capturing.description, "A making of documentary.");
    assert!(capturing.thumbnail.ends_with("capturing-avatar-thumb.png"));
}

#[test]
fn test_pages_skip_earlier_items() {
    let search = feed_search().with_page_size(1);

    let second = search.search_for_videos("Avatar", 2).unwrap();
    assert_eq!(second.items.len(), 1);
    assert_eq!(second.items[0].title, "Capturing Avatar");
    assert_eq!(second.channel.num_results, 1);
    assert_eq!(second.channel.returned, 1);
    assert_eq!(second.channel.start_index, 3);

    let third = search.search_for_videos("Avatar", 3).unwrap();
    assert!(third.items.is_empty());
    assert_eq!(third.channel.num_results, 0);
}

#[test]
fn test_no_matches_gives_empty_feed() {
    let feed = feed_search().search_for_videos("zzzxxyy", 1).unwrap();

    assert!(feed.items.is_empty());
    assert_eq!(feed.channel.num_results, 0);
    assert_eq!(feed.channel.start_index, 1);
}

#[test]
fn test_page_zero_is_rejected() {
    assert!(matches!(
        feed_search().search_for_videos("Avatar", 0),
        Err(TmdbError::Base(_))
    ));
}

#[test]
fn test_network_errors_propagate() {
    assert!(matches!(
        feed_search().search_for_videos("Unrouted", 1),
        Err(TmdbError::Network(_))
    ));
}
