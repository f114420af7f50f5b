//! Field extractors
//!
//! Pure functions that flatten a TMDB sub-element (`<categories>`,
//! `<studios>`, `<countries>`, `<cast>`, `<images>`) into a string or a small
//! mapping.

use crate::record::ImageSizeSet;
use crate::xml::Element;
use std::collections::BTreeMap;

/// Joins the `name` attribute of every child with `,`
///
/// Used for `<categories>` and `<studios>`. Children without a name are
/// skipped.
///
/// ```text
/// <categories>
///     <category type="genre" name="Crime"/>
///     <category type="genre" name="Drama"/>
/// </categories>
/// ```
/// becomes `"Crime,Drama"`.
pub fn extract_comma_list(element: &Element) -> String {
    child_names(element).collect::<Vec<_>>().join(",")
}

/// Joins the `name` attribute of every `<country>` child with `", "`
///
/// Note the separator differs from [`extract_comma_list`]; consumers rely on
/// both forms.
pub fn extract_countries(element: &Element) -> String {
    child_names(element).collect::<Vec<_>>().join(", ")
}

fn child_names(element: &Element) -> impl Iterator<Item = &str> {
    element
        .children()
        .iter()
        .filter_map(|child| child.attr("name"))
        .map(str::trim)
        .filter(|name| !name.is_empty())
}

/// Groups the people of a `<cast>` element by their lowercased job
///
/// Several people sharing a job are joined with `,` (no space), in document
/// order.
pub fn extract_people_by_role(cast: &Element) -> BTreeMap<String, String> {
    let mut people: BTreeMap<String, String> = BTreeMap::new();

    for person in cast.children() {
        let (Some(name), Some(job)) = (person.attr("name"), person.attr("job")) else {
            continue;
        };
        let name = name.trim();
        let job = job.trim().to_lowercase();

        people
            .entry(job)
            .and_modify(|names| {
                names.push(',');
                names.push_str(name);
            })
            .or_insert_with(|| name.to_string());
    }

    people
}

/// Collects the `<image>` children of the given type (`poster`, `backdrop`)
/// into a size-set
///
/// Images whose URL does not end in one of `allowed_extensions` are dropped.
pub fn extract_image_sizes(
    images: &Element,
    image_type: &str,
    allowed_extensions: &[String],
) -> ImageSizeSet {
    let mut set = ImageSizeSet::default();

    for image in images.children() {
        let matches_type = image
            .attr("type")
            .is_some_and(|kind| kind.trim().eq_ignore_ascii_case(image_type));
        if !matches_type {
            continue;
        }
        let (Some(size), Some(url)) = (image.attr("size"), image.attr("url")) else {
            continue;
        };
        let url = url.trim();
        if !has_allowed_extension(url, allowed_extensions) {
            continue;
        }
        set.add(size.trim(), url, image.attr("id").unwrap_or_default().trim());
    }

    set
}

/// Checks the extension of the URL's last path segment against an allow-list,
/// ignoring case.
pub(crate) fn has_allowed_extension(url: &str, allowed_extensions: &[String]) -> bool {
    let file_name = url.rsplit('/').next().unwrap_or(url);
    let Some((_, extension)) = file_name.rsplit_once('.') else {
        return false;
    };

    allowed_extensions
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(extension))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_document;

    fn allowed() -> Vec<String> {
        vec!["png".to_string(), "jpg".to_string(), "bmp".to_string()]
    }

    #[test]
    fn test_extract_comma_list() {
        let categories = parse_document(
            r#"<categories>
                <category type="genre" name="Crime"/>
                <category type="genre"/>
                <category type="genre" name=" Drama "/>
                <category type="genre" name="Thriller"/>
            </categories>"#,
        )
        .unwrap();

        assert_eq!(extract_comma_list(&categories), "Crime,Drama,Thriller");
    }

    #[test]
    fn test_extract_comma_list_edges() {
        let empty = parse_document("<studios/>").unwrap();
        assert_eq!(extract_comma_list(&empty), "");

        let single = parse_document(r#"<studios><studio name="Miramax Films"/></studios>"#).unwrap();
        assert_eq!(extract_comma_list(&single), "Miramax Films");
    }

    #[test]
    fn test_extract_countries_uses_comma_space() {
        let countries = parse_document(
            r#"<countries>
                <country code="US" name="United States of America"/>
                <country code="GB" name="United Kingdom"/>
            </countries>"#,
        )
        .unwrap();

        assert_eq!(
            extract_countries(&countries),
            "United States of America, United Kingdom"
        );
    }

    #[test]
    fn test_extract_people_by_role() {
        let cast = parse_document(
            r#"<cast>
                <person name="Quentin Tarantino" job="Director" id="138"/>
                <person name="Robert Rodriguez" job="Director" id="2294"/>
                <person name="Kurt Russell" job="Actor" character="Stuntman Mike"/>
                <person job="Actor"/>
            </cast>"#,
        )
        .unwrap();

        let people = extract_people_by_role(&cast);
        assert_eq!(people.len(), 2);
        assert_eq!(people["director"], "Quentin Tarantino,Robert Rodriguez");
        assert_eq!(people["actor"], "Kurt Russell");
    }

    #[test]
    fn test_extract_image_sizes_filters_extensions() {
        let images = parse_document(
            r#"<images>
                <image type="poster" size="original" url="http://x/p1.JPG" id="1"/>
                <image type="poster" size="original" url="http://x/p2.gif" id="2"/>
                <image type="Poster" size="thumb" url="http://x/p3.png" id="3"/>
                <image type="poster" size="cover" url="http://x/noext" id="4"/>
                <image type="backdrop" size="original" url="http://x/b1.bmp" id="5"/>
            </images>"#,
        )
        .unwrap();

        let posters = extract_image_sizes(&images, "poster", &allowed());
        assert_eq!(posters.sizes().collect::<Vec<_>>(), vec!["original", "thumb"]);
        let original = posters.get("original").unwrap();
        assert_eq!(original.len(), 1);
        assert_eq!(original[0].url, "http://x/p1.JPG");
        assert_eq!(original[0].id, "1");

        let backdrops = extract_image_sizes(&images, "backdrop", &allowed());
        assert_eq!(backdrops.get("original").unwrap()[0].id, "5");
    }

    #[test]
    fn test_has_allowed_extension() {
        assert!(has_allowed_extension("http://a.b/c/d.png", &allowed()));
        assert!(has_allowed_extension("http://a.b/c/d.Bmp", &allowed()));
        assert!(!has_allowed_extension("http://a.b/c/d.jpeg", &allowed()));
        assert!(!has_allowed_extension("http://a.b.com/c/d", &allowed()));
    }
}
