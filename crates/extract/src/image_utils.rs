// ABOUTME: Image reference discovery, candidate URL selection and fragment rewriting.
// ABOUTME: Prefers lazy-load data-src over placeholder src and derives deterministic local filenames.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use crate::html_utils::escape_attr;

static IMG_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<img\b[^>]*>").unwrap());
static IMG_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("img").unwrap());

/// Placeholder values that never point at a real image.
const SENTINELS: &[&str] = &["about:blank", "blank", "#"];

/// Directory (relative to the public root) that holds downloaded icons.
pub const ICONS_DIR: &str = "images/icons";

/// One `<img>` tag found in a fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// Byte span of the tag in the fragment.
    pub start: usize,
    pub end: usize,
    pub src: Option<String>,
    pub data_src: Option<String>,
    pub alt: Option<String>,
}

impl ImageRef {
    /// The best remote URL for this reference, if any.
    ///
    /// A usable `data-src` wins over `src`; an inline `data:` or sentinel
    /// `src` is never a candidate.
    pub fn candidate(&self) -> Option<String> {
        self.data_src
            .as_deref()
            .and_then(resolve_image_url)
            .or_else(|| self.src.as_deref().and_then(resolve_image_url))
    }

    /// The `src` value when it points at a local (root-relative) path.
    pub fn local_src(&self) -> Option<&str> {
        self.src
            .as_deref()
            .map(str::trim)
            .filter(|s| s.starts_with('/') && !s.starts_with("//"))
    }

    /// Alt text, trimmed, if non-empty.
    pub fn alt_text(&self) -> Option<&str> {
        self.alt.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Replacement for a resolved reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalImage {
    /// Path relative to the public root, without a leading slash.
    pub local_path: String,
    pub alt: String,
}

/// Finds every `<img>` tag in an HTML fragment, in document order.
pub fn image_refs(html: &str) -> Vec<ImageRef> {
    IMG_TAG_RE
        .find_iter(html)
        .map(|m| {
            let (src, data_src, alt) = parse_img_attrs(m.as_str());
            ImageRef {
                start: m.start(),
                end: m.end(),
                src,
                data_src,
                alt,
            }
        })
        .collect()
}

fn parse_img_attrs(tag: &str) -> (Option<String>, Option<String>, Option<String>) {
    let fragment = Html::parse_fragment(tag);
    match fragment.select(&IMG_SELECTOR).next() {
        Some(img) => {
            let attr = |name: &str| img.value().attr(name).map(str::to_string);
            (attr("src"), attr("data-src"), attr("alt"))
        }
        None => (None, None, None),
    }
}

/// Resolves a raw attribute value into an absolute network URL.
///
/// Returns None for empty values, sentinels, inline `data:` URIs and
/// anything that is not http(s). Protocol-relative URLs get `https:`.
pub fn resolve_image_url(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() || SENTINELS.iter().any(|s| raw.eq_ignore_ascii_case(s)) {
        return None;
    }
    if raw
        .get(..5)
        .map(|scheme| scheme.eq_ignore_ascii_case("data:"))
        .unwrap_or(false)
    {
        return None;
    }

    let absolute = if raw.starts_with("//") {
        format!("https:{}", raw)
    } else {
        raw.to_string()
    };

    let parsed = Url::parse(&absolute).ok()?;
    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Some(absolute),
        _ => None,
    }
}

/// Strips the query string and fragment; the result is the dedup key.
pub fn canonical_url(url: &str) -> String {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    url[..end].to_string()
}

/// Extension taken from the last path segment of a URL.
///
/// Wiki thumbnails end in `/scale-to-width-down/100`, which yields `100`.
pub fn url_extension(url: &str) -> String {
    let canonical = canonical_url(url);
    let segment = match Url::parse(&canonical) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or("")
            .to_string(),
        Err(_) => canonical.rsplit('/').next().unwrap_or("").to_string(),
    };
    let ext = segment.rsplit('.').next().unwrap_or("");
    let ext: String = ext
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if ext.is_empty() {
        "img".to_string()
    } else {
        ext
    }
}

/// Maps every non-alphanumeric character to `_` and lowercases.
pub fn sanitize_label(label: &str) -> String {
    label
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// File name for an image of `source` labelled `label`.
///
/// Different labels can sanitize to the same name; the later download
/// overwrites the earlier file.
pub fn asset_file_name(source: &str, label: &str, url: &str) -> String {
    format!(
        "{}_{}.{}",
        sanitize_label(source),
        sanitize_label(label),
        url_extension(url)
    )
}

/// Public-root-relative path of an icon file.
pub fn icon_local_path(file_name: &str) -> String {
    format!("{}/{}", ICONS_DIR, file_name)
}

/// Renders the `<img>` tag that points at a local file.
pub fn local_img_tag(image: &LocalImage) -> String {
    format!(
        r#"<img src="/{}" alt="{}">"#,
        image.local_path,
        escape_attr(&image.alt)
    )
}

/// Rewrites the `<img>` tags of a fragment.
///
/// `resolve` is called for each reference in order; tags for which it
/// returns None are left byte-identical. Returns the new fragment and the
/// number of rewritten tags.
pub fn rewrite_images<F>(html: &str, mut resolve: F) -> (String, usize)
where
    F: FnMut(&ImageRef) -> Option<LocalImage>,
{
    let mut out = String::with_capacity(html.len());
    let mut cursor = 0;
    let mut rewritten = 0;

    for image in image_refs(html) {
        if let Some(local) = resolve(&image) {
            out.push_str(&html[cursor..image.start]);
            out.push_str(&local_img_tag(&local));
            cursor = image.end;
            rewritten += 1;
        }
    }
    out.push_str(&html[cursor..]);

    (out, rewritten)
}

/// Points every `<img>` of a fragment at the same local file.
pub fn replace_all_images(html: &str, image: &LocalImage) -> (String, usize) {
    rewrite_images(html, |_| Some(image.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LAZY: &str = r#"<img alt="True Shot I" src="data:image/gif;base64,R0lGODlhAQABAIABAAAAAP" data-src="https://static.wikia.nocookie.net/hades/images/7/7d/True_Shot_I.png/revision/latest/scale-to-width-down/100?cb=20240604204328" class="lazyload">"#;

    #[test]
    fn test_data_src_beats_inline_src() {
        let refs = image_refs(LAZY);
        assert_eq!(refs.len(), 1);
        assert_eq!(
            refs[0].candidate().as_deref(),
            Some("https://static.wikia.nocookie.net/hades/images/7/7d/True_Shot_I.png/revision/latest/scale-to-width-down/100?cb=20240604204328")
        );
        assert_eq!(refs[0].alt_text(), Some("True Shot I"));
    }

    #[test]
    fn test_data_src_preferred_over_network_src() {
        let refs = image_refs(r#"<img src="https://a.example/small.png" data-src="https://a.example/big.png">"#);
        assert_eq!(refs[0].candidate().as_deref(), Some("https://a.example/big.png"));
    }

    #[test]
    fn test_src_used_when_no_data_src() {
        let refs = image_refs(r#"<IMG SRC="//cdn.example/x.png">"#);
        assert_eq!(refs[0].candidate().as_deref(), Some("https://cdn.example/x.png"));
    }

    #[test]
    fn test_unusable_references() {
        for tag in [
            r#"<img src="">"#,
            r#"<img src="about:blank">"#,
            r#"<img src="data:image/gif;base64,AAAA">"#,
            r#"<img src="/images/icons/zeus_x.100" alt="x">"#,
            r#"<img>"#,
        ] {
            let refs = image_refs(tag);
            assert_eq!(refs[0].candidate(), None, "{}", tag);
        }
    }

    #[test]
    fn test_canonical_url_strips_query() {
        assert_eq!(canonical_url("https://a/b.png?cb=1#x"), "https://a/b.png");
        assert_eq!(canonical_url("https://a/b.png"), "https://a/b.png");
    }

    #[test]
    fn test_asset_file_name() {
        let url = "https://static.example/images/True_Shot_I.png/revision/latest/scale-to-width-down/100?cb=2";
        assert_eq!(
            asset_file_name("artemis", "True Shot I", url),
            "artemis_true_shot_i.100"
        );
        assert_eq!(
            asset_file_name("zeus", "Hunter's Flare", "https://x.example/a/flare.PNG"),
            "zeus_hunter_s_flare.png"
        );
        assert_eq!(asset_file_name("zeus", "a", "https://x.example/"), "zeus_a.img");
    }

    #[test]
    fn test_rewrite_leaves_unresolved_tags() {
        let html = format!(r#"<span>{}</span><br><img src="about:blank"><b>Name</b>"#, LAZY);
        let (out, n) = rewrite_images(&html, |r| {
            r.candidate().map(|_| LocalImage {
                local_path: "images/icons/artemis_true_shot_i.100".to_string(),
                alt: "True Shot I".to_string(),
            })
        });
        assert_eq!(n, 1);
        assert_eq!(
            out,
            r#"<span><img src="/images/icons/artemis_true_shot_i.100" alt="True Shot I"></span><br><img src="about:blank"><b>Name</b>"#
        );
        // A rewritten fragment has nothing left to resolve.
        assert!(image_refs(&out).iter().all(|r| r.candidate().is_none()));
        assert_eq!(image_refs(&out)[0].local_src(), Some("/images/icons/artemis_true_shot_i.100"));
    }

    #[test]
    fn test_replace_all_images() {
        let image = LocalImage {
            local_path: "images/icons/zeus_sea_storm.100".to_string(),
            alt: "Sea \"Storm\"".to_string(),
        };
        let (out, n) = replace_all_images(r#"<img src="a"> and <img src="b">"#, &image);
        assert_eq!(n, 2);
        assert_eq!(
            out,
            r#"<img src="/images/icons/zeus_sea_storm.100" alt="Sea &quot;Storm&quot;"> and <img src="/images/icons/zeus_sea_storm.100" alt="Sea &quot;Storm&quot;">"#
        );
    }
}
