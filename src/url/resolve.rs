use crate::{UrlError, UrlResult};
use url::Url;

/// Directory holding every book detail page, relative to the site root
const CATALOGUE_DIR: &str = "catalogue/";

/// Strips leading `../` and `./` segments from a relative link
///
/// Listing pages sit at different depths, so the same detail page is linked
/// as `../../../name_1/index.html` from a category and `name_1/index.html`
/// from the catalogue root. Removing the prefix gives a site-rooted path.
///
/// # Examples
///
/// ```
/// use shelfscan::url::strip_relative_prefix;
///
/// assert_eq!(strip_relative_prefix("../../../a_1/index.html"), "a_1/index.html");
/// assert_eq!(strip_relative_prefix("./media/x.jpg"), "media/x.jpg");
/// ```
pub fn strip_relative_prefix(href: &str) -> &str {
    let mut rest = href.trim();
    loop {
        if let Some(stripped) = rest.strip_prefix("../") {
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix("./") {
            rest = stripped;
        } else {
            return rest.trim_start_matches('/');
        }
    }
}

/// Resolves a book detail link to an absolute URL under `<base>/catalogue/`
///
/// Absolute http(s) links are returned unchanged. Links that already carry
/// the `catalogue/` segment are rooted at the base instead of doubling it.
pub fn catalogue_url(base: &Url, href: &str) -> UrlResult<Url> {
    if let Some(absolute) = absolute_link(href)? {
        return Ok(absolute);
    }

    let path = strip_relative_prefix(href);
    if path.is_empty() {
        return Err(UrlError::Empty);
    }

    let joined = if path.starts_with(CATALOGUE_DIR) {
        base.join(path)
    } else {
        base.join(CATALOGUE_DIR).and_then(|dir| dir.join(path))
    };

    joined.map_err(|e| UrlError::Parse(format!("{}: {}", href, e)))
}

/// Resolves an image path (e.g. `../../media/cache/x.jpg`) against the site root
pub fn media_url(base: &Url, src: &str) -> UrlResult<Url> {
    if let Some(absolute) = absolute_link(src)? {
        return Ok(absolute);
    }

    let path = strip_relative_prefix(src);
    if path.is_empty() {
        return Err(UrlError::Empty);
    }

    base.join(path)
        .map_err(|e| UrlError::Parse(format!("{}: {}", src, e)))
}

/// Resolves a link relative to the page it appears on
///
/// Used for navigation and "next page" links, which are relative to the
/// current listing page rather than to the site root.
pub fn resolve_against(current: &Url, href: &str) -> UrlResult<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return Err(UrlError::Empty);
    }

    let resolved = current
        .join(href)
        .map_err(|e| UrlError::Parse(format!("{}: {}", href, e)))?;

    match resolved.scheme() {
        "http" | "https" => Ok(resolved),
        other => Err(UrlError::InvalidScheme(other.to_string())),
    }
}

/// Parses a site base URL, making sure its path ends with `/`
///
/// Without the trailing slash `Url::join` would replace the last path
/// segment instead of appending to it.
pub fn parse_base_url(base: &str) -> UrlResult<Url> {
    let mut url = Url::parse(base.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}

/// Returns the link parsed as-is when it is already an absolute http(s) URL
fn absolute_link(href: &str) -> UrlResult<Option<Url>> {
    let href = href.trim();
    if !(href.starts_with("http://") || href.starts_with("https://")) {
        return Ok(None);
    }

    Url::parse(href)
        .map(Some)
        .map_err(|e| UrlError::Parse(format!("{}: {}", href, e)))
}
