use url::{ParseError, Url};

/// Get the full link to a sub-page or file, given a page's full url.
#[tracing::instrument]
pub fn get_full_link(link: &str, page_url: &Url) -> Option<Url> {
    let link = link.trim();
    if link.is_empty() {
        return None;
    }
    match Url::parse(link) {
        Ok(url) => Some(url),
        Err(e)
            if e == ParseError::EmptyHost
                || e == ParseError::RelativeUrlWithoutBase
                || e == ParseError::RelativeUrlWithCannotBeABaseBase =>
        {
            match page_url.join(link) {
                Ok(u) => Some(u),
                Err(e) => {
                    tracing::error!("Failed to get full link for {}\n{}", link, e);
                    None
                }
            }
        }
        Err(e) => {
            tracing::error!("Failed to get full link for {}", link);
            tracing::error!("{}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_and_absolute_links() {
        let page = Url::parse("https://example.test/docs/index.html").unwrap();
        assert_eq!(
            get_full_link("frame.html", &page).unwrap().as_str(),
            "https://example.test/docs/frame.html"
        );
        assert_eq!(
            get_full_link("/embed/", &page).unwrap().as_str(),
            "https://example.test/embed/"
        );
        assert_eq!(
            get_full_link("https://other.test/x", &page).unwrap().as_str(),
            "https://other.test/x"
        );
        assert!(get_full_link("  ", &page).is_none());
    }
}
