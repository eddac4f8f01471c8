use crate::CoreResult;
use tracing::debug;
use url::Url;

/// Read access to the current page address
pub trait Location {
    /// Value of query parameter `name`, `None` when absent or empty
    fn query_param(&self, name: &str) -> Option<String>;
}

/// Page address backed by a parsed `Url`.
///
/// The storefront's variant picker rewrites the address in place
/// (history.replaceState); `navigate` and `set_query_param` model that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    url: Url,
}

impl PageLocation {
    pub fn parse(href: &str) -> CoreResult<Self> {
        Ok(Self { url: Url::parse(href)? })
    }

    pub fn href(&self) -> &str {
        self.url.as_str()
    }

    pub fn navigate(&mut self, href: &str) -> CoreResult<()> {
        // Relative addresses resolve against the current page
        self.url = self.url.join(href)?;
        debug!(href = %self.url, "Page address changed");
        Ok(())
    }

    /// Set `name=value`, replacing any existing occurrences
    pub fn set_query_param(&mut self, name: &str, value: &str) {
        let kept: Vec<(String, String)> = self
            .url
            .query_pairs()
            .filter(|(key, _)| key != name)
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        let mut pairs = self.url.query_pairs_mut();
        pairs.clear();
        for (key, existing) in &kept {
            pairs.append_pair(key, existing);
        }
        pairs.append_pair(name, value);
    }
}

impl Location for PageLocation {
    fn query_param(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_variant_param() {
        let location = PageLocation::parse("https://shop.example/products/tee?variant=4402&ref=x").unwrap();
        assert_eq!(location.query_param("variant").as_deref(), Some("4402"));
        assert_eq!(location.query_param("missing"), None);
    }

    #[test]
    fn test_empty_param_reads_as_absent() {
        let location = PageLocation::parse("https://shop.example/products/tee?variant=").unwrap();
        assert_eq!(location.query_param("variant"), None);
    }

    #[test]
    fn test_navigate_resolves_relative_address() {
        let mut location = PageLocation::parse("https://shop.example/products/tee").unwrap();
        location.navigate("?variant=7").unwrap();
        assert_eq!(location.href(), "https://shop.example/products/tee?variant=7");
    }

    #[test]
    fn test_set_query_param_keeps_other_pairs() {
        let mut location = PageLocation::parse("https://shop.example/p?ref=a&variant=1").unwrap();
        location.set_query_param("variant", "2");
        assert_eq!(location.query_param("variant").as_deref(), Some("2"));
        assert_eq!(location.query_param("ref").as_deref(), Some("a"));
    }

    #[test]
    fn test_rejects_garbage_address() {
        assert!(PageLocation::parse("not a url").is_err());
    }
}
