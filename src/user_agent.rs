//! Browser profiles presented by the page fetchers.
//!
//! Publisher sites serve different (or no) markup to unknown clients, so the
//! fetchers identify as a mainstream browser. The profile only selects the
//! `User-Agent` header.

use std::fmt;
use std::str::FromStr;

/// Browser identity used by both fetchers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Browser {
    /// The tool's own User-Agent.
    BestSupported,
    #[default]
    Chrome,
    Edge,
    Firefox,
    Ie,
}

impl Browser {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BestSupported => "BEST_SUPPORTED",
            Self::Chrome => "CHROME",
            Self::Edge => "EDGE",
            Self::Firefox => "FIREFOX",
            Self::Ie => "IE",
        }
    }

    /// `User-Agent` header value for this profile.
    #[must_use]
    pub fn user_agent(self) -> String {
        match self {
            Self::BestSupported => default_user_agent(),
            Self::Chrome => "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36"
                .to_string(),
            Self::Edge => "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36 Edg/131.0.0.0"
                .to_string(),
            Self::Firefox => {
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0"
                    .to_string()
            }
            Self::Ie => "Mozilla/5.0 (Windows NT 10.0; WOW64; Trident/7.0; rv:11.0) like Gecko"
                .to_string(),
        }
    }
}

/// The tool's own User-Agent.
#[must_use]
pub fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("bibfetch/{version} (academic-research-tool)")
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Browser {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "BEST_SUPPORTED" => Ok(Self::BestSupported),
            "CHROME" => Ok(Self::Chrome),
            "EDGE" => Ok(Self::Edge),
            "FIREFOX" | "FF" => Ok(Self::Firefox),
            "IE" => Ok(Self::Ie),
            other => Err(format!(
                "unknown browser `{other}` (expected BEST_SUPPORTED, CHROME, EDGE, FIREFOX or IE)"
            )),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_user_agent_names_tool_and_version() {
        let ua = default_user_agent();
        assert!(ua.ends_with("(academic-research-tool)"), "{ua}");
        assert!(!ua.contains("://"), "{ua}");
        assert_eq!(
            ua.strip_prefix("bibfetch/")
                .and_then(|s| s.split(' ').next()),
            Some(env!("CARGO_PKG_VERSION"))
        );
    }

    #[test]
    fn test_browser_profiles_are_distinct() {
        let agents = [
            Browser::BestSupported,
            Browser::Chrome,
            Browser::Edge,
            Browser::Firefox,
            Browser::Ie,
        ]
        .map(Browser::user_agent);
        for (i, a) in agents.iter().enumerate() {
            for b in &agents[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_browser_from_str() {
        assert_eq!("ff".parse::<Browser>().unwrap(), Browser::Firefox);
        assert_eq!("Chrome".parse::<Browser>().unwrap(), Browser::Chrome);
        assert!("netscape".parse::<Browser>().is_err());
        assert_eq!(Browser::default(), Browser::Chrome);
    }
}
