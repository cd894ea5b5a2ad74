use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target device or display a crop variant is rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormatTag {
    #[serde(rename = "q4k")]
    Q4k,
    #[serde(rename = "mac")]
    Mac,
    #[serde(rename = "iphone13Pro")]
    Iphone13Pro,
    #[serde(rename = "galaxyA51")]
    GalaxyA51,
    #[serde(rename = "galaxyJ7Pro")]
    GalaxyJ7Pro,
    #[serde(rename = "galaxyS9P")]
    GalaxyS9P,
    #[serde(rename = "iPad")]
    IPad,
}

impl FormatTag {
    pub const ALL: [FormatTag; 7] = [
        FormatTag::Q4k,
        FormatTag::Mac,
        FormatTag::Iphone13Pro,
        FormatTag::GalaxyA51,
        FormatTag::GalaxyJ7Pro,
        FormatTag::GalaxyS9P,
        FormatTag::IPad,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FormatTag::Q4k => "q4k",
            FormatTag::Mac => "mac",
            FormatTag::Iphone13Pro => "iphone13Pro",
            FormatTag::GalaxyA51 => "galaxyA51",
            FormatTag::GalaxyJ7Pro => "galaxyJ7Pro",
            FormatTag::GalaxyS9P => "galaxyS9P",
            FormatTag::IPad => "iPad",
        }
    }

    /// Crop size as `(height, width)` in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            FormatTag::Q4k => (2160, 3840),
            FormatTag::Mac => (1964, 3024),
            FormatTag::Iphone13Pro => (2532, 1170),
            FormatTag::GalaxyA51 => (2400, 1080),
            FormatTag::GalaxyJ7Pro => (1920, 1080),
            FormatTag::GalaxyS9P => (2960, 1440),
            FormatTag::IPad => (2732, 2048),
        }
    }
}

impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormatTag {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FormatTag::ALL
            .iter()
            .copied()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| AppError::InvalidFormat(s.to_string()))
    }
}

/// Builds the download URL for `format` by appending crop parameters to `base_url`.
pub fn resolve(base_url: &str, format: FormatTag) -> String {
    let (height, width) = format.dimensions();
    let separator = if base_url.contains('?') { '&' } else { '?' };
    format!("{}{}fit=crop&h={}&w={}", base_url, separator, height, width)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://images.unsplash.com/photo-1?ixid=abc&ixlib=rb-4.0.3";

    #[test]
    fn iphone_variant_matches_crop_table() {
        assert_eq!(
            resolve(BASE, FormatTag::Iphone13Pro),
            format!("{}&fit=crop&h=2532&w=1170", BASE)
        );
    }

    #[test]
    fn every_tag_resolves_deterministically() {
        for tag in FormatTag::ALL {
            let first = resolve(BASE, tag);
            assert_eq!(first, resolve(BASE, tag));
            let (h, w) = tag.dimensions();
            assert!(first.ends_with(&format!("&fit=crop&h={}&w={}", h, w)));
        }
    }

    #[test]
    fn bare_url_gets_query_separator() {
        assert_eq!(
            resolve("https://cdn.example.com/p.jpg", FormatTag::Q4k),
            "https://cdn.example.com/p.jpg?fit=crop&h=2160&w=3840"
        );
    }

    #[test]
    fn tags_round_trip_through_their_names() {
        for tag in FormatTag::ALL {
            assert_eq!(tag.as_str().parse::<FormatTag>().unwrap(), tag);
            let json = serde_json::to_string(&tag).unwrap();
            assert_eq!(json, format!("\"{}\"", tag));
        }
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let err = "pixel7".parse::<FormatTag>().unwrap_err();
        assert!(matches!(err, AppError::InvalidFormat(ref t) if t == "pixel7"));
        assert!("Mac".parse::<FormatTag>().is_err());
    }
}
