//! Survey branding value and its validation rules.
//!
//! Branding is replaced wholesale; it has no identity of its own and is
//! always embedded in exactly one survey.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::ValidateUrl;

use crate::error::CoreError;

/// Maximum allowed length for a font family name.
pub const MAX_FONT_LENGTH: usize = 100;

/// Matches `#RGB` and `#RRGGBB` colors.
const HEX_COLOR_PATTERN: &str = r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$";

static HEX_COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(HEX_COLOR_PATTERN).expect("valid regex"));

/// Visual configuration of a survey.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branding {
    pub logo_url: Option<String>,
    pub primary_color: Option<String>,
    pub font: Option<String>,
}

/// Validate a branding value: hex color, well-formed logo URL, and a
/// non-blank font name within [`MAX_FONT_LENGTH`].
pub fn validate_branding(branding: &Branding) -> Result<(), CoreError> {
    if let Some(color) = &branding.primary_color {
        if !HEX_COLOR_RE.is_match(color) {
            return Err(CoreError::Validation(format!(
                "Primary color '{color}' must be a hex color like #1a2b3c"
            )));
        }
    }

    if let Some(url) = &branding.logo_url {
        if !url.validate_url() {
            return Err(CoreError::Validation(format!(
                "Logo URL '{url}' is not a valid URL"
            )));
        }
    }

    if let Some(font) = &branding.font {
        if font.trim().is_empty() {
            return Err(CoreError::Validation(
                "Font must not be empty".to_string(),
            ));
        }
        let length = font.chars().count();
        if length > MAX_FONT_LENGTH {
            return Err(CoreError::Validation(format!(
                "Font must not exceed {MAX_FONT_LENGTH} characters, got {length}"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn branding(logo: Option<&str>, color: Option<&str>, font: Option<&str>) -> Branding {
        Branding {
            logo_url: logo.map(str::to_string),
            primary_color: color.map(str::to_string),
            font: font.map(str::to_string),
        }
    }

    #[test]
    fn empty_branding_is_valid() {
        assert!(validate_branding(&Branding::default()).is_ok());
    }

    #[test]
    fn full_branding_is_valid() {
        let b = branding(
            Some("https://cdn.example.com/logo.png"),
            Some("#1A2b3C"),
            Some("Inter"),
        );
        assert!(validate_branding(&b).is_ok());
    }

    #[test]
    fn short_hex_color_is_valid() {
        assert!(validate_branding(&branding(None, Some("#fff"), None)).is_ok());
    }

    #[test]
    fn rejects_color_without_hash() {
        assert!(validate_branding(&branding(None, Some("ffffff"), None)).is_err());
    }

    #[test]
    fn rejects_named_color() {
        let err = validate_branding(&branding(None, Some("red"), None)).unwrap_err();
        assert!(err.to_string().contains("hex color"));
    }

    #[test]
    fn rejects_non_hex_digits() {
        assert!(validate_branding(&branding(None, Some("#12345g"), None)).is_err());
    }

    #[test]
    fn rejects_malformed_url() {
        let err = validate_branding(&branding(Some("not a url"), None, None)).unwrap_err();
        assert!(err.to_string().contains("Logo URL"));
    }

    #[test]
    fn rejects_blank_font() {
        assert!(validate_branding(&branding(None, None, Some("  "))).is_err());
    }

    #[test]
    fn rejects_overlong_font() {
        let font = "f".repeat(MAX_FONT_LENGTH + 1);
        assert!(validate_branding(&branding(None, None, Some(&font))).is_err());
    }

    #[test]
    fn font_limit_counts_characters() {
        let font = "ö".repeat(MAX_FONT_LENGTH);
        assert!(validate_branding(&branding(None, None, Some(&font))).is_ok());
    }
}
