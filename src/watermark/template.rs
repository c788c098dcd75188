//! Watermark SVG templates and placeholder substitution.
//!
//! Templates live in `assets/watermark/` and are embedded at build time.
//! They contain two placeholders:
//!
//! - `{{name}}` - caller text, XML-escaped before substitution
//! - `{{brand}}` - the brand mark, drawn in a 48x48 slot
//!
//! # Example
//!
//! ```
//! use image_handler::edits::WatermarkStyle;
//! use image_handler::watermark::template::WatermarkTemplate;
//!
//! let template = WatermarkTemplate::for_style(WatermarkStyle::Banner);
//! let svg = template.render("Tom & Jerry", None);
//! assert!(svg.contains("Tom &amp; Jerry"));
//! assert_eq!((template.width, template.height), (340, 64));
//! ```

use regex::{Captures, Regex};
use std::sync::OnceLock;

use crate::edits::WatermarkStyle;

const BANNER_SVG: &str = include_str!("../../assets/watermark/banner.svg");
const CUTE_SVG: &str = include_str!("../../assets/watermark/cute.svg");

/// Side of the square brand slot, in template units.
pub const BRAND_SLOT: u32 = 48;

/// Vector mark drawn when no custom brand image is supplied.
const DEFAULT_BRAND: &str = concat!(
    r##"<circle cx="24" cy="24" r="22" fill="#ffb000"/>"##,
    r##"<path d="M13 31 L24 13 L35 31 Z" fill="#101820"/>"##,
    r##"<circle cx="24" cy="26" r="4" fill="#ffb000"/>"##,
);

/// Regex pattern for matching template placeholders: {{placeholder}}
static PLACEHOLDER_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Gets the compiled placeholder regex.
///
/// The pattern is a constant; `test_placeholder_regex_is_valid` covers it.
fn placeholder_pattern() -> &'static Regex {
    PLACEHOLDER_PATTERN
        .get_or_init(|| Regex::new(r"\{\{(\w+)\}\}").expect("Invalid placeholder regex"))
}

/// A fixed-size watermark template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatermarkTemplate {
    pub style: WatermarkStyle,
    pub width: u32,
    pub height: u32,
    svg: &'static str,
}

impl WatermarkTemplate {
    pub fn for_style(style: WatermarkStyle) -> Self {
        match style {
            WatermarkStyle::Banner => Self {
                style,
                width: 340,
                height: 64,
                svg: BANNER_SVG,
            },
            WatermarkStyle::Cute => Self {
                style,
                width: 150,
                height: 150,
                svg: CUTE_SVG,
            },
        }
    }

    /// Produce the SVG markup for `name`, with `brand_png` (PNG bytes) in
    /// the brand slot or the built-in mark when `None`.
    pub fn render(&self, name: &str, brand_png: Option<&[u8]>) -> String {
        let brand = match brand_png {
            Some(png) => brand_image(png),
            None => DEFAULT_BRAND.to_string(),
        };

        placeholder_pattern()
            .replace_all(self.svg, |caps: &Captures| match &caps[1] {
                "name" => escape_xml(name),
                "brand" => brand.clone(),
                _ => caps[0].to_string(),
            })
            .into_owned()
    }
}

fn brand_image(png: &[u8]) -> String {
    use base64::Engine;
    let encoded = base64::engine::general_purpose::STANDARD.encode(png);
    format!(
        r#"<image x="0" y="0" width="{size}" height="{size}" preserveAspectRatio="xMidYMid meet" href="data:image/png;base64,{encoded}"/>"#,
        size = BRAND_SLOT,
    )
}

/// Escape the five XML special characters.
pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
