//! Social sharing surface: query parameters, the redirecting share page and
//! the 1200x630 summary card.

mod card;
mod page;
mod params;

pub use card::{render_card_svg, CardRender, LogoSource, CARD_HEIGHT, CARD_WIDTH};
pub use page::render_share_page;
pub use params::ShareParams;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Static text and URLs baked into shared pages and cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareConfig {
    /// Calculator URL the share page redirects to.
    pub site_url: String,
    /// Endpoint serving the share page; the share query is appended.
    pub share_endpoint: String,
    /// Endpoint serving the card image; the share query is appended.
    pub image_endpoint: String,
    pub description: String,
    /// Text logo used when no image asset loads.
    pub wordmark: String,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            site_url: String::from("https://www.btcyieldcalculator.com"),
            share_endpoint: String::from("https://www.btcyieldcalculator.com/api/share"),
            image_endpoint: String::from("https://www.btcyieldcalculator.com/api/og"),
            description: String::from(
                "Calculate how much yield you missed on your Bitcoin.",
            ),
            wordmark: String::from("YIELDGAP"),
        }
    }
}

impl ShareConfig {
    pub fn share_url(&self, params: &ShareParams) -> String {
        format!("{}?{}", self.share_endpoint, params.to_query())
    }

    pub fn image_url(&self, params: &ShareParams) -> String {
        format!("{}?{}", self.image_endpoint, params.to_query())
    }

    /// Optional image asset first, then the configured wordmark.
    pub fn logo_chain(&self, asset: Option<PathBuf>) -> Vec<LogoSource> {
        asset
            .into_iter()
            .map(LogoSource::Asset)
            .chain(std::iter::once(LogoSource::Text(self.wordmark.clone())))
            .collect()
    }

    /// Host part of `site_url`, shown in the card header and call to action.
    pub fn site_host(&self) -> &str {
        let without_scheme = self
            .site_url
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&self.site_url);
        without_scheme.trim_end_matches('/')
    }
}

/// Whole dollars with en-US thousands separators: `-1234567` -> `-1,234,567`.
pub fn format_usd(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if amount < 0 {
        grouped.push('-');
    }
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

pub(crate) fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(format_usd(0), "0");
        assert_eq!(format_usd(999), "999");
        assert_eq!(format_usd(1_000), "1,000");
        assert_eq!(format_usd(1_234_567), "1,234,567");
        assert_eq!(format_usd(-45_000), "-45,000");
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<a href="x">&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn share_url_appends_query() {
        let params = ShareParams {
            missed: 42,
            ..ShareParams::default()
        };
        assert_eq!(
            ShareConfig::default().share_url(&params),
            "https://www.btcyieldcalculator.com/api/share?missed=42&btc=1.00&projection=0"
        );
    }

    #[test]
    fn site_host_strips_scheme() {
        assert_eq!(ShareConfig::default().site_host(), "www.btcyieldcalculator.com");
    }
}
