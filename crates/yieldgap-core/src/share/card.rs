use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tracing::{debug, warn};

use crate::share::{escape_html, ShareConfig, ShareParams};
use crate::RenderError;

pub const CARD_WIDTH: u32 = 1200;
pub const CARD_HEIGHT: u32 = 630;

const BACKGROUND: &str = "#0A0A0A";
const ACCENT: &str = "#F7931A";
const MUTED: &str = "#888888";
const FAINT: &str = "#666666";

/// One candidate for the card logo, tried in chain order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoSource {
    /// PNG, JPEG or SVG file embedded as a data URI.
    Asset(PathBuf),
    /// Plain text wordmark. A blank wordmark does not load.
    Text(String),
}

impl LogoSource {
    fn load(&self) -> Result<Option<String>, RenderError> {
        match self {
            Self::Asset(path) => {
                let mime = mime_for(path)?;
                let bytes = std::fs::read(path).map_err(|source| RenderError::AssetLoad {
                    path: path.display().to_string(),
                    source,
                })?;
                let uri = format!("data:{mime};base64,{}", STANDARD.encode(bytes));
                Ok(Some(format!(
                    r#"<image x="64" y="48" height="56" width="240" preserveAspectRatio="xMinYMid meet" href="{uri}"/>"#
                )))
            }
            Self::Text(wordmark) if wordmark.trim().is_empty() => Ok(None),
            Self::Text(wordmark) => Ok(Some(format!(
                r##"<text x="64" y="92" fill="#FFFFFF" font-size="36" font-weight="800" letter-spacing="4">{}</text>"##,
                escape_html(wordmark.trim())
            ))),
        }
    }
}

fn mime_for(path: &Path) -> Result<&'static str, RenderError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("png") => Ok("image/png"),
        Some("jpg" | "jpeg") => Ok("image/jpeg"),
        Some("svg") => Ok("image/svg+xml"),
        _ => Err(RenderError::UnsupportedAsset {
            path: path.display().to_string(),
        }),
    }
}

/// Rendered card plus the logo source that produced its header.
#[derive(Debug, Clone, PartialEq)]
pub struct CardRender {
    pub svg: String,
    pub logo: LogoSource,
}

/// Render the 1200x630 summary card, resolving the logo through `logo_chain`.
pub fn render_card_svg(
    params: &ShareParams,
    config: &ShareConfig,
    logo_chain: &[LogoSource],
) -> Result<CardRender, RenderError> {
    let (logo, logo_markup) = resolve_logo(logo_chain)?;
    let host = escape_html(config.site_host());

    let mut body = String::new();
    if params.generic {
        push_text(&mut body, 64, 250, MUTED, 28, 500, "Most BTC holders are leaving money on the table");
        push_text(&mut body, 64, 340, ACCENT, 80, 800, "How much yield");
        push_text(&mut body, 64, 428, ACCENT, 80, 800, "did you miss?");
        push_text(&mut body, 64, 486, "#FFFFFF", 32, 500, "Enter your BTC amount and start date to find out.");
    } else {
        let (caption, label) = if params.projection {
            ("Projected yield opportunity", "Opportunity")
        } else {
            ("Yield left on the table", "Missed")
        };
        push_text(&mut body, 64, 230, MUTED, 28, 500, caption);
        push_text(
            &mut body,
            64,
            330,
            ACCENT,
            88,
            800,
            &format!("${} {label}", params.missed_label()),
        );
        push_text(
            &mut body,
            64,
            390,
            "#FFFFFF",
            34,
            600,
            &format!("from holding {} BTC without yield", params.btc_label()),
        );
        if !params.start.is_empty() && !params.end.is_empty() {
            push_text(
                &mut body,
                64,
                436,
                FAINT,
                26,
                400,
                &format!("{} \u{2192} {}", params.start, params.end),
            );
        }
    }

    let svg = format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{CARD_WIDTH}" height="{CARD_HEIGHT}" viewBox="0 0 {CARD_WIDTH} {CARD_HEIGHT}" font-family="sans-serif">
<rect width="{CARD_WIDTH}" height="{CARD_HEIGHT}" fill="{BACKGROUND}"/>
{logo_markup}
<text x="1136" y="88" fill="#555555" font-size="22" text-anchor="end">{host}</text>
{body}<line x1="64" y1="520" x2="1136" y2="520" stroke="#2A2A2A" stroke-width="1"/>
<text x="64" y="574" fill="{MUTED}" font-size="22">Calculate your missed yield &#8594;</text>
<rect x="806" y="542" width="330" height="48" rx="8" fill="{ACCENT}"/>
<text x="971" y="574" fill="#000000" font-size="22" font-weight="700" text-anchor="middle">{host}</text>
</svg>
"##
    );

    Ok(CardRender { svg, logo })
}

fn resolve_logo(chain: &[LogoSource]) -> Result<(LogoSource, String), RenderError> {
    for source in chain {
        match source.load() {
            Ok(Some(markup)) => {
                debug!(source = ?source, "card logo resolved");
                return Ok((source.clone(), markup));
            }
            Ok(None) => warn!(source = ?source, "blank logo source, trying next"),
            Err(error) => warn!(%error, "logo source failed, trying next"),
        }
    }
    Err(RenderError::LogoChainExhausted)
}

fn push_text(out: &mut String, x: u32, y: u32, fill: &str, size: u32, weight: u32, text: &str) {
    out.push_str(&format!(
        r#"<text x="{x}" y="{y}" fill="{fill}" font-size="{size}" font-weight="{weight}">{}</text>"#,
        escape_html(text)
    ));
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn wordmark() -> Vec<LogoSource> {
        vec![LogoSource::Text(String::from("YIELDGAP"))]
    }

    #[test]
    fn missed_card_shows_amount_and_range() {
        let params = ShareParams {
            missed: 23_456,
            btc: 1.5,
            start: String::from("Jan 1, 2020"),
            end: String::from("Jan 1, 2024"),
            ..ShareParams::default()
        };
        let card = render_card_svg(&params, &ShareConfig::default(), &wordmark()).expect("card");

        assert!(card.svg.contains(r#"width="1200" height="630""#));
        assert!(card.svg.contains("$23,456 Missed"));
        assert!(card.svg.contains("from holding 1.50 BTC without yield"));
        assert!(card.svg.contains("Jan 1, 2020 \u{2192} Jan 1, 2024"));
    }

    #[test]
    fn projection_card_omits_range_without_both_dates() {
        let params = ShareParams {
            missed: 5,
            projection: true,
            start: String::from("Jan 1, 2020"),
            ..ShareParams::default()
        };
        let card = render_card_svg(&params, &ShareConfig::default(), &wordmark()).expect("card");
        assert!(card.svg.contains("$5 Opportunity"));
        assert!(!card.svg.contains('\u{2192}'));
    }

    #[test]
    fn generic_card_is_a_teaser() {
        let card =
            render_card_svg(&ShareParams::generic(), &ShareConfig::default(), &wordmark()).expect("card");
        assert!(card.svg.contains("did you miss?"));
        assert!(!card.svg.contains("Missed"));
    }

    #[test]
    fn missing_asset_falls_back_to_wordmark() {
        let chain = vec![
            LogoSource::Asset(PathBuf::from("/nonexistent/logo.png")),
            LogoSource::Text(String::from("YIELDGAP")),
        ];
        let card = render_card_svg(&ShareParams::default(), &ShareConfig::default(), &chain)
            .expect("card");
        assert_eq!(card.logo, LogoSource::Text(String::from("YIELDGAP")));
        assert!(card.svg.contains(">YIELDGAP</text>"));
    }

    #[test]
    fn asset_is_embedded_as_data_uri() {
        let mut file = tempfile::Builder::new()
            .suffix(".svg")
            .tempfile()
            .expect("temp file");
        file.write_all(b"<svg/>").expect("write");

        let chain = vec![LogoSource::Asset(file.path().to_path_buf())];
        let card = render_card_svg(&ShareParams::default(), &ShareConfig::default(), &chain)
            .expect("card");

        assert_eq!(card.logo, chain[0]);
        assert!(card.svg.contains("data:image/svg+xml;base64,PHN2Zy8+"));
    }

    #[test]
    fn exhausted_chain_is_an_error() {
        let chain = vec![
            LogoSource::Asset(PathBuf::from("logo.gif")),
            LogoSource::Text(String::from("  ")),
        ];
        let error = render_card_svg(&ShareParams::default(), &ShareConfig::default(), &chain)
            .expect_err("must fail");
        assert!(matches!(error, RenderError::LogoChainExhausted));
        assert!(render_card_svg(&ShareParams::default(), &ShareConfig::default(), &[]).is_err());
    }
}
