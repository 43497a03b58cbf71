use crate::share::{escape_html, ShareConfig, ShareParams, CARD_HEIGHT, CARD_WIDTH};

/// HTML page that unfurls into a rich preview on social platforms and
/// immediately redirects visitors to the calculator.
pub fn render_share_page(params: &ShareParams, config: &ShareConfig) -> String {
    let title = escape_html(&params.title());
    let description = escape_html(&config.description);
    let site_url = escape_html(&config.site_url);
    let image_url = escape_html(&config.image_url(params));

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{title}</title>
  <meta name="description" content="{description}">
  <meta property="og:title" content="{title}">
  <meta property="og:description" content="{description}">
  <meta property="og:image" content="{image_url}">
  <meta property="og:image:width" content="{CARD_WIDTH}">
  <meta property="og:image:height" content="{CARD_HEIGHT}">
  <meta property="og:url" content="{site_url}">
  <meta property="og:type" content="website">
  <meta name="twitter:card" content="summary_large_image">
  <meta name="twitter:title" content="{title}">
  <meta name="twitter:description" content="{description}">
  <meta name="twitter:image" content="{image_url}">
  <meta http-equiv="refresh" content="0; url={site_url}">
</head>
<body>
  <p>Redirecting to <a href="{site_url}">{site_url}</a>...</p>
</body>
</html>
"#
    )
}
