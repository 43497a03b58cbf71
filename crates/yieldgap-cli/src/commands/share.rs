use std::path::Path;

use serde_json::json;
use tracing::info;
use yieldgap_core::share::{render_card_svg, render_share_page, LogoSource, ShareConfig, ShareParams};

use crate::cli::{ShareCardArgs, SharePageArgs};
use crate::error::CliError;

use super::CommandResult;

fn write_artifact(output: Option<&Path>, contents: &str) -> Result<Option<String>, CliError> {
    match output {
        Some(path) => {
            std::fs::write(path, contents)?;
            info!(path = %path.display(), bytes = contents.len(), "wrote share artifact");
            Ok(Some(path.display().to_string()))
        }
        None => Ok(None),
    }
}

pub fn page(args: &SharePageArgs) -> Result<CommandResult, CliError> {
    let params = ShareParams::from_query(&args.query)?;
    let defaults = ShareConfig::default();
    let config = ShareConfig {
        site_url: args.site_url.clone().unwrap_or(defaults.site_url),
        image_endpoint: args.image_endpoint.clone().unwrap_or(defaults.image_endpoint),
        ..defaults
    };

    let html = render_share_page(&params, &config);
    let written = write_artifact(args.output.as_deref(), &html)?;

    let inline_html = written.is_none().then_some(html.as_str());
    let data = json!({
        "title": params.title(),
        "image_url": config.image_url(&params),
        "path": written,
        "html": inline_html,
    });
    let text = match &written {
        Some(path) => format!("wrote share page to {path}\n"),
        None => html.clone(),
    };
    Ok(CommandResult::ok("share.page", data, text))
}

pub fn card(args: &ShareCardArgs) -> Result<CommandResult, CliError> {
    let params = if args.generic {
        ShareParams::generic()
    } else {
        ShareParams::from_query(&args.query)?
    };
    let defaults = ShareConfig::default();
    let config = ShareConfig {
        wordmark: args.wordmark.clone().unwrap_or(defaults.wordmark),
        ..defaults
    };

    let chain = config.logo_chain(args.logo.clone());
    let card = render_card_svg(&params, &config, &chain)?;
    let fell_back = args.logo.is_some() && !matches!(card.logo, LogoSource::Asset(_));
    let written = write_artifact(args.output.as_deref(), &card.svg)?;

    let logo = match &card.logo {
        LogoSource::Asset(path) => json!({ "kind": "asset", "path": path.display().to_string() }),
        LogoSource::Text(text) => json!({ "kind": "text", "wordmark": text }),
    };
    let inline_svg = written.is_none().then_some(card.svg.as_str());
    let data = json!({
        "logo": logo,
        "path": written,
        "svg": inline_svg,
    });
    let text = match &written {
        Some(path) => format!("wrote card to {path}\n"),
        None => card.svg.clone(),
    };

    let result = CommandResult::ok("share.card", data, text);
    if fell_back {
        return Ok(result.with_warning("logo asset could not be loaded; used the text wordmark"));
    }
    Ok(result)
}
