use std::borrow::Cow;

use crate::domain::calendar::format_short;
use crate::share::format_usd;
use crate::{SimulationResult, ValidationError};

/// Figures carried in a share link.
///
/// Parsing is lenient the way share links need to be: missing keys take
/// defaults and unknown keys are ignored. Only a present but unparsable
/// number is an error.
#[derive(Debug, Clone, PartialEq)]
pub struct ShareParams {
    /// Missed (or projected) value in whole USD.
    pub missed: i64,
    pub btc: f64,
    /// Display dates, e.g. `Jan 1, 2020`. Empty when absent.
    pub start: String,
    pub end: String,
    pub projection: bool,
    /// Teaser card without personal figures.
    pub generic: bool,
}

impl Default for ShareParams {
    fn default() -> Self {
        Self {
            missed: 0,
            btc: 1.0,
            start: String::new(),
            end: String::new(),
            projection: false,
            generic: false,
        }
    }
}

impl ShareParams {
    /// The end date of a projected run is the projection horizon.
    pub fn from_result(result: &SimulationResult) -> Self {
        let end = result
            .projection
            .as_ref()
            .map(|segment| segment.until)
            .unwrap_or(result.end_date);

        Self {
            missed: result.summary.total_missed_usd.round() as i64,
            btc: round_btc(result.initial_quantity),
            start: format_short(result.start_date),
            end: format_short(end),
            projection: result.is_projection(),
            generic: false,
        }
    }

    pub fn generic() -> Self {
        Self {
            generic: true,
            ..Self::default()
        }
    }

    pub fn btc_label(&self) -> String {
        format!("{:.2}", self.btc)
    }

    pub fn missed_label(&self) -> String {
        format_usd(self.missed)
    }

    pub fn title(&self) -> String {
        if self.projection {
            format!(
                "I could gain ${} by earning yield on my {} BTC",
                self.missed_label(),
                self.btc_label()
            )
        } else {
            format!(
                "I left ${} on the table by not earning yield on my {} BTC",
                self.missed_label(),
                self.btc_label()
            )
        }
    }

    pub fn to_query(&self) -> String {
        if self.generic {
            return String::from("generic=1");
        }

        let mut pairs = vec![
            (String::from("missed"), self.missed.to_string()),
            (String::from("btc"), self.btc_label()),
        ];
        if !self.start.is_empty() {
            pairs.push((String::from("start"), self.start.clone()));
        }
        if !self.end.is_empty() {
            pairs.push((String::from("end"), self.end.clone()));
        }
        let projection = if self.projection { "1" } else { "0" };
        pairs.push((String::from("projection"), String::from(projection)));

        pairs
            .iter()
            .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Accepts the query with or without a leading `?`.
    pub fn from_query(query: &str) -> Result<Self, ValidationError> {
        let mut params = Self::default();

        for pair in query.trim_start_matches('?').split('&') {
            if pair.is_empty() {
                continue;
            }
            let (key, raw) = pair.split_once('=').unwrap_or((pair, ""));
            let value = decode(raw);

            match key {
                "missed" => params.missed = parse_missed(&value)?,
                "btc" => params.btc = parse_btc(&value)?,
                "start" => params.start = value.into_owned(),
                "end" => params.end = value.into_owned(),
                "projection" => params.projection = value == "1",
                "generic" => params.generic = value == "1",
                _ => {}
            }
        }

        Ok(params)
    }
}

fn round_btc(quantity: f64) -> f64 {
    (quantity * 100.0).round() / 100.0
}

fn decode(raw: &str) -> Cow<'_, str> {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => Cow::Owned(decoded.into_owned()),
        Err(_) => Cow::Borrowed(raw),
    }
}

fn parse_missed(value: &str) -> Result<i64, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    // Fractional amounts are truncated toward zero.
    let whole = trimmed.split('.').next().unwrap_or(trimmed);
    whole
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidShareParam {
            field: "missed",
            value: value.to_owned(),
        })
}

fn parse_btc(value: &str) -> Result<f64, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(1.0);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|btc| btc.is_finite())
        .map(round_btc)
        .ok_or_else(|| ValidationError::InvalidShareParam {
            field: "btc",
            value: value.to_owned(),
        })
}
