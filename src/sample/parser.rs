//! Recognized tooltip text → `ParsedSample`.
//!
//! A tooltip reads like `2024/03/15 Bitcoin - Transactions: 450.2k`, though
//! OCR may reorder lines, split words, or misread the year's leading digit.

use chrono::NaiveDate;
use regex::Regex;
use thiserror::Error;

use super::correction::YearDigitCorrection;
use super::{ParsedSample, date_to_epoch_millis};
use crate::config::ParseConfig;

/// Year, month and day, with the year's leading digit captured separately
/// so it can be corrected before the date is parsed.
const DATE_PATTERN: &str = r"(\d)(\d{3})/([01]\d)/([0-3]\d)";

/// A date token sitting between the label and the value.
const LEADING_DATE_PATTERN: &str = r"^\s*\d{4}/\d{2}/\d{2}";

/// Why a recognized text produced no sample.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseRejection {
    #[error("marker not found in text")]
    MarkerAbsent,
    #[error("no date found")]
    MissingDate,
    #[error("'{0}' is not a calendar date")]
    InvalidDate(String),
    #[error("year {0} is outside the plausible range")]
    DateOutOfRange(i32),
    #[error("no value after the label")]
    MissingValue,
    #[error("could not convert value '{0}'")]
    NonNumericValue(String),
}

/// Parses tooltip text for one series.
#[derive(Debug, Clone)]
pub struct SampleParser {
    /// Whitespace-collapsed "<series> - <label>"
    marker: String,
    date_regex: Regex,
    leading_date_regex: Regex,
    value_regex: Regex,
    correction: YearDigitCorrection,
    unit_exponent: u32,
    min_year: i32,
    max_year: i32,
}

impl SampleParser {
    /// Builds a parser for `series_name` (e.g. "Bitcoin") using the label,
    /// unit and correction rules in `rules`.
    pub fn new(series_name: &str, rules: &ParseConfig) -> Result<Self, regex::Error> {
        let marker = collapse_whitespace(&format!("{} - {}", series_name, rules.value_label));
        let value_regex = Regex::new(&format!(
            r"^\s*([0-9.](?:[0-9,. ]*[0-9.])?)\s*(?i:{})",
            regex::escape(&rules.unit_suffix)
        ))?;

        Ok(Self {
            marker,
            date_regex: Regex::new(DATE_PATTERN)?,
            leading_date_regex: Regex::new(LEADING_DATE_PATTERN)?,
            value_regex,
            correction: YearDigitCorrection::new(rules.year_digit_corrections.clone()),
            unit_exponent: rules.unit_exponent,
            min_year: rules.min_year,
            max_year: rules.max_year,
        })
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Accepts `text` as a sample or says why not.
    pub fn parse(&self, text: &str) -> Result<ParsedSample, ParseRejection> {
        let normalized = collapse_whitespace(text);

        let marker_at = normalized
            .find(&self.marker)
            .ok_or(ParseRejection::MarkerAbsent)?;

        let date = self.extract_date(&normalized)?;

        let after_marker = &normalized[marker_at + self.marker.len()..];
        let value = self.extract_value(after_marker)?;

        Ok(ParsedSample {
            timestamp: date_to_epoch_millis(date),
            value,
        })
    }

    fn extract_date(&self, text: &str) -> Result<NaiveDate, ParseRejection> {
        let caps = self
            .date_regex
            .captures(text)
            .ok_or(ParseRejection::MissingDate)?;

        let year_str = self.correction.apply(&format!("{}{}", &caps[1], &caps[2]));
        let date_str = format!("{}/{}/{}", year_str, &caps[3], &caps[4]);

        let year: i32 = year_str
            .parse()
            .map_err(|_| ParseRejection::InvalidDate(date_str.clone()))?;
        if year < self.min_year || year > self.max_year {
            return Err(ParseRejection::DateOutOfRange(year));
        }

        NaiveDate::parse_from_str(&date_str, "%Y/%m/%d")
            .map_err(|_| ParseRejection::InvalidDate(date_str))
    }

    fn extract_value(&self, after_marker: &str) -> Result<f64, ParseRejection> {
        let rest = match self.leading_date_regex.find(after_marker) {
            Some(m) => &after_marker[m.end()..],
            None => after_marker,
        };

        let Some(caps) = self.value_regex.captures(rest) else {
            return match rest.split_whitespace().next() {
                Some(word) => Err(ParseRejection::NonNumericValue(word.to_string())),
                None => Err(ParseRejection::MissingValue),
            };
        };

        let token = &caps[1];
        scale_decimal(token, self.unit_exponent)
            .filter(|v| v.is_finite() && *v >= 0.0)
            .ok_or_else(|| ParseRejection::NonNumericValue(token.trim().to_string()))
    }
}

/// Collapses every whitespace run (including newlines) into one space.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parses a decimal token and multiplies it by `10^exponent`.
///
/// Spaces and commas are thousands separators and dropped. The multiplication
/// is done by moving the decimal point in the digit string, so "450.2" with
/// exponent 3 yields exactly 450200.0.
pub fn scale_decimal(token: &str, exponent: u32) -> Option<f64> {
    let cleaned: String = token.chars().filter(|c| *c != ' ' && *c != ',').collect();

    if !cleaned.chars().any(|c| c.is_ascii_digit())
        || !cleaned.chars().all(|c| c.is_ascii_digit() || c == '.')
        || cleaned.matches('.').count() > 1
    {
        return None;
    }

    let (int_part, frac_part) = cleaned.split_once('.').unwrap_or((cleaned.as_str(), ""));
    let shift = (exponent as usize).min(frac_part.len());
    let (moved, remaining) = frac_part.split_at(shift);

    let mut shifted = String::with_capacity(cleaned.len() + exponent as usize);
    shifted.push_str(int_part);
    shifted.push_str(moved);
    shifted.extend(std::iter::repeat_n('0', exponent as usize - shift));
    if !remaining.is_empty() {
        shifted.push('.');
        shifted.push_str(remaining);
    }

    shifted.parse::<f64>().ok()
}
