//! Device identifier tag parsing
//!
//! Acquisition clients stamp every upload with a single identifier string of
//! the form `<name>_Gain-<g>_Apo-<a>_Avg-<n>_'<message>'`, where every
//! segment after the name is optional. This crate extracts those fields into
//! a plain record and renders a record back into the same convention.
//!
//! Parsing is a total function: any input, however malformed, yields a
//! record. Missing tags come back as `None`, which stays distinct from an
//! empty captured value.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Compiled patterns for the identifier segments
mod patterns {
    use super::*;

    /// `Gain-<value>` at the start of the string or right after an
    /// underscore; the value is the maximal run up to the next underscore.
    pub static GAIN: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)(?:^|_)gain-([^_]+)").expect("Invalid regex pattern"));

    pub static APO: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)(?:^|_)apo-([^_]+)").expect("Invalid regex pattern"));

    pub static AVG: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)(?:^|_)avg-([^_]+)").expect("Invalid regex pattern"));

    /// First well-formed pair of single quotes; a lone quote never matches.
    pub static MSG: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"'([^']*)'").expect("Invalid regex pattern"));

    /// Device name runs until the first tag boundary, or to end of string
    /// when no tag is present. The boundary requires a leading underscore,
    /// so a tag at position zero still counts as part of the name.
    pub static DEVICE_NAME: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?i)^(.*?)(?:_gain-|_apo-|_avg-|$)").expect("Invalid regex pattern")
    });
}

/// Metadata carried in a device identifier string
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeviceMeta {
    /// Leading segment before the first recognized tag, not trimmed
    pub device_name: String,
    /// Gain setting, e.g. `3dB`
    pub gain: Option<String>,
    /// Apodization setting
    pub apo: Option<String>,
    /// Averaging count
    pub avg: Option<String>,
    /// Free-text message from the single-quoted suffix
    pub msg: Option<String>,
}

impl DeviceMeta {
    /// Parse a device identifier string. See [`parse`].
    pub fn parse(input: &str) -> Self {
        parse(input)
    }
}

fn first_capture(re: &Regex, input: &str) -> Option<String> {
    re.captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Extract metadata fields from a device identifier string.
///
/// Each tag is searched independently and the first occurrence wins; tag
/// keywords match case-insensitively while captured values keep their
/// original casing. Never fails: an unrecognizable input produces a record
/// whose `device_name` is the whole input and whose other fields are `None`.
pub fn parse(input: &str) -> DeviceMeta {
    if input.is_empty() {
        return DeviceMeta::default();
    }

    let device_name = match first_capture(&patterns::DEVICE_NAME, input) {
        Some(name) => name,
        None => input.to_string(),
    };

    let meta = DeviceMeta {
        device_name,
        gain: first_capture(&patterns::GAIN, input),
        apo: first_capture(&patterns::APO, input),
        avg: first_capture(&patterns::AVG, input),
        msg: first_capture(&patterns::MSG, input),
    };
    trace!(?meta, "parsed device identifier");
    meta
}

/// Parse an identifier that may be absent; `None` is treated as an empty
/// string, not an error.
pub fn parse_opt(input: Option<&str>) -> DeviceMeta {
    parse(input.unwrap_or_default())
}

impl fmt::Display for DeviceMeta {
    /// Renders the record back into identifier form, emitting only the
    /// present segments in canonical order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.device_name)?;
        if let Some(gain) = &self.gain {
            write!(f, "_Gain-{gain}")?;
        }
        if let Some(apo) = &self.apo {
            write!(f, "_Apo-{apo}")?;
        }
        if let Some(avg) = &self.avg {
            write!(f, "_Avg-{avg}")?;
        }
        if let Some(msg) = &self.msg {
            write!(f, "_'{msg}'")?;
        }
        Ok(())
    }
}
