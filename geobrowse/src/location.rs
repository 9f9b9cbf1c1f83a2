//! Location string syntax.
//!
//! A location is `baseUri` optionally followed by `|key=value` suffix
//! segments carrying backend-specific selection parameters for composite
//! layers. Recognized keys are `layers`, `styles`, `format`, and `crs`;
//! anything else is preserved verbatim in `extra`.

/// Backend-specific selection parameters split out of a location string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationParams {
    /// Comma-separated `layers=` selector, split into parts.
    pub layers: Vec<String>,
    /// Comma-separated `styles=` selector, split into parts.
    pub styles: Vec<String>,
    /// `format=` hint, if present.
    pub format: Option<String>,
    /// `crs=` hint, if present.
    pub crs: Option<String>,
    /// Unrecognized `key=value` segments, preserved in order.
    pub extra: Vec<(String, String)>,
}

impl LocationParams {
    /// Returns true if no parameter segment was present.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
            && self.styles.is_empty()
            && self.format.is_none()
            && self.crs.is_none()
            && self.extra.is_empty()
    }
}

/// A location string split into its base URI and suffix parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLocation {
    /// The location with all `|key=value` segments removed.
    pub base: String,
    /// Parsed suffix parameters.
    pub params: LocationParams,
}

/// Split a location string into base URI and `|key=value` parameters.
///
/// Parsing is total: malformed segments (no `=`) are kept as extras with an
/// empty value rather than rejected.
pub fn parse_location(location: &str) -> ParsedLocation {
    let mut parts = location.split('|');
    let base = parts.next().unwrap_or_default().to_string();
    let mut params = LocationParams::default();

    for part in parts {
        let (key, value) = match part.find('=') {
            Some(pos) => (&part[..pos], &part[pos + 1..]),
            None => (part, ""),
        };
        match key {
            "layers" => params.layers = split_list(value),
            "styles" => params.styles = split_list(value),
            "format" => params.format = Some(value.to_string()),
            "crs" => params.crs = Some(value.to_string()),
            _ => params.extra.push((key.to_string(), value.to_string())),
        }
    }

    ParsedLocation { base, params }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
