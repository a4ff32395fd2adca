//! `format` assertions.
//!
//! Only the formats named by draft-06 (plus `date`, `time` and `regex`, which
//! the meta-schema and common schemas rely on) are asserted. Unknown format
//! names compile to no constraint.

use std::net::{Ipv4Addr, Ipv6Addr};

use chrono::{DateTime, NaiveDate};
use url::Url;

/// Base used to check that a relative reference can be resolved.
const REFERENCE_BASE: &str = "json-schema:///";

/// A recognized `format` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    DateTime,
    Date,
    Time,
    Email,
    Hostname,
    Ipv4,
    Ipv6,
    Uri,
    UriReference,
    UriTemplate,
    JsonPointer,
    Regex,
}

impl Format {
    /// Look up a format by its keyword value.
    pub fn from_name(name: &str) -> Option<Self> {
        let format = match name {
            "date-time" => Self::DateTime,
            "date" => Self::Date,
            "time" => Self::Time,
            "email" => Self::Email,
            "hostname" => Self::Hostname,
            "ipv4" => Self::Ipv4,
            "ipv6" => Self::Ipv6,
            "uri" => Self::Uri,
            "uri-reference" => Self::UriReference,
            "uri-template" => Self::UriTemplate,
            "json-pointer" => Self::JsonPointer,
            "regex" => Self::Regex,
            _ => return None,
        };
        Some(format)
    }

    /// The keyword value naming this format.
    pub fn name(&self) -> &'static str {
        match self {
            Self::DateTime => "date-time",
            Self::Date => "date",
            Self::Time => "time",
            Self::Email => "email",
            Self::Hostname => "hostname",
            Self::Ipv4 => "ipv4",
            Self::Ipv6 => "ipv6",
            Self::Uri => "uri",
            Self::UriReference => "uri-reference",
            Self::UriTemplate => "uri-template",
            Self::JsonPointer => "json-pointer",
            Self::Regex => "regex",
        }
    }

    /// Returns true if `value` conforms to this format.
    pub fn check(&self, value: &str) -> bool {
        match self {
            Self::DateTime => DateTime::parse_from_rfc3339(value).is_ok(),
            Self::Date => {
                value.len() == 10 && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
            }
            Self::Time => DateTime::parse_from_rfc3339(&format!("1970-01-01T{value}")).is_ok(),
            Self::Email => is_email(value),
            Self::Hostname => is_hostname(value),
            Self::Ipv4 => value.parse::<Ipv4Addr>().is_ok(),
            Self::Ipv6 => value.parse::<Ipv6Addr>().is_ok(),
            Self::Uri => !has_whitespace(value) && Url::parse(value).is_ok(),
            Self::UriReference => is_uri_reference(value),
            Self::UriTemplate => is_uri_template(value),
            Self::JsonPointer => is_json_pointer(value),
            Self::Regex => fancy_regex::Regex::new(value).is_ok(),
        }
    }
}

fn has_whitespace(value: &str) -> bool {
    value.chars().any(char::is_whitespace)
}

fn is_uri_reference(value: &str) -> bool {
    if has_whitespace(value) {
        return false;
    }
    Url::parse(REFERENCE_BASE)
        .and_then(|base| base.join(value))
        .is_ok()
}

fn is_hostname(value: &str) -> bool {
    let host = value.strip_suffix('.').unwrap_or(value);
    if host.is_empty() || host.len() > 253 {
        return false;
    }
    host.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}

fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.rsplit_once('@') else {
        return false;
    };
    !local.is_empty()
        && local.len() <= 64
        && !local.contains('@')
        && !has_whitespace(local)
        && is_hostname(domain)
}

fn is_uri_template(value: &str) -> bool {
    let mut open = false;
    for c in value.chars() {
        match c {
            '{' if open => return false,
            '{' => open = true,
            '}' if !open => return false,
            '}' => open = false,
            _ => {}
        }
    }
    !open
}

fn is_json_pointer(value: &str) -> bool {
    if value.is_empty() {
        return true;
    }
    if !value.starts_with('/') {
        return false;
    }
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '~' && !matches!(chars.peek(), Some('0') | Some('1')) {
            return false;
        }
    }
    true
}
