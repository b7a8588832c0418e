//! `{param}` path templates and value interpolation.

use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(&'static str),
    /// `in_path` is false once the template's `?` has been passed.
    Param { name: &'static str, in_path: bool },
}

/// A pre-parsed path + query template such as `/map/release-info/{contentId}?limit={limit}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    source: &'static str,
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// Parse a template.
    ///
    /// # Errors
    ///
    /// Returns a message if the template does not start with `/`, has an unclosed or empty
    /// placeholder, or a stray `}`.
    pub fn parse(source: &'static str) -> Result<Self, String> {
        if !source.starts_with('/') {
            return Err(format!("'{source}' must start with '/'"));
        }

        let mut segments = Vec::new();
        let mut in_path = true;
        let mut rest = source;
        while !rest.is_empty() {
            let Some(open) = rest.find('{') else {
                if rest.contains('}') {
                    return Err(format!("unmatched '}}' in '{source}'"));
                }
                segments.push(Segment::Literal(rest));
                break;
            };

            let literal = &rest[..open];
            if literal.contains('}') {
                return Err(format!("unmatched '}}' in '{source}'"));
            }
            if !literal.is_empty() {
                in_path &= !literal.contains('?');
                segments.push(Segment::Literal(literal));
            }

            let after = &rest[open + 1..];
            let close = after
                .find('}')
                .ok_or_else(|| format!("unclosed '{{' in '{source}'"))?;
            let name = &after[..close];
            if name.is_empty() || name.contains('{') {
                return Err(format!("invalid placeholder '{{{name}}}' in '{source}'"));
            }
            segments.push(Segment::Param { name, in_path });
            rest = &after[close + 1..];
        }

        Ok(Self { source, segments })
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        self.source
    }

    /// Placeholder names in template order.
    pub fn placeholders(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param { name, .. } => Some(*name),
            Segment::Literal(_) => None,
        })
    }

    /// Whether `name` is interpolated before the query string.
    #[must_use]
    pub fn is_path_param(&self, name: &str) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Param { name: n, in_path: true } if *n == name))
    }

    /// Substitute placeholders, percent-encoding each value.
    ///
    /// Placeholders with no entry in `values` render as empty strings; the catalog guarantees
    /// every placeholder names a required parameter, so validated arguments always cover them.
    #[must_use]
    pub fn render(&self, values: &HashMap<&str, String>) -> String {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(lit) => out.push_str(lit),
                Segment::Param { name, .. } => {
                    if let Some(v) = values.get(name) {
                        out.push_str(&encode_component(v));
                    }
                }
            }
        }
        out
    }
}

/// Render a scalar argument the way it appears in a URL.
///
/// Integral numbers never carry a fractional part (`10`, not `10.0`).
#[must_use]
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                return n.to_string();
            }
            n.as_f64()
                .and_then(integral)
                .map_or_else(|| n.to_string(), |i| i.to_string())
        }
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => value.to_string(),
    }
}

/// `f` as an integer when it has no fractional part and is exactly representable.
#[must_use]
pub fn integral(f: f64) -> Option<i64> {
    // 2^53: beyond this f64 no longer represents every integer.
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 {
        Some(f as i64)
    } else {
        None
    }
}

/// Percent-encode everything outside the RFC 3986 unreserved set.
#[must_use]
pub fn encode_component(s: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut out = String::with_capacity(s.len());
    for &b in s.as_bytes() {
        if is_unreserved(b) {
            out.push(b as char);
        } else {
            out.push('%');
            out.push(HEX[(b >> 4) as usize] as char);
            out.push(HEX[(b & 0x0F) as usize] as char);
        }
    }
    out
}

fn is_unreserved(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~')
}
