//! Plain-text body catalog
//!
//! One body per line, in the same shape `Body`'s `Display` prints:
//!
//! ```text
//! Earth: { mass=5.97219e24, radius=6371e3, x=-1.47e11, y=-2.86e10, z=8.27e6, vx=5.42e3, vy=-2.93e4, vz=0.65 }
//! ```
//!
//! `r=` is accepted for `radius=`, radius may be left out. Blank lines and
//! lines starting with `//` or `#` are skipped.

use std::collections::HashMap;
use std::fmt;

use crate::simulation::states::{Body, NVec3};

#[derive(Debug, Clone, PartialEq)]
pub enum CatalogError {
    /// Line does not look like `name: { ... }`
    Malformed { line: usize },

    /// Required key absent
    MissingField { line: usize, field: &'static str },

    /// Value is not a number
    BadNumber { line: usize, field: String, value: String },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed { line } => {
                write!(f, "line {}: expected `name: {{ key=value, ... }}`", line)
            }
            Self::MissingField { line, field } => {
                write!(f, "line {}: missing field `{}`", line, field)
            }
            Self::BadNumber { line, field, value } => {
                write!(f, "line {}: `{}` is not a number for field `{}`", line, value, field)
            }
        }
    }
}

impl std::error::Error for CatalogError {}

/// Parse a whole catalog, keeping line order as body order
pub fn parse_catalog(text: &str) -> Result<Vec<Body>, CatalogError> {
    text.lines()
        .enumerate()
        .filter(|(_, l)| {
            let l = l.trim();
            !(l.is_empty() || l.starts_with("//") || l.starts_with('#'))
        })
        .map(|(i, l)| parse_body(l, i + 1))
        .collect()
}

/// Parse one catalog entry, `line` is only used in errors
pub fn parse_body(text: &str, line: usize) -> Result<Body, CatalogError> {
    let (name, rest) = text.split_once(':').ok_or(CatalogError::Malformed { line })?;
    let name = name.trim();
    let inner = rest
        .trim()
        .strip_prefix('{')
        .and_then(|r| r.strip_suffix('}'))
        .ok_or(CatalogError::Malformed { line })?;
    if name.is_empty() {
        return Err(CatalogError::Malformed { line });
    }

    let mut fields = HashMap::new();
    for pair in inner.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').ok_or(CatalogError::Malformed { line })?;
        let key = key.trim();
        let value = value.trim();
        let number = value.parse::<f64>().map_err(|_| CatalogError::BadNumber {
            line,
            field: key.to_string(),
            value: value.to_string(),
        })?;
        let key = if key == "r" { "radius" } else { key };
        fields.insert(key.to_string(), number);
    }

    let get = |field: &'static str| -> Result<f64, CatalogError> {
        fields
            .get(field)
            .copied()
            .ok_or(CatalogError::MissingField { line, field })
    };

    Ok(Body::new(
        name,
        get("mass")?,
        fields.get("radius").copied().unwrap_or(0.0),
        NVec3::new(get("x")?, get("y")?, get("z")?),
        NVec3::new(get("vx")?, get("vy")?, get("vz")?),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
// April 2020
Sun: { mass=1.988500e30,   x=-6.806783239281648e+08,  y= 1.080005533878725e+09,  z= 6.564012751690170e+06,  vx=-1.420511669610689e+01, vy=-4.954714716629277e+00, vz= 3.994237625449041e-01 }

Earth: { mass=5.97219e24,   radius=6371e3,   x=-1.471922101663588e+11,  y=-2.860995816266412e+10,  z= 8.278183193596080e+06,  vx= 5.427193405797901e+03, vy=-2.931056622265021e+04, vz= 6.575428158157592e-01 }
";

    #[test]
    fn parses_in_order_with_optional_radius() {
        let bodies = parse_catalog(SAMPLE).unwrap();
        assert_eq!(bodies.len(), 2);
        assert_eq!(&*bodies[0].name, "Sun");
        assert_eq!(bodies[0].radius, 0.0);
        assert_eq!(&*bodies[1].name, "Earth");
        assert_eq!(bodies[1].m, 5.97219e24);
        assert_eq!(bodies[1].radius, 6371e3);
        assert_eq!(bodies[1].x.x, -1.471922101663588e+11);
        assert_eq!(bodies[1].v.y, -2.931056622265021e+04);
    }

    #[test]
    fn display_parses_back() {
        let bodies = parse_catalog(SAMPLE).unwrap();
        for b in &bodies {
            let again = parse_body(&b.to_string(), 1).unwrap();
            assert_eq!(&again, b);
        }
    }

    #[test]
    fn reports_line_and_field() {
        let text = "A: { mass=1, x=0, y=0, z=0, vx=0, vy=0, vz=0 }\nB: { mass=1, x=0, y=0, z=0, vx=0, vy=0 }";
        assert_eq!(
            parse_catalog(text),
            Err(CatalogError::MissingField { line: 2, field: "vz" })
        );

        let text = "A: { mass=heavy, x=0, y=0, z=0, vx=0, vy=0, vz=0 }";
        assert!(matches!(
            parse_catalog(text),
            Err(CatalogError::BadNumber { line: 1, .. })
        ));

        assert_eq!(parse_catalog("no braces here"), Err(CatalogError::Malformed { line: 1 }));
    }
}
