//! Target monitor geometry, resolved once at startup from the display
//! enumeration command (`xrandr --query` by default).

use std::collections::BTreeMap;
use std::fmt;
use std::process::{Command, Stdio};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

use crate::error::Error;

static CONNECTED_OUTPUT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\S+)\sconnected(?:\sprimary)?\s([0-9]+x[0-9]+\+[0-9]+\+[0-9]+)")
        .expect("connected-output pattern is valid")
});

/// Placement of one output in the virtual screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorGeometry {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub origin_x: i32,
    pub origin_y: i32,
}

impl MonitorGeometry {
    /// Re-encode as the `WxH+X+Y` token the enumeration reports.
    pub fn token(&self) -> String {
        format!(
            "{}x{}+{}+{}",
            self.width, self.height, self.origin_x, self.origin_y
        )
    }
}

impl fmt::Display for MonitorGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.token())
    }
}

/// Collect `name -> WxH+X+Y` for every connected output with an active mode.
///
/// Lines that do not match the connected-output shape (disconnected outputs,
/// mode listings, garbage) are skipped.
pub fn parse_outputs(text: &str) -> BTreeMap<String, String> {
    let mut outputs = BTreeMap::new();
    for line in text.lines() {
        if let Some(caps) = CONNECTED_OUTPUT.captures(line.trim()) {
            outputs.insert(caps[1].to_string(), caps[2].to_string());
        }
    }
    outputs
}

/// Decode a `WxH+X+Y` token for the named output.
pub fn parse_geometry_token(output: &str, token: &str) -> Result<MonitorGeometry, Error> {
    let fail = |reason: &str| Error::GeometryParse {
        output: output.to_string(),
        token: token.to_string(),
        reason: reason.to_string(),
    };

    let (size, origin) = token.split_once('+').ok_or_else(|| fail("missing origin"))?;
    let (w, h) = size.split_once('x').ok_or_else(|| fail("missing size separator"))?;
    let (x, y) = origin
        .split_once('+')
        .ok_or_else(|| fail("missing y origin"))?;

    let width: u32 = w.parse().map_err(|_| fail("width is not an integer"))?;
    let height: u32 = h.parse().map_err(|_| fail("height is not an integer"))?;
    let origin_x: i32 = x.parse().map_err(|_| fail("x origin is not an integer"))?;
    let origin_y: i32 = y.parse().map_err(|_| fail("y origin is not an integer"))?;
    if width == 0 || height == 0 {
        return Err(fail("zero-sized output"));
    }

    Ok(MonitorGeometry {
        name: output.to_string(),
        width,
        height,
        origin_x,
        origin_y,
    })
}

/// Look up `output` in enumeration text. Exact, case-sensitive match only.
pub fn resolve_from_text(text: &str, output: &str) -> Result<MonitorGeometry, Error> {
    let outputs = parse_outputs(text);
    debug!(outputs = ?outputs, "parsed display enumeration");
    let Some(token) = outputs.get(output) else {
        return Err(Error::OutputNotFound {
            name: output.to_string(),
            available: outputs.keys().cloned().collect(),
        });
    };
    parse_geometry_token(output, token)
}

/// Runs the enumeration command and resolves the configured output.
#[derive(Debug, Clone)]
pub struct GeometryResolver {
    command: Vec<String>,
}

impl GeometryResolver {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }

    pub fn resolve(&self, output: &str) -> Result<MonitorGeometry, Error> {
        let text = self.query()?;
        let geometry = resolve_from_text(&text, output)?;
        info!(
            output = %geometry.name,
            width = geometry.width,
            height = geometry.height,
            x = geometry.origin_x,
            y = geometry.origin_y,
            "resolved target display"
        );
        Ok(geometry)
    }

    fn query(&self) -> Result<String, Error> {
        let command_line = self.command.join(" ");
        let fail = |reason: String| Error::QueryExecution {
            command: command_line.clone(),
            reason,
        };

        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| fail("command is empty".to_string()))?;
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .map_err(|err| fail(err.to_string()))?;

        if !output.status.success() {
            return Err(fail(format!("exited with {}", output.status)));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const XRANDR: &str = "\
Screen 0: minimum 320 x 200, current 3840 x 1080, maximum 8192 x 8192
HDMI-1 connected primary 1920x1080+0+0 (normal left inverted right x axis y axis) 527mm x 296mm
   1920x1080     60.00*+  50.00    59.94
   1280x720      60.00    50.00
HDMI-2 connected 1920x1080+1920+0 (normal left inverted right x axis y axis) 527mm x 296mm
DP-1 disconnected (normal left inverted right x axis y axis)
DSI-1 connected (normal left inverted right x axis y axis)
";

    #[test]
    fn collects_only_connected_outputs_with_geometry() {
        let outputs = parse_outputs(XRANDR);
        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs["HDMI-1"], "1920x1080+0+0");
        assert_eq!(outputs["HDMI-2"], "1920x1080+1920+0");
    }

    #[test]
    fn resolves_primary_output() {
        let geometry = resolve_from_text(XRANDR, "HDMI-1").unwrap();
        assert_eq!(
            geometry,
            MonitorGeometry {
                name: "HDMI-1".into(),
                width: 1920,
                height: 1080,
                origin_x: 0,
                origin_y: 0,
            }
        );
    }

    #[test]
    fn resolves_secondary_output_with_offset() {
        let geometry = resolve_from_text(XRANDR, "HDMI-2").unwrap();
        assert_eq!(geometry.origin_x, 1920);
        assert_eq!(geometry.token(), "1920x1080+1920+0");
    }

    #[test]
    fn missing_output_is_not_found() {
        let err = resolve_from_text(XRANDR, "DP-1").unwrap_err();
        match err {
            Error::OutputNotFound { name, available } => {
                assert_eq!(name, "DP-1");
                assert_eq!(available, vec!["HDMI-1".to_string(), "HDMI-2".to_string()]);
            }
            other => panic!("expected OutputNotFound, got {other:?}"),
        }
    }

    #[test]
    fn name_match_is_case_sensitive() {
        assert!(matches!(
            resolve_from_text(XRANDR, "hdmi-1"),
            Err(Error::OutputNotFound { .. })
        ));
    }

    #[test]
    fn garbled_lines_are_ignored() {
        let text = "\
HDMI-1 connected primary 1920x+0+0
HDMI-1connected 1920x1080+0+0
connected 1920x1080+0+0
HDMI-3 connected 1920x1080-0+0
\u{0}\u{1} junk
";
        assert!(parse_outputs(text).is_empty());
    }

    #[test]
    fn non_ascii_digits_are_skipped() {
        let text = "HDMI-1 connected \u{661}\u{669}\u{662}\u{660}x1080+0+0\n";
        assert!(parse_outputs(text).is_empty());
        assert!(matches!(
            resolve_from_text(text, "HDMI-1"),
            Err(Error::OutputNotFound { .. })
        ));
    }

    #[test]
    fn geometry_tokens_round_trip() {
        for token in ["1920x1080+0+0", "800x480+1920+0", "3840x2160+0+1080", "1x1+7+9"] {
            let geometry = parse_geometry_token("X", token).unwrap();
            assert_eq!(geometry.token(), token);
        }
    }

    #[test]
    fn overflowing_component_is_a_parse_error() {
        let text = "HDMI-1 connected 99999999999x1080+0+0\n";
        assert!(matches!(
            resolve_from_text(text, "HDMI-1"),
            Err(Error::GeometryParse { .. })
        ));
    }

    #[test]
    fn zero_sized_output_is_a_parse_error() {
        assert!(matches!(
            parse_geometry_token("HDMI-1", "0x1080+0+0"),
            Err(Error::GeometryParse { .. })
        ));
    }

    #[test]
    fn query_failure_is_reported() {
        let resolver = GeometryResolver::new(vec!["false".into()]);
        assert!(matches!(
            resolver.resolve("HDMI-1"),
            Err(Error::QueryExecution { .. })
        ));

        let resolver = GeometryResolver::new(vec!["/nonexistent/display-query".into()]);
        assert!(matches!(
            resolver.resolve("HDMI-1"),
            Err(Error::QueryExecution { .. })
        ));
    }

    #[test]
    fn resolves_from_command_output() {
        let resolver = GeometryResolver::new(vec![
            "printf".into(),
            "HDMI-1 connected primary 1280x720+0+0 (normal)\\n".into(),
        ]);
        let geometry = resolver.resolve("HDMI-1").unwrap();
        assert_eq!((geometry.width, geometry.height), (1280, 720));
    }
}
