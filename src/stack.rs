//! Root-cause stack trace parsing.
//!
//! Purely cosmetic: the raw text is reduced to the source-location lines
//! and path noise is trimmed so a trace reads the same on every machine.
//! The parsing strategy is pluggable through [`FrameParser`].

use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

use crate::config::StackTraceConfig;
use crate::constants::*;

/// Extracts frames from raw stack trace text.
pub trait FrameParser {
    fn parse(&self, raw: &str) -> Vec<String>;
}

/// Keeps only lines starting with a frame marker (`at ` by default).
///
/// For each kept line: the marker is removed, then a `file://` prefix,
/// then Cargo registry / git checkout / rustc library prefixes are
/// rewritten to the bare `crate-version/...` or `std/...` path.  With a
/// working directory, `<wd>/vendor/` becomes a bare vendored crate path
/// and any other `<wd>` prefix becomes `.`.
#[derive(Debug, Clone)]
pub struct MarkerFrameParser {
    marker: String,
    working_dir: Option<String>,
}

impl MarkerFrameParser {
    pub fn new(marker: impl Into<String>, working_dir: Option<&Path>) -> Self {
        Self {
            marker: marker.into(),
            working_dir: working_dir.map(|p| p.to_string_lossy().trim_end_matches('/').to_string()),
        }
    }

    pub fn from_config(config: &StackTraceConfig) -> Self {
        let detected;
        let working_dir = match &config.working_dir {
            Some(dir) => Some(dir.as_path()),
            None if config.detect_working_dir => {
                detected = std::env::current_dir().ok();
                detected.as_deref()
            }
            None => None,
        };
        Self::new(config.frame_marker.clone(), working_dir)
    }

    fn clean(&self, frame: &str) -> String {
        let frame = frame.strip_prefix(FILE_URI_PREFIX).unwrap_or(frame);

        for pattern in dependency_patterns() {
            if let Some(m) = pattern.find(frame) {
                return frame[m.end()..].to_string();
            }
        }

        if let Some(wd) = self.working_dir.as_deref().filter(|wd| !wd.is_empty()) {
            let under_wd = frame
                .strip_prefix(wd)
                .filter(|rest| rest.is_empty() || rest.starts_with('/'));
            if let Some(rest) = under_wd {
                let vendored = rest
                    .strip_prefix('/')
                    .and_then(|r| r.strip_prefix(VENDOR_DIR))
                    .and_then(|r| r.strip_prefix('/'));
                return match vendored {
                    Some(krate) => krate.to_string(),
                    None => format!(".{rest}"),
                };
            }
        }

        frame.to_string()
    }
}

impl Default for MarkerFrameParser {
    fn default() -> Self {
        Self::from_config(&StackTraceConfig::default())
    }
}

impl FrameParser for MarkerFrameParser {
    fn parse(&self, raw: &str) -> Vec<String> {
        raw.lines()
            .filter_map(|line| line.trim().strip_prefix(self.marker.as_str()))
            .map(|frame| self.clean(frame.trim_start()))
            .collect()
    }
}

fn dependency_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        DEPENDENCY_PATH_PATTERNS
            .iter()
            .filter_map(|p| Regex::new(p).ok())
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser(wd: Option<&str>) -> MarkerFrameParser {
        MarkerFrameParser::new(FRAME_MARKER, wd.map(Path::new))
    }

    #[test]
    fn keeps_only_marked_lines() {
        let raw = "   0: app::handler\n             at ./src/handler.rs:10:5\n   1: main\n";
        assert_eq!(parser(None).parse(raw), vec!["./src/handler.rs:10:5"]);
    }

    #[test]
    fn strips_file_uri() {
        let raw = "    at file:///opt/app/src/main.rs:3:1";
        assert_eq!(parser(None).parse(raw), vec!["/opt/app/src/main.rs:3:1"]);
    }

    #[test]
    fn rewrites_registry_and_rustc_paths() {
        let raw = "\
  at /home/ci/.cargo/registry/src/index.crates.io-6f17d22bba15001f/tokio-1.40.0/src/runtime/task.rs:42:5
  at /rustc/90b35a6239c3d8bdabc530a6a0816f7ff89a0aaf/library/std/src/rt.rs:148:48";
        assert_eq!(
            parser(None).parse(raw),
            vec!["tokio-1.40.0/src/runtime/task.rs:42:5", "std/src/rt.rs:148:48"]
        );
    }

    #[test]
    fn rewrites_working_dir_and_vendor() {
        let raw = "\
  at /srv/app/src/routes/user.rs:88:9
  at /srv/app/vendor/hyper/src/server.rs:12:3
  at /usr/lib/other.rs:1:1";
        assert_eq!(
            parser(Some("/srv/app/")).parse(raw),
            vec!["./src/routes/user.rs:88:9", "hyper/src/server.rs:12:3", "/usr/lib/other.rs:1:1"]
        );
    }

    #[test]
    fn custom_marker() {
        let p = MarkerFrameParser::new("@ ", None);
        assert_eq!(p.parse("foo\n  @ bar.rs:1\nat baz.rs:2"), vec!["bar.rs:1"]);
    }
}
