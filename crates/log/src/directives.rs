use std::time::Duration;

use flightlog_codec::{TOKEN_LEN, is_base64_symbol};
use flightlog_common::GridDimensions;
use serde::{Deserialize, Serialize};

use crate::error::LogError;

/// Scheduled navigation to another log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Autoload {
    /// Delay as written in the log.
    pub delay_s: u64,
    pub target: String,
}

impl Autoload {
    /// Delay actually waited: never shorter than one second.
    pub fn effective_delay(&self) -> Duration {
        Duration::from_secs(self.delay_s.max(1))
    }
}

/// How the grid lattice should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridDisplay {
    pub on: bool,
    /// Show interior lattice lines, not only the boundary.
    pub interior: bool,
}

impl Default for GridDisplay {
    fn default() -> Self {
        Self {
            on: true,
            interior: false,
        }
    }
}

/// Header directives of a log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDirectives {
    pub dims: GridDimensions,
    pub title: Option<String>,
    pub playable_url: Option<String>,
    pub autoload: Option<Autoload>,
    pub grid_display: GridDisplay,
}

/// A log split into its directives, grid body and opcode lines.
#[derive(Debug, Clone)]
pub struct ParsedLog<'a> {
    pub directives: SceneDirectives,
    /// Base64 symbols of the grid body, everything else stripped.
    pub body: String,
    /// Line of the `ENDMAP` terminator.
    pub endmap_line: usize,
    /// Trajectory lines with their 1-based line numbers.
    pub opcodes: Vec<(usize, &'a str)>,
}

impl ParsedLog<'_> {
    /// Split the grid body into fixed-width tokens.
    pub fn tokens(&self) -> Result<Vec<&str>, LogError> {
        let dangling = self.body.len() % TOKEN_LEN;
        if dangling != 0 {
            return Err(LogError::format(
                self.endmap_line,
                format!("grid body ends with {dangling} dangling characters"),
            ));
        }
        Ok((0..self.body.len())
            .step_by(TOKEN_LEN)
            .filter_map(|i| self.body.get(i..i + TOKEN_LEN))
            .collect())
    }
}

enum Section {
    Header,
    Body { map_line: usize },
    Trailer,
}

#[derive(Default)]
struct Pending {
    dims: Option<GridDimensions>,
    title: Option<String>,
    playable_url: Option<String>,
    autoload: Option<Autoload>,
    grid_display: Option<GridDisplay>,
}

const OPCODES: [&str; 4] = ["START", "ACC", "VEC", "END"];

/// Split a log into directives, grid body and trajectory lines.
///
/// Directives are line-anchored and may appear in any order outside the grid
/// body. The body runs from the `MAP` line to a line reading `ENDMAP`.
pub fn parse_directives(text: &str) -> Result<ParsedLog<'_>, LogError> {
    let mut pending = Pending::default();
    let mut section = Section::Header;
    let mut body = String::new();
    let mut endmap_line = 0;
    let mut opcodes = Vec::new();

    for (i, raw) in text.lines().enumerate() {
        let line_no = i + 1;
        let line = raw.trim_end();

        if let Section::Body { .. } = section {
            if line.trim_start() == "ENDMAP" {
                endmap_line = line_no;
                section = Section::Trailer;
            } else {
                body.extend(line.bytes().filter(|&b| is_base64_symbol(b)).map(char::from));
            }
            continue;
        }

        let mut words = line.split_whitespace();
        let Some(keyword) = words.next() else {
            continue;
        };
        match keyword {
            "MAP" => {
                if pending.dims.is_some() {
                    return Err(LogError::format(line_no, "duplicate MAP directive"));
                }
                pending.dims = Some(parse_dims(line_no, words.collect())?);
                section = Section::Body { map_line: line_no };
            }
            "ENDMAP" => {
                return Err(LogError::format(line_no, "ENDMAP without MAP"));
            }
            "GRID" => {
                let display = match words.next() {
                    Some("ON") => GridDisplay {
                        on: true,
                        interior: true,
                    },
                    Some("OFF") => GridDisplay {
                        on: false,
                        interior: false,
                    },
                    other => {
                        tracing::warn!(line = line_no, ?other, "ignoring unknown GRID mode");
                        continue;
                    }
                };
                set_once(&mut pending.grid_display, display, line_no, "GRID");
            }
            "TITLE" => {
                let title = rest_of_line(line, keyword);
                if title.is_empty() {
                    tracing::warn!(line = line_no, "ignoring empty TITLE");
                    continue;
                }
                set_once(&mut pending.title, title.to_string(), line_no, "TITLE");
            }
            "PLAYABLE" => {
                let url = rest_of_line(line, keyword);
                if url.is_empty() {
                    return Err(LogError::format(line_no, "PLAYABLE requires a URL"));
                }
                set_once(&mut pending.playable_url, url.to_string(), line_no, "PLAYABLE");
            }
            "AUTOLOAD" => {
                let autoload = parse_autoload(line_no, line, keyword)?;
                set_once(&mut pending.autoload, autoload, line_no, "AUTOLOAD");
            }
            op if OPCODES.contains(&op) => {
                if !matches!(section, Section::Trailer) {
                    return Err(LogError::format(line_no, format!("{op} before the grid body")));
                }
                opcodes.push((line_no, line));
            }
            other => {
                tracing::debug!(line = line_no, keyword = other, "ignoring unrecognized line");
            }
        }
    }

    if let Section::Body { map_line } = section {
        return Err(LogError::MissingEndmap { line: map_line });
    }
    let dims = pending.dims.ok_or(LogError::MissingMap)?;
    let directives = SceneDirectives {
        dims,
        title: pending.title,
        playable_url: pending.playable_url,
        autoload: pending.autoload,
        grid_display: pending.grid_display.unwrap_or_default(),
    };
    tracing::debug!(%dims, symbols = body.len(), opcodes = opcodes.len(), "parsed log layout");
    Ok(ParsedLog {
        directives,
        body,
        endmap_line,
        opcodes,
    })
}

fn set_once<T>(slot: &mut Option<T>, value: T, line: usize, directive: &str) {
    if slot.is_some() {
        tracing::warn!(line, directive, "duplicate directive, keeping the first");
        return;
    }
    *slot = Some(value);
}

fn rest_of_line<'a>(line: &'a str, keyword: &str) -> &'a str {
    line.trim_start()
        .strip_prefix(keyword)
        .unwrap_or_default()
        .trim()
}

fn parse_dims(line: usize, operands: Vec<&str>) -> Result<GridDimensions, LogError> {
    let [x, y, z] = operands.as_slice() else {
        return Err(LogError::format(
            line,
            format!("MAP expects 3 dimensions, got {}", operands.len()),
        ));
    };
    let parse = |s: &str| {
        s.parse::<usize>()
            .map_err(|_| LogError::format(line, format!("bad MAP dimension {s:?}")))
    };
    GridDimensions::new(parse(*x)?, parse(*y)?, parse(*z)?)
        .map_err(|e| LogError::format(line, e.to_string()))
}

fn parse_autoload(line_no: usize, line: &str, keyword: &str) -> Result<Autoload, LogError> {
    let rest = rest_of_line(line, keyword);
    let (delay, target) = rest
        .split_once(char::is_whitespace)
        .ok_or_else(|| LogError::format(line_no, "AUTOLOAD expects <seconds> <target>"))?;
    let delay_s = delay
        .parse::<u64>()
        .map_err(|_| LogError::format(line_no, format!("bad AUTOLOAD delay {delay:?}")))?;
    Ok(Autoload {
        delay_s,
        target: target.trim().to_string(),
    })
}
