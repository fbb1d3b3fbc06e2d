//! Hierarchical exporter: flatten a record tree into fixed-width text lines
//!
//! The walk is depth-first and pre-order over children in stored order. Each
//! node derives its own [`Context`] from its parent's by value before its
//! record (if any) is extracted and before its children are visited.
//! Malformed record nodes are indistinguishable from containers here: no line
//! is produced, and the walk continues into their children.
//!
//! Sorting compares rendered text. Columns are space padded, so the sorted
//! order matches chronological order only while every numeric column keeps
//! the same width. Even with zero padding the sort is not chronological:
//! after the optional global time the columns lead with serial and channel,
//! so lines order by serial and channel before local time.

use crate::error::{InspectError, Result};
use crate::record::{classify, ListElement, Record, WaveformElement};
use crate::tree::Node;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{info, trace};

/// Separator between a node-name prefix and its identifier (`dig_1234`)
pub const ID_SEPARATOR: char = '_';
/// Path separator of the store
pub const PATH_SEPARATOR: char = '/';
/// Number of path separators of a global-time node (`/serial/time`)
pub const GLOBAL_TIME_DEPTH: usize = 2;

/// Rendering options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Prepend the inherited global time as a leading column
    pub include_global_time: bool,
    /// Sort collected lines by their text
    pub sort_output: bool,
}

/// Identifiers inherited from ancestors
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    pub serial: Option<String>,
    pub global_time: Option<String>,
}

/// Part of `name` after the first id separator, if any
fn id_suffix(name: &str) -> Option<&str> {
    name.split_once(ID_SEPARATOR).map(|(_, id)| id)
}

impl Context {
    /// Context of a child node at `path` named `name`.
    ///
    /// The first ancestor (or the node itself) named `<prefix>_<serial>` fixes
    /// the serial for the subtree. Global time comes only from nodes exactly
    /// two levels below the root, and everything beneath inherits it.
    pub fn derive(&self, path: &str, name: &str, config: &ExportConfig) -> Context {
        let serial = match &self.serial {
            Some(serial) => Some(serial.clone()),
            None => id_suffix(name).map(str::to_string),
        };

        let at_time_depth = path.matches(PATH_SEPARATOR).count() == GLOBAL_TIME_DEPTH;
        let global_time = if config.include_global_time && at_time_depth {
            let segment = path.rsplit(PATH_SEPARATOR).next().unwrap_or(name);
            Some(id_suffix(segment).unwrap_or(segment).to_string())
        } else {
            self.global_time.clone()
        };

        Context {
            serial,
            global_time,
        }
    }
}

/// One node as seen by the walk
#[derive(Debug)]
pub struct Visit<'a> {
    pub path: &'a str,
    pub node: &'a Node,
    pub context: &'a Context,
    /// Extracted record, None for containers and malformed records
    pub record: Option<Record>,
}

/// Path of child `name` below `parent`
fn child_path(parent: &str, name: &str) -> String {
    if parent.ends_with(PATH_SEPARATOR) {
        format!("{parent}{name}")
    } else {
        format!("{parent}{PATH_SEPARATOR}{name}")
    }
}

fn walk_children<F>(node: &Node, path: &str, context: &Context, config: &ExportConfig, f: &mut F)
where
    F: FnMut(&Visit<'_>),
{
    for (name, child) in node.children() {
        let path = child_path(path, name);
        let context = context.derive(&path, name, config);
        let record = classify(name, child.payload.as_ref());
        if record.is_none() {
            trace!(path = %path, "no record");
        }

        f(&Visit {
            path: &path,
            node: child,
            context: &context,
            record,
        });

        walk_children(child, &path, &context, config, f);
    }
}

/// Visit every node below `root` in depth-first pre-order.
///
/// The root itself is never a record and never sets a serial.
pub fn walk<F>(root: &Node, config: &ExportConfig, mut f: F)
where
    F: FnMut(&Visit<'_>),
{
    let path = PATH_SEPARATOR.to_string();
    walk_children(root, &path, &Context::default(), config, &mut f);
}

/// A rendered output row
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RenderedLine {
    pub text: String,
    pub serial: Option<String>,
    pub global_time: Option<String>,
}

impl fmt::Display for RenderedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn leading_columns(context: &Context, config: &ExportConfig) -> String {
    let serial = context.serial.as_deref().unwrap_or("-");
    match (&context.global_time, config.include_global_time) {
        (Some(time), true) => format!("{time:>16} {serial:>8}"),
        _ => format!("{serial:>8}"),
    }
}

fn render_list(lead: &str, e: &ListElement) -> String {
    format!(
        "{lead} {:>8} {:>16} {:>8} {:>8}",
        e.channel, e.local_time, e.adc_value, e.extend_time
    )
}

fn render_waveform(lead: &str, w: &WaveformElement) -> String {
    let samples = w
        .waveform
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        "{lead} {:>8} {:>16} {:>8} {samples}",
        w.channel, w.local_time, w.extend_time
    )
}

/// Render a single record under `context`
pub fn render(record: &Record, context: &Context, config: &ExportConfig) -> RenderedLine {
    let lead = leading_columns(context, config);
    let text = match record {
        Record::List(e) => render_list(&lead, e),
        Record::Waveform(w) => render_waveform(&lead, w),
    };

    RenderedLine {
        text,
        serial: context.serial.clone(),
        global_time: context.global_time.clone(),
    }
}

/// Stable sort by rendered text
pub fn sort_lines(lines: &mut [RenderedLine]) {
    lines.sort_by(|a, b| a.text.cmp(&b.text));
}

/// Export every record below `root` as a text line
pub fn export(root: &Node, config: &ExportConfig) -> Vec<RenderedLine> {
    let mut lines = Vec::new();
    walk(root, config, |visit| {
        if let Some(record) = &visit.record {
            lines.push(render(record, visit.context, config));
        }
    });

    if config.sort_output {
        sort_lines(&mut lines);
    }

    info!(lines = lines.len(), sorted = config.sort_output, "export complete");
    lines
}

/// Write lines to `path`, one per line
pub fn write_lines(path: &Path, lines: &[RenderedLine]) -> Result<()> {
    let write_err = |source| InspectError::OutputWrite {
        path: path.to_path_buf(),
        source,
    };

    let file = std::fs::File::create(path).map_err(write_err)?;
    let mut out = BufWriter::new(file);
    for line in lines {
        writeln!(out, "{line}").map_err(write_err)?;
    }
    out.flush().map_err(write_err)
}
