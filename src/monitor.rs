//! Polling monitor: re-open the store and print its elements on an interval
//!
//! Every refresh starts from a fresh root; nothing is carried over between
//! refreshes. Only the first open is fatal. Later failures are logged and the
//! refresh is skipped, since a concurrent writer may leave the store briefly
//! unreadable.

use crate::config::MonitorConfig;
use crate::error::{InspectError, Result};
use crate::show::show;
use crate::tree::{Node, TreeSource};
use std::io::Write;
use tracing::warn;

/// Run the monitor loop, writing each refresh to `out`.
///
/// Returns the number of refreshes displayed.
pub fn monitor<S, W>(source: &S, config: &MonitorConfig, out: &mut W) -> Result<u64>
where
    S: TreeSource + ?Sized,
    W: Write,
{
    let mut root = source.open_root()?;
    let mut shown = 0u64;

    loop {
        display(&root, out).map_err(|source| InspectError::OutputWrite {
            path: "<stdout>".into(),
            source,
        })?;
        shown += 1;

        if config.iterations.is_some_and(|limit| shown >= limit) {
            return Ok(shown);
        }
        std::thread::sleep(config.interval());

        match source.open_root() {
            Ok(fresh) => root = fresh,
            Err(err) => warn!(location = %source.location(), error = %err, "refresh skipped"),
        }
    }
}

fn display<W: Write>(root: &Node, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "Display contents")?;
    for line in show(root) {
        writeln!(out, "{line}")?;
    }
    writeln!(out)?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Dataset, Row, SnapshotFile, Value};

    fn tree() -> Node {
        let row = Row::Flat(vec![
            Value::Integer(1),
            Value::Integer(2),
            Value::Integer(3),
            Value::Integer(4),
        ]);
        Node::group(
            "/",
            vec![Node::dataset("list-0", Dataset::new(vec![row.clone(), row]))],
        )
    }

    #[test]
    fn test_monitor_bounded_iterations() {
        let config = MonitorConfig {
            interval_secs: 0,
            iterations: Some(3),
        };
        let mut out = Vec::new();
        let shown = monitor(&tree(), &config, &mut out).unwrap();
        assert_eq!(shown, 3);

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("Display contents").count(), 3);
        assert_eq!(text.matches("List Element: /list-0").count(), 3);
    }

    #[test]
    fn test_monitor_first_open_fatal() {
        let config = MonitorConfig {
            interval_secs: 0,
            iterations: Some(1),
        };
        let source = SnapshotFile::new("/nonexistent/out.json");
        let err = monitor(&source, &config, &mut Vec::<u8>::new()).unwrap_err();
        assert!(matches!(err, InspectError::StoreOpen { .. }));
    }
}
