//! Verbose element listing for the monitor view
//!
//! Same walk and failure policy as the exporter, but each record is printed
//! as a header followed by one indented `name value` line per field.

use crate::export::{walk, ExportConfig};
use crate::record::{Record, LIST_FIELDS, WAVEFORM_FIELDS};
use crate::tree::Node;

fn field_line(name: &str, value: impl std::fmt::Display) -> String {
    format!("    {name} {value}")
}

fn describe(path: &str, record: &Record) -> Vec<String> {
    match record {
        Record::List(e) => {
            let values = [e.channel, e.local_time, e.adc_value, e.extend_time];
            std::iter::once(format!("List Element: {path}"))
                .chain(LIST_FIELDS.iter().zip(values).map(|(n, v)| field_line(n, v)))
                .collect()
        }
        Record::Waveform(w) => {
            let samples = w
                .waveform
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" ");
            let [channel, local_time, extend_time, waveform] = WAVEFORM_FIELDS;
            vec![
                format!("Waveform Element: {path}"),
                field_line(channel, w.channel),
                field_line(local_time, w.local_time),
                field_line(extend_time, w.extend_time),
                field_line(waveform, samples),
            ]
        }
    }
}

/// Describe every record below `root`, in traversal order
pub fn show(root: &Node) -> Vec<String> {
    let mut lines = Vec::new();
    walk(root, &ExportConfig::default(), |visit| {
        if let Some(record) = &visit.record {
            lines.extend(describe(visit.path, record));
        }
    });
    lines
}
