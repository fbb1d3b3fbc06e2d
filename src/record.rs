//! Record classification and dual-layout extraction
//!
//! A node's kind comes from its name alone. Extraction is checked up front:
//! containers, empty datasets, missing members and non-scalar cells all give
//! `None`, and the caller treats the node as a plain container.

use crate::tree::{Dataset, Row, Value};

/// Name prefix of list element datasets
pub const LIST_PREFIX: &str = "list-";
/// Name prefix of waveform element datasets
pub const WAVEFORM_PREFIX: &str = "waveform-";

/// List element fields, in rendering and flat-array order
pub const LIST_FIELDS: [&str; 4] = ["channel", "localTime", "adcValue", "extendTime"];
/// Waveform element fields, in rendering order
pub const WAVEFORM_FIELDS: [&str; 4] = ["channel", "localTime", "extendTime", "waveform"];

/// Kind of a node, decided by its name prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    ListElement,
    WaveformElement,
    Container,
}

impl RecordKind {
    pub fn from_name(name: &str) -> Self {
        if name.starts_with(LIST_PREFIX) {
            RecordKind::ListElement
        } else if name.starts_with(WAVEFORM_PREFIX) {
            RecordKind::WaveformElement
        } else {
            RecordKind::Container
        }
    }
}

/// Physical layout of a record dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordLayout {
    /// Single row with named members
    Compound,
    /// Legacy positional values in the first row. A compound first row is
    /// read by its stored member order.
    FlatArray,
}

impl RecordLayout {
    /// Leading dimension 1 means compound; anything else is a flat array.
    /// Empty datasets have no layout.
    pub fn of(dataset: &Dataset) -> Option<Self> {
        match dataset.len() {
            0 => None,
            1 => Some(RecordLayout::Compound),
            _ => Some(RecordLayout::FlatArray),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListElement {
    pub channel: u64,
    pub local_time: u64,
    pub adc_value: u64,
    pub extend_time: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WaveformElement {
    pub channel: u64,
    pub local_time: u64,
    pub extend_time: u64,
    pub waveform: Vec<Value>,
}

/// An extracted record
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    List(ListElement),
    Waveform(WaveformElement),
}

/// Record fields are unsigned counters. Negative or out-of-range cells are
/// rejected rather than clamped; floats are accepted when integral.
fn integer(value: &Value) -> Option<u64> {
    match value {
        Value::Integer(v) => u64::try_from(*v).ok(),
        Value::Unsigned(v) => Some(*v),
        Value::Float(v) if v.fract() == 0.0 && (0.0..u64::MAX as f64).contains(v) => {
            Some(*v as u64)
        }
        _ => None,
    }
}

fn list_element(row: &Row, layout: RecordLayout) -> Option<ListElement> {
    let mut fields = [0u64; 4];
    for (i, slot) in fields.iter_mut().enumerate() {
        let cell = match layout {
            RecordLayout::Compound => row.field(LIST_FIELDS[i]),
            RecordLayout::FlatArray => row.position(i),
        };
        *slot = integer(cell?)?;
    }
    let [channel, local_time, adc_value, extend_time] = fields;

    Some(ListElement {
        channel,
        local_time,
        adc_value,
        extend_time,
    })
}

fn waveform_element(row: &Row) -> Option<WaveformElement> {
    let samples = row.field("waveform")?.as_sequence()?;
    if !samples.iter().all(Value::is_scalar) {
        return None;
    }

    Some(WaveformElement {
        channel: integer(row.field("channel")?)?,
        local_time: integer(row.field("localTime")?)?,
        extend_time: integer(row.field("extendTime")?)?,
        waveform: samples.to_vec(),
    })
}

/// Classify a node and extract its record, if it is a well-formed one.
///
/// List elements pick their layout from the dataset shape; waveform elements
/// are always read in compound form.
pub fn classify(name: &str, payload: Option<&Dataset>) -> Option<Record> {
    let kind = RecordKind::from_name(name);
    if kind == RecordKind::Container {
        return None;
    }

    let dataset = payload?;
    let layout = RecordLayout::of(dataset)?;
    let row = dataset.rows.first()?;

    match kind {
        RecordKind::ListElement => list_element(row, layout).map(Record::List),
        RecordKind::WaveformElement => waveform_element(row).map(Record::Waveform),
        RecordKind::Container => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compound(pairs: &[(&str, Value)]) -> Row {
        Row::Compound(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    fn flat(values: &[i64]) -> Row {
        Row::Flat(values.iter().copied().map(Value::Integer).collect())
    }

    fn list_row() -> Row {
        compound(&[
            ("channel", Value::Integer(1)),
            ("localTime", Value::Integer(100)),
            ("adcValue", Value::Integer(5)),
            ("extendTime", Value::Integer(0)),
        ])
    }

    #[test]
    fn test_kind_from_name() {
        assert_eq!(RecordKind::from_name("list-3"), RecordKind::ListElement);
        assert_eq!(RecordKind::from_name("waveform-0"), RecordKind::WaveformElement);
        assert_eq!(RecordKind::from_name("dig_12"), RecordKind::Container);
        assert_eq!(RecordKind::from_name("mylist-3"), RecordKind::Container);
    }

    #[test]
    fn test_layout_from_leading_dimension() {
        assert_eq!(RecordLayout::of(&Dataset::default()), None);
        assert_eq!(
            RecordLayout::of(&Dataset::new(vec![list_row()])),
            Some(RecordLayout::Compound)
        );
        assert_eq!(
            RecordLayout::of(&Dataset::new(vec![flat(&[1]), flat(&[2])])),
            Some(RecordLayout::FlatArray)
        );
    }

    #[test]
    fn test_compound_list_element() {
        let ds = Dataset::new(vec![list_row()]);
        let record = classify("list-A_7", Some(&ds));
        assert_eq!(
            record,
            Some(Record::List(ListElement {
                channel: 1,
                local_time: 100,
                adc_value: 5,
                extend_time: 0,
            }))
        );
    }

    #[test]
    fn test_writer_member_names() {
        let row = compound(&[
            ("channel_name", Value::Integer(2)),
            ("localTime_name", Value::Integer(7)),
            ("adcValue_name", Value::Integer(8)),
            ("extendTime_name", Value::Integer(9)),
            ("__pad_name", Value::Integer(0)),
        ]);
        let ds = Dataset::new(vec![row]);
        match classify("list-0", Some(&ds)) {
            Some(Record::List(e)) => assert_eq!((e.channel, e.adc_value), (2, 8)),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_flat_list_element_uses_same_field_order() {
        let ds = Dataset::new(vec![flat(&[3, 300, 30, 1, 99]), flat(&[0, 0, 0, 0])]);
        assert_eq!(
            classify("list-1", Some(&ds)),
            Some(Record::List(ListElement {
                channel: 3,
                local_time: 300,
                adc_value: 30,
                extend_time: 1,
            }))
        );
    }

    #[test]
    fn test_malformed_list_elements() {
        // zero rows
        assert_eq!(classify("list-0", Some(&Dataset::default())), None);
        // no payload
        assert_eq!(classify("list-0", None), None);
        // missing member
        let ds = Dataset::new(vec![compound(&[("channel", Value::Integer(1))])]);
        assert_eq!(classify("list-0", Some(&ds)), None);
        // flat row too short
        let ds = Dataset::new(vec![flat(&[1, 2]), flat(&[3, 4])]);
        assert_eq!(classify("list-0", Some(&ds)), None);
        // single flat row is read as compound and has no members
        let ds = Dataset::new(vec![flat(&[1, 2, 3, 4])]);
        assert_eq!(classify("list-0", Some(&ds)), None);
        // non-integral cell
        let row = compound(&[
            ("channel", Value::Integer(1)),
            ("localTime", Value::Integer(100)),
            ("adcValue", Value::Text("high".into())),
            ("extendTime", Value::Integer(0)),
        ]);
        assert_eq!(classify("list-0", Some(&Dataset::new(vec![row]))), None);
        // null cell
        let row = compound(&[
            ("channel", Value::Other(serde_json::Value::Null)),
            ("localTime", Value::Integer(100)),
            ("adcValue", Value::Integer(5)),
            ("extendTime", Value::Integer(0)),
        ]);
        assert_eq!(classify("list-0", Some(&Dataset::new(vec![row]))), None);
    }

    #[test]
    fn test_multi_row_compound_read_positionally() {
        let row = compound(&[
            ("channel", Value::Integer(4)),
            ("localTime", Value::Integer(400)),
            ("adcValue", Value::Integer(40)),
            ("extendTime", Value::Integer(2)),
        ]);
        let ds = Dataset::new(vec![row.clone(), row]);
        assert_eq!(RecordLayout::of(&ds), Some(RecordLayout::FlatArray));
        assert_eq!(
            classify("list-0", Some(&ds)),
            Some(Record::List(ListElement {
                channel: 4,
                local_time: 400,
                adc_value: 40,
                extend_time: 2,
            }))
        );
    }

    #[test]
    fn test_waveform_element() {
        let row = compound(&[
            ("channel", Value::Integer(2)),
            ("localTime", Value::Integer(500)),
            ("extendTime", Value::Integer(1)),
            (
                "waveform",
                Value::Sequence(vec![Value::Integer(10), Value::Integer(11)]),
            ),
        ]);
        let ds = Dataset::new(vec![row]);
        match classify("waveform-0", Some(&ds)) {
            Some(Record::Waveform(w)) => {
                assert_eq!(w.channel, 2);
                assert_eq!(w.local_time, 500);
                assert_eq!(w.extend_time, 1);
                assert_eq!(w.waveform.len(), 2);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_waveform_requires_sequence() {
        let row = compound(&[
            ("channel", Value::Integer(2)),
            ("localTime", Value::Integer(500)),
            ("extendTime", Value::Integer(1)),
            ("waveform", Value::Integer(10)),
        ]);
        assert_eq!(classify("waveform-0", Some(&Dataset::new(vec![row]))), None);
    }

    #[test]
    fn test_container_ignores_payload() {
        let ds = Dataset::new(vec![list_row()]);
        assert_eq!(classify("events", Some(&ds)), None);
    }

    #[test]
    fn test_integral_float_accepted() {
        assert_eq!(integer(&Value::Float(4.0)), Some(4));
        assert_eq!(integer(&Value::Float(4.5)), None);
    }

    #[test]
    fn test_out_of_range_cells_rejected() {
        assert_eq!(integer(&Value::Unsigned(u64::MAX)), Some(u64::MAX));
        assert_eq!(integer(&Value::Integer(-1)), None);
        assert_eq!(integer(&Value::Float(-3.0)), None);
        assert_eq!(integer(&Value::Float(1e20)), None);
        assert_eq!(integer(&Value::Float(f64::INFINITY)), None);
    }

    #[test]
    fn test_max_local_time_kept_exact() {
        let row = compound(&[
            ("channel", Value::Integer(1)),
            ("localTime", Value::Unsigned(u64::MAX)),
            ("adcValue", Value::Integer(5)),
            ("extendTime", Value::Integer(0)),
        ]);
        match classify("list-0", Some(&Dataset::new(vec![row]))) {
            Some(Record::List(e)) => assert_eq!(e.local_time, u64::MAX),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
