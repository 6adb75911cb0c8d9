//! Golden wire vectors and end-to-end decode checks.

use lazypack::{
    marshal, to_vec, unmarshal, Document, ErrorKind, FormatId, Reader, Value,
};

use crate::fixtures::*;

const BOOL_MAP: &str = "82a161c3a162c2";
const POSITION: &str = "82a178d200000003a179d2fffffffc";
const CIRCLE: &str = "83a663656e74657282a178d200000003a179d2fffffffc\
a6726164697573cb4004000000000000a56c6162656ca4756e6974";
const GRAPH: &str = "84a46e616d65a167a56e6f646573cd012c\
a4726f6f7483a663656e74657282a178d200000003a179d2fffffffc\
a6726164697573cb4004000000000000a56c6162656ca4756e6974\
a6776569676874c0";
const GRAPH_WEIGHTED: &str = "84a46e616d65a167a56e6f646573cd012c\
a4726f6f7483a663656e74657282a178d200000003a179d2fffffffc\
a6726164697573cb4004000000000000a56c6162656ca4756e6974\
a6776569676874ca3f000000";

fn golden(hex_str: &str) -> Vec<u8> {
    hex::decode(hex_str).unwrap()
}

#[test]
fn test_bool_map_golden() {
    let data = marshal(&(true, false), |slot, (a, b)| {
        slot.map(|map| {
            map.field("a", a)?.field("b", b)?;
            Ok(())
        })
    })
    .unwrap();
    assert_eq!(hex::encode(&data), BOOL_MAP);

    let doc = Document::new(&data);
    assert!(doc.has_field("a").unwrap());
    assert!(doc.decode_field::<bool>("a").unwrap());
    assert!(!doc.decode_field::<bool>("b").unwrap());
    assert!(!doc.has_field("c").unwrap());
}

#[test]
fn test_u8_width_golden() {
    let data = to_vec(&5u8).unwrap();
    assert_eq!(hex::encode(&data), "cc05");

    let mut reader = Reader::new(&data);
    let err = reader.read::<u16>().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    assert_eq!(reader.read::<u8>().unwrap(), 5);
}

#[test]
fn test_encode_fixtures_golden() {
    assert_eq!(hex::encode(to_vec(&sample_position()).unwrap()), POSITION);
    assert_eq!(hex::encode(to_vec(&sample_circle()).unwrap()), CIRCLE);
    assert_eq!(hex::encode(to_vec(&sample_graph()).unwrap()), GRAPH);

    let mut weighted = sample_graph();
    weighted.weight = Some(0.5);
    assert_eq!(hex::encode(to_vec(&weighted).unwrap()), GRAPH_WEIGHTED);
}

#[test]
fn test_decode_fixtures_golden() {
    let data = golden(POSITION);
    assert_eq!(unmarshal(&data, decode_position).unwrap(), sample_position());

    let data = golden(CIRCLE);
    assert_eq!(unmarshal(&data, decode_circle).unwrap(), sample_circle());

    let data = golden(GRAPH);
    assert_eq!(unmarshal(&data, decode_graph).unwrap(), sample_graph());

    let data = golden(GRAPH_WEIGHTED);
    let graph = unmarshal(&data, decode_graph).unwrap();
    assert_eq!(graph.weight, Some(0.5));
}

#[test]
fn test_nested_documents_share_buffer() {
    let data = golden(GRAPH);
    let doc = Document::new(&data);

    let root = doc.nested("root").unwrap();
    assert!(root.is_indexed());
    assert_eq!(root.byte_range().unwrap(), 22..72);
    assert_eq!(root.as_bytes(), &data[22..72]);

    let center = root.nested("center").unwrap();
    assert_eq!(center.as_bytes(), golden(POSITION).as_slice());
    assert_eq!(center.decode_field::<i32>("y").unwrap(), -4);

    // A nested view decodes the same as the standalone encoding.
    let standalone_bytes = golden(CIRCLE);
    let standalone = Document::new(&standalone_bytes);
    assert_eq!(
        decode_circle(&root).unwrap(),
        decode_circle(&standalone).unwrap()
    );
}

#[test]
fn test_borrowed_strings() {
    let data = golden(CIRCLE);
    let doc = Document::new(&data);
    let label: &str = doc.decode_field("label").unwrap();
    assert_eq!(label, "unit");

    let range = data.as_ptr_range();
    assert!(range.contains(&label.as_ptr()));
}

#[test]
fn test_field_formats() {
    let data = golden(GRAPH);
    let doc = Document::new(&data);
    assert_eq!(doc.field("name").unwrap().format(), FormatId::FixStr);
    assert_eq!(doc.field("nodes").unwrap().format(), FormatId::UInt16);
    assert_eq!(doc.field("root").unwrap().format(), FormatId::FixMap);
    assert!(doc.is_null("weight").unwrap());

    let mut keys: Vec<&str> = doc.keys().unwrap().collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["name", "nodes", "root", "weight"]);
}

#[test]
fn test_decode_errors() {
    let data = golden(GRAPH);
    let doc = Document::new(&data);

    let err = doc.decode_field::<u32>("nodes").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);

    let err = doc.decode_field::<u16>("missing").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::KeyNotFound);

    let err = doc.nested("name").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);

    let err = doc.decode_field::<&str>("root").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
}

#[test]
fn test_truncated_golden() {
    let data = golden(GRAPH);
    for cut in [1, 10, 30, data.len() - 1] {
        let doc = Document::new(&data[..cut]);
        let err = doc.has_field("name").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataCorrupted, "cut at {}", cut);
    }
}

#[test]
fn test_unknown_tag() {
    let data = golden("81a161c1");
    let err = Document::new(&data).has_field("a").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DataCorrupted);
}

#[test]
fn test_arrays_through_reader() {
    let data = to_vec(&vec![1u8, 2, 3]).unwrap();
    assert_eq!(hex::encode(&data), "93cc01cc02cc03");

    let mut reader = Reader::new(&data);
    assert_eq!(reader.read_array_len().unwrap(), 3);
    let items: Vec<u8> = (0..3).map(|_| reader.read::<u8>().unwrap()).collect();
    assert_eq!(items, vec![1, 2, 3]);

    let mut reader = Reader::new(&data);
    assert_eq!(
        reader.read_value().unwrap(),
        Value::Array(vec![Value::UInt8(1), Value::UInt8(2), Value::UInt8(3)])
    );

    // Indexed maps reject array values.
    let data = marshal(&vec![1u8], |slot, items| {
        slot.map(|map| {
            map.field("list", items)?;
            Ok(())
        })
    })
    .unwrap();
    let err = Document::new(&data).has_field("list").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotImplemented);
}

#[test]
fn test_string_thresholds() {
    let short = "x".repeat(31);
    let long = "x".repeat(32);
    assert_eq!(to_vec(&short).unwrap()[0], 0xbf);
    assert_eq!(&to_vec(&long).unwrap()[..2], &[0xd9, 0x20]);

    let wide = "x".repeat(256);
    assert_eq!(&to_vec(&wide).unwrap()[..3], &[0xda, 0x01, 0x00]);
}
