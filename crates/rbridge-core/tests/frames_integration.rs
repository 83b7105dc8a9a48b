//! Integration tests for data frame construction and row conversion.
//!
//! Tests cover:
//! - Row-record sequences becoming frames, whatever the key order
//! - Column-oriented construction and validation errors
//! - Row-oriented output round trips
//! - Inconsistent record sequences rejected as ineligible

use rbridge_core::{BridgeError, ConvertOptions, RData, RDataFrame, RDataNode, RObject};

fn row(a: i32, b: &str) -> Vec<(String, RData)> {
    vec![
        ("a".to_string(), RData::Int(a)),
        ("b".to_string(), RData::Str(b.to_string())),
    ]
}

#[test]
fn test_record_sequence_becomes_frame() {
    let items = vec![
        RData::Record(row(1, "x")),
        RData::Record(row(2, "y")),
    ];
    let obj = RObject::from_data(RData::Array(items)).unwrap();
    let frame = match obj {
        RObject::DataFrame(frame) => frame,
        other => panic!("expected a frame, got {:?}", other),
    };

    assert_eq!(frame.n_rows().unwrap(), 2);
    assert_eq!(frame.n_cols().unwrap(), 2);
    match frame.get("a").unwrap() {
        RObject::Integer(col) => assert_eq!(col.to_array().unwrap(), vec![Some(1), Some(2)]),
        other => panic!("unexpected: {:?}", other),
    }
    match frame.get("b").unwrap() {
        RObject::Character(col) => {
            assert_eq!(
                col.to_array().unwrap(),
                vec![Some("x".to_string()), Some("y".to_string())]
            );
        }
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn test_permuted_record_keys_still_form_frame() {
    // Records share a key set; the order inside each record is free.
    let items = vec![
        RData::Record(row(1, "x")),
        RData::Record(vec![
            ("b".to_string(), RData::Str("y".to_string())),
            ("a".to_string(), RData::Int(2)),
        ]),
    ];
    let frame = match RObject::from_data(RData::Array(items)).unwrap() {
        RObject::DataFrame(frame) => frame,
        other => panic!("expected a frame, got {:?}", other),
    };

    // Column order follows the first record.
    assert_eq!(
        frame.names().unwrap(),
        Some(vec![Some("a".to_string()), Some("b".to_string())])
    );
    match frame.get("a").unwrap() {
        RObject::Integer(col) => assert_eq!(col.to_array().unwrap(), vec![Some(1), Some(2)]),
        other => panic!("unexpected: {:?}", other),
    }
    match frame.get("b").unwrap() {
        RObject::Character(col) => {
            assert_eq!(
                col.to_array().unwrap(),
                vec![Some("x".to_string()), Some("y".to_string())]
            );
        }
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn test_inconsistent_records_are_not_eligible() {
    // Different key sets cannot transpose to columns, and a bare record has
    // no list fallback, so the sequence fails outright.
    let items = vec![
        RData::Record(vec![("a".to_string(), RData::Int(1))]),
        RData::Record(vec![("z".to_string(), RData::Int(2))]),
    ];
    assert!(matches!(
        RObject::from_data(RData::Array(items)),
        Err(BridgeError::NotEligibleFrame(_))
    ));

    // A non-scalar value disqualifies row transposition too.
    let items = vec![
        RData::Record(vec![("a".to_string(), RData::Int(1))]),
        RData::Record(vec![(
            "a".to_string(),
            RData::Array(vec![RData::Int(2), RData::Int(3)]),
        )]),
    ];
    assert!(matches!(
        RObject::from_data(RData::Array(items)),
        Err(BridgeError::NotEligibleFrame(_))
    ));
}

#[test]
fn test_records_round_trip() {
    let rows = vec![row(1, "x"), row(2, "y"), row(3, "z")];
    let frame = RDataFrame::from_records(&rows).unwrap();

    let back = frame.to_records().unwrap();
    assert_eq!(back.len(), 3);
    for (i, record) in back.iter().enumerate() {
        assert_eq!(record[0].0, "a");
        assert!(matches!(record[0].1, RData::Int(x) if x == (i as i32) + 1));
        assert_eq!(record[1].0, "b");
    }
}

#[test]
fn test_missing_values_survive_columns() {
    let frame = RDataFrame::from_record(vec![(
        "a".to_string(),
        RData::Array(vec![RData::Int(1), RData::Na]),
    )])
    .unwrap();

    let back = frame.to_records().unwrap();
    assert!(matches!(back[0][0].1, RData::Int(1)));
    assert!(matches!(back[1][0].1, RData::Na));
}

#[test]
fn test_frame_converts_as_list_of_columns() {
    let frame = RDataFrame::from_records(&[row(1, "x"), row(2, "y")]).unwrap();
    let obj = RObject::wrap(frame.handle()).unwrap();
    assert!(matches!(obj, RObject::DataFrame(_)));

    match obj.to_data(&ConvertOptions::default()).unwrap() {
        RData::Node(RDataNode::List { names, values }) => {
            assert_eq!(
                names,
                Some(vec![Some("a".to_string()), Some("b".to_string())])
            );
            assert_eq!(values.len(), 2);
        }
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn test_empty_record_sequence_is_not_a_frame() {
    assert!(RDataFrame::from_records(&[]).is_err());
}
