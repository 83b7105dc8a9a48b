//! Integration tests for the marshalling cascades.
//!
//! Tests cover:
//! - Scalar and vector round trips through the heap
//! - Missing-value propagation in both directions
//! - Array inference, including the concatenation fallback
//! - Depth-bounded conversion
//! - Record collapsing with duplicate and empty key handling

use rbridge_core::{
    Complex, ConvertOptions, Index, ObjectOptions, RData, RDataNode, RList, RObject,
};

#[test]
fn test_scalar_round_trips() {
    let cases = vec![
        RData::Bool(true),
        RData::Int(42),
        RData::Double(6.5),
        RData::Str("hello".to_string()),
        RData::Complex(Complex::new(1.0, -2.0)),
    ];
    for case in cases {
        let obj = RObject::from_data(case.clone()).unwrap();
        let back = obj.to_data(&ConvertOptions::default()).unwrap();
        let node = match back {
            RData::Node(node) => node,
            other => panic!("expected a typed node, got {:?}", other),
        };
        match (&case, &node) {
            (RData::Bool(b), RDataNode::Logical { values, .. }) => {
                assert_eq!(values, &vec![Some(*b)]);
            }
            (RData::Int(x), RDataNode::Integer { values, .. }) => {
                assert_eq!(values, &vec![Some(*x)]);
            }
            (RData::Double(x), RDataNode::Double { values, .. }) => {
                assert_eq!(values, &vec![Some(*x)]);
            }
            (RData::Str(s), RDataNode::Character { values, .. }) => {
                assert_eq!(values, &vec![Some(s.clone())]);
            }
            (RData::Complex(z), RDataNode::Complex { values, .. }) => {
                assert_eq!(values, &vec![Some(*z)]);
            }
            other => panic!("mismatched round trip: {:?}", other),
        }
    }
}

#[test]
fn test_missing_marker_round_trips() {
    let obj = RObject::from_data(RData::Na).unwrap();
    assert!(obj.any().is_na().unwrap());
    match obj.to_data(&ConvertOptions::default()).unwrap() {
        RData::Node(RDataNode::Logical { values, .. }) => assert_eq!(values, vec![None]),
        other => panic!("unexpected: {:?}", other),
    }

    // Missing slots survive inside a vector.
    let obj = RObject::from_data(RData::Array(vec![
        RData::Double(1.0),
        RData::Na,
        RData::Double(3.0),
    ]))
    .unwrap();
    match obj.to_data(&ConvertOptions::default()).unwrap() {
        RData::Node(RDataNode::Double { values, .. }) => {
            assert_eq!(values, vec![Some(1.0), None, Some(3.0)]);
        }
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn test_named_node_round_trips() {
    let obj = RObject::from_data(RData::Node(RDataNode::Integer {
        names: Some(vec![Some("a".to_string()), Some("b".to_string())]),
        values: vec![Some(1), Some(2)],
    }))
    .unwrap();
    match obj.to_data(&ConvertOptions::default()).unwrap() {
        RData::Node(RDataNode::Integer { names, values }) => {
            assert_eq!(names, Some(vec![Some("a".to_string()), Some("b".to_string())]));
            assert_eq!(values, vec![Some(1), Some(2)]);
        }
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn test_mixed_array_defers_to_runtime_concat() {
    // A logical next to a number promotes numerically, not lexically.
    let obj = RObject::from_data(RData::Array(vec![RData::Bool(true), RData::Double(2.5)]))
        .unwrap();
    match obj {
        RObject::Double(v) => assert_eq!(v.to_array().unwrap(), vec![Some(1.0), Some(2.5)]),
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn test_array_of_wrapped_objects_concatenates() {
    // Already-wrapped vectors have no scalar fast path, so the sequence is
    // handed to the runtime's own concatenation.
    let a = RObject::from_data(RData::Array(vec![RData::Double(1.0), RData::Double(2.0)]))
        .unwrap();
    let b = RObject::from_data(RData::Array(vec![RData::Double(3.0), RData::Double(4.0)]))
        .unwrap();
    let merged = RObject::from_data(RData::Array(vec![
        RData::Object(a),
        RData::Object(b),
    ]))
    .unwrap();
    match merged {
        RObject::Double(v) => {
            assert_eq!(
                v.to_array().unwrap(),
                vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)]
            );
        }
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn test_bare_record_is_reserved_for_frames() {
    // An eligible record of equal-length atomic columns becomes a frame.
    let eligible = RData::Record(vec![
        ("a".to_string(), RData::Array(vec![RData::Int(1), RData::Int(2)])),
        (
            "b".to_string(),
            RData::Array(vec![RData::Str("x".into()), RData::Str("y".into())]),
        ),
    ]);
    assert!(matches!(
        RObject::from_data(eligible).unwrap(),
        RObject::DataFrame(_)
    ));

    // An ineligible shape fails with a descriptive error instead of quietly
    // becoming a list.
    let ineligible = RData::Record(vec![(
        "nested".to_string(),
        RData::Record(vec![("x".to_string(), RData::Int(1))]),
    )]);
    assert!(matches!(
        RObject::from_data(ineligible),
        Err(rbridge_core::BridgeError::NotEligibleFrame(_))
    ));
}

#[test]
fn test_nested_record_round_trips() {
    let obj = RObject::List(
        RList::from_record(vec![
            (
                "point".to_string(),
                RData::Record(vec![
                    ("x".to_string(), RData::Double(1.0)),
                    ("y".to_string(), RData::Double(2.0)),
                ]),
            ),
            ("label".to_string(), RData::Str("origin".to_string())),
        ])
        .unwrap(),
    );

    match obj.to_data(&ConvertOptions::default()).unwrap() {
        RData::Node(RDataNode::List { names, values }) => {
            assert_eq!(
                names,
                Some(vec![Some("point".to_string()), Some("label".to_string())])
            );
            assert!(matches!(
                values[0],
                RData::Node(RDataNode::List { .. })
            ));
            assert!(matches!(
                values[1],
                RData::Node(RDataNode::Character { .. })
            ));
        }
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn test_depth_bound_stops_conversion() {
    let obj = RObject::List(
        RList::from_record(vec![(
            "outer".to_string(),
            RData::Record(vec![(
                "inner".to_string(),
                RData::Record(vec![("leaf".to_string(), RData::Int(1))]),
            )]),
        )])
        .unwrap(),
    );

    // Depth 1: the top level converts, every child stays a wrapped object.
    let bounded = obj.to_data(&ConvertOptions { depth: 1 }).unwrap();
    match bounded {
        RData::Node(RDataNode::List { values, .. }) => {
            assert!(matches!(values[0], RData::Object(RObject::List(_))));
        }
        other => panic!("unexpected: {:?}", other),
    }

    // Depth 2: one more level converts before wrapping takes over.
    let bounded = obj.to_data(&ConvertOptions { depth: 2 }).unwrap();
    match bounded {
        RData::Node(RDataNode::List { values, .. }) => match &values[0] {
            RData::Node(RDataNode::List { values, .. }) => {
                assert!(matches!(values[0], RData::Object(RObject::List(_))));
            }
            other => panic!("unexpected: {:?}", other),
        },
        other => panic!("unexpected: {:?}", other),
    }

    // Depth 0 is unbounded.
    let full = obj.to_data(&ConvertOptions { depth: 0 }).unwrap();
    match full {
        RData::Node(RDataNode::List { values, .. }) => match &values[0] {
            RData::Node(RDataNode::List { values, .. }) => {
                assert!(matches!(values[0], RData::Node(RDataNode::List { .. })));
            }
            other => panic!("unexpected: {:?}", other),
        },
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn test_pluck_reports_absence_as_none() {
    let obj = RList::from_record(vec![(
        "a".to_string(),
        RData::Record(vec![("b".to_string(), RData::Int(5))]),
    )])
    .unwrap();

    let hit = obj.pluck(&[Index::from("a"), Index::from("b")]).unwrap();
    match hit {
        Some(RObject::Integer(v)) => assert_eq!(v.to_scalar().unwrap(), 5),
        other => panic!("unexpected: {:?}", other),
    }

    let miss = obj.pluck(&[Index::from("a"), Index::from("z")]).unwrap();
    assert!(miss.is_none());
}

#[test]
fn test_to_object_key_options() {
    let list = RList::new(
        vec![RData::Int(1), RData::Int(2)],
        Some(vec!["k".to_string(), "k".to_string()]),
    )
    .unwrap();

    // By default values stay wrapped objects.
    let out = list.to_object(&ObjectOptions::default()).unwrap();
    assert_eq!(out.len(), 1);
    assert!(matches!(out[0].1, RData::Object(RObject::Integer(_))));

    // Duplicates allowed by default, later occurrence wins.
    let converting = ObjectOptions {
        depth: 0,
        ..ObjectOptions::default()
    };
    let out = list.to_object(&converting).unwrap();
    assert_eq!(out.len(), 1);
    assert!(matches!(out[0].1, RData::Node(RDataNode::Integer { ref values, .. }) if values == &vec![Some(2)]));

    let strict = ObjectOptions {
        allow_duplicate_key: false,
        ..ObjectOptions::default()
    };
    assert!(list.to_object(&strict).is_err());

    // Unnamed elements are rejected unless empty keys are allowed.
    let unnamed = RList::new(vec![RData::Int(1)], None).unwrap();
    assert!(unnamed.to_object(&ObjectOptions::default()).is_err());
    let relaxed = ObjectOptions {
        allow_empty_key: true,
        ..ObjectOptions::default()
    };
    assert_eq!(unnamed.to_object(&relaxed).unwrap().len(), 1);
}
