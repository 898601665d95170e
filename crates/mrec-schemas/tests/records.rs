//! End-to-end encode/decode over the schema catalogue.

use mrec_crypto::ContentHasher;
use mrec_record::json::map_from_json;
use mrec_record::{RawMap, Record, RecordError, Resolved, SchemaRegistry, Value};
use mrec_schemas::{register_all, stakeholder};
use mrec_types::{codec, Cid};
use serde_json::json;

fn registry() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();
    register_all(&mut registry).unwrap();
    registry
}

fn entity_cid(name: &str) -> Cid {
    registry()
        .encode("entity", 1, map(json!({ "id": name })))
        .unwrap()
        .cid()
        .unwrap()
        .clone()
}

fn map(value: serde_json::Value) -> RawMap {
    map_from_json(&value).unwrap()
}

fn link(cid: &Cid) -> serde_json::Value {
    json!({ "/": cid.to_string() })
}

fn content_data() -> RawMap {
    map(json!({
        "type": "article",
        "version": 1,
        "fingerprint": "hash://sha256/abcd",
        "title": "A Title",
        "tags": ["one", "two"],
    }))
}

fn stakeholders_data() -> RawMap {
    map(json!({
        "stakeholders": [
            { "type": "Creator", "stakeholder": link(&entity_cid("alice")), "sharing": 70 },
            { "type": "Publisher", "stakeholder": link(&entity_cid("bob")), "sharing": 30 },
        ]
    }))
}

fn kernel_data(registry: &SchemaRegistry, version: u64) -> RawMap {
    let rights = registry
        .encode(
            "rights",
            1,
            map(json!({
                "rights": [{
                    "holder": link(&entity_cid("alice")),
                    "type": "License",
                    "terms": link(&ContentHasher::SHA2_256.cid(codec::RAW, b"CC-BY-4.0")),
                    "period": { "from": "2020-01-01T00:00:00Z" },
                }]
            })),
        )
        .unwrap();
    let stakeholders = registry.encode("stakeholders", 1, stakeholders_data()).unwrap();
    let content = registry.encode("content", 1, content_data()).unwrap();

    let mut data = RawMap::new();
    data.insert("id".into(), Value::Bytes(vec![9; 32]));
    data.insert("timestamp".into(), "2020-01-01T00:00:00Z".into());
    data.insert("version".into(), version.into());
    data.insert("rights".into(), Value::Link(rights.cid().unwrap().clone()));
    data.insert(
        "stakeholders".into(),
        Value::Link(stakeholders.cid().unwrap().clone()),
    );
    data.insert("content".into(), Value::Link(content.cid().unwrap().clone()));
    data
}

fn roundtrip(registry: &SchemaRegistry, record: &Record) -> Record {
    registry
        .decode(record.name(), record.raw_data().unwrap(), record.cid().unwrap())
        .unwrap()
}

#[test]
fn every_kind_roundtrips() {
    let registry = registry();
    let records = [
        registry.encode("content", 1, content_data()).unwrap(),
        registry.encode("stakeholders", 1, stakeholders_data()).unwrap(),
        registry.encode("iscn", 1, kernel_data(&registry, 1)).unwrap(),
        registry
            .encode("entity", 1, map(json!({ "id": "carol", "name": "Carol" })))
            .unwrap(),
    ];
    for record in &records {
        let back = roundtrip(&registry, record);
        assert_eq!(back.cid(), record.cid());
        assert_eq!(back.data(), record.data(), "{record}");
        assert_eq!(back.custom(), record.custom(), "{record}");
    }
}

#[test]
fn kernel_text_id_binds_as_bytes() {
    let registry = registry();
    let mut data = kernel_data(&registry, 1);
    let text = format!("1/{}", bs58::encode([9u8; 32]).into_string());
    data.insert("id".into(), text.clone().into());

    let record = registry.encode("iscn", 1, data).unwrap();
    let back = roundtrip(&registry, &record);
    assert_eq!(back.data(), record.data());
    assert_eq!(record.get_bytes("id").unwrap(), &[9u8; 32][..]);
    assert_eq!(back.get_bytes("id").unwrap(), &[9u8; 32][..]);

    let bytes_form = registry.encode("iscn", 1, kernel_data(&registry, 1)).unwrap();
    assert_eq!(bytes_form.cid(), record.cid());
    assert_eq!(record.to_json().unwrap()["id"], text);
}

#[test]
fn nested_null_optional_is_dropped_on_both_sides() {
    let registry = registry();
    let data = map(json!({
        "rights": [{
            "holder": link(&entity_cid("alice")),
            "type": "License",
            "terms": link(&ContentHasher::SHA2_256.cid(codec::RAW, b"CC0")),
            "period": { "from": "2021-06-01T12:00:00Z", "to": null },
        }]
    }));
    let record = registry.encode("rights", 1, data).unwrap();
    let back = roundtrip(&registry, &record);
    assert_eq!(back.data(), record.data());

    for r in [&record, &back] {
        let from = r.resolve_path("rights/0/period/from").unwrap().into_value();
        assert_eq!(from, Value::from("2021-06-01T12:00:00Z"));
        assert!(r.resolve_path("rights/0/period/to").is_err());
        let Resolved::Record(period) = r.resolve(&["rights", "0", "period"]).unwrap() else {
            panic!("period should resolve to a record");
        };
        assert!(!period.data().unwrap().contains_key("to"));
    }
}

#[test]
fn top_level_null_optional_is_dropped_on_both_sides() {
    let registry = registry();
    let mut data = content_data();
    data.insert("description".into(), Value::Null);
    let record = registry.encode("content", 1, data).unwrap();
    let back = roundtrip(&registry, &record);

    assert_eq!(back.data(), record.data());
    assert!(!record.data().unwrap().contains_key("description"));
    assert!(record.custom().is_empty());
    assert_eq!(back.get_str("title").unwrap(), "A Title");
    assert_eq!(record.get_str("title").unwrap(), "A Title");
    let plain = registry.encode("content", 1, content_data()).unwrap();
    assert_eq!(plain.cid(), record.cid());
}

#[test]
fn encoding_is_deterministic() {
    let registry = registry();
    let a = registry.encode("content", 1, content_data()).unwrap();
    let b = registry.encode("content", 1, content_data()).unwrap();
    assert_eq!(a.raw_data(), b.raw_data());
    assert_eq!(a.cid(), b.cid());
}

#[test]
fn required_fields_are_enforced() {
    let registry = registry();
    for key in ["type", "version", "fingerprint", "title"] {
        let mut data = content_data();
        data.remove(key);
        let err = registry.encode("content", 1, data).unwrap_err();
        assert!(
            matches!(&err, RecordError::MissingRequiredField { key: k } if k == key),
            "{key}: {err}"
        );
    }
}

#[test]
fn decode_enforces_required_fields() {
    let registry = registry();
    let record = registry.encode("content", 1, content_data()).unwrap();
    let mut raw = mrec_record::canonical::from_bytes(record.raw_data().unwrap()).unwrap();
    raw.remove("title");
    let bytes = mrec_record::canonical::to_bytes(&raw).unwrap();
    let cid = ContentHasher::SHA2_256.cid(codec::CONTENT, &bytes);
    assert!(matches!(
        registry.decode("content", &bytes, &cid),
        Err(RecordError::MissingRequiredField { .. })
    ));
}

#[test]
fn kernel_parent_follows_version() {
    let registry = registry();
    let parent = registry.encode("iscn", 1, kernel_data(&registry, 1)).unwrap();
    let parent_link = Value::Link(parent.cid().unwrap().clone());

    let mut v1_with_parent = kernel_data(&registry, 1);
    v1_with_parent.insert("parent".into(), parent_link.clone());
    assert!(matches!(
        registry.encode("iscn", 1, v1_with_parent),
        Err(RecordError::ValidationFailed { .. })
    ));

    assert!(matches!(
        registry.encode("iscn", 1, kernel_data(&registry, 2)),
        Err(RecordError::ValidationFailed { .. })
    ));

    let mut v2 = kernel_data(&registry, 2);
    v2.insert("parent".into(), parent_link);
    let child = registry.encode("iscn", 1, v2).unwrap();
    let back = roundtrip(&registry, &child);
    assert_eq!(back.get_cid("parent").unwrap(), parent.cid().unwrap());
    assert_eq!(back.links().len(), 4);
}

#[test]
fn parent_must_link_the_same_kind() {
    let registry = registry();
    let mut data = kernel_data(&registry, 2);
    data.insert("parent".into(), Value::Link(entity_cid("x")));
    assert!(matches!(
        registry.encode("iscn", 1, data),
        Err(RecordError::LinkCodecMismatch { .. })
    ));
}

#[test]
fn sharing_bounds() {
    let registry = registry();
    let encode = |sharing: Value| {
        let mut data = map(json!({ "type": "Creator", "stakeholder": link(&entity_cid("a")) }));
        data.insert("sharing".into(), sharing);
        registry.encode(stakeholder::NAME, 1, data)
    };
    assert!(encode(Value::from(0u8)).is_ok());
    assert!(encode(Value::from(4_294_967_295u64)).is_ok());
    assert!(matches!(
        encode(Value::from(4_294_967_296u64)),
        Err(RecordError::RangeError { .. })
    ));
    assert!(matches!(
        encode(Value::from(-1i64)),
        Err(RecordError::RangeError { .. })
    ));
}

#[test]
fn array_element_errors_are_indexed() {
    let registry = registry();
    let data = map(json!({
        "stakeholders": [
            { "type": "Creator", "stakeholder": link(&entity_cid("a")), "sharing": 1 },
            { "type": "Creator", "stakeholder": link(&entity_cid("b")), "sharing": -1 },
        ]
    }));
    let err = registry.encode("stakeholders", 1, data).unwrap_err();
    assert!(matches!(err, RecordError::Element { index: 1, .. }));
    assert!(matches!(err.root_cause(), RecordError::RangeError { .. }));
}

#[test]
fn timestamp_patterns() {
    let registry = registry();
    let encode = |ts: &str| registry.encode("timeperiod", 1, map(json!({ "from": ts })));
    assert!(encode("2020-01-01T00:00:00Z").is_ok());
    assert!(matches!(
        encode("2020-13-01T00:00:00Z"),
        Err(RecordError::PatternMismatch { .. })
    ));
    assert!(matches!(
        encode("2020-01-01T00:00:00"),
        Err(RecordError::PatternMismatch { .. })
    ));
}

#[test]
fn custom_fields_pass_through_after_schema_fields() {
    let registry = registry();
    let mut data = content_data();
    data.insert("foo".into(), 123u16.into());
    let record = registry.encode("content", 1, data).unwrap();
    let back = roundtrip(&registry, &record);

    assert_eq!(back.custom().get("foo"), Some(&Value::Uint(123)));
    let json = back.to_json_map().unwrap();
    assert_eq!(json["foo"], 123);
    assert_eq!(json.keys().last().map(String::as_str), Some("foo"));
    assert_eq!(json.keys().next().map(String::as_str), Some("context"));
    assert_eq!(json["context"], "schema/content-v1");
}

#[test]
fn integrity_mismatch_reports_both_identifiers() {
    let registry = registry();
    let record = registry.encode("content", 1, content_data()).unwrap();
    let mut other = content_data();
    other.insert("title".into(), "Another".into());
    let wrong = registry.encode("content", 1, other).unwrap();

    let err = registry
        .decode("content", record.raw_data().unwrap(), wrong.cid().unwrap())
        .unwrap_err();
    let text = err.to_string();
    assert!(matches!(err, RecordError::CidIntegrityMismatch { .. }));
    assert!(text.contains(&record.cid().unwrap().to_string()));
    assert!(text.contains(&wrong.cid().unwrap().to_string()));
}

#[test]
fn corrupted_bytes_fail_to_verify() {
    let registry = registry();
    let record = registry.encode("entity", 1, map(json!({ "id": "dave" }))).unwrap();
    let mut bytes = record.raw_data().unwrap().to_vec();
    let last = bytes.len() - 1;
    bytes[last] ^= 0x01;
    assert!(registry
        .decode("entity", &bytes, record.cid().unwrap())
        .is_err());
}

#[test]
fn stakeholder_path_resolution() {
    let registry = registry();
    let record = registry.encode("stakeholders", 1, stakeholders_data()).unwrap();

    let resolved = record.resolve(&["stakeholders", "0", "stakeholder"]).unwrap();
    let (cid, rest) = resolved.as_link().unwrap();
    assert_eq!(cid, &entity_cid("alice"));
    assert!(rest.is_empty());

    assert!(matches!(
        record.resolve(&["stakeholders", "99", "stakeholder"]),
        Err(RecordError::PathResolution(_))
    ));
    assert_eq!(
        record.resolve_path("stakeholders/1/sharing").unwrap().into_value(),
        Value::Uint(30)
    );
    assert!(matches!(
        record.resolve(&["stakeholders", "0"]).unwrap(),
        Resolved::Record(r) if r.name() == "stakeholder"
    ));
}

#[test]
fn kernel_json_projection() {
    let registry = registry();
    let record = registry.encode("iscn", 1, kernel_data(&registry, 1)).unwrap();
    let json = record.to_json().unwrap();
    assert_eq!(json["context"], "schema/iscn-v1");
    assert!(json["id"].as_str().unwrap().starts_with("1/"));
    assert!(json["content"]["/"].as_str().unwrap().starts_with("/ipfs/z"));
    assert!(json.get("parent").is_none());
}

#[test]
fn tree_lists_nested_paths() {
    let registry = registry();
    let record = registry.encode("stakeholders", 1, stakeholders_data()).unwrap();
    let paths = record.tree("", -1);
    for expected in [
        "context",
        "stakeholders",
        "stakeholders/0",
        "stakeholders/0/type",
        "stakeholders/1/sharing",
    ] {
        assert!(paths.iter().any(|p| p == expected), "{expected} missing");
    }
    assert_eq!(record.tree("stakeholders/0", 1).len(), 4);
}

#[test]
fn links_cover_nested_records() {
    let registry = registry();
    let record = registry.encode("stakeholders", 1, stakeholders_data()).unwrap();
    let names: Vec<String> = record.links().into_iter().map(|l| l.name).collect();
    assert_eq!(
        names,
        ["stakeholders/0/stakeholder", "stakeholders/1/stakeholder"]
    );
}
