//! Integration tests for the document codec: layout, round trips, text encodings.

use std::sync::Arc;

use cask_settings::{
    Document, Member, MemberDescriptor, MemoryStorage, SchemaBuilder, Section, Settings,
    SettingsContainer, StorageBackend, StorageConfig, encode, field, inventory, populate,
};
use proptest::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
enum Mode {
    Quick,
    Careful,
}

#[derive(Debug, Clone, PartialEq)]
struct Limits {
    timeout_ms: u64,
}

impl Settings for Limits {
    fn declare(schema: &mut SchemaBuilder<Self>) {
        schema.field(field!(Limits, timeout_ms));
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Profile {
    name: String,
    retries: i32,
    mode: Mode,
    proxy: Option<String>,
    tags: Vec<String>,
    limits: Limits,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: "Ada".into(),
            retries: 3,
            mode: Mode::Careful,
            proxy: None,
            tags: vec!["a".into(), "b".into()],
            limits: Limits { timeout_ms: 250 },
        }
    }
}

impl Settings for Profile {
    fn declare(schema: &mut SchemaBuilder<Self>) {
        schema
            .member(Member::new(field!(Profile, name)).rename("DisplayName"))
            .field(field!(Profile, retries))
            .field(field!(Profile, mode))
            .field(field!(Profile, proxy))
            .field(field!(Profile, tags))
            .section(Section::new(field!(Profile, limits)));
    }
}

#[test]
fn test_document_layout() {
    let schema = inventory::<Profile>().unwrap();
    let document = encode(schema, &Profile::default()).unwrap();
    let text = document.to_pretty_string().unwrap();

    insta::assert_snapshot!("document_layout", text);
}

#[test]
fn test_schema_describes_members() {
    let schema = inventory::<Profile>().unwrap();

    let names: Vec<_> = schema
        .included_descriptors()
        .map(MemberDescriptor::serialized_name)
        .collect();
    assert_eq!(
        names,
        ["DisplayName", "retries", "mode", "proxy", "tags", "limits"]
    );
    assert!(schema.is_persisted("name"));
    assert!(!schema.is_persisted("DisplayName"));
}

fn load_bytes(bytes: &[u8]) -> SettingsContainer<Profile> {
    let storage = Arc::new(MemoryStorage::new());
    let mut settings: SettingsContainer<Profile> =
        SettingsContainer::with_storage(StorageConfig::default(), storage.clone()).unwrap();
    storage
        .create_directory(&settings.directory_path().unwrap())
        .unwrap();
    storage
        .write_all_bytes(&settings.file_path().unwrap(), bytes)
        .unwrap();
    settings.load().unwrap();
    settings
}

#[test]
fn test_load_utf8_with_bom() {
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice(br#"{ "retries": 9 }"#);

    assert_eq!(load_bytes(&bytes).retries, 9);
}

#[test]
fn test_load_utf16_with_bom() {
    let text = r#"{ "DisplayName": "Zoë" }"#;
    let mut le = vec![0xFF, 0xFE];
    let mut be = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        le.extend_from_slice(&unit.to_le_bytes());
        be.extend_from_slice(&unit.to_be_bytes());
    }

    assert_eq!(load_bytes(&le).name, "Zoë");
    assert_eq!(load_bytes(&be).name, "Zoë");
}

#[test]
fn test_load_ignores_trailing_padding() {
    let bytes = b"{ \"retries\": 4 }\n\0\0\0";

    assert_eq!(load_bytes(bytes).retries, 4);
}

#[test]
fn test_saved_bytes_are_pretty_utf8() {
    let storage = Arc::new(MemoryStorage::new());
    let mut settings: SettingsContainer<Profile> =
        SettingsContainer::with_storage(StorageConfig::default(), storage.clone()).unwrap();
    settings.save().unwrap();

    let bytes = storage
        .read_all_bytes(&settings.file_path().unwrap())
        .unwrap();
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.starts_with("{\n  \"DisplayName\": \"Ada\","));
    assert_eq!(Document::from_bytes(text.as_bytes()).unwrap().len(), 6);
}

fn mode() -> impl Strategy<Value = Mode> {
    prop_oneof![Just(Mode::Quick), Just(Mode::Careful)]
}

fn profile() -> impl Strategy<Value = Profile> {
    (
        ".*",
        any::<i32>(),
        mode(),
        proptest::option::of("[a-z]{0,12}"),
        proptest::collection::vec(".{0,8}", 0..4),
        any::<u64>(),
    )
        .prop_map(|(name, retries, mode, proxy, tags, timeout_ms)| Profile {
            name,
            retries,
            mode,
            proxy,
            tags,
            limits: Limits { timeout_ms },
        })
}

proptest! {
    #[test]
    fn prop_encode_then_populate_restores_value(value in profile()) {
        let schema = inventory::<Profile>().unwrap();
        let bytes = encode(schema, &value).unwrap().to_bytes().unwrap();
        let document = Document::from_bytes(&bytes).unwrap();

        let mut target = Profile::default();
        populate(schema, &mut target, &document).unwrap();

        prop_assert_eq!(target, value);
    }
}
