//! Testing utilities for the Typerighter workspace
//!
//! Shared fixtures (a small music catalogue), sample data and tracing setup.

#![allow(missing_docs)]

use std::sync::Arc;

use serde_json::json;
use typerighter_core::{
    Definition, FieldPath, ListType, Record, StringType, TypeBuilder, Value,
};
use typerighter_leaf::{DateTimeType, UnixPathType, UrlType};

/// Install a test-friendly subscriber once; filter comes from `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn song_definition() -> Arc<Definition> {
    Record::define("Song")
        .field("name", StringType::builder().required(true).build().unwrap())
        .field("created_at", DateTimeType::builder().build().unwrap())
        .field("file", UnixPathType::builder().build().unwrap())
        .field("lyrics", StringType::builder().max_length(255).build().unwrap())
        .build()
}

pub fn album_definition() -> Arc<Definition> {
    let song = Record::builder(&song_definition()).build().unwrap();
    Record::define("Album")
        .field("name", StringType::builder().required(true).build().unwrap())
        .field("created_at", DateTimeType::builder().build().unwrap())
        .field("songs", ListType::builder(song).build().unwrap())
        .build()
}

pub fn artist_definition() -> Arc<Definition> {
    let album = Record::builder(&album_definition()).build().unwrap();
    Record::define("Artist")
        .field("name", StringType::builder().required(true).build().unwrap())
        .field("created_at", DateTimeType::builder().build().unwrap())
        .field("website", UrlType::builder().build().unwrap())
        .field("albums", ListType::builder(album).build().unwrap())
        .build()
}

pub fn artist_builder() -> TypeBuilder<Record> {
    Record::builder(&artist_definition())
}

pub fn artist_record() -> Record {
    artist_builder().build().unwrap()
}

pub fn artist_data() -> Value {
    Value::from(json!({
        "name": "American Food",
        "created_at": "2021-05-29T00:00:01.001337",
        "albums": [{
            "name": "Internet On The TV",
            "created_at": "2021-05-29T00:00:01.001337",
            "songs": [{
                "name": "Cane Spiders (mispoke)",
                "created_at": "2021-05-29T00:00:00.001337",
                "lyrics": "Oh my gawd! It's that red dot! Gonna catch that..."
            }, {
                "name": "My Take On Take On Me",
                "created_at": "2021-05-30T00:00:00.001337",
                "lyrics": "I know. I know. I talk in numbers..."
            }]
        }]
    }))
}

pub fn paths(raw: &[&str]) -> Vec<FieldPath> {
    FieldPath::parse_all(raw).unwrap()
}

/// Keys of a converted mapping, in order
pub fn keys(value: &Value) -> Vec<&str> {
    value
        .as_map()
        .map(|m| m.keys().map(String::as_str).collect())
        .unwrap_or_default()
}

pub fn map_at<'v>(value: &'v Value, key: &str) -> &'v Value {
    &value.as_map().unwrap()[key]
}

pub fn list_at<'v>(value: &'v Value, key: &str, index: usize) -> &'v Value {
    &map_at(value, key).as_list().unwrap()[index]
}
