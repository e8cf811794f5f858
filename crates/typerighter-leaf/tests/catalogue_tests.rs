use pretty_assertions::assert_eq;
use typerighter_core::{Type, TypeRegistry, Value, ViewMode};
use typerighter_leaf::{parse_datetime, register_all};
use typerighter_test_utils::{artist_data, artist_record, init_tracing, list_at, map_at};

fn with_field(mut data: Value, name: &str, value: impl Into<Value>) -> Value {
    if let Value::Map(map) = &mut data {
        map.insert(name.to_string(), value.into());
    }
    data
}

#[test]
fn test_catalogue_validates() {
    init_tracing();
    let artist = artist_record();
    assert!(artist.validate(&artist_data()).is_ok());
}

#[test]
fn test_bad_website_fails_validation() {
    let artist = artist_record();
    let good = with_field(artist_data(), "website", "http://americanfood.band");
    let bad = with_field(artist_data(), "website", "americanfood.band");

    assert!(artist.validate(&good).is_ok());
    assert!(artist.validate(&bad).unwrap_err().is_validation());
}

#[test]
fn test_bad_timestamp_fails_validation_and_conversion() {
    let artist = artist_record();
    let bad = with_field(artist_data(), "created_at", "last tuesday");

    assert!(artist.validate(&bad).is_err());
    assert!(artist.to_native(&bad).unwrap_err().is_conversion());
}

#[test]
fn test_native_view_holds_timestamps() {
    let artist = artist_record();
    let view = artist.to_view(&artist_data(), ViewMode::Native).unwrap();

    let expected = parse_datetime("2021-05-29T00:00:01.001337").unwrap();
    assert_eq!(view.get("created_at").unwrap(), &Value::DateTime(expected));

    let data = view.to_value();
    let song = list_at(list_at(&data, "albums", 0), "songs", 0);
    assert!(matches!(map_at(song, "created_at"), Value::DateTime(_)));
}

#[test]
fn test_primitive_round_trip_is_stable() {
    let artist = artist_record();
    let once = artist.to_primitive(&artist_data()).unwrap();
    let twice = artist
        .to_primitive(&artist.to_native(&once).unwrap())
        .unwrap();
    assert_eq!(once, twice);
    assert_eq!(once, artist_data());
}

#[test]
fn test_leaf_definitions_reach_the_global_registry() {
    let registry = TypeRegistry::global();
    register_all(registry).unwrap();
    assert!(registry.contains("MACAddressType"));
    assert!(registry.contains("StringType"));
}
