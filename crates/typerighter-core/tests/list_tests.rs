use pretty_assertions::assert_eq;
use serde_json::json;
use typerighter_core::prelude::*;

fn strings() -> StringType {
    StringType::builder().build().unwrap()
}

fn list(value: serde_json::Value) -> Value {
    Value::from(value)
}

#[test]
fn test_list_conversion_coerces_elements() {
    let lt = ListType::builder(StringType::builder().min_length(5).build().unwrap())
        .build()
        .unwrap();

    let plain = list(json!(["a", "b", "meow"]));
    assert_eq!(lt.to_primitive(&plain).unwrap(), plain);
    assert_eq!(lt.to_native(&plain).unwrap(), plain);

    let mixed = list(json!(["data", 4]));
    assert_eq!(lt.to_primitive(&mixed).unwrap(), list(json!(["data", "4"])));
    assert_eq!(lt.to_native(&mixed).unwrap(), list(json!(["data", "4"])));
}

#[test]
fn test_list_validates_the_basics() {
    let lt = ListType::builder(strings()).build().unwrap();

    assert!(lt.validate(&list(json!(["list", "of", "strings"]))).is_ok());
    assert!(lt.validate(&list(json!([]))).is_ok());
    assert!(lt.validate(&Value::Null).is_ok());
    assert!(lt.validate(&Value::Unset).is_ok());
}

#[test]
fn test_required_list() {
    let lt = ListType::builder(strings()).required(true).build().unwrap();

    assert!(lt.validate(&list(json!(["list"]))).is_ok());
    assert!(lt.validate(&list(json!([]))).is_ok());
    assert!(lt.validate(&Value::Null).is_ok());
    assert!(lt.validate(&Value::Unset).is_err());
    assert!(lt.validate(&Value::List(vec![Value::Unset])).is_ok());
}

#[test]
fn test_required_items() {
    let lt = ListType::builder(StringType::builder().required(true).build().unwrap())
        .build()
        .unwrap();

    assert!(lt.validate(&list(json!(["list", "of", "strings"]))).is_ok());
    assert!(lt.validate(&list(json!([]))).is_ok());
    assert!(lt.validate(&Value::Unset).is_ok());

    let err = lt.validate(&Value::List(vec![Value::Unset])).unwrap_err();
    assert!(err.to_string().contains("Item 0"));
}

#[test]
fn test_min_length_skips_empty_lists() {
    let lt = ListType::builder(strings()).min_length(3).build().unwrap();

    assert!(lt.validate(&list(json!(["list", "of", "strings"]))).is_ok());
    assert!(lt.validate(&list(json!(["list", "of"]))).is_err());
    assert!(lt.validate(&Value::Unset).is_ok());
    assert!(lt.validate(&list(json!([]))).is_ok());
    assert!(lt.validate(&Value::Null).is_ok());
}

#[test]
fn test_max_length() {
    let lt = ListType::builder(strings()).max_length(3).build().unwrap();

    assert!(lt.validate(&list(json!(["list", "of", "strings"]))).is_ok());
    assert!(lt.validate(&list(json!([]))).is_ok());
    assert!(lt.validate(&Value::Null).is_ok());
    assert!(lt.validate(&list(json!(["li", "st", "of", "strings"]))).is_err());
}

#[test]
fn test_item_policies_differ_on_mixed_lists() {
    let element = || StringType::builder().max_length(3).build().unwrap();
    let mixed = list(json!(["ok", "too long"]));

    let all = ListType::builder(element()).build().unwrap();
    assert_eq!(all.policy(), ItemPolicy::All);
    let err = all.validate(&mixed).unwrap_err();
    assert!(err.to_string().contains("Item 1"));

    let any = ListType::builder(element())
        .item_policy(ItemPolicy::Any)
        .build()
        .unwrap();
    assert!(any.validate(&mixed).is_ok());
    assert!(any.validate(&list(json!(["too long"]))).is_err());
}

#[test]
fn test_list_of_sums() {
    let variant = SumType::builder()
        .variant(IntegerType::builder().strict(true).build().unwrap())
        .variant(BooleanType::builder().strict(true).build().unwrap())
        .build()
        .unwrap();
    let lt = ListType::builder(variant).build().unwrap();

    assert!(lt.validate(&list(json!([1, true, 3]))).is_ok());
    assert!(lt.validate(&list(json!([1, "x"]))).is_err());
    assert!(lt.to_native(&list(json!([1, "x"]))).unwrap_err().is_resolution());
}

#[test]
fn test_non_list_is_conversion_error() {
    let lt = ListType::builder(strings()).build().unwrap();
    assert!(lt.to_native(&Value::from("nope")).unwrap_err().is_conversion());
    assert!(lt.validate(&Value::from("nope")).unwrap_err().is_validation());
}
