use proptest::prelude::*;
use typerighter_core::{Type, Value};
use typerighter_leaf::{parse_datetime, DateTimeType, Ipv4Type, UuidType};

fn iso_text() -> impl Strategy<Value = String> {
    (
        1970i32..2100,
        1u32..=12,
        1u32..=28,
        0u32..24,
        0u32..60,
        0u32..60,
        0u32..1_000_000,
        prop_oneof![
            Just(String::new()),
            Just("Z".to_string()),
            (0u32..14, prop_oneof![Just(0u32), Just(30u32)], any::<bool>()).prop_map(
                |(h, m, neg)| format!("{}{h:02}:{m:02}", if neg { '-' } else { '+' })
            ),
        ],
    )
        .prop_map(|(y, mo, d, h, mi, s, us, tz)| {
            format!("{y:04}-{mo:02}-{d:02}T{h:02}:{mi:02}:{s:02}.{us:06}{tz}")
        })
}

proptest! {
    #[test]
    fn prop_datetime_primitive_is_idempotent(text in iso_text()) {
        let ty = DateTimeType::builder().build().unwrap();
        let once = ty.to_primitive(&Value::Str(text)).unwrap();
        let twice = ty.to_primitive(&ty.to_native(&once).unwrap()).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_datetime_parses_every_generated_stamp(text in iso_text()) {
        prop_assert!(parse_datetime(&text).is_ok());
    }

    #[test]
    fn prop_uuid_normalizes_to_simple_form(n in any::<u128>()) {
        let ty = UuidType::builder().build().unwrap();
        let uuid = uuid::Uuid::from_u128(n);
        let hyphenated = Value::Str(uuid.hyphenated().to_string());

        let once = ty.to_primitive(&hyphenated).unwrap();
        prop_assert_eq!(&once, &Value::Str(uuid.simple().to_string()));
        prop_assert_eq!(ty.to_primitive(&once).unwrap(), once);
        prop_assert!(ty.validate(&hyphenated).is_ok());
    }

    #[test]
    fn prop_dotted_quads_validate(octets in proptest::array::uniform4(any::<u8>())) {
        let ty = Ipv4Type::builder().build().unwrap();
        let [a, b, c, d] = octets;
        let text = Value::Str(format!("{a}.{b}.{c}.{d}"));
        prop_assert!(ty.validate(&text).is_ok());
    }
}
