use conll_schema::descriptor::{self, OrderKey};
use conll_schema::{schema, CodecError, Format, FormatOptions, Kind, Value};

#[test]
fn test_schema_macro_field_order() {
    let schema = schema! {
        id: Kind::Int,
        word: Kind::Text,
        weight: Kind::Real,
    };
    let names: Vec<&str> = schema.fields().iter().map(|f| f.name()).collect();
    assert_eq!(names, vec!["id", "word", "weight"]);
    assert_eq!(schema.fields()[2].kind(), &Kind::Real);
}

#[test]
fn test_schema_macro_without_trailing_comma() {
    let schema = schema! { word: Kind::Text };
    assert_eq!(schema.len(), 1);
}

#[test]
fn test_schema_macro_with_descriptors() {
    let format = Format::new(schema! {
        word: Kind::Text,
        lemma: Kind::optional(Kind::Text) => descriptor::nullable(descriptor::text(), "_"),
        feats: Kind::map(Kind::Text, Kind::Text) => descriptor::mapping(
            descriptor::text(),
            descriptor::text(),
            "|",
            "=",
            Some("_"),
            OrderKey::natural(),
        ),
        span: Kind::tuple(Kind::Int) => descriptor::fixed_array(descriptor::int(), "-", 2),
    })
    .unwrap();

    let record = format.parse_record("ran\trun\tTense=Past\t4-7").unwrap();
    assert_eq!(record.get("lemma"), Some(&Value::from("run")));
    assert_eq!(record.get("feats"), Some(&Value::map([("Tense", "Past")])));
    assert_eq!(record.get("span"), Some(&Value::tuple([4, 7])));
    assert_eq!(
        format.serialize_record(&record).unwrap(),
        "ran\trun\tTense=Past\t4-7"
    );
}

#[test]
fn test_schema_macro_with_varcols() {
    let format = Format::compile(
        schema! {
            word: Kind::Text,
            extra: Kind::list(Kind::Text) => descriptor::varcols(descriptor::text()),
        },
        FormatOptions::default(),
    )
    .unwrap();
    let record = format.parse_record("w\tx\ty").unwrap();
    assert_eq!(record.get("extra"), Some(&Value::list(["x", "y"])));
}

#[test]
fn test_schema_macro_errors_surface_at_compile() {
    let err = Format::new(schema! {
        tags: Kind::set(Kind::Text),
    })
    .unwrap_err();
    assert!(err.is_schema());
    assert!(err.to_string().contains("needs an explicit descriptor"));
}

#[test]
fn test_schema_macro_via_descriptor() {
    let upper = descriptor::via(
        Kind::Text,
        |s| Ok(Value::from(s.to_lowercase())),
        |v| {
            v.as_str()
                .map(str::to_uppercase)
                .ok_or_else(|| CodecError::new("expected text"))
        },
    );
    let format = Format::new(schema! {
        code: Kind::Text => upper,
        n: Kind::Int,
    })
    .unwrap();
    let record = format.parse_record("ABC\t3").unwrap();
    assert_eq!(record.str("code"), Some("abc"));
    assert_eq!(format.serialize_record(&record).unwrap(), "ABC\t3");
}
