/// Builds a [`Schema`](crate::Schema) from `name: Kind` pairs, in column order.
///
/// A field whose kind is not primitive takes its descriptor after `=>`.
///
/// # Examples
///
/// ```rust
/// use conll_schema::{descriptor, schema, Format, Kind};
///
/// let schema = schema! {
///     id: Kind::Int,
///     word: Kind::Text,
///     tags: Kind::list(Kind::Text) => descriptor::array(descriptor::text(), ",", Some("-")),
/// };
/// let format = Format::new(schema).unwrap();
/// assert_eq!(format.field_names().collect::<Vec<_>>(), ["id", "word", "tags"]);
/// ```
#[macro_export]
macro_rules! schema {
    // Field with the default descriptor of its kind
    (@field $builder:ident, $name:ident, $kind:expr) => {
        $builder.field(stringify!($name), $kind)
    };

    // Field with an explicit descriptor
    (@field $builder:ident, $name:ident, $kind:expr, $descriptor:expr) => {
        $builder.field_with(stringify!($name), $kind, $descriptor)
    };

    () => {
        $crate::Schema::builder().build()
    };

    ($($name:ident : $kind:expr $(=> $descriptor:expr)?),+ $(,)?) => {{
        let builder = $crate::Schema::builder();
        $(
            let builder = $crate::schema!(@field builder, $name, $kind $(, $descriptor)?);
        )+
        builder.build()
    }};
}
