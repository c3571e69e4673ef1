//! Defining a schema of your own.
//!
//! A whitespace-separated semantic-role file: a token id, the word, any number of frame labels,
//! and a final span column.
//!
//! Run with: cargo run --example custom_schema

use conll_schema::descriptor::{self, OrderKey};
use conll_schema::{schema, Delimiter, Format, FormatOptions, Group, Kind, Value};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let schema = schema! {
        id: Kind::Int,
        word: Kind::Text,
        senses: Kind::set(Kind::Text) => descriptor::unique_array(
            descriptor::text(),
            ",",
            Some("-"),
            OrderKey::case_insensitive(),
        ),
        frames: Kind::list(Kind::Text) => descriptor::varcols(descriptor::text()),
        span: Kind::tuple(Kind::Int) => descriptor::fixed_array(descriptor::int(), ":", 2),
    };

    let options = FormatOptions::new()
        .with_delimiter(Delimiter::Space)
        .with_collapse_delimiters(true)
        .with_comment_marker("%");
    let format = Format::compile(schema, options)?;

    let input = "\
% doc = demo
1   John    -           A0        0:4
2   gave    give.01     V  V.x    5:9
3   Mary    -           A2        10:14

";
    let corpus: Vec<Group> = format.load_from_str(input)?;
    for record in &corpus[0] {
        println!(
            "{:>2} {:<5} frames={:?} span={:?}",
            record.get("id").and_then(Value::as_int).unwrap_or_default(),
            record.str("word").unwrap_or_default(),
            record.get("frames").and_then(Value::as_list).unwrap_or_default(),
            record.get("span"),
        );
    }

    println!("\nNormalized:\n{}", format.corpus_to_string(&corpus)?);

    // Schema problems surface when compiling, never while parsing
    let broken = schema! {
        a: Kind::list(Kind::Text) => descriptor::varcols(descriptor::text()),
        b: Kind::list(Kind::Text) => descriptor::varcols(descriptor::text()),
    };
    if let Err(e) = Format::new(broken) {
        println!("✓ {}", e);
    }

    Ok(())
}
