//! Lazily reading groups from a reader, carrying on past a malformed group.
//!
//! Run with: cargo run --example streaming

use conll_schema::{conllu, Group};
use std::error::Error;
use std::io::Cursor;

const INPUT: &str = "\
# sent_id = a
1\tHello\thello\tINTJ\tUH\t_\t0\troot\t_\t_

# sent_id = b
1\tthis\tthis\tPRON\tDT\t_\t0\troot\t_\t_
2\tline is broken

# sent_id = c
1\tBye\tbye\tINTJ\tUH\t_\t0\troot\t_\t_
";

fn main() -> Result<(), Box<dyn Error>> {
    let format = conllu::format()?;

    let mut good = Vec::new();
    for result in format.iter_from_reader::<Group, _>(Cursor::new(INPUT)) {
        match result {
            Ok(group) => {
                println!(
                    "sentence {}: {} token(s)",
                    group.meta.value("sent_id").unwrap_or("?"),
                    group.len()
                );
                good.push(group);
            }
            Err(e) => println!("skipped: {}", e),
        }
    }

    let mut out = Vec::new();
    format.write_corpus(&good, &mut out)?;
    println!("\nKept:\n{}", String::from_utf8(out)?);

    Ok(())
}
