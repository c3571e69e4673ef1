//! Reading a CoNLL-U corpus, editing it, and writing it back.
//!
//! Run with: cargo run --example roundtrip

use conll_schema::{conllu, Group, Value};
use std::error::Error;

const CORPUS: &str = "\
# sent_id = 1
# text = The cats sleep.
1\tThe\tthe\tDET\tDT\tDefinite=Def|PronType=Art\t2\tdet\t2:det\t_
2\tcats\tcat\tNOUN\tNNS\tNumber=Plur\t3\tnsubj\t3:nsubj\t_
3\tsleep\tsleep\tVERB\tVBP\tMood=Ind|Tense=Pres\t0\troot\t0:root\tSpaceAfter=No
4\t.\t.\tPUNCT\t.\t_\t3\tpunct\t3:punct\t_

";

fn main() -> Result<(), Box<dyn Error>> {
    let format = conllu::format()?;

    let mut corpus: Vec<Group> = format.load_from_str(CORPUS)?;
    let output = format.corpus_to_string(&corpus)?;
    assert_eq!(output, CORPUS);
    println!("✓ Untouched corpus written back byte for byte");

    // Feature values are sets; the writer sorts them, so insertion order does not matter
    let cats = &mut corpus[0].records[1];
    if let Some(feats) = cats.get_mut("feats").and_then(Value::as_map_mut) {
        feats.insert(Value::from("Gender"), Value::set(["Neut", "Fem"]));
    }
    cats.set("xpos", Value::Absent)?;
    corpus[0].meta.insert("edited", Some("yes"));

    println!("\nEdited corpus:\n{}", format.corpus_to_string(&corpus)?);

    // Values that could not be read back are rejected instead of written
    corpus[0].records[0].set("form", "Th|e\tend")?;
    match format.corpus_to_string(&corpus) {
        Ok(_) => println!("unexpected success"),
        Err(e) => println!("✓ Rejected: {}", e),
    }

    println!("\nFields of the verb, in column order:");
    for (name, value) in corpus[0].records[2].iter() {
        println!("  {:<7} {:?}", name, value);
    }

    Ok(())
}
