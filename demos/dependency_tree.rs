//! Walking the dependency tree of a sentence.
//!
//! Run with: cargo run --example dependency_tree

use conll_schema::{conllu, Group, Record, TreeNode};
use std::error::Error;

const SENTENCE: &str = "\
# text = She quickly read the old book.
1\tShe\tshe\tPRON\tPRP\t_\t3\tnsubj\t_\t_
2\tquickly\tquickly\tADV\tRB\t_\t3\tadvmod\t_\t_
3\tread\tread\tVERB\tVBD\t_\t0\troot\t_\t_
4\tthe\tthe\tDET\tDT\t_\t6\tdet\t_\t_
5\told\told\tADJ\tJJ\t_\t6\tamod\t_\t_
6\tbook\tbook\tNOUN\tNN\t_\t3\tobj\t_\tSpaceAfter=No
7\t.\t.\tPUNCT\t.\t_\t3\tpunct\t_\t_
";

fn print_node(node: TreeNode<'_, Record>, depth: usize) {
    let token = node.data();
    println!(
        "{}{} ({})",
        "  ".repeat(depth),
        token.str("form").unwrap_or("_"),
        token.str("deprel").unwrap_or("_"),
    );
    for child in node.children() {
        print_node(child, depth + 1);
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let format = conllu::format()?;
    let sentence: Group = format.parse_group(SENTENCE)?;

    let tree = conllu::tree_from_records(&sentence.records)?;
    print_node(tree.root(), 0);

    let forms: Vec<&str> = tree.iter().filter_map(|n| n.data().str("form")).collect();
    println!("\nPre-order: {}", forms.join(" "));

    let crossing = conllu::find_nonprojective_deps(&sentence.records)?;
    println!("Crossing arcs: {}", crossing.len());
    let found = conllu::find_ngrams([&sentence], &["the", "old", "book"], false);
    for hit in &found {
        println!("✓ 'the old book' starts at token {}", hit.start + 1);
    }

    // A head pointing nowhere fails the build instead of producing a partial tree
    let mut broken = sentence.records.clone();
    broken[4].set("head", "42")?;
    match conllu::tree_from_records(&broken) {
        Ok(_) => println!("unexpected success"),
        Err(e) => println!("\n✓ {}", e),
    }

    Ok(())
}
