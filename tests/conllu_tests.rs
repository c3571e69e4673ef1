use conll_schema::{conllu, Error, Format, Group, Value};
use std::thread;

const CORPUS: &str = "\
# newdoc id = weblog-1
# sent_id = weblog-1-s1
# text = Where did you buy it?
1\tWhere\twhere\tADV\tWRB\tPronType=Int,Rel\t4\tadvmod\t4:advmod\t_
2\tdid\tdo\tAUX\tVBD\tMood=Ind|Tense=Past|VerbForm=Fin\t4\taux\t4:aux\t_
3\tyou\tyou\tPRON\tPRP\tCase=Nom|Person=2|PronType=Prs\t4\tnsubj\t4:nsubj\t_
4\tbuy\tbuy\tVERB\tVB\tVerbForm=Inf\t0\troot\t0:root\t_
5\tit\tit\tPRON\tPRP\tCase=Acc|Gender=Neut|Number=Sing\t4\tobj\t4:obj\tSpaceAfter=No
6\t?\t?\tPUNCT\t.\t_\t4\tpunct\t4:punct\t_

# sent_id = weblog-1-s2
# text = Sue won't go, I stay.
1\tSue\tSue\tPROPN\tNNP\tNumber=Sing\t4\tnsubj\t4:nsubj|5.1:nsubj\t_
2-3\twon't\t_\t_\t_\t_\t_\t_\t_\t_
2\two\twill\tAUX\tMD\tVerbForm=Fin\t4\taux\t4:aux\t_
3\tn't\tnot\tPART\tRB\t_\t4\tadvmod\t4:advmod\t_
4\tgo\tgo\tVERB\tVB\tVerbForm=Inf\t0\troot\t0:root\tSpaceAfter=No
5\t,\t,\tPUNCT\t,\t_\t4\tpunct\t4:punct\t_
5.1\tgo\tgo\tVERB\tVB\t_\t_\t_\t4:conj\tCopyOf=4
6\tI\tI\tPRON\tPRP\tCase=Nom|Number=Sing|Person=1\t7\tnsubj\t7:nsubj\t_
7\tstay\tstay\tVERB\tVB\tVerbForm=Inf\t4\tconj\t4:conj\tSpaceAfter=No|SpellCheck
8\t.\t.\tPUNCT\t.\t_\t4\tpunct\t4:punct\t_

";

fn format() -> Format {
    conllu::format().unwrap()
}

fn feats(record: &conll_schema::Record) -> &conll_schema::value::ValueMap {
    record.get("feats").and_then(Value::as_map).unwrap()
}

#[test]
fn test_corpus_round_trip() {
    let format = format();
    let corpus: Vec<Group> = format.load_from_str(CORPUS).unwrap();
    assert_eq!(corpus.len(), 2);
    assert_eq!(corpus[0].len(), 6);
    assert_eq!(corpus[1].len(), 10);
    assert_eq!(corpus[0].meta.value("newdoc id"), Some("weblog-1"));
    assert_eq!(format.corpus_to_string(&corpus).unwrap(), CORPUS);
}

#[test]
fn test_field_values() {
    let corpus: Vec<Group> = format().load_from_str(CORPUS).unwrap();
    let buy = &corpus[0].records[3];
    assert_eq!(buy.str("id"), Some("4"));
    assert_eq!(buy.str("head"), Some("0"));
    assert_eq!(
        buy.get("deps"),
        Some(&Value::map([("0", Value::list(["root"]))]))
    );

    let first = &corpus[0].records[0];
    assert_eq!(
        feats(first).get(&Value::from("PronType")),
        Some(&Value::set(["Rel", "Int"]))
    );

    let wont = &corpus[1].records[1];
    assert!(conllu::is_multiword(wont));
    assert_eq!(wont.get("lemma"), Some(&Value::Absent));
    assert_eq!(wont.get("feats"), Some(&Value::Map(Default::default())));
}

#[test]
fn test_misc_bare_keys() {
    let corpus: Vec<Group> = format().load_from_str(CORPUS).unwrap();
    let stay = &corpus[1].records[8];
    let misc = stay.get("misc").and_then(Value::as_map).unwrap();
    assert_eq!(misc.get(&Value::from("SpaceAfter")), Some(&Value::set(["No"])));
    assert_eq!(misc.get(&Value::from("SpellCheck")), Some(&Value::NoValue));
}

#[test]
fn test_feats_written_case_insensitively_sorted() {
    let format = format();
    let token = format
        .parse_record("1\tx\tx\tX\t_\tNumber=Sing|abbr=Yes|Case=Nom,Acc\t0\troot\t_\t_")
        .unwrap();
    assert_eq!(
        format.serialize_record(&token).unwrap(),
        "1\tx\tx\tX\t_\tabbr=Yes|Case=Acc,Nom|Number=Sing\t0\troot\t_\t_"
    );
}

#[test]
fn test_feats_added_in_any_order() {
    let format = format();
    let mut token = format
        .parse_record("1\tdogs\tdog\tNOUN\t_\t_\t0\troot\t_\t_")
        .unwrap();
    let feats = token.get_mut("feats").and_then(Value::as_map_mut).unwrap();
    feats.insert(Value::from("Number"), Value::set(["Plur"]));
    feats.insert(Value::from("Gender"), Value::set(["Masc", "Fem"]));
    assert_eq!(
        format.serialize_record(&token).unwrap(),
        "1\tdogs\tdog\tNOUN\t_\tGender=Fem,Masc|Number=Plur\t0\troot\t_\t_"
    );
}

#[test]
fn test_deps_written_in_token_order() {
    let format = format();
    let token = format
        .parse_record("3\tx\tx\tX\t_\t_\t1\tdep\t10:obj|2.1:conj|2:nsubj:pass\t_")
        .unwrap();
    let deps = token.get("deps").and_then(Value::as_map).unwrap();
    assert_eq!(
        deps.get(&Value::from("2")),
        Some(&Value::list(["nsubj", "pass"]))
    );
    assert_eq!(
        format.serialize_record(&token).unwrap(),
        "3\tx\tx\tX\t_\t_\t1\tdep\t2:nsubj:pass|2.1:conj|10:obj\t_"
    );
}

#[test]
fn test_feats_without_value_separator() {
    let err = format()
        .parse_record("1\tx\tx\tX\t_\tNumber\t0\troot\t_\t_")
        .unwrap_err();
    match err {
        Error::Decode { field, column, .. } => {
            assert_eq!(field, "feats");
            assert_eq!(column, 6);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_underscore_form_and_lemma_round_trip() {
    let format = format();
    let mut token = format.new_record();
    token.set("id", "1").unwrap();
    token.set("form", "_").unwrap();
    token.set("lemma", "_").unwrap();
    let line = format.serialize_record(&token).unwrap();
    assert_eq!(line, "1\t_\t_\t_\t_\t_\t_\t_\t_\t_");
    assert_eq!(format.parse_record(&line).unwrap(), token);
}

#[test]
fn test_tree_skips_ranges_and_empty_nodes() {
    let corpus: Vec<Group> = format().load_from_str(CORPUS).unwrap();
    let tree = conllu::tree_from_records(&corpus[1].records).unwrap();
    assert_eq!(tree.len(), 8);
    let root = tree.root();
    assert_eq!(root.data().str("form"), Some("go"));
    let children: Vec<&str> = root
        .children()
        .filter_map(|c| c.data().str("id"))
        .collect();
    assert_eq!(children, ["1", "2", "3", "5", "7", "8"]);

    let stay = root.child(4).unwrap();
    assert_eq!(stay.data().str("form"), Some("stay"));
    assert_eq!(stay.child(0).and_then(|c| c.data().str("form")), Some("I"));
}

#[test]
fn test_tree_reports_broken_heads() {
    let corpus: Vec<Group> = format().load_from_str(CORPUS).unwrap();

    let mut tokens = corpus[1].records.clone();
    tokens[9].set("head", Value::Absent).unwrap();
    let err = conllu::tree_from_records(&tokens).unwrap_err();
    assert!(matches!(err, Error::MissingHead { ref id } if id == "8"));

    let mut tokens = corpus[1].records.clone();
    tokens[9].set("head", "9").unwrap();
    let err = conllu::tree_from_records(&tokens).unwrap_err();
    assert!(err.is_tree());
    assert!(matches!(err, Error::DanglingHead { ref head, .. } if head == "9"));
}

#[test]
fn test_parse_from_several_threads() {
    let format = format();
    let lines: Vec<&str> = CORPUS
        .lines()
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .collect();

    thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let format = &format;
                let lines = &lines;
                s.spawn(move || {
                    lines
                        .iter()
                        .map(|l| format.serialize_record(&format.parse_record(l).unwrap()).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        for handle in handles {
            let written = handle.join().unwrap();
            assert_eq!(written, lines);
        }
    });
}

#[test]
fn test_clones_share_format() {
    let format = format();
    let clone = format.clone();
    let token = clone
        .parse_record("1\ta\ta\tX\t_\t_\t0\troot\t_\t_")
        .unwrap();
    assert_eq!(
        format.serialize_record(&token).unwrap(),
        "1\ta\ta\tX\t_\t_\t0\troot\t_\t_"
    );
    assert_eq!(format.field_names().collect::<Vec<_>>(), conllu::FIELDS);
}

#[test]
fn test_find_ngrams_steps_over_multiword_ranges() {
    let corpus: Vec<Group> = format().load_from_str(CORPUS).unwrap();

    let found = conllu::find_ngrams(&corpus, &["Sue", "wo"], true);
    assert_eq!(found.len(), 1);
    assert!(std::ptr::eq(found[0].group, &corpus[1]));
    assert_eq!(found[0].start, 0);
    let forms: Vec<&str> = found[0].tokens.iter().filter_map(|t| t.str("form")).collect();
    assert_eq!(forms, ["Sue", "wo"]);

    let found = conllu::find_ngrams(&corpus, &["wo", "n't", "go"], true);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].start, 2);
    assert_eq!(found[0].tokens.len(), 3);

    assert!(conllu::find_ngrams(&corpus, &["won't"], true).is_empty());
}

#[test]
fn test_find_ngrams_case_sensitivity() {
    let corpus: Vec<Group> = format().load_from_str(CORPUS).unwrap();
    assert!(conllu::find_ngrams(&corpus, &["sue", "WO"], true).is_empty());
    assert_eq!(conllu::find_ngrams(&corpus, &["sue", "WO"], false).len(), 1);

    let found = conllu::find_ngrams(&corpus, &["it", "?"], true);
    assert_eq!(found.len(), 1);
    assert!(std::ptr::eq(found[0].group, &corpus[0]));
    assert_eq!(found[0].start, 4);

    assert!(conllu::find_ngrams(&corpus, &["?", "Sue"], true).is_empty());
    assert!(conllu::find_ngrams(&corpus, &[], true).is_empty());
}

const CROSSING: &str = "\
1\tA\ta\tDET\t_\t_\t2\tdet\t_\t_
2\thearing\thearing\tNOUN\t_\t_\t4\tnsubj\t_\t_
3\tis\tbe\tAUX\t_\t_\t4\taux\t_\t_
4\tscheduled\tschedule\tVERB\t_\t_\t0\troot\t_\t_
5\ton\ton\tADP\t_\t_\t7\tcase\t_\t_
6\tthe\tthe\tDET\t_\t_\t7\tdet\t_\t_
7\tissue\tissue\tNOUN\t_\t_\t2\tnmod\t_\t_
8\ttoday\ttoday\tNOUN\t_\t_\t4\tobl\t_\t_
";

#[test]
fn test_find_nonprojective_deps_crossing_arcs() {
    let sentence: Group = format().parse_group(CROSSING).unwrap();
    let crossing = conllu::find_nonprojective_deps(&sentence.records).unwrap();
    let forms: Vec<(&str, &str)> = crossing
        .iter()
        .filter_map(|(a, b)| Some((a.str("form")?, b.str("form")?)))
        .collect();
    assert_eq!(forms, [("today", "issue")]);
}

#[test]
fn test_find_nonprojective_deps_projective_sentences() {
    let corpus: Vec<Group> = format().load_from_str(CORPUS).unwrap();
    for sentence in &corpus {
        assert!(conllu::find_nonprojective_deps(&sentence.records)
            .unwrap()
            .is_empty());
    }
}

#[test]
fn test_find_nonprojective_deps_dangling_head() {
    let mut sentence: Group = format().parse_group(CROSSING).unwrap();
    sentence.records[7].set("head", "9").unwrap();
    let err = conllu::find_nonprojective_deps(&sentence.records).unwrap_err();
    assert!(matches!(err, Error::DanglingHead { ref id, ref head } if id == "8" && head == "9"));
}
