use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

use arbor_protocol::{Head, Token, Tree, PLACEHOLDER};

use crate::parser::meta_line;

fn join_pairs(map: &BTreeMap<String, String>) -> String {
    if map.is_empty() {
        return PLACEHOLDER.to_string();
    }
    map.iter()
        .map(|(k, v)| if v.is_empty() { k.clone() } else { format!("{}={}", k, v) })
        .collect::<Vec<_>>()
        .join("|")
}

fn join_deps(deps: &BTreeMap<Head, String>) -> String {
    if deps.is_empty() {
        return PLACEHOLDER.to_string();
    }
    deps.iter()
        .map(|(head, rel)| format!("{}:{}", head, rel))
        .collect::<Vec<_>>()
        .join("|")
}

fn or_placeholder(value: &str) -> &str {
    if value.is_empty() {
        PLACEHOLDER
    } else {
        value
    }
}

pub fn write_token(out: &mut String, token: &Token) {
    let _ = writeln!(
        out,
        "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
        token.id,
        or_placeholder(&token.form),
        or_placeholder(&token.lemma),
        or_placeholder(&token.upos),
        or_placeholder(&token.xpos),
        join_pairs(&token.feats),
        token.head,
        or_placeholder(&token.deprel),
        join_deps(&token.deps),
        join_pairs(&token.misc),
    );
}

/// Serialise one sentence: comments, then one line per token, then a blank line.
///
/// Source comments keep their order and spelling. A `key = value` comment whose
/// meta entry changed is rewritten, one whose entry was removed is dropped, and
/// meta keys with no source comment come last.
pub fn write_tree(tree: &Tree) -> String {
    let mut out = String::new();
    let mut written = BTreeSet::new();
    for line in &tree.comments {
        match meta_line(line) {
            Ok((_, Some((key, value)))) => {
                let Some(current) = tree.meta.get(key) else { continue };
                if !written.insert(key) {
                    continue;
                }
                if current == value {
                    let _ = writeln!(out, "{}", line);
                } else {
                    let _ = writeln!(out, "# {} = {}", key, current);
                }
            }
            _ => {
                let _ = writeln!(out, "{}", line);
            }
        }
    }
    for (key, value) in tree.meta.iter().filter(|(key, _)| !written.contains(key.as_str())) {
        let _ = writeln!(out, "# {} = {}", key, value);
    }
    for token in tree.tokens.values() {
        write_token(&mut out, token);
    }
    out.push('\n');
    out
}
