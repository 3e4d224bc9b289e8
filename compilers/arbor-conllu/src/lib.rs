pub mod parser;
pub mod writer;

use std::collections::BTreeMap;

use arbor_protocol::{Head, SentenceCodec, Token, TokenId, Tree, PLACEHOLDER};
use thiserror::Error;

use crate::parser::{columns, deps, key_values, meta_line, COLUMNS};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("no sentence found")]
    Empty,
    #[error("line {line}: expected 10 columns, found {found}")]
    ColumnCount { line: usize, found: usize },
    #[error("line {line}: invalid token id `{value}`")]
    InvalidId { line: usize, value: String },
    #[error("line {line}: invalid head `{value}`")]
    InvalidHead { line: usize, value: String },
    #[error("line {line}: malformed field `{value}`")]
    Malformed { line: usize, value: String },
}

/// CoNLL-U reader/writer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConlluCodec;

impl ConlluCodec {
    pub fn new() -> Self {
        Self
    }

    /// Every sentence in `text`, split on blank lines.
    pub fn decode_all(&self, text: &str) -> Result<Vec<Tree>, CodecError> {
        let mut trees = Vec::new();
        let mut current = Tree::new();
        let mut open = false;

        for (index, raw) in text.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.trim_end_matches('\r');

            if line.trim().is_empty() {
                if open {
                    trees.push(std::mem::take(&mut current));
                    open = false;
                }
                continue;
            }
            open = true;

            if line.starts_with('#') {
                if let Ok((_, Some((key, value)))) = meta_line(line) {
                    current.meta.insert(key.to_string(), value.to_string());
                }
                current.comments.push(line.to_string());
                continue;
            }

            current.insert(parse_token(line, line_no)?);
        }
        if open {
            trees.push(current);
        }
        Ok(trees)
    }
}

fn parse_map(field: &str, line: usize) -> Result<BTreeMap<String, String>, CodecError> {
    if field == PLACEHOLDER || field.is_empty() {
        return Ok(BTreeMap::new());
    }
    let (_, items) = key_values(field).map_err(|_| CodecError::Malformed { line, value: field.to_string() })?;
    Ok(items
        .into_iter()
        .filter(|(k, _)| !k.is_empty())
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect())
}

fn parse_deps(field: &str, line: usize) -> Result<BTreeMap<Head, String>, CodecError> {
    if field == PLACEHOLDER || field.is_empty() {
        return Ok(BTreeMap::new());
    }
    let malformed = || CodecError::Malformed { line, value: field.to_string() };
    let (_, items) = deps(field).map_err(|_| malformed())?;
    items
        .into_iter()
        .map(|(head, rel)| {
            let head: Head = head.parse().map_err(|_| malformed())?;
            Ok((head, rel.to_string()))
        })
        .collect()
}

fn parse_token(line: &str, line_no: usize) -> Result<Token, CodecError> {
    let (_, cols) = columns(line).map_err(|_| CodecError::Malformed { line: line_no, value: line.to_string() })?;
    if cols.len() != COLUMNS {
        return Err(CodecError::ColumnCount { line: line_no, found: cols.len() });
    }

    let id: TokenId = cols[0]
        .parse()
        .map_err(|_| CodecError::InvalidId { line: line_no, value: cols[0].to_string() })?;
    let head: Head = cols[6]
        .parse()
        .map_err(|_| CodecError::InvalidHead { line: line_no, value: cols[6].to_string() })?;

    Ok(Token {
        id,
        form: cols[1].to_string(),
        lemma: cols[2].to_string(),
        upos: cols[3].to_string(),
        xpos: cols[4].to_string(),
        feats: parse_map(cols[5], line_no)?,
        head,
        deprel: cols[7].to_string(),
        deps: parse_deps(cols[8], line_no)?,
        misc: parse_map(cols[9], line_no)?,
    })
}

impl SentenceCodec for ConlluCodec {
    type Error = CodecError;

    /// First sentence of `text`.
    fn decode(&self, text: &str) -> Result<Tree, CodecError> {
        self.decode_all(text)?.into_iter().next().ok_or(CodecError::Empty)
    }

    fn encode(&self, tree: &Tree) -> String {
        writer::write_tree(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "# sent_id = 1\n\
# text = The dogs bark.\n\
1\tThe\tthe\tDET\tDT\tDefinite=Def|PronType=Art\t2\tdet\t2:det\t_\n\
2\tdogs\tdog\tNOUN\tNNS\tNumber=Plur\t3\tnsubj\t3:nsubj\t_\n\
3\tbark\tbark\tVERB\tVBP\t_\t0\troot\t0:root\tSpaceAfter=No\n\
4\t.\t.\tPUNCT\t.\t_\t3\tpunct\t3:punct\t_\n\
\n";

    #[test]
    fn test_decode_sentence() {
        let tree = ConlluCodec.decode(SAMPLE).expect("valid sentence");

        assert_eq!(tree.len(), 4);
        assert_eq!(tree.meta.get("text").map(String::as_str), Some("The dogs bark."));

        let dogs = tree.get(&TokenId::Word(2)).unwrap();
        assert_eq!(dogs.head, Head::Token(TokenId::Word(3)));
        assert_eq!(dogs.feats.get("Number").map(String::as_str), Some("Plur"));
        assert_eq!(dogs.deps.get(&Head::Token(TokenId::Word(3))).map(String::as_str), Some("nsubj"));

        let bark = tree.get(&TokenId::Word(3)).unwrap();
        assert_eq!(bark.head, Head::Root);
        assert_eq!(bark.deps.get(&Head::Root).map(String::as_str), Some("root"));
    }

    #[test]
    fn test_encode_restores_text() {
        let codec = ConlluCodec::new();
        let tree = codec.decode(SAMPLE).unwrap();
        let text = codec.encode(&tree);

        assert!(text.starts_with("# sent_id = 1\n# text = The dogs bark.\n1\tThe"));
        assert_eq!(codec.decode(&text).unwrap(), tree);
    }

    #[test]
    fn test_comments_keep_their_order() {
        let codec = ConlluCodec::new();
        let source = "# text = dogs\n# newdoc\n#sent_id=7\n1\tdogs\tdog\tNOUN\t_\t_\t0\troot\t_\t_\n\n";
        let mut tree = codec.decode(source).unwrap();
        assert_eq!(tree.comments.len(), 3);
        assert_eq!(codec.encode(&tree), source);

        // Edited meta is rewritten in place, new keys follow the original comments
        tree.meta.insert("text".into(), "cats".into());
        tree.meta.insert("rtl".into(), "yes".into());
        assert!(codec.encode(&tree).starts_with("# text = cats\n# newdoc\n#sent_id=7\n# rtl = yes\n1\t"));

        tree.meta.remove("text");
        assert!(codec.encode(&tree).starts_with("# newdoc\n"));
    }

    #[test]
    fn test_unassigned_head_and_virtual_ids() {
        let text = "1-2\tdu\t_\t_\t_\t_\t_\t_\t_\t_\n\
1\tde\tde\tADP\t_\t_\t_\t_\t_\t_\n\
2\tle\tle\tDET\t_\t_\t1\tdet\t_\t_\n\
2.1\tx\t_\t_\t_\t_\t_\t_\t1:dep\t_\n";
        let tree = ConlluCodec.decode(text).unwrap();
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.get(&TokenId::Word(1)).unwrap().head, Head::Unassigned);
        assert!(tree.get(&TokenId::Group(1, 2)).is_some());
        assert!(tree.get(&TokenId::Empty(2, 1)).is_some());
    }

    #[test]
    fn test_multiple_sentences() {
        let text = format!("{}{}", SAMPLE, SAMPLE.replace("sent_id = 1", "sent_id = 2"));
        let trees = ConlluCodec.decode_all(&text).unwrap();
        assert_eq!(trees.len(), 2);
        assert_eq!(trees[1].meta.get("sent_id").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_errors() {
        assert_eq!(ConlluCodec.decode(""), Err(CodecError::Empty));
        assert_eq!(
            ConlluCodec.decode("1\tDogs\n"),
            Err(CodecError::ColumnCount { line: 1, found: 2 })
        );
        assert!(matches!(
            ConlluCodec.decode("x\ta\t_\t_\t_\t_\t0\troot\t_\t_\n"),
            Err(CodecError::InvalidId { line: 1, .. })
        ));
        assert!(matches!(
            ConlluCodec.decode("1\ta\t_\t_\t_\t_\tq\troot\t_\t_\n"),
            Err(CodecError::InvalidHead { line: 1, .. })
        ));
    }
}
