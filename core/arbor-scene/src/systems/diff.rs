use tracing::debug;

use arbor_protocol::{is_placeholder, DiffFields, Token, TokenId, Tree};

use crate::SceneWorld;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenDiff {
    pub token: TokenId,
    pub fields: DiffFields,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffReport {
    pub tokens: Vec<TokenDiff>,
}

impl DiffReport {
    pub fn is_clean(&self) -> bool {
        self.tokens.iter().all(|t| t.fields.is_empty())
    }

    pub fn flagged(&self) -> impl Iterator<Item = &TokenDiff> {
        self.tokens.iter().filter(|t| !t.fields.is_empty())
    }
}

/// Fields of `current` that disagree with `reference`. Unset current values never differ.
pub fn compare_token(current: &Token, reference: &Token) -> DiffFields {
    let mut fields = DiffFields::empty();

    if current.head.is_assigned() && reference.head != current.head {
        fields |= DiffFields::HEAD;
    }
    if !is_placeholder(&current.deprel) && reference.deprel != current.deprel {
        fields |= DiffFields::DEPREL;
    }
    if !is_placeholder(&current.upos) && reference.upos != current.upos {
        fields |= DiffFields::UPOS;
    }

    fields
}

/// Mark rendered tokens that diverge from `reference`.
///
/// Returns `None` (and marks nothing) when either tree is empty or the token counts differ.
pub fn apply_diff(scene: &mut SceneWorld, current: &Tree, reference: &Tree) -> Option<DiffReport> {
    if current.is_empty() || reference.is_empty() {
        debug!("diff skipped: empty tree");
        return None;
    }
    if current.len() != reference.len() {
        debug!(current = current.len(), reference = reference.len(), "diff skipped: token count mismatch");
        return None;
    }

    let mut report = DiffReport::default();

    for (position, id) in scene.ids().into_iter().enumerate() {
        let (Some(mine), Some(theirs)) = (current.get(&id), reference.get(&id)) else {
            debug!(token = %id, "diff: token missing from one tree");
            continue;
        };
        if mine.form != theirs.form {
            debug!(token = %id, "diff: forms do not match");
            continue;
        }

        let fields = compare_token(mine, theirs);
        scene.set_diff(position, fields);
        report.tokens.push(TokenDiff { token: id, fields });
    }

    Some(report)
}
