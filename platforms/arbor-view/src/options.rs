use serde::{Deserialize, Serialize};
use tracing::warn;

use arbor_layout::LayoutConfig;
use arbor_protocol::{Feature, TokenId, Tree};

/// A node an external search package touched; `features` are lower-case field names or FEATS/MISC keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifiedNode {
    pub id: TokenId,
    #[serde(default)]
    pub features: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifiedEdge {
    pub src: TokenId,
    #[serde(default)]
    pub edge: String,
    pub tar: TokenId,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Packages {
    pub modified_nodes: Vec<ModifiedNode>,
    pub modified_edges: Vec<ModifiedEdge>,
}

/// Render and interaction settings of a [`crate::SentenceView`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentenceViewOptions {
    /// Feature keys (`FORM`, `UPOS`, `FEATS.Case`, ...); empty shows every feature in the tree.
    pub shown_features: Vec<String>,
    pub draw_enhanced_tokens: bool,
    pub draw_group_tokens: bool,
    pub interactive: bool,
    pub matches: Vec<TokenId>,
    pub packages: Option<Packages>,
    pub token_spacing: f64,
    pub features_vertical_spacing: f64,
    pub arc_height: f64,
}

impl Default for SentenceViewOptions {
    fn default() -> Self {
        let layout = LayoutConfig::default();
        Self {
            shown_features: Vec::new(),
            draw_enhanced_tokens: false,
            draw_group_tokens: false,
            interactive: false,
            matches: Vec::new(),
            packages: None,
            token_spacing: layout.token_spacing,
            features_vertical_spacing: layout.features_vertical_spacing,
            arc_height: layout.arc_height,
        }
    }
}

impl SentenceViewOptions {
    pub fn layout(&self) -> LayoutConfig {
        LayoutConfig {
            token_spacing: self.token_spacing,
            features_vertical_spacing: self.features_vertical_spacing,
            arc_height: self.arc_height,
        }
    }

    /// Labels to stack for `tree`, with `FORM` always first.
    pub fn features(&self, tree: &Tree) -> Vec<Feature> {
        let mut features: Vec<Feature> = if self.shown_features.is_empty() {
            tree.all_features()
        } else {
            self.shown_features
                .iter()
                .filter_map(|key| match key.parse::<Feature>() {
                    Ok(feature) => Some(feature),
                    Err(err) => {
                        warn!(key = %key, %err, "ignoring unknown feature");
                        None
                    }
                })
                .collect()
        };

        features.retain(|f| *f != Feature::Form);
        features.insert(0, Feature::Form);
        let mut seen = Vec::with_capacity(features.len());
        features.retain(|f| {
            let fresh = !seen.contains(f);
            if fresh {
                seen.push(f.clone());
            }
            fresh
        });
        features
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_protocol::Token;

    #[test]
    fn test_defaults() {
        let options = SentenceViewOptions::default();
        assert_eq!(options.token_spacing, 40.0);
        assert_eq!(options.features_vertical_spacing, 20.0);
        assert_eq!(options.arc_height, 60.0);
        assert!(!options.interactive);
        assert!(options.packages.is_none());
    }

    #[test]
    fn test_partial_json() {
        let options: SentenceViewOptions =
            serde_json::from_str(r#"{"interactive": true, "arc_height": 50, "matches": ["3", "1.1"]}"#).unwrap();
        assert!(options.interactive);
        assert_eq!(options.arc_height, 50.0);
        assert_eq!(options.token_spacing, 40.0);
        assert_eq!(options.matches, vec![TokenId::Word(3), TokenId::Empty(1, 1)]);
    }

    #[test]
    fn test_packages_json() {
        let options: SentenceViewOptions = serde_json::from_str(
            r#"{"packages": {"modified_nodes": [{"id": "2", "features": ["upos", "Case"]}],
                             "modified_edges": [{"src": "2", "edge": "obj", "tar": "3"}]}}"#,
        )
        .unwrap();
        let packages = options.packages.unwrap();
        assert_eq!(packages.modified_nodes[0].features, vec!["upos", "Case"]);
        assert_eq!(packages.modified_edges[0].tar, TokenId::Word(3));
    }

    #[test]
    fn test_form_is_forced_first() {
        let options = SentenceViewOptions {
            shown_features: vec!["UPOS".into(), "FORM".into(), "nonsense".into(), "FEATS.Case".into()],
            ..Default::default()
        };
        let features = options.features(&Tree::new());
        assert_eq!(features, vec![Feature::Form, Feature::Upos, Feature::Feats("Case".into())]);
    }

    #[test]
    fn test_all_features_by_default() {
        let mut token = Token::new(TokenId::Word(1), "a");
        token.feats.insert("Number".into(), "Sing".into());
        let tree = Tree::from_tokens([token]);
        let features = SentenceViewOptions::default().features(&tree);
        assert_eq!(features, vec![Feature::Form, Feature::Upos, Feature::Lemma, Feature::Feats("Number".into())]);
    }
}
