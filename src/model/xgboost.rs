//! XGBoost JSON model loading and tree-ensemble evaluation.
//!
//! Only the subset a binary burnout classifier needs is read: a `gbtree` booster with a
//! logistic objective and numerical splits. Everything else in the file is ignored.

use std::path::Path;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use serde_with::{BoolFromInt, DisplayFromStr, PickFirst, serde_as};

use crate::model::{Classifier, ConfigError};

// --- File format ------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
struct XgbModel {
    #[serde(default)]
    version: Vec<u32>,
    learner: Learner,
}

#[derive(Debug, Clone, Deserialize)]
struct Learner {
    #[serde(default)]
    feature_names: Vec<String>,
    gradient_booster: GradientBooster,
    objective: Objective,
    learner_model_param: LearnerModelParam,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "name", rename_all = "lowercase")]
enum GradientBooster {
    Gbtree { model: ModelTrees },
    Gblinear {},
    Dart {},
}

#[derive(Debug, Clone, Deserialize)]
struct ModelTrees {
    trees: Vec<Tree>,
    #[serde(default)]
    tree_info: Vec<i32>,
}

#[derive(Debug, Clone, Deserialize)]
struct Objective {
    name: String,
}

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
struct LearnerModelParam {
    #[serde(deserialize_with = "deserialize_base_score")]
    base_score: f32,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    #[serde(default)]
    num_class: i64,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    num_feature: i64,
}

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
struct TreeParam {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    num_nodes: i64,
}

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
struct Tree {
    tree_param: TreeParam,
    left_children: Vec<i32>,
    right_children: Vec<i32>,
    split_indices: Vec<i64>,
    split_conditions: Vec<f32>,
    #[serde_as(as = "PickFirst<(_, Vec<BoolFromInt>)>")]
    default_left: Vec<bool>,
    #[serde(default)]
    split_type: Vec<i32>,
}

/// `base_score` has been written as a number, a string (`"5E-1"`), an array, and a
/// bracketed string (`"[5E-1]"`) across XGBoost releases.
fn deserialize_base_score<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let mut cur = Value::deserialize(deserializer)?;
    loop {
        match cur {
            Value::Number(n) => {
                return n
                    .as_f64()
                    .map(|f| f as f32)
                    .ok_or_else(|| D::Error::custom("invalid base_score number"));
            }
            Value::String(s) => {
                let t = s.trim();
                let inner = t
                    .strip_prefix('[')
                    .and_then(|rest| rest.strip_suffix(']'))
                    .unwrap_or(t);
                return inner
                    .split(',')
                    .next()
                    .and_then(|first| first.trim().parse::<f32>().ok())
                    .ok_or_else(|| D::Error::custom(format!("cannot parse base_score {s:?}")));
            }
            Value::Array(arr) => {
                cur = arr
                    .into_iter()
                    .next()
                    .ok_or_else(|| D::Error::custom("empty base_score array"))?;
            }
            _ => return Err(D::Error::custom("base_score must be a number, string or array")),
        }
    }
}

// --- Native representation -------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
enum Node {
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
        default_left: bool,
    },
    Leaf(f32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

impl RegressionTree {
    /// Walks from the root: `x < threshold` goes left, NaN follows the default branch.
    pub fn predict(&self, x: &[f32]) -> f32 {
        let mut idx = 0usize;
        loop {
            match self.nodes[idx] {
                Node::Leaf(value) => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    default_left,
                } => {
                    let v = x[feature];
                    idx = if v.is_nan() {
                        if default_left { left } else { right }
                    } else if v < threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}

/// Additive tree ensemble with a logistic link.
#[derive(Debug, Clone, PartialEq)]
pub struct BoostedForest {
    trees: Vec<RegressionTree>,
    base_margin: f32,
    n_features: usize,
    objective: String,
    feature_names: Vec<String>,
    version: Vec<u32>,
}

impl BoostedForest {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text, &path.display().to_string())
    }

    pub fn from_json_str(text: &str, origin: &str) -> Result<Self, ConfigError> {
        let model: XgbModel = serde_json::from_str(text).map_err(|source| ConfigError::Json {
            origin: origin.to_string(),
            source,
        })?;
        Self::from_model(model)
    }

    fn from_model(model: XgbModel) -> Result<Self, ConfigError> {
        let learner = model.learner;
        let objective = learner.objective.name;
        if objective != "binary:logistic" && objective != "reg:logistic" {
            return Err(ConfigError::UnsupportedModel(format!(
                "objective {objective:?}; a logistic objective is required"
            )));
        }
        if learner.learner_model_param.num_class > 1 {
            return Err(ConfigError::UnsupportedModel(format!(
                "{} classes; only binary classifiers are supported",
                learner.learner_model_param.num_class
            )));
        }
        let model_trees = match learner.gradient_booster {
            GradientBooster::Gbtree { model } => model,
            GradientBooster::Gblinear {} => {
                return Err(ConfigError::UnsupportedModel(
                    "gblinear booster; only gbtree is supported".to_string(),
                ));
            }
            GradientBooster::Dart {} => {
                return Err(ConfigError::UnsupportedModel(
                    "dart booster; only gbtree is supported".to_string(),
                ));
            }
        };
        if model_trees.tree_info.iter().any(|&group| group != 0) {
            return Err(ConfigError::UnsupportedModel(
                "trees assigned to more than one output group".to_string(),
            ));
        }

        let num_feature = learner.learner_model_param.num_feature;
        if num_feature <= 0 {
            return Err(ConfigError::UnsupportedModel(format!(
                "num_feature = {num_feature}"
            )));
        }
        let n_features = num_feature as usize;

        let trees = model_trees
            .trees
            .iter()
            .enumerate()
            .map(|(idx, tree)| convert_tree(tree, idx, n_features))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            trees,
            base_margin: prob_to_margin(learner.learner_model_param.base_score),
            n_features,
            objective,
            feature_names: learner.feature_names,
            version: model.version,
        })
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn objective(&self) -> &str {
        &self.objective
    }

    pub fn base_margin(&self) -> f32 {
        self.base_margin
    }

    pub fn version(&self) -> Option<String> {
        if self.version.is_empty() {
            return None;
        }
        let parts = self.version.iter().map(|v| v.to_string()).collect::<Vec<_>>();
        Some(parts.join("."))
    }

    /// Raw ensemble score, accumulated tree by tree in f32 the way XGBoost does.
    pub fn margin(&self, x: &[f32]) -> f32 {
        debug_assert_eq!(x.len(), self.n_features);
        let mut acc = self.base_margin;
        for tree in &self.trees {
            acc += tree.predict(x);
        }
        acc
    }
}

impl Classifier for BoostedForest {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_proba(&self, x: &[f32]) -> f32 {
        sigmoid(self.margin(x))
    }
}

pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// XGBoost stores `base_score` in probability space for logistic objectives.
fn prob_to_margin(base_score: f32) -> f32 {
    let p = base_score.clamp(1e-7, 1.0 - 1e-7);
    (p / (1.0 - p)).ln()
}

fn convert_tree(
    tree: &Tree,
    tree_idx: usize,
    n_features: usize,
) -> Result<RegressionTree, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidTree {
        tree: tree_idx,
        reason,
    };

    let num_nodes = usize::try_from(tree.tree_param.num_nodes).unwrap_or(0);
    if num_nodes == 0 {
        return Err(invalid("tree has no nodes".to_string()));
    }
    let lengths = [
        ("left_children", tree.left_children.len()),
        ("right_children", tree.right_children.len()),
        ("split_indices", tree.split_indices.len()),
        ("split_conditions", tree.split_conditions.len()),
        ("default_left", tree.default_left.len()),
    ];
    for (name, len) in lengths {
        if len < num_nodes {
            return Err(invalid(format!(
                "{name} has {len} entries for {num_nodes} nodes"
            )));
        }
    }
    if tree.split_type.iter().take(num_nodes).any(|&t| t != 0) {
        return Err(ConfigError::UnsupportedModel(format!(
            "tree {tree_idx} uses categorical splits"
        )));
    }

    let mut nodes = Vec::with_capacity(num_nodes);
    for idx in 0..num_nodes {
        let left = tree.left_children[idx];
        let right = tree.right_children[idx];
        if left == -1 {
            // leaf values live in split_conditions; base_weights are unshrunk
            nodes.push(Node::Leaf(tree.split_conditions[idx]));
            continue;
        }

        // children always follow their parent, which also rules out cycles
        let child = |c: i32| -> Result<usize, ConfigError> {
            usize::try_from(c)
                .ok()
                .filter(|&c| c > idx && c < num_nodes)
                .ok_or_else(|| invalid(format!("node {idx} has invalid child {c}")))
        };
        let feature = usize::try_from(tree.split_indices[idx])
            .ok()
            .filter(|&f| f < n_features)
            .ok_or_else(|| {
                invalid(format!(
                    "node {idx} splits on feature {} of {n_features}",
                    tree.split_indices[idx]
                ))
            })?;

        nodes.push(Node::Split {
            feature,
            threshold: tree.split_conditions[idx],
            left: child(left)?,
            right: child(right)?,
            default_left: tree.default_left[idx],
        });
    }

    Ok(RegressionTree { nodes })
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/xgboost.rs"]
mod tests;
