//! Random Forest Predictor
//!
//! The registry artifact is a JSON-serialized forest: flattened decision
//! trees whose leaves carry a pneumonia probability. All structural
//! validation happens once at load time; traversal afterwards cannot
//! fail or loop.

use ndarray::Array1;
use serde::Deserialize;
use thiserror::Error;

const MODEL_TYPE: &str = "random_forest";

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported model_type `{0}`")]
    UnsupportedType(String),

    #[error("forest has no trees")]
    EmptyForest,

    #[error("n_features must be positive")]
    NoFeatures,

    #[error("tree {tree}, node {node}: {reason}")]
    InvalidTree {
        tree: usize,
        node: usize,
        reason: &'static str,
    },
}

/// One node of a flattened decision tree. Children are indices into the
/// tree's node list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Node {
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f32,
    },
}

#[derive(Debug, Clone, Deserialize)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Walk from the root to a leaf. Load-time validation guarantees the
    /// indices stay in range and strictly increase, so this terminates.
    fn eval(&self, features: &Array1<f32>) -> f32 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if features[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct ForestArtifact {
    model_type: String,
    n_features: usize,
    trees: Vec<Tree>,
}

/// Validated forest ready for inference.
#[derive(Debug, Clone)]
pub struct ForestPredictor {
    n_features: usize,
    trees: Vec<Tree>,
}

impl ForestPredictor {
    /// Deserialize and validate a registry artifact.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ArtifactError> {
        let artifact: ForestArtifact = serde_json::from_slice(bytes)?;

        if artifact.model_type != MODEL_TYPE {
            return Err(ArtifactError::UnsupportedType(artifact.model_type));
        }
        if artifact.n_features == 0 {
            return Err(ArtifactError::NoFeatures);
        }
        if artifact.trees.is_empty() {
            return Err(ArtifactError::EmptyForest);
        }
        for (index, tree) in artifact.trees.iter().enumerate() {
            validate_tree(index, tree, artifact.n_features)?;
        }

        Ok(Self {
            n_features: artifact.n_features,
            trees: artifact.trees,
        })
    }

    /// Length of the feature vectors this forest was trained on.
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Mean of the per-tree leaf probabilities.
    ///
    /// Callers must pass a vector of exactly `n_features()` values; the
    /// inference layer enforces this before calling in.
    pub fn predict_proba(&self, features: &Array1<f32>) -> f32 {
        let sum: f32 = self.trees.iter().map(|tree| tree.eval(features)).sum();
        sum / self.trees.len() as f32
    }
}

fn validate_tree(index: usize, tree: &Tree, n_features: usize) -> Result<(), ArtifactError> {
    if tree.nodes.is_empty() {
        return Err(ArtifactError::InvalidTree {
            tree: index,
            node: 0,
            reason: "tree has no nodes",
        });
    }

    for (pos, node) in tree.nodes.iter().enumerate() {
        if let Node::Split {
            feature,
            left,
            right,
            ..
        } = node
        {
            if *feature >= n_features {
                return Err(ArtifactError::InvalidTree {
                    tree: index,
                    node: pos,
                    reason: "split feature out of range",
                });
            }
            // Children must point strictly forward so eval() terminates.
            for child in [*left, *right] {
                if child <= pos || child >= tree.nodes.len() {
                    return Err(ArtifactError::InvalidTree {
                        tree: index,
                        node: pos,
                        reason: "child index out of range",
                    });
                }
            }
        }
    }

    Ok(())
}
