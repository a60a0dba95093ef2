//! Regression tree ensemble loaded from a JSON artifact

use serde::Deserialize;

use crate::domain::model::{ModelError, ModelInput, QualityModel};
use crate::domain::{DomainError, FEATURE_COUNT};

/// Serialized tree node. Split nodes carry `feature`, `threshold`, `left`
/// and `right`; leaves carry none of them.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeArtifact {
    #[serde(default)]
    pub feature: Option<usize>,
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(default)]
    pub left: Option<usize>,
    #[serde(default)]
    pub right: Option<usize>,
    pub value: f64,
    #[serde(default)]
    pub impurity: f64,
    #[serde(default)]
    pub samples: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TreeArtifact {
    pub nodes: Vec<NodeArtifact>,
}

/// On-disk form of a forest model
#[derive(Debug, Clone, Deserialize)]
pub struct ForestArtifact {
    #[serde(default = "default_version")]
    pub version: String,
    pub trees: Vec<TreeArtifact>,
    /// Precomputed importances; computed from the trees when absent
    #[serde(default)]
    pub feature_importances: Option<Vec<f64>>,
}

fn default_version() -> String {
    "unversioned".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        impurity: f64,
        samples: u64,
    },
    Leaf {
        value: f64,
        impurity: f64,
        samples: u64,
    },
}

impl Node {
    fn impurity(&self) -> f64 {
        match self {
            Self::Split { impurity, .. } | Self::Leaf { impurity, .. } => *impurity,
        }
    }

    fn samples(&self) -> u64 {
        match self {
            Self::Split { samples, .. } | Self::Leaf { samples, .. } => *samples,
        }
    }

    /// Weighted impurity `n * imp`
    fn weighted_impurity(&self) -> f64 {
        self.samples() as f64 * self.impurity()
    }
}

#[derive(Debug, Clone)]
struct RegressionTree {
    nodes: Vec<Node>,
}

impl RegressionTree {
    fn from_artifact(tree: usize, artifact: TreeArtifact) -> Result<Self, DomainError> {
        if artifact.nodes.is_empty() {
            return Err(DomainError::configuration(format!("Tree {} has no nodes", tree)));
        }

        let count = artifact.nodes.len();
        let nodes = artifact
            .nodes
            .into_iter()
            .enumerate()
            .map(|(index, node)| convert_node(tree, index, count, node))
            .collect::<Result<_, _>>()?;

        Ok(Self { nodes })
    }

    fn predict(&self, input: &ModelInput) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes[index] {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => index = if input[feature] <= threshold { left } else { right },
                Node::Leaf { value, .. } => return value,
            }
        }
    }

    /// Mean decrease in impurity per feature, normalized within the tree
    fn impurity_importances(&self) -> [f64; FEATURE_COUNT] {
        let mut importances = [0.0; FEATURE_COUNT];

        for node in &self.nodes {
            if let Node::Split {
                feature, left, right, ..
            } = node
            {
                let decrease = node.weighted_impurity()
                    - self.nodes[*left].weighted_impurity()
                    - self.nodes[*right].weighted_impurity();
                importances[*feature] += decrease.max(0.0);
            }
        }

        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            importances.iter_mut().for_each(|v| *v /= total);
        }

        importances
    }
}

fn convert_node(tree: usize, index: usize, count: usize, node: NodeArtifact) -> Result<Node, DomainError> {
    let invalid = |reason: String| {
        DomainError::configuration(format!("Tree {} node {}: {}", tree, index, reason))
    };

    if !node.impurity.is_finite() || node.impurity < 0.0 {
        return Err(invalid(format!("invalid impurity {}", node.impurity)));
    }

    match (node.feature, node.threshold, node.left, node.right) {
        (None, None, None, None) => {
            if !node.value.is_finite() {
                return Err(invalid(format!("leaf value {} is not finite", node.value)));
            }

            Ok(Node::Leaf {
                value: node.value,
                impurity: node.impurity,
                samples: node.samples,
            })
        }
        (Some(feature), Some(threshold), Some(left), Some(right)) => {
            if feature >= FEATURE_COUNT {
                return Err(invalid(format!("feature index {} out of range", feature)));
            }

            if !threshold.is_finite() {
                return Err(invalid(format!("threshold {} is not finite", threshold)));
            }

            // Children must come after their parent, which rules out cycles
            for child in [left, right] {
                if child <= index || child >= count {
                    return Err(invalid(format!("child index {} is invalid", child)));
                }
            }

            Ok(Node::Split {
                feature,
                threshold,
                left,
                right,
                impurity: node.impurity,
                samples: node.samples,
            })
        }
        _ => Err(invalid(
            "split nodes need feature, threshold, left and right".to_string(),
        )),
    }
}

/// Averaging ensemble of regression trees
#[derive(Debug, Clone)]
pub struct ForestModel {
    version: String,
    trees: Vec<RegressionTree>,
    importances: Option<Vec<f64>>,
}

impl ForestModel {
    pub fn from_artifact(artifact: ForestArtifact) -> Result<Self, DomainError> {
        if artifact.trees.is_empty() {
            return Err(DomainError::configuration("Forest model has no trees"));
        }

        let trees = artifact
            .trees
            .into_iter()
            .enumerate()
            .map(|(index, tree)| RegressionTree::from_artifact(index, tree))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            version: artifact.version,
            trees,
            importances: artifact.feature_importances,
        })
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

impl QualityModel for ForestModel {
    fn describe(&self) -> String {
        format!("forest:{} ({} trees)", self.version, self.trees.len())
    }

    fn predict_one(&self, input: &ModelInput) -> Result<f64, ModelError> {
        let sum: f64 = self.trees.iter().map(|tree| tree.predict(input)).sum();
        Ok(sum / self.trees.len() as f64)
    }

    /// Tree-major traversal so each tree's nodes stay hot across rows
    fn predict_many(&self, inputs: &[ModelInput]) -> Result<Vec<f64>, ModelError> {
        let mut sums = vec![0.0; inputs.len()];

        for tree in &self.trees {
            for (sum, input) in sums.iter_mut().zip(inputs) {
                *sum += tree.predict(input);
            }
        }

        let count = self.trees.len() as f64;
        Ok(sums.into_iter().map(|sum| sum / count).collect())
    }

    fn feature_importances(&self) -> Option<Vec<f64>> {
        if let Some(explicit) = &self.importances {
            return Some(explicit.clone());
        }

        let mut averaged = vec![0.0; FEATURE_COUNT];
        for tree in &self.trees {
            for (acc, value) in averaged.iter_mut().zip(tree.impurity_importances()) {
                *acc += value;
            }
        }

        let count = self.trees.len() as f64;
        Some(averaged.into_iter().map(|v| v / count).collect())
    }
}
