use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecompositionError {
    #[error("decomposition node is missing a code")]
    MissingCode,
    #[error("node {code} has neither children nor a value")]
    MissingQuantity { code: String },
    #[error("node {code} mixes children with its own value")]
    QuantityOnInternal { code: String },
    #[error("node {code} carries both a scalar value and a sweep vector")]
    AmbiguousQuantity { code: String },
    #[error("node {code} holds a {found} quantity in a {expected} tree")]
    QuantityKind {
        code: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("node {code} has {found} sweep points, expected {expected}")]
    SweepLengthMismatch {
        code: String,
        expected: usize,
        found: usize,
    },
}

pub trait BarValue: Clone {
    fn is_zero(&self) -> bool;
    fn zero_like(&self) -> Self;
    fn plus(&self, other: &Self) -> Self;
}

impl BarValue for f64 {
    fn is_zero(&self) -> bool {
        *self == 0.0
    }

    fn zero_like(&self) -> Self {
        0.0
    }

    fn plus(&self, other: &Self) -> Self {
        self + other
    }
}

impl BarValue for Vec<f64> {
    fn is_zero(&self) -> bool {
        self.iter().all(|v| *v == 0.0)
    }

    fn zero_like(&self) -> Self {
        vec![0.0; self.len()]
    }

    fn plus(&self, other: &Self) -> Self {
        add_elementwise(self, other)
    }
}

pub fn add_elementwise(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b.iter()).map(|(x, y)| x + y).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node<V> {
    pub code: String,
    pub name: Option<String>,
    pub short_name: Option<String>,
    pub kind: NodeKind<V>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind<V> {
    Leaf(V),
    Internal(Vec<Node<V>>),
}

impl Node<Vec<f64>> {
    pub fn sweep_len(&self) -> Option<usize> {
        match &self.kind {
            NodeKind::Leaf(values) => Some(values.len()),
            NodeKind::Internal(children) => children.iter().find_map(Node::sweep_len),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawNode {
    pub code: Option<String>,
    pub name: Option<String>,
    pub short_name: Option<String>,
    pub children: Option<Vec<RawNode>>,
    pub value: Option<f64>,
    pub values: Option<Vec<f64>>,
}

impl RawNode {
    pub fn into_scalar_tree(self) -> Result<Node<f64>, DecompositionError> {
        build_tree(self, &mut |leaf, code: &str| match (leaf.value, leaf.values) {
            (Some(value), None) => Ok(value),
            (None, Some(_)) => Err(DecompositionError::QuantityKind {
                code: code.to_string(),
                expected: "scalar",
                found: "vector",
            }),
            (Some(_), Some(_)) => Err(DecompositionError::AmbiguousQuantity {
                code: code.to_string(),
            }),
            (None, None) => Err(DecompositionError::MissingQuantity {
                code: code.to_string(),
            }),
        })
    }

    pub fn into_vector_tree(self) -> Result<Node<Vec<f64>>, DecompositionError> {
        let mut expected_len = None;
        build_tree(self, &mut move |leaf, code: &str| match (leaf.value, leaf.values) {
            (None, Some(values)) => {
                let expected = *expected_len.get_or_insert(values.len());
                if values.len() != expected {
                    return Err(DecompositionError::SweepLengthMismatch {
                        code: code.to_string(),
                        expected,
                        found: values.len(),
                    });
                }
                Ok(values)
            }
            (Some(_), None) => Err(DecompositionError::QuantityKind {
                code: code.to_string(),
                expected: "vector",
                found: "scalar",
            }),
            (Some(_), Some(_)) => Err(DecompositionError::AmbiguousQuantity {
                code: code.to_string(),
            }),
            (None, None) => Err(DecompositionError::MissingQuantity {
                code: code.to_string(),
            }),
        })
    }
}

struct LeafQuantities {
    value: Option<f64>,
    values: Option<Vec<f64>>,
}

fn build_tree<V, F>(raw: RawNode, read_leaf: &mut F) -> Result<Node<V>, DecompositionError>
where
    F: FnMut(LeafQuantities, &str) -> Result<V, DecompositionError>,
{
    let code = raw.code.ok_or(DecompositionError::MissingCode)?;
    let kind = match raw.children {
        Some(children) => {
            if raw.value.is_some() || raw.values.is_some() {
                return Err(DecompositionError::QuantityOnInternal { code });
            }
            let children = children
                .into_iter()
                .map(|child| build_tree(child, read_leaf))
                .collect::<Result<Vec<_>, _>>()?;
            NodeKind::Internal(children)
        }
        None => NodeKind::Leaf(read_leaf(
            LeafQuantities {
                value: raw.value,
                values: raw.values,
            },
            &code,
        )?),
    };
    Ok(Node {
        code,
        name: raw.name,
        short_name: raw.short_name,
        kind,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BarType {
    Value,
    SubTotal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bar<V> {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    pub bar_type: BarType,
    pub base: V,
    pub value: V,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Bar<V>>,
}

impl<V> Bar<V> {
    pub fn label(&self) -> &str {
        self.short_name
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or(&self.code)
    }

    pub fn title(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.code)
    }
}
