use derive_more::Display;

use crate::{tree::NodeId, types::Value};

pub type Result<T> = core::result::Result<T, ImplicitError>;

#[derive(Debug, Display, Clone, PartialEq)]
pub enum ImplicitError {
    #[display("blend width must be finite and positive, got {_0}")]
    InvalidBlendWidth(Value),
    #[display("scale factors must be finite and non-zero, got ({_0}, {_1}, {_2})")]
    DegenerateScale(Value, Value, Value),
    #[display("direction ({_0}, {_1}, {_2}) cannot be normalized")]
    DegenerateDirection(Value, Value, Value),
    #[display("replication half-period must be finite and positive, got ({_0}, {_1}, {_2})")]
    DegeneratePeriod(Value, Value, Value),
    #[display("radius or length must be finite and non-negative, got {_0}")]
    InvalidRadius(Value),
    #[display("half extents must be finite and non-negative, got ({_0}, {_1}, {_2})")]
    InvalidHalfExtents(Value, Value, Value),
    #[display("resolution must be at least 1 sample per axis and small enough to sample, got {_0}")]
    InvalidResolution(usize),
    #[display("tolerance must be finite and positive, got {_0}")]
    InvalidTolerance(Value),
    #[display("node {_0} does not belong to this tree")]
    UnknownNode(NodeId),
    #[display("tree cannot hold more than 2^32 nodes, already has {_0}")]
    TooManyNodes(usize),
    #[display("tree has no root node")]
    MissingRoot,
    #[display("index {index} out of bounds for {len} elements")]
    InvalidIndex { index: usize, len: usize },
    #[display("index lists must have equal length divisible by 3, got {vertices} and {normals}")]
    MismatchedIndices { vertices: usize, normals: usize },
}

impl std::error::Error for ImplicitError {}
