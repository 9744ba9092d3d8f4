use derive_more::Display;

use crate::{
    error::{ImplicitError, Result},
    field::ScalarField,
    node::{Combine, Node, Step},
    types::{Point, Value, Vector},
};

/// Handle to a node stored in an [`ImplicitTree`].
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[display("#{_0}")]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Id of the node stored after `len` others.
    fn from_len(len: usize) -> Result<Self> {
        u32::try_from(len)
            .map(NodeId)
            .map_err(|_| ImplicitError::TooManyNodes(len))
    }
}

/// Depth up to which sub-trees are evaluated by plain recursion.
pub const RECURSION_LIMIT: u32 = 256;

/// An arena of implicit [`Node`]s with a designated root.
///
/// Nodes are created through the builder methods, which validate their
/// parameters and only accept children already stored in this tree. A node
/// may be shared by several parents, but cycles cannot be built.
///
/// Trees of any depth can be evaluated: sub-trees deeper than
/// [`RECURSION_LIMIT`] are walked with an explicit stack.
///
/// ```
/// use implicit_mc::{ImplicitTree, ScalarField, types::{Point, Vector}};
///
/// let mut tree = ImplicitTree::new();
/// let body = tree.exact_box(Point::origin(), Vector::new(1.0, 1.0, 1.0))?;
/// let hole = tree.sphere(Point::origin(), 1.2)?;
/// let root = tree.difference(body, hole)?;
/// tree.set_root(root)?;
///
/// assert!(tree.value(&Point::new(0.95, 0.95, 0.95)) < 0.0);
/// assert!(tree.value(&Point::origin()) > 0.0);
/// # Ok::<(), implicit_mc::ImplicitError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ImplicitTree {
    nodes: Vec<Node>,
    /// Longest path from each node down to a primitive, parallel to `nodes`.
    depths: Vec<u32>,
    root: Option<NodeId>,
}

impl ImplicitTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes in the arena, reachable from the root or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Makes `id` the node evaluated by [`ScalarField::value`].
    pub fn set_root(&mut self, id: NodeId) -> Result<()> {
        self.check(id)?;
        self.root = Some(id);
        Ok(())
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Returns a [`ScalarField`] view evaluating the sub-tree rooted at `id`.
    pub fn node(&self, id: NodeId) -> Result<TreeNode<'_>> {
        self.check(id)?;
        Ok(TreeNode { tree: self, id })
    }

    /// Returns a view of the root node.
    pub fn root_node(&self) -> Result<TreeNode<'_>> {
        let id = self.root.ok_or(ImplicitError::MissingRoot)?;
        self.node(id)
    }

    /// Evaluates the sub-tree rooted at `id` at `p`.
    pub fn value_of(&self, id: NodeId, p: &Point) -> Result<Value> {
        self.check(id)?;
        Ok(self.eval(id, p))
    }

    pub fn sphere(&mut self, center: Point, radius: Value) -> Result<NodeId> {
        check_length(radius)?;
        self.insert(Node::Sphere { center, radius })
    }

    pub fn exact_box(&mut self, center: Point, half_extents: Vector) -> Result<NodeId> {
        check_half_extents(&half_extents)?;
        self.insert(Node::ExactBox {
            center,
            half_extents,
        })
    }

    pub fn face_distance_box(&mut self, center: Point, half_extents: Vector) -> Result<NodeId> {
        check_half_extents(&half_extents)?;
        self.insert(Node::FaceDistanceBox {
            center,
            half_extents,
        })
    }

    /// Capsule around the segment `origin ± half_length * direction`.
    ///
    /// `direction` need not be unit length but must be normalizable.
    pub fn capsule(
        &mut self,
        origin: Point,
        direction: Vector,
        half_length: Value,
        radius: Value,
    ) -> Result<NodeId> {
        let n = direction.norm();
        if !n.is_finite() || n < Value::EPSILON {
            return Err(ImplicitError::DegenerateDirection(
                direction.x,
                direction.y,
                direction.z,
            ));
        }
        check_length(half_length)?;
        check_length(radius)?;
        self.insert(Node::Capsule {
            origin,
            direction: direction / n,
            half_length,
            radius,
        })
    }

    pub fn torus(&mut self, center: Point, major: Value, minor: Value) -> Result<NodeId> {
        check_length(major)?;
        check_length(minor)?;
        self.insert(Node::Torus {
            center,
            major,
            minor,
        })
    }

    pub fn union(&mut self, a: NodeId, b: NodeId) -> Result<NodeId> {
        self.insert(Node::Union(a, b))
    }

    pub fn intersection(&mut self, a: NodeId, b: NodeId) -> Result<NodeId> {
        self.insert(Node::Intersection(a, b))
    }

    /// `a` minus `b`.
    pub fn difference(&mut self, a: NodeId, b: NodeId) -> Result<NodeId> {
        self.insert(Node::Difference(a, b))
    }

    pub fn blend(&mut self, a: NodeId, b: NodeId, width: Value) -> Result<NodeId> {
        if !width.is_finite() || width <= 0.0 {
            return Err(ImplicitError::InvalidBlendWidth(width));
        }
        self.insert(Node::Blend { a, b, width })
    }

    /// Tiles `child` with period `2 * half_period` on each axis.
    pub fn replicate(&mut self, child: NodeId, half_period: Vector) -> Result<NodeId> {
        if half_period.iter().any(|h| !h.is_finite() || *h <= 0.0) {
            return Err(ImplicitError::DegeneratePeriod(
                half_period.x,
                half_period.y,
                half_period.z,
            ));
        }
        self.insert(Node::Replicate { child, half_period })
    }

    pub fn translate(&mut self, child: NodeId, offset: Vector) -> Result<NodeId> {
        self.insert(Node::Translate { child, offset })
    }

    /// Stretches `child` by `factor` on each axis.
    pub fn scale(&mut self, child: NodeId, factor: Vector) -> Result<NodeId> {
        if factor.iter().any(|s| !s.is_finite() || *s == 0.0) {
            return Err(ImplicitError::DegenerateScale(factor.x, factor.y, factor.z));
        }
        self.insert(Node::Scale { child, factor })
    }

    fn insert(&mut self, node: Node) -> Result<NodeId> {
        let mut depth = 0_u32;
        for child in node.children().into_iter().flatten() {
            self.check(child)?;
            depth = depth.max(self.depths[child.index()].saturating_add(1));
        }
        let id = NodeId::from_len(self.nodes.len())?;
        self.nodes.push(node);
        self.depths.push(depth);
        Ok(id)
    }

    fn check(&self, id: NodeId) -> Result<()> {
        if id.index() < self.nodes.len() {
            Ok(())
        } else {
            Err(ImplicitError::UnknownNode(id))
        }
    }

    fn eval(&self, id: NodeId, p: &Point) -> Value {
        if self.depths[id.index()] > RECURSION_LIMIT {
            return self.eval_stacked(id, p);
        }
        match self.nodes[id.index()].step(p) {
            Step::Value(v) => v,
            Step::Child(child, q) => self.eval(child, &q),
            Step::Pair(a, b, op) => op.apply(self.eval(a, p), self.eval(b, p)),
        }
    }

    fn eval_stacked(&self, id: NodeId, p: &Point) -> Value {
        enum Frame {
            Eval(NodeId, Point),
            Apply(Combine),
        }

        let mut frames = vec![Frame::Eval(id, *p)];
        let mut values: Vec<Value> = Vec::new();

        while let Some(frame) = frames.pop() {
            match frame {
                Frame::Eval(id, p) => match self.nodes[id.index()].step(&p) {
                    Step::Value(v) => values.push(v),
                    Step::Child(child, q) => frames.push(Frame::Eval(child, q)),
                    Step::Pair(a, b, op) => {
                        // `a` is evaluated first, so its value ends up below `b`'s.
                        frames.push(Frame::Apply(op));
                        frames.push(Frame::Eval(b, p));
                        frames.push(Frame::Eval(a, p));
                    }
                },
                Frame::Apply(op) => {
                    let b = values.pop().unwrap_or(Value::NAN);
                    let a = values.pop().unwrap_or(Value::NAN);
                    values.push(op.apply(a, b));
                }
            }
        }

        debug_assert_eq!(values.len(), 1);
        values.pop().unwrap_or(Value::NAN)
    }
}

/// A tree without a root is the empty solid: every point is far outside.
impl ScalarField for ImplicitTree {
    #[inline]
    fn value(&self, p: &Point) -> Value {
        match self.root {
            Some(root) => self.eval(root, p),
            None => Value::MAX,
        }
    }
}

/// A node of an [`ImplicitTree`] evaluated as a field of its own.
#[derive(Debug, Clone, Copy)]
pub struct TreeNode<'a> {
    tree: &'a ImplicitTree,
    id: NodeId,
}

impl TreeNode<'_> {
    pub fn id(&self) -> NodeId {
        self.id
    }
}

impl ScalarField for TreeNode<'_> {
    #[inline]
    fn value(&self, p: &Point) -> Value {
        self.tree.eval(self.id, p)
    }
}

fn check_length(v: Value) -> Result<()> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(ImplicitError::InvalidRadius(v))
    }
}

fn check_half_extents(h: &Vector) -> Result<()> {
    if h.iter().all(|c| c.is_finite() && *c >= 0.0) {
        Ok(())
    } else {
        Err(ImplicitError::InvalidHalfExtents(h.x, h.y, h.z))
    }
}
