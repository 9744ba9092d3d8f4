pub mod dichotomy;
pub mod domain;
pub mod error;
pub mod field;
pub mod grid;
pub mod interp;
pub mod mesh;
pub mod node;
pub mod polygonize;
#[cfg(feature = "bevy")]
pub mod render;
pub mod scenes;
pub mod tables;
pub mod tree;
pub mod types;
pub mod utils;

pub use dichotomy::Dichotomy;
pub use domain::Aabb;
pub use error::{ImplicitError, Result};
pub use field::{DEFAULT_GRADIENT_STEP, ScalarField};
pub use mesh::Mesh;
pub use node::Node;
pub use polygonize::{PolygonizeConfig, polygonize, polygonize_with};
pub use tree::{ImplicitTree, NodeId, TreeNode};
