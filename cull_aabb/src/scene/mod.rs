//! Scene module
//!
//! The scene-graph and level interfaces the culling system is driven
//! through, plus an in-memory implementation of both.

mod scene_graph;
mod mock_scene_graph;

pub use scene_graph::{LevelSource, NodeId, PortalDesc, ReparentMode, SceneGraph};
pub use mock_scene_graph::{MockSceneGraph, IS_A_TAG};
