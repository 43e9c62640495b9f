/*!
# CullAABB

Portal cell visibility culling for levels authored with axis-aligned
cull regions.

The level marks its rooms and corridors with boxes. Each box becomes a
visibility cell; boxes that share a face are linked by a pair of portals;
a k-d style partition tree answers "which cell is this point in". Every
frame the cell holding the observer is shown and the cell it left is
hidden, so geometry parented under a cell is only drawn while the
observer can be in it.

## Architecture

- **BoundingVolume**: axis-aligned box, one per cull region
- **SpatialPartitionTree**: low/mid/high split tree for point location
- **detect_portals / PortalGraph**: face adjacency sweep and portal quads
- **VisibilityCellManager**: cell nodes, portal nodes, observer tracking
- **SceneGraph / LevelSource**: the host engine seams
- **FrameTask**: per-frame driver used by the host loop

The engine is reached only through the `SceneGraph` trait, so the crate
runs the same against a real renderer or the in-memory `MockSceneGraph`.
*/

// Internal modules
mod error;
pub mod log;
pub mod config;
pub mod geometry;
pub mod partition;
pub mod portal;
pub mod scene;
pub mod culling;

// Main cullaabb namespace module
pub mod cullaabb {
    // Error types
    pub use crate::error::{Error, GeometryError, Result};

    // Configuration
    pub use crate::config::{CullConfig, PartitionSettings};

    // Manager and per-frame driver
    pub use crate::culling::{
        CellKey, CellTransition, CullState, VisibilityCellManager,
        FrameContext, FrameTask, TaskStatus, run_frame,
    };

    // Logging sub-module (types and logger slot, NOT macros)
    pub mod log {
        pub use crate::log::{
            Logger, LogEntry, LogSeverity, DefaultLogger,
            set_logger, reset_logger, log, log_detailed,
        };
        // Note: cull_* macros are exported at the crate root for internal use
    }

    // Geometry sub-module
    pub mod geometry {
        pub use crate::geometry::*;
    }

    // Partition sub-module
    pub mod partition {
        pub use crate::partition::*;
    }

    // Portal sub-module
    pub mod portal {
        pub use crate::portal::*;
    }

    // Scene sub-module
    pub mod scene {
        pub use crate::scene::*;
    }
}

// Re-export math library at crate root
pub use glam;
