//! Culling module
//!
//! Portal cells built from cull regions, observer tracking and the frame
//! task that drives it.

mod frame_task;
mod visibility_cell_manager;

pub use frame_task::{run_frame, FrameContext, FrameTask, TaskStatus};
pub use visibility_cell_manager::{
    Cell, CellKey, CellTransition, CullState, VisibilityCellManager,
};
