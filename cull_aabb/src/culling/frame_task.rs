/// Per-frame task strategy.
///
/// A FrameTask is work the host runs once per frame between renders, such
/// as the observer-cell tracking of the culling system. Tasks report
/// whether they want to keep running; a task that returns `Done` is
/// considered deregistered for the frames that follow.

use glam::Vec3;
use crate::error::Result;
use crate::scene::SceneGraph;

/// Frame data handed to every task.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    /// Frame counter, starting at 0
    pub frame: u64,
    /// World position of the observer (usually the camera)
    pub observer: Vec3,
}

impl FrameContext {
    pub fn new(frame: u64, observer: Vec3) -> Self {
        Self { frame, observer }
    }
}

/// Whether a task wants to run again next frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Continue,
    Done,
}

/// Strategy for work driven by the frame loop.
///
/// Must return promptly: tasks run on the frame thread.
pub trait FrameTask {
    /// Name for logs.
    fn name(&self) -> &str;

    /// Run one frame.
    fn run(&mut self, scene: &mut dyn SceneGraph, context: &FrameContext) -> Result<TaskStatus>;
}

/// Run every task once, in order.
///
/// Stops at the first error. Returns how many tasks asked to continue.
pub fn run_frame(
    tasks: &mut [&mut dyn FrameTask],
    scene: &mut dyn SceneGraph,
    context: &FrameContext,
) -> Result<usize> {
    let mut running = 0;
    for task in tasks.iter_mut() {
        match task.run(scene, context)? {
            TaskStatus::Continue => running += 1,
            TaskStatus::Done => {
                crate::cull_trace!("cullaabb::FrameTask", "Task '{}' finished at frame {}", task.name(), context.frame);
            }
        }
    }
    Ok(running)
}
