/// Culling configuration.
///
/// Everything the host can tune about the culling build. All fields have
/// working defaults so `CullConfig::default()` is the usual starting point.

/// Default overlap applied when two regions are linked by a portal
pub const DEFAULT_OVERLAP: f32 = 1e-3;

/// Default offset used to keep candidate split planes off box faces
pub const DEFAULT_SPLIT_EPSILON: f32 = 1e-3;

/// Default cost factor for every unit of volume cut by a split plane
pub const DEFAULT_CUT_COST: f32 = 2.0;

/// Default tag value that marks a level node as a cull region
pub const DEFAULT_REGION_KIND: &str = "CullAABB";

/// Tunables for the spatial partition tree builder
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartitionSettings {
    /// Offset of the low/high candidate cuts from the pivot box faces
    pub split_epsilon: f32,
    /// Cost factor applied to the volume of boxes straddling a cut
    pub cut_cost: f32,
}

impl Default for PartitionSettings {
    fn default() -> Self {
        Self {
            split_epsilon: DEFAULT_SPLIT_EPSILON,
            cut_cost: DEFAULT_CUT_COST,
        }
    }
}

/// Culling system configuration
#[derive(Debug, Clone, PartialEq)]
pub struct CullConfig {
    /// Overlap left between two linked regions on their shared face
    pub overlap: f32,
    /// Log cell / portal counts and cell transitions
    pub debug: bool,
    /// `IsA` tag value identifying cull-region markers in the level
    pub region_kind: String,
    /// Partition tree tunables
    pub partition: PartitionSettings,
}

impl Default for CullConfig {
    fn default() -> Self {
        Self {
            overlap: DEFAULT_OVERLAP,
            debug: false,
            region_kind: DEFAULT_REGION_KIND.to_string(),
            partition: PartitionSettings::default(),
        }
    }
}

impl CullConfig {
    /// Default configuration with debug logging switched on
    pub fn debug() -> Self {
        Self {
            debug: true,
            ..Self::default()
        }
    }
}
