use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Animation", inline)]
#[serde(default)]
/// Per-tick model animation.
pub struct AnimationOptions {
    /// Rotation added to each attached model about +Y every tick (radians).
    #[schemars(title = "Spin", range(min = 0.0, max = 0.1), extend("step" = 0.001))]
    pub spin_per_tick: f32,
}

impl Default for AnimationOptions {
    fn default() -> Self {
        Self {
            spin_per_tick: 0.007,
        }
    }
}
