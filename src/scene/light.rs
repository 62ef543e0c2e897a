use glam::Vec3;

/// A light installed in a viewer's scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    /// Uniform light from all directions.
    Ambient {
        /// Linear RGB color.
        color: [f32; 3],
        /// Intensity multiplier.
        intensity: f32,
    },
    /// Parallel light shining from `position` towards the origin.
    Directional {
        /// Linear RGB color.
        color: [f32; 3],
        /// Intensity multiplier.
        intensity: f32,
        /// Light position; only its direction from the origin matters.
        position: Vec3,
    },
}

impl Light {
    /// Whether this is an ambient light.
    #[must_use]
    pub fn is_ambient(&self) -> bool {
        matches!(self, Self::Ambient { .. })
    }

    /// Unit vector pointing from the origin towards a directional light.
    /// `None` for ambient lights or a light placed at the origin.
    #[must_use]
    pub fn direction(&self) -> Option<Vec3> {
        match self {
            Self::Directional { position, .. } => position.try_normalize(),
            Self::Ambient { .. } => None,
        }
    }
}
