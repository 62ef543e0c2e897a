use glam::{Mat3, Mat4};

use crate::camera::{Camera, CameraUniform};
use crate::scene::{Light, Scene};

/// Depth buffer format shared by every viewer surface.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Directional lights the shader reads per frame.
pub const MAX_DIRECTIONAL_LIGHTS: usize = 4;

/// Interleaved position/normal vertex.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Local-space position.
    pub position: [f32; 3],
    /// Local-space normal.
    pub normal: [f32; 3],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Per-draw instance data: model matrix, normal matrix and base color.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    model: [[f32; 4]; 4],
    normal: [[f32; 4]; 3],
    color: [f32; 4],
}

impl InstanceRaw {
    const ATTRIBUTES: [wgpu::VertexAttribute; 8] = wgpu::vertex_attr_array![
        2 => Float32x4, 3 => Float32x4, 4 => Float32x4, 5 => Float32x4,
        6 => Float32x4, 7 => Float32x4, 8 => Float32x4, 9 => Float32x4,
    ];

    /// Pack a world matrix and color.
    #[must_use]
    pub fn new(world: Mat4, color: [f32; 4]) -> Self {
        let normal = Mat3::from_mat4(world).inverse().transpose();
        let col = |c: glam::Vec3| [c.x, c.y, c.z, 0.0];
        Self {
            model: world.to_cols_array_2d(),
            normal: [col(normal.x_axis), col(normal.y_axis), col(normal.z_axis)],
            color,
        }
    }

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Per-frame uniform: camera plus the scene's lights.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniform {
    camera: CameraUniform,
    ambient: [f32; 4],
    light_dirs: [[f32; 4]; MAX_DIRECTIONAL_LIGHTS],
    light_colors: [[f32; 4]; MAX_DIRECTIONAL_LIGHTS],
    light_count: [u32; 4],
}

impl FrameUniform {
    /// Pack `camera` and the lights installed in `scene`.
    ///
    /// Ambient lights are summed. Directional lights beyond
    /// [`MAX_DIRECTIONAL_LIGHTS`] are dropped.
    #[must_use]
    pub fn new(scene: &Scene, camera: &Camera) -> Self {
        let mut uniform = Self {
            camera: CameraUniform::from_camera(camera),
            ..bytemuck::Zeroable::zeroed()
        };
        let mut count = 0;
        for light in scene.lights() {
            match *light {
                Light::Ambient { color, intensity } => {
                    for (acc, c) in uniform.ambient.iter_mut().zip(color) {
                        *acc += c * intensity;
                    }
                }
                Light::Directional {
                    color, intensity, ..
                } => {
                    let Some(dir) = light.direction() else {
                        continue;
                    };
                    if count == MAX_DIRECTIONAL_LIGHTS {
                        log::debug!("ignoring extra directional light");
                        continue;
                    }
                    uniform.light_dirs[count] = dir.extend(0.0).to_array();
                    uniform.light_colors[count] = [
                        color[0] * intensity,
                        color[1] * intensity,
                        color[2] * intensity,
                        0.0,
                    ];
                    count += 1;
                }
            }
        }
        uniform.light_count[0] = count as u32;
        uniform
    }

    /// Number of directional lights packed.
    #[must_use]
    pub fn directional_count(&self) -> u32 {
        self.light_count[0]
    }

    /// Summed ambient radiance.
    #[must_use]
    pub fn ambient(&self) -> [f32; 3] {
        [self.ambient[0], self.ambient[1], self.ambient[2]]
    }
}

/// Shader, bind group layout and pipeline for one color target format.
pub struct ModelPipeline {
    /// Color target format the pipeline was built for.
    pub format: wgpu::TextureFormat,
    /// Layout of the per-frame uniform bind group.
    pub frame_layout: wgpu::BindGroupLayout,
    /// The render pipeline.
    pub pipeline: wgpu::RenderPipeline,
}

impl ModelPipeline {
    /// Build the pipeline for `format`.
    #[must_use]
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::include_wgsl!(
            "../../assets/shaders/model.wgsl"
        ));

        let frame_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Frame Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Model Pipeline Layout"),
                bind_group_layouts: &[&frame_layout],
                push_constant_ranges: &[],
            });

        let pipeline =
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Model Pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[Vertex::layout(), InstanceRaw::layout()],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });

        Self {
            format,
            frame_layout,
            pipeline,
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::options::CameraOptions;

    #[test]
    fn uniform_layout_matches_shader() {
        // view_proj + camera_pos, ambient, 4 dirs, 4 colors, light_count
        let shader_frame = 64 + 16 + 16 + 4 * 16 + 4 * 16 + 16;
        assert_eq!(size_of::<CameraUniform>(), 80);
        assert_eq!(size_of::<FrameUniform>(), shader_frame);
        assert_eq!(size_of::<FrameUniform>(), 240);
        assert_eq!(size_of::<FrameUniform>() % 16, 0);
        assert_eq!(size_of::<InstanceRaw>(), 128);
    }

    #[test]
    fn packs_scene_lights() {
        let mut scene = Scene::default();
        scene.add_light(Light::Ambient {
            color: [1.0, 1.0, 1.0],
            intensity: 0.5,
        });
        scene.add_light(Light::Directional {
            color: [1.0, 0.0, 0.0],
            intensity: 3.0,
            position: Vec3::new(0.0, 10.0, 0.0),
        });
        let camera = Camera::framed(1.0, &CameraOptions::default());

        let uniform = FrameUniform::new(&scene, &camera);
        assert_eq!(uniform.ambient(), [0.5, 0.5, 0.5]);
        assert_eq!(uniform.directional_count(), 1);
        assert_eq!(uniform.light_dirs[0], [0.0, 1.0, 0.0, 0.0]);
        assert_eq!(uniform.light_colors[0], [3.0, 0.0, 0.0, 0.0]);
        assert_eq!(uniform.camera.position, [0.0, 0.0, 50.0, 1.0]);
    }

    #[test]
    fn caps_directional_lights() {
        let mut scene = Scene::default();
        for _ in 0..6 {
            scene.add_light(Light::Directional {
                color: [1.0; 3],
                intensity: 1.0,
                position: Vec3::X,
            });
        }
        let camera = Camera::framed(1.0, &CameraOptions::default());
        let uniform = FrameUniform::new(&scene, &camera);
        assert_eq!(uniform.directional_count(), 4);
    }

    #[test]
    fn instance_normal_matrix_undoes_scale() {
        let world = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let raw = InstanceRaw::new(world, [1.0; 4]);
        assert!((raw.normal[0][0] - 0.5).abs() < 1e-6);
        assert!((raw.normal[1][1] - 1.0).abs() < 1e-6);
    }
}
