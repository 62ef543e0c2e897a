use std::marker::PhantomData;
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use wgpu::util::DeviceExt;

use super::dynamic_buffer::DynamicBuffer;
use super::pipeline::{
    FrameUniform, InstanceRaw, ModelPipeline, Vertex, DEPTH_FORMAT,
};
use super::render_context::GpuContext;
use crate::camera::Camera;
use crate::host::{
    MountPoint, RenderError, RenderSurface, SurfaceInitError, SurfaceProvider,
};
use crate::scene::{MeshData, MeshId, Scene};

/// Creates one wgpu surface per mount point on a shared device.
///
/// Pipelines are built once per surface format and shared by every surface
/// that uses that format.
pub struct WgpuProvider<M> {
    gpu: Arc<GpuContext>,
    pipelines: FxHashMap<wgpu::TextureFormat, Arc<ModelPipeline>>,
    _mount: PhantomData<fn(&M)>,
}

impl<M> WgpuProvider<M> {
    /// Provider drawing with `gpu`.
    #[must_use]
    pub fn new(gpu: Arc<GpuContext>) -> Self {
        Self {
            gpu,
            pipelines: FxHashMap::default(),
            _mount: PhantomData,
        }
    }

    /// The shared device state.
    #[must_use]
    pub fn gpu(&self) -> &Arc<GpuContext> {
        &self.gpu
    }

    fn pipeline(&mut self, format: wgpu::TextureFormat) -> Arc<ModelPipeline> {
        let device = &self.gpu.device;
        Arc::clone(self.pipelines.entry(format).or_insert_with(|| {
            log::debug!("building model pipeline for {format:?}");
            Arc::new(ModelPipeline::new(device, format))
        }))
    }
}

impl<M> SurfaceProvider for WgpuProvider<M>
where
    M: MountPoint + Clone + Into<wgpu::SurfaceTarget<'static>>,
{
    type Mount = M;
    type Surface = WgpuSurface;

    fn create_surface(
        &mut self,
        mount: &M,
    ) -> Result<WgpuSurface, SurfaceInitError> {
        let (width, height) = mount.size();
        let surface = self
            .gpu
            .instance
            .create_surface(mount.clone())
            .map_err(|e| SurfaceInitError::Creation(e.to_string()))?;

        let mut config = surface
            .get_default_config(&self.gpu.adapter, width, height)
            .ok_or(SurfaceInitError::Unsupported)?;
        config.present_mode = wgpu::PresentMode::Fifo;
        surface.configure(&self.gpu.device, &config);

        let pipeline = self.pipeline(config.format);
        Ok(WgpuSurface::new(Arc::clone(&self.gpu), pipeline, surface, config))
    }
}

struct DepthTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl DepthTarget {
    fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Viewer Depth"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

struct GpuMesh {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    fn upload(device: &wgpu::Device, mesh: &MeshData) -> Self {
        let vertices: Vec<Vertex> = mesh
            .positions()
            .iter()
            .zip(mesh.normals())
            .map(|(&position, &normal)| Vertex { position, normal })
            .collect();
        Self {
            vertices: device.create_buffer_init(
                &wgpu::util::BufferInitDescriptor {
                    label: Some("Mesh Vertices"),
                    contents: bytemuck::cast_slice(&vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                },
            ),
            indices: device.create_buffer_init(
                &wgpu::util::BufferInitDescriptor {
                    label: Some("Mesh Indices"),
                    contents: bytemuck::cast_slice(mesh.indices()),
                    usage: wgpu::BufferUsages::INDEX,
                },
            ),
            index_count: mesh.indices().len() as u32,
        }
    }

    fn destroy(&self) {
        self.vertices.destroy();
        self.indices.destroy();
    }
}

/// A configured wgpu surface plus everything needed to draw one viewer.
pub struct WgpuSurface {
    gpu: Arc<GpuContext>,
    pipeline: Arc<ModelPipeline>,
    surface: Option<wgpu::Surface<'static>>,
    config: wgpu::SurfaceConfiguration,
    depth: DepthTarget,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    instances: DynamicBuffer,
    meshes: FxHashMap<MeshId, GpuMesh>,
}

impl WgpuSurface {
    fn new(
        gpu: Arc<GpuContext>,
        pipeline: Arc<ModelPipeline>,
        surface: wgpu::Surface<'static>,
        config: wgpu::SurfaceConfiguration,
    ) -> Self {
        let device = &gpu.device;
        let depth = DepthTarget::new(device, config.width, config.height);
        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniform"),
            size: size_of::<FrameUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group =
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Frame Bind Group"),
                layout: &pipeline.frame_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: frame_buffer.as_entire_binding(),
                }],
            });
        let instances = DynamicBuffer::new(
            device,
            "Mesh Instances",
            size_of::<InstanceRaw>() * 16,
            wgpu::BufferUsages::VERTEX,
        );

        Self {
            gpu,
            pipeline,
            surface: Some(surface),
            config,
            depth,
            frame_buffer,
            frame_bind_group,
            instances,
            meshes: FxHashMap::default(),
        }
    }

    /// Upload meshes seen for the first time and evict those no longer
    /// drawn. Returns the instance data in draw order.
    fn sync_meshes(&mut self, scene: &Scene) -> Vec<(MeshId, InstanceRaw)> {
        let draw_list = scene.draw_list();
        let mut seen = FxHashSet::default();
        let mut draws = Vec::with_capacity(draw_list.len());
        for item in &draw_list {
            let id = item.mesh.id();
            if !self.meshes.contains_key(&id) {
                log::debug!(
                    "uploading mesh {id:?} ({} triangles)",
                    item.mesh.triangle_count()
                );
                let _ = self
                    .meshes
                    .insert(id, GpuMesh::upload(&self.gpu.device, &item.mesh));
            }
            let _ = seen.insert(id);
            let instance = InstanceRaw::new(item.world, item.mesh.base_color());
            draws.push((id, instance));
        }
        self.meshes.retain(|id, mesh| {
            let keep = seen.contains(id);
            if !keep {
                mesh.destroy();
            }
            keep
        });
        draws
    }
}

fn map_surface_error(e: wgpu::SurfaceError) -> RenderError {
    match e {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
            RenderError::SurfaceLost
        }
        wgpu::SurfaceError::Timeout => RenderError::Timeout,
        wgpu::SurfaceError::OutOfMemory => RenderError::OutOfMemory,
        other => RenderError::Other(other.to_string()),
    }
}

impl RenderSurface for WgpuSurface {
    fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    fn render(
        &mut self,
        scene: &Scene,
        camera: &Camera,
    ) -> Result<(), RenderError> {
        let Some(surface) = &self.surface else {
            return Err(RenderError::Released);
        };
        let frame = match surface.get_current_texture() {
            Ok(frame) => frame,
            Err(e) => {
                if matches!(
                    e,
                    wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated
                ) {
                    surface.configure(&self.gpu.device, &self.config);
                }
                return Err(map_surface_error(e));
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let uniform = FrameUniform::new(scene, camera);
        self.gpu
            .queue
            .write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&uniform));

        let draws = self.sync_meshes(scene);
        let instance_data: Vec<InstanceRaw> =
            draws.iter().map(|(_, raw)| *raw).collect();
        let _ = self.instances.write(
            &self.gpu.device,
            &self.gpu.queue,
            &instance_data,
        );

        let [r, g, b] = scene.background;
        let mut encoder = self.gpu.create_encoder("Viewer Encoder");
        {
            let mut pass =
                encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Viewer Pass"),
                    color_attachments: &[Some(
                        wgpu::RenderPassColorAttachment {
                            view: &view,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Clear(wgpu::Color {
                                    r: f64::from(r),
                                    g: f64::from(g),
                                    b: f64::from(b),
                                    a: 1.0,
                                }),
                                store: wgpu::StoreOp::Store,
                            },
                            depth_slice: None,
                        },
                    )],
                    depth_stencil_attachment: Some(
                        wgpu::RenderPassDepthStencilAttachment {
                            view: &self.depth.view,
                            depth_ops: Some(wgpu::Operations {
                                load: wgpu::LoadOp::Clear(1.0),
                                store: wgpu::StoreOp::Store,
                            }),
                            stencil_ops: None,
                        },
                    ),
                    ..Default::default()
                });

            pass.set_pipeline(&self.pipeline.pipeline);
            pass.set_bind_group(0, &self.frame_bind_group, &[]);
            pass.set_vertex_buffer(1, self.instances.buffer().slice(..));
            for (i, (id, _)) in draws.iter().enumerate() {
                let Some(mesh) = self.meshes.get(id) else {
                    continue;
                };
                let instance = i as u32;
                pass.set_vertex_buffer(0, mesh.vertices.slice(..));
                pass.set_index_buffer(
                    mesh.indices.slice(..),
                    wgpu::IndexFormat::Uint32,
                );
                pass.draw_indexed(
                    0..mesh.index_count,
                    0,
                    instance..instance + 1,
                );
            }
        }
        self.gpu.submit(encoder);
        frame.present();
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        let Some(surface) = &self.surface else {
            return;
        };
        self.config.width = width;
        self.config.height = height;
        surface.configure(&self.gpu.device, &self.config);
        self.depth.texture.destroy();
        self.depth = DepthTarget::new(&self.gpu.device, width, height);
    }

    fn release(&mut self) {
        if self.surface.take().is_none() {
            return;
        }
        for mesh in self.meshes.values() {
            mesh.destroy();
        }
        self.meshes.clear();
        self.instances.destroy();
        self.frame_buffer.destroy();
        self.depth.texture.destroy();
        log::debug!("released surface {}x{}", self.config.width, self.config.height);
    }

    fn is_released(&self) -> bool {
        self.surface.is_none()
    }
}
