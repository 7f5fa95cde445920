use glam::{Mat4, Vec3};
use tracing::{debug, warn};
use wgpu::*;

use crate::assets::SkyImage;
use crate::model::{Camera, Scene};
use crate::utils::{
    create_box_mesh, create_grid_mesh, create_ground_mesh, create_light_helper_mesh, Mesh,
    MeshBuffer, Vertex,
};
use crate::view::gpu_init::GpuContext;

pub const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

/// Clear color shown until the sky texture arrives.
const CLEAR_COLOR: Color = Color { r: 0.5, g: 0.8, b: 1.0, a: 1.0 };
const POINT_LIGHT_INTENSITY: f32 = 0.8;
const LIGHT_HELPER_RADIUS: f32 = 1.0;
/// Lift the grid off the ground plane to avoid z-fighting.
const GRID_LIFT: f32 = 0.01;

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub eye: [f32; 4],
}

impl CameraUniform {
    pub fn from_camera(cam: &Camera) -> Self {
        Self {
            view_proj: cam.view_proj().to_cols_array_2d(),
            eye: cam.eye.extend(1.0).into(),
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightingUniform {
    pub ambient: [f32; 4],
    pub point_position: [f32; 4],
    pub point_color: [f32; 4],
}

impl LightingUniform {
    pub fn from_scene(scene: &Scene) -> Self {
        let [r, g, b] = scene.point_light.color;
        Self {
            ambient: [1.0, 1.0, 1.0, scene.ambient],
            point_position: scene.point_light.position.extend(1.0).into(),
            point_color: [r, g, b, POINT_LIGHT_INTENSITY],
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub tint: [f32; 4],
}

impl ObjectUniform {
    pub fn new(model: Mat4, tint: [f32; 4]) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            tint,
        }
    }
}

pub fn create_depth_texture(device: &Device, width: u32, height: u32) -> (Texture, TextureView) {
    let depth_texture = device.create_texture(&TextureDescriptor {
        label: Some("depth_texture"),
        size: Extent3d { width: width.max(1), height: height.max(1), depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let depth_view = depth_texture.create_view(&TextureViewDescriptor::default());
    (depth_texture, depth_view)
}

fn uniform_entry(binding: u32, visibility: ShaderStages) -> BindGroupLayoutEntry {
    BindGroupLayoutEntry {
        binding,
        visibility,
        ty: BindingType::Buffer {
            ty: BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn uniform_buffer<T>(device: &Device, label: &str) -> Buffer {
    device.create_buffer(&BufferDescriptor {
        label: Some(label),
        size: std::mem::size_of::<T>() as BufferAddress,
        usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

// Camera and lighting share bind group 0
pub struct CameraResources {
    pub camera_buffer: Buffer,
    pub lighting_buffer: Buffer,
    pub bind_group_layout: BindGroupLayout,
    pub camera_bind_group: BindGroup,
}

pub fn create_camera_resources(device: &Device) -> CameraResources {
    let camera_buffer = uniform_buffer::<CameraUniform>(device, "camera_buffer");
    let lighting_buffer = uniform_buffer::<LightingUniform>(device, "lighting_buffer");

    let bind_group_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some("camera_bind_group_layout"),
        entries: &[
            uniform_entry(0, ShaderStages::VERTEX | ShaderStages::FRAGMENT),
            uniform_entry(1, ShaderStages::FRAGMENT),
        ],
    });

    let camera_bind_group = device.create_bind_group(&BindGroupDescriptor {
        label: Some("camera_bind_group"),
        layout: &bind_group_layout,
        entries: &[
            BindGroupEntry { binding: 0, resource: camera_buffer.as_entire_binding() },
            BindGroupEntry { binding: 1, resource: lighting_buffer.as_entire_binding() },
        ],
    });

    CameraResources { camera_buffer, lighting_buffer, bind_group_layout, camera_bind_group }
}

/// A mesh on the GPU plus its own transform/tint uniform (bind group 1).
pub struct DrawObject {
    pub mesh: MeshBuffer,
    pub uniform: Buffer,
    pub bind_group: BindGroup,
}

impl DrawObject {
    pub fn new(device: &Device, layout: &BindGroupLayout, mesh: &Mesh, label: &str) -> Self {
        let uniform = uniform_buffer::<ObjectUniform>(device, label);
        let bind_group = device.create_bind_group(&BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[BindGroupEntry { binding: 0, resource: uniform.as_entire_binding() }],
        });
        Self { mesh: mesh.upload(device), uniform, bind_group }
    }

    pub fn write(&self, queue: &Queue, data: &ObjectUniform) {
        queue.write_buffer(&self.uniform, 0, bytemuck::bytes_of(data));
    }

    fn draw(&self, rp: &mut RenderPass<'_>) {
        if self.mesh.index_count == 0 {
            return;
        }
        rp.set_bind_group(1, &self.bind_group, &[]);
        rp.set_vertex_buffer(0, self.mesh.vertex_buffer.slice(..));
        rp.set_index_buffer(self.mesh.index_buffer.slice(..), IndexFormat::Uint32);
        rp.draw_indexed(0..self.mesh.index_count, 0, 0..1);
    }
}

const VERTEX_ATTRIBUTES: [VertexAttribute; 4] = [
    VertexAttribute { offset: 0, shader_location: 0, format: VertexFormat::Float32x3 },
    VertexAttribute { offset: 12, shader_location: 1, format: VertexFormat::Float32x3 },
    VertexAttribute { offset: 24, shader_location: 2, format: VertexFormat::Float32x4 },
    VertexAttribute { offset: 40, shader_location: 3, format: VertexFormat::Float32x2 },
];

fn vertex_layout() -> VertexBufferLayout<'static> {
    VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as BufferAddress,
        step_mode: VertexStepMode::Vertex,
        attributes: &VERTEX_ATTRIBUTES,
    }
}

pub struct PipelineResources {
    /// Lit triangles: ground, obstacle, player.
    pub mesh_pipeline: RenderPipeline,
    /// Unlit lines: grid and light helper.
    pub line_pipeline: RenderPipeline,
    pub object_layout: BindGroupLayout,
}

pub fn create_scene_pipelines(
    device: &Device,
    format: TextureFormat,
    camera_layout: &BindGroupLayout,
) -> PipelineResources {
    let shader = device.create_shader_module(ShaderModuleDescriptor {
        label: Some("scene_shader"),
        source: ShaderSource::Wgsl(include_str!("../shaders/scene.wgsl").into()),
    });

    let object_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some("object_bind_group_layout"),
        entries: &[uniform_entry(0, ShaderStages::VERTEX)],
    });

    let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
        label: Some("scene_pipeline_layout"),
        bind_group_layouts: &[camera_layout, &object_layout],
        push_constant_ranges: &[],
    });

    let build = |label: &str, fs_entry: &str, topology: PrimitiveTopology| {
        device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(&pipeline_layout),
            vertex: VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[vertex_layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(FragmentState {
                module: &shader,
                entry_point: Some(fs_entry),
                targets: &[Some(ColorTargetState {
                    format,
                    blend: Some(BlendState::ALPHA_BLENDING),
                    write_mask: ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: PrimitiveState {
                topology,
                strip_index_format: None,
                front_face: FrontFace::Ccw,
                // glTF assets are not guaranteed to be closed or consistently wound
                cull_mode: None,
                polygon_mode: PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: CompareFunction::Less,
                stencil: StencilState::default(),
                bias: DepthBiasState::default(),
            }),
            multisample: MultisampleState { count: 1, mask: !0, alpha_to_coverage_enabled: false },
            multiview: None,
            cache: None,
        })
    };

    PipelineResources {
        mesh_pipeline: build("mesh_pipeline", "fs_main", PrimitiveTopology::TriangleList),
        line_pipeline: build("line_pipeline", "fs_unlit", PrimitiveTopology::LineList),
        object_layout,
    }
}

/// Fullscreen background drawn behind everything once the image is loaded.
pub struct SkyResources {
    pub pipeline: RenderPipeline,
    pub layout: BindGroupLayout,
    pub sampler: Sampler,
    pub bind_group: Option<BindGroup>,
}

pub fn create_sky_resources(device: &Device, format: TextureFormat) -> SkyResources {
    let shader = device.create_shader_module(ShaderModuleDescriptor {
        label: Some("sky_shader"),
        source: ShaderSource::Wgsl(include_str!("../shaders/sky.wgsl").into()),
    });

    let layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some("sky_bind_group_layout"),
        entries: &[
            BindGroupLayoutEntry {
                binding: 0,
                visibility: ShaderStages::FRAGMENT,
                ty: BindingType::Texture {
                    sample_type: TextureSampleType::Float { filterable: true },
                    view_dimension: TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            BindGroupLayoutEntry {
                binding: 1,
                visibility: ShaderStages::FRAGMENT,
                ty: BindingType::Sampler(SamplerBindingType::Filtering),
                count: None,
            },
        ],
    });

    let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
        label: Some("sky_pipeline_layout"),
        bind_group_layouts: &[&layout],
        push_constant_ranges: &[],
    });

    let pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some("sky_pipeline"),
        layout: Some(&pipeline_layout),
        vertex: VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: Default::default(),
        },
        fragment: Some(FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(ColorTargetState { format, blend: Some(BlendState::REPLACE), write_mask: ColorWrites::ALL })],
            compilation_options: Default::default(),
        }),
        primitive: PrimitiveState {
            topology: PrimitiveTopology::TriangleList,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: false,
            depth_compare: CompareFunction::Always,
            stencil: StencilState::default(),
            bias: DepthBiasState::default(),
        }),
        multisample: MultisampleState { count: 1, mask: !0, alpha_to_coverage_enabled: false },
        multiview: None,
        cache: None,
    });

    let sampler = device.create_sampler(&SamplerDescriptor {
        label: Some("sky_sampler"),
        address_mode_u: AddressMode::ClampToEdge,
        address_mode_v: AddressMode::ClampToEdge,
        mag_filter: FilterMode::Linear,
        min_filter: FilterMode::Linear,
        ..Default::default()
    });

    SkyResources { pipeline, layout, sampler, bind_group: None }
}

impl SkyResources {
    pub fn set_image(&mut self, device: &Device, queue: &Queue, image: &SkyImage) {
        let size = Extent3d { width: image.width, height: image.height, depth_or_array_layers: 1 };
        let max = device.limits().max_texture_dimension_2d;
        if image.width > max || image.height > max {
            warn!(width = image.width, height = image.height, max, "sky image exceeds texture limit");
            return;
        }
        let texture = device.create_texture(&TextureDescriptor {
            label: Some("sky_texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: TextureFormat::Rgba8UnormSrgb,
            usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: Origin3d::ZERO,
                aspect: TextureAspect::All,
            },
            &image.rgba,
            TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * image.width),
                rows_per_image: Some(image.height),
            },
            size,
        );
        let view = texture.create_view(&TextureViewDescriptor::default());
        self.bind_group = Some(device.create_bind_group(&BindGroupDescriptor {
            label: Some("sky_bind_group"),
            layout: &self.layout,
            entries: &[
                BindGroupEntry { binding: 0, resource: BindingResource::TextureView(&view) },
                BindGroupEntry { binding: 1, resource: BindingResource::Sampler(&self.sampler) },
            ],
        }));
        debug!(width = image.width, height = image.height, "sky texture uploaded");
    }
}

/// Model matrix of the obstacle box: the unit box mesh scaled to its half extents.
pub fn obstacle_matrix(transform: Mat4, half_extents: Vec3) -> Mat4 {
    transform * Mat4::from_scale(half_extents)
}

///////////////////////////////////////////////////////////////////////////////

/// Consolidated render state to avoid parameter explosion
pub struct RenderState {
    pub surface_config: SurfaceConfiguration,
    pub depth_view: TextureView,

    pub camera: CameraResources,
    pub pipelines: PipelineResources,
    pub sky: SkyResources,

    // Static scene pieces
    pub ground: DrawObject,
    pub grid: DrawObject,
    pub light_helper: DrawObject,
    pub obstacle: DrawObject,
    pub player: Option<DrawObject>,
    player_revision: u64,
    show_obstacle: bool,

    // UI
    pub egui_renderer: egui_wgpu::Renderer,
    pub egui_primitives: Option<Vec<egui::ClippedPrimitive>>,
    pub egui_full_output: Option<egui::FullOutput>,
    pub egui_dpr: f32,
}

impl RenderState {
    pub fn new(gpu: &GpuContext, scene: &Scene) -> Self {
        let device = gpu.device.as_ref();
        let (_, depth_view) = create_depth_texture(device, gpu.config.width, gpu.config.height);
        let camera = create_camera_resources(device);
        let pipelines = create_scene_pipelines(device, gpu.format, &camera.bind_group_layout);
        let sky = create_sky_resources(device, gpu.format);

        let layout = &pipelines.object_layout;
        let ground = DrawObject::new(
            device,
            layout,
            &create_ground_mesh(scene.ground_size, scene.ground_color),
            "ground",
        );
        let grid = DrawObject::new(device, layout, &create_grid_mesh(scene.grid_size, scene.grid_divisions), "grid");
        let light = scene.point_light;
        let [r, g, b] = light.color;
        let light_helper = DrawObject::new(
            device,
            layout,
            &create_light_helper_mesh(Vec3::ZERO, LIGHT_HELPER_RADIUS, [r, g, b, 1.0]),
            "light_helper",
        );
        let obstacle = DrawObject::new(device, layout, &create_box_mesh(Vec3::ONE, [1.0; 4]), "obstacle");

        let queue = gpu.queue.as_ref();
        ground.write(queue, &ObjectUniform::new(Mat4::IDENTITY, [1.0; 4]));
        grid.write(queue, &ObjectUniform::new(Mat4::from_translation(Vec3::Y * GRID_LIFT), [1.0; 4]));
        light_helper.write(queue, &ObjectUniform::new(Mat4::from_translation(light.position), [1.0; 4]));

        let egui_renderer = egui_wgpu::Renderer::new(device, gpu.format, egui_wgpu::RendererOptions::default());

        Self {
            surface_config: gpu.config.clone(),
            depth_view,
            camera,
            pipelines,
            sky,
            ground,
            grid,
            light_helper,
            obstacle,
            player: None,
            player_revision: 0,
            show_obstacle: false,
            egui_renderer,
            egui_primitives: None,
            egui_full_output: None,
            egui_dpr: 1.0,
        }
    }

    pub fn width(&self) -> u32 {
        self.surface_config.width
    }

    pub fn height(&self) -> u32 {
        self.surface_config.height
    }

    /// Reconfigure the surface and rebuild the depth buffer. Zero sizes are ignored.
    pub fn resize(&mut self, device: &Device, surface: &Surface, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        surface.configure(device, &self.surface_config);
        let (_, depth_view) = create_depth_texture(device, width, height);
        self.depth_view = depth_view;
    }

    /// Push this frame's camera, light and entity transforms to the GPU.
    /// The player mesh is (re)uploaded only when the scene swapped it.
    pub fn prepare(&mut self, device: &Device, queue: &Queue, cam: &Camera, scene: &Scene) {
        queue.write_buffer(&self.camera.camera_buffer, 0, bytemuck::bytes_of(&CameraUniform::from_camera(cam)));
        queue.write_buffer(&self.camera.lighting_buffer, 0, bytemuck::bytes_of(&LightingUniform::from_scene(scene)));

        if scene.player_revision != self.player_revision {
            self.player = scene.player.as_ref().map(|p| {
                debug!(vertices = p.mesh.vertices.len(), "uploading player mesh");
                DrawObject::new(device, &self.pipelines.object_layout, &p.mesh, "player")
            });
            self.player_revision = scene.player_revision;
        }
        if let (Some(gpu_player), Some(player)) = (&self.player, &scene.player) {
            gpu_player.write(queue, &ObjectUniform::new(player.transform.matrix(), [1.0; 4]));
        }

        self.show_obstacle = scene.obstacle.is_some();
        if let Some(obstacle) = &scene.obstacle {
            let model = obstacle_matrix(obstacle.transform.matrix(), obstacle.half_extents);
            self.obstacle.write(queue, &ObjectUniform::new(model, obstacle.color));
        }
    }

    /// Hand over tessellated egui output for the next `draw_frame`.
    pub fn set_ui(&mut self, primitives: Vec<egui::ClippedPrimitive>, full_output: egui::FullOutput, dpr: f32) {
        self.egui_primitives = Some(primitives);
        self.egui_full_output = Some(full_output);
        self.egui_dpr = dpr;
    }

    /// Draw sky, scene and overlay. A lost or outdated surface is reconfigured
    /// and the frame skipped; other surface errors go to the caller.
    pub fn draw_frame(&mut self, device: &Device, queue: &Queue, surface: &Surface) -> Result<(), SurfaceError> {
        let frame = match surface.get_current_texture() {
            Ok(frame) => frame,
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                debug!("surface lost, reconfiguring");
                surface.configure(device, &self.surface_config);
                return Ok(());
            }
            Err(SurfaceError::Timeout) => {
                warn!("surface timeout, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let view = frame.texture.create_view(&TextureViewDescriptor::default());
        let mut encoder = device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("encoder"),
        });

        {
            let mut rp = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("render_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(CLEAR_COLOR),
                        store: StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(1.0),
                        store: StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let Some(sky_bg) = &self.sky.bind_group {
                rp.set_pipeline(&self.sky.pipeline);
                rp.set_bind_group(0, sky_bg, &[]);
                rp.draw(0..3, 0..1);
            }

            rp.set_pipeline(&self.pipelines.mesh_pipeline);
            rp.set_bind_group(0, &self.camera.camera_bind_group, &[]);
            self.ground.draw(&mut rp);
            if self.show_obstacle {
                self.obstacle.draw(&mut rp);
            }
            if let Some(player) = &self.player {
                player.draw(&mut rp);
            }

            rp.set_pipeline(&self.pipelines.line_pipeline);
            self.grid.draw(&mut rp);
            self.light_helper.draw(&mut rp);
        }

        if let (Some(egui_primitives), Some(egui_full_output)) =
            (self.egui_primitives.take(), self.egui_full_output.take())
        {
            let screen_descriptor = egui_wgpu::ScreenDescriptor {
                size_in_pixels: [self.width(), self.height()],
                pixels_per_point: self.egui_dpr,
            };

            for (id, image_delta) in &egui_full_output.textures_delta.set {
                self.egui_renderer.update_texture(device, queue, *id, image_delta);
            }
            self.egui_renderer
                .update_buffers(device, queue, &mut encoder, &egui_primitives, &screen_descriptor);

            {
                let egui_pass = encoder.begin_render_pass(&RenderPassDescriptor {
                    label: Some("egui_render_pass"),
                    color_attachments: &[Some(RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: Operations {
                            load: LoadOp::Load,
                            store: StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });

                self.egui_renderer
                    .render(&mut egui_pass.forget_lifetime(), &egui_primitives, &screen_descriptor);
            }

            for id in &egui_full_output.textures_delta.free {
                self.egui_renderer.free_texture(id);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_sizes_match_wgsl_layout() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 80);
        assert_eq!(std::mem::size_of::<LightingUniform>(), 48);
        assert_eq!(std::mem::size_of::<ObjectUniform>(), 80);
        assert_eq!(std::mem::size_of::<Vertex>(), 48);
    }

    #[test]
    fn lighting_reads_scene_light() {
        let scene = Scene::new(1000.0, [1.0; 4], 200.0, 50, Vec3::new(5.0, 5.0, 5.0));
        let light = LightingUniform::from_scene(&scene);
        assert_eq!(light.point_position, [5.0, 5.0, 5.0, 1.0]);
        assert_eq!(light.ambient[3], scene.ambient);
    }

    #[test]
    fn obstacle_box_spans_twice_its_half_extents() {
        let m = obstacle_matrix(Mat4::from_translation(Vec3::new(0.0, 5.0, -5.0)), Vec3::ONE);
        assert!(m.transform_point3(Vec3::ONE).abs_diff_eq(Vec3::new(1.0, 6.0, -4.0), 1e-6));
        assert!(m.transform_point3(-Vec3::ONE).abs_diff_eq(Vec3::new(-1.0, 4.0, -6.0), 1e-6));
    }

    #[test]
    fn camera_uniform_carries_eye() {
        let mut cam = Camera::new(800, 600);
        cam.eye = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(CameraUniform::from_camera(&cam).eye, [1.0, 2.0, 3.0, 1.0]);
    }
}
