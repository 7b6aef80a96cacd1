use core::f32;
use std::mem;
use std::path::PathBuf;

use glam::{Mat4, Vec3};
use tracing::warn;
use windows::Win32::Foundation::{E_FAIL, FALSE, HWND, RECT};
use windows::Win32::Graphics::{Direct3D::*, Direct3D12::*, Dxgi::Common::*};

use crate::camera::Camera;
use crate::d3d12::{
    barrier,
    device::{create_descriptor_heap, Device},
    pix::{pix_color, Pix},
    resource::{self, UploadBuffer},
    shader::{ShaderCompiler, ShaderConfig},
};
use crate::font;
use crate::frame::{object_offset, FRAME_BUFFER_COUNT};
use crate::input::InputState;
use crate::overlay::{GlyphInstance, Overlay, TextStyle, MAX_OVERLAY_CHARS};
use crate::timer::FrameTimer;
use crate::Config;

/// Constants bound per draw; each object gets its own aligned copy in the
/// frame slot's constant region.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
struct ObjectConstants {
    wvp: Mat4,
}

const OBJECT_COUNT: usize = 2;

const CLEAR_COLOR: [f32; 4] = [0.05, 0.05, 0.10, 1.0];

pub struct Renderer {
    device: Device,

    #[allow(dead_code)]
    depth_buffer: ID3D12Resource,

    screen_width: u32,
    screen_height: u32,

    pix: Option<Pix>,

    camera: Camera,
    cubes: CubePair,

    overlay: Overlay,
    hud_style: TextStyle,
    hud_text: String,

    mesh: Mesh,
    scene_root_signature: ID3D12RootSignature,
    scene_pso: ID3D12PipelineState,

    overlay_root_signature: ID3D12RootSignature,
    overlay_pso: ID3D12PipelineState,
    srv_heap: ID3D12DescriptorHeap,
    #[allow(dead_code)]
    glyph_atlas: ID3D12Resource,

    // one region per frame slot; writes are gated by the presenter's wait
    constant_regions: [UploadBuffer; FRAME_BUFFER_COUNT],
    overlay_regions: [UploadBuffer; FRAME_BUFFER_COUNT],
    overlay_instance_count: u32,
}

impl Renderer {
    pub fn new(hwnd: HWND, config: &Config) -> crate::Result<Self> {
        let mut device = Device::build(hwnd, config)?;

        create_frame_buffer_rtvs(&device);

        let screen_width = config.client_width();
        let screen_height = config.client_height();

        let depth_buffer = create_depth_buffer(&device, screen_width, screen_height)?;

        let pix = Pix::build()
            .inspect_err(|e| warn!("PIX markers disabled: {e}"))
            .ok();

        let mesh = load_mesh(&mut device)?;

        let shader_compiler = ShaderCompiler::build(config.debug_layer_enabled())?;

        let scene_root_signature = create_scene_root_signature(&device)?;
        let scene_pso = create_scene_pso(&device, &scene_root_signature, &shader_compiler)?;

        let overlay_root_signature = create_overlay_root_signature(&device)?;
        let overlay_pso = create_overlay_pso(&device, &overlay_root_signature, &shader_compiler)?;

        let srv_heap =
            create_descriptor_heap(device.get(), D3D12_DESCRIPTOR_HEAP_TYPE_CBV_SRV_UAV, 1)?;
        let glyph_atlas = create_glyph_atlas(&mut device, &srv_heap)?;

        let constant_regions = build_slot_regions(
            &device,
            "constant_region",
            object_offset(OBJECT_COUNT, mem::size_of::<ObjectConstants>()),
        )?;
        let overlay_regions = build_slot_regions(
            &device,
            "overlay_region",
            MAX_OVERLAY_CHARS * mem::size_of::<GlyphInstance>(),
        )?;

        let aspect = screen_width as f32 / screen_height as f32;

        Ok(Self {
            device,

            depth_buffer,

            screen_width,
            screen_height,

            pix,

            camera: Camera::new(aspect),
            cubes: CubePair::new(),

            overlay: Overlay::new(screen_width, screen_height),
            hud_style: TextStyle::default(),
            hud_text: String::new(),

            mesh,
            scene_root_signature,
            scene_pso,

            overlay_root_signature,
            overlay_pso,
            srv_heap,
            glyph_atlas,

            constant_regions,
            overlay_regions,
            overlay_instance_count: 0,
        })
    }

    /// Advances the scene and rewrites the current frame slot's CPU-visible
    /// regions. The slot was acquired (and waited for) by the previous
    /// present, so the GPU is done reading them.
    pub fn update(&mut self, input: &InputState, timer: &FrameTimer) {
        let dt = timer.delta().as_secs_f32();

        self.camera.update(input, dt);
        self.cubes.advance(dt);

        let slot = self.device.frame_index();

        let view_proj = self.camera.view_projection();
        for (i, world) in self.cubes.world_matrices().iter().enumerate() {
            let constants = ObjectConstants {
                wvp: view_proj * *world,
            };
            let offset = object_offset(i, mem::size_of::<ObjectConstants>());
            self.constant_regions[slot].write(offset, &constants);
        }

        self.hud_text.clear();
        use std::fmt::Write;
        let _ = write!(
            self.hud_text,
            "FPS: {:.0} ({:.2} ms)",
            timer.fps(),
            timer.delta_ms()
        );

        self.overlay.clear();
        self.overlay
            .push_text(&self.hud_text, [12.0, 12.0], &self.hud_style);

        let instances = self.overlay.instances();
        self.overlay_regions[slot].write_slice(0, instances);
        self.overlay_instance_count = instances.len() as u32;
    }

    pub fn render(&mut self) -> windows::core::Result<()> {
        let ctx = self.device.request_gfx_command_ctx()?;
        let cmd_list = ctx.command_list();

        let pix = self.pix.as_ref();
        let slot = self.device.frame_index();
        let back_buffer = self.device.back_buffer();

        {
            let color = pix_color(0, 255, 0);
            let _event = pix.map(|p| p.begin_event(cmd_list, color, "Render"));

            let rect = RECT {
                left: 0,
                top: 0,
                right: self.screen_width as i32,
                bottom: self.screen_height as i32,
            };

            let viewport = D3D12_VIEWPORT {
                TopLeftX: 0.0,
                TopLeftY: 0.0,
                Width: self.screen_width as f32,
                Height: self.screen_height as f32,
                MinDepth: D3D12_MIN_DEPTH,
                MaxDepth: D3D12_MAX_DEPTH,
            };

            let mut rtv = unsafe { self.device.rtv_heap().GetCPUDescriptorHandleForHeapStart() };
            rtv.ptr += slot * self.device.rtv_size() as usize;
            let dsv = unsafe { self.device.dsv_heap().GetCPUDescriptorHandleForHeapStart() };

            {
                let _event = pix.map(|p| p.begin_event(cmd_list, color, "Clear frame buffer"));

                let barriers = [barrier::present_to_render_target(back_buffer)];
                unsafe { cmd_list.ResourceBarrier(&barriers) };

                unsafe {
                    cmd_list.ClearRenderTargetView(rtv, &CLEAR_COLOR, None);
                    cmd_list.ClearDepthStencilView(dsv, D3D12_CLEAR_FLAG_DEPTH, 1.0, 0, &[]);
                }
            }

            {
                let _event = pix.map(|p| p.begin_event(cmd_list, color, "Draw cubes"));

                unsafe {
                    cmd_list.RSSetViewports(&[viewport]);
                    cmd_list.RSSetScissorRects(&[rect]);
                    cmd_list.OMSetRenderTargets(1, Some(&rtv), FALSE, Some(&dsv));

                    cmd_list.SetPipelineState(&self.scene_pso);
                    cmd_list.SetGraphicsRootSignature(&self.scene_root_signature);
                    cmd_list.IASetPrimitiveTopology(D3D_PRIMITIVE_TOPOLOGY_TRIANGLELIST);
                    cmd_list.IASetVertexBuffers(0, Some(&[self.mesh.vbv]));
                    cmd_list.IASetIndexBuffer(Some(&self.mesh.ibv));

                    let constants_base = self.constant_regions[slot].gpu_address();
                    for i in 0..OBJECT_COUNT {
                        let offset = object_offset(i, mem::size_of::<ObjectConstants>());
                        cmd_list
                            .SetGraphicsRootConstantBufferView(0, constants_base + offset as u64);
                        cmd_list.DrawIndexedInstanced(INDICES.len() as u32, 1, 0, 0, 0);
                    }
                }
            }

            if self.overlay_instance_count > 0 {
                let _event = pix.map(|p| p.begin_event(cmd_list, color, "Draw overlay"));

                let vbv = D3D12_VERTEX_BUFFER_VIEW {
                    BufferLocation: self.overlay_regions[slot].gpu_address(),
                    SizeInBytes: (self.overlay_instance_count as usize
                        * mem::size_of::<GlyphInstance>()) as u32,
                    StrideInBytes: mem::size_of::<GlyphInstance>() as u32,
                };

                unsafe {
                    cmd_list.SetPipelineState(&self.overlay_pso);
                    cmd_list.SetGraphicsRootSignature(&self.overlay_root_signature);
                    cmd_list.SetDescriptorHeaps(&[Some(self.srv_heap.clone())]);
                    cmd_list.SetGraphicsRootDescriptorTable(
                        0,
                        self.srv_heap.GetGPUDescriptorHandleForHeapStart(),
                    );
                    cmd_list.IASetPrimitiveTopology(D3D_PRIMITIVE_TOPOLOGY_TRIANGLESTRIP);
                    cmd_list.IASetVertexBuffers(0, Some(&[vbv]));
                    cmd_list.DrawInstanced(4, self.overlay_instance_count, 0, 0);
                }
            }
        }

        {
            let barriers = [barrier::render_target_to_present(back_buffer)];
            unsafe { cmd_list.ResourceBarrier(&barriers) }

            self.device.present_frame(ctx)?;
        }

        Ok(())
    }
}

/// Cube 1 spins in place at the origin; cube 2 orbits it, counter-spinning
/// at half scale.
struct CubePair {
    spin: f32,
    orbit: f32,
}

impl CubePair {
    const SPIN_SPEED: f32 = 1.2; // radians per second
    const ORBIT_SPEED: f32 = 0.8;
    const ORBIT_RADIUS: f32 = 2.5;

    fn new() -> Self {
        Self {
            spin: 0.0,
            orbit: 0.0,
        }
    }

    fn advance(&mut self, dt: f32) {
        self.spin = (self.spin + Self::SPIN_SPEED * dt) % (2.0 * f32::consts::PI);
        self.orbit = (self.orbit + Self::ORBIT_SPEED * dt) % (2.0 * f32::consts::PI);
    }

    fn world_matrices(&self) -> [Mat4; OBJECT_COUNT] {
        let axis = Vec3::new(0.0, 1.0, 1.0).normalize();
        let first = Mat4::from_axis_angle(axis, self.spin);

        let offset = Vec3::new(
            self.orbit.cos() * Self::ORBIT_RADIUS,
            0.0,
            self.orbit.sin() * Self::ORBIT_RADIUS,
        );
        let second = Mat4::from_translation(offset)
            * Mat4::from_axis_angle(Vec3::Y, -self.spin * 1.5)
            * Mat4::from_scale(Vec3::splat(0.5));

        [first, second]
    }
}

fn create_frame_buffer_rtvs(device: &Device) {
    let mut rtv = unsafe { device.rtv_heap().GetCPUDescriptorHandleForHeapStart() };

    for buffer in device.frame_buffers() {
        unsafe { device.get().CreateRenderTargetView(buffer, None, rtv) };
        rtv.ptr += device.rtv_size() as usize;
    }
}

fn create_depth_buffer(
    device: &Device,
    width: u32,
    height: u32,
) -> windows::core::Result<ID3D12Resource> {
    if width == 0 || height == 0 {
        return Err(windows::core::Error::new(
            E_FAIL,
            "the depth buffer needs a non-zero extent",
        ));
    }

    const CLEAR_VALUE: D3D12_CLEAR_VALUE = D3D12_CLEAR_VALUE {
        Format: DXGI_FORMAT_D32_FLOAT,
        Anonymous: D3D12_CLEAR_VALUE_0 {
            DepthStencil: D3D12_DEPTH_STENCIL_VALUE {
                Depth: 1.0,
                Stencil: 0,
            },
        },
    };

    let properties = resource::heap_properties(D3D12_HEAP_TYPE_DEFAULT);

    let desc = resource::texture2d_desc(
        DXGI_FORMAT_D32_FLOAT,
        width.into(),
        height,
        D3D12_RESOURCE_FLAG_ALLOW_DEPTH_STENCIL,
    );

    let mut depth_buffer: Option<ID3D12Resource> = None;
    unsafe {
        device.get().CreateCommittedResource(
            &properties,
            D3D12_HEAP_FLAG_NONE,
            &desc,
            D3D12_RESOURCE_STATE_DEPTH_WRITE,
            Some(&CLEAR_VALUE),
            &mut depth_buffer,
        )
    }?;
    let depth_buffer = depth_buffer.expect("CreateCommittedResource returned no depth buffer");

    let dsv_desc = D3D12_DEPTH_STENCIL_VIEW_DESC {
        Format: DXGI_FORMAT_D32_FLOAT,
        ViewDimension: D3D12_DSV_DIMENSION_TEXTURE2D,
        Flags: D3D12_DSV_FLAG_NONE,
        Anonymous: D3D12_DEPTH_STENCIL_VIEW_DESC_0 {
            Texture2D: D3D12_TEX2D_DSV { MipSlice: 0 },
        },
    };

    unsafe {
        device.get().CreateDepthStencilView(
            &depth_buffer,
            Some(&dsv_desc),
            device.dsv_heap().GetCPUDescriptorHandleForHeapStart(),
        )
    };
    Ok(depth_buffer)
}

#[derive(Debug)]
#[repr(C)]
struct Vertex {
    position: [f32; 3],
    color: [f32; 3],
}

#[rustfmt::skip]
const VERTICES: [Vertex; 8] = [
    Vertex { position: [-1.0, -1.0, -1.0], color: [0.0, 0.0, 0.0] },
    Vertex { position: [-1.0,  1.0, -1.0], color: [0.0, 1.0, 0.0] },
    Vertex { position: [ 1.0,  1.0, -1.0], color: [1.0, 1.0, 0.0] },
    Vertex { position: [ 1.0, -1.0, -1.0], color: [1.0, 0.0, 0.0] },
    Vertex { position: [-1.0, -1.0,  1.0], color: [0.0, 0.0, 1.0] },
    Vertex { position: [-1.0,  1.0,  1.0], color: [0.0, 1.0, 1.0] },
    Vertex { position: [ 1.0,  1.0,  1.0], color: [1.0, 1.0, 1.0] },
    Vertex { position: [ 1.0, -1.0,  1.0], color: [1.0, 0.0, 1.0] },
];

// winding order is clockwise
#[rustfmt::skip]
const INDICES: [u16; 36] = [
    0, 1, 2, 0, 2, 3,
    4, 6, 5, 4, 7, 6,
    4, 5, 1, 4, 1, 0,
    3, 2, 6, 3, 6, 7,
    1, 5, 6, 1, 6, 2,
    4, 0, 3, 4, 3, 7,
];

struct Mesh {
    #[allow(unused)]
    vertex_buffer: ID3D12Resource,
    vbv: D3D12_VERTEX_BUFFER_VIEW,
    #[allow(unused)]
    index_buffer: ID3D12Resource,
    ibv: D3D12_INDEX_BUFFER_VIEW,
}

fn load_mesh(device: &mut Device) -> windows::core::Result<Mesh> {
    const VERTEX_SIZE: usize = mem::size_of::<Vertex>();
    let vertex_buffer_size = mem::size_of_val(&VERTICES);

    let vertices = resource::create_buffer(
        device,
        vertex_buffer_size as u64,
        Some(&VERTICES),
        D3D12_HEAP_TYPE_UPLOAD,
        D3D12_RESOURCE_FLAG_NONE,
        "intermediate vertex buffer",
    )?;

    let vertex_buffer = resource::create_buffer::<()>(
        device,
        vertex_buffer_size as u64,
        None,
        D3D12_HEAP_TYPE_DEFAULT,
        D3D12_RESOURCE_FLAG_NONE,
        "vertex buffer",
    )?;

    let ctx = device.request_copy_command_ctx()?;
    let command_list = ctx.command_list();

    unsafe { command_list.CopyResource(&vertex_buffer, &vertices) };

    let vbv = D3D12_VERTEX_BUFFER_VIEW {
        BufferLocation: unsafe { vertex_buffer.GetGPUVirtualAddress() },
        SizeInBytes: vertex_buffer_size as u32,
        StrideInBytes: VERTEX_SIZE as u32,
    };

    let index_buffer_size = mem::size_of_val(&INDICES);
    let indices = resource::create_buffer(
        device,
        index_buffer_size as u64,
        Some(&INDICES),
        D3D12_HEAP_TYPE_UPLOAD,
        D3D12_RESOURCE_FLAG_NONE,
        "intermediate index buffer",
    )?;

    let index_buffer = resource::create_buffer::<()>(
        device,
        index_buffer_size as u64,
        None,
        D3D12_HEAP_TYPE_DEFAULT,
        D3D12_RESOURCE_FLAG_NONE,
        "index buffer",
    )?;

    unsafe { command_list.CopyResource(&index_buffer, &indices) };

    let ibv = D3D12_INDEX_BUFFER_VIEW {
        BufferLocation: unsafe { index_buffer.GetGPUVirtualAddress() },
        Format: DXGI_FORMAT_R16_UINT,
        SizeInBytes: index_buffer_size as u32,
    };

    // make sure both buffers are resident before the first draw
    let command_queue = device.copy_command_queue_mut();
    let fence_value = command_queue.execute_commands(ctx)?;
    command_queue.wait_fence(fence_value)?;

    Ok(Mesh {
        vertex_buffer,
        vbv,
        index_buffer,
        ibv,
    })
}

fn build_slot_regions(
    device: &Device,
    name: &str,
    size: usize,
) -> windows::core::Result<[UploadBuffer; FRAME_BUFFER_COUNT]> {
    let mut regions = Vec::with_capacity(FRAME_BUFFER_COUNT);
    for i in 0..FRAME_BUFFER_COUNT {
        regions.push(UploadBuffer::build(device, size, &format!("{name}[{i}]"))?);
    }
    Ok(regions
        .try_into()
        .unwrap_or_else(|_| unreachable!("slot count is fixed")))
}

fn create_glyph_atlas(
    device: &mut Device,
    srv_heap: &ID3D12DescriptorHeap,
) -> windows::core::Result<ID3D12Resource> {
    let pixels = font::bake_atlas();
    let atlas = resource::create_texture2d_with_data(
        device,
        DXGI_FORMAT_R8_UNORM,
        font::atlas_width() as u32,
        font::atlas_height() as u32,
        1,
        &pixels,
        "glyph_atlas",
    )?;

    let srv_desc = D3D12_SHADER_RESOURCE_VIEW_DESC {
        Format: DXGI_FORMAT_R8_UNORM,
        ViewDimension: D3D12_SRV_DIMENSION_TEXTURE2D,
        Shader4ComponentMapping: D3D12_DEFAULT_SHADER_4_COMPONENT_MAPPING,
        Anonymous: D3D12_SHADER_RESOURCE_VIEW_DESC_0 {
            Texture2D: D3D12_TEX2D_SRV {
                MostDetailedMip: 0,
                MipLevels: 1,
                PlaneSlice: 0,
                ResourceMinLODClamp: 0.0,
            },
        },
    };

    unsafe {
        device.get().CreateShaderResourceView(
            &atlas,
            Some(&srv_desc),
            srv_heap.GetCPUDescriptorHandleForHeapStart(),
        )
    };

    Ok(atlas)
}

fn build_root_signature(
    device: &Device,
    desc: &D3D12_VERSIONED_ROOT_SIGNATURE_DESC,
) -> windows::core::Result<ID3D12RootSignature> {
    let mut blob = None;
    let mut error = None;
    unsafe { D3D12SerializeVersionedRootSignature(desc, &mut blob, Some(&mut error)) }?;
    if let Some(e) = error {
        let message = unsafe { std::ffi::CStr::from_ptr(e.GetBufferPointer() as _) };
        return Err(windows::core::Error::new(
            E_FAIL,
            message.to_string_lossy().into_owned(),
        ));
    }

    let blob = blob.expect("serialization produced no blob");
    unsafe {
        let root_signature_blob =
            std::slice::from_raw_parts(blob.GetBufferPointer() as *const u8, blob.GetBufferSize());
        device.get().CreateRootSignature(0, root_signature_blob)
    }
}

/// One root CBV holding the object's transform.
fn create_scene_root_signature(device: &Device) -> windows::core::Result<ID3D12RootSignature> {
    let flags = D3D12_ROOT_SIGNATURE_FLAG_ALLOW_INPUT_ASSEMBLER_INPUT_LAYOUT
        | D3D12_ROOT_SIGNATURE_FLAG_DENY_HULL_SHADER_ROOT_ACCESS
        | D3D12_ROOT_SIGNATURE_FLAG_DENY_DOMAIN_SHADER_ROOT_ACCESS
        | D3D12_ROOT_SIGNATURE_FLAG_DENY_GEOMETRY_SHADER_ROOT_ACCESS
        | D3D12_ROOT_SIGNATURE_FLAG_DENY_PIXEL_SHADER_ROOT_ACCESS;

    let params = [D3D12_ROOT_PARAMETER1 {
        ParameterType: D3D12_ROOT_PARAMETER_TYPE_CBV,
        Anonymous: D3D12_ROOT_PARAMETER1_0 {
            Descriptor: D3D12_ROOT_DESCRIPTOR1 {
                ShaderRegister: 0,
                RegisterSpace: 0,
                Flags: D3D12_ROOT_DESCRIPTOR_FLAG_NONE,
            },
        },
        ShaderVisibility: D3D12_SHADER_VISIBILITY_VERTEX,
    }];

    let desc = D3D12_VERSIONED_ROOT_SIGNATURE_DESC {
        Version: D3D_ROOT_SIGNATURE_VERSION_1_1,
        Anonymous: D3D12_VERSIONED_ROOT_SIGNATURE_DESC_0 {
            Desc_1_1: D3D12_ROOT_SIGNATURE_DESC1 {
                NumParameters: params.len() as u32,
                pParameters: params.as_ptr(),
                NumStaticSamplers: 0,
                pStaticSamplers: std::ptr::null(),
                Flags: flags,
            },
        },
    };

    build_root_signature(device, &desc)
}

/// Glyph atlas SRV plus a point-clamp static sampler.
fn create_overlay_root_signature(device: &Device) -> windows::core::Result<ID3D12RootSignature> {
    let flags = D3D12_ROOT_SIGNATURE_FLAG_ALLOW_INPUT_ASSEMBLER_INPUT_LAYOUT
        | D3D12_ROOT_SIGNATURE_FLAG_DENY_HULL_SHADER_ROOT_ACCESS
        | D3D12_ROOT_SIGNATURE_FLAG_DENY_DOMAIN_SHADER_ROOT_ACCESS
        | D3D12_ROOT_SIGNATURE_FLAG_DENY_GEOMETRY_SHADER_ROOT_ACCESS;

    let ranges = [D3D12_DESCRIPTOR_RANGE1 {
        RangeType: D3D12_DESCRIPTOR_RANGE_TYPE_SRV,
        NumDescriptors: 1,
        BaseShaderRegister: 0,
        RegisterSpace: 0,
        Flags: D3D12_DESCRIPTOR_RANGE_FLAG_NONE,
        OffsetInDescriptorsFromTableStart: 0,
    }];

    let params = [D3D12_ROOT_PARAMETER1 {
        ParameterType: D3D12_ROOT_PARAMETER_TYPE_DESCRIPTOR_TABLE,
        Anonymous: D3D12_ROOT_PARAMETER1_0 {
            DescriptorTable: D3D12_ROOT_DESCRIPTOR_TABLE1 {
                NumDescriptorRanges: ranges.len() as u32,
                pDescriptorRanges: ranges.as_ptr(),
            },
        },
        ShaderVisibility: D3D12_SHADER_VISIBILITY_PIXEL,
    }];

    let samplers = [D3D12_STATIC_SAMPLER_DESC {
        Filter: D3D12_FILTER_MIN_MAG_MIP_POINT,
        AddressU: D3D12_TEXTURE_ADDRESS_MODE_CLAMP,
        AddressV: D3D12_TEXTURE_ADDRESS_MODE_CLAMP,
        AddressW: D3D12_TEXTURE_ADDRESS_MODE_CLAMP,
        MipLODBias: 0.0,
        MaxAnisotropy: 0,
        ComparisonFunc: D3D12_COMPARISON_FUNC_NEVER,
        BorderColor: D3D12_STATIC_BORDER_COLOR_TRANSPARENT_BLACK,
        MinLOD: 0.0,
        MaxLOD: D3D12_FLOAT32_MAX,
        ShaderRegister: 0,
        RegisterSpace: 0,
        ShaderVisibility: D3D12_SHADER_VISIBILITY_PIXEL,
    }];

    let desc = D3D12_VERSIONED_ROOT_SIGNATURE_DESC {
        Version: D3D_ROOT_SIGNATURE_VERSION_1_1,
        Anonymous: D3D12_VERSIONED_ROOT_SIGNATURE_DESC_0 {
            Desc_1_1: D3D12_ROOT_SIGNATURE_DESC1 {
                NumParameters: params.len() as u32,
                pParameters: params.as_ptr(),
                NumStaticSamplers: samplers.len() as u32,
                pStaticSamplers: samplers.as_ptr(),
                Flags: flags,
            },
        },
    };

    build_root_signature(device, &desc)
}

fn compile_pair(
    compiler: &ShaderCompiler,
    hlsl: &PathBuf,
) -> windows::core::Result<(Dxc::IDxcBlob, Dxc::IDxcBlob)> {
    let vs = compiler.compile_file(&ShaderConfig {
        path: hlsl.clone(),
        entry_point: "vs_main".into(),
        target: "vs_6_0".into(),
    })?;
    let ps = compiler.compile_file(&ShaderConfig {
        path: hlsl.clone(),
        entry_point: "ps_main".into(),
        target: "ps_6_0".into(),
    })?;
    Ok((vs, ps))
}

fn create_scene_pso(
    device: &Device,
    root_signature: &ID3D12RootSignature,
    compiler: &ShaderCompiler,
) -> windows::core::Result<ID3D12PipelineState> {
    let hlsl: PathBuf = "shaders/scene.hlsl".into();
    let (vertex_shader, pixel_shader) = compile_pair(compiler, &hlsl)?;

    let input_layout = [
        D3D12_INPUT_ELEMENT_DESC {
            SemanticName: windows::core::s!("POSITION"),
            SemanticIndex: 0,
            Format: DXGI_FORMAT_R32G32B32_FLOAT,
            InputSlot: 0,
            AlignedByteOffset: D3D12_APPEND_ALIGNED_ELEMENT,
            InputSlotClass: D3D12_INPUT_CLASSIFICATION_PER_VERTEX_DATA,
            InstanceDataStepRate: 0,
        },
        D3D12_INPUT_ELEMENT_DESC {
            SemanticName: windows::core::s!("COLOR"),
            SemanticIndex: 0,
            Format: DXGI_FORMAT_R32G32B32_FLOAT,
            InputSlot: 0,
            AlignedByteOffset: D3D12_APPEND_ALIGNED_ELEMENT,
            InputSlotClass: D3D12_INPUT_CLASSIFICATION_PER_VERTEX_DATA,
            InstanceDataStepRate: 0,
        },
    ];

    let mut desc = D3D12_GRAPHICS_PIPELINE_STATE_DESC {
        pRootSignature: unsafe { mem::transmute_copy(root_signature) },

        VS: D3D12_SHADER_BYTECODE {
            pShaderBytecode: unsafe { vertex_shader.GetBufferPointer() },
            BytecodeLength: unsafe { vertex_shader.GetBufferSize() },
        },

        PS: D3D12_SHADER_BYTECODE {
            pShaderBytecode: unsafe { pixel_shader.GetBufferPointer() },
            BytecodeLength: unsafe { pixel_shader.GetBufferSize() },
        },

        BlendState: D3D12_BLEND_DESC {
            AlphaToCoverageEnable: false.into(),
            IndependentBlendEnable: false.into(),
            RenderTarget: [Default::default(); 8],
        },
        SampleMask: u32::MAX,
        RasterizerState: D3D12_RASTERIZER_DESC {
            FillMode: D3D12_FILL_MODE_SOLID,
            CullMode: D3D12_CULL_MODE_BACK,
            ..Default::default()
        },
        DepthStencilState: D3D12_DEPTH_STENCIL_DESC {
            DepthEnable: true.into(),
            DepthWriteMask: D3D12_DEPTH_WRITE_MASK_ALL,
            DepthFunc: D3D12_COMPARISON_FUNC_LESS,
            StencilEnable: false.into(),
            ..Default::default()
        },

        InputLayout: D3D12_INPUT_LAYOUT_DESC {
            pInputElementDescs: input_layout.as_ptr(),
            NumElements: input_layout.len() as u32,
        },

        PrimitiveTopologyType: D3D12_PRIMITIVE_TOPOLOGY_TYPE_TRIANGLE,
        NumRenderTargets: 1,
        DSVFormat: DXGI_FORMAT_D32_FLOAT,
        SampleDesc: DXGI_SAMPLE_DESC {
            Count: 1,
            Quality: 0,
        },

        ..Default::default()
    };

    desc.BlendState.RenderTarget[0] = D3D12_RENDER_TARGET_BLEND_DESC {
        BlendEnable: false.into(),
        LogicOpEnable: false.into(),
        SrcBlend: D3D12_BLEND_ONE,
        DestBlend: D3D12_BLEND_ZERO,
        BlendOp: D3D12_BLEND_OP_ADD,
        SrcBlendAlpha: D3D12_BLEND_ONE,
        DestBlendAlpha: D3D12_BLEND_ZERO,
        BlendOpAlpha: D3D12_BLEND_OP_ADD,
        LogicOp: D3D12_LOGIC_OP_NOOP,
        RenderTargetWriteMask: D3D12_COLOR_WRITE_ENABLE_ALL.0 as u8,
    };
    desc.RTVFormats[0] = DXGI_FORMAT_R8G8B8A8_UNORM;

    unsafe { device.get().CreateGraphicsPipelineState(&desc) }
}

fn create_overlay_pso(
    device: &Device,
    root_signature: &ID3D12RootSignature,
    compiler: &ShaderCompiler,
) -> windows::core::Result<ID3D12PipelineState> {
    let hlsl: PathBuf = "shaders/overlay.hlsl".into();
    let (vertex_shader, pixel_shader) = compile_pair(compiler, &hlsl)?;

    // one record per glyph, expanded to a quad by the vertex shader
    let input_layout = [
        D3D12_INPUT_ELEMENT_DESC {
            SemanticName: windows::core::s!("RECT"),
            SemanticIndex: 0,
            Format: DXGI_FORMAT_R32G32B32A32_FLOAT,
            InputSlot: 0,
            AlignedByteOffset: D3D12_APPEND_ALIGNED_ELEMENT,
            InputSlotClass: D3D12_INPUT_CLASSIFICATION_PER_INSTANCE_DATA,
            InstanceDataStepRate: 1,
        },
        D3D12_INPUT_ELEMENT_DESC {
            SemanticName: windows::core::s!("TEXCOORD"),
            SemanticIndex: 0,
            Format: DXGI_FORMAT_R32G32B32A32_FLOAT,
            InputSlot: 0,
            AlignedByteOffset: D3D12_APPEND_ALIGNED_ELEMENT,
            InputSlotClass: D3D12_INPUT_CLASSIFICATION_PER_INSTANCE_DATA,
            InstanceDataStepRate: 1,
        },
        D3D12_INPUT_ELEMENT_DESC {
            SemanticName: windows::core::s!("COLOR"),
            SemanticIndex: 0,
            Format: DXGI_FORMAT_R32G32B32A32_FLOAT,
            InputSlot: 0,
            AlignedByteOffset: D3D12_APPEND_ALIGNED_ELEMENT,
            InputSlotClass: D3D12_INPUT_CLASSIFICATION_PER_INSTANCE_DATA,
            InstanceDataStepRate: 1,
        },
    ];

    let mut desc = D3D12_GRAPHICS_PIPELINE_STATE_DESC {
        pRootSignature: unsafe { mem::transmute_copy(root_signature) },

        VS: D3D12_SHADER_BYTECODE {
            pShaderBytecode: unsafe { vertex_shader.GetBufferPointer() },
            BytecodeLength: unsafe { vertex_shader.GetBufferSize() },
        },

        PS: D3D12_SHADER_BYTECODE {
            pShaderBytecode: unsafe { pixel_shader.GetBufferPointer() },
            BytecodeLength: unsafe { pixel_shader.GetBufferSize() },
        },

        BlendState: D3D12_BLEND_DESC {
            AlphaToCoverageEnable: false.into(),
            IndependentBlendEnable: false.into(),
            RenderTarget: [Default::default(); 8],
        },
        SampleMask: u32::MAX,
        RasterizerState: D3D12_RASTERIZER_DESC {
            FillMode: D3D12_FILL_MODE_SOLID,
            CullMode: D3D12_CULL_MODE_NONE,
            ..Default::default()
        },
        // the overlay draws over everything; depth stays untouched
        DepthStencilState: D3D12_DEPTH_STENCIL_DESC {
            DepthEnable: false.into(),
            StencilEnable: false.into(),
            ..Default::default()
        },

        InputLayout: D3D12_INPUT_LAYOUT_DESC {
            pInputElementDescs: input_layout.as_ptr(),
            NumElements: input_layout.len() as u32,
        },

        PrimitiveTopologyType: D3D12_PRIMITIVE_TOPOLOGY_TYPE_TRIANGLE,
        NumRenderTargets: 1,
        DSVFormat: DXGI_FORMAT_D32_FLOAT,
        SampleDesc: DXGI_SAMPLE_DESC {
            Count: 1,
            Quality: 0,
        },

        ..Default::default()
    };

    desc.BlendState.RenderTarget[0] = D3D12_RENDER_TARGET_BLEND_DESC {
        BlendEnable: true.into(),
        LogicOpEnable: false.into(),
        SrcBlend: D3D12_BLEND_SRC_ALPHA,
        DestBlend: D3D12_BLEND_INV_SRC_ALPHA,
        BlendOp: D3D12_BLEND_OP_ADD,
        SrcBlendAlpha: D3D12_BLEND_ONE,
        DestBlendAlpha: D3D12_BLEND_INV_SRC_ALPHA,
        BlendOpAlpha: D3D12_BLEND_OP_ADD,
        LogicOp: D3D12_LOGIC_OP_NOOP,
        RenderTargetWriteMask: D3D12_COLOR_WRITE_ENABLE_ALL.0 as u8,
    };
    desc.RTVFormats[0] = DXGI_FORMAT_R8G8B8A8_UNORM;

    unsafe { device.get().CreateGraphicsPipelineState(&desc) }
}
