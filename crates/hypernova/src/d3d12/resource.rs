use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::Common::*;

use super::barrier;
use super::device::Device;
use super::util::set_name_str;
use crate::frame::aligned_size;

pub fn heap_properties(heap_type: D3D12_HEAP_TYPE) -> D3D12_HEAP_PROPERTIES {
    D3D12_HEAP_PROPERTIES {
        Type: heap_type,
        CPUPageProperty: D3D12_CPU_PAGE_PROPERTY_UNKNOWN,
        MemoryPoolPreference: D3D12_MEMORY_POOL_UNKNOWN,
        CreationNodeMask: 1,
        VisibleNodeMask: 1,
    }
}

pub fn buffer_desc(buffer_size: u64, flags: D3D12_RESOURCE_FLAGS) -> D3D12_RESOURCE_DESC {
    D3D12_RESOURCE_DESC {
        Dimension: D3D12_RESOURCE_DIMENSION_BUFFER,
        Alignment: 0,
        Width: buffer_size,
        Height: 1,
        DepthOrArraySize: 1,
        MipLevels: 1,
        Format: DXGI_FORMAT_UNKNOWN,
        SampleDesc: DXGI_SAMPLE_DESC {
            Count: 1,
            Quality: 0,
        },
        Layout: D3D12_TEXTURE_LAYOUT_ROW_MAJOR,
        Flags: flags,
    }
}

pub fn texture2d_desc(
    format: DXGI_FORMAT,
    width: u64,
    height: u32,
    flags: D3D12_RESOURCE_FLAGS,
) -> D3D12_RESOURCE_DESC {
    D3D12_RESOURCE_DESC {
        Dimension: D3D12_RESOURCE_DIMENSION_TEXTURE2D,
        Alignment: 0,
        Width: width,
        Height: height,
        DepthOrArraySize: 1,
        MipLevels: 1,
        Format: format,
        SampleDesc: DXGI_SAMPLE_DESC {
            Count: 1,
            Quality: 0,
        },
        Layout: D3D12_TEXTURE_LAYOUT_UNKNOWN,
        Flags: flags,
    }
}

pub fn create_buffer<T>(
    device: &Device,
    size: u64,
    init_data: Option<&[T]>,
    heap_type: D3D12_HEAP_TYPE,
    flags: D3D12_RESOURCE_FLAGS,
    name: &str,
) -> windows::core::Result<ID3D12Resource> {
    let properties = heap_properties(heap_type);
    let desc = buffer_desc(size, flags);
    let mut dst: Option<ID3D12Resource> = None;
    unsafe {
        device.get().CreateCommittedResource(
            &properties,
            D3D12_HEAP_FLAG_NONE,
            &desc,
            D3D12_RESOURCE_STATE_COMMON,
            None,
            &mut dst,
        )
    }?;
    let dst = dst.expect("CreateCommittedResource returned no buffer");

    if let Some(init_data) = init_data {
        let mut data = std::ptr::null_mut();
        unsafe {
            dst.Map(0, None, Some(&mut data))?;
            std::ptr::copy_nonoverlapping(init_data.as_ptr(), data as *mut T, init_data.len());
            dst.Unmap(0, None);
        }
    }

    set_name_str(&dst, name)?;

    Ok(dst)
}

/// Persistently mapped upload-heap buffer for data the CPU rewrites every
/// frame (constant regions, overlay vertices). One instance exists per
/// frame slot; the presenter's wait contract keeps writes from racing the
/// GPU's reads.
pub struct UploadBuffer {
    resource: ID3D12Resource,
    ptr: *mut u8,
    size: usize,
}

impl UploadBuffer {
    pub fn build(device: &Device, size: usize, name: &str) -> windows::core::Result<Self> {
        let resource = create_buffer::<u8>(
            device,
            size as u64,
            None,
            D3D12_HEAP_TYPE_UPLOAD,
            D3D12_RESOURCE_FLAG_NONE,
            name,
        )?;

        // empty read range: the CPU only ever writes through this mapping
        let read_range = D3D12_RANGE { Begin: 0, End: 0 };
        let mut ptr = std::ptr::null_mut();
        unsafe { resource.Map(0, Some(&read_range), Some(&mut ptr)) }?;

        Ok(Self {
            resource,
            ptr: ptr as *mut u8,
            size,
        })
    }

    pub fn write<T: Copy>(&mut self, offset: usize, value: &T) {
        self.write_bytes(offset, unsafe {
            std::slice::from_raw_parts((value as *const T).cast(), std::mem::size_of::<T>())
        });
    }

    pub fn write_slice<T: Copy>(&mut self, offset: usize, values: &[T]) {
        self.write_bytes(offset, unsafe {
            std::slice::from_raw_parts(values.as_ptr().cast(), std::mem::size_of_val(values))
        });
    }

    fn write_bytes(&mut self, offset: usize, bytes: &[u8]) {
        assert!(
            offset + bytes.len() <= self.size,
            "write of {} bytes at {offset} exceeds the {}-byte region",
            bytes.len(),
            self.size
        );
        unsafe { std::ptr::copy_nonoverlapping(bytes.as_ptr(), self.ptr.add(offset), bytes.len()) };
    }

    pub fn gpu_address(&self) -> u64 {
        unsafe { self.resource.GetGPUVirtualAddress() }
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

impl Drop for UploadBuffer {
    fn drop(&mut self) {
        unsafe { self.resource.Unmap(0, None) };
    }
}

/// Creates a default-heap texture and fills it from `pixels` through a
/// row-pitch-aligned staging buffer on the gfx queue, leaving the texture
/// in the pixel-shader-resource state. Blocks until the copy completes.
pub fn create_texture2d_with_data(
    device: &mut Device,
    format: DXGI_FORMAT,
    width: u32,
    height: u32,
    bytes_per_pixel: usize,
    pixels: &[u8],
    name: &str,
) -> windows::core::Result<ID3D12Resource> {
    let row_bytes = width as usize * bytes_per_pixel;
    assert_eq!(pixels.len(), row_bytes * height as usize);

    let properties = heap_properties(D3D12_HEAP_TYPE_DEFAULT);
    let desc = texture2d_desc(format, width.into(), height, D3D12_RESOURCE_FLAG_NONE);

    let mut texture: Option<ID3D12Resource> = None;
    unsafe {
        device.get().CreateCommittedResource(
            &properties,
            D3D12_HEAP_FLAG_NONE,
            &desc,
            D3D12_RESOURCE_STATE_COPY_DEST,
            None,
            &mut texture,
        )
    }?;
    let texture = texture.expect("CreateCommittedResource returned no texture");
    set_name_str(&texture, name)?;

    // texture rows in an upload heap start on 256-byte pitches
    let row_pitch = aligned_size(row_bytes);
    let mut staging = UploadBuffer::build(
        device,
        row_pitch * height as usize,
        &format!("{name}::staging"),
    )?;
    for y in 0..height as usize {
        staging.write_slice(y * row_pitch, &pixels[y * row_bytes..(y + 1) * row_bytes]);
    }

    let src = D3D12_TEXTURE_COPY_LOCATION {
        pResource: unsafe { std::mem::transmute_copy(&staging.resource) },
        Type: D3D12_TEXTURE_COPY_TYPE_PLACED_FOOTPRINT,
        Anonymous: D3D12_TEXTURE_COPY_LOCATION_0 {
            PlacedFootprint: D3D12_PLACED_SUBRESOURCE_FOOTPRINT {
                Offset: 0,
                Footprint: D3D12_SUBRESOURCE_FOOTPRINT {
                    Format: format,
                    Width: width,
                    Height: height,
                    Depth: 1,
                    RowPitch: row_pitch as u32,
                },
            },
        },
    };
    let dst = D3D12_TEXTURE_COPY_LOCATION {
        pResource: unsafe { std::mem::transmute_copy(&texture) },
        Type: D3D12_TEXTURE_COPY_TYPE_SUBRESOURCE_INDEX,
        Anonymous: D3D12_TEXTURE_COPY_LOCATION_0 {
            SubresourceIndex: 0,
        },
    };

    // the copy runs on the gfx queue so the same command list can hand the
    // texture over to the pixel shader
    let ctx = device.request_gfx_command_ctx()?;
    let command_list = ctx.command_list();
    unsafe { command_list.CopyTextureRegion(&dst, 0, 0, 0, &src, None) };

    let barriers = [barrier::transition_barrier(
        &texture,
        D3D12_RESOURCE_STATE_COPY_DEST,
        D3D12_RESOURCE_STATE_PIXEL_SHADER_RESOURCE,
    )];
    unsafe { command_list.ResourceBarrier(&barriers) };

    let queue = device.gfx_command_queue_mut();
    let fence_value = queue.execute_commands(ctx)?;
    queue.wait_fence(fence_value)?;

    Ok(texture)
}
