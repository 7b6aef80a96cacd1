use windows::Win32::Graphics::Direct3D12::*;

pub fn transition_barrier(
    resource: &ID3D12Resource,
    old_state: D3D12_RESOURCE_STATES,
    new_state: D3D12_RESOURCE_STATES,
) -> D3D12_RESOURCE_BARRIER {
    D3D12_RESOURCE_BARRIER {
        Type: D3D12_RESOURCE_BARRIER_TYPE_TRANSITION,
        Flags: D3D12_RESOURCE_BARRIER_FLAG_NONE,
        Anonymous: D3D12_RESOURCE_BARRIER_0 {
            Transition: std::mem::ManuallyDrop::new(D3D12_RESOURCE_TRANSITION_BARRIER {
                pResource: unsafe { std::mem::transmute_copy(resource) },
                Subresource: D3D12_RESOURCE_BARRIER_ALL_SUBRESOURCES,
                StateBefore: old_state,
                StateAfter: new_state,
            }),
        },
    }
}

/// Back-buffer handover at the top of a frame.
pub fn present_to_render_target(back_buffer: &ID3D12Resource) -> D3D12_RESOURCE_BARRIER {
    transition_barrier(
        back_buffer,
        D3D12_RESOURCE_STATE_PRESENT,
        D3D12_RESOURCE_STATE_RENDER_TARGET,
    )
}

/// Back-buffer handover before present.
pub fn render_target_to_present(back_buffer: &ID3D12Resource) -> D3D12_RESOURCE_BARRIER {
    transition_barrier(
        back_buffer,
        D3D12_RESOURCE_STATE_RENDER_TARGET,
        D3D12_RESOURCE_STATE_PRESENT,
    )
}
