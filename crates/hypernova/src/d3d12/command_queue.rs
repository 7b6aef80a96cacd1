use std::collections::VecDeque;

use tracing::error;
use windows::{
    core::Interface,
    Win32::{
        Foundation::{CloseHandle, HANDLE},
        Graphics::Direct3D12::*,
        System::Threading::{CreateEventA, WaitForSingleObject, INFINITE},
    },
};

use super::util::set_name_str;
use crate::frame::FenceValue;

pub struct CommandQueue {
    command_list_type: D3D12_COMMAND_LIST_TYPE,
    command_queue: ID3D12CommandQueue,

    // backing memory for recorded commands; an allocator retired here must
    // not be reset until the submission that used it has passed its fence
    allocators: VecDeque<RetiredAllocator>,

    // command lists are recyclable as soon as they are executed
    command_lists: VecDeque<ID3D12GraphicsCommandList>,

    device: ID3D12Device2,

    // sync objects
    fence: ID3D12Fence,
    fence_event: HANDLE,
    fence_value: FenceValue,

    name: String,
}

impl CommandQueue {
    pub fn build(
        device: &ID3D12Device2,
        command_list_type: D3D12_COMMAND_LIST_TYPE,
        name: &str,
    ) -> windows::core::Result<Self> {
        let desc = D3D12_COMMAND_QUEUE_DESC {
            Type: command_list_type,
            Priority: D3D12_COMMAND_QUEUE_PRIORITY_NORMAL.0,
            Flags: D3D12_COMMAND_QUEUE_FLAG_NONE,
            NodeMask: 0,
        };
        let command_queue: ID3D12CommandQueue = unsafe { device.CreateCommandQueue(&desc) }?;
        set_name_str(&command_queue, name)?;

        let fence_value = FenceValue::ZERO;
        let fence: ID3D12Fence =
            unsafe { device.CreateFence(fence_value.raw(), D3D12_FENCE_FLAG_NONE) }?;
        set_name_str(&fence, &format!("{name}::fence"))?;

        let fence_event = unsafe { CreateEventA(None, false, false, None) }?;

        Ok(Self {
            command_list_type,
            command_queue,
            allocators: Default::default(),
            command_lists: Default::default(),
            device: device.clone(),
            fence,
            fence_event,
            fence_value,
            name: name.into(),
        })
    }

    /// Hands out an allocator/list pair ready for recording. The allocator
    /// is recycled from the pool only once the submission that retired it
    /// has completed; otherwise a fresh one is created.
    pub fn request_command_ctx(&mut self) -> windows::core::Result<CommandContext> {
        let allocator = match self.allocators.pop_front() {
            Some(retired) if self.is_fence_completed(retired.fence_value) => {
                unsafe { retired.allocator.Reset() }?;
                retired.allocator
            }
            Some(retired) => {
                self.allocators.push_front(retired);
                self.create_allocator()?
            }
            None => self.create_allocator()?,
        };

        let command_list = match self.command_lists.pop_front() {
            Some(list) => {
                unsafe { list.Reset(&allocator, None) }?;
                list
            }
            None => {
                let list: ID3D12GraphicsCommandList = unsafe {
                    self.device
                        .CreateCommandList(0, self.command_list_type, &allocator, None)
                }?;
                set_name_str(&list, &format!("{}::command_list", self.name))?;
                list
            }
        };

        Ok(CommandContext {
            command_list,
            allocator,
        })
    }

    #[must_use]
    pub fn get(&self) -> &ID3D12CommandQueue {
        &self.command_queue
    }

    /// Closes and executes the recorded commands, then signals the fence.
    /// The returned value is the submission's completion target.
    pub fn execute_commands(
        &mut self,
        context: CommandContext,
    ) -> windows::core::Result<FenceValue> {
        let command_list = context.command_list;
        unsafe {
            command_list.Close()?;

            let command_lists = [Some(command_list.cast()?)];
            self.command_queue.ExecuteCommandLists(&command_lists);
        }
        self.command_lists.push_back(command_list);

        let fence_value = self.signal()?;

        self.allocators.push_back(RetiredAllocator {
            allocator: context.allocator,
            fence_value,
        });

        Ok(fence_value)
    }

    pub fn signal(&mut self) -> windows::core::Result<FenceValue> {
        let value = self.fence_value.increment();
        unsafe { self.command_queue.Signal(&self.fence, value.raw()) }?;
        Ok(value)
    }

    pub fn is_fence_completed(&self, fence_value: FenceValue) -> bool {
        let completed = unsafe { self.fence.GetCompletedValue() };
        fence_value.is_reached_by(completed)
    }

    /// Blocks until the fence reaches `fence_value`. A no-op when the value
    /// has already been passed, so callers never pay for an event
    /// round-trip on an idle slot.
    pub fn wait_fence(&self, fence_value: FenceValue) -> windows::core::Result<()> {
        if self.is_fence_completed(fence_value) {
            return Ok(());
        }

        unsafe {
            self.fence
                .SetEventOnCompletion(fence_value.raw(), self.fence_event)?;
            WaitForSingleObject(self.fence_event, INFINITE);
        }
        Ok(())
    }

    /// Drains the queue: signals, then waits for everything submitted so far.
    pub fn flush(&mut self) -> windows::core::Result<()> {
        let value = self.signal()?;
        self.wait_fence(value)
    }

    fn create_allocator(&self) -> windows::core::Result<ID3D12CommandAllocator> {
        let allocator: ID3D12CommandAllocator =
            unsafe { self.device.CreateCommandAllocator(self.command_list_type) }?;
        set_name_str(&allocator, &format!("{}::allocator", self.name))?;
        Ok(allocator)
    }
}

impl Drop for CommandQueue {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            error!("failed to drain `{}` on shutdown: {e}", self.name);
        }
        if let Err(e) = unsafe { CloseHandle(self.fence_event) } {
            error!("failed to close the fence event of `{}`: {e}", self.name);
        }
    }
}

pub struct CommandContext {
    command_list: ID3D12GraphicsCommandList,
    allocator: ID3D12CommandAllocator,
}

impl CommandContext {
    pub fn command_list(&self) -> &ID3D12GraphicsCommandList {
        &self.command_list
    }
}

struct RetiredAllocator {
    allocator: ID3D12CommandAllocator,
    fence_value: FenceValue,
}
