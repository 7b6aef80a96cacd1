pub mod device;

pub mod barrier;
pub mod command_queue;
pub mod pix;
pub mod resource;
pub mod shader;
pub mod util;
