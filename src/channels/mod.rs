//! Log channel implementations and the reference reader

pub mod memory;
#[cfg(unix)]
pub mod pipe;
pub mod reader;

pub use memory::{MemoryChannel, MemoryChannelReader};
#[cfg(unix)]
pub use pipe::PipeChannel;
pub use reader::{LogReader, ReceivedRecord};

pub use crate::core::LogChannel;
