//! Buffer implementations
//!
//! The bounded blocking buffer is the runtime's reference buffer and the
//! default when a pipeline omits its `buffer` block. Buffer variants are a
//! closed set in the core; sources, processors, and sinks are open.

mod blocking;

pub use blocking::{
    BlockingBuffer, BlockingBufferFactory, DEFAULT_BATCH_SIZE, DEFAULT_BUFFER_CAPACITY,
    PLUGIN_NAME as BLOCKING_BUFFER_PLUGIN_NAME,
};
