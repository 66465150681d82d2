//! Weir - Core
//!
//! The pipeline execution core: the runtime that loads a declarative pipeline
//! configuration, instantiates pluggable components by name, and drives the
//! source → buffer → processor → sink dataflow under bounded concurrency.
//!
//! # Architecture
//!
//! ```text
//! [Source] --write/write_all--> [BlockingBuffer] --read (batched)--> [Workers]
//!                                     ^                                  |
//!                                     |                       processor chain
//!                                 checkpoint                            |
//!                                     |                            sink fan-out
//!                                     +---------- on success -----------+
//! ```
//!
//! # Key Design
//!
//! - **Checkpoint releases capacity, not read**: buffer slots stay reserved
//!   until the sinks have confirmed a batch, so backpressure reaches the
//!   source and delivery is at-least-once while the process lives.
//! - **Pipelines compose into a DAG**: a sink naming another pipeline becomes
//!   a [`PipelineConnector`], a dual-role plugin that is the sink of one
//!   pipeline and the source of the next. A slow downstream pipeline stalls
//!   its upstream rather than dropping records.
//! - **Ordered teardown**: the [`PipelineManager`] starts leaves first and
//!   stops roots first, so in-flight records drain toward sinks.

pub mod buffer;
pub mod error;
pub mod manager;
pub mod metrics;
pub mod parse;
pub mod pipeline;
pub mod registry;

pub use buffer::{BlockingBuffer, DEFAULT_BATCH_SIZE, DEFAULT_BUFFER_CAPACITY};
pub use error::{ParseError, StartError};
pub use manager::PipelineManager;
pub use metrics::{PipelineMetrics, PipelineMetricsHandle, PipelineMetricsSnapshot};
pub use parse::{BuiltPipelines, PipelineParser};
pub use pipeline::{Pipeline, PipelineConnector, PipelineSettings, PipelineState};
pub use registry::{
    BufferFactory, PluginRegistry, ProcessorFactory, SinkFactory, SourceFactory,
};
