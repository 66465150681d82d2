//! Weir - Model
//!
//! Data model and plugin contracts shared by every Weir crate.
//!
//! # Overview
//!
//! A Weir pipeline moves [`Record`]s from a [`Source`] through a bounded
//! [`Buffer`], an ordered chain of [`Processor`]s, and finally out through one
//! or more [`Sink`]s. This crate defines those four capability contracts plus
//! the envelope types that flow between them:
//!
//! - [`Record`] - immutable payload envelope (bytes, string, or structured event)
//! - [`CheckpointState`] - acknowledgement token produced by a buffer read and
//!   returned once the batch has been handed to every sink
//! - [`PluginSetting`] - typed configuration node handed to plugin factories
//!
//! # Delivery model
//!
//! Buffers reserve capacity on write and release it only on checkpoint, so a
//! slow sink holds backpressure all the way to the source. Every record written
//! while a pipeline is running is delivered to every sink at least once, or
//! logged and dropped on processor/sink failure.

mod checkpoint;
mod plugin;
mod record;
mod setting;

pub mod buffer;
pub mod processor;
pub mod sink;
pub mod source;

pub use buffer::{Buffer, BufferError, BufferResult};
pub use checkpoint::CheckpointState;
pub use plugin::{PluginError, PluginKind, PluginResult};
pub use processor::{Processor, ProcessorError, ProcessorResult};
pub use record::{Record, RecordData};
pub use setting::PluginSetting;
pub use sink::{Sink, SinkError, SinkResult};
pub use source::{Source, SourceError, SourceResult, SourceTask};
