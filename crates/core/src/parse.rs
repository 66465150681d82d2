//! Pipeline parser - builds the pipeline DAG from configuration
//!
//! Construction is two-phase. First the connector graph is derived: any sink
//! whose plugin name matches a declared pipeline name becomes an edge to that
//! pipeline, sharing one [`PipelineConnector`] per target. The graph is then
//! validated (acyclic, consistent connector references, at least one sink per
//! pipeline) and pipelines are materialised in topological order, roots
//! first. Every validation error is fatal before any pipeline starts.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use weir_config::{PipelinesConfig, PluginBlock};
use weir_model::{Processor, Sink, Source};

use crate::buffer::BLOCKING_BUFFER_PLUGIN_NAME;
use crate::error::ParseError;
use crate::pipeline::{Pipeline, PipelineConnector, PipelineSettings};
use crate::registry::PluginRegistry;

/// The assembled pipelines plus their startup order
#[derive(Debug)]
pub struct BuiltPipelines {
    /// Pipelines by name
    pub pipelines: HashMap<String, Arc<Pipeline>>,

    /// Topological order, roots (externally-fed pipelines) first
    pub order: Vec<String>,
}

/// Builds pipelines from a [`PipelinesConfig`] against a plugin registry
pub struct PipelineParser<'a> {
    registry: &'a PluginRegistry,
}

impl<'a> PipelineParser<'a> {
    /// Create a parser resolving plugins from `registry`
    pub fn new(registry: &'a PluginRegistry) -> Self {
        Self { registry }
    }

    /// Build every pipeline in `config`, validating the DAG
    pub fn parse(&self, config: &PipelinesConfig) -> Result<BuiltPipelines, ParseError> {
        let names: HashSet<&str> = config.names().into_iter().collect();

        let edges = connector_edges(config, &names)?;
        validate_connector_references(config, &names, &edges)?;
        let order = topological_order(config, &edges)?;

        // One connector per target pipeline, shared by the upstream sink
        // face(s) and the downstream source face.
        let mut connectors: HashMap<String, Arc<PipelineConnector>> = HashMap::new();
        let mut connector_for = |target: &str| -> Arc<PipelineConnector> {
            Arc::clone(
                connectors
                    .entry(target.to_string())
                    .or_insert_with(|| Arc::new(PipelineConnector::new())),
            )
        };

        let mut pipelines = HashMap::with_capacity(order.len());
        for name in &order {
            let definition = config
                .get(name)
                .ok_or_else(|| ParseError::invalid(name, "pipeline disappeared during parse"))?;

            let source: Arc<dyn Source> = if names.contains(definition.source.name()) {
                let connector = connector_for(name);
                connector.set_source_pipeline(name.clone());
                connector
            } else {
                let setting = definition.source.to_setting().with_pipeline_name(name.clone());
                self.registry.create_source(&setting)?
            };

            let buffer_block = definition
                .buffer
                .clone()
                .unwrap_or_else(|| PluginBlock::bare(BLOCKING_BUFFER_PLUGIN_NAME));
            let buffer_setting = buffer_block.to_setting().with_pipeline_name(name.clone());
            let buffer = self.registry.create_buffer(&buffer_setting)?;

            // Bind at parse time so the connector link holds regardless of
            // pipeline start order.
            if names.contains(definition.source.name()) {
                connector_for(name).bind_buffer(Arc::clone(&buffer));
            }

            let mut processors: Vec<Box<dyn Processor>> =
                Vec::with_capacity(definition.processor.len());
            for block in &definition.processor {
                let setting = block.to_setting().with_pipeline_name(name.clone());
                processors.push(self.registry.create_processor(&setting)?);
            }

            let mut sinks: Vec<Arc<dyn Sink>> = Vec::with_capacity(definition.sink.len());
            for block in &definition.sink {
                if names.contains(block.name()) {
                    let connector = connector_for(block.name());
                    connector.set_sink_pipeline(name.clone());
                    sinks.push(connector);
                } else {
                    let setting = block.to_setting().with_pipeline_name(name.clone());
                    sinks.push(self.registry.create_sink(&setting)?);
                }
            }

            let settings = PipelineSettings {
                workers: definition.workers,
                read_timeout: definition.read_timeout_duration(),
                delay: definition.delay_duration(),
                ..PipelineSettings::default()
            };

            tracing::debug!(
                pipeline = %name,
                source = definition.source.name(),
                processors = processors.len(),
                sinks = sinks.len(),
                "built pipeline"
            );

            pipelines.insert(
                name.clone(),
                Arc::new(Pipeline::new(
                    name.clone(),
                    source,
                    buffer,
                    processors,
                    sinks,
                    settings,
                )),
            );
        }

        Ok(BuiltPipelines { pipelines, order })
    }
}

/// Derive connector edges (`upstream → target`) from sink blocks
fn connector_edges<'c>(
    config: &'c PipelinesConfig,
    names: &HashSet<&str>,
) -> Result<HashMap<&'c str, Vec<&'c str>>, ParseError> {
    let mut edges: HashMap<&str, Vec<&str>> = HashMap::new();
    for (name, definition) in config.iter() {
        if definition.sink.is_empty() {
            return Err(ParseError::invalid(
                name,
                "pipeline must declare at least one sink",
            ));
        }
        for sink in &definition.sink {
            let target = sink.name();
            if !names.contains(target) {
                continue;
            }
            if target == name {
                return Err(ParseError::invalid(name, "pipeline cannot sink into itself"));
            }
            edges.entry(name).or_default().push(target);
        }
    }
    Ok(edges)
}

/// Check that connector edges and connector-fed sources agree in both directions
fn validate_connector_references(
    config: &PipelinesConfig,
    names: &HashSet<&str>,
    edges: &HashMap<&str, Vec<&str>>,
) -> Result<(), ParseError> {
    for (name, definition) in config.iter() {
        let source = definition.source.name();
        if !names.contains(source) {
            continue;
        }
        if source == name {
            return Err(ParseError::invalid(
                name,
                "pipeline cannot use itself as a source",
            ));
        }
        let has_edge = edges.get(source).is_some_and(|targets| targets.contains(&name));
        if !has_edge {
            return Err(ParseError::invalid(
                name,
                format!("source references pipeline '{source}', but '{source}' has no sink targeting '{name}'"),
            ));
        }
    }

    // The reverse direction: a sink naming pipeline T only works when T reads
    // out of the shared connector, i.e. T's source is itself a pipeline
    // reference. Otherwise the connector would never be bound to T's buffer
    // and the upstream sink would fail on its first batch.
    for (name, targets) in edges {
        for target in targets {
            let fed_by_connector = config
                .get(*target)
                .is_some_and(|t| names.contains(t.source.name()));
            if !fed_by_connector {
                return Err(ParseError::invalid(
                    *name,
                    format!("sink targets pipeline '{target}', but '{target}' does not use a pipeline as its source"),
                ));
            }
        }
    }
    Ok(())
}

/// Kahn's algorithm over the connector edges; declaration order breaks ties
fn topological_order(
    config: &PipelinesConfig,
    edges: &HashMap<&str, Vec<&str>>,
) -> Result<Vec<String>, ParseError> {
    let mut in_degree: HashMap<&str, usize> =
        config.names().into_iter().map(|n| (n, 0)).collect();
    for targets in edges.values() {
        for target in targets {
            if let Some(degree) = in_degree.get_mut(target) {
                *degree += 1;
            }
        }
    }

    let mut ready: std::collections::VecDeque<&str> = config
        .names()
        .into_iter()
        .filter(|n| in_degree[n] == 0)
        .collect();
    let mut order = Vec::with_capacity(in_degree.len());

    while let Some(name) = ready.pop_front() {
        order.push(name.to_string());
        if let Some(targets) = edges.get(name) {
            for target in targets {
                if let Some(degree) = in_degree.get_mut(target) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.push_back(target);
                    }
                }
            }
        }
    }

    if order.len() != in_degree.len() {
        let mut remaining: Vec<String> = in_degree
            .keys()
            .filter(|n| !order.iter().any(|o| o == *n))
            .map(|n| n.to_string())
            .collect();
        remaining.sort_unstable();
        return Err(ParseError::CycleDetected {
            pipelines: remaining,
        });
    }

    Ok(order)
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
