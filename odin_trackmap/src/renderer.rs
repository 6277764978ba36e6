/*
 * Copyright © 2025, United States Government, as represented by the Administrator of
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

//! the map renderer capability set we drive. We never look into rendering internals - the only state we
//! query is whether a named source or layer exists.
//!
//! [`RecordingRenderer`] keeps a scene model and a log of applied commands, which makes it the test double
//! and the base of [`LoggingRenderer`] for headless runs.

use std::collections::HashMap;
use serde::Serialize;
use serde_json::{Map, Value};
use geojson::GeoJson;
use tracing::{debug,info,warn};

use crate::errors::{renderer_error, Result};

#[derive(Debug,Clone,PartialEq,Serialize)]
#[serde(tag="type")]
pub enum SourceSpec {
    #[serde(rename="geojson")]
    GeoJson { data: GeoJson },

    #[serde(rename="raster")]
    Raster { tiles: Vec<String>, #[serde(rename="tileSize")] tile_size: u32 },
}

#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize)]
#[serde(rename_all="lowercase")]
pub enum LayerKind {
    Line,
    Fill,
    Circle,
    Raster,
}

#[derive(Debug,Clone,PartialEq,Serialize)]
pub struct LayerSpec {
    pub id: String,
    #[serde(rename="type")]
    pub kind: LayerKind,
    pub source: String,
    pub layout: Map<String,Value>,
    pub paint: Map<String,Value>,
}

impl LayerSpec {
    pub fn new (id: impl ToString, kind: LayerKind, source: impl ToString) -> Self {
        LayerSpec { id: id.to_string(), kind, source: source.to_string(), layout: Map::new(), paint: Map::new() }
    }

    pub fn with_layout (mut self, prop: &str, value: Value) -> Self {
        self.layout.insert( prop.to_string(), value);
        self
    }

    pub fn with_paint (mut self, prop: &str, value: Value) -> Self {
        self.paint.insert( prop.to_string(), value);
        self
    }
}

pub trait MapRenderer {
    fn add_source (&mut self, id: &str, source: SourceSpec) -> Result<()>;
    fn add_layer (&mut self, layer: LayerSpec) -> Result<()>;
    fn set_paint_property (&mut self, layer_id: &str, prop: &str, value: Value) -> Result<()>;
    fn set_layout_property (&mut self, layer_id: &str, prop: &str, value: Value) -> Result<()>;
    fn has_source (&self, id: &str) -> bool;
    fn has_layer (&self, id: &str) -> bool;
    fn remove_layer (&mut self, id: &str) -> Result<()>;
    fn remove_source (&mut self, id: &str) -> Result<()>;
    /// replace the data of a geojson source in place
    fn set_data (&mut self, source_id: &str, data: GeoJson) -> Result<()>;
}

/// renderer failures never abort what we are doing, they only get logged
pub fn log_render_failure (res: Result<()>, what: &str) {
    if let Err(e) = res {
        warn!("renderer command failed ({what}): {e}")
    }
}

/* #region RecordingRenderer **************************************************************************************/

#[derive(Debug,Clone,PartialEq)]
pub enum RenderCommand {
    AddSource { id: String, source: SourceSpec },
    AddLayer(LayerSpec),
    SetPaintProperty { layer_id: String, prop: String, value: Value },
    SetLayoutProperty { layer_id: String, prop: String, value: Value },
    RemoveLayer(String),
    RemoveSource(String),
    SetData { source_id: String, data: GeoJson },
}

#[derive(Debug,Clone)]
struct LayerState {
    spec: LayerSpec,
    layout: Map<String,Value>,
    paint: Map<String,Value>,
}

/// scene model that rejects the same invalid commands a map widget would (duplicate ids, unknown ids,
/// layers without source, removing a source that still has layers). Only applied commands are recorded
#[derive(Debug,Default)]
pub struct RecordingRenderer {
    sources: HashMap<String,SourceSpec>,
    layers: Vec<(String,LayerState)>, // in z-order
    commands: Vec<RenderCommand>,
}

impl RecordingRenderer {
    pub fn new () -> Self { RecordingRenderer::default() }

    pub fn commands (&self) -> &[RenderCommand] { self.commands.as_slice() }

    pub fn take_commands (&mut self) -> Vec<RenderCommand> { std::mem::take( &mut self.commands) }

    pub fn layer_ids (&self) -> Vec<&str> {
        self.layers.iter().map( |(id,_)| id.as_str()).collect()
    }

    pub fn source_ids (&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.sources.keys().map( |id| id.as_str()).collect();
        ids.sort();
        ids
    }

    pub fn source (&self, id: &str) -> Option<&SourceSpec> { self.sources.get(id) }

    pub fn source_data (&self, id: &str) -> Option<&GeoJson> {
        match self.sources.get(id) {
            Some(SourceSpec::GeoJson{data}) => Some(data),
            _ => None
        }
    }

    pub fn layer (&self, id: &str) -> Option<&LayerSpec> {
        self.layer_state(id).map( |ls| &ls.spec)
    }

    /// current value of a paint property (initial spec value overridden by later set calls)
    pub fn paint_property (&self, layer_id: &str, prop: &str) -> Option<&Value> {
        self.layer_state( layer_id).and_then( |ls| ls.paint.get(prop))
    }

    pub fn layout_property (&self, layer_id: &str, prop: &str) -> Option<&Value> {
        self.layer_state( layer_id).and_then( |ls| ls.layout.get(prop))
    }

    fn layer_state (&self, id: &str) -> Option<&LayerState> {
        self.layers.iter().find( |(lid,_)| lid == id).map( |(_,ls)| ls)
    }

    fn layer_state_mut (&mut self, id: &str) -> Result<&mut LayerState> {
        self.layers.iter_mut().find( |(lid,_)| lid == id).map( |(_,ls)| ls)
            .ok_or_else( || renderer_error!("unknown layer '{id}'"))
    }
}

impl MapRenderer for RecordingRenderer {
    fn add_source (&mut self, id: &str, source: SourceSpec) -> Result<()> {
        if self.sources.contains_key(id) { return Err( renderer_error!("source '{id}' already exists")) }

        self.sources.insert( id.to_string(), source.clone());
        self.commands.push( RenderCommand::AddSource { id: id.to_string(), source });
        Ok(())
    }

    fn add_layer (&mut self, layer: LayerSpec) -> Result<()> {
        if self.has_layer( &layer.id) { return Err( renderer_error!("layer '{}' already exists", layer.id)) }
        if !self.sources.contains_key( &layer.source) { return Err( renderer_error!("layer '{}' has unknown source '{}'", layer.id, layer.source)) }

        let state = LayerState { spec: layer.clone(), layout: layer.layout.clone(), paint: layer.paint.clone() };
        self.layers.push( (layer.id.clone(), state));
        self.commands.push( RenderCommand::AddLayer( layer));
        Ok(())
    }

    fn set_paint_property (&mut self, layer_id: &str, prop: &str, value: Value) -> Result<()> {
        let ls = self.layer_state_mut( layer_id)?;
        ls.paint.insert( prop.to_string(), value.clone());
        self.commands.push( RenderCommand::SetPaintProperty { layer_id: layer_id.to_string(), prop: prop.to_string(), value });
        Ok(())
    }

    fn set_layout_property (&mut self, layer_id: &str, prop: &str, value: Value) -> Result<()> {
        let ls = self.layer_state_mut( layer_id)?;
        ls.layout.insert( prop.to_string(), value.clone());
        self.commands.push( RenderCommand::SetLayoutProperty { layer_id: layer_id.to_string(), prop: prop.to_string(), value });
        Ok(())
    }

    fn has_source (&self, id: &str) -> bool {
        self.sources.contains_key(id)
    }

    fn has_layer (&self, id: &str) -> bool {
        self.layers.iter().any( |(lid,_)| lid == id)
    }

    fn remove_layer (&mut self, id: &str) -> Result<()> {
        let idx = self.layers.iter().position( |(lid,_)| lid == id).ok_or_else( || renderer_error!("unknown layer '{id}'"))?;
        self.layers.remove( idx);
        self.commands.push( RenderCommand::RemoveLayer( id.to_string()));
        Ok(())
    }

    fn remove_source (&mut self, id: &str) -> Result<()> {
        if !self.sources.contains_key(id) { return Err( renderer_error!("unknown source '{id}'")) }
        if let Some((lid,_)) = self.layers.iter().find( |(_,ls)| ls.spec.source == id) {
            return Err( renderer_error!("source '{id}' still used by layer '{lid}'"))
        }

        self.sources.remove(id);
        self.commands.push( RenderCommand::RemoveSource( id.to_string()));
        Ok(())
    }

    fn set_data (&mut self, source_id: &str, data: GeoJson) -> Result<()> {
        match self.sources.get_mut( source_id) {
            Some(SourceSpec::GeoJson{data: current}) => {
                *current = data.clone();
                self.commands.push( RenderCommand::SetData { source_id: source_id.to_string(), data });
                Ok(())
            }
            Some(_) => Err( renderer_error!("source '{source_id}' is not a geojson source")),
            None => Err( renderer_error!("unknown source '{source_id}'"))
        }
    }
}

/* #endregion RecordingRenderer */

/* #region LoggingRenderer ****************************************************************************************/

/// decorator that reports every renderer command through `tracing` before passing it on
pub struct LoggingRenderer<R: MapRenderer = RecordingRenderer> {
    inner: R,
}

impl LoggingRenderer<RecordingRenderer> {
    pub fn new () -> Self {
        LoggingRenderer { inner: RecordingRenderer::new() }
    }
}

impl<R: MapRenderer> LoggingRenderer<R> {
    pub fn wrap (inner: R) -> Self {
        LoggingRenderer { inner }
    }

    pub fn inner (&self) -> &R { &self.inner }

    pub fn into_inner (self) -> R { self.inner }
}

impl<R: MapRenderer> MapRenderer for LoggingRenderer<R> {
    fn add_source (&mut self, id: &str, source: SourceSpec) -> Result<()> {
        match &source {
            SourceSpec::GeoJson{..} => info!("add geojson source '{id}'"),
            SourceSpec::Raster{tiles,..} => info!("add raster source '{id}': {tiles:?}"),
        }
        self.inner.add_source( id, source)
    }

    fn add_layer (&mut self, layer: LayerSpec) -> Result<()> {
        info!("add {:?} layer '{}' on source '{}'", layer.kind, layer.id, layer.source);
        self.inner.add_layer( layer)
    }

    fn set_paint_property (&mut self, layer_id: &str, prop: &str, value: Value) -> Result<()> {
        debug!("set paint '{layer_id}'.{prop} = {value}");
        self.inner.set_paint_property( layer_id, prop, value)
    }

    fn set_layout_property (&mut self, layer_id: &str, prop: &str, value: Value) -> Result<()> {
        debug!("set layout '{layer_id}'.{prop} = {value}");
        self.inner.set_layout_property( layer_id, prop, value)
    }

    fn has_source (&self, id: &str) -> bool { self.inner.has_source(id) }

    fn has_layer (&self, id: &str) -> bool { self.inner.has_layer(id) }

    fn remove_layer (&mut self, id: &str) -> Result<()> {
        info!("remove layer '{id}'");
        self.inner.remove_layer( id)
    }

    fn remove_source (&mut self, id: &str) -> Result<()> {
        info!("remove source '{id}'");
        self.inner.remove_source( id)
    }

    fn set_data (&mut self, source_id: &str, data: GeoJson) -> Result<()> {
        let n = match &data {
            GeoJson::FeatureCollection(fc) => fc.features.len(),
            _ => 1
        };
        info!("set data of '{source_id}' ({n} features)");
        self.inner.set_data( source_id, data)
    }
}

/* #endregion LoggingRenderer */
