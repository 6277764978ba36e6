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

//! geojson layers we publish. Each publish function creates its source and layers on first use and only
//! replaces the source data afterwards

use serde_json::json;
use geojson::{Feature, FeatureCollection, GeoJson, Geometry};
use odin_geo::GeoPoint;

use crate::errors::Result;
use crate::renderer::{LayerKind, LayerSpec, MapRenderer, SourceSpec};
use crate::track::InterpolatedPath;
use crate::coverage::CoverageFootprint;
use crate::ais::AisStore;

pub const ROUTE_SOURCE: &str = "route";
pub const ROUTE_OUTLINE_LAYER: &str = "route-layer-outline";
pub const ROUTE_LAYER: &str = "route-layer";

pub const POSITION_SOURCE: &str = "uav-position";
pub const POSITION_LAYER: &str = "uav-position-layer";

pub const COVERAGE_SOURCE: &str = "camera-fov";
pub const COVERAGE_LAYER: &str = "camera-fov-fill";
pub const SIGHT_LINE_SOURCE: &str = "camera-fov-line";
pub const SIGHT_LINE_LAYER: &str = "camera-fov-line-layer";

pub const FRAME_POLYGON_SOURCE: &str = "frame-polygon";
pub const FRAME_POLYGON_LAYER: &str = "frame-polygon-fill";

pub const AIS_SOURCE: &str = "ais";
pub const AIS_LAYER: &str = "ais-layer";

/// set data of an existing geojson source, or create source and layers
pub fn upsert_geojson_source (renderer: &mut dyn MapRenderer, source_id: &str, data: GeoJson, layers: impl FnOnce()->Vec<LayerSpec>) -> Result<()> {
    if renderer.has_source( source_id) {
        renderer.set_data( source_id, data)
    } else {
        renderer.add_source( source_id, SourceSpec::GeoJson { data })?;
        for layer in layers() {
            renderer.add_layer( layer)?;
        }
        Ok(())
    }
}

fn rounded_line (id: &str, source: &str, color: &str, width: u32) -> LayerSpec {
    LayerSpec::new( id, LayerKind::Line, source)
        .with_layout( "line-cap", json!("round"))
        .with_layout( "line-join", json!("round"))
        .with_paint( "line-color", json!(color))
        .with_paint( "line-width", json!(width))
}

pub fn publish_route (renderer: &mut dyn MapRenderer, path: &InterpolatedPath) -> Result<()> {
    upsert_geojson_source( renderer, ROUTE_SOURCE, path.to_geojson(), || vec![
        rounded_line( ROUTE_OUTLINE_LAYER, ROUTE_SOURCE, "#212d4f", 10),
        rounded_line( ROUTE_LAYER, ROUTE_SOURCE, "#6084eb", 8),
    ])
}

pub fn point_feature (p: &GeoPoint, properties: serde_json::Map<String,serde_json::Value>) -> Feature {
    let geometry = Geometry::new( geojson::Value::Point( p.to_position()));
    Feature { bbox: None, geometry: Some(geometry), id: None, properties: Some(properties), foreign_members: None }
}

pub fn feature_collection (features: Vec<Feature>) -> GeoJson {
    GeoJson::FeatureCollection( FeatureCollection { bbox: None, features, foreign_members: None })
}

pub fn publish_position (renderer: &mut dyn MapRenderer, p: &GeoPoint) -> Result<()> {
    let data = feature_collection( vec![ point_feature( p, serde_json::Map::new()) ]);
    upsert_geojson_source( renderer, POSITION_SOURCE, data, || vec![
        LayerSpec::new( POSITION_LAYER, LayerKind::Circle, POSITION_SOURCE)
            .with_paint( "circle-radius", json!(8))
            .with_paint( "circle-color", json!("#6084eb"))
            .with_paint( "circle-stroke-width", json!(2))
            .with_paint( "circle-stroke-color", json!("#ffffff"))
    ])
}

/// frustum footprints go to the camera-fov sources (fill and sight line), circle fits to the frame polygon
pub fn publish_coverage (renderer: &mut dyn MapRenderer, footprint: &CoverageFootprint) -> Result<()> {
    if footprint.circle().is_some() {
        upsert_geojson_source( renderer, FRAME_POLYGON_SOURCE, footprint.to_geojson(), || vec![
            LayerSpec::new( FRAME_POLYGON_LAYER, LayerKind::Fill, FRAME_POLYGON_SOURCE)
                .with_paint( "fill-color", json!("#FFFF00"))
                .with_paint( "fill-opacity", json!(0.25))
        ])

    } else {
        upsert_geojson_source( renderer, COVERAGE_SOURCE, footprint.to_geojson(), || vec![
            LayerSpec::new( COVERAGE_LAYER, LayerKind::Fill, COVERAGE_SOURCE)
                .with_paint( "fill-color", json!("#3377ff"))
                .with_paint( "fill-opacity", json!(0.3))
        ])?;
        upsert_geojson_source( renderer, SIGHT_LINE_SOURCE, footprint.sight_line_geojson(), || vec![
            LayerSpec::new( SIGHT_LINE_LAYER, LayerKind::Line, SIGHT_LINE_SOURCE)
                .with_paint( "line-color", json!("#3377ff"))
                .with_paint( "line-width", json!(2))
                .with_paint( "line-dasharray", json!([2,2]))
        ])
    }
}

pub fn publish_ais (renderer: &mut dyn MapRenderer, store: &AisStore) -> Result<()> {
    upsert_geojson_source( renderer, AIS_SOURCE, store.to_feature_collection(), || vec![
        LayerSpec::new( AIS_LAYER, LayerKind::Circle, AIS_SOURCE)
            .with_paint( "circle-radius", json!(6))
            .with_paint( "circle-color", json!([ "case", ["get", "selected"], "#ff9900", "#00a3cc" ]))
    ])
}
