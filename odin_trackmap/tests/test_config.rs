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
#![allow(unused)]

use std::time::Duration;
use serde_json::json;
use uom::si::length::meter;
use odin_trackmap::config::{load_config, TrackMapConfig};
use odin_trackmap::coverage::CoverageStrategy;
use odin_trackmap::frames::FrameMode;
use odin_trackmap::renderer::{LayerKind, LayerSpec, MapRenderer, RecordingRenderer, SourceSpec};
use odin_trackmap::layers::feature_collection;

// run with "cargo test test_load_config -- --nocapture"

#[test]
fn test_load_config() {
    let config = load_config( "configs/trackmap.ron").unwrap();
    println!("{config:#?}");

    assert_eq!( config.route_interval, Duration::from_secs(5));
    assert_eq!( config.frames.frame_delay, Duration::from_millis(1500));
    assert_eq!( config.frames.refresh_interval, Duration::from_secs(300));
    assert_eq!( config.coverage.fallback_range.get::<meter>(), 10_000.0);
    assert_eq!( config.frames.tile_size, 256); // not in the file
}

#[test]
fn test_partial_config() {
    let config: TrackMapConfig = ron::from_str( r#"(
        ais_interval: "1min",
        coverage: ( strategy: CornerCircle ),
        frames: ( mode: SingleMatch, target_time: Some(1736082420) ),
    )"#).unwrap();

    assert_eq!( config.ais_interval, Duration::from_secs(60));
    assert_eq!( config.uav_interval, Duration::from_secs(5));
    assert_eq!( config.coverage.strategy, CoverageStrategy::CornerCircle);
    assert_eq!( config.coverage.circle_segments, 60);
    assert_eq!( config.frames.mode, FrameMode::SingleMatch);
    assert_eq!( config.frames.target_time, Some(1736082420));

    assert!( ron::from_str::<TrackMapConfig>( r#"( route_interval: "soon" )"#).is_err());
}

#[test]
fn test_recording_renderer_rejects() {
    let mut r = RecordingRenderer::new();
    let data = feature_collection( Vec::new());

    assert!( r.add_layer( LayerSpec::new( "l", LayerKind::Line, "s")).is_err()); // no source
    r.add_source( "s", SourceSpec::GeoJson { data: data.clone() }).unwrap();
    assert!( r.add_source( "s", SourceSpec::GeoJson { data: data.clone() }).is_err());

    r.add_layer( LayerSpec::new( "l", LayerKind::Line, "s").with_paint( "line-width", json!(2))).unwrap();
    assert!( r.remove_source( "s").is_err()); // still in use
    assert!( r.set_paint_property( "nope", "line-width", json!(1)).is_err());

    r.add_source( "tiles", SourceSpec::Raster { tiles: vec!["https://t/{z}/{x}/{y}".to_string()], tile_size: 256 }).unwrap();
    assert!( r.set_data( "tiles", data.clone()).is_err());

    r.remove_layer( "l").unwrap();
    r.remove_source( "s").unwrap();
    assert_eq!( r.source_ids(), vec!["tiles"]);
    assert_eq!( r.commands().len(), 5); // only applied commands
}
