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
use chrono::Utc;
use serde_json::json;
use odin_trackmap::config::FrameConfig;
use odin_trackmap::frames::*;
use odin_trackmap::renderer::{MapRenderer, RecordingRenderer};

// run with "cargo test test_cycle_wraparound -- --nocapture"

fn weather_maps (past: &[i64], nowcast: &[i64]) -> WeatherMaps {
    let refs = |ts: &[i64]| ts.iter().map( |t| json!({ "time": t, "path": format!("/v2/radar/{t}") })).collect::<Vec<_>>();
    let doc = json!({ "version": "2.0", "radar": { "past": refs(past), "nowcast": refs(nowcast) } });
    WeatherMaps::from_json( &doc).unwrap()
}

fn strip_config (frame_count: usize) -> FrameConfig {
    FrameConfig { frame_count, ..FrameConfig::default() }
}

fn frame (id: &str, time: i64) -> OverlayFrame {
    OverlayFrame { layer_id: id.to_string(), time, source_url_template: format!("https://tiles/{time}/{{z}}/{{x}}/{{y}}.png") }
}

#[test]
fn test_frame_list() {
    let list = weather_maps( &[100, 200, 300], &[400]);
    let ts = list.valid_timestamps();
    assert_eq!( ts.len(), 4);
    assert!( ts[3].is_nowcast);
    assert_eq!( list.latest_past().map( |f| f.time), Some(300));

    assert!( WeatherMaps::from_json( &json!({"version": "2.0"})).is_err());
}

#[test]
fn test_strip_selection() {
    let mut seq = FrameSequencer::new( strip_config(2));
    let frames = seq.select_frames( &weather_maps( &[100, 200, 300], &[]));

    let times: Vec<i64> = frames.iter().map( |f| f.time).collect();
    assert_eq!( times, vec![200, 300]);
    assert_eq!( frames[0].layer_id, "radar-layer-1-0");
    assert_eq!( frames[1].source_url_template, "https://tilecache.rainviewer.com/v2/radar/300/256/{z}/{x}/{y}/7/1_0.png");

    // fresh ids on every selection
    let frames = seq.select_frames( &weather_maps( &[100, 200, 300], &[]));
    assert_eq!( frames[0].layer_id, "radar-layer-2-0");

    // fewer frames than requested
    let mut seq = FrameSequencer::new( strip_config(5));
    assert_eq!( seq.select_frames( &weather_maps( &[100], &[])).len(), 1);
    assert!( seq.select_frames( &weather_maps( &[], &[])).is_empty());
}

#[test]
fn test_load_adds_transparent_frames() {
    let mut renderer = RecordingRenderer::new();
    let mut seq = FrameSequencer::new( strip_config(3));

    let tr = seq.load_list( &mut renderer, weather_maps( &[100, 200, 300], &[]));
    assert_eq!( tr.added.len(), 3);
    assert!( tr.retiring.is_empty());
    assert_eq!( seq.state(), SequencerState::Loaded);

    let first = &tr.added[0];
    assert_eq!( renderer.paint_property( first, "raster-opacity"), Some( &json!(0)));
    assert_eq!( renderer.layout_property( first, "visibility"), Some( &json!("visible")));
    assert_eq!( renderer.layout_property( &tr.added[1], "visibility"), Some( &json!("none")));

    // fade-ins are due after the settle delay
    let fade_ins: Vec<&Deferred> = tr.deferred.iter().filter( |d| matches!( d.task, FrameTask::FadeIn{..})).collect();
    assert_eq!( fade_ins.len(), 3);
    assert!( fade_ins.iter().all( |d| d.delay == Duration::from_millis(50)));

    for d in tr.deferred {
        seq.run_deferred( &mut renderer, d);
    }
    assert_eq!( renderer.paint_property( first, "raster-opacity"), Some( &json!(0.7)));
}

#[test]
fn test_reload_retires_old_frames() {
    let mut renderer = RecordingRenderer::new();
    let mut seq = FrameSequencer::new( strip_config(1));

    let tr1 = seq.load_list( &mut renderer, weather_maps( &[100], &[]));
    let tr2 = seq.load_list( &mut renderer, weather_maps( &[100, 200], &[]));
    let old = &tr1.added[0];

    assert_eq!( tr2.retiring, vec![ old.clone() ]);
    assert_eq!( renderer.paint_property( old, "raster-opacity"), Some( &json!(0)));
    assert_eq!( renderer.paint_property( old, "raster-opacity-transition"), Some( &json!({"duration": 500})));

    let retire = tr2.deferred.iter().find( |d| matches!( d.task, FrameTask::Retire{..})).cloned().unwrap();
    assert_eq!( retire.delay, Duration::from_millis(500));

    seq.run_deferred( &mut renderer, retire);
    assert!( !renderer.has_layer( old));
    assert!( !renderer.has_source( old));
    assert!( renderer.has_layer( &tr2.added[0]));
}

#[test]
fn test_retire_skipped_for_reused_layer() {
    let mut renderer = RecordingRenderer::new();
    let mut seq = FrameSequencer::new( strip_config(2));

    seq.load_frames( &mut renderer, vec![ frame("a", 1), frame("b", 2) ]);
    let tr = seq.load_frames( &mut renderer, vec![ frame("b", 2), frame("c", 3) ]);
    assert_eq!( tr.retiring, vec!["a".to_string()]);
    assert_eq!( renderer.layer_ids(), vec!["a", "b", "c"]);

    // a retire that was scheduled for "b" by some earlier transition must not remove it
    let stale = Deferred { delay: Duration::ZERO, task: FrameTask::Retire { layer_id: "b".to_string() }, generation: 0 };
    seq.run_deferred( &mut renderer, stale);
    assert!( renderer.has_layer( "b"));

    for d in tr.deferred { seq.run_deferred( &mut renderer, d); }
    assert_eq!( renderer.layer_ids(), vec!["b", "c"]);
}

#[test]
fn test_cycle_wraparound() {
    let mut renderer = RecordingRenderer::new();
    let mut seq = FrameSequencer::new( strip_config(4));
    seq.load_list( &mut renderer, weather_maps( &[100, 200, 300, 400], &[]));

    let tick = seq.play().unwrap();
    assert_eq!( tick.task, FrameTask::Tick);
    assert_eq!( tick.delay, Duration::from_millis(1500));
    assert_eq!( seq.state(), SequencerState::Playing);

    let mut resumes = 0;
    let mut last_status = None;
    for i in 0..4 {
        let (status, next) = seq.advance( &mut renderer).unwrap();
        println!("{i}: frame {} ({}) progress {:.2} -> {:?}", status.index, status.label, status.progress, next.task);
        if next.task == FrameTask::Resume {
            resumes += 1;
            assert_eq!( next.delay, Duration::ZERO); // restart 1000ms - frame 1500ms saturates
        }
        last_status = Some(status);
    }

    assert_eq!( resumes, 1);
    assert_eq!( seq.cursor().index, 0);
    assert_eq!( last_status.map( |s| s.progress), Some(0.25));

    // only the current frame is visible
    let visible: Vec<&OverlayFrame> = seq.frames().iter()
        .filter( |f| renderer.layout_property( &f.layer_id, "visibility") == Some( &json!("visible")))
        .collect();
    assert_eq!( visible.len(), 1);
    assert_eq!( visible[0].time, 100);
}

#[test]
fn test_stale_ticks_after_pause() {
    let mut renderer = RecordingRenderer::new();
    let mut seq = FrameSequencer::new( strip_config(3));
    seq.load_list( &mut renderer, weather_maps( &[100, 200, 300], &[]));

    let tick = seq.play().unwrap();
    seq.pause();
    assert_eq!( seq.state(), SequencerState::Loaded);

    let (follow_up, status) = seq.run_deferred( &mut renderer, tick.clone());
    assert!( follow_up.is_empty());
    assert!( status.is_none());
    assert_eq!( seq.cursor().index, 0);

    // a new play invalidates ticks of the previous one
    let tick2 = seq.play().unwrap();
    assert!( seq.run_deferred( &mut renderer, tick).0.is_empty());
    let (follow_up, status) = seq.run_deferred( &mut renderer, tick2);
    assert_eq!( status.map( |s| s.index), Some(1));
    assert_eq!( follow_up.len(), 1);
}

#[test]
fn test_reload_while_playing_restarts_cursor() {
    let mut renderer = RecordingRenderer::new();
    let mut seq = FrameSequencer::new( strip_config(2));
    seq.load_list( &mut renderer, weather_maps( &[100, 200], &[]));
    let tick = seq.play().unwrap();
    seq.advance( &mut renderer);

    let tr = seq.load_list( &mut renderer, weather_maps( &[200, 300], &[]));
    assert_eq!( seq.state(), SequencerState::Playing);
    assert_eq!( seq.cursor().index, 0);
    assert!( tr.deferred.iter().any( |d| d.task == FrameTask::Tick && d.generation == seq.playback_generation()));
    assert!( seq.run_deferred( &mut renderer, tick).0.is_empty());
}

#[test]
fn test_single_match_mode() {
    let mut renderer = RecordingRenderer::new();
    let config = FrameConfig { mode: FrameMode::SingleMatch, ..FrameConfig::default() };
    let mut seq = FrameSequencer::new( config);

    let tr = seq.load_list( &mut renderer, weather_maps( &[100, 200, 300], &[400]));
    assert_eq!( seq.frames().len(), 1);
    assert_eq!( seq.frames()[0].time, 300); // no target: latest past
    assert!( seq.play().is_none());
    assert!( seq.advance( &mut renderer).is_none());

    let tr = seq.set_target_time( &mut renderer, Some(400)).unwrap();
    assert_eq!( seq.frames()[0].time, 400);
    assert_eq!( tr.retiring.len(), 1);
    assert_eq!( seq.valid_timestamps().len(), 4); // list was kept

    // target between listed times still gets its own frame
    seq.set_target_time( &mut renderer, Some(250)).unwrap();
    assert_eq!( seq.frames()[0].time, 250);
}

#[test]
fn test_single_match_without_list() {
    let mut renderer = RecordingRenderer::new();
    let mut seq = FrameSequencer::new( FrameConfig { mode: FrameMode::SingleMatch, ..FrameConfig::default() });
    assert!( seq.set_target_time( &mut renderer, Some(100)).is_none());

    let mut strip = FrameSequencer::new( strip_config(1));
    assert!( strip.set_target_time( &mut renderer, Some(100)).is_none());
}

#[test]
fn test_empty_list_goes_idle() {
    let mut renderer = RecordingRenderer::new();
    let mut seq = FrameSequencer::new( strip_config(2));
    seq.load_list( &mut renderer, weather_maps( &[100], &[]));
    seq.play();

    let tr = seq.load_list( &mut renderer, weather_maps( &[], &[]));
    assert_eq!( seq.state(), SequencerState::Idle);
    assert_eq!( tr.retiring.len(), 1);
    assert!( seq.status().is_none());
}

#[test]
fn test_timestamp_labels() {
    assert_eq!( format_timestamp_in( 1736082420, &Utc), "Sun Jan 05 13:07");
    assert_eq!( expand_tile_url( "/{time}/{z}/{color}", 42, 3), "/42/{z}/3");
}
