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

//! time indexed raster overlay frames (weather radar tiles) and their add/retire/playback lifecycle.
//!
//! The [`FrameSequencer`] does not own any timers. Every operation that needs something to happen later returns
//! [`Deferred`] tasks which the owner has to schedule and feed back through [`FrameSequencer::run_deferred`].
//! This keeps the sequencer deterministic - tests can run the deferred tasks directly.

use std::{collections::HashSet, time::Duration};
use chrono::{Local, TimeZone};
use serde::{Serialize,Deserialize};
use serde_json::{json, Value};
use tracing::{debug,info};

use crate::config::FrameConfig;
use crate::errors::{malformed, Result};
use crate::renderer::{log_render_failure, LayerKind, LayerSpec, MapRenderer, SourceSpec};

/* #region upstream frame list ************************************************************************************/

/// RainViewer style `weather-maps.json` document
#[derive(Debug,Clone,Default,PartialEq,Serialize,Deserialize)]
pub struct WeatherMaps {
    pub radar: RadarFrames,
}

#[derive(Debug,Clone,Default,PartialEq,Serialize,Deserialize)]
pub struct RadarFrames {
    #[serde(default)]
    pub past: Vec<RadarFrameRef>,
    #[serde(default)]
    pub nowcast: Vec<RadarFrameRef>,
}

#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct RadarFrameRef {
    /// epoch seconds
    pub time: i64,
    #[serde(default)]
    pub path: Option<String>,
}

/// entry of the timeline a selector can choose from
#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize)]
pub struct RadarTimestamp {
    pub time: i64,
    #[serde(rename="isNowcast")]
    pub is_nowcast: bool,
}

impl WeatherMaps {
    pub fn from_json (doc: &Value) -> Result<WeatherMaps> {
        if doc.get("radar").is_none() { return Err( malformed!("frame list without 'radar'")) }
        Ok( WeatherMaps::deserialize( doc)?)
    }

    pub fn valid_timestamps (&self) -> Vec<RadarTimestamp> {
        let past = self.radar.past.iter().map( |f| RadarTimestamp { time: f.time, is_nowcast: false });
        let nowcast = self.radar.nowcast.iter().map( |f| RadarTimestamp { time: f.time, is_nowcast: true });
        past.chain( nowcast).collect()
    }

    pub fn latest_past (&self) -> Option<&RadarFrameRef> {
        self.radar.past.last()
    }
}

/* #endregion upstream frame list */

/* #region frames and sequencer state *****************************************************************************/

/// a frame as it is known to the renderer - `layer_id` is used for both the layer and its raster source
#[derive(Debug,Clone,PartialEq,Eq,Serialize)]
pub struct OverlayFrame {
    pub layer_id: String,
    pub time: i64,
    pub source_url_template: String,
}

#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize,Deserialize)]
pub enum FrameMode {
    Strip,
    SingleMatch,
}

/// how new frame lists are reconciled with what is shown
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum SequencerMode {
    /// the last `frame_count` past frames, stepped through by the playback cursor
    Strip,
    /// exactly one frame for a target time (latest past frame if there is none)
    SingleMatch { target: Option<i64> },
}

impl SequencerMode {
    pub fn from_config (config: &FrameConfig) -> Self {
        match config.mode {
            FrameMode::Strip => SequencerMode::Strip,
            FrameMode::SingleMatch => SequencerMode::SingleMatch { target: config.target_time },
        }
    }
}

#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum SequencerState {
    Idle,
    Loaded,
    Playing,
}

#[derive(Debug,Clone,Copy,PartialEq,Eq,Default)]
pub struct PlaybackCursor {
    pub index: usize,
    pub running: bool,
}

#[derive(Debug,Clone,PartialEq,Eq)]
pub enum FrameTask {
    /// raise a freshly added layer to the target opacity
    FadeIn { layer_id: String },
    /// remove a faded out layer and its source
    Retire { layer_id: String },
    /// advance the playback cursor
    Tick,
    /// end of the wraparound pause
    Resume,
}

/// a task the owner has to run after `delay`. Playback tasks (`Tick`, `Resume`) are only valid for the
/// playback generation they were issued under, fade tasks are checked against the current frame set instead
#[derive(Debug,Clone,PartialEq,Eq)]
pub struct Deferred {
    pub delay: Duration,
    pub task: FrameTask,
    pub generation: u64,
}

/// what a load did, plus the tasks to schedule
#[derive(Debug,Clone,Default)]
pub struct Transition {
    pub added: Vec<String>,
    pub retiring: Vec<String>,
    pub deferred: Vec<Deferred>,
}

/// what the UI shows for the current frame
#[derive(Debug,Clone,PartialEq,Serialize)]
pub struct PlaybackStatus {
    pub index: usize,
    pub time: i64,
    /// `(index+1)/frame_count` for a progress indicator
    pub progress: f64,
    pub label: String,
}

/// owner of the visible frame list and the playback cursor
#[derive(Debug)]
pub struct FrameSequencer {
    config: FrameConfig,
    mode: SequencerMode,
    state: SequencerState,
    frames: Vec<OverlayFrame>,
    cursor: PlaybackCursor,
    load_count: u64,
    playback_generation: u64,
    last_list: Option<WeatherMaps>,
}

impl FrameSequencer {
    pub fn new (config: FrameConfig) -> Self {
        let mode = SequencerMode::from_config( &config);
        FrameSequencer {
            config,
            mode,
            state: SequencerState::Idle,
            frames: Vec::new(),
            cursor: PlaybackCursor::default(),
            load_count: 0,
            playback_generation: 0,
            last_list: None,
        }
    }

    pub fn mode (&self) -> SequencerMode { self.mode }

    /// takes effect with the next load
    pub fn set_mode (&mut self, mode: SequencerMode) { self.mode = mode }

    pub fn state (&self) -> SequencerState { self.state }

    pub fn frames (&self) -> &[OverlayFrame] { self.frames.as_slice() }

    pub fn cursor (&self) -> PlaybackCursor { self.cursor }

    pub fn current_frame (&self) -> Option<&OverlayFrame> { self.frames.get( self.cursor.index) }

    pub fn playback_generation (&self) -> u64 { self.playback_generation }

    pub fn last_list (&self) -> Option<&WeatherMaps> { self.last_list.as_ref() }

    pub fn valid_timestamps (&self) -> Vec<RadarTimestamp> {
        self.last_list.as_ref().map( |l| l.valid_timestamps()).unwrap_or_default()
    }

    pub fn tile_url (&self, time: i64) -> String {
        expand_tile_url( &self.config.tile_url_template, time, self.config.color_scheme)
    }

    /// turn an upstream list into frames according to the current mode. Each call allocates fresh layer ids
    pub fn select_frames (&mut self, list: &WeatherMaps) -> Vec<OverlayFrame> {
        self.load_count += 1;
        let prefix = &self.config.layer_prefix;
        let seq = self.load_count;

        let times: Vec<i64> = match self.mode {
            SequencerMode::Strip => {
                let past = &list.radar.past;
                let n = self.config.frame_count.min( past.len());
                past[past.len()-n..].iter().map( |f| f.time).collect()
            }
            SequencerMode::SingleMatch { target: Some(target) } => {
                // the tile service is addressed by timestamp so a target outside the list still gets a frame
                vec![target]
            }
            SequencerMode::SingleMatch { target: None } => {
                list.latest_past().map( |f| vec![f.time]).unwrap_or_default()
            }
        };

        times.into_iter().enumerate().map( |(i,time)| OverlayFrame {
            layer_id: format!("{prefix}-{seq}-{i}"),
            time,
            source_url_template: self.tile_url( time),
        }).collect()
    }

    /// select and load frames from a freshly fetched list, which is kept for later target changes
    pub fn load_list (&mut self, renderer: &mut dyn MapRenderer, list: WeatherMaps) -> Transition {
        let frames = self.select_frames( &list);
        self.last_list = Some(list);
        self.load_frames( renderer, frames)
    }

    /// replace the visible frame set. New frames are added transparent and faded in after the settle delay,
    /// frames of the previous set are faded out and removed after the fade-out delay. Frames that are part
    /// of both sets (same layer id) stay untouched in the renderer
    pub fn load_frames (&mut self, renderer: &mut dyn MapRenderer, frames: Vec<OverlayFrame>) -> Transition {
        let mut transition = Transition::default();
        let fade_in = self.config.fade_in.as_millis() as u64;
        let fade_out = self.config.fade_out.as_millis() as u64;
        let is_strip = self.mode == SequencerMode::Strip;

        let new_ids: HashSet<&str> = frames.iter().map( |f| f.layer_id.as_str()).collect();
        let old_frames = std::mem::take( &mut self.frames);

        for (i, frame) in frames.iter().enumerate() {
            let id = frame.layer_id.as_str();
            let visibility = if !is_strip || i == 0 { "visible" } else { "none" };

            if !renderer.has_source( id) {
                let source = SourceSpec::Raster { tiles: vec![frame.source_url_template.clone()], tile_size: self.config.tile_size };
                log_render_failure( renderer.add_source( id, source), "add frame source");
            }
            if !renderer.has_layer( id) {
                let layer = LayerSpec::new( id, LayerKind::Raster, id)
                    .with_layout( "visibility", json!(visibility))
                    .with_paint( "raster-opacity", json!(0));
                log_render_failure( renderer.add_layer( layer), "add frame layer");
            } else {
                log_render_failure( renderer.set_layout_property( id, "visibility", json!(visibility)), "frame visibility");
            }
            log_render_failure( renderer.set_paint_property( id, "raster-opacity-transition", json!({"duration": fade_in})), "frame fade-in");

            transition.added.push( id.to_string());
            transition.deferred.push( Deferred {
                delay: self.config.settle_delay,
                task: FrameTask::FadeIn { layer_id: id.to_string() },
                generation: self.playback_generation
            });
        }

        for old in old_frames.iter().filter( |f| !new_ids.contains( f.layer_id.as_str())) {
            let id = old.layer_id.as_str();
            if renderer.has_layer( id) {
                log_render_failure( renderer.set_paint_property( id, "raster-opacity-transition", json!({"duration": fade_out})), "frame fade-out");
                log_render_failure( renderer.set_paint_property( id, "raster-opacity", json!(0)), "frame fade-out");

                transition.retiring.push( id.to_string());
                transition.deferred.push( Deferred {
                    delay: self.config.fade_out,
                    task: FrameTask::Retire { layer_id: id.to_string() },
                    generation: self.playback_generation
                });
            }
        }

        self.frames = frames;
        self.cursor.index = 0;

        if self.frames.is_empty() {
            self.state = SequencerState::Idle;
            self.cursor.running = false;
            self.playback_generation += 1;

        } else if self.state == SequencerState::Playing && is_strip {
            // restart the cursor on the new set
            self.playback_generation += 1;
            transition.deferred.push( self.tick_after( self.config.frame_delay));

        } else {
            if self.state == SequencerState::Playing {
                // no cursor outside of strip mode
                self.playback_generation += 1;
                self.cursor.running = false;
            }
            self.state = SequencerState::Loaded;
        }

        if let Some(frame) = self.frames.first() {
            info!("loaded {} overlay frame(s), first at {} ({} retiring)", self.frames.len(), format_timestamp( frame.time), transition.retiring.len());
        }
        transition
    }

    /// re-resolve the single-match frame from the last loaded list without fetching. Returns `None` if we are
    /// not in single-match mode or have no list yet
    pub fn set_target_time (&mut self, renderer: &mut dyn MapRenderer, target: Option<i64>) -> Option<Transition> {
        if let SequencerMode::SingleMatch{..} = self.mode {
            self.mode = SequencerMode::SingleMatch { target };
            let list = self.last_list.take()?;
            Some( self.load_list( renderer, list))
        } else {
            None
        }
    }

    /// start the playback cursor (strip mode with frames only). Returns the first tick to schedule
    pub fn play (&mut self) -> Option<Deferred> {
        if self.mode != SequencerMode::Strip || self.frames.is_empty() { return None }

        self.playback_generation += 1;
        self.state = SequencerState::Playing;
        self.cursor.running = true;
        Some( self.tick_after( self.config.frame_delay))
    }

    /// stop the cursor. Pending ticks become stale
    pub fn pause (&mut self) {
        self.playback_generation += 1;
        self.cursor.running = false;
        if self.state == SequencerState::Playing {
            self.state = SequencerState::Loaded;
        }
    }

    /// hide the current frame, show the next one and return its status together with the next playback task.
    /// If the shown frame is the last one of the strip we pause: the next task is a `Resume` after
    /// `restart_delay - frame_delay` (saturating), which then re-arms the regular ticks
    pub fn advance (&mut self, renderer: &mut dyn MapRenderer) -> Option<(PlaybackStatus,Deferred)> {
        if self.mode != SequencerMode::Strip || self.frames.is_empty() { return None }

        let n = self.frames.len();
        let current = self.cursor.index.min( n-1);
        log_render_failure( renderer.set_layout_property( &self.frames[current].layer_id, "visibility", json!("none")), "hide frame");

        let next = (current + 1) % n;
        self.cursor.index = next;
        let frame = &self.frames[next];
        log_render_failure( renderer.set_layout_property( &frame.layer_id, "visibility", json!("visible")), "show frame");

        let status = PlaybackStatus {
            index: next,
            time: frame.time,
            progress: (next + 1) as f64 / n as f64,
            label: format_timestamp( frame.time),
        };

        let follow_up = if next == n-1 {
            debug!("frame cycle complete, pausing");
            Deferred { delay: self.config.restart_delay.saturating_sub( self.config.frame_delay), task: FrameTask::Resume, generation: self.playback_generation }
        } else {
            self.tick_after( self.config.frame_delay)
        };

        Some( (status, follow_up))
    }

    /// status of the current frame without advancing
    pub fn status (&self) -> Option<PlaybackStatus> {
        let n = self.frames.len();
        self.current_frame().map( |frame| PlaybackStatus {
            index: self.cursor.index,
            time: frame.time,
            progress: (self.cursor.index + 1) as f64 / n as f64,
            label: format_timestamp( frame.time),
        })
    }

    /// execute a task that was returned by a previous operation. Returns follow-up tasks and, if the cursor
    /// moved, the new playback status
    pub fn run_deferred (&mut self, renderer: &mut dyn MapRenderer, deferred: Deferred) -> (Vec<Deferred>, Option<PlaybackStatus>) {
        match deferred.task {
            FrameTask::FadeIn { layer_id } => {
                if self.is_current_layer( &layer_id) && renderer.has_layer( &layer_id) {
                    log_render_failure( renderer.set_paint_property( &layer_id, "raster-opacity", json!(self.config.target_opacity)), "frame fade-in");
                }
                (Vec::new(), None)
            }
            FrameTask::Retire { layer_id } => {
                if !self.is_current_layer( &layer_id) {
                    if renderer.has_layer( &layer_id) { log_render_failure( renderer.remove_layer( &layer_id), "remove frame layer") }
                    if renderer.has_source( &layer_id) { log_render_failure( renderer.remove_source( &layer_id), "remove frame source") }
                } else {
                    debug!("not retiring re-used frame layer {layer_id}");
                }
                (Vec::new(), None)
            }
            FrameTask::Tick => {
                if !self.is_live_playback( deferred.generation) {
                    debug!("dropping stale playback tick");
                    return (Vec::new(), None)
                }
                match self.advance( renderer) {
                    Some((status, next)) => (vec![next], Some(status)),
                    None => (Vec::new(), None)
                }
            }
            FrameTask::Resume => {
                if !self.is_live_playback( deferred.generation) {
                    debug!("dropping stale playback resume");
                    return (Vec::new(), None)
                }
                (vec![ self.tick_after( self.config.frame_delay)], None)
            }
        }
    }

    fn is_current_layer (&self, layer_id: &str) -> bool {
        self.frames.iter().any( |f| f.layer_id == layer_id)
    }

    fn is_live_playback (&self, generation: u64) -> bool {
        generation == self.playback_generation && self.state == SequencerState::Playing
    }

    fn tick_after (&self, delay: Duration) -> Deferred {
        Deferred { delay, task: FrameTask::Tick, generation: self.playback_generation }
    }
}

/* #endregion frames and sequencer state */

/// expand `{time}` and `{color}` placeholders, leaving the tile coordinates to the renderer
pub fn expand_tile_url (template: &str, time: i64, color_scheme: u32) -> String {
    template.replace( "{time}", &time.to_string()).replace( "{color}", &color_scheme.to_string())
}

/// timestamp label in local time, e.g. `Sun Jan 05 13:07`
pub fn format_timestamp (epoch_secs: i64) -> String {
    format_timestamp_in( epoch_secs, &Local)
}

pub fn format_timestamp_in<Tz: TimeZone> (epoch_secs: i64, tz: &Tz) -> String where Tz::Offset: std::fmt::Display {
    match tz.timestamp_opt( epoch_secs, 0).single() {
        Some(dt) => dt.format("%a %b %d %H:%M").to_string(),
        None => epoch_secs.to_string()
    }
}
