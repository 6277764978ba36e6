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

//! the event loop that ties polling, frame playback and rendering together.
//!
//! All state is owned by [`TrackMapSession`] and only mutated while handling one [`SessionEvent`] at a time.
//! Fetches run as spawned tasks that report back through the session channel, tagged with the generation of the
//! concern they were issued for. The next poll of a concern is armed only after the current completion has been
//! processed, so cycles of the same concern never overlap.

use std::{sync::Arc, time::Duration};
use chrono::Utc;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug,info,warn,error};

use crate::config::TrackMapConfig;
use crate::connector::ObservationSource;
use crate::errors::{op_failed, OdinTrackMapError, Result};
use crate::frames::{Deferred, FrameSequencer, FrameTask, PlaybackStatus, RadarTimestamp, SequencerState, Transition, WeatherMaps};
use crate::layers;
use crate::observation::{decode_batch, latest_observation, AisResult, ImageFrameResult};
use crate::renderer::{log_render_failure, MapRenderer};
use crate::scheduler::{Concern, Scheduler};
use crate::track::TrackAccumulator;
use crate::track_data::{CombatStatus, TrackData, TrackDataBuilder, UavObservations};
use crate::coverage::CoverageProjector;
use crate::ais::AisStore;

const CHANNEL_CAPACITY: usize = 256;

/* #region events and commands ************************************************************************************/

#[derive(Debug)]
pub enum SessionEvent {
    /// a poll timer fired
    Poll { concern: Concern, generation: u64 },
    /// a fetch issued for `concern` under `generation` completed
    Fetched { concern: Concern, generation: u64, payload: Fetched },
    /// a frame sequencer task is due
    Frame(Deferred),
    Command(SessionCommand),
}

#[derive(Debug)]
pub enum Fetched {
    Route( Result<Value>),
    Ais( Result<Value>),
    Frames( Result<Value>),
    Uav( UavDocs),
}

/// the five UAV telemetry documents of one polling cycle
#[derive(Debug)]
pub struct UavDocs {
    pub location: Result<Value>,
    pub platform: Result<Value>,
    pub gimbal: Result<Value>,
    pub fov: Result<Value>,
    pub image_frame: Result<Value>,
}

#[derive(Debug,Clone)]
pub enum SessionCommand {
    ResetRoute,
    SetTargetTime( Option<i64>),
    Play,
    Pause,
    SelectAis( u64),
    ResetAis,
    SelectTrack( bool),
    SetCombatStatus( CombatStatus),
    Shutdown,
}

/// cloneable sender for commands from outside of the session task
#[derive(Debug,Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<SessionEvent>,
}

impl SessionHandle {
    pub async fn send (&self, cmd: SessionCommand) -> Result<()> {
        self.tx.send( SessionEvent::Command(cmd)).await.map_err( |_| op_failed!("session closed"))
    }

    pub async fn reset_route (&self) -> Result<()> { self.send( SessionCommand::ResetRoute).await }

    pub async fn shutdown (&self) -> Result<()> { self.send( SessionCommand::Shutdown).await }
}

/* #endregion events and commands */

/// which feeds a session polls
#[derive(Debug,Clone,Copy)]
pub struct SessionFeatures {
    pub route: bool,
    pub uav: bool,
    pub ais: bool,
    pub radar: bool,
}

impl Default for SessionFeatures {
    fn default () -> Self {
        SessionFeatures { route: true, uav: true, ais: true, radar: true }
    }
}

pub struct TrackMapSession<R: MapRenderer, S: ObservationSource> {
    config: Arc<TrackMapConfig>,
    features: SessionFeatures,
    renderer: R,
    source: Arc<S>,

    tx: mpsc::Sender<SessionEvent>,
    rx: mpsc::Receiver<SessionEvent>,
    scheduler: Scheduler<SessionEvent>,

    track: TrackAccumulator,
    projector: CoverageProjector,
    track_data: TrackDataBuilder,
    ais: AisStore,
    sequencer: FrameSequencer,

    autoplay: bool,
    playback_status: Option<PlaybackStatus>,
}

impl<R: MapRenderer, S: ObservationSource> TrackMapSession<R,S> {
    pub fn new (config: TrackMapConfig, features: SessionFeatures, renderer: R, source: Arc<S>) -> Self {
        let (tx, rx) = mpsc::channel( CHANNEL_CAPACITY);
        let scheduler = Scheduler::new( tx.clone());
        let projector = CoverageProjector::new( config.coverage.clone());
        let sequencer = FrameSequencer::new( config.frames.clone());

        TrackMapSession {
            config: Arc::new(config),
            features,
            renderer,
            source,
            tx,
            rx,
            scheduler,
            track: TrackAccumulator::new(),
            projector,
            track_data: TrackDataBuilder::new(),
            ais: AisStore::new(),
            sequencer,
            autoplay: true,
            playback_status: None,
        }
    }

    pub fn handle (&self) -> SessionHandle {
        SessionHandle { tx: self.tx.clone() }
    }

    pub fn renderer (&self) -> &R { &self.renderer }
    pub fn track (&self) -> &TrackAccumulator { &self.track }
    pub fn track_data (&self) -> Option<&TrackData> { self.track_data.current() }
    pub fn ais (&self) -> &AisStore { &self.ais }
    pub fn sequencer (&self) -> &FrameSequencer { &self.sequencer }
    pub fn playback_status (&self) -> Option<&PlaybackStatus> { self.playback_status.as_ref() }
    pub fn valid_timestamps (&self) -> Vec<RadarTimestamp> { self.sequencer.valid_timestamps() }

    pub fn generation (&self, concern: Concern) -> u64 { self.scheduler.generation( concern) }
    pub fn is_pending (&self, concern: Concern) -> bool { self.scheduler.is_pending( concern) }
    pub fn pending_fades (&self) -> usize { self.scheduler.pending_one_shots() }

    /// arm the first poll of every enabled feed
    pub fn start (&mut self) {
        let polls = [
            (self.features.route, Concern::RoutePolling),
            (self.features.uav, Concern::UavPolling),
            (self.features.ais, Concern::AisPolling),
            (self.features.radar, Concern::FramePolling),
        ];
        for (enabled, concern) in polls {
            if enabled { self.arm_poll( concern, Duration::ZERO) }
        }
        info!("trackmap session started ({:?})", self.features);
    }

    pub async fn next_event (&mut self) -> Option<SessionEvent> {
        self.rx.recv().await
    }

    /// process events until shutdown. Returns the renderer so that callers can inspect the final scene
    pub async fn run (mut self) -> R {
        while let Some(event) = self.rx.recv().await {
            if !self.handle_event( event) { break }
        }
        self.scheduler.shutdown();
        info!("trackmap session terminated");
        self.renderer
    }

    /// returns false if the session should terminate
    pub fn handle_event (&mut self, event: SessionEvent) -> bool {
        match event {
            SessionEvent::Poll { concern, generation } => {
                if self.scheduler.is_current( concern, generation) {
                    self.issue_fetch( concern, generation);
                } else {
                    debug!("dropping superseded {concern} poll [{generation}]");
                }
            }
            SessionEvent::Fetched { concern, generation, payload } => {
                if self.scheduler.is_current( concern, generation) {
                    self.process_fetched( concern, payload);
                } else {
                    debug!("dropping stale {concern} response [{generation}]");
                }
            }
            SessionEvent::Frame(deferred) => {
                let (follow_up, status) = self.sequencer.run_deferred( &mut self.renderer, deferred);
                self.schedule_frame_tasks( follow_up);
                if let Some(status) = status {
                    debug!("radar frame {} ({:.0}%)", status.label, status.progress * 100.0);
                    self.playback_status = Some(status);
                }
            }
            SessionEvent::Command(cmd) => return self.process_command( cmd)
        }
        true
    }

    /// clear the accumulated route and restart route polling. A route fetch that is still in flight is
    /// discarded when it arrives
    pub fn reset_route (&mut self) {
        self.track.reset();
        if self.renderer.has_source( layers::ROUTE_SOURCE) {
            let path = self.track.interpolated_path( self.config.segments_per_span);
            log_render_failure( layers::publish_route( &mut self.renderer, &path), "reset route");
        }
        if self.features.route {
            self.arm_poll( Concern::RoutePolling, Duration::ZERO);
        } else {
            self.scheduler.invalidate( Concern::RoutePolling);
        }
        info!("route reset");
    }

    fn process_command (&mut self, cmd: SessionCommand) -> bool {
        match cmd {
            SessionCommand::ResetRoute => self.reset_route(),
            SessionCommand::SetTargetTime(target) => {
                if let Some(transition) = self.sequencer.set_target_time( &mut self.renderer, target) {
                    self.schedule_transition( transition);
                }
            }
            SessionCommand::Play => {
                self.autoplay = true;
                if let Some(tick) = self.sequencer.play() { self.schedule_frame_tasks( vec![tick]) }
            }
            SessionCommand::Pause => {
                self.autoplay = false;
                self.sequencer.pause();
            }
            SessionCommand::SelectAis(mmsi) => {
                if self.ais.select( mmsi).is_none() { debug!("no AIS contact {mmsi}") }
                log_render_failure( layers::publish_ais( &mut self.renderer, &self.ais), "publish AIS");
            }
            SessionCommand::ResetAis => {
                self.ais.reset();
                log_render_failure( layers::publish_ais( &mut self.renderer, &self.ais), "publish AIS");
                info!("AIS contacts reset");
            }
            SessionCommand::SelectTrack(selected) => self.track_data.set_selected( selected),
            SessionCommand::SetCombatStatus(status) => self.track_data.set_combat_status( status),
            SessionCommand::Shutdown => return false
        }
        true
    }

    /* #region fetch cycles */

    fn arm_poll (&mut self, concern: Concern, delay: Duration) {
        self.scheduler.arm( concern, delay, |generation| SessionEvent::Poll { concern, generation });
    }

    fn issue_fetch (&self, concern: Concern, generation: u64) {
        let source = self.source.clone();
        let tx = self.tx.clone();
        let config = self.config.clone();

        tokio::spawn( async move {
            let payload = match concern {
                Concern::RoutePolling => Fetched::Route( source.fetch_json( &config.route_url).await),
                Concern::AisPolling => Fetched::Ais( source.fetch_json( &config.ais_url).await),
                Concern::FramePolling => Fetched::Frames( source.fetch_json( &config.frames.list_url).await),
                Concern::UavPolling => {
                    let uav = &config.uav;
                    let (location, platform, gimbal, fov, image_frame) = futures::join!(
                        source.fetch_json( &uav.location_url),
                        source.fetch_json( &uav.platform_attitude_url),
                        source.fetch_json( &uav.gimbal_attitude_url),
                        source.fetch_json( &uav.camera_fov_url),
                        source.fetch_json( &uav.image_frame_url)
                    );
                    Fetched::Uav( UavDocs { location, platform, gimbal, fov, image_frame })
                }
                Concern::Playback | Concern::FrameFade => return
            };

            if tx.send( SessionEvent::Fetched { concern, generation, payload }).await.is_err() {
                debug!("session closed before {concern} response arrived");
            }
        });
    }

    fn process_fetched (&mut self, concern: Concern, payload: Fetched) {
        let next_delay = match payload {
            Fetched::Route(res) => {
                match res {
                    Ok(doc) => self.process_route( &doc),
                    Err(e) => warn_fetch_failure( concern, &e, self.config.route_interval)
                }
                self.config.route_interval
            }
            Fetched::Ais(res) => {
                match res {
                    Ok(doc) => self.process_ais( &doc),
                    Err(e) => warn_fetch_failure( concern, &e, self.config.ais_interval)
                }
                self.config.ais_interval
            }
            Fetched::Uav(docs) => {
                self.process_uav( docs);
                self.config.uav_interval
            }
            Fetched::Frames(res) => {
                match res.and_then( |doc| WeatherMaps::from_json( &doc)) {
                    Ok(list) => {
                        self.process_frames( list);
                        self.config.frames.refresh_interval
                    }
                    Err(e) => {
                        // keep showing what we have
                        warn_fetch_failure( concern, &e, self.config.frames.retry_interval);
                        self.config.frames.retry_interval
                    }
                }
            }
        };

        self.arm_poll( concern, next_delay);
    }

    fn process_route (&mut self, doc: &Value) {
        match decode_batch::<ImageFrameResult>( doc) {
            Ok(batch) => {
                if batch.skipped > 0 { warn!("skipped {} malformed route observations", batch.skipped) }
                let appended = self.track.accept_batch( &batch.observations);

                if appended > 0 || !self.renderer.has_source( layers::ROUTE_SOURCE) {
                    debug!("route has {} points ({} new)", self.track.len(), appended);
                    let path = self.track.interpolated_path( self.config.segments_per_span);
                    log_render_failure( layers::publish_route( &mut self.renderer, &path), "publish route");
                    if let Some(p) = self.track.latest() {
                        log_render_failure( layers::publish_position( &mut self.renderer, p), "publish position");
                    }
                }
            }
            Err(e) => warn!("ignoring route document: {e}")
        }
    }

    fn process_ais (&mut self, doc: &Value) {
        match decode_batch::<AisResult>( doc) {
            Ok(batch) => {
                let update = self.ais.apply_batch( &batch);
                if update.skipped > 0 { warn!("skipped {} AIS observations", update.skipped) }
                if update.changed() {
                    debug!("AIS: {} new, {} updated contacts", update.inserted, update.updated);
                    log_render_failure( layers::publish_ais( &mut self.renderer, &self.ais), "publish AIS");
                }
            }
            Err(e) => warn!("ignoring AIS document: {e}")
        }
    }

    fn process_uav (&mut self, docs: UavDocs) {
        let results = [&docs.location, &docs.platform, &docs.gimbal, &docs.fov, &docs.image_frame];
        if results.iter().all( |r| r.is_err()) {
            if let Err(e) = &docs.location { warn_fetch_failure( Concern::UavPolling, e, self.config.uav_interval) }
            return
        }

        let obs = UavObservations {
            location: latest_of( "location", docs.location),
            platform: latest_of( "platform attitude", docs.platform),
            gimbal: latest_of( "gimbal attitude", docs.gimbal),
            fov: latest_of( "camera FOV", docs.fov),
            image_frame: latest_of( "image frame", docs.image_frame),
        };

        let td = self.track_data.update( &obs, Utc::now());
        debug!("UAV {} ({}) camera {}", td.vehicle_id, td.callsign, td.camera_attitude);

        if let Some(footprint) = td.footprint( &self.projector, self.config.coverage.strategy) {
            log_render_failure( layers::publish_coverage( &mut self.renderer, &footprint), "publish coverage");
        }
    }

    fn process_frames (&mut self, list: WeatherMaps) {
        let transition = self.sequencer.load_list( &mut self.renderer, list);
        self.schedule_transition( transition);

        if self.autoplay && self.sequencer.state() == SequencerState::Loaded {
            if let Some(tick) = self.sequencer.play() { self.schedule_frame_tasks( vec![tick]) }
        }
        self.playback_status = self.sequencer.status();
    }

    /* #endregion fetch cycles */

    fn schedule_transition (&mut self, transition: Transition) {
        if !transition.added.is_empty() || !transition.retiring.is_empty() {
            info!("radar frames: {} added, {} retiring", transition.added.len(), transition.retiring.len());
        }
        self.schedule_frame_tasks( transition.deferred);
    }

    fn schedule_frame_tasks (&mut self, tasks: Vec<Deferred>) {
        for deferred in tasks {
            let delay = deferred.delay;
            if matches!( deferred.task, FrameTask::Tick | FrameTask::Resume) {
                self.scheduler.arm( Concern::Playback, delay, move |_| SessionEvent::Frame(deferred));
            } else {
                self.scheduler.defer( Concern::FrameFade, delay, SessionEvent::Frame(deferred));
            }
        }
    }
}

fn latest_of<R> (what: &str, res: Result<Value>) -> Option<crate::observation::Observation<R>>
    where R: serde::de::DeserializeOwned + Default
{
    match res.and_then( |doc| latest_observation::<R>( &doc)) {
        Ok(obs) => obs,
        Err(e) => {
            warn!("no {what} observation: {e}");
            None
        }
    }
}

fn warn_fetch_failure (concern: Concern, e: &OdinTrackMapError, retry: Duration) {
    if e.is_transient() {
        warn!("{concern} fetch failed, retry in {retry:?}: {e}");
    } else {
        error!("{concern} fetch failed, retry in {retry:?}: {e}");
    }
}
