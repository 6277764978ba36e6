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

//! composite UAV snapshot built from the newest observation of each telemetry stream

use std::collections::HashMap;
use chrono::{DateTime,Utc};
use serde::{Serialize,Deserialize};
use odin_geo::{GeoPoint, AttitudeVector, compose};

use crate::observation::{Attitude, AttitudeResult, FovParams, FovResult, GeoRef, ImageFrameResult, LocationResult, Observation, Positional};
use crate::coverage::{CoverageFootprint, CoverageProjector, CoverageStrategy, ImageCorners};

pub const UNKNOWN_VEHICLE: &str = "UNKNOWN";

pub const CALLSIGNS: [&str;7] = ["Falcon", "Raptor", "Viper", "Eagle", "Hawk", "Shadow", "Ghost"];

#[derive(Debug,Clone,Copy,PartialEq,Eq,Default,Serialize,Deserialize)]
pub enum CombatStatus {
    #[default]
    Neutral,
    Friendly,
    Enemy,
}

#[derive(Debug,Clone,Copy,PartialEq,Default,Serialize)]
pub struct VehicleAttitude {
    pub heading: Option<f64>,
    pub pitch: Option<f64>,
    pub roll: Option<f64>,
}

impl From<&Attitude> for VehicleAttitude {
    fn from (a: &Attitude) -> Self {
        VehicleAttitude { heading: a.heading, pitch: a.pitch, roll: a.roll }
    }
}

#[derive(Debug,Clone,Copy,PartialEq,Default,Serialize)]
pub struct ImageFrame {
    pub center: Option<GeoPoint>,
    pub ulc: Option<GeoPoint>,
    pub urc: Option<GeoPoint>,
    pub lrc: Option<GeoPoint>,
    pub llc: Option<GeoPoint>,
}

impl ImageFrame {
    pub fn corners (&self) -> Option<ImageCorners> {
        Some( ImageCorners { ulc: self.ulc?, urc: self.urc?, lrc: self.lrc?, llc: self.llc? })
    }
}

impl From<&GeoRef> for ImageFrame {
    fn from (r: &GeoRef) -> Self {
        let p = |fix: &Option<crate::observation::GeoFix>| fix.as_ref().and_then( |f| f.to_geo_point());
        ImageFrame { center: p(&r.center), ulc: p(&r.ulc), urc: p(&r.urc), lrc: p(&r.lrc), llc: p(&r.llc) }
    }
}

/// newest observation of each UAV stream (if the stream had any)
#[derive(Debug,Clone,Default)]
pub struct UavObservations {
    pub location: Option<Observation<LocationResult>>,
    pub platform: Option<Observation<AttitudeResult>>,
    pub gimbal: Option<Observation<AttitudeResult>>,
    pub fov: Option<Observation<FovResult>>,
    pub image_frame: Option<Observation<ImageFrameResult>>,
}

#[derive(Debug,Clone,PartialEq,Serialize)]
pub struct TrackData {
    pub vehicle_id: String,
    pub location: Option<GeoPoint>,
    pub vehicle_attitude: Option<VehicleAttitude>,
    pub camera_fov: Option<FovParams>,
    /// composed platform + gimbal pointing direction
    pub camera_attitude: AttitudeVector,
    pub image_frame: Option<ImageFrame>,
    pub callsign: String,
    pub combat_status: CombatStatus,
    pub last_updated: DateTime<Utc>,
    pub selected: bool,
}

impl TrackData {
    /// footprint according to the caller's strategy, or `None` if the snapshot lacks the required input
    /// (location with altitude and FOV for frustum projection, all four image corners for the circle fit)
    pub fn footprint (&self, projector: &CoverageProjector, strategy: CoverageStrategy) -> Option<CoverageFootprint> {
        match strategy {
            CoverageStrategy::Frustum => {
                let location = self.location?;
                let altitude = location.altitude()?;
                let fov = self.camera_fov?;
                Some( projector.project( &location, altitude, &self.camera_attitude, fov.hfov?, fov.vfov?))
            }
            CoverageStrategy::CornerCircle => {
                let corners = self.image_frame.as_ref()?.corners()?;
                let origin = self.location.or( self.image_frame.and_then( |f| f.center)).unwrap_or( corners.ulc);
                Some( projector.circle_from_corners( &origin, &corners))
            }
        }
    }
}

/// stable round robin callsign assignment per vehicle id
#[derive(Debug,Default)]
pub struct CallsignRegistry {
    assigned: HashMap<String,&'static str>,
}

impl CallsignRegistry {
    pub fn assign (&mut self, vehicle_id: &str) -> &'static str {
        if let Some(cs) = self.assigned.get( vehicle_id).copied() { return cs }

        let cs = CALLSIGNS[ self.assigned.len() % CALLSIGNS.len()];
        self.assigned.insert( vehicle_id.to_string(), cs);
        cs
    }
}

/// folds stream observations into the current [`TrackData`]
#[derive(Debug,Default)]
pub struct TrackDataBuilder {
    callsigns: CallsignRegistry,
    combat_status: CombatStatus,
    current: Option<TrackData>,
}

impl TrackDataBuilder {
    pub fn new () -> Self { TrackDataBuilder::default() }

    pub fn current (&self) -> Option<&TrackData> { self.current.as_ref() }

    pub fn set_combat_status (&mut self, status: CombatStatus) {
        self.combat_status = status;
        if let Some(td) = &mut self.current { td.combat_status = status }
    }

    pub fn set_selected (&mut self, selected: bool) {
        if let Some(td) = &mut self.current { td.selected = selected }
    }

    /// location, vehicle attitude and FOV are kept from the previous snapshot if their stream had nothing,
    /// the image frame is not. Missing attitude values are taken as zero for the camera attitude
    pub fn update (&mut self, obs: &UavObservations, now: DateTime<Utc>) -> &TrackData {
        let prev = self.current.take();

        let vehicle_id = obs.location.as_ref().and_then( |o| o.foi.clone())
            .or_else( || obs.platform.as_ref().and_then( |o| o.foi.clone()))
            .or_else( || obs.image_frame.as_ref().and_then( |o| o.foi.clone()))
            .unwrap_or_else( || UNKNOWN_VEHICLE.to_string());

        let platform_att = obs.platform.as_ref().and_then( |o| o.result.attitude);
        let gimbal_att = obs.gimbal.as_ref().and_then( |o| o.result.attitude);

        let camera_attitude = compose(
            platform_att.and_then( |a| a.heading).unwrap_or(0.0),
            platform_att.and_then( |a| a.pitch).unwrap_or(0.0),
            gimbal_att.and_then( |a| a.yaw).unwrap_or(0.0),
            gimbal_att.and_then( |a| a.pitch).unwrap_or(0.0)
        );

        let location = obs.location.as_ref().and_then( |o| o.result.position())
            .or( prev.as_ref().and_then( |p| p.location));
        let vehicle_attitude = platform_att.as_ref().map( VehicleAttitude::from)
            .or( prev.as_ref().and_then( |p| p.vehicle_attitude));
        let camera_fov = obs.fov.as_ref().and_then( |o| o.result.params)
            .or( prev.as_ref().and_then( |p| p.camera_fov));
        let image_frame = obs.image_frame.as_ref().and_then( |o| o.result.geo_ref.as_ref()).map( ImageFrame::from);

        let callsign = self.callsigns.assign( &vehicle_id).to_string();
        let selected = prev.as_ref().map( |p| p.selected && p.vehicle_id == vehicle_id).unwrap_or(false);

        self.current.insert( TrackData {
            vehicle_id,
            location,
            vehicle_attitude,
            camera_fov,
            camera_attitude,
            image_frame,
            callsign,
            combat_status: self.combat_status,
            last_updated: now,
            selected,
        })
    }
}
