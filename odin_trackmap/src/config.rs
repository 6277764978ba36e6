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

//! configuration structs for trackmap sessions. All of them implement `Default` with the values the live
//! feeds are normally used with, their RON representation can be partial (missing fields take defaults).
//! Durations are given as human readable strings such as `"5s"`, `"1500ms"` or `"5min"`.

use std::{fs, path::Path, time::Duration};
use serde::{Deserialize, Deserializer};
use uom::si::f64::Length;
use uom::si::length::meter;

use crate::coverage::CoverageStrategy;
use crate::frames::FrameMode;
use crate::errors::Result;

const OBSERVATIONS_BASE: &str = "https://api.georobotix.io/ogc/t18/api/datastreams";

fn datastream_url (id: &str) -> String {
    format!("{OBSERVATIONS_BASE}/{id}/observations")
}

pub fn deserialize_duration <'a,D>(deserializer: D) -> std::result::Result<Duration,D::Error>
    where D: Deserializer<'a>
{
    String::deserialize(deserializer).and_then( |string| {
        parse_duration::parse( string.as_str())
            .map_err( |e| serde::de::Error::custom( format!("{:?}",e)))
    })
}

pub fn load_config (path: impl AsRef<Path>) -> Result<TrackMapConfig> {
    let contents = fs::read_to_string( path)?;
    let config: TrackMapConfig = ron::from_str( &contents)?;
    Ok(config)
}

/// the five telemetry streams that make up the UAV snapshot
#[derive(Debug,Clone,Deserialize)]
#[serde(default)]
pub struct UavStreams {
    pub location_url: String,
    pub platform_attitude_url: String,
    pub gimbal_attitude_url: String,
    pub camera_fov_url: String,
    pub image_frame_url: String,
}

impl Default for UavStreams {
    fn default () -> Self {
        UavStreams {
            location_url: datastream_url("o7pce3e60s0ie"),
            platform_attitude_url: datastream_url("mlme3gtdfepvc"),
            gimbal_attitude_url: datastream_url("h75dmug8e3sae"),
            camera_fov_url: datastream_url("nhcs9rp6713ka"),
            image_frame_url: datastream_url("p3mp2peibksl4"),
        }
    }
}

#[derive(Debug,Clone,Deserialize)]
#[serde(default)]
pub struct TrackMapConfig {
    pub route_url: String,
    pub ais_url: String,
    pub uav: UavStreams,

    #[serde(deserialize_with="deserialize_duration")]
    pub route_interval: Duration,
    #[serde(deserialize_with="deserialize_duration")]
    pub uav_interval: Duration,
    #[serde(deserialize_with="deserialize_duration")]
    pub ais_interval: Duration,

    /// interpolation steps between consecutive track points
    pub segments_per_span: usize,

    pub coverage: CoverageConfig,
    pub frames: FrameConfig,
}

impl Default for TrackMapConfig {
    fn default () -> Self {
        TrackMapConfig {
            route_url: datastream_url("iabpf1ivua1qm"),
            ais_url: datastream_url("kuhmds0ib5gd8"),
            uav: UavStreams::default(),
            route_interval: Duration::from_secs(5),
            uav_interval: Duration::from_secs(5),
            ais_interval: Duration::from_secs(10),
            segments_per_span: 10,
            coverage: CoverageConfig::default(),
            frames: FrameConfig::default(),
        }
    }
}

/// lengths are given in meters
#[derive(Debug,Clone,Deserialize)]
#[serde(default)]
pub struct CoverageConfig {
    pub strategy: CoverageStrategy,

    /// ground range used for near horizontal or non-finite corner rays
    pub fallback_range: Length,

    /// corner pitch magnitude (degrees) below which we use the fallback range
    pub pitch_epsilon: f64,

    pub circle_segments: usize,

    /// radius used if the corner distances do not give a usable one
    pub default_circle_radius: Length,
}

impl Default for CoverageConfig {
    fn default () -> Self {
        CoverageConfig {
            strategy: CoverageStrategy::Frustum,
            fallback_range: Length::new::<meter>(10_000.0),
            pitch_epsilon: odin_geo::geo_constants::HORIZONTAL_PITCH_EPSILON,
            circle_segments: 60,
            default_circle_radius: Length::new::<meter>(1_000.0),
        }
    }
}

#[derive(Debug,Clone,Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    pub mode: FrameMode,
    /// epoch seconds of the frame to show in single-match mode
    pub target_time: Option<i64>,

    /// number of most recent past frames in strip mode
    pub frame_count: usize,

    #[serde(deserialize_with="deserialize_duration")]
    pub frame_delay: Duration,
    #[serde(deserialize_with="deserialize_duration")]
    pub restart_delay: Duration,

    #[serde(deserialize_with="deserialize_duration")]
    pub fade_out: Duration,
    #[serde(deserialize_with="deserialize_duration")]
    pub settle_delay: Duration,
    /// renderer side opacity transition for new frames
    #[serde(deserialize_with="deserialize_duration")]
    pub fade_in: Duration,
    pub target_opacity: f64,

    #[serde(deserialize_with="deserialize_duration")]
    pub refresh_interval: Duration,
    #[serde(deserialize_with="deserialize_duration")]
    pub retry_interval: Duration,

    pub list_url: String,
    /// `{time}` and `{color}` are expanded by us, `{z}/{x}/{y}` by the renderer
    pub tile_url_template: String,
    pub color_scheme: u32,
    pub tile_size: u32,
    pub layer_prefix: String,
}

impl Default for FrameConfig {
    fn default () -> Self {
        FrameConfig {
            mode: FrameMode::Strip,
            target_time: None,
            frame_count: 1,
            frame_delay: Duration::from_millis(1500),
            restart_delay: Duration::from_millis(1000),
            fade_out: Duration::from_millis(500),
            settle_delay: Duration::from_millis(50),
            fade_in: Duration::from_millis(800),
            target_opacity: 0.7,
            refresh_interval: Duration::from_secs(5*60),
            retry_interval: Duration::from_secs(30),
            list_url: "https://api.rainviewer.com/public/weather-maps.json".to_string(),
            tile_url_template: "https://tilecache.rainviewer.com/v2/radar/{time}/256/{z}/{x}/{y}/{color}/1_0.png".to_string(),
            color_scheme: 7,
            tile_size: 256,
            layer_prefix: "radar-layer".to_string(),
        }
    }
}
