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

use std::fmt;
use serde::{Serialize,Deserialize};
use crate::angle::{clamp_90, normalize_360};

/// absolute sensor pointing direction in the local ground frame: heading clockwise from true north
/// in [0..360), pitch positive up in [-90..90]
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct AttitudeVector {
    heading: f64,
    pitch: f64,
}

impl AttitudeVector {
    pub fn new (heading: f64, pitch: f64) -> Self {
        AttitudeVector { heading: normalize_360(heading), pitch: clamp_90(pitch) }
    }

    #[inline] pub fn heading (&self) -> f64 { self.heading }
    #[inline] pub fn pitch (&self) -> f64 { self.pitch }
}

impl Default for AttitudeVector {
    fn default () -> Self { AttitudeVector { heading: 0.0, pitch: 0.0 } }
}

impl fmt::Display for AttitudeVector {
    fn fmt (&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(hdg: {:.1}, pitch: {:.1})", self.heading, self.pitch)
    }
}

/// combine platform heading/pitch with the gimbal yaw/pitch (relative to the platform forward axis)
/// into an absolute camera heading/pitch.
///
/// This is additive Euler composition: heading = platform heading + gimbal yaw (wrapped into [0..360)),
/// pitch = platform pitch + gimbal pitch (clamped to [-90..90]). Roll of either frame is not part of
/// the composition. The error is acceptable for near-level platforms but grows without bound for
/// large platform pitch or roll, where a full rotation composition would be required
pub fn compose (platform_heading: f64, platform_pitch: f64, gimbal_yaw: f64, gimbal_pitch: f64) -> AttitudeVector {
    AttitudeVector::new( platform_heading + gimbal_yaw, platform_pitch + gimbal_pitch)
}
