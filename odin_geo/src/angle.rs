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

/// reflect latitude-like degrees over the poles into [-90..90]
#[inline]
pub fn normalize_90 (d:f64) -> f64 {
    let x = normalize_180(d);

    if x < -90.0 { -180.0 - x }
    else if x > 90.0 { 180.0 - x }
    else { x }
}

/// wrap longitude-like degrees into [-180..180]
#[inline]
pub fn normalize_180 (d: f64) -> f64 {
    let x = d % 360.0;

    if x < -180.0 { 360.0 + x }
    else if x > 180.0 { x - 360.0 }
    else { x }
}

/// wrap heading-like degrees into [0..360). Never returns 360.0 or a negative value,
/// even for tiny negative inputs that would round up to 360.0 after the shift
#[inline]
pub fn normalize_360 (d: f64) -> f64 {
    let x = d % 360.0;
    let x = if x < 0.0 { 360.0 + x } else { x };

    if x >= 360.0 { 0.0 } else { x }
}

/// hard limit for pitch-like degrees (no reflection, unlike [`normalize_90`])
#[inline]
pub fn clamp_90 (d: f64) -> f64 {
    d.clamp(-90.0, 90.0)
}

#[inline]
pub fn is_latitude (d: f64) -> bool { d.is_finite() && d >= -90.0 && d <= 90.0 }

#[inline]
pub fn is_longitude (d: f64) -> bool { d.is_finite() && d >= -180.0 && d <= 180.0 }
