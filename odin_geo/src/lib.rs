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

//! stateless geodetic primitives for map overlays: points with optional altitude, forward geodesic,
//! local meter offsets, haversine distance and the additive platform/gimbal attitude composition.
//!
//! All functions in here are pure and total for finite input - they never panic and never return
//! errors. Degenerate cases (poles, zero distances) produce documented approximations instead.

pub mod geo_constants;
pub mod angle;
pub mod geo;
pub mod attitude;

pub use geo::{GeoPoint, destination, local_offset, approx_distance};
pub use attitude::{AttitudeVector, compose};

// syntactic sugar for the few places where we compute in radians
#[inline(always)] pub fn sin(x:f64) -> f64 { x.sin() }
#[inline(always)] pub fn cos(x:f64) -> f64 { x.cos() }
#[inline(always)] pub fn asin(x:f64) -> f64 { x.clamp(-1.0, 1.0).asin() }
#[inline(always)] pub fn atan2(y:f64,x:f64) -> f64 { y.atan2(x) }
#[inline(always)] pub fn sqrt(x:f64) -> f64 { x.sqrt() }
#[inline(always)] pub fn pow2(x:f64) -> f64 { x*x }
#[inline(always)] pub fn deg(x:f64)->f64 { x.to_degrees() }
#[inline(always)] pub fn rad(x:f64)->f64 { x.to_radians() }
