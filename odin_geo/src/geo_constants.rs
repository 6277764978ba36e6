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

/// sphere radius in meters used by all spherical approximations of this crate.
/// This is the WGS84 semi major axis, which is what the map renderer (web mercator) uses as well
pub const EARTH_RADIUS: f64 = 6378137.0;

/// pitch magnitude (degrees) below which a look angle counts as horizontal
pub const HORIZONTAL_PITCH_EPSILON: f64 = 0.1;
