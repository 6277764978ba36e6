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

//! typed views of the upstream observation documents, which have the general shape
//! ```json
//! { "items": [ { "id": "..", "foi@id": "..", "phenomenonTime": "2025-01-05T13:07:00Z", "result": {..} }, .. ] }
//! ```
//! Each stream has its own result kind. All result fields are optional and missing ones are substituted
//! by the consumer (no position, zero attitude). Only items without identity or time are rejected.

use std::fmt;
use chrono::{DateTime,Utc};
use serde::{Serialize,Deserialize};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug,warn};
use odin_geo::GeoPoint;

use crate::errors::{malformed, Result};

/* #region identities and observations ****************************************************************************/

/// opaque observation identity. Upstream ids can be JSON strings or numbers - we keep the kind so that
/// `"42"` and `42` are different identities
#[derive(Debug,Clone,PartialEq,Eq,Hash,PartialOrd,Ord)]
pub enum ObsId {
    Text(String),
    Number(String),
}

impl ObsId {
    pub fn from_value (v: &Value) -> Option<ObsId> {
        match v {
            Value::String(s) if !s.is_empty() => Some( ObsId::Text(s.clone())),
            Value::Number(n) => Some( ObsId::Number(n.to_string())),
            _ => None
        }
    }

    pub fn as_str (&self) -> &str {
        match self {
            ObsId::Text(s) => s.as_str(),
            ObsId::Number(s) => s.as_str(),
        }
    }
}

impl fmt::Display for ObsId {
    fn fmt (&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for ObsId {
    fn from (s: &str) -> Self { ObsId::Text(s.to_string()) }
}

impl From<i64> for ObsId {
    fn from (n: i64) -> Self { ObsId::Number(n.to_string()) }
}

/// a single immutable sensor report
#[derive(Debug,Clone)]
pub struct Observation<R> {
    pub id: ObsId,
    /// feature-of-interest (vehicle, vessel) this observation is about, if reported
    pub foi: Option<String>,
    pub phenomenon_time: DateTime<Utc>,
    pub result: R,
}

/// something that can carry a position. Implementations only return points with valid lat/lon
pub trait Positional {
    fn position (&self) -> Option<GeoPoint>;
}

/* #endregion identities and observations */

/* #region result kinds *******************************************************************************************/

/// lat/lon(/alt) triple as it appears in all result kinds
#[derive(Debug,Clone,Copy,Default,PartialEq,Serialize,Deserialize)]
pub struct GeoFix {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub alt: Option<f64>,
}

impl GeoFix {
    /// only yields a point if lat and lon are both present, finite and within geodetic ranges
    pub fn to_geo_point (&self) -> Option<GeoPoint> {
        match (self.lon, self.lat) {
            (Some(lon), Some(lat)) => GeoPoint::try_from_lon_lat_degrees( lon, lat).map( |p| p.with_altitude_meters( self.alt)),
            _ => None
        }
    }
}

#[derive(Debug,Clone,Default,Deserialize)]
pub struct LocationResult {
    #[serde(default)]
    pub location: Option<GeoFix>,
}

impl Positional for LocationResult {
    fn position (&self) -> Option<GeoPoint> {
        self.location.as_ref().and_then( |loc| loc.to_geo_point())
    }
}

#[derive(Debug,Clone,Copy,Default,PartialEq,Serialize,Deserialize)]
pub struct Attitude {
    #[serde(default)]
    pub heading: Option<f64>,
    #[serde(default)]
    pub pitch: Option<f64>,
    #[serde(default)]
    pub roll: Option<f64>,
    #[serde(default)]
    pub yaw: Option<f64>,
}

/// used for both platform and gimbal attitude streams (platform reports heading, gimbal reports yaw)
#[derive(Debug,Clone,Default,Deserialize)]
pub struct AttitudeResult {
    #[serde(default)]
    pub attitude: Option<Attitude>,
}

#[derive(Debug,Clone,Copy,Default,PartialEq,Serialize,Deserialize)]
pub struct FovParams {
    #[serde(default)]
    pub hfov: Option<f64>,
    #[serde(default)]
    pub vfov: Option<f64>,
}

#[derive(Debug,Clone,Default,Deserialize)]
pub struct FovResult {
    #[serde(default)]
    pub params: Option<FovParams>,
}

/// georeferenced image frame: center plus upper-left, upper-right, lower-right and lower-left corners
#[derive(Debug,Clone,Copy,Default,PartialEq,Serialize,Deserialize)]
pub struct GeoRef {
    #[serde(default)]
    pub center: Option<GeoFix>,
    #[serde(default)]
    pub ulc: Option<GeoFix>,
    #[serde(default)]
    pub urc: Option<GeoFix>,
    #[serde(default)]
    pub lrc: Option<GeoFix>,
    #[serde(default)]
    pub llc: Option<GeoFix>,
}

#[derive(Debug,Clone,Default,Deserialize)]
pub struct ImageFrameResult {
    #[serde(default, rename="geoRef")]
    pub geo_ref: Option<GeoRef>,
}

/// the route stream reports image frames - the track follows their centers
impl Positional for ImageFrameResult {
    fn position (&self) -> Option<GeoPoint> {
        self.geo_ref.as_ref().and_then( |r| r.center.as_ref()).and_then( |c| c.to_geo_point())
    }
}

#[derive(Debug,Clone,Default,Deserialize)]
pub struct AisResult {
    #[serde(default)]
    pub location: Option<GeoFix>,
    /// speed over ground
    #[serde(default)]
    pub sog: Option<f64>,
    #[serde(default)]
    pub heading: Option<f64>,
    #[serde(default)]
    pub name: Option<String>,
}

impl Positional for AisResult {
    fn position (&self) -> Option<GeoPoint> {
        self.location.as_ref().and_then( |loc| loc.to_geo_point())
    }
}

/* #endregion result kinds */

/* #region batch decoding *****************************************************************************************/

/// the decoded, time-ordered content of one upstream document
#[derive(Debug,Clone)]
pub struct Batch<R> {
    pub observations: Vec<Observation<R>>,
    pub skipped: usize,
}

impl<R> Batch<R> {
    pub fn is_empty (&self) -> bool { self.observations.is_empty() }
    pub fn len (&self) -> usize { self.observations.len() }

    /// the newest observation. Since the batch is sorted this is the last one
    pub fn latest (&self) -> Option<&Observation<R>> { self.observations.last() }

    pub fn into_latest (mut self) -> Option<Observation<R>> { self.observations.pop() }
}

/// decode a `{ items: [..] }` document. Items without identity or parseable phenomenon time are skipped and
/// counted, a result that does not fit `R` degrades to `R::default()`. A missing `items` array is an empty batch.
/// The returned observations are sorted by phenomenon time (stable, so equal times keep upstream order)
pub fn decode_batch<R> (doc: &Value) -> Result<Batch<R>> where R: DeserializeOwned + Default {
    let obj = doc.as_object().ok_or_else( || malformed!("observation document is not an object"))?;

    let items: &[Value] = match obj.get("items") {
        Some(Value::Array(items)) => items.as_slice(),
        Some(Value::Null) | None => &[],
        Some(_) => return Err( malformed!("'items' is not an array"))
    };

    let mut observations: Vec<Observation<R>> = Vec::with_capacity( items.len());
    let mut skipped = 0;

    for item in items {
        match decode_item::<R>( item) {
            Ok(obs) => observations.push( obs),
            Err(e) => {
                warn!("skipping observation: {e}");
                skipped += 1;
            }
        }
    }

    observations.sort_by_key( |o| o.phenomenon_time);
    Ok( Batch { observations, skipped })
}

/// convenience function for streams of which we only need the newest value
pub fn latest_observation<R> (doc: &Value) -> Result<Option<Observation<R>>> where R: DeserializeOwned + Default {
    decode_batch( doc).map( |batch| batch.into_latest())
}

pub fn decode_item<R> (item: &Value) -> Result<Observation<R>> where R: DeserializeOwned + Default {
    let foi = item.get("foi@id").and_then( ObsId::from_value);
    let id = item.get("id").and_then( ObsId::from_value)
        .or_else( || foi.clone())
        .ok_or_else( || malformed!("item without identity"))?;

    let time_spec = item.get("phenomenonTime").and_then( Value::as_str)
        .ok_or_else( || malformed!("item {id} without phenomenonTime"))?;
    let phenomenon_time = parse_phenomenon_time( time_spec)
        .ok_or_else( || malformed!("item {id} has invalid phenomenonTime '{time_spec}'"))?;

    let result = match item.get("result") {
        Some(v) => R::deserialize(v).unwrap_or_else( |e| {
            debug!("item {id} result does not match, using defaults: {e}");
            R::default()
        }),
        None => R::default()
    };

    Ok( Observation { id, foi: foi.map( |f| f.as_str().to_string()), phenomenon_time, result })
}

/// RFC 3339 time, with or without offset (a missing offset is taken as UTC)
pub fn parse_phenomenon_time (s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339( s).map( |dt| dt.with_timezone(&Utc)).ok()
        .or_else( || {
            chrono::NaiveDateTime::parse_from_str( s, "%Y-%m-%dT%H:%M:%S%.f").ok().map( |ndt| ndt.and_utc())
        })
}

/* #endregion batch decoding */
