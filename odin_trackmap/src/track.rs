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

use std::collections::HashSet;
use chrono::{DateTime,Utc};
use geojson::{Feature, FeatureCollection, GeoJson, Geometry};
use tracing::trace;
use odin_geo::GeoPoint;

use crate::observation::{ObsId, Observation, Positional};

#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum TrackPhase {
    Empty,
    Accumulating,
}

#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum AcceptResult {
    /// identity was already seen - state unchanged
    Duplicate,
    /// not strictly newer than the last accepted observation - state unchanged
    Stale,
    Accepted { point_appended: bool },
}

impl AcceptResult {
    pub fn point_appended (&self) -> bool {
        matches!( self, AcceptResult::Accepted{ point_appended: true })
    }

    pub fn is_accepted (&self) -> bool {
        matches!( self, AcceptResult::Accepted{..})
    }
}

/// the (deduplicated, chronological) position history of one moving object.
///
/// Observations are accepted if their identity has not been seen before and - once anything was accepted -
/// their phenomenon time is strictly newer than the last accepted one. If several observations share the same
/// timestamp the first one processed wins and the others are reported as [`AcceptResult::Stale`].
/// Accepted points are never removed or changed other than by [`TrackAccumulator::reset`]
#[derive(Debug,Default)]
pub struct TrackAccumulator {
    points: Vec<GeoPoint>,
    seen: HashSet<ObsId>,
    last_time: Option<DateTime<Utc>>,
}

impl TrackAccumulator {
    pub fn new () -> Self {
        TrackAccumulator::default()
    }

    pub fn accept<R: Positional> (&mut self, obs: &Observation<R>) -> AcceptResult {
        if self.seen.contains( &obs.id) {
            return AcceptResult::Duplicate
        }
        if let Some(last_time) = self.last_time && obs.phenomenon_time <= last_time {
            trace!("stale observation {} at {}", obs.id, obs.phenomenon_time);
            return AcceptResult::Stale
        }

        self.seen.insert( obs.id.clone());
        self.last_time = Some(obs.phenomenon_time);

        // position-less observations are only kept for bookkeeping
        let point_appended = if let Some(p) = obs.result.position() {
            self.points.push( p);
            true
        } else {
            false
        };

        AcceptResult::Accepted { point_appended }
    }

    /// accept all observations in order, returning the number of appended points
    pub fn accept_batch<R: Positional> (&mut self, observations: &[Observation<R>]) -> usize {
        observations.iter().filter( |obs| self.accept( obs).point_appended()).count()
    }

    pub fn reset (&mut self) {
        self.points.clear();
        self.seen.clear();
        self.last_time = None;
    }

    pub fn latest (&self) -> Option<&GeoPoint> {
        self.points.last()
    }

    pub fn points (&self) -> &[GeoPoint] {
        self.points.as_slice()
    }

    pub fn len (&self) -> usize { self.points.len() }

    pub fn is_empty (&self) -> bool { self.points.is_empty() }

    pub fn seen_count (&self) -> usize { self.seen.len() }

    pub fn has_seen (&self, id: &ObsId) -> bool { self.seen.contains(id) }

    pub fn last_time (&self) -> Option<DateTime<Utc>> { self.last_time }

    pub fn phase (&self) -> TrackPhase {
        if self.last_time.is_some() { TrackPhase::Accumulating } else { TrackPhase::Empty }
    }

    /// resample the history by subdividing each consecutive pair into `segments_per_span` linear steps,
    /// followed by the exact last point
    pub fn interpolated_path (&self, segments_per_span: usize) -> InterpolatedPath {
        InterpolatedPath::from_points( &self.points, segments_per_span)
    }
}

/// derived polyline - recomputed whenever the track changes
#[derive(Debug,Clone,PartialEq,Default)]
pub struct InterpolatedPath {
    points: Vec<GeoPoint>,
}

impl InterpolatedPath {
    pub fn from_points (points: &[GeoPoint], segments_per_span: usize) -> Self {
        let Some(last) = points.last() else { return InterpolatedPath::default() };

        let mut resampled: Vec<GeoPoint> = Vec::with_capacity( (points.len()-1) * segments_per_span + 1);
        for span in points.windows(2) {
            for j in 0..segments_per_span {
                let t = j as f64 / segments_per_span as f64;
                resampled.push( span[0].lerp( &span[1], t));
            }
        }
        resampled.push( *last);

        InterpolatedPath { points: resampled }
    }

    pub fn points (&self) -> &[GeoPoint] { self.points.as_slice() }

    pub fn len (&self) -> usize { self.points.len() }

    pub fn is_empty (&self) -> bool { self.points.is_empty() }

    /// `[[lon,lat],..]` coordinate list
    pub fn coordinates (&self) -> Vec<Vec<f64>> {
        self.points.iter().map( |p| p.to_position()).collect()
    }

    pub fn to_line_string (&self) -> Geometry {
        Geometry::new( geojson::Value::LineString( self.coordinates()))
    }

    /// single LineString feature collection, which is what route sources are fed with
    pub fn to_geojson (&self) -> GeoJson {
        let feature = Feature {
            bbox: None,
            geometry: Some( self.to_line_string()),
            id: None,
            properties: Some( serde_json::Map::new()),
            foreign_members: None,
        };
        GeoJson::FeatureCollection( FeatureCollection { bbox: None, features: vec![feature], foreign_members: None })
    }
}
