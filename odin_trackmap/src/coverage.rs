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

//! ground footprints of a camera sensor. There are two alternative strategies the caller chooses from:
//!  - [`CoverageStrategy::Frustum`] intersects the four frustum corner rays (derived from position, altitude,
//!    composed attitude and FOV) with a spherical earth
//!  - [`CoverageStrategy::CornerCircle`] fits a circle through four reported image frame corners
//!
//! Neither of them fails. Degenerate input produces a degenerate but closed and finite ring.

use serde::{Serialize,Deserialize};
use serde_json::json;
use geojson::{Feature, FeatureCollection, GeoJson, Geometry};
use uom::si::f64::Length;
use uom::si::length::meter;
use odin_geo::{GeoPoint, AttitudeVector, destination, local_offset, approx_distance};

use crate::config::CoverageConfig;

#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize,Deserialize)]
pub enum CoverageStrategy {
    Frustum,
    CornerCircle,
}

/// image frame corners in the order upper-left, upper-right, lower-right, lower-left
#[derive(Debug,Clone,Copy,PartialEq)]
pub struct ImageCorners {
    pub ulc: GeoPoint,
    pub urc: GeoPoint,
    pub lrc: GeoPoint,
    pub llc: GeoPoint,
}

impl ImageCorners {
    pub fn as_array (&self) -> [GeoPoint;4] {
        [self.ulc, self.urc, self.lrc, self.llc]
    }
}

#[derive(Debug,Clone,Copy,PartialEq)]
pub struct CircleFit {
    pub center: GeoPoint,
    pub radius: Length,
}

/// closed ground ring (first vertex repeated as last) tagged with the platform position it was computed for
#[derive(Debug,Clone,PartialEq)]
pub struct CoverageFootprint {
    origin: GeoPoint,
    ring: Vec<GeoPoint>,
    circle: Option<CircleFit>,
}

impl CoverageFootprint {
    pub fn origin (&self) -> &GeoPoint { &self.origin }
    pub fn ring (&self) -> &[GeoPoint] { self.ring.as_slice() }
    pub fn circle (&self) -> Option<&CircleFit> { self.circle.as_ref() }

    pub fn is_closed (&self) -> bool {
        self.ring.len() >= 4 && self.ring.first() == self.ring.last()
    }

    pub fn is_finite (&self) -> bool {
        self.ring.iter().all( |p| p.is_finite())
    }

    /// vertex average of the ring, closing vertex included
    pub fn centroid (&self) -> GeoPoint {
        if self.ring.is_empty() { return self.origin.surface() }

        let n = self.ring.len() as f64;
        let (lon, lat) = self.ring.iter().fold( (0.0,0.0), |(lon,lat), p| (lon + p.longitude_degrees(), lat + p.latitude_degrees()));
        GeoPoint::from_lon_lat_degrees( lon / n, lat / n)
    }

    /// line from platform position to the footprint centroid
    pub fn sight_line (&self) -> Geometry {
        let c = self.centroid();
        Geometry::new( geojson::Value::LineString( vec![ self.origin.to_position(), c.to_position() ]))
    }

    pub fn to_polygon (&self) -> Geometry {
        let coords: Vec<Vec<f64>> = self.ring.iter().map( |p| p.to_position()).collect();
        Geometry::new( geojson::Value::Polygon( vec![coords]))
    }

    /// polygon feature. Circle fits carry their `circleCenter` and `radiusMeters` as properties
    pub fn to_feature (&self) -> Feature {
        let mut properties = serde_json::Map::new();
        if let Some(circle) = &self.circle {
            properties.insert( "circleCenter".to_string(), json!({
                "lat": circle.center.latitude_degrees(),
                "lon": circle.center.longitude_degrees()
            }));
            properties.insert( "radiusMeters".to_string(), json!( circle.radius.get::<meter>()));
        }

        Feature { bbox: None, geometry: Some( self.to_polygon()), id: None, properties: Some(properties), foreign_members: None }
    }

    pub fn to_geojson (&self) -> GeoJson {
        GeoJson::FeatureCollection( FeatureCollection { bbox: None, features: vec![self.to_feature()], foreign_members: None })
    }

    pub fn sight_line_geojson (&self) -> GeoJson {
        let feature = Feature {
            bbox: None, geometry: Some( self.sight_line()), id: None, properties: Some( serde_json::Map::new()), foreign_members: None
        };
        GeoJson::FeatureCollection( FeatureCollection { bbox: None, features: vec![feature], foreign_members: None })
    }
}

#[derive(Debug,Clone)]
pub struct CoverageProjector {
    config: CoverageConfig,
}

impl CoverageProjector {
    pub fn new (config: CoverageConfig) -> Self {
        CoverageProjector { config }
    }

    pub fn config (&self) -> &CoverageConfig { &self.config }

    /// frustum projection. Corners are computed in the order (-h,-v), (+h,-v), (+h,+v), (-h,+v) of half FOV offsets
    /// from the boresight. Corner pitch is not re-clamped, which means corner rays beyond nadir are projected
    /// backwards - this is part of the small angle approximation we use
    pub fn project (&self, position: &GeoPoint, altitude: Length, attitude: &AttitudeVector, h_fov: f64, v_fov: f64) -> CoverageFootprint {
        let h = h_fov / 2.0;
        let v = v_fov / 2.0;

        let mut ring: Vec<GeoPoint> = [(-h,-v), (h,-v), (h,v), (-h,v)].iter()
            .map( |(dh,dv)| self.corner( position, altitude, attitude, *dh, *dv))
            .collect();
        ring.push( ring[0]);

        CoverageFootprint { origin: *position, ring, circle: None }
    }

    fn corner (&self, position: &GeoPoint, altitude: Length, attitude: &AttitudeVector, dh: f64, dv: f64) -> GeoPoint {
        let yaw = attitude.heading() + dh;
        let pitch = (attitude.pitch() + dv).abs();
        let fallback = self.config.fallback_range.get::<meter>();

        let range = if pitch < self.config.pitch_epsilon {
            fallback
        } else {
            altitude.get::<meter>() / pitch.to_radians().tan()
        };
        let range = if range.is_finite() { range } else { fallback };

        let p = destination( position, yaw, Length::new::<meter>(range));
        if p.is_finite() { p } else { position.surface() }
    }

    /// circle approximation from reported frame corners: centered on the corner average with the mean
    /// corner distance as radius. The corner average does not handle the antimeridian
    pub fn circle_from_corners (&self, origin: &GeoPoint, corners: &ImageCorners) -> CoverageFootprint {
        let cs = corners.as_array();
        let (lon, lat) = cs.iter().fold( (0.0,0.0), |(lon,lat), p| (lon + p.longitude_degrees(), lat + p.latitude_degrees()));
        let center = GeoPoint::from_lon_lat_degrees( lon / 4.0, lat / 4.0);

        let mean_dist = cs.iter().map( |p| approx_distance( &center, p).get::<meter>()).sum::<f64>() / 4.0;
        let r = if mean_dist.is_finite() && mean_dist > 0.0 { mean_dist } else { self.config.default_circle_radius.get::<meter>() };

        let n = self.config.circle_segments.max(3);
        let mut ring: Vec<GeoPoint> = (0..n).map( |i| {
            let angle = 2.0 * std::f64::consts::PI * i as f64 / n as f64;
            let p = local_offset( &center, Length::new::<meter>( r * angle.cos()), Length::new::<meter>( r * angle.sin()));
            if p.is_finite() { p } else { center }
        }).collect();
        ring.push( ring[0]);

        let circle = Some( CircleFit { center, radius: Length::new::<meter>(r) });
        CoverageFootprint { origin: *origin, ring, circle }
    }
}
