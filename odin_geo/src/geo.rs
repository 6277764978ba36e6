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

//! geodetic points and the spherical earth primitives we need to turn observations into map geometry.
//! We wrap `geo_types::Point` (x = longitude, y = latitude in degrees) so that results can be handed to
//! GeoJSON and `geo` algorithms without copying, and add the optional altitude that sensor reports carry.

use std::fmt;
use serde::{Serialize,Deserialize};
use geo_types::{Coord, Point};
use uom::si::f64::Length;
use uom::si::length::meter;

use crate::{asin, atan2, cos, deg, pow2, rad, sin, sqrt};
use crate::angle::{is_latitude, is_longitude, normalize_180, normalize_90};
use crate::geo_constants::EARTH_RADIUS;

pub type GeoCoord = Coord<f64>;

/* #region GeoPoint ***********************************************************************************************/

/// a point on the earth surface in geodetic degrees, with an optional altitude in meters.
/// Constructors normalize longitude into [-180..180] and latitude into [-90..90]
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
#[serde(from="GeoPointRepr", into="GeoPointRepr")]
pub struct GeoPoint {
    point: Point,
    alt: Option<f64>,
}

impl GeoPoint {
    pub fn from_lon_lat_degrees (lon: f64, lat: f64) -> Self {
        GeoPoint { point: Point::new( normalize_180(lon), normalize_90(lat)), alt: None }
    }

    pub fn from_lon_lat_degrees_alt_meters (lon: f64, lat: f64, alt: f64) -> Self {
        GeoPoint { point: Point::new( normalize_180(lon), normalize_90(lat)), alt: Some(alt) }
    }

    /// strict constructor for untrusted input - returns None if values are not finite or outside of the
    /// geodetic ranges (no normalization)
    pub fn try_from_lon_lat_degrees (lon: f64, lat: f64) -> Option<Self> {
        if is_longitude(lon) && is_latitude(lat) {
            Some( GeoPoint { point: Point::new( lon, lat), alt: None })
        } else {
            None
        }
    }

    pub fn with_altitude_meters (self, alt: Option<f64>) -> Self {
        GeoPoint { point: self.point, alt: alt.filter( |a| a.is_finite()) }
    }

    /// the surface point underneath (altitude dropped)
    pub fn surface (&self) -> Self {
        GeoPoint { point: self.point, alt: None }
    }

    #[inline] pub fn longitude_degrees (&self) -> f64 { self.point.x() }
    #[inline] pub fn latitude_degrees (&self) -> f64 { self.point.y() }
    #[inline] pub fn altitude_meters (&self) -> Option<f64> { self.alt }

    pub fn altitude (&self) -> Option<Length> { self.alt.map( |a| Length::new::<meter>(a)) }

    pub fn point (&self) -> &Point { &self.point }
    pub fn coord (&self) -> GeoCoord { self.point.0 }

    pub fn is_finite (&self) -> bool {
        self.point.x().is_finite() && self.point.y().is_finite()
    }

    /// GeoJSON position `[lon,lat]`
    pub fn to_position (&self) -> Vec<f64> {
        vec![ self.point.x(), self.point.y() ]
    }

    /// linear interpolation in degree space (not along a great circle). Altitude is only interpolated
    /// if both ends have one
    pub fn lerp (&self, other: &GeoPoint, t: f64) -> GeoPoint {
        let lon = self.point.x() + (other.point.x() - self.point.x()) * t;
        let lat = self.point.y() + (other.point.y() - self.point.y()) * t;
        let alt = match (self.alt, other.alt) {
            (Some(a0), Some(a1)) => Some( a0 + (a1 - a0) * t),
            _ => None
        };
        GeoPoint { point: Point::new( lon, lat), alt }
    }
}

impl fmt::Display for GeoPoint {
    fn fmt (&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.alt {
            Some(alt) => write!(f, "[{},{},{}]", self.point.x(), self.point.y(), alt),
            None => write!(f, "[{},{}]", self.point.x(), self.point.y())
        }
    }
}

/// serialized form. Deserialization accepts the same field aliases as other ODIN geo types so that
/// we can read `geo` (x,y) and verbose (longitude,latitude) input
#[derive(Serialize,Deserialize)]
struct GeoPointRepr {
    #[serde(alias="longitude", alias="x")]
    lon: f64,
    #[serde(alias="latitude", alias="y")]
    lat: f64,
    #[serde(default, alias="altitude", alias="z", skip_serializing_if="Option::is_none")]
    alt: Option<f64>,
}

impl From<GeoPointRepr> for GeoPoint {
    fn from (r: GeoPointRepr) -> Self {
        GeoPoint::from_lon_lat_degrees( r.lon, r.lat).with_altitude_meters( r.alt)
    }
}

impl From<GeoPoint> for GeoPointRepr {
    fn from (p: GeoPoint) -> Self {
        GeoPointRepr { lon: p.longitude_degrees(), lat: p.latitude_degrees(), alt: p.alt }
    }
}

/* #endregion GeoPoint */

/* #region spherical earth functions ******************************************************************************/

/// forward geodesic on a sphere with [`EARTH_RADIUS`]: the point reached when travelling `dist` from `origin`
/// along the great circle with initial bearing `bearing_deg` (clockwise from north, not normalized).
/// There is no bound on the distance. The result is a surface point with longitude normalized to [-180..180]
pub fn destination (origin: &GeoPoint, bearing_deg: f64, dist: Length) -> GeoPoint {
    let d = dist.get::<meter>() / EARTH_RADIUS; // angular distance
    let brg = rad(bearing_deg);
    let lat1 = rad( origin.latitude_degrees());
    let lon1 = rad( origin.longitude_degrees());

    let lat2 = asin( sin(lat1)*cos(d) + cos(lat1)*sin(d)*cos(brg));
    let lon2 = lon1 + atan2( sin(brg)*sin(d)*cos(lat1), cos(d) - sin(lat1)*sin(lat2));

    GeoPoint::from_lon_lat_degrees( deg(lon2), deg(lat2))
}

/// flat earth approximation of moving `east`/`north` from `origin`. Only valid close to the origin, and
/// degenerates towards the poles since the longitude delta is divided by cos(latitude) - we accept that error.
/// If the longitude delta becomes non-finite the origin longitude is kept
pub fn local_offset (origin: &GeoPoint, east: Length, north: Length) -> GeoPoint {
    let lat = origin.latitude_degrees();
    let lon = origin.longitude_degrees();

    let d_lat = deg( north.get::<meter>() / EARTH_RADIUS);
    let d_lon = deg( east.get::<meter>() / (EARTH_RADIUS * cos( rad(lat))));

    let lon2 = if d_lon.is_finite() { lon + d_lon } else { lon };
    GeoPoint::from_lon_lat_degrees( lon2, lat + d_lat)
}

/// haversine great circle distance on a sphere with [`EARTH_RADIUS`]
pub fn approx_distance (a: &GeoPoint, b: &GeoPoint) -> Length {
    let lat1 = rad( a.latitude_degrees());
    let lat2 = rad( b.latitude_degrees());
    let d_lat = rad( b.latitude_degrees() - a.latitude_degrees());
    let d_lon = rad( b.longitude_degrees() - a.longitude_degrees());

    let h = (pow2( sin(d_lat/2.0)) + cos(lat1) * cos(lat2) * pow2( sin(d_lon/2.0))).clamp(0.0, 1.0);
    let c = 2.0 * atan2( sqrt(h), sqrt(1.0 - h));

    Length::new::<meter>( EARTH_RADIUS * c)
}

/* #endregion spherical earth functions */
