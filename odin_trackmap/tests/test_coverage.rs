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
#![allow(unused)]

use uom::si::f64::Length;
use uom::si::length::meter;
use geojson::GeoJson;
use odin_geo::{GeoPoint, AttitudeVector, approx_distance};
use odin_trackmap::config::CoverageConfig;
use odin_trackmap::coverage::*;
use odin_trackmap::layers;
use odin_trackmap::renderer::{MapRenderer, RecordingRenderer};

// run with "cargo test test_frustum -- --nocapture"

fn meters (m: f64) -> Length { Length::new::<meter>(m) }

fn projector () -> CoverageProjector { CoverageProjector::new( CoverageConfig::default()) }

#[test]
fn test_frustum_boresight() {
    let pos = GeoPoint::from_lon_lat_degrees( -118.0, 34.0);
    let att = AttitudeVector::new( 0.0, -45.0);

    let fp = projector().project( &pos, meters(1000.0), &att, 0.0, 0.0);
    println!("footprint: {:?}", fp.ring());

    assert_eq!( fp.ring().len(), 5);
    assert!( fp.is_closed());
    for p in fp.ring() {
        let d = approx_distance( &pos, p).get::<meter>();
        assert!( (d - 1000.0).abs() < 1.0, "corner distance {d}");
        assert!( p.latitude_degrees() > pos.latitude_degrees()); // heading north
    }
}

#[test]
fn test_frustum_corner_order() {
    let pos = GeoPoint::from_lon_lat_degrees( 0.0, 0.0);
    let att = AttitudeVector::new( 0.0, -45.0);
    let fp = projector().project( &pos, meters(1000.0), &att, 20.0, 10.0);
    let r = fp.ring();

    // (-h,-v) is left of the boresight, (+h,..) right
    assert!( r[0].longitude_degrees() < 0.0);
    assert!( r[1].longitude_degrees() > 0.0);
    assert!( r[2].longitude_degrees() > 0.0);
    assert!( r[3].longitude_degrees() < 0.0);
    assert_eq!( r[0], r[4]);
}

#[test]
fn test_degenerate_inputs_stay_finite() {
    let pos = GeoPoint::from_lon_lat_degrees( 10.0, 50.0);

    // level camera on the ground
    let fp = projector().project( &pos, meters(0.0), &AttitudeVector::new( 0.0, 0.0), 60.0, 40.0);
    assert!( fp.is_finite());
    assert!( fp.is_closed());

    // horizontal rays use the fallback range
    let fp = projector().project( &pos, meters(500.0), &AttitudeVector::new( 90.0, 0.0), 0.0, 0.0);
    for p in fp.ring() {
        let d = approx_distance( &pos, p).get::<meter>();
        assert!( (d - 10_000.0).abs() < 10.0, "fallback distance {d}");
    }

    let pole = GeoPoint::from_lon_lat_degrees( 0.0, 90.0);
    let fp = projector().project( &pole, meters(1000.0), &AttitudeVector::new( 0.0, -30.0), 30.0, 20.0);
    assert!( fp.is_finite());
}

#[test]
fn test_footprint_sweep_stays_closed_and_finite() {
    let proj = projector();
    let mut n = 0;

    for lat in [-90.0, -89.9, -45.0, 0.0, 45.0, 89.9, 90.0] {
        for lon in [-180.0, -179.9, 0.0, 179.9, 180.0] {
            let pos = GeoPoint::from_lon_lat_degrees( lon, lat);
            for alt in [-500.0, 0.0, 1.0, 1000.0, 50_000.0] {
                for heading in [0.0, 90.0, 180.0, 359.9] {
                    for pitch in [-90.0, -45.0, -0.001, 0.0, 30.0, 90.0] {
                        for fov in [0.0, 1.0, 60.0, 179.0, 360.0, 720.0] {
                            let fp = proj.project( &pos, meters(alt), &AttitudeVector::new( heading, pitch), fov, fov / 2.0);
                            assert!( fp.is_closed(), "open ring at {lon},{lat} alt {alt} att {heading}/{pitch} fov {fov}");
                            assert!( fp.is_finite(), "non-finite ring at {lon},{lat} alt {alt} att {heading}/{pitch} fov {fov}");
                            assert_eq!( fp.ring().len(), 5);
                            n += 1;
                        }
                    }
                }
            }
        }
    }
    println!("checked {n} footprints");
}

#[test]
fn test_corner_circle() {
    let origin = GeoPoint::from_lon_lat_degrees( 0.0, 0.0);
    let corners = ImageCorners {
        ulc: GeoPoint::from_lon_lat_degrees( -0.01, 0.01),
        urc: GeoPoint::from_lon_lat_degrees( 0.01, 0.01),
        lrc: GeoPoint::from_lon_lat_degrees( 0.01, -0.01),
        llc: GeoPoint::from_lon_lat_degrees( -0.01, -0.01),
    };

    let fp = projector().circle_from_corners( &origin, &corners);
    let circle = fp.circle().unwrap();
    let r = circle.radius.get::<meter>();
    println!("circle radius: {r} m");

    assert_eq!( fp.ring().len(), 61);
    assert!( fp.is_closed());
    assert!( circle.center.longitude_degrees().abs() < 1e-12);
    assert!( (r - approx_distance( &circle.center, &corners.ulc).get::<meter>()).abs() < 1e-6);

    for p in fp.ring() {
        let d = approx_distance( &circle.center, p).get::<meter>();
        assert!( (d - r).abs() / r < 0.01, "ring vertex at {d}");
    }
}

#[test]
fn test_coincident_corners_use_default_radius() {
    let p = GeoPoint::from_lon_lat_degrees( 5.0, 5.0);
    let corners = ImageCorners { ulc: p, urc: p, lrc: p, llc: p };
    let fp = projector().circle_from_corners( &p, &corners);
    assert_eq!( fp.circle().unwrap().radius.get::<meter>(), 1000.0);
}

#[test]
fn test_publish_coverage() {
    let pos = GeoPoint::from_lon_lat_degrees( 0.0, 0.0);
    let fp = projector().project( &pos, meters(1000.0), &AttitudeVector::new( 0.0, -45.0), 20.0, 10.0);

    let mut renderer = RecordingRenderer::new();
    layers::publish_coverage( &mut renderer, &fp).unwrap();
    layers::publish_coverage( &mut renderer, &fp).unwrap(); // second publish only updates data

    assert_eq!( renderer.layer_ids(), vec![ layers::COVERAGE_LAYER, layers::SIGHT_LINE_LAYER ]);

    match renderer.source_data( layers::SIGHT_LINE_SOURCE) {
        Some(GeoJson::FeatureCollection(fc)) => {
            let geom = fc.features[0].geometry.as_ref().unwrap();
            if let geojson::Value::LineString(coords) = &geom.value {
                assert_eq!( coords[0], vec![0.0, 0.0]); // starts at the platform
            } else {
                panic!("sight line is not a line string")
            }
        }
        other => panic!("no sight line data: {other:?}")
    }

    let circle = projector().circle_from_corners( &pos, &ImageCorners { ulc: pos, urc: pos, lrc: pos, llc: pos });
    layers::publish_coverage( &mut renderer, &circle).unwrap();
    assert!( renderer.has_layer( layers::FRAME_POLYGON_LAYER));
}
