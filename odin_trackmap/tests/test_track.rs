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

use chrono::{DateTime, Duration, TimeZone, Utc};
use geojson::GeoJson;
use odin_trackmap::observation::{GeoFix, LocationResult, ObsId, Observation};
use odin_trackmap::track::*;

// run with "cargo test test_interpolated_path -- --nocapture"

fn t0 () -> DateTime<Utc> {
    Utc.with_ymd_and_hms( 2025, 1, 5, 13, 7, 0).unwrap()
}

fn obs (id: &str, secs: i64, lon: f64, lat: f64) -> Observation<LocationResult> {
    Observation {
        id: ObsId::from(id),
        foi: None,
        phenomenon_time: t0() + Duration::seconds(secs),
        result: LocationResult { location: Some( GeoFix { lat: Some(lat), lon: Some(lon), alt: None }) },
    }
}

fn no_position (id: &str, secs: i64) -> Observation<LocationResult> {
    Observation { id: ObsId::from(id), foi: None, phenomenon_time: t0() + Duration::seconds(secs), result: LocationResult::default() }
}

fn abc () -> Vec<Observation<LocationResult>> {
    vec![ obs("a", 0, 0.0, 0.0), obs("b", 1, 0.0, 1.0), obs("c", 2, 0.0, 2.0) ]
}

#[test]
fn test_interpolated_path() {
    let mut track = TrackAccumulator::new();
    assert_eq!( track.accept_batch( &abc()), 3);

    let path = track.interpolated_path( 2);
    let coords = path.coordinates();
    println!("path: {coords:?}");

    let expected = vec![ vec![0.0,0.0], vec![0.0,0.5], vec![0.0,1.0], vec![0.0,1.5], vec![0.0,2.0] ];
    assert_eq!( coords, expected);
}

#[test]
fn test_replay_is_idempotent() {
    let mut track = TrackAccumulator::new();
    track.accept_batch( &abc());
    let before = track.points().to_vec();

    // the same document polled again
    assert_eq!( track.accept_batch( &abc()), 0);
    assert_eq!( track.points(), before.as_slice());
    assert_eq!( track.accept( &obs("a", 0, 0.0, 0.0)), AcceptResult::Duplicate);
    assert_eq!( track.seen_count(), 3);
}

#[test]
fn test_stale_and_same_time() {
    let mut track = TrackAccumulator::new();
    assert!( track.accept( &obs("a", 10, 0.0, 0.0)).point_appended());

    assert_eq!( track.accept( &obs("old", 5, 1.0, 1.0)), AcceptResult::Stale);
    assert_eq!( track.accept( &obs("same", 10, 1.0, 1.0)), AcceptResult::Stale);
    assert!( !track.has_seen( &ObsId::from("old")));

    assert!( track.accept( &obs("new", 11, 1.0, 1.0)).is_accepted());
    assert_eq!( track.len(), 2);
    assert_eq!( track.last_time(), Some( t0() + Duration::seconds(11)));
}

#[test]
fn test_position_less_observations() {
    let mut track = TrackAccumulator::new();
    assert_eq!( track.accept( &no_position("p", 1)), AcceptResult::Accepted { point_appended: false });
    assert!( track.is_empty());
    assert_eq!( track.phase(), TrackPhase::Accumulating);

    // it still advances the time watermark
    assert_eq!( track.accept( &obs("q", 0, 0.0, 0.0)), AcceptResult::Stale);
}

#[test]
fn test_reset() {
    let mut track = TrackAccumulator::new();
    track.accept_batch( &abc());
    track.reset();

    assert!( track.is_empty());
    assert_eq!( track.seen_count(), 0);
    assert_eq!( track.last_time(), None);
    assert_eq!( track.phase(), TrackPhase::Empty);

    // identities are forgotten
    assert_eq!( track.accept_batch( &abc()), 3);
}

#[test]
fn test_path_edge_cases() {
    let mut track = TrackAccumulator::new();
    assert!( track.interpolated_path( 10).is_empty());

    track.accept( &obs("a", 0, 5.0, 6.0));
    let path = track.interpolated_path( 10);
    assert_eq!( path.coordinates(), vec![ vec![5.0,6.0] ]);

    track.accept( &obs("b", 1, 6.0, 6.0));
    assert_eq!( track.interpolated_path( 10).len(), 11);

    match track.interpolated_path( 10).to_geojson() {
        GeoJson::FeatureCollection(fc) => {
            assert_eq!( fc.features.len(), 1);
            let geom = fc.features[0].geometry.as_ref().unwrap();
            assert!( matches!( geom.value, geojson::Value::LineString(_)));
        }
        other => panic!("unexpected geojson {other:?}")
    }
}
