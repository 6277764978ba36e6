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

use serde_json::json;
use odin_trackmap::observation::*;
use odin_trackmap::errors::OdinTrackMapError;

// run with "cargo test test_decode_route_batch -- --nocapture"

#[test]
fn test_decode_route_batch() {
    let doc = json!({
        "items": [
            { "id": "b", "foi@id": "uav1", "phenomenonTime": "2025-01-05T13:07:10Z",
              "result": { "geoRef": { "center": { "lat": 34.1, "lon": -118.2, "alt": 120.0 } } } },
            { "id": "a", "foi@id": "uav1", "phenomenonTime": "2025-01-05T13:07:00Z",
              "result": { "geoRef": { "center": { "lat": 34.0, "lon": -118.1 } } } },
            { "id": "c", "phenomenonTime": "not a time", "result": {} },
            { "phenomenonTime": "2025-01-05T13:07:20Z" }
        ]
    });

    let batch: Batch<ImageFrameResult> = decode_batch( &doc).unwrap();
    println!("decoded {} observations, skipped {}", batch.len(), batch.skipped);

    assert_eq!( batch.len(), 2);
    assert_eq!( batch.skipped, 2);
    assert_eq!( batch.observations[0].id, ObsId::from("a")); // sorted by time
    assert_eq!( batch.observations[1].foi.as_deref(), Some("uav1"));

    let p = batch.latest().and_then( |o| o.result.position()).unwrap();
    assert_eq!( p.latitude_degrees(), 34.1);
    assert_eq!( p.altitude_meters(), Some(120.0));
}

#[test]
fn test_identity_kinds() {
    let doc = json!({
        "items": [
            { "id": 42, "phenomenonTime": "2025-01-05T13:07:00Z" },
            { "id": "42", "phenomenonTime": "2025-01-05T13:07:01Z" },
            { "foi@id": "vessel", "phenomenonTime": "2025-01-05T13:07:02Z" }
        ]
    });

    let batch: Batch<LocationResult> = decode_batch( &doc).unwrap();
    assert_eq!( batch.len(), 3);
    assert_eq!( batch.observations[0].id, ObsId::from(42));
    assert_eq!( batch.observations[1].id, ObsId::from("42"));
    assert_ne!( batch.observations[0].id, batch.observations[1].id);
    assert_eq!( batch.observations[2].id.as_str(), "vessel");
}

#[test]
fn test_missing_and_partial_results() {
    let doc = json!({
        "items": [
            { "id": "x", "phenomenonTime": "2025-01-05T13:07:00Z", "result": { "location": { "lat": 0.0, "lon": 0.0 } } },
            { "id": "y", "phenomenonTime": "2025-01-05T13:07:01Z", "result": { "location": { "lat": 95.0, "lon": 0.0 } } },
            { "id": "z", "phenomenonTime": "2025-01-05T13:07:02Z", "result": "garbage" }
        ]
    });

    let batch: Batch<LocationResult> = decode_batch( &doc).unwrap();
    assert_eq!( batch.len(), 3);

    // zero coordinates are valid positions
    assert!( batch.observations[0].result.position().is_some());
    assert!( batch.observations[1].result.position().is_none());
    assert!( batch.observations[2].result.location.is_none());
}

#[test]
fn test_document_shapes() {
    let empty: Batch<LocationResult> = decode_batch( &json!({})).unwrap();
    assert!( empty.is_empty());

    let null_items: Batch<LocationResult> = decode_batch( &json!({"items": null})).unwrap();
    assert!( null_items.is_empty());

    let res = decode_batch::<LocationResult>( &json!({"items": 42}));
    assert!( matches!( res, Err(OdinTrackMapError::MalformedObservation(_))));

    let res = decode_batch::<LocationResult>( &json!([1,2,3]));
    assert!( res.is_err());
}

#[test]
fn test_latest_attitude() {
    let doc = json!({
        "items": [
            { "id": 1, "phenomenonTime": "2025-01-05T13:07:05Z", "result": { "attitude": { "yaw": 20.0, "pitch": -10.0 } } },
            { "id": 2, "phenomenonTime": "2025-01-05T13:07:00Z", "result": { "attitude": { "yaw": 5.0 } } }
        ]
    });

    let obs = latest_observation::<AttitudeResult>( &doc).unwrap().unwrap();
    let att = obs.result.attitude.unwrap();
    assert_eq!( att.yaw, Some(20.0));
    assert_eq!( att.heading, None);

    assert!( latest_observation::<AttitudeResult>( &json!({"items": []})).unwrap().is_none());
}

#[test]
fn test_phenomenon_time() {
    let t1 = parse_phenomenon_time( "2025-01-05T13:07:00Z").unwrap();
    let t2 = parse_phenomenon_time( "2025-01-05T14:07:00+01:00").unwrap();
    let t3 = parse_phenomenon_time( "2025-01-05T13:07:00.000").unwrap();
    assert_eq!( t1, t2);
    assert_eq!( t1, t3);
    assert!( parse_phenomenon_time( "yesterday").is_none());
}
