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

use std::collections::BTreeMap;
use chrono::{DateTime,Utc};
use serde::Serialize;
use serde_json::json;
use geojson::GeoJson;
use tracing::warn;
use odin_geo::GeoPoint;

use crate::observation::{AisResult, Batch, Positional};
use crate::layers::{feature_collection, point_feature};

/// last known state of a vessel, keyed by its MMSI
#[derive(Debug,Clone,PartialEq,Serialize)]
pub struct AisContact {
    pub mmsi: u64,
    pub name: String,
    pub position: GeoPoint,
    /// speed over ground
    pub speed: Option<f64>,
    pub heading: Option<f64>,
    pub last_seen: DateTime<Utc>,
}

#[derive(Debug,Clone,Copy,Default,PartialEq,Eq)]
pub struct AisUpdate {
    pub inserted: usize,
    pub updated: usize,
    pub skipped: usize,
}

impl AisUpdate {
    pub fn changed (&self) -> bool { self.inserted > 0 || self.updated > 0 }
}

#[derive(Debug,Default)]
pub struct AisStore {
    contacts: BTreeMap<u64,AisContact>,
    selected: Option<u64>,
}

impl AisStore {
    pub fn new () -> Self { AisStore::default() }

    /// upsert all observations with a numeric feature-of-interest id (the MMSI) and a valid location.
    /// Observations are processed in batch order so the newest report of a vessel wins
    pub fn apply_batch (&mut self, batch: &Batch<AisResult>) -> AisUpdate {
        let mut update = AisUpdate { skipped: batch.skipped, ..AisUpdate::default() };

        for obs in &batch.observations {
            let Some(mmsi) = obs.foi.as_deref().and_then( |s| s.trim().parse::<u64>().ok()) else {
                warn!("skipping AIS observation {} without MMSI", obs.id);
                update.skipped += 1;
                continue
            };
            let Some(position) = obs.result.position() else {
                update.skipped += 1;
                continue
            };

            let name = match obs.result.name.as_deref().map( str::trim) {
                Some(name) if !name.is_empty() => name.to_string(),
                _ => mmsi.to_string()
            };

            let contact = AisContact { mmsi, name, position, speed: obs.result.sog, heading: obs.result.heading, last_seen: obs.phenomenon_time };
            if self.contacts.insert( mmsi, contact).is_some() {
                update.updated += 1;
            } else {
                update.inserted += 1;
            }
        }

        update
    }

    pub fn get (&self, mmsi: u64) -> Option<&AisContact> { self.contacts.get( &mmsi) }

    pub fn len (&self) -> usize { self.contacts.len() }

    pub fn is_empty (&self) -> bool { self.contacts.is_empty() }

    pub fn contacts (&self) -> impl Iterator<Item=&AisContact> { self.contacts.values() }

    /// mark the contact the UI shows details for. Unknown MMSIs clear the selection
    pub fn select (&mut self, mmsi: u64) -> Option<&AisContact> {
        self.selected = self.contacts.contains_key( &mmsi).then_some( mmsi);
        self.selected.and_then( |id| self.contacts.get( &id))
    }

    pub fn selected (&self) -> Option<&AisContact> {
        self.selected.and_then( |id| self.contacts.get( &id))
    }

    pub fn reset (&mut self) {
        self.contacts.clear();
        self.selected = None;
    }

    pub fn to_feature_collection (&self) -> GeoJson {
        let features = self.contacts.values().map( |c| {
            let mut props = serde_json::Map::new();
            props.insert( "mmsi".to_string(), json!(c.mmsi));
            props.insert( "name".to_string(), json!(c.name));
            props.insert( "speed".to_string(), json!(c.speed));
            props.insert( "heading".to_string(), json!(c.heading));
            props.insert( "selected".to_string(), json!( self.selected == Some(c.mmsi)));
            point_feature( &c.position, props)
        }).collect();

        feature_collection( features)
    }
}
