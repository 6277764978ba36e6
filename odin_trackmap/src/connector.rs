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

use std::{collections::{HashMap,VecDeque}, sync::Mutex, time::Duration};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::errors::{op_failed, Result};

/// where observation and frame list documents come from. Implementations are used for dependency injection
/// into [`crate::session::TrackMapSession`], which calls them from spawned tasks
#[async_trait]
pub trait ObservationSource: Send + Sync + 'static {
    async fn fetch_json (&self, url: &str) -> Result<Value>;
}

/// plain http GET source
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new () -> Result<Self> {
        let client = Client::builder()
            .timeout( Duration::from_secs(30))
            .build()?;
        Ok( HttpSource { client })
    }

    pub fn with_client (client: Client) -> Self {
        HttpSource { client }
    }
}

#[async_trait]
impl ObservationSource for HttpSource {
    async fn fetch_json (&self, url: &str) -> Result<Value> {
        debug!("GET {url}");
        let response = self.client.get( url).send().await?.error_for_status()?;
        let doc = response.json::<Value>().await?;
        Ok(doc)
    }
}

/// replays queued responses per url, in order. Once the queue of a url holds a single response that one
/// is repeated, urls without responses fail
#[derive(Default)]
pub struct ScriptedSource {
    responses: Mutex<HashMap<String,VecDeque<std::result::Result<Value,String>>>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedSource {
    pub fn new () -> Self { ScriptedSource::default() }

    pub fn push_ok (&self, url: &str, doc: Value) {
        self.push( url, Ok(doc))
    }

    pub fn push_err (&self, url: &str, msg: &str) {
        self.push( url, Err(msg.to_string()))
    }

    fn push (&self, url: &str, response: std::result::Result<Value,String>) {
        if let Ok(mut responses) = self.responses.lock() {
            responses.entry( url.to_string()).or_default().push_back( response);
        }
    }

    /// urls requested so far, in request order
    pub fn requests (&self) -> Vec<String> {
        self.requests.lock().map( |r| r.clone()).unwrap_or_default()
    }

    fn next_response (&self, url: &str) -> Result<Value> {
        let mut responses = self.responses.lock().map_err( |_| op_failed!("scripted responses poisoned"))?;
        let queue = responses.get_mut( url).ok_or_else( || op_failed!("no response for {url}"))?;

        let response = if queue.len() > 1 { queue.pop_front() } else { queue.front().cloned() };
        match response {
            Some(Ok(doc)) => Ok(doc),
            Some(Err(msg)) => Err( op_failed!("{msg}")),
            None => Err( op_failed!("no response for {url}"))
        }
    }
}

#[async_trait]
impl ObservationSource for ScriptedSource {
    async fn fetch_json (&self, url: &str) -> Result<Value> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push( url.to_string());
        }
        self.next_response( url)
    }
}
