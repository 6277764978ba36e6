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

//! UAV route, camera coverage, AIS and radar frame overlays for a web map.
//!
//! The crate polls OGC SensorThings style observation endpoints, accumulates the UAV route, projects the camera
//! footprint onto the ground and cycles time stamped radar tile layers. Everything that ends up on the map goes
//! through the [`renderer::MapRenderer`] abstraction, the [`session::TrackMapSession`] event loop owns all state.

pub mod errors;
pub mod observation;
pub mod track;
pub mod coverage;
pub mod renderer;
pub mod layers;
pub mod frames;
pub mod ais;
pub mod track_data;
pub mod config;
pub mod scheduler;
pub mod connector;
pub mod session;

pub use errors::{OdinTrackMapError, Result};
pub use observation::{ObsId, Observation, Batch, decode_batch, latest_observation};
pub use track::{TrackAccumulator, AcceptResult, InterpolatedPath};
pub use coverage::{CoverageProjector, CoverageFootprint, CoverageStrategy};
pub use renderer::{MapRenderer, RecordingRenderer, LoggingRenderer};
pub use frames::{FrameSequencer, OverlayFrame, SequencerMode, SequencerState};
pub use config::{TrackMapConfig, load_config};
pub use session::{TrackMapSession, SessionHandle, SessionCommand, SessionEvent, SessionFeatures};
