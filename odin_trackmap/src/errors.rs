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

use thiserror::Error;
use reqwest;
use serde_json;
use ron;

pub type Result<T> = std::result::Result<T,OdinTrackMapError>;

/// note there is no variant for degenerate geometry - those cases are handled by documented fallback
/// values and never surface as errors
#[derive(Error,Debug)]
pub enum OdinTrackMapError {
    #[error("malformed observation {0}")]
    MalformedObservation(String),

    #[error("IO error {0}")]
    IOError( #[from] std::io::Error),

    #[error("reqwest error {0}")]
    ReqwestError( #[from] reqwest::Error),

    #[error("serde error {0}")]
    SerdeError( #[from] serde_json::Error),

    #[error("config RON error {0}")]
    RonError( #[from] ron::error::SpannedError),

    #[error("renderer error {0}")]
    RendererError(String),

    #[error("operation failed {0}")]
    OpFailedError(String)
}

impl OdinTrackMapError {
    /// errors that are worth a retry on the next polling cycle
    pub fn is_transient (&self) -> bool {
        matches!( self, Self::ReqwestError(_) | Self::SerdeError(_) | Self::IOError(_) | Self::OpFailedError(_))
    }
}

macro_rules! malformed {
    ($fmt:literal $(, $arg:expr )* ) => {
        crate::errors::OdinTrackMapError::MalformedObservation( format!( $fmt $(, $arg)* ))
    };
}
pub (crate) use malformed;

macro_rules! renderer_error {
    ($fmt:literal $(, $arg:expr )* ) => {
        crate::errors::OdinTrackMapError::RendererError( format!( $fmt $(, $arg)* ))
    };
}
pub (crate) use renderer_error;

macro_rules! op_failed {
    ($fmt:literal $(, $arg:expr )* ) => {
        crate::errors::OdinTrackMapError::OpFailedError( format!( $fmt $(, $arg)* ))
    };
}
pub (crate) use op_failed;
