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

use std::{path::{Path,PathBuf}, sync::Arc};
use lazy_static::lazy_static;
use anyhow::Result;
use clap::Parser;
use strum::EnumString;
use tracing::{info,warn};
use tracing_subscriber::EnvFilter;

use odin_trackmap::{
    config::{load_config, TrackMapConfig},
    connector::HttpSource,
    frames::FrameMode,
    renderer::LoggingRenderer,
    session::{SessionCommand, SessionFeatures, TrackMapSession},
};

const DEFAULT_CONFIG: &str = "configs/trackmap.ron";

#[derive(Debug,Clone,Copy,EnumString)]
#[strum(serialize_all="kebab-case")]
enum CliFrameMode { Strip, SingleMatch }

/// poll UAV route, camera coverage, AIS and radar frames and log the resulting map commands
#[derive(Parser,Debug)]
#[command(version, about)]
struct CliOpts {
    /// RON config file (configs/trackmap.ron if it exists, built in defaults otherwise)
    #[arg(short,long)]
    config: Option<PathBuf>,

    /// radar frame mode (strip, single-match)
    #[arg(short,long)]
    mode: Option<CliFrameMode>,

    /// radar frame epoch seconds to show in single-match mode
    #[arg(short,long)]
    target_time: Option<i64>,

    /// don't poll AIS contacts
    #[arg(long)]
    no_ais: bool,

    /// don't poll radar frames
    #[arg(long)]
    no_radar: bool,

    /// don't poll the UAV route
    #[arg(long)]
    no_route: bool,
}

lazy_static! {
    static ref ARGS: CliOpts = CliOpts::parse();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter( EnvFilter::try_from_default_env().unwrap_or_else( |_| EnvFilter::new("info"))) // RUST_LOG overrides
        .try_init()
        .map_err( |e| anyhow::anyhow!("failed to init tracing: {e}"))?;

    let config = get_config()?;
    let features = SessionFeatures {
        route: !ARGS.no_route,
        uav: true,
        ais: !ARGS.no_ais,
        radar: !ARGS.no_radar,
    };

    let source = Arc::new( HttpSource::new()?);
    let mut session = TrackMapSession::new( config, features, LoggingRenderer::new(), source);
    let handle = session.handle();

    tokio::spawn( async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received ctrl-c");
            if let Err(e) = handle.send( SessionCommand::Shutdown).await { warn!("{e}") }
        }
    });

    session.start();
    let renderer = session.run().await;
    info!("final scene has {} layers", renderer.inner().layer_ids().len());
    Ok(())
}

fn get_config() -> Result<TrackMapConfig> {
    let mut config = match &ARGS.config {
        Some(path) => load_config( path)?,
        None => {
            let path = Path::new( DEFAULT_CONFIG);
            if path.is_file() { load_config( path)? } else { TrackMapConfig::default() }
        }
    };

    if let Some(mode) = ARGS.mode {
        config.frames.mode = match mode {
            CliFrameMode::Strip => FrameMode::Strip,
            CliFrameMode::SingleMatch => FrameMode::SingleMatch,
        };
    }
    if ARGS.target_time.is_some() {
        config.frames.target_time = ARGS.target_time;
    }

    Ok(config)
}
