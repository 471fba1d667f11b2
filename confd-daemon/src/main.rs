//
// Copyright (c) The confd Contributors
//
// SPDX-License-Identifier: MIT
//

#![warn(rust_2018_idioms)]

mod config;
mod dispatch;
mod error;
mod monitoring;

use std::path::Path;

use clap::{App, Arg};
use confd_datastore::DatastoreStore;
use confd_engine::api::Request;
use confd_engine::callback::{Callbacks, CallbacksBuilder};
use confd_engine::{Engine, Provider};
use confd_yang::YangIndex;
use config::{Config, LoggingFmtStyle};
use error::Error;
use monitoring::Monitoring;
use std::sync::{Arc, OnceLock};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::Layer;
use yang3::context::{Context, ContextFlags};

/// A host with no application plugins registered. Application plugins
/// (spec.md §1, §6 "Plugin callback surface") are external collaborators —
/// a real deployment supplies its own `Provider` and links it into a
/// binary built the same way this one is.
struct NoPlugins;

impl Provider for NoPlugins {
    fn callbacks() -> &'static Callbacks<Self> {
        static CALLBACKS: OnceLock<Callbacks<NoPlugins>> = OnceLock::new();
        CALLBACKS.get_or_init(|| CallbacksBuilder::default().build())
    }
}

fn init_tracing(config: &config::Logging) {
    let stdout = config.stdout.enabled.then(|| {
        let layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_file(config.stdout.show_source)
            .with_line_number(config.stdout.show_source);
        match config.stdout.style {
            LoggingFmtStyle::Compact => layer.compact().boxed(),
            LoggingFmtStyle::Full => layer.boxed(),
            LoggingFmtStyle::Json => layer.json().boxed(),
            LoggingFmtStyle::Pretty => layer.pretty().boxed(),
        }
    });

    let env_filter = tracing_subscriber::EnvFilter::builder().with_default_directive("confd=debug".parse().unwrap()).from_env_lossy();

    tracing_subscriber::registry().with(env_filter).with(stdout).init();
}

/// Builds the schema context for the process: every `*.yang` file directly
/// under `modules_dir` is loaded by its filename-derived module name
/// (`name[@revision].yang`), the same responsibility `holo_yang::load_module`
/// discharges one hardcoded module at a time; here the module set is
/// whatever the deployment drops into the directory, since this engine has
/// no fixed protocol module list of its own.
fn load_yang_context(modules_dir: &str) -> Result<Context, Error> {
    let mut ctx = Context::new(ContextFlags::empty())?;
    if Path::new(modules_dir).is_dir() {
        let _ = ctx.set_searchdir(modules_dir);
        let mut names = Vec::new();
        if let Ok(entries) = std::fs::read_dir(modules_dir) {
            for entry in entries.flatten() {
                let file_name = entry.file_name();
                let Some(file_name) = file_name.to_str() else { continue };
                let Some(stem) = file_name.strip_suffix(".yang") else { continue };
                let module_name = stem.split('@').next().unwrap_or(stem);
                names.push(module_name.to_string());
            }
        }
        for name in names {
            if let Err(error) = ctx.load_module(&name, None, &[]) {
                tracing::warn!(module = %name, %error, "failed to load YANG module");
            }
        }
    }
    Ok(ctx)
}

fn main() {
    let matches = App::new("confd")
        .version(clap::crate_version!())
        .arg(Arg::with_name("config").short("c").long("config").value_name("file").help("Specify an alternative configuration file."))
        .get_matches();

    let config = Config::load(matches.value_of("config"));
    init_tracing(&config.logging);
    info!("starting up");

    let ctx = load_yang_context(&config.yang_modules_dir).expect("failed to initialize YANG context");
    let yang = Arc::new(YangIndex::new(ctx));
    let store = Arc::new(DatastoreStore::new(config.datastore_dir.clone(), yang.clone(), config.xmldb_format.into()));
    let engine: Engine<NoPlugins> = Engine::new(store.clone(), yang.clone());
    let mut provider = NoPlugins;
    let mut monitoring = Monitoring::new();

    let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().expect("failed to create async runtime");

    rt.block_on(async {
        // Wire framing for the client<->engine socket is out of scope
        // (spec.md §1); `requests` stands in for whatever front-end
        // eventually feeds this channel.
        let (_tx, mut requests) = mpsc::unbounded_channel::<Request>();

        loop {
            tokio::select! {
                request = requests.recv() => match request {
                    Some(request) => dispatch::process_request(&engine, &mut provider, &mut monitoring, request),
                    None => break,
                },
                _ = tokio::signal::ctrl_c() => {
                    info!("shutting down");
                    break;
                }
            }
        }
    });
}
