//! LumaStream Camera Pipeline - Main Entry Point

use camera_pipeline::{init_logging, isp, sensor, CameraDevice, PipelineConfig, PipelineError};
use std::sync::Arc;
use std::thread;
use tracing::{error, info};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    info!(target: "system", "=== LumaStream Camera Pipeline v{} ===", env!("CARGO_PKG_VERSION"));
    info!(target: "system", "initializing camera device...");

    let device = Arc::new(CameraDevice::new(PipelineConfig::default())?);
    device.start();

    let sensor_handle = thread::Builder::new().name("sensor".into()).spawn({
        let device = device.clone();
        move || sensor::run(device)
    })?;
    let isp_handle = thread::Builder::new().name("isp".into()).spawn({
        let device = device.clone();
        move || isp::run(device)
    })?;

    info!(target: "system", "pipeline running, press Enter to stop...");
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;

    device.stop();
    join_worker("sensor", sensor_handle);
    join_worker("isp", isp_handle);

    let stats = device.stats()?;
    info!(
        target: "system",
        "shutdown complete: {} frames processed | {} sensor drops | {} isp drops | {} cache misses",
        stats.processed,
        stats.sensor_dropped,
        stats.isp_dropped,
        stats.cache_misses
    );

    Ok(())
}

fn join_worker(name: &str, handle: thread::JoinHandle<Result<(), PipelineError>>) {
    match handle.join() {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(target: "system", "{} worker failed: {}", name, e),
        Err(_) => error!(target: "system", "{} worker panicked", name),
    }
}
