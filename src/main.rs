use anyhow::Context;
use tracing::{error, info, warn};

use tabletop_sim::app::App;
use tabletop_sim::config::load_scene_settings;
use tabletop_sim::rendering::DebugViewer;
use tabletop_sim::simulation::CancelToken;
use tabletop_sim::utils::logging::{init_logging, log_system_info};

/// Cancel the run on Ctrl-C. The signal is watched off the simulation thread;
/// the driver only sees the flag between steps.
fn watch_interrupt(cancel: CancelToken) {
    let spawned = std::thread::Builder::new()
        .name("interrupt-watcher".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread().enable_io().build() {
                Ok(runtime) => runtime,
                Err(e) => {
                    warn!("Ctrl-C handling unavailable: {}", e);
                    return;
                }
            };
            runtime.block_on(async {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Interrupt received, stopping after the current step");
                    cancel.cancel();
                }
            });
        });
    if let Err(e) = spawned {
        warn!("Ctrl-C handling unavailable: {}", e);
    }
}

fn main() -> anyhow::Result<()> {
    init_logging();
    log_system_info();

    let settings = load_scene_settings().context("loading scene settings")?;
    let app = App::new(settings).context("validating scene settings")?;
    watch_interrupt(app.cancel_token());

    let mut viewer = DebugViewer::default();
    match app.run(&mut viewer) {
        Ok(run) => {
            info!(
                "Run finished: {} objects, {} steps, {:.3}s simulated in {:.3}s",
                run.objects.len(),
                run.summary.steps,
                run.summary.elapsed_sim_time,
                run.summary.wall_time.as_secs_f64()
            );
            Ok(())
        }
        Err(e) => {
            error!("Simulation aborted: {}", e);
            Err(e).context("running the tabletop simulation")
        }
    }
}
