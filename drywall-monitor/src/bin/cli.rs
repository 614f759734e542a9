//! Command-line front end for the DryWall monitor.
//!
//! `status` runs one refresh cycle and prints the result. `watch` keeps a
//! poll scheduler running and redraws on every state change, taking
//! refresh and quit commands from stdin.

use std::env;
use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use drywall_monitor::aggregator::{Aggregator, StatusSource};
use drywall_monitor::api_client::Client;
use drywall_monitor::config::{ENV_API_URL, ENV_POLL_SECS, ENV_TIMEOUT_SECS, MonitorConfig};
use drywall_monitor::monitor::{PollScheduler, PollState};
use drywall_monitor::projection::{self, DashboardView, MonitorView};
use drywall_monitor::tracing::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: drywall-cli <command>");
        eprintln!();
        eprintln!("Commands:");
        eprintln!("  status    Fetch and show the monitor once");
        eprintln!("  watch     Poll continuously (r = refresh, q = quit)");
        eprintln!("  health    Check that the backend is up");
        eprintln!();
        eprintln!("Environment:");
        eprintln!("  {ENV_API_URL}        API base URL (default: http://localhost:8000)");
        eprintln!("  {ENV_POLL_SECS}      Poll interval in seconds (default: 30)");
        eprintln!("  {ENV_TIMEOUT_SECS}   Request timeout in seconds (default: none)");
        eprintln!("  RUST_LOG               Log filter (default: info)");
        std::process::exit(1);
    }

    drywall_monitor::tracing::init();
    let config = MonitorConfig::from_env()?;

    let command = &args[1];

    match command.as_str() {
        "status" => cmd_status(&config).await?,
        "watch" => cmd_watch(&config).await?,
        "health" => cmd_health(&config).await?,
        _ => {
            eprintln!("Unknown command: {}", command);
            eprintln!("Run without arguments to see usage.");
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Run one refresh cycle and print the dashboard.
async fn cmd_status(config: &MonitorConfig) -> Result<()> {
    let aggregator = Aggregator::new(Client::from_config(config)?);
    let snapshot = aggregator.refresh().await?;

    let state = PollState::Ready(Arc::new(snapshot));
    print!("{}", render(&projection::project(&state)));

    Ok(())
}

/// Poll until interrupted, redrawing on every state change.
async fn cmd_watch(config: &MonitorConfig) -> Result<()> {
    let aggregator = Aggregator::new(Client::from_config(config)?);
    info!(base_url = %aggregator.client().base_url(), "Watching DryWall backend");

    let mut scheduler = PollScheduler::with_period(aggregator, config.poll_interval);
    let stdin = BufReader::new(tokio::io::stdin());
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    println!("Commands: r = refresh, q = quit");
    watch_loop(&mut scheduler, stdin, shutdown, |view| print!("{}", render(view))).await
}

/// Drive `scheduler` until `shutdown` resolves or `q` is read from
/// `input`, handing every state change to `show`.
///
/// End of input only stops command handling; polling and redrawing carry
/// on until shutdown.
async fn watch_loop<S, R, F>(
    scheduler: &mut PollScheduler<S>,
    input: R,
    shutdown: F,
    mut show: impl FnMut(&MonitorView),
) -> Result<()>
where
    S: StatusSource,
    R: AsyncBufRead + Unpin,
    F: Future<Output = ()>,
{
    let mut state_rx = scheduler.subscribe();
    let mut lines = input.lines();
    let mut input_open = true;
    tokio::pin!(shutdown);

    scheduler.start();

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                break;
            }
            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = projection::project(&state_rx.borrow_and_update());
                show(&view);
            }
            line = lines.next_line(), if input_open => {
                let Some(line) = line? else {
                    debug!("Input closed, press Ctrl-C to stop");
                    input_open = false;
                    continue;
                };
                match line.trim() {
                    "r" => scheduler.refresh_now()?,
                    "q" => break,
                    "" => {}
                    other => eprintln!("Unknown command: {other} (r = refresh, q = quit)"),
                }
            }
        }
    }

    scheduler.stop().await;
    Ok(())
}

/// Query the backend's own health endpoint.
async fn cmd_health(config: &MonitorConfig) -> Result<()> {
    let client = Client::from_config(config)?;
    let health = client.health().await?;

    println!(
        "Backend: {}",
        health.status.as_deref().unwrap_or(projection::UNKNOWN)
    );
    println!(
        "Checked: {}",
        projection::format_timestamp(health.timestamp.as_deref())
    );
    if !health.services.is_empty() {
        println!("Services:");
        for (name, status) in &health.services {
            println!("  - {name}: {status}");
        }
    }

    Ok(())
}

fn render(view: &MonitorView) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = match view {
        MonitorView::Loading => writeln!(out, "DryWall Monitor: loading..."),
        MonitorView::Error(error) => writeln!(
            out,
            "DryWall Monitor: {}\n  {}\n  [{}: press r]",
            error.title, error.message, error.retry_label
        ),
        MonitorView::Dashboard(dashboard) => render_dashboard(&mut out, dashboard),
    };
    out
}

fn render_dashboard(out: &mut String, view: &DashboardView) -> std::fmt::Result {
    writeln!(out, "DryWall Alert Monitor")?;
    writeln!(out, "  Backend:        {}", view.backend_health)?;
    writeln!(out, "  SFTP:           {}", view.sftp_server)?;
    writeln!(out, "  Upload dir:     {}", view.upload_directory)?;
    writeln!(out, "  Files received: {} ({})", view.files_count, view.total_size)?;
    writeln!(out, "  Last update:    {}", view.last_update)?;

    writeln!(out, "Files:")?;
    if view.files.is_empty() {
        writeln!(out, "  {}", DashboardView::NO_FILES_MESSAGE)?;
        writeln!(out, "  {}", DashboardView::NO_FILES_HINT)?;
    }
    for file in &view.files {
        writeln!(
            out,
            "  {:<32} {:<8} {:>12}  {}",
            file.name, file.type_label, file.size, file.modified
        )?;
    }

    let sensors = &view.sensors;
    writeln!(out, "Sensors:")?;
    writeln!(
        out,
        "  {} sensors, {} readings, avg humidity {} ({}), {} critical alerts",
        sensors.total_sensors,
        sensors.total_readings,
        sensors.average_humidity.text,
        sensors.average_humidity.severity,
        sensors.critical_alerts
    )?;
    for location in &sensors.locations {
        writeln!(
            out,
            "  {:<16} {:>5} readings  {:>6} ({})  {} alerts  last {}",
            location.name,
            location.readings_count,
            location.avg_humidity.text,
            location.avg_humidity.severity,
            location.alert_count,
            location.last_reading
        )?;
    }

    if !sensors.recent_readings.is_empty() {
        writeln!(out, "Recent readings:")?;
    }
    for reading in &sensors.recent_readings {
        writeln!(
            out,
            "  {}  {:<14} {:<16} {:>6} ({})  alert {}",
            reading.timestamp,
            reading.sensor_id,
            reading.location,
            reading.humidity.text,
            reading.humidity.severity,
            reading.alert_level
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use drywall_monitor::aggregator::ErrorDetail;
    use drywall_monitor::snapshot::StatusSnapshot;

    use super::*;

    struct FixedSource;

    #[async_trait::async_trait]
    impl StatusSource for FixedSource {
        async fn refresh(&self) -> std::result::Result<StatusSnapshot, ErrorDetail> {
            Ok(StatusSnapshot::from_payloads(
                Default::default(),
                Default::default(),
            ))
        }
    }

    fn dashboards(views: &[MonitorView]) -> usize {
        views
            .iter()
            .filter(|view| matches!(view, MonitorView::Dashboard(_)))
            .count()
    }

    #[tokio::test(start_paused = true)]
    async fn keeps_redrawing_after_input_closes() {
        let mut scheduler = PollScheduler::with_period(FixedSource, Duration::from_secs(1));
        let mut views = Vec::new();

        // Empty input: EOF on the first read.
        let input: &[u8] = b"";
        let shutdown = tokio::time::sleep(Duration::from_millis(5_500));

        watch_loop(&mut scheduler, input, shutdown, |view| views.push(view.clone()))
            .await
            .unwrap();

        // Cycles at t = 0, 1, 2, 3, 4 and 5 s.
        assert!(dashboards(&views) >= 5, "{} dashboards", dashboards(&views));
        assert!(!scheduler.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn quit_command_stops_the_scheduler() {
        let mut scheduler = PollScheduler::with_period(FixedSource, Duration::from_secs(1));

        let input: &[u8] = b"r\nq\n";
        let shutdown = std::future::pending::<()>();

        watch_loop(&mut scheduler, input, shutdown, |_| {})
            .await
            .unwrap();

        assert!(!scheduler.is_running());
    }
}
