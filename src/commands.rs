//! Command implementations for the SOS explorer CLI
//!
//! Sets up logging and configuration, then drives a [`Session`] against the
//! configured endpoint and prints the results.

use crate::cli::{Args, Command, OutputFormat};
use crate::client::{HttpTransport, SosClient};
use crate::config::SosConfig;
use crate::display::{extent_line, observation_csv, observation_table, sensor_summary, sensor_table};
use crate::map::catalog_markers;
use crate::models::SensorStub;
use crate::parser::time::{format_for_datetime_input, parse_timestamp};
use crate::session::Session;
use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

/// Run the selected subcommand
pub async fn run(args: Args) -> Result<()> {
    setup_logging(&args);
    debug!("Command line arguments: {:?}", args);

    let config = load_configuration(&args)?;
    let transport = HttpTransport::new(&config)?;
    let client = SosClient::new(transport, config)?;

    let Some(command) = args.command.clone() else {
        bail!("No command given; see --help");
    };

    match command {
        Command::Capabilities { bbox } => {
            let mut session = Session::new();
            refresh_session(&mut session, &client, &args).await?;

            let sensors: Vec<&SensorStub> = match bbox {
                Some(bbox) => session.catalog().filter_by_spatial_box(&bbox.0),
                None => session.catalog().sensors().iter().collect(),
            };

            match args.format {
                OutputFormat::Json => {
                    let report = serde_json::json!({
                        "extent": session.extent(),
                        "sensors": sensors,
                        "markers": catalog_markers(session.catalog()),
                    });
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
                OutputFormat::Csv => {
                    println!("id,name,lon,lat,observed_property,begin,end");
                    for sensor in &sensors {
                        let (lon, lat) = sensor
                            .position
                            .map(|p| (p.lon.to_string(), p.lat.to_string()))
                            .unwrap_or_default();
                        println!(
                            "{},{},{},{},{},{},{}",
                            sensor.id,
                            sensor.name,
                            lon,
                            lat,
                            sensor.observed_property.as_deref().unwrap_or_default(),
                            sensor.time_extent.begin.as_deref().unwrap_or_default(),
                            sensor.time_extent.end.as_deref().unwrap_or_default()
                        );
                    }
                }
                OutputFormat::Table => {
                    println!(
                        "{} {} of {}",
                        "Sensors:".bright_cyan(),
                        sensors.len().to_string().bright_white().bold(),
                        session.catalog().len()
                    );
                    if let Some(extent) = session.extent() {
                        println!("{} {}", "Extent:".bright_cyan(), extent_line(&extent));
                    }
                    print!("{}", sensor_table(&sensors));
                }
            }
        }

        Command::Describe { procedure, raw } => {
            let fetched = client
                .describe_sensor(&procedure)
                .await
                .with_context(|| format!("Error fetching SensorML for {procedure}"))?;

            if raw {
                println!("{}", fetched.raw);
            } else if args.format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&fetched.parsed)?);
            } else {
                let mut sensor = SensorStub::new(procedure);
                sensor.enrich(&fetched.parsed);
                println!("{}", sensor_summary(&sensor));
                if let (Some(begin), Some(end)) =
                    (&sensor.time_extent.begin, &sensor.time_extent.end)
                {
                    let short = |ts: &str| format_for_datetime_input(ts).unwrap_or_else(|| ts.to_string());
                    println!(
                        "{} {} / {}",
                        "Period:".bright_cyan(),
                        short(begin),
                        short(end)
                    );
                }
            }
        }

        Command::Observations {
            procedure,
            start,
            end,
        } => {
            let mut session = Session::new();
            refresh_session(&mut session, &client, &args).await?;

            let sensor = session
                .select(&procedure)
                .with_context(|| format!("Sensor {procedure} is not offered by this server"))?;
            let start = resolve_bound(start, sensor.time_extent.begin.as_deref(), "start")?;
            let end = resolve_bound(end, sensor.time_extent.end.as_deref(), "end")?;

            let series = session
                .observations(&client, &start, &end)
                .await
                .context("Error fetching observations")?;

            match args.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&series)?),
                OutputFormat::Csv => print!("{}", observation_csv(&series)),
                OutputFormat::Table => print!("{}", observation_table(&series)),
            }
        }
    }

    Ok(())
}

/// Explicit bound, else the sensor's known time, else an error
fn resolve_bound(
    explicit: Option<DateTime<Utc>>,
    known: Option<&str>,
    which: &str,
) -> Result<DateTime<Utc>> {
    if let Some(ts) = explicit {
        return Ok(ts);
    }
    match known {
        Some(value) => parse_timestamp(value)
            .with_context(|| format!("Sensor {which} time {value:?} is not a timestamp")),
        None => bail!("Please select both start and end time (--{which})"),
    }
}

async fn refresh_session(
    session: &mut Session,
    client: &SosClient<HttpTransport>,
    args: &Args,
) -> Result<()> {
    let progress = (!args.quiet).then(|| {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} sensors")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb
    });

    let applied = session
        .refresh(client, progress.as_ref())
        .await
        .context("Error fetching capabilities")?;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }
    if !applied {
        warn!("Capabilities result was superseded");
    }
    let failures = session.enrichment_failures();
    if failures > 0 && !args.quiet {
        eprintln!(
            "{} {} of {} sensors have no SensorML details",
            "Warning:".yellow().bold(),
            failures,
            session.catalog().len()
        );
    }
    info!(
        "{} sensors loaded, {} with a position",
        session.catalog().len(),
        session.catalog().positioned_count()
    );
    Ok(())
}

/// Defaults, then config file, then environment, then CLI flags
fn load_configuration(args: &Args) -> Result<SosConfig> {
    let default_path = SosConfig::default_config_path().filter(|path| path.exists());
    let config_file = args.config.clone().or(default_path);

    let mut config = SosConfig::load_layered(config_file.as_deref())?;
    if let Some(server) = &args.server {
        config.server_url = Some(server.clone());
    }

    config.validate()?;
    Ok(config)
}

fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.log_level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("sos_explorer={}", log_level)));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    debug!("Logging initialized at level: {}", log_level);
}
