use clap::Parser;
use sos_explorer::cli::Args;
use sos_explorer::SosError;
use sos_explorer::commands;
use std::process;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        tokio::select! {
            result = commands::run(args) => result,
            _ = tokio::signal::ctrl_c() => {
                eprintln!("\nReceived CTRL+C, shutting down...");
                Err(anyhow::Error::from(SosError::Interrupted {
                    reason: "Interrupted by user".to_string(),
                }))
            }
        }
    });

    match result {
        Ok(()) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            let unreachable = error
                .chain()
                .filter_map(|cause| cause.downcast_ref::<SosError>())
                .any(SosError::is_transport);
            if unreachable {
                eprintln!("Check the server URL (--server or SOS_SERVER_URL) and your connection");
            }
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("SOS Explorer - OGC Sensor Observation Service client");
    println!("====================================================");
    println!();
    println!("USAGE:");
    println!("    sos-explorer [OPTIONS] <COMMAND>");
    println!();
    println!("COMMANDS:");
    println!("    capabilities    List sensors with positions and observed properties");
    println!("    describe        Show SensorML metadata for one procedure");
    println!("    observations    Fetch the time series of one procedure");
    println!();
    println!("OPTIONS:");
    println!("    -s, --server <URL>     SOS endpoint (or set SOS_SERVER_URL)");
    println!("    -c, --config <PATH>    TOML config file");
    println!("    -f, --format <FORMAT>  table, csv or json");
    println!("    -v, --verbose          Debug logging");
    println!("    -q, --quiet            Warnings only, no progress bar");
    println!();
    println!("EXAMPLES:");
    println!("    sos-explorer -s http://sensorweb.example.org/sos capabilities --bbox 3,50,8,54");
    println!("    sos-explorer observations urn:ogc:object:Sensor:knmi:260 \\");
    println!("                 --start 2024-01-01T00:00 --end 2024-01-02T00:00");
}
