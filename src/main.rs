use clap::Parser;
use keyteleop::SinkKind;
use keyteleop::core::config::{self, CliOverrides, DEFAULT_LOG_FILE, ResolvedConfig};
use keyteleop::core::shutdown::{self, StopReason};
use keyteleop::input::TerminalKeySource;
use keyteleop::teleop::{self, TeleopLoop};
use keyteleop::transport::{CommandSink, LogSink, UdpSink};
use log::{error, info, warn};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;
use std::io::stdout;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "keyteleop", about = "Drive a robot from the terminal with the arrow keys")]
struct Args {
    /// Max linear speed (m/s) then max angular speed (rad/s). Give both or neither.
    #[arg(value_name = "SPEED", allow_negative_numbers = true)]
    speeds: Vec<String>,

    /// Where velocity commands are sent
    #[arg(short, long, value_enum)]
    sink: Option<SinkKind>,

    /// UDP destination (host:port)
    #[arg(short, long)]
    address: Option<String>,

    /// Config file (default: ~/.keyteleop/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log file
    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    log_file: PathBuf,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(path: &Path) {
    // The terminal is raw while we run, so logs only ever go to a file
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create(path) {
        let _ = WriteLogger::init(LevelFilter::Trace, log_config, log_file);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    dotenv::dotenv().ok();

    init_logging(&args.log_file);
    log::set_max_level(config::startup_log_level(args.verbose));
    info!("keyteleop starting up");

    let file_config = match config::load_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            warn!("{}; using defaults", e);
            eprintln!("warning: {e}; using defaults");
            Default::default()
        }
    };
    let resolved = config::resolve(
        &file_config,
        &CliOverrides {
            speeds: &args.speeds,
            sink: args.sink,
            address: args.address.as_deref(),
            verbose: args.verbose,
        },
    );
    log::set_max_level(resolved.log_level);
    info!(
        "Speeds: linear={} m/s angular={} rad/s, sink: {:?}",
        resolved.speeds.max_linear, resolved.speeds.max_angular, resolved.sink
    );

    match resolved.sink {
        SinkKind::Udp => {
            match UdpSink::connect(&resolved.bind, &resolved.address, &resolved.topic).await {
                Ok(sink) => drive(&resolved, sink).await,
                Err(e) => {
                    error!("Cannot open UDP sink: {}", e);
                    eprintln!("keyteleop: cannot open UDP sink to {}: {e}", resolved.address);
                    ExitCode::FAILURE
                }
            }
        }
        SinkKind::Log => drive(&resolved, LogSink::new()).await,
    }
}

async fn drive<S: CommandSink>(resolved: &ResolvedConfig, mut sink: S) -> ExitCode {
    if let Err(e) = teleop::print_banner(&mut stdout(), resolved.speeds) {
        warn!("Failed to print banner: {}", e);
    }

    // Install the SIGINT handler before raw mode so no signal can slip past it
    let interrupt = teleop::interrupt_signal();

    let keys = match TerminalKeySource::open() {
        Ok(keys) => keys,
        Err(e) => {
            // Raw mode never took effect, nothing to restore
            error!("{}", e);
            eprintln!("keyteleop: {e}");
            shutdown::release_sink(&mut sink);
            return ExitCode::FAILURE;
        }
    };

    let mut control = TeleopLoop::new(resolved.speeds, keys, sink);
    let reason = control.run(interrupt).await;
    control.shutdown(&reason);

    if let StopReason::InputFailed(ref e) = reason {
        eprintln!("keyteleop: {e}");
    }
    info!("Published {} commands, exiting", control.published());
    ExitCode::SUCCESS
}
