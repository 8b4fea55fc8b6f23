use anyhow::{bail, Context, Result};
use clap::Parser;
use roastlog::{
    development_time_ratio, export, Clock, Config, RoastRecorder, RoastSummary, SessionConfig,
    SessionStore, SystemClock, TemperatureUnit,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "roastlog")]
#[command(about = "Interactive coffee roast session logger")]
struct Args {
    /// Bean or blend to roast (required for a new session)
    #[arg(short, long)]
    bean: Option<String>,

    /// Charge temperature at time zero (required for a new session)
    #[arg(short, long)]
    charge: Option<f64>,

    /// Temperature unit (C or F)
    #[arg(short, long, default_value = "C")]
    unit: TemperatureUnit,

    /// Resume a saved session by id
    #[arg(long)]
    resume: Option<String>,

    /// List saved sessions and exit
    #[arg(long)]
    list: bool,

    /// Config file name (config crate style, no extension)
    #[arg(long, default_value = "config/roastlog")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));

    let sessions_path = shellexpand::tilde(&cfg.storage.sessions_path).into_owned();
    let export_path = shellexpand::tilde(&cfg.export.output_path).into_owned();
    let store = SessionStore::new(sessions_path)?;

    if args.list {
        for id in store.list()? {
            println!("{id}");
        }
        return Ok(());
    }

    let poll_interval = Duration::from_millis(cfg.recorder.poll_interval_ms);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let recorder = if let Some(id) = &args.resume {
        let Some(saved) = store.load(id)? else {
            bail!("No saved session with id {id}");
        };
        let recorder = RoastRecorder::restore(saved, clock, poll_interval)?;
        info!("Session restored with the timer stopped; type 'resume' to continue");
        recorder
    } else {
        let bean = args.bean.context("--bean is required for a new session")?;
        let charge = args.charge.context("--charge is required for a new session")?;
        let session = SessionConfig::new(bean, charge, args.unit)?;
        RoastRecorder::new(session, clock, poll_interval)
    };

    print_help();
    run_command_loop(&recorder, &store, &export_path).await
}

async fn run_command_loop(
    recorder: &RoastRecorder,
    store: &SessionStore,
    export_path: &str,
) -> Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "" => {}
            "start" => recorder.start().await,
            "resume" => recorder.resume().await,
            "+" | "up" => {
                recorder.increase_temperature().await;
                print_status(recorder).await;
            }
            "-" | "down" => {
                recorder.decrease_temperature().await;
                print_status(recorder).await;
            }
            "fc" | "crack" => recorder.mark_first_crack().await,
            "status" => print_status(recorder).await,
            "save" => {
                store.save(&recorder.serialize().await)?;
            }
            "end" => {
                if let Some(summary) = recorder.end().await {
                    print_summary(&summary);
                    export::write_exports(&summary, &recorder.session_id(), export_path)?;
                    store.remove(&recorder.session_id())?;
                    return Ok(());
                }
            }
            "q" | "quit" => break,
            "?" | "help" => print_help(),
            other => warn!("Unknown command: {:?}", other),
        }
    }

    // Quit or stdin closed: stop the timer and keep the session recoverable.
    recorder.stop_sampling().await;
    let snapshot = recorder.snapshot().await;
    if !snapshot.stage.is_terminal() {
        store.save(&recorder.serialize().await)?;
        info!("Session saved as {}", recorder.session_id());
    }

    Ok(())
}

async fn print_status(recorder: &RoastRecorder) {
    let s = recorder.snapshot().await;
    let dtr = development_time_ratio(s.first_crack_elapsed_seconds, s.elapsed_seconds);
    println!(
        "[{}] {}:{:02}  {:.1}{}  DTR {:.1}%  ({} points)",
        s.stage,
        s.elapsed_seconds / 60,
        s.elapsed_seconds % 60,
        s.current_temperature,
        s.unit.symbol(),
        dtr,
        s.series.len()
    );
}

fn print_summary(summary: &RoastSummary) {
    println!();
    println!("Roast complete: {}", summary.bean_name);
    println!(
        "  Total time:   {}:{:02}",
        summary.total_elapsed_seconds / 60,
        summary.total_elapsed_seconds % 60
    );
    if let Some(fc) = summary.first_crack_elapsed_seconds {
        println!("  First crack:  {}:{:02}", fc / 60, fc % 60);
    }
    println!(
        "  Temperatures: charge {:.1}{u}, final {:.1}{u}, min {:.1}{u}, max {:.1}{u}",
        summary.charge_temperature,
        summary.final_temperature,
        summary.min_temperature,
        summary.max_temperature,
        u = summary.unit.symbol()
    );
    println!(
        "  DTR:          {:.1}% ({})",
        summary.development_time_ratio,
        summary.dtr_color().hex()
    );
}

fn print_help() {
    println!("Commands:");
    println!("  start    begin the roast timer");
    println!("  resume   continue a restored session");
    println!("  + / -    adjust current temperature by one step");
    println!("  fc       mark first crack");
    println!("  status   print the current snapshot");
    println!("  save     persist the session");
    println!("  end      finish the roast and export the summary");
    println!("  quit     stop the timer, save, and exit");
}
