use anyhow::Context;
use clap::Parser;
use endpoint::bridge::DetectionServer;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use tubecore::geometry::ImageDimensions;
use workflow::config::WorkflowConfig;
use workflow::runner::Runner;
use workflow::script::SessionScript;

mod endpoint;
mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Stub tube detector and scripted overlay session driver")]
struct Args {
    /// Replay a session script offline and print the resulting markers
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Session script (YAML); a built-in demo runs when omitted
    #[arg(long)]
    script: Option<PathBuf>,
    /// Load session, generator and bind settings from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// Address for the detection endpoint
    #[arg(long)]
    bind: Option<SocketAddr>,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Host the stub detection endpoint until Ctrl+C
    #[arg(long, default_value_t = false)]
    serve: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut workflow_config = if let Some(path) = args.config {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_args(args.bind, args.seed)
    };
    if let Some(bind) = args.bind {
        workflow_config.bind = bind;
    }

    if args.offline {
        let script = match args.script {
            Some(path) => SessionScript::load(path)?,
            None => SessionScript::demo(ImageDimensions::new(1024, 768)),
        };
        let runner = Runner::new(workflow_config.clone());
        let result = runner.execute(&script)?;

        println!(
            "Offline session -> total {}, phase {}, issued {}, applied {}, stale {}, failed {}",
            result.count(),
            result.phase,
            result.metrics.issued,
            result.metrics.applied,
            result.metrics.stale,
            result.metrics.failed
        );
        if let Some(notice) = &result.notice {
            println!("Notice: {notice}");
        }
        for ((marker, label), band) in result
            .markers
            .iter()
            .zip(&result.labels)
            .zip(&result.color_bands)
        {
            println!(
                "  #{label:<4} band {band} at ({:.2}%, {:.2}%)",
                marker.x, marker.y
            );
        }

        let report = format!(
            "total={} phase={} completions={:?}\n",
            result.count(),
            result.phase,
            result.completions
        );
        let report_path = PathBuf::from("tools/data/offline_session.log");
        if let Some(parent) = report_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&report_path)
            .with_context(|| format!("opening report {}", report_path.display()))?;
        file.write_all(report.as_bytes())?;
        for entry in &result.history {
            log::debug!("history: {entry}");
        }
    }

    if args.serve {
        let server = DetectionServer::new(workflow_config.generator.clone());
        let runtime = TokioBuilder::new_multi_thread()
            .enable_all()
            .build()
            .context("creating runtime for the detection endpoint")?;
        runtime.block_on(async {
            let shutdown = async {
                if let Err(err) = signal::ctrl_c().await {
                    log::error!("awaiting Ctrl+C failed: {err}");
                }
            };
            println!("Detection endpoint running (Ctrl+C to stop)...");
            server.run(workflow_config.bind, shutdown).await
        })?;
    }

    Ok(())
}
