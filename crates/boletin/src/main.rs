use anyhow::Context;
use boletin_chromium::ChromiumBackend;
use boletin_engine::backend::Backend;
use boletin_engine::{run_workflow, Credentials, Pacing, RunOptions};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;

/// Automated verification of SII boletas de honorarios.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Output directory for logs and captures
    #[arg(long, default_value = "./sii_boletas_output")]
    output_dir: PathBuf,

    /// Show the browser window while the run progresses
    #[arg(long)]
    visible: bool,

    /// Use the fast pacing profile
    #[arg(long)]
    quick: bool,

    /// Skip the received-receipts second pass
    #[arg(long)]
    skip_received: bool,

    /// RUT (e.g. 12.345.678-9); prompted interactively when omitted
    #[arg(long)]
    rut: Option<String>,
}

fn ask(query: &str) -> io::Result<String> {
    print!("{}", query);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn render_progress(ordinal: usize, total: usize, description: &str, ok: bool) {
    let width = 20usize;
    let filled = (ordinal * width).div_ceil(total.max(1)).min(width);
    let bar: String = "#".repeat(filled) + &"-".repeat(width - filled);
    let mark = if ok { ' ' } else { '!' };
    print!(
        "\r[{}] {:>3}%{} {:<50}",
        bar,
        ordinal * 100 / total.max(1),
        mark,
        description
    );
    let _ = io::stdout().flush();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    println!("SII boletas de honorarios - verificador automatico");
    println!();

    let rut = match args.rut {
        Some(rut) => rut,
        None => ask("RUT (ej: 12.345.678-9): ")?,
    };
    let clave = ask("Clave tributaria: ")?;
    if rut.is_empty() || clave.is_empty() {
        anyhow::bail!("RUT and clave are required");
    }
    let credentials = Credentials::new(rut, clave);

    let pacing = if args.quick {
        Pacing::quick()
    } else {
        Pacing::careful()
    };
    let mut options = RunOptions::new(&args.output_dir).with_pacing(pacing);
    if args.skip_received {
        options = options.without_received();
    }

    println!();
    println!("Starting browser; this can take a couple of minutes...");

    let mut backend = ChromiumBackend::new_with_visibility(args.visible);
    backend.launch().await.context("failed to launch browser")?;

    let progress = render_progress;
    let report = run_workflow(&mut backend, &credentials, options, Some(&progress)).await;

    if let Err(e) = backend.close().await {
        tracing::warn!("error closing browser: {}", e);
    }

    println!();
    println!();
    if report.success {
        println!("Run completed ({:?})", report.terminal_phase);
    } else {
        println!(
            "Run failed: {}",
            report.error.as_deref().unwrap_or("unknown error")
        );
    }

    let written: Vec<_> = report.artifacts.iter().filter(|a| a.ok()).collect();
    if !written.is_empty() {
        println!();
        println!("Artifacts:");
        for artifact in written {
            println!("  {:?}: {}", artifact.kind, artifact.path.display());
        }
    }

    println!();
    println!("Logs under: {}", report.output_dir.display());
    println!("  sii_exec_log.txt / sii_error_log.txt");

    if !report.success {
        std::process::exit(1);
    }
    Ok(())
}
