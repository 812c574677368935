use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use wingloft::config::DEFAULT_OUTPUT_DIR;
use wingloft::{
    ClientConfig, ExportFormat, NacaCode, OpenAiChatClient, PipelineConfig, PipelineError, WingDesign, WingParameters,
    WingPipeline, build_design,
};

/// Design a wing from a mission description.
#[derive(Debug, Parser)]
#[command(name = "wing_cli", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Debug, Args)]
struct OutputArgs {
    /// Directory for generated files (created if missing)
    #[arg(long, global = true, default_value = DEFAULT_OUTPUT_DIR)]
    out_dir: PathBuf,

    /// Output formats, comma separated (obj, json)
    #[arg(long = "format", global = true, value_delimiter = ',', default_value = "obj")]
    formats: Vec<ExportFormat>,

    /// Chordwise stations per airfoil surface
    #[arg(long, global = true, default_value_t = wingloft::airfoil::DEFAULT_STATIONS)]
    stations: usize,

    /// Root chord length
    #[arg(long, global = true, default_value_t = 1.0)]
    root_chord: f64,

    /// Ignore the extracted NACA code and use the default NACA 2315 section
    #[arg(long, global = true)]
    fixed_airfoil: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Extract parameters with the model, then build and write the wing
    Design {
        #[arg(required = true, num_args = 1..)]
        mission: Vec<String>,
    },
    /// Extract parameters only and print them as JSON
    Params {
        #[arg(required = true, num_args = 1..)]
        mission: Vec<String>,
    },
    /// Build a wing from explicit parameters, without the model
    Build {
        #[arg(long)]
        naca: NacaCode,
        #[arg(long)]
        aspect_ratio: f64,
        #[arg(long)]
        taper_ratio: f64,
        /// Leading-edge sweep in degrees (recorded, not applied)
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        sweep: f64,
    },
}

impl OutputArgs {
    fn pipeline_config(&self) -> PipelineConfig {
        let mut formats: Vec<ExportFormat> = Vec::with_capacity(self.formats.len());
        for format in &self.formats {
            if !formats.contains(format) {
                formats.push(*format);
            }
        }
        PipelineConfig {
            output_dir: self.out_dir.clone(),
            stations: self.stations,
            root_chord: self.root_chord,
            formats,
            use_extracted_airfoil: !self.fixed_airfoil,
        }
    }
}

fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(Cli::parse()) {
        eprintln!("wing_cli error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = cli.output.pipeline_config();

    match cli.command {
        Command::Design { mission } => {
            let pipeline = WingPipeline::new(client()?, config);
            let design = pipeline.run(&mission.join(" "))?;
            report(&design);
        }
        Command::Params { mission } => {
            let pipeline = WingPipeline::new(client()?, config);
            let (params, _) = pipeline.extract_parameters(&mission.join(" "))?;
            println!("{}", serde_json::to_string_pretty(&params)?);
        }
        Command::Build {
            naca,
            aspect_ratio,
            taper_ratio,
            sweep,
        } => {
            let params = WingParameters {
                naca,
                aspect_ratio,
                taper_ratio,
                sweep_deg: sweep,
            };
            let design = build_design(params, None, &config)?;
            report(&design);
        }
    }
    Ok(())
}

fn client() -> Result<OpenAiChatClient, PipelineError> {
    let config = ClientConfig::from_env()?;
    Ok(OpenAiChatClient::new(config)?)
}

fn report(design: &WingDesign) {
    let solid = &design.solid;
    println!("{}", design.description);
    println!(
        "span={} root_chord={} tip_chord={} volume={:.6}",
        solid.span,
        solid.root_chord,
        solid.tip_chord,
        solid.volume()
    );
    println!(
        "vertices={} triangles={} | {}",
        solid.mesh.vertex_count(),
        solid.mesh.triangle_count(),
        solid.mesh_diagnostics.summary()
    );
    for path in &design.files {
        println!("wrote {}", path.display());
    }
}
