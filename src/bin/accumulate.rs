use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use wavyte_accumulator::{
    Accumulator, AccumulatorInputs, BlendMode, CpuHost, Frame, RenderHost, composite_source,
    passthrough_source,
};

#[derive(Parser, Debug)]
#[command(name = "accumulate", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List blend modes.
    Modes,
    /// Print the generated WGSL program for a blend mode.
    Shader(ShaderArgs),
    /// Accumulate a sequence of PNG frames and write the final result.
    Run(RunArgs),
}

#[derive(Parser, Debug)]
struct ShaderArgs {
    /// Blend mode identifier.
    #[arg(long, value_parser = parse_mode, default_value = "normal")]
    mode: BlendMode,

    /// Print the pass-through program used when `clear` is set instead.
    #[arg(long)]
    passthrough: bool,
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Input PNG frames, in draw order.
    #[arg(long = "in", required = true, num_args = 1..)]
    inputs: Vec<PathBuf>,

    /// Output PNG path for the final accumulated frame.
    #[arg(long)]
    out: PathBuf,

    /// Stage inputs as JSON (`blend_mode`, `opacity`, `clear`); flags below override it.
    #[arg(long = "inputs")]
    inputs_json: Option<PathBuf>,

    /// Blend mode identifier.
    #[arg(long, value_parser = parse_mode)]
    mode: Option<BlendMode>,

    /// Opacity of each new frame, in [0, 1].
    #[arg(long)]
    opacity: Option<f32>,

    /// Frame indices (0-based) at which the accumulated result is replaced by the input.
    #[arg(long = "clear-at", num_args = 1..)]
    clear_at: Vec<usize>,

    /// Also write every intermediate result as `frame_NNNN.png` into this directory.
    #[arg(long)]
    frames_dir: Option<PathBuf>,

    /// Backend to use.
    #[arg(long, value_enum, default_value_t = BackendChoice::Cpu)]
    backend: BackendChoice,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BackendChoice {
    Cpu,
    Gpu,
}

fn parse_mode(s: &str) -> Result<BlendMode, String> {
    s.parse::<BlendMode>().map_err(|e| e.to_string())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Modes => cmd_modes(),
        Command::Shader(args) => cmd_shader(args),
        Command::Run(args) => cmd_run(args),
    }
}

fn cmd_modes() -> anyhow::Result<()> {
    for mode in BlendMode::all() {
        let alpha = if mode.mixes_alpha() {
            "mix"
        } else {
            "keep destination"
        };
        println!("{:<12} {:<13} alpha: {alpha}", mode.id(), mode.label());
    }
    Ok(())
}

fn cmd_shader(args: ShaderArgs) -> anyhow::Result<()> {
    let source = if args.passthrough {
        passthrough_source()
    } else {
        composite_source(args.mode)
    };
    print!("{}", source.wgsl);
    Ok(())
}

fn make_host(choice: BackendChoice) -> anyhow::Result<Box<dyn RenderHost>> {
    match choice {
        BackendChoice::Cpu => Ok(Box::new(CpuHost::new()?)),
        #[cfg(feature = "gpu")]
        BackendChoice::Gpu => Ok(Box::new(wavyte_accumulator::GpuHost::new()?)),
        #[cfg(not(feature = "gpu"))]
        BackendChoice::Gpu => anyhow::bail!("this build does not include the gpu backend"),
    }
}

fn read_frame(path: &Path) -> anyhow::Result<Frame> {
    let img = image::open(path)
        .with_context(|| format!("read png '{}'", path.display()))?
        .to_rgba8();
    Ok(Frame::from_image(&img)?)
}

fn write_frame(frame: &Frame, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    frame
        .to_image()?
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", path.display()))
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let mut base = match &args.inputs_json {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("read inputs '{}'", path.display()))?;
            AccumulatorInputs::from_json(&json)
                .with_context(|| format!("parse inputs '{}'", path.display()))?
        }
        None => AccumulatorInputs::default(),
    };
    if let Some(mode) = args.mode {
        base.blend_mode = mode;
    }
    if let Some(opacity) = args.opacity {
        base.opacity = opacity;
    }

    let mut host = make_host(args.backend)?;
    let host = host.as_mut();

    let first = read_frame(&args.inputs[0])?;
    let mut acc = Accumulator::new();
    acc.set_inputs(host, base.clone())?;
    acc.initialize(host, first.width, first.height)?;

    for (i, path) in args.inputs.iter().enumerate() {
        let frame = if i == 0 {
            first.clone()
        } else {
            read_frame(path)?
        };
        let source = host.create_surface_from(&frame)?;
        let inputs = base
            .clone()
            .with_source(source)
            .with_clear(base.clear || args.clear_at.contains(&i));
        acc.set_inputs(host, inputs)?;
        let out = acc
            .draw_frame(host)
            .with_context(|| format!("draw frame {i} ('{}')", path.display()))?;
        host.release_surface(source)?;

        if let Some(dir) = &args.frames_dir {
            let result = host.read_surface(out)?;
            write_frame(&result, &dir.join(format!("frame_{i:04}.png")))?;
        }
    }

    let output = acc
        .output()
        .context("accumulator has no output surface")?;
    let result = host.read_surface(output)?;
    write_frame(&result, &args.out)?;
    acc.destroy(host)?;

    eprintln!(
        "accumulated {} frame(s) with {} into {}",
        acc.frames_drawn(),
        base.blend_mode,
        args.out.display()
    );
    Ok(())
}
