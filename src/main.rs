use std::env;
use std::fs;

use anyhow::{anyhow, Context, Result};
use log::info;

use hittest_layout::{encode_frame, schema, FrameView, RecordReader, Scene};

const USAGE: &str = "Usage: hittest-layout <header | layout | encode (<scene.xml> | --demo) [--aspect <ratio>] [--output <file>] | dump <frame.bin>>";

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    match CliOptions::parse(env::args().skip(1))? {
        CliOptions::Header => {
            print!("{}", schema::render_header());
            Ok(())
        }
        CliOptions::Layout => {
            schema::verify_all().context("compiled layouts drifted from the shader header")?;
            print!("{}", schema::render_report());
            println!("All layouts match the shader header");
            Ok(())
        }
        CliOptions::Encode {
            source,
            aspect,
            output,
        } => run_encode(source, aspect, output),
        CliOptions::Dump { path } => run_dump(&path),
    }
}

fn run_encode(source: SceneSource, aspect: f32, output: Option<String>) -> Result<()> {
    let scene = match &source {
        SceneSource::Demo => Scene::demo(),
        SceneSource::File(path) => {
            let xml = fs::read_to_string(path)
                .with_context(|| format!("failed to read scene {path}"))?;
            Scene::from_xml(&xml).context("failed to parse scene XML")?
        }
    };

    println!(
        "Loaded scene with {} objects ({} lights)",
        scene.objects.len(),
        scene.lights.len()
    );
    for object in &scene.objects {
        println!(" - {} ({})", object.name, object.object_type);
    }

    let frame = encode_frame(&scene, aspect).context("failed to encode frame")?;
    let bytes = frame.to_bytes();
    println!(
        "Encoded {} draw(s) and {} light(s) into {} bytes",
        frame.draws.len(),
        frame.lights.len(),
        bytes.len()
    );

    if let Some(path) = output {
        fs::write(&path, &bytes).with_context(|| format!("failed to write {path}"))?;
        info!("wrote frame blob to {path}");
        println!("Wrote {path}");
    }
    Ok(())
}

fn run_dump(path: &str) -> Result<()> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {path}"))?;
    let view = FrameView::parse(&bytes).with_context(|| format!("{path} is not a frame blob"))?;

    println!(
        "Frame with {} light(s) and {} draw(s)",
        view.lights.len(),
        view.draws.len()
    );
    print_record("FragmentUniforms", &view.fragment)?;
    for (index, light) in view.lights.iter().enumerate() {
        print_record(&format!("Light[{index}]"), light)?;
    }
    for (index, (uniforms, material)) in view.draws.iter().enumerate() {
        print_record(&format!("Uniforms[{index}]"), uniforms)?;
        print_record(&format!("Material[{index}]"), material)?;
    }
    Ok(())
}

fn print_record(label: &str, record: &RecordReader<'_>) -> Result<()> {
    println!("{label}:");
    for (name, value) in record.fields()? {
        println!("  {name} = {value}");
    }
    Ok(())
}

enum SceneSource {
    Demo,
    File(String),
}

enum CliOptions {
    Header,
    Layout,
    Encode {
        source: SceneSource,
        aspect: f32,
        output: Option<String>,
    },
    Dump {
        path: String,
    },
}

impl CliOptions {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let Some(command) = args.next() else {
            return Err(anyhow!(USAGE));
        };
        match command.as_str() {
            "header" => Ok(Self::Header),
            "layout" => Ok(Self::Layout),
            "dump" => {
                let path = args.next().ok_or_else(|| anyhow!(USAGE))?;
                Ok(Self::Dump { path })
            }
            "encode" => {
                let mut source = None;
                let mut aspect = 1.0;
                let mut output = None;
                while let Some(arg) = args.next() {
                    match arg.as_str() {
                        "--demo" => source = Some(SceneSource::Demo),
                        "--aspect" => {
                            let value = args
                                .next()
                                .ok_or_else(|| anyhow!("--aspect needs a value"))?;
                            aspect = value
                                .parse::<f32>()
                                .with_context(|| format!("invalid aspect ratio {value}"))?;
                        }
                        "--output" => {
                            output = Some(
                                args.next()
                                    .ok_or_else(|| anyhow!("--output needs a file name"))?,
                            );
                        }
                        other if other.starts_with("--") => {
                            return Err(anyhow!(
                                "Unknown argument: {other}. Expected --demo, --aspect or --output"
                            ));
                        }
                        path => source = Some(SceneSource::File(path.to_string())),
                    }
                }
                let source = source.ok_or_else(|| anyhow!(USAGE))?;
                Ok(Self::Encode {
                    source,
                    aspect,
                    output,
                })
            }
            other => Err(anyhow!("Unknown command: {other}. {USAGE}")),
        }
    }
}
