use aspectweave_generator::model::Compilation;
use aspectweave_generator::{CollectingSink, WeaverConfig, WeavingGenerator};
use std::path::PathBuf;
use std::{env, fs};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=weave.json");
    println!("cargo:rerun-if-changed=build.rs");

    let config = WeaverConfig::default();
    let unit = Compilation::from_json(&fs::read_to_string("weave.json")?)?;
    let sink = CollectingSink::new();
    let output = WeavingGenerator::new(config.clone()).run(&unit, &sink)?;

    for diagnostic in sink.diagnostics() {
        println!("cargo:warning={diagnostic}");
    }

    let contents = output.file.map(|file| file.contents()).unwrap_or_default();
    let target = PathBuf::from(env::var("OUT_DIR")?).join(&config.file_name);
    fs::write(target, contents)?;
    Ok(())
}
