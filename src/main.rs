use anyhow::Result;
use spell_dataset::{DatasetGenerator, GoogleTranslateTts, Language};

/// Output root for the generated dataset, relative to the working directory
const OUTPUT_ROOT: &str = "dataset/generated";

fn main() -> Result<()> {
    env_logger::init();

    // Latin pronunciation is the closest available match for incantations
    let synthesizer = GoogleTranslateTts::new(Language::Latin);
    let generator = DatasetGenerator::new(OUTPUT_ROOT, synthesizer);
    let root = generator.generate()?;

    println!("Dataset generated in: {}", root.display());
    Ok(())
}
