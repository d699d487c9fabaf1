//! Binary to generate/update the expected .html next to each fixture
//!
//! Usage:
//!   cargo run --bin accept_expected            # Update all
//!   cargo run --bin accept_expected -- grid    # Update only fixtures matching "grid"

use boot_transpiler::Pipeline;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const SOURCE_SUFFIX: &str = ".boot.html";

fn main() {
    let filter: Option<String> = std::env::args().nth(1);
    let fixture_dir = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures");

    let mut updated = 0;
    let mut skipped = 0;

    for entry in WalkDir::new(&fixture_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().to_string_lossy().ends_with(SOURCE_SUFFIX))
    {
        let path = entry.path();

        // Apply filter if provided
        if let Some(ref f) = filter {
            if !path.to_string_lossy().contains(f.as_str()) {
                skipped += 1;
                continue;
            }
        }

        if process_file(path) {
            updated += 1;
        }
    }

    println!("Updated {} files, skipped {}", updated, skipped);
}

fn expected_path(path: &Path) -> PathBuf {
    let name = path.to_string_lossy();
    let stem = name.strip_suffix(SOURCE_SUFFIX).unwrap_or(&name);
    PathBuf::from(format!("{}.html", stem))
}

fn process_file(path: &Path) -> bool {
    let source = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to read {:?}: {}", path, e);
            return false;
        }
    };

    let pipeline = Pipeline::standard();
    match pipeline.compile(&source) {
        Ok(html) => {
            let expected = expected_path(path);
            if let Err(e) = fs::write(&expected, html) {
                eprintln!("Failed to write {:?}: {}", expected, e);
                false
            } else {
                println!("  wrote {}", expected.display());
                true
            }
        }
        Err(e) => {
            let filename = path.file_name().and_then(|s| s.to_str()).unwrap_or("unknown");
            eprintln!("ERROR: {:?} failed to compile:\n{}", path, e.render(&source, filename));
            false
        }
    }
}
