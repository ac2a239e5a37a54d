//! Dump the OpenAPI document as JSON.
//!
//! Usage:
//!   cargo run --bin export_openapi > openapi.json
//!   cargo run --bin export_openapi -- --output docs/openapi.json

use utoipa::OpenApi;

use ledgerd::api::openapi::ApiDoc;

fn output_path() -> Option<String> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--output" {
            return args.next();
        }
    }
    None
}

fn main() {
    let json = ApiDoc::openapi()
        .to_pretty_json()
        .expect("Failed to serialize OpenAPI document");

    match output_path() {
        Some(path) => {
            std::fs::write(&path, &json).expect("Failed to write file");
            eprintln!("OpenAPI document written to {}", path);
        }
        None => println!("{}", json),
    }
}
