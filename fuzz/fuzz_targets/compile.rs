#![no_main]
use libfuzzer_sys::fuzz_target;

use jtdx::{compile, extensions, CompilationOptions};

fuzz_target!(|data: &[u8]| {
    let schema: serde_json::Value = match serde_json::from_slice(data) {
        Ok(schema) => schema,
        Err(_) => return,
    };

    let _ = compile(&schema, &CompilationOptions::new());

    let options = CompilationOptions::new()
        .with_extension(extensions::DISALLOW_EMPTY_MAPPINGS)
        .with_extension(extensions::DISALLOW_LEAP_SECONDS)
        .with_extension(extensions::X_CHECKS);
    let _ = compile(&schema, &options);
});
