#![no_main]
use libfuzzer_sys::fuzz_target;

use jtdx::{compile, extensions, CompilationOptions, ValidateOptions};

// Input is a JSON array: `[schema, instance]`.
fuzz_target!(|data: &[u8]| {
    let (schema, instance): (serde_json::Value, serde_json::Value) =
        match serde_json::from_slice(data) {
            Ok(pair) => pair,
            Err(_) => return,
        };

    let options = CompilationOptions::new().with_extension(extensions::X_CHECKS);

    // We're only interested in fuzzing against valid schemas.
    let validator = match compile(&schema, &options) {
        Ok(validator) => validator,
        Err(_) => return,
    };

    // Self-referencing schemas can recurse as deep as the instance goes.
    let _ = validator.validate_with_options(&instance, ValidateOptions::new().with_max_depth(32));
});
