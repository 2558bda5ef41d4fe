//! Fuzz target for persisted pin values and exported scripts.
//!
//! Decoding a saved pin value never fails, so arbitrary text must always
//! produce some value. Script parsing may fail but must not panic.

#![no_main]

use libfuzzer_sys::fuzz_target;

use frameql::export::Script;
use frameql::persist::{decode_str, encode_to_string};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    // Decoding a database value opens a connection, possibly a file.
    if text.contains("DBEngineData") {
        return;
    }

    let value = decode_str(text);
    let _ = decode_str(&encode_to_string(&value));

    let _ = Script::from_json(text);
});
