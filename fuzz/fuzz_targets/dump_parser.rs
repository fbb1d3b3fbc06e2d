#![no_main]

use daqinspect::dump::{parse_dump, timestamps};
use daqinspect::warp::{detect, WarpConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Parsing and detection must not panic on any input
        if let Ok(entries) = parse_dump(input) {
            let _ = detect(&timestamps(&entries), &WarpConfig::default());
        }
    }
});
