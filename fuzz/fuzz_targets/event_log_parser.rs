#![no_main]

use huella::config::AnalysisConfig;
use huella::ingest::{parse_event_log, split_record};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Must report malformed input as an error, never panic
        let config = AnalysisConfig::default();
        let _ = parse_event_log(input, &config);

        for line in input.lines() {
            let _ = split_record(line, config.delimiter);
        }
    }
});
