#![no_main]

use libfuzzer_sys::fuzz_target;
use timerlog::buffered_log::write_summaries;
use timerlog::decoder::decode_bytes;
use timerlog::deltas::reconstruct;
use timerlog::report::TimingReport;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must decode or fail cleanly, never panic
    if let Ok(map) = decode_bytes(data) {
        let report = TimingReport::from_deltas(&reconstruct(&map));
        let _ = report.render_text();

        // Anything that decoded must survive a re-encode
        let mut bytes = Vec::new();
        write_summaries(&map, &mut bytes).expect("decoded names contain no NUL");
        assert_eq!(decode_bytes(&bytes).ok(), Some(map));
    }
});
