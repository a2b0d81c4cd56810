#![no_main]

use libfuzzer_sys::fuzz_target;
use solidtree::{MaterialCatalog, MaterialScan, chunk};
use solidtree::report::MaterialReport;

fuzz_target!(|data: &[u8]| {
    // Walking and extraction must never panic or read past the buffer
    for c in chunk::walk(data) {
        assert!(c.content_end <= data.len());
    }

    let scan = MaterialScan::from_bytes(data);
    let _ = MaterialReport::from_scan(&scan, &MaterialCatalog::default());
});
