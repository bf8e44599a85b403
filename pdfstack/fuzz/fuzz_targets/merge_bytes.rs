#![no_main]

use libfuzzer_sys::fuzz_target;
use pdfstack::io::{MemorySource, SourceHandle};
use pdfstack::merge::Merger;
use pdfstack::staging::StagingStore;
use std::sync::{Arc, OnceLock};
use tokio::runtime::{Builder, Runtime};

static RUNTIME: OnceLock<Runtime> = OnceLock::new();

fn runtime() -> &'static Runtime {
    RUNTIME.get_or_init(|| Builder::new_multi_thread().enable_all().build().unwrap())
}

fuzz_target!(|data: &[u8]| {
    let mut store = StagingStore::new(1);
    store
        .append(vec![
            Arc::new(MemorySource::pdf("fuzz.pdf", data.to_vec())) as SourceHandle,
        ])
        .unwrap();

    // Arbitrary bytes either merge or fail cleanly, never panic
    if let Ok(result) = runtime().block_on(Merger::new().merge(store.entries())) {
        assert_eq!(result.statistics.files_merged, 1);
    }
});
