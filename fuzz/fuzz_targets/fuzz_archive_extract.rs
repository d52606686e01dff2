#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(bundle) = anaf::archive::ArchiveBundle::from_input(data) {
        let _ = bundle.dto_invoice(&anaf::archive::StructuralReader);
    }
});
