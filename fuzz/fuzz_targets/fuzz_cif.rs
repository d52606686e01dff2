#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);
    let valid = anaf::validate_cif(&s);
    assert_eq!(valid, anaf::Cif::parse(&s).is_ok());
});
