#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(png) = png_rgba_decoder::decode(data) {
        assert_eq!(png.pixels().len(), png.width() as usize * png.height() as usize * 4);
    }
});
