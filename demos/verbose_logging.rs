//! Demonstrates enabling verbose logging for clusterdwt.
use clusterdwt::{dwt_q15, ExtensionMode, WaveletFamily};

fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .init();

    let bank = WaveletFamily::Db2.filter_bank::<i16>();
    let signal = [100i16, 200, 300, 400];
    let mut approx = [0i16; 3];
    let mut detail = [0i16; 3];

    dwt_q15(
        &signal,
        &bank.wavelet(),
        ExtensionMode::Symmetric,
        &mut approx,
        &mut detail,
    )
    .unwrap();

    // rejected with a warning
    let _ = dwt_q15(
        &signal[..1],
        &bank.wavelet(),
        ExtensionMode::Reflect,
        &mut approx[..2],
        &mut detail[..2],
    );
}
