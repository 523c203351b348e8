//! Haar and Daubechies decompositions in float and fixed point.

use clusterdwt::num::to_f64;
use clusterdwt::{dwt_f32, dwt_length, dwt_q31, ExtensionMode, Sample, WaveletFamily, Q31};

fn main() -> Result<(), clusterdwt::DwtError> {
    println!("=== clusterdwt Haar Example ===\n");

    // 1. Float Haar on an even-length signal
    let x = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0];
    let haar = WaveletFamily::Haar.filter_bank::<f32>();
    let mut a = [0.0f32; 3];
    let mut d = [0.0f32; 3];
    dwt_f32(&x, &haar.wavelet(), ExtensionMode::Symmetric, &mut a, &mut d)?;
    println!("1. Haar f32");
    println!("   approx: {:?}", a);
    println!("   detail: {:?}", d);

    // 2. Odd length: the trailing output depends on the extension mode
    println!("\n2. Odd-length tail per mode");
    let x = [1.0f32, 2.0, 3.0, 4.0, 5.0];
    for mode in ExtensionMode::ALL {
        let mut a = [0.0f32; 3];
        let mut d = [0.0f32; 3];
        dwt_f32(&x, &haar.wavelet(), mode, &mut a, &mut d)?;
        println!("   {:>13}: A[2] = {:8.4}  D[2] = {:8.4}", mode, a[2], d[2]);
    }

    // 3. Q31 Db2 against the same signal in double precision
    println!("\n3. Db2 in Q31");
    let xf: Vec<f64> = (0..12).map(|i| 0.05 * i as f64 - 0.3).collect();
    let xq: Vec<Q31> = xf.iter().map(|&v| Q31::quantize(v)).collect();
    let bank = WaveletFamily::Db2.filter_bank::<Q31>();
    let len = dwt_length(xq.len(), bank.wavelet().len());
    let mut a = vec![0; len];
    let mut d = vec![0; len];
    dwt_q31(&xq, &bank.wavelet(), ExtensionMode::Antireflect, &mut a, &mut d)?;
    for (n, (ac, dc)) in a.iter().zip(&d).enumerate() {
        println!("   [{n}] A = {:+.6}  D = {:+.6}", to_f64(*ac), to_f64(*dc));
    }
    Ok(())
}
