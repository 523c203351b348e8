//! Splitting one decomposition across a cluster of execution units.
//!
//! Each unit owns the outputs whose index is congruent to its id, so the units
//! share the output buffers without locking.

use clusterdwt::hal::{release_coefficients, stage_coefficients};
use clusterdwt::{dwt, dwt_length, DwtInstance, ExtensionMode, HostCluster, WaveletFamily};

fn main() -> Result<(), clusterdwt::DwtError> {
    let n_pe = 4;
    let x: Vec<f32> = (0..64).map(|i| ((i * 5) % 11) as f32 - 5.0).collect();
    let bank = WaveletFamily::Sym4.filter_bank::<f32>();
    let len = dwt_length(x.len(), bank.wavelet().len());

    // Stage the taps into scratch memory before any unit starts.
    let master = HostCluster::new(0);
    let staged = stage_coefficients(&master, &bank.wavelet());

    let mut a = vec![0.0f32; len];
    let mut d = vec![0.0f32; len];
    {
        let inst = DwtInstance::new(
            &x,
            staged.wavelet(),
            ExtensionMode::Symmetric,
            &mut a,
            &mut d,
            n_pe,
        )?;
        std::thread::scope(|s| {
            let handles: Vec<_> = (0..n_pe)
                .map(|core_id| {
                    let inst = &inst;
                    s.spawn(move || inst.run(&HostCluster::new(core_id)))
                })
                .collect();
            // barrier
            for h in handles {
                h.join().expect("unit panicked")?;
            }
            Ok::<(), clusterdwt::DwtError>(())
        })?;
    }
    release_coefficients(&master, staged);

    let mut a_ref = vec![0.0f32; len];
    let mut d_ref = vec![0.0f32; len];
    dwt(&x, &bank.wavelet(), ExtensionMode::Symmetric, &mut a_ref, &mut d_ref)?;
    println!("{} units, {} outputs", n_pe, len);
    println!("matches single core: {}", a == a_ref && d == d_ref);
    Ok(())
}
