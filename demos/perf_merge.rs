use glam::Vec2;
use stickfuse::*;
use std::time::Instant;

fn main() -> Result<()> {
    let mut sandbox = Sandbox::new(SandboxConfig {
        screen_size: Vec2::new(4000.0, 4000.0),
        seed: Some(1),
        enable_timing: true,
        max_events: 100_000,
        ..Default::default()
    })?;

    let n = 2_000usize; // number of sticks
    for i in 0..n {
        let x = 40.0 + (i % 45) as f32 * 85.0;
        let y = 40.0 + (i / 45) as f32 * 85.0;
        sandbox.spawn_stick(Vec2::new(x, y))?;
    }

    let dt = 1.0 / 60.0;
    let t0 = Instant::now();
    let (mut scan_ms, mut integrate_ms) = (0.0, 0.0);
    for _ in 0..600 {
        sandbox.step(dt);
        if let Some(t) = sandbox.timing() {
            integrate_ms += t.integrate_ms;
            scan_ms += t.scan_ms;
        }
    }
    let stats = sandbox.debug_stats();
    println!(
        "N={} ticks={} total={:?} integrate={:.3}ms scan={:.3}ms merges={} sticks={} composites={}",
        n,
        stats.ticks,
        t0.elapsed(),
        integrate_ms,
        scan_ms,
        stats.merges,
        stats.sticks,
        stats.composites
    );
    Ok(())
}
