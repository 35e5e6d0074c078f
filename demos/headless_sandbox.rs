use glam::Vec2;
use stickfuse::*;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .with_target(false)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("tracing subscriber already installed");
    }

    let cfg = SandboxConfig::from_json_str(
        r#"{ "screen_size": [800.0, 600.0], "seed": 7, "omega_sound_threshold": 3.5 }"#,
    )?;
    let mut sandbox = Sandbox::new(cfg)?;

    // Simulated clicks.
    for i in 0..12 {
        let at = Vec2::new(100.0 + 55.0 * i as f32, 150.0 + 25.0 * (i % 5) as f32);
        sandbox.spawn_stick(at)?;
    }

    let dt = 1.0 / 60.0;
    for tick in 0..1200 {
        sandbox.step(dt);
        for ev in sandbox.drain_events() {
            match ev {
                Event::Spawned { id } => println!("[{tick:4}] spawn {id:?} (play click)"),
                Event::Merged { kind, survivor, absorbed } => {
                    println!("[{tick:4}] {kind:?}: {absorbed:?} -> {survivor:?} (play thud)")
                }
                Event::FastSpin { active } => println!("[{tick:4}] whirr {}", if active { "on" } else { "off" }),
            }
        }
    }

    let stats = sandbox.debug_stats();
    info!(
        sticks = stats.sticks,
        composites = stats.composites,
        segments = stats.segments,
        mass = stats.total_mass,
        merges = stats.merges,
        "final state"
    );
    for seg in sandbox.render_segments().iter().take(8) {
        println!(
            "segment ({:.1},{:.1})-({:.1},{:.1}) w={}",
            seg.a.x, seg.a.y, seg.b.x, seg.b.y, seg.width
        );
    }
    Ok(())
}
