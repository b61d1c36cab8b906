use marcher::prelude::*;

fn main() {
    // Slower, longer settle after the pointer stops, seen from further away
    let raymarch = RaymarchConfig {
        camera_radius: 28.0,
        fov_degrees: 38.0,
        ..Default::default()
    };

    let result = App::new()
        .namespace("marcher-calm")
        .background_color(Color::from_hex(0x0d0f14))
        .move_time_threshold(40.0)
        .decay_duration_scale(80.0)
        .raymarch(raymarch)
        .run();

    if let Err(e) = result {
        log::error!("marcher exited: {}", e);
        std::process::exit(1);
    }
}
