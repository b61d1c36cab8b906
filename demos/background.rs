use marcher::prelude::*;

fn main() {
    if let Err(e) = App::new().run() {
        log::error!("marcher exited: {}", e);
        std::process::exit(1);
    }
}
