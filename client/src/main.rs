use clap::Parser;
use client::input::InputManager;
use client::network::BoardClient;
use client::rendering::{draw_preview, draw_users, MacroquadSurface};
use client::session::PatternControls;
use log::{error, info};
use macroquad::prelude::*;
use shared::{UserSnapshot, CANVAS_HEIGHT, CANVAS_WIDTH};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Board server to connect to
    #[arg(short, long, default_value = "ws://127.0.0.1:8080")]
    server: String,
}

fn window_conf() -> Conf {
    Conf {
        window_title: "Stampboard".to_string(),
        window_width: CANVAS_WIDTH as i32,
        window_height: CANVAS_HEIGHT as i32,
        window_resizable: false,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    info!("Connecting to {}", args.server);
    info!("Controls: arrows adjust the pattern, Space toggles the shape, C toggles line/radial, click to place");

    let mut board = match BoardClient::connect(&args.server) {
        Ok(board) => board,
        Err(e) => {
            error!("Failed to start networking for {}: {}", args.server, e);
            return;
        }
    };

    let mut controls = PatternControls::new();
    let mut input = InputManager::new();
    let mut users: Vec<UserSnapshot> = Vec::new();
    let mut rng = ::rand::thread_rng();

    loop {
        board.request_update();
        if let Some(snapshot) = board.poll_update() {
            users = snapshot;
        }

        let frame = input.sample();

        controls.tick();
        controls.apply_held_keys(frame.held);
        if frame.toggle_object_kind {
            controls.toggle_object_kind();
        }
        if frame.toggle_pattern {
            controls.toggle_pattern();
        }

        let (pointer_x, pointer_y) = frame.pointer;
        let preview = controls.preview(&mut rng, pointer_x, pointer_y);

        if frame.commit {
            board.place_objects(preview.clone());
            controls.commit();
        }

        clear_background(BLACK);
        let mut surface = MacroquadSurface::new();
        draw_users(&mut surface, &users);
        draw_preview(&mut surface, &preview);

        next_frame().await;
    }
}
