//! Desktop bring-up harness: drives the full stack against a commodity
//! gamepad via the gilrs backend. Screen writes land in the log.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use color_eyre::{eyre::eyre, Result};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use openpad::hal::gilrs_backend::GilrsController;
use openpad::screen::alert_screen::AlertScreen;
use openpad::transform::{Deadband, ExpoCurve, TransformationBuilder};
use openpad::{ButtonId, InputFrame, InputSettings};

fn main() -> Result<()> {
    setup()?;

    let settings = InputSettings::load_or_default();
    info!("Starting with settings: {:?}", settings);

    let hardware =
        GilrsController::new().map_err(|e| eyre!("Failed to open controller backend: {}", e))?;
    let mut frame = InputFrame::with_settings(Box::new(hardware), &settings);

    let deadzone = settings.joystick_deadzone;
    frame.set_left_transform(
        TransformationBuilder::new(Deadband::new(deadzone, deadzone))
            .and_then(ExpoCurve::new(2.0, 2.0))
            .build(),
    );
    frame.set_right_transform(TransformationBuilder::new(Deadband::new(deadzone, deadzone)).build());

    let alerts = Arc::new(AlertScreen::new());
    frame.add_screen(alerts.clone());

    frame.button(ButtonId::A).on_press("demo_a_press", || info!("A pressed"));
    frame
        .button(ButtonId::A)
        .on_short_release("demo_a_short", || info!("A short-released"));
    frame.button(ButtonId::A).on_long_release("demo_a_long", || info!("A long-released"));
    frame.button(ButtonId::Up).on_repeat_press("demo_up_repeat", || info!("Up repeating"));
    {
        let alerts = alerts.clone();
        frame.button(ButtonId::X).on_long_press("demo_x_alert", move || {
            if let Err(e) = alerts.add_alert(0, "X held!\ncheck the log", 2000, ".-") {
                info!("alert rejected: {}", e);
            }
        });
    }

    frame
        .print_line(0, "openpad demo\npress some buttons")
        .map_err(|e| eyre!("Failed to print banner: {}", e))?;

    info!("Entering control loop at {}ms ticks", settings.tick_interval_ms);
    loop {
        frame.update();
        thread::sleep(Duration::from_millis(settings.tick_interval_ms));
    }
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;

    FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .with_target(false)
        .init();
    Ok(())
}
