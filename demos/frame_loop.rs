//! Host loop that drains the field a little every frame while a query
//! thread asks for placements.
//!
//! Run with `RUST_LOG=debug cargo run --example frame_loop`.

use std::thread;
use std::time::{Duration, Instant};

use glam::IVec2;

use clearance::{ClearanceMap, DrainStatus, FieldError};

const FRAME: Duration = Duration::from_millis(16);

fn main() -> Result<(), FieldError> {
    env_logger::init();

    let map = ClearanceMap::create(1024, 1024, 48.0, 2.0)?;
    let pending = map.add_obstacle(IVec2::new(512, 512), 20)?;
    for i in 0..12 {
        map.add_obstacle(IVec2::new(80 * i + 40, 200 + 30 * i), 6)?;
    }

    thread::scope(|s| -> Result<(), FieldError> {
        let queries = s.spawn(|| -> Result<usize, FieldError> {
            let mut answered = 0;
            while !map.is_settled()? {
                map.find_closest_available_position(IVec2::new(512, 512), 8.0)?;
                answered += 1;
                thread::sleep(Duration::from_millis(5));
            }
            Ok(answered)
        });

        let mut frame = 0;
        loop {
            let start = Instant::now();
            let report = map.drain()?;
            frame += 1;
            log::info!(
                "frame {frame}: {:?}, {} layers, {} cells in {:?}",
                report.status,
                report.layers,
                report.cells_updated,
                report.elapsed
            );
            if report.status == DrainStatus::Settled {
                break;
            }
            if let Some(rest) = FRAME.checked_sub(start.elapsed()) {
                thread::sleep(rest);
            }
        }

        let answered = queries.join().expect("query thread panicked")?;
        log::info!("{answered} queries answered while draining");
        Ok(())
    })?;

    log::info!("big obstacle inflated: {}", map.is_inflated(&pending)?);
    let spot = map.find_closest_available_position(IVec2::new(512, 512), 8.0)?;
    log::info!("closest spot for radius 8 near the centre: {spot:?}");

    map.save_preview("frame_loop.png", 48.0)?;
    map.dispose()
}
