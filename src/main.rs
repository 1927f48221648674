use anyhow::{anyhow, Context, Result};
use frame::Frame;
use indicatif::{ProgressBar, ProgressStyle};
use session::Session;
use stats::{AtomicStats, StatKey, StatsSink};
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{channel, RecvTimeoutError},
        Arc,
    },
    time::{Duration, Instant},
};
use structopt::StructOpt;
use tracing::{info, trace, warn};
use tracing_subscriber::layer::SubscriberExt;

mod counter;
mod error;
mod frame;
mod geometry;
mod pose;
mod posture;
mod session;
mod stats;

const DISPLAY_INTERVAL: Duration = Duration::from_millis(100);
const RECV_TIMEOUT: Duration = Duration::from_millis(250);

/// Format a pace in reps per second as reps per `window_secs`, `/` before the
/// second rep.
fn format_pace(pace: f64, window_secs: f64) -> String {
    if pace > 0.0 {
        format!("{:.1}", pace * window_secs)
    } else {
        "/".to_owned()
    }
}

fn display_stats(
    stats: &dyn StatsSink,
    pb: &ProgressBar,
    window_secs: f64,
) -> Result<(), error::Error> {
    let reps = stats.get(StatKey::Reps)?.unwrap_or_default();
    let pace = stats.get(StatKey::Pace)?.unwrap_or_default();
    let score = stats
        .get(StatKey::PoseScore)?
        .map_or_else(|| "-".to_owned(), |score| format!("{:.2}", score));
    pb.set_message(format!(
        "reps: {:.0} | pace: {} per {}s | pose score: {}",
        reps,
        format_pace(pace, window_secs),
        window_secs,
        score
    ));
    pb.tick();
    Ok(())
}

/// Refresh the spinner from `stats` until `done` is set.
fn show_stats(
    stats: &dyn StatsSink,
    pb: &ProgressBar,
    window_secs: f64,
    done: &AtomicBool,
) -> Result<(), error::Error> {
    while !done.load(Ordering::SeqCst) {
        display_stats(stats, pb, window_secs)?;
        std::thread::sleep(DISPLAY_INTERVAL);
    }
    display_stats(stats, pb, window_secs)
}

/// Feed one result of the frame reader to the session.
///
/// A line that fails to decode is logged and skipped. Only a failing read is
/// returned, since no further frames can follow it.
fn handle_frame<S>(
    session: &mut Session<S>,
    frame: Result<Frame, error::Error>,
    elapsed: Duration,
) -> Result<(), error::Error>
where
    S: StatsSink,
{
    let frame = match frame {
        Ok(frame) => frame,
        Err(e @ error::Error::ReadFrame(_)) => return Err(e),
        Err(e) => {
            warn!(message = "skipping frame", error = %e);
            return Ok(());
        }
    };
    let timestamp = frame.timestamp.unwrap_or(elapsed);
    match session.update(&frame.poses, timestamp) {
        Ok(transition) => trace!(
            ?transition,
            reps = session.reps(),
            pace = session.pace(),
            tracking_lost = session.tracking_lost()
        ),
        Err(e) => warn!(message = "failed publishing stats", error = %e),
    }
    if let Some(measurements) = session.measurements() {
        trace!(%measurements);
    }
    Ok(())
}

#[derive(structopt::StructOpt)]
struct Opt {
    /// Exercise to count: toe_tap, jumping_jacks, push_up or random.
    exercise: posture::Selection,

    /// Detected poses as JSON lines, one frame per line. `-` reads stdin.
    #[structopt(short, long, default_value = "-")]
    input: PathBuf,

    #[structopt(short, long, default_value = "info", env = "RUST_LOG")]
    log_level: tracing_subscriber::filter::EnvFilter,

    /// Seconds the displayed pace is expressed over.
    #[structopt(short, long, default_value = "30")]
    pace_window: f64,

    /// Frames without a recognized posture before tracking is reported lost,
    /// 0 to never report it.
    #[structopt(long, default_value = "24")]
    lost_after: u32,

    #[structopt(short, long)]
    show_progress: bool,
}

fn open_input(path: &Path) -> Result<Box<dyn BufRead + Send>> {
    if path.as_os_str() == "-" {
        Ok(Box::new(BufReader::new(std::io::stdin())))
    } else {
        let file = File::open(path)
            .with_context(|| format!("failed opening input {}", path.display()))?;
        Ok(Box::new(BufReader::new(file)))
    }
}

fn main() -> Result<()> {
    let opt = Opt::from_args();
    let pace_window = opt.pace_window;

    tracing::subscriber::set_global_default(
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(opt.log_level),
    )?;

    let exercise = opt.exercise.resolve(&mut rand::thread_rng());
    let input = open_input(&opt.input)?;

    info!(
        message = "selected exercise",
        exercise = exercise.name(),
        input = %opt.input.display()
    );

    let running = Arc::new(AtomicBool::new(true));
    let running_ctrl_c = running.clone();

    ctrlc::set_handler(move || {
        running_ctrl_c.store(false, Ordering::SeqCst);
    })
    .context("failed setting Ctrl-C handler")?;

    let stats = AtomicStats::new();
    let mut session = Session::new(exercise, &stats)
        .context("failed starting workout session")?
        .lost_after(opt.lost_after);

    let pb = if opt.show_progress {
        Some(
            ProgressBar::new_spinner().with_style(
                ProgressStyle::default_spinner()
                    .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
                    .template("{prefix:.bold.dim} {spinner} {wide_msg}"),
            ),
        )
    } else {
        None
    };
    if let Some(pb) = pb.as_ref() {
        pb.set_prefix(session.exercise().display_name());
    }

    // The reader may sit in a blocking read after Ctrl-C, so it is not joined.
    let (frames_tx, frames_rx) = channel();
    let running_read = running.clone();
    std::thread::spawn(move || {
        for frame in frame::Frames::new(input) {
            if !running_read.load(Ordering::SeqCst) || frames_tx.send(frame).is_err() {
                break;
            }
        }
    });

    let done = AtomicBool::new(false);

    let (summary, result) = crossbeam::thread::scope(|scope| {
        if let Some(pb) = pb.as_ref() {
            let stats = &stats;
            let done = &done;
            scope.spawn(move |_| {
                if let Err(e) = show_stats(stats, pb, pace_window, done) {
                    warn!(message = "stopped showing stats", error = %e);
                }
                pb.finish();
            });
        }

        let start = Instant::now();
        let result = (|| {
            while running.load(Ordering::SeqCst) {
                let frame = match frames_rx.recv_timeout(RECV_TIMEOUT) {
                    Ok(frame) => frame,
                    Err(RecvTimeoutError::Timeout) => continue,
                    Err(RecvTimeoutError::Disconnected) => break,
                };
                handle_frame(&mut session, frame, start.elapsed())?;
            }
            Ok::<_, error::Error>(())
        })();
        done.store(true, Ordering::SeqCst);
        drop(frames_rx);

        (session.finish(), result)
    })
    .map_err(|_| anyhow!("a worker thread panicked"))?;

    println!(
        "{}: {} reps, pace {} per {}s over {:.1}s",
        summary.exercise,
        summary.reps,
        format_pace(summary.pace, pace_window),
        pace_window,
        summary.duration.as_secs_f64()
    );

    result.context("failed reading frames")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::posture::{Exercise, JumpingJacks};
    use serde_json::json;
    use std::io::{self, Read};

    mod format_pace_tests {
        use super::*;

        #[test]
        fn pace_before_second_rep() {
            assert_eq!(format_pace(0.0, 30.0), "/");
        }

        #[test]
        fn pace_over_window() {
            assert_eq!(format_pace(0.25, 30.0), "7.5");
            assert_eq!(format_pace(0.5, 60.0), "30.0");
        }
    }

    mod show_stats_tests {
        use super::*;

        struct Unreachable;

        impl StatsSink for Unreachable {
            fn set(&self, key: StatKey, _: f64) -> Result<(), error::Error> {
                Err(error::Error::SinkUnavailable(key))
            }

            fn get(&self, key: StatKey) -> Result<Option<f64>, error::Error> {
                Err(error::Error::SinkUnavailable(key))
            }
        }

        #[test]
        fn returns_sink_errors() {
            let done = AtomicBool::new(false);
            let err = show_stats(&Unreachable, &ProgressBar::hidden(), 30.0, &done).unwrap_err();
            assert!(matches!(err, error::Error::SinkUnavailable(StatKey::Reps)));
        }

        #[test]
        fn stops_when_done() {
            let stats = AtomicStats::new();
            stats.set(StatKey::Reps, 4.0).unwrap();
            let done = AtomicBool::new(true);
            assert!(show_stats(&stats, &ProgressBar::hidden(), 30.0, &done).is_ok());
        }
    }

    mod handle_frame_tests {
        use super::*;

        fn frame_line(timestamp: f64, arms_up: bool) -> String {
            let (elbow_y, left_ankle_x) = if arms_up { (20.0, 80.0) } else { (80.0, 55.0) };
            let keypoints: serde_json::Map<_, _> = [
                ("left shoulder", 50.0, 60.0),
                ("right shoulder", 50.0, 40.0),
                ("left elbow", elbow_y, 62.0),
                ("right elbow", elbow_y, 38.0),
                ("left hip", 100.0, 60.0),
                ("right hip", 100.0, 40.0),
                ("left ankle", 200.0, left_ankle_x),
                ("right ankle", 200.0, if arms_up { 40.0 } else { 45.0 }),
            ]
            .iter()
            .map(|&(label, y, x)| (label.to_owned(), json!({"y": y, "x": x, "score": 0.9})))
            .collect();
            json!({"timestamp": timestamp, "poses": [{"score": 0.9, "keypoints": keypoints}]})
                .to_string()
        }

        fn run<R: BufRead>(input: R) -> (session::Summary, Result<(), error::Error>) {
            let stats = AtomicStats::new();
            let mut session = Session::new(Exercise::JumpingJacks(JumpingJacks), &stats).unwrap();
            let result = frame::Frames::new(input)
                .try_for_each(|frame| handle_frame(&mut session, frame, Duration::ZERO));
            (session.finish(), result)
        }

        #[test]
        fn malformed_line_is_skipped() {
            let input = [
                frame_line(0.0, false),
                frame_line(1.0, true),
                frame_line(2.0, false),
                frame_line(3.0, true),
                r#"{"poses": [oops"#.to_owned(),
                frame_line(4.0, false),
                frame_line(5.0, true),
            ]
            .join("\n");

            let (summary, result) = run(input.as_bytes());
            assert!(result.is_ok());
            assert_eq!(summary.reps, 3);
            assert_eq!(summary.frames, 6);
            assert_eq!(summary.duration, Duration::from_secs(5));
        }

        #[test]
        fn unknown_keypoint_is_skipped() {
            let input = [
                frame_line(0.0, false),
                r#"{"poses": [{"score": 0.9, "keypoints": {"tail": {"y": 1.0, "x": 1.0, "score": 0.9}}}]}"#
                    .to_owned(),
                frame_line(1.0, true),
            ]
            .join("\n");

            let (summary, result) = run(input.as_bytes());
            assert!(result.is_ok());
            assert_eq!(summary.reps, 1);
        }

        /// Yields its bytes, then fails.
        struct Broken<'a>(&'a [u8]);

        impl Read for Broken<'_> {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                if self.0.is_empty() {
                    return Err(io::Error::new(io::ErrorKind::Other, "device gone"));
                }
                self.0.read(buf)
            }
        }

        #[test]
        fn failed_read_keeps_counted_reps() {
            let input = format!("{}\n{}\n", frame_line(0.0, false), frame_line(1.0, true));
            let (summary, result) = run(BufReader::new(Broken(input.as_bytes())));
            assert!(matches!(result, Err(error::Error::ReadFrame(_))));
            assert_eq!(summary.reps, 1);
        }
    }
}
