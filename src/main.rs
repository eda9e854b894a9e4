//! coflow demo host - CLI
//!
//! The scheduler core defines no cadence of its own; this binary is a small
//! host that drives it through a simulated frame loop.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use coflow::frame::{FrameStep, Suspend, WaitKind};
use coflow::queue::{PassQueue, TimeCursor, TimedQueue};
use coflow::scheduler::{Scheduler, SchedulerConfig};
use coflow::util::logger;
use coflow::{NAME, VERSION};

/// Wait kind bound to the timed queue: "wait N ticks".
const DELAY: WaitKind = WaitKind::new(1);
/// Wait kind bound to a pass queue: "wait for the next fixed step".
const FIXED_STEP: WaitKind = WaitKind::new(2);

/// Host-driven cooperative coroutine scheduler
#[derive(Parser, Debug)]
#[command(name = "coflow")]
#[command(version = VERSION)]
#[command(about = NAME, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the small walkthrough scenario with logging
    Demo,

    /// Drive a synthetic frame loop and print scheduler statistics
    Sim {
        /// Number of tasks to start
        #[arg(long, default_value_t = 100)]
        tasks: usize,

        /// Number of simulated frames to run
        #[arg(long, default_value_t = 600)]
        frames: u64,

        /// Largest per-task wait, in ticks
        #[arg(long, default_value_t = 8)]
        max_delay: u64,

        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print version information
    Version,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.verbose {
        logger::init_debug();
    } else {
        logger::init();
    }

    match args.command {
        Commands::Demo => demo(),
        Commands::Sim {
            tasks,
            frames,
            max_delay,
            json,
        } => sim(tasks, frames, max_delay, json),
        Commands::Version => {
            println!("{} {}", NAME, VERSION);
            Ok(())
        }
    }
}

/// The walkthrough: one task that waits two ticks, pauses for a generic
/// tick, then completes.
fn demo() -> Result<()> {
    let cursor = TimeCursor::new();
    let mut sched = Scheduler::new();
    sched
        .register_queue(DELAY, Box::new(TimedQueue::new(cursor.clone())))
        .context("failed to register delay queue")?;

    let mut stage = 0;
    let handle = sched.start(Box::new(move || -> coflow::Result<FrameStep> {
        stage += 1;
        match stage {
            1 => {
                tracing::info!("waiting two ticks");
                Ok(FrameStep::Yield(Suspend::new(DELAY, 2)))
            }
            2 => {
                tracing::info!("resumed; pausing until the next generic tick");
                Ok(FrameStep::Pause)
            }
            _ => {
                tracing::info!("done");
                Ok(FrameStep::Done)
            }
        }
    }));

    cursor.advance(2);
    sched.drain_queue(DELAY);
    sched.drain_default();
    tracing::info!("task finished: {}", handle.is_finished());
    Ok(())
}

/// Synthetic load: each task alternates timed waits, fixed-step waits and
/// generic pauses for a few rounds, with nesting thrown in.
fn sim(
    tasks: usize,
    frames: u64,
    max_delay: u64,
    json: bool,
) -> Result<()> {
    let cursor = TimeCursor::new();
    let mut sched = Scheduler::with_config(SchedulerConfig {
        scratch_capacity: tasks,
        trace_dispatch: false,
    });
    sched
        .register_queue(DELAY, Box::new(TimedQueue::new(cursor.clone())))
        .context("failed to register delay queue")?;
    sched
        .register_queue(FIXED_STEP, Box::new(PassQueue::new()))
        .context("failed to register fixed-step queue")?;

    let max_delay = max_delay.max(1);
    for i in 0..tasks {
        let delay = (i as u64 % max_delay) + 1;
        let mut rounds = 3 + i % 4;
        sched.start(Box::new(move || -> coflow::Result<FrameStep> {
            if rounds == 0 {
                return Ok(FrameStep::Done);
            }
            rounds -= 1;
            match rounds % 3 {
                0 => Ok(FrameStep::Yield(Suspend::new(DELAY, delay))),
                1 => Ok(FrameStep::Yield(Suspend::kind_only(FIXED_STEP))),
                _ => {
                    // Delegate one round to a nested countdown frame.
                    let mut left = 2u32;
                    Ok(FrameStep::Nested(Box::new(
                        move || -> coflow::Result<FrameStep> {
                            if left == 0 {
                                return Ok(FrameStep::Done);
                            }
                            left -= 1;
                            Ok(FrameStep::Pause)
                        },
                    )))
                }
            }
        }));
    }

    for frame in 0..frames {
        cursor.advance(1);
        sched.drain_queue(DELAY);
        // The host decides what a fixed step is; here, every fourth frame.
        if frame % 4 == 0 {
            sched.drain_queue(FIXED_STEP);
        }
        sched.drain_default();
    }

    let stats = sched.stats();
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(stats).context("failed to serialize stats")?
        );
    } else {
        tracing::info!("started:    {}", stats.tasks_started);
        tracing::info!("finished:   {}", stats.tasks_finished);
        tracing::info!("dispatched: {}", stats.tasks_dispatched);
        tracing::info!(
            "still pending: delay={} fixed={} default={}",
            sched.pending(DELAY).unwrap_or(0),
            sched.pending(FIXED_STEP).unwrap_or(0),
            sched.pending_default()
        );
    }
    Ok(())
}
