//! Cellular Automata CLI - Run automata from JSON configuration.

use std::path::PathBuf;
use std::time::Instant;

use log::info;

use cellular_automata::{
    compute::Automaton,
    recording::{Recorder, StateCounts, count_states},
    schema::SimulationConfig,
};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <config.json> [steps]", args[0]);
        eprintln!();
        eprintln!("Run a cellular automaton from JSON configuration.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  config.json  Path to simulation configuration file");
        eprintln!("  steps        Number of ticks to run (default: 100)");
        eprintln!();
        eprintln!("Example configurations are printed with the --example flag.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_configs();
        return;
    }

    let config_path = PathBuf::from(&args[1]);
    let steps: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(100);

    let config = SimulationConfig::from_json_file(&config_path).unwrap_or_else(|e| {
        eprintln!("Error loading config: {}", e);
        std::process::exit(1);
    });

    let mut automaton = config.build_automaton().unwrap_or_else(|e| {
        eprintln!("Error building automaton: {}", e);
        std::process::exit(1);
    });
    let recorder = Recorder::with_transform(&mut automaton, count_states);

    println!("Cellular Automaton");
    println!("==================");
    println!("Grid: {:?} ({} cells)", config.shape, config.grid_size());
    println!("Initializers: {}", config.initializers.len());
    println!("Rules: {}", config.rules.len());
    println!("Steps: {}", steps);
    println!();

    if let Err(e) = automaton.start() {
        eprintln!("Error starting automaton: {}", e);
        std::process::exit(1);
    }
    println!("Initial state:");
    print_counts(&automaton, "  ");
    println!();

    println!("Running simulation...");
    let start = Instant::now();

    for i in 0..steps {
        if let Err(e) = automaton.step() {
            eprintln!("Error at tick {}: {}", i + 1, e);
            std::process::exit(1);
        }

        // Print progress every 10%
        if (i + 1) % (steps / 10).max(1) == 0 {
            let elapsed = start.elapsed().as_secs_f32();
            println!(
                "  Tick {}/{}: {}, {:.1} ticks/s",
                i + 1,
                steps,
                recorder.record().last().map(summarize).unwrap_or_default(),
                (i + 1) as f32 / elapsed
            );
        }
    }

    let elapsed = start.elapsed();
    info!("Recorded {} histograms", recorder.len());

    println!();
    println!("Final state (tick {:?}):", automaton.tick());
    print_counts(&automaton, "  ");
    println!();
    println!(
        "Time: {:.2}s ({:.1} ticks/s)",
        elapsed.as_secs_f32(),
        steps as f32 / elapsed.as_secs_f32()
    );
}

fn print_counts(automaton: &Automaton, indent: &str) {
    if let Some(counts) = count_states(automaton) {
        let total = counts.total() as f64;
        for (state, count) in counts.present() {
            println!(
                "{}state {:>3}: {:>8} cells ({:.2}%)",
                indent,
                state,
                count,
                100.0 * count as f64 / total
            );
        }
    }
}

fn summarize(counts: &StateCounts) -> String {
    counts
        .present()
        .map(|(state, count)| format!("{}={}", state, count))
        .collect::<Vec<_>>()
        .join(" ")
}

fn print_example_configs() {
    let examples = [
        ("forest_fire.json", SimulationConfig::default()),
        ("rule_30.json", SimulationConfig::elementary(30, 101)),
        ("life.json", SimulationConfig::life(&[128, 128])),
    ];

    for (name, config) in examples {
        println!("Example configuration ({}):", name);
        println!("{}", serde_json::to_string_pretty(&config).unwrap());
        println!();
    }
}
