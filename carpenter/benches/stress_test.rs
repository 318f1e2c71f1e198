use carpenter::{mine, CarpError, CarpenterConfig, Target, TransactionBag, Variant};
use ndarray::Array2;
use rand::Rng;
use std::time::Instant;

fn generate_transactions(num_transactions: usize, num_items: usize, density: f64) -> Array2<i32> {
    let mut rng = rand::thread_rng();
    Array2::from_shape_fn((num_transactions, num_items), |_| i32::from(rng.gen_bool(density)))
}

fn print_memory_stats() {
    #[cfg(target_os = "macos")]
    {
        use std::process::Command;
        if let Ok(output) = Command::new("ps")
            .args(["-o", "rss=", "-p", &std::process::id().to_string()])
            .output()
        {
            if let Ok(rss) = String::from_utf8(output.stdout) {
                if let Ok(kb) = rss.trim().parse::<usize>() {
                    println!("  Memory: {} MB", kb / 1024);
                }
            }
        }
    }
}

fn report(result: Result<carpenter::ItemsetStorage, CarpError>, start: Instant) {
    match result {
        Ok(found) => {
            let longest = found.iter().map(|(items, _)| items.len()).max().unwrap_or(0);
            println!("  Time: {:?}", start.elapsed());
            println!("  Item sets: {}", found.len());
            println!("  Max item set size: {}", longest);
            print_memory_stats();
        }
        Err(CarpError::OutOfMemory {
            requested,
            available,
        }) => {
            println!("  ✗ Memory limit hit: requested {requested} bytes, {available} available");
        }
        Err(err) => println!("  ✗ Failed: {err}"),
    }
}

/// Growing item counts under a fixed memory limit.
fn stress_test_memory_limit() {
    println!("\n=== Memory Limit Test (64 MB) ===");

    let configs = [
        ("40 x 5K", 40, 5_000),
        ("60 x 20K", 60, 20_000),
        ("80 x 100K", 80, 100_000),
    ];

    for (name, num_tx, num_items) in configs {
        println!("\nTesting: {}", name);
        let start_gen = Instant::now();
        let matrix = generate_transactions(num_tx, num_items, 0.3);
        println!("  Generated in {:?}", start_gen.elapsed());

        let config = CarpenterConfig::new(Target::Closed, 25.0).with_memory_limit(64 << 20);
        let start = Instant::now();
        report(mine(TransactionBag::from_dense(matrix.view()), &config), start);
    }
}

/// Table and tid-list engine on the same data.
fn stress_test_engines() {
    println!("\n=== Table vs Tid List Comparison ===");

    let matrix = generate_transactions(50, 10_000, 0.3);
    for algo in [Variant::Table, Variant::TidList] {
        println!("\n  {:?}:", algo);
        let config = CarpenterConfig::new(Target::Closed, 20.0).with_algo(algo);
        let start = Instant::now();
        report(mine(TransactionBag::from_dense(matrix.view()), &config), start);
    }
}

/// Lowering the minimum support on dense data.
fn stress_test_low_support() {
    println!("\n=== Low Support Test ===");

    let matrix = generate_transactions(30, 2_000, 0.5);
    for supp in [50.0, 30.0, 20.0, 10.0] {
        println!("\nTesting supp = {}%", supp);
        let config = CarpenterConfig::new(Target::Closed, supp);
        let start = Instant::now();
        report(mine(TransactionBag::from_dense(matrix.view()), &config), start);
    }
}

fn main() {
    println!("=== Carpenter Stress Testing Suite ===");
    println!("Testing memory limits and performance degradation\n");

    stress_test_memory_limit();
    stress_test_engines();
    stress_test_low_support();

    println!("\n=== Stress Testing Complete ===");
}
