//! Minimal end-to-end walkthrough: ingest a small corpus, run a similarity
//! query, then search two tracks for their best shared subtrajectory.

use geodex::{motif, GeodabIndex, Point, Query, Record, TrajectoryIndex};

fn track(id: &str, start_lon: f64, start_lat: f64, len: usize) -> Record {
    let trajectory: Vec<Point> = (0..len)
        .map(|i| Point::new(start_lon + 0.002 * i as f64, start_lat + 0.001 * i as f64))
        .collect();
    Record::new(id, trajectory)
}

fn main() {
    let corpus = vec![
        track("tracks/commute-mon.txt", 8.54, 47.37, 40),
        track("tracks/commute-tue.txt", 8.541, 47.37, 40),
        track("tracks/holiday.txt", 2.35, 48.85, 40),
    ];

    let mut index = GeodabIndex::new(40, 8, 4);
    index.add(corpus);

    let probe = track("probe", 8.54, 47.37, 40);
    let response = index.query(Query::new(0, probe, 0.5));
    println!("{} match(es):", response.results.len());
    for result in &response.results {
        println!("  {} at Jaccard distance {:.3}", result.record.id, result.distance);
    }

    let a = track("a", 8.54, 47.37, 20).trajectory;
    let b = track("b", 8.548, 47.374, 20).trajectory;
    match motif::execute(&a, &b, 5) {
        Some(pair) => println!(
            "best motif: a[{}..{}] ~ b[{}..{}] at {:.1} m",
            pair.i, pair.ie, pair.j, pair.je, pair.d
        ),
        None => println!("no motif of the requested length"),
    }
}
