//! Trajectory similarity engine over the WGS-84 sphere.
//!
//! geodex indexes a corpus of trajectories so that a query trajectory
//! retrieves similar corpus trajectories under a set-based fingerprint
//! distance, and finds, between two trajectories, the subtrajectory pair
//! minimising the discrete Fréchet distance among all pairs of at least a
//! given length.
//!
//! ```rust
//! use geodex::{GeodabIndex, Point, Query, Record, TrajectoryIndex, motif};
//!
//! let trajectory: Vec<Point> = (0..20)
//!     .map(|i| Point::new(8.54 + 0.001 * i as f64, 47.37))
//!     .collect();
//! let record = Record::new("tracks/0001.txt", trajectory.clone());
//!
//! // Fingerprint retrieval.
//! let mut index = GeodabIndex::new(40, 8, 4);
//! index.add(vec![record.clone()]);
//! let response = index.query(Query::new(0, record, 0.25));
//! assert_eq!(response.results.len(), 1);
//!
//! // Subtrajectory motif search.
//! let pair = motif::execute(&trajectory, &trajectory, 2).unwrap();
//! assert_eq!(pair.d, 0.0);
//! ```
//!
//! Ingest is single-writer and must complete before the first query; after
//! that every index is immutable and safe to share across reader threads.

pub mod distance;
pub mod error;
pub mod geohash;
pub mod index;
pub mod io;
pub mod motif;
pub mod types;
pub mod util;

pub use error::{GeodexError, Result};
pub use index::{GeodabIndex, GeohashIndex, QuadTree, TrajectoryIndex};
pub use motif::MotifPair;
pub use types::{BBox, IndexConfig, Point, Query, Record, Response, SearchResult, Trajectory};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
