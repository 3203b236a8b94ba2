use rand::prelude::*;

use periodic_neighbors::{Geometry, UnitCell, Vector3D};
use periodic_neighbors::{NeighborListCache, NeighborListOptions};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let n_atoms = match std::env::args().nth(1) {
        Some(n_atoms) => n_atoms.parse()?,
        None => 10_000,
    };

    // enable collection of profiling data
    time_graph::enable_data_collection(true);
    // clear any existing collected data
    time_graph::clear_collected_data();

    run_trajectory(n_atoms)?;

    // get the call graph and display it
    let graph = time_graph::get_full_graph();
    // (this requires the "table" feature for the time_graph crate)
    println!("{}", graph.as_short_table());

    // also available for saving profiling data to the disk & future analysis
    // (this requires the "json" feature for the time_graph crate)
    println!("{}", graph.as_json());

    Ok(())
}

/// Update a neighbor list cache along a random walk of all atoms
fn run_trajectory(n_atoms: usize) -> Result<(), Box<dyn std::error::Error>> {
    let length = f64::cbrt(n_atoms as f64 / 0.1);
    let mut rng = StdRng::seed_from_u64(0);

    let positions = (0..n_atoms).map(|_| Vector3D::new(
        rng.gen_range(0.0..length),
        rng.gen_range(0.0..length),
        rng.gen_range(0.0..length),
    )).collect();
    let mut geometry = Geometry::new(UnitCell::cubic(length), positions, 3.5)?;

    let options = NeighborListOptions { skin: 0.5, ..Default::default() };
    let mut cache = NeighborListCache::new(options)?;

    time_graph::spanned!("Full trajectory", {
        for _ in 0..100 {
            cache.update(&geometry)?;

            let positions = geometry.positions().iter().map(|&position| {
                position + Vector3D::new(
                    rng.gen_range(-0.02..0.02),
                    rng.gen_range(-0.02..0.02),
                    rng.gen_range(-0.02..0.02),
                )
            }).collect();
            geometry = geometry.with_positions(positions)?;
        }
    });

    Ok(())
}
