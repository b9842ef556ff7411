use dhls::comm::*;
use dhls::compare::*;
use dhls::config::*;
use dhls::error::HeatError;
use dhls::grid_file::*;
use dhls::serial;
use dhls::solver::*;
use std::path::PathBuf;

fn scratch_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("dhls_{}_{name}", std::process::id()))
}

#[test]
fn serial_and_distributed_files_agree() {
    let config = SimulationConfig::new(12, 80, 0.1, Boundaries::default()).unwrap();

    let serial_path = scratch_path("output_serial.txt");
    let serial_grid = serial::solve(&config).unwrap();
    write_grid_file(&serial_grid, &serial_path).unwrap();

    let results = LocalWorld::run(3, |comm| run_rank(comm, &config, 2));
    let distributed_grid = results
        .into_iter()
        .filter_map(|r| r.unwrap().grid)
        .next()
        .unwrap();
    let distributed_path = scratch_path("output_mpi.txt");
    write_grid_file(&distributed_grid, &distributed_path).unwrap();

    let reference = read_grid_file(&serial_path).unwrap();
    let candidate = read_grid_file(&distributed_path).unwrap();
    assert_eq!(reference, serial_grid);
    assert_eq!(candidate, distributed_grid);

    let comparison = compare_grids(&reference, &candidate, DEFAULT_TOLERANCE).unwrap();
    assert!(comparison.is_close(), "{comparison}");
    assert_eq!(comparison.rows, 14);
    assert_eq!(comparison.cols, 14);

    let _ = std::fs::remove_file(serial_path);
    let _ = std::fs::remove_file(distributed_path);
}

#[test]
fn different_sizes_do_not_compare() {
    let small = serial::solve(&SimulationConfig::new(3, 5, 0.1, Boundaries::default()).unwrap())
        .unwrap();
    let large = serial::solve(&SimulationConfig::new(4, 5, 0.1, Boundaries::default()).unwrap())
        .unwrap();
    let small_path = scratch_path("small.txt");
    let large_path = scratch_path("large.txt");
    write_grid_file(&small, &small_path).unwrap();
    write_grid_file(&large, &large_path).unwrap();

    let result = compare_grids(
        &read_grid_file(&small_path).unwrap(),
        &read_grid_file(&large_path).unwrap(),
        DEFAULT_TOLERANCE,
    );
    assert!(matches!(result, Err(HeatError::DimensionMismatch { .. })));

    let _ = std::fs::remove_file(small_path);
    let _ = std::fs::remove_file(large_path);
}

#[test]
fn diverging_runs_are_flagged() {
    let config = SimulationConfig::new(8, 20, 0.1, Boundaries::default()).unwrap();
    let shorter = SimulationConfig::new(8, 10, 0.1, Boundaries::default()).unwrap();
    let comparison = compare_grids(
        &serial::solve(&config).unwrap(),
        &serial::solve(&shorter).unwrap(),
        DEFAULT_TOLERANCE,
    )
    .unwrap();
    assert!(!comparison.is_close());
    assert!(comparison.max_abs_diff > DEFAULT_TOLERANCE);
    assert!(comparison.rmse <= comparison.max_abs_diff);
}
