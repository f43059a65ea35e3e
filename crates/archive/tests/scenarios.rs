//! Integration tests for merging runs into a lead-year archive.

use approx::assert_relative_eq;
use decadal_archive::{
    ArchiveError, CellStore, DenseStore, LoadConfig, MemoryDataset, MergedArchive, RawRun, load_run,
    merge_datasets, merge_into, merge_runs, plan_merge,
};
use decadal_calendar::{CalendarDate, CfCalendar, YearMonth};

const LAT: [f64; 2] = [-10.0, 10.0];
const LON: [f64; 3] = [0.0, 120.0, 240.0];

/// Run over the standard 2x3 grid whose values encode (year, month index,
/// grid point), so every cell is traceable to its origin.
fn dataset(source: &str, year: i32, month: u8, n_months: usize) -> MemoryDataset {
    let mut values = Vec::with_capacity(n_months * 6);
    for t in 0..n_months {
        for p in 0..6 {
            values.push(f64::from(year) * 1_000.0 + t as f64 + p as f64 * 0.1);
        }
    }
    MemoryDataset::monthly(
        source,
        YearMonth::new(year, month).unwrap(),
        n_months,
        LAT.to_vec(),
        LON.to_vec(),
    )
    .with_field("tas", values)
}

fn load(source: &str, year: i32, month: u8, n_months: usize) -> RawRun {
    load_run(&dataset(source, year, month, n_months), &LoadConfig::default()).unwrap()
}

fn assert_coverage(archive: &MergedArchive) {
    let shape = archive.shape();
    assert_eq!(
        archive.n_filled_cells() + archive.n_missing_cells(),
        shape.n_init() * shape.n_lead() * 12
    );
}

/// Two consecutive 24-month runs fill a complete two-lead-year archive.
#[test]
fn two_full_runs_leave_nothing_missing() {
    let datasets = [
        dataset("run_1990.nc", 1990, 1, 24),
        dataset("run_1991.nc", 1991, 1, 24),
    ];
    let archive = merge_datasets(&datasets, &LoadConfig::default()).unwrap();

    assert_eq!(archive.initialization_years(), &[1990, 1991]);
    assert_eq!(archive.lead_years(), vec![1, 2]);
    assert_eq!(archive.months(), (1..=12).collect::<Vec<u8>>());
    assert_eq!(archive.shape().dims(), [2, 2, 12, 2, 3]);
    assert_eq!(archive.n_missing_cells(), 0);
    assert_eq!(archive.n_filled_cells(), 48);
    assert_coverage(&archive);

    // Month 13 of the 1991 run is lead year 2, month 1.
    let grid = archive.grid(1991, 2, 1).unwrap();
    assert_relative_eq!(grid[0], 1_991_012.0);
    assert_relative_eq!(grid[5], 1_991_012.5);
    assert_eq!(archive.source_of(1991), Some("run_1991.nc"));
}

/// A repeated initialization year is rejected, naming both inputs.
#[test]
fn duplicate_initialization_year() {
    let runs = vec![
        load("short_1990.nc", 1990, 1, 12),
        load("long_1990.nc", 1990, 1, 36),
    ];
    assert_eq!(
        merge_runs(&runs).unwrap_err(),
        ArchiveError::DuplicateInitializationYear {
            year: 1990,
            first: "short_1990.nc".to_string(),
            second: "long_1990.nc".to_string(),
        }
    );
}

/// A February to April jump is reported against the offending input.
#[test]
fn gap_in_time_axis_aborts_merge() {
    let times = [(1990, 1), (1990, 2), (1990, 4)]
        .iter()
        .map(|&(y, m)| CalendarDate::new(y, m, 16, CfCalendar::ProlepticGregorian).unwrap())
        .collect();
    let gappy =
        MemoryDataset::new("gappy.nc", times, LAT.to_vec(), LON.to_vec()).with_field("tas", vec![0.0; 18]);
    let datasets = vec![dataset("ok.nc", 1989, 1, 12), gappy];

    match merge_datasets(&datasets, &LoadConfig::default()).unwrap_err() {
        ArchiveError::MalformedTimeAxis { source_id, reason } => {
            assert_eq!(source_id, "gappy.nc");
            assert!(reason.contains("1990-02") && reason.contains("1990-04"), "{reason}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

/// Runs on grids of different sizes cannot be merged.
#[test]
fn differing_grid_sizes() {
    let coarse = MemoryDataset::monthly(
        "coarse.nc",
        YearMonth::new(1991, 1).unwrap(),
        12,
        vec![0.0],
        LON.to_vec(),
    )
    .with_field("tas", vec![0.0; 36]);
    let datasets = vec![dataset("fine.nc", 1990, 1, 12), coarse];

    match merge_datasets(&datasets, &LoadConfig::default()).unwrap_err() {
        ArchiveError::SpatialGridMismatch {
            source_id,
            reference,
            reason,
        } => {
            assert_eq!(source_id, "coarse.nc");
            assert_eq!(reference, "fine.nc");
            assert!(reason.contains("lat has 1 points, expected 2"), "{reason}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

/// Uneven horizons: exactly the cells no run reaches are missing.
#[test]
fn uneven_horizons_leave_uncovered_cells_missing() {
    let runs = vec![
        load("a.nc", 1990, 11, 120),
        load("b.nc", 1991, 11, 30),
        load("c.nc", 1992, 11, 7),
    ];
    let archive = merge_runs(&runs).unwrap();

    assert_eq!(archive.max_lead_year(), 10);
    assert_eq!(archive.n_cells(), 3 * 10 * 12);
    assert_eq!(archive.n_filled_cells(), 120 + 30 + 7);
    assert_eq!(archive.n_missing_cells(), 360 - 157);
    assert_coverage(&archive);

    assert!(archive.is_filled(1991, 3, 6));
    assert!(!archive.is_filled(1991, 3, 7));
    assert!(archive.is_filled(1992, 1, 7));
    assert!(!archive.is_filled(1992, 1, 8));
    assert!(archive.grid(1992, 2, 1).is_none());
}

/// Input order does not matter; the initialization axis is sorted.
#[test]
fn input_order_does_not_change_archive() {
    let forward = merge_runs(&[load("a.nc", 1990, 1, 24), load("b.nc", 1991, 1, 12)]).unwrap();
    let reverse = merge_runs(&[load("b.nc", 1991, 1, 12), load("a.nc", 1990, 1, 24)]).unwrap();
    assert_eq!(forward.initialization_years(), reverse.initialization_years());
    assert_eq!(forward.sources(), reverse.sources());
    let bits = |a: &MergedArchive| -> Vec<u64> {
        a.store().values().iter().map(|v| v.to_bits()).collect()
    };
    assert_eq!(bits(&forward), bits(&reverse));
}

/// Archive coordinates equal the first run's.
#[test]
fn grid_preserved() {
    let archive = merge_runs(&[load("a.nc", 1990, 1, 12)]).unwrap();
    assert_eq!(archive.lat(), &LAT);
    assert_eq!(archive.lon(), &LON);
    assert_eq!(archive.field(), "tas");
}

/// Runs starting in November map calendar months onto lead months.
#[test]
fn november_initialization() {
    let archive = merge_runs(&[load("a.nc", 1990, 11, 24)]).unwrap();
    assert_eq!(archive.initialization_months(), &[11]);

    // Lead year 1 month 3 is January 1991, the run's third month.
    assert_eq!(
        archive.valid_month(1990, 1, 3),
        Some(YearMonth::new(1991, 1).unwrap())
    );
    assert_relative_eq!(archive.grid(1990, 1, 3).unwrap()[0], 1_990_002.0);
    assert_eq!(
        archive.valid_month(1990, 2, 12),
        Some(YearMonth::new(1992, 10).unwrap())
    );
    assert_eq!(archive.valid_month(1990, 0, 1), None);
    assert_eq!(archive.valid_month(1985, 1, 1), None);
}

/// Loading the same input twice gives bit-identical runs.
#[test]
fn loader_is_idempotent() {
    let ds = dataset("a.nc", 1990, 11, 40);
    let a = load_run(&ds, &LoadConfig::default()).unwrap();
    let b = load_run(&ds, &LoadConfig::default()).unwrap();
    let bits = |r: &RawRun| -> Vec<u64> {
        r.time_series()
            .flat_map(|(_, _, grid)| grid.iter().map(|v| v.to_bits()))
            .collect()
    };
    assert_eq!(bits(&a), bits(&b));
    assert_eq!(a.months(), b.months());
    assert_eq!(a.leads(), b.leads());
}

/// Identical inputs with missing values still load and merge to equal
/// results.
#[test]
fn loader_and_merge_idempotent_with_missing_values() {
    let mut values: Vec<f64> = (0..24 * 6).map(|i| i as f64).collect();
    values[3] = f64::NAN;
    values[100] = f64::NAN;
    let ds = dataset("a.nc", 1990, 1, 24).with_field("tas", values);

    let a = load_run(&ds, &LoadConfig::default()).unwrap();
    let b = load_run(&ds, &LoadConfig::default()).unwrap();
    assert_eq!(a, b);

    let first = merge_runs(&[a]).unwrap();
    let second = merge_runs(&[b]).unwrap();
    assert_eq!(first.n_missing_cells(), 0);
    assert_eq!(first, second);
}

/// Very distant years still have a valid month, just no `YYYYMM` code.
#[test]
fn far_future_valid_month() {
    let archive = merge_runs(&[load("a.nc", 30_000_000, 1, 12)]).unwrap();
    let valid = archive.valid_month(30_000_000, 1, 12).unwrap();
    assert_eq!(valid, YearMonth::new(30_000_000, 12).unwrap());
    assert_eq!(valid.yyyymm(), None);
}

/// A store that already holds a cell triggers an overlap error rather than
/// an overwrite.
#[test]
fn prefilled_store_is_not_overwritten() {
    let runs = vec![load("a.nc", 1990, 1, 12), load("b.nc", 1991, 1, 12)];
    let plan = plan_merge(&runs).unwrap();
    let mut store = DenseStore::new(plan.shape());
    let cell = plan.shape().cell_index(1, 1, 4).unwrap();
    store.fill(cell, &[7.0; 6]).unwrap();

    assert_eq!(
        merge_into(&runs, &mut store).unwrap_err(),
        ArchiveError::OverlappingAssignment {
            source_id: "b.nc".to_string(),
            initialization_year: 1991,
            lead_year: 1,
            month: 4,
        }
    );
    assert_eq!(store.grid(cell), Some(&[7.0; 6][..]));
}

/// Missing source values survive the merge as NaN and are written as fill.
#[test]
fn missing_source_values_become_fill() {
    let mut values = vec![1.0; 12];
    values[3] = f64::NAN;
    let ds = MemoryDataset::monthly(
        "a.nc",
        YearMonth::new(1990, 1).unwrap(),
        12,
        vec![0.0],
        vec![0.0],
    )
    .with_field("tas", values);
    let archive = merge_datasets(&[ds], &LoadConfig::default()).unwrap();
    assert_eq!(archive.n_missing_cells(), 0);
    let filled = archive.to_filled_values(1.0e20);
    assert_eq!(filled[3], 1.0e20);
    assert_eq!(filled[4], 1.0);
}

/// The file-name cross-check flags runs whose name disagrees with their
/// first timestamp.
#[test]
fn name_marker_cross_check() {
    let config = LoadConfig::new("tas").with_init_year_marker("dkfen4");
    let datasets = vec![
        dataset("tas_Amon_dkfen41990_r1i1p1.nc", 1990, 11, 12),
        dataset("tas_Amon_dkfen41991_r1i1p1.nc", 1992, 1, 12),
    ];
    assert_eq!(
        merge_datasets(&datasets, &config).unwrap_err(),
        ArchiveError::InitializationYearConflict {
            source_id: "tas_Amon_dkfen41991_r1i1p1.nc".to_string(),
            from_time_axis: 1992,
            from_name: "1991".to_string(),
        }
    );
}
