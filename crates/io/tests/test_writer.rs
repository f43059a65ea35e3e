//! Integration tests for merging run files and writing archives.

use std::path::{Path, PathBuf};

use approx::assert_relative_eq;
use decadal_archive::{LeadYearMeans, LoadConfig, MemoryDataset, anomalies, merge_datasets};
use decadal_calendar::{CalendarDate, CfCalendar, YearMonth, monthly_sequence};
use decadal_io::{
    DEFAULT_FILL_VALUE, IoError, ReaderConfig, WriterConfig, merge_files, read_climatology,
    write_archive, write_lead_year_means,
};
use tempfile::tempdir;

const LATS: [f64; 2] = [10.0, 20.0];
const LONS: [f64; 2] = [100.0, 110.0];

/// Write a noleap monthly run where every cell of month `t` holds
/// `base + t`.
fn write_run(dir: &Path, name: &str, year: i32, month: u8, n_months: usize, base: f64) -> PathBuf {
    let path = dir.join(name);
    let mut file = netcdf::create(&path).expect("create run file");
    file.add_dimension("time", n_months).expect("add dim time");
    file.add_dimension("lat", LATS.len()).expect("add dim lat");
    file.add_dimension("lon", LONS.len()).expect("add dim lon");

    file.add_variable::<f64>("lat", &["lat"])
        .expect("add var lat")
        .put_values(&LATS, ..)
        .expect("put lat");
    file.add_variable::<f64>("lon", &["lon"])
        .expect("add var lon")
        .put_values(&LONS, ..)
        .expect("put lon");

    let calendar = CfCalendar::NoLeap;
    let ref_day = CalendarDate::new(1850, 1, 1, calendar)
        .unwrap()
        .day_number(calendar)
        .unwrap();
    let offsets: Vec<f64> = monthly_sequence(YearMonth::new(year, month).unwrap(), n_months)
        .into_iter()
        .map(|ym| {
            let d = CalendarDate::new(ym.year(), ym.month(), 15, calendar).unwrap();
            (d.day_number(calendar).unwrap() - ref_day) as f64
        })
        .collect();
    {
        let mut var = file
            .add_variable::<f64>("time", &["time"])
            .expect("add var time");
        var.put_values(&offsets, ..).expect("put time");
        var.put_attribute("units", "days since 1850-01-01")
            .expect("time units");
        var.put_attribute("calendar", "noleap")
            .expect("time calendar");
    }

    let cells = LATS.len() * LONS.len();
    let data: Vec<f64> = (0..n_months * cells)
        .map(|i| base + (i / cells) as f64)
        .collect();
    file.add_variable::<f64>("tas", &["time", "lat", "lon"])
        .expect("add var tas")
        .put_values(&data, ..)
        .expect("put tas");
    path
}

fn write_flat_climatology(dir: &Path, value: f64) -> PathBuf {
    let path = dir.join("clim.nc");
    let mut file = netcdf::create(&path).expect("create climatology");
    file.add_dimension("lat", LATS.len()).unwrap();
    file.add_dimension("lon", LONS.len()).unwrap();
    file.add_variable::<f64>("lat", &["lat"])
        .unwrap()
        .put_values(&LATS, ..)
        .unwrap();
    file.add_variable::<f64>("lon", &["lon"])
        .unwrap()
        .put_values(&LONS, ..)
        .unwrap();
    file.add_variable::<f64>("tas", &["lat", "lon"])
        .unwrap()
        .put_values(&[value; 4], ..)
        .unwrap();
    path
}

#[test]
fn merge_and_write_archive() {
    let dir = tempdir().unwrap();
    // 1961 covers two lead years, 1962 only one: lead year 2 of 1962 is missing.
    let paths = vec![
        write_run(dir.path(), "run_1962.nc", 1962, 1, 12, 500.0),
        write_run(dir.path(), "run_1961.nc", 1961, 1, 24, 100.0),
    ];
    let archive = merge_files(&paths, &LoadConfig::default(), &ReaderConfig::default()).unwrap();
    assert_eq!(archive.initialization_years(), &[1961, 1962]);
    assert_eq!(archive.max_lead_year(), 2);
    assert_eq!(archive.n_missing_cells(), 12);

    let out = dir.path().join("archive.nc");
    let config = WriterConfig::default()
        .with_valid_time(true)
        .with_deflate_level(Some(4));
    write_archive(&out, &archive, &config).unwrap();

    let file = netcdf::open(&out).unwrap();
    let tas = file.variable("tas").unwrap();
    let dims: Vec<usize> = tas.dimensions().iter().map(|d| d.len()).collect();
    assert_eq!(dims, vec![2, 2, 12, 2, 2]);
    let names: Vec<String> = tas.dimensions().iter().map(|d| d.name()).collect();
    assert_eq!(
        names,
        vec!["initialization_year", "lead_year", "month", "lat", "lon"]
    );

    let values = tas.get_values::<f64, _>(..).unwrap();
    // (1961, lead 2, month 3, 0, 0): month index 14 of the 1961 run.
    assert_relative_eq!(values[(12 + 2) * 4], 114.0);
    // (1962, lead 1, month 12, 1, 1).
    assert_relative_eq!(values[(2 * 12 + 11) * 4 + 3], 511.0);
    // (1962, lead 2, *) is missing.
    let missing = &values[3 * 12 * 4..4 * 12 * 4];
    assert!(missing.iter().all(|&v| v == DEFAULT_FILL_VALUE));

    let filled = file
        .variable("filled")
        .unwrap()
        .get_values::<i8, _>(..)
        .unwrap();
    assert_eq!(filled.len(), 2 * 2 * 12);
    assert!(filled[..3 * 12].iter().all(|&f| f == 1));
    assert!(filled[3 * 12..].iter().all(|&f| f == 0));

    let years = file
        .variable("initialization_year")
        .unwrap()
        .get_values::<i32, _>(..)
        .unwrap();
    assert_eq!(years, vec![1961, 1962]);
    let leads = file
        .variable("lead_year")
        .unwrap()
        .get_values::<i32, _>(..)
        .unwrap();
    assert_eq!(leads, vec![1, 2]);

    let valid = file
        .variable("valid_time")
        .unwrap()
        .get_values::<i32, _>(..)
        .unwrap();
    assert_eq!(valid[0], 196101);
    assert_eq!(valid[12 + 11], 196212);
    assert_eq!(valid[2 * 12], 196201);
}

#[test]
fn unencodable_valid_time_written_as_fill() {
    let dir = tempdir().unwrap();
    let ds = MemoryDataset::monthly(
        "far.nc",
        YearMonth::new(30_000_000, 1).unwrap(),
        12,
        LATS.to_vec(),
        LONS.to_vec(),
    )
    .with_field("tas", vec![1.0; 12 * 4]);
    let archive = merge_datasets(&[ds], &LoadConfig::default()).unwrap();
    let out = dir.path().join("archive.nc");
    write_archive(&out, &archive, &WriterConfig::default().with_valid_time(true)).unwrap();

    let file = netcdf::open(&out).unwrap();
    let valid = file
        .variable("valid_time")
        .unwrap()
        .get_values::<i32, _>(..)
        .unwrap();
    assert_eq!(valid.len(), 12);
    assert!(valid.iter().all(|&v| v == -1));
}

#[test]
fn missing_source_value_stays_marked_filled() {
    let dir = tempdir().unwrap();
    let mut values = vec![2.0; 12 * 4];
    values[5 * 4] = f64::NAN;
    let ds = MemoryDataset::monthly(
        "gap.nc",
        YearMonth::new(1990, 1).unwrap(),
        12,
        LATS.to_vec(),
        LONS.to_vec(),
    )
    .with_field("tas", values);
    let archive = merge_datasets(&[ds], &LoadConfig::default()).unwrap();
    assert_eq!(archive.n_missing_cells(), 0);
    let out = dir.path().join("archive.nc");
    write_archive(&out, &archive, &WriterConfig::default()).unwrap();

    let file = netcdf::open(&out).unwrap();
    let tas = file
        .variable("tas")
        .unwrap()
        .get_values::<f64, _>(..)
        .unwrap();
    assert_eq!(tas[5 * 4], DEFAULT_FILL_VALUE);
    assert_relative_eq!(tas[5 * 4 + 1], 2.0);
    let filled = file
        .variable("filled")
        .unwrap()
        .get_values::<i8, _>(..)
        .unwrap();
    assert_eq!(filled, vec![1; 12]);
}

#[test]
fn archive_without_valid_time() {
    let dir = tempdir().unwrap();
    let paths = vec![write_run(dir.path(), "run.nc", 1970, 6, 12, 0.0)];
    let archive = merge_files(&paths, &LoadConfig::default(), &ReaderConfig::default()).unwrap();
    let out = dir.path().join("archive.nc");
    write_archive(&out, &archive, &WriterConfig::default().with_fill_value(-999.0)).unwrap();

    let file = netcdf::open(&out).unwrap();
    assert!(file.variable("valid_time").is_none());
    let months = file
        .variable("initialization_month")
        .unwrap()
        .get_values::<i32, _>(..)
        .unwrap();
    assert_eq!(months, vec![6]);
}

#[test]
fn lead_year_means_and_anomalies() {
    let dir = tempdir().unwrap();
    let paths = vec![write_run(dir.path(), "run.nc", 1980, 1, 24, 10.0)];
    let archive = merge_files(&paths, &LoadConfig::default(), &ReaderConfig::default()).unwrap();
    let means = LeadYearMeans::from_archive(&archive);

    let clim_path = write_flat_climatology(dir.path(), 15.0);
    let clim = read_climatology(&clim_path, "tas", &ReaderConfig::default()).unwrap();
    let anom = anomalies(&means, &clim).unwrap();

    let out = dir.path().join("anomalies.nc");
    write_lead_year_means(&out, &anom, "tas_anomaly", &WriterConfig::default()).unwrap();

    let file = netcdf::open(&out).unwrap();
    let var = file.variable("tas_anomaly").unwrap();
    let dims: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
    assert_eq!(dims, vec![1, 2, 2, 2]);
    let values = var.get_values::<f64, _>(..).unwrap();
    // Lead year 1 averages 10..=21 to 15.5; lead year 2 averages 22..=33 to 27.5.
    assert_relative_eq!(values[0], 0.5, epsilon = 1e-9);
    assert_relative_eq!(values[4], 12.5, epsilon = 1e-9);
}

#[test]
fn blank_variable_name_rejected() {
    let dir = tempdir().unwrap();
    let paths = vec![write_run(dir.path(), "run.nc", 1980, 1, 12, 0.0)];
    let archive = merge_files(&paths, &LoadConfig::default(), &ReaderConfig::default()).unwrap();
    let means = LeadYearMeans::from_archive(&archive);
    let err = write_lead_year_means(
        &dir.path().join("out.nc"),
        &means,
        " ",
        &WriterConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, IoError::Validation { count: 1, .. }));
}

#[test]
fn invalid_writer_config_writes_nothing() {
    let dir = tempdir().unwrap();
    let paths = vec![write_run(dir.path(), "run.nc", 1980, 1, 12, 0.0)];
    let archive = merge_files(&paths, &LoadConfig::default(), &ReaderConfig::default()).unwrap();
    let out = dir.path().join("archive.nc");
    let err = write_archive(
        &out,
        &archive,
        &WriterConfig::default().with_deflate_level(Some(10)),
    )
    .unwrap_err();
    assert!(matches!(err, IoError::Validation { .. }));
    assert!(!out.exists());
}
