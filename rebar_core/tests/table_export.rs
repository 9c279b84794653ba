use std::fs;

use rebar_core::file_io::{export_diameter_table, load_settings, read_area_table, save_settings, ExportLock};
use rebar_core::settings::ProposalSettings;
use rebar_core::{CalcError, FailurePolicy};

const FEM_EXPORT: &str = "\
ID,Load Case Name,LC ,NR ,ASO [cm2/m],ASOQ [cm2/m],ASU [cm2/m],ASUQ [cm2/m],mxx [kNm/m],t [mm]
P.1,ULS,1,11,5.0,5.0,13.0,0.0,12.1,300
,ULS,1,12,20.0,10.0,40.0,80.0,55.3,300
W.4,ULS,1,41,2.0,,2.0,2.0,3.2,250
";

#[test]
fn csv_in_diameters_out() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("areas.csv");
    let output = dir.path().join("proposed_rebar_diameters.csv");
    fs::write(&input, FEM_EXPORT).unwrap();

    let mut settings = ProposalSettings::default();
    settings.failure_policy = FailurePolicy::CollectAll;

    let areas = read_area_table(&input, &settings).unwrap();
    let outcome = settings.propose_table(&areas).unwrap();

    assert_eq!(outcome.table.element_ids(), areas.element_ids());
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].element_id, "W.4");
    assert_eq!(outcome.failures[0].column, "ASOQ [cm2/m]");

    export_diameter_table(&outcome.table, &output).unwrap();

    let written = fs::read_to_string(&output).unwrap();
    assert_eq!(
        written,
        "ID,NR ,phi_SO,phi_SOQ,phi_SU,phi_SUQ\n\
         P.1,11,12,12,16,12\n\
         P.1,12,16,16,32,32\n\
         W.4,41,12,,12,12\n"
    );

    assert!(!dir.path().join("proposed_rebar_diameters.csv.tmp").exists());
    assert!(!dir.path().join("proposed_rebar_diameters.csv.lock").exists());
}

#[test]
fn fail_fast_stops_at_blank_cell() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("areas.csv");
    fs::write(&input, FEM_EXPORT).unwrap();

    let settings = ProposalSettings::default();
    let areas = read_area_table(&input, &settings).unwrap();
    let err = settings.propose_table(&areas).unwrap_err();

    match err {
        CalcError::CellFailed { row, element_id, .. } => {
            assert_eq!(row, 2);
            assert_eq!(element_id, "W.4");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn export_refuses_locked_target() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("phi.csv");

    let lock = ExportLock::acquire(&output).unwrap();
    let err = ExportLock::acquire(&output).err().unwrap();
    assert!(err.is_recoverable());
    drop(lock);

    assert!(ExportLock::acquire(&output).is_ok());
}

#[test]
fn settings_roundtrip_and_version_check() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rebar.json");

    let mut settings = ProposalSettings::default();
    settings.catalog = settings.catalog.with_diameters(vec![10.0, 12.0, 16.0]).unwrap();
    save_settings(&settings, &path).unwrap();
    assert_eq!(load_settings(&path).unwrap(), settings);

    fs::write(&path, r#"{"version":"2.0.0"}"#).unwrap();
    let err = load_settings(&path).unwrap_err();
    assert_eq!(err.error_code(), "VERSION_MISMATCH");
}
