use slot_hhi::analyzers::analyzer::{run_airport_hhi, run_expansion, run_route_hhi, run_slots};
use slot_hhi::config::AnalysisConfig;
use slot_hhi::output::OutputDir;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn slot_config() -> AnalysisConfig {
    AnalysisConfig {
        airports: vec!["DUS".into(), "FRA".into()],
        seasons: vec!["S17".into(), "S18".into()],
        ..Default::default()
    }
}

fn lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .expect("output file")
        .lines()
        .map(str::to_string)
        .collect()
}

fn records(path: &Path) -> Vec<csv::StringRecord> {
    csv::Reader::from_path(path)
        .expect("output file")
        .records()
        .collect::<Result<_, _>>()
        .expect("valid csv")
}

#[test]
fn test_slot_allocation_pipeline() {
    let out_dir = tempfile::tempdir().unwrap();
    let out = OutputDir::create(out_dir.path(), false).unwrap();

    let written = run_slots(&slot_config(), &fixtures().join("slots"), &out).unwrap();
    assert_eq!(written.len(), 2);

    assert_eq!(
        lines(&out_dir.path().join("DUS.csv")),
        vec![
            "GROUP,S17,S18",
            "Lufthansa Group,150,200",
            "Air Berlin Group,60,0",
            "Low Cost Carriers,90,0",
            "Legacy Carriers,0,0",
            "Regional & Others,0,0",
            "New Entrants,0,100",
        ]
    );
    assert!(!out_dir.path().join("FRA.csv").exists());

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out_dir.path().join("diagnostics.json")).unwrap())
            .unwrap();
    assert_eq!(report["diagnostics"]["total_rows"], 12);
    assert_eq!(report["diagnostics"]["dropped_rows"], 2);
    assert_eq!(report["diagnostics"]["unclassified"][0], "ZZ");

    let conflicts = report["conflicts"].as_array().unwrap();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0]["code"], "FR");
    assert_eq!(conflicts[0]["scope"], "DUS");
    assert_eq!(conflicts[0]["first"], "Low Cost Carriers");
}

#[test]
fn test_airport_hhi_pipeline() {
    let out_dir = tempfile::tempdir().unwrap();
    let out = OutputDir::create(out_dir.path(), false).unwrap();

    run_airport_hhi(&slot_config(), &fixtures().join("slots"), &out).unwrap();

    assert_eq!(
        lines(&out_dir.path().join("combined_hhi_summary.csv")),
        vec![
            "Airport,Season,Season Name,HHI,Market Classification",
            "DUS,S17,Summer 2017,3800.0,Highly Concentrated",
            "DUS,S18,Summer 2018,5200.0,Highly Concentrated",
        ]
    );

    let summary = records(&out_dir.path().join("airport_summary.csv"));
    assert_eq!(summary.len(), 1);
    assert_eq!(&summary[0][1], "4500.0");
    assert_eq!(&summary[0][5], "Increasing Concentration (+36.8%)");

    let breakdown = lines(&out_dir.path().join("DUS_hhi_breakdown.csv"));
    assert_eq!(breakdown[0], "Airline Group,Summer 2017,Summer 2018");
    assert_eq!(breakdown[1], "Lufthansa Group,50,60");
    assert_eq!(breakdown[6], "New Entrants,0,40");
    assert_eq!(breakdown[7], "HHI,3800,5200");
}

#[test]
fn test_route_hhi_pipeline() {
    let out_dir = tempfile::tempdir().unwrap();
    let out = OutputDir::create(out_dir.path(), false).unwrap();

    let written = run_route_hhi(
        &AnalysisConfig::default(),
        &fixtures().join("schedule.csv"),
        &fixtures().join("slots"),
        &out,
    )
    .unwrap();
    assert_eq!(written.len(), 6);

    let rows = records(&out_dir.path().join("hhi_results.csv"));
    let routes: Vec<(&str, &str)> = rows.iter().map(|r| (&r[3], &r[2])).collect();
    assert_eq!(
        routes,
        vec![
            ("DUS->GULF/MIDDLE EAST", "2018"),
            ("DUS->WESTERN EUROPE", "2017"),
            ("DUS->WESTERN EUROPE", "2018"),
            ("FRA->WESTERN EUROPE", "2017"),
            ("FRA->WESTERN EUROPE", "2018"),
        ]
    );

    // summer flights only: Lufthansa 150, Ryanair 90, Air Berlin 60
    let dus_2017: f64 = rows[1][4].parse().unwrap();
    assert!((dus_2017 - 3800.0).abs() < 1e-6);
    assert_eq!(&rows[1][5], "Highly Concentrated");

    let shares = records(&out_dir.path().join("market_shares_by_group.csv"));
    let lh = shares
        .iter()
        .find(|r| &r[3] == "DUS->WESTERN EUROPE" && &r[2] == "2017" && &r[4] == "Lufthansa Group")
        .unwrap();
    assert_eq!(&lh[5], "150");
    assert_eq!(&lh[6], "300");

    let pivot = lines(&out_dir.path().join("hhi_pivot_table.csv"));
    assert_eq!(pivot[0], "Route,2017,2018");
    assert_eq!(pivot[1], "DUS->GULF/MIDDLE EAST,0,10000");

    let summary: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(out_dir.path().join("summary_statistics.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(summary["overall"]["count"], 5);
    assert_eq!(summary["by_airport"]["FRA"]["count"], 2);
}

#[test]
fn test_expansion_pipeline() {
    let out_dir = tempfile::tempdir().unwrap();
    let out = OutputDir::create(out_dir.path(), false).unwrap();

    run_expansion(
        &AnalysisConfig::default(),
        &fixtures().join("schedule.csv"),
        &out,
    )
    .unwrap();

    assert_eq!(
        lines(&out_dir.path().join("lufthansa_on_ab_routes_with_increase.csv")),
        vec![
            "Year,Origin,Destination,Route,AB_Departures,LH_Departures,LH_Delta,LH_Pct_Change",
            "2017,DUS,WESTERN EUROPE,DUS->WESTERN EUROPE,560,150,,",
            "2018,DUS,WESTERN EUROPE,DUS->WESTERN EUROPE,0,200,50,33.33",
            "2017,FRA,TXL,FRA->TXL,10,0,,",
            "2018,FRA,TXL,FRA->TXL,0,1000,1000,",
        ]
    );

    let frequencies = records(&out_dir.path().join("ab_routes_frequency_per_year.csv"));
    assert_eq!(frequencies.len(), 4);
    assert!(frequencies.iter().all(|r| &r[3] != "DUS->GULF/MIDDLE EAST"));

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out_dir.path().join("diagnostics.json")).unwrap())
            .unwrap();
    assert_eq!(report["diagnostics"]["total_rows"], 10);
    assert_eq!(report["diagnostics"]["dropped_rows"], 0);
    assert_eq!(report["conflicts"].as_array().unwrap().len(), 0);
}

#[test]
fn test_default_config_keeps_every_year() {
    let dir = tempfile::tempdir().unwrap();
    let schedule = dir.path().join("schedule.csv");
    fs::write(
        &schedule,
        "Year,Month,Origin Airport,Origin Region Name,Destination Airport,Destination Region Name,Operating Airline,Operating Airline Name,Departures\n\
         2020,6,DUS,Western Europe,PMI,Western Europe,LH,Lufthansa,40\n\
         2019,6,DUS,Western Europe,PMI,Western Europe,AB,Air Berlin,10\n",
    )
    .unwrap();

    let route_out = dir.path().join("route");
    run_route_hhi(
        &AnalysisConfig::default(),
        &schedule,
        &fixtures().join("slots"),
        &OutputDir::create(&route_out, false).unwrap(),
    )
    .unwrap();
    let years: Vec<String> = records(&route_out.join("hhi_results.csv"))
        .iter()
        .map(|r| r[2].to_string())
        .collect();
    assert_eq!(years, vec!["2019", "2020"]);

    let expansion_out = dir.path().join("expansion");
    run_expansion(
        &AnalysisConfig::default(),
        &schedule,
        &OutputDir::create(&expansion_out, false).unwrap(),
    )
    .unwrap();
    assert_eq!(
        lines(&expansion_out.join("lufthansa_on_ab_routes_with_increase.csv"))[2],
        "2020,DUS,WESTERN EUROPE,DUS->WESTERN EUROPE,0,40,40,"
    );
}

#[test]
fn test_gzip_outputs() {
    let out_dir = tempfile::tempdir().unwrap();
    let out = OutputDir::create(out_dir.path(), true).unwrap();

    let written = run_slots(&slot_config(), &fixtures().join("slots"), &out).unwrap();
    assert!(written.iter().all(|p| p.extension().is_some_and(|e| e == "gz")));

    let mut decoded = String::new();
    flate2::read::GzDecoder::new(fs::File::open(out_dir.path().join("DUS.csv.gz")).unwrap())
        .read_to_string(&mut decoded)
        .unwrap();
    assert!(decoded.starts_with("GROUP,S17,S18\nLufthansa Group,150,200\n"));
}
