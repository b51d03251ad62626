use checkerbot::model::LinearModel;
use checkerbot::selfplay::{Learning, SelfPlayParams, Trainer};
use std::fs::{create_dir_all, remove_dir_all};
use std::path::Path;

#[test]
fn cycle_writes_records_and_model() {
    let outdir = Path::new("target/selfplay_io_test");
    let _ = remove_dir_all(outdir);
    create_dir_all(outdir).unwrap();
    let params = SelfPlayParams {
        games: 1,
        max_turns: 60,
        epsilon: 0.1,
        seed: 123,
        learning: Learning::Batch,
        trainee_model: Some(outdir.join("trainee.bin")),
        records_dir: Some(outdir.join("records")),
        ..SelfPlayParams::default()
    };
    let mut t = Trainer::new(params);
    let ep = t.run_cycle(1).unwrap();

    let csv_path = outdir.join("records").join("match_data1.csv");
    let mut rdr = csv::ReaderBuilder::new().has_headers(false).from_path(&csv_path).unwrap();
    let rows: Vec<csv::StringRecord> = rdr.records().collect::<Result<_, _>>().unwrap();
    assert_eq!(rows.len(), ep.records.len());
    for (row, rec) in rows.iter().zip(ep.records.records()) {
        assert_eq!(row.len(), 7, "six features then the target");
        let target: f64 = row[6].parse().unwrap();
        assert_eq!(target, rec.target);
    }

    let saved = LinearModel::load(outdir.join("trainee.bin")).unwrap();
    assert_eq!(saved.coefficients(), t.trainee().model().coefficients());
}

#[test]
fn existing_model_is_picked_up() {
    let outdir = Path::new("target/selfplay_io_resume");
    create_dir_all(outdir).unwrap();
    let path = outdir.join("trainee.bin");
    let seeded = LinearModel::from_coefficients(vec![0.0, 0.5, -0.5, 0.2, -0.2, -0.1, 0.1], Default::default());
    seeded.save(&path).unwrap();
    let params = SelfPlayParams { games: 0, trainee_model: Some(path), ..SelfPlayParams::default() };
    let t = Trainer::new(params);
    assert_eq!(t.trainee().model().coefficients(), seeded.coefficients());
}
