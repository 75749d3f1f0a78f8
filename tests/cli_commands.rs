use chrono::{Local, NaiveDate};
use clap::Parser;
use songmate::cli::{self, Cli};
use songmate::config::Config;
use songmate::{Gender, Library, LibraryStore, SongRecord};
use tempfile::tempdir;

fn run_in(config: &Config, args: &[&str]) -> anyhow::Result<()> {
    let data_dir = config.data_dir().display().to_string();
    let mut argv = vec!["songmate", "--data-dir", data_dir.as_str()];
    argv.extend_from_slice(args);
    cli::run(Cli::try_parse_from(argv)?, config)
}

#[test]
fn backdated_draw_records_todays_play() {
    let dir = tempdir().unwrap();
    let config = Config::resolve(Some(dir.path().to_path_buf())).unwrap();
    let store = LibraryStore::new(config.db_path());
    store
        .persist(&Library::new(vec![SongRecord::new(
            "Ann",
            Gender::Male,
            "One",
            None,
        )]))
        .unwrap();

    let export = dir.path().join("out.txt");
    let before = Local::now().date_naive();
    run_in(
        &config,
        &[
            "draw",
            "--date",
            "2020-01-01",
            "-n",
            "1",
            "--export",
            export.to_str().unwrap(),
        ],
    )
    .unwrap();
    let after = Local::now().date_naive();

    let record = store.load().unwrap().records()[0].clone();
    assert_eq!(record.play_count, 1);
    let played = record.last_played.unwrap();
    assert!(played == before || played == after, "stamped {played}");
    assert_ne!(played, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());

    // 2020-01-02 is even, so the reference date selects the male pool.
    let written = std::fs::read_to_string(&export).unwrap();
    assert_eq!(written, "Male playlist · 2020-01-02\n1. One — Ann\n");
}

#[test]
fn edit_reports_unknown_fields() {
    let dir = tempdir().unwrap();
    let config = Config::resolve(Some(dir.path().to_path_buf())).unwrap();
    let store = LibraryStore::new(config.db_path());
    let library = Library::new(vec![SongRecord::new("Ann", Gender::Male, "One", None)]);
    store.persist(&library).unwrap();

    let err = run_in(&config, &["edit", "0", "mood", "happy"]).unwrap_err();
    assert!(err.to_string().contains("expected one of requester"));
    assert_eq!(store.load().unwrap(), library);

    run_in(&config, &["edit", "0", "play_count", "4"]).unwrap();
    assert_eq!(store.load().unwrap().records()[0].play_count, 4);
}
