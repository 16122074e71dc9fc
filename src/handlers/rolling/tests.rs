//! Tests for size- and date-driven rolling.

use std::{fs, path::Path, sync::Arc};

use chrono::NaiveDate;
use rstest::{fixture, rstest};
use tempfile::{TempDir, tempdir};

use super::*;

const LINE: &str = "0123456789012345678901234567890123456789";

fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 31).expect("valid date")
}

#[fixture]
fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(start_date()))
}

#[fixture]
fn dir() -> TempDir {
    tempdir().expect("tempdir")
}

fn writer(dir: &Path, clock: &Arc<ManualClock>, config: RollingConfig) -> RollingFileWriter {
    RollingFileWriter::new(dir, "beacon", config).with_clock(clock.clone())
}

fn read(path: impl AsRef<Path>) -> String {
    fs::read_to_string(path).expect("read log file")
}

fn tagged(tag: &str) -> String {
    format!("{tag}{}", &LINE[tag.len()..])
}

#[rstest]
#[case(100, Some(100))]
#[case(0, None)]
#[case(-5, None)]
#[case(i64::MAX, Some(i64::MAX as u64))]
fn size_limit_ignores_non_positive_values(#[case] limit: i64, #[case] expected: Option<u64>) {
    assert_eq!(RollingConfig::new(limit, 1).size_limit(), expected);
}

#[rstest]
#[case(3, 1, 2)]
#[case(3, 3, 1)]
#[case(1, 1, 1)]
#[case(0, 1, 2)]
#[case(0, 41, 42)]
fn next_index_wraps_past_window(#[case] max: usize, #[case] index: usize, #[case] expected: usize) {
    assert_eq!(RollingConfig::new(100, max).next_index(index), expected);
}

#[rstest]
fn write_before_open_reports_not_open(dir: TempDir, clock: Arc<ManualClock>) {
    let writer = writer(dir.path(), &clock, RollingConfig::default());
    assert!(matches!(
        writer.write_line("early", true),
        Err(WriterError::NotOpen)
    ));
    assert!(!writer.is_open());
}

#[rstest]
fn open_creates_directory_and_dated_file(dir: TempDir, clock: Arc<ManualClock>) {
    let nested = dir.path().join("logs");
    let writer = writer(&nested, &clock, RollingConfig::default());
    writer.open(true).expect("open");
    writer.write_line("hello", true).expect("write");

    let expected = nested.join("beacon-2024-05-31.log");
    assert_eq!(writer.current_path(), Some(expected.clone()));
    assert_eq!(writer.base_file_name(), "beacon-2024-05-31");
    assert_eq!(read(expected), "hello\n");
}

#[rstest]
#[case(true, "old\nnew\n")]
#[case(false, "new\n")]
fn open_honours_append_flag(
    dir: TempDir,
    clock: Arc<ManualClock>,
    #[case] append: bool,
    #[case] expected: &str,
) {
    let path = dir.path().join("beacon-2024-05-31.log");
    fs::write(&path, "old\n").expect("seed");
    let writer = writer(dir.path(), &clock, RollingConfig::default());
    writer.open(append).expect("open");
    writer.write_line("new", true).expect("write");
    assert_eq!(read(path), expected);
}

#[rstest]
fn size_rotation_walks_suffixes_then_overwrites(dir: TempDir, clock: Arc<ManualClock>) {
    let writer = writer(dir.path(), &clock, RollingConfig::new(100, 3));
    writer.open(true).expect("open");

    // Three 41-byte lines cross the 100-byte limit; the fourth rolls.
    for file in ["a", "b", "c", "d", "e"] {
        for _ in 0..3 {
            writer.write_line(&tagged(file), false).expect("write");
        }
    }
    writer.flush().expect("flush");

    let base = dir.path().join("beacon-2024-05-31.log");
    let rolled = |n: usize| dir.path().join(format!("beacon-2024-05-31 {n}.log"));
    let expect_three = |tag: &str| format!("{}\n", tagged(tag)).repeat(3);

    assert_eq!(read(&base), expect_three("a"));
    assert_eq!(read(rolled(2)), expect_three("c"));
    assert_eq!(read(rolled(3)), expect_three("d"));
    // The window is exhausted so suffix 1 is reused and its contents replaced.
    assert_eq!(read(rolled(1)), expect_three("e"));
    assert!(!rolled(4).exists());
    assert_eq!(writer.current_path(), Some(rolled(1)));
}

#[rstest]
fn zero_max_rolling_files_never_overwrites(dir: TempDir, clock: Arc<ManualClock>) {
    let writer = writer(dir.path(), &clock, RollingConfig::new(1, 0));
    writer.open(true).expect("open");
    for line in ["a", "b", "c", "d"] {
        writer.write_line(line, false).expect("write");
    }
    writer.flush().expect("flush");

    let rolled = |n: usize| dir.path().join(format!("beacon-2024-05-31 {n}.log"));
    assert_eq!(read(dir.path().join("beacon-2024-05-31.log")), "a\n");
    assert_eq!(read(rolled(1)), "b\n");
    assert_eq!(read(rolled(2)), "c\n");
    assert_eq!(read(rolled(3)), "d\n");
    assert_eq!(writer.current_path(), Some(rolled(3)));
}

#[rstest]
fn size_rotation_skips_existing_names(dir: TempDir, clock: Arc<ManualClock>) {
    let stale = dir.path().join("beacon-2024-05-31 1.log");
    let writer = writer(dir.path(), &clock, RollingConfig::new(10, 3));
    writer.open(true).expect("open");
    fs::write(&stale, "keep\n").expect("seed");

    writer.write_line("first line", false).expect("write");
    writer.write_line("second line", true).expect("write");

    assert_eq!(read(&stale), "keep\n");
    assert_eq!(
        writer.current_path(),
        Some(dir.path().join("beacon-2024-05-31 2.log"))
    );
}

#[rstest]
fn disabled_size_limit_never_rolls(dir: TempDir, clock: Arc<ManualClock>) {
    let writer = writer(dir.path(), &clock, RollingConfig::new(0, 3));
    writer.open(true).expect("open");
    for _ in 0..20 {
        writer.write_line(LINE, false).expect("write");
    }
    writer.flush().expect("flush");
    let entries = fs::read_dir(dir.path()).expect("read dir").count();
    assert_eq!(entries, 1);
}

#[rstest]
fn date_rollover_opens_new_file_regardless_of_size(dir: TempDir, clock: Arc<ManualClock>) {
    let writer = writer(dir.path(), &clock, RollingConfig::new(1_000_000, 2));
    writer.open(true).expect("open");
    writer.write_line("before midnight", true).expect("write");

    clock.advance_day();
    writer.write_line("after midnight", true).expect("write");

    assert_eq!(
        read(dir.path().join("beacon-2024-05-31.log")),
        "before midnight\n"
    );
    assert_eq!(
        read(dir.path().join("beacon-2024-06-01.log")),
        "after midnight\n"
    );
}

#[rstest]
fn date_rollover_appends_to_existing_file(dir: TempDir, clock: Arc<ManualClock>) {
    let next_day = dir.path().join("beacon-2024-06-01.log");
    let writer = writer(dir.path(), &clock, RollingConfig::default());
    writer.open(false).expect("open");
    fs::write(&next_day, "earlier run\n").expect("seed");

    clock.set(NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date"));
    writer.write_line("later run", true).expect("write");
    assert_eq!(read(next_day), "earlier run\nlater run\n");
}

#[rstest]
fn name_formatter_change_triggers_rotation(dir: TempDir, clock: Arc<ManualClock>) {
    let suffix = Arc::new(parking_lot::Mutex::new(String::from("alpha")));
    let hook = suffix.clone();
    let writer = writer(dir.path(), &clock, RollingConfig::default()).with_name_formatter(
        Arc::new(move |name: &str| format!("{name}-{}", hook.lock())),
    );
    writer.open(true).expect("open");
    writer.write_line("one", true).expect("write");
    *suffix.lock() = String::from("beta");
    writer.write_line("two", true).expect("write");

    assert_eq!(read(dir.path().join("beacon-2024-05-31-alpha.log")), "one\n");
    assert_eq!(read(dir.path().join("beacon-2024-05-31-beta.log")), "two\n");
}

#[rstest]
fn open_resumes_latest_rolled_file(dir: TempDir, clock: Arc<ManualClock>) {
    use filetime::{FileTime, set_file_mtime};

    let base = dir.path().join("beacon-2024-05-31.log");
    let rolled = dir.path().join("beacon-2024-05-31 2.log");
    fs::write(&base, "base\n").expect("seed");
    fs::write(&rolled, "rolled\n").expect("seed");
    set_file_mtime(&base, FileTime::from_unix_time(1_000, 0)).expect("mtime");
    set_file_mtime(&rolled, FileTime::from_unix_time(2_000, 0)).expect("mtime");

    let writer = writer(dir.path(), &clock, RollingConfig::new(1_000, 3));
    writer.open(true).expect("open");
    writer.write_line("resumed", true).expect("write");
    assert_eq!(read(&rolled), "rolled\nresumed\n");
}

#[rstest]
fn close_is_idempotent_and_final(dir: TempDir, clock: Arc<ManualClock>) {
    let writer = writer(dir.path(), &clock, RollingConfig::default());
    writer.open(true).expect("open");
    writer.write_line("buffered", false).expect("write");
    writer.close().expect("first close");
    writer.close().expect("second close");

    assert!(!writer.is_open());
    assert!(writer.is_closed());
    assert_eq!(read(dir.path().join("beacon-2024-05-31.log")), "buffered\n");
    assert!(matches!(
        writer.write_line("late", true),
        Err(WriterError::Closed)
    ));
    assert!(matches!(writer.open(true), Err(WriterError::Closed)));
}
