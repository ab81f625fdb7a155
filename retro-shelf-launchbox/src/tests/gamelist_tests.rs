use super::*;

use std::cell::RefCell;
use std::fs;
use std::sync::Once;

use tempfile::TempDir;

thread_local! {
    static WARNINGS: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

/// Collects warnings per test thread.
struct WarningLog;

impl log::Log for WarningLog {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= log::Level::Warn
    }

    fn log(&self, record: &log::Record<'_>) {
        if self.enabled(record.metadata()) {
            WARNINGS.with(|w| w.borrow_mut().push(record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

static WARNING_LOG: WarningLog = WarningLog;

fn capture_warnings<T>(f: impl FnOnce() -> T) -> (T, Vec<String>) {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        if log::set_logger(&WARNING_LOG).is_ok() {
            log::set_max_level(log::LevelFilter::Warn);
        }
    });
    WARNINGS.with(|w| w.borrow_mut().clear());
    let out = f();
    (out, WARNINGS.with(|w| w.take()))
}

struct Fixture {
    dir: TempDir,
    platform: Platform,
    emulators: HashMap<EmulatorId, Emulator>,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("Games/SNES")).unwrap();
        fs::create_dir_all(root.join("Emulators")).unwrap();
        for file in [
            "Games/SNES/Super Metroid.sfc",
            "Games/SNES/Chrono Trigger.sfc",
            "Games/SNES/Chrono Trigger Setup.exe",
            "Emulators/retroarch.exe",
            "Emulators/bsnes.exe",
        ] {
            fs::write(root.join(file), b"").unwrap();
        }

        let emu = |file: &str, params: &str| Emulator {
            app_path: root.join(file).canonicalize().unwrap(),
            cmd_params: params.to_string(),
        };
        let mut emulators = HashMap::new();
        emulators.insert("ra".to_string(), emu("Emulators/retroarch.exe", "-L snes9x"));
        emulators.insert("bsnes".to_string(), emu("Emulators/bsnes.exe", "--fullscreen"));

        let platform = Platform {
            default_emu_id: "ra".to_string(),
            name: "Super Nintendo Entertainment System".to_string(),
            cmd_params: String::new(),
            xml_path: root.join("Data/Platforms/Super Nintendo Entertainment System.xml"),
        };
        Self {
            dir,
            platform,
            emulators,
        }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn file(&self, rel: &str) -> PathBuf {
        self.root().join(rel).canonicalize().unwrap()
    }

    fn scope(&self, fallback: LaunchFallback) -> PlatformScope<'_> {
        PlatformScope {
            root: self.root(),
            platform: &self.platform,
            emulators: &self.emulators,
            fallback,
        }
    }

    fn ingest(&self, sctx: &mut SearchContext, doc: &str) -> (IngestStats, Result<(), ProviderError>) {
        let mut stats = IngestStats::default();
        let scope = self.scope(LaunchFallback::default());
        let result = ingest_document(doc.as_bytes(), &self.platform.xml_path, &scope, sctx, &mut stats);
        (stats, result)
    }
}

fn only_game(sctx: &SearchContext) -> &Game {
    assert_eq!(sctx.game_count(), 1);
    sctx.games().next().map(|(_, game)| game).unwrap()
}

const SNES: &str = "Super Nintendo Entertainment System";

#[test]
fn test_game_fields_are_stored() {
    let fx = Fixture::new();
    let mut sctx = SearchContext::new();
    let (stats, result) = fx.ingest(
        &mut sctx,
        r#"<?xml version="1.0" standalone="yes"?>
<LaunchBox>
  <Game>
    <ID>a1b2</ID>
    <ApplicationPath>Games\SNES\Super Metroid.sfc</ApplicationPath>
    <Title>Super Metroid</Title>
    <ReleaseDate>1994-03-19T00:00:00-08:00</ReleaseDate>
    <Developer>Nintendo R&amp;D1</Developer>
    <Publisher>Nintendo</Publisher>
    <Notes>  The third Metroid game.  </Notes>
    <PlayMode>Single Player; </PlayMode>
    <Genre>Platform</Genre>
    <CommunityStarRating>4.5</CommunityStarRating>
    <StarRating>5</StarRating>
  </Game>
</LaunchBox>"#,
    );
    result.unwrap();
    assert_eq!(stats.games_added, 1);

    let game = only_game(&sctx);
    assert_eq!(game.title, "Super Metroid");
    assert_eq!(game.description, "The third Metroid game.");
    assert_eq!(game.developers, vec!["Nintendo R&D1"]);
    assert_eq!(game.publishers, vec!["Nintendo"]);
    assert_eq!(game.genres, vec!["Platform", "Single Player"]);
    assert_eq!(game.release_date, NaiveDate::from_ymd_opt(1994, 3, 19));
    assert!((game.rating - 0.9).abs() < 1e-6);
    assert_eq!(game.files, vec![GameFile::new(fx.file("Games/SNES/Super Metroid.sfc"))]);

    let retroarch = fx.file("Emulators/retroarch.exe");
    assert_eq!(
        game.launch_cmd,
        format!("\"{}\" {} {{file.path}}", retroarch.display(), retroarch.display())
    );
    assert_eq!(game.launch_workdir.as_deref(), retroarch.parent());

    let (id, _) = sctx.games().next().unwrap();
    assert_eq!(sctx.collection_children(SNES), &[id]);
}

#[test]
fn test_first_occurrence_of_field_wins() {
    let fx = Fixture::new();
    let mut sctx = SearchContext::new();
    fx.ingest(
        &mut sctx,
        r#"<LaunchBox><Game>
  <ID>a1</ID>
  <ApplicationPath>Games/SNES/Super Metroid.sfc</ApplicationPath>
  <Title></Title>
  <Title>Super Metroid</Title>
  <Title>Metroid 3</Title>
</Game></LaunchBox>"#,
    )
    .1
    .unwrap();
    assert_eq!(only_game(&sctx).title, "Super Metroid");
}

#[test]
fn test_invalid_entries_are_skipped() {
    let fx = Fixture::new();
    let mut sctx = SearchContext::new();
    let (stats, result) = fx.ingest(
        &mut sctx,
        r#"<LaunchBox>
  <Game><ApplicationPath>Games/SNES/Super Metroid.sfc</ApplicationPath></Game>
  <Game><ID>no-path</ID><Title>Ghost</Title></Game>
  <Game><ID>missing</ID><ApplicationPath>Games/SNES/Missing.sfc</ApplicationPath></Game>
  <Game><ID>ok</ID><ApplicationPath>Games/SNES/Chrono Trigger.sfc</ApplicationPath></Game>
</LaunchBox>"#,
    );
    result.unwrap();
    assert_eq!(stats.entries_skipped, 3);
    assert_eq!(stats.games_added, 1);
    assert_eq!(only_game(&sctx).title, "Chrono Trigger");
}

#[test]
fn test_same_file_twice_yields_one_game() {
    let fx = Fixture::new();
    let mut sctx = SearchContext::new();
    let (stats, result) = fx.ingest(
        &mut sctx,
        r#"<LaunchBox>
  <Game>
    <ID>first</ID>
    <ApplicationPath>Games/SNES/Chrono Trigger.sfc</ApplicationPath>
    <Title>Chrono Trigger</Title>
    <Notes>First notes</Notes>
    <Genre>RPG</Genre>
    <Developer>Square</Developer>
    <ReleaseDate>1995-03-11</ReleaseDate>
    <CommunityStarRating>3</CommunityStarRating>
  </Game>
  <Game>
    <ID>second</ID>
    <ApplicationPath>Games\SNES\..\SNES\Chrono Trigger.sfc</ApplicationPath>
    <Title>Chrono Trigger (USA)</Title>
    <Notes>Second notes</Notes>
    <Genre>Role-Playing</Genre>
    <Developer>Square</Developer>
    <ReleaseDate>1995-08-22</ReleaseDate>
    <CommunityStarRating>4.75</CommunityStarRating>
    <Emulator>bsnes</Emulator>
  </Game>
</LaunchBox>"#,
    );
    result.unwrap();
    assert_eq!(stats.games_added, 1);
    assert_eq!(stats.games_merged, 1);

    let game = only_game(&sctx);
    assert_eq!(game.title, "Chrono Trigger (USA)");
    assert_eq!(game.description, "First notes");
    assert_eq!(game.genres, vec!["RPG", "Role-Playing"]);
    assert_eq!(game.developers, vec!["Square"]);
    assert_eq!(game.release_date, NaiveDate::from_ymd_opt(1995, 3, 11));
    assert!((game.rating - 0.95).abs() < 1e-6);
    // launch command from the first entry is kept
    assert!(game.launch_cmd.contains("retroarch.exe"));

    let (id, _) = sctx.games().next().unwrap();
    assert_eq!(sctx.collection_children(SNES), &[id, id]);
}

#[test]
fn test_emulator_and_command_line_overrides() {
    let mut fx = Fixture::new();
    fx.platform.cmd_params = "-L bsnes_libretro".to_string();
    let mut sctx = SearchContext::new();
    fx.ingest(
        &mut sctx,
        r#"<LaunchBox>
  <Game>
    <ID>1</ID>
    <ApplicationPath>Games/SNES/Super Metroid.sfc</ApplicationPath>
    <Emulator>bsnes</Emulator>
    <CommandLine>--fast</CommandLine>
  </Game>
  <Game>
    <ID>2</ID>
    <ApplicationPath>Games/SNES/Chrono Trigger.sfc</ApplicationPath>
    <Emulator>unknown</Emulator>
  </Game>
</LaunchBox>"#,
    )
    .1
    .unwrap();

    let bsnes = fx.file("Emulators/bsnes.exe");
    let retroarch = fx.file("Emulators/retroarch.exe");
    let metroid = sctx.game_id_for_path(&fx.file("Games/SNES/Super Metroid.sfc")).unwrap();
    let chrono = sctx.game_id_for_path(&fx.file("Games/SNES/Chrono Trigger.sfc")).unwrap();

    let game = sctx.game(metroid).unwrap();
    assert_eq!(game.launch_cmd, format!("\"{}\" --fast {{file.path}}", bsnes.display()));
    assert_eq!(game.launch_workdir.as_deref(), bsnes.parent());

    let game = sctx.game(chrono).unwrap();
    assert_eq!(
        game.launch_cmd,
        format!("\"{}\" -L bsnes_libretro {{file.path}}", retroarch.display())
    );
}

#[test]
fn test_fallback_policy_is_applied() {
    let fx = Fixture::new();
    let mut sctx = SearchContext::new();
    let mut stats = IngestStats::default();
    let scope = fx.scope(LaunchFallback::EmulatorParams);
    ingest_document(
        r#"<LaunchBox><Game>
  <ID>1</ID>
  <ApplicationPath>Games/SNES/Super Metroid.sfc</ApplicationPath>
</Game></LaunchBox>"#
            .as_bytes(),
        Path::new("snes.xml"),
        &scope,
        &mut sctx,
        &mut stats,
    )
    .unwrap();

    let retroarch = fx.file("Emulators/retroarch.exe");
    assert_eq!(
        only_game(&sctx).launch_cmd,
        format!("\"{}\" -L snes9x {{file.path}}", retroarch.display())
    );
}

#[test]
fn test_additional_apps_attach_after_walk() {
    let fx = Fixture::new();
    let mut sctx = SearchContext::new();
    let (stats, result) = fx.ingest(
        &mut sctx,
        r#"<LaunchBox>
  <AdditionalApplication>
    <Id>app1</Id>
    <GameID>ct</GameID>
    <ApplicationPath>Games/SNES/Chrono Trigger Setup.exe</ApplicationPath>
    <Name>Configure</Name>
  </AdditionalApplication>
  <AdditionalApplication>
    <Id>app2</Id>
    <GameID>ct</GameID>
    <ApplicationPath>Games/SNES/Chrono Trigger.sfc</ApplicationPath>
    <Name>Play</Name>
  </AdditionalApplication>
  <Game>
    <ID>ct</ID>
    <ApplicationPath>Games/SNES/Chrono Trigger.sfc</ApplicationPath>
  </Game>
</LaunchBox>"#,
    );
    result.unwrap();
    // app2 only names the rom
    assert_eq!(stats.additional_apps, 1);

    let rom = fx.file("Games/SNES/Chrono Trigger.sfc");
    let setup = fx.file("Games/SNES/Chrono Trigger Setup.exe");
    let game = only_game(&sctx);
    assert_eq!(
        game.files,
        vec![
            GameFile::new(rom.clone()).with_name("Play"),
            GameFile::new(setup.clone()).with_name("Configure"),
        ]
    );
    assert_eq!(sctx.game_id_for_path(&setup), sctx.game_id_for_path(&rom));
}

#[test]
fn test_invalid_additional_apps_are_skipped() {
    let fx = Fixture::new();
    let mut sctx = SearchContext::new();
    let (stats, result) = fx.ingest(
        &mut sctx,
        r#"<LaunchBox>
  <Game><ID>sm</ID><ApplicationPath>Games/SNES/Super Metroid.sfc</ApplicationPath></Game>
  <AdditionalApplication><GameID>sm</GameID><ApplicationPath>Games/SNES/Chrono Trigger Setup.exe</ApplicationPath></AdditionalApplication>
  <AdditionalApplication><Id>a</Id><ApplicationPath>Games/SNES/Chrono Trigger Setup.exe</ApplicationPath></AdditionalApplication>
  <AdditionalApplication><Id>b</Id><GameID>zz</GameID><ApplicationPath>Games/SNES/Chrono Trigger Setup.exe</ApplicationPath></AdditionalApplication>
  <AdditionalApplication><Id>c</Id><GameID>sm</GameID></AdditionalApplication>
  <AdditionalApplication><Id>d</Id><GameID>sm</GameID><ApplicationPath>Games/SNES/Nope.exe</ApplicationPath></AdditionalApplication>
</LaunchBox>"#,
    );
    result.unwrap();
    assert_eq!(stats.entries_skipped, 5);
    assert_eq!(stats.additional_apps, 0);
    assert_eq!(only_game(&sctx).files.len(), 1);
}

#[test]
fn test_each_rejected_entry_warns_once() {
    let fx = Fixture::new();
    let mut sctx = SearchContext::new();
    let ((stats, result), warnings) = capture_warnings(|| {
        fx.ingest(
            &mut sctx,
            r#"<LaunchBox>
  <Game><ApplicationPath>Games/SNES/Super Metroid.sfc</ApplicationPath></Game>
  <Game><ID>no-path</ID><Title>Ghost</Title></Game>
  <Game><ID>missing</ID><ApplicationPath>Games/SNES/Missing.sfc</ApplicationPath></Game>
  <Game><ID>ok</ID><ApplicationPath>Games/SNES/Chrono Trigger.sfc</ApplicationPath></Game>
  <AdditionalApplication><GameID>ok</GameID><ApplicationPath>Games/SNES/Chrono Trigger Setup.exe</ApplicationPath></AdditionalApplication>
  <AdditionalApplication><Id>b</Id><GameID>zz</GameID><ApplicationPath>Games/SNES/Chrono Trigger Setup.exe</ApplicationPath></AdditionalApplication>
  <AdditionalApplication><Id>d</Id><GameID>ok</GameID><ApplicationPath>Games/SNES/Nope.exe</ApplicationPath></AdditionalApplication>
  <AdditionalApplication><Id>e</Id><GameID>ok</GameID><ApplicationPath>Games/SNES/Chrono Trigger Setup.exe</ApplicationPath></AdditionalApplication>
</LaunchBox>"#,
        )
    });
    result.unwrap();
    assert_eq!(stats.entries_skipped, 6);
    assert_eq!(stats.additional_apps, 1);
    assert_eq!(warnings.len(), 6, "{warnings:#?}");
    assert!(warnings.iter().all(|w| w.starts_with(MSG_PREFIX) && w.ends_with("entry ignored")));
    assert_eq!(warnings.iter().filter(|w| w.contains("Missing.sfc")).count(), 1);
    assert_eq!(warnings.iter().filter(|w| w.contains("`zz`")).count(), 1);
}

#[test]
fn test_truncated_document_is_a_document_error() {
    let fx = Fixture::new();
    let mut sctx = SearchContext::new();
    let (stats, result) = fx.ingest(
        &mut sctx,
        r#"<LaunchBox>
  <Game><ID>sm</ID><ApplicationPath>Games/SNES/Super Metroid.sfc</ApplicationPath></Game>
  <Game><ID>1</ID><ApplicationPath>Games/SNES/Chrono Trigger.sfc</ApplicationPath>"#,
    );
    let err = result.unwrap_err();
    assert!(matches!(err, ProviderError::InvalidDocument(_)));
    assert!(err.to_string().starts_with("unexpected end of"));
    // the complete record before the cut is kept, the cut one is not
    assert_eq!(stats.games_added, 1);
    assert_eq!(only_game(&sctx).title, "Super Metroid");

    let mut sctx = SearchContext::new();
    let (stats, result) = fx.ingest(
        &mut sctx,
        "<LaunchBox><Game><ID>1</ID><ApplicationPath>Games/SNES/Chrono Trigger.sfc</ApplicationPath>",
    );
    assert!(matches!(result, Err(ProviderError::InvalidDocument(_))));
    assert_eq!(stats.games_added, 0);
    assert_eq!(sctx.game_count(), 0);
}

#[test]
fn test_syntax_error_keeps_ingested_games() {
    let fx = Fixture::new();
    let mut sctx = SearchContext::new();
    let (stats, result) = fx.ingest(
        &mut sctx,
        r#"<LaunchBox>
  <Game><ID>ct</ID><ApplicationPath>Games/SNES/Chrono Trigger.sfc</ApplicationPath></Game>
  <AdditionalApplication>
    <Id>setup</Id>
    <GameID>ct</GameID>
    <ApplicationPath>Games/SNES/Chrono Trigger Setup.exe</ApplicationPath>
  </AdditionalApplication>
  <Game><ID>sm</ID></Oops>
</LaunchBox>"#,
    );
    assert!(matches!(result, Err(ProviderError::XmlParse(_))));
    assert_eq!(stats.games_added, 1);
    assert_eq!(stats.additional_apps, 1);
    assert_eq!(only_game(&sctx).files.len(), 2);
}

#[test]
fn test_wrong_root_is_a_document_error() {
    let fx = Fixture::new();
    let mut sctx = SearchContext::new();
    let (_, result) = fx.ingest(&mut sctx, "<gameList><game/></gameList>");
    assert!(matches!(result, Err(ProviderError::InvalidDocument(_))));
    assert_eq!(sctx.collection_count(), 0);
}

#[test]
fn test_empty_document_creates_collection() {
    let fx = Fixture::new();
    let mut sctx = SearchContext::new();
    fx.ingest(&mut sctx, "<LaunchBox/>").1.unwrap();
    assert!(sctx.collection(SNES).is_some_and(|c| c.is_empty()));
}

#[test]
fn test_missing_document_is_an_open_error() {
    let fx = Fixture::new();
    let mut sctx = SearchContext::new();
    let mut stats = IngestStats::default();
    let err = process_platform_xml(&fx.scope(LaunchFallback::Empty), &mut sctx, &mut stats).unwrap_err();
    assert!(matches!(err, ProviderError::Open { .. }));
}

#[test]
fn test_release_date_formats() {
    assert_eq!(parse_release_date("2004-02-09"), NaiveDate::from_ymd_opt(2004, 2, 9));
    assert_eq!(
        parse_release_date("2004-02-09T00:00:00-08:00"),
        NaiveDate::from_ymd_opt(2004, 2, 9)
    );
    assert_eq!(parse_release_date("1994"), None);
    assert_eq!(parse_release_date("not a date"), None);
}

#[test]
fn test_rating_is_scaled_and_clamped() {
    assert_eq!(parse_rating("5"), Some(1.0));
    assert_eq!(parse_rating("2.5"), Some(0.5));
    assert_eq!(parse_rating("7"), Some(1.0));
    assert_eq!(parse_rating("-1"), Some(0.0));
    assert_eq!(parse_rating("0.00001"), Some(0.0));
    assert!(parse_rating("0.001").is_some_and(|r| r > 0.0));
    assert_eq!(parse_rating("NaN"), None);
    assert_eq!(parse_rating("four"), None);
}

#[test]
fn test_sub_epsilon_rating_is_unrated() {
    let fx = Fixture::new();
    let mut sctx = SearchContext::new();
    fx.ingest(
        &mut sctx,
        r#"<LaunchBox><Game>
  <ID>1</ID>
  <ApplicationPath>Games/SNES/Super Metroid.sfc</ApplicationPath>
  <CommunityStarRating>0.00001</CommunityStarRating>
</Game></LaunchBox>"#,
    )
    .1
    .unwrap();
    let game = only_game(&sctx);
    assert_eq!(game.rating, 0.0);
    assert!(!game.is_rated());
}
