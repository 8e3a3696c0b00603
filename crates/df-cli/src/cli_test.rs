use super::*;
use clap::CommandFactory;

#[test]
fn verify_cli_args() {
    // Validates the entire command tree: short flag conflicts,
    // duplicate args, and other clap definition errors.
    Cli::command().debug_assert();
}

#[test]
fn test_run_lists_split_on_commas() {
    let cli = Cli::parse_from([
        "dagform",
        "run",
        "proj",
        "--dry-run",
        "--tags=daily,hourly",
        "--actions",
        "a,b.c",
    ]);
    let Commands::Run(args) = cli.command else {
        panic!("expected run");
    };
    assert_eq!(args.project_dir, PathBuf::from("proj"));
    assert_eq!(args.tags, vec!["daily", "hourly"]);
    assert_eq!(args.actions, vec!["a", "b.c"]);
    assert!(args.dry_run);
}

#[test]
fn test_compile_settings_flags() {
    let cli = Cli::parse_from([
        "dagform",
        "-v",
        "compile",
        "--json",
        "--vars=a=1,b=2",
        "--schema-suffix",
        "dev",
        "--disable-assertions",
    ]);
    assert!(cli.global.verbose);
    let Commands::Compile(args) = cli.command else {
        panic!("expected compile");
    };
    assert_eq!(args.project_dir, PathBuf::from("."));
    assert!(args.json);
    assert_eq!(args.settings.vars.as_deref(), Some("a=1,b=2"));
    assert_eq!(args.settings.schema_suffix.as_deref(), Some("dev"));
    assert!(args.settings.disable_assertions);
}
