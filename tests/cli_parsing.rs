use clap::Parser;
use largefile::cli::{Cli, Commands};
use std::path::PathBuf;

#[test]
fn test_parse_edit_with_inline_content() {
    let cli = Cli::try_parse_from(["largefile", "edit", "--file", "big.py", "--content", "x = 1"]).unwrap();

    match cli.command {
        Commands::Edit(args) => {
            assert_eq!(args.file, PathBuf::from("big.py"));
            assert_eq!(args.content.as_deref(), Some("x = 1"));
            assert!(args.new_content.is_none());
            assert_eq!(args.operation, "edit");
        }
        _ => panic!("Wrong top-level command"),
    }
    assert!(!cli.json);
}

#[test]
fn test_parse_edit_with_content_file_and_operation() {
    let cli = Cli::try_parse_from([
        "largefile",
        "edit",
        "-f",
        "big.py",
        "-n",
        "next.py",
        "--operation",
        "refactor",
    ])
    .unwrap();

    match cli.command {
        Commands::Edit(args) => {
            assert_eq!(args.new_content, Some(PathBuf::from("next.py")));
            assert_eq!(args.operation, "refactor");
        }
        _ => panic!("Wrong top-level command"),
    }
}

#[test]
fn test_edit_requires_a_content_source() {
    let result = Cli::try_parse_from(["largefile", "edit", "--file", "big.py"]);
    assert!(result.is_err());
}

#[test]
fn test_edit_rejects_both_content_sources() {
    let result = Cli::try_parse_from([
        "largefile",
        "edit",
        "--file",
        "big.py",
        "--new-content",
        "next.py",
        "--content",
        "inline",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_parse_analyze_with_global_flags() {
    let cli = Cli::try_parse_from([
        "largefile",
        "analyze",
        "--file",
        "big.py",
        "--json",
        "--config",
        "custom.yaml",
    ])
    .unwrap();

    assert!(cli.json);
    assert_eq!(cli.config, Some(PathBuf::from("custom.yaml")));
    match cli.command {
        Commands::Analyze(args) => assert_eq!(args.file, PathBuf::from("big.py")),
        _ => panic!("Wrong top-level command"),
    }
}

#[test]
fn test_parse_stats_without_results_file() {
    let cli = Cli::try_parse_from(["largefile", "stats"]).unwrap();
    match cli.command {
        Commands::Stats(args) => assert!(args.results_file.is_none()),
        _ => panic!("Wrong top-level command"),
    }
}

#[test]
fn test_parse_stats_with_results_file() {
    let cli = Cli::try_parse_from(["largefile", "-j", "stats", "--results-file", "r.json"]).unwrap();
    assert!(cli.json);
    match cli.command {
        Commands::Stats(args) => assert_eq!(args.results_file, Some(PathBuf::from("r.json"))),
        _ => panic!("Wrong top-level command"),
    }
}
