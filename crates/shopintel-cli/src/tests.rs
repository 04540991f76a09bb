use super::*;

#[test]
fn parses_single_command() {
    let cli = Cli::try_parse_from(["shopintel", "single", "allbirds.com"])
        .expect("expected valid cli args");

    match cli.command {
        Commands::Single { url, run } => {
            assert_eq!(url.as_str(), "https://allbirds.com");
            assert!(run.max_products.is_none());
            assert!(!run.normalize);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parses_shared_run_flags() {
    let cli = Cli::try_parse_from([
        "shopintel",
        "single",
        "https://shop.example.com",
        "--max-products",
        "50",
        "--normalize",
    ])
    .unwrap();

    assert!(matches!(
        cli.command,
        Commands::Single {
            run: RunArgs {
                max_products: Some(50),
                normalize: true
            },
            ..
        }
    ));
}

#[test]
fn parses_repeated_competitors() {
    let cli = Cli::try_parse_from([
        "shopintel",
        "competitive",
        "https://a.example.com",
        "--competitor",
        "b.example.com",
        "--competitor",
        "https://c.example.com/collections/all",
    ])
    .unwrap();

    let Commands::Competitive { competitors, .. } = cli.command else {
        panic!("expected competitive command");
    };
    let urls: Vec<_> = competitors.iter().map(Target::as_str).collect();
    assert_eq!(urls, vec!["https://b.example.com", "https://c.example.com"]);
}

#[test]
fn competitive_without_competitors_requests_discovery() {
    let cli = Cli::try_parse_from(["shopintel", "competitive", "a.example.com"]).unwrap();
    let Commands::Competitive {
        competitors, run, ..
    } = cli.command
    else {
        panic!("expected competitive command");
    };
    let given = (!competitors.is_empty()).then_some(competitors);
    assert!(run.options(given).competitor_urls.is_none());
}

#[test]
fn parses_bulk_with_file_and_default_poll() {
    let cli = Cli::try_parse_from([
        "shopintel",
        "bulk",
        "a.example.com",
        "b.example.com",
        "--file",
        "stores.txt",
    ])
    .unwrap();

    match cli.command {
        Commands::Bulk {
            urls,
            file,
            poll_ms,
            ..
        } => {
            assert_eq!(urls.len(), 2);
            assert_eq!(file.as_deref(), Some(Path::new("stores.txt")));
            assert_eq!(poll_ms, 500);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn rejects_invalid_url() {
    assert!(Cli::try_parse_from(["shopintel", "single", "ftp://files.example.com"]).is_err());
}

#[test]
fn missing_subcommand_is_an_error() {
    assert!(Cli::try_parse_from(["shopintel"]).is_err());
}

#[test]
fn target_file_skips_blanks_and_comments() {
    let content = "# stores\nallbirds.com\n\n  https://bombas.com  # socks\n";
    let targets = parse_target_lines(content).unwrap();
    let urls: Vec<_> = targets.iter().map(Target::as_str).collect();
    assert_eq!(urls, vec!["https://allbirds.com", "https://bombas.com"]);
}

#[test]
fn target_file_reports_bad_line() {
    let err = parse_target_lines("allbirds.com\nftp://files.example.com\n").unwrap_err();
    assert!(format!("{err:#}").contains("line 2"));
}
