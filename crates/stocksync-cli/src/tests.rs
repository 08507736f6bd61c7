use std::path::PathBuf;

use super::*;

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["stocksync"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_stock_with_defaults() {
    let cli = Cli::try_parse_from(["stocksync", "stock"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Stock {
            dry_run: false,
            watch: None
        })
    ));
}

#[test]
fn parses_stock_dry_run_and_watch() {
    let cli = Cli::try_parse_from(["stocksync", "stock", "--dry-run", "--watch", "300"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Stock {
            dry_run: true,
            watch: Some(300)
        })
    ));
}

#[test]
fn stock_watch_requires_a_number() {
    let result = Cli::try_parse_from(["stocksync", "stock", "--watch", "soon"]);
    assert!(result.is_err());
}

#[test]
fn parses_products_create_missing_with_limit() {
    let cli = Cli::try_parse_from(["stocksync", "products", "create-missing", "--limit", "25"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Products {
            command: ProductsCommands::CreateMissing {
                dry_run: false,
                limit: Some(25)
            }
        })
    ));
}

#[test]
fn parses_products_create_missing_dry_run() {
    let cli = Cli::try_parse_from(["stocksync", "products", "create-missing", "--dry-run"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Products {
            command: ProductsCommands::CreateMissing {
                dry_run: true,
                limit: None
            }
        })
    ));
}

#[test]
fn products_requires_a_subcommand() {
    assert!(Cli::try_parse_from(["stocksync", "products"]).is_err());
}

#[test]
fn parses_orders_sync_simulation_by_default() {
    let cli =
        Cli::try_parse_from(["stocksync", "orders", "sync"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Orders {
            command: OrdersCommands::Sync {
                submit: false,
                max_orders: None
            }
        })
    ));
}

#[test]
fn parses_orders_sync_submit_with_max() {
    let cli = Cli::try_parse_from(["stocksync", "orders", "sync", "--submit", "--max-orders", "10"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Orders {
            command: OrdersCommands::Sync {
                submit: true,
                max_orders: Some(10)
            }
        })
    ));
}

#[test]
fn parses_rules_check_with_explicit_path() {
    let cli = Cli::try_parse_from(["stocksync", "rules", "check", "--path", "/etc/stocksync/rules.yaml"])
        .expect("expected valid cli args");
    match cli.command {
        Some(Commands::Rules {
            command: RulesCommands::Check { path },
        }) => assert_eq!(path, PathBuf::from("/etc/stocksync/rules.yaml")),
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn unknown_command_is_rejected() {
    assert!(Cli::try_parse_from(["stocksync", "prices"]).is_err());
}
