//! Tests for sync and serve.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use std::path::Path;

#[test]
fn cli_parse_sync_with_token() {
    match parse(&[
        "pixsync", "sync", "--owner", "octo", "--repo", "site", "--token", "ghp_x", "--root", "web",
    ]) {
        CliCommand::Sync {
            owner,
            repo,
            token,
            root,
        } => {
            assert_eq!(owner, "octo");
            assert_eq!(repo, "site");
            assert_eq!(token.as_deref(), Some("ghp_x"));
            assert_eq!(root.as_deref(), Some(Path::new("web")));
        }
        _ => panic!("expected Sync"),
    }
}

#[test]
fn cli_parse_sync_requires_owner_and_repo() {
    assert!(Cli::try_parse_from(["pixsync", "sync", "--owner", "octo"]).is_err());
    assert!(Cli::try_parse_from(["pixsync", "sync", "--repo", "site"]).is_err());
}

#[test]
fn cli_parse_serve_defaults() {
    match parse(&["pixsync", "serve"]) {
        CliCommand::Serve { bind, root } => {
            assert!(bind.is_none());
            assert!(root.is_none());
        }
        _ => panic!("expected Serve"),
    }
}

#[test]
fn cli_parse_serve_bind() {
    match parse(&["pixsync", "serve", "--bind", "0.0.0.0:8080", "--root", "/srv/app"]) {
        CliCommand::Serve { bind, root } => {
            assert_eq!(bind.as_deref(), Some("0.0.0.0:8080"));
            assert_eq!(root.as_deref(), Some(Path::new("/srv/app")));
        }
        _ => panic!("expected Serve"),
    }
}
