//! The `qadrill user` command family.
//!
//! User management is admin-gated, with one exception: an empty store
//! accepts its first user without authentication, and that user is
//! always an admin.

use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;

use qadrill_core::auth::FileCredentialStore;
use qadrill_core::traits::CredentialStore;
use qadrill_providers::config::load_config_from;

/// Env var holding the password for a user being added.
pub const NEW_PASSWORD_ENV: &str = "QADRILL_NEW_PASSWORD";

#[derive(Subcommand)]
pub enum UserAction {
    /// Register or update a user (password from QADRILL_NEW_PASSWORD)
    Add {
        /// Email of the user to add
        #[arg(long)]
        email: String,

        /// Grant the new user admin rights
        #[arg(long)]
        admin: bool,

        /// Acting admin email; the password is read from QADRILL_PASSWORD
        #[arg(long = "as")]
        acting: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List registered users
    List {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Remove a user
    Remove {
        /// Email of the user to remove
        #[arg(long)]
        email: String,

        /// Acting admin email; the password is read from QADRILL_PASSWORD
        #[arg(long = "as")]
        acting: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

pub fn execute(action: UserAction) -> Result<()> {
    match action {
        UserAction::Add {
            email,
            admin,
            acting,
            config,
        } => add(email, admin, acting, config),
        UserAction::List { config } => list(config),
        UserAction::Remove {
            email,
            acting,
            config,
        } => remove(email, acting, config),
    }
}

fn open_store(config_path: Option<PathBuf>) -> Result<FileCredentialStore> {
    let config = load_config_from(config_path.as_deref())?;
    Ok(FileCredentialStore::new(&config.credentials_path))
}

/// Authenticate `acting` as an admin, or fail.
fn require_admin(store: &FileCredentialStore, acting: Option<&str>) -> Result<String> {
    let Some(acting) = acting else {
        anyhow::bail!("admin required: pass --as <admin-email> and set {}", super::PASSWORD_ENV);
    };
    let password = std::env::var(super::PASSWORD_ENV).unwrap_or_default();
    anyhow::ensure!(
        store.authenticate(acting, &password),
        "not authenticated (set {} and check your email)",
        super::PASSWORD_ENV
    );
    anyhow::ensure!(store.is_admin(acting), "'{acting}' is not an admin");
    Ok(acting.to_string())
}

fn add(email: String, admin: bool, acting: Option<String>, config: Option<PathBuf>) -> Result<()> {
    let store = open_store(config)?;

    // Bootstrap: an empty store takes its first user without auth.
    let bootstrap = store.is_empty()?;
    let is_admin = if bootstrap {
        if !admin {
            println!("First registered user is always an admin.");
        }
        true
    } else {
        require_admin(&store, acting.as_deref())?;
        admin
    };

    let password = std::env::var(NEW_PASSWORD_ENV)
        .ok()
        .filter(|p| !p.is_empty());
    let Some(password) = password else {
        anyhow::bail!("set {NEW_PASSWORD_ENV} to the new user's password");
    };

    store.save_user(&email, &password, is_admin)?;
    println!("Saved user '{email}'{}", if is_admin { " (admin)" } else { "" });
    Ok(())
}

fn list(config: Option<PathBuf>) -> Result<()> {
    use comfy_table::{Cell, Table};

    let store = open_store(config)?;
    let users = store.list_users()?;
    if users.is_empty() {
        println!("No users registered. Run: qadrill user add --email <email>");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Email", "Admin", "Created"]);
    for (email, record) in users {
        table.add_row(vec![
            Cell::new(email),
            Cell::new(if record.is_admin { "yes" } else { "no" }),
            Cell::new(record.created_at.format("%Y-%m-%d %H:%M:%S UTC")),
        ]);
    }
    println!("{table}");
    Ok(())
}

fn remove(email: String, acting: Option<String>, config: Option<PathBuf>) -> Result<()> {
    let store = open_store(config)?;
    let acting = require_admin(&store, acting.as_deref())?;
    anyhow::ensure!(acting != email, "cannot remove your own account");

    if store.remove_user(&email)? {
        println!("Removed user '{email}'");
    } else {
        println!("No such user '{email}'");
    }
    Ok(())
}
