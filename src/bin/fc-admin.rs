use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use fc_inventory_admin::auth::AdminUserAttributes;
use fc_inventory_admin::format::{format_currency, format_date};
use fc_inventory_admin::listing::{filter_stores, filter_users, ProductFilters, ProductSortKey, SortOrder};
use fc_inventory_admin::models::{tables, Role};
use fc_inventory_admin::prelude::*;
use fc_inventory_admin::validation::password;

#[derive(Parser)]
#[clap(name = "fc-admin", version, about = "FC Falabella inventory administration")]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the UAT admin and promotora accounts
    SeedUsers {
        #[clap(long, default_value = "Password123")]
        password: String,
    },
    Stores {
        #[clap(subcommand)]
        command: StoresCommand,
    },
    Products {
        #[clap(subcommand)]
        command: ProductsCommand,
    },
    Users {
        #[clap(subcommand)]
        command: UsersCommand,
    },
}

#[derive(Subcommand)]
enum StoresCommand {
    List {
        #[clap(long)]
        search: Option<String>,
    },
    /// Show whether a store can be deleted
    Deps { id: Uuid },
}

#[derive(Subcommand)]
enum ProductsCommand {
    List {
        #[clap(long)]
        search: Option<String>,
        #[clap(long, default_value = "created_at")]
        sort_by: ProductSortKey,
        #[clap(long, default_value = "desc")]
        order: SortOrder,
    },
}

#[derive(Subcommand)]
enum UsersCommand {
    List {
        #[clap(long)]
        search: Option<String>,
    },
}

const SEED_ACCOUNTS: [(&str, Role); 2] = [
    ("admin@example.com", Role::Admin),
    ("promotora@example.com", Role::Promotora),
];

async fn seed_users(service: &AdminService, password_value: &str) -> Result<()> {
    password(password_value).map_err(anyhow::Error::msg)?;
    let backend = service.backend();

    for (email, role) in SEED_ACCOUNTS {
        let attributes = AdminUserAttributes {
            email: Some(email.to_string()),
            password: Some(password_value.to_string()),
            email_confirm: Some(true),
            user_metadata: Some(json!({ "role": role })),
        };
        let user = match backend.auth().admin().create_user(&attributes).await {
            Ok(user) => user,
            Err(e) => {
                tracing::error!(email, error = %e, "could not create auth identity");
                continue;
            }
        };

        let profile = json!({ "id": user.id, "email": email, "role": role, "store_id": null });
        match backend
            .from(tables::PROFILES)
            .insert(&profile)
            .execute_no_return()
            .await
        {
            Ok(()) => println!("created {} ({})", email, role),
            Err(e) => tracing::error!(email, error = %e, "could not create profile"),
        }
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::from_env().context("loading configuration")?;
    let service = AdminService::new(config)?;

    match cli.command {
        Command::SeedUsers { password } => seed_users(&service, &password).await?,
        Command::Stores { command } => match command {
            StoresCommand::List { search } => {
                let stores = service.stores().list().await?;
                for store in filter_stores(&stores, search.as_deref().unwrap_or_default()) {
                    println!(
                        "{}  {:<30} skus={:<6} marcas={:<4} inventario={}",
                        store.id, store.name, store.max_skus, store.max_brands, store.max_inventory
                    );
                }
            }
            StoresCommand::Deps { id } => {
                let check = service.stores().check_dependencies(id).await?;
                match check.message() {
                    Some(message) => println!("{}", message),
                    None => println!("La tienda puede eliminarse"),
                }
            }
        },
        Command::Products { command } => match command {
            ProductsCommand::List {
                search,
                sort_by,
                order,
            } => {
                let filters = ProductFilters {
                    search,
                    sort_by,
                    sort_order: order,
                    ..ProductFilters::default()
                };
                for item in filters.apply(service.products().list().await?) {
                    let p = &item.product;
                    println!(
                        "{:<12} {:<20} {:<24} {:>16} {} ({} variantes)",
                        p.sku_parent,
                        p.brand,
                        p.style,
                        format_currency(p.price),
                        format_date(&p.created_at),
                        item.variants.len()
                    );
                }
            }
        },
        Command::Users { command } => match command {
            UsersCommand::List { search } => {
                let users = service.users().list().await?;
                for user in filter_users(&users, search.as_deref().unwrap_or_default()) {
                    let store = user.store.as_ref().map(|s| s.name.as_str()).unwrap_or("-");
                    println!(
                        "{}  {:<32} {:<10} {}",
                        user.profile.id, user.profile.email, user.profile.role, store
                    );
                }
            }
        },
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    run(Cli::parse()).await
}
