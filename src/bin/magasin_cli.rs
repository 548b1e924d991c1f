use std::{str::FromStr, sync::Arc};

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use magasin::{
    config::{self, AppConfig},
    db::{self, DbPool},
    models::{ArticleLink, LocalLink, Order, OrderStatus},
    repositories::{LinkStore, OrderHeaderStore},
    services::{ExternalOrderStore, InternalOrderStore, InventoryAggregator, OrderAggregateStore},
};
use serde::Serialize;
use tracing::debug;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let context = CliContext::initialize().await?;

    match cli.command {
        Commands::Migrate => {
            db::run_migrations(&context.db)
                .await
                .context("failed to run migrations")?;
            println!("Schema is up to date");
        }
        Commands::Inventory => handle_inventory(&context, cli.json).await?,
        Commands::Orders(command) => {
            let kind = command.kind();
            match kind {
                KindArg::Internal => {
                    let store = InternalOrderStore::internal(context.db.clone());
                    handle_orders(&store, command, cli.json).await?
                }
                KindArg::External => {
                    let store = ExternalOrderStore::external(context.db.clone());
                    handle_orders(&store, command, cli.json).await?
                }
            }
        }
    }

    let CliContext { db, .. } = context;
    if let Ok(pool) = Arc::try_unwrap(db) {
        db::close_pool(pool).await.context("failed to close database")?;
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "magasin", about = "Stock-room orders and inventory", version)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON"
    )]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    Migrate,
    /// Net quantity per article over confirmed and delivered orders
    Inventory,
    #[command(subcommand)]
    Orders(OrdersCommands),
}

#[derive(Subcommand)]
enum OrdersCommands {
    /// List every order of a kind
    List(ListArgs),
    /// Show one order with its links
    Show(OrderRef),
    /// Delete an order and its links
    Delete(OrderRef),
    /// Move an order to another status
    Status(StatusArgs),
}

impl OrdersCommands {
    fn kind(&self) -> KindArg {
        match self {
            OrdersCommands::List(args) => args.kind,
            OrdersCommands::Show(args) | OrdersCommands::Delete(args) => args.kind,
            OrdersCommands::Status(args) => args.order.kind,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindArg {
    Internal,
    External,
}

#[derive(Args)]
struct ListArgs {
    #[arg(long, value_enum)]
    kind: KindArg,
}

#[derive(Args)]
struct OrderRef {
    #[arg(value_enum)]
    kind: KindArg,
    id: i32,
}

#[derive(Args)]
struct StatusArgs {
    #[command(flatten)]
    order: OrderRef,
    /// EnAttente, Confirmee, Annulee or Livree
    #[arg(value_parser = parse_status)]
    status: OrderStatus,
}

fn parse_status(value: &str) -> Result<OrderStatus, String> {
    OrderStatus::from_str(value).map_err(|_| format!("unknown status '{}'", value))
}

struct CliContext {
    _config: AppConfig,
    db: Arc<DbPool>,
}

impl CliContext {
    async fn initialize() -> Result<Self> {
        let config = config::load_config().context("failed to load application config")?;
        config::init_tracing(&config.log_level, config.log_json);

        let db_pool = db::establish_connection_from_app_config(&config)
            .await
            .context("failed to connect to database")?;
        if config.auto_migrate {
            db::run_migrations(&db_pool)
                .await
                .context("failed to run migrations")?;
        }
        debug!(environment = %config.environment, "CLI context ready");

        Ok(Self {
            _config: config,
            db: Arc::new(db_pool),
        })
    }
}

async fn handle_inventory(context: &CliContext, json: bool) -> Result<()> {
    let rows = InventoryAggregator::new(context.db.clone())
        .compute()
        .await
        .context("failed to compute inventory")?;

    if json {
        return print_json(&rows);
    }
    if rows.is_empty() {
        println!("No stock movement recorded");
    }
    for row in rows {
        let locals: Vec<&str> = row.locals.iter().map(String::as_str).collect();
        println!(
            "- {} [{}] • net {}{} • {}",
            row.article_name(),
            row.reference.as_deref().unwrap_or("-"),
            row.net_quantite,
            if row.is_below_minimum() { " (below minimum)" } else { "" },
            if locals.is_empty() {
                "no location".to_string()
            } else {
                locals.join(", ")
            }
        );
    }
    Ok(())
}

async fn handle_orders<H, A, L>(
    store: &OrderAggregateStore<H, A, L>,
    command: OrdersCommands,
    json: bool,
) -> Result<()>
where
    H: OrderHeaderStore,
    A: LinkStore<Link = ArticleLink>,
    L: LinkStore<Link = LocalLink>,
{
    match command {
        OrdersCommands::List(_) => {
            let orders = store.get_all().await.context("failed to list orders")?;
            if json {
                return print_json(&orders);
            }
            if orders.is_empty() {
                println!("No {} orders", store.kind());
            }
            for order in &orders {
                render_order(order);
            }
        }
        OrdersCommands::Show(args) => {
            let order = store
                .find_by_id(args.id)
                .await
                .context("failed to load order")?
                .ok_or_else(|| anyhow!("order {} not found", args.id))?;
            if json {
                return print_json(&order);
            }
            render_order(&order);
            for link in &order.articles {
                println!(
                    "    article {} × {}{}",
                    link.article.label(),
                    link.quantite,
                    link.etat
                        .as_deref()
                        .map(|e| format!(" ({})", e))
                        .unwrap_or_default()
                );
            }
            for link in &order.locals {
                println!("    local {}", link.local.label());
            }
        }
        OrdersCommands::Delete(args) => {
            store
                .delete(args.id)
                .await
                .map_err(|err| anyhow!(err.user_message()))?;
            println!("Order {} deleted", args.id);
        }
        OrdersCommands::Status(args) => {
            let order = store
                .transition(args.order.id, args.status)
                .await
                .map_err(|err| anyhow!(err.user_message()))?;
            if json {
                return print_json(&order);
            }
            render_order(&order);
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn render_order(order: &Order) {
    println!(
        "- Order {} • {} • by {} • {} • {} article(s), {} unit(s)",
        order.id.map(|id| id.to_string()).unwrap_or_else(|| "?".into()),
        order.statut,
        order.actor.label(),
        order
            .counterparty
            .as_ref()
            .map(|c| c.label())
            .unwrap_or_else(|| "no counterparty".into()),
        order.articles.len(),
        order.total_quantite()
    );
}
