use std::error::Error;

use clap::{Args, Parser, Subcommand};
use engine::{
    Actor, CreateFamilyAccountCmd, CreateFamilyGroupCmd, Engine, Money, TransferCmd, TransferRoute,
};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "famledger_admin")]
#[command(about = "Admin utilities for the family ledger (bootstrap groups/accounts)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./famledger.db?mode=rwc"
    )]
    database_url: String,

    /// Identity of the acting admin.
    #[arg(long, env = "ADMIN_ID")]
    admin_id: Uuid,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Group(Group),
    Account(Account),
    Member(Member),
    Deposit(DepositArgs),
}

#[derive(Args, Debug)]
struct Group {
    #[command(subcommand)]
    command: GroupCommand,
}

#[derive(Subcommand, Debug)]
enum GroupCommand {
    Create(GroupCreateArgs),
}

#[derive(Args, Debug)]
struct GroupCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    description: Option<String>,
    /// Make this the owner's default group.
    #[arg(long)]
    default: bool,
}

#[derive(Args, Debug)]
struct Account {
    #[command(subcommand)]
    command: AccountCommand,
}

#[derive(Subcommand, Debug)]
enum AccountCommand {
    Create(AccountCreateArgs),
}

#[derive(Args, Debug)]
struct AccountCreateArgs {
    #[arg(long)]
    group: Uuid,
    #[arg(long)]
    name: String,
}

#[derive(Args, Debug)]
struct Member {
    #[command(subcommand)]
    command: MemberCommand,
}

#[derive(Subcommand, Debug)]
enum MemberCommand {
    Add(MemberAddArgs),
}

#[derive(Args, Debug)]
struct MemberAddArgs {
    #[arg(long)]
    group: Uuid,
    #[arg(long)]
    user: Uuid,
}

/// Credit a family account from the bank, e.g. to seed balances.
#[derive(Args, Debug)]
struct DepositArgs {
    #[arg(long)]
    account: Uuid,
    /// Amount in the form `123.45`.
    #[arg(long)]
    amount: Money,
    #[arg(long)]
    description: Option<String>,
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build();
    let admin = Actor::admin(cli.admin_id);

    match cli.command {
        Command::Group(Group {
            command: GroupCommand::Create(args),
        }) => {
            let mut cmd = CreateFamilyGroupCmd::new(args.name);
            if let Some(description) = args.description {
                cmd = cmd.description(description);
            }
            if args.default {
                cmd = cmd.default_group();
            }
            let group = engine.create_family_group(&admin, cmd).await?;
            println!("created family group: {}", group.id);
        }
        Command::Account(Account {
            command: AccountCommand::Create(args),
        }) => {
            // Dependent entities require a default group on the actor.
            let admin = admin.clone().in_group(args.group);
            let account = engine
                .create_family_account(&admin, CreateFamilyAccountCmd::new(args.group, args.name))
                .await?;
            println!("created family account: {}", account.id);
        }
        Command::Member(Member {
            command: MemberCommand::Add(args),
        }) => {
            let admin = admin.clone().in_group(args.group);
            let membership = engine.add_member(&admin, args.group, args.user).await?;
            println!("added member: {}", membership.id);
        }
        Command::Deposit(args) => {
            let route = TransferRoute::BankToFamily {
                destination: args.account,
            };
            let mut cmd = TransferCmd::new(route, args.amount);
            if let Some(description) = args.description {
                cmd = cmd.description(description);
            }
            let record = engine.apply_transfer(&admin, cmd).await?;
            println!("transfer recorded: {}", record.id);
        }
    }

    Ok(())
}
