use clap::{Parser, Subcommand};
use log::{debug, error, info};
use mongodb::Client;

use config::Config;
use dao::{follow_indexes, user_indexes, FollowDao, FollowDaoTrait, UserDao};
use storage::{DBError, DBProvider, MongoDBClient};

use crate::utils::{parse_object_id, render_json, CliError, UserView};

mod utils;

#[derive(Parser, Debug)]
struct Args {
    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every user
    Users,
    /// Show the user with this username
    User { username: String },
    /// List every follow edge
    Follows,
    /// List the edges pointing at a user
    Followers { uid: String },
    /// List the edges leaving a user
    Following { uid: String },
    /// Make `follower` follow `followed`
    Follow { follower: String, followed: String },
    /// Remove the edge from `follower` to `followed`
    Unfollow { follower: String, followed: String },
    /// Delete every user
    ResetUsers,
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    simple_logger::SimpleLogger::new().env().init().unwrap();

    let args = Args::parse();
    debug!("Args: {:?}", args);

    if let Err(e) = run(args).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), CliError> {
    // Load configuration from yaml
    let config = Config::from_file(&args.config)?.with_env_overrides()?;
    let database = &config.database;
    info!("Using database {} on {}", database.name, config.infra.mongo_url);

    // One client, and one connection pool, shared by both collections.
    // Index creation is idempotent, so the indexes are ensured on every start.
    let client = Client::with_uri_str(&config.infra.mongo_url).await.map_err(DBError::from)?;
    let user_db_provider = MongoDBClient::from_client(
        client.clone(),
        database.name.clone(),
        database.users_collection.clone(),
        &user_indexes(),
    )
    .await?;
    let follow_db_provider = MongoDBClient::from_client(
        client,
        database.name.clone(),
        database.follows_collection.clone(),
        &follow_indexes(),
    )
    .await?;

    let user_dao = UserDao::new(user_db_provider);
    let follow_dao = FollowDao::new(follow_db_provider);

    let output = execute(args.command, &user_dao, &follow_dao).await?;
    println!("{}", output);
    Ok(())
}

/// Runs one command and renders its result as JSON.
async fn execute<P: DBProvider>(
    command: Command,
    user_dao: &UserDao<P>,
    follow_dao: &dyn FollowDaoTrait,
) -> Result<String, CliError> {
    match command {
        Command::Users => {
            let users = user_dao.find_all_users().await?;
            render_json(&users.iter().map(UserView::from).collect::<Vec<_>>())
        }
        Command::User { username } => {
            let user = user_dao.find_user_by_username(&username).await?;
            render_json(&user.as_ref().map(UserView::from))
        }
        Command::Follows => render_json(&follow_dao.find_all_follows().await?),
        Command::Followers { uid } => {
            let uid = parse_object_id(&uid)?;
            render_json(&follow_dao.find_all_users_following_user(&uid).await?)
        }
        Command::Following { uid } => {
            let uid = parse_object_id(&uid)?;
            render_json(&follow_dao.find_all_users_followed_by_user(&uid).await?)
        }
        Command::Follow { follower, followed } => {
            let (follower, followed) = (parse_object_id(&follower)?, parse_object_id(&followed)?);
            render_json(&follow_dao.user_follows_user(&follower, &followed).await?)
        }
        Command::Unfollow { follower, followed } => {
            let (follower, followed) = (parse_object_id(&follower)?, parse_object_id(&followed)?);
            render_json(&follow_dao.user_unfollows_user(&follower, &followed).await?)
        }
        Command::ResetUsers => render_json(&user_dao.delete_all_users().await?),
    }
}
